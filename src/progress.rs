//! Progress display module
//!
//! Styled status output, run statistics and the end-of-run summary. Everything
//! goes to stderr because stdout may be carrying the dictionary itself.

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════════╗
║                                                                  ║
║   ███╗   ██╗ █████╗ ███╗   ███╗███████╗███████╗                  ║
║   ████╗  ██║██╔══██╗████╗ ████║██╔════╝██╔════╝                  ║
║   ██╔██╗ ██║███████║██╔████╔██║█████╗  ███████╗                  ║
║   ██║╚██╗██║██╔══██║██║╚██╔╝██║██╔══╝  ╚════██║                  ║
║   ██║ ╚████║██║  ██║██║ ╚═╝ ██║███████╗███████║  -dict           ║
║   ╚═╝  ╚═══╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝╚══════╝                  ║
║                                                                  ║
║            Password dictionaries from given names                ║
║                                                     v0.1.0       ║
╚══════════════════════════════════════════════════════════════════╝
"#;

    eprintln!("{}", banner.bright_cyan());
}

/// Print a section header
pub fn print_header(text: &str) {
    eprintln!("\n{} {}", "▶".cyan(), text.cyan().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    eprintln!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    eprintln!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    eprintln!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Create a styled spinner for the record scan (drawn on stderr)
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Lifecycle of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    /// Not started yet
    Idle = 0,
    /// Producer feeding, consumer draining
    Running = 1,
    /// Input exhausted, consumer finishing the backlog
    Draining = 2,
    /// Every queued name has been expanded and written
    Done = 3,
    /// Aborted by a fatal error
    Failed = 4,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Draining,
            3 => Self::Done,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Counters shared by the producer and consumer threads
#[derive(Debug)]
pub struct RunStats {
    pub records: AtomicU64,
    pub templates: AtomicU64,
    pub name_fields: AtomicU64,
    pub skipped_fields: AtomicU64,
    pub candidates: AtomicU64,
    pub distinct_names: AtomicU64,
    pub names_emitted: AtomicU64,
    pub variants_written: AtomicU64,
    pub bytes_written: AtomicU64,
    state: AtomicU8,
    pub start_time: Instant,
}

/// Plain snapshot of [`RunStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub records: u64,
    pub templates: u64,
    pub name_fields: u64,
    pub skipped_fields: u64,
    pub candidates: u64,
    pub distinct_names: u64,
    pub names_emitted: u64,
    pub variants_written: u64,
    pub bytes_written: u64,
    pub state: PipelineState,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            records: AtomicU64::new(0),
            templates: AtomicU64::new(0),
            name_fields: AtomicU64::new(0),
            skipped_fields: AtomicU64::new(0),
            candidates: AtomicU64::new(0),
            distinct_names: AtomicU64::new(0),
            names_emitted: AtomicU64::new(0),
            variants_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            state: AtomicU8::new(PipelineState::Idle as u8),
            start_time: Instant::now(),
        }
    }

    pub fn add_record(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_template(&self) {
        self.templates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_name_field(&self) {
        self.name_fields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_skipped_field(&self) {
        self.skipped_fields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_candidate(&self) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_distinct_names(&self, count: u64) {
        self.distinct_names.store(count, Ordering::Relaxed);
    }

    /// Record one fully expanded name
    pub fn add_emitted(&self, variants: u64, bytes: u64) {
        self.names_emitted.fetch_add(1, Ordering::Relaxed);
        self.variants_written.fetch_add(variants, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_state(&self, state: PipelineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn get_records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn get_names_emitted(&self) -> u64 {
        self.names_emitted.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn records_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_records() as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            records: self.get_records(),
            templates: self.templates.load(Ordering::Relaxed),
            name_fields: self.name_fields.load(Ordering::Relaxed),
            skipped_fields: self.skipped_fields.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            distinct_names: self.distinct_names.load(Ordering::Relaxed),
            names_emitted: self.get_names_emitted(),
            variants_written: self.variants_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            state: self.state(),
        }
    }

    /// One-line progress message for the spinner
    pub fn progress_message(&self) -> String {
        format!(
            "{} records, {} names emitted",
            format_number(self.get_records()),
            format_number(self.get_names_emitted())
        )
    }

    /// Print final statistics
    pub fn print_summary(&self) {
        let report = self.report();

        eprintln!();
        eprintln!("{}", "═".repeat(60).cyan());
        eprintln!("{}", "                    GENERATION COMPLETE".cyan().bold());
        eprintln!("{}", "═".repeat(60).cyan());
        eprintln!();

        eprintln!("  {} {}", "Records scanned:".cyan(), format_number(report.records));
        eprintln!("  {} {}", "Templates:      ".cyan(), format_number(report.templates));
        eprintln!("  {} {}", "Name fields:    ".cyan(), format_number(report.name_fields));
        if report.skipped_fields > 0 {
            eprintln!(
                "  {} {}",
                "Skipped fields: ".yellow(),
                format_number(report.skipped_fields)
            );
        }
        eprintln!("  {} {}", "Distinct names: ".cyan(), format_number(report.distinct_names));
        eprintln!(
            "  {} {}",
            "Names emitted:  ".green().bold(),
            format_number(report.names_emitted).green().bold()
        );
        eprintln!();

        eprintln!("  {} {}", "Variants:       ".cyan(), format_number(report.variants_written));
        eprintln!("  {} {}", "Output size:    ".cyan(), ByteSize(report.bytes_written));
        eprintln!("  {} {}", "Duration:       ".cyan(), format_duration(self.elapsed()));
        eprintln!(
            "  {} {:.2} records/sec",
            "Throughput:     ".cyan(),
            self.records_per_second()
        );
        eprintln!();
        eprintln!("{}", "═".repeat(60).cyan());
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }

    #[test]
    fn test_stats_report() {
        let stats = RunStats::new();

        stats.add_record();
        stats.add_record();
        stats.add_candidate();
        stats.add_emitted(3, 15);
        stats.set_distinct_names(1);

        let report = stats.report();
        assert_eq!(report.records, 2);
        assert_eq!(report.candidates, 1);
        assert_eq!(report.names_emitted, 1);
        assert_eq!(report.variants_written, 3);
        assert_eq!(report.bytes_written, 15);
        assert_eq!(report.distinct_names, 1);
        assert_eq!(report.state, PipelineState::Idle);
    }

    #[test]
    fn test_state_transitions() {
        let stats = RunStats::new();
        for state in [
            PipelineState::Running,
            PipelineState::Draining,
            PipelineState::Done,
            PipelineState::Failed,
        ] {
            stats.set_state(state);
            assert_eq!(stats.state(), state);
        }
    }
}
