//! Core processing engine
//!
//! One producer scans records and counts names; one consumer expands every
//! name that crossed the threshold and writes its variants. The two are
//! joined by a bounded channel, so a slow sink throttles the scan instead of
//! letting the backlog grow.

use crate::cli::Args;
use crate::error::{NamesError, Result};
use crate::expand::{VariantExpander, MAX_DIGIT_WIDTH_LIMIT};
use crate::extract::{split_name_field, template_fields, NameExtractor, NAME_KEY};
use crate::histogram::Histogram;
use crate::output::{VariantWriter, DEFAULT_BUFFER_SIZE};
use crate::progress::{PipelineState, RunReport, RunStats};

use crossbeam_channel::{bounded, Receiver, Sender};
use indicatif::ProgressBar;
use log::{debug, info, trace, warn};
use std::borrow::Cow;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Records between two spinner updates
const PROGRESS_INTERVAL: u64 = 1000;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub threshold: u64,
    pub max_digit_width: u32,
    pub special_characters: String,
    pub template: String,
    pub queue_capacity: usize,
    pub fold_case: bool,
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            max_digit_width: crate::expand::DEFAULT_MAX_DIGIT_WIDTH,
            special_characters: crate::expand::DEFAULT_SPECIAL_CHARACTERS.to_string(),
            template: crate::extract::DEFAULT_TEMPLATE.to_string(),
            queue_capacity: 100,
            fold_case: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl PipelineConfig {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        Ok(Self {
            threshold: args.threshold,
            max_digit_width: args.digits,
            special_characters: args.special_chars.clone(),
            template: args.template.clone(),
            queue_capacity: args.queue_capacity,
            fold_case: args.fold_case,
            buffer_size: args.parse_buffer_size()?,
        })
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 1 {
            return Err(NamesError::InvalidConfig(
                "threshold must be at least 1".to_string(),
            ));
        }
        if self.max_digit_width > MAX_DIGIT_WIDTH_LIMIT {
            return Err(NamesError::InvalidConfig(format!(
                "digit width {} exceeds the maximum of {}",
                self.max_digit_width, MAX_DIGIT_WIDTH_LIMIT
            )));
        }
        if self.queue_capacity < 1 {
            return Err(NamesError::InvalidConfig(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        if self.template.trim().is_empty() {
            return Err(NamesError::InvalidConfig(
                "template name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Name scanner and variant generator
pub struct Pipeline {
    config: PipelineConfig,
    extractor: NameExtractor,
    expander: VariantExpander,
    stats: Arc<RunStats>,
    progress: ProgressBar,
}

impl Pipeline {
    /// Validate the configuration and build the suffix tables.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let extractor = NameExtractor::new(config.template.trim());
        let expander = VariantExpander::new(config.max_digit_width, &config.special_characters);

        Ok(Self {
            config,
            extractor,
            expander,
            stats: Arc::new(RunStats::new()),
            progress: ProgressBar::hidden(),
        })
    }

    /// Report progress on `progress` while running
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn expander(&self) -> &VariantExpander {
        &self.expander
    }

    /// Get processing statistics
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Scan `records` and write the variants of every eligible name to `sink`.
    ///
    /// Returns once the consumer has written everything that was queued. A
    /// failing record or sink aborts both sides.
    pub fn run<I, W>(&self, records: I, sink: W) -> Result<RunReport>
    where
        I: IntoIterator<Item = Result<String>>,
        W: Write + Send,
    {
        let (tx, rx) = bounded::<String>(self.config.queue_capacity);
        let abort = AtomicBool::new(false);

        self.stats.set_state(PipelineState::Running);
        info!(
            "Scanning for '{}' templates (threshold {}, {} variants per name)",
            self.extractor.template(),
            self.config.threshold,
            self.expander.variants_per_name()
        );

        let (produced, consumed) = thread::scope(|scope| {
            let abort = &abort;
            let consumer = thread::Builder::new()
                .name("variant-writer".to_string())
                .spawn_scoped(scope, move || self.consume(rx, sink, abort));

            let consumer = match consumer {
                Ok(handle) => handle,
                Err(e) => return (Ok(()), Err(NamesError::Io(e))),
            };

            let produced = self.produce(records, tx, abort);
            let consumed = consumer
                .join()
                .unwrap_or(Err(NamesError::WorkerPanicked("variant writer")));

            (produced, consumed)
        });

        match produced.and(consumed) {
            Ok(()) => {
                self.stats.set_state(PipelineState::Done);
                let report = self.stats.report();
                info!(
                    "Done: {} names emitted, {} variants written",
                    report.names_emitted, report.variants_written
                );
                Ok(report)
            }
            Err(e) => {
                self.stats.set_state(PipelineState::Failed);
                Err(e)
            }
        }
    }

    /// Producer: extract candidates, count them and queue every name that
    /// reaches the threshold. Dropping `tx` on return closes the queue.
    fn produce<I>(&self, records: I, tx: Sender<String>, abort: &AtomicBool) -> Result<()>
    where
        I: IntoIterator<Item = Result<String>>,
    {
        let mut histogram = Histogram::new(self.config.threshold);

        for record in records {
            if abort.load(Ordering::Acquire) {
                debug!("Variant writer failed, stopping scan");
                return Ok(());
            }

            let text = match record {
                Ok(text) => text,
                Err(e) => {
                    warn!("Input failed, abandoning queued names: {}", e);
                    abort.store(true, Ordering::Release);
                    return Err(e);
                }
            };

            self.stats.add_record();

            for body in self.extractor.templates(&text) {
                self.stats.add_template();

                for field in template_fields(body).filter(|field| field.key_is(NAME_KEY)) {
                    self.stats.add_name_field();

                    let candidate = match split_name_field(field.value) {
                        Ok(candidate) => candidate,
                        Err(reason) => {
                            trace!("Skipping name field {:?}: {}", field.value, reason);
                            self.stats.add_skipped_field();
                            continue;
                        }
                    };
                    self.stats.add_candidate();

                    let key = if self.config.fold_case {
                        Cow::Owned(candidate.to_lowercase())
                    } else {
                        Cow::Borrowed(candidate)
                    };

                    if !histogram.observe(&key) {
                        continue;
                    }

                    debug!("'{}' reached {} occurrences", key, histogram.threshold());
                    if tx.send(key.into_owned()).is_err() {
                        debug!("Variant writer is gone, stopping scan");
                        return Ok(());
                    }
                }
            }

            self.stats.set_distinct_names(histogram.len() as u64);
            if self.stats.get_records() % PROGRESS_INTERVAL == 0 {
                self.progress.set_message(self.stats.progress_message());
            }
        }

        self.stats.set_state(PipelineState::Draining);
        debug!(
            "Input exhausted: {} distinct names, {} eligible; draining queue",
            histogram.len(),
            histogram.eligible()
        );
        Ok(())
    }

    /// Consumer: expand queued names in arrival order until the queue is
    /// closed and empty. A write error raises `abort` so the producer stops
    /// at its next record.
    fn consume<W: Write>(&self, rx: Receiver<String>, sink: W, abort: &AtomicBool) -> Result<()> {
        let written = self.write_queued(rx, sink, abort);
        if written.is_err() {
            abort.store(true, Ordering::Release);
        }
        written
    }

    fn write_queued<W: Write>(
        &self,
        rx: Receiver<String>,
        sink: W,
        abort: &AtomicBool,
    ) -> Result<()> {
        let mut writer = VariantWriter::new(sink);

        for name in rx.iter() {
            if abort.load(Ordering::Acquire) {
                debug!("Producer aborted, dropping '{}' and the rest of the queue", name);
                break;
            }

            let lines_before = writer.lines_written();
            let bytes_before = writer.bytes_written();

            self.expander
                .try_for_each_variant(&name, |variant| writer.write_line(variant))
                .map_err(NamesError::Output)?;

            self.stats.add_emitted(
                writer.lines_written() - lines_before,
                writer.bytes_written() - bytes_before,
            );
            trace!("Expanded '{}'", name);
        }

        writer.flush().map_err(NamesError::Output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u64, digits: u32, specials: &str) -> PipelineConfig {
        PipelineConfig {
            threshold,
            max_digit_width: digits,
            special_characters: specials.to_string(),
            ..PipelineConfig::default()
        }
    }

    fn records(texts: &[&str]) -> Vec<Result<String>> {
        texts.iter().map(|t| Ok(t.to_string())).collect()
    }

    fn output_lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(config(0, 4, "!").validate().is_err());
        assert!(config(1, 10, "!").validate().is_err());
        assert!(config(1, 9, "!").validate().is_ok());

        let mut cfg = PipelineConfig::default();
        cfg.queue_capacity = 0;
        assert!(matches!(cfg.validate(), Err(NamesError::InvalidConfig(_))));

        let mut cfg = PipelineConfig::default();
        cfg.template = "  ".to_string();
        assert!(Pipeline::new(cfg).is_err());
    }

    #[test]
    fn test_threshold_filters_names() {
        let pipeline = Pipeline::new(config(2, 0, "")).unwrap();
        let input = records(&[
            "{{Personendaten|NAME=Schmidt, Otto}}",
            "{{Personendaten|NAME=Lang, Fritz}}",
            "{{Personendaten|NAME=Müller, Otto}}",
        ]);

        let mut out = Vec::new();
        let report = pipeline.run(input, &mut out).unwrap();

        assert_eq!(output_lines(&out), vec!["otto", "OTTO", "Otto"]);
        assert_eq!(report.records, 3);
        assert_eq!(report.candidates, 3);
        assert_eq!(report.distinct_names, 2);
        assert_eq!(report.names_emitted, 1);
        assert_eq!(report.variants_written, 3);
        assert_eq!(report.state, PipelineState::Done);
    }

    #[test]
    fn test_skipped_fields_are_counted() {
        let pipeline = Pipeline::new(config(1, 0, "")).unwrap();
        let input = records(&["{{Personendaten|NAME=Kaiser|NAME=Lang,|NAME=Lang, Fritz|BAD}}"]);

        let mut out = Vec::new();
        let report = pipeline.run(input, &mut out).unwrap();

        assert_eq!(report.templates, 1);
        assert_eq!(report.name_fields, 3);
        assert_eq!(report.skipped_fields, 2);
        assert_eq!(output_lines(&out), vec!["fritz", "FRITZ", "Fritz"]);
    }

    #[test]
    fn test_case_sensitive_keys_by_default() {
        let input = || records(&["{{Personendaten|NAME=A, Otto|NAME=B, otto}}"]);

        let pipeline = Pipeline::new(config(2, 0, "")).unwrap();
        let mut out = Vec::new();
        pipeline.run(input(), &mut out).unwrap();
        assert!(out.is_empty());

        let mut folded = config(2, 0, "");
        folded.fold_case = true;
        let pipeline = Pipeline::new(folded).unwrap();
        let mut out = Vec::new();
        pipeline.run(input(), &mut out).unwrap();
        assert_eq!(output_lines(&out), vec!["otto", "OTTO", "Otto"]);
    }

    #[test]
    fn test_names_emitted_in_crossing_order() {
        let pipeline = Pipeline::new(config(2, 0, "")).unwrap();
        let input = records(&[
            "{{Personendaten|NAME=A, Anna}}",
            "{{Personendaten|NAME=B, Fritz|NAME=C, Fritz}}",
            "{{Personendaten|NAME=D, Anna}}",
        ]);

        let mut out = Vec::new();
        pipeline.run(input, &mut out).unwrap();

        assert_eq!(
            output_lines(&out),
            vec!["fritz", "FRITZ", "Fritz", "anna", "ANNA", "Anna"]
        );
    }

    #[test]
    fn test_empty_input() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let mut out = Vec::new();
        let report = pipeline.run(Vec::new(), &mut out).unwrap();

        assert!(out.is_empty());
        assert_eq!(report.records, 0);
        assert_eq!(report.state, PipelineState::Done);
    }
}
