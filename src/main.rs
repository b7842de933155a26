//! names-dict - password dictionaries from given names
//!
//! Main entry point for the command-line application.

use anyhow::Context;
use clap::Parser;
use std::process;

use names_dict::cli::Args;
use names_dict::output::open_sink;
use names_dict::pipeline::{Pipeline, PipelineConfig};
use names_dict::progress::{
    create_spinner, format_number, print_banner, print_error, print_header, print_info,
    print_success, print_warning,
};
use names_dict::source::{open_input, read_records};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Print banner unless quiet mode
    if !args.quiet {
        print_banner();
    }

    let config = PipelineConfig::from_args(&args)?;
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    if args.dry_run || (!args.quiet && args.verbose) {
        print_config(&args, &pipeline);
    }
    if args.dry_run {
        return Ok(());
    }

    let reader = open_input(args.input.as_deref(), args.encoding.as_deref())
        .with_context(|| match &args.input {
            Some(path) => format!("Failed to open input {:?}", path),
            None => "Failed to open stdin".to_string(),
        })?;

    let sink = open_sink(args.output.as_deref(), pipeline.config().buffer_size)
        .with_context(|| format!("Failed to open output {:?}", args.output))?;

    let spinner = if args.quiet {
        indicatif::ProgressBar::hidden()
    } else {
        create_spinner("Scanning records...")
    };
    let pipeline = pipeline.with_progress(spinner.clone());

    let result = pipeline.run(read_records(reader, args.format), sink);
    spinner.finish_and_clear();
    let report = result.context("Dictionary generation failed")?;

    if !args.quiet {
        if report.names_emitted == 0 {
            print_warning("No name reached the threshold; output is empty");
        }
        pipeline.stats().print_summary();
        if let Some(ref path) = args.output {
            print_success(&format!("Dictionary written to {:?}", path));
        }
    }

    Ok(())
}

/// Print configuration summary
fn print_config(args: &Args, pipeline: &Pipeline) {
    let config = pipeline.config();
    print_header("Configuration");

    print_info(&format!("Input:          {}", describe(&args.input, "stdin")));
    print_info(&format!("Output:         {}", describe(&args.output, "stdout")));
    print_info(&format!("Format:         {:?}", args.format));
    print_info(&format!("Template:       {}", config.template));
    print_info(&format!("Threshold:      {}", config.threshold));
    print_info(&format!("Digits:         {}", config.max_digit_width));
    print_info(&format!("Special chars:  {:?}", config.special_characters));
    print_info(&format!("Fold case:      {}", config.fold_case));
    print_info(&format!("Queue capacity: {}", config.queue_capacity));
    print_info(&format!(
        "Variants/name:  {}",
        format_number(pipeline.expander().variants_per_name())
    ));
}

fn describe(path: &Option<std::path::PathBuf>, fallback: &str) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| fallback.to_string())
}
