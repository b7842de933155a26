//! Command-line interface definition for names-dict
//!
//! Every flag can also be set through a `NAMES_DICT_*` environment variable.

use crate::expand::{DEFAULT_MAX_DIGIT_WIDTH, DEFAULT_SPECIAL_CHARACTERS};
use crate::extract::DEFAULT_TEMPLATE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Create a password dictionary based on given names
///
/// Scans Wikipedia biography templates for given names, keeps the names that
/// occur often enough and prints every case/number/special-character
/// variant of them.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "names-dict",
    version,
    about = "Create a password dictionary based on given names",
    long_about = r#"
Create a password dictionary based on given names.

Given names are taken from the NAME field of biography templates
({{Personendaten|NAME=Schmidt, Otto}}) in a MediaWiki XML export. Every name
seen at least THRESHOLD times is written in lower, upper and title case, each
followed by every number of up to DIGITS digits and by each special character.

Fetching and decompressing the dump is left to other tools.

EXAMPLES:
    # Stream the German Wikipedia straight into a dictionary
    curl -s https://dumps.wikimedia.org/dewiki/latest/dewiki-latest-pages-articles.xml.bz2 \
        | bzcat | names-dict -o names.txt

    # Only names seen at least 50 times, two digits, '!' only
    names-dict -i dewiki.xml -t 50 -d 2 -s '!'

    # One record per line instead of XML
    names-dict -i records.txt -f lines
"#
)]
pub struct Args {
    /// Input file (default: stdin)
    #[arg(short, long, value_name = "PATH", env = "NAMES_DICT_INPUT")]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "PATH", env = "NAMES_DICT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// How the input is split into records
    #[arg(short, long, value_enum, default_value_t = InputFormat::Xml, env = "NAMES_DICT_FORMAT")]
    pub format: InputFormat,

    /// Input encoding label, e.g. utf-8 or latin1 (default: detect)
    #[arg(long, value_name = "LABEL", env = "NAMES_DICT_ENCODING")]
    pub encoding: Option<String>,

    /// Minimum number of occurrences before a name is emitted
    #[arg(short, long, value_name = "N", default_value_t = 1, env = "NAMES_DICT_THRESHOLD")]
    pub threshold: u64,

    /// Append up to N digits after the name
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_MAX_DIGIT_WIDTH, env = "NAMES_DICT_DIGITS")]
    pub digits: u32,

    /// Append special characters from this set
    #[arg(
        short,
        long,
        value_name = "CHARS",
        default_value = DEFAULT_SPECIAL_CHARACTERS,
        env = "NAMES_DICT_SPECIAL_CHARS"
    )]
    pub special_chars: String,

    /// Biography template to read names from
    #[arg(long, value_name = "NAME", default_value = DEFAULT_TEMPLATE, env = "NAMES_DICT_TEMPLATE")]
    pub template: String,

    /// Number of names buffered between scanner and generator
    #[arg(long, value_name = "N", default_value_t = 100, env = "NAMES_DICT_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Lowercase names before counting so "Otto" and "otto" are one name
    #[arg(long, default_value_t = false, env = "NAMES_DICT_FOLD_CASE")]
    pub fold_case: bool,

    /// Output buffer size (e.g. "64KB", "1MB")
    #[arg(long, value_name = "SIZE", default_value = "1MB", env = "NAMES_DICT_BUFFER_SIZE")]
    pub buffer_size: String,

    /// Quiet mode - no banner, progress or summary
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Verbose mode - detailed logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Show the configuration and the variant count per name, write nothing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

/// How the input stream is split into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// MediaWiki XML export: one record per <text> element
    Xml,
    /// One record per line
    Lines,
}

impl Args {
    /// Parse buffer size string to bytes
    pub fn parse_buffer_size(&self) -> anyhow::Result<usize> {
        parse_size(&self.buffer_size)
    }
}

/// Parse human-readable size string to bytes
fn parse_size(size_str: &str) -> anyhow::Result<usize> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(num) = size_str.strip_suffix("GB") {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("MB") {
        (num, 1024 * 1024)
    } else if let Some(num) = size_str.strip_suffix("KB") {
        (num, 1024)
    } else if let Some(num) = size_str.strip_suffix('B') {
        (num, 1)
    } else {
        (size_str.as_str(), 1)
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid size format: '{}'", size_str))?;

    if num == 0 {
        anyhow::bail!("Buffer size must be greater than zero");
    }

    Ok(num * multiplier)
}
