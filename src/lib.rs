//! # names-dict
//!
//! Password dictionary generator for penetration testing, built from the
//! given names found in Wikipedia biographies.
//!
//! ## How it works
//!
//! - **Extraction**: every `{{Personendaten|NAME=Surname, Given names}}`
//!   template yields the first given name
//! - **Frequency filter**: a name is emitted once it has been seen
//!   `threshold` times
//! - **Expansion**: each emitted name becomes lower/UPPER/Title case, times an
//!   optional number of up to `digits` digits, times an optional special
//!   character
//! - **Streaming**: scanning and writing run on separate threads joined by a
//!   bounded queue; nothing but the name histogram is kept in memory
//!
//! ## Usage
//!
//! ```bash
//! bzcat dewiki-latest-pages-articles.xml.bz2 | names-dict -t 10 -o names.txt
//! ```
//!
//! ## Example
//!
//! ```rust
//! use names_dict::pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     threshold: 2,
//!     max_digit_width: 0,
//!     special_characters: String::new(),
//!     ..PipelineConfig::default()
//! };
//!
//! let records = vec![
//!     Ok("{{Personendaten|NAME=Schmidt, Otto|NAME=Müller, Otto}}".to_string()),
//! ];
//!
//! let mut out = Vec::new();
//! let pipeline = Pipeline::new(config).unwrap();
//! pipeline.run(records, &mut out).unwrap();
//! assert_eq!(out, b"otto\nOTTO\nOtto\n");
//! ```

pub mod cli;
pub mod error;
pub mod expand;
pub mod extract;
pub mod histogram;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;

pub use cli::Args;
pub use error::{NamesError, SplitError};
pub use expand::VariantExpander;
pub use extract::{split_name_field, NameExtractor};
pub use histogram::Histogram;
pub use pipeline::{Pipeline, PipelineConfig};
