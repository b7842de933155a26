//! Error types
//!
//! `NamesError` covers everything that aborts a run. `SplitError` describes a
//! name field that was skipped; it never aborts anything.

use std::io;
use thiserror::Error;

/// Fatal errors raised by the pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum NamesError {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The record stream could not be read any further.
    #[error("failed to read input records: {0}")]
    Input(#[source] io::Error),

    /// The XML export is not well-formed.
    #[error("malformed XML input: {0}")]
    Xml(#[source] quick_xml::Error),

    /// The output sink rejected a write.
    #[error("failed to write variants: {0}")]
    Output(#[source] io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// Why a `name` field produced no candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("no comma between surname and given names")]
    NoSurnameSeparator,

    #[error("given-name part is empty")]
    EmptyFirstName,
}

pub type Result<T> = std::result::Result<T, NamesError>;
