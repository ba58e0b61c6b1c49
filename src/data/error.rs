//! Ingestion error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading one archive into a raw table.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a readable zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no entry ending in '{extension}' inside the archive")]
    EntryNotFound { extension: String },

    #[error("entry '{entry}' is not valid tabular text: {source}")]
    Csv {
        entry: String,
        #[source]
        source: csv::Error,
    },

    #[error("entry '{entry}' is malformed: {reason}")]
    Shape { entry: String, reason: String },
}

/// Failure while building the merged dataset. Any of these aborts the whole load.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Nothing matched discovery; there is no dataset to query.
    #[error("no source archives found")]
    NoSources,

    /// One archive could not be extracted or parsed. Names the offending file.
    #[error("malformed source {}: {source}", path.display())]
    MalformedSource {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("invalid source pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
