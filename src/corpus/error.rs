use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading a corpus file.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The corpus file could not be opened or read.
    #[error("failed to read corpus at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line was not a valid document record.
    #[error("invalid document on line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
