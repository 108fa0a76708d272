use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading evaluation queries or writing a report.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A queries file line was not a valid `{id, text}` record.
    #[error("invalid query on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize evaluation report: {0}")]
    Serialize(#[from] serde_json::Error),
}
