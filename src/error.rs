//! Fatal error conditions surfaced to callers of the pipeline.
//!
//! Missing files and missing columns are never errors; they degrade to empty
//! tables and documented defaults. What remains here is input the pipeline
//! cannot make sense of at all.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed CSV in {path:?}: {source}")]
    MalformedCsv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to decode {path:?} as {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },
    #[error("Invalid configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Column '{column}' has {actual} value(s) but the table has {expected} row(s)")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
