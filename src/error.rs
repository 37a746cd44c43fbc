use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-file failure. The batch logs it and moves on to the next input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid document JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type InputResult<T> = Result<T, InputError>;
