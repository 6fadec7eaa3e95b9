//! Harness error type.

use std::path::PathBuf;

use wasmlibc_core::redirect::RedirectError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {path}: {message}")]
    Fixture { path: PathBuf, message: String },
    #[error("redirection table: {0}")]
    Table(#[from] RedirectError),
    #[error("unknown symbol family '{0}'")]
    UnknownFamily(String),
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
