use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// A shared `Result` type for the CLI.
pub type Result<T> = StdResult<T, Error>;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    /// The trusted identity configuration is invalid.
    #[error(transparent)]
    Identity(#[from] a11y_trust::Error),

    /// A filesystem error.
    #[error("io error at {}: {source}", .path.display())]
    Io {
        /// The relevant path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// A device snapshot could not be parsed.
    #[error("snapshot parse error at {}:{line}:{col}: {message}", .path.display())]
    Snapshot {
        /// The snapshot file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Parser message.
        message: String,
    },
}

impl Error {
    /// Render for the terminal.
    pub fn pretty(&self) -> String {
        match self {
            Self::Identity(e) => e.pretty(),
            other => other.to_string(),
        }
    }
}
