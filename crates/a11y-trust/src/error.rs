//! Error types for loading and validating the trusted identity.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors produced while loading, parsing, or validating a trusted identity.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// RON parse error with a concrete line/column location.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
    },
    #[error("{field}: {message}")]
    /// A field parsed but holds a value the policy cannot use.
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
            } => match path {
                Some(p) => format!(
                    "Identity parse error at {}:{}:{}\n{}",
                    p.display(),
                    line,
                    col,
                    message
                ),
                None => format!(
                    "Identity parse error at line {}, column {}\n{}",
                    line, col, message
                ),
            },
            Self::Validation {
                path,
                field,
                message,
            } => match path {
                Some(p) => format!(
                    "Identity validation error at {} ({})\n{}",
                    p.display(),
                    field,
                    message
                ),
                None => format!("Identity validation error ({})\n{}", field, message),
            },
        }
    }

    /// Attach a path to errors that were produced without one.
    pub(crate) fn with_path(self, at: PathBuf) -> Self {
        match self {
            Self::Read { path: None, message } => Self::Read {
                path: Some(at),
                message,
            },
            Self::Parse {
                path: None,
                line,
                col,
                message,
            } => Self::Parse {
                path: Some(at),
                line,
                col,
                message,
            },
            Self::Validation {
                path: None,
                field,
                message,
            } => Self::Validation {
                path: Some(at),
                field,
                message,
            },
            other => other,
        }
    }
}
