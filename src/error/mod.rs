//! Error handling for the shelter outcome analysis.

pub mod util;

use std::io;
use std::path::PathBuf;

/// Errors raised while loading, joining or testing shelter records
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error opening, reading or writing a file
    #[error("IO error: {context}{}", path_suffix(.path))]
    Io {
        context: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<io::Error>,
    },

    /// Error from the CSV reader or writer
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing the report or reading a JSON config
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error downloading a dataset
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid analysis configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required column is absent from a source table header
    #[error("Missing column '{column}' in {table} table")]
    MissingColumn { table: &'static str, column: String },

    /// A statistical test does not have enough data to be meaningful
    #[error("Insufficient sample: {0}")]
    InsufficientSample(String),

    /// Input that cannot be interpreted at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Create an IO error with a message and no underlying source
    pub fn io_error(context: impl Into<String>) -> Self {
        Self::Io {
            context: context.into(),
            path: None,
            source: None,
        }
    }

    /// Create an IO error wrapping an `io::Error`
    pub fn io_error_with_source(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: None,
            source: Some(source),
        }
    }

    /// Attach a path to an IO error; other variants are returned unchanged
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Io {
                context, source, ..
            } => Self::Io {
                context,
                path: Some(path.into()),
                source,
            },
            other => other,
        }
    }

    /// Create an insufficient-sample error
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientSample(msg.into())
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::io_error_with_source(error.to_string(), error)
    }
}

/// Result type for shelter analysis operations
pub type Result<T> = std::result::Result<T, Error>;
