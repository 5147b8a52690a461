use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can stop a plotting run. All variants are fatal.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Malformed or missing `param_input`, or a missing / invalid key.
    #[error("config error in {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// An expected input table is absent.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A table has the wrong dimensionality for what is asked of it.
    #[error("{table}: {reason}")]
    Shape { table: String, reason: String },

    /// A token in a numeric table could not be parsed.
    #[error("{}:{line}: '{token}' is not a number", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: u64,
        token: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Plotting or PDF serialization failed.
    #[error("render error: {0}")]
    Render(String),
}

impl PlotError {
    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PlotError::ConfigParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(table: impl Into<String>, reason: impl Into<String>) -> Self {
        PlotError::Shape {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O failure on `path`, singling out "not found".
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PlotError::FileNotFound(path)
        } else {
            PlotError::Io { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
