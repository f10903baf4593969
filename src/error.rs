use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while constructing or installing a logger.
///
/// Failures after construction (a failed write, rename or reopen) are never
/// returned from a logging call; they are reported on stderr and counted in
/// [`Stats`](crate::Stats).
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration was rejected
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Another logger already writes to this path
    #[error("log file already open: {}", .0.display())]
    AlreadyOpen(PathBuf),

    /// Directory creation, open or stat failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A process-wide default logger is already installed
    #[error("default logger already installed")]
    DefaultInstalled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
