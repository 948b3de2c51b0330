use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to stage temporary file: {0}")]
    Stage(#[source] io::Error),

    /// I/O failure mid-copy. The staged temp file is removed; the
    /// destination is never touched.
    #[error("transfer failed: {0}")]
    Transfer(#[source] io::Error),

    #[error("failed to commit '{path}': {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
