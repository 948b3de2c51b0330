use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid vendordep manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("vendordep '{name}' not found")]
    NotFound { name: String },

    #[error("file name does not follow the '<name>-v<version>' convention: '{name}'")]
    BadFileName { name: String },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
