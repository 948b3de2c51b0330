use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("entry not found: '{path}'")]
    NotFound { path: String },

    #[error("backing store unavailable: {detail}")]
    Unavailable { detail: String },

    /// Content fetch failed after the metadata fetch succeeded. Kept apart
    /// from [`Error::NotFound`] so callers can tell "path does not exist"
    /// from "path exists but its content could not be fetched".
    #[error("content fetch failed for '{path}': {detail}")]
    ContentFetch { path: String, detail: String },

    #[error("malformed storage metadata: {detail}")]
    Protocol { detail: String, payload: String },

    #[error("no template archive present, fetch one first")]
    NoArchive,

    #[error("'{path}' is a directory")]
    IsDirectory { path: String },

    #[error("'{path}' is not a directory")]
    NotDirectory { path: String },

    #[error("archive is corrupted")]
    Corrupted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
