//! Virtual filesystem over two very different backing stores.
//!
//! # Architecture
//!
//! - [`node`] - Filesystem node value types
//! - [`cursor`] - Paged directory cursor
//! - [`remote`] - Artifactory-style storage API adapter
//! - [`archive`] - Cached zip archive adapter
//!
//! Both adapters implement the same [`TreeFs`] capability set
//! (`open`/`list_dir`/`read_dir`/`read_file`), so callers browse a remote
//! repository and a local archive through one contract. Nodes and cursors
//! are built fresh per query; nothing is cached between calls.

pub use archive::ArchiveTree;
pub use cursor::{DirCursor, Page};
pub use error::{Error, Result};
pub use node::{FileNode, Node, NodeKind};
pub use remote::{RawResponse, RemoteTree, ReqwestStorage, StorageClient};

pub mod archive;
pub mod cursor;
mod error;
pub mod node;
pub mod remote;

use async_trait::async_trait;
use bytes::Bytes;

/// A resolved path: either a fully buffered file or a directory cursor.
#[derive(Debug)]
pub enum Opened {
    File(FileNode),
    Dir(DirCursor),
}

/// The capability set shared by every backing store.
///
/// Callers hold a `&dyn TreeFs` and never depend on the concrete backend.
#[async_trait]
pub trait TreeFs: Send + Sync {
    /// Resolve `path` to a file with content or a directory cursor.
    async fn open(&self, path: &str) -> Result<Opened>;

    /// List every child of a directory.
    async fn list_dir(&self, path: &str) -> Result<Vec<Node>> {
        match self.open(path).await? {
            Opened::Dir(mut cursor) => Ok(cursor.next(None).entries),
            Opened::File(_) => Err(Error::NotDirectory { path: path.into() }),
        }
    }

    /// Read up to `max` children of a directory (`None` reads everything).
    async fn read_dir(&self, path: &str, max: Option<usize>) -> Result<Page> {
        match self.open(path).await? {
            Opened::Dir(mut cursor) => Ok(cursor.next(max)),
            Opened::File(_) => Err(Error::NotDirectory { path: path.into() }),
        }
    }

    /// Read the full content of a file. Directories are rejected.
    async fn read_file(&self, path: &str) -> Result<Bytes> {
        match self.open(path).await? {
            Opened::File(file) => Ok(file.into_content()),
            Opened::Dir(_) => Err(Error::IsDirectory { path: path.into() }),
        }
    }
}

/// Normalize a caller-supplied path to the relative form both adapters use.
///
/// Strips `.` and empty segments; the repository root is the empty string.
pub(crate) fn clean_path(path: &str) -> String {
    path.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}
