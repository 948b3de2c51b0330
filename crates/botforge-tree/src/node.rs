use std::time::SystemTime;

use bytes::Bytes;

/// An entry in the virtual filesystem tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub modified: Option<SystemTime>,
}

/// File nodes carry a size; directory nodes carry nothing and never
/// expose content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File { size: u64 },
    Directory,
}

impl Node {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File { size },
            modified: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Directory,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    /// File size in bytes, `None` for directories.
    pub fn size(&self) -> Option<u64> {
        match self.kind {
            NodeKind::File { size } => Some(size),
            NodeKind::Directory => None,
        }
    }
}

/// A file node together with its fully buffered content.
#[derive(Clone, Debug)]
pub struct FileNode {
    node: Node,
    content: Bytes,
}

impl FileNode {
    pub fn new(name: impl Into<String>, content: Bytes) -> Self {
        let node = Node::file(name, content.len() as u64);
        Self { node, content }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}
