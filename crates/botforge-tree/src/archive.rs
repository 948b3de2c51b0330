//! Adapter exposing a cached template archive through the same tree
//! contract as the remote repository.
//!
//! The archive's top level holds one directory per language and the
//! level below holds one directory per project type; content beneath
//! that is copied verbatim into new projects. A missing archive file is
//! a distinct, recoverable condition so callers can prompt a fetch
//! instead of reporting a generic I/O failure.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use zip::ZipArchive;

use crate::cursor::DirCursor;
use crate::node::{FileNode, Node};
use crate::{Error, Opened, Result, TreeFs, clean_path};

/// Zip-backed tree adapter. Opens the archive fresh on every query.
pub struct ArchiveTree {
    archive_path: PathBuf,
}

impl ArchiveTree {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn is_present(&self) -> bool {
        self.archive_path.is_file()
    }

    fn open_archive(&self) -> Result<ZipArchive<File>> {
        let file = File::open(&self.archive_path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NoArchive
            } else {
                Error::Io(e)
            }
        })?;
        ZipArchive::new(file).map_err(|_| Error::Corrupted)
    }

    /// Scan the entry table once, collecting the direct children of
    /// `clean` and noting whether `clean` itself names a file or an
    /// explicit directory entry.
    fn scan(archive: &mut ZipArchive<File>, clean: &str) -> Result<Scan> {
        let prefix = if clean.is_empty() {
            String::new()
        } else {
            format!("{clean}/")
        };

        let mut scan = Scan::default();
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index).map_err(|_| Error::Corrupted)?;
            let raw_is_dir = entry.is_dir();
            let name = entry.name().trim_end_matches('/').to_string();
            if name.is_empty() {
                continue;
            }

            if name == clean {
                if raw_is_dir {
                    scan.exact_dir = true;
                } else {
                    scan.exact_file = Some(index);
                }
                continue;
            }

            let Some(rel) = name.strip_prefix(&prefix) else {
                continue;
            };
            match rel.split_once('/') {
                // deeper entry, so the first segment is a directory
                Some((first, _)) => scan.note_child(Node::directory(first)),
                None => {
                    let child = if raw_is_dir {
                        Node::directory(rel)
                    } else {
                        Node::file(rel, entry.size())
                    };
                    scan.note_child(child);
                }
            }
        }
        Ok(scan)
    }

    fn read_entry(archive: &mut ZipArchive<File>, index: usize) -> Result<Bytes> {
        let mut entry = archive.by_index(index).map_err(|_| Error::Corrupted)?;
        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;
        Ok(Bytes::from(content))
    }
}

#[derive(Default)]
struct Scan {
    children: Vec<Node>,
    exact_file: Option<usize>,
    exact_dir: bool,
}

impl Scan {
    /// Record a child, keeping first-seen order. An entry observed first
    /// as a file and later with descendants is upgraded to a directory.
    fn note_child(&mut self, child: Node) {
        match self.children.iter_mut().find(|n| n.name == child.name) {
            Some(existing) => {
                if child.is_dir() && !existing.is_dir() {
                    *existing = child;
                }
            }
            None => self.children.push(child),
        }
    }
}

#[async_trait]
impl TreeFs for ArchiveTree {
    async fn open(&self, path: &str) -> Result<Opened> {
        let clean = clean_path(path);
        let mut archive = self.open_archive()?;
        let scan = Self::scan(&mut archive, &clean)?;

        if !scan.children.is_empty() || scan.exact_dir || clean.is_empty() {
            return Ok(Opened::Dir(DirCursor::new(scan.children)));
        }
        if let Some(index) = scan.exact_file {
            let content = Self::read_entry(&mut archive, index)?;
            let name = clean.rsplit('/').next().unwrap_or(&clean).to_string();
            return Ok(Opened::File(FileNode::new(name, content)));
        }
        Err(Error::NotFound { path: clean })
    }
}
