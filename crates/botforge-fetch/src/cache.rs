//! Flat archive cache: one archive file and one version-tag file.
//!
//! The tag records which release the cached archive came from and is
//! written only after a successful transfer, whole-file and atomically.
//! There is no eviction; invalidation is a fresh fetch with a newer tag
//! or `force`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::http::HttpClient;
use crate::transfer::{Transfer, TransferOptions};

const ARCHIVE_FILE: &str = "templates.zip";
const VERSION_FILE: &str = "templates.version";

/// Handle on the cache directory.
#[derive(Clone, Debug)]
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn archive_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILE)
    }

    pub fn has_archive(&self) -> bool {
        self.archive_path().is_file()
    }

    pub fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Version tag of the cached archive, `None` when nothing is cached.
    pub fn version_tag(&self) -> Option<String> {
        let raw = fs::read_to_string(self.dir.join(VERSION_FILE)).ok()?;
        let tag = raw.trim();
        if tag.is_empty() {
            None
        } else {
            Some(tag.to_string())
        }
    }

    /// Persist the tag with a whole-file temp-and-rename write so a
    /// crashed process can never leave a half-written record.
    pub fn save_version_tag(&self, tag: &str) -> io::Result<()> {
        self.ensure_dir()?;
        let mut staging = tempfile::NamedTempFile::new_in(&self.dir)?;
        staging.write_all(tag.as_bytes())?;
        staging
            .persist(self.dir.join(VERSION_FILE))
            .map_err(|e| e.error)?;
        Ok(())
    }

    /// Whether a fetch is required for `remote_tag`.
    pub fn needs_refresh(&self, remote_tag: &str, force: bool) -> bool {
        force || !self.has_archive() || self.version_tag().as_deref() != Some(remote_tag)
    }

    /// Fetch the archive for `remote_tag` unless it is already cached.
    ///
    /// Returns `false` when the cached tag already matches and `force` is
    /// off; in that case no byte is written and no content request is
    /// made. The tag is saved only after the transfer commits.
    pub async fn refresh<C: HttpClient>(
        &self,
        transfer: &Transfer<C>,
        url: &str,
        remote_tag: &str,
        force: bool,
        options: &TransferOptions,
    ) -> Result<bool> {
        if !self.needs_refresh(remote_tag, force) {
            tracing::info!(tag = remote_tag, "archive already cached, skipping transfer");
            return Ok(false);
        }
        self.ensure_dir()?;
        transfer.run(url, &self.archive_path(), options).await?;
        self.save_version_tag(remote_tag)?;
        Ok(true)
    }
}
