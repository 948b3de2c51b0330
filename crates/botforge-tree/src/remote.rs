//! Adapter from an Artifactory-style storage API to the filesystem node
//! model.
//!
//! A path resolves with one metadata GET; a response that enumerates
//! children is a directory, anything else is a file whose content comes
//! from a second GET against the plain content endpoint. Nothing is
//! cached between calls.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use crate::cursor::DirCursor;
use crate::node::{FileNode, Node};
use crate::{Error, Opened, Result, TreeFs, clean_path};

const STORAGE_API_PREFIX: &str = "api/storage/";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of one HTTP GET, the only surface the adapter needs.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn diagnostic(&self) -> String {
        format!(
            "status {}: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        )
    }
}

/// Minimal HTTP client abstraction so tests can substitute a mock.
///
/// Implementations map transport failures (DNS, refused connection) to
/// [`Error::Unavailable`]; non-2xx statuses come back as plain responses
/// for the adapter to classify.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse>;
}

/// Production [`StorageClient`] backed by reqwest.
pub struct ReqwestStorage {
    client: reqwest::Client,
}

impl ReqwestStorage {
    /// Panics when the TLS backend cannot be initialized, like
    /// [`reqwest::Client::new`].
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("storage HTTP client construction");
        Self { client }
    }
}

impl Default for ReqwestStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for ReqwestStorage {
    async fn get(&self, url: &str) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Unavailable {
                detail: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| Error::Unavailable {
            detail: e.to_string(),
        })?;
        Ok(RawResponse { status, body })
    }
}

/// Storage-metadata payload: `children` present means directory.
#[derive(Debug, Deserialize)]
struct StorageMeta {
    #[serde(default)]
    children: Vec<StorageChild>,
    #[serde(default)]
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageChild {
    uri: String,
    #[serde(default)]
    folder: bool,
}

/// Remote tree adapter over one repository base URL.
pub struct RemoteTree<C = ReqwestStorage> {
    base_url: String,
    client: C,
}

impl RemoteTree<ReqwestStorage> {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_client(base_url, ReqwestStorage::new())
    }
}

impl<C: StorageClient> RemoteTree<C> {
    pub fn with_client(base_url: impl AsRef<str>, client: C) -> Self {
        Self {
            base_url: format!("{}/", base_url.as_ref().trim_end_matches('/')),
            client,
        }
    }

    /// Content endpoint URL for a path, usable for direct downloads.
    pub fn content_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, clean_path(path))
    }

    fn metadata_url(&self, clean: &str) -> String {
        format!("{}{}{}", self.base_url, STORAGE_API_PREFIX, clean)
    }

    async fn fetch_metadata(&self, clean: &str) -> Result<StorageMeta> {
        let url = self.metadata_url(clean);
        let response = self.client.get(&url).await?;
        match response.status {
            404 => Err(Error::NotFound { path: clean.into() }),
            _ if !response.is_success() => Err(Error::Unavailable {
                detail: response.diagnostic(),
            }),
            _ => serde_json::from_slice(&response.body).map_err(|e| {
                let payload = String::from_utf8_lossy(&response.body).into_owned();
                tracing::warn!(url = %url, error = %e, payload = %payload, "malformed storage metadata");
                Error::Protocol {
                    detail: e.to_string(),
                    payload,
                }
            }),
        }
    }

    async fn fetch_content(&self, clean: &str) -> Result<Bytes> {
        let url = format!("{}{}", self.base_url, clean);
        let response = self.client.get(&url).await.map_err(|e| match e {
            // The entry exists per metadata, so even transport failures on
            // the content endpoint are reported as content-fetch failures.
            Error::Unavailable { detail } => Error::ContentFetch {
                path: clean.into(),
                detail,
            },
            other => other,
        })?;
        if !response.is_success() {
            return Err(Error::ContentFetch {
                path: clean.into(),
                detail: response.diagnostic(),
            });
        }
        Ok(response.body)
    }

    fn dir_cursor(&self, children: Vec<StorageChild>) -> DirCursor {
        let entries = children
            .into_iter()
            .map(|child| {
                // Child URIs come back absolute ("/wpilib"); callers
                // compose paths from relative names only.
                let name = child.uri.trim_start_matches('/').to_string();
                if child.folder {
                    Node::directory(name)
                } else {
                    Node::file(name, 0)
                }
            })
            .collect();
        DirCursor::new(entries)
    }
}

#[async_trait]
impl<C: StorageClient> TreeFs for RemoteTree<C> {
    async fn open(&self, path: &str) -> Result<Opened> {
        let clean = clean_path(path);
        let meta = self.fetch_metadata(&clean).await?;

        if !meta.children.is_empty() {
            return Ok(Opened::Dir(self.dir_cursor(meta.children)));
        }

        if let Some(size) = meta.size.as_deref() {
            tracing::trace!(path = %clean, size = %size, "storage metadata reports file entry");
        }
        let content = self.fetch_content(&clean).await?;
        let name = clean.rsplit('/').next().unwrap_or(&clean).to_string();
        Ok(Opened::File(FileNode::new(name, content)))
    }
}
