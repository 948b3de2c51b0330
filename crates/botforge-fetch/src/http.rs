use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};

use crate::error::{Error, Result};

/// Boxed body stream; items are chunks or the I/O error that ended them.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// An opened download: total length when the source advertises one, and
/// the body as a stream of chunks.
pub struct Download {
    pub total: Option<u64>,
    pub stream: ByteStream,
}

/// Asynchronous HTTP client abstraction.
///
/// The single `get` carries both the content length and the body; the
/// storage endpoints serve the length on the GET response itself, so a
/// separate HEAD round trip buys nothing.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Open a streaming GET. Non-2xx statuses are mapped to
    /// [`Error::Status`], transport failures to [`Error::Network`].
    async fn get(&self, url: &str) -> Result<Download>;
}

/// Production [`HttpClient`] backed by reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Download> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let total = response.content_length();
        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Download {
            total,
            stream: Box::pin(stream),
        })
    }
}
