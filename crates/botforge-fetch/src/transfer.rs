//! Single-pass streaming copy from a remote source into a local file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::http::{Download, HttpClient, ReqwestClient};

/// Configuration for one transfer.
#[derive(Clone, Default)]
pub struct TransferOptions {
    /// Invoked with a ratio in `[0, 1]` after each chunk, but only once
    /// the total length is known. A source without a content length
    /// transfers silently; "no progress" is a valid terminal state, not
    /// a hang signal.
    pub on_progress: Option<Arc<dyn Fn(f64) + Send + Sync>>,
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ .. }"))
            .finish()
    }
}

impl TransferOptions {
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(f64) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

/// What a finished transfer looked like.
#[derive(Clone, Debug)]
pub struct TransferReport {
    pub bytes: u64,
    pub total: Option<u64>,
    pub destination: PathBuf,
}

/// Streaming transfer: GET the source, stage chunks into a temp file in
/// the destination's directory, rename into place on success.
///
/// Owns no state beyond the client; concurrent transfers to different
/// destinations are fully independent.
pub struct Transfer<C: HttpClient = ReqwestClient> {
    pub(crate) client: C,
}

impl Transfer<ReqwestClient> {
    pub fn new() -> Self {
        Self::with_client(ReqwestClient::new())
    }
}

impl Default for Transfer<ReqwestClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> Transfer<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }

    pub async fn run(
        &self,
        url: &str,
        destination: &Path,
        options: &TransferOptions,
    ) -> Result<TransferReport> {
        let Download { total, mut stream } = self.client.get(url).await?;
        if total.is_none() {
            tracing::warn!(url, "source reports no content length, progress disabled");
        }

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent).await.map_err(Error::Stage)?;

        // Staged in the destination directory so the final rename stays
        // on one filesystem. Dropping the guard on any error path removes
        // the partial file; the destination is never touched until commit.
        let staging = tempfile::Builder::new()
            .prefix(".botforge-")
            .suffix(".partial")
            .tempfile_in(parent)
            .map_err(Error::Stage)?;
        let mut file = tokio::fs::File::from_std(staging.reopen().map_err(Error::Stage)?);

        let mut transferred = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::Transfer)?;
            file.write_all(&chunk).await.map_err(Error::Transfer)?;
            transferred += chunk.len() as u64;

            if let (Some(total), Some(on_progress)) = (total, options.on_progress.as_ref()) {
                if total > 0 {
                    on_progress((transferred as f64 / total as f64).min(1.0));
                }
            }
        }
        file.flush().await.map_err(Error::Transfer)?;
        drop(file);

        staging
            .persist(destination)
            .map_err(|e| Error::Commit {
                path: destination.to_path_buf(),
                source: e.error,
            })?;
        tracing::debug!(url, bytes = transferred, dest = %destination.display(), "transfer committed");

        Ok(TransferReport {
            bytes: transferred,
            total,
            destination: destination.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::stream;
    use tempfile::tempdir;

    use super::*;

    /// Serves a fixed chunk sequence, optionally ending with an error.
    struct ScriptedClient {
        total: Option<u64>,
        chunks: Vec<io::Result<Bytes>>,
    }

    impl ScriptedClient {
        fn ok(total: Option<u64>, chunks: &[&'static [u8]]) -> Self {
            Self {
                total,
                chunks: chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect(),
            }
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn get(&self, _url: &str) -> crate::Result<Download> {
            let chunks: Vec<io::Result<Bytes>> = self
                .chunks
                .iter()
                .map(|c| match c {
                    Ok(b) => Ok(b.clone()),
                    Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
                })
                .collect();
            Ok(Download {
                total: self.total,
                stream: Box::pin(stream::iter(chunks)),
            })
        }
    }

    fn ratio_recorder() -> (Arc<dyn Fn(f64) + Send + Sync>, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: Arc<dyn Fn(f64) + Send + Sync> =
            Arc::new(move |r| sink.lock().unwrap().push(r));
        (cb, seen)
    }

    #[tokio::test]
    async fn known_length_ends_at_ratio_one() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("templates.zip");
        let client = ScriptedClient::ok(Some(10), &[b"01234", b"567", b"89"]);
        let (cb, seen) = ratio_recorder();

        let report = Transfer::with_client(client)
            .run("http://x/t.zip", &dest, &TransferOptions::default().on_progress(cb))
            .await
            .unwrap();

        assert_eq!(report.bytes, 10);
        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 1.0);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "ratios must not regress");
        assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn unknown_length_completes_without_progress() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("templates.zip");
        let client = ScriptedClient::ok(None, &[b"abc", b"def"]);
        let (cb, seen) = ratio_recorder();

        let report = Transfer::with_client(client)
            .run("http://x/t.zip", &dest, &TransferOptions::default().on_progress(cb))
            .await
            .unwrap();

        assert_eq!(report.bytes, 6);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(std::fs::read(&dest).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn mid_copy_error_leaves_no_destination_or_partial() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("templates.zip");
        let client = ScriptedClient {
            total: Some(10),
            chunks: vec![
                Ok(Bytes::from_static(b"01234")),
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            ],
        };

        let err = Transfer::with_client(client)
            .run("http://x/t.zip", &dest, &TransferOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transfer(_)));
        assert!(!dest.exists());
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty(), "staging file must be cleaned up");
    }

    #[tokio::test]
    async fn empty_body_with_zero_length_commits() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("empty.bin");
        let client = ScriptedClient::ok(Some(0), &[]);
        let (cb, seen) = ratio_recorder();

        let report = Transfer::with_client(client)
            .run("http://x/e", &dest, &TransferOptions::default().on_progress(cb))
            .await
            .unwrap();

        assert_eq!(report.bytes, 0);
        assert!(seen.lock().unwrap().is_empty());
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn existing_destination_is_replaced_atomically() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("templates.zip");
        std::fs::write(&dest, b"stale").unwrap();
        let client = ScriptedClient::ok(Some(5), &[b"fresh"]);

        Transfer::with_client(client)
            .run("http://x/t.zip", &dest, &TransferOptions::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }
}
