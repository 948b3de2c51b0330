//! Streaming HTTP transfer with progress instrumentation and a flat
//! archive cache.
//!
//! # Architecture
//!
//! - [`http`] - HTTP client abstraction (reqwest behind a trait)
//! - [`transfer`] - single-pass chunked copy with temp-file staging
//! - [`progress`] - producer/consumer progress events and the reporter
//! - [`cache`] - one archive file plus one version tag, refreshed on demand
//!
//! The transfer is mechanism-only: no retries, no timeouts, no policy.
//! Callers that need a deadline wrap the whole call; callers that need
//! retries loop. Progress delivery is best-effort one-way messaging and
//! can never fail a transfer.

pub use cache::ArchiveCache;
pub use error::{Error, Result};
pub use http::{ByteStream, Download, HttpClient, ReqwestClient};
pub use progress::{
    CancelHandle, ProgressEvent, ProgressReporter, ProgressSink, ReporterOutcome, progress_channel,
};
pub use transfer::{Transfer, TransferOptions, TransferReport};

pub mod cache;
mod error;
pub mod http;
pub mod progress;
pub mod transfer;
