//! Bounded-concurrency image downloader
//!
//! Downloads one post's pending images in parallel, at most `concurrency` at a time.
//! A failed image never fails the batch: the error is logged, reported as
//! [`Event::ImageFailed`], and any partially written file is removed.

use crate::error::{Error, Result};
use crate::types::{DownloadSummary, Event, ImageTask, PostId};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// User agent sent with every request
const USER_AGENT: &str = concat!("wp-remote-images/", env!("CARGO_PKG_VERSION"));

/// Idle timeout used until [`ImageDownloader::with_idle_timeout`] overrides it
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the post fetch and the image downloads
///
/// Only connecting is bounded here; image body reads are bounded per chunk by
/// [`ImageDownloader`].
pub fn build_client(connect_timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::Network)
}

/// How a single task resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Downloaded,
    Skipped,
    Failed,
}

/// Downloads image tasks to their resolved file paths
#[derive(Clone)]
pub struct ImageDownloader {
    client: reqwest::Client,
    concurrency: usize,
    idle_timeout: Duration,
    event_tx: broadcast::Sender<Event>,
}

impl ImageDownloader {
    /// Create a downloader allowing `concurrency` requests in flight (minimum 1)
    pub fn new(
        client: reqwest::Client,
        concurrency: usize,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            event_tx,
        }
    }

    /// Fail a download when the response headers or the next body chunk take longer
    /// than `timeout`. The download as a whole may take any time.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Maximum number of concurrent downloads
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Download every task, returning once all of them have resolved
    ///
    /// Each task is re-checked for existence right before its request and skipped if
    /// the file appeared in the meantime. Completion order is unspecified. After every
    /// resolved task an [`Event::ImageProgress`] is emitted; the last one of a
    /// non-empty batch reports 100%.
    pub async fn download_all(&self, post_id: PostId, tasks: &[ImageTask]) -> DownloadSummary {
        let total = tasks.len();
        if total == 0 {
            return DownloadSummary::default();
        }

        let completed = AtomicUsize::new(0);
        let completed = &completed;

        let outcomes: Vec<Outcome> = stream::iter(tasks)
            .map(|task| async move {
                let outcome = self.resolve_task(post_id, task).await;

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                let percent = percent_complete(done, total);
                info!(
                    post_id = post_id.0,
                    completed = done,
                    total,
                    "{}% – Downloaded {}",
                    percent,
                    task.filename
                );
                self.event_tx
                    .send(Event::ImageProgress {
                        post_id,
                        filename: task.filename.clone(),
                        completed: done,
                        total,
                        percent,
                    })
                    .ok();

                outcome
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let summary = DownloadSummary {
            total,
            downloaded: outcomes.iter().filter(|o| **o == Outcome::Downloaded).count(),
            skipped: outcomes.iter().filter(|o| **o == Outcome::Skipped).count(),
            failed: outcomes.iter().filter(|o| **o == Outcome::Failed).count(),
        };

        info!(
            post_id = post_id.0,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "{} images downloaded",
            total
        );

        summary
    }

    async fn resolve_task(&self, post_id: PostId, task: &ImageTask) -> Outcome {
        if task.filepath.exists() {
            debug!(path = %task.filepath.display(), "image appeared since queueing, skipping");
            return Outcome::Skipped;
        }

        match self.download(&task.url, &task.filepath).await {
            Ok(bytes) => {
                debug!(url = %task.url, bytes, "image downloaded");
                Outcome::Downloaded
            }
            Err(e) => {
                warn!(post_id = post_id.0, url = %task.url, error = %e, "image download failed");
                self.event_tx
                    .send(Event::ImageFailed {
                        post_id,
                        url: task.url.clone(),
                        error: e.to_string(),
                    })
                    .ok();
                Outcome::Failed
            }
        }
    }

    /// Stream `url` into `dest`, returning the number of bytes written
    ///
    /// On any failure the destination is removed so no truncated image is left behind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on transport failures, [`Error::Timeout`] when the
    /// server stalls, [`Error::Http`] on a non-success status, and [`Error::Io`] if the
    /// file cannot be written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let result = self.fetch_to_file(url, dest).await;

        if result.is_err() {
            match tokio::fs::remove_file(dest).await {
                Ok(()) => debug!(path = %dest.display(), "removed partial download"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %dest.display(), error = %e, "failed to remove partial download")
                }
            }
        }

        result
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.within_idle_timeout(url, self.client.get(url).send()).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        while let Some(chunk) = self.within_idle_timeout(url, response.chunk()).await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn within_idle_timeout<T>(
        &self,
        url: &str,
        fut: impl std::future::Future<Output = reqwest::Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.idle_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(Error::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Rounded percentage of `done` out of `total`
fn percent_complete(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 * 100.0) / total as f64).round().min(100.0) as u8
}
