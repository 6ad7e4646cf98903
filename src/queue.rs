//! Download queue construction for one post's gallery

use crate::config::Config;
use crate::error::Result;
use crate::store::ContentStore;
use crate::types::{ImageTask, Post};
use crate::utils::{ensure_directory, extract_filename, image_path, is_image_url};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Images found in one post's gallery
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageQueue {
    /// Every unique image in gallery order, downloaded or not
    pub tasks: Vec<ImageTask>,
    /// Subset of `tasks` missing on disk
    pub pending: Vec<ImageTask>,
    /// Number of `tasks` already on disk
    pub existing: usize,
}

impl ImageQueue {
    /// Number of images that need downloading
    pub fn to_download(&self) -> usize {
        self.pending.len()
    }

    /// One-line status logged once the queue is built
    pub fn report(&self) -> String {
        format!(
            "{} images already exists, {} images to download",
            self.existing,
            self.to_download()
        )
    }
}

/// Builds an [`ImageQueue`] from a post
///
/// Construction is sequential and in gallery order, so the same post and the same
/// directory contents always produce the same queue.
pub struct QueueBuilder<'a> {
    store: &'a dyn ContentStore,
    working_dir: &'a Path,
    image_directory: &'a Path,
    size_to_download: &'a str,
    filename_pattern: Option<&'a Regex>,
    allow_http: bool,
}

impl<'a> QueueBuilder<'a> {
    /// Create a builder reading `config` and deriving uids from `store`
    pub fn new(store: &'a dyn ContentStore, working_dir: &'a Path, config: &'a Config) -> Self {
        Self {
            store,
            working_dir,
            image_directory: &config.image_directory,
            size_to_download: &config.size_to_download,
            filename_pattern: None,
            allow_http: config.allow_http,
        }
    }

    /// Rewrite derived filenames with a compiled pattern (see [`extract_filename`])
    pub fn with_filename_pattern(mut self, pattern: Option<&'a Regex>) -> Self {
        self.filename_pattern = pattern;
        self
    }

    /// Scan the post's gallery and split its images into present and pending
    ///
    /// Creates the image directory first if needed. Entries without a URL for the
    /// configured size, or whose URL is not a supported image, are ignored. Of two
    /// entries with the same uid only the first is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the image directory cannot be created.
    pub fn build(&self, post: &Post) -> Result<ImageQueue> {
        ensure_directory(self.working_dir, self.image_directory)?;

        let mut seen = HashSet::new();
        let mut queue = ImageQueue::default();

        for entry in post.gallery() {
            let Some(url) = entry.size_url(self.size_to_download) else {
                continue;
            };
            if !is_image_url(url, self.allow_http) {
                debug!(post_id = post.id.0, url, "skipping unsupported image URL");
                continue;
            }

            let filename = extract_filename(url, self.filename_pattern);
            let id = self.store.make_uid(&filename);
            if !seen.insert(id.clone()) {
                debug!(post_id = post.id.0, filename = %filename, "duplicate image dropped");
                continue;
            }

            let filepath = image_path(self.working_dir, self.image_directory, &filename);
            let task = ImageTask {
                id,
                filename,
                url: url.to_string(),
                filepath,
            };

            if task.filepath.exists() {
                queue.existing += 1;
            } else {
                queue.pending.push(task.clone());
            }
            queue.tasks.push(task);
        }

        info!(post_id = post.id.0, "{}", queue.report());

        Ok(queue)
    }
}
