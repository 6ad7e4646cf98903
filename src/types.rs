//! Core types and events for wp-remote-images

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

/// WordPress post identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl PostId {
    /// Create a new PostId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for PostId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<PostId> for i64 {
    fn from(id: PostId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A post as returned by the WordPress REST API
///
/// Only the fields this crate reads are modelled; everything else is ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Post {
    /// Post ID
    pub id: PostId,

    /// Advanced Custom Fields payload; ACF sends `false` or `[]` when a post has no values
    #[serde(default, deserialize_with = "deserialize_acf")]
    pub acf: Acf,
}

impl Post {
    /// Gallery entries of this post
    pub fn gallery(&self) -> &[GalleryImage] {
        &self.acf.gallery
    }
}

/// Advanced Custom Fields attached to a post
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Acf {
    /// Gallery field; ACF sends `false` instead of `[]` when it is empty
    #[serde(default, deserialize_with = "deserialize_gallery")]
    pub gallery: Vec<GalleryImage>,
}

/// One image of a gallery field, available in several named sizes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Size name to value. Most values are URLs, but WordPress stores the
    /// `<size>-width` / `<size>-height` integers in the same map.
    #[serde(default)]
    pub sizes: HashMap<String, serde_json::Value>,
}

impl GalleryImage {
    /// URL stored under `size`, if present and a string
    pub fn size_url(&self, size: &str) -> Option<&str> {
        self.sizes.get(size).and_then(|v| v.as_str())
    }
}

fn deserialize_acf<'de, D>(deserializer: D) -> Result<Acf, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(value @ serde_json::Value::Object(_)) => {
            Acf::deserialize(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(Acf::default()),
    }
}

/// Decodes each gallery entry on its own so one malformed entry only drops itself
fn deserialize_gallery<'de, D>(deserializer: D) -> Result<Vec<GalleryImage>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Array(entries)) => entries,
        _ => return Ok(Vec::new()),
    };

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<GalleryImage>(entry) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed gallery entry");
                None
            }
        })
        .collect())
}

/// An image scheduled for processing within one post's batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageTask {
    /// Store-derived uid of `filename`; unique within a batch
    pub id: String,
    /// Bare local filename
    pub filename: String,
    /// Remote URL
    pub url: String,
    /// Absolute local destination
    pub filepath: PathBuf,
}

/// Typed link to another node in the content graph
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Target content type name
    pub type_name: String,
    /// Target node id
    pub id: String,
}

/// Content graph node describing one local image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageNode {
    /// Local image path
    pub image: PathBuf,
    /// Name of the back-reference field (e.g. "magnetic_portfolio")
    pub parent_field: String,
    /// Reference to the owning post
    pub parent: Reference,
}

/// Outcome counts of one download batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Tasks handed to the downloader
    pub total: usize,
    /// Tasks written to disk
    pub downloaded: usize,
    /// Tasks found on disk at download time
    pub skipped: usize,
    /// Tasks whose download failed
    pub failed: usize,
}

/// Outcome counts of a full load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Posts processed
    pub posts: usize,
    /// Unique images found across all galleries
    pub images: usize,
    /// Images already present before downloading
    pub existing: usize,
    /// Images downloaded
    pub downloaded: usize,
    /// Images that failed to download
    pub failed: usize,
    /// Graph nodes created
    pub nodes: usize,
}

impl LoadSummary {
    /// Add another summary's counts to this one
    pub fn merge(&mut self, other: &LoadSummary) {
        self.posts += other.posts;
        self.images += other.images;
        self.existing += other.existing;
        self.downloaded += other.downloaded;
        self.failed += other.failed;
        self.nodes += other.nodes;
    }
}

/// Event emitted during a load
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Post list fetched from the REST endpoint
    PostsFetched {
        /// Number of posts returned
        count: usize,
    },

    /// Download queue built for a post
    QueueBuilt {
        /// Post ID
        post_id: PostId,
        /// Images already on disk
        existing: usize,
        /// Images queued for download
        to_download: usize,
    },

    /// An image task resolved (downloaded, skipped, or failed)
    ImageProgress {
        /// Post ID
        post_id: PostId,
        /// Local filename of the resolved task
        filename: String,
        /// Tasks resolved so far in this batch
        completed: usize,
        /// Tasks in this batch
        total: usize,
        /// Rounded completion percentage (0 to 100)
        percent: u8,
    },

    /// An image download failed; the batch continues
    ImageFailed {
        /// Post ID
        post_id: PostId,
        /// Remote URL
        url: String,
        /// Error message
        error: String,
    },

    /// All images of a post downloaded and registered
    PostProcessed {
        /// Post ID
        post_id: PostId,
        /// Unique images in the gallery
        images: usize,
        /// Nodes created
        nodes: usize,
    },

    /// Load finished
    LoadComplete {
        /// Totals across all posts
        summary: LoadSummary,
    },
}
