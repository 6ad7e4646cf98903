//! # wp-remote-images
//!
//! Content source for static-site builds that mirrors the images of a WordPress
//! gallery field into a local directory and registers each image in a content graph.
//!
//! ## Design Philosophy
//!
//! wp-remote-images is designed to be:
//! - **Idempotent** - Images already on disk are never downloaded again
//! - **Sensible defaults** - Every option has a default matching the stock plugin setup
//! - **Library-first** - No CLI; the site generator embeds it and owns the graph
//! - **Best-effort per image** - A broken image is logged and skipped, never fatal
//!
//! ## Pipeline
//!
//! 1. [`RemoteImageSource::fetch_posts`] pulls the post list from `baseUrl + restBase`
//! 2. [`QueueBuilder`] collects each post's gallery images and drops those already present
//! 3. [`ImageDownloader`] streams the rest to disk with bounded concurrency
//! 4. [`register_images`] adds an [`ImageNode`] per image, referencing its post
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use wp_remote_images::{Config, MemoryStore, RemoteImageSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         base_url: "https://wp.example.com".to_string(),
//!         rest_base: "/wp-json/wp/v2/portfolio".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let source = RemoteImageSource::new(config, store.clone())?;
//!
//!     // Subscribe to progress events
//!     let mut events = source.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = source.load().await?;
//!     println!("{} images, {} downloaded", summary.images, summary.downloaded);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Bounded-concurrency image downloads
pub mod downloader;
/// Error types
pub mod error;
/// Download queue construction
pub mod queue;
/// Image node registration
pub mod registrar;
/// Load orchestration
pub mod source;
/// Content graph store interface
pub mod store;
/// Core types and events
pub mod types;
/// Filename and path helpers
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use downloader::ImageDownloader;
pub use error::{Error, Result};
pub use queue::{ImageQueue, QueueBuilder};
pub use registrar::register_images;
pub use source::RemoteImageSource;
pub use store::{ContentStore, MemoryStore, NodeCollection};
pub use types::{
    DownloadSummary, Event, GalleryImage, ImageNode, ImageTask, LoadSummary, Post, PostId,
    Reference,
};
