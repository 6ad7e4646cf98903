//! Orchestration of a full load: fetch posts, then queue, download and register
//! each post's images.

use crate::config::Config;
use crate::downloader::{ImageDownloader, build_client};
use crate::error::{Error, Result};
use crate::queue::QueueBuilder;
use crate::registrar::register_images;
use crate::store::{ContentStore, NodeCollection};
use crate::types::{Event, LoadSummary, Post};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Content source that mirrors WordPress gallery images into a local directory
///
/// A load moves through `FetchPosts` and then `ProcessEachPost`, one post at a time.
/// Only the images of a single post are downloaded concurrently.
pub struct RemoteImageSource {
    config: Config,
    store: Arc<dyn ContentStore>,
    working_dir: PathBuf,
    filename_pattern: Option<Regex>,
    client: reqwest::Client,
    downloader: ImageDownloader,
    event_tx: broadcast::Sender<Event>,
}

impl RemoteImageSource {
    /// Create a source for `config`, registering nodes in `store`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::InvalidPattern`] for an invalid
    /// configuration, [`Error::Io`] if the working directory cannot be determined,
    /// and [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Result<Self> {
        config.validate()?;

        let working_dir = match &config.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let filename_pattern = config
            .filename_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        // Buffer of 1000 events so slow subscribers don't miss progress updates
        let (event_tx, _rx) = broadcast::channel(1000);

        let client = build_client(config.request_timeout)?;
        let downloader = ImageDownloader::new(
            client.clone(),
            config.download_concurrency(),
            event_tx.clone(),
        )
        .with_idle_timeout(config.request_timeout);

        Ok(Self {
            config,
            store,
            working_dir,
            filename_pattern,
            client,
            downloader,
            event_tx,
        })
    }

    /// Subscribe to load events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory `image_directory` is resolved against
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run a complete load
    ///
    /// Registers the image content type, fetches the post list once, then processes
    /// every post in order. Per-image download failures are reported through events
    /// and the summary; they do not fail the load.
    ///
    /// # Errors
    ///
    /// Fails if the post list cannot be fetched or decoded, or if the image directory
    /// cannot be created. Posts processed before the failure keep their nodes.
    pub async fn load(&self) -> Result<LoadSummary> {
        let collection = self.store.add_content_type(&self.config.type_name);

        info!("Loading images from {}", self.config.posts_url());
        let posts = self.fetch_posts().await?;

        let mut summary = LoadSummary::default();
        for post in &posts {
            let post_summary = self.process_post(collection.as_ref(), post).await?;
            summary.merge(&post_summary);
        }

        info!(
            posts = summary.posts,
            images = summary.images,
            downloaded = summary.downloaded,
            failed = summary.failed,
            "image load complete"
        );
        self.event_tx.send(Event::LoadComplete { summary }).ok();

        Ok(summary)
    }

    /// Fetch the post list from `base_url + rest_base`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on a non-success status and [`Error::Network`] on
    /// transport failures or when the body is not a JSON array of posts.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let url = self.config.posts_url();
        let response = self
            .client
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url,
            });
        }

        let posts: Vec<Post> = response.json().await?;
        info!(count = posts.len(), "fetched posts");
        self.event_tx
            .send(Event::PostsFetched { count: posts.len() })
            .ok();

        Ok(posts)
    }

    /// Queue, download and register the images of one post
    ///
    /// Returns a summary with `posts == 1`.
    pub async fn process_post(
        &self,
        collection: &dyn NodeCollection,
        post: &Post,
    ) -> Result<LoadSummary> {
        let queue = QueueBuilder::new(self.store.as_ref(), &self.working_dir, &self.config)
            .with_filename_pattern(self.filename_pattern.as_ref())
            .build(post)?;

        self.event_tx
            .send(Event::QueueBuilt {
                post_id: post.id,
                existing: queue.existing,
                to_download: queue.to_download(),
            })
            .ok();

        let downloads = self.downloader.download_all(post.id, &queue.pending).await;

        let nodes = register_images(
            self.store.as_ref(),
            collection,
            post.id,
            &queue.tasks,
            &self.config.belongs_to_type_name,
            &self.config.parent_field,
        );

        self.event_tx
            .send(Event::PostProcessed {
                post_id: post.id,
                images: queue.tasks.len(),
                nodes,
            })
            .ok();

        Ok(LoadSummary {
            posts: 1,
            images: queue.tasks.len(),
            existing: queue.existing + downloads.skipped,
            downloaded: downloads.downloaded,
            failed: downloads.failed,
            nodes,
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer, temp_dir: &TempDir) -> (RemoteImageSource, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = Config {
            base_url: server.uri(),
            rest_base: "/wp-json/wp/v2/portfolio".into(),
            working_dir: Some(temp_dir.path().to_path_buf()),
            allow_http: true,
            ..Default::default()
        };
        let source = RemoteImageSource::new(config, store.clone()).unwrap();
        (source, store)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = Config {
            base_url: "nope".into(),
            ..Default::default()
        };
        let result = RemoteImageSource::new(config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn new_defaults_working_dir_to_cwd() {
        let source =
            RemoteImageSource::new(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(source.working_dir(), std::env::current_dir().unwrap());
    }

    #[tokio::test]
    async fn fetch_posts_decodes_post_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/portfolio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": 1, "acf": { "gallery": false } },
                { "id": 2, "acf": { "gallery": [] } }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (source, _store) = source_for(&server, &temp_dir);

        let posts = source.fetch_posts().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].id.get(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (source, store) = source_for(&server, &temp_dir);

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 503, .. }));
        // The content type is registered before the fetch
        assert_eq!(store.content_types(), vec!["WordPressPortfolioImage".to_string()]);
        assert!(store.nodes("WordPressPortfolioImage").is_empty());
    }

    #[tokio::test]
    async fn malformed_post_list_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (source, _store) = source_for(&server, &temp_dir);

        assert!(matches!(source.load().await, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn empty_post_list_completes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (source, _store) = source_for(&server, &temp_dir);
        let mut events = source.subscribe();

        let summary = source.load().await.unwrap();

        assert_eq!(summary, LoadSummary::default());
        assert!(matches!(
            events.recv().await.unwrap(),
            Event::PostsFetched { count: 0 }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            Event::LoadComplete { .. }
        ));
    }
}
