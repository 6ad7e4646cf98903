//! Test configuration helpers for creating sources against a mock WordPress server

use std::sync::Arc;
use tempfile::TempDir;
use wp_remote_images::{Config, MemoryStore, RemoteImageSource};
use wiremock::MockServer;

/// REST route the mock server answers on
pub const REST_BASE: &str = "/wp-json/wp/v2/magnetic_portfolio";

/// Image directory used by every test, relative to the temp working dir
pub const IMAGE_DIR: &str = "src/assets/images";

/// A source wired to `server`, writing into a fresh temp directory
pub struct TestSource {
    /// Source under test
    pub source: RemoteImageSource,
    /// Graph the source registers nodes in
    pub store: Arc<MemoryStore>,
    /// Working directory; must be kept alive for the duration of the test
    pub temp_dir: TempDir,
}

impl TestSource {
    /// Absolute path of the image directory
    pub fn image_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(IMAGE_DIR)
    }
}

/// Config pointing at `server`, accepting the mock server's plain-HTTP image URLs
pub fn test_config(server: &MockServer, temp_dir: &TempDir) -> Config {
    Config {
        base_url: server.uri(),
        rest_base: REST_BASE.to_string(),
        image_directory: IMAGE_DIR.into(),
        working_dir: Some(temp_dir.path().to_path_buf()),
        download_concurrency: Some(4),
        allow_http: true,
        ..Default::default()
    }
}

/// Create a [`TestSource`] with the default test config
pub fn create_test_source(server: &MockServer) -> TestSource {
    create_test_source_with(server, |_| {})
}

/// Create a [`TestSource`], letting the caller adjust the config first
pub fn create_test_source_with(server: &MockServer, adjust: impl FnOnce(&mut Config)) -> TestSource {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = test_config(server, &temp_dir);
    adjust(&mut config);

    let store = Arc::new(MemoryStore::new());
    let source = RemoteImageSource::new(config, store.clone()).expect("Failed to create source");

    TestSource {
        source,
        store,
        temp_dir,
    }
}
