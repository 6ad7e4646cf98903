//! Configuration types for wp-remote-images
//!
//! Keys are camelCase so a plugin option object from a site config file can be
//! deserialized as-is. Every field has a default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Main configuration for [`RemoteImageSource`](crate::RemoteImageSource)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// WordPress site root (default: "https://hub.magnet.co/streetattack")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// REST route appended verbatim to `base_url` (default: "/wp-json/wp/v2/magnetic_portfolio")
    #[serde(default = "default_rest_base")]
    pub rest_base: String,

    /// Image directory, relative to `working_dir` (default: "src/assets/images")
    #[serde(default = "default_image_directory")]
    pub image_directory: PathBuf,

    /// Key in each gallery entry's `sizes` map to download (default: "medium_large")
    #[serde(default = "default_size_to_download")]
    pub size_to_download: String,

    /// Content type name the image nodes are registered under
    #[serde(default = "default_type_name")]
    pub type_name: String,

    /// Content type name of the owning posts, used for the back-reference
    #[serde(default = "default_belongs_to_type_name")]
    pub belongs_to_type_name: String,

    /// Field name of the back-reference on each image node (default: "magnetic_portfolio")
    #[serde(default = "default_parent_field")]
    pub parent_field: String,

    /// Base for `image_directory` (None = process working directory)
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Optional regex applied to derived filenames; the first match is replaced with `$1$2`
    #[serde(default)]
    pub filename_pattern: Option<String>,

    /// Concurrent image downloads per post (None = `max(2, cpus) * 2`)
    #[serde(default)]
    pub download_concurrency: Option<usize>,

    /// HTTP timeout in seconds (default: 30): bounds connecting and the post-list
    /// request, and for images the wait on headers and on each body chunk
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Also accept plain `http://` image URLs (default: false)
    ///
    /// Useful against a local WordPress instance; production galleries should be HTTPS.
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rest_base: default_rest_base(),
            image_directory: default_image_directory(),
            size_to_download: default_size_to_download(),
            type_name: default_type_name(),
            belongs_to_type_name: default_belongs_to_type_name(),
            parent_field: default_parent_field(),
            working_dir: None,
            filename_pattern: None,
            download_concurrency: None,
            request_timeout: default_request_timeout(),
            allow_http: false,
        }
    }
}

impl Config {
    /// Parse a JSON option object and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Full URL of the post list endpoint
    ///
    /// Plain concatenation, so `rest_base` must carry its own leading slash.
    pub fn posts_url(&self) -> String {
        format!("{}{}", self.base_url, self.rest_base)
    }

    /// Number of image downloads allowed in flight at once
    pub fn download_concurrency(&self) -> usize {
        match self.download_concurrency {
            Some(n) => n.max(1),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                cpus.max(2) * 2
            }
        }
    }

    /// Check that the configuration can drive a load
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base URL: {}", e), "baseUrl"))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(
                "base URL must be an absolute http(s) URL",
                "baseUrl",
            ));
        }

        if self.image_directory.as_os_str().is_empty() {
            return Err(Error::config(
                "image directory must not be empty",
                "imageDirectory",
            ));
        }

        let required = [
            (&self.size_to_download, "sizeToDownload"),
            (&self.type_name, "typeName"),
            (&self.belongs_to_type_name, "belongsToTypeName"),
            (&self.parent_field, "parentField"),
        ];
        for (value, key) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} must not be empty", key), key));
            }
        }

        if let Some(pattern) = &self.filename_pattern {
            regex::Regex::new(pattern)?;
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://hub.magnet.co/streetattack".to_string()
}

fn default_rest_base() -> String {
    "/wp-json/wp/v2/magnetic_portfolio".to_string()
}

fn default_image_directory() -> PathBuf {
    PathBuf::from("src/assets/images")
}

fn default_size_to_download() -> String {
    "medium_large".to_string()
}

fn default_type_name() -> String {
    "WordPressPortfolioImage".to_string()
}

fn default_belongs_to_type_name() -> String {
    "WordPressMagneticPortfolio".to_string()
}

fn default_parent_field() -> String {
    "magnetic_portfolio".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
