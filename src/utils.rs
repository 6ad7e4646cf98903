//! Filename and path resolution for remote images

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static HTTPS_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https://.*/.*\.(jpg|png|svg|gif|jpeg)($|\?)")
        .expect("static image URL pattern is valid")
});

#[allow(clippy::expect_used)]
static ANY_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://.*/.*\.(jpg|png|svg|gif|jpeg)($|\?)")
        .expect("static image URL pattern is valid")
});

/// Check whether a URL points at a supported image
///
/// The URL must use HTTPS (or plain HTTP when `allow_http` is set) and its path must
/// end in `.jpg`, `.png`, `.svg`, `.gif` or `.jpeg` in any letter case, optionally
/// followed by a query string.
///
/// # Examples
///
/// ```
/// use wp_remote_images::utils::is_image_url;
///
/// assert!(is_image_url("https://cdn.example.com/a/photo.JPG?ver=2", false));
/// assert!(!is_image_url("http://cdn.example.com/a/photo.jpg", false));
/// assert!(!is_image_url("https://cdn.example.com/a/clip.mp4", false));
/// ```
#[must_use]
pub fn is_image_url(url: &str, allow_http: bool) -> bool {
    if allow_http {
        ANY_IMAGE_URL.is_match(url)
    } else {
        HTTPS_IMAGE_URL.is_match(url)
    }
}

/// Derive a bare local filename from a remote URL
///
/// URL-encoded slashes are treated as path separators, then the last path segment is
/// taken and any `#fragment` and `?query` suffix removed. When `pattern` is given,
/// its first match is replaced by the first two capture groups (`$1$2`).
///
/// Never fails: malformed input yields whatever substring survives the steps above.
///
/// # Examples
///
/// ```
/// use wp_remote_images::utils::extract_filename;
///
/// let name = extract_filename("https://cdn.example.com/2020/01/wall-768x512.jpg?ver=3#top", None);
/// assert_eq!(name, "wall-768x512.jpg");
/// ```
#[must_use]
pub fn extract_filename(url: &str, pattern: Option<&Regex>) -> String {
    let decoded = url.replace("%2F", "/").replace("%2f", "/");
    let segment = decoded.rsplit('/').next().unwrap_or_default();

    let segment = match segment.find('#') {
        Some(idx) => &segment[..idx],
        None => segment,
    };
    let segment = match segment.find('?') {
        Some(idx) => &segment[..idx],
        None => segment,
    };

    match pattern {
        Some(re) => re.replace(segment, "${1}${2}").into_owned(),
        None => segment.to_string(),
    }
}

/// Directory images are written to: `working_dir` joined with `image_dir`
#[must_use]
pub fn image_dir_path(working_dir: &Path, image_dir: &Path) -> PathBuf {
    working_dir.join(image_dir)
}

/// Full destination path for `filename`
#[must_use]
pub fn image_path(working_dir: &Path, image_dir: &Path, filename: &str) -> PathBuf {
    image_dir_path(working_dir, image_dir).join(filename)
}

/// Create the image directory (and parents) if it does not exist yet
///
/// Returns the directory path.
pub fn ensure_directory(working_dir: &Path, image_dir: &Path) -> std::io::Result<PathBuf> {
    let dir = image_dir_path(working_dir, image_dir);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "created image directory");
    }
    Ok(dir)
}
