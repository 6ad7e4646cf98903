//! Post list fixtures and mock server helpers

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::config::REST_BASE;

/// Minimal JPEG-ish payload served for every image
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-body\xFF\xD9";

/// One gallery entry the way the ACF REST integration renders it
pub fn gallery_entry(medium_large_url: &str) -> Value {
    json!({
        "ID": 100,
        "url": medium_large_url,
        "sizes": {
            "thumbnail": "https://cdn.example.com/thumb-150x150.jpg",
            "thumbnail-width": 150,
            "thumbnail-height": 150,
            "medium_large": medium_large_url,
            "medium_large-width": 768,
            "medium_large-height": 512
        }
    })
}

/// A post with the given gallery image URLs
pub fn post(id: i64, urls: &[String]) -> Value {
    let gallery: Vec<Value> = urls.iter().map(|u| gallery_entry(u)).collect();
    json!({
        "id": id,
        "slug": format!("project-{id}"),
        "title": { "rendered": format!("Project {id}") },
        "acf": { "gallery": gallery }
    })
}

/// Serve `posts` on the REST route, expecting exactly one request
pub async fn mount_posts(server: &MockServer, posts: Value) {
    Mock::given(method("GET"))
        .and(path(REST_BASE))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts))
        .expect(1)
        .mount(server)
        .await;
}

/// Serve [`IMAGE_BYTES`] at `image_path`, expecting `hits` requests
pub async fn mount_image(server: &MockServer, image_path: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "image/jpeg")
                .set_body_bytes(IMAGE_BYTES.to_vec()),
        )
        .expect(hits)
        .mount(server)
        .await;
}

/// Absolute URL of `image_path` on `server`
pub fn image_url(server: &MockServer, image_path: &str) -> String {
    format!("{}{}", server.uri(), image_path)
}
