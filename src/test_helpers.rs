//! Shared test fixtures: a small dataset export and a site rooted in a temp dir.

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::Blog;

/// One author, a "hello-world" post with two paragraphs, a post without a
/// slug, and three comments of which only one is approved.
pub fn sample_documents() -> Vec<Value> {
    vec![
        json!({ "_id": "author-1", "_type": "author", "name": "Ada Lovelace",
                "image": { "_type": "image", "asset": { "_ref": "image-ada-100x100-jpg" } } }),
        json!({ "_id": "post-1", "_type": "post", "_createdAt": "2022-03-01T10:30:00Z",
                "title": "Hello World", "description": "First post",
                "slug": { "_type": "slug", "current": "hello-world" },
                "mainImage": { "_type": "image", "asset": { "_ref": "image-hero-1600x900-png" } },
                "author": { "_ref": "author-1", "_type": "reference" },
                "body": [
                    { "_type": "block", "_key": "b1", "style": "normal", "markDefs": [],
                      "children": [{ "_type": "span", "text": "First paragraph.", "marks": [] }] },
                    { "_type": "block", "_key": "b2", "style": "normal", "markDefs": [],
                      "children": [{ "_type": "span", "text": "Second paragraph.", "marks": [] }] }
                ] }),
        json!({ "_id": "post-2", "_type": "post", "_createdAt": "2022-03-02T10:30:00Z",
                "title": "Draft without slug", "author": { "_ref": "author-1" } }),
        json!({ "_id": "c-1", "_type": "comment", "name": "Bob", "email": "bob@example.com",
                "comment": "Nice!", "approved": true, "post": { "_ref": "post-1" } }),
        json!({ "_id": "c-2", "_type": "comment", "name": "Spam", "email": "spam@example.com",
                "comment": "Buy now", "approved": false, "post": { "_ref": "post-1" } }),
        json!({ "_id": "c-3", "_type": "comment", "name": "Eve", "comment": "Pending",
                "post": { "_ref": "post-1" } }),
    ]
}

/// A blog rooted in a fresh temp dir with a test project configured
pub fn temp_blog() -> (TempDir, Blog) {
    let tmp = TempDir::new().unwrap();
    let mut config = SiteConfig::default();
    config.title = "Test Blog".to_string();
    config.sanity.project_id = "p1".to_string();
    config.sanity.dataset = "production".to_string();
    let blog = Blog::with_config(tmp.path(), config);
    (tmp, blog)
}
