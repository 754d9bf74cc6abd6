//! Post, Author and Comment models as returned by the content store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::portable_text::Node;

/// A blog post
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,

    /// Creation timestamp
    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,

    /// Post title
    pub title: String,

    /// Short description shown under the title
    #[serde(default)]
    pub description: Option<String>,

    /// URL slug
    pub slug: Slug,

    /// Hero image
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,

    /// Rich-text body
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: Vec<Node>,

    /// Author, joined from the referenced author document
    pub author: Author,

    /// Approved comments only
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Slug string used as the route parameter
    pub fn slug(&self) -> &str {
        &self.slug.current
    }
}

/// Sanity slug object (`{ current }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Post author
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

/// Reader comment attached to a post
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub post: Option<Reference>,
}

/// Image field pointing at an uploaded asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub asset: Reference,
}

/// Reference to another document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Projection returned by the path enumeration query
#[derive(Debug, Clone, Deserialize)]
pub struct PostSlug {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<Slug>,
}

/// Projection used by the index page
#[derive(Debug, Clone, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(rename = "mainImage", default)]
    pub main_image: Option<ImageRef>,
    #[serde(default)]
    pub author: Option<Author>,
}

/// Sanity returns `null` for unset arrays
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
