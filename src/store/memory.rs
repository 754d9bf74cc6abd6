//! In-memory store backed by a dataset export
//!
//! Answers the same questions as the query API: posts are joined with their
//! author document, and only comments marked approved are attached.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use super::{ContentStore, StoreError};
use crate::content::{Post, PostSlug, PostSummary};

/// Documents held in memory, in export order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Value>,
}

impl MemoryStore {
    /// Build a store from raw documents
    pub fn from_documents(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    /// Load an export file: either a JSON array or NDJSON (`sanity dataset export`)
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::parse(&content)?;
        tracing::debug!("Loaded {} documents from {:?}", store.documents.len(), path);
        Ok(store)
    }

    /// Parse export content
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        let trimmed = content.trim_start();
        let documents = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            trimmed
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str::<Value>)
                .collect::<Result<Vec<Value>, _>>()?
        };
        Ok(Self::from_documents(documents))
    }

    fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.documents
            .iter()
            .filter(move |doc| doc.get("_type").and_then(Value::as_str) == Some(type_name))
    }

    fn by_id(&self, id: &str) -> Option<&Value> {
        self.documents
            .iter()
            .find(|doc| doc.get("_id").and_then(Value::as_str) == Some(id))
    }

    /// `author -> { name, image }`
    fn join_author(&self, post: &Value) -> Value {
        let author = post
            .pointer("/author/_ref")
            .and_then(Value::as_str)
            .and_then(|id| self.by_id(id));

        match author {
            Some(author) => project(author, &["name", "image"]),
            None => Value::Null,
        }
    }

    /// `*[_type == "comment" && post._ref == ^._id && approved == true]`
    fn approved_comments(&self, post_id: &str) -> Vec<Value> {
        self.of_type("comment")
            .filter(|c| c.pointer("/post/_ref").and_then(Value::as_str) == Some(post_id))
            .filter(|c| c.get("approved").and_then(Value::as_bool) == Some(true))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn post_slugs(&self) -> Result<Vec<PostSlug>, StoreError> {
        self.of_type("post")
            .map(|post| -> Result<PostSlug, StoreError> {
                let mut fields = Map::new();
                fields.insert("_id".to_string(), field(post, "_id"));
                let slug = match post.pointer("/slug/current") {
                    Some(current) => serde_json::json!({ "current": current }),
                    None => Value::Null,
                };
                fields.insert("slug".to_string(), slug);
                Ok(serde_json::from_value(Value::Object(fields))?)
            })
            .collect()
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let Some(post) = self
            .of_type("post")
            .find(|post| post.pointer("/slug/current").and_then(Value::as_str) == Some(slug))
        else {
            return Ok(None);
        };

        let mut projected = project(
            post,
            &["_id", "_createdAt", "title", "description", "mainImage", "slug", "body"],
        );
        if let Value::Object(fields) = &mut projected {
            fields.insert("author".to_string(), self.join_author(post));
            let id = post.get("_id").and_then(Value::as_str).unwrap_or_default();
            fields.insert(
                "comments".to_string(),
                Value::Array(self.approved_comments(id)),
            );
        }

        Ok(Some(serde_json::from_value(projected)?))
    }

    async fn post_summaries(&self) -> Result<Vec<PostSummary>, StoreError> {
        self.of_type("post")
            .map(|post| -> Result<PostSummary, StoreError> {
                let mut projected =
                    project(post, &["_id", "title", "description", "mainImage", "slug"]);
                if let Value::Object(fields) = &mut projected {
                    fields.insert("author".to_string(), self.join_author(post));
                }
                Ok(serde_json::from_value(projected)?)
            })
            .collect()
    }
}

/// Missing attributes project as null, as in GROQ
fn field(doc: &Value, name: &str) -> Value {
    doc.get(name).cloned().unwrap_or(Value::Null)
}

fn project(doc: &Value, names: &[&str]) -> Value {
    let fields: Map<String, Value> = names
        .iter()
        .map(|name| (name.to_string(), field(doc, name)))
        .collect();
    Value::Object(fields)
}
