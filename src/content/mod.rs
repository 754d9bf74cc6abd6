//! Content module - post models and rich-text rendering

pub mod portable_text;
mod post;
mod rich_text;

pub use portable_text::Node;
pub use post::{Author, Comment, ImageRef, Post, PostSlug, PostSummary, Reference, Slug};
pub use rich_text::RichTextRenderer;
