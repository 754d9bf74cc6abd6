//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is off: the view
//! structs below carry text that is already HTML-escaped, and the post body
//! is pre-rendered HTML.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escaping is done explicitly in the templates
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("post.html", include_str!("blog/post.html")),
            ("index.html", include_str!("blog/index.html")),
            ("404.html", include_str!("blog/404.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/comments.html",
                include_str!("blog/partials/comments.html"),
            ),
            (
                "partials/comment_form.html",
                include_str!("blog/partials/comment_form.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
}

/// A post prepared for the post template
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub description: String,
    pub permalink: String,
    pub hero_image: Option<String>,
    pub author_name: String,
    pub author_image: Option<String>,
    /// Locale-formatted creation time
    pub created_at: String,
    /// ISO 8601 creation time for `<time datetime>`
    pub created_at_iso: String,
    /// Rendered body HTML
    pub body: String,
    pub comments: Vec<CommentData>,
}

/// An approved comment
#[derive(Debug, Clone, Serialize)]
pub struct CommentData {
    pub name: String,
    pub comment: String,
}

/// A row on the index page
#[derive(Debug, Clone, Serialize)]
pub struct IndexEntry {
    pub title: String,
    pub description: String,
    pub path: String,
    pub image: Option<String>,
    pub author_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: "T &amp; T".to_string(),
                description: String::new(),
                language: "en".to_string(),
                root: "/".to_string(),
            },
        );
        context.insert("version", "0.0.0");
        let html = renderer.render("404.html", &context).unwrap();
        assert!(html.contains("T &amp; T"));
        assert!(html.contains("404"));
    }
}
