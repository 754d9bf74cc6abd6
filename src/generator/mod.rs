//! Generator module - renders pages with the built-in Tera templates

pub mod contract;

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tera::Context;
use walkdir::WalkDir;

pub use contract::{
    get_static_paths, get_static_props, Fallback, PathParams, StaticPaths, StaticProps,
};

use crate::content::{Post, PostSummary, RichTextRenderer};
use crate::helpers::{
    date_xml, full_url_for, html_escape, image_url, is_safe_slug, locale_datetime, post_route,
    url_for,
};
use crate::store::ContentStore;
use crate::templates::{CommentData, IndexEntry, PostData, SiteData, TemplateRenderer};
use crate::Blog;

/// A rendered page and how long it stays fresh
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Route relative to the site root, e.g. `/post/hello-world/`
    pub route: String,
    pub html: String,
    pub revalidate: Duration,
}

/// Result of a full generation
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: Vec<RenderedPage>,
    /// Slugs listed by path enumeration but not rendered
    pub skipped: Vec<String>,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    rich_text: RichTextRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let rich_text = RichTextRenderer::new(&blog.config.sanity);

        Ok(Self {
            blog: blog.clone(),
            renderer,
            rich_text,
        })
    }

    /// Render every enumerated post plus the index and 404 pages to the public directory
    pub async fn generate(&self, store: &dyn ContentStore) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;
        self.copy_source_assets()?;

        let mut report = GenerateReport::default();
        let static_paths = get_static_paths(store).await?;
        tracing::info!("Pre-rendering {} post pages", static_paths.paths.len());

        for params in &static_paths.paths {
            if !is_safe_slug(&params.slug) {
                tracing::warn!("Slug {:?} cannot be written to disk, skipping", params.slug);
                report.skipped.push(params.slug.clone());
                continue;
            }

            match self.render_route(store, params).await? {
                Some(page) => {
                    let output_path = self.post_output_path(&params.slug);
                    write_file(&output_path, &page.html)?;
                    tracing::debug!("Generated post: {:?}", output_path);
                    report.pages.push(page);
                }
                None => {
                    // Deleted between enumeration and fetch
                    tracing::warn!("Post {:?} disappeared during generation", params.slug);
                    report.skipped.push(params.slug.clone());
                }
            }
        }

        let index = self.render_index_page(store).await?;
        write_file(&self.blog.public_dir.join("index.html"), &index.html)?;
        report.pages.push(index);

        write_file(
            &self.blog.public_dir.join("404.html"),
            &self.render_not_found()?,
        )?;

        Ok(report)
    }

    /// Fetch and render one post route; `None` when the post does not exist
    pub async fn render_route(
        &self,
        store: &dyn ContentStore,
        params: &PathParams,
    ) -> Result<Option<RenderedPage>> {
        let revalidate = self.blog.config.revalidate_interval();
        match get_static_props(store, params, revalidate).await? {
            StaticProps::NotFound => Ok(None),
            StaticProps::Props { post, revalidate } => Ok(Some(RenderedPage {
                route: post_route(post.slug()),
                html: self.render_post(&post)?,
                revalidate,
            })),
        }
    }

    /// Fetch the post listing and render the index page
    pub async fn render_index_page(&self, store: &dyn ContentStore) -> Result<RenderedPage> {
        let summaries = store.post_summaries().await?;
        Ok(RenderedPage {
            route: "/".to_string(),
            html: self.render_index(&summaries)?,
            revalidate: self.blog.config.revalidate_interval(),
        })
    }

    /// Render a post page
    pub fn render_post(&self, post: &Post) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &self.post_data(post));
        self.renderer.render("post.html", &context)
    }

    /// Render the index page
    pub fn render_index(&self, posts: &[PostSummary]) -> Result<String> {
        let entries: Vec<IndexEntry> = posts
            .iter()
            .filter_map(|p| {
                let slug = p.slug.as_ref()?;
                Some(IndexEntry {
                    title: html_escape(&p.title),
                    description: html_escape(p.description.as_deref().unwrap_or_default()),
                    path: html_escape(&url_for(&self.blog.config, &post_route(&slug.current))),
                    image: p.main_image.as_ref().and_then(|i| self.image(i)),
                    author_name: p
                        .author
                        .as_ref()
                        .map(|a| html_escape(&a.name))
                        .unwrap_or_default(),
                })
            })
            .collect();

        let mut context = self.base_context();
        context.insert("posts", &entries);
        self.renderer.render("index.html", &context)
    }

    /// Render the 404 page
    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render("404.html", &self.base_context())
    }

    /// Prepare a post for the template
    pub fn post_data(&self, post: &Post) -> PostData {
        let config = &self.blog.config;

        PostData {
            title: html_escape(&post.title),
            description: html_escape(post.description.as_deref().unwrap_or_default()),
            permalink: html_escape(&full_url_for(config, &post_route(post.slug()))),
            hero_image: post.main_image.as_ref().and_then(|i| self.image(i)),
            author_name: html_escape(&post.author.name),
            author_image: post.author.image.as_ref().and_then(|i| self.image(i)),
            created_at: html_escape(&locale_datetime(
                &post.created_at,
                config.tz(),
                &config.datetime_format,
            )),
            created_at_iso: date_xml(&post.created_at),
            body: self.rich_text.render(&post.body),
            comments: post
                .comments
                .iter()
                .filter(|c| c.approved)
                .map(|c| CommentData {
                    name: html_escape(c.name.as_deref().unwrap_or("Anonymous")),
                    comment: html_escape(c.comment.as_deref().unwrap_or_default()),
                })
                .collect(),
        }
    }

    fn image(&self, image: &crate::content::ImageRef) -> Option<String> {
        image_url(&self.blog.config.sanity, image).map(|url| html_escape(&url))
    }

    /// Create a base context with common variables
    fn base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: html_escape(&config.title),
                description: html_escape(&config.description),
                language: html_escape(&config.language),
                root: html_escape(&url_for(config, "")),
            },
        );
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }

    fn post_output_path(&self, slug: &str) -> PathBuf {
        self.blog
            .public_dir
            .join("post")
            .join(slug)
            .join("index.html")
    }

    /// Copy static assets from the source directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // Skip hidden files
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false);
            if hidden {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied asset: {:?}", relative);
        }

        Ok(())
    }
}

fn write_file(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, content).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}
