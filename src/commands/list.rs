//! List site content

use anyhow::Result;

use crate::generator::{get_static_paths, Fallback};
use crate::helpers::post_route;
use crate::Blog;

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let store = blog.store()?;

    match content_type {
        "post" | "posts" => {
            let posts = store.post_summaries().await?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let slug = post
                    .slug
                    .as_ref()
                    .map(|s| s.current.as_str())
                    .unwrap_or("<no slug>");
                let author = post.author.as_ref().map(|a| a.name.as_str()).unwrap_or("-");
                println!("  {} - {} [{}]", slug, post.title, author);
            }
        }
        "path" | "paths" | "route" | "routes" => {
            let static_paths = get_static_paths(store.as_ref()).await?;
            let fallback = match static_paths.fallback {
                Fallback::Blocking => "blocking",
            };
            println!(
                "Paths ({}, fallback: {}):",
                static_paths.paths.len(),
                fallback
            );
            for params in static_paths.paths {
                println!("  {}", post_route(&params.slug));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, path",
                content_type
            );
        }
    }

    Ok(())
}
