//! Static generation contract for post pages
//!
//! [`get_static_paths`] lists the routes to pre-render; [`get_static_props`]
//! loads the data for one route or reports that it does not exist.

use std::time::Duration;

use crate::content::Post;
use crate::store::{ContentStore, StoreError};

/// Default revalidation interval for post pages
pub const REVALIDATE: Duration = Duration::from_secs(60);

/// Route parameters for one post page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParams {
    pub slug: String,
}

/// What to do for a route that was not pre-rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Generate on demand; the request waits for the result
    Blocking,
}

/// Routes to pre-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub paths: Vec<PathParams>,
    pub fallback: Fallback,
}

/// Data for one route
#[derive(Debug, Clone)]
pub enum StaticProps {
    /// No post with this slug; the host answers with a 404
    NotFound,
    /// Page data, eligible for background regeneration after `revalidate`
    Props { post: Box<Post>, revalidate: Duration },
}

/// One path per post, in store order
pub async fn get_static_paths(store: &dyn ContentStore) -> Result<StaticPaths, StoreError> {
    let posts = store.post_slugs().await?;

    let paths = posts
        .into_iter()
        .filter_map(|post| match post.slug {
            Some(slug) if !slug.current.is_empty() => Some(PathParams { slug: slug.current }),
            _ => {
                tracing::warn!("Post {} has no slug, skipping", post.id);
                None
            }
        })
        .collect();

    Ok(StaticPaths {
        paths,
        fallback: Fallback::Blocking,
    })
}

/// Load one post, or `NotFound`
pub async fn get_static_props(
    store: &dyn ContentStore,
    params: &PathParams,
    revalidate: Duration,
) -> Result<StaticProps, StoreError> {
    match store.post_by_slug(&params.slug).await? {
        Some(post) => Ok(StaticProps::Props {
            post: Box::new(post),
            revalidate,
        }),
        None => {
            tracing::debug!("No post for slug {:?}", params.slug);
            Ok(StaticProps::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_helpers::sample_documents;

    #[tokio::test]
    async fn test_static_paths() {
        let store = MemoryStore::from_documents(sample_documents());
        let paths = get_static_paths(&store).await.unwrap();

        assert_eq!(paths.fallback, Fallback::Blocking);
        assert_eq!(
            paths.paths,
            vec![PathParams {
                slug: "hello-world".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_static_props_found() {
        let store = MemoryStore::from_documents(sample_documents());
        let params = PathParams {
            slug: "hello-world".to_string(),
        };

        match get_static_props(&store, &params, REVALIDATE).await.unwrap() {
            StaticProps::Props { post, revalidate } => {
                assert_eq!(revalidate, Duration::from_secs(60));
                assert_eq!(post.slug(), "hello-world");
                assert_eq!(post.comments.len(), 1);
                assert!(post.comments.iter().all(|c| c.approved));
            }
            StaticProps::NotFound => panic!("expected props"),
        }
    }

    #[tokio::test]
    async fn test_static_props_not_found() {
        let store = MemoryStore::from_documents(sample_documents());
        for slug in ["nope", "hello", "hello-world/"] {
            let params = PathParams {
                slug: slug.to_string(),
            };
            let props = get_static_props(&store, &params, REVALIDATE).await.unwrap();
            assert!(
                matches!(props, StaticProps::NotFound),
                "{} should not be found",
                slug
            );
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::default();
        let paths = get_static_paths(&store).await.unwrap();
        assert!(paths.paths.is_empty());
    }
}
