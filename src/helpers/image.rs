//! Image URL builder for Sanity assets

use crate::config::SanityConfig;
use crate::content::ImageRef;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Build the CDN URL for an image field
///
/// # Examples
/// ```ignore
/// // image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg
/// image_url(&config, &image) // -> "https://cdn.sanity.io/images/<project>/<dataset>/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg"
/// ```
pub fn image_url(config: &SanityConfig, image: &ImageRef) -> Option<String> {
    asset_url(config, &image.asset.reference)
}

/// Build the CDN URL from an asset reference id
pub fn asset_url(config: &SanityConfig, reference: &str) -> Option<String> {
    if config.project_id.is_empty() || config.dataset.is_empty() {
        return None;
    }

    let rest = reference.strip_prefix("image-")?;
    let mut parts = rest.rsplitn(3, '-');
    let ext = parts.next()?;
    let dimensions = parts.next()?;
    let id = parts.next()?;

    if id.is_empty() || ext.is_empty() || !is_dimensions(dimensions) {
        return None;
    }

    Some(format!(
        "{}/{}/{}/{}-{}.{}",
        CDN_BASE, config.project_id, config.dataset, id, dimensions, ext
    ))
}

fn is_dimensions(s: &str) -> bool {
    match s.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
