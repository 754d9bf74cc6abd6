//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::Blog;

/// Pre-render every post, the index and the 404 page
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let store = blog.store()?;
    let generator = Generator::new(blog)?;
    let report = generator.generate(store.as_ref()).await?;

    tracing::info!("Generated {} pages", report.pages.len());
    if !report.skipped.is_empty() {
        tracing::warn!(
            "Skipped {} posts: {}",
            report.skipped.len(),
            report.skipped.join(", ")
        );
    }

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}
