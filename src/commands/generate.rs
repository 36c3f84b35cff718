//! Generate static files

use anyhow::Result;

use crate::generator::Generator;
use crate::SpaceTraveling;

/// Fetch all pre-rendered pages and write them to the public directory
pub async fn run(site: &SpaceTraveling) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site, site.content_source()?)?;
    let pages = generator.build().await?;
    generator.write(&pages)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} pages in {:.2}s",
        pages.len(),
        duration.as_secs_f64()
    );

    Ok(())
}
