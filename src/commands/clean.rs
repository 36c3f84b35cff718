//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::SpaceTraveling;

/// Delete the generated site
pub fn run(site: &SpaceTraveling) -> Result<()> {
    if site.public_dir.exists() {
        fs::remove_dir_all(&site.public_dir)?;
        tracing::info!("Deleted: {:?}", site.public_dir);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_public_dir() {
        let dir = TempDir::new().unwrap();
        let site = SpaceTraveling::with_config(dir.path(), SiteConfig::default());
        fs::create_dir_all(site.public_dir.join("post/hello")).unwrap();
        fs::write(site.public_dir.join("index.html"), "home").unwrap();

        run(&site).unwrap();
        assert!(!site.public_dir.exists());

        // Nothing to delete is fine
        run(&site).unwrap();
    }
}
