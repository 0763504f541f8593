pub mod generate;
pub mod init;
pub mod report;
pub mod serve;
pub mod validate;

use alfanero_core::{SiteConfig, parse_site_toml};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load site.toml, apply a `--dist` override and environment secrets
pub(crate) fn load_site(config: &Path, dist: Option<PathBuf>) -> Result<SiteConfig> {
    if !config.exists() {
        anyhow::bail!(
            "{} not found\nRun 'alfanero init <dir>' to create one",
            config.display()
        );
    }

    let mut site = parse_site_toml(config)
        .with_context(|| format!("Failed to parse {}", config.display()))?;
    if let Some(dist) = dist {
        site.site.dist_dir = dist;
    }
    site.leads = site.leads.with_env_overrides();
    Ok(site)
}
