use alfanero_validator::validate_site;
use anyhow::Result;
use std::path::PathBuf;

use super::load_site;

pub async fn run(config: PathBuf, dist: Option<PathBuf>) -> Result<()> {
    println!("Validating site at: {}", config.display());

    let site = load_site(&config, dist)?;
    println!("✓ site.toml valid");
    println!("  Base URL: {}", site.site.base_url);
    println!("  Pages: {}", site.pages.len());

    // The dist tree is optional; only check it once something has been built
    let dist_dir = site.site.dist_dir.as_path();
    let dist = dist_dir.exists().then_some(dist_dir);
    if dist.is_none() {
        println!("  Dist: {} (not built, skipped)", dist_dir.display());
    }

    let report = validate_site(dist, &site.pages);

    for line in &report.info {
        println!("  ℹ {}", line);
    }
    for line in &report.warnings {
        println!("  ⚠ {}", line);
    }
    for line in &report.errors {
        eprintln!("  ✗ {}", line);
    }

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!();
    println!(
        "✅ Validation passed ({} warning(s))",
        report.warnings.len()
    );
    Ok(())
}
