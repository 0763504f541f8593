use alfanero_generator::generate;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::load_site;

/// Generate one static HTML page per descriptor.
///
/// The front-end build must already have produced `<dist>/index.html`; it is
/// used as the template for every page and is itself rewritten as the home
/// page. Running this twice yields the same files.
pub async fn run(config: PathBuf, dist: Option<PathBuf>) -> Result<()> {
    println!("🔨 Generating static pages...");
    println!("   Config: {}", config.display());

    let site = load_site(&config, dist)?;
    let dist_dir = &site.site.dist_dir;
    println!("   Dist:   {}", dist_dir.display());
    println!("   Pages:  {}", site.pages.len());
    println!();

    let report = generate(dist_dir, &site.pages, &site.site.base_url)
        .context("Static page generation failed")?;

    for (page, output) in site.pages.iter().zip(&report.written) {
        let marker = if page.is_redirect() { "↪" } else { "✓" };
        println!("   {} {} → {}", marker, page.path, output.display());
    }

    println!();
    println!(
        "✅ Generated {} static HTML pages with pre-rendered content for SEO/GEO.",
        report.count()
    );

    Ok(())
}
