use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for a TOML basic string.
///
/// The starter file is written by hand so its comments survive; the toml
/// crate's serializer would drop them.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Write a starter `site.toml` with a home page, one content page and a
/// redirect stub.
pub async fn run(path: PathBuf, base_url: String) -> Result<()> {
    println!("Initializing site config in: {}", path.display());

    let config_path = path.join("site.toml");
    if config_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            config_path.display()
        );
    }

    let base_url = base_url.trim().trim_end_matches('/');
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        anyhow::bail!("--base-url must start with http:// or https://, got '{}'", base_url);
    }

    fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_site_toml(&config_path, base_url)?;

    println!("✓ Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit site.toml (titles, descriptions, page content)");
    println!("  2. Build the front end so dist_dir/index.html exists");
    println!("  3. Generate: alfanero generate --config {}", config_path.display());

    Ok(())
}

fn write_site_toml(config_path: &Path, base_url: &str) -> Result<()> {
    let content = format!(
        r#"# Site configuration for static SEO pages and lead capture

[site]
base_url = "{base_url}"
# Front-end build output; must contain the templated index.html
dist_dir = "dist/public"

[leads]
database = "leads.db"
min_message_len = 10
rate_limit_max = 5
rate_limit_window_secs = 3600
report_days = 7
# Enable only behind a reverse proxy that sets x-forwarded-for
trust_forwarded_for = false
notify_timeout_secs = 10
# notify_webhook = "https://hooks.example.com/owner"
# admin_token is better set through ALFANERO_ADMIN_TOKEN

[[page]]
path = "/"
is_home = true
title = "Home"
description = "Describe the site in one or two sentences."
h1 = "Home"
content = """<p>Crawlable summary of the home page.</p>"""

[page.schema]
"@type" = "WebSite"
name = "Home"
url = "{base_url}/"

[[page]]
path = "/about"
title = "About"
description = "Describe this page in one or two sentences."
content = """<p>Crawlable summary of the about page.</p>"""
images = [{{ src = "/images/about.webp", alt = "About" }}]

[[page]]
path = "/about-us"
title = "About"
description = "This page has moved."
redirects_to = "/about"
"#,
        base_url = toml_escape_string(base_url)
    );

    fs::write(config_path, content).context("Failed to write site.toml")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alfanero_core::parse_site_toml;
    use tempfile::TempDir;

    #[test]
    fn test_toml_escape_string() {
        assert_eq!(toml_escape_string(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(toml_escape_string("line\nbreak\t"), "line\\nbreak\\t");
    }

    #[tokio::test]
    async fn test_init_writes_parseable_config() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("site");
        run(target.clone(), "https://alfaneroyacht.com/".to_string())
            .await
            .unwrap();

        let site = parse_site_toml(target.join("site.toml")).unwrap();
        assert_eq!(site.site.base_url, "https://alfaneroyacht.com");
        assert_eq!(site.pages.len(), 3);
        assert!(site.pages[0].is_home);
        assert_eq!(site.pages[1].h1, "About");
        assert_eq!(site.pages[2].redirects_to.as_deref(), Some("/about"));
        assert_eq!(
            site.pages[0].schema.as_ref().unwrap()["@type"],
            serde_json::json!("WebSite")
        );
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), "").unwrap();
        let err = run(dir.path().to_path_buf(), "https://example.com".to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_init_rejects_bad_base_url() {
        let dir = TempDir::new().unwrap();
        assert!(
            run(dir.path().to_path_buf(), "example.com".to_string())
                .await
                .is_err()
        );
    }
}
