use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    #[serde(default)]
    leads: LeadsConfig,
    #[serde(default)]
    page: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    base_url: String,
    #[serde(default = "default_dist_dir")]
    dist_dir: String,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    path: String,
    #[serde(default)]
    is_home: bool,
    title: String,
    description: String,
    h1: Option<String>, // Defaults to title
    #[serde(default)]
    content: String,
    #[serde(default)]
    images: Vec<ImageRef>,
    schema: Option<Map<String, Value>>,
    redirects_to: Option<String>,
}

fn default_dist_dir() -> String {
    "dist/public".to_string()
}

/// Parse site.toml from a file path.
///
/// Relative `dist_dir` and `leads.database` entries are resolved against the
/// directory holding the file.
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut config = parse_site_toml_str(&content)?;

    if let Some(root) = path.parent() {
        config.site.dist_dir = resolve_against(root, &config.site.dist_dir);
        config.leads.database = resolve_against(root, &config.leads.database);
    }

    Ok(config)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let base_url = raw.site.base_url.trim().trim_end_matches('/').to_string();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(Error::ConfigParse(format!(
            "site.base_url must be an absolute http(s) URL, got '{}'",
            raw.site.base_url
        )));
    }

    let pages: Result<Vec<PageDescriptor>> = raw
        .page
        .into_iter()
        .map(|p| {
            validate_route(&p.path, "page.path")?;
            if !p.is_home && p.path.trim_matches('/').is_empty() {
                return Err(Error::ConfigParse(format!(
                    "page '{}' targets the site root but is not marked is_home",
                    p.path
                )));
            }

            let redirects_to = if let Some(target) = p.redirects_to {
                validate_route(&target, "page.redirects_to")?;
                Some(target)
            } else {
                None
            };

            Ok(PageDescriptor {
                h1: p.h1.unwrap_or_else(|| p.title.clone()),
                path: p.path,
                is_home: p.is_home,
                title: p.title,
                description: p.description,
                content: p.content,
                images: p.images,
                schema: p.schema,
                redirects_to,
            })
        })
        .collect();

    Ok(SiteConfig {
        site: SiteSettings {
            base_url,
            dist_dir: PathBuf::from(raw.site.dist_dir),
        },
        leads: raw.leads,
        pages: pages?,
    })
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Validate a route path from site.toml.
///
/// Routes become directories under the dist tree, so anything that could
/// escape it is rejected:
/// - Paths not starting with `/`
/// - Parent directory segments (`..`) and current directory segments (`.`)
/// - Backslashes
///
/// ```text
/// validate_route("/history", "page.path")          → Ok(())
/// validate_route("history", "page.path")           → Err("must start with '/'")
/// validate_route("/../etc", "page.path")           → Err("Parent directory references...")
/// ```
pub fn validate_route(route: &str, field_name: &str) -> Result<()> {
    if route.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty route in '{}' field",
            field_name
        )));
    }

    if !route.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "Route in '{}' must start with '/': '{}'",
            field_name, route
        )));
    }

    if route.contains('\\') {
        return Err(Error::ConfigParse(format!(
            "Backslashes not allowed in '{}': '{}'",
            field_name, route
        )));
    }

    for segment in route.split('/') {
        if segment == ".." {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, route
            )));
        }
        if segment == "." {
            return Err(Error::ConfigParse(format!(
                "Current directory segments (.) not allowed in '{}': '{}'",
                field_name, route
            )));
        }
    }

    Ok(())
}
