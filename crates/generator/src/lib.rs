//! Static SEO page generation.
//!
//! Takes the single templated `index.html` produced by the front-end build
//! and writes one document per route with its own head tags, an off-screen
//! crawlable article and optional JSON-LD. The client application still
//! mounts into every variant unchanged.

pub mod content;
pub mod rewrite;

use alfanero_core::PageDescriptor;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use content::{SEO_ARTICLE_MARKER, hidden_block, json_ld};
use rewrite::{TagValues, rewrite_head};

const BODY_CLOSE: &str = "</body>";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{} not found. Run build first.", .0.display())]
    TemplateMissing(PathBuf),

    #[error("page '{path}' cannot be materialized: {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("pages '{first}' and '{second}' both write {}", .output.display())]
    DuplicateOutput {
        first: String,
        second: String,
        output: PathBuf,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Files written by one generation run, in descriptor order
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn count(&self) -> usize {
        self.written.len()
    }
}

/// Location of the built template inside a dist directory
pub fn template_path(dist_dir: &Path) -> PathBuf {
    dist_dir.join("index.html")
}

/// Where a page is materialized: the template itself for the home page,
/// `<dist>/<segments>/index.html` for everything else.
pub fn output_path(dist_dir: &Path, page: &PageDescriptor) -> Result<PathBuf> {
    if page.is_home {
        return Ok(template_path(dist_dir));
    }

    let segments = page.route_segments();
    if segments.is_empty() {
        return Err(GenerateError::InvalidRoute {
            path: page.path.clone(),
            reason: "non-home page resolves to the site root".to_string(),
        });
    }
    if let Some(bad) = segments
        .iter()
        .find(|s| **s == ".." || **s == "." || s.contains('\\'))
    {
        return Err(GenerateError::InvalidRoute {
            path: page.path.clone(),
            reason: format!("segment '{}' would leave the output directory", bad),
        });
    }

    let mut dir = dist_dir.to_path_buf();
    for segment in segments {
        dir.push(segment);
    }
    Ok(dir.join("index.html"))
}

/// Remove a block injected by an earlier run so the template is back to its
/// pre-generation body. The block always runs up to the closing body tag.
pub fn strip_injected(template: &str) -> Cow<'_, str> {
    let Some(start) = template.find(SEO_ARTICLE_MARKER) else {
        return Cow::Borrowed(template);
    };
    let Some(len) = template[start..].find(BODY_CLOSE) else {
        return Cow::Borrowed(template);
    };

    let mut cleaned = String::with_capacity(template.len() - len);
    cleaned.push_str(&template[..start]);
    cleaned.push_str(&template[start + len..]);
    Cow::Owned(cleaned)
}

/// Render one page from the template. Pure: the output depends only on the
/// arguments.
pub fn render_page(template: &str, page: &PageDescriptor, base_url: &str) -> String {
    let url = page.canonical_url(base_url);
    let html = rewrite_head(
        template,
        &TagValues {
            title: &page.title,
            description: &page.description,
            url: &url,
        },
    );

    let Some(at) = html.find(BODY_CLOSE) else {
        warn!(path = %page.path, "template has no </body>, content block not injected");
        return html;
    };

    let block = hidden_block(page);
    let schema = json_ld(page).unwrap_or_default();

    let mut out = String::with_capacity(html.len() + block.len() + schema.len() + 2);
    out.push_str(&html[..at]);
    out.push_str(&block);
    out.push('\n');
    out.push_str(&schema);
    out.push('\n');
    out.push_str(&html[at..]);
    out
}

/// Generate every page into `dist_dir`.
///
/// The template at `<dist_dir>/index.html` must exist; nothing is written
/// otherwise. All output paths are resolved before the first write, and any
/// filesystem error aborts the run.
pub fn generate(
    dist_dir: &Path,
    pages: &[PageDescriptor],
    base_url: &str,
) -> Result<GenerateReport> {
    let template_file = template_path(dist_dir);
    if !template_file.is_file() {
        return Err(GenerateError::TemplateMissing(template_file));
    }

    let raw = fs::read_to_string(&template_file).map_err(|source| GenerateError::Io {
        path: template_file.clone(),
        source,
    })?;
    let template = strip_injected(&raw);
    if matches!(template, Cow::Owned(_)) {
        debug!("removed content block left by a previous run");
    }

    let targets = plan_outputs(dist_dir, pages)?;

    let mut report = GenerateReport::default();
    for (page, target) in pages.iter().zip(targets) {
        let html = render_page(&template, page, base_url);

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|source| GenerateError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, html).map_err(|source| GenerateError::Io {
            path: target.clone(),
            source,
        })?;

        debug!(path = %page.path, output = %target.display(), "page written");
        report.written.push(target);
    }

    info!(count = report.count(), dist = %dist_dir.display(), "static pages generated");
    Ok(report)
}

fn plan_outputs(dist_dir: &Path, pages: &[PageDescriptor]) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut targets = Vec::with_capacity(pages.len());

    for page in pages {
        let target = output_path(dist_dir, page)?;
        if !seen.insert(target.clone()) {
            let first = pages
                .iter()
                .find(|p| output_path(dist_dir, p).ok().as_ref() == Some(&target))
                .map(|p| p.path.clone())
                .unwrap_or_default();
            return Err(GenerateError::DuplicateOutput {
                first,
                second: page.path.clone(),
                output: target,
            });
        }
        targets.push(target);
    }

    Ok(targets)
}
