// Page list and build output checks

use alfanero_core::PageDescriptor;
use alfanero_generator::{output_path, rewrite::missing_tags, template_path};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Search snippets get truncated past these lengths
const TITLE_SOFT_LIMIT: usize = 70;
const DESCRIPTION_SOFT_LIMIT: usize = 160;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
    }
}

fn normalize(route: &str) -> String {
    format!("/{}", route.trim_matches('/'))
}

/// Check a descriptor list for internal consistency.
///
/// Routes are not compared against the client router; only the list itself
/// is checked.
pub fn validate_pages(pages: &[PageDescriptor]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if pages.is_empty() {
        report.errors.push("No pages defined".to_string());
        return report;
    }

    let homes: Vec<&PageDescriptor> = pages.iter().filter(|p| p.is_home).collect();
    match homes.len() {
        0 => report
            .warnings
            .push("No home page (is_home = true); dist/index.html keeps the template tags".to_string()),
        1 => {
            if normalize(&homes[0].path) != "/" {
                report.warnings.push(format!(
                    "Home page has path '{}' but is written to /index.html",
                    homes[0].path
                ));
            }
        }
        n => report
            .errors
            .push(format!("{} pages marked is_home; exactly one is allowed", n)),
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    for page in pages {
        if let Some(previous) = seen.insert(normalize(&page.path), &page.path) {
            report.errors.push(format!(
                "Duplicate route '{}' (also declared as '{}')",
                page.path, previous
            ));
        }
    }
    let routes: HashSet<&String> = seen.keys().collect();

    for page in pages {
        check_page(page, &routes, &mut report);
    }

    report
        .info
        .push(format!("{} pages ({} redirect stubs)", pages.len(), pages.iter().filter(|p| p.is_redirect()).count()));

    report
}

fn check_page(page: &PageDescriptor, routes: &HashSet<&String>, report: &mut ValidationReport) {
    let path = &page.path;

    if page.title.trim().is_empty() {
        report.errors.push(format!("{}: empty title", path));
    } else if page.title.chars().count() > TITLE_SOFT_LIMIT {
        report.warnings.push(format!(
            "{}: title is {} characters (over {})",
            path,
            page.title.chars().count(),
            TITLE_SOFT_LIMIT
        ));
    }

    if page.description.trim().is_empty() {
        report.errors.push(format!("{}: empty description", path));
    } else if page.description.chars().count() > DESCRIPTION_SOFT_LIMIT {
        report.warnings.push(format!(
            "{}: description is {} characters (over {})",
            path,
            page.description.chars().count(),
            DESCRIPTION_SOFT_LIMIT
        ));
    }

    if let Some(target) = &page.redirects_to {
        if normalize(target) == normalize(path) {
            report.errors.push(format!("{}: redirects to itself", path));
        } else if !routes.contains(&normalize(target)) {
            report.warnings.push(format!(
                "{}: redirect target '{}' is not a generated page",
                path, target
            ));
        }
        if !page.images.is_empty() || page.schema.is_some() || !page.content.is_empty() {
            report.warnings.push(format!(
                "{}: content, images and schema are ignored on redirect pages",
                path
            ));
        }
        return;
    }

    if page.content.trim().is_empty() {
        report
            .warnings
            .push(format!("{}: no pre-rendered content for crawlers", path));
    }

    for img in &page.images {
        if img.alt.trim().is_empty() {
            report
                .warnings
                .push(format!("{}: image '{}' has no alt text", path, img.src));
        }
    }

    if let Some(schema) = &page.schema
        && !schema.contains_key("@type")
    {
        report
            .warnings
            .push(format!("{}: schema has no @type", path));
    }
}

/// Check a built dist directory against the page list: the template and its
/// tags, referenced images, and stale generated pages.
pub fn validate_dist(dist_dir: &Path, pages: &[PageDescriptor]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let template = template_path(dist_dir);
    match fs::read_to_string(&template) {
        Ok(html) => {
            for tag in missing_tags(&html) {
                report.warnings.push(format!(
                    "Template has no {} tag; it will keep its placeholder on every page",
                    tag
                ));
            }
            if !html.contains("</body>") {
                report
                    .errors
                    .push("Template has no </body>; content blocks cannot be injected".to_string());
            }
        }
        Err(_) => {
            report.errors.push(format!(
                "{} not found. Run build first.",
                template.display()
            ));
            return report;
        }
    }

    for page in pages.iter().filter(|p| !p.is_redirect()) {
        for img in &page.images {
            let Some(relative) = img.src.strip_prefix('/') else {
                continue;
            };
            if !dist_dir.join(relative).is_file() {
                report
                    .warnings
                    .push(format!("{}: image '{}' not found in dist", page.path, img.src));
            }
        }
    }

    let expected: HashSet<PathBuf> = pages
        .iter()
        .filter_map(|p| output_path(dist_dir, p).ok())
        .collect();
    for entry in WalkDir::new(dist_dir)
        .min_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "index.html")
    {
        if !expected.contains(entry.path()) {
            report.info.push(format!(
                "Stale page not in page list: {}",
                entry.path().display()
            ));
        }
    }

    report
}

/// Run both checks
pub fn validate_site(dist_dir: Option<&Path>, pages: &[PageDescriptor]) -> ValidationReport {
    let mut report = validate_pages(pages);
    if let Some(dist) = dist_dir {
        report.merge(validate_dist(dist, pages));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_pages() -> Vec<PageDescriptor> {
        vec![
            PageDescriptor::home("ALFA NERO | 82m Oceanco Superyacht For Sale", "For sale.")
                .with_content("<p>Home</p>"),
            PageDescriptor::new("/exterior-designer", "Exterior", "Nuvolari Lenard.")
                .with_content("<p>Exterior</p>")
                .with_image("/images/exterior-profile.webp", "Profile"),
            PageDescriptor::new("/exterior", "Exterior", "Moved.").redirecting_to("/exterior-designer"),
        ]
    }

    #[test]
    fn test_valid_pages() {
        let report = validate_pages(&valid_pages());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.info, vec!["3 pages (1 redirect stubs)"]);
    }

    #[test]
    fn test_empty_page_list() {
        let report = validate_pages(&[]);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_duplicate_routes() {
        let mut pages = valid_pages();
        pages.push(PageDescriptor::new("/exterior-designer/", "Dup", "d").with_content("x"));
        let report = validate_pages(&pages);
        assert!(report.errors.iter().any(|e| e.contains("Duplicate route")));
    }

    #[test]
    fn test_multiple_homes() {
        let mut pages = valid_pages();
        pages.push(PageDescriptor::home("Other", "d").with_content("x"));
        let report = validate_pages(&pages);
        assert!(report.errors.iter().any(|e| e.contains("is_home")));
    }

    #[test]
    fn test_redirect_checks() {
        let pages = vec![
            PageDescriptor::home("Home", "d").with_content("x"),
            PageDescriptor::new("/loop", "Loop", "d").redirecting_to("/loop/"),
            PageDescriptor::new("/interior", "Interior", "d")
                .with_image("/images/a.webp", "a")
                .redirecting_to("/interior-designer"),
        ];
        let report = validate_pages(&pages);
        assert!(report.errors.iter().any(|e| e.contains("redirects to itself")));
        assert!(report.warnings.iter().any(|w| w.contains("is not a generated page")));
        assert!(report.warnings.iter().any(|w| w.contains("ignored on redirect pages")));
    }

    #[test]
    fn test_seo_warnings() {
        let long = "x".repeat(200);
        let pages = vec![
            PageDescriptor::home("Home", long.clone())
                .with_content("x")
                .with_image("/images/a.webp", " "),
            PageDescriptor::new("/empty", "", "d"),
        ];
        let report = validate_pages(&pages);
        assert!(report.errors.iter().any(|e| e == "/empty: empty title"));
        assert!(report.warnings.iter().any(|w| w.contains("description is 200 characters")));
        assert!(report.warnings.iter().any(|w| w.contains("no alt text")));
        assert!(report.warnings.iter().any(|w| w.contains("/empty: no pre-rendered content")));
    }

    #[test]
    fn test_dist_missing_template() {
        let dist = TempDir::new().unwrap();
        let report = validate_dist(dist.path(), &valid_pages());
        assert!(report.errors[0].contains("Run build first"));
    }

    #[test]
    fn test_dist_checks() {
        let dist = TempDir::new().unwrap();
        fs::write(
            dist.path().join("index.html"),
            "<html><head><title>x</title></head><body></body></html>",
        )
        .unwrap();
        fs::create_dir_all(dist.path().join("old-page")).unwrap();
        fs::write(dist.path().join("old-page/index.html"), "old").unwrap();
        fs::create_dir_all(dist.path().join("exterior-designer")).unwrap();
        fs::write(dist.path().join("exterior-designer/index.html"), "ok").unwrap();

        let report = validate_dist(dist.path(), &valid_pages());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert_eq!(report.warnings.iter().filter(|w| w.starts_with("Template has no")).count(), 9);
        assert!(report.warnings.iter().any(|w| w.contains("exterior-profile.webp")));
        assert_eq!(report.info.len(), 1);
        assert!(report.info[0].contains("old-page"));
    }

    #[test]
    fn test_validate_site_merges() {
        let dist = TempDir::new().unwrap();
        let report = validate_site(Some(dist.path()), &[]);
        assert_eq!(report.errors.len(), 2);
    }
}
