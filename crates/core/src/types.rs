use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Complete site configuration loaded from site.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteSettings,
    pub leads: LeadsConfig,
    pub pages: Vec<PageDescriptor>,
}

impl SiteConfig {
    /// The descriptor marked `is_home`, if any
    pub fn home(&self) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.is_home)
    }
}

/// Site-wide settings used by the static generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Origin used to build canonical URLs, without a trailing slash
    pub base_url: String,
    /// Build output directory holding the templated index.html
    pub dist_dir: PathBuf,
}

/// One image rendered into the hidden content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// Per-route data driving static page generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub path: String,
    #[serde(default)]
    pub is_home: bool,
    pub title: String,
    pub description: String,
    pub h1: String,
    /// Semantic HTML fragment, injected as-is
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    /// JSON-LD body; `@context` is supplied at render time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirects_to: Option<String>,
}

impl PageDescriptor {
    /// Minimal descriptor; `h1` starts out equal to `title`.
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            path: path.into(),
            is_home: false,
            h1: title.clone(),
            title,
            description: description.into(),
            content: String::new(),
            images: Vec::new(),
            schema: None,
            redirects_to: None,
        }
    }

    pub fn home(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            is_home: true,
            ..Self::new("/", title, description)
        }
    }

    pub fn with_h1(mut self, h1: impl Into<String>) -> Self {
        self.h1 = h1.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_image(mut self, src: impl Into<String>, alt: impl Into<String>) -> Self {
        self.images.push(ImageRef {
            src: src.into(),
            alt: alt.into(),
        });
        self
    }

    pub fn with_schema(mut self, schema: Map<String, Value>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn redirecting_to(mut self, target: impl Into<String>) -> Self {
        self.redirects_to = Some(target.into());
        self
    }

    pub fn is_redirect(&self) -> bool {
        self.redirects_to.is_some()
    }

    /// Absolute canonical URL. The home page always ends in `/`.
    pub fn canonical_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if self.is_home {
            format!("{}/", base)
        } else {
            format!("{}{}", base, self.path)
        }
    }

    /// Non-empty path segments, e.g. `/guides/deck` -> `["guides", "deck"]`
    pub fn route_segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Lead-capture backend settings (`[leads]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadsConfig {
    /// SQLite database file
    pub database: PathBuf,
    pub min_message_len: usize,
    /// Submissions allowed per client IP per window
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    /// Trailing window covered by the weekly report
    pub report_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_webhook: Option<String>,
    /// Bearer token for admin endpoints; unset means every admin call is rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
    /// Take the client IP from `x-forwarded-for`; only safe behind a proxy that sets it
    pub trust_forwarded_for: bool,
    /// Upper bound on one owner notification request
    pub notify_timeout_secs: u64,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("leads.db"),
            min_message_len: 10,
            rate_limit_max: 5,
            rate_limit_window_secs: 3600,
            report_days: 7,
            notify_webhook: None,
            admin_token: None,
            trust_forwarded_for: false,
            notify_timeout_secs: 10,
        }
    }
}

impl LeadsConfig {
    /// Overlay secrets from the environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("ALFANERO_ADMIN_TOKEN").filter(|v| !v.is_empty()) {
            self.admin_token = Some(token);
        }
        if let Some(url) = lookup("ALFANERO_NOTIFY_WEBHOOK").filter(|v| !v.is_empty()) {
            self.notify_webhook = Some(url);
        }
        if let Some(db) = lookup("ALFANERO_DATABASE").filter(|v| !v.is_empty()) {
            self.database = PathBuf::from(db);
        }
        if let Some(flag) = lookup("ALFANERO_TRUST_FORWARDED_FOR") {
            self.trust_forwarded_for = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        self
    }
}
