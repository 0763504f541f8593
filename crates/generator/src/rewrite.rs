//! Head-tag rewriting.
//!
//! Each known tag is located by its attribute signature and only its value is
//! swapped, so the template's own spelling of the tag (self-closing slash,
//! spacing) survives. A tag missing from the template is left alone.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

/// Which descriptor value a rule writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Url,
}

/// Values substituted into the head tags of one page
#[derive(Debug, Clone, Copy)]
pub struct TagValues<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
}

impl TagValues<'_> {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => self.title,
            Field::Description => self.description,
            Field::Url => self.url,
        }
    }
}

/// A single (pattern, field) rewrite. The pattern has exactly two groups:
/// everything before the value and everything after it.
pub struct TagRule {
    pub name: &'static str,
    pub field: Field,
    pattern: Regex,
}

fn rule(name: &'static str, pattern: &str, field: Field) -> TagRule {
    TagRule {
        name,
        field,
        pattern: Regex::new(pattern).expect("tag rule pattern is valid"),
    }
}

fn meta_rule(name: &'static str, attr: &str, key: &str, field: Field) -> TagRule {
    rule(
        name,
        &format!(r#"(<meta\s+{attr}="{key}"\s+content=")[^"]*(")"#),
        field,
    )
}

static RULES: LazyLock<Vec<TagRule>> = LazyLock::new(|| {
    vec![
        rule("title", r"(<title>)(?s:.*?)(</title>)", Field::Title),
        meta_rule("meta title", "name", "title", Field::Title),
        meta_rule("meta description", "name", "description", Field::Description),
        rule(
            "canonical",
            r#"(<link\s+rel="canonical"\s+href=")[^"]*(")"#,
            Field::Url,
        ),
        meta_rule("og:url", "property", "og:url", Field::Url),
        meta_rule("og:title", "property", "og:title", Field::Title),
        meta_rule("og:description", "property", "og:description", Field::Description),
        meta_rule("twitter:url", "property", "twitter:url", Field::Url),
        meta_rule("twitter:title", "property", "twitter:title", Field::Title),
        meta_rule(
            "twitter:description",
            "property",
            "twitter:description",
            Field::Description,
        ),
    ]
});

/// The ordered rule list
pub fn rules() -> &'static [TagRule] {
    &RULES
}

/// Names of the rules whose tag does not appear in `template`
pub fn missing_tags(template: &str) -> Vec<&'static str> {
    rules()
        .iter()
        .filter(|rule| !rule.pattern.is_match(template))
        .map(|rule| rule.name)
        .collect()
}

/// Apply every rule once, in order. Each rule replaces at most one
/// occurrence and inserts its value literally.
pub fn rewrite_head(template: &str, values: &TagValues<'_>) -> String {
    let mut html = template.to_string();

    for rule in rules() {
        if !rule.pattern.is_match(&html) {
            debug!(tag = rule.name, "tag not present in template, left unchanged");
            continue;
        }
        let value = values.get(rule.field);
        html = rule
            .pattern
            .replacen(&html, 1, |caps: &Captures| {
                format!("{}{}{}", &caps[1], value, &caps[2])
            })
            .into_owned();
    }

    html
}
