use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LeadError;

/// Lifecycle of a contact submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    New,
    Read,
    Responded,
    Archived,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 4] = [
        SubmissionStatus::New,
        SubmissionStatus::Read,
        SubmissionStatus::Responded,
        SubmissionStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Read => "read",
            SubmissionStatus::Responded => "responded",
            SubmissionStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = LeadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubmissionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| LeadError::validation("status", format!("unknown status '{}'", s)))
    }
}

/// Contact form body as posted by the site
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Honeypot: hidden from people, filled in by bots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl ContactInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            phone: None,
            website: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn is_honeypot(&self) -> bool {
        self.website
            .as_deref()
            .is_some_and(|w| !w.trim().is_empty())
    }
}

/// Who sent the request
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub referer: Option<String>,
}

/// Authenticated operator allowed to read leads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub name: String,
}

/// Row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub source: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

/// Stored submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub source: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

impl SubmissionStats {
    pub fn from_submissions(submissions: &[ContactSubmission]) -> Self {
        let mut stats = SubmissionStats::default();
        for s in submissions {
            stats.total += 1;
            *stats.by_status.entry(s.status.to_string()).or_insert(0) += 1;
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPage {
    pub submissions: Vec<ContactSubmission>,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub success: bool,
    pub stats: SubmissionStats,
    pub report_generated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in SubmissionStatus::ALL {
            assert_eq!(status.as_str().parse::<SubmissionStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Responded).unwrap(),
            "\"responded\""
        );
    }

    #[test]
    fn test_honeypot_detection() {
        let input = ContactInput::new("n", "e@x.com", "message text");
        assert!(!input.is_honeypot());
        assert!(!input.clone().with_website("  ").is_honeypot());
        assert!(input.with_website("http://spam.com").is_honeypot());
    }

    #[test]
    fn test_contact_input_missing_fields_default_empty() {
        let input: ContactInput = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(input.name, "");
        assert_eq!(input.email, "a@b.co");
        assert_eq!(input.phone, None);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let mut stats = SubmissionStats::default();
        stats.total = 3;
        stats.by_status.insert("new".to_string(), 2);
        stats.by_status.insert("read".to_string(), 1);
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({"total": 3, "byStatus": {"new": 2, "read": 1}})
        );
    }
}
