#![allow(dead_code)]

use alfanero_core::LeadsConfig;
use alfanero_leads::{
    ContactSubmission, LeadError, LeadService, NewSubmission, Notification, Notifier, Result,
    SubmissionPage, SubmissionStats, SubmissionStatus, SubmissionStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// In-memory store that records every insert
#[derive(Default)]
pub struct RecordingStore {
    pub rows: Mutex<Vec<ContactSubmission>>,
}

impl RecordingStore {
    pub fn created(&self) -> Vec<ContactSubmission> {
        self.rows.lock().unwrap().clone()
    }

    pub fn seed(&self, name: &str, status: SubmissionStatus, created_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(ContactSubmission {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            message: format!("Inquiry from {}", name),
            source: None,
            user_agent: None,
            ip_address: None,
            status,
            created_at,
            updated_at: created_at,
        });
    }
}

#[async_trait]
impl SubmissionStore for RecordingStore {
    async fn create(&self, s: NewSubmission) -> Result<i64> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(ContactSubmission {
            id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            message: s.message,
            source: s.source,
            user_agent: s.user_agent,
            ip_address: s.ip_address,
            status: s.status,
            created_at: s.created_at,
            updated_at: s.created_at,
        });
        Ok(id)
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> Result<SubmissionStats> {
        let rows: Vec<_> = self
            .created()
            .into_iter()
            .filter(|r| r.created_at >= since)
            .collect();
        Ok(SubmissionStats::from_submissions(&rows))
    }

    async fn submissions_since(&self, since: DateTime<Utc>) -> Result<Vec<ContactSubmission>> {
        let mut rows: Vec<_> = self
            .created()
            .into_iter()
            .filter(|r| r.created_at >= since)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn page_since(
        &self,
        since: DateTime<Utc>,
        limit: u32,
        offset: u32,
    ) -> Result<SubmissionPage> {
        let rows = self.submissions_since(since).await?;
        let total = rows.len() as u64;
        let submissions = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok(SubmissionPage { submissions, total })
    }

    async fn update_status(&self, id: i64, status: SubmissionStatus) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Notifier that records notifications, optionally failing every call
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_owner(&self, notification: Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification);
        if self.fail {
            return Err(LeadError::Notify("webhook unreachable".to_string()));
        }
        Ok(())
    }
}

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn settings() -> LeadsConfig {
    LeadsConfig {
        admin_token: Some(ADMIN_TOKEN.to_string()),
        ..LeadsConfig::default()
    }
}

pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub service: Arc<LeadService>,
}

pub fn harness_with(settings: LeadsConfig, notifier: RecordingNotifier) -> Harness {
    let store = Arc::new(RecordingStore::default());
    let notifier = Arc::new(notifier);
    let service = Arc::new(LeadService::new(
        store.clone(),
        notifier.clone(),
        settings,
    ));
    Harness {
        store,
        notifier,
        service,
    }
}

pub fn harness() -> Harness {
    harness_with(settings(), RecordingNotifier::default())
}
