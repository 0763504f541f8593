use alfanero_core::LeadsConfig;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{LeadError, Result};
use crate::model::{
    AdminUser, ContactInput, NewSubmission, RequestMeta, SubmissionPage, SubmissionStats,
    SubmissionStatus, SubmitResponse, WeeklyReport,
};
use crate::notify::{Notification, Notifier};
use crate::rate_limit::RateLimiter;
use crate::report::weekly_report_notification;
use crate::store::SubmissionStore;
use crate::validation::validate_contact;

pub const THANK_YOU_MESSAGE: &str =
    "Thank you for your inquiry. Our team will contact you shortly.";

/// Rate-limit key for callers whose address is unknown
const UNKNOWN_CLIENT: &str = "unknown";

pub const MAX_DAYS: u32 = 365;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Contact-form operations over an injected store and notifier
pub struct LeadService {
    store: Arc<dyn SubmissionStore>,
    notifier: Arc<dyn Notifier>,
    settings: LeadsConfig,
    limiter: RateLimiter,
}

impl LeadService {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        settings: LeadsConfig,
    ) -> Self {
        let limiter = RateLimiter::new(
            settings.rate_limit_max,
            Duration::from_secs(settings.rate_limit_window_secs),
        );
        Self {
            store,
            notifier,
            settings,
            limiter,
        }
    }

    pub fn settings(&self) -> &LeadsConfig {
        &self.settings
    }

    /// Accept one contact form submission.
    ///
    /// Honeypot submissions get the normal success response but are neither
    /// stored nor forwarded.
    pub async fn submit(&self, input: ContactInput, meta: &RequestMeta) -> Result<SubmitResponse> {
        let client = meta.ip.as_deref().unwrap_or(UNKNOWN_CLIENT);
        let status = self.limiter.check(client).await;
        if status.limited {
            warn!(client, "contact submission rate limited");
            return Err(LeadError::RateLimited {
                retry_after_secs: status.reset_in.as_secs().max(1),
            });
        }

        let contact = validate_contact(&input, self.settings.min_message_len)?;

        if input.is_honeypot() {
            info!(client, "honeypot field filled, submission dropped");
            return Ok(thank_you());
        }

        let id = self
            .store
            .create(NewSubmission {
                name: contact.name.clone(),
                email: contact.email.clone(),
                phone: contact.phone.clone(),
                message: contact.message.clone(),
                source: meta.referer.clone(),
                user_agent: meta.user_agent.clone(),
                ip_address: meta.ip.clone(),
                status: SubmissionStatus::New,
                created_at: Utc::now(),
            })
            .await?;
        info!(id, "contact submission stored");

        let notification = Notification {
            title: format!("New Inquiry from {}", contact.name),
            content: format!(
                "Name: {}\nEmail: {}\nPhone: {}\n\nMessage:\n{}",
                contact.name,
                contact.email,
                contact.phone.as_deref().unwrap_or("Not provided"),
                contact.message
            ),
        };
        if let Err(e) = self.notifier.notify_owner(notification).await {
            warn!(id, error = %e, "owner notification failed, submission kept");
        }

        Ok(thank_you())
    }

    /// Counts per status over the trailing `days`
    pub async fn get_stats(&self, caller: Option<&AdminUser>, days: u32) -> Result<SubmissionStats> {
        require_admin(caller)?;
        let since = Utc::now() - window(days)?;
        self.store.stats_since(since).await
    }

    /// Newest-first page of submissions over the trailing `days`
    pub async fn list(
        &self,
        caller: Option<&AdminUser>,
        days: u32,
        limit: u32,
        offset: u32,
    ) -> Result<SubmissionPage> {
        require_admin(caller)?;
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(LeadError::validation(
                "limit",
                format!("limit must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        let since = Utc::now() - window(days)?;
        self.store.page_since(since, limit, offset).await
    }

    pub async fn update_status(
        &self,
        caller: Option<&AdminUser>,
        id: i64,
        status: SubmissionStatus,
    ) -> Result<()> {
        let admin = require_admin(caller)?;
        if !self.store.update_status(id, status).await? {
            return Err(LeadError::NotFound(id));
        }
        info!(id, %status, by = %admin.name, "submission status updated");
        Ok(())
    }

    /// Recompute the trailing report window and send it to the owner
    pub async fn generate_weekly_report(&self) -> Result<WeeklyReport> {
        let days = self.settings.report_days;
        let now = Utc::now();
        let since = now - window(days)?;

        let stats = self.store.stats_since(since).await?;
        let submissions = self.store.submissions_since(since).await?;

        let notification = weekly_report_notification(&stats, &submissions, days, now);
        self.notifier.notify_owner(notification).await?;
        info!(total = stats.total, days, "weekly report sent");

        Ok(WeeklyReport {
            success: true,
            stats,
            report_generated: now,
        })
    }

    /// Resolve a bearer token to the operator it belongs to.
    /// Without a configured token nobody is authenticated.
    pub fn authenticate(&self, bearer: Option<&str>) -> Option<AdminUser> {
        let expected = self.settings.admin_token.as_deref()?;
        let presented = bearer?;
        if expected.is_empty() || !constant_time_eq(expected.as_bytes(), presented.as_bytes()) {
            return None;
        }
        Some(AdminUser {
            name: "admin".to_string(),
        })
    }
}

fn thank_you() -> SubmitResponse {
    SubmitResponse {
        success: true,
        message: THANK_YOU_MESSAGE.to_string(),
    }
}

fn require_admin(caller: Option<&AdminUser>) -> Result<&AdminUser> {
    caller.ok_or(LeadError::Unauthorized)
}

fn window(days: u32) -> Result<ChronoDuration> {
    if days == 0 || days > MAX_DAYS {
        return Err(LeadError::validation(
            "days",
            format!("days must be between 1 and {}", MAX_DAYS),
        ));
    }
    Ok(ChronoDuration::days(i64::from(days)))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
