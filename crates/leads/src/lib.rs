//! Lead capture for the yacht site's contact form.
//!
//! Submissions are rate limited per client, validated, screened with a
//! honeypot field, stored, and forwarded to the site owner. Operators with
//! the admin token can read aggregate stats and manage submission status.
//! A weekly report summarizes recent inquiries.
//!
//! Storage and notification sit behind the [`SubmissionStore`] and
//! [`Notifier`] traits; [`http::router`] exposes everything as a JSON API.

pub mod error;
pub mod http;
pub mod model;
pub mod notify;
pub mod rate_limit;
pub mod report;
pub mod service;
pub mod store;
pub mod validation;

pub use error::{LeadError, Result};
pub use model::{
    AdminUser, ContactInput, ContactSubmission, NewSubmission, RequestMeta, SubmissionPage,
    SubmissionStats, SubmissionStatus, SubmitResponse, WeeklyReport,
};
pub use notify::{LogNotifier, Notification, Notifier, WebhookNotifier, notifier_for};
pub use service::LeadService;
pub use store::{SqliteStore, SubmissionStore};
