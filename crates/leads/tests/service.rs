mod common;

use alfanero_leads::{
    AdminUser, ContactInput, LeadError, RequestMeta, SubmissionStatus,
    service::THANK_YOU_MESSAGE,
};
use chrono::{Duration, Utc};
use common::{ADMIN_TOKEN, RecordingNotifier, harness, harness_with, settings};

fn meta(ip: &str) -> RequestMeta {
    RequestMeta {
        user_agent: Some("Mozilla/5.0".to_string()),
        ip: Some(ip.to_string()),
        referer: Some("https://alfaneroyacht.com/broker".to_string()),
    }
}

fn valid_input() -> ContactInput {
    ContactInput::new(
        "John Doe",
        "john@example.com",
        "I am interested in viewing ALFA NERO.",
    )
    .with_phone("+1 234 567 8900")
}

fn admin() -> AdminUser {
    AdminUser {
        name: "admin".to_string(),
    }
}

#[tokio::test]
async fn test_submit_persists_and_notifies_owner() {
    let h = harness();

    let response = h
        .service
        .submit(valid_input(), &meta("192.168.1.1"))
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.message, THANK_YOU_MESSAGE);

    let rows = h.store.created();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "John Doe");
    assert_eq!(rows[0].status, SubmissionStatus::New);
    assert_eq!(rows[0].user_agent.as_deref(), Some("Mozilla/5.0"));
    assert_eq!(rows[0].ip_address.as_deref(), Some("192.168.1.1"));
    assert_eq!(
        rows[0].source.as_deref(),
        Some("https://alfaneroyacht.com/broker")
    );

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].title.contains("John Doe"));
    assert!(sent[0].content.contains("john@example.com"));
    assert!(sent[0].content.contains("+1 234 567 8900"));
    assert!(sent[0].content.contains("I am interested in viewing ALFA NERO."));
}

#[tokio::test]
async fn test_submit_without_phone_says_not_provided() {
    let h = harness();
    let input = ContactInput::new("Jane", "jane@example.com", "Please send the brochure.");
    h.service.submit(input, &meta("10.0.0.2")).await.unwrap();
    assert!(h.notifier.sent()[0].content.contains("Not provided"));
}

#[tokio::test]
async fn test_honeypot_succeeds_silently() {
    let h = harness();
    let input = ContactInput::new("Bot", "bot@spam.com", "This is a spam message")
        .with_website("http://spam.com");

    let response = h.service.submit(input, &meta("10.0.0.3")).await.unwrap();
    assert!(response.success);
    assert_eq!(response.message, THANK_YOU_MESSAGE);
    assert!(h.store.created().is_empty());
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_validation_failures_touch_nothing() {
    let h = harness();
    let cases = [
        (ContactInput::new("Test", "test@example.com", "Short"), "message"),
        (ContactInput::new("Test", "invalid-email", "long enough message"), "email"),
        (ContactInput::new("", "test@example.com", "long enough message"), "name"),
    ];

    for (input, expected_field) in cases {
        match h.service.submit(input, &meta("10.0.0.4")).await {
            Err(LeadError::Validation { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
    assert!(h.store.created().is_empty());
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notification_failure_keeps_submission() {
    let h = harness_with(settings(), RecordingNotifier::failing());
    let response = h
        .service
        .submit(valid_input(), &meta("10.0.0.5"))
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(h.store.created().len(), 1);
    assert_eq!(h.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_per_client() {
    let mut config = settings();
    config.rate_limit_max = 2;
    let h = harness_with(config, RecordingNotifier::default());

    for _ in 0..2 {
        h.service
            .submit(valid_input(), &meta("203.0.113.7"))
            .await
            .unwrap();
    }
    match h.service.submit(valid_input(), &meta("203.0.113.7")).await {
        Err(LeadError::RateLimited { retry_after_secs }) => assert!(retry_after_secs > 0),
        other => panic!("expected rate limit, got {other:?}"),
    }
    assert_eq!(h.store.created().len(), 2);

    // Another client still gets through
    h.service
        .submit(valid_input(), &meta("203.0.113.8"))
        .await
        .unwrap();
    assert_eq!(h.store.created().len(), 3);
}

#[tokio::test]
async fn test_get_stats_requires_admin() {
    let h = harness();
    assert!(matches!(
        h.service.get_stats(None, 7).await,
        Err(LeadError::Unauthorized)
    ));

    let now = Utc::now();
    h.store.seed("A", SubmissionStatus::New, now);
    h.store.seed("B", SubmissionStatus::Read, now - Duration::days(2));
    h.store.seed("Old", SubmissionStatus::New, now - Duration::days(40));

    let stats = h.service.get_stats(Some(&admin()), 7).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_status.get("new"), Some(&1));
    assert_eq!(stats.by_status.get("read"), Some(&1));

    assert!(matches!(
        h.service.get_stats(Some(&admin()), 0).await,
        Err(LeadError::Validation { field: "days", .. })
    ));
}

#[tokio::test]
async fn test_list_and_update_status() {
    let h = harness();
    let now = Utc::now();
    h.store.seed("First", SubmissionStatus::New, now - Duration::hours(2));
    h.store.seed("Second", SubmissionStatus::New, now - Duration::hours(1));

    assert!(matches!(
        h.service.list(None, 30, 50, 0).await,
        Err(LeadError::Unauthorized)
    ));

    let page = h.service.list(Some(&admin()), 30, 50, 0).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.submissions[0].name, "Second");

    h.service
        .update_status(Some(&admin()), 1, SubmissionStatus::Responded)
        .await
        .unwrap();
    assert_eq!(h.store.created()[0].status, SubmissionStatus::Responded);

    assert!(matches!(
        h.service
            .update_status(Some(&admin()), 99, SubmissionStatus::Read)
            .await,
        Err(LeadError::NotFound(99))
    ));
    assert!(matches!(
        h.service.update_status(None, 1, SubmissionStatus::Read).await,
        Err(LeadError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_weekly_report() {
    let h = harness();
    let now = Utc::now();
    h.store.seed("John Doe", SubmissionStatus::New, now);
    h.store.seed("Jane Smith", SubmissionStatus::New, now - Duration::days(1));
    h.store.seed("Bob Wilson", SubmissionStatus::Read, now - Duration::days(3));
    h.store.seed("Last Month", SubmissionStatus::New, now - Duration::days(30));

    let report = h.service.generate_weekly_report().await.unwrap();
    assert!(report.success);
    assert_eq!(report.stats.total, 3);
    assert_eq!(report.stats.by_status.get("new"), Some(&2));
    assert_eq!(report.stats.by_status.get("read"), Some(&1));
    assert!(report.report_generated <= Utc::now());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].title.contains("Weekly Report"));
    assert!(sent[0].content.contains("Contact Form Submissions"));
    assert!(sent[0].content.contains("John Doe"));
    assert!(sent[0].content.contains("Jane Smith"));
    assert!(sent[0].content.contains("Bob Wilson"));
    assert!(!sent[0].content.contains("Last Month"));
}

#[tokio::test]
async fn test_authenticate_fails_closed_without_token() {
    let h = harness();
    assert!(h.service.authenticate(Some(ADMIN_TOKEN)).is_some());
    assert!(h.service.authenticate(Some("wrong")).is_none());
    assert!(h.service.authenticate(None).is_none());

    let mut config = settings();
    config.admin_token = None;
    let h = harness_with(config, RecordingNotifier::default());
    assert!(h.service.authenticate(Some(ADMIN_TOKEN)).is_none());
    assert!(h.service.authenticate(Some("")).is_none());
}
