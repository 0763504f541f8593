use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::Result;

/// Message for the site owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub content: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_owner(&self, notification: Notification) -> Result<()>;
}

/// Posts notifications as JSON `{title, content}` to a webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// A notifier whose requests give up after `timeout`
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_owner(&self, notification: Notification) -> Result<()> {
        self.client
            .post(&self.url)
            .json(&notification)
            .send()
            .await?
            .error_for_status()?;
        info!(title = %notification.title, "owner notified via webhook");
        Ok(())
    }
}

/// Writes notifications to the log; used when no webhook is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_owner(&self, notification: Notification) -> Result<()> {
        info!(
            title = %notification.title,
            content = %notification.content,
            "owner notification (no webhook configured)"
        );
        Ok(())
    }
}

/// Pick the notifier for a configured webhook URL
pub fn notifier_for(webhook: Option<&str>, timeout: Duration) -> Result<Arc<dyn Notifier>> {
    Ok(match webhook {
        Some(url) => Arc::new(WebhookNotifier::new(url, timeout)?),
        None => Arc::new(LogNotifier),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeadError;
    use tokio::net::TcpListener;

    fn notification() -> Notification {
        Notification {
            title: "New Inquiry: Jane".to_string(),
            content: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_webhook_gives_up_on_silent_server() {
        // Accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let notifier =
            WebhookNotifier::new(format!("http://{}/hook", addr), Duration::from_millis(200))
                .unwrap();
        let started = std::time::Instant::now();
        let err = notifier.notify_owner(notification()).await.unwrap_err();

        assert!(matches!(err, LeadError::Notify(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn test_notifier_for_without_webhook_logs() {
        let notifier = notifier_for(None, Duration::from_secs(1)).unwrap();
        notifier.notify_owner(notification()).await.unwrap();
    }
}
