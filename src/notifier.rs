use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Serialize, Serializer};
use crate::config::NotifierConfig;
use crate::domain::UserId;
use crate::metrics;

#[derive(Copy, Clone, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum NotificationKind {
    #[strum(serialize = "FRIEND REQUEST")]
    FriendRequest,
    #[strum(serialize = "FRIEND ACCEPT")]
    FriendAccept,
    #[strum(serialize = "FRIEND FISH")]
    FriendFish,
    #[strum(serialize = "FEED")]
    Feed,
    #[strum(serialize = "CLEAN")]
    Clean,
    #[strum(serialize = "WATER")]
    Water,
}

impl Serialize for NotificationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[display("{kind} from {sender} to {recipient}: {payload}")]
pub struct Notification {
    pub sender: String,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub payload: String,
}

impl Notification {
    pub fn new(sender: impl ToString, recipient: UserId, kind: NotificationKind, payload: impl ToString) -> Self {
        Self {
            sender: sender.to_string(),
            recipient,
            kind,
            payload: payload.to_string(),
        }
    }
}

/// Push delivery. Implementations may deliver asynchronously; an error means the
/// notification was not accepted for delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> anyhow::Result<()>;
}

/// Sends the notification, logging and counting a failure instead of returning it.
pub async fn deliver(notifier: &dyn Notifier, notification: Notification) -> bool {
    let description = notification.to_string();
    match notifier.send(notification).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("couldn't deliver the notification ({description}): {e}");
            metrics::NOTIFIER_FAILURES_COUNTER.inc();
            false
        }
    }
}

pub fn from_config(config: &NotifierConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => {
            log::info!("Notifier: webhook ({url})");
            Arc::new(WebhookNotifier::new(url.clone(), config.timeout)?)
        }
        None => {
            log::info!("Notifier: log only");
            Arc::new(LoggingNotifier)
        }
    };
    Ok(notifier)
}

#[derive(Copy, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, notification: Notification) -> anyhow::Result<()> {
        log::info!("notification: {notification}");
        Ok(())
    }
}

/// Posts every notification as JSON to a push gateway.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: Notification) -> anyhow::Result<()> {
        self.client.post(self.url.clone())
            .json(&notification)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(NotificationKind::FriendRequest.to_string(), "FRIEND REQUEST");
        assert_eq!(NotificationKind::FriendAccept.to_string(), "FRIEND ACCEPT");
        assert_eq!(NotificationKind::FriendFish.to_string(), "FRIEND FISH");
        assert_eq!(NotificationKind::Water.to_string(), "WATER");
    }

    #[test]
    fn test_json_body() {
        let notification = Notification::new("alice", "bob".into(), NotificationKind::FriendRequest, 12);
        let json = serde_json::to_value(&notification).expect("couldn't serialize");
        assert_eq!(json, serde_json::json!({
            "sender": "alice",
            "recipient": "bob",
            "kind": "FRIEND REQUEST",
            "payload": "12",
        }));
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _: Notification) -> anyhow::Result<()> {
            anyhow::bail!("the gateway is down")
        }
    }

    #[tokio::test]
    async fn test_deliver_swallows_failures() {
        let notification = Notification::new("tank", "bob".into(), NotificationKind::Feed, 2);
        assert!(deliver(&LoggingNotifier, notification.clone()).await);
        assert!(!deliver(&FailingNotifier, notification).await);
    }
}
