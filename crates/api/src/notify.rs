//! Notification boundary.
//!
//! Release can notify the client that their boxes left storage. Delivery is
//! fire-and-forget: it runs on a spawned task after the releasing
//! transaction has committed, and a failure is logged, never surfaced.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Outbound client notification channel.
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `phone`. Errors are strings because callers only
    /// ever log them.
    fn send(&self, phone: String, message: String) -> BoxFuture<'static, Result<(), String>>;
}

/// Posts notifications to a configured webhook as JSON.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, phone: String, message: String) -> BoxFuture<'static, Result<(), String>> {
        let client = self.client.clone();
        let url = self.url.clone();
        async move {
            let response = client
                .post(&url)
                .json(&serde_json::json!({ "phone": phone, "message": message }))
                .send()
                .await
                .map_err(|e| e.to_string())?;
            response
                .error_for_status()
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
        .boxed()
    }
}

/// Used when no webhook is configured: traces the message and succeeds.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn send(&self, phone: String, message: String) -> BoxFuture<'static, Result<(), String>> {
        async move {
            tracing::info!(%phone, %message, "Notification delivery disabled, dropping message");
            Ok(())
        }
        .boxed()
    }
}

/// Build the notifier implied by configuration.
pub fn notifier_from_config(webhook_url: Option<&str>) -> Arc<dyn Notifier> {
    match webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.to_string())),
        None => Arc::new(NoopNotifier),
    }
}

/// Dispatch a notification without awaiting it.
///
/// The release has already committed when this runs; a delivery failure
/// must not affect the response, so it is only logged.
pub fn dispatch(notifier: Arc<dyn Notifier>, phone: String, message: String) {
    tokio::spawn(async move {
        if let Err(error) = notifier.send(phone.clone(), message).await {
            tracing::warn!(%phone, %error, "Release notification failed");
        }
    });
}
