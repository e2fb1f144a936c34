use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::error::Result;
use crate::report::WebhookMessage;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(%error, "falling back to a webhook client without request timeout");
            reqwest::Client::new()
        }
    }
});

#[async_trait]
pub trait Notify {
    async fn notify(&self, message: &WebhookMessage) -> Result<()>;
}

pub struct WebhookNotifier {
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        WebhookNotifier { url: url.into() }
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn notify(&self, message: &WebhookMessage) -> Result<()> {
        HTTP_CLIENT
            .post(&self.url)
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ChoreError;
    use crate::report::WebhookMessage;
    use crate::webhook::{Notify, WebhookNotifier};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_notify_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(body_partial_json(serde_json::json!({ "embeds": [] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/api/webhooks/1/token", server.uri()));
        let result = notifier.notify(&WebhookMessage { embeds: vec![] }).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_notify_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri());
        let result = notifier.notify(&WebhookMessage { embeds: vec![] }).await;

        assert!(matches!(result, Err(ChoreError::Webhook(_))));
    }
}
