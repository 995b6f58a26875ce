//! Telegram Bot API delivery for beta notifications.
//!
//! One payload becomes one lead message (photo with caption when the app
//! icon is known, plain text otherwise) followed by one photo per attached
//! screenshot. Failures surface as per-destination `DispatchError`s; the
//! cycle driver logs them and keeps fanning out.

use async_trait::async_trait;
use serde::Deserialize;

use betawatch_common::error::DispatchError;
use betawatch_common::ports::Notifier;
use betawatch_common::types::{ChatId, NotificationPayload};

/// Telegram Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramNotifier {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// POST one Bot API method and check the `ok` flag in the envelope.
    async fn call(
        &self,
        chat_id: ChatId,
        method: &str,
        body: serde_json::Value,
    ) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError {
                chat_id,
                reason: format!("{method} failed: {e}"),
            })?;

        let envelope: ApiResponse = response.json().await.map_err(|e| DispatchError {
            chat_id,
            reason: format!("invalid {method} response: {e}"),
        })?;

        if !envelope.ok {
            return Err(DispatchError {
                chat_id,
                reason: format!(
                    "{method} rejected: {}",
                    envelope.description.unwrap_or_default()
                ),
            });
        }
        Ok(())
    }

    pub async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), DispatchError> {
        self.call(
            chat_id,
            "sendMessage",
            serde_json::json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )
        .await
    }

    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_url: &str,
        caption: Option<&str>,
    ) -> Result<(), DispatchError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": photo_url,
        });
        if let Some(caption) = caption {
            body["caption"] = serde_json::json!(caption);
            body["parse_mode"] = serde_json::json!("Markdown");
        }
        self.call(chat_id, "sendPhoto", body).await
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        chat_id: ChatId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        match &payload.icon_url {
            Some(icon_url) => {
                self.send_photo(chat_id, icon_url, Some(&payload.text))
                    .await?;
            }
            None => self.send_message(chat_id, &payload.text).await?,
        }

        for screenshot in &payload.screenshots {
            self.send_photo(chat_id, screenshot, None).await?;
        }

        tracing::debug!(chat_id, screenshots = payload.screenshots.len(), "Notification delivered");
        Ok(())
    }
}
