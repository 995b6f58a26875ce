//! Seams between the check cycle and its I/O collaborators.
//!
//! The engine only ever sees these traits. Production wires in the
//! TestFlight HTTP client and the Telegram notifier; tests wire in stubs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DispatchError, FetchError};
use crate::types::{ChatId, NotificationPayload};

/// Fetches the raw join-page text for a beta code.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, code: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch(&self, code: &str) -> Result<String, FetchError> {
        (**self).fetch(code).await
    }
}

/// Delivers a rendered notification to one chat destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        chat_id: ChatId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError>;
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send(
        &self,
        chat_id: ChatId,
        payload: &NotificationPayload,
    ) -> Result<(), DispatchError> {
        (**self).send(chat_id, payload).await
    }
}
