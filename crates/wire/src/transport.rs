// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Transport` contract: the bridge's only capability for talking
//! back to the chat platform. Concrete implementations (HTTP
//! long-polling, a demo stdio transport, ...) live outside this crate;
//! this module only defines the shape every implementation must
//! satisfy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque reference to a platform message, round-tripped by the
/// transport implementation. Never interpreted by core logic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: String,
}

impl MessageRef {
    pub fn new(chat_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// A message body ready to hand to the transport. `extra` carries any
/// platform-specific payload (e.g. inline keyboards) the presenter
/// chooses to attach; the transport may ignore fields it does not
/// understand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl RenderedMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: None,
        }
    }
}

/// Delivery options for [`Transport::send`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Send as a reply to this message, when the platform supports it.
    pub reply_to: Option<MessageRef>,
    /// Whether the platform should notify the recipient (push/sound).
    pub notify: bool,
    /// Replace this earlier message's content instead of sending a new
    /// one, when the platform supports in-place edits.
    pub replace: Option<MessageRef>,
    /// Forum/topic thread to post into, when the platform has threads.
    pub thread_id: Option<String>,
}

/// Errors a [`Transport`] implementation may surface. The core never
/// inspects these beyond logging and surfacing them to the presenter;
/// it never retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("message not found: {0:?}")]
    NotFound(MessageRef),
    #[error("transport rejected the request: {0}")]
    Rejected(String),
    #[error("transport is unavailable: {0}")]
    Unavailable(String),
}

/// The bridge's sole outbound capability. Implementations own the
/// platform-specific wire protocol (HTTP long-polling, websockets,
/// stdio for a demo) entirely outside this crate.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a new message, returning a reference to it.
    async fn send(
        &self,
        chat_id: &str,
        message: RenderedMessage,
        options: SendOptions,
    ) -> Result<MessageRef, TransportError>;

    /// Edits a previously sent message in place.
    async fn edit(
        &self,
        target: &MessageRef,
        message: RenderedMessage,
    ) -> Result<(), TransportError>;

    /// Deletes a previously sent message, e.g. a queue-position notice
    /// that is no longer relevant.
    async fn delete(&self, target: &MessageRef) -> Result<(), TransportError>;

    /// Releases any resources held for this transport (connections,
    /// polling tasks). Called once at shutdown.
    async fn close(&self) -> Result<(), TransportError>;
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
