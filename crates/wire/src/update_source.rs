// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `UpdateSource` contract: a normalised, lazy sequence of
//! incoming chat messages. Long-polling, webhook fan-in, or a demo
//! in-memory queue are all valid implementations; this crate only
//! specifies the shape the handler consumes.

use crate::transport::MessageRef;
use async_trait::async_trait;

/// One already-normalised incoming message. Platform-specific
/// concerns (voice transcription, file uploads, forum-topic creation)
/// are resolved by the `UpdateSource` implementation before this type
/// is produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub message_id: String,
    pub text: String,
    /// Text of the message this one replies to, if any.
    pub reply_text: Option<String>,
    /// Forum/topic thread this message arrived on, if the platform has
    /// threads.
    pub thread_id: Option<String>,
}

impl IncomingMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef::new(self.chat_id.clone(), self.message_id.clone())
    }
}

/// Yields incoming messages one at a time. `next` resolves to `None`
/// only when the source is permanently exhausted (e.g. the process is
/// shutting down); a source with nothing new to report should instead
/// wait internally rather than returning `None`.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn next(&mut self) -> Option<IncomingMessage>;
}

#[cfg(test)]
#[path = "update_source_tests.rs"]
mod tests;
