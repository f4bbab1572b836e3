// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-process, stdout-printing [`Transport`], standing in for the
//! real chat-platform wire layer this repository deliberately does not
//! implement (spec §1). Every call is also logged at `debug` so
//! `AGX_LOG=debug agx demo` shows the exact edit cadence the scheduler
//! drives.

use agx_wire::{MessageRef, RenderedMessage, SendOptions, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct StdoutTransport {
    next_id: AtomicU64,
    edit_count: Mutex<u64>,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            edit_count: Mutex::new(0),
        }
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdoutTransport {
    async fn send(&self, chat_id: &str, message: RenderedMessage, options: SendOptions) -> Result<MessageRef, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let msg_ref = MessageRef::new(chat_id, format!("m{id}"));
        println!("[send   {}] {}", msg_ref.message_id, message.text);
        tracing::debug!(reply_to = ?options.reply_to, notify = options.notify, "demo_transport.send");
        Ok(msg_ref)
    }

    async fn edit(&self, target: &MessageRef, message: RenderedMessage) -> Result<(), TransportError> {
        let count = {
            let mut count = self.edit_count.lock();
            *count += 1;
            *count
        };
        println!("[edit #{count} {}] {}", target.message_id, message.text);
        Ok(())
    }

    async fn delete(&self, target: &MessageRef) -> Result<(), TransportError> {
        println!("[delete {}]", target.message_id);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "demo_transport_tests.rs"]
mod tests;
