// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn send_returns_an_incrementing_message_id_per_chat() {
    let transport = StdoutTransport::new();
    let first = transport.send("chat-1", RenderedMessage::text("hi"), SendOptions::default()).await.unwrap();
    let second = transport.send("chat-1", RenderedMessage::text("again"), SendOptions::default()).await.unwrap();
    assert_eq!(first.chat_id, "chat-1");
    assert_ne!(first.message_id, second.message_id);
}

#[tokio::test]
async fn edit_and_delete_succeed_against_any_reference() {
    let transport = StdoutTransport::new();
    let target = MessageRef::new("chat-1", "m1");
    assert!(transport.edit(&target, RenderedMessage::text("update")).await.is_ok());
    assert!(transport.delete(&target).await.is_ok());
}
