// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn same_key_returns_same_semaphore_while_held() {
    let locks = SessionLocks::new();
    let a = locks.lock_for("codex:abc");
    let b = locks.lock_for("codex:abc");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn entry_is_reclaimed_once_dropped() {
    let locks = SessionLocks::new();
    {
        let _sem = locks.lock_for("codex:abc");
        assert_eq!(locks.live_count(), 1);
    }
    assert_eq!(locks.live_count(), 0);
}

#[test]
fn different_keys_get_different_semaphores() {
    let locks = SessionLocks::new();
    let a = locks.lock_for("codex:abc");
    let b = locks.lock_for("codex:xyz");
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn next_note_id_increments_and_prefixes_tag() {
    let mut state = RunState::default();
    assert_eq!(state.next_note_id("codex"), "codex.note.1");
    assert_eq!(state.next_note_id("codex"), "codex.note.2");
}
