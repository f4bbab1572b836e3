// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn equal_tokens_match_on_engine_and_value() {
    let a = ResumeToken::new("codex", "abc123");
    let b = ResumeToken::new("CODEX", "abc123");
    assert_eq!(a, b);
}

#[test]
fn differing_values_are_not_equal() {
    let a = ResumeToken::new("codex", "abc123");
    let b = ResumeToken::new("codex", "xyz789");
    assert_ne!(a, b);
}

#[test]
fn display_includes_engine_and_value() {
    let t = ResumeToken::new("codex", "abc123");
    assert_eq!(t.to_string(), "codex:abc123");
}
