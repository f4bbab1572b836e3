// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = RuntimeConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, RuntimeConfig::default());
}

#[test]
fn partial_document_overrides_only_given_fields() {
    let cfg = RuntimeConfig::from_toml_str("stderr_tail_lines = 50\n").unwrap();
    assert_eq!(cfg.stderr_tail_lines, 50);
    assert_eq!(
        cfg.progress_edit_interval_ms,
        RuntimeConfig::default().progress_edit_interval_ms
    );
}

#[test]
fn malformed_document_is_an_error() {
    assert!(RuntimeConfig::from_toml_str("not = [valid").is_err());
}
