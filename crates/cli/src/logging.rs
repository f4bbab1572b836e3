// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tracing-subscriber` bootstrap. The runtime crates only ever call
//! into `tracing`; choosing and installing a subscriber is this
//! binary's job alone.

use tracing_subscriber::EnvFilter;

/// Installs a compact, `AGX_LOG`-controlled subscriber. Defaults to
/// `info` when the variable is unset or invalid.
pub fn init() {
    let filter = EnvFilter::try_from_env("AGX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
