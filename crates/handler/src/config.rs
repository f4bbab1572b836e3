// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-channel configuration `handle_message` is invoked with, ported
//! from `original_source/src/takopi/bridge.py::BridgeConfig` (by way
//! of `ExecBridgeConfig` in the yee88 sibling app).

use agx_wire::{Presenter, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Minimum gap between two consecutive progress-message edits.
pub const DEFAULT_PROGRESS_EDIT_EVERY: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct ExecConfig {
    pub transport: Arc<dyn Transport>,
    pub presenter: Arc<dyn Presenter>,
    /// When true, the final answer is sent as a fresh message and the
    /// progress message is deleted; when false, the progress message
    /// is edited in place.
    pub final_notify: bool,
    pub progress_edit_every: Duration,
}

impl ExecConfig {
    pub fn new(transport: Arc<dyn Transport>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            transport,
            presenter,
            final_notify: false,
            progress_edit_every: DEFAULT_PROGRESS_EDIT_EVERY,
        }
    }

    pub fn with_final_notify(mut self, final_notify: bool) -> Self {
        self.final_notify = final_notify;
        self
    }

    pub fn with_progress_edit_every(mut self, interval: Duration) -> Self {
        self.progress_edit_every = interval;
        self
    }
}
