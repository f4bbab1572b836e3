// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small typed configuration surface for the runtime's tunable knobs.
//!
//! Parsed from an on-disk TOML file with [`toml`]/[`serde`], matching
//! the spec's suggested defaults when absent.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime-wide tunables. All fields have defaults matching the values
/// suggested in the specification body, so a missing config file is
/// never an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Minimum interval between successive progress-message edits.
    pub progress_edit_interval_ms: u64,
    /// Number of trailing stderr lines retained for diagnostics.
    pub stderr_tail_lines: usize,
    /// Grace period between SIGTERM and SIGKILL when cancelling a run.
    pub sigterm_grace_secs: u64,
    /// Maximum number of actions kept in a rendered progress view.
    pub max_visible_actions: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            progress_edit_interval_ms: 1_500,
            stderr_tail_lines: 200,
            sigterm_grace_secs: 2,
            max_visible_actions: crate::progress::DEFAULT_MAX_VISIBLE_ACTIONS,
        }
    }
}

impl RuntimeConfig {
    pub fn progress_edit_interval(&self) -> Duration {
        Duration::from_millis(self.progress_edit_interval_ms)
    }

    pub fn sigterm_grace(&self) -> Duration {
        Duration::from_secs(self.sigterm_grace_secs)
    }

    /// Parses a config from TOML text, falling back to defaults for
    /// any field the document omits.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Parse)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
