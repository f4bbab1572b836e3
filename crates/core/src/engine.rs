// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine identity.
//!
//! An [`EngineId`] names one locally-installed coding-agent CLI
//! implementation (e.g. `codex`, `claude`). Unlike the random
//! [`crate::id::IdBuf`]-backed ids, engine ids are short, stable,
//! human-chosen strings compared case-insensitively.

use smol_str::SmolStr;
use std::fmt;

/// Opaque, case-insensitive identifier of an engine implementation.
#[derive(Clone, Debug, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EngineId(SmolStr);

impl EngineId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for EngineId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::hash::Hash for EngineId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for b in self.0.as_bytes() {
            b.to_ascii_lowercase().hash(state);
        }
    }
}

impl From<&str> for EngineId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EngineId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for EngineId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
