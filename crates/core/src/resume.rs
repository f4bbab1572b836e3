// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume tokens: the sole identity of an in-progress or finished engine
//! session.

use crate::engine::EngineId;
use smol_str::SmolStr;
use std::fmt;

/// `(engine, value)` pair identifying one engine session.
///
/// The `value` is opaque to the bridge; only the owning engine
/// understands its shape. Two tokens are equal exactly when both the
/// engine and the value match (engine comparison is case-insensitive
/// per [`EngineId`], value comparison is exact).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ResumeToken {
    pub engine: EngineId,
    pub value: SmolStr,
}

impl ResumeToken {
    pub fn new(engine: impl Into<EngineId>, value: impl AsRef<str>) -> Self {
        Self {
            engine: engine.into(),
            value: SmolStr::new(value.as_ref()),
        }
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.engine, self.value)
    }
}

/// Error returned when a resume token's engine does not match the
/// runner being asked to format or continue it.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("resume token belongs to engine {actual}, not {expected}")]
pub struct WrongEngine {
    pub expected: EngineId,
    pub actual: EngineId,
}

#[cfg(test)]
#[path = "resume_tests.rs"]
mod tests;
