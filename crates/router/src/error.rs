// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agx_core::{EngineId, WrongEngine};

/// Errors raised while constructing an [`crate::AutoRouter`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("AutoRouter requires at least one runner")]
    NoEntries,

    #[error("duplicate runner engine: {0}")]
    DuplicateEngine(EngineId),

    #[error("default engine {0} is not configured")]
    DefaultEngineNotConfigured(EngineId),
}

/// The requested engine exists but cannot currently serve a run, or
/// was never configured at all. Ported from `router.py`'s
/// `RunnerUnavailableError`.
#[derive(Debug, PartialEq, Eq)]
pub struct RunnerUnavailable {
    pub engine: EngineId,
    pub issue: Option<String>,
}

impl RunnerUnavailable {
    pub fn new(engine: EngineId, issue: Option<String>) -> Self {
        Self { engine, issue }
    }
}

impl std::fmt::Display for RunnerUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.issue {
            Some(issue) => write!(f, "engine {} is unavailable: {issue}", self.engine),
            None => write!(f, "engine {} is unavailable", self.engine),
        }
    }
}

impl std::error::Error for RunnerUnavailable {}

/// Errors [`crate::AutoRouter::format_resume`] can surface: either the
/// token's engine is not currently available, or (should the entry
/// table and the token ever disagree) the runner itself rejects the
/// token's engine.
#[derive(Debug, thiserror::Error)]
pub enum FormatResumeError {
    #[error(transparent)]
    Unavailable(#[from] RunnerUnavailable),

    #[error(transparent)]
    WrongEngine(#[from] WrongEngine),
}
