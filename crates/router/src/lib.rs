// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agx-router: resolves a resume token (or the absence of one) to the
//! runner that should handle it (component C).
//!
//! Ported from `original_source/src/yee88/router.py::AutoRouter`, in
//! the structural idiom of the teacher's `RuntimeRouter`
//! (`crates/daemon/src/adapters/agent/router.rs`): a thin dispatcher
//! holding its delegates by value (here, by `Arc<dyn Runner>`) behind a
//! small lookup table, rather than dynamic dispatch by name string.

mod error;

pub use error::{FormatResumeError, RouterError, RunnerUnavailable};

use agx_core::{EngineId, ResumeToken};
use agx_runner::Runner;
use indexmap::IndexMap;
use std::sync::Arc;

/// Why an otherwise-configured engine cannot currently serve a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    /// Fully usable.
    Ok,
    /// The engine's CLI binary was not found on `PATH` (or equivalent).
    MissingCli,
    /// The user's configuration for this engine was invalid; the
    /// router fell back to defaults and the engine is runnable but a
    /// warning should be surfaced.
    BadConfig,
    /// Constructing the runner itself failed.
    LoadError,
}

agx_core::simple_display! {
    EngineStatus {
        Ok => "ok",
        MissingCli => "missing_cli",
        BadConfig => "bad_config",
        LoadError => "load_error",
    }
}

/// One configured engine: its identity, its runner, and whether it is
/// presently usable.
#[derive(Clone)]
pub struct RunnerEntry {
    pub engine: EngineId,
    pub runner: Arc<dyn Runner>,
    pub status: EngineStatus,
    pub issue: Option<String>,
}

impl RunnerEntry {
    pub fn new(engine: EngineId, runner: Arc<dyn Runner>) -> Self {
        Self { engine, runner, status: EngineStatus::Ok, issue: None }
    }

    pub fn with_status(mut self, status: EngineStatus, issue: Option<String>) -> Self {
        self.status = status;
        self.issue = issue;
        self
    }

    /// `bad_config` means the router ignored user configuration and
    /// built the runner with defaults; the engine is still runnable,
    /// but the caller should surface a warning.
    pub fn available(&self) -> bool {
        matches!(self.status, EngineStatus::Ok | EngineStatus::BadConfig)
    }
}

/// Resolves a resume token (or its absence) to the [`RunnerEntry`]
/// that should handle it, falling back to a configured default engine.
pub struct AutoRouter {
    entries: Vec<RunnerEntry>,
    by_engine: IndexMap<EngineId, usize>,
    default_engine: EngineId,
}

impl AutoRouter {
    pub fn new(entries: Vec<RunnerEntry>, default_engine: EngineId) -> Result<Self, RouterError> {
        if entries.is_empty() {
            return Err(RouterError::NoEntries);
        }
        let mut by_engine = IndexMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if by_engine.insert(entry.engine.clone(), index).is_some() {
                return Err(RouterError::DuplicateEngine(entry.engine.clone()));
            }
        }
        if !by_engine.contains_key(&default_engine) {
            return Err(RouterError::DefaultEngineNotConfigured(default_engine));
        }
        Ok(Self { entries, by_engine, default_engine })
    }

    pub fn entries(&self) -> &[RunnerEntry] {
        &self.entries
    }

    pub fn available_entries(&self) -> impl Iterator<Item = &RunnerEntry> {
        self.entries.iter().filter(|entry| entry.available())
    }

    pub fn engine_ids(&self) -> impl Iterator<Item = &EngineId> {
        self.entries.iter().map(|entry| &entry.engine)
    }

    pub fn default_engine(&self) -> &EngineId {
        &self.default_engine
    }

    pub fn default_entry(&self) -> &RunnerEntry {
        &self.entries[self.by_engine[&self.default_engine]]
    }

    /// Looks up the entry for `engine`, falling back to the default
    /// engine when `None`.
    pub fn entry_for_engine(&self, engine: Option<&EngineId>) -> Result<&RunnerEntry, RunnerUnavailable> {
        let engine = engine.unwrap_or(&self.default_engine);
        match self.by_engine.get(engine) {
            Some(&index) => Ok(&self.entries[index]),
            None => Err(RunnerUnavailable::new(engine.clone(), Some("engine not configured".to_string()))),
        }
    }

    /// Looks up the entry that should handle `resume`, falling back to
    /// the default engine when `resume` is `None`.
    pub fn entry_for(&self, resume: Option<&ResumeToken>) -> Result<&RunnerEntry, RunnerUnavailable> {
        self.entry_for_engine(resume.map(|token| &token.engine))
    }

    /// Returns the runner for `resume`, erroring if its entry is not
    /// currently available.
    pub fn runner_for(&self, resume: Option<&ResumeToken>) -> Result<Arc<dyn Runner>, RunnerUnavailable> {
        let entry = self.entry_for(resume)?;
        if !entry.available() {
            return Err(RunnerUnavailable::new(entry.engine.clone(), entry.issue.clone()));
        }
        Ok(Arc::clone(&entry.runner))
    }

    pub fn format_resume(&self, token: &ResumeToken) -> Result<String, FormatResumeError> {
        let entry = self.entry_for(Some(token))?;
        Ok(entry.runner.format_resume(token)?)
    }

    /// Tries every configured runner's resume-token extractor in turn,
    /// returning the first match.
    pub fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        let text = text?;
        self.entries.iter().find_map(|entry| entry.runner.extract_resume(Some(text)))
    }

    /// Extracts a resume token from `text`, falling back to `reply_text`
    /// (e.g. the message a user replied to) when `text` carries none.
    pub fn resolve_resume(&self, text: Option<&str>, reply_text: Option<&str>) -> Option<ResumeToken> {
        self.extract_resume(text).or_else(|| self.extract_resume(reply_text))
    }

    pub fn is_resume_line(&self, line: &str) -> bool {
        self.entries.iter().any(|entry| entry.runner.is_resume_line(line))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
