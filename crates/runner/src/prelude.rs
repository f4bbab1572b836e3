// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prepends a fixed run of synthetic events ahead of a wrapped
//! runner's own stream, ported from `executor.py::_PreludeRunner`.
//! Used to surface a warning (e.g. an unsupported reasoning override)
//! before the engine's own output begins.

use crate::error::RunnerError;
use crate::runner_trait::Runner;
use agx_core::{EngineId, ResumeToken, TakopiEvent, WrongEngine};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Wraps a runner so `prelude` is sent on `tx` before delegating to
/// the inner runner's own `run`.
pub struct PreludeRunner {
    inner: Arc<dyn Runner>,
    prelude: Vec<TakopiEvent>,
}

impl PreludeRunner {
    pub fn new(inner: Arc<dyn Runner>, prelude: Vec<TakopiEvent>) -> Self {
        Self { inner, prelude }
    }
}

#[async_trait]
impl Runner for PreludeRunner {
    fn engine(&self) -> &EngineId {
        self.inner.engine()
    }

    fn is_resume_line(&self, line: &str) -> bool {
        self.inner.is_resume_line(line)
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        self.inner.format_resume(token)
    }

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        self.inner.extract_resume(text)
    }

    async fn run(
        &self,
        prompt: String,
        resume: Option<ResumeToken>,
        tx: UnboundedSender<TakopiEvent>,
        cancel: CancellationToken,
        cwd: Option<&Path>,
    ) -> Result<(), RunnerError> {
        for event in &self.prelude {
            if tx.send(event.clone()).is_err() {
                return Ok(());
            }
        }
        self.inner.run(prompt, resume, tx, cancel, cwd).await
    }
}

#[cfg(test)]
#[path = "prelude_tests.rs"]
mod tests;
