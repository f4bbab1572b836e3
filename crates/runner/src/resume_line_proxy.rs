// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hides the resume-line suffix a wrapped runner would otherwise
//! format onto the final reply, ported from
//! `executor.py::_ResumeLineProxy`.

use crate::error::RunnerError;
use crate::runner_trait::Runner;
use agx_core::{EngineId, ResumeToken, TakopiEvent, WrongEngine};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Wraps a runner so [`Runner::format_resume`] always returns an empty
/// string, regardless of the token it is asked to format. Used when a
/// caller wants the engine's normal resume-line behaviour suppressed
/// (e.g. a thread whose resume instructions are communicated another
/// way).
pub struct HideResumeLine {
    inner: Arc<dyn Runner>,
}

impl HideResumeLine {
    pub fn new(inner: Arc<dyn Runner>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Runner for HideResumeLine {
    fn engine(&self) -> &EngineId {
        self.inner.engine()
    }

    fn is_resume_line(&self, line: &str) -> bool {
        self.inner.is_resume_line(line)
    }

    fn format_resume(&self, _token: &ResumeToken) -> Result<String, WrongEngine> {
        Ok(String::new())
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
        self.inner.run(prompt, resume, tx, cancel, cwd).await
    }
}

#[cfg(test)]
#[path = "resume_line_proxy_tests.rs"]
mod tests;
