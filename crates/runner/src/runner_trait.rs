// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The minimal capability the router and scheduler need from any
//! engine runner. Ported from `runner.py`'s `Runner` protocol.

use crate::error::RunnerError;
use agx_core::{EngineId, ResumeToken, TakopiEvent, WrongEngine};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

#[async_trait]
pub trait Runner: Send + Sync {
    fn engine(&self) -> &EngineId;

    fn is_resume_line(&self, line: &str) -> bool;

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine>;

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken>;

    /// Runs the engine, streaming events to `tx` as they are produced.
    /// The final event sent is always `Completed` (I2). `cancel` fires
    /// when the caller wants the run cancelled cooperatively; the
    /// subprocess-backed implementation forwards it as SIGTERM, a
    /// grace period, then SIGKILL. `cwd`, when set, becomes the
    /// child's working directory; it is resolved by the caller from an
    /// `agx_core::RunContext` and passed down explicitly rather than
    /// threaded through ambient/dynamic scoping (REDESIGN FLAGS §9).
    async fn run(
        &self,
        prompt: String,
        resume: Option<ResumeToken>,
        tx: UnboundedSender<TakopiEvent>,
        cancel: CancellationToken,
        cwd: Option<&Path>,
    ) -> Result<(), RunnerError>;
}
