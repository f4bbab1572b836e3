// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agx-runner: the JSONL subprocess runner (component D).
//!
//! Spawns an engine CLI as a child process, reads its newline-delimited
//! JSON stdout, translates it into [`agx_core::TakopiEvent`]s, and
//! enforces that a single resume token is never run twice
//! concurrently. [`engines::codex::CodexRunner`] and
//! [`engines::claude::ClaudeRunner`] are reference
//! [`jsonl::JsonlSubprocessRunner`] implementations; [`run_options`],
//! [`prelude`], and [`resume_line_proxy`] are the small runner
//! decorators the message-handler layer wraps around them.

pub mod core;
pub mod engines;
pub mod error;
pub mod jsonl;
pub mod prelude;
pub mod resume_line_proxy;
pub mod run_options;
pub mod runner_trait;

pub use core::{thread_key, RunState, RunnerCore, SessionLocks};
pub use error::RunnerError;
pub use jsonl::{run_jsonl, JsonlSubprocessRunner};
pub use prelude::PreludeRunner;
pub use resume_line_proxy::HideResumeLine;
pub use run_options::{EngineRunOptions, ReasoningWarning};
pub use runner_trait::Runner;
