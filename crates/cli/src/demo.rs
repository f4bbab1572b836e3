// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agx demo`: runs one message through the whole pipeline — directive
//! parsing, routing, the per-thread scheduler's queue, and
//! `handle_message`'s progress-edit/cancellation orchestration —
//! against [`crate::demo_transport::StdoutTransport`] instead of a
//! real chat platform.

use crate::demo_transport::StdoutTransport;
use crate::engines::{build_router, EngineCommands};
use agx_core::ResumeToken;
use agx_directives::{parse_directives, ProjectsConfig};
use agx_handler::{handle_message, ExecConfig, IncomingRun, Outcome, RunningTasks};
use agx_scheduler::ThreadScheduler;
use agx_wire::{MessageRef, PlainPresenter};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(config_path: Option<PathBuf>, message: String) -> anyhow::Result<()> {
    let runtime_config = crate::config::load(config_path.as_deref())?;
    let router = build_router(&EngineCommands::default())?;

    let engine_ids: Vec<_> = router.engine_ids().cloned().collect();
    let parsed = parse_directives(&message, &engine_ids, &ProjectsConfig::new())?;

    let entry = router.entry_for_engine(parsed.engine.as_ref())?;
    require_available(entry)?;
    let runner = Arc::clone(&entry.runner);
    let engine = entry.engine.clone();

    let transport = Arc::new(StdoutTransport::new());
    let cfg = ExecConfig::new(transport, Arc::new(PlainPresenter)).with_progress_edit_every(runtime_config.progress_edit_interval());
    let running_tasks = RunningTasks::new();

    // A one-shot message has no thread to have kept a real resume
    // token for; minting a fresh one here only gives the scheduler
    // something to key its per-thread queue on, the same role a
    // chat-side "last session for this topic" lookup would otherwise
    // fill.
    let resume_token = ResumeToken::new(engine, nanoid::nanoid!(12));

    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    let done_tx = Arc::new(parking_lot::Mutex::new(Some(done_tx)));

    let scheduler = ThreadScheduler::new(move |job| {
        let cfg = cfg.clone();
        let running_tasks = running_tasks.clone();
        let runner = Arc::clone(&runner);
        let done_tx = Arc::clone(&done_tx);
        async move {
            let run = IncomingRun {
                chat_id: job.chat_id,
                user_message: MessageRef::new("demo", job.user_msg_id),
                prompt: job.text,
                resume_token: Some(job.resume_token),
                thread_id: job.thread_id,
                cwd: None,
            };
            let outcome = handle_message(&cfg, runner, &running_tasks, None, run).await;
            report(&outcome);
            if let Some(tx) = done_tx.lock().take() {
                let _ = tx.send(());
            }
        }
    });

    scheduler.enqueue_resume("demo", "u1", parsed.prompt, resume_token, None, None, None, None);
    let _ = done_rx.await;
    Ok(())
}

fn report(outcome: &Outcome) {
    println!("\noutcome: {:?}", outcome);
}

fn require_available(entry: &agx_router::RunnerEntry) -> anyhow::Result<()> {
    if entry.available() {
        return Ok(());
    }
    anyhow::bail!(
        "engine {} is unavailable: {}",
        entry.engine,
        entry.issue.as_deref().unwrap_or("no reason given")
    );
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;
