// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agx-handler: the message-handler / progress renderer (component F).
//!
//! [`handle_message`] orchestrates one incoming message's whole
//! lifecycle: it sends the initial progress reply, registers a
//! [`RunningTask`] so a `/cancel` reply can find it, then runs three
//! cooperating loops — the engine run itself, a paced progress-edit
//! loop, and a cancellation watcher — before rendering and sending the
//! final message. Ported from the shape of `_run_engine`/
//! `handle_message` in
//! `original_source/src/yee88/telegram/commands/executor.py`.

pub mod config;
pub mod running_tasks;
pub mod tracker;

pub use config::{ExecConfig, DEFAULT_PROGRESS_EDIT_EVERY};
pub use running_tasks::{RunningTask, RunningTasks};
pub use tracker::ProgressTracker;

use agx_core::{ResumeToken, TakopiEvent, DEFAULT_MAX_VISIBLE_ACTIONS};
use agx_runner::{Runner, RunnerError};
use agx_scheduler::BusyGate;
use agx_wire::{MessageRef, SendOptions, DEFAULT_PROGRESS_LABEL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything `handle_message` needs about the incoming message and
/// the run it should start, independent of the chosen engine (that
/// comes from `runner`) and of the shared config/registries (those are
/// separate parameters so callers can reuse one `ExecConfig` and one
/// `RunningTasks` registry across every message in a channel).
pub struct IncomingRun {
    pub chat_id: String,
    /// The user's message, so the progress reply can target it.
    pub user_message: MessageRef,
    pub prompt: String,
    pub resume_token: Option<ResumeToken>,
    pub thread_id: Option<String>,
    /// Resolved working directory for the engine subprocess, derived by
    /// the caller from an `agx_core::RunContext` (project lookup is an
    /// out-of-core concern per spec §1).
    pub cwd: Option<PathBuf>,
}

/// Invoked exactly once, the instant the engine's session id becomes
/// known, so the scheduler can order same-thread follow-ups correctly
/// (spec §4.5's `note_thread_known`). A no-op closure is a valid
/// implementation for callers that do not run a scheduler (e.g. tests).
pub type ThreadKnownHook<'a> = dyn Fn(&ResumeToken, BusyGate) + Send + Sync + 'a;

/// How the run concluded, classified per spec §4.6 step 5.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The engine produced a terminal `Completed` event.
    Completed {
        ok: bool,
        answer: String,
        error: Option<String>,
        resume: Option<ResumeToken>,
    },
    /// A `/cancel` reply fired before the engine finished.
    Cancelled,
    /// The engine task returned an error other than cancellation.
    Error(String),
}

impl Outcome {
    /// `done`/`error` per spec §4.6 step 5's status rule: `ok=false` or
    /// an empty answer renders as `error`, everything else as `done`.
    /// This preserves the source's current (if debatable) behaviour —
    /// see DESIGN.md's Open Question decision.
    fn status(&self) -> &'static str {
        match self {
            Outcome::Completed { ok, answer, .. } => {
                if !ok || answer.is_empty() {
                    "error"
                } else {
                    "done"
                }
            }
            Outcome::Cancelled => "cancelled",
            Outcome::Error(_) => "error",
        }
    }

    fn body(&self) -> String {
        match self {
            Outcome::Completed { answer, error, .. } => match error {
                Some(error) if !error.is_empty() => {
                    if answer.is_empty() {
                        error.clone()
                    } else {
                        format!("{answer}\n{error}")
                    }
                }
                _ => answer.clone(),
            },
            Outcome::Cancelled => String::new(),
            Outcome::Error(message) => message.clone(),
        }
    }

    fn resume(&self) -> Option<&ResumeToken> {
        match self {
            Outcome::Completed { resume, .. } => resume.as_ref(),
            _ => None,
        }
    }
}

/// Runs one message through its whole lifecycle and returns the
/// outcome it rendered, mainly so tests can assert on it without
/// inspecting the transport's recorded calls.
pub async fn handle_message(
    cfg: &ExecConfig,
    runner: Arc<dyn Runner>,
    running_tasks: &RunningTasks,
    on_thread_known: Option<&ThreadKnownHook<'_>>,
    run: IncomingRun,
) -> Outcome {
    let span = tracing::info_span!(
        "handle_message",
        chat_id = %run.chat_id,
        engine = %runner.engine(),
        resume = ?run.resume_token,
    );
    let _enter = span.enter();

    let mut tracker = ProgressTracker::new(
        runner.engine().clone(),
        run.resume_token.clone(),
        DEFAULT_MAX_VISIBLE_ACTIONS,
    );

    let initial = cfg.presenter.render_progress(tracker.state(), "starting");
    let send_result = cfg
        .transport
        .send(
            &run.chat_id,
            initial,
            SendOptions {
                reply_to: Some(run.user_message.clone()),
                notify: false,
                replace: None,
                thread_id: run.thread_id.clone(),
            },
        )
        .await;

    let progress_ref = match send_result {
        Ok(msg_ref) => Some(msg_ref),
        Err(error) => {
            tracing::warn!(error = %error, "handle_message.initial_send_failed");
            None
        }
    };

    let task = running_tasks.register(progress_ref.clone().unwrap_or_else(|| run.user_message.clone()));

    let outcome = run_group(cfg, &runner, &mut tracker, &task, on_thread_known, &run, progress_ref.as_ref()).await;

    // The presenter only ever sees `ProgressState`; fold the outcome's
    // rendered body (answer plus any trailing error text) into it so
    // `render_final` reflects the classification in step 5, not just
    // whatever streaming text happened to accumulate.
    tracker.state_mut().text = outcome.body();
    let final_message = cfg.presenter.render_final(
        tracker.state(),
        outcome.status(),
        outcome.resume().map(|token| format_resume_for_render(&runner, token)).unwrap_or_default().as_deref(),
    );

    send_final(cfg, progress_ref.as_ref(), &run, final_message).await;

    task.mark_done();
    if let Some(progress_ref) = &progress_ref {
        running_tasks.remove(progress_ref);
    } else {
        running_tasks.remove(&run.user_message);
    }

    tracing::info!(status = outcome.status(), "handle_message.finished");
    outcome
}

fn format_resume_for_render(runner: &Arc<dyn Runner>, token: &ResumeToken) -> Option<String> {
    match runner.format_resume(token) {
        Ok(line) if !line.is_empty() => Some(line),
        Ok(_) => None,
        Err(error) => {
            tracing::warn!(error = %error, "handle_message.format_resume_failed");
            None
        }
    }
}

async fn send_final(
    cfg: &ExecConfig,
    progress_ref: Option<&MessageRef>,
    run: &IncomingRun,
    final_message: agx_wire::RenderedMessage,
) {
    if cfg.final_notify || progress_ref.is_none() {
        let result = cfg
            .transport
            .send(
                &run.chat_id,
                final_message,
                SendOptions {
                    reply_to: Some(run.user_message.clone()),
                    notify: true,
                    replace: None,
                    thread_id: run.thread_id.clone(),
                },
            )
            .await;
        if let Err(error) = result {
            tracing::warn!(error = %error, "handle_message.final_send_failed");
        }
        if let Some(progress_ref) = progress_ref {
            if let Err(error) = cfg.transport.delete(progress_ref).await {
                tracing::debug!(error = %error, "handle_message.progress_delete_failed");
            }
        }
        return;
    }

    let progress_ref = progress_ref.expect("checked above");
    if let Err(error) = cfg.transport.edit(progress_ref, final_message).await {
        tracing::warn!(error = %error, "handle_message.final_edit_failed; deleting progress message");
        let _ = cfg.transport.delete(progress_ref).await;
    }
}

/// Runs the engine/progress-edit/cancel-watch trio to completion and
/// returns the classified [`Outcome`]. `cancel_token` is shared by all
/// three: whichever finishes first cancels the others.
#[allow(clippy::too_many_arguments)]
async fn run_group(
    cfg: &ExecConfig,
    runner: &Arc<dyn Runner>,
    tracker: &mut ProgressTracker,
    task: &Arc<RunningTask>,
    on_thread_known: Option<&ThreadKnownHook<'_>>,
    run: &IncomingRun,
    progress_ref: Option<&MessageRef>,
) -> Outcome {
    let cancel_token = CancellationToken::new();
    let changed = Arc::new(Notify::new());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<TakopiEvent>();
    let runner_for_task = Arc::clone(runner);
    let prompt = run.prompt.clone();
    let resume_token = run.resume_token.clone();
    let cwd = run.cwd.clone();
    let engine_cancel = cancel_token.clone();

    let mut engine_task = tokio::spawn(async move {
        runner_for_task
            .run(prompt, resume_token, tx, engine_cancel, cwd.as_deref())
            .await
    });

    let cancel_watch = {
        let task = Arc::clone(task);
        let cancel_token = cancel_token.clone();
        tokio::spawn(async move {
            task.wait_for_cancel().await;
            cancel_token.cancel();
        })
    };

    let progress_edit = progress_ref.map(|target| {
        let transport = Arc::clone(&cfg.transport);
        let presenter = Arc::clone(&cfg.presenter);
        let changed = Arc::clone(&changed);
        let target = target.clone();
        let interval = cfg.progress_edit_every;
        let cancel_token = cancel_token.clone();
        // A watch channel would need an initial value; a plain Notify
        // plus a side channel for the latest snapshot is simpler here
        // since only the tracker (owned by the engine-event loop)
        // knows the current state. We poll a shared snapshot instead.
        let state = Arc::new(parking_lot::Mutex::new(None::<agx_core::ProgressState>));
        let state_for_loop = Arc::clone(&state);
        (
            tokio::spawn(async move {
                let mut last_edit: Option<Instant> = None;
                loop {
                    tokio::select! {
                        _ = changed.notified() => {}
                        _ = cancel_token.cancelled() => break,
                    }
                    if let Some(wait_since) = last_edit {
                        let elapsed = wait_since.elapsed();
                        if elapsed < interval {
                            tokio::time::sleep(interval - elapsed).await;
                        }
                    }
                    let Some(state) = state_for_loop.lock().clone() else { continue };
                    let rendered = presenter.render_progress(&state, DEFAULT_PROGRESS_LABEL);
                    if let Err(error) = transport.edit(&target, rendered).await {
                        tracing::debug!(error = %error, "handle_message.progress_edit_failed");
                    }
                    last_edit = Some(Instant::now());
                }
            }),
            state,
        )
    });

    let mut final_event: Option<TakopiEvent> = None;
    let mut engine_error: Option<String> = None;
    let mut was_cancelled = false;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled(), if !was_cancelled => {
                was_cancelled = true;
                engine_task.abort();
                break;
            }
            event = rx.recv() => {
                match event {
                    Some(event) => {
                        if let TakopiEvent::Started { resume: Some(token), .. } = &event {
                            task.set_resume(token.clone());
                            if let Some(hook) = on_thread_known {
                                hook(token, task.done.clone());
                            }
                        }
                        let terminal = tracker.apply(&event);
                        if let Some((_, state)) = &progress_edit {
                            *state.lock() = Some(tracker.state().clone());
                        }
                        changed.notify_one();
                        if terminal {
                            final_event = Some(event);
                            break;
                        }
                    }
                    None => {
                        // The channel only closes once `run()` itself
                        // returns — whether that's a clean exit, a
                        // raised `RunnerError` (e.g. a ProtocolError
                        // from a mismatched session id), or a return
                        // with no `Completed` ever sent. Await the
                        // task's own result rather than assuming the
                        // closed channel means success.
                        let (err, cancelled) = await_engine_task(&mut engine_task).await;
                        engine_error = err;
                        was_cancelled = was_cancelled || cancelled;
                        break;
                    }
                }
            }
            result = &mut engine_task => {
                let (err, cancelled) = classify_join_result(result);
                engine_error = err;
                was_cancelled = was_cancelled || cancelled;
                break;
            }
        }
    }

    cancel_token.cancel();
    cancel_watch.abort();
    if let Some((handle, _)) = progress_edit {
        handle.abort();
    }
    if !engine_task.is_finished() {
        engine_task.abort();
    }

    if task.cancel_requested() && final_event.is_none() {
        was_cancelled = true;
    }

    if was_cancelled {
        return Outcome::Cancelled;
    }
    if let Some(error) = engine_error {
        return Outcome::Error(error);
    }
    match final_event {
        Some(TakopiEvent::Completed { ok, answer, resume, error }) => Outcome::Completed { ok, answer, error, resume },
        _ => Outcome::Error(format!("{} produced no terminal event", runner.engine())),
    }
}

/// Maps the engine task's own `JoinHandle` result to `(error,
/// cancelled)`, the shape both the `rx.recv() == None` and the direct
/// `engine_task` branches of [`run_group`]'s select loop need.
fn classify_join_result(result: Result<Result<(), RunnerError>, tokio::task::JoinError>) -> (Option<String>, bool) {
    match result {
        Ok(Ok(())) => (None, false),
        Ok(Err(error)) => (Some(error.to_string()), false),
        Err(join_error) if join_error.is_cancelled() => (None, true),
        Err(join_error) => (Some(join_error.to_string()), false),
    }
}

/// Awaits the engine task's result after its event channel has closed.
/// The sender side only drops once `run()` itself returns, so by the
/// time `rx.recv()` yields `None` the task is finished (or about to
/// be) and polling its `JoinHandle` resolves immediately without
/// risking the "polled after completion" panic — this is the first
/// poll of it in that case, since the `engine_task` select branch
/// never won the race.
async fn await_engine_task(engine_task: &mut JoinHandle<Result<(), RunnerError>>) -> (Option<String>, bool) {
    classify_join_result(engine_task.await)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
