// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSONL subprocess runner: spawns an engine CLI, reads its
//! newline-delimited JSON stdout, and translates it into
//! [`TakopiEvent`]s. Ported from `runner.py`'s `JsonlSubprocessRunner`
//! and `BaseRunner`, grounded stylistically on the teacher's
//! `crates/daemon/src/adapters/agent/coop/spawn.rs` (piped-stdio
//! process spawning, a dedicated reaper so the child is never left a
//! zombie, and `tracing`-based structured logging of the subprocess
//! lifecycle).

use crate::core::{thread_key, RunState, RunnerCore};
use crate::error::RunnerError;
use crate::runner_trait::Runner;
use agx_core::{Action, ActionId, ActionKind, EngineId, ResumeToken, TakopiEvent, WrongEngine};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Hook trait one concrete engine (codex, claude, ...) implements.
/// Everything here mirrors a method of the same name in
/// `JsonlSubprocessRunner` (Python); methods with a default are the
/// ones the Python base class also defaulted.
pub trait JsonlSubprocessRunner: Send + Sync {
    fn core(&self) -> &RunnerCore;

    fn command(&self) -> &str;

    fn tag(&self) -> String {
        self.core().engine.to_string()
    }

    fn build_args(&self, prompt: &str, resume: Option<&ResumeToken>, state: &RunState) -> Vec<String>;

    fn stdin_payload(&self, prompt: &str, _resume: Option<&ResumeToken>, _state: &RunState) -> Option<Vec<u8>> {
        Some(prompt.as_bytes().to_vec())
    }

    fn env(&self, _state: &RunState) -> Vec<(String, String)> {
        Vec::new()
    }

    fn new_state(&self, _prompt: &str, _resume: Option<&ResumeToken>) -> RunState {
        RunState::default()
    }

    fn pipes_error_message(&self) -> String {
        format!("{} failed to open subprocess pipes", self.tag())
    }

    /// Translates one decoded JSONL object into zero or more events.
    fn translate(
        &self,
        data: &serde_json::Value,
        state: &mut RunState,
        resume: Option<&ResumeToken>,
        found_session: Option<&ResumeToken>,
    ) -> Result<Vec<TakopiEvent>, String>;

    fn note_event(
        &self,
        message: impl Into<String>,
        state: &mut RunState,
        detail: Vec<(String, String)>,
    ) -> TakopiEvent {
        let message = message.into();
        let note_id = state.next_note_id(&self.tag());
        let mut action = Action::new(ActionId::from_string(note_id), ActionKind::Warning, message);
        for (k, v) in detail {
            action = action.with_detail(k, v);
        }
        TakopiEvent::Action { action }
    }

    fn invalid_json_events(&self, line: &str, state: &mut RunState) -> Vec<TakopiEvent> {
        let message = format!("invalid JSON from {}; ignoring line", self.tag());
        vec![self.note_event(message, state, vec![("line".into(), line.to_string())])]
    }

    fn decode_error_events(&self, line: &str, error: &str, state: &mut RunState) -> Vec<TakopiEvent> {
        let message = format!("invalid event from {}; ignoring line", self.tag());
        vec![self.note_event(
            message,
            state,
            vec![("line".into(), line.to_string()), ("error".into(), error.to_string())],
        )]
    }

    fn translate_error_events(
        &self,
        data: &serde_json::Value,
        error: &str,
        state: &mut RunState,
    ) -> Vec<TakopiEvent> {
        let message = format!("{} translation error; ignoring event", self.tag());
        let mut detail = vec![("error".to_string(), error.to_string())];
        if let Some(obj) = data.as_object() {
            if let Some(t) = obj.get("type").and_then(|v| v.as_str()) {
                detail.push(("type".to_string(), t.to_string()));
            }
            if let Some(item) = obj.get("item").and_then(|v| v.as_object()) {
                if let Some(it) = item
                    .get("type")
                    .or_else(|| item.get("item_type"))
                    .and_then(|v| v.as_str())
                {
                    detail.push(("item_type".to_string(), it.to_string()));
                }
            }
        }
        vec![self.note_event(message, state, detail)]
    }

    fn process_error_events(
        &self,
        rc: i32,
        resume: Option<&ResumeToken>,
        found_session: Option<&ResumeToken>,
        state: &mut RunState,
    ) -> Vec<TakopiEvent> {
        let message = format!("{} failed (rc={rc})", self.tag());
        let resume_for_completed = found_session.or(resume).cloned();
        vec![
            self.note_event(message.clone(), state, Vec::new()),
            TakopiEvent::Completed {
                ok: false,
                answer: String::new(),
                resume: resume_for_completed,
                error: Some(message),
            },
        ]
    }

    fn stream_end_events(
        &self,
        resume: Option<&ResumeToken>,
        found_session: Option<&ResumeToken>,
    ) -> Vec<TakopiEvent> {
        let message = format!("{} finished without a result event", self.tag());
        let resume_for_completed = found_session.or(resume).cloned();
        vec![TakopiEvent::Completed {
            ok: false,
            answer: String::new(),
            resume: resume_for_completed,
            error: Some(message),
        }]
    }

    /// Applies the started-coalescing rule table (spec §4.4.4).
    fn handle_started_event(
        &self,
        engine: &EngineId,
        resume: &ResumeToken,
        expected_session: Option<&ResumeToken>,
        found_session: Option<&ResumeToken>,
    ) -> Result<(ResumeToken, bool), RunnerError> {
        if engine != &self.core().engine {
            return Err(RunnerError::WrongEngineSession {
                tag: self.tag(),
                actual: engine.clone(),
            });
        }
        if let Some(expected) = expected_session {
            if resume != expected {
                return Err(RunnerError::UnexpectedSession {
                    tag: self.tag(),
                    expected: expected.value.to_string(),
                    actual: resume.value.to_string(),
                });
            }
        }
        match found_session {
            None => Ok((resume.clone(), true)),
            Some(found) => {
                if resume != found {
                    return Err(RunnerError::UnexpectedSession {
                        tag: self.tag(),
                        expected: found.value.to_string(),
                        actual: resume.value.to_string(),
                    });
                }
                Ok((found.clone(), false))
            }
        }
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        if token.engine != self.core().engine {
            return Err(WrongEngine {
                expected: self.core().engine.clone(),
                actual: token.engine.clone(),
            });
        }
        Ok(format!("`{} resume {}`", self.core().engine, token.value))
    }

    fn is_resume_line(&self, line: &str) -> bool {
        self.core().resume_re.is_match(line)
    }

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        let text = text?;
        let mut found = None;
        for caps in self.core().resume_re.captures_iter(text) {
            if let Some(m) = caps.name("token") {
                found = Some(m.as_str().to_string());
            }
        }
        found.map(|value| ResumeToken::new(self.core().engine.clone(), value))
    }
}

/// Tail-buffer of the child's stderr, retained for diagnostics and
/// never shown to the end user directly.
struct StderrTail {
    lines: VecDeque<String>,
    cap: usize,
}

impl StderrTail {
    fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(cap.min(64)),
            cap,
        }
    }

    fn push(&mut self, line: String) {
        if self.lines.len() >= self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

/// Runs the spawn/read/translate loop shared by every
/// [`JsonlSubprocessRunner`]. Grounded on `run_impl`/`_iter_jsonl_events`
/// in `runner.py`, with process-group signalling ported from the
/// teacher's `coop/spawn.rs` reaper pattern.
pub async fn run_jsonl<R: JsonlSubprocessRunner + ?Sized>(
    runner: &R,
    prompt: String,
    resume: Option<ResumeToken>,
    tx: &UnboundedSender<TakopiEvent>,
    cancel: CancellationToken,
    stderr_tail_lines: usize,
    sigterm_grace: Duration,
    cwd: Option<&Path>,
) -> Result<(), RunnerError> {
    let mut state = runner.new_state(&prompt, resume.as_ref());
    let tag = runner.tag();
    let args = runner.build_args(&prompt, resume.as_ref(), &state);
    let payload = runner.stdin_payload(&prompt, resume.as_ref(), &state);

    tracing::info!(engine = %runner.core().engine, resume = ?resume, prompt_len = prompt.len(), "runner.start");

    let mut cmd = Command::new(runner.command());
    cmd.args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    for (k, v) in runner.env(&state) {
        cmd.env(k, v);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid().ok();
                Ok(())
            });
        }
    }

    let mut child = cmd.spawn().map_err(RunnerError::SpawnFailed)?;
    let pid = child.id().unwrap_or_default();
    tracing::info!(pid, cmd = runner.command(), "subprocess.spawn");

    let mut stdin = child.stdin.take().ok_or_else(|| RunnerError::PipesUnavailable(runner.pipes_error_message()))?;
    let stdout = child.stdout.take().ok_or_else(|| RunnerError::PipesUnavailable(runner.pipes_error_message()))?;
    let stderr = child.stderr.take().ok_or_else(|| RunnerError::PipesUnavailable(runner.pipes_error_message()))?;

    if let Some(bytes) = payload {
        let _ = stdin.write_all(&bytes).await;
    }
    drop(stdin);

    let mut stderr_tail = StderrTail::new(stderr_tail_lines);
    let mut stderr_lines = BufReader::new(stderr).lines();
    let stderr_drain = async {
        while let Ok(Some(line)) = stderr_lines.next_line().await {
            stderr_tail.push(line);
        }
        stderr_tail
    };

    let mut expected_session = resume.clone();
    let mut found_session: Option<ResumeToken> = None;
    let mut did_emit_completed = false;
    let mut jsonl_seq: u64 = 0;
    let mut stdout_lines = BufReader::new(stdout).lines();

    let stdout_drain = async {
        let mut dropped_after_completed: Option<String> = None;
        while let Ok(Some(raw_line)) = stdout_lines.next_line().await {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            jsonl_seq += 1;

            // I2: once `Completed` has gone downstream, further input
            // is silently dropped — but the pipe keeps draining so a
            // chatty engine writing past its result event never blocks
            // on a full stdout buffer and hangs `wait()`.
            if did_emit_completed {
                if dropped_after_completed.is_none() {
                    dropped_after_completed = Some(line.to_string());
                    tracing::debug!(pid, jsonl_seq, line, "runner.line_dropped_after_completed");
                }
                continue;
            }

            let events = decode_and_translate(runner, line, &mut state, resume.as_ref(), found_session.as_ref());
            for event in events {
                if let TakopiEvent::Started { engine, resume: started_resume } = &event {
                    let started_resume = match started_resume {
                        Some(r) => r.clone(),
                        None => continue,
                    };
                    match runner.handle_started_event(
                        engine,
                        &started_resume,
                        expected_session.as_ref(),
                        found_session.as_ref(),
                    ) {
                        Ok((session, emit)) => {
                            found_session = Some(session);
                            if !emit {
                                continue;
                            }
                        }
                        Err(err) => {
                            tracing::warn!(pid, jsonl_seq, error = %err, "runner.started.error");
                            return Err(err);
                        }
                    }
                }
                if event.is_completed() {
                    did_emit_completed = true;
                    let _ = tx.send(event);
                    // Only this line's remaining translated events are
                    // skipped; the outer loop keeps draining stdout.
                    break;
                }
                let _ = tx.send(event);
            }
        }
        Ok(())
    };

    let wait_fut = child.wait();

    tokio::pin!(stdout_drain);
    tokio::pin!(wait_fut);

    let run_to_completion = async {
        tokio::select! {
            result = &mut stdout_drain => result,
            _ = cancel.cancelled() => {
                terminate_process_group(pid, sigterm_grace).await;
                Ok(())
            }
        }
    };
    let drain_result = run_to_completion.await;
    let _tail = stderr_drain.await;
    let status = wait_fut.await;

    drain_result?;

    if did_emit_completed {
        return Ok(());
    }

    if cancel.is_cancelled() {
        let message = format!("{tag} was cancelled");
        let resume_for_completed = found_session.or(expected_session.take());
        let _ = tx.send(TakopiEvent::Completed {
            ok: false,
            answer: String::new(),
            resume: resume_for_completed,
            error: Some(message),
        });
        return Ok(());
    }

    match status {
        Ok(exit) if !exit.success() => {
            let rc = exit.code().unwrap_or(-1);
            for event in runner.process_error_events(rc, expected_session.as_ref(), found_session.as_ref(), &mut state) {
                let _ = tx.send(event);
            }
        }
        _ => {
            for event in runner.stream_end_events(expected_session.as_ref(), found_session.as_ref()) {
                let _ = tx.send(event);
            }
        }
    }
    Ok(())
}

fn decode_and_translate<R: JsonlSubprocessRunner + ?Sized>(
    runner: &R,
    line: &str,
    state: &mut RunState,
    resume: Option<&ResumeToken>,
    found_session: Option<&ResumeToken>,
) -> Vec<TakopiEvent> {
    let decoded: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(_) => return runner.invalid_json_events(line, state),
    };
    match runner.translate(&decoded, state, resume, found_session) {
        Ok(events) => events,
        Err(err) => runner.translate_error_events(&decoded, &err, state),
    }
}

#[cfg(unix)]
async fn terminate_process_group(pid: u32, grace: Duration) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let pgid = Pid::from_raw(-(pid as i32));
    let _ = kill(pgid, Signal::SIGTERM);
    tokio::time::sleep(grace).await;
    let _ = kill(pgid, Signal::SIGKILL);
}

#[cfg(not(unix))]
async fn terminate_process_group(_pid: u32, _grace: Duration) {}

/// Blanket `Runner` implementation for any `JsonlSubprocessRunner`,
/// porting `BaseRunner.run_locked`'s session-lock acquisition policy:
/// an explicit resume token locks before the first byte is read; an
/// absent one locks as soon as the engine reports its own session id.
#[async_trait]
impl<T: JsonlSubprocessRunner + 'static> Runner for T {
    fn engine(&self) -> &EngineId {
        &self.core().engine
    }

    fn is_resume_line(&self, line: &str) -> bool {
        JsonlSubprocessRunner::is_resume_line(self, line)
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        JsonlSubprocessRunner::format_resume(self, token)
    }

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        JsonlSubprocessRunner::extract_resume(self, text)
    }

    async fn run(
        &self,
        prompt: String,
        resume: Option<ResumeToken>,
        tx: UnboundedSender<TakopiEvent>,
        cancel: CancellationToken,
        cwd: Option<&std::path::Path>,
    ) -> Result<(), RunnerError> {
        const STDERR_TAIL_LINES: usize = 200;
        const SIGTERM_GRACE: Duration = Duration::from_secs(2);

        if let Some(resume) = &resume {
            if resume.engine != self.core().engine {
                return Err(RunnerError::WrongEngine(WrongEngine {
                    expected: self.core().engine.clone(),
                    actual: resume.engine.clone(),
                }));
            }
            let key = thread_key(resume.engine.as_str(), &resume.value);
            let permit = self.core().locks.lock_for(&key);
            let _guard = permit
                .acquire_owned()
                .await
                .map_err(|_| RunnerError::PipesUnavailable("session lock closed".into()))?;
            return run_jsonl(
                self,
                prompt,
                Some(resume.clone()),
                &tx,
                cancel,
                STDERR_TAIL_LINES,
                SIGTERM_GRACE,
                cwd,
            )
            .await;
        }

        // No resume token yet: run unlocked until the engine reports a
        // session id, then acquire the lock before forwarding it.
        let (inner_tx, mut inner_rx) = tokio::sync::mpsc::unbounded_channel();
        let run_fut = run_jsonl(self, prompt, None, &inner_tx, cancel, STDERR_TAIL_LINES, SIGTERM_GRACE, cwd);
        tokio::pin!(run_fut);

        let mut guard: Option<tokio::sync::OwnedSemaphorePermit> = None;
        loop {
            tokio::select! {
                biased;
                event = inner_rx.recv() => {
                    match event {
                        Some(event) => {
                            if guard.is_none() {
                                if let Some(token) = event.resume() {
                                    let key = thread_key(token.engine.as_str(), &token.value);
                                    let permit = self.core().locks.lock_for(&key);
                                    guard = Some(permit.acquire_owned().await.map_err(|_| {
                                        RunnerError::PipesUnavailable("session lock closed".into())
                                    })?);
                                }
                            }
                            let _ = tx.send(event);
                        }
                        None => break,
                    }
                }
                result = &mut run_fut => {
                    result?;
                    while let Ok(event) = inner_rx.try_recv() {
                        let _ = tx.send(event);
                    }
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
