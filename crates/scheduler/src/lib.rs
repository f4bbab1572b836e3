// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agx-scheduler: per-thread job serialization and coalescing
//! (component E). Ported from
//! `original_source/src/yee88/scheduler.py::ThreadScheduler`.
//!
//! A "thread" here is one resume token's lineage: at most one job for
//! a given token runs at a time; jobs that arrive while one is running
//! (or while the session is otherwise known-busy) queue up behind it.

mod busy_gate;

pub use busy_gate::BusyGate;

use agx_core::{ResumeToken, RunContext};
use agx_runner::thread_key;
use agx_wire::MessageRef;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// One unit of work bound to a resume token's thread.
#[derive(Clone, Debug, PartialEq)]
pub struct ThreadJob {
    pub chat_id: String,
    pub user_msg_id: String,
    pub text: String,
    pub resume_token: ResumeToken,
    pub context: Option<RunContext>,
    pub thread_id: Option<String>,
    /// Opaque platform-specific coalescing key (e.g. chat + forum
    /// topic), carried through unchanged.
    pub session_key: Option<String>,
    pub progress_ref: Option<MessageRef>,
}

impl ThreadJob {
    pub fn new(chat_id: impl Into<String>, user_msg_id: impl Into<String>, text: impl Into<String>, resume_token: ResumeToken) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_msg_id: user_msg_id.into(),
            text: text.into(),
            resume_token,
            context: None,
            thread_id: None,
            session_key: None,
            progress_ref: None,
        }
    }

    pub fn with_context(mut self, context: Option<RunContext>) -> Self {
        self.context = context;
        self
    }

    pub fn with_thread_id(mut self, thread_id: Option<String>) -> Self {
        self.thread_id = thread_id;
        self
    }

    pub fn with_session_key(mut self, session_key: Option<String>) -> Self {
        self.session_key = session_key;
        self
    }

    pub fn with_progress_ref(mut self, progress_ref: Option<MessageRef>) -> Self {
        self.progress_ref = progress_ref;
        self
    }
}

type RunJob = Arc<dyn Fn(ThreadJob) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct SchedulerState {
    pending_by_thread: HashMap<String, VecDeque<ThreadJob>>,
    queued_by_progress: HashMap<(String, String), ThreadJob>,
    active_threads: HashSet<String>,
    busy_until: HashMap<String, BusyGate>,
}

/// Serialises jobs within a thread (one resume token) and coalesces
/// work that arrives while that thread is busy.
pub struct ThreadScheduler {
    run_job: RunJob,
    state: Arc<Mutex<SchedulerState>>,
}

impl ThreadScheduler {
    pub fn new<F, Fut>(run_job: F) -> Self
    where
        F: Fn(ThreadJob) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            run_job: Arc::new(move |job| run_job(job).boxed()),
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    /// Marks `token`'s thread as busy until `gate` fires. Installed (or
    /// refreshed, if the previous gate already fired) the first time a
    /// caller learns a thread id exists before any job has been
    /// enqueued against it yet.
    pub fn note_thread_known(&self, token: &ResumeToken, gate: BusyGate) {
        let key = thread_key(token.engine.as_str(), token.value.as_str());
        let should_install = {
            let state = self.state.lock();
            match state.busy_until.get(&key) {
                Some(current) => current.is_set(),
                None => true,
            }
        };
        if should_install {
            self.state.lock().busy_until.insert(key.clone(), gate.clone());
        }

        let state = Arc::clone(&self.state);
        let gate_for_cleanup = gate.clone();
        tokio::spawn(async move {
            gate_for_cleanup.wait().await;
            let mut state = state.lock();
            if matches!(state.busy_until.get(&key), Some(current) if current.same(&gate_for_cleanup)) {
                state.busy_until.remove(&key);
            }
        });
    }

    /// Queues `job`, spawning a worker for its thread if none is
    /// already running.
    pub fn enqueue(&self, job: ThreadJob) {
        let key = thread_key(job.resume_token.engine.as_str(), job.resume_token.value.as_str());
        let should_spawn = {
            let mut state = self.state.lock();
            if let Some(progress_ref) = &job.progress_ref {
                state.queued_by_progress.insert((job.chat_id.clone(), progress_ref.message_id.clone()), job.clone());
            }
            state.pending_by_thread.entry(key.clone()).or_default().push_back(job);
            if state.active_threads.contains(&key) {
                false
            } else {
                state.active_threads.insert(key.clone());
                true
            }
        };

        if should_spawn {
            let state = Arc::clone(&self.state);
            let run_job = Arc::clone(&self.run_job);
            tokio::spawn(thread_worker(state, run_job, key));
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn enqueue_resume(
        &self,
        chat_id: impl Into<String>,
        user_msg_id: impl Into<String>,
        text: impl Into<String>,
        resume_token: ResumeToken,
        context: Option<RunContext>,
        thread_id: Option<String>,
        session_key: Option<String>,
        progress_ref: Option<MessageRef>,
    ) {
        let job = ThreadJob::new(chat_id, user_msg_id, text, resume_token)
            .with_context(context)
            .with_thread_id(thread_id)
            .with_session_key(session_key)
            .with_progress_ref(progress_ref);
        self.enqueue(job);
    }

    /// Removes a still-queued job identified by the progress message it
    /// is attached to, e.g. when a user cancels before their turn comes
    /// up. Returns the removed job, if any.
    pub fn cancel_queued(&self, chat_id: &str, progress_msg_id: &str) -> Option<ThreadJob> {
        let mut state = self.state.lock();
        let progress_key = (chat_id.to_string(), progress_msg_id.to_string());
        let job = state.queued_by_progress.remove(&progress_key)?;
        let key = thread_key(job.resume_token.engine.as_str(), job.resume_token.value.as_str());
        let removed = {
            let queue = state.pending_by_thread.get_mut(&key)?;
            let position = queue.iter().position(|candidate| candidate == &job)?;
            queue.remove(position);
            queue.is_empty()
        };
        if removed {
            state.pending_by_thread.remove(&key);
        }
        Some(job)
    }

    #[cfg(test)]
    fn active_thread_count(&self) -> usize {
        self.state.lock().active_threads.len()
    }
}

async fn thread_worker(state: Arc<Mutex<SchedulerState>>, run_job: RunJob, key: String) {
    loop {
        let (job, busy_gate) = {
            let mut state = state.lock();
            let popped = state.pending_by_thread.get_mut(&key).and_then(VecDeque::pop_front);
            let job = match popped {
                Some(job) => job,
                None => {
                    state.pending_by_thread.remove(&key);
                    state.active_threads.remove(&key);
                    return;
                }
            };
            let busy_gate = state.busy_until.get(&key).cloned();
            if let Some(progress_ref) = &job.progress_ref {
                state.queued_by_progress.remove(&(job.chat_id.clone(), progress_ref.message_id.clone()));
            }
            (job, busy_gate)
        };

        if let Some(gate) = busy_gate {
            if !gate.is_set() {
                gate.wait().await;
            }
        }

        let engine = job.resume_token.engine.clone();
        let chat_id = job.chat_id.clone();
        let user_msg_id = job.user_msg_id.clone();
        if let Err(panic) = AssertUnwindSafe(run_job(job)).catch_unwind().await {
            tracing::error!(
                key = %key,
                engine = %engine,
                chat_id = %chat_id,
                user_msg_id = %user_msg_id,
                panic = %panic_message(&panic),
                "scheduler.job_panicked",
            );
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
