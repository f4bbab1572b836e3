// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks in-flight runs by the progress message they are attached to,
//! so a `/cancel` reply can find and signal the right one. Ported from
//! `original_source/src/takopi/bridge.py::RunningTask` and the
//! `running_tasks` dict threaded through its `handle_message`.

use agx_core::ResumeToken;
use agx_scheduler::BusyGate;
use agx_wire::MessageRef;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One run's cancellable, observable state.
///
/// `resume` and `resume_ready` let a caller learn the session's resume
/// token as soon as the engine reports it (before the run finishes);
/// `done` is the same one-shot signal the scheduler's `busy_until`
/// gate waits on, so a thread becomes available again the instant its
/// running task clears.
pub struct RunningTask {
    resume: Mutex<Option<ResumeToken>>,
    resume_ready: BusyGate,
    cancel_requested: BusyGate,
    pub done: BusyGate,
}

impl RunningTask {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            resume: Mutex::new(None),
            resume_ready: BusyGate::new(),
            cancel_requested: BusyGate::new(),
            done: BusyGate::new(),
        })
    }

    /// Records the session's resume token the first time it becomes
    /// known, waking anyone waiting on [`Self::wait_for_resume`].
    pub fn set_resume(&self, token: ResumeToken) {
        let mut guard = self.resume.lock();
        if guard.is_none() {
            *guard = Some(token);
            drop(guard);
            self.resume_ready.set();
        }
    }

    pub fn resume(&self) -> Option<ResumeToken> {
        self.resume.lock().clone()
    }

    pub async fn wait_for_resume(&self) {
        self.resume_ready.wait().await;
    }

    pub fn request_cancel(&self) {
        self.cancel_requested.set();
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.is_set()
    }

    pub async fn wait_for_cancel(&self) {
        self.cancel_requested.wait().await;
    }

    pub fn mark_done(&self) {
        self.done.set();
    }
}

/// Shared registry of running tasks, keyed by the progress message
/// each one is attached to.
#[derive(Clone, Default)]
pub struct RunningTasks(Arc<Mutex<HashMap<MessageRef, Arc<RunningTask>>>>);

impl RunningTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, target: MessageRef) -> Arc<RunningTask> {
        let task = RunningTask::new();
        self.0.lock().insert(target, Arc::clone(&task));
        task
    }

    pub fn remove(&self, target: &MessageRef) -> Option<Arc<RunningTask>> {
        self.0.lock().remove(target)
    }

    pub fn get(&self, target: &MessageRef) -> Option<Arc<RunningTask>> {
        self.0.lock().get(target).cloned()
    }

    /// Signals cancellation for the task attached to `target`, if one
    /// is currently running there. Returns whether a task was found.
    pub fn request_cancel(&self, target: &MessageRef) -> bool {
        match self.get(target) {
            Some(task) => {
                task.request_cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "running_tasks_tests.rs"]
mod tests;
