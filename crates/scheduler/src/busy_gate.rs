// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A one-shot, clonable "done" signal, the Rust equivalent of the
//! `anyio.Event` the Python scheduler installs per thread in
//! `busy_until`. Unlike a bare `tokio::sync::Notify`, [`BusyGate`]
//! remembers that it already fired, so a `wait()` called after `set()`
//! returns immediately instead of hanging.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct Inner {
    notify: Notify,
    done: AtomicBool,
}

#[derive(Clone)]
pub struct BusyGate(Arc<Inner>);

impl BusyGate {
    pub fn new() -> Self {
        Self(Arc::new(Inner { notify: Notify::new(), done: AtomicBool::new(false) }))
    }

    pub fn is_set(&self) -> bool {
        self.0.done.load(Ordering::Acquire)
    }

    pub fn set(&self) {
        self.0.done.store(true, Ordering::Release);
        self.0.notify.notify_waiters();
    }

    pub async fn wait(&self) {
        let notified = self.0.notify.notified();
        if self.is_set() {
            return;
        }
        notified.await;
    }

    /// Identity comparison, used by [`crate::ThreadScheduler`] to know
    /// whether the `busy_until` entry it installed is still the one it
    /// is cleaning up.
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for BusyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "busy_gate_tests.rs"]
mod tests;
