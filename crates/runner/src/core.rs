// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared machinery every [`crate::jsonl::JsonlSubprocessRunner`] embeds:
//! the per-session semaphore map (ported from `SessionLockMixin`, using
//! `std::sync::Weak` as the direct equivalent of Python's
//! `WeakValueDictionary`) and per-run scratch state.

use agx_core::EngineId;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::Semaphore;

/// Thread key used to serialize a single resume token's runs, exactly
/// `"{engine}:{value}"`.
pub fn thread_key(engine: &str, value: &str) -> String {
    format!("{engine}:{value}")
}

/// Weak-value map of per-session semaphores. Entries are reclaimed
/// automatically once nothing else holds the `Arc<Semaphore>` (i.e.
/// once no run is in flight or queued against that key), mirroring
/// `WeakValueDictionary[str, anyio.Semaphore]`.
#[derive(Default)]
pub struct SessionLocks {
    map: Mutex<HashMap<String, Weak<Semaphore>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the semaphore for `key`, creating it if this is the
    /// first live reference.
    pub fn lock_for(&self, key: &str) -> Arc<Semaphore> {
        let mut map = self.map.lock();
        if let Some(existing) = map.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let sem = Arc::new(Semaphore::new(1));
        map.insert(key.to_string(), Arc::downgrade(&sem));
        map.retain(|_, weak| weak.strong_count() > 0);
        sem
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        let mut map = self.map.lock();
        map.retain(|_, weak| weak.strong_count() > 0);
        map.len()
    }
}

/// The fixed, per-engine machinery a [`crate::jsonl::JsonlSubprocessRunner`]
/// holds: its identity, the resume-line pattern it recognises, and the
/// session-lock map it shares across every run of that engine. `locks`
/// is an `Arc` so a router holding several runner instances for the
/// same underlying engine (unusual, but not forbidden) still serialises
/// against a single map.
pub struct RunnerCore {
    pub engine: EngineId,
    pub resume_re: Regex,
    pub locks: Arc<SessionLocks>,
}

impl RunnerCore {
    pub fn new(engine: impl Into<EngineId>, resume_re: Regex) -> Self {
        Self {
            engine: engine.into(),
            resume_re,
            locks: Arc::new(SessionLocks::new()),
        }
    }
}

/// Per-run scratch state, ported from `JsonlRunState`. Engine
/// implementations that need extra bookkeeping stash it in `extra`
/// rather than requiring a generic state type, which would make
/// `JsonlSubprocessRunner` non-object-safe.
#[derive(Debug, Default, Clone)]
pub struct RunState {
    pub note_seq: u64,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RunState {
    pub fn next_note_id(&mut self, tag: &str) -> String {
        self.note_seq += 1;
        format!("{tag}.note.{}", self.note_seq)
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
