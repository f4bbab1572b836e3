// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live progress view maintained across one run, ported from the
//! renderer bookkeeping in
//! `original_source/src/takopi/bridge.py::ProgressEdits` /
//! `ExecProgressRenderer`. The rendering itself is delegated to an
//! `agx_wire::Presenter`; this type only owns the
//! `agx_core::ProgressState` the presenter reads.

use agx_core::{EngineId, ProgressState, ResumeToken, TakopiEvent};
use std::time::Instant;

pub struct ProgressTracker {
    state: ProgressState,
    max_actions: usize,
    started_at: Instant,
}

impl ProgressTracker {
    pub fn new(engine: EngineId, resume: Option<ResumeToken>, max_actions: usize) -> Self {
        let mut state = ProgressState::new();
        state.engine = Some(engine);
        state.resume = resume;
        Self { state, max_actions, started_at: Instant::now() }
    }

    /// Refreshes `state.elapsed` to the time since this tracker was
    /// created, then returns the state for a presenter to render.
    /// Called at every point a render is about to happen (spec §3's
    /// "elapsed seconds" is derived, not pushed by events).
    pub fn state(&mut self) -> &ProgressState {
        self.state.elapsed = self.started_at.elapsed();
        &self.state
    }

    /// Mutable access used once a run has concluded, to fold the final
    /// outcome's rendered body (answer plus any trailing error text)
    /// into the state the presenter reads — the presenter only ever
    /// sees `ProgressState`, never the outcome directly.
    pub fn state_mut(&mut self) -> &mut ProgressState {
        &mut self.state
    }

    /// Applies `event`, returning whether it was the terminal one.
    pub fn apply(&mut self, event: &TakopiEvent) -> bool {
        self.state.apply(event, self.max_actions)
    }

    pub fn resume(&self) -> Option<&ResumeToken> {
        self.state.resume.as_ref()
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
