// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived, never-persisted progress view rebuilt incrementally from a
//! [`crate::event::TakopiEvent`] stream.

use crate::action::Action;
use crate::engine::EngineId;
use crate::event::TakopiEvent;
use crate::resume::ResumeToken;
use std::time::Duration;

/// The default cap on visible actions in a rendered progress message
/// before older ones are dropped from the front.
pub const DEFAULT_MAX_VISIBLE_ACTIONS: usize = 12;

/// Live view of one in-flight (or just-finished) engine run.
#[derive(Clone, Debug, Default)]
pub struct ProgressState {
    pub engine: Option<EngineId>,
    pub resume: Option<ResumeToken>,
    pub actions: Vec<Action>,
    pub text: String,
    pub elapsed: Duration,
    pub finished: bool,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event to the state, capping visible actions at
    /// `max_actions`. Returns whether the event was terminal.
    pub fn apply(&mut self, event: &TakopiEvent, max_actions: usize) -> bool {
        match event {
            TakopiEvent::Started { engine, resume } => {
                self.engine = Some(engine.clone());
                self.resume = resume.clone();
            }
            TakopiEvent::Action { action } => {
                self.actions.push(action.clone());
                if self.actions.len() > max_actions {
                    self.actions.remove(0);
                }
            }
            TakopiEvent::TextDelta { text } => {
                self.text = text.clone();
            }
            TakopiEvent::TextFinished { text } => {
                self.text = text.clone();
            }
            TakopiEvent::Completed { answer, resume, .. } => {
                if resume.is_some() {
                    self.resume = resume.clone();
                }
                self.text = answer.clone();
                self.finished = true;
            }
        }
        self.finished
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
