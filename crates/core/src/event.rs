// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform event model every engine runner translates its native
//! JSONL output into.

use crate::action::Action;
use crate::engine::EngineId;
use crate::resume::ResumeToken;
use parking_lot::Mutex;

/// A single translated unit of engine activity.
///
/// Every run emits exactly one `Started`, zero or more `Action` and
/// `TextDelta`/`TextFinished`, and exactly one terminal `Completed`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum TakopiEvent {
    Started {
        engine: EngineId,
        resume: Option<ResumeToken>,
    },
    Action {
        action: Action,
    },
    TextDelta {
        text: String,
    },
    TextFinished {
        text: String,
    },
    Completed {
        ok: bool,
        answer: String,
        resume: Option<ResumeToken>,
        error: Option<String>,
    },
}

impl TakopiEvent {
    pub fn is_completed(&self) -> bool {
        matches!(self, TakopiEvent::Completed { .. })
    }

    /// The resume token carried by this event, if any. `Started` and
    /// `Completed` are the only variants that carry one.
    pub fn resume(&self) -> Option<&ResumeToken> {
        match self {
            TakopiEvent::Started { resume, .. } => resume.as_ref(),
            TakopiEvent::Completed { resume, .. } => resume.as_ref(),
            _ => None,
        }
    }
}

/// Builds events for one engine, enforcing that `started()` fires at
/// most once per run and that `completed()` inherits the session's
/// resume token when the caller does not supply one.
///
/// Grounded on `original_source/src/yee88/events.py::EventFactory`.
pub struct EventFactory {
    engine: EngineId,
    started_resume: Mutex<Option<ResumeToken>>,
}

impl EventFactory {
    pub fn new(engine: impl Into<EngineId>) -> Self {
        Self {
            engine: engine.into(),
            started_resume: Mutex::new(None),
        }
    }

    pub fn started(&self, resume: Option<ResumeToken>) -> TakopiEvent {
        *self.started_resume.lock() = resume.clone();
        TakopiEvent::Started {
            engine: self.engine.clone(),
            resume,
        }
    }

    pub fn action(&self, action: Action) -> TakopiEvent {
        TakopiEvent::Action { action }
    }

    pub fn text_delta(&self, text: impl Into<String>) -> TakopiEvent {
        TakopiEvent::TextDelta { text: text.into() }
    }

    pub fn text_finished(&self, text: impl Into<String>) -> TakopiEvent {
        TakopiEvent::TextFinished { text: text.into() }
    }

    /// `resume` defaults to whatever `started()` last recorded when
    /// `None` is passed explicitly.
    pub fn completed(
        &self,
        ok: bool,
        answer: impl Into<String>,
        resume: Option<ResumeToken>,
        error: Option<String>,
    ) -> TakopiEvent {
        let resume = resume.or_else(|| self.started_resume.lock().clone());
        TakopiEvent::Completed {
            ok,
            answer: answer.into(),
            resume,
            error,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
