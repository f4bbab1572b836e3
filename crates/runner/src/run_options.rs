// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-call engine option overlay, ported from
//! `original_source/src/takopi/runners/run_options.py::EngineRunOptions`.
//!
//! The Python original threads this through a `contextvars.ContextVar`
//! (dynamic scoping). Per REDESIGN FLAGS (spec §9) this is reimplemented
//! as an explicit parameter passed down through
//! `agx_handler::handle_message` instead: no module-level or
//! task-local state.

use agx_core::{Action, ActionId, ActionKind, EngineId, TakopiEvent};

/// A small options bag applied around a single engine run (e.g. a
/// reasoning-effort override). Engines that do not understand an
/// option should surface a warning rather than erroring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineRunOptions {
    pub model: Option<String>,
    pub reasoning: Option<String>,
}

impl EngineRunOptions {
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.reasoning.is_none()
    }
}

/// Builds the `note`-kind warning event emitted when a caller asked
/// for a reasoning-effort override an engine does not support, ported
/// from `executor.py::_reasoning_warning`.
pub struct ReasoningWarning;

impl ReasoningWarning {
    /// Returns `None` when no warning is warranted: no options were
    /// supplied, no reasoning override was requested, or the engine
    /// (per `supports_reasoning`) understands it.
    pub fn for_engine(
        engine: &EngineId,
        options: Option<&EngineRunOptions>,
        supports_reasoning: impl FnOnce(&EngineId) -> bool,
    ) -> Option<TakopiEvent> {
        let options = options?;
        options.reasoning.as_ref()?;
        if supports_reasoning(engine) {
            return None;
        }
        let message = format!("reasoning override is not supported for `{engine}`; ignoring.");
        let action = Action::new(ActionId::new(), ActionKind::Warning, message)
            .with_detail("engine", engine.to_string())
            .with_detail("override", "reasoning");
        Some(TakopiEvent::Action { action })
    }
}

#[cfg(test)]
#[path = "run_options_tests.rs"]
mod tests;
