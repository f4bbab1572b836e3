// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Presenter` contract: turns a [`ProgressState`] into the
//! platform-agnostic [`RenderedMessage`]. Markdown/entity conversion
//! for a specific chat platform is explicitly a presenter concern this
//! crate does not own; [`PlainPresenter`] is a minimal plain-text
//! default, not the only valid implementation.

use crate::transport::RenderedMessage;
use agx_core::ProgressState;

/// Label for `render_progress` when nothing more specific is known
/// yet, per spec §6's `label: str = "working"` default.
pub const DEFAULT_PROGRESS_LABEL: &str = "working";

/// Renders a live or finished run into outbound text.
pub trait Presenter: Send + Sync {
    /// Renders an in-progress run. Called on a cadence governed by the
    /// caller (see `RuntimeConfig::progress_edit_interval`), never on
    /// every single event. `label` distinguishes e.g. the very first
    /// render (`"starting"`) from later ones (`"working"`).
    fn render_progress(&self, state: &ProgressState, label: &str) -> RenderedMessage;

    /// Renders the finished run's final message. `status` is one of
    /// `"done"`, `"error"`, or `"cancelled"` (see `Outcome::status`).
    fn render_final(&self, state: &ProgressState, status: &str, resume_line: Option<&str>) -> RenderedMessage;
}

/// Plain-text presenter with no platform-specific formatting.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainPresenter;

impl Presenter for PlainPresenter {
    fn render_progress(&self, state: &ProgressState, label: &str) -> RenderedMessage {
        let mut lines = vec![format!("[{label}]")];
        if let Some(engine) = &state.engine {
            lines.push(format!("engine: {engine}"));
        }
        for action in &state.actions {
            lines.push(format!("- {} {}", action.kind, action.title));
        }
        if !state.text.is_empty() {
            lines.push(state.text.clone());
        }
        RenderedMessage::text(lines.join("\n"))
    }

    fn render_final(&self, state: &ProgressState, status: &str, resume_line: Option<&str>) -> RenderedMessage {
        let mut text = format!("[{status}]");
        if !state.text.is_empty() {
            text.push('\n');
            text.push_str(&state.text);
        }
        if let Some(line) = resume_line {
            if !line.is_empty() {
                text.push('\n');
                text.push_str(line);
            }
        }
        RenderedMessage::text(text)
    }
}

#[cfg(test)]
#[path = "presenter_tests.rs"]
mod tests;
