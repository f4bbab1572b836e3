// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions: the individual steps an engine reports while it works
//! (tool calls, file edits, web searches, notes...).

use std::collections::BTreeMap;

crate::define_id! {
    /// Identifies one action within a single engine session. Unique only
    /// for the lifetime of that session, not globally.
    pub struct ActionId("actn");
}

/// What kind of thing an [`Action`] represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Command,
    Tool,
    FileChange,
    WebSearch,
    Subagent,
    Note,
    Turn,
    Warning,
    Telemetry,
}

crate::simple_display! {
    ActionKind {
        Command => "command",
        Tool => "tool",
        FileChange => "file_change",
        WebSearch => "web_search",
        Subagent => "subagent",
        Note => "note",
        Turn => "turn",
        Warning => "warning",
        Telemetry => "telemetry",
    }
}

/// One reported step of engine activity.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    pub title: String,
    pub detail: BTreeMap<String, String>,
}

impl Action {
    pub fn new(id: ActionId, kind: ActionKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            detail: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
