// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `codex exec --json`, ported from
//! `original_source/src/takopi/runners/codex.py`.

use crate::core::{RunState, RunnerCore};
use crate::jsonl::JsonlSubprocessRunner;
use agx_core::{Action, ActionId, ActionKind, ResumeToken, TakopiEvent};
use regex::Regex;
use serde_json::Value;

const FINAL_ANSWER_KEY: &str = "final_answer";

fn resume_regex() -> Regex {
    Regex::new(r"(?im)^\s*`?codex\s+resume\s+(?P<token>[^`\s]+)`?\s*$")
        .expect("codex resume regex is a fixed, valid pattern")
}

/// Drives the `codex` CLI in non-interactive JSON-streaming mode.
pub struct CodexRunner {
    core: RunnerCore,
    codex_cmd: String,
    extra_args: Vec<String>,
    session_title: String,
}

impl CodexRunner {
    pub fn new(codex_cmd: impl Into<String>) -> Self {
        Self {
            core: RunnerCore::new("codex", resume_regex()),
            codex_cmd: codex_cmd.into(),
            extra_args: Vec::new(),
            session_title: "Codex".to_string(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    fn action_kind(item_type: &str) -> Option<ActionKind> {
        match item_type {
            "command_execution" => Some(ActionKind::Command),
            "mcp_tool_call" | "tool_call" => Some(ActionKind::Tool),
            "web_search" => Some(ActionKind::WebSearch),
            "file_change" => Some(ActionKind::FileChange),
            "reasoning" | "todo_list" => Some(ActionKind::Note),
            _ => None,
        }
    }

    fn translate_item(&self, item: &Value) -> Vec<TakopiEvent> {
        let item_type = item
            .get("type")
            .or_else(|| item.get("item_type"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let item_type = if item_type == "assistant_message" { "agent_message" } else { item_type };
        if item_type.is_empty() || item_type == "agent_message" {
            return Vec::new();
        }
        let Some(action_id) = item.get("id").and_then(Value::as_str) else {
            return Vec::new();
        };

        if item_type == "error" {
            let message = item
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("codex item error")
                .to_string();
            let action = Action::new(ActionId::from_string(short_id(action_id)), ActionKind::Warning, message);
            return vec![TakopiEvent::Action { action }];
        }

        let Some(kind) = Self::action_kind(item_type) else {
            return Vec::new();
        };

        let title = match kind {
            ActionKind::Command => item.get("command").and_then(Value::as_str).unwrap_or_default().to_string(),
            ActionKind::Tool => {
                let server = item.get("server").and_then(Value::as_str);
                let tool = item.get("tool").and_then(Value::as_str).or_else(|| item.get("name").and_then(Value::as_str));
                match (server, tool) {
                    (Some(s), Some(t)) => format!("{s}.{t}"),
                    (None, Some(t)) => t.to_string(),
                    _ => "tool".to_string(),
                }
            }
            ActionKind::WebSearch => item.get("query").and_then(Value::as_str).unwrap_or_default().to_string(),
            ActionKind::FileChange => {
                let changes = item.get("changes").and_then(Value::as_array);
                match changes {
                    Some(list) if !list.is_empty() => format!("{} files", list.len()),
                    _ => "files".to_string(),
                }
            }
            ActionKind::Note if item_type == "todo_list" => {
                let done = item
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter(|i| i.get("completed").and_then(Value::as_bool).unwrap_or(false)).count())
                    .unwrap_or(0);
                let total = item.get("items").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
                format!("todo {done}/{total}")
            }
            ActionKind::Note => item.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
            _ => String::new(),
        };

        let action = Action::new(ActionId::from_string(short_id(action_id)), kind, title);
        vec![TakopiEvent::Action { action }]
    }
}

/// Action ids from the engine are arbitrary strings; truncate so the
/// generated `ActionId` stays within its fixed inline buffer.
fn short_id(raw: &str) -> String {
    let max = 18;
    if raw.len() <= max {
        raw.to_string()
    } else {
        raw[..max].to_string()
    }
}

impl JsonlSubprocessRunner for CodexRunner {
    fn core(&self) -> &RunnerCore {
        &self.core
    }

    fn command(&self) -> &str {
        &self.codex_cmd
    }

    fn build_args(&self, _prompt: &str, resume: Option<&ResumeToken>, _state: &RunState) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.push("exec".to_string());
        args.push("--json".to_string());
        match resume {
            Some(token) => {
                args.push("resume".to_string());
                args.push(token.value.to_string());
                args.push("-".to_string());
            }
            None => args.push("-".to_string()),
        }
        args
    }

    fn translate(
        &self,
        data: &Value,
        state: &mut RunState,
        resume: Option<&ResumeToken>,
        found_session: Option<&ResumeToken>,
    ) -> Result<Vec<TakopiEvent>, String> {
        let etype = data.get("type").and_then(Value::as_str).unwrap_or_default();

        match etype {
            "thread.started" => {
                let thread_id = data.get("thread_id").and_then(Value::as_str);
                match thread_id {
                    Some(id) => Ok(vec![TakopiEvent::Started {
                        engine: self.core.engine.clone(),
                        resume: Some(ResumeToken::new(self.core.engine.clone(), id)),
                    }]),
                    None => Ok(Vec::new()),
                }
            }
            "error" => {
                let message = data.get("message").and_then(Value::as_str).unwrap_or("codex error").to_string();
                let fatal = data.get("fatal").map(|v| v.is_null() || v.as_bool() == Some(true)).unwrap_or(true);
                if fatal {
                    let resume_for_completed = found_session.or(resume).cloned();
                    let answer = state.extra.get(FINAL_ANSWER_KEY).and_then(Value::as_str).unwrap_or_default().to_string();
                    Ok(vec![TakopiEvent::Completed { ok: false, answer, resume: resume_for_completed, error: Some(message) }])
                } else {
                    Ok(vec![self.note_event(message, state, Vec::new())])
                }
            }
            "turn.failed" => {
                let message = data
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("codex turn failed")
                    .to_string();
                let resume_for_completed = found_session.or(resume).cloned();
                let answer = state.extra.get(FINAL_ANSWER_KEY).and_then(Value::as_str).unwrap_or_default().to_string();
                Ok(vec![TakopiEvent::Completed { ok: false, answer, resume: resume_for_completed, error: Some(message) }])
            }
            "turn.rate_limited" => {
                let message = match data.get("retry_after_ms").and_then(Value::as_i64) {
                    Some(ms) => format!("rate limited (retry after {ms}ms)"),
                    None => "rate limited".to_string(),
                };
                Ok(vec![self.note_event(message, state, Vec::new())])
            }
            "turn.completed" => {
                let resume_for_completed = found_session.or(resume).cloned();
                let answer = state.extra.get(FINAL_ANSWER_KEY).and_then(Value::as_str).unwrap_or_default().to_string();
                Ok(vec![TakopiEvent::Completed { ok: true, answer, resume: resume_for_completed, error: None }])
            }
            "item.completed" => {
                let item = data.get("item").cloned().unwrap_or(Value::Null);
                let item_type = item
                    .get("type")
                    .or_else(|| item.get("item_type"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let item_type = if item_type == "assistant_message" { "agent_message" } else { item_type };
                if item_type == "agent_message" {
                    if let Some(text) = item.get("text").and_then(Value::as_str) {
                        state.extra.insert(FINAL_ANSWER_KEY.to_string(), Value::String(text.to_string()));
                    }
                    return Ok(Vec::new());
                }
                Ok(self.translate_item(&item))
            }
            "item.started" | "item.updated" => Ok(Vec::new()),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "codex_tests.rs"]
mod tests;
