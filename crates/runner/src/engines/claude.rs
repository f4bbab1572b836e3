// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `claude -p --output-format stream-json`, ported from
//! `original_source/src/takopi/runners/claude.py`.
//!
//! The resume line this runner recognises and emits,
//! `` `claude --session <token>` ``, is the alternate textual form the
//! specification's directive grammar treats as equally valid to the
//! `--resume`/`-r` form the Python original used; see DESIGN.md.

use crate::core::{RunState, RunnerCore};
use crate::jsonl::JsonlSubprocessRunner;
use agx_core::{Action, ActionId, ActionKind, ResumeToken, TakopiEvent, WrongEngine};
use regex::Regex;
use serde_json::Value;

const LAST_TEXT_KEY: &str = "last_assistant_text";

fn resume_regex() -> Regex {
    Regex::new(r"(?im)^\s*`?claude\s+--session\s+(?P<token>[^`\s]+)`?\s*$")
        .expect("claude resume regex is a fixed, valid pattern")
}

/// Drives the `claude` CLI in non-interactive streaming-JSON mode.
pub struct ClaudeRunner {
    core: RunnerCore,
    claude_cmd: String,
    model: Option<String>,
    allowed_tools: Vec<String>,
    dangerously_skip_permissions: bool,
}

impl ClaudeRunner {
    pub fn new(claude_cmd: impl Into<String>) -> Self {
        Self {
            core: RunnerCore::new("claude", resume_regex()),
            claude_cmd: claude_cmd.into(),
            model: None,
            allowed_tools: Vec::new(),
            dangerously_skip_permissions: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    pub fn with_dangerously_skip_permissions(mut self, skip: bool) -> Self {
        self.dangerously_skip_permissions = skip;
        self
    }

    fn tool_kind_and_title(name: &str, tool_input: &Value) -> (ActionKind, String) {
        let path = |key: &str| tool_input.get(key).and_then(Value::as_str).map(str::to_string);
        match name {
            "Bash" | "Shell" | "KillShell" => {
                let command = tool_input.get("command").and_then(Value::as_str).unwrap_or(name).to_string();
                (ActionKind::Command, command)
            }
            "Edit" | "Write" | "NotebookEdit" | "MultiEdit" => {
                let display = path("file_path").or_else(|| path("path")).unwrap_or_else(|| name.to_string());
                (ActionKind::FileChange, display)
            }
            "Read" => (ActionKind::Tool, format!("read: `{}`", path("file_path").or_else(|| path("path")).unwrap_or_default())),
            "Glob" => (ActionKind::Tool, format!("glob: `{}`", tool_input.get("pattern").and_then(Value::as_str).unwrap_or_default())),
            "Grep" => (ActionKind::Tool, format!("grep: `{}`", tool_input.get("pattern").and_then(Value::as_str).unwrap_or_default())),
            "WebSearch" => (ActionKind::WebSearch, tool_input.get("query").and_then(Value::as_str).unwrap_or_default().to_string()),
            "Task" => (ActionKind::Subagent, tool_input.get("description").and_then(Value::as_str).unwrap_or("subagent").to_string()),
            other => (ActionKind::Tool, other.to_string()),
        }
    }
}

impl JsonlSubprocessRunner for ClaudeRunner {
    fn core(&self) -> &RunnerCore {
        &self.core
    }

    fn command(&self) -> &str {
        &self.claude_cmd
    }

    fn build_args(&self, prompt: &str, resume: Option<&ResumeToken>, _state: &RunState) -> Vec<String> {
        let mut args = vec!["-p".to_string(), "--output-format".to_string(), "stream-json".to_string(), "--verbose".to_string()];
        if let Some(token) = resume {
            args.push("--resume".to_string());
            args.push(token.value.to_string());
        }
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if !self.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(self.allowed_tools.join(","));
        }
        if self.dangerously_skip_permissions {
            args.push("--dangerously-skip-permissions".to_string());
        }
        args.push("--".to_string());
        args.push(prompt.to_string());
        args
    }

    fn stdin_payload(&self, _prompt: &str, _resume: Option<&ResumeToken>, _state: &RunState) -> Option<Vec<u8>> {
        None
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        if token.engine != self.core.engine {
            return Err(WrongEngine { expected: self.core.engine.clone(), actual: token.engine.clone() });
        }
        Ok(format!("`claude --session {}`", token.value))
    }

    fn translate(
        &self,
        data: &Value,
        state: &mut RunState,
        _resume: Option<&ResumeToken>,
        _found_session: Option<&ResumeToken>,
    ) -> Result<Vec<TakopiEvent>, String> {
        let etype = data.get("type").and_then(Value::as_str).unwrap_or_default();

        match etype {
            "system" if data.get("subtype").and_then(Value::as_str) == Some("init") => {
                let Some(session_id) = data.get("session_id").and_then(Value::as_str) else {
                    return Ok(Vec::new());
                };
                Ok(vec![TakopiEvent::Started {
                    engine: self.core.engine.clone(),
                    resume: Some(ResumeToken::new(self.core.engine.clone(), session_id)),
                }])
            }
            "assistant" => {
                let Some(blocks) = data.get("message").and_then(|m| m.get("content")).and_then(Value::as_array) else {
                    return Ok(Vec::new());
                };
                let mut events = Vec::new();
                for content in blocks {
                    match content.get("type").and_then(Value::as_str) {
                        Some("tool_use") => {
                            let name = content.get("name").and_then(Value::as_str).unwrap_or("tool");
                            let default_input = Value::Object(Default::default());
                            let input = content.get("input").unwrap_or(&default_input);
                            let (kind, title) = Self::tool_kind_and_title(name, input);
                            let id = content.get("id").and_then(Value::as_str).unwrap_or("tool_use");
                            events.push(TakopiEvent::Action { action: Action::new(ActionId::from_string(short_id(id)), kind, title) });
                        }
                        Some("text") => {
                            if let Some(text) = content.get("text").and_then(Value::as_str) {
                                state.extra.insert(LAST_TEXT_KEY.to_string(), Value::String(text.to_string()));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(events)
            }
            "result" => {
                let ok = !data.get("is_error").and_then(Value::as_bool).unwrap_or(false);
                let last_text = state.extra.get(LAST_TEXT_KEY).and_then(Value::as_str).unwrap_or_default().to_string();
                let mut answer = data.get("result").and_then(Value::as_str).unwrap_or_default().to_string();
                if ok && answer.is_empty() {
                    answer = last_text;
                }
                let resume = data
                    .get("session_id")
                    .and_then(Value::as_str)
                    .map(|id| ResumeToken::new(self.core.engine.clone(), id));
                let error = if ok {
                    None
                } else {
                    Some(
                        data.get("error")
                            .and_then(Value::as_str)
                            .unwrap_or("claude reported an error")
                            .to_string(),
                    )
                };
                Ok(vec![TakopiEvent::Completed { ok, answer, resume, error }])
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn short_id(raw: &str) -> String {
    let max = 18;
    if raw.len() <= max {
        raw.to_string()
    } else {
        raw[..max].to_string()
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
