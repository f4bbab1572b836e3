// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agx_core::{TakopiEvent, WrongEngine};
use agx_runner::RunnerError;
use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

struct StubRunner {
    engine: EngineId,
}

impl StubRunner {
    fn entry(engine: &str) -> RunnerEntry {
        RunnerEntry::new(EngineId::new(engine), std::sync::Arc::new(Self { engine: EngineId::new(engine) }))
    }
}

#[async_trait]
impl Runner for StubRunner {
    fn engine(&self) -> &EngineId {
        &self.engine
    }

    fn is_resume_line(&self, line: &str) -> bool {
        line.starts_with(&format!("`{} resume", self.engine))
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        if token.engine != self.engine {
            return Err(WrongEngine { expected: self.engine.clone(), actual: token.engine.clone() });
        }
        Ok(format!("`{} resume {}`", self.engine, token.value))
    }

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        let text = text?;
        let prefix = format!("`{} resume ", self.engine);
        text.strip_prefix(&prefix).map(|rest| ResumeToken::new(self.engine.clone(), rest.trim_end_matches('`')))
    }

    async fn run(
        &self,
        _prompt: String,
        _resume: Option<ResumeToken>,
        _tx: UnboundedSender<TakopiEvent>,
        _cancel: CancellationToken,
    ) -> Result<(), RunnerError> {
        Ok(())
    }
}

fn two_engine_router() -> AutoRouter {
    AutoRouter::new(vec![StubRunner::entry("codex"), StubRunner::entry("claude")], EngineId::new("codex")).unwrap()
}

#[test]
fn construction_rejects_an_empty_entry_list() {
    let err = AutoRouter::new(Vec::new(), EngineId::new("codex")).unwrap_err();
    assert!(matches!(err, RouterError::NoEntries));
}

#[test]
fn construction_rejects_duplicate_engines() {
    let err = AutoRouter::new(vec![StubRunner::entry("codex"), StubRunner::entry("codex")], EngineId::new("codex")).unwrap_err();
    assert!(matches!(err, RouterError::DuplicateEngine(_)));
}

#[test]
fn construction_rejects_an_unconfigured_default_engine() {
    let err = AutoRouter::new(vec![StubRunner::entry("codex")], EngineId::new("claude")).unwrap_err();
    assert!(matches!(err, RouterError::DefaultEngineNotConfigured(_)));
}

#[test]
fn entry_for_falls_back_to_the_default_engine_when_no_resume_token() {
    let router = two_engine_router();
    let entry = router.entry_for(None).unwrap();
    assert_eq!(entry.engine, EngineId::new("codex"));
}

#[test]
fn entry_for_engine_follows_a_resume_tokens_engine() {
    let router = two_engine_router();
    let token = ResumeToken::new("claude", "abc");
    let entry = router.entry_for(Some(&token)).unwrap();
    assert_eq!(entry.engine, EngineId::new("claude"));
}

#[test]
fn entry_for_engine_errors_on_an_unconfigured_engine() {
    let router = two_engine_router();
    let err = router.entry_for_engine(Some(&EngineId::new("gemini"))).unwrap_err();
    assert_eq!(err.engine, EngineId::new("gemini"));
}

#[test]
fn runner_for_errors_when_the_entry_is_unavailable() {
    let entry = StubRunner::entry("codex").with_status(EngineStatus::MissingCli, Some("binary not found".into()));
    let router = AutoRouter::new(vec![entry], EngineId::new("codex")).unwrap();
    let err = router.runner_for(None).unwrap_err();
    assert_eq!(err.issue.as_deref(), Some("binary not found"));
}

#[test]
fn bad_config_entries_are_still_available() {
    let entry = StubRunner::entry("codex").with_status(EngineStatus::BadConfig, Some("using defaults".into()));
    assert!(entry.available());
}

#[test]
fn extract_resume_tries_every_entry_in_order() {
    let router = two_engine_router();
    let token = router.extract_resume(Some("`claude resume sess-1`")).unwrap();
    assert_eq!(token.engine, EngineId::new("claude"));
    assert_eq!(token.value, "sess-1");
}

#[test]
fn resolve_resume_falls_back_to_reply_text() {
    let router = two_engine_router();
    let token = router.resolve_resume(Some("no token here"), Some("`codex resume sess-9`")).unwrap();
    assert_eq!(token.value, "sess-9");
}

#[test]
fn format_resume_delegates_to_the_owning_runner() {
    let router = two_engine_router();
    let token = ResumeToken::new("claude", "sess-1");
    assert_eq!(router.format_resume(&token).unwrap(), "`claude resume sess-1`");
}

#[test]
fn is_resume_line_checks_every_entry() {
    let router = two_engine_router();
    assert!(router.is_resume_line("`claude resume sess-1`"));
    assert!(!router.is_resume_line("just a normal message"));
}
