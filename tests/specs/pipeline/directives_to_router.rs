//! Directive parsing feeding straight into router resolution: the
//! token a user types (`/claude`, `/project @branch`, an unknown
//! engine, or nothing at all) should land on the router entry a real
//! deployment would pick.

use crate::prelude::*;

use agx_core::{EngineId, ResumeToken, TakopiEvent, WrongEngine};
use agx_directives::{parse_directives, ProjectsConfig};
use agx_router::{AutoRouter, EngineStatus, RunnerEntry};
use agx_runner::{Runner, RunnerError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// A `Runner` that never actually spawns anything; only its identity
/// and resume-token formatting matter to these specs.
struct StubRunner {
    engine: EngineId,
}

#[async_trait]
impl Runner for StubRunner {
    fn engine(&self) -> &EngineId {
        &self.engine
    }

    fn is_resume_line(&self, line: &str) -> bool {
        line.starts_with(&format!("{} resume ", self.engine))
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        if token.engine != self.engine {
            return Err(WrongEngine { expected: self.engine.clone(), actual: token.engine.clone() });
        }
        Ok(format!("`{} resume {}`", self.engine, token.value))
    }

    fn extract_resume(&self, text: Option<&str>) -> Option<ResumeToken> {
        let text = text?;
        let prefix = format!("{} resume ", self.engine);
        let value = text.strip_prefix(&prefix)?;
        Some(ResumeToken::new(self.engine.clone(), value.trim()))
    }

    async fn run(
        &self,
        _prompt: String,
        _resume: Option<ResumeToken>,
        _tx: UnboundedSender<TakopiEvent>,
        _cancel: CancellationToken,
        _cwd: Option<&Path>,
    ) -> Result<(), RunnerError> {
        Ok(())
    }
}

fn router_with(entries: Vec<RunnerEntry>, default: &str) -> AutoRouter {
    AutoRouter::new(entries, EngineId::new(default)).expect("router builds from well-formed entries")
}

fn two_engine_router() -> AutoRouter {
    router_with(
        vec![
            RunnerEntry::new(EngineId::new("codex"), Arc::new(StubRunner { engine: EngineId::new("codex") })),
            RunnerEntry::new(EngineId::new("claude"), Arc::new(StubRunner { engine: EngineId::new("claude") })),
        ],
        "codex",
    )
}

#[test]
fn an_engine_directive_routes_to_that_engines_runner() {
    let router = two_engine_router();
    let engine_ids: Vec<_> = router.engine_ids().cloned().collect();
    let parsed = parse_directives("/claude fix the bug", &engine_ids, &ProjectsConfig::new()).unwrap();

    assert_eq!(parsed.engine, Some(EngineId::new("claude")));
    assert_eq!(parsed.prompt, "fix the bug");

    let entry = router.entry_for_engine(parsed.engine.as_ref()).unwrap();
    assert_eq!(entry.engine, EngineId::new("claude"));
}

#[test]
fn no_directive_falls_back_to_the_default_engine() {
    let router = two_engine_router();
    let engine_ids: Vec<_> = router.engine_ids().cloned().collect();
    let parsed = parse_directives("just a plain message", &engine_ids, &ProjectsConfig::new()).unwrap();

    assert_eq!(parsed.engine, None);
    let entry = router.entry_for_engine(parsed.engine.as_ref()).unwrap();
    assert_eq!(entry.engine, *router.default_engine());
}

#[test]
fn an_unconfigured_engine_token_is_left_in_the_prompt_and_falls_back_by_default() {
    let router = two_engine_router();
    // "gemini" isn't a token in the router's engine list, so the
    // directive parser treats it as ordinary prompt text rather than
    // an engine directive.
    let engine_ids: Vec<_> = router.engine_ids().cloned().collect();
    let parsed = parse_directives("/gemini say hi", &engine_ids, &ProjectsConfig::new()).unwrap();

    assert_eq!(parsed.engine, None);
    assert_eq!(parsed.prompt, "/gemini say hi");
    let entry = router.entry_for_engine(parsed.engine.as_ref()).unwrap();
    assert_eq!(entry.engine, *router.default_engine());
}

#[test]
fn an_unavailable_engine_is_resolved_but_rejected_at_the_runner_lookup() {
    let router = router_with(
        vec![
            RunnerEntry::new(EngineId::new("codex"), Arc::new(StubRunner { engine: EngineId::new("codex") })),
            RunnerEntry::new(EngineId::new("claude"), Arc::new(StubRunner { engine: EngineId::new("claude") }))
                .with_status(EngineStatus::MissingCli, Some("claude not on PATH".to_string())),
        ],
        "codex",
    );
    let engine_ids: Vec<_> = router.engine_ids().cloned().collect();
    let parsed = parse_directives("/claude say hi", &engine_ids, &ProjectsConfig::new()).unwrap();

    let entry = router.entry_for_engine(parsed.engine.as_ref()).unwrap();
    assert!(!entry.available());

    let error = router.runner_for(Some(&ResumeToken::new("claude", "T1"))).unwrap_err();
    assert!(error.to_string().contains("claude"));
}

#[test]
fn a_resume_line_in_the_reply_text_routes_to_the_engine_that_produced_it() {
    let router = two_engine_router();
    let resume_line = "claude resume abc123";

    let token = router.resolve_resume(None, Some(resume_line)).expect("resume token recovered from reply text");
    assert_eq!(token, ResumeToken::new("claude", "abc123"));

    let entry = router.entry_for(Some(&token)).unwrap();
    assert_eq!(entry.engine, EngineId::new("claude"));
}
