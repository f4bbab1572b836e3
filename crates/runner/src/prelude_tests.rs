// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agx_core::{Action, ActionId, ActionKind};
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tokio_util::sync::CancellationToken;

struct StubRunner {
    engine: EngineId,
}

#[async_trait]
impl Runner for StubRunner {
    fn engine(&self) -> &EngineId {
        &self.engine
    }

    fn is_resume_line(&self, _line: &str) -> bool {
        false
    }

    fn format_resume(&self, token: &ResumeToken) -> Result<String, WrongEngine> {
        Ok(format!("`{} resume {}`", self.engine, token.value))
    }

    fn extract_resume(&self, _text: Option<&str>) -> Option<ResumeToken> {
        None
    }

    async fn run(
        &self,
        _prompt: String,
        _resume: Option<ResumeToken>,
        tx: UnboundedSender<TakopiEvent>,
        _cancel: CancellationToken,
        _cwd: Option<&std::path::Path>,
    ) -> Result<(), RunnerError> {
        let _ = tx.send(TakopiEvent::Completed { ok: true, answer: "done".into(), resume: None, error: None });
        Ok(())
    }
}

fn warning_event() -> TakopiEvent {
    TakopiEvent::Action {
        action: Action::new(ActionId::new(), ActionKind::Warning, "reasoning override ignored"),
    }
}

#[tokio::test]
async fn prelude_events_are_sent_before_the_inner_runner_runs() {
    let inner: Arc<dyn Runner> = Arc::new(StubRunner { engine: EngineId::new("claude") });
    let wrapped = PreludeRunner::new(inner, vec![warning_event()]);

    let (tx, mut rx) = unbounded_channel();
    let cancel = CancellationToken::new();
    wrapped.run(String::new(), None, tx, cancel, None).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert!(matches!(first, TakopiEvent::Action { .. }));
    let second = rx.recv().await.unwrap();
    assert!(matches!(second, TakopiEvent::Completed { ok: true, .. }));
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn delegates_engine_and_resume_formatting_to_the_inner_runner() {
    let inner: Arc<dyn Runner> = Arc::new(StubRunner { engine: EngineId::new("claude") });
    let wrapped = PreludeRunner::new(inner, Vec::new());

    assert_eq!(wrapped.engine(), &EngineId::new("claude"));
    let token = ResumeToken::new("claude", "abc");
    assert_eq!(wrapped.format_resume(&token).unwrap(), "`claude resume abc`");
}
