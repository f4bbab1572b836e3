// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use agx_core::{EngineId, WrongEngine};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    WrongEngine(#[from] WrongEngine),

    #[error("failed to spawn subprocess: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("{0}")]
    PipesUnavailable(String),

    #[error("{tag} emitted session token for engine {actual:?}")]
    WrongEngineSession { tag: String, actual: EngineId },

    #[error("{tag} emitted session id {actual} but expected {expected}")]
    UnexpectedSession {
        tag: String,
        expected: String,
        actual: String,
    },
}
