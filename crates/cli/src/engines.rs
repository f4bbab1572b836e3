// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the two reference [`agx_runner::engines`] implementations
//! into an [`AutoRouter`], detecting on `doctor`'s behalf whether each
//! engine's CLI binary is actually reachable.

use agx_core::EngineId;
use agx_router::{AutoRouter, EngineStatus, RunnerEntry};
use agx_runner::engines::{ClaudeRunner, CodexRunner};
use agx_runner::Runner;
use std::path::Path;
use std::sync::Arc;

/// Engine commands this binary knows how to wire up, matching
/// [`agx_core::config::RuntimeConfig`]'s defaults when a user config
/// does not override them.
pub struct EngineCommands {
    pub codex_cmd: String,
    pub claude_cmd: String,
}

impl Default for EngineCommands {
    fn default() -> Self {
        Self {
            codex_cmd: "codex".to_string(),
            claude_cmd: "claude".to_string(),
        }
    }
}

/// Builds the demo router with both reference engines, marking an
/// engine `missing_cli` (rather than failing to construct the router
/// at all) when its command is not on `PATH` — the router itself still
/// comes up, so `doctor` has something to report.
pub fn build_router(commands: &EngineCommands) -> Result<AutoRouter, agx_router::RouterError> {
    let entries = vec![
        entry_for(EngineId::new("codex"), &commands.codex_cmd, |cmd| Arc::new(CodexRunner::new(cmd.to_string()))),
        entry_for(EngineId::new("claude"), &commands.claude_cmd, |cmd| Arc::new(ClaudeRunner::new(cmd.to_string()))),
    ];
    AutoRouter::new(entries, EngineId::new("codex"))
}

fn entry_for(engine: EngineId, cmd: &str, build: impl FnOnce(&str) -> Arc<dyn Runner>) -> RunnerEntry {
    let runner = build(cmd);
    if binary_on_path(cmd) {
        RunnerEntry::new(engine, runner)
    } else {
        RunnerEntry::new(engine, runner).with_status(
            EngineStatus::MissingCli,
            Some(format!("`{cmd}` was not found on PATH")),
        )
    }
}

/// Whether `name` resolves to an executable file somewhere on `PATH`.
/// A plain, dependency-free stand-in for a `which` lookup — this
/// binary's only use of it is the `doctor` report, so a shell-out
/// isn't warranted.
fn binary_on_path(name: &str) -> bool {
    if name.contains(std::path::MAIN_SEPARATOR) {
        return is_executable_file(Path::new(name));
    }
    let Some(path_var) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path_var).any(|dir| is_executable_file(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
#[path = "engines_tests.rs"]
mod tests;
