// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agx doctor`: a structured health report over the configured
//! engines, the Rust analogue of the Python bridge's startup log line
//! listing which runners came up clean.

use crate::engines::{build_router, EngineCommands};
use agx_router::EngineStatus;

pub fn run() -> anyhow::Result<()> {
    let router = build_router(&EngineCommands::default())?;

    println!("{:<10} {:<8} {}", "ENGINE", "STATUS", "ISSUE");
    for entry in router.entries() {
        let status = match entry.status {
            EngineStatus::Ok => "ok",
            EngineStatus::MissingCli => "missing_cli",
            EngineStatus::BadConfig => "bad_config",
            EngineStatus::LoadError => "load_error",
        };
        println!("{:<10} {:<8} {}", entry.engine.to_string(), status, entry.issue.as_deref().unwrap_or("-"));
    }

    let unavailable = router.entries().iter().filter(|entry| !entry.available()).count();
    if unavailable > 0 {
        println!("\n{unavailable} engine(s) unavailable; runs against them will be rejected by the router.");
    } else {
        println!("\nall engines available.");
    }
    Ok(())
}

#[cfg(test)]
#[path = "doctor_tests.rs"]
mod tests;
