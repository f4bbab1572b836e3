// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `agx`: the entry point wiring a demo transport and the two
//! reference engine runners to the engine-execution runtime, plus a
//! `doctor`-style health report. None of this binary's wiring is part
//! of the runtime itself (spec §1) — it exists so the workspace ships
//! a runnable, testable end-to-end path.

mod args;
mod config;
mod demo;
mod demo_transport;
mod doctor;
mod engines;
mod logging;

use args::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let command = match args::parse(std::env::args()) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("{error}\n");
            eprintln!("{}", args::USAGE);
            std::process::exit(2);
        }
    };

    match command {
        Command::Doctor => doctor::run(),
        Command::Demo { config, message } => demo::run(config, message).await,
        Command::Help => {
            print!("{}", args::USAGE);
            Ok(())
        }
    }
}
