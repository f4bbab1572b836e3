// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin, clap-free argument handling — this binary has exactly two
//! subcommands and neither needs a parser crate's subcommand trees,
//! shell completions, or derive macros.

use std::path::PathBuf;

#[derive(Debug)]
pub enum Command {
    /// Reports which configured engines are actually usable.
    Doctor,
    /// Runs one message end-to-end against an in-memory transport.
    Demo {
        config: Option<PathBuf>,
        message: String,
    },
    Help,
}

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("unknown subcommand {0:?}; run `agx help`")]
    UnknownCommand(String),
    #[error("{0} requires a value")]
    MissingValue(String),
}

pub fn parse(mut args: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let _argv0 = args.next();
    let Some(subcommand) = args.next() else {
        return Ok(Command::Help);
    };

    let mut config = None;
    let mut message = None;

    let mut rest = args.peekable();
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--config" => {
                config = Some(PathBuf::from(rest.next().ok_or_else(|| ArgsError::MissingValue("--config".to_string()))?));
            }
            "--message" | "-m" => {
                message = Some(rest.next().ok_or_else(|| ArgsError::MissingValue("--message".to_string()))?);
            }
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }

    match subcommand.as_str() {
        "doctor" => Ok(Command::Doctor),
        "demo" => Ok(Command::Demo {
            config,
            message: message.unwrap_or_else(|| "/codex what is 2+2?".to_string()),
        }),
        "help" | "--help" | "-h" => Ok(Command::Help),
        other => Err(ArgsError::UnknownCommand(other.to_string())),
    }
}

pub const USAGE: &str = "\
agx — engine-execution runtime demo binary

USAGE:
    agx doctor
    agx demo [--config PATH] [--message TEXT]
    agx help

COMMANDS:
    doctor    Reports which reference engines (codex, claude) are usable.
    demo      Runs one message through the full pipeline against an
              in-memory transport, printing every progress edit and the
              final message to stdout.
";

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
