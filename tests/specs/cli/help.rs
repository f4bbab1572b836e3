//! `agx help` / no-args output.

use crate::prelude::*;

#[test]
fn no_args_prints_usage() {
    let output = passes(cli());
    output.stdout_has("agx — engine-execution runtime demo binary");
}

#[test]
fn help_subcommand_prints_usage() {
    let output = passes(cli().arg("help"));
    output.stdout_has("USAGE:");
    output.stdout_has("doctor");
    output.stdout_has("demo");
}

#[test]
fn unknown_subcommand_fails_and_prints_usage_to_stderr() {
    let output = fails(cli().arg("bogus"));
    output.stderr_has("bogus");
}
