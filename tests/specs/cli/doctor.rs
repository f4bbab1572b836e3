//! `agx doctor` health report.

use crate::prelude::*;

#[test]
fn doctor_reports_both_reference_engines() {
    let output = passes(cli().arg("doctor"));
    output.stdout_has("ENGINE");
    output.stdout_has("codex");
    output.stdout_has("claude");
}

#[test]
fn doctor_rejects_unexpected_flags() {
    // `doctor` takes no flags of its own; one that isn't recognised by
    // the shared flag loop still fails the whole invocation.
    let output = fails(cli().args(["doctor", "--bogus"]));
    output.stderr_has("--bogus");
}
