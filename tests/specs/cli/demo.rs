//! `agx demo` against engines this test environment does not have
//! installed — the CLI should report which engine is unavailable
//! rather than hang trying to spawn a binary that doesn't exist.

use crate::prelude::*;

#[test]
fn demo_reports_when_the_requested_engine_is_unavailable() {
    let output = fails(cli().args(["demo", "--message", "/codex say hi"]));
    output.stderr_has("unavailable");
}

#[test]
fn demo_rejects_an_unconfigured_engine_directive() {
    let output = fails(cli().args(["demo", "--message", "/not-a-real-engine say hi"]));
    // Falls through to the default engine (codex) since the token
    // isn't recognised as a directive at all; still unavailable in
    // this environment.
    output.stderr_has("unavailable");
}
