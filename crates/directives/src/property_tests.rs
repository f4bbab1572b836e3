// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the directive grammar's round-trip and
//! no-directive-consumed invariants.

use super::*;
use proptest::prelude::*;

fn project_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn branch_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9/_-]{0,11}"
}

fn arb_projects(keys: Vec<String>) -> ProjectsConfig {
    keys.into_iter().fold(ProjectsConfig::new(), |cfg, key| {
        let alias = key.to_ascii_uppercase();
        cfg.with_project(key, alias)
    })
}

proptest! {
    /// `format_context_line` followed by `parse_context_line` always
    /// recovers the same project key and branch it was given.
    #[test]
    fn context_line_round_trips(
        key in project_key(),
        branch in proptest::option::of(branch_name()),
    ) {
        let projects = arb_projects(vec![key.clone()]);
        let context = RunContext::new(Some(key.clone()), branch.clone());
        let line = format_context_line(Some(&context), &projects).expect("a project key always renders");

        let parsed = parse_context_line(Some(&line), &projects)
            .expect("a round-tripped line always names a known project")
            .expect("a rendered ctx line is always recognised");

        prop_assert_eq!(parsed.project, Some(key));
        prop_assert_eq!(parsed.branch, branch);
    }

    /// A rendered `ctx:` line still round-trips when surrounded by
    /// other, unrelated lines of text (the parser scans every line).
    #[test]
    fn context_line_round_trips_when_embedded_in_other_text(
        key in project_key(),
        prefix in "[^`\n]{0,20}",
        suffix in "[^`\n]{0,20}",
    ) {
        let projects = arb_projects(vec![key.clone()]);
        let context = RunContext::new(Some(key.clone()), None);
        let line = format_context_line(Some(&context), &projects).unwrap();
        let text = format!("{prefix}\n{line}\n{suffix}");

        let parsed = parse_context_line(Some(&text), &projects).unwrap().unwrap();
        prop_assert_eq!(parsed.project, Some(key));
    }

    /// Text whose first non-blank line contains no `/` or `@` token at
    /// all is always returned as the prompt verbatim, with no engine,
    /// project, or branch resolved, regardless of the known engine or
    /// project sets.
    #[test]
    fn text_without_directive_tokens_passes_through_untouched(
        text in "[a-zA-Z0-9 .,!?/@]{0,40}",
        engine_names in proptest::collection::vec("[a-z]{3,8}", 0..4),
    ) {
        // Guard: the generated text must not accidentally start a
        // directive once leading/trailing whitespace is trimmed.
        prop_assume!(!text.trim_start().starts_with('/') && !text.trim_start().starts_with('@'));

        let engines: Vec<EngineId> = engine_names.into_iter().map(EngineId::new).collect();
        let parsed = parse_directives(&text, &engines, &ProjectsConfig::new()).unwrap();

        prop_assert_eq!(parsed.engine, None);
        prop_assert_eq!(parsed.project, None);
        prop_assert_eq!(parsed.branch, None);
    }
}
