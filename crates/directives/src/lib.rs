// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decodes `/engine`, `/project`, `@branch` directive tokens and
//! `` `ctx: ...` `` context lines from incoming chat text.
//!
//! Ported from `directives.py`'s `parse_directives`/`parse_context_line`/
//! `format_context_line`; this crate performs no I/O and holds no
//! registry of its own — engine ids and project aliases are passed in
//! by the caller on every call.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use agx_core::{EngineId, RunContext};
use std::collections::BTreeMap;

/// One registered project: the canonical lowercase key plus the alias
/// used to render it back into a `ctx:` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectEntry {
    pub alias: String,
}

/// The set of projects a directive parse is allowed to resolve
/// against, keyed by lowercased project name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectsConfig {
    pub projects: BTreeMap<String, ProjectEntry>,
}

impl ProjectsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, key: impl Into<String>, alias: impl Into<String>) -> Self {
        self.projects.insert(key.into(), ProjectEntry { alias: alias.into() });
        self
    }
}

/// Result of a successful directive parse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedDirectives {
    pub prompt: String,
    pub engine: Option<EngineId>,
    pub project: Option<String>,
    pub branch: Option<String>,
}

impl ParsedDirectives {
    fn verbatim(text: &str) -> Self {
        Self {
            prompt: text.to_string(),
            engine: None,
            project: None,
            branch: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("multiple engine directives")]
    MultipleEngineDirectives,
    #[error("multiple project directives")]
    MultipleProjectDirectives,
    #[error("multiple @branch directives")]
    MultipleBranchDirectives,
    #[error(
        "unknown project {0:?} in ctx line; start a new thread or add it back to your config"
    )]
    UnknownProjectInContext(String),
}

/// Scans the first non-blank line of `text` for `/engine`, `/project`,
/// and `@branch` tokens, consuming them left-to-right until the first
/// non-directive token. The unconsumed remainder (plus any other
/// lines) becomes `prompt`.
pub fn parse_directives(
    text: &str,
    engine_ids: &[EngineId],
    projects: &ProjectsConfig,
) -> Result<ParsedDirectives, DirectiveError> {
    if text.is_empty() {
        return Ok(ParsedDirectives::verbatim(text));
    }

    let mut lines: Vec<String> = split_lines(text);
    let idx = lines.iter().position(|line| !line.trim().is_empty());
    let Some(idx) = idx else {
        return Ok(ParsedDirectives::verbatim(text));
    };

    let line = lines[idx].trim_start().to_string();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(ParsedDirectives::verbatim(text));
    }

    let engine_map: BTreeMap<String, EngineId> = engine_ids
        .iter()
        .map(|e| (e.as_str().to_ascii_lowercase(), e.clone()))
        .collect();
    let project_map: BTreeMap<String, String> = projects
        .projects
        .keys()
        .map(|k| (k.to_ascii_lowercase(), k.clone()))
        .collect();

    let mut engine: Option<EngineId> = None;
    let mut project: Option<String> = None;
    let mut branch: Option<String> = None;
    let mut consumed = 0usize;

    for token in &tokens {
        if let Some(rest) = token.strip_prefix('/') {
            let name = rest.split('@').next().unwrap_or("");
            if name.is_empty() {
                break;
            }
            let key = name.to_ascii_lowercase();
            if let Some(engine_candidate) = engine_map.get(&key) {
                if engine.is_some() {
                    return Err(DirectiveError::MultipleEngineDirectives);
                }
                engine = Some(engine_candidate.clone());
                consumed += 1;
                continue;
            }
            if let Some(project_candidate) = project_map.get(&key) {
                if project.is_some() {
                    return Err(DirectiveError::MultipleProjectDirectives);
                }
                project = Some(project_candidate.clone());
                consumed += 1;
                continue;
            }
            break;
        }
        if let Some(value) = token.strip_prefix('@') {
            if value.is_empty() {
                break;
            }
            if branch.is_some() {
                return Err(DirectiveError::MultipleBranchDirectives);
            }
            branch = Some(value.to_string());
            consumed += 1;
            continue;
        }
        break;
    }

    if consumed == 0 {
        return Ok(ParsedDirectives::verbatim(text));
    }

    if consumed < tokens.len() {
        lines[idx] = tokens[consumed..].join(" ");
    } else {
        lines.remove(idx);
    }

    let prompt = lines.join("\n").trim().to_string();
    Ok(ParsedDirectives {
        prompt,
        engine,
        project,
        branch,
    })
}

/// Extracts an optional `RunContext` from a literal `` `ctx: <project>
/// [@<branch>]` `` line anywhere in `text` (the last matching line
/// wins). The line may be backtick-wrapped or bare.
pub fn parse_context_line(
    text: Option<&str>,
    projects: &ProjectsConfig,
) -> Result<Option<RunContext>, DirectiveError> {
    let Some(text) = text else {
        return Ok(None);
    };
    if text.is_empty() {
        return Ok(None);
    }

    let mut ctx = None;
    for line in text.lines() {
        let mut stripped = line.trim();
        if stripped.len() > 1 && stripped.starts_with('`') && stripped.ends_with('`') {
            stripped = stripped[1..stripped.len() - 1].trim();
        } else if let Some(rest) = stripped.strip_prefix('`') {
            stripped = rest.trim();
        } else if let Some(rest) = stripped.strip_suffix('`') {
            stripped = rest.trim();
        }
        if !stripped.to_ascii_lowercase().starts_with("ctx:") {
            continue;
        }
        let content = stripped.splitn(2, ':').nth(1).unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let project = tokens[0];
        let mut branch = None;
        if tokens.len() >= 2 {
            if tokens[1] == "@" && tokens.len() >= 3 {
                branch = Some(tokens[2].to_string());
            } else if let Some(rest) = tokens[1].strip_prefix('@') {
                branch = Some(rest.to_string());
            }
        }
        let project_key = project.to_ascii_lowercase();
        if !projects.projects.contains_key(&project_key) {
            return Err(DirectiveError::UnknownProjectInContext(project.to_string()));
        }
        ctx = Some(RunContext::new(Some(project_key), branch));
    }
    Ok(ctx)
}

/// Renders a `RunContext` back into the `` `ctx: ...` `` textual form
/// `parse_context_line` understands, using the project's configured
/// alias rather than its internal key.
pub fn format_context_line(context: Option<&RunContext>, projects: &ProjectsConfig) -> Option<String> {
    let context = context?;
    let project_key = context.project.as_ref()?;
    let alias = projects
        .projects
        .get(project_key)
        .map(|entry| entry.alias.clone())
        .unwrap_or_else(|| project_key.clone());
    Some(match &context.branch {
        Some(branch) if !branch.is_empty() => format!("`ctx: {alias} @{branch}`"),
        _ => format!("`ctx: {alias}`"),
    })
}

fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(|s| s.trim_end_matches('\r').to_string()).collect()
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[cfg(test)]
mod property_tests;
