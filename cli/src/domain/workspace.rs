//! Workspace naming and id extraction.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid pattern")
});

/// How a workspace id was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    /// From `fab get <ws> -q id`.
    Structured,
    /// Scraped from free text because the structured query gave nothing.
    PatternFallback,
}

/// A resolved workspace id and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub source: IdSource,
}

/// CLI item path of a workspace (`<name>.Workspace`).
#[must_use]
pub fn item_path(name: &str) -> String {
    format!("{name}.Workspace")
}

/// Interpret the stdout of a successful structured id query.
///
/// Returns `None` for empty output or `None`/`null` literals.
#[must_use]
pub fn structured_id(stdout: &str) -> Option<String> {
    let value = stdout.trim().trim_matches('"').trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") || value == "null" {
        return None;
    }
    Some(value.to_string())
}

/// First UUID-shaped substring of `text`, lowercased.
#[must_use]
pub fn extract_uuid(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    UUID_PATTERN.find(&lower).map(|m| m.as_str().to_string())
}

// ── Feature branch workspaces ────────────────────────────────────────────────

/// Capacity backing a feature workspace of the given type.
#[must_use]
pub fn feature_capacity(workspace_type: &str, solution_version: &str) -> Option<String> {
    match workspace_type {
        "processing" | "datastores" => Some(format!("fc{solution_version}devengineering")),
        "consumption" => Some(format!("fc{solution_version}devconsumption")),
        _ => None,
    }
}

/// `<solution_version>-<branch>-<type>`.
#[must_use]
pub fn feature_workspace_name(solution_version: &str, branch: &str, workspace_type: &str) -> String {
    format!("{solution_version}-{branch}-{workspace_type}")
}

/// Repository folder a feature workspace syncs with.
#[must_use]
pub fn feature_git_directory(workspace_type: &str) -> String {
    format!("solution/{workspace_type}/")
}

/// Split a comma-separated list of workspace types.
#[must_use]
pub fn parse_type_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// `true` for workspaces that track the dev branch.
#[must_use]
pub fn is_dev_workspace(name: &str) -> bool {
    name.contains("-dev-")
}
