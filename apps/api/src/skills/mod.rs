//! Skill index over stored profiles: tolerant cell parsing, the union of
//! known skills, and AND-filtering by a skill selection.

pub mod handlers;

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::literal::parse_python_literal;
use crate::models::Profile;

/// Parses a serialized skills cell back into a list.
///
/// Accepts JSON list literals (what this service writes), Python-style list
/// literals (legacy rows), and bare comma-separated text. Never fails: a cell
/// that cannot be read yields an empty list.
pub fn parse_skill_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Vec::new();
    }

    if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
        return clean(list);
    }
    if let Some(list) = parse_python_literal(trimmed)
        .and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
    {
        return clean(list);
    }

    let pieces = split_commas(trimmed);
    if pieces.iter().any(|p| p.contains(['[', ']', '{', '}'])) {
        debug!("Unreadable skills cell, treating as empty: {trimmed}");
        return Vec::new();
    }
    pieces
}

/// Union of every row's skills.
pub fn all_skills(rows: &[Profile]) -> BTreeSet<String> {
    rows.iter()
        .flat_map(|row| row.skills.iter().cloned())
        .collect()
}

/// Rows whose skills contain every selected skill. An empty selection keeps all rows.
pub fn filter<'a>(rows: &'a [Profile], selected: &BTreeSet<String>) -> Vec<&'a Profile> {
    if selected.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|row| {
            let have: BTreeSet<&str> = row.skills.iter().map(String::as_str).collect();
            selected.iter().all(|s| have.contains(s.as_str()))
        })
        .collect()
}

/// Builds a selection from the `skills` query values, one skill per value.
pub fn parse_selection<I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn clean(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn split_commas(text: &str) -> Vec<String> {
    text.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
