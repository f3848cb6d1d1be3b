use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use intentrank_core::types::Candidate;

use crate::sections::Section;

static SUB_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^###\s+.*$").expect("sub-heading regex"));
static BACKTICKED: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("backtick regex"));
static TABLE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Table:\s*([a-zA-Z0-9_]+)").expect("table label regex"));
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```(?:sql)?\s*([\s\S]*?)```").expect("fence regex"));

const LABEL_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Schema,
    Query,
    Relationship,
}

impl ChunkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkKind::Schema => "schema",
            ChunkKind::Query => "query",
            ChunkKind::Relationship => "relationship",
        }
    }
}

/// One labelled piece of a knowledge document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub label: String,
    pub text: String,
}

impl Chunk {
    fn new(kind: ChunkKind, label: impl Into<String>, text: impl Into<String>) -> Self {
        Self { kind, label: label.into(), text: text.into() }
    }

    pub fn to_candidate(&self) -> Candidate {
        Candidate::chunk(self.kind.as_str(), self.label.as_str(), self.text.as_str())
    }
}

/// Table schema chunks: one per `###` sub-heading of the schema section.
///
/// Without a schema section the whole document is scanned. Without any
/// sub-heading the text becomes a single chunk, labelled by its first
/// backticked name or else its first non-blank line. Blank input yields
/// nothing.
pub fn extract_schemas(content: &str) -> Vec<Chunk> {
    let section = Section::Schemas.slice(content).filter(|s| !s.is_empty()).unwrap_or(content);
    let headings: Vec<_> = SUB_HEADING.find_iter(section).collect();

    if headings.is_empty() {
        let body = section.trim();
        if body.is_empty() {
            return Vec::new();
        }
        let label = first_backticked(body).unwrap_or_else(|| truncate_label(first_line(body).unwrap_or("schema")));
        debug!(label = %label, "no schema sub-headings, using whole text as one chunk");
        return vec![Chunk::new(ChunkKind::Schema, label, body)];
    }

    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let end = headings.get(i + 1).map_or(section.len(), |next| next.start());
            let block = section[heading.start()..end].trim();
            let header = heading.as_str();
            // First non-blank line after the heading, not the heading itself.
            let body_first_line = block.lines().skip(1).find(|l| !l.trim().is_empty()).unwrap_or("");
            let label = first_backticked(header)
                .or_else(|| TABLE_LABEL.captures(header).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
                .or_else(|| first_backticked(body_first_line))
                .unwrap_or_else(|| header.trim_start_matches('#').trim().to_string());
            Chunk::new(ChunkKind::Schema, label, block)
        })
        .collect()
}

/// Query chunks: one per fenced code block of the queries section, or of
/// the whole document when that section is missing.
pub fn extract_queries(content: &str) -> Vec<Chunk> {
    let scope = Section::Queries.slice(content).unwrap_or(content);
    FENCED_BLOCK
        .captures_iter(scope)
        .filter_map(|c| c.get(1))
        .map(|body| {
            let body = body.as_str().trim();
            let label = truncate_label(first_line(body).unwrap_or("SQL"));
            Chunk::new(ChunkKind::Query, label, body)
        })
        .collect()
}

/// Relationship chunks: items of the relationships section split on blank
/// lines or `N)` numbering, with heading lines dropped. A document without
/// that section has no relationships.
pub fn extract_relationships(content: &str) -> Vec<Chunk> {
    let Some(section) = Section::Relationships.slice(content) else {
        return Vec::new();
    };
    split_items(section)
        .into_iter()
        .filter_map(|item| {
            let label = truncate_label(first_line(&item)?);
            Some(Chunk::new(ChunkKind::Relationship, label, item))
        })
        .collect()
}

fn split_items(section: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut flush = |current: &mut Vec<&str>| {
        let item = current
            .iter()
            .filter(|line| !line.trim_start().starts_with("##"))
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        let item = item.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
        current.clear();
    };
    for line in section.lines() {
        if line.trim().is_empty() {
            flush(&mut current);
            continue;
        }
        if starts_numbered(line) {
            flush(&mut current);
        }
        current.push(line);
    }
    flush(&mut current);
    items
}

/// `N)` followed by whitespace or end of line, after optional indentation.
fn starts_numbered(line: &str) -> bool {
    let line = line.trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return false;
    }
    let mut rest = line[digits..].chars();
    rest.next() == Some(')') && rest.next().map_or(true, char::is_whitespace)
}

fn first_backticked(text: &str) -> Option<String> {
    BACKTICKED.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

fn truncate_label(line: &str) -> String {
    if line.chars().count() > LABEL_MAX_CHARS {
        let head: String = line.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}…", head)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_prefix_detection() {
        assert!(starts_numbered("1) a joins b"));
        assert!(starts_numbered("  12)\tx"));
        assert!(starts_numbered("3)"));
        assert!(!starts_numbered("1)x"));
        assert!(!starts_numbered("## 3) Relationships"));
        assert!(!starts_numbered("a) nope"));
    }

    #[test]
    fn labels_truncate_on_characters() {
        let long = "é".repeat(81);
        let label = truncate_label(&long);
        assert_eq!(label.chars().count(), 81);
        assert!(label.ends_with('…'));
        assert_eq!(truncate_label(&"x".repeat(80)), "x".repeat(80));
    }

    #[test]
    fn items_split_on_blank_lines_and_numbering() {
        let items = split_items("## 3) Relationships\n1) A -> B\n   via id\n2) B -> C\n\nfree note\nsecond line");
        assert_eq!(items, vec!["1) A -> B\n   via id", "2) B -> C", "free note\nsecond line"]);
    }

    #[test]
    fn schema_label_can_come_from_the_line_under_the_heading() {
        let doc = "## 1) Table Schemas\n### 1.2) Crew\n\n`CREW_ROSTER` holds one row per duty\n\n### Stations\nplain notes\n";
        let labels: Vec<String> = extract_schemas(doc).into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["CREW_ROSTER", "Stations"]);
    }
}
