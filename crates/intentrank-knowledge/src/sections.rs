use once_cell::sync::Lazy;
use regex::Regex;

static SCHEMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^##\s*1\)\s*Table Schemas.*$").expect("schemas heading"));
static QUERIES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^##\s*2\)\s*Queries.*$").expect("queries heading"));
static RELATIONSHIPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^##\s*3\)\s*Relationships.*$").expect("relationships heading"));

/// The three optional top-level sections of a knowledge document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Schemas,
    Queries,
    Relationships,
}

impl Section {
    fn heading(self) -> &'static Regex {
        match self {
            Section::Schemas => &*SCHEMAS,
            Section::Queries => &*QUERIES,
            Section::Relationships => &*RELATIONSHIPS,
        }
    }

    /// Sections that close this one when they appear after it.
    fn terminators(self) -> &'static [Section] {
        match self {
            Section::Schemas => &[Section::Queries, Section::Relationships],
            Section::Queries => &[Section::Relationships],
            Section::Relationships => &[],
        }
    }

    /// The trimmed section text, heading line included, or `None` when the
    /// document has no such heading.
    pub fn slice(self, content: &str) -> Option<&str> {
        let start = self.heading().find(content)?.start();
        let end = self
            .terminators()
            .iter()
            .filter_map(|next| next.heading().find_at(content, start + 1))
            .map(|m| m.start())
            .fold(content.len(), usize::min);
        Some(content[start..end].trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "intro\n## 3) Relationships\nA -> B\n## 1) Table Schemas\n### `T`\n## 2) Queries\n```sql\nSELECT 1\n```\n";

    #[test]
    fn sections_end_at_the_next_later_heading() {
        assert_eq!(Section::Schemas.slice(DOC), Some("## 1) Table Schemas\n### `T`"));
        assert_eq!(Section::Queries.slice(DOC), Some("## 2) Queries\n```sql\nSELECT 1\n```"));
    }

    #[test]
    fn relationships_run_to_the_end() {
        let rel = Section::Relationships.slice(DOC).unwrap();
        assert!(rel.starts_with("## 3) Relationships\nA -> B"));
        assert!(rel.ends_with("```"));
    }

    #[test]
    fn headings_are_case_insensitive_and_optional() {
        assert!(Section::Queries.slice("## 2)queries and views\n").is_some());
        assert!(Section::Queries.slice("no headings here").is_none());
    }
}
