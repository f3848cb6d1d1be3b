use intentrank_core::types::{Candidate, Signature};
use intentrank_text::LexicalVectorizer;

/// Which kind of corpus is being ranked. Decides the projection, the
/// n-gram ranges and whether heuristic boosts apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Markup,
    Knowledge,
}

impl Flavor {
    pub fn vectorizer(self) -> LexicalVectorizer {
        match self {
            Flavor::Markup => LexicalVectorizer::MARKUP,
            Flavor::Knowledge => LexicalVectorizer::KNOWLEDGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub text: String,
    pub signature: Signature,
}

/// Flatten a candidate into its searchable text and structural signature.
///
/// Markup: `kind name:value ... text`, lowercased. Chunks: `kind label body`.
pub fn project(candidate: &Candidate, flavor: Flavor) -> Projection {
    let text = match flavor {
        Flavor::Markup => {
            let mut parts: Vec<String> = Vec::with_capacity(candidate.attributes.len() + 2);
            if !candidate.kind.is_empty() {
                parts.push(candidate.kind.clone());
            }
            parts.extend(candidate.attributes.iter().map(|(name, value)| format!("{}:{}", name, value)));
            if !candidate.text.is_empty() {
                parts.push(candidate.text.clone());
            }
            parts.join(" ").to_lowercase()
        }
        Flavor::Knowledge => {
            format!("{} {} {}", candidate.kind, candidate.identifier, candidate.text).to_lowercase()
        }
    };
    Projection { text, signature: candidate.signature() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_projection_lists_attributes_in_order() {
        let c = Candidate::element("INPUT")
            .with_id("user-name")
            .with_attribute("Placeholder", "User Name")
            .with_text("");
        let p = project(&c, Flavor::Markup);
        assert_eq!(p.text, "input id:user-name placeholder:user name");
        assert_eq!(p.signature.kind, "input");
    }

    #[test]
    fn chunk_projection_is_kind_label_body() {
        let c = Candidate::chunk("schema", "FLIGHTS", "Columns: FS_FLIGHT_NO");
        assert_eq!(project(&c, Flavor::Knowledge).text, "schema flights columns: fs_flight_no");
    }

    #[test]
    fn bare_element_projects_to_its_tag() {
        assert_eq!(project(&Candidate::element("br"), Flavor::Markup).text, "br");
    }
}
