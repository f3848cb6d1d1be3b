use intentrank_text::normalize::normalize_without;

/// Generic UI words that carry no meaning for a knowledge document.
pub const NOISE_TOKENS: &[&str] = &["locator", "loc", "element", "el", "control", "widget"];

/// Expansion appended to a chunk query when any trigger occurs in the
/// normalized intent. Triggers match as substrings.
#[derive(Debug, Clone, Copy)]
pub struct SynonymRule {
    pub triggers: &'static [&'static str],
    pub expansion: &'static str,
}

impl SynonymRule {
    pub fn applies_to(&self, intent: &str) -> bool {
        self.triggers.iter().any(|t| intent.contains(t))
    }
}

pub static SYNONYM_RULES: &[SynonymRule] = &[
    SynonymRule {
        triggers: &["flight", "flights"],
        expansion: "flight flights fs_flight_no flight_schedules",
    },
    SynonymRule {
        triggers: &["open", "opened", "opening", "status"],
        expansion: "open opened fo o fs_flight_status_system status",
    },
    SynonymRule {
        triggers: &["today", "todays", "now", "current", "tonight"],
        expansion: "trunc sysdate current_date today fs_flight_sta_std date",
    },
    SynonymRule {
        triggers: &["depart", "dep", "outbound"],
        expansion: "fs_dep_station etd atd std fs_flight_eta_etd fs_flight_ata_atd",
    },
];

/// Append the expansions of every matching rule, in table order.
pub fn expand_intent(intent_norm: &str) -> String {
    let expansions: Vec<&str> = SYNONYM_RULES
        .iter()
        .filter(|rule| rule.applies_to(intent_norm))
        .map(|rule| rule.expansion)
        .collect();
    if expansions.is_empty() {
        intent_norm.to_string()
    } else {
        format!("{} {}", intent_norm, expansions.join(" "))
    }
}

/// The lexical query used to rank document chunks for `intent`.
pub fn chunk_query(intent: &str) -> String {
    expand_intent(&normalize_without(intent, NOISE_TOKENS))
}
