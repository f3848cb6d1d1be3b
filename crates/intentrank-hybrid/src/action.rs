use serde::{Deserialize, Serialize};

/// Coarse action class of a test step, used to pick how many candidates to
/// rank for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionHint {
    Navigate,
    Click,
    Fill,
    Select,
    Verify,
    Wait,
    Hover,
    Network,
    Default,
}

/// Checked in order; the first family with a keyword contained in the
/// lowercased intent wins.
static KEYWORDS: &[(ActionHint, &[&str])] = &[
    (ActionHint::Navigate, &["navigate", "go to", "open", "visit", "am on"]),
    (ActionHint::Click, &["click", "press", "tap", "submit"]),
    (ActionHint::Fill, &["fill", "enter", "type", "input", "write"]),
    (ActionHint::Select, &["select", "choose", "pick", "dropdown"]),
    (ActionHint::Verify, &["verify", "assert", "check", "see", "should", "visible", "displayed"]),
    (ActionHint::Wait, &["wait"]),
    (ActionHint::Hover, &["hover"]),
    (
        ActionHint::Network,
        &[
            "start capturing",
            "intercept",
            "monitor network",
            "start network",
            "listen to",
            "validate api",
            "api called",
            "api returned",
            "check api",
            "verify api",
            "network call",
            "stop capturing",
            "stop network",
        ],
    ),
];

impl ActionHint {
    pub fn guess(intent: &str) -> Self {
        let intent = intent.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| intent.contains(w)))
            .map_or(ActionHint::Default, |(hint, _)| *hint)
    }

    /// Candidates worth ranking for this action; 0 means none.
    pub fn top_k(self) -> usize {
        match self {
            ActionHint::Navigate | ActionHint::Network => 0,
            ActionHint::Fill | ActionHint::Select => 3,
            ActionHint::Verify => 10,
            ActionHint::Click | ActionHint::Wait | ActionHint::Hover | ActionHint::Default => 5,
        }
    }
}
