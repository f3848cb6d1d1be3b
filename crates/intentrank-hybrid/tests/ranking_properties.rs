use intentrank_core::traits::LocatorResolver;
use intentrank_core::types::{BackoffPlan, RankRequest};
use intentrank_hybrid::backoff::thresholds;
use intentrank_hybrid::locator::match_locator;
use intentrank_hybrid::{Flavor, RankingEngine};
use intentrank_markup::MarkupDocument;
use proptest::prelude::*;

const LOGIN_PAGE: &str = r#"<html><head><title>Swag Labs</title></head><body>
<div class="login_wrapper">
  <form id="login-form">
    <input class="input_error form_input" placeholder="Username" type="text" data-test="username" id="user-name" name="user-name" value="">
    <input class="input_error form_input" placeholder="Password" type="password" data-test="password" id="password" name="password" value="">
    <input type="submit" class="submit-button btn_action" data-test="login-button" id="login-button" name="login-button" value="Login">
  </form>
</div></body></html>"#;

const INTENTS: &[&str] = &[
    "Enter the username",
    "type your password",
    "click the login button",
    "submit credentials",
    "zzz qqq",
    "login form",
    "",
    "wrapper",
    "swag labs title",
    "password field",
    "username",
];

const HINTS: &[&str] = &[
    "#user-name",
    "#password",
    "#login-button",
    "#login-form",
    ".login_wrapper",
    "//input[@id='password']",
    "//form",
    r#"input[name="user-name"]"#,
    ".btn_action",
];

fn ranked_ids(doc: &MarkupDocument, request: &RankRequest) -> Vec<(usize, u64)> {
    RankingEngine::new(Flavor::Markup)
        .with_resolver(doc)
        .rank(doc.candidates(), request)
        .iter()
        .map(|s| (s.index, s.score.to_bits()))
        .collect()
}

#[test]
fn intents_find_their_inputs() {
    let doc = MarkupDocument::parse(LOGIN_PAGE);
    let engine = RankingEngine::new(Flavor::Markup).with_resolver(&doc);
    for (intent, id) in [
        ("Enter the username", "user-name"),
        ("type your password", "password"),
        ("click the login button", "login-button"),
        ("submit credentials", "login-button"),
    ] {
        let ranked = engine.rank(doc.candidates(), &RankRequest::new(intent));
        assert_eq!(ranked[0].candidate.identifier, id, "intent {intent:?}");
    }
}

#[test]
fn locator_hint_never_lowers_a_matched_candidate() {
    let doc = MarkupDocument::parse(LOGIN_PAGE);
    let engine = RankingEngine::new(Flavor::Markup).with_resolver(&doc);
    for intent in INTENTS {
        let base = engine.score(doc.candidates(), &RankRequest::new(*intent));
        for hint in HINTS {
            let hinted = engine.score(doc.candidates(), &RankRequest::new(*intent).with_locator(*hint));
            let matched = match_locator(Some(&doc as &dyn LocatorResolver), hint);
            assert!(matched.matched, "hint {hint:?} should resolve");
            for (after, before) in hinted.iter().zip(&base) {
                if matched.signatures.contains(&after.candidate.signature()) {
                    assert!(after.score >= before.score, "{intent:?} / {hint:?}");
                }
            }
        }
    }
}

#[test]
fn backoff_returns_the_first_non_empty_threshold() {
    let doc = MarkupDocument::parse(LOGIN_PAGE);
    let engine = RankingEngine::new(Flavor::Markup).with_resolver(&doc);
    let plan = BackoffPlan::default();
    for intent in INTENTS {
        let request = RankRequest::new(*intent);
        let expected = thresholds(&plan)
            .map(|t| engine.rank(doc.candidates(), &request.clone().with_min_score(t)))
            .find(|r| !r.is_empty())
            .unwrap_or_default();
        let got = engine.rank_with_backoff(doc.candidates(), &request, &plan);
        assert_eq!(got, expected, "intent {intent:?}");
    }
}

proptest! {
    #[test]
    fn ranking_is_deterministic(intent in "[a-zA-Z _-]{0,24}", hint_idx in 0usize..HINTS.len()) {
        let doc = MarkupDocument::parse(LOGIN_PAGE);
        let request = RankRequest::new(intent).with_locator(HINTS[hint_idx]).with_top_k(9);
        prop_assert_eq!(ranked_ids(&doc, &request), ranked_ids(&doc, &request));
    }

    #[test]
    fn results_respect_top_k_and_min_score(
        intent in "[a-z ]{0,24}",
        top_k in 0usize..12,
        min_score in 0.0f64..1.5,
    ) {
        let doc = MarkupDocument::parse(LOGIN_PAGE);
        let request = RankRequest::new(intent).with_top_k(top_k).with_min_score(min_score);
        let ranked = RankingEngine::new(Flavor::Markup).with_resolver(&doc).rank(doc.candidates(), &request);
        prop_assert!(ranked.len() <= top_k);
        prop_assert!(ranked.iter().all(|s| s.score >= min_score));
        prop_assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
