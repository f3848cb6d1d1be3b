use std::collections::HashSet;

use tracing::info;

use intentrank_core::error::Result;
use intentrank_core::traits::LocatorResolver;
use intentrank_core::types::Signature;

/// How a locator hint is resolved, decided once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorHint<'a> {
    Empty,
    /// Trimmed form starts with `//`.
    Path(&'a str),
    Selector(&'a str),
}

impl<'a> LocatorHint<'a> {
    pub fn parse(hint: &'a str) -> Self {
        let trimmed = hint.trim();
        if trimmed.is_empty() {
            LocatorHint::Empty
        } else if trimmed.starts_with("//") {
            LocatorHint::Path(hint)
        } else {
            LocatorHint::Selector(hint)
        }
    }

    fn resolve(self, resolver: &dyn LocatorResolver) -> Result<Vec<Signature>> {
        match self {
            LocatorHint::Empty => Ok(Vec::new()),
            LocatorHint::Path(query) => resolver.resolve_path(query),
            LocatorHint::Selector(selector) => resolver.resolve_selector(selector),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocatorMatch {
    pub signatures: HashSet<Signature>,
    pub matched: bool,
}

/// Resolve `hint` into the set of matched signatures.
///
/// Never fails: without a resolver, for an empty hint, or when the resolver
/// rejects the hint, the result is an empty, unmatched set.
pub fn match_locator(resolver: Option<&dyn LocatorResolver>, hint: &str) -> LocatorMatch {
    let parsed = LocatorHint::parse(hint);
    let (Some(resolver), false) = (resolver, parsed == LocatorHint::Empty) else {
        return LocatorMatch::default();
    };
    match parsed.resolve(resolver) {
        Ok(found) => {
            let signatures: HashSet<Signature> = found.into_iter().collect();
            let matched = !signatures.is_empty();
            if matched {
                info!(elements = signatures.len(), "locator matched");
            } else {
                info!("locator matched nothing, using extracted tokens");
            }
            LocatorMatch { signatures, matched }
        }
        Err(e) => {
            info!(error = %e, "locator rejected, using extracted tokens");
            LocatorMatch::default()
        }
    }
}
