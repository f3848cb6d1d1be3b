use crate::error::Result;
use crate::types::Signature;

/// Structural lookup over the tree a corpus was built from.
///
/// Implementations report malformed or unsupported queries as `Err`; the
/// locator matcher turns every error into "no match".
pub trait LocatorResolver {
    /// Resolve a hierarchical path query such as `//form//input[@name='q']`.
    fn resolve_path(&self, query: &str) -> Result<Vec<Signature>>;

    /// Resolve a flat selector such as `#login`, `.btn` or `input[name="q"]`.
    fn resolve_selector(&self, selector: &str) -> Result<Vec<Signature>>;
}
