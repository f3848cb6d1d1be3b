use scraper::{ElementRef, Html, Selector};

use intentrank_core::error::{Error, Result};

/// Every element matched by a flat CSS selector, in document order.
pub fn select<'a>(html: &'a Html, selector: &str) -> Result<Vec<ElementRef<'a>>> {
    let parsed = Selector::parse(selector).map_err(|e| Error::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })?;
    Ok(html.select(&parsed).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div id="app"><input id="q" name="search" class="field wide"><a class="field">x</a></div>"#;

    #[test]
    fn id_class_and_attribute_selectors() {
        let html = Html::parse_document(PAGE);
        assert_eq!(select(&html, "#q").unwrap().len(), 1);
        assert_eq!(select(&html, ".field").unwrap().len(), 2);
        assert_eq!(select(&html, r#"input[name="search"]"#).unwrap().len(), 1);
        assert!(select(&html, "#missing").unwrap().is_empty());
    }

    #[test]
    fn malformed_selector_is_an_error() {
        let html = Html::parse_document(PAGE);
        assert!(matches!(select(&html, "input[name="), Err(Error::InvalidSelector { .. })));
        assert!(matches!(select(&html, "##"), Err(Error::InvalidSelector { .. })));
    }
}
