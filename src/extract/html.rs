//! Small query helpers over `scraper` element trees

use crate::extract::ExtractError;
use scraper::{ElementRef, Selector};

pub(crate) fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        css,
        message: e.to_string(),
    })
}

/// First descendant matching `css`
pub(crate) fn first<'a>(
    element: ElementRef<'a>,
    css: &'static str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    let found = element.select(&selector).next();
    Ok(found)
}

/// Last descendant matching `css`
pub(crate) fn last<'a>(
    element: ElementRef<'a>,
    css: &'static str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    let found = element.select(&selector).last();
    Ok(found)
}

pub(crate) fn all<'a>(
    element: ElementRef<'a>,
    css: &'static str,
) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let selector = selector(css)?;
    let found = element.select(&selector).collect();
    Ok(found)
}

/// Like [`first`], but a missing match is a [`ExtractError::FieldMissing`]
pub(crate) fn require<'a>(
    element: ElementRef<'a>,
    css: &'static str,
    url: &str,
) -> Result<ElementRef<'a>, ExtractError> {
    first(element, css)?.ok_or_else(|| ExtractError::FieldMissing {
        field: css,
        url: url.to_string(),
    })
}

/// All text below the element, trimmed
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The first non-blank text node below the element
pub(crate) fn first_text(element: ElementRef<'_>) -> Option<String> {
    element
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

pub(crate) fn attr(
    element: ElementRef<'_>,
    name: &'static str,
    url: &str,
) -> Result<String, ExtractError> {
    element
        .value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| ExtractError::FieldMissing {
            field: name,
            url: url.to_string(),
        })
}

/// Parses a displayed count such as `"1,234"`
pub(crate) fn parse_count(raw: &str, field: &'static str, url: &str) -> Result<i64, ExtractError> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits.parse().map_err(|_| ExtractError::InvalidValue {
        field,
        value: raw.to_string(),
        url: url.to_string(),
    })
}

/// The next sibling that is an element
pub(crate) fn next_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(" 12 ", "votes", "u").unwrap(), 12);
        assert_eq!(parse_count("1,234", "views", "u").unwrap(), 1234);
        assert_eq!(parse_count("-3", "votes", "u").unwrap(), -3);
        assert!(matches!(
            parse_count("many", "votes", "u"),
            Err(ExtractError::InvalidValue { field: "votes", .. })
        ));
    }

    #[test]
    fn test_first_text_skips_blank_nodes() {
        let html = Html::parse_fragment("<div>\n   <span> anon </span> rest</div>");
        let div = first(html.root_element(), "div").unwrap().unwrap();
        assert_eq!(first_text(div), Some("anon".to_string()));
    }

    #[test]
    fn test_next_element_skips_text() {
        let html = Html::parse_fragment("<div><p id='a'>a</p>\n text <ul id='b'></ul></div>");
        let p = first(html.root_element(), "p").unwrap().unwrap();
        let next = next_element(p).unwrap();
        assert_eq!(next.value().attr("id"), Some("b"));
    }

    #[test]
    fn test_require_reports_field() {
        let html = Html::parse_fragment("<div></div>");
        let err = require(html.root_element(), "span.missing", "http://example.test/").unwrap_err();
        assert!(matches!(
            err,
            ExtractError::FieldMissing {
                field: "span.missing",
                ..
            }
        ));
    }
}
