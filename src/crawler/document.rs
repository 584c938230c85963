//! Parsed HTML documents handed from the fetch stage to extraction

use scraper::{Html, Selector};
use thiserror::Error;

/// The retrieved body could not be turned into a document tree
#[derive(Debug, Error)]
#[error("Malformed document at {url}: {reason}")]
pub struct MalformedDocument {
    pub url: String,
    pub reason: String,
}

/// A queryable HTML document tree
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses decoded page text
    ///
    /// HTML parsing itself is error tolerant; only empty bodies are rejected.
    pub fn parse(url: &str, text: &str) -> Result<Self, MalformedDocument> {
        if text.trim().is_empty() {
            return Err(MalformedDocument {
                url: url.to_string(),
                reason: "empty body".to_string(),
            });
        }

        Ok(Self::from_html(text))
    }

    /// Parses an HTML string without validation
    pub fn from_html(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Returns the trimmed `<title>` text, if any
    pub fn title(&self) -> Option<String> {
        let title_selector = Selector::parse("title").ok()?;

        self.html
            .select(&title_selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
