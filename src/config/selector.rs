//! Per-depth link selection rules
//!
//! A [`SelectorPolicy`] maps a crawl depth to the rule that picks the anchors
//! whose hrefs become the next frontier. Depths without a rule fall back to
//! "all anchors".

use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::fmt;

/// How outbound links are chosen on a page at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkRule {
    /// Anchors carrying the given CSS class
    Class(String),
    /// Anchors matched by an arbitrary CSS selector
    Css(String),
    /// Every anchor on the page
    All,
}

impl fmt::Display for LinkRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "class '{}'", class),
            Self::Css(css) => write!(f, "css '{}'", css),
            Self::All => write!(f, "all anchors"),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: LinkRule,
    selector: Option<Selector>,
}

impl CompiledRule {
    fn compile(depth: u32, rule: LinkRule) -> Result<Self, ConfigError> {
        let css = match &rule {
            LinkRule::Class(class) => {
                if class.is_empty() || class.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidSelector {
                        depth,
                        message: format!("invalid class name '{}'", class),
                    });
                }
                Some(format!("a.{}", class))
            }
            LinkRule::Css(css) => Some(css.clone()),
            LinkRule::All => None,
        };

        let selector = match css {
            Some(css) => Some(Selector::parse(&css).map_err(|e| ConfigError::InvalidSelector {
                depth,
                message: format!("'{}': {}", css, e),
            })?),
            None => None,
        };

        Ok(Self { rule, selector })
    }
}

/// Mapping from depth to the link selection rule used at that depth
#[derive(Debug, Clone, Default)]
pub struct SelectorPolicy {
    rules: BTreeMap<u32, CompiledRule>,
}

impl SelectorPolicy {
    /// Creates a policy with no depth-specific rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `depth`, replacing any previous rule for that depth
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidSelector` when the rule does not compile to a CSS selector.
    pub fn insert(&mut self, depth: u32, rule: LinkRule) -> Result<(), ConfigError> {
        let compiled = CompiledRule::compile(depth, rule)?;
        self.rules.insert(depth, compiled);
        Ok(())
    }

    /// Builder form of [`SelectorPolicy::insert`]
    pub fn with_rule(mut self, depth: u32, rule: LinkRule) -> Result<Self, ConfigError> {
        self.insert(depth, rule)?;
        Ok(self)
    }

    /// Returns the rule applied at `depth`
    pub fn rule_for(&self, depth: u32) -> &LinkRule {
        self.rules
            .get(&depth)
            .map(|compiled| &compiled.rule)
            .unwrap_or(&LinkRule::All)
    }

    /// Collects the raw hrefs of the anchors selected at `depth`, in document order
    ///
    /// Matched elements that are not `<a>` or carry no `href` are ignored.
    pub fn hrefs(&self, depth: u32, html: &Html) -> Vec<String> {
        let selector = self
            .rules
            .get(&depth)
            .and_then(|compiled| compiled.selector.as_ref());

        match selector {
            Some(selector) => collect_hrefs(html.select(selector)),
            None => collect_hrefs(
                html.root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap),
            ),
        }
    }
}

fn collect_hrefs<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    elements
        .filter(|element| element.value().name() == "a")
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
