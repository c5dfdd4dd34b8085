//! Locator descriptors.
//!
//! A locator is plain data: which selector to apply, optional filters, and a
//! chain of scopes to resolve it in. Frame boundaries are explicit, so a
//! card field inside the payment iframe reads as
//!
//! ```text
//! InsideFrame { frame: [title="Iframe for card number"] (first),
//!               inner: Root { [id^="adyen-checkout-encryptedCardNumber"] (first) } }
//! ```
//!
//! The Playwright bridge turns a descriptor into a live locator; the mock
//! surface keys its elements by the descriptor's `Display` form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a single element query is matched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// `data-testid` equals the value
    TestId(String),
    /// `data-testid` starts with the value
    TestIdPrefix(String),
    /// Raw CSS selector
    Css(String),
    /// XPath, relative to the current scope
    XPath(String),
    /// ARIA role with accessible name
    Role { role: String, name: String },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::TestId(id) => write!(f, "testid={}", id),
            Selector::TestIdPrefix(prefix) => write!(f, "testid^={}", prefix),
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::XPath(xpath) => write!(f, "xpath={}", xpath),
            Selector::Role { role, name } => write!(f, "role={}[name={:?}]", role, name),
        }
    }
}

/// A selector plus the filters applied to its matches
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub selector: Selector,

    /// Keep matches whose text contains this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,

    /// Keep matches containing an element matching this query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has: Option<Box<Query>>,

    /// Narrow to the first match
    #[serde(default)]
    pub first: bool,
}

impl Query {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            has_text: None,
            has: None,
            first: false,
        }
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::new(Selector::TestId(id.into()))
    }

    pub fn test_id_prefix(prefix: impl Into<String>) -> Self {
        Self::new(Selector::TestIdPrefix(prefix.into()))
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new(Selector::Css(css.into()))
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(Selector::XPath(xpath.into()))
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(Selector::Role {
            role: role.into(),
            name: name.into(),
        })
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    pub fn having(mut self, child: Query) -> Self {
        self.has = Some(Box::new(child));
        self
    }

    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        if let Some(text) = &self.has_text {
            write!(f, "[has-text={:?}]", text)?;
        }
        if let Some(child) = &self.has {
            write!(f, "[has={}]", child)?;
        }
        if self.first {
            write!(f, "[first]")?;
        }
        Ok(())
    }
}

/// Where an element lives: at the top level, under another element, or
/// inside an embedded frame's own document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocatorPath {
    Root {
        query: Query,
    },
    Within {
        scope: Query,
        inner: Box<LocatorPath>,
    },
    InsideFrame {
        frame: Query,
        inner: Box<LocatorPath>,
    },
}

impl LocatorPath {
    pub fn root(query: Query) -> Self {
        LocatorPath::Root { query }
    }

    /// `inner` resolved among the descendants of `scope`
    pub fn within(scope: Query, inner: impl Into<LocatorPath>) -> Self {
        LocatorPath::Within {
            scope,
            inner: Box::new(inner.into()),
        }
    }

    /// `inner` resolved in the document of the (first) frame matching `frame`
    pub fn inside_frame(frame: Query, inner: impl Into<LocatorPath>) -> Self {
        LocatorPath::InsideFrame {
            frame: frame.first(),
            inner: Box::new(inner.into()),
        }
    }

    /// Narrow the target to its first match
    pub fn first(self) -> Self {
        match self {
            LocatorPath::Root { query } => LocatorPath::Root {
                query: query.first(),
            },
            LocatorPath::Within { scope, inner } => LocatorPath::Within {
                scope,
                inner: Box::new(inner.first()),
            },
            LocatorPath::InsideFrame { frame, inner } => LocatorPath::InsideFrame {
                frame,
                inner: Box::new(inner.first()),
            },
        }
    }

    /// Number of frame boundaries crossed before reaching the target
    pub fn frame_depth(&self) -> usize {
        match self {
            LocatorPath::Root { .. } => 0,
            LocatorPath::Within { inner, .. } => inner.frame_depth(),
            LocatorPath::InsideFrame { inner, .. } => 1 + inner.frame_depth(),
        }
    }
}

impl From<Query> for LocatorPath {
    fn from(query: Query) -> Self {
        LocatorPath::root(query)
    }
}

impl fmt::Display for LocatorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorPath::Root { query } => write!(f, "{}", query),
            LocatorPath::Within { scope, inner } => write!(f, "{} >> {}", scope, inner),
            LocatorPath::InsideFrame { frame, inner } => {
                write!(f, "{} >> content-frame >> {}", frame, inner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_number() -> LocatorPath {
        LocatorPath::inside_frame(
            Query::css(r#"[title="Iframe for card number"]"#),
            Query::css(r#"[id^="adyen-checkout-encryptedCardNumber"]"#).first(),
        )
    }

    #[test]
    fn test_frame_descent_selects_first_frame() {
        match card_number() {
            LocatorPath::InsideFrame { frame, inner } => {
                assert!(frame.first);
                assert_eq!(inner.frame_depth(), 0);
            }
            other => panic!("expected frame descent, got {:?}", other),
        }
        assert_eq!(card_number().frame_depth(), 1);
    }

    #[test]
    fn test_first_narrows_innermost_query() {
        let path = LocatorPath::within(
            Query::test_id("booking-summary-form-first-name"),
            Query::css("input"),
        );
        assert_eq!(path.frame_depth(), 0);
        assert_eq!(
            path.first().to_string(),
            "testid=booking-summary-form-first-name >> css=input[first]"
        );
    }

    #[test]
    fn test_display_is_readable() {
        assert_eq!(
            card_number().to_string(),
            r#"css=[title="Iframe for card number"][first] >> content-frame >> css=[id^="adyen-checkout-encryptedCardNumber"][first]"#
        );
        let rate = Query::test_id("room-price-list-item")
            .having(Query::test_id("price-title").with_text("Bed & Breakfast"));
        assert_eq!(
            rate.to_string(),
            r#"testid=room-price-list-item[has=testid=price-title[has-text="Bed & Breakfast"]]"#
        );
    }

    #[test]
    fn test_serializes_as_tagged_tree() {
        let json = serde_json::to_value(card_number()).unwrap();
        assert_eq!(json["kind"], "inside_frame");
        assert_eq!(json["frame"]["selector"]["kind"], "css");
        assert_eq!(json["inner"]["kind"], "root");
        assert_eq!(json["inner"]["query"]["first"], true);

        let back: LocatorPath = serde_json::from_value(json).unwrap();
        assert_eq!(back, card_number());
    }
}
