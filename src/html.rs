//! HTML document and element handles backed by the `scraper` crate
//!
//! [`Document`] owns the parsed tree; [`Element`] is a borrowed handle into
//! it. Selector queries return every match in document order; an unparsable
//! selector behaves like a selector that matches nothing.

use crate::error::HtmlError;

/// A parsed HTML document
#[derive(Debug)]
pub struct Document {
    html: scraper::Html,
}

impl Document {
    /// Parse an HTML fragment or full document
    ///
    /// Parsing never fails; malformed markup is recovered the way browsers
    /// recover it.
    pub fn parse(text: &str) -> Self {
        Self {
            html: scraper::Html::parse_document(text),
        }
    }

    /// All elements matching the CSS selector, in document order
    pub fn css(&self, selector: &str) -> Vec<Element<'_>> {
        let Ok(selector) = scraper::Selector::parse(selector) else {
            return Vec::new();
        };
        self.html.select(&selector).map(Element::new).collect()
    }

    /// The document's `<head>` element, if present
    pub fn head(&self) -> Option<Element<'_>> {
        self.css("head").into_iter().next()
    }

    /// The document's `<body>` element, if present
    pub fn body(&self) -> Option<Element<'_>> {
        self.css("body").into_iter().next()
    }
}

/// A handle to one element inside a [`Document`]
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: scraper::ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Lower-cased tag name
    pub fn tag(&self) -> String {
        self.element.value().name().to_ascii_lowercase()
    }

    /// Look up an attribute value
    ///
    /// Fails with [`HtmlError::AttributeNotFound`] when the attribute is
    /// absent. An attribute present without a value yields `""`.
    pub fn attribute(&self, name: &str) -> Result<&'a str, HtmlError> {
        self.element
            .value()
            .attr(name)
            .ok_or_else(|| HtmlError::AttributeNotFound {
                name: name.to_string(),
            })
    }

    /// Non-failing presence check for an attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.element.value().attr(name).is_some()
    }

    /// All attributes of the element as `(name, value)` pairs
    pub fn attributes(&self) -> Vec<(&'a str, &'a str)> {
        self.element.value().attrs().collect()
    }

    /// Concatenated text content of the element and its descendants
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Elements matching the CSS selector within this element's subtree
    pub fn css(&self, selector: &str) -> Vec<Element<'a>> {
        let Ok(selector) = scraper::Selector::parse(selector) else {
            return Vec::new();
        };
        self.element.select(&selector).map(Element::new).collect()
    }

    /// The element's inner HTML
    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }
}
