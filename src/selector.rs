use std::fmt;

/// A page locator. CSS selectors use the browser's native element lookup;
/// XPath selectors are resolved through `document.evaluate` in page context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Selector::XPath(expression.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Css(s) | Selector::XPath(s) => s,
        }
    }

    /// JS expression that evaluates to the first matching element, or null.
    pub(crate) fn lookup_js(&self) -> String {
        match self {
            Selector::Css(s) => format!("document.querySelector('{}')", js_escape(s)),
            Selector::XPath(s) => format!(
                "document.evaluate('{}', document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_escape(s)
            ),
        }
    }

    /// JS expression that evaluates to the number of matching elements.
    pub(crate) fn count_js(&self) -> String {
        match self {
            Selector::Css(s) => format!("document.querySelectorAll('{}').length", js_escape(s)),
            Selector::XPath(s) => format!(
                "document.evaluate('{}', document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength",
                js_escape(s)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(s) => write!(f, "css `{}`", s),
            Selector::XPath(s) => write!(f, "xpath `{}`", s),
        }
    }
}

/// Escape text for interpolation into a JS string, single-quoted or template
/// literal. `\$` and `` \` `` are identity escapes inside single quotes, so
/// one escaper covers both contexts.
pub(crate) fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('`', "\\`")
        .replace('$', "\\$")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_lookup_uses_query_selector() {
        let sel = Selector::css("#login-button");
        assert_eq!(sel.lookup_js(), "document.querySelector('#login-button')");
    }

    #[test]
    fn xpath_lookup_uses_document_evaluate() {
        let sel = Selector::xpath("//input[@id='password']");
        let js = sel.lookup_js();
        assert!(js.starts_with("document.evaluate('//input[@id=\\'password\\']'"));
        assert!(js.contains("FIRST_ORDERED_NODE_TYPE"));
    }

    #[test]
    fn count_js_matches_selector_kind() {
        assert!(Selector::css(".todo").count_js().contains("querySelectorAll"));
        assert!(Selector::xpath("//li").count_js().contains("snapshotLength"));
    }

    #[test]
    fn single_quotes_and_backslashes_are_escaped() {
        assert_eq!(js_escape("a'b"), "a\\'b");
        assert_eq!(js_escape("a\\b"), "a\\\\b");
    }

    #[test]
    fn template_literal_metacharacters_are_escaped() {
        assert_eq!(js_escape("a`b"), "a\\`b");
        assert_eq!(js_escape("${alert(1)}"), "\\${alert(1)}");
    }

    #[test]
    fn newlines_cannot_break_out_of_a_quoted_string() {
        assert_eq!(js_escape("line1\nline2"), "line1\\nline2");
        assert_eq!(js_escape("line1\r\nline2"), "line1\\r\\nline2");
    }

    #[test]
    fn display_names_the_selector_kind() {
        assert_eq!(Selector::css("#x").to_string(), "css `#x`");
        assert_eq!(Selector::xpath("//x").to_string(), "xpath `//x`");
    }
}
