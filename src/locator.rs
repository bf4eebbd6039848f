use std::fmt;

/// How an element is found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A CSS selector passed to `document.querySelector`.
    Css(String),
    /// A script expression evaluating to an element or `null`.
    Script(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn script(expression: impl Into<String>) -> Self {
        Locator::Script(expression.into())
    }

    /// A script expression that yields the element, or `null` when absent.
    pub fn element_expr(&self) -> String {
        match self {
            Locator::Css(selector) => format!("document.querySelector({})", js_string(selector)),
            Locator::Script(expression) => format!("({expression})"),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "{selector}"),
            Locator::Script(_) => write!(f, "<script>"),
        }
    }
}

/// Quotes `raw` as a JavaScript string literal.
pub fn js_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_locator_escapes_quotes() {
        let loc = Locator::css(r#"nav[aria-label="breadcrumb"], a[title='x']"#);
        assert_eq!(
            loc.element_expr(),
            r#"document.querySelector("nav[aria-label=\"breadcrumb\"], a[title='x']")"#
        );
    }

    #[test]
    fn script_locator_is_parenthesized() {
        let loc = Locator::script("document.body");
        assert_eq!(loc.element_expr(), "(document.body)");
        assert_eq!(loc.to_string(), "<script>");
    }
}
