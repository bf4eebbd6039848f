//! In-page scripts shared by the suites and the browser session.
//!
//! Each [`Query`] carries a stable name (`kind:label`) alongside its script so
//! results can be logged and matched without inspecting the script text.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::compare::leading_number;
use crate::locator::{js_string, Locator};
use crate::page::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: String,
    pub script: String,
}

impl Query {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
        }
    }
}

/// Selected computed styles, geometry and text of one element.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ElementState {
    pub rect: Rect,
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
}

impl ElementState {
    pub fn style(&self, property: &str) -> &str {
        self.styles.get(property).map(String::as_str).unwrap_or("")
    }

    pub fn px(&self, property: &str) -> Option<f64> {
        leading_number(self.style(property))
    }

    /// Rendered at all: not `display: none` and not `visibility: hidden`.
    pub fn is_displayed(&self) -> bool {
        self.style("display") != "none" && self.style("visibility") != "hidden"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollMetrics {
    pub fn overflows_vertically(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// `{rect, styles, text}` for the located element, or `null`.
pub fn element_state(label: &str, locator: &Locator, properties: &[&str]) -> Query {
    let props = serde_json::to_string(properties).unwrap_or_else(|_| "[]".to_string());
    Query::new(
        format!("state:{label}"),
        format!(
            r#"(function() {{
  var el = {el};
  if (!el) return null;
  var cs = getComputedStyle(el);
  var props = {props};
  var styles = {{}};
  for (var i = 0; i < props.length; i++) styles[props[i]] = cs[props[i]] || '';
  var r = el.getBoundingClientRect();
  return {{
    rect: {{ left: r.left, top: r.top, width: r.width, height: r.height }},
    styles: styles,
    text: (el.textContent || '').trim().substring(0, 80)
  }};
}})()"#,
            el = locator.element_expr(),
        ),
    )
}

/// Bounding rectangle of the located element, or `null`.
pub fn rect(label: &str, locator: &Locator) -> Query {
    Query::new(
        format!("rect:{label}"),
        format!(
            "(function() {{ var el = {}; if (!el) return null; var r = el.getBoundingClientRect(); \
             return {{ left: r.left, top: r.top, width: r.width, height: r.height }}; }})()",
            locator.element_expr()
        ),
    )
}

/// Trimmed text of the located element, or `null`.
pub fn text(label: &str, locator: &Locator) -> Query {
    Query::new(
        format!("text:{label}"),
        format!(
            "(function() {{ var el = {}; return el ? (el.textContent || '').trim() : null; }})()",
            locator.element_expr()
        ),
    )
}

pub fn scroll_metrics(label: &str, locator: &Locator) -> Query {
    Query::new(
        format!("scroll:{label}"),
        format!(
            "(function() {{ var el = {}; if (!el) return null; return {{ scrollTop: el.scrollTop, \
             scrollHeight: el.scrollHeight, clientHeight: el.clientHeight, \
             scrollWidth: el.scrollWidth, clientWidth: el.clientWidth }}; }})()",
            locator.element_expr()
        ),
    )
}

/// Viewport coordinates of the element's center, or `null`.
pub fn center_point(locator: &Locator) -> Query {
    Query::new(
        "center",
        format!(
            "(function() {{ var el = {}; if (!el) return null; var r = el.getBoundingClientRect(); \
             return {{ x: r.left + r.width / 2, y: r.top + r.height / 2 }}; }})()",
            locator.element_expr()
        ),
    )
}

pub fn set_scroll_top(locator: &Locator, top: f64) -> Query {
    Query::new(
        "scroll-set",
        format!(
            "(function() {{ var el = {}; if (el) el.scrollTop = {top}; return !!el; }})()",
            locator.element_expr()
        ),
    )
}

/// Scrolls the container to `fraction` of its `scrollHeight`, falling back to
/// the window when the container is absent.
pub fn scroll_to_fraction(label: &str, container: &Locator, fraction: f64) -> Query {
    Query::new(
        format!("scroll-fraction:{label}"),
        format!(
            "(function() {{ var el = {el}; if (el) {{ el.scrollTop = el.scrollHeight * {fraction}; return true; }} \
             window.scrollTo(0, document.body.scrollHeight * {fraction}); return false; }})()",
            el = container.element_expr(),
        ),
    )
}

/// Closes the floating assistant panel some hosted docs open in the top-right corner.
pub fn dismiss_overlay() -> Query {
    Query::new(
        "dismiss-overlay",
        r#"(function() {
  var buttons = document.querySelectorAll('button');
  for (var i = 0; i < buttons.length; i++) {
    var r = buttons[i].getBoundingClientRect();
    if (r.left > window.innerWidth - 90 && r.top < 50 && r.width < 40) {
      buttons[i].click();
      return true;
    }
  }
  return false;
})()"#,
    )
}

/// Sets an attribute on `<html>` (or removes it for `None`) and returns the previous value.
pub fn set_root_attribute(name: &str, value: Option<&str>) -> Query {
    let apply = match value {
        Some(v) => format!("root.setAttribute({}, {});", js_string(name), js_string(v)),
        None => format!("root.removeAttribute({});", js_string(name)),
    };
    Query::new(
        format!("root-attr:{name}"),
        format!(
            "(function() {{ var root = document.documentElement; var prev = root.getAttribute({n}); \
             {apply} void document.body.offsetHeight; return prev; }})()",
            n = js_string(name),
        ),
    )
}
