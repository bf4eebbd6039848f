use std::collections::BTreeMap;

use serde::Deserialize;

use super::properties::ALL_PROPERTIES;
use crate::locator::Locator;
use crate::page::Rect;

/// Computed styles of one element plus enough context to report on it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StyleSnapshot {
    #[serde(rename = "_rect")]
    pub rect: Rect,
    #[serde(rename = "_tag")]
    pub tag: String,
    #[serde(rename = "_text", default)]
    pub text: String,
    #[serde(flatten)]
    pub styles: BTreeMap<String, String>,
}

impl StyleSnapshot {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }
}

/// Script returning a [`StyleSnapshot`]-shaped object for the located
/// element, or `null` when nothing matches.
pub fn build_extract_expression(locator: &Locator) -> String {
    let props = serde_json::to_string(ALL_PROPERTIES).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(function() {{
  var el = {el};
  if (!el) return null;
  var cs = getComputedStyle(el);
  var props = {props};
  var out = {{}};
  for (var i = 0; i < props.length; i++) {{
    try {{ out[props[i]] = cs[props[i]] || ''; }} catch (e) {{ out[props[i]] = ''; }}
  }}
  var r = el.getBoundingClientRect();
  out._rect = {{ left: r.left, top: r.top, width: r.width, height: r.height }};
  out._tag = el.tagName.toLowerCase();
  out._text = (el.textContent || '').trim().substring(0, 80);
  return out;
}})()"#,
        el = locator.element_expr(),
    )
}

/// Canonical form of a computed value: trimmed, font stacks unquoted and
/// lowercased, and zero lengths folded to `0px`. Missing values become `""`.
pub fn normalize(property: &str, raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let mut value = raw.trim().to_string();
    if property == "fontFamily" {
        value = value.replace(['"', '\''], "").to_lowercase();
    }
    if matches!(value.as_str(), "0em" | "0rem" | "0%") {
        value = "0px".to_string();
    }
    value
}
