//! Test-category runners.
//!
//! Each runner collects failures instead of stopping at the first one: a check
//! whose in-page script throws is recorded as failed, and only errors that
//! [`AuditError::is_fatal`] reports end the run.

pub mod behavioral;
pub mod css;
pub mod dom;
pub mod layout;
pub mod responsive;
pub mod visual;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compare::leading_number;
use crate::config::Config;
use crate::error::{AuditError, Result};
use crate::locator::{js_string, Locator};
use crate::page::AuditPage;

pub use behavioral::BehavioralSuite;
pub use css::{run_css_suite, CssElementResult, CssStatus, PropertyMismatch};
pub use dom::DomSuite;
pub use layout::LayoutSuite;
pub use responsive::run_responsive_suite;
pub use visual::VisualSuite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Css,
    Behavioral,
    Layout,
    Dom,
    Responsive,
    Visual,
}

impl Category {
    /// Report order.
    pub const fn all() -> [Category; 6] {
        [
            Category::Css,
            Category::Behavioral,
            Category::Layout,
            Category::Dom,
            Category::Responsive,
            Category::Visual,
        ]
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Css => "CSS Property Comparison",
            Category::Behavioral => "Behavioral Tests",
            Category::Layout => "Layout Tests",
            Category::Dom => "DOM Structure Tests",
            Category::Responsive => "Responsive Tests",
            Category::Visual => "Visual Diff Tests",
        }
    }

    /// Whether the category runs against the shared desktop sessions.
    pub fn uses_desktop_pages(self) -> bool {
        !matches!(self, Category::Responsive)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Category::Css => "css",
                Category::Behavioral => "behavioral",
                Category::Layout => "layout",
                Category::Dom => "dom",
                Category::Responsive => "responsive",
                Category::Visual => "visual",
            }
        )
    }
}

impl FromStr for Category {
    type Err = AuditError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "css" => Ok(Category::Css),
            "behavioral" | "behavioural" => Ok(Category::Behavioral),
            "layout" => Ok(Category::Layout),
            "dom" => Ok(Category::Dom),
            "responsive" => Ok(Category::Responsive),
            "visual" => Ok(Category::Visual),
            _ => Err(AuditError::Config(format!("Unknown category: {s}"))),
        }
    }
}

/// One pass/fail check outside the CSS suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub pass: bool,
    pub detail: String,
}

impl TestResult {
    pub fn new(name: impl Into<String>, pass: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pass,
            detail: detail.into(),
        }
    }
}

/// The outcome of one check before it is named.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub pass: bool,
    pub detail: String,
}

impl Verdict {
    pub fn new(pass: bool, detail: impl Into<String>) -> Self {
        Self {
            pass,
            detail: detail.into(),
        }
    }
}

/// Names a check's outcome. `Ok(None)` means the check does not apply and is
/// left out of the report; a non-fatal error becomes a failed result.
pub(crate) fn conclude(name: &str, outcome: Result<Option<Verdict>>) -> Result<Option<TestResult>> {
    match outcome {
        Ok(Some(v)) => Ok(Some(TestResult::new(name, v.pass, v.detail))),
        Ok(None) => {
            debug!(check = name, "not applicable");
            Ok(None)
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(Some(TestResult::new(
            name,
            false,
            format!("evaluation failed: {e}"),
        ))),
    }
}

/// A suite that runs against the two desktop sessions opened by the orchestrator.
#[async_trait]
pub trait DesktopSuite: Send + Sync {
    fn category(&self) -> Category;

    async fn run(&self, reference: &dyn AuditPage, target: &dyn AuditPage)
        -> Result<Vec<TestResult>>;
}

/// The pass/fail desktop suites in run order.
pub fn desktop_suites(config: &Config) -> Vec<Box<dyn DesktopSuite>> {
    vec![
        Box::new(BehavioralSuite::new(config.thresholds.behavioral.clone())),
        Box::new(LayoutSuite::new(config.thresholds.layout.clone())),
        Box::new(DomSuite::new(config.thresholds.dom.clone())),
        Box::new(VisualSuite::new(config.thresholds.visual.clone())),
    ]
}

/// `getComputedStyle` reports an unset background as fully transparent black.
pub(crate) fn is_transparent(value: &str) -> bool {
    value == "rgba(0, 0, 0, 0)" || value == "transparent"
}

/// `parseInt` semantics for computed values such as `z-index`.
pub(crate) fn css_int(value: &str) -> Option<i64> {
    leading_number(value).map(|n| n.trunc() as i64)
}

/// The first `inner` match inside the first `container` match.
pub(crate) fn within_first(container: &str, inner: &str) -> Locator {
    Locator::script(format!(
        "(function() {{ var c = document.querySelector({}); return c ? c.querySelector({}) : null; }})()",
        js_string(container),
        js_string(inner)
    ))
}

/// Formats an optional value the way the report prints missing data.
pub(crate) fn or_null<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}
