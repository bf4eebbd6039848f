use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::screenshot::{BreakpointFailure, CapturedShot, RegionDiff};
use crate::suites::{Category, CssElementResult, CssStatus, TestResult};
use crate::Viewport;

/// Schema version for output payloads.
pub const AUDIT_OUTPUT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum AuditOutput {
    Audit(AuditReport),
    Diff(DiffReport),
    Capture(CaptureReport),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
    pub total: usize,
}

impl Counts {
    pub fn from_tests(results: &[TestResult]) -> Self {
        let pass = results.iter().filter(|r| r.pass).count();
        Self {
            pass,
            fail: results.len() - pass,
            skip: 0,
            total: results.len(),
        }
    }

    /// `error` counts as a failure so the three buckets always add up.
    pub fn from_css(results: &[CssElementResult]) -> Self {
        let mut counts = Self {
            total: results.len(),
            ..Self::default()
        };
        for r in results {
            match r.status {
                CssStatus::Pass => counts.pass += 1,
                CssStatus::Skip => counts.skip += 1,
                CssStatus::Fail | CssStatus::Error => counts.fail += 1,
            }
        }
        counts
    }

    fn add(&mut self, other: Counts) {
        self.pass += other.pass;
        self.fail += other.fail;
        self.skip += other.skip;
        self.total += other.total;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: Category,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub categories: Vec<CategorySummary>,
    pub overall: Counts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub version: String,
    pub reference_url: String,
    pub target_url: String,
    pub viewport: Viewport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<Vec<CssElementResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavioral: Option<Vec<TestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<TestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom: Option<Vec<TestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Vec<TestResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<Vec<TestResult>>,
    pub summary: Summary,
}

impl AuditReport {
    pub fn new(reference_url: &str, target_url: &str, viewport: Viewport) -> Self {
        Self {
            version: AUDIT_OUTPUT_VERSION.to_string(),
            reference_url: reference_url.to_string(),
            target_url: target_url.to_string(),
            viewport,
            css: None,
            behavioral: None,
            layout: None,
            dom: None,
            responsive: None,
            visual: None,
            summary: Summary::default(),
        }
    }

    /// Results of a pass/fail category; `None` for css or a category that did not run.
    pub fn tests(&self, category: Category) -> Option<&[TestResult]> {
        match category {
            Category::Css => None,
            Category::Behavioral => self.behavioral.as_deref(),
            Category::Layout => self.layout.as_deref(),
            Category::Dom => self.dom.as_deref(),
            Category::Responsive => self.responsive.as_deref(),
            Category::Visual => self.visual.as_deref(),
        }
    }

    pub fn set_tests(&mut self, category: Category, results: Vec<TestResult>) {
        let slot = match category {
            Category::Css => return,
            Category::Behavioral => &mut self.behavioral,
            Category::Layout => &mut self.layout,
            Category::Dom => &mut self.dom,
            Category::Responsive => &mut self.responsive,
            Category::Visual => &mut self.visual,
        };
        *slot = Some(results);
    }

    /// Recomputes the per-category and overall counts from the results.
    pub fn summarize(&mut self) {
        let mut summary = Summary::default();
        for category in Category::all() {
            let counts = match category {
                Category::Css => self.css.as_deref().map(Counts::from_css),
                other => self.tests(other).map(Counts::from_tests),
            };
            if let Some(counts) = counts {
                summary.overall.add(counts);
                summary.categories.push(CategorySummary { category, counts });
            }
        }
        self.summary = summary;
    }

    pub fn passed(&self) -> bool {
        self.summary.overall.fail == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub version: String,
    pub reference_url: String,
    pub target_url: String,
    pub output_dir: PathBuf,
    pub regions: Vec<RegionDiff>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BreakpointFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    pub version: String,
    pub output_dir: PathBuf,
    pub shots: Vec<CapturedShot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<BreakpointFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suites::PropertyMismatch;

    fn css(status: CssStatus) -> CssElementResult {
        CssElementResult {
            element: "navbar".into(),
            description: "Top navigation bar".into(),
            status,
            detail: None,
            checked: 10,
            matched: 9,
            focus_mismatches: vec![PropertyMismatch {
                property: "height".into(),
                reference: Some("64px".into()),
                target: Some("60px".into()),
                is_focus: true,
            }],
            other_mismatches: Vec::new(),
            reference_tag: Some("div".into()),
            target_tag: Some("nav".into()),
        }
    }

    #[test]
    fn css_errors_count_as_failures() {
        let counts = Counts::from_css(&[
            css(CssStatus::Pass),
            css(CssStatus::Fail),
            css(CssStatus::Skip),
            css(CssStatus::Error),
        ]);
        assert_eq!(
            counts,
            Counts {
                pass: 1,
                fail: 2,
                skip: 1,
                total: 4
            }
        );
    }

    #[test]
    fn summary_only_lists_categories_that_ran() {
        let mut report = AuditReport::new("https://a.test", "http://b.test", Viewport::default());
        report.css = Some(vec![css(CssStatus::Pass), css(CssStatus::Skip)]);
        report.set_tests(
            Category::Layout,
            vec![
                TestResult::new("sidebar-width", true, "almond=256px doc=256px"),
                TestResult::new("toc-width", false, "almond=240px doc=200px"),
            ],
        );
        report.summarize();

        let names: Vec<_> = report.summary.categories.iter().map(|c| c.category).collect();
        assert_eq!(names, vec![Category::Css, Category::Layout]);
        assert_eq!(report.summary.overall.total, 4);
        assert_eq!(report.summary.overall.fail, 1);
        assert!(!report.passed());
        for c in &report.summary.categories {
            assert_eq!(c.counts.pass + c.counts.fail + c.counts.skip, c.counts.total);
        }
    }

    #[test]
    fn audit_output_serializes_with_mode_tag() {
        let mut report = AuditReport::new("https://a.test", "http://b.test", Viewport::default());
        report.set_tests(Category::Dom, vec![TestResult::new("no-horizontal-scroll", true, "no panel")]);
        report.summarize();
        let json = serde_json::to_string(&AuditOutput::Audit(report)).expect("serialize");
        assert!(json.contains("\"mode\":\"audit\""));
        assert!(json.contains("\"referenceUrl\":\"https://a.test\""));
        assert!(json.contains("\"category\":\"dom\",\"pass\":1"));
        assert!(!json.contains("\"css\""));
    }
}
