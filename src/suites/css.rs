use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::compare::rules::compare_values;
use crate::compare::{BrandPalette, Tolerance};
use crate::error::Result;
use crate::page::{probe, AuditPage};
use crate::queries::Query;
use crate::registry::{registry, ElementSpec};
use crate::site::Side;
use crate::style::{build_extract_expression, StyleSnapshot, ALL_PROPERTIES, TRANSITION_PROPERTIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMismatch {
    pub property: String,
    pub reference: Option<String>,
    pub target: Option<String>,
    pub is_focus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssElementResult {
    pub element: String,
    pub description: String,
    pub status: CssStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub checked: usize,
    pub matched: usize,
    pub focus_mismatches: Vec<PropertyMismatch>,
    pub other_mismatches: Vec<PropertyMismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tag: Option<String>,
}

impl CssElementResult {
    fn early(spec: &ElementSpec, status: CssStatus, detail: String) -> Self {
        Self {
            element: spec.name.to_string(),
            description: spec.description.to_string(),
            status,
            detail: Some(detail),
            checked: 0,
            matched: 0,
            focus_mismatches: Vec::new(),
            other_mismatches: Vec::new(),
            reference_tag: None,
            target_tag: None,
        }
    }
}

/// The registry, or just the named element when `focus` is set. A name that
/// matches nothing selects no elements.
pub fn select_elements(focus: Option<&str>) -> Vec<ElementSpec> {
    let all = registry();
    match focus {
        None => all,
        Some(name) => all.into_iter().filter(|e| e.name == name).collect(),
    }
}

/// Compares every computed property of each element across the two pages.
pub async fn run_css_suite(
    reference: &dyn AuditPage,
    target: &dyn AuditPage,
    elements: &[ElementSpec],
    tolerance: &Tolerance,
    palette: &BrandPalette,
) -> Result<Vec<CssElementResult>> {
    let mut results = Vec::with_capacity(elements.len());
    for spec in elements {
        debug!(element = spec.name, "comparing styles");
        let result = compare_element(reference, target, spec, tolerance, palette).await?;
        results.push(result);
    }
    info!(
        passed = results.iter().filter(|r| r.status == CssStatus::Pass).count(),
        total = results.len(),
        "css comparison done"
    );
    Ok(results)
}

async fn extract(page: &dyn AuditPage, spec: &ElementSpec, side: Side) -> Result<Option<StyleSnapshot>> {
    let locator = match side {
        Side::Reference => &spec.reference,
        Side::Target => &spec.target,
    };
    let query = Query::new(
        format!("extract:{}:{}", spec.name, side.file_tag()),
        build_extract_expression(locator),
    );
    probe(page, &query).await
}

async fn compare_element(
    reference: &dyn AuditPage,
    target: &dyn AuditPage,
    spec: &ElementSpec,
    tolerance: &Tolerance,
    palette: &BrandPalette,
) -> Result<CssElementResult> {
    let mut snapshots = Vec::with_capacity(2);
    for (page, side) in [(reference, Side::Reference), (target, Side::Target)] {
        match extract(page, spec, side).await {
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                return Ok(CssElementResult::early(
                    spec,
                    CssStatus::Error,
                    format!("{side} extraction failed: {e}"),
                ))
            }
        }
    }
    let target_snap = snapshots.pop().flatten();
    let reference_snap = snapshots.pop().flatten();

    let Some(ref_snap) = reference_snap else {
        return Ok(CssElementResult::early(
            spec,
            CssStatus::Skip,
            "Element not found on reference".to_string(),
        ));
    };
    let Some(target_snap) = target_snap else {
        return Ok(CssElementResult::early(
            spec,
            CssStatus::Fail,
            "Element not found on target".to_string(),
        ));
    };

    let mut checked = 0;
    let mut matched = 0;
    let mut focus_mismatches = Vec::new();
    let mut other_mismatches = Vec::new();
    for &property in ALL_PROPERTIES {
        if spec.skips(property) || TRANSITION_PROPERTIES.contains(&property) {
            continue;
        }
        checked += 1;
        let outcome = compare_values(
            property,
            ref_snap.get(property),
            target_snap.get(property),
            tolerance,
            palette,
            &ref_snap.styles,
            &target_snap.styles,
        );
        if outcome.matched {
            matched += 1;
            continue;
        }
        let mismatch = PropertyMismatch {
            property: property.to_string(),
            reference: ref_snap.get(property).map(str::to_string),
            target: target_snap.get(property).map(str::to_string),
            is_focus: spec.is_focus(property),
        };
        if mismatch.is_focus {
            focus_mismatches.push(mismatch);
        } else {
            other_mismatches.push(mismatch);
        }
    }

    let status = if focus_mismatches.is_empty() {
        CssStatus::Pass
    } else {
        CssStatus::Fail
    };
    Ok(CssElementResult {
        element: spec.name.to_string(),
        description: spec.description.to_string(),
        status,
        detail: None,
        checked,
        matched,
        focus_mismatches,
        other_mismatches,
        reference_tag: Some(ref_snap.tag),
        target_tag: Some(target_snap.tag),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find;
    use crate::test_support::ScriptedPage;
    use serde_json::{json, Map, Value};

    fn snapshot(overrides: &[(&str, &str)]) -> Value {
        let mut map = Map::new();
        for p in ALL_PROPERTIES {
            map.insert((*p).to_string(), json!("0px"));
        }
        for (k, v) in overrides {
            map.insert((*k).to_string(), json!(v));
        }
        map.insert("_rect".into(), json!({"left": 0, "top": 0, "width": 10, "height": 10}));
        map.insert("_tag".into(), json!("nav"));
        map.insert("_text".into(), json!(""));
        Value::Object(map)
    }

    fn navbar() -> ElementSpec {
        find("navbar").expect("navbar in registry")
    }

    async fn run_one(reference: ScriptedPage, target: ScriptedPage) -> CssElementResult {
        let mut results = run_css_suite(
            &reference,
            &target,
            &[navbar()],
            &Tolerance::default(),
            &BrandPalette::default(),
        )
        .await
        .expect("run");
        results.remove(0)
    }

    #[tokio::test]
    async fn non_focus_mismatches_do_not_fail_the_element() {
        let spec = navbar();
        let other = ALL_PROPERTIES
            .iter()
            .copied()
            .find(|p| !spec.is_focus(p) && !spec.skips(p) && !TRANSITION_PROPERTIES.contains(p))
            .expect("non-focus property");

        let reference =
            ScriptedPage::desktop().respond("extract:navbar:ref", snapshot(&[(other, "solid")]));
        let target = ScriptedPage::desktop().respond(
            "extract:navbar:target",
            snapshot(&[(other, "dashed"), ("fontFamily", "serif")]),
        );
        let result = run_one(reference, target).await;
        assert_eq!(result.status, CssStatus::Pass);
        assert!(result.focus_mismatches.is_empty());
        assert_eq!(result.other_mismatches.len(), 1);
        assert_eq!(result.other_mismatches[0].property, other);
        assert_eq!(result.matched + 1, result.checked);
        assert_eq!(result.target_tag.as_deref(), Some("nav"));
    }

    #[tokio::test]
    async fn focus_mismatch_fails_the_element() {
        let focus = navbar().focus[0];
        let reference = ScriptedPage::desktop().respond("extract:navbar:ref", snapshot(&[(focus, "64px")]));
        let target =
            ScriptedPage::desktop().respond("extract:navbar:target", snapshot(&[(focus, "80px")]));
        let result = run_one(reference, target).await;
        assert_eq!(result.status, CssStatus::Fail);
        assert_eq!(result.focus_mismatches[0].property, focus);
        assert_eq!(result.focus_mismatches[0].reference.as_deref(), Some("64px"));
    }

    #[tokio::test]
    async fn missing_elements_skip_or_fail() {
        let present = ScriptedPage::desktop()
            .respond("extract:navbar:ref", snapshot(&[]))
            .respond("extract:navbar:target", snapshot(&[]));
        let absent = ScriptedPage::desktop();

        let skipped = run_one(ScriptedPage::desktop(), present).await;
        assert_eq!(skipped.status, CssStatus::Skip);

        let reference = ScriptedPage::desktop().respond("extract:navbar:ref", snapshot(&[]));
        let failed = run_one(reference, absent).await;
        assert_eq!(failed.status, CssStatus::Fail);
        assert_eq!(failed.detail.as_deref(), Some("Element not found on target"));
    }

    #[tokio::test]
    async fn script_errors_become_error_status() {
        let reference = ScriptedPage::desktop().fail_on("extract:navbar:ref");
        let result = run_one(reference, ScriptedPage::desktop()).await;
        assert_eq!(result.status, CssStatus::Error);
        let detail = result.detail.expect("detail");
        assert!(detail.starts_with("reference extraction failed:"), "{detail}");
    }

    #[test]
    fn focus_filter_selects_one_element() {
        assert_eq!(select_elements(Some("navbar")).len(), 1);
        assert_eq!(select_elements(None).len(), registry().len());
        assert!(select_elements(Some("nope")).is_empty());
    }
}
