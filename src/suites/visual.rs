//! Rendered-color sample points, vertical rhythm and a dark-mode sanity pass.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{conclude, or_null, Category, DesktopSuite, TestResult, Verdict};
use crate::compare::color::{colors_close, Rgba};
use crate::config::VisualThresholds;
use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::page::{probe, AuditPage};
use crate::queries::{self, ElementState, Query};
use crate::site::SiteProfile;

const THEME_ATTRIBUTE: &str = "data-theme";

/// A landmark whose background and foreground colors are compared.
struct SamplePoint {
    name: &'static str,
    reference: Locator,
    target: Locator,
}

fn sample_points() -> Vec<SamplePoint> {
    let (a, d) = (SiteProfile::reference(), SiteProfile::target());
    vec![
        SamplePoint {
            name: "page-bg",
            reference: a.page_background,
            target: d.page_background,
        },
        SamplePoint {
            name: "panel-bg",
            reference: a.panel,
            target: d.panel,
        },
        SamplePoint {
            name: "sidebar-bg",
            reference: a.sidebar,
            target: d.sidebar,
        },
        SamplePoint {
            name: "body-text",
            reference: a.body_text,
            target: d.body_text,
        },
        SamplePoint {
            name: "heading-text",
            reference: a.h2,
            target: d.h2,
        },
    ]
}

/// Distance from the first h2 to the next content block. The reference
/// renders paragraphs as spans; the target puts anchor links between.
fn h2_gap(label: &str, h2: &Locator, skip_anchor_only: bool) -> Query {
    let advance = if skip_anchor_only {
        "while (next && next.tagName === 'A') next = next.nextElementSibling;"
    } else {
        "while (next && next.tagName !== 'SPAN' && next.tagName !== 'P') next = next.nextElementSibling;"
    };
    Query::new(
        format!("h2-gap:{label}"),
        format!(
            "(function() {{ var h2 = {}; if (!h2) return null; var next = h2.nextElementSibling; {advance} \
             if (!next) return null; return next.getBoundingClientRect().top - h2.getBoundingClientRect().bottom; }})()",
            h2.element_expr()
        ),
    )
}

#[derive(Debug)]
struct DarkPalette {
    panel_bg: Option<String>,
    text: Option<String>,
    heading: Option<String>,
    page_bg: Option<String>,
}

pub struct VisualSuite {
    thresholds: VisualThresholds,
}

impl VisualSuite {
    pub fn new(thresholds: VisualThresholds) -> Self {
        Self { thresholds }
    }

    fn close(&self, a: &str, b: &str) -> bool {
        let t = &self.thresholds;
        colors_close(a, b, t.color_channel, t.alpha, t.transparent_alpha)
    }

    async fn sample(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
        point: &SamplePoint,
    ) -> Result<Option<(Verdict, Verdict)>> {
        let props = ["backgroundColor", "color"];
        let label = format!("sample-{}", point.name);
        let almond: Option<ElementState> =
            probe(reference, &queries::element_state(&label, &point.reference, &props)).await?;
        let doc: Option<ElementState> =
            probe(target, &queries::element_state(&label, &point.target, &props)).await?;
        let (Some(a), Some(d)) = (almond, doc) else {
            return Ok(None);
        };
        let compare = |property: &str| {
            let (x, y) = (a.style(property), d.style(property));
            Verdict::new(self.close(x, y), format!("almond={x} doc={y}"))
        };
        Ok(Some((compare("backgroundColor"), compare("color"))))
    }

    async fn spacing(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Option<Verdict>> {
        let almond: Option<f64> =
            probe(reference, &h2_gap("reference", &SiteProfile::reference().h2, false)).await?;
        let doc: Option<f64> = probe(target, &h2_gap("target", &SiteProfile::target().h2, true)).await?;
        Ok(match (almond, doc) {
            (Some(a), Some(d)) => Some(Verdict::new(
                (a - d).abs() <= self.thresholds.spacing,
                format!("almond={a:.0}px doc={d:.0}px"),
            )),
            _ => None,
        })
    }

    /// Flips the target into dark mode, reads the key colors and puts the
    /// previous theme back even when a read fails.
    async fn dark_palette(&self, target: &dyn AuditPage) -> Result<DarkPalette> {
        let previous: Option<String> =
            probe(target, &queries::set_root_attribute(THEME_ATTRIBUTE, Some("dark"))).await?;
        debug!(previous = ?previous, "switched target to dark theme");

        let read = async {
            let site = SiteProfile::target();
            let wrapper = Locator::css("[class*=\"docsWrapper\"]");
            Ok::<_, AuditError>(DarkPalette {
                panel_bg: dark_style(target, "panel", &site.panel, "backgroundColor").await?,
                text: dark_style(target, "text", &site.body_text, "color").await?,
                heading: dark_style(target, "heading", &site.h2, "color").await?,
                page_bg: dark_style(target, "page", &wrapper, "backgroundColor").await?,
            })
        }
        .await;

        let restore = target
            .query(&queries::set_root_attribute(THEME_ATTRIBUTE, previous.as_deref()))
            .await;
        if let Err(e) = &restore {
            warn!(error = %e, "could not restore target theme");
        }
        let palette = read?;
        restore?;
        Ok(palette)
    }

    fn is_dark(&self, value: Option<&str>) -> bool {
        value
            .and_then(Rgba::parse)
            .is_some_and(|c| c.lightness() < self.thresholds.dark_lightness)
    }

    fn is_light(&self, value: Option<&str>) -> bool {
        value
            .and_then(Rgba::parse)
            .is_some_and(|c| c.lightness() > self.thresholds.light_lightness)
    }

    fn dark_verdicts(&self, palette: &DarkPalette) -> [(&'static str, Verdict); 4] {
        let entry = |label: &str, value: &Option<String>, pass: bool| {
            Verdict::new(pass, format!("{label}={}", or_null(value.as_deref())))
        };
        [
            (
                "dark-mode-panel-bg-is-dark",
                entry("panelBg", &palette.panel_bg, self.is_dark(palette.panel_bg.as_deref())),
            ),
            (
                "dark-mode-text-is-light",
                entry("textColor", &palette.text, self.is_light(palette.text.as_deref())),
            ),
            (
                "dark-mode-heading-is-light",
                entry("headingColor", &palette.heading, self.is_light(palette.heading.as_deref())),
            ),
            (
                "dark-mode-page-bg-is-dark",
                entry("pageBg", &palette.page_bg, self.is_dark(palette.page_bg.as_deref())),
            ),
        ]
    }
}

async fn dark_style(
    page: &dyn AuditPage,
    label: &str,
    locator: &Locator,
    property: &str,
) -> Result<Option<String>> {
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state(&format!("dark-{label}"), locator, &[property]),
    )
    .await?;
    Ok(state.map(|s| s.style(property).to_string()))
}

#[async_trait]
impl DesktopSuite for VisualSuite {
    fn category(&self) -> Category {
        Category::Visual
    }

    async fn run(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Vec<TestResult>> {
        let mut results = Vec::new();

        for point in sample_points() {
            let bg = format!("visual-{}-bg", point.name);
            let fg = format!("visual-{}-color", point.name);
            match self.sample(reference, target, &point).await {
                Ok(Some((bg_verdict, fg_verdict))) => {
                    results.push(TestResult::new(bg, bg_verdict.pass, bg_verdict.detail));
                    results.push(TestResult::new(fg, fg_verdict.pass, fg_verdict.detail));
                }
                Ok(None) => debug!(sample = point.name, "sample point missing on one side"),
                Err(e) => {
                    if let Some(failed) = conclude(&bg, Err(e))? {
                        let detail = failed.detail.clone();
                        results.push(failed);
                        results.push(TestResult::new(fg, false, detail));
                    }
                }
            }
        }

        if let Some(r) = conclude(
            "visual-h2-to-content-gap",
            self.spacing(reference, target).await,
        )? {
            results.push(r);
        }

        match self.dark_palette(target).await {
            Ok(palette) => {
                for (name, verdict) in self.dark_verdicts(&palette) {
                    results.push(TestResult::new(name, verdict.pass, verdict.detail));
                }
            }
            Err(e) => {
                if let Some(failed) = conclude("dark-mode-panel-bg-is-dark", Err(e))? {
                    results.push(failed);
                }
            }
        }

        info!(
            passed = results.iter().filter(|r| r.pass).count(),
            total = results.len(),
            "visual checks done"
        );
        Ok(results)
    }
}
