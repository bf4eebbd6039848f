//! Geometry of paired landmarks: widths, edges and the gaps between them.

use async_trait::async_trait;
use tracing::info;

use super::{conclude, Category, DesktopSuite, TestResult, Verdict};
use crate::config::LayoutThresholds;
use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::page::{probe, AuditPage, Rect};
use crate::queries;
use crate::site::SiteProfile;

/// A landmark rect, or the message of the script error that prevented reading it.
type Measured = std::result::Result<Option<Rect>, String>;

#[derive(Debug, Clone)]
struct Landmarks {
    sidebar: Measured,
    panel: Measured,
    article: Measured,
    toc: Measured,
    navbar: Measured,
    h1: Measured,
}

impl Landmarks {
    async fn measure(page: &dyn AuditPage, site: &SiteProfile) -> Result<Self> {
        Ok(Self {
            sidebar: measure(page, "sidebar", &site.sidebar).await?,
            panel: measure(page, "panel", &site.panel).await?,
            article: measure(page, "article", &site.article).await?,
            toc: measure(page, "toc", &site.toc).await?,
            navbar: measure(page, "navbar", &site.navbar).await?,
            h1: measure(page, "h1", &site.h1).await?,
        })
    }
}

async fn measure(page: &dyn AuditPage, label: &str, locator: &Locator) -> Result<Measured> {
    match probe(page, &queries::rect(label, locator)).await {
        Ok(rect) => Ok(Ok(rect)),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(Err(e.to_string())),
    }
}

/// All of `rects` when every one was found; `None` when any is missing.
fn all_present<const N: usize>(rects: [&Measured; N]) -> Result<Option<[Rect; N]>> {
    let mut out = [Rect::default(); N];
    for (slot, measured) in out.iter_mut().zip(rects) {
        match measured {
            Err(message) => return Err(AuditError::evaluation(message.clone())),
            Ok(None) => return Ok(None),
            Ok(Some(rect)) => *slot = *rect,
        }
    }
    Ok(Some(out))
}

fn within(tolerance: f64, reference: f64, target: f64) -> bool {
    (reference - target).abs() <= tolerance
}

fn raw_detail(reference: f64, target: f64) -> String {
    format!("almond={reference}px doc={target}px")
}

fn offset_detail(reference: f64, target: f64) -> String {
    format!("almond={reference:.1}px doc={target:.1}px")
}

pub struct LayoutSuite {
    thresholds: LayoutThresholds,
}

impl LayoutSuite {
    pub fn new(thresholds: LayoutThresholds) -> Self {
        Self { thresholds }
    }

    fn compare(&self, a: &Landmarks, d: &Landmarks) -> Result<Vec<TestResult>> {
        let t = &self.thresholds;
        let mut results = Vec::new();
        let mut push = |name: &str, outcome: Result<Option<Verdict>>| -> Result<()> {
            if let Some(result) = conclude(name, outcome)? {
                results.push(result);
            }
            Ok(())
        };

        let width = |tol: f64, r: Rect, g: Rect| {
            Verdict::new(within(tol, r.width, g.width), raw_detail(r.width, g.width))
        };

        push(
            "sidebar-width",
            all_present([&a.sidebar, &d.sidebar]).map(|o| o.map(|[r, g]| width(t.sidebar_width, r, g))),
        )?;
        push(
            "panel-left-edge",
            all_present([&a.panel, &d.panel]).map(|o| {
                o.map(|[r, g]| {
                    Verdict::new(within(t.panel_edge, r.left, g.left), raw_detail(r.left, g.left))
                })
            }),
        )?;
        push(
            "panel-top-edge",
            all_present([&a.panel, &d.panel]).map(|o| {
                o.map(|[r, g]| Verdict::new(within(t.panel_edge, r.top, g.top), raw_detail(r.top, g.top)))
            }),
        )?;
        push(
            "content-width",
            all_present([&a.article, &d.article]).map(|o| o.map(|[r, g]| width(t.content_width, r, g))),
        )?;
        push(
            "content-left-offset",
            all_present([&a.article, &d.article, &a.panel, &d.panel]).map(|o| {
                o.map(|[ra, ga, rp, gp]| {
                    let (r, g) = (ra.left - rp.left, ga.left - gp.left);
                    Verdict::new(within(t.content_offset, r, g), offset_detail(r, g))
                })
            }),
        )?;
        push(
            "toc-width",
            all_present([&a.toc, &d.toc]).map(|o| o.map(|[r, g]| width(t.toc_width, r, g))),
        )?;
        push(
            "content-toc-gap",
            all_present([&a.article, &a.toc, &d.article, &d.toc]).map(|o| {
                o.map(|[ra, rt, ga, gt]| {
                    let (r, g) = (rt.left - ra.right(), gt.left - ga.right());
                    Verdict::new(within(t.content_toc_gap, r, g), offset_detail(r, g))
                })
            }),
        )?;
        push(
            "navbar-height",
            all_present([&a.navbar, &d.navbar]).map(|o| {
                o.map(|[r, g]| {
                    Verdict::new(
                        within(t.navbar_height, r.height, g.height),
                        raw_detail(r.height, g.height),
                    )
                })
            }),
        )?;
        push(
            "h1-top-offset",
            all_present([&a.h1, &d.h1, &a.panel, &d.panel]).map(|o| {
                o.map(|[rh, gh, rp, gp]| {
                    let (r, g) = (rh.top - rp.top, gh.top - gp.top);
                    Verdict::new(within(t.heading_offset, r, g), offset_detail(r, g))
                })
            }),
        )?;
        Ok(results)
    }
}

#[async_trait]
impl DesktopSuite for LayoutSuite {
    fn category(&self) -> Category {
        Category::Layout
    }

    async fn run(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Vec<TestResult>> {
        let a = Landmarks::measure(reference, &SiteProfile::reference()).await?;
        let d = Landmarks::measure(target, &SiteProfile::target()).await?;
        let results = self.compare(&a, &d)?;
        info!(
            passed = results.iter().filter(|r| r.pass).count(),
            total = results.len(),
            "layout checks done"
        );
        Ok(results)
    }
}
