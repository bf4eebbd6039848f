//! Per-breakpoint visibility and layout checks on freshly opened pages.

use tracing::{info, warn};

use super::{conclude, TestResult, Verdict};
use crate::config::{Config, ResponsiveThresholds};
use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::page::{close, probe, AuditPage, PageOpener, Rect};
use crate::queries::{self, ElementState};
use crate::site::SiteProfile;
use crate::viewport::Breakpoint;

const VISIBILITY: [&str; 2] = ["display", "visibility"];

/// Opens a fresh pair of pages for every configured breakpoint and checks
/// that the target adapts the way the reference does.
pub async fn run_responsive_suite(opener: &dyn PageOpener, config: &Config) -> Result<Vec<TestResult>> {
    let reference_site = SiteProfile::reference();
    let mut results = Vec::new();
    for bp in &config.breakpoints {
        info!(breakpoint = %bp.name, "responsive pass");
        let prefix = format!("[{}]", bp.name);

        let mut reference: Option<Box<dyn AuditPage>> = None;
        let mut target: Option<Box<dyn AuditPage>> = None;
        let opened = async {
            let page = opener.open(&config.reference_url, bp.viewport()).await?;
            let page = &**reference.insert(page);
            if bp.width >= config.thresholds.responsive.overlay_min_width {
                reference_site
                    .dismiss_overlay(page, config.browser.overlay_settle)
                    .await?;
            }
            target = Some(opener.open(&config.target_url, bp.viewport()).await?);
            Ok::<(), AuditError>(())
        }
        .await;

        let outcome = match (opened, &reference, &target) {
            (Ok(()), Some(r), Some(t)) => {
                let checks = BreakpointChecks {
                    bp,
                    thresholds: &config.thresholds.responsive,
                    desktop_min_width: config.thresholds.desktop_min_width,
                    reference: SiteProfile::reference(),
                    target: SiteProfile::target(),
                };
                checks.run(&**r, &**t, &prefix).await
            }
            (Err(e), _, _) if e.is_fatal() => Err(e),
            (Err(e), _, _) => {
                warn!(breakpoint = %bp.name, error = %e, "could not open pages");
                Ok(vec![TestResult::new(format!("{prefix} open-pages"), false, e.to_string())])
            }
            (Ok(()), _, _) => Ok(Vec::new()),
        };

        for page in [reference, target].into_iter().flatten() {
            close(&*page).await;
        }
        results.extend(outcome?);
    }
    Ok(results)
}

struct BreakpointChecks<'a> {
    bp: &'a Breakpoint,
    thresholds: &'a ResponsiveThresholds,
    desktop_min_width: u32,
    reference: SiteProfile,
    target: SiteProfile,
}

fn shown(state: &Option<ElementState>) -> String {
    match state {
        Some(s) if s.is_displayed() => format!("visible({}px)", s.rect.width),
        _ => "hidden".to_string(),
    }
}

impl BreakpointChecks<'_> {
    async fn run(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
        prefix: &str,
    ) -> Result<Vec<TestResult>> {
        let mut results = Vec::new();
        let mut record = |name: &str, outcome: Result<Option<Verdict>>| -> Result<()> {
            if let Some(r) = conclude(&format!("{prefix} {name}"), outcome)? {
                results.push(r);
            }
            Ok(())
        };

        match self.panel(reference, target).await {
            Ok(verdicts) => {
                for (name, verdict) in verdicts {
                    record(name, Ok(Some(verdict)))?;
                }
            }
            Err(e) => record("panel-exists", Err(e))?,
        }
        record("sidebar-visibility-matches", self.sidebar(reference, target).await.map(Some))?;
        record("toc-visibility-matches", self.toc(reference, target).await.map(Some))?;
        record(
            "breadcrumbs-visibility-matches",
            self.breadcrumbs(reference, target).await.map(Some),
        )?;
        record("navbar-position", self.navbar(reference, target).await)?;
        match self.content(target).await {
            Ok(Some((overflow, width))) => {
                record("content-no-overflow", Ok(Some(overflow)))?;
                record("content-not-too-narrow", Ok(Some(width)))?;
            }
            Ok(None) => {}
            Err(e) => record("content-no-overflow", Err(e))?,
        }
        if self.bp.width < self.desktop_min_width {
            record("hamburger-menu-exists", hamburger(target).await.map(Some))?;
        }
        record("footer-hidden", footer_hidden(target).await.map(Some))?;
        Ok(results)
    }

    /// `panel-exists` and `panel-border-radius`, when the reference shows a panel.
    async fn panel(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
    ) -> Result<Vec<(&'static str, Verdict)>> {
        let props = ["borderTopLeftRadius", "backgroundColor", "display", "visibility"];
        let almond: Option<ElementState> =
            probe(reference, &queries::element_state("panel", &self.reference.panel, &props)).await?;
        let doc: Option<ElementState> =
            probe(target, &queries::element_state("panel", &self.target.panel, &props)).await?;
        let Some(almond) = almond.filter(ElementState::is_displayed) else {
            return Ok(Vec::new());
        };
        let doc_state = match &doc {
            Some(d) if d.is_displayed() => "visible",
            Some(_) => "hidden",
            None => "missing",
        };
        let mut verdicts = vec![(
            "panel-exists",
            Verdict::new(doc_state == "visible", format!("almond=visible doc={doc_state}")),
        )];
        if let Some(doc) = doc.filter(ElementState::is_displayed) {
            let a = almond.px("borderTopLeftRadius").unwrap_or(0.0);
            let d = doc.px("borderTopLeftRadius").unwrap_or(0.0);
            verdicts.push((
                "panel-border-radius",
                Verdict::new(
                    (a - d).abs() <= self.thresholds.panel_radius,
                    format!("almond={a}px doc={d}px"),
                ),
            ));
        }
        Ok(verdicts)
    }

    async fn visibility_pair(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
        label: &str,
        locators: (&Locator, &Locator),
        on_screen: impl Fn(&ElementState) -> bool,
    ) -> Result<Verdict> {
        let query = |loc: &Locator| queries::element_state(label, loc, &VISIBILITY);
        let almond: Option<ElementState> = probe(reference, &query(locators.0)).await?;
        let doc: Option<ElementState> = probe(target, &query(locators.1)).await?;
        let visible = |s: &Option<ElementState>| {
            s.as_ref()
                .is_some_and(|s| s.is_displayed() && s.rect.width > 0.0 && on_screen(s))
        };
        let (almond_on, doc_on) = (visible(&almond), visible(&doc));
        let almond = almond.filter(|_| almond_on);
        let doc = doc.filter(|_| doc_on);
        Ok(Verdict::new(
            almond.is_some() == doc.is_some(),
            format!("almond={} doc={}", shown(&almond), shown(&doc)),
        ))
    }

    async fn sidebar(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let slack = self.thresholds.visibility_slack;
        self.visibility_pair(
            reference,
            target,
            "sidebar",
            (&self.reference.sidebar, &self.target.sidebar),
            |s| s.rect.left >= -slack,
        )
        .await
    }

    async fn toc(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let edge = f64::from(self.bp.width) + self.thresholds.visibility_slack;
        self.visibility_pair(
            reference,
            target,
            "toc",
            (&self.reference.toc, &self.target.toc),
            |s| s.rect.right() <= edge,
        )
        .await
    }

    async fn breadcrumbs(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let query = |loc: &Locator| queries::element_state("breadcrumbs", loc, &VISIBILITY);
        let displayed = |s: Option<ElementState>| s.is_some_and(|s| s.is_displayed());
        let almond = displayed(probe(reference, &query(&self.reference.breadcrumbs)).await?);
        let doc = displayed(probe(target, &query(&self.target.breadcrumbs)).await?);
        let word = |v: bool| if v { "visible" } else { "hidden" };
        Ok(Verdict::new(
            almond == doc,
            format!("almond={} doc={}", word(almond), word(doc)),
        ))
    }

    async fn navbar(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Option<Verdict>> {
        let query =
            |loc: &Locator| queries::element_state("navbar-position", loc, &["position", "height"]);
        let almond: Option<ElementState> = probe(reference, &query(&self.reference.navbar)).await?;
        let doc: Option<ElementState> = probe(target, &query(&self.target.navbar)).await?;
        Ok(match (almond, doc) {
            (Some(a), Some(d)) => Some(Verdict::new(
                a.style("position") == d.style("position"),
                format!("almond={} doc={}", a.style("position"), d.style("position")),
            )),
            _ => None,
        })
    }

    /// `content-no-overflow` and `content-not-too-narrow` for the target's main column.
    async fn content(&self, target: &dyn AuditPage) -> Result<Option<(Verdict, Verdict)>> {
        let column = Locator::script(
            "document.querySelector('.mintysaurus-article') || document.querySelector('article')",
        );
        let Some(rect) = probe::<Rect>(target, &queries::rect("content", &column)).await?
        else {
            return Ok(None);
        };
        let slack = self.thresholds.overflow_slack;
        let width = f64::from(self.bp.width);
        let overflows = rect.right() > width + slack || rect.left < -slack;
        let min = self.thresholds.min_content_width;
        Ok(Some((
            Verdict::new(
                !overflows,
                format!(
                    "left={:.0} right={:.0} viewport={}",
                    rect.left,
                    rect.right(),
                    self.bp.width
                ),
            ),
            Verdict::new(
                rect.width >= min,
                format!("width={:.0}px (min {min}px)", rect.width),
            ),
        )))
    }
}

async fn hamburger(target: &dyn AuditPage) -> Result<Verdict> {
    let toggle = Locator::css(".navbar__toggle, button[aria-label=\"Toggle navigation bar\"]");
    let state: Option<ElementState> =
        probe(target, &queries::element_state("hamburger", &toggle, &["display"])).await?;
    Ok(match state {
        Some(s) => {
            let visible = s.style("display") != "none";
            Verdict::new(visible, format!("exists=true visible={visible}"))
        }
        None => Verdict::new(false, "exists=false"),
    })
}

async fn footer_hidden(target: &dyn AuditPage) -> Result<Verdict> {
    let footer = Locator::css(".theme-layout-footer, footer.footer");
    let state: Option<ElementState> =
        probe(target, &queries::element_state("footer", &footer, &VISIBILITY)).await?;
    let visible = state.is_some_and(|s| s.is_displayed());
    Ok(Verdict::new(!visible, format!("visible={visible}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::test_support::{actions, ScriptedOpener, ScriptedPage};
    use crate::viewport::Breakpoint;
    use serde_json::json;

    fn config(breakpoints: Vec<Breakpoint>) -> Config {
        Config {
            breakpoints,
            ..Config::default()
        }
    }

    fn names(results: &[TestResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    #[tokio::test]
    async fn blank_pages_emit_the_unconditional_checks() {
        let cfg = config(vec![
            Breakpoint::new("1440-desktop", 1440, 900),
            Breakpoint::new("375-mobile", 375, 812),
        ]);
        let opener = ScriptedOpener::new();
        let results = run_responsive_suite(&opener, &cfg).await.expect("run");
        assert_eq!(
            names(&results),
            vec![
                "[1440-desktop] sidebar-visibility-matches",
                "[1440-desktop] toc-visibility-matches",
                "[1440-desktop] breadcrumbs-visibility-matches",
                "[1440-desktop] footer-hidden",
                "[375-mobile] sidebar-visibility-matches",
                "[375-mobile] toc-visibility-matches",
                "[375-mobile] breadcrumbs-visibility-matches",
                "[375-mobile] hamburger-menu-exists",
                "[375-mobile] footer-hidden",
            ]
        );
        let hamburger = &results[7];
        assert!(!hamburger.pass);
        assert_eq!(hamburger.detail, "exists=false");

        let opened = opener.opened();
        assert_eq!(opened.len(), 4);
        assert_eq!(opened[0].0, cfg.reference_url);
        assert_eq!(opened[3].1.width, 375);
    }

    #[tokio::test]
    async fn open_failure_is_recorded_and_the_reference_closed() {
        let cfg = config(vec![
            Breakpoint::new("768-tablet", 768, 1024),
            Breakpoint::new("375-mobile", 375, 812),
        ]);
        let reference = ScriptedPage::new(cfg.breakpoints[0].viewport());
        let log = reference.log();
        let opener = ScriptedOpener::new()
            .then(reference)
            .then_fail(AuditError::protocol("Page.navigate", "net::ERR_NAME_NOT_RESOLVED"));
        let results = run_responsive_suite(&opener, &cfg).await.expect("run");

        assert_eq!(results[0].name, "[768-tablet] open-pages");
        assert!(!results[0].pass);
        assert!(results[0].detail.contains("ERR_NAME_NOT_RESOLVED"));
        assert!(results.iter().any(|r| r.name.starts_with("[375-mobile]")));
        // No overlay below desktop widths, and the half-open pair was torn down.
        assert_eq!(actions(&log), vec!["destroy"]);
    }

    #[tokio::test]
    async fn connection_loss_aborts_the_run() {
        let cfg = config(vec![Breakpoint::new("1440-desktop", 1440, 900)]);
        let opener = ScriptedOpener::new().then_fail(AuditError::connection("refused"));
        let err = run_responsive_suite(&opener, &cfg).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn desktop_reference_gets_its_overlay_closed() {
        let cfg = config(vec![Breakpoint::new("1024-small-desktop", 1024, 768)]);
        let panel = |radius: &str| {
            json!({
                "rect": {"left": 240, "top": 64, "width": 700, "height": 700},
                "styles": {"borderTopLeftRadius": radius, "display": "block", "visibility": "visible"}
            })
        };
        let reference = ScriptedPage::new(cfg.breakpoints[0].viewport()).respond("state:panel", panel("16px"));
        let log = reference.log();
        let target = ScriptedPage::new(cfg.breakpoints[0].viewport()).respond("state:panel", panel("12px"));
        let opener = ScriptedOpener::new().then(reference).then(target);
        let results = run_responsive_suite(&opener, &cfg).await.expect("run");

        let log = actions(&log);
        assert_eq!(&log[..2], ["query dismiss-overlay", "pause 1500ms"]);
        assert_eq!(log.last().map(String::as_str), Some("destroy"));

        assert!(results[0].pass);
        assert_eq!(results[0].name, "[1024-small-desktop] panel-exists");
        let radius = &results[1];
        assert!(!radius.pass);
        assert_eq!(radius.detail, "almond=16px doc=12px");
    }
}
