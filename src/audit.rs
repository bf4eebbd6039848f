//! Runs the selected categories against one pair of desktop sessions, then the
//! per-breakpoint responsive pass, and assembles the report.

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::output::AuditReport;
use crate::page::{close, AuditPage, PageOpener};
use crate::registry::ElementSpec;
use crate::site::SiteProfile;
use crate::suites::css::select_elements;
use crate::suites::{desktop_suites, run_css_suite, run_responsive_suite, Category};

#[derive(Debug, Clone, Default)]
pub struct AuditOptions {
    /// Categories to run; empty means all of them.
    pub only: Vec<Category>,
    /// Restricts the css category to one registry element.
    pub focus: Option<String>,
    pub skip_responsive: bool,
}

impl AuditOptions {
    pub fn wants(&self, category: Category) -> bool {
        if category == Category::Responsive && self.skip_responsive {
            return false;
        }
        self.only.is_empty() || self.only.contains(&category)
    }
}

pub async fn run_audit(opener: &dyn PageOpener, config: &Config, options: &AuditOptions) -> Result<AuditReport> {
    let elements = select_elements(options.focus.as_deref());
    let mut report = AuditReport::new(&config.reference_url, &config.target_url, config.viewport);

    let needs_desktop = Category::all()
        .into_iter()
        .any(|c| c.uses_desktop_pages() && options.wants(c));
    if needs_desktop {
        run_desktop(opener, config, options, &elements, &mut report).await?;
    }

    if options.wants(Category::Responsive) {
        info!(breakpoints = config.breakpoints.len(), "running responsive checks");
        let results = run_responsive_suite(opener, config).await?;
        report.set_tests(Category::Responsive, results);
    }

    report.summarize();
    info!(
        passed = report.summary.overall.pass,
        failed = report.summary.overall.fail,
        total = report.summary.overall.total,
        "audit finished"
    );
    Ok(report)
}

/// Opens the reference and target at the configured viewport, runs every
/// wanted desktop category in order and closes both pages.
async fn run_desktop(
    opener: &dyn PageOpener,
    config: &Config,
    options: &AuditOptions,
    elements: &[ElementSpec],
    report: &mut AuditReport,
) -> Result<()> {
    info!(url = %config.reference_url, "opening reference");
    let reference = opener.open(&config.reference_url, config.viewport).await?;

    let outcome = async {
        SiteProfile::reference()
            .dismiss_overlay(&*reference, config.browser.overlay_settle)
            .await?;
        info!(url = %config.target_url, "opening target");
        let target = opener.open(&config.target_url, config.viewport).await?;
        let ran = run_categories(&*reference, &*target, config, options, elements, report).await;
        close(&*target).await;
        ran
    }
    .await;

    close(&*reference).await;
    outcome
}

async fn run_categories(
    reference: &dyn AuditPage,
    target: &dyn AuditPage,
    config: &Config,
    options: &AuditOptions,
    elements: &[ElementSpec],
    report: &mut AuditReport,
) -> Result<()> {
    if options.wants(Category::Css) {
        info!(elements = elements.len(), "running css comparison");
        report.css = Some(
            run_css_suite(reference, target, elements, &config.tolerance, &config.palette).await?,
        );
    }
    for suite in desktop_suites(config) {
        let category = suite.category();
        if !options.wants(category) {
            continue;
        }
        info!(%category, "running checks");
        let results = suite.run(reference, target).await?;
        report.set_tests(category, results);
    }
    Ok(())
}
