//! Structure the CSS diff cannot see: stacking, ordering, inheritance and
//! where things ended up in the DOM.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::{conclude, css_int, or_null, within_first, Category, DesktopSuite, TestResult, Verdict};
use crate::compare::leading_number;
use crate::config::DomThresholds;
use crate::error::Result;
use crate::locator::Locator;
use crate::page::{probe, AuditPage, Rect};
use crate::queries::{self, ElementState, Query, ScrollMetrics};
use crate::site::SiteProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    ZIndexNavbarAbovePanel,
    ArticleLeftOfToc,
    TocHasStickyInner,
    PanelIsScrollContainer,
    PaginationChildOrder,
    AdmonitionIconTextGap,
    CodeBlockTitleExists,
    TableWidthRatio,
    TextColorMatches,
    OverflowWrapMatches,
    BodyLineHeightMatches,
    SidebarNoPanelOverlap,
    HeadingSizeHierarchy,
    EyebrowAboveH1,
    DescriptionBetweenHeadings,
    NoHorizontalScroll,
    SearchInSidebar,
    HeadingsHaveScrollMargin,
}

impl Check {
    const ALL: [Check; 18] = [
        Check::ZIndexNavbarAbovePanel,
        Check::ArticleLeftOfToc,
        Check::TocHasStickyInner,
        Check::PanelIsScrollContainer,
        Check::PaginationChildOrder,
        Check::AdmonitionIconTextGap,
        Check::CodeBlockTitleExists,
        Check::TableWidthRatio,
        Check::TextColorMatches,
        Check::OverflowWrapMatches,
        Check::BodyLineHeightMatches,
        Check::SidebarNoPanelOverlap,
        Check::HeadingSizeHierarchy,
        Check::EyebrowAboveH1,
        Check::DescriptionBetweenHeadings,
        Check::NoHorizontalScroll,
        Check::SearchInSidebar,
        Check::HeadingsHaveScrollMargin,
    ];

    fn name(self) -> &'static str {
        match self {
            Check::ZIndexNavbarAbovePanel => "z-index-navbar-above-panel",
            Check::ArticleLeftOfToc => "article-visually-left-of-toc",
            Check::TocHasStickyInner => "toc-has-sticky-inner",
            Check::PanelIsScrollContainer => "panel-is-scroll-container",
            Check::PaginationChildOrder => "pagination-child-order",
            Check::AdmonitionIconTextGap => "admonition-icon-text-gap",
            Check::CodeBlockTitleExists => "code-block-title-exists",
            Check::TableWidthRatio => "table-width-ratio",
            Check::TextColorMatches => "text-color-matches-reference",
            Check::OverflowWrapMatches => "overflow-wrap-matches",
            Check::BodyLineHeightMatches => "body-line-height-matches",
            Check::SidebarNoPanelOverlap => "sidebar-no-panel-overlap",
            Check::HeadingSizeHierarchy => "heading-size-hierarchy",
            Check::EyebrowAboveH1 => "eyebrow-above-h1",
            Check::DescriptionBetweenHeadings => "description-between-h1-and-h2",
            Check::NoHorizontalScroll => "no-horizontal-scroll",
            Check::SearchInSidebar => "search-in-sidebar",
            Check::HeadingsHaveScrollMargin => "headings-have-scroll-margin",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchInput {
    in_navbar: bool,
    in_sidebar: bool,
    visible: bool,
}

fn search_inputs() -> Query {
    Query::new(
        "search-inputs",
        r#"(function() {
  var inputs = document.querySelectorAll('input[type="search"], .navbar__search-input, [class*="searchBox"]');
  var out = [];
  for (var i = 0; i < inputs.length; i++) {
    var el = inputs[i];
    var r = el.getBoundingClientRect();
    out.push({
      inNavbar: !!el.closest('.navbar'),
      inSidebar: !!el.closest('.theme-doc-sidebar-container, [class*="sidebar"]'),
      visible: getComputedStyle(el).display !== 'none' && r.width > 0
    });
  }
  return out;
})()"#,
    )
}

pub struct DomSuite {
    thresholds: DomThresholds,
    reference: SiteProfile,
    target: SiteProfile,
}

impl DomSuite {
    pub fn new(thresholds: DomThresholds) -> Self {
        Self {
            thresholds,
            reference: SiteProfile::reference(),
            target: SiteProfile::target(),
        }
    }

    async fn evaluate(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
        check: Check,
    ) -> Result<Option<Verdict>> {
        match check {
            Check::ZIndexNavbarAbovePanel => self.stacking(target).await,
            Check::ArticleLeftOfToc => self.flex_order(target).await,
            Check::TocHasStickyInner => toc_sticky_inner(target).await.map(Some),
            Check::PanelIsScrollContainer => self.scroll_container(target).await,
            Check::PaginationChildOrder => pagination_order(reference, target).await,
            Check::AdmonitionIconTextGap => self.admonition_gap(target).await.map(Some),
            Check::CodeBlockTitleExists => code_block_title(target).await.map(Some),
            Check::TableWidthRatio => self.table_ratio(reference, target).await,
            Check::TextColorMatches => self.text_color(reference, target).await.map(Some),
            Check::OverflowWrapMatches => self.overflow_wrap(reference, target).await.map(Some),
            Check::BodyLineHeightMatches => self.line_height(reference, target).await.map(Some),
            Check::SidebarNoPanelOverlap => self.sidebar_overlap(target).await,
            Check::HeadingSizeHierarchy => self.heading_sizes(target).await,
            Check::EyebrowAboveH1 => self.eyebrow_order(target).await.map(Some),
            Check::DescriptionBetweenHeadings => self.description_order(target).await.map(Some),
            Check::NoHorizontalScroll => self.horizontal_scroll(target).await.map(Some),
            Check::SearchInSidebar => search_in_sidebar(target).await.map(Some),
            Check::HeadingsHaveScrollMargin => self.scroll_margin(target).await.map(Some),
        }
    }

    async fn stacking(&self, page: &dyn AuditPage) -> Result<Option<Verdict>> {
        let props = ["zIndex", "position"];
        let navbar: Option<ElementState> =
            probe(page, &queries::element_state("navbar-stack", &self.target.navbar, &props)).await?;
        let panel: Option<ElementState> =
            probe(page, &queries::element_state("panel-stack", &self.target.panel, &props)).await?;
        let (Some(navbar), Some(panel)) = (navbar, panel) else {
            return Ok(None);
        };
        // `auto` stacks like 0.
        let nav_z = css_int(navbar.style("zIndex"));
        let panel_z = css_int(panel.style("zIndex"));
        Ok(Some(Verdict::new(
            nav_z.unwrap_or(0) > panel_z.unwrap_or(0),
            format!(
                "navbar z={} ({}) panel z={} ({})",
                nav_z.map_or("auto".to_string(), |z| z.to_string()),
                navbar.style("position"),
                panel_z.map_or("auto".to_string(), |z| z.to_string()),
                panel.style("position")
            ),
        )))
    }

    async fn flex_order(&self, page: &dyn AuditPage) -> Result<Option<Verdict>> {
        let article: Option<Rect> = probe(page, &queries::rect("article", &self.target.article)).await?;
        let toc: Option<Rect> = probe(
            page,
            &queries::rect("toc-column", &Locator::css(".mintysaurus-toc, .mintysaurus-side-layout")),
        )
        .await?;
        Ok(match (article, toc) {
            (Some(a), Some(t)) => Some(Verdict::new(
                a.left < t.left,
                format!("article.left={:.0} toc.left={:.0}", a.left, t.left),
            )),
            _ => None,
        })
    }

    async fn scroll_container(&self, page: &dyn AuditPage) -> Result<Option<Verdict>> {
        let Some(state): Option<ElementState> = probe(
            page,
            &queries::element_state("panel-overflow", &self.target.panel, &["overflowY"]),
        )
        .await?
        else {
            return Ok(None);
        };
        let metrics: Option<ScrollMetrics> =
            probe(page, &queries::scroll_metrics("panel", &self.target.panel)).await?;
        let overflow = state.style("overflowY");
        Ok(Some(Verdict::new(
            overflow == "auto" || overflow == "scroll",
            format!(
                "panel.overflowY={overflow} scrollable={}",
                metrics.is_some_and(|m| m.overflows_vertically())
            ),
        )))
    }

    async fn admonition_gap(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let heading = within_first(".theme-admonition", "[class*=\"admonitionHeading\"]");
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state("admonition-heading", &heading, &["display", "gap"]),
        )
        .await?;
        Ok(match state {
            Some(s) => {
                let gap = s.px("gap").unwrap_or(0.0);
                Verdict::new(
                    s.style("display") == "flex" && gap >= self.thresholds.admonition_min_gap,
                    format!("display={} gap={}", s.style("display"), s.style("gap")),
                )
            }
            None => Verdict::new(false, "no admonition heading"),
        })
    }

    async fn table_ratio(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Option<Verdict>> {
        let Some(doc) = table_ratio(
            target,
            &Locator::css(".theme-doc-markdown table"),
            &self.target.article,
        )
        .await?
        else {
            return Ok(None);
        };
        let Some(almond) = table_ratio(reference, &Locator::css("table"), &self.reference.article).await?
        else {
            return Ok(None);
        };
        Ok(Some(Verdict::new(
            (doc - almond).abs() <= self.thresholds.table_ratio_band,
            format!("almond={:.0}% doc={:.0}%", almond * 100.0, doc * 100.0),
        )))
    }

    /// `property` of the first body paragraph on each side.
    async fn body_text_style(
        &self,
        reference: &dyn AuditPage,
        target: &dyn AuditPage,
        property: &str,
    ) -> Result<(Option<String>, Option<String>)> {
        let label = format!("body-text-{property}");
        let almond: Option<ElementState> = probe(
            reference,
            &queries::element_state(&label, &self.reference.body_text, &[property]),
        )
        .await?;
        let doc: Option<ElementState> = probe(
            target,
            &queries::element_state(&label, &self.target.body_text, &[property]),
        )
        .await?;
        let value = |s: Option<ElementState>| s.map(|s| s.style(property).to_string());
        Ok((value(almond), value(doc)))
    }

    async fn text_color(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let (almond, doc) = self.body_text_style(reference, target, "color").await?;
        let close = match (&almond, &doc) {
            (Some(a), Some(d)) => {
                let lead = |v: &str| leading_channel(v).unwrap_or(0.0);
                a == d || (lead(a) - lead(d)).abs() <= self.thresholds.text_channel
            }
            (None, None) => true,
            _ => false,
        };
        Ok(Verdict::new(
            close,
            format!("almond={} doc={}", or_null(almond), or_null(doc)),
        ))
    }

    async fn overflow_wrap(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let (almond, doc) = self.body_text_style(reference, target, "overflowWrap").await?;
        Ok(Verdict::new(
            almond == doc || doc.as_deref() == Some("break-word"),
            format!(
                "almond={} doc={} (break-word accepted)",
                or_null(almond),
                or_null(doc)
            ),
        ))
    }

    async fn line_height(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Verdict> {
        let body = Locator::script("document.body");
        let query = queries::element_state("body", &body, &["lineHeight"]);
        let almond: Option<ElementState> = probe(reference, &query).await?;
        let doc: Option<ElementState> = probe(target, &query).await?;
        let raw = |s: &Option<ElementState>| s.as_ref().map(|s| s.style("lineHeight").to_string());
        let (a, d) = (raw(&almond), raw(&doc));
        let numeric = match (
            a.as_deref().and_then(leading_number),
            d.as_deref().and_then(leading_number),
        ) {
            (Some(x), Some(y)) => (x - y).abs() <= self.thresholds.line_height,
            _ => false,
        };
        Ok(Verdict::new(
            a == d || numeric,
            format!("almond={} doc={}", or_null(a), or_null(d)),
        ))
    }

    async fn sidebar_overlap(&self, page: &dyn AuditPage) -> Result<Option<Verdict>> {
        let sidebar: Option<Rect> = probe(page, &queries::rect("sidebar", &self.target.sidebar)).await?;
        let panel: Option<Rect> = probe(page, &queries::rect("panel", &self.target.panel)).await?;
        Ok(match (sidebar, panel) {
            (Some(s), Some(p)) => Some(Verdict::new(
                s.right() <= p.left + self.thresholds.overlap_slack,
                format!("sidebar.right={:.0} panel.left={:.0}", s.right(), p.left),
            )),
            _ => None,
        })
    }

    async fn heading_sizes(&self, page: &dyn AuditPage) -> Result<Option<Verdict>> {
        let mut sizes = [0.0; 3];
        let headings = [("h1", &self.target.h1), ("h2", &self.target.h2), ("h3", &self.target.h3)];
        for (slot, (label, locator)) in sizes.iter_mut().zip(headings) {
            let state: Option<ElementState> =
                probe(page, &queries::element_state(label, locator, &["fontSize"])).await?;
            match state.and_then(|s| s.px("fontSize")) {
                Some(size) if size > 0.0 => *slot = size,
                _ => return Ok(None),
            }
        }
        let [h1, h2, h3] = sizes;
        Ok(Some(Verdict::new(
            h1 > h2 && h2 > h3,
            format!("h1={h1}px h2={h2}px h3={h3}px"),
        )))
    }

    async fn eyebrow_order(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let eyebrow: Option<Rect> =
            probe(page, &queries::rect("eyebrow", &Locator::css(".mintlify-eyebrow"))).await?;
        let h1: Option<Rect> = probe(page, &queries::rect("h1", &self.target.h1)).await?;
        Ok(match (eyebrow, h1) {
            (Some(e), Some(h)) => Verdict::new(
                e.top < h.top,
                format!("eyebrow.top={:.0} h1.top={:.0}", e.top, h.top),
            ),
            _ => Verdict::new(false, "elements not found"),
        })
    }

    async fn description_order(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let desc: Option<Rect> =
            probe(page, &queries::rect("description", &Locator::css(".mintlify-description"))).await?;
        let h1: Option<Rect> = probe(page, &queries::rect("h1", &self.target.h1)).await?;
        let h2: Option<Rect> = probe(page, &queries::rect("h2", &self.target.h2)).await?;
        let slack = self.thresholds.ordering_slack;
        Ok(match (desc, h1, h2) {
            (Some(d), Some(h1), Some(h2)) => Verdict::new(
                d.top > h1.bottom() - slack && d.bottom() < h2.top + slack,
                format!(
                    "desc.top={:.0} h1.bottom={:.0} h2.top={:.0}",
                    d.top,
                    h1.bottom(),
                    h2.top
                ),
            ),
            _ => Verdict::new(false, "elements not found"),
        })
    }

    async fn horizontal_scroll(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let metrics: Option<ScrollMetrics> =
            probe(page, &queries::scroll_metrics("panel", &self.target.panel)).await?;
        Ok(match metrics {
            Some(m) => Verdict::new(
                m.scroll_width <= m.client_width + self.thresholds.horizontal_scroll_slack,
                format!("scrollWidth={} clientWidth={}", m.scroll_width, m.client_width),
            ),
            None => Verdict::new(true, "no panel"),
        })
    }

    async fn scroll_margin(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state("h2-margin", &self.target.h2, &["scrollMarginTop"]),
        )
        .await?;
        Ok(match state {
            Some(s) => Verdict::new(
                s.px("scrollMarginTop").is_some_and(|m| m > 0.0),
                format!("scrollMarginTop={}", s.style("scrollMarginTop")),
            ),
            None => Verdict::new(false, "no h2"),
        })
    }
}

#[async_trait]
impl DesktopSuite for DomSuite {
    fn category(&self) -> Category {
        Category::Dom
    }

    async fn run(&self, reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Vec<TestResult>> {
        let mut results = Vec::new();
        for check in Check::ALL {
            let outcome = self.evaluate(reference, target, check).await;
            if let Some(result) = conclude(check.name(), outcome)? {
                results.push(result);
            }
        }
        info!(
            passed = results.iter().filter(|r| r.pass).count(),
            total = results.len(),
            "dom checks done"
        );
        Ok(results)
    }
}

/// First integer in a color string, which for `rgb()` is the red channel.
fn leading_channel(value: &str) -> Option<f64> {
    let start = value.find(|c: char| c.is_ascii_digit())?;
    let digits: String = value[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

async fn table_ratio(page: &dyn AuditPage, table: &Locator, column: &Locator) -> Result<Option<f64>> {
    let table: Option<Rect> = probe(page, &queries::rect("table", table)).await?;
    let column: Option<Rect> = probe(page, &queries::rect("table-column", column)).await?;
    Ok(match (table, column) {
        (Some(t), Some(c)) if c.width > 0.0 => Some(t.width / c.width),
        _ => None,
    })
}

async fn toc_sticky_inner(page: &dyn AuditPage) -> Result<Verdict> {
    let inner = Locator::script(
        "(function() { var toc = document.querySelector('.mintysaurus-toc'); if (!toc) return null; \
         return toc.querySelector('[class*=\"tableOfContents\"]') || toc.firstElementChild; })()",
    );
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state("toc-sticky-inner", &inner, &["position", "top"]),
    )
    .await?;
    Ok(match state {
        Some(s) => Verdict::new(
            s.style("position") == "sticky",
            format!("position={} top={}", s.style("position"), s.style("top")),
        ),
        None => Verdict::new(false, "no toc inner element"),
    })
}

async fn pagination_order(reference: &dyn AuditPage, target: &dyn AuditPage) -> Result<Option<Verdict>> {
    let doc_link: Option<Rect> =
        probe(target, &queries::rect("pagination-link", &Locator::css(".pagination-nav__link"))).await?;
    let almond_link: Option<Rect> =
        probe(reference, &queries::rect("pagination-link", &Locator::css("#pagination a"))).await?;
    if doc_link.is_none() || almond_link.is_none() {
        return Ok(None);
    }
    let label: Option<Rect> = probe(
        target,
        &queries::rect(
            "pagination-label",
            &within_first(".pagination-nav__link", ".pagination-nav__label"),
        ),
    )
    .await?;
    let sublabel: Option<Rect> = probe(
        target,
        &queries::rect(
            "pagination-sublabel",
            &within_first(".pagination-nav__link", ".pagination-nav__sublabel"),
        ),
    )
    .await?;
    Ok(Some(match (label, sublabel) {
        (Some(l), Some(s)) => Verdict::new(
            l.top < s.top,
            format!(
                "label.top={:.0} sublabel.top={:.0} (expect label above sublabel)",
                l.top, s.top
            ),
        ),
        _ => Verdict::new(false, "elements not found"),
    }))
}

async fn code_block_title(page: &dyn AuditPage) -> Result<Verdict> {
    let title = Locator::css("[class*=\"codeBlockTitle\"], .prism-code-title");
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state("code-title-exists", &title, &["display", "fontSize"]),
    )
    .await?;
    Ok(match state {
        Some(s) => {
            let visible = s.style("display") != "none" && s.rect.height > 0.0;
            Verdict::new(visible, format!("text=\"{}\" visible={visible}", s.text))
        }
        None => Verdict::new(false, "exists=false"),
    })
}

async fn search_in_sidebar(page: &dyn AuditPage) -> Result<Verdict> {
    let inputs: Vec<SearchInput> = probe(page, &search_inputs()).await?.unwrap_or_default();
    let visible: Vec<_> = inputs.iter().filter(|s| s.visible).collect();
    let in_sidebar = visible.iter().any(|s| s.in_sidebar);
    let in_navbar = visible.iter().any(|s| s.in_navbar);
    Ok(Verdict::new(
        in_sidebar && !in_navbar,
        format!(
            "sidebar={in_sidebar} navbar={in_navbar} total={}",
            visible.len()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedPage;
    use serde_json::{json, Value};

    fn state(rect: [f64; 4], styles: Value) -> Value {
        json!({
            "rect": {"left": rect[0], "top": rect[1], "width": rect[2], "height": rect[3]},
            "styles": styles
        })
    }

    fn find<'a>(results: &'a [TestResult], name: &str) -> Option<&'a TestResult> {
        results.iter().find(|r| r.name == name)
    }

    #[test]
    fn leading_channel_reads_the_first_integer() {
        assert_eq!(leading_channel("rgb(51, 65, 85)"), Some(51.0));
        assert_eq!(leading_channel("rgba(0, 0, 0, 0.9)"), Some(0.0));
        assert_eq!(leading_channel("currentcolor"), None);
    }

    #[tokio::test]
    async fn blank_pages_emit_only_unconditional_checks() {
        let suite = DomSuite::new(DomThresholds::default());
        let results = suite
            .run(&ScriptedPage::desktop(), &ScriptedPage::desktop())
            .await
            .expect("run");
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "toc-has-sticky-inner",
                "admonition-icon-text-gap",
                "code-block-title-exists",
                "text-color-matches-reference",
                "overflow-wrap-matches",
                "body-line-height-matches",
                "eyebrow-above-h1",
                "description-between-h1-and-h2",
                "no-horizontal-scroll",
                "search-in-sidebar",
                "headings-have-scroll-margin",
            ]
        );
        let eyebrow = find(&results, "eyebrow-above-h1").expect("eyebrow");
        assert_eq!(eyebrow.detail, "elements not found");
        // Nothing on either side counts as matching.
        assert!(find(&results, "text-color-matches-reference").expect("color").pass);
    }

    #[tokio::test]
    async fn navbar_must_stack_above_panel() {
        let target = ScriptedPage::desktop()
            .respond(
                "state:navbar-stack",
                state([0.0, 0.0, 1440.0, 64.0], json!({"zIndex": "auto", "position": "sticky"})),
            )
            .respond(
                "state:panel-stack",
                state([264.0, 64.0, 900.0, 800.0], json!({"zIndex": "1", "position": "relative"})),
            );
        let suite = DomSuite::new(DomThresholds::default());
        let results = suite.run(&ScriptedPage::desktop(), &target).await.expect("run");
        let stack = find(&results, "z-index-navbar-above-panel").expect("emitted");
        assert!(!stack.pass);
        assert_eq!(stack.detail, "navbar z=auto (sticky) panel z=1 (relative)");
    }

    #[tokio::test]
    async fn heading_hierarchy_and_table_ratio() {
        let heading = |size: &str| state([0.0, 0.0, 600.0, 40.0], json!({"fontSize": size}));
        let rect = |w: f64| json!({"left": 0, "top": 0, "width": w, "height": 100});
        let target = ScriptedPage::desktop()
            .respond("state:h1", heading("36px"))
            .respond("state:h2", heading("24px"))
            .respond("state:h3", heading("20px"))
            .respond("rect:table", rect(600.0))
            .respond("rect:table-column", rect(640.0));
        let reference = ScriptedPage::desktop()
            .respond("rect:table", rect(520.0))
            .respond("rect:table-column", rect(640.0));
        let suite = DomSuite::new(DomThresholds::default());
        let results = suite.run(&reference, &target).await.expect("run");

        let hierarchy = find(&results, "heading-size-hierarchy").expect("emitted");
        assert!(hierarchy.pass);
        assert_eq!(hierarchy.detail, "h1=36px h2=24px h3=20px");

        let table = find(&results, "table-width-ratio").expect("emitted");
        assert!(table.pass, "{}", table.detail);
        assert_eq!(table.detail, "almond=81% doc=94%");
    }

    #[tokio::test]
    async fn search_must_live_in_the_sidebar() {
        let target = ScriptedPage::desktop().respond(
            "search-inputs",
            json!([
                {"inNavbar": true, "inSidebar": false, "visible": false},
                {"inNavbar": false, "inSidebar": true, "visible": true}
            ]),
        );
        let suite = DomSuite::new(DomThresholds::default());
        let results = suite.run(&ScriptedPage::desktop(), &target).await.expect("run");
        let search = find(&results, "search-in-sidebar").expect("emitted");
        assert!(search.pass);
        assert_eq!(search.detail, "sidebar=true navbar=false total=1");
    }
}
