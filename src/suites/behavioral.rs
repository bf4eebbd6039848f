//! Interaction checks against the target page alone.
//!
//! All checks share one page, so every check that scrolls puts the panel back
//! at the top and every check that moves the pointer parks it again, whether
//! or not the check itself succeeded.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::{
    conclude, css_int, is_transparent, or_null, within_first, Category, DesktopSuite, TestResult,
    Verdict,
};
use crate::config::BehavioralThresholds;
use crate::error::Result;
use crate::locator::Locator;
use crate::page::{probe, AuditPage, Rect};
use crate::queries::{self, ElementState, Query, ScrollMetrics};
use crate::site::SiteProfile;

const SIDEBAR_LINK: &str = "ul.menu__list .menu__link:not(.menu__link--active):not(.menu__link--sublist):not(.menu__link--sublist-caret)";
const TOC_ACTIVE: &str = ".table-of-contents__link--active";
const TOC_INACTIVE: &str = ".table-of-contents__link:not(.table-of-contents__link--active)";
const BODY_LINK: &str = ".theme-doc-markdown p a";
const PAGINATION_LINK: &str = ".pagination-nav__link";

const RADIUS_CORNERS: [(&str, &str); 4] = [
    ("topLeft", "borderTopLeftRadius"),
    ("topRight", "borderTopRightRadius"),
    ("bottomLeft", "borderBottomLeftRadius"),
    ("bottomRight", "borderBottomRightRadius"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    PanelIsScrollContainer,
    TocIsSticky,
    TocTracksScroll,
    SidebarLinkHoverChanges,
    HeadingAnchorShowsOnHover,
    PanelRadius,
    SidebarNoRightBorder,
    FooterHidden,
    BreadcrumbsHidden,
    SearchInSidebarNotNavbar,
    PaginationHoverChangesBorder,
    AdmonitionHeadingHasGap,
    CodeBlockTitleVisible,
    InlineCodeHasBackground,
    ActiveSidebarLinkHasBackground,
    TocActiveHasLeftBorder,
    NavbarIsTransparent,
    PanelHasBottomSpacing,
    TocLinkHoverChangesColor,
    LinkHoverShowsUnderline,
    SidebarGroupExpandable,
    TableSpansContentWidth,
    PaginationTitleAboveSublabel,
    NavbarVisibleDuringScroll,
    AnchorLinkScrollsToHeading,
}

impl Check {
    pub const ALL: [Check; 25] = [
        Check::PanelIsScrollContainer,
        Check::TocIsSticky,
        Check::TocTracksScroll,
        Check::SidebarLinkHoverChanges,
        Check::HeadingAnchorShowsOnHover,
        Check::PanelRadius,
        Check::SidebarNoRightBorder,
        Check::FooterHidden,
        Check::BreadcrumbsHidden,
        Check::SearchInSidebarNotNavbar,
        Check::PaginationHoverChangesBorder,
        Check::AdmonitionHeadingHasGap,
        Check::CodeBlockTitleVisible,
        Check::InlineCodeHasBackground,
        Check::ActiveSidebarLinkHasBackground,
        Check::TocActiveHasLeftBorder,
        Check::NavbarIsTransparent,
        Check::PanelHasBottomSpacing,
        Check::TocLinkHoverChangesColor,
        Check::LinkHoverShowsUnderline,
        Check::SidebarGroupExpandable,
        Check::TableSpansContentWidth,
        Check::PaginationTitleAboveSublabel,
        Check::NavbarVisibleDuringScroll,
        Check::AnchorLinkScrollsToHeading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Check::PanelIsScrollContainer => "panel-is-scroll-container",
            Check::TocIsSticky => "toc-is-sticky",
            Check::TocTracksScroll => "toc-tracks-scroll",
            Check::SidebarLinkHoverChanges => "sidebar-link-hover-changes",
            Check::HeadingAnchorShowsOnHover => "heading-anchor-shows-on-hover",
            Check::PanelRadius => "panel-radius-all-16px",
            Check::SidebarNoRightBorder => "sidebar-no-right-border",
            Check::FooterHidden => "footer-hidden-on-docs",
            Check::BreadcrumbsHidden => "breadcrumbs-hidden",
            Check::SearchInSidebarNotNavbar => "search-in-sidebar-not-navbar",
            Check::PaginationHoverChangesBorder => "pagination-hover-changes-border",
            Check::AdmonitionHeadingHasGap => "admonition-heading-has-gap",
            Check::CodeBlockTitleVisible => "code-block-title-visible",
            Check::InlineCodeHasBackground => "inline-code-has-background",
            Check::ActiveSidebarLinkHasBackground => "active-sidebar-link-has-background",
            Check::TocActiveHasLeftBorder => "toc-active-has-left-border",
            Check::NavbarIsTransparent => "navbar-is-transparent",
            Check::PanelHasBottomSpacing => "panel-has-bottom-spacing",
            Check::TocLinkHoverChangesColor => "toc-link-hover-changes-color",
            Check::LinkHoverShowsUnderline => "link-hover-shows-underline",
            Check::SidebarGroupExpandable => "sidebar-group-expandable",
            Check::TableSpansContentWidth => "table-spans-content-width",
            Check::PaginationTitleAboveSublabel => "pagination-title-above-sublabel",
            Check::NavbarVisibleDuringScroll => "navbar-visible-during-scroll",
            Check::AnchorLinkScrollsToHeading => "anchor-link-scrolls-to-heading",
        }
    }

    /// Moves the panel's scroll offset.
    fn scrolls(self) -> bool {
        matches!(
            self,
            Check::TocTracksScroll
                | Check::PaginationHoverChangesBorder
                | Check::NavbarVisibleDuringScroll
                | Check::AnchorLinkScrollsToHeading
        )
    }

    /// Moves the pointer.
    fn moves_pointer(self) -> bool {
        matches!(
            self,
            Check::SidebarLinkHoverChanges
                | Check::HeadingAnchorShowsOnHover
                | Check::PaginationHoverChangesBorder
                | Check::TocLinkHoverChangesColor
                | Check::LinkHoverShowsUnderline
                | Check::AnchorLinkScrollsToHeading
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPlacement {
    navbar_search_visible: bool,
    sidebar_search_exists: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupToggle {
    has_caret: bool,
    has_sublist_link: bool,
}

pub struct BehavioralSuite {
    thresholds: BehavioralThresholds,
    site: SiteProfile,
}

impl BehavioralSuite {
    pub fn new(thresholds: BehavioralThresholds) -> Self {
        Self {
            thresholds,
            site: SiteProfile::target(),
        }
    }

    pub async fn run_on(&self, page: &dyn AuditPage) -> Result<Vec<TestResult>> {
        let mut results = Vec::with_capacity(Check::ALL.len());
        for check in Check::ALL {
            let outcome = self.evaluate(page, check).await.map(Some);
            let restored = self.restore(page, check).await;
            if let Some(result) = conclude(check.name(), outcome)? {
                results.push(result);
            }
            restored?;
        }
        info!(
            passed = results.iter().filter(|r| r.pass).count(),
            total = results.len(),
            "behavioral checks done"
        );
        Ok(results)
    }

    /// Puts shared page state back to its baseline. Only fatal errors escape.
    async fn restore(&self, page: &dyn AuditPage, check: Check) -> Result<()> {
        if check.scrolls() {
            if let Err(e) = page.scroll_to(&self.site.panel, 0.0).await {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(check = check.name(), error = %e, "could not reset scroll");
            }
        }
        if check.moves_pointer() {
            if let Err(e) = page.release_pointer().await {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(check = check.name(), error = %e, "could not release pointer");
            }
        }
        Ok(())
    }

    async fn evaluate(&self, page: &dyn AuditPage, check: Check) -> Result<Verdict> {
        match check {
            Check::PanelIsScrollContainer => self.panel_is_scroll_container(page).await,
            Check::TocIsSticky => toc_is_sticky(page).await,
            Check::TocTracksScroll => self.toc_tracks_scroll(page).await,
            Check::SidebarLinkHoverChanges => sidebar_link_hover(page).await,
            Check::HeadingAnchorShowsOnHover => self.heading_anchor_hover(page).await,
            Check::PanelRadius => self.panel_radius(page).await,
            Check::SidebarNoRightBorder => self.sidebar_no_right_border(page).await,
            Check::FooterHidden => footer_hidden(page).await,
            Check::BreadcrumbsHidden => breadcrumbs_hidden(page).await,
            Check::SearchInSidebarNotNavbar => search_in_sidebar(page).await,
            Check::PaginationHoverChangesBorder => self.pagination_hover(page).await,
            Check::AdmonitionHeadingHasGap => admonition_heading_gap(page).await,
            Check::CodeBlockTitleVisible => code_block_title_visible(page).await,
            Check::InlineCodeHasBackground => inline_code_background(page).await,
            Check::ActiveSidebarLinkHasBackground => active_sidebar_link_background(page).await,
            Check::TocActiveHasLeftBorder => toc_active_left_border(page).await,
            Check::NavbarIsTransparent => self.navbar_is_transparent(page).await,
            Check::PanelHasBottomSpacing => self.panel_bottom_spacing(page).await,
            Check::TocLinkHoverChangesColor => toc_link_hover(page).await,
            Check::LinkHoverShowsUnderline => link_hover_underline(page).await,
            Check::SidebarGroupExpandable => sidebar_group_expandable(page).await,
            Check::TableSpansContentWidth => self.table_spans_content(page).await,
            Check::PaginationTitleAboveSublabel => pagination_title_above(page).await,
            Check::NavbarVisibleDuringScroll => self.navbar_during_scroll(page).await,
            Check::AnchorLinkScrollsToHeading => self.anchor_link_scrolls(page).await,
        }
    }

    async fn panel_is_scroll_container(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state("panel-overflow", &self.site.panel, &["overflowY"]),
        )
        .await?;
        let metrics: Option<ScrollMetrics> =
            probe(page, &queries::scroll_metrics("panel", &self.site.panel)).await?;
        Ok(match (state, metrics) {
            (Some(state), Some(m)) => Verdict::new(
                state.style("overflowY") == "auto" && m.overflows_vertically(),
                format!(
                    "overflowY={} scrollHeight={} clientHeight={}",
                    state.style("overflowY"),
                    m.scroll_height,
                    m.client_height
                ),
            ),
            _ => Verdict::new(false, "no panel"),
        })
    }

    async fn toc_tracks_scroll(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let active = Locator::css(TOC_ACTIVE);
        let before: Option<String> = probe(page, &queries::text("toc-active", &active)).await?;
        page.scroll_to(&self.site.panel, self.thresholds.toc_probe_offset)
            .await?;
        let after: Option<String> = probe(page, &queries::text("toc-active", &active)).await?;
        Ok(Verdict::new(
            before.is_some() && after.is_some(),
            format!("before=\"{}\" after=\"{}\"", or_null(before), or_null(after)),
        ))
    }

    async fn heading_anchor_hover(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let anchor = Locator::css(".theme-doc-markdown h2 .hash-link");
        let query = queries::element_state("hash-link", &anchor, &["opacity"]);
        let before: Option<ElementState> = probe(page, &query).await?;
        page.hover(&self.site.h2).await?;
        let after: Option<ElementState> = probe(page, &query).await?;
        let threshold = self.thresholds.hover_opacity;
        let opacity = |s: &Option<ElementState>| s.as_ref().and_then(|s| s.px("opacity"));
        let pass = matches!(
            (opacity(&before), opacity(&after)),
            (Some(pre), Some(post)) if pre < threshold && post > threshold
        );
        Ok(Verdict::new(
            pass,
            format!(
                "pre opacity={} post opacity={}",
                or_null(opacity(&before)),
                or_null(opacity(&after))
            ),
        ))
    }

    async fn panel_radius(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let props: Vec<&str> = RADIUS_CORNERS.iter().map(|(_, prop)| *prop).collect();
        let Some(state): Option<ElementState> = probe(
            page,
            &queries::element_state("panel-radius", &self.site.panel, &props),
        )
        .await?
        else {
            return Ok(Verdict::new(false, "no panel"));
        };
        let expected = self.thresholds.panel_radius;
        let off: Vec<String> = RADIUS_CORNERS
            .iter()
            .filter(|(_, prop)| state.px(prop) != Some(expected))
            .map(|(corner, prop)| format!("{corner}={}", state.style(prop)))
            .collect();
        if off.is_empty() {
            Ok(Verdict::new(true, format!("all corners {expected}px")))
        } else {
            Ok(Verdict::new(false, off.join(" ")))
        }
    }

    async fn sidebar_no_right_border(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state(
                "sidebar-border",
                &self.site.sidebar,
                &["borderRightWidth", "borderRightStyle"],
            ),
        )
        .await?;
        Ok(match state {
            Some(s) => Verdict::new(
                s.style("borderRightWidth") == "0px" || s.style("borderRightStyle") == "none",
                format!(
                    "borderRightWidth={} borderRightStyle={}",
                    s.style("borderRightWidth"),
                    s.style("borderRightStyle")
                ),
            ),
            None => Verdict::new(false, "no sidebar"),
        })
    }

    async fn pagination_hover(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let link = Locator::css(PAGINATION_LINK);
        page.scroll_to(&self.site.panel, 99_999.0).await?;
        let query = queries::element_state("pagination-link", &link, &["borderTopColor"]);
        let before: Option<ElementState> = probe(page, &query).await?;
        page.hover(&link).await?;
        let after: Option<ElementState> = probe(page, &query).await?;
        Ok(changed("borderTopColor", before, after))
    }

    async fn navbar_is_transparent(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state("navbar-bg", &self.site.navbar, &["backgroundColor"]),
        )
        .await?;
        Ok(match state {
            Some(s) => Verdict::new(
                is_transparent(s.style("backgroundColor")),
                format!("bg={}", s.style("backgroundColor")),
            ),
            None => Verdict::new(false, "no navbar"),
        })
    }

    async fn panel_bottom_spacing(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state(
                "panel-bottom",
                &self.site.panel,
                &["paddingBottom", "marginBottom"],
            ),
        )
        .await?;
        Ok(match state {
            Some(s) => Verdict::new(
                s.px("paddingBottom")
                    .is_some_and(|p| p >= self.thresholds.min_panel_padding),
                format!(
                    "paddingBottom={} marginBottom={}",
                    s.style("paddingBottom"),
                    s.style("marginBottom")
                ),
            ),
            None => Verdict::new(false, "no panel"),
        })
    }

    async fn table_spans_content(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let table: Option<Rect> = probe(
            page,
            &queries::rect("table", &Locator::css(".theme-doc-markdown table")),
        )
        .await?;
        let article: Option<Rect> = probe(page, &queries::rect("article", &self.site.article)).await?;
        Ok(match (table, article) {
            (Some(t), Some(a)) if a.width > 0.0 => {
                let ratio = t.width / a.width;
                Verdict::new(
                    ratio >= self.thresholds.min_table_ratio,
                    format!(
                        "table={:.0}px article={:.0}px ratio={:.0}%",
                        t.width,
                        a.width,
                        ratio * 100.0
                    ),
                )
            }
            _ => Verdict::new(false, "not found"),
        })
    }

    async fn navbar_during_scroll(&self, page: &dyn AuditPage) -> Result<Verdict> {
        page.scroll_to(&self.site.panel, self.thresholds.navbar_probe_offset)
            .await?;
        let state: Option<ElementState> = probe(
            page,
            &queries::element_state("navbar-scrolled", &self.site.navbar, &["zIndex"]),
        )
        .await?;
        Ok(match state {
            Some(s) => {
                let z = css_int(s.style("zIndex")).unwrap_or(0);
                let visible = s.rect.top >= 0.0 && s.rect.height > 0.0;
                Verdict::new(
                    visible && z >= self.thresholds.min_navbar_z_index,
                    format!("navbarTop={} visible={visible} zIndex={z}", s.rect.top),
                )
            }
            None => Verdict::new(false, "no navbar"),
        })
    }

    async fn anchor_link_scrolls(&self, page: &dyn AuditPage) -> Result<Verdict> {
        let metrics = queries::scroll_metrics("panel", &self.site.panel);
        let Some(before): Option<ScrollMetrics> = probe(page, &metrics).await? else {
            return Ok(Verdict::new(false, "no panel"));
        };
        if !page.click(&Locator::css(TOC_INACTIVE)).await? {
            return Ok(Verdict::new(false, "no toc link"));
        }
        page.pause(self.thresholds.anchor_scroll_wait).await;
        let after: Option<ScrollMetrics> = probe(page, &metrics).await?;
        let after_top = after.map_or(before.scroll_top, |m| m.scroll_top);
        Ok(Verdict::new(
            (after_top - before.scroll_top).abs() > self.thresholds.anchor_scroll_delta,
            format!("before={} after={after_top}", before.scroll_top),
        ))
    }
}

#[async_trait]
impl DesktopSuite for BehavioralSuite {
    fn category(&self) -> Category {
        Category::Behavioral
    }

    async fn run(
        &self,
        _reference: &dyn AuditPage,
        target: &dyn AuditPage,
    ) -> Result<Vec<TestResult>> {
        self.run_on(target).await
    }
}

/// Passes when `property` differs between the two reads.
fn changed(property: &str, before: Option<ElementState>, after: Option<ElementState>) -> Verdict {
    match (before, after) {
        (Some(pre), Some(post)) => Verdict::new(
            pre.style(property) != post.style(property),
            format!("pre {property}={} post {property}={}", pre.style(property), post.style(property)),
        ),
        _ => Verdict::new(false, "element not found"),
    }
}

async fn toc_is_sticky(page: &dyn AuditPage) -> Result<Verdict> {
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state(
            "toc-inner",
            &Locator::css(".mintysaurus-toc > div"),
            &["position", "top"],
        ),
    )
    .await?;
    Ok(match state {
        Some(s) => Verdict::new(
            s.style("position") == "sticky",
            format!("position={} top={}", s.style("position"), s.style("top")),
        ),
        None => Verdict::new(false, "no toc"),
    })
}

async fn sidebar_link_hover(page: &dyn AuditPage) -> Result<Verdict> {
    let link = Locator::css(SIDEBAR_LINK);
    let query = queries::element_state("sidebar-link", &link, &["backgroundColor", "color"]);
    let before: Option<ElementState> = probe(page, &query).await?;
    page.hover(&link).await?;
    let after: Option<ElementState> = probe(page, &query).await?;
    Ok(match (before, after) {
        (Some(pre), Some(post)) => Verdict::new(
            pre.style("backgroundColor") != post.style("backgroundColor")
                || pre.style("color") != post.style("color"),
            format!(
                "pre bg={} color={} post bg={} color={}",
                pre.style("backgroundColor"),
                pre.style("color"),
                post.style("backgroundColor"),
                post.style("color")
            ),
        ),
        _ => Verdict::new(false, "element not found"),
    })
}

/// Hidden means absent or `display: none`.
async fn hidden_chrome(page: &dyn AuditPage, label: &str, selector: &str) -> Result<Verdict> {
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state(label, &Locator::css(selector), &["display", "visibility"]),
    )
    .await?;
    Ok(match state {
        None => Verdict::new(true, "exists=false"),
        Some(s) => Verdict::new(
            s.style("display") == "none",
            format!(
                "exists=true display={} visibility={}",
                s.style("display"),
                s.style("visibility")
            ),
        ),
    })
}

async fn footer_hidden(page: &dyn AuditPage) -> Result<Verdict> {
    hidden_chrome(page, "footer", ".theme-layout-footer").await
}

async fn breadcrumbs_hidden(page: &dyn AuditPage) -> Result<Verdict> {
    hidden_chrome(page, "breadcrumbs", ".theme-doc-breadcrumbs").await
}

async fn search_in_sidebar(page: &dyn AuditPage) -> Result<Verdict> {
    let query = Query::new(
        "search-placement",
        r#"(function() {
  var navSearch = document.querySelector('.navbar .navbar__search-input');
  var sidebarSearch = document.querySelector('.sidebar-search-container .navbar__search-input');
  var navDisplay = navSearch ? getComputedStyle(navSearch.closest('.navbar__search') || navSearch).display : 'none';
  return { navbarSearchVisible: navDisplay !== 'none', sidebarSearchExists: !!sidebarSearch };
})()"#,
    );
    let placement: Option<SearchPlacement> = probe(page, &query).await?;
    Ok(match placement {
        Some(p) => Verdict::new(
            !p.navbar_search_visible && p.sidebar_search_exists,
            format!(
                "navbarSearchVisible={} sidebarSearchExists={}",
                p.navbar_search_visible, p.sidebar_search_exists
            ),
        ),
        None => Verdict::new(false, "no result"),
    })
}

async fn admonition_heading_gap(page: &dyn AuditPage) -> Result<Verdict> {
    let heading = Locator::css(".theme-admonition [class*=\"admonitionHeading\"]");
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state("admonition-heading", &heading, &["display", "gap"]),
    )
    .await?;
    Ok(match state {
        Some(s) => {
            let gap = s.style("gap");
            Verdict::new(
                (gap != "normal" && gap != "0px") || s.style("display") == "flex",
                format!("display={} gap={gap}", s.style("display")),
            )
        }
        None => Verdict::new(false, "no admonition heading"),
    })
}

async fn code_block_title_visible(page: &dyn AuditPage) -> Result<Verdict> {
    let title = Locator::script(
        r#"(function() {
  var titles = document.querySelectorAll('[class*="codeBlockTitle"]');
  for (var i = 0; i < titles.length; i++) {
    if (getComputedStyle(titles[i]).display !== 'none' && titles[i].getBoundingClientRect().height > 0) return titles[i];
  }
  return null;
})()"#,
    );
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state("code-title", &title, &["fontSize", "borderBottomWidth"]),
    )
    .await?;
    Ok(match state {
        Some(s) => Verdict::new(
            true,
            format!("text=\"{}\" height={}", s.text, s.rect.height),
        ),
        None => Verdict::new(false, "exists=false"),
    })
}

async fn background_check(page: &dyn AuditPage, label: &str, element: Locator) -> Result<Verdict> {
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state(label, &element, &["backgroundColor"]),
    )
    .await?;
    Ok(match state {
        Some(s) => Verdict::new(
            !is_transparent(s.style("backgroundColor")),
            format!("bg={}", s.style("backgroundColor")),
        ),
        None => Verdict::new(false, "element not found"),
    })
}

async fn inline_code_background(page: &dyn AuditPage) -> Result<Verdict> {
    background_check(
        page,
        "inline-code",
        Locator::script(
            r#"(function() {
  var codes = document.querySelectorAll('.theme-doc-markdown code');
  for (var i = 0; i < codes.length; i++) {
    if (!codes[i].closest('pre')) return codes[i];
  }
  return null;
})()"#,
        ),
    )
    .await
}

async fn active_sidebar_link_background(page: &dyn AuditPage) -> Result<Verdict> {
    background_check(
        page,
        "sidebar-active",
        Locator::script(
            r#"(function() {
  var links = document.querySelectorAll('.menu__link--active:not(.menu__link--sublist)');
  for (var i = 0; i < links.length; i++) {
    if (getComputedStyle(links[i]).pointerEvents !== 'none') return links[i];
  }
  return null;
})()"#,
        ),
    )
    .await
}

async fn toc_active_left_border(page: &dyn AuditPage) -> Result<Verdict> {
    let state: Option<ElementState> = probe(
        page,
        &queries::element_state(
            "toc-active-border",
            &Locator::css(TOC_ACTIVE),
            &["borderLeftWidth", "borderLeftColor", "borderLeftStyle"],
        ),
    )
    .await?;
    Ok(match state {
        Some(s) => Verdict::new(
            s.px("borderLeftWidth").is_some_and(|w| w > 0.0) && s.style("borderLeftStyle") != "none",
            format!(
                "borderLeft={} {} {}",
                s.style("borderLeftWidth"),
                s.style("borderLeftStyle"),
                s.style("borderLeftColor")
            ),
        ),
        None => Verdict::new(false, "no active toc link"),
    })
}

async fn toc_link_hover(page: &dyn AuditPage) -> Result<Verdict> {
    let link = Locator::css(TOC_INACTIVE);
    let query = queries::element_state("toc-link", &link, &["color"]);
    let before: Option<ElementState> = probe(page, &query).await?;
    page.hover(&link).await?;
    let after: Option<ElementState> = probe(page, &query).await?;
    Ok(changed("color", before, after))
}

async fn link_hover_underline(page: &dyn AuditPage) -> Result<Verdict> {
    let link = Locator::css(BODY_LINK);
    let query = queries::element_state("body-link", &link, &["textDecorationLine"]);
    let before: Option<ElementState> = probe(page, &query).await?;
    page.hover(&link).await?;
    let after: Option<ElementState> = probe(page, &query).await?;
    let line = |s: &Option<ElementState>| s.as_ref().map(|s| s.style("textDecorationLine").to_string());
    let post = line(&after);
    Ok(Verdict::new(
        post.as_deref().is_some_and(|l| l.contains("underline")),
        format!("pre={} post={}", or_null(line(&before)), or_null(post)),
    ))
}

async fn sidebar_group_expandable(page: &dyn AuditPage) -> Result<Verdict> {
    let query = Query::new(
        "sidebar-group-toggle",
        r#"(function() {
  var el = document.querySelector('.menu__list-item-collapsible');
  if (!el) return null;
  return {
    hasCaret: !!el.querySelector('.menu__caret, .menu__link--sublist-caret, [class*="caret"]'),
    hasSublistLink: !!el.querySelector('.menu__link--sublist')
  };
})()"#,
    );
    let toggle: Option<GroupToggle> = probe(page, &query).await?;
    Ok(match toggle {
        Some(t) => Verdict::new(
            t.has_caret || t.has_sublist_link,
            format!("hasCaret={} hasSublistLink={}", t.has_caret, t.has_sublist_link),
        ),
        None => Verdict::new(false, "no collapsible group"),
    })
}

async fn pagination_title_above(page: &dyn AuditPage) -> Result<Verdict> {
    let label: Option<Rect> = probe(
        page,
        &queries::rect("pagination-label", &within_first(PAGINATION_LINK, ".pagination-nav__label")),
    )
    .await?;
    let sublabel: Option<Rect> = probe(
        page,
        &queries::rect(
            "pagination-sublabel",
            &within_first(PAGINATION_LINK, ".pagination-nav__sublabel"),
        ),
    )
    .await?;
    Ok(match (label, sublabel) {
        (Some(l), Some(s)) => Verdict::new(
            l.top < s.top,
            format!("labelTop={} sublabelTop={}", l.top, s.top),
        ),
        _ => Verdict::new(false, "elements not found"),
    })
}
