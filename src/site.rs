//! Landmark locators for the two sites being compared.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::locator::Locator;
use crate::page::AuditPage;
use crate::queries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Reference,
    Target,
}

impl Side {
    /// Short tag used in artifact file names.
    pub fn file_tag(self) -> &'static str {
        match self {
            Side::Reference => "ref",
            Side::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reference => write!(f, "reference"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Where each structural landmark lives on one site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub side: Side,
    pub navbar: Locator,
    pub sidebar: Locator,
    /// The rounded content card; also the main scroll container.
    pub panel: Locator,
    pub article: Locator,
    pub toc: Locator,
    /// Main column used as the "content" region on narrow viewports.
    pub narrow_content: Locator,
    pub h1: Locator,
    pub h2: Locator,
    pub h3: Locator,
    pub body_text: Locator,
    pub breadcrumbs: Locator,
    pub page_background: Locator,
    /// Whether an assistant overlay has to be closed before measuring.
    pub dismiss_overlay: bool,
}

impl SiteProfile {
    pub fn reference() -> Self {
        Self {
            side: Side::Reference,
            navbar: Locator::css("#navbar"),
            sidebar: Locator::css("#sidebar-content"),
            panel: Locator::css("#content-container"),
            article: Locator::css("#content-area"),
            toc: Locator::css("#table-of-contents"),
            narrow_content: Locator::css("#content-container"),
            h1: Locator::css("#header h1"),
            h2: Locator::css("#content h2"),
            h3: Locator::css("#content h3"),
            body_text: Locator::script(
                "(function() { var s = document.querySelectorAll('#content > span'); \
                 for (var i = 0; i < s.length; i++) if (s[i].textContent.trim().length > 20) return s[i]; \
                 return null; })()",
            ),
            breadcrumbs: Locator::css(
                "nav[aria-label=\"breadcrumb\"], .breadcrumbs, [class*=\"breadcrumb\"]",
            ),
            page_background: Locator::script("document.elementFromPoint(10, 400)"),
            dismiss_overlay: true,
        }
    }

    pub fn target() -> Self {
        Self {
            side: Side::Target,
            navbar: Locator::css(".navbar"),
            sidebar: Locator::css(".theme-doc-sidebar-container"),
            panel: Locator::css(".mintysaurus-panel"),
            article: Locator::css(".mintysaurus-article"),
            toc: Locator::css(".mintysaurus-toc"),
            narrow_content: Locator::css("article"),
            h1: Locator::css(".theme-doc-markdown h1"),
            h2: Locator::css(".theme-doc-markdown h2"),
            h3: Locator::css(".theme-doc-markdown h3"),
            body_text: Locator::css(
                ".theme-doc-markdown p:not(.mintlify-eyebrow):not(.mintlify-description)",
            ),
            breadcrumbs: Locator::css(".theme-doc-breadcrumbs, nav[aria-label=\"Breadcrumbs\"]"),
            page_background: Locator::script("document.elementFromPoint(10, 400)"),
            dismiss_overlay: false,
        }
    }

    pub fn for_side(side: Side) -> Self {
        match side {
            Side::Reference => Self::reference(),
            Side::Target => Self::target(),
        }
    }

    /// Closes the site's floating overlay, if it has one, and waits for the
    /// page to reflow.
    pub async fn dismiss_overlay(&self, page: &dyn AuditPage, settle: Duration) -> Result<()> {
        if !self.dismiss_overlay {
            return Ok(());
        }
        let closed = page.query(&queries::dismiss_overlay()).await?;
        debug!(side = %self.side, closed = %closed, "overlay dismissal");
        page.pause(settle).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{actions, ScriptedPage};

    #[test]
    fn only_the_reference_needs_overlay_dismissal() {
        assert!(SiteProfile::reference().dismiss_overlay);
        assert!(!SiteProfile::target().dismiss_overlay);
    }

    #[test]
    fn side_tags() {
        assert_eq!(Side::Reference.file_tag(), "ref");
        assert_eq!(Side::Target.to_string(), "target");
        assert_eq!(SiteProfile::for_side(Side::Target).side, Side::Target);
    }

    #[tokio::test]
    async fn overlay_dismissal_only_touches_the_reference() {
        let page = ScriptedPage::desktop();
        let log = page.log();
        let settle = Duration::from_millis(1500);
        SiteProfile::target().dismiss_overlay(&page, settle).await.expect("target");
        assert!(actions(&log).is_empty());
        SiteProfile::reference().dismiss_overlay(&page, settle).await.expect("reference");
        assert_eq!(actions(&log), vec!["query dismiss-overlay", "pause 1500ms"]);
    }
}
