//! Viewport screenshots of both sites and exact pixel diffs between them.
//!
//! Sessions are opened one at a time per breakpoint: the reference is scrolled
//! through every [`ScrollPosition`], its regions measured and captured, then
//! closed before the target goes through the same steps.

pub mod capture;
pub mod differ;
pub mod pixel;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::locator::Locator;
use crate::page::{close, probe, AuditPage, PageOpener, Rect};
use crate::queries;
use crate::site::{Side, SiteProfile};
use crate::viewport::Breakpoint;

pub use capture::{run_capture, CapturedShot};
pub use differ::{run_diff, RegionDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollPosition {
    Top,
    Mid,
    Bottom,
}

impl ScrollPosition {
    pub const ALL: [ScrollPosition; 3] = [ScrollPosition::Top, ScrollPosition::Mid, ScrollPosition::Bottom];

    /// Fraction of the scroll container's `scrollHeight`.
    pub fn fraction(self) -> f64 {
        match self {
            ScrollPosition::Top => 0.0,
            ScrollPosition::Mid => 0.5,
            ScrollPosition::Bottom => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScrollPosition::Top => "top",
            ScrollPosition::Mid => "mid",
            ScrollPosition::Bottom => "bottom",
        }
    }
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A screen area cropped out of both screenshots and diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Navbar,
    Sidebar,
    Panel,
    Toc,
    Content,
}

impl Region {
    pub fn for_width(width: u32, desktop_min_width: u32) -> &'static [Region] {
        if width >= desktop_min_width {
            &[Region::Navbar, Region::Sidebar, Region::Panel, Region::Toc]
        } else {
            &[Region::Navbar, Region::Content]
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Navbar => "navbar",
            Region::Sidebar => "sidebar",
            Region::Panel => "panel",
            Region::Toc => "toc",
            Region::Content => "content",
        }
    }

    fn locator(self, site: &SiteProfile) -> &Locator {
        match self {
            Region::Navbar => &site.navbar,
            Region::Sidebar => &site.sidebar,
            Region::Panel => &site.panel,
            Region::Toc => &site.toc,
            Region::Content => &site.narrow_content,
        }
    }
}

/// A breakpoint that could not be completed; the remaining work for it was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointFailure {
    pub breakpoint: String,
    pub message: String,
}

/// One captured viewport plus the region rects measured just before it.
pub(crate) struct Shot {
    pub position: ScrollPosition,
    pub png: Vec<u8>,
    pub rects: Vec<Option<Rect>>,
}

/// Opens `side` at the breakpoint, closing the reference overlay on desktop widths.
pub(crate) async fn open_side(
    opener: &dyn PageOpener,
    config: &Config,
    side: Side,
    bp: &Breakpoint,
) -> Result<Box<dyn AuditPage>> {
    let url = match side {
        Side::Reference => &config.reference_url,
        Side::Target => &config.target_url,
    };
    let page = opener.open(url, bp.viewport()).await?;
    if bp.width >= config.thresholds.desktop_min_width {
        if let Err(e) = SiteProfile::for_side(side)
            .dismiss_overlay(&*page, config.browser.overlay_settle)
            .await
        {
            close(&*page).await;
            return Err(e);
        }
    }
    Ok(page)
}

/// Scrolls through every position, measuring `regions` and capturing at each.
pub(crate) async fn shoot(
    page: &dyn AuditPage,
    site: &SiteProfile,
    regions: &[Region],
    config: &Config,
) -> Result<Vec<Shot>> {
    let mut shots = Vec::with_capacity(ScrollPosition::ALL.len());
    for position in ScrollPosition::ALL {
        page.query(&queries::scroll_to_fraction(
            position.label(),
            &site.panel,
            position.fraction(),
        ))
        .await?;
        page.pause(config.browser.scroll_settle).await;

        let mut rects = Vec::with_capacity(regions.len());
        for region in regions {
            let rect: Option<Rect> =
                probe(page, &queries::rect(region.name(), region.locator(site))).await?;
            rects.push(rect.map(|r| r.rounded()).filter(|r| !r.is_empty()));
        }
        let png = page.screenshot().await?;
        debug!(side = %site.side, scroll = %position, bytes = png.len(), "captured viewport");
        shots.push(Shot {
            position,
            png,
            rects,
        });
    }
    Ok(shots)
}

pub(crate) fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}
