use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pixel::{decode_png, diff_regions, encode_png};
use super::{open_side, shoot, write_artifact, BreakpointFailure, Region, ScrollPosition, Shot};
use crate::config::Config;
use crate::error::Result;
use crate::page::{close, PageOpener, Rect};
use crate::site::{Side, SiteProfile};
use crate::viewport::Breakpoint;

const FULL_PAGE: &str = "full-page";

/// Pixel difference of one region at one scroll position. `diff_percent` is
/// absent when there was nothing to compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDiff {
    pub breakpoint: String,
    pub scroll: ScrollPosition,
    pub region: String,
    pub diff_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_pixels: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pixels: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_rect: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_rect: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RegionDiff {
    fn unmeasured(bp: &str, scroll: ScrollPosition, region: &str, percent: Option<f64>, detail: &str) -> Self {
        Self {
            breakpoint: bp.to_string(),
            scroll,
            region: region.to_string(),
            diff_percent: percent,
            diff_pixels: None,
            total_pixels: None,
            size: None,
            reference_rect: None,
            target_rect: None,
            detail: Some(detail.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct DiffRun {
    pub regions: Vec<RegionDiff>,
    pub failures: Vec<BreakpointFailure>,
}

/// Captures both sites at every breakpoint and scroll position and diffs each
/// region. Only connection errors abort; anything else skips the breakpoint.
///
/// Counts and diff images follow the browser canvas rule: a pixel differing in
/// any RGB channel is drawn red at `min(255, delta * 3)`, and a matching pixel
/// is the target's color dimmed to 0.3.
pub async fn run_diff(opener: &dyn PageOpener, config: &Config, out_dir: &Path) -> Result<DiffRun> {
    let removed = remove_stale(out_dir)?;
    if removed > 0 {
        debug!(removed, dir = %out_dir.display(), "removed stale diff artifacts");
    }

    let mut run = DiffRun::default();
    for bp in &config.breakpoints {
        info!(breakpoint = %bp.name, "screenshot diff");
        match diff_breakpoint(opener, config, bp, out_dir).await {
            Ok(regions) => run.regions.extend(regions),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(breakpoint = %bp.name, error = %e, "skipping breakpoint");
                run.failures.push(BreakpointFailure {
                    breakpoint: bp.file_label(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(run)
}

async fn diff_breakpoint(
    opener: &dyn PageOpener,
    config: &Config,
    bp: &Breakpoint,
    out_dir: &Path,
) -> Result<Vec<RegionDiff>> {
    let regions = Region::for_width(bp.width, config.thresholds.desktop_min_width);
    let label = bp.file_label();

    let mut captured = Vec::with_capacity(2);
    for side in [Side::Reference, Side::Target] {
        let page = open_side(opener, config, side, bp).await?;
        let shots = shoot(&*page, &SiteProfile::for_side(side), regions, config).await;
        close(&*page).await;
        let shots = shots?;
        for shot in &shots {
            let name = format!("{}-{label}-{}.png", side.file_tag(), shot.position);
            write_artifact(out_dir, &name, &shot.png)?;
        }
        captured.push(shots);
    }
    let target_shots = captured.pop().unwrap_or_default();
    let reference_shots = captured.pop().unwrap_or_default();

    let mut results = Vec::new();
    for (a, d) in reference_shots.iter().zip(&target_shots) {
        results.extend(diff_position(bp, regions, a, d, out_dir)?);
    }
    Ok(results)
}

fn diff_position(
    bp: &Breakpoint,
    regions: &[Region],
    reference: &Shot,
    target: &Shot,
    out_dir: &Path,
) -> Result<Vec<RegionDiff>> {
    let label = bp.file_label();
    let scroll = reference.position;
    let a_img = decode_png(&reference.png)?;
    let d_img = decode_png(&target.png)?;

    let mut results = Vec::with_capacity(regions.len() + 1);
    for (i, region) in regions.iter().enumerate() {
        let name = region.name();
        let a_rect = reference.rects.get(i).copied().flatten();
        let d_rect = target.rects.get(i).copied().flatten();
        let (a_rect, d_rect) = match (a_rect, d_rect) {
            (None, None) => {
                results.push(RegionDiff::unmeasured(&label, scroll, name, None, "Both missing"));
                continue;
            }
            (None, Some(_)) => {
                results.push(RegionDiff::unmeasured(
                    &label,
                    scroll,
                    name,
                    None,
                    "Reference element not found",
                ));
                continue;
            }
            (Some(_), None) => {
                results.push(RegionDiff::unmeasured(
                    &label,
                    scroll,
                    name,
                    Some(100.0),
                    "Target element missing",
                ));
                continue;
            }
            (Some(a), Some(d)) => (a, d),
        };

        let Some((diff, a_crop, d_crop)) = diff_regions(&a_img, &d_img, &a_rect, &d_rect) else {
            results.push(RegionDiff::unmeasured(&label, scroll, name, None, "zero region"));
            continue;
        };
        for (side, crop) in [(Side::Reference, &a_crop), (Side::Target, &d_crop)] {
            let file = format!("crop-{}-{label}-{name}-{scroll}.png", side.file_tag());
            write_artifact(out_dir, &file, &encode_png(crop)?)?;
        }
        write_artifact(
            out_dir,
            &format!("diff-{label}-{name}-{scroll}.png"),
            &encode_png(&diff.image)?,
        )?;
        results.push(RegionDiff {
            breakpoint: label.clone(),
            scroll,
            region: name.to_string(),
            diff_percent: Some(diff.diff_percent),
            diff_pixels: Some(diff.diff_pixels),
            total_pixels: Some(diff.total_pixels),
            size: Some(diff.size()),
            reference_rect: Some(a_rect),
            target_rect: Some(d_rect),
            detail: None,
        });
    }

    let viewport = Rect::new(0.0, 0.0, f64::from(bp.width), f64::from(bp.height));
    if let Some((diff, _, _)) = diff_regions(&a_img, &d_img, &viewport, &viewport) {
        write_artifact(
            out_dir,
            &format!("diff-{label}-fullpage-{scroll}.png"),
            &encode_png(&diff.image)?,
        )?;
        results.push(RegionDiff {
            breakpoint: label.clone(),
            scroll,
            region: FULL_PAGE.to_string(),
            diff_percent: Some(diff.diff_percent),
            diff_pixels: Some(diff.diff_pixels),
            total_pixels: Some(diff.total_pixels),
            size: Some(diff.size()),
            reference_rect: None,
            target_rect: None,
            detail: None,
        });
    }
    Ok(results)
}

/// Deletes `diff-*.png` and `crop-*.png` left over from an earlier run.
fn remove_stale(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let stale = (name.starts_with("diff-") || name.starts_with("crop-")) && name.ends_with(".png");
        if stale && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use crate::test_support::{actions, ScriptedOpener, ScriptedPage};
    use crate::Viewport;
    use image::{Rgba, RgbaImage};
    use serde_json::json;

    fn config(breakpoints: Vec<Breakpoint>) -> Config {
        Config {
            breakpoints,
            ..Config::default()
        }
    }

    fn png(img: &RgbaImage) -> Vec<u8> {
        encode_png(img).expect("encode")
    }

    fn page(screenshot: Vec<u8>, with_content: bool) -> ScriptedPage {
        let page = ScriptedPage::new(Viewport {
            width: 40,
            height: 30,
        })
        .with_screenshot(screenshot)
        .respond("rect:navbar", json!({"left": 0, "top": 0, "width": 40, "height": 10}));
        if with_content {
            page.respond("rect:content", json!({"left": 0, "top": 10, "width": 40, "height": 20}))
        } else {
            page
        }
    }

    #[tokio::test]
    async fn diffs_every_region_and_writes_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("diff-old.png"), b"stale").expect("seed");
        fs::write(dir.path().join("notes.txt"), b"keep").expect("seed");

        let base = RgbaImage::from_pixel(40, 30, Rgba([200, 200, 200, 255]));
        let mut changed = base.clone();
        changed.put_pixel(1, 1, Rgba([0, 0, 0, 255]));

        let reference = page(png(&base), true);
        let reference_log = reference.log();
        let opener = ScriptedOpener::new()
            .then(reference)
            .then(page(png(&changed), false));

        let cfg = config(vec![Breakpoint::new("tiny", 40, 30)]);
        let run = run_diff(&opener, &cfg, dir.path()).await.expect("diff");

        assert!(run.failures.is_empty());
        assert_eq!(run.regions.len(), 9);
        let top: Vec<_> = run
            .regions
            .iter()
            .filter(|r| r.scroll == ScrollPosition::Top)
            .collect();
        assert_eq!(top[0].region, "navbar");
        assert_eq!(top[0].diff_percent, Some(0.25));
        assert_eq!(top[0].size.as_deref(), Some("40x10"));
        assert_eq!(top[1].region, "content");
        assert_eq!(top[1].diff_percent, Some(100.0));
        assert_eq!(top[1].detail.as_deref(), Some("Target element missing"));
        assert_eq!(top[2].region, "full-page");
        assert_eq!(top[2].diff_percent, Some(0.08));

        for name in [
            "ref-40-top.png",
            "target-40-bottom.png",
            "crop-ref-40-navbar-mid.png",
            "crop-target-40-navbar-mid.png",
            "diff-40-navbar-top.png",
            "diff-40-fullpage-bottom.png",
        ] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
        assert!(!dir.path().join("diff-old.png").exists());
        assert!(dir.path().join("notes.txt").exists());

        let log = actions(&reference_log);
        assert_eq!(log[0], "query scroll-fraction:top");
        assert_eq!(log[1], "pause 500ms");
        assert_eq!(log.last().map(String::as_str), Some("destroy"));
        assert_eq!(opener.opened().len(), 2);
    }

    #[tokio::test]
    async fn capture_failures_skip_the_breakpoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let reference = ScriptedPage::desktop();
        let log = reference.log();
        let opener = ScriptedOpener::new().then(reference);
        let cfg = config(vec![
            Breakpoint::new("tiny", 40, 30),
            Breakpoint::new("small", 50, 30),
        ]);

        let run = run_diff(&opener, &cfg, dir.path()).await.expect("diff");
        assert!(run.regions.is_empty());
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.failures[0].breakpoint, "40");
        assert!(run.failures[0].message.contains("timed out"));
        assert_eq!(opener.opened().len(), 2);
        assert_eq!(actions(&log).last().map(String::as_str), Some("destroy"));
    }

    #[tokio::test]
    async fn connection_errors_abort() {
        let dir = tempfile::tempdir().expect("tempdir");
        let opener = ScriptedOpener::new().then_fail(AuditError::connection("refused"));
        let cfg = config(vec![Breakpoint::new("tiny", 40, 30)]);
        let err = run_diff(&opener, &cfg, dir.path()).await.expect_err("fatal");
        assert!(err.is_fatal());
    }
}
