use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{open_side, shoot, write_artifact, BreakpointFailure, ScrollPosition};
use crate::config::Config;
use crate::error::Result;
use crate::page::{close, PageOpener};
use crate::site::{Side, SiteProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedShot {
    pub side: Side,
    pub breakpoint: String,
    pub scroll: ScrollPosition,
    pub path: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Default)]
pub struct CaptureRun {
    pub shots: Vec<CapturedShot>,
    pub failures: Vec<BreakpointFailure>,
}

/// Saves top, middle and bottom screenshots of both sites at every breakpoint
/// for manual side-by-side review.
pub async fn run_capture(opener: &dyn PageOpener, config: &Config, out_dir: &Path) -> Result<CaptureRun> {
    let mut run = CaptureRun::default();
    for bp in &config.breakpoints {
        info!(breakpoint = %bp.name, "capturing");
        let label = bp.file_label();
        for side in [Side::Reference, Side::Target] {
            let outcome = async {
                let page = open_side(opener, config, side, bp).await?;
                let shots = shoot(&*page, &SiteProfile::for_side(side), &[], config).await;
                close(&*page).await;
                shots
            }
            .await;

            match outcome {
                Ok(shots) => {
                    for shot in shots {
                        let name = format!("{}-{label}-{}.png", side.file_tag(), shot.position);
                        let path = write_artifact(out_dir, &name, &shot.png)?;
                        run.shots.push(CapturedShot {
                            side,
                            breakpoint: label.clone(),
                            scroll: shot.position,
                            path,
                            bytes: shot.png.len(),
                        });
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(breakpoint = %bp.name, %side, error = %e, "capture failed");
                    run.failures.push(BreakpointFailure {
                        breakpoint: label.clone(),
                        message: format!("{side}: {e}"),
                    });
                }
            }
        }
    }
    Ok(run)
}
