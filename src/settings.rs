use std::path::{Path, PathBuf};

use theme_audit_lib::{AuditError, Config, Tolerance, Viewport};

use crate::cli::SiteArgs;

/// Tracks which CLI flags were explicitly provided vs. defaulted.
#[derive(Debug, Default)]
pub struct AuditFlagSources {
    pub viewport: bool,
    pub tolerance_px: bool,
    pub tolerance_color: bool,
    pub tolerance_alpha: bool,
}

impl AuditFlagSources {
    pub fn from_args(args: &[String]) -> Self {
        Self {
            viewport: flag_present(args, "--viewport"),
            tolerance_px: flag_present(args, "--tolerance-px"),
            tolerance_color: flag_present(args, "--tolerance-color"),
            tolerance_alpha: flag_present(args, "--tolerance-alpha"),
        }
    }
}

/// Checks if a flag was present in the command-line arguments.
pub fn flag_present(args: &[String], flag: &str) -> bool {
    args.iter()
        .any(|arg| arg == flag || arg.starts_with(&format!("{flag}=")))
}

/// Config file (explicit path, else central config, else defaults) with the
/// `AUDIT_*` environment laid over it. Not validated yet: CLI flags still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, AuditError> {
    let mut cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        AuditError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;
    cfg.apply_env()
        .map_err(|e| AuditError::Config(format!("Invalid environment: {e}")))?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config, path: Option<&Path>) -> Result<(), AuditError> {
    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        AuditError::Config(prefix)
    })
}

/// Flags given on the command line win over the environment and the file.
pub fn apply_site_args(cfg: &mut Config, sites: &SiteArgs) {
    if let Some(url) = &sites.reference_url {
        cfg.reference_url = url.clone();
    }
    if let Some(url) = &sites.target_url {
        cfg.target_url = url.clone();
    }
    if let Some(host) = &sites.cdp_host {
        cfg.browser.host = host.clone();
    }
    if let Some(port) = sites.cdp_port {
        cfg.browser.port = port;
    }
}

pub fn apply_out_dir(cfg: &mut Config, out_dir: Option<PathBuf>) {
    if let Some(dir) = out_dir {
        cfg.output_dir = dir;
    }
}

/// Merge defaulted CLI values with config, preferring CLI only when the flag was typed.
pub fn resolve_audit_settings(
    cfg: &mut Config,
    cli_viewport: Viewport,
    cli_tolerance: Tolerance,
    flags: &AuditFlagSources,
) {
    if flags.viewport {
        cfg.viewport = cli_viewport;
    }
    if flags.tolerance_px {
        cfg.tolerance.px = cli_tolerance.px;
    }
    if flags.tolerance_color {
        cfg.tolerance.color = cli_tolerance.color;
    }
    if flags.tolerance_alpha {
        cfg.tolerance.alpha = cli_tolerance.alpha;
    }
}

/// Format effective config as a single-line string.
pub fn format_effective_config(cfg: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let breakpoints: Vec<&str> = cfg.breakpoints.iter().map(|b| b.name.as_str()).collect();
    format!(
        "Effective config [{source}]: reference={}, target={}, cdp={}, viewport={}x{}, tolerance: px={}, color={}, alpha={}, breakpoints=[{}], out={}",
        cfg.reference_url,
        cfg.target_url,
        cfg.browser.endpoint(),
        cfg.viewport.width,
        cfg.viewport.height,
        cfg.tolerance.px,
        cfg.tolerance.color,
        cfg.tolerance.alpha,
        breakpoints.join(","),
        cfg.output_dir.display()
    )
}
