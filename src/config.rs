use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cdp::BrowserOptions;
use crate::compare::{BrandPalette, Tolerance};
use crate::viewport::{default_breakpoints, Breakpoint};
use crate::Viewport;

pub const DEFAULT_REFERENCE_URL: &str = "https://legacyllc.mintlify.app/essentials/audit-test";
pub const DEFAULT_TARGET_URL: &str = "http://172.18.0.8:3000/docs/essentials/audit-test";
pub const DEFAULT_OUTPUT_DIR: &str = "audit-shots";

pub const ENV_REFERENCE_URL: &str = "AUDIT_REFERENCE_URL";
pub const ENV_TARGET_URL: &str = "AUDIT_TARGET_URL";
pub const ENV_CDP_HOST: &str = "AUDIT_CDP_HOST";
pub const ENV_CDP_PORT: &str = "AUDIT_CDP_PORT";
pub const ENV_OUTPUT_DIR: &str = "AUDIT_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reference_url: String,
    pub target_url: String,
    pub viewport: Viewport,
    pub tolerance: Tolerance,
    pub palette: BrandPalette,
    pub browser: BrowserOptions,
    pub thresholds: Thresholds,
    pub breakpoints: Vec<Breakpoint>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_url: DEFAULT_REFERENCE_URL.to_string(),
            target_url: DEFAULT_TARGET_URL.to_string(),
            viewport: Viewport::default(),
            tolerance: Tolerance::default(),
            palette: BrandPalette::default(),
            browser: BrowserOptions::default(),
            thresholds: Thresholds::default(),
            breakpoints: default_breakpoints(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Config {
    /// `~/.config/theme-audit/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("theme-audit")
                .join("config.toml")
        })
    }

    /// Explicit path > central config > defaults. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::central_config_path() {
                Some(central) if central.exists() => Self::from_file(&central),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);
        if is_yaml {
            Ok(serde_yaml::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    /// Overlay `AUDIT_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_REFERENCE_URL) {
            self.reference_url = url;
        }
        if let Some(url) = lookup(ENV_TARGET_URL) {
            self.target_url = url;
        }
        if let Some(host) = lookup(ENV_CDP_HOST) {
            self.browser.host = host;
        }
        if let Some(port) = lookup(ENV_CDP_PORT) {
            self.browser.port = port.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_CDP_PORT} is not a port number: {port}"))
            })?;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tolerance.validate().map_err(ConfigError::Invalid)?;
        if self.reference_url.trim().is_empty() {
            return Err(ConfigError::Invalid("reference_url must not be empty".into()));
        }
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::Invalid("target_url must not be empty".into()));
        }
        url::Url::parse(&self.reference_url)
            .map_err(|e| ConfigError::Invalid(format!("reference_url: {e}")))?;
        url::Url::parse(&self.target_url)
            .map_err(|e| ConfigError::Invalid(format!("target_url: {e}")))?;
        if self.browser.port == 0 {
            return Err(ConfigError::Invalid("browser.port must be non-zero".into()));
        }
        if self.breakpoints.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one breakpoint is required".into(),
            ));
        }
        if let Some(bp) = self
            .breakpoints
            .iter()
            .find(|bp| bp.width == 0 || bp.height == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "breakpoint {} has a zero dimension",
                bp.name
            )));
        }
        Ok(())
    }
}

/// Tunable bands for the geometry and interaction checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Widths at or above this count as desktop (region sets, mobile menu check).
    pub desktop_min_width: u32,
    pub layout: LayoutThresholds,
    pub dom: DomThresholds,
    pub behavioral: BehavioralThresholds,
    pub responsive: ResponsiveThresholds,
    pub visual: VisualThresholds,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            desktop_min_width: 997,
            layout: LayoutThresholds::default(),
            dom: DomThresholds::default(),
            behavioral: BehavioralThresholds::default(),
            responsive: ResponsiveThresholds::default(),
            visual: VisualThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutThresholds {
    pub sidebar_width: f64,
    pub panel_edge: f64,
    pub content_width: f64,
    pub content_offset: f64,
    pub toc_width: f64,
    pub content_toc_gap: f64,
    pub navbar_height: f64,
    pub heading_offset: f64,
}

impl Default for LayoutThresholds {
    fn default() -> Self {
        Self {
            sidebar_width: 2.0,
            panel_edge: 4.0,
            content_width: 2.0,
            content_offset: 8.0,
            toc_width: 10.0,
            content_toc_gap: 10.0,
            navbar_height: 2.0,
            heading_offset: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomThresholds {
    pub table_ratio_band: f64,
    pub text_channel: f64,
    pub line_height: f64,
    pub overlap_slack: f64,
    pub ordering_slack: f64,
    pub horizontal_scroll_slack: f64,
    pub admonition_min_gap: f64,
}

impl Default for DomThresholds {
    fn default() -> Self {
        Self {
            table_ratio_band: 0.15,
            text_channel: 10.0,
            line_height: 4.0,
            overlap_slack: 2.0,
            ordering_slack: 5.0,
            horizontal_scroll_slack: 2.0,
            admonition_min_gap: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralThresholds {
    pub panel_radius: f64,
    pub hover_opacity: f64,
    pub min_panel_padding: f64,
    pub min_navbar_z_index: i64,
    pub min_table_ratio: f64,
    pub anchor_scroll_delta: f64,
    #[serde(with = "humantime_serde")]
    pub anchor_scroll_wait: Duration,
    pub toc_probe_offset: f64,
    pub navbar_probe_offset: f64,
}

impl Default for BehavioralThresholds {
    fn default() -> Self {
        Self {
            panel_radius: 16.0,
            hover_opacity: 0.5,
            min_panel_padding: 8.0,
            min_navbar_z_index: 10,
            min_table_ratio: 0.5,
            anchor_scroll_delta: 10.0,
            anchor_scroll_wait: Duration::from_millis(500),
            toc_probe_offset: 800.0,
            navbar_probe_offset: 500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveThresholds {
    pub panel_radius: f64,
    pub min_content_width: f64,
    pub overflow_slack: f64,
    pub visibility_slack: f64,
    /// Reference overlays are only dismissed at or above this width.
    pub overlay_min_width: u32,
}

impl Default for ResponsiveThresholds {
    fn default() -> Self {
        Self {
            panel_radius: 2.0,
            min_content_width: 200.0,
            overflow_slack: 5.0,
            visibility_slack: 10.0,
            overlay_min_width: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualThresholds {
    pub color_channel: f64,
    pub alpha: f64,
    pub transparent_alpha: f64,
    pub spacing: f64,
    /// CIE L* below this is "dark".
    pub dark_lightness: f32,
    /// CIE L* above this is "light".
    pub light_lightness: f32,
}

impl Default for VisualThresholds {
    fn default() -> Self {
        Self {
            color_channel: 15.0,
            alpha: 0.1,
            transparent_alpha: 0.05,
            spacing: 10.0,
            dark_lightness: 40.0,
            light_lightness: 60.0,
        }
    }
}
