//! Theme Audit Library
//!
//! Compares a hosted reference documentation site against a themed target
//! site through a remote Chromium, reporting computed-style, behavioral,
//! layout, DOM, responsive and visual differences plus exact pixel diffs.
//!
//! # Module Overview
//!
//! - [`cdp`] - Raw DevTools Protocol client (discovery, websocket, sessions)
//! - [`page`] - The page abstraction every suite runs against
//! - [`style`] - Computed-style extraction and normalization
//! - [`compare`] - Tolerance-based value comparison
//! - [`registry`] - The catalogue of elements compared property by property
//! - [`suites`] - Category test runners
//! - [`screenshot`] - Screenshot capture and pixel diffs
//! - [`audit`] - Orchestrates a full run into an [`output::AuditReport`]
//! - [`config`] - Configuration file and environment support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use theme_audit_lib::audit::{run_audit, AuditOptions};
//! use theme_audit_lib::{Config, RemoteBrowser};
//!
//! # async fn example() -> theme_audit_lib::Result<()> {
//! let config = Config::default();
//! let browser = RemoteBrowser::new(config.browser.clone())?;
//! let report = run_audit(&browser, &config, &AuditOptions::default()).await?;
//! println!("{} of {} checks pass", report.summary.overall.pass, report.summary.overall.total);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod cdp;
pub mod compare;
pub mod config;
pub mod error;
pub mod locator;
pub mod output;
pub mod page;
pub mod queries;
pub mod registry;
pub mod screenshot;
pub mod site;
pub mod style;
pub mod suites;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use audit::{run_audit, AuditOptions};
pub use cdp::{BrowserOptions, RemoteBrowser, RemoteSession};
pub use compare::{BrandPalette, Tolerance};
pub use config::Config;
pub use error::{AuditError, ErrorCategory, ErrorPayload, Result};
pub use output::{
    AuditOutput, AuditReport, CaptureReport, DiffReport, ErrorOutput, Summary, AUDIT_OUTPUT_VERSION,
};
pub use page::{AuditPage, PageOpener};
pub use screenshot::{run_capture, run_diff};
pub use suites::{Category, CssStatus, TestResult};
pub use viewport::{Breakpoint, Viewport};
