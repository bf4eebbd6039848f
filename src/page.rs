//! The page abstraction every suite runs against.
//!
//! [`crate::cdp::RemoteSession`] drives a real browser tab; tests substitute a
//! scripted page so suites can be exercised without one.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::queries::Query;
use crate::Viewport;

/// A `getBoundingClientRect()` result in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Snaps every edge to whole pixels for cropping screenshots.
    pub fn rounded(&self) -> Self {
        Self::new(
            self.left.round(),
            self.top.round(),
            self.width.round(),
            self.height.round(),
        )
    }
}

/// Whether the navigation that opened a page observed its load event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadState {
    Loaded,
    TimedOut,
}

#[async_trait]
pub trait AuditPage: Send + Sync {
    fn viewport(&self) -> Viewport;

    /// Evaluates `expression` and returns its JSON value (`null` for undefined).
    async fn evaluate(&self, expression: &str) -> Result<Value>;

    async fn query(&self, query: &Query) -> Result<Value> {
        self.evaluate(&query.script).await
    }

    /// Moves the pointer over the element's center. `false` when it is absent.
    async fn hover(&self, target: &Locator) -> Result<bool>;

    async fn click(&self, target: &Locator) -> Result<bool>;

    /// Sets `scrollTop` on the located scroll container.
    async fn scroll_to(&self, container: &Locator, top: f64) -> Result<()>;

    /// Parks the pointer in the top-left corner so no hover state lingers.
    async fn release_pointer(&self) -> Result<()>;

    async fn reload(&self, wait: Duration) -> Result<()>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    async fn pause(&self, duration: Duration);

    async fn destroy(&self) -> Result<()>;
}

#[async_trait]
pub trait PageOpener: Send + Sync {
    async fn open(&self, url: &str, viewport: Viewport) -> Result<Box<dyn AuditPage>>;
}

/// Runs `query` and decodes its value; `null` means the element was not found.
pub async fn probe<T: DeserializeOwned>(page: &dyn AuditPage, query: &Query) -> Result<Option<T>> {
    let value = page.query(query).await?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| AuditError::evaluation(format!("{}: unexpected result shape: {e}", query.name)))
}

/// Destroys the page, logging instead of failing when the browser refuses.
pub async fn close(page: &dyn AuditPage) {
    if let Err(e) = page.destroy().await {
        warn!(error = %e, "could not close page");
    }
}
