//! In-memory pages for exercising suites without a browser.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::page::{AuditPage, PageOpener};
use crate::queries::Query;
use crate::Viewport;

pub type ActionLog = Arc<Mutex<Vec<String>>>;

/// Answers queries by name. Queued answers are consumed in order and the last
/// one keeps repeating; unknown names evaluate to `null`.
pub struct ScriptedPage {
    viewport: Viewport,
    responses: Mutex<HashMap<String, VecDeque<Value>>>,
    failing: HashSet<String>,
    missing: HashSet<String>,
    screenshot: Option<Vec<u8>>,
    log: ActionLog,
}

impl ScriptedPage {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            responses: Mutex::default(),
            failing: HashSet::new(),
            missing: HashSet::new(),
            screenshot: None,
            log: ActionLog::default(),
        }
    }

    pub fn desktop() -> Self {
        Self::new(Viewport::default())
    }

    pub fn respond(self, name: &str, value: Value) -> Self {
        self.responses
            .lock()
            .expect("responses lock")
            .entry(name.to_string())
            .or_default()
            .push_back(value);
        self
    }

    /// Makes the named query throw inside the page.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Makes hover/click report the element (by display form) as absent.
    pub fn without(mut self, locator: &Locator) -> Self {
        self.missing.insert(locator.to_string());
        self
    }

    pub fn with_screenshot(mut self, png: Vec<u8>) -> Self {
        self.screenshot = Some(png);
        self
    }

    pub fn log(&self) -> ActionLog {
        Arc::clone(&self.log)
    }

    fn record(&self, action: String) {
        self.log.lock().expect("log lock").push(action);
    }
}

pub fn actions(log: &ActionLog) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

#[async_trait]
impl AuditPage for ScriptedPage {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn evaluate(&self, _expression: &str) -> Result<Value> {
        self.record("evaluate".to_string());
        Ok(Value::Null)
    }

    async fn query(&self, query: &Query) -> Result<Value> {
        self.record(format!("query {}", query.name));
        if self.failing.contains(&query.name) {
            return Err(AuditError::evaluation(format!(
                "TypeError: {} exploded",
                query.name
            )));
        }
        let mut responses = self.responses.lock().expect("responses lock");
        let Some(queue) = responses.get_mut(&query.name) else {
            return Ok(Value::Null);
        };
        let value = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(value.unwrap_or(Value::Null))
    }

    async fn hover(&self, target: &Locator) -> Result<bool> {
        self.record(format!("hover {target}"));
        Ok(!self.missing.contains(&target.to_string()))
    }

    async fn click(&self, target: &Locator) -> Result<bool> {
        self.record(format!("click {target}"));
        Ok(!self.missing.contains(&target.to_string()))
    }

    async fn scroll_to(&self, container: &Locator, top: f64) -> Result<()> {
        self.record(format!("scroll {container} {top}"));
        Ok(())
    }

    async fn release_pointer(&self) -> Result<()> {
        self.record("release".to_string());
        Ok(())
    }

    async fn reload(&self, _wait: Duration) -> Result<()> {
        self.record("reload".to_string());
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.record("screenshot".to_string());
        self.screenshot
            .clone()
            .ok_or(AuditError::ScreenshotTimeout(Duration::from_secs(30)))
    }

    async fn pause(&self, duration: Duration) {
        self.record(format!("pause {}ms", duration.as_millis()));
    }

    async fn destroy(&self) -> Result<()> {
        self.record("destroy".to_string());
        Ok(())
    }
}

/// Hands out prepared pages (or errors) in the order they are requested.
#[derive(Default)]
pub struct ScriptedOpener {
    pages: Mutex<VecDeque<Result<ScriptedPage>>>,
    opened: Mutex<Vec<(String, Viewport)>>,
}

impl ScriptedOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, page: ScriptedPage) -> Self {
        self.pages.lock().expect("pages lock").push_back(Ok(page));
        self
    }

    pub fn then_fail(self, err: AuditError) -> Self {
        self.pages.lock().expect("pages lock").push_back(Err(err));
        self
    }

    pub fn opened(&self) -> Vec<(String, Viewport)> {
        self.opened.lock().expect("opened lock").clone()
    }
}

#[async_trait]
impl PageOpener for ScriptedOpener {
    async fn open(&self, url: &str, viewport: Viewport) -> Result<Box<dyn AuditPage>> {
        self.opened
            .lock()
            .expect("opened lock")
            .push((url.to_string(), viewport));
        let next = self.pages.lock().expect("pages lock").pop_front();
        match next {
            Some(Ok(page)) => Ok(Box::new(page)),
            Some(Err(e)) => Err(e),
            None => Ok(Box::new(ScriptedPage::new(viewport))),
        }
    }
}
