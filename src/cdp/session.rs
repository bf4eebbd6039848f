//! Target discovery and the per-tab session used by every suite.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::connection::CdpConnection;
use super::protocol::{CreateTargetResult, EvaluateResult, ScreenshotResult, TargetInfo, VersionInfo};
use crate::error::{AuditError, Result};
use crate::locator::Locator;
use crate::page::{probe, AuditPage, LoadState, PageOpener};
use crate::queries::{self, Point};
use crate::Viewport;

pub const DEFAULT_CDP_HOST: &str = "172.18.0.9";
pub const DEFAULT_CDP_PORT: u16 = 9223;
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RELOAD_WAIT: Duration = Duration::from_secs(5);

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub screenshot_timeout: Duration,
    /// Post-load settle for pages served from this machine or the local network.
    #[serde(with = "humantime_serde")]
    pub local_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub remote_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub hover_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub click_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub scroll_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub overlay_settle: Duration,
    #[serde(with = "humantime_serde")]
    pub reload_wait: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_CDP_HOST.to_string(),
            port: DEFAULT_CDP_PORT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            screenshot_timeout: DEFAULT_SCREENSHOT_TIMEOUT,
            local_settle: Duration::from_millis(1000),
            remote_settle: Duration::from_millis(2000),
            hover_settle: Duration::from_millis(300),
            click_settle: Duration::from_millis(300),
            scroll_settle: Duration::from_millis(500),
            overlay_settle: Duration::from_millis(1500),
            reload_wait: DEFAULT_RELOAD_WAIT,
        }
    }
}

impl BrowserOptions {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Settle time after the load event for `url`.
    pub fn settle_for(&self, url: &str) -> Duration {
        if is_local(url) {
            self.local_settle
        } else {
            self.remote_settle
        }
    }
}

/// Hosts on this machine or a private network load fast enough for the short settle.
pub fn is_local(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    match parsed.host() {
        Some(url::Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback() || ip.is_private(),
        Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// A Chromium instance reachable through its remote-debugging port.
#[derive(Debug, Clone)]
pub struct RemoteBrowser {
    options: BrowserOptions,
    http: reqwest::Client,
}

impl RemoteBrowser {
    pub fn new(options: BrowserOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .build()?;
        Ok(Self { options, http })
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.options.endpoint(), path);
        debug!(%url, "devtools discovery");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuditError::connection(format!("GET {url} failed: {e}")))?;
        response
            .json()
            .await
            .map_err(|e| AuditError::connection(format!("GET {url} returned unexpected body: {e}")))
    }

    async fn browser_socket(&self) -> Result<CdpConnection> {
        let version: VersionInfo = self.get_json("/json/version").await?;
        debug!(browser = %version.browser, "found devtools endpoint");
        CdpConnection::connect(&version.web_socket_debugger_url).await
    }

    async fn create_target(&self) -> Result<String> {
        let browser = self.browser_socket().await?;
        let created = browser
            .send("Target.createTarget", json!({ "url": "about:blank" }))
            .await;
        browser.close().await;
        let created: CreateTargetResult = serde_json::from_value(created?)?;
        Ok(created.target_id)
    }

    async fn close_target(&self, target_id: &str) -> Result<()> {
        let browser = self.browser_socket().await?;
        let closed = browser
            .send("Target.closeTarget", json!({ "targetId": target_id }))
            .await;
        browser.close().await;
        closed.map(|_| ())
    }

    async fn page_socket_url(&self, target_id: &str) -> Result<String> {
        let targets: Vec<TargetInfo> = self.get_json("/json").await?;
        targets
            .into_iter()
            .find(|t| t.id == target_id)
            .and_then(|t| t.web_socket_debugger_url)
            .ok_or_else(|| {
                AuditError::connection(format!("target {target_id} is not listed by /json"))
            })
    }

    /// Opens a fresh tab at `viewport`, navigates to `url` and waits for it to settle.
    pub async fn open_page(&self, url: &str, viewport: Viewport) -> Result<RemoteSession> {
        let target_id = self.create_target().await?;
        let socket_url = self.page_socket_url(&target_id).await?;
        let conn = CdpConnection::connect(&socket_url).await?;

        let mut session = RemoteSession {
            conn,
            target_id,
            viewport,
            browser: self.clone(),
            load_state: LoadState::Loaded,
        };
        let ready = match session.prepare().await {
            Ok(()) => session.navigate(url).await,
            Err(e) => Err(e),
        };
        match ready {
            Ok(state) => {
                session.load_state = state;
                Ok(session)
            }
            Err(e) => {
                if let Err(cleanup) = session.destroy().await {
                    debug!(error = %cleanup, "could not close half-open target");
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl PageOpener for RemoteBrowser {
    async fn open(&self, url: &str, viewport: Viewport) -> Result<Box<dyn AuditPage>> {
        let session = self.open_page(url, viewport).await?;
        Ok(Box::new(session))
    }
}

/// One browser tab and its dedicated devtools socket.
#[derive(Debug)]
pub struct RemoteSession {
    conn: CdpConnection,
    target_id: String,
    viewport: Viewport,
    browser: RemoteBrowser,
    load_state: LoadState,
}

impl RemoteSession {
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    fn options(&self) -> &BrowserOptions {
        &self.browser.options
    }

    async fn prepare(&self) -> Result<()> {
        self.conn
            .send(
                "Emulation.setDeviceMetricsOverride",
                json!({
                    "width": self.viewport.width,
                    "height": self.viewport.height,
                    "deviceScaleFactor": 1,
                    "mobile": false,
                }),
            )
            .await?;
        for domain in ["Page.enable", "Runtime.enable", "DOM.enable"] {
            self.conn.send(domain, json!({})).await?;
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<LoadState> {
        let mut loaded = self.conn.subscribe("Page.loadEventFired").await;
        let nav = self.conn.send("Page.navigate", json!({ "url": url })).await?;
        if let Some(error) = nav.get("errorText").and_then(Value::as_str) {
            warn!(%url, %error, "navigation reported an error");
        }
        let state = self.await_load(&mut loaded, url).await;
        tokio::time::sleep(self.options().settle_for(url)).await;
        info!(%url, viewport = %self.viewport, ?state, "page ready");
        Ok(state)
    }

    async fn await_load(&self, loaded: &mut mpsc::UnboundedReceiver<Value>, url: &str) -> LoadState {
        let limit = self.options().navigation_timeout;
        match tokio::time::timeout(limit, loaded.recv()).await {
            Ok(Some(_)) => LoadState::Loaded,
            Ok(None) => {
                warn!(%url, "socket closed before the load event");
                LoadState::TimedOut
            }
            Err(_) => {
                warn!(%url, timeout_ms = limit.as_millis() as u64, "load event not seen, continuing");
                LoadState::TimedOut
            }
        }
    }

    async fn mouse(&self, kind: &str, at: Point, press: bool) -> Result<()> {
        let mut params = json!({ "type": kind, "x": at.x, "y": at.y });
        if press {
            params["button"] = json!("left");
            params["clickCount"] = json!(1);
        }
        self.conn.send("Input.dispatchMouseEvent", params).await?;
        Ok(())
    }

    async fn center_of(&self, target: &Locator) -> Result<Option<Point>> {
        probe(self, &queries::center_point(target)).await
    }
}

#[async_trait]
impl AuditPage for RemoteSession {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        let raw = self
            .conn
            .send(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        let evaluated: EvaluateResult = serde_json::from_value(raw)?;
        if let Some(details) = evaluated.exception_details {
            return Err(AuditError::evaluation(details.message()));
        }
        Ok(evaluated.result.value.unwrap_or(Value::Null))
    }

    async fn hover(&self, target: &Locator) -> Result<bool> {
        let Some(at) = self.center_of(target).await? else {
            return Ok(false);
        };
        self.mouse("mouseMoved", at, false).await?;
        tokio::time::sleep(self.options().hover_settle).await;
        Ok(true)
    }

    async fn click(&self, target: &Locator) -> Result<bool> {
        let Some(at) = self.center_of(target).await? else {
            return Ok(false);
        };
        self.mouse("mousePressed", at, true).await?;
        self.mouse("mouseReleased", at, true).await?;
        tokio::time::sleep(self.options().click_settle).await;
        Ok(true)
    }

    async fn scroll_to(&self, container: &Locator, top: f64) -> Result<()> {
        self.query(&queries::set_scroll_top(container, top)).await?;
        tokio::time::sleep(self.options().scroll_settle).await;
        Ok(())
    }

    async fn release_pointer(&self) -> Result<()> {
        self.mouse("mouseMoved", Point { x: 0.0, y: 0.0 }, false)
            .await
    }

    async fn reload(&self, wait: Duration) -> Result<()> {
        let mut loaded = self.conn.subscribe("Page.loadEventFired").await;
        self.conn.send("Page.reload", json!({})).await?;
        self.await_load(&mut loaded, "reload").await;
        tokio::time::sleep(wait).await;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let limit = self.options().screenshot_timeout;
        let raw = self
            .conn
            .send_within("Page.captureScreenshot", json!({ "format": "png" }), limit)
            .await?
            .ok_or(AuditError::ScreenshotTimeout(limit))?;
        let shot: ScreenshotResult = serde_json::from_value(raw)?;
        STANDARD.decode(shot.data.as_bytes()).map_err(|e| {
            AuditError::protocol("Page.captureScreenshot", format!("invalid base64 payload: {e}"))
        })
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn destroy(&self) -> Result<()> {
        self.conn.close().await;
        self.browser.close_target(&self.target_id).await?;
        debug!(target = %self.target_id, "target closed");
        Ok(())
    }
}
