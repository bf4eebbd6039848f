//! Drives `RemoteBrowser` against an in-process stand-in for Chromium's
//! remote-debugging port: HTTP discovery plus one websocket per target.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use theme_audit_lib::locator::Locator;
use theme_audit_lib::page::LoadState;
use theme_audit_lib::{AuditError, AuditPage, BrowserOptions, PageOpener, RemoteBrowser, Viewport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
const TARGET_ID: &str = "T1";

/// Every command the mock received, as `(method, params)`.
type Log = Arc<Mutex<Vec<(String, Value)>>>;

struct MockDevtools {
    port: u16,
    log: Log,
}

impl MockDevtools {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let log: Log = Arc::default();
        let accepted = Arc::clone(&log);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, port, Arc::clone(&accepted)));
            }
        });
        Self { port, log }
    }

    fn options(&self) -> BrowserOptions {
        BrowserOptions {
            host: "127.0.0.1".into(),
            port: self.port,
            navigation_timeout: Duration::from_millis(300),
            screenshot_timeout: Duration::from_secs(2),
            local_settle: Duration::ZERO,
            remote_settle: Duration::ZERO,
            hover_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            overlay_settle: Duration::ZERO,
            reload_wait: Duration::ZERO,
        }
    }

    fn methods(&self) -> Vec<String> {
        self.log.lock().expect("log").iter().map(|(method, _)| method.clone()).collect()
    }

    fn params_of(&self, method: &str) -> Vec<Value> {
        self.log
            .lock()
            .expect("log")
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

async fn handle_connection(stream: TcpStream, port: u16, log: Log) {
    let mut head = [0u8; 256];
    let Ok(n) = stream.peek(&mut head).await else {
        return;
    };
    if String::from_utf8_lossy(&head[..n]).starts_with("GET /devtools/") {
        serve_socket(stream, log).await;
    } else {
        serve_http(stream, port).await;
    }
}

async fn serve_http(mut stream: TcpStream, port: u16) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let body = match path {
        "/json/version" => json!({
            "Browser": "HeadlessChrome/126.0",
            "webSocketDebuggerUrl": format!("ws://127.0.0.1:{port}/devtools/browser/b1"),
        }),
        "/json" | "/json/list" => json!([{
            "id": TARGET_ID,
            "type": "page",
            "url": "about:blank",
            "webSocketDebuggerUrl": format!("ws://127.0.0.1:{port}/devtools/page/{TARGET_ID}"),
        }]),
        _ => json!({}),
    }
    .to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn serve_socket(stream: TcpStream, log: Log) {
    let Ok(ws) = accept_async(stream).await else {
        return;
    };
    let (mut tx, mut rx) = ws.split();
    // Set once this target navigates to a URL marked `stalled-capture`.
    let mut stall_captures = false;
    while let Some(Ok(message)) = rx.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let id = request["id"].as_u64().unwrap_or(0);
        let method = request["method"].as_str().unwrap_or_default().to_string();
        log.lock().expect("log").push((method.clone(), request["params"].clone()));
        let navigated_to = request["params"]["url"].as_str().unwrap_or_default();
        if method == "Page.navigate" && navigated_to.contains("stalled-capture") {
            stall_captures = true;
        }
        if method == "Page.captureScreenshot" && stall_captures {
            continue;
        }

        let reply = match method.as_str() {
            "Target.createTarget" => json!({ "id": id, "result": { "targetId": TARGET_ID } }),
            "Page.navigate" => json!({ "id": id, "result": { "frameId": "F1" } }),
            "Page.captureScreenshot" => json!({ "id": id, "result": { "data": PIXEL_PNG } }),
            "Runtime.evaluate" => {
                let expression = request["params"]["expression"].as_str().unwrap_or_default();
                if expression.contains("throw") {
                    json!({ "id": id, "result": {
                        "result": { "type": "object" },
                        "exceptionDetails": {
                            "text": "Uncaught",
                            "exception": { "description": "Error: boom" }
                        }
                    }})
                } else if expression.contains("getBoundingClientRect") && expression.contains("width / 2") {
                    json!({ "id": id, "result": {
                        "result": { "type": "object", "value": { "x": 120.5, "y": 48.0 } }
                    }})
                } else {
                    json!({ "id": id, "result": { "result": { "type": "number", "value": 42 } } })
                }
            }
            _ => json!({ "id": id, "result": {} }),
        };
        if tx.send(Message::Text(reply.to_string())).await.is_err() {
            break;
        }

        if method == "Page.navigate" && !navigated_to.contains("never-loads") {
            let event = json!({ "method": "Page.loadEventFired", "params": { "timestamp": 1.0 } });
            if tx.send(Message::Text(event.to_string())).await.is_err() {
                break;
            }
        }
    }
}

#[tokio::test]
async fn open_page_prepares_navigates_and_closes_the_target() {
    let mock = MockDevtools::start().await;
    let browser = RemoteBrowser::new(mock.options()).expect("client");

    let session = browser
        .open_page("http://127.0.0.1:3000/docs/page", Viewport { width: 800, height: 600 })
        .await
        .expect("open page");
    assert_eq!(session.load_state(), LoadState::Loaded);
    assert_eq!(session.target_id(), TARGET_ID);
    assert_eq!(session.viewport(), Viewport { width: 800, height: 600 });

    assert_eq!(session.evaluate("40 + 2").await.expect("evaluate"), json!(42));

    let png = session.screenshot().await.expect("screenshot");
    assert_eq!(&png[..4], b"\x89PNG");

    session.destroy().await.expect("destroy");

    let methods = mock.methods();
    let expected = [
        "Target.createTarget",
        "Emulation.setDeviceMetricsOverride",
        "Page.enable",
        "Runtime.enable",
        "DOM.enable",
        "Page.navigate",
        "Runtime.evaluate",
        "Page.captureScreenshot",
        "Target.closeTarget",
    ];
    assert_eq!(methods, expected);
}

#[tokio::test]
async fn missing_load_event_times_out_without_failing() {
    let mock = MockDevtools::start().await;
    let browser = RemoteBrowser::new(mock.options()).expect("client");

    let page = browser
        .open_page("http://127.0.0.1:3000/never-loads", Viewport::default())
        .await
        .expect("open page");

    assert_eq!(page.load_state(), LoadState::TimedOut);
    page.destroy().await.expect("destroy");
}

#[tokio::test]
async fn thrown_scripts_become_evaluation_errors() {
    let mock = MockDevtools::start().await;
    let browser = RemoteBrowser::new(mock.options()).expect("client");
    let page = browser
        .open("http://127.0.0.1:3000/", Viewport::default())
        .await
        .expect("open through the opener");

    let err = page
        .evaluate("(() => { throw new Error('boom') })()")
        .await
        .expect_err("script throws");
    assert!(matches!(&err, AuditError::Evaluation(msg) if msg == "Error: boom"));
    assert!(!err.is_fatal());

    page.destroy().await.expect("destroy");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_fatal_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let options = BrowserOptions {
        host: "127.0.0.1".into(),
        port,
        ..BrowserOptions::default()
    };
    let browser = RemoteBrowser::new(options).expect("client");
    let err = browser
        .open_page("http://127.0.0.1:3000/", Viewport::default())
        .await
        .expect_err("nothing listens");

    assert!(matches!(err, AuditError::Connection(_)));
    assert!(err.is_fatal());
    assert!(err.to_string().contains("/json/version"));
}

#[tokio::test]
async fn screenshots_that_never_arrive_time_out() {
    let mock = MockDevtools::start().await;
    let options = BrowserOptions {
        screenshot_timeout: Duration::from_millis(100),
        ..mock.options()
    };
    let browser = RemoteBrowser::new(options).expect("client");
    let page = browser
        .open_page("http://127.0.0.1:3000/stalled-capture", Viewport::default())
        .await
        .expect("open page");

    let err = page.screenshot().await.expect_err("no capture reply");
    assert!(matches!(err, AuditError::ScreenshotTimeout(limit) if limit == Duration::from_millis(100)));
    assert!(!err.is_fatal());

    // The session stays usable after the stalled capture.
    assert_eq!(page.evaluate("40 + 2").await.expect("evaluate"), json!(42));
    page.destroy().await.expect("destroy");
}

#[tokio::test]
async fn pointer_and_scroll_commands_reach_the_browser() {
    let mock = MockDevtools::start().await;
    let browser = RemoteBrowser::new(mock.options()).expect("client");
    let page = browser
        .open_page("http://127.0.0.1:3000/docs/page", Viewport::default())
        .await
        .expect("open page");

    let link = Locator::css("#navbar a");
    assert!(page.hover(&link).await.expect("hover"));
    assert!(page.click(&link).await.expect("click"));
    page.release_pointer().await.expect("release");
    page.scroll_to(&Locator::css(".sidebar"), 640.0).await.expect("scroll");
    page.destroy().await.expect("destroy");

    let events: Vec<(String, f64, f64)> = mock
        .params_of("Input.dispatchMouseEvent")
        .iter()
        .map(|p| {
            (
                p["type"].as_str().unwrap_or_default().to_string(),
                p["x"].as_f64().unwrap_or(f64::NAN),
                p["y"].as_f64().unwrap_or(f64::NAN),
            )
        })
        .collect();
    let expected = [
        ("mouseMoved".to_string(), 120.5, 48.0),
        ("mousePressed".to_string(), 120.5, 48.0),
        ("mouseReleased".to_string(), 120.5, 48.0),
        ("mouseMoved".to_string(), 0.0, 0.0),
    ];
    assert_eq!(events, expected);

    let pressed = &mock.params_of("Input.dispatchMouseEvent")[1];
    assert_eq!(pressed["button"], "left");
    assert_eq!(pressed["clickCount"], 1);

    let scrolled = mock
        .params_of("Runtime.evaluate")
        .iter()
        .filter_map(|p| p["expression"].as_str().map(str::to_string))
        .any(|e| e.contains(r#"document.querySelector(".sidebar")"#) && e.contains("scrollTop = 640"));
    assert!(scrolled, "scroll_to sets scrollTop on the container");
}
