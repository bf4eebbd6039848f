//! Wire types for the devtools JSON protocol and its HTTP discovery endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing command frame.
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

/// Any frame sent by the browser: a response carries `id`, an event carries `method`.
#[derive(Debug, Clone, Deserialize)]
pub struct Incoming {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ErrorDetail {
    pub fn describe(&self) -> String {
        match &self.data {
            Some(data) => format!("{} (code {}): {}", self.message, self.code, data),
            None => format!("{} (code {})", self.message, self.code),
        }
    }
}

/// `GET /json/version`
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub web_socket_debugger_url: String,
}

/// One entry of `GET /json`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub web_socket_debugger_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetResult {
    pub target_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotResult {
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    #[serde(default)]
    pub result: RemoteObject,
    #[serde(default)]
    pub exception_details: Option<ExceptionDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteObject {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionDetails {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
    /// The thrown value's description, falling back to the summary text.
    pub fn message(&self) -> String {
        self.exception
            .as_ref()
            .and_then(|e| e.description.clone())
            .filter(|d| !d.is_empty())
            .or_else(|| (!self.text.is_empty()).then(|| self.text.clone()))
            .unwrap_or_else(|| "eval error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn incoming_distinguishes_responses_and_events() {
        let response: Incoming =
            serde_json::from_value(json!({"id": 3, "result": {"frameId": "f"}})).expect("response");
        assert_eq!(response.id, Some(3));
        assert!(response.method.is_none());

        let event: Incoming = serde_json::from_value(
            json!({"method": "Page.loadEventFired", "params": {"timestamp": 1.0}}),
        )
        .expect("event");
        assert_eq!(event.id, None);
        assert_eq!(event.method.as_deref(), Some("Page.loadEventFired"));
    }

    #[test]
    fn exception_message_prefers_description() {
        let details: ExceptionDetails = serde_json::from_value(json!({
            "text": "Uncaught",
            "exception": {"description": "ReferenceError: nope is not defined"}
        }))
        .expect("details");
        assert_eq!(details.message(), "ReferenceError: nope is not defined");

        let bare: ExceptionDetails =
            serde_json::from_value(json!({"text": "Uncaught"})).expect("details");
        assert_eq!(bare.message(), "Uncaught");
    }
}
