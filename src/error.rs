use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Protocol error in {method}: {message}")]
    Protocol { method: String, message: String },

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Screenshot capture timed out after {}ms", .0.as_millis())]
    ScreenshotTimeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl AuditError {
    pub fn connection(message: impl Into<String>) -> Self {
        AuditError::Connection(message.into())
    }

    pub fn protocol(method: impl Into<String>, message: impl Into<String>) -> Self {
        AuditError::Protocol {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        AuditError::Evaluation(message.into())
    }

    /// Errors that end the whole run instead of a single check.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AuditError::Connection(_))
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            AuditError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check output directory paths/permissions.",
            ),
            AuditError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check connectivity to the devtools endpoint and retry.",
            ),
            AuditError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify URL/format (e.g., https://example.com/docs/page).",
            ),
            AuditError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Screenshot bytes could not be decoded; rerun with --verbose for protocol details.",
            ),
            AuditError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON/serialization inputs; run with --verbose for details.",
            ),
            AuditError::Connection(msg) => ErrorPayload::new(
                ErrorCategory::Browser,
                msg.to_string(),
                "Start Chromium with --remote-debugging-port and point --cdp-host/--cdp-port (or AUDIT_CDP_HOST/AUDIT_CDP_PORT) at it.",
            ),
            AuditError::Protocol { method, message } => ErrorPayload::new(
                ErrorCategory::Browser,
                format!("{method}: {message}"),
                "The browser rejected a devtools command; check the Chromium version and rerun with --verbose.",
            ),
            AuditError::Evaluation(msg) => ErrorPayload::new(
                ErrorCategory::Browser,
                msg.to_string(),
                "An in-page script threw; the page may not have finished loading.",
            ),
            AuditError::ScreenshotTimeout(_) => ErrorPayload::new(
                ErrorCategory::Browser,
                self.to_string(),
                "Raise browser.screenshot_timeout in the config or reduce page weight.",
            ),
            AuditError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("tolerance") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Tolerances must be non-negative numbers (e.g., --tolerance-px 1 --tolerance-color 3).",
                    )
                } else if lower.contains("category") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use one of: css, behavioral, layout, dom, responsive, visual.",
                    )
                } else if lower.contains("breakpoint") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Declare at least one [[breakpoints]] entry with name, width and height.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths (e.g., --viewport WIDTHxHEIGHT) and the config file.",
                    )
                }
            }
            AuditError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for AuditError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        AuditError::Connection(format!("websocket: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Browser,
    Image,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_payload_points_at_devtools_flags() {
        let err = AuditError::connection("GET http://127.0.0.1:9/json/version failed");
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Browser);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("--cdp-port"),
            "expected remediation to mention --cdp-port, got: {remediation}"
        );
    }

    #[test]
    fn config_payload_uses_default_remediation_for_other_messages() {
        let err = AuditError::Config("Some other config issue".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("Check flags/paths"),
            "expected default remediation for generic config errors"
        );
    }

    #[test]
    fn config_payload_explains_tolerance_rules() {
        let err = AuditError::Config("tolerance.px must be non-negative".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("non-negative"),
            "expected tolerance remediation, got: {remediation}"
        );
    }

    #[test]
    fn config_payload_lists_categories() {
        let err = AuditError::Config("Unknown category: pixels".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(
            remediation.contains("behavioral") && remediation.contains("responsive"),
            "expected category list, got: {remediation}"
        );
    }

    #[test]
    fn only_connection_errors_are_fatal() {
        assert!(AuditError::connection("refused").is_fatal());
        assert!(!AuditError::evaluation("boom").is_fatal());
        assert!(!AuditError::ScreenshotTimeout(Duration::from_secs(1)).is_fatal());
        assert!(!AuditError::protocol("Page.navigate", "bad").is_fatal());
    }

    #[test]
    fn payload_serializes_category_lowercase() {
        let payload = AuditError::evaluation("ReferenceError: x is not defined").to_payload();
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["category"], "browser");
        assert_eq!(json["message"], "ReferenceError: x is not defined");
    }
}
