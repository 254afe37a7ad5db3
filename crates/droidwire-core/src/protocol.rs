//! JSON wire format shared by every remote command.
//!
//! The Appium server speaks two dialects of the WebDriver protocol:
//!
//! - **JSON-wire** (legacy): every body carries a numeric `status`, a
//!   `sessionId` and a `value`.
//! - **W3C**: the body carries only `value`; failures are signalled by the
//!   HTTP status and a `value.error` string.
//!
//! [`decode_response`] folds both into a single [`CommandResponse`] whose
//! [`ResponseStatus`] uses the JSON-wire numeric codes.
//!
//! # Example
//!
//! ```
//! use droidwire_core::protocol::{decode_response, ResponseStatus};
//!
//! let body = br#"{"sessionId":"abc","status":0,"value":true}"#;
//! let response = decode_response(200, body).unwrap();
//! assert_eq!(response.status, ResponseStatus::Success);
//! assert_eq!(response.value, serde_json::Value::Bool(true));
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

/// Ordered string-keyed parameters sent as a command's JSON body.
pub type ParameterMap = Map<String, Value>;

/// Key under which W3C servers return element references.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key under which JSON-wire servers return element references.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while decoding a response body.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The body is not valid JSON.
    #[error("invalid JSON in response body: {0}")]
    InvalidJson(String),

    /// The body is JSON but not a WebDriver response object.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

// ---------------------------------------------------------------------------
// ResponseStatus
// ---------------------------------------------------------------------------

/// Result code of a remote command, using the JSON-wire numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    NoSuchSession,
    NoSuchElement,
    UnknownCommand,
    StaleElementReference,
    ElementNotVisible,
    InvalidElementState,
    UnhandledError,
    JavaScriptError,
    Timeout,
    InvalidSelector,
    SessionNotCreated,
    InvalidArgument,
    /// A code this client has no name for.
    Other(i64),
}

impl ResponseStatus {
    /// Maps a JSON-wire numeric status to a `ResponseStatus`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            6 => Self::NoSuchSession,
            7 => Self::NoSuchElement,
            9 => Self::UnknownCommand,
            10 => Self::StaleElementReference,
            11 => Self::ElementNotVisible,
            12 => Self::InvalidElementState,
            13 => Self::UnhandledError,
            17 => Self::JavaScriptError,
            21 => Self::Timeout,
            32 => Self::InvalidSelector,
            33 => Self::SessionNotCreated,
            61 => Self::InvalidArgument,
            other => Self::Other(other),
        }
    }

    /// The JSON-wire numeric status.
    pub fn code(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::NoSuchSession => 6,
            Self::NoSuchElement => 7,
            Self::UnknownCommand => 9,
            Self::StaleElementReference => 10,
            Self::ElementNotVisible => 11,
            Self::InvalidElementState => 12,
            Self::UnhandledError => 13,
            Self::JavaScriptError => 17,
            Self::Timeout => 21,
            Self::InvalidSelector => 32,
            Self::SessionNotCreated => 33,
            Self::InvalidArgument => 61,
            Self::Other(code) => code,
        }
    }

    /// Maps a W3C `value.error` string to a `ResponseStatus`.
    ///
    /// Unrecognised error strings map to [`ResponseStatus::UnhandledError`].
    pub fn from_w3c_error(error: &str) -> Self {
        match error {
            "invalid session id" => Self::NoSuchSession,
            "no such element" => Self::NoSuchElement,
            "unknown command" | "unknown method" => Self::UnknownCommand,
            "stale element reference" => Self::StaleElementReference,
            "element not interactable" | "element not visible" => Self::ElementNotVisible,
            "invalid element state" => Self::InvalidElementState,
            "javascript error" => Self::JavaScriptError,
            "timeout" | "script timeout" => Self::Timeout,
            "invalid selector" => Self::InvalidSelector,
            "session not created" => Self::SessionNotCreated,
            "invalid argument" => Self::InvalidArgument,
            _ => Self::UnhandledError,
        }
    }

    /// Returns `true` for [`ResponseStatus::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Success => "success",
            Self::NoSuchSession => "no such session",
            Self::NoSuchElement => "no such element",
            Self::UnknownCommand => "unknown command",
            Self::StaleElementReference => "stale element reference",
            Self::ElementNotVisible => "element not visible",
            Self::InvalidElementState => "invalid element state",
            Self::UnhandledError => "unhandled error",
            Self::JavaScriptError => "javascript error",
            Self::Timeout => "timeout",
            Self::InvalidSelector => "invalid selector",
            Self::SessionNotCreated => "session not created",
            Self::InvalidArgument => "invalid argument",
            Self::Other(code) => return write!(f, "status {code}"),
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// CommandResponse
// ---------------------------------------------------------------------------

/// A decoded response to one remote command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResponse {
    /// Session id reported by the server, if any.
    pub session_id: Option<String>,
    /// Result code of the command.
    pub status: ResponseStatus,
    /// The loosely-typed result value (`Null` when absent).
    pub value: Value,
}

impl CommandResponse {
    /// A successful response carrying `value`.
    pub fn success(value: Value) -> Self {
        Self {
            session_id: None,
            status: ResponseStatus::Success,
            value,
        }
    }

    /// A failed response with the given status and message.
    pub fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        let mut value = Map::new();
        value.insert("message".to_string(), Value::String(message.into()));
        Self {
            session_id: None,
            status,
            value: Value::Object(value),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Human-readable failure message taken from the response value.
    ///
    /// Falls back to the status name when the server sent no message.
    pub fn error_message(&self) -> String {
        match &self.value {
            Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                Some(message) if !message.is_empty() => message.to_string(),
                _ => self.status.to_string(),
            },
            Value::String(message) if !message.is_empty() => message.clone(),
            _ => self.status.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes an HTTP response into a [`CommandResponse`].
///
/// An empty body is accepted: success for 2xx statuses, otherwise an
/// [`ResponseStatus::UnhandledError`] naming the HTTP status.
pub fn decode_response(http_status: u16, body: &[u8]) -> Result<CommandResponse, ProtocolError> {
    let http_ok = (200..300).contains(&http_status);

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(if http_ok {
            CommandResponse::success(Value::Null)
        } else {
            CommandResponse::failure(
                ResponseStatus::UnhandledError,
                format!("HTTP {http_status} with empty body"),
            )
        });
    }

    let json: Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let mut object = match json {
        Value::Object(object) => object,
        other => {
            return Err(ProtocolError::InvalidBody(format!(
                "expected a JSON object, got: {other}"
            )));
        }
    };

    let value = object.remove("value").unwrap_or(Value::Null);
    let mut session_id = object
        .get("sessionId")
        .and_then(Value::as_str)
        .map(str::to_string);

    let status = match object.get("status") {
        // JSON-wire dialect.
        Some(Value::Number(code)) => {
            let code = code.as_i64().ok_or_else(|| {
                ProtocolError::InvalidBody(format!("non-integer status: {code}"))
            })?;
            ResponseStatus::from_code(code)
        }
        Some(other) if !other.is_null() => {
            return Err(ProtocolError::InvalidBody(format!(
                "unexpected status field: {other}"
            )));
        }
        // W3C dialect: `value.error` only counts on a failed reply.
        _ if http_ok => ResponseStatus::Success,
        _ => value
            .get("error")
            .and_then(Value::as_str)
            .map_or(ResponseStatus::UnhandledError, ResponseStatus::from_w3c_error),
    };

    // W3C new-session responses nest the session id in the value.
    if session_id.is_none() {
        session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    Ok(CommandResponse {
        session_id,
        status,
        value,
    })
}

/// Extracts an element id from a W3C or JSON-wire element reference.
pub fn element_reference(value: &Value) -> Option<&str> {
    let object = value.as_object()?;
    object
        .get(W3C_ELEMENT_KEY)
        .or_else(|| object.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
