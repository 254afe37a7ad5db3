//! HTTP transport for the Appium server.
//!
//! This module provides [`HttpCommandExecutor`], the [`CommandExecutor`] that
//! turns a [`CommandRequest`] into one HTTP request against the server's base
//! URL and decodes the reply with [`decode_response`].
//!
//! # Example
//!
//! ```no_run
//! use droidwire_core::command::{Command, CommandRequest};
//! use droidwire_core::executor::CommandExecutor;
//! use droidwire_core::http_client::HttpCommandExecutor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = HttpCommandExecutor::new("http://127.0.0.1:4723/wd/hub")?;
//! let response = executor.execute(CommandRequest::bare(Command::Status)).await?;
//! println!("server ready: {}", response.value);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, debug_span, trace, Instrument};

use crate::command::{CommandRequest, HttpMethod};
use crate::config::DroidwireConfig;
use crate::executor::{CommandExecutor, TransportError};
use crate::protocol::{decode_response, CommandResponse, ParameterMap};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default Appium server address.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4723/wd/hub";

/// Default per-command timeout.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for establishing the TCP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// HttpCommandExecutor
// ---------------------------------------------------------------------------

/// Sends commands to an Appium server over HTTP.
///
/// The executor is stateless apart from its connection pool; it can be shared
/// behind an `Arc` by any number of sessions.
#[derive(Debug, Clone)]
pub struct HttpCommandExecutor {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpCommandExecutor {
    /// Create an executor for the given server URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_COMMAND_TIMEOUT)
    }

    /// Create an executor with an explicit per-command timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Create an executor from the resolved configuration.
    pub fn from_config(config: &DroidwireConfig) -> Result<Self, TransportError> {
        Self::with_timeout(config.server_url(), config.command_timeout())
    }

    /// The server base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: reqwest::Url,
        body: ParameterMap,
    ) -> Result<CommandResponse, TransportError> {
        let builder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Delete => self.client.delete(url),
            HttpMethod::Post => {
                let body = Value::Object(body);
                trace!(body = %body, "request body");
                self.client.post(url).json(&body)
            }
        };

        let response = builder
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        trace!(status, body_bytes = bytes.len(), "response received");

        Ok(decode_response(status, &bytes)?)
    }
}

#[async_trait]
impl CommandExecutor for HttpCommandExecutor {
    async fn execute(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
        let CommandRequest { command, mut params } = request;
        let spec = command.spec();
        let span = debug_span!("remote_command", command = command.name());

        async {
            let segments = resolve_path(spec.path, &mut params).map_err(|name| {
                TransportError::MissingPathParameter {
                    command: command.name(),
                    name,
                }
            })?;
            let url = command_url(&self.base_url, &segments)?;
            debug!(method = spec.method.as_str(), %url, "sending command");

            let response = self.send(spec.method, url, params).await?;
            debug!(status = %response.status, "command completed");
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::ConnectionFailed(err.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}

fn normalize_base_url(url: String) -> Result<String, TransportError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(TransportError::InvalidUrl {
            url,
            reason: "expected an http:// or https:// URL".to_string(),
        });
    }
    if let Err(e) = reqwest::Url::parse(trimmed) {
        return Err(TransportError::InvalidUrl {
            url,
            reason: e.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Splits `template` into path segments, filling `{name}` placeholders from
/// `params` and removing each consumed key. Returns the name of the first
/// missing placeholder on failure.
fn resolve_path(template: &str, params: &mut ParameterMap) -> Result<Vec<String>, String> {
    template
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                return Ok(segment.to_string());
            };
            match params.remove(name) {
                Some(Value::String(s)) => Ok(s),
                Some(other) => Ok(other.to_string()),
                None => Err(name.to_string()),
            }
        })
        .collect()
}

/// Appends `segments` to the base URL, percent-encoding each one so that a
/// `/`, `?` or `#` inside an id stays within its segment.
fn command_url(base_url: &str, segments: &[String]) -> Result<reqwest::Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut url = reqwest::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot have a path".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> ParameterMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn resolve_path_substitutes_and_consumes() {
        let mut p = params(json!({ "sessionId": "abc", "id": "el-1", "using": "name" }));
        let segments = resolve_path("/session/{sessionId}/element/{id}/element", &mut p).unwrap();
        assert_eq!(segments, ["session", "abc", "element", "el-1", "element"]);
        assert_eq!(p.len(), 1);
        assert!(p.contains_key("using"));
    }

    #[test]
    fn resolve_path_without_placeholders() {
        let mut p = ParameterMap::new();
        assert_eq!(resolve_path("/status", &mut p).unwrap(), ["status"]);
    }

    #[test]
    fn resolve_path_reports_missing_parameter() {
        let mut p = ParameterMap::new();
        let missing = resolve_path("/session/{sessionId}/element", &mut p).unwrap_err();
        assert_eq!(missing, "sessionId");
    }

    #[test]
    fn resolve_path_formats_non_string_values() {
        let mut p = params(json!({ "sessionId": 42 }));
        assert_eq!(resolve_path("/session/{sessionId}", &mut p).unwrap(), ["session", "42"]);
    }

    #[test]
    fn command_url_percent_encodes_substituted_values() {
        let mut p = params(json!({ "sessionId": "s1", "id": "a/b?c#d", "name": "content desc" }));
        let segments =
            resolve_path("/session/{sessionId}/element/{id}/attribute/{name}", &mut p).unwrap();
        let url = command_url("http://127.0.0.1:4723/wd/hub", &segments).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:4723/wd/hub/session/s1/element/a%2Fb%3Fc%23d/attribute/content%20desc"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn command_url_on_bare_host() {
        let segments = vec!["status".to_string()];
        let url = command_url("http://127.0.0.1:4723", &segments).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4723/status");
    }

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        let url = normalize_base_url("http://127.0.0.1:4723/wd/hub/".to_string()).unwrap();
        assert_eq!(url, "http://127.0.0.1:4723/wd/hub");
    }

    #[test]
    fn normalize_base_url_rejects_other_schemes() {
        let err = normalize_base_url("ftp://example".to_string()).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn new_executor_uses_default_timeout() {
        let executor = HttpCommandExecutor::new(DEFAULT_SERVER_URL).unwrap();
        assert_eq!(executor.timeout(), DEFAULT_COMMAND_TIMEOUT);
        assert_eq!(executor.base_url(), DEFAULT_SERVER_URL);
    }

    #[tokio::test]
    async fn missing_session_placeholder_fails_before_sending() {
        use crate::command::Command;

        // Port 9 (discard) is never contacted: the path cannot be resolved.
        let executor = HttpCommandExecutor::new("http://127.0.0.1:9").unwrap();
        let err = executor
            .execute(CommandRequest::bare(Command::IsLocked))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::MissingPathParameter { command: "is_locked", .. }
        ));
    }
}
