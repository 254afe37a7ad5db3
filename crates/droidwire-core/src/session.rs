//! Remote session handle.
//!
//! A [`RemoteSession`] pairs a [`CommandExecutor`] with the session id the
//! server issued. It is the single dispatch point for every typed
//! operation: [`execute`](RemoteSession::execute) injects the session id into
//! the parameter map and hands the request to the executor.
//!
//! The handle is cheap to clone (an `Arc` around immutable state) so element
//! handles can each carry their own copy.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use droidwire_core::command::Command;
//! use droidwire_core::http_client::HttpCommandExecutor;
//! use droidwire_core::protocol::ParameterMap;
//! use droidwire_core::session::RemoteSession;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = Arc::new(HttpCommandExecutor::new("http://127.0.0.1:4723/wd/hub")?);
//! let session = RemoteSession::attach(executor, "3c7a1f");
//! let response = session
//!     .execute(Command::GetCurrentActivity, ParameterMap::new())
//!     .await?;
//! println!("{}", response.value);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::capabilities::DesiredCapabilities;
use crate::command::{Command, CommandRequest};
use crate::driver::DriverError;
use crate::element::ElementId;
use crate::executor::{CommandExecutor, TransportError};
use crate::locator::Locator;
use crate::protocol::{element_reference, CommandResponse, ParameterMap, ResponseStatus};

struct SessionInner {
    executor: Arc<dyn CommandExecutor>,
    id: String,
    capabilities: Value,
}

/// An established session on a remote Appium server.
#[derive(Clone)]
pub struct RemoteSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSession")
            .field("id", &self.inner.id)
            .finish_non_exhaustive()
    }
}

impl RemoteSession {
    /// Creates a new session with `POST /session`.
    pub async fn create(
        executor: Arc<dyn CommandExecutor>,
        capabilities: &DesiredCapabilities,
    ) -> Result<Self, DriverError> {
        let request = CommandRequest::new(Command::NewSession, capabilities.to_session_params());
        let response = check(executor.execute(request).await?)?;

        let id = response.session_id.ok_or(DriverError::NoSession)?;
        let mut value = response.value;
        // W3C servers wrap the negotiated capabilities.
        let capabilities = match value.get_mut("capabilities").map(Value::take) {
            Some(caps) => caps,
            None => value,
        };

        info!(session_id = %id, "session created");
        Ok(Self::from_parts(executor, id, capabilities))
    }

    /// Attaches to a session that already exists on the server.
    pub fn attach(executor: Arc<dyn CommandExecutor>, id: impl Into<String>) -> Self {
        Self::from_parts(executor, id.into(), Value::Null)
    }

    fn from_parts(executor: Arc<dyn CommandExecutor>, id: String, capabilities: Value) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                executor,
                id,
                capabilities,
            }),
        }
    }

    /// The server-issued session id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Capabilities the server reported at creation; `Null` for attached
    /// sessions.
    pub fn capabilities(&self) -> &Value {
        &self.inner.capabilities
    }

    /// Dispatches `command` with `params`, adding the session id.
    ///
    /// The response is returned as-is, whatever its status.
    pub async fn execute(
        &self,
        command: Command,
        mut params: ParameterMap,
    ) -> Result<CommandResponse, TransportError> {
        params.insert(
            "sessionId".to_string(),
            Value::String(self.inner.id.clone()),
        );
        self.inner
            .executor
            .execute(CommandRequest::new(command, params))
            .await
    }

    /// Like [`execute`](Self::execute), but a non-success status becomes
    /// [`DriverError::Remote`].
    pub async fn execute_checked(
        &self,
        command: Command,
        params: ParameterMap,
    ) -> Result<CommandResponse, DriverError> {
        check(self.execute(command, params).await?)
    }

    /// Finds a single element.
    pub async fn find_element(&self, locator: &Locator) -> Result<ElementId, DriverError> {
        self.find_one(Command::FindElement, locator.to_params(), locator)
            .await
    }

    /// Finds all matching elements. No match is an empty vector.
    pub async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementId>, DriverError> {
        self.find_many(Command::FindElements, locator.to_params())
            .await
    }

    /// Finds a single element below the element `parent`.
    pub async fn find_child_element(
        &self,
        parent: &ElementId,
        locator: &Locator,
    ) -> Result<ElementId, DriverError> {
        self.find_one(Command::FindChildElement, parent.with_params(locator.to_params()), locator)
            .await
    }

    /// Finds all matching elements below the element `parent`.
    pub async fn find_child_elements(
        &self,
        parent: &ElementId,
        locator: &Locator,
    ) -> Result<Vec<ElementId>, DriverError> {
        self.find_many(Command::FindChildElements, parent.with_params(locator.to_params()))
            .await
    }

    async fn find_one(
        &self,
        command: Command,
        params: ParameterMap,
        locator: &Locator,
    ) -> Result<ElementId, DriverError> {
        let response = self.execute(command, params).await?;
        if response.status == ResponseStatus::NoSuchElement {
            return Err(DriverError::NoSuchElement {
                using: locator.strategy.as_str().to_string(),
                value: locator.value.clone(),
            });
        }
        let response = check(response)?;
        element_reference(&response.value)
            .map(ElementId::new)
            .ok_or_else(|| unexpected("an element reference", &response.value))
    }

    async fn find_many(
        &self,
        command: Command,
        params: ParameterMap,
    ) -> Result<Vec<ElementId>, DriverError> {
        let response = self.execute(command, params).await?;
        if response.status == ResponseStatus::NoSuchElement {
            return Ok(Vec::new());
        }
        let response = check(response)?;
        match &response.value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    element_reference(item)
                        .map(ElementId::new)
                        .ok_or_else(|| unexpected("an element reference", item))
                })
                .collect(),
            other => Err(unexpected("an array of element references", other)),
        }
    }

    /// Deletes the session on the server.
    pub async fn quit(&self) -> Result<(), DriverError> {
        self.execute_checked(Command::DeleteSession, ParameterMap::new())
            .await?;
        debug!(session_id = %self.inner.id, "session deleted");
        Ok(())
    }
}

/// Queries `GET /status`. Needs no session.
pub async fn server_status(executor: &dyn CommandExecutor) -> Result<Value, DriverError> {
    let response = check(executor.execute(CommandRequest::bare(Command::Status)).await?)?;
    Ok(response.value)
}

/// Turns a non-success response into [`DriverError::Remote`].
pub(crate) fn check(response: CommandResponse) -> Result<CommandResponse, DriverError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(DriverError::Remote {
            status: response.status,
            message: response.error_message(),
        })
    }
}

pub(crate) fn unexpected(expected: &'static str, actual: &Value) -> DriverError {
    DriverError::UnexpectedValue {
        expected,
        actual: actual.to_string(),
    }
}
