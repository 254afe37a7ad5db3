//! Driver errors and the capability traits implemented by
//! [`AndroidDriver`](crate::android::AndroidDriver).
//!
//! Each trait groups one family of typed remote operations. The traits are
//! generic over the element handle type `W` so embedding applications can
//! supply their own [`WebElement`] representation.
//!
//! ```no_run
//! use droidwire_core::driver::{DriverError, FindsByAndroidUiAutomator, ScrollsTo};
//! use droidwire_core::element::AndroidElement;
//!
//! async fn open_settings<D>(driver: &D) -> Result<(), DriverError>
//! where
//!     D: ScrollsTo<AndroidElement>,
//! {
//!     let item = driver.scroll_to("Settings").await?;
//!     item.click().await
//! }
//! ```

use async_trait::async_trait;
use base64::Engine;
use thiserror::Error;

use crate::connection::ConnectionType;
use crate::element::WebElement;
use crate::executor::TransportError;
use crate::protocol::ResponseStatus;
use crate::uiautomator;

/// Errors that can occur during typed driver operations.
#[derive(Error, Debug)]
pub enum DriverError {
    /// A required argument was blank. Raised before any request is sent.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The server answered with a non-success status.
    #[error("remote command failed ({status}): {message}")]
    Remote {
        status: ResponseStatus,
        message: String,
    },

    /// A single-element query matched nothing.
    #[error("no element found using {using} `{value}`")]
    NoSuchElement { using: String, value: String },

    /// The response value had the wrong shape for the operation.
    #[error("unexpected response value: expected {expected}, got {actual}")]
    UnexpectedValue {
        expected: &'static str,
        actual: String,
    },

    /// The server did not return a session id for a new session.
    #[error("server did not return a session id")]
    NoSession,

    /// The command could not be carried to the server.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// The blocking runtime could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl DriverError {
    /// Returns `true` if the error was raised locally without contacting the
    /// server.
    pub fn is_precondition(&self) -> bool {
        matches!(self, DriverError::InvalidArgument { .. })
    }
}

/// Fails with [`DriverError::InvalidArgument`] if `value` is empty or only
/// whitespace.
pub fn require_non_blank(name: &'static str, value: &str) -> Result<(), DriverError> {
    if value.trim().is_empty() {
        return Err(DriverError::InvalidArgument {
            name,
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

/// Finds elements with `-android uiautomator` selectors.
#[async_trait]
pub trait FindsByAndroidUiAutomator<W: WebElement>: Send + Sync {
    /// Finds the first element matching `selector`.
    ///
    /// Fails with [`DriverError::NoSuchElement`] when nothing matches.
    async fn find_element_by_android_uiautomator(&self, selector: &str) -> Result<W, DriverError>;

    /// Finds every element matching `selector`; no match is an empty vector.
    async fn find_elements_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<Vec<W>, DriverError>;
}

/// Finds elements by their accessibility name.
#[async_trait]
pub trait FindsByName<W: WebElement>: Send + Sync {
    async fn find_element_by_name(&self, name: &str) -> Result<W, DriverError>;

    async fn find_elements_by_name(&self, name: &str) -> Result<Vec<W>, DriverError>;
}

/// Launches Android activities.
#[async_trait]
pub trait StartsActivity: Send + Sync {
    /// Starts `app_activity` of `app_package`, waiting for the activity itself.
    async fn start_activity(&self, app_package: &str, app_activity: &str) -> Result<(), DriverError> {
        self.start_activity_and_wait(app_package, app_activity, None, None)
            .await
    }

    /// Starts an activity and waits for `app_wait_package`/`app_wait_activity`
    /// to be in the foreground. Omitted wait fields are sent as `""`.
    ///
    /// Both `app_package` and `app_activity` must be non-blank.
    async fn start_activity_and_wait(
        &self,
        app_package: &str,
        app_activity: &str,
        app_wait_package: Option<&str>,
        app_wait_activity: Option<&str>,
    ) -> Result<(), DriverError>;
}

/// Reads and changes the device network connection.
#[async_trait]
pub trait HasNetworkConnection: Send + Sync {
    async fn connection_type(&self) -> Result<ConnectionType, DriverError>;

    async fn set_connection_type(&self, connection: ConnectionType) -> Result<(), DriverError>;
}

/// Hardware key presses.
#[async_trait]
pub trait AndroidDeviceActionShortcuts: Send + Sync {
    /// Sends `keycode` with the `metastate` modifier flags.
    ///
    /// See [`keycode`](crate::keycode) for the constants.
    async fn key_event(&self, keycode: i32, metastate: i32) -> Result<(), DriverError>;
}

/// Uploads files to the device.
#[async_trait]
pub trait PushesFiles: Send + Sync {
    /// Writes already base64-encoded `data` to `remote_path` on the device.
    async fn push_file(&self, remote_path: &str, base64_data: &str) -> Result<(), DriverError>;

    /// Base64-encodes `bytes` and writes them to `remote_path`.
    async fn push_file_bytes(&self, remote_path: &str, bytes: &[u8]) -> Result<(), DriverError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.push_file(remote_path, &encoded).await
    }
}

/// Scrolls the first scrollable view until an element comes into view.
#[async_trait]
pub trait ScrollsTo<W: WebElement>: FindsByAndroidUiAutomator<W> {
    /// Scrolls to an element whose description or text contains `text`.
    async fn scroll_to(&self, text: &str) -> Result<W, DriverError> {
        require_non_blank("text", text)?;
        self.find_element_by_android_uiautomator(&uiautomator::scroll_to_text(text, None))
            .await
    }

    /// Scrolls to an element whose description or text equals `text`.
    async fn scroll_to_exact(&self, text: &str) -> Result<W, DriverError> {
        require_non_blank("text", text)?;
        self.find_element_by_android_uiautomator(&uiautomator::scroll_to_exact_text(text, None))
            .await
    }
}
