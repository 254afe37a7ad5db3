//! The typed Android driver.
//!
//! [`AndroidDriver`] turns typed method calls into remote commands on a
//! [`RemoteSession`] and converts the loosely-typed response values back into
//! Rust types. It holds nothing but the session handle, so every method is a
//! pure function of its arguments and the server's reply.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use droidwire_core::android::AndroidDriver;
//! use droidwire_core::capabilities::DesiredCapabilities;
//! use droidwire_core::driver::{HasNetworkConnection, StartsActivity};
//! use droidwire_core::connection::ConnectionType;
//! use droidwire_core::http_client::HttpCommandExecutor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = Arc::new(HttpCommandExecutor::new("http://127.0.0.1:4723/wd/hub")?);
//! let caps = DesiredCapabilities::new().device_name("emulator-5554");
//! let driver: AndroidDriver = AndroidDriver::new_session(executor, caps).await?;
//!
//! driver.start_activity("com.android.settings", ".Settings").await?;
//! driver.set_connection_type(ConnectionType::WIFI_ONLY).await?;
//! println!("locked: {}", driver.is_locked().await?);
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::capabilities::{DesiredCapabilities, ANDROID_PLATFORM};
use crate::command::Command;
use crate::config::DroidwireConfig;
use crate::connection::ConnectionType;
use crate::driver::{
    require_non_blank, AndroidDeviceActionShortcuts, DriverError, FindsByAndroidUiAutomator,
    FindsByName, HasNetworkConnection, PushesFiles, ScrollsTo, StartsActivity,
};
use crate::element::{AndroidElement, ElementId, WebElement};
use crate::executor::CommandExecutor;
use crate::http_client::HttpCommandExecutor;
use crate::locator::Locator;
use crate::protocol::ParameterMap;
use crate::session::{unexpected, RemoteSession};
use crate::uiautomator;

/// Name of the settings key toggled by
/// [`ignore_unimportant_views`](AndroidDriver::ignore_unimportant_views).
pub const IGNORE_UNIMPORTANT_VIEWS: &str = "ignoreUnimportantViews";

/// A driver for an Android session, generic over the element handle type.
pub struct AndroidDriver<W: WebElement = AndroidElement> {
    session: RemoteSession,
    element: PhantomData<fn() -> W>,
}

impl<W: WebElement> Clone for AndroidDriver<W> {
    fn clone(&self) -> Self {
        Self::from_session(self.session.clone())
    }
}

impl<W: WebElement> std::fmt::Debug for AndroidDriver<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AndroidDriver")
            .field("session", &self.session)
            .finish()
    }
}

impl<W: WebElement> AndroidDriver<W> {
    /// Wraps an existing session.
    pub fn from_session(session: RemoteSession) -> Self {
        Self {
            session,
            element: PhantomData,
        }
    }

    /// Creates a new session. `platformName` is always set to `Android`.
    pub async fn new_session(
        executor: Arc<dyn CommandExecutor>,
        capabilities: DesiredCapabilities,
    ) -> Result<Self, DriverError> {
        let capabilities = capabilities.platform_name(ANDROID_PLATFORM);
        let session = RemoteSession::create(executor, &capabilities).await?;
        Ok(Self::from_session(session))
    }

    /// Creates a new session on the server named by `config`, merging the
    /// configured default capabilities under `capabilities`.
    pub async fn connect(
        config: &DroidwireConfig,
        capabilities: DesiredCapabilities,
    ) -> Result<Self, DriverError> {
        let executor = Arc::new(HttpCommandExecutor::from_config(config)?);
        let capabilities = capabilities.merge_defaults(&config.default_capabilities);
        Self::new_session(executor, capabilities).await
    }

    /// Attaches to an existing session by id.
    pub fn attach(executor: Arc<dyn CommandExecutor>, session_id: impl Into<String>) -> Self {
        Self::from_session(RemoteSession::attach(executor, session_id))
    }

    pub fn session(&self) -> &RemoteSession {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Ends the session.
    pub async fn quit(&self) -> Result<(), DriverError> {
        self.session.quit().await
    }

    async fn run(&self, command: Command, params: ParameterMap) -> Result<Value, DriverError> {
        Ok(self.session.execute_checked(command, params).await?.value)
    }

    fn wrap(&self, id: ElementId) -> W {
        W::from_remote(self.session.clone(), id)
    }

    async fn find_one(&self, locator: Locator) -> Result<W, DriverError> {
        require_non_blank("value", &locator.value)?;
        let id = self.session.find_element(&locator).await?;
        Ok(self.wrap(id))
    }

    async fn find_many(&self, locator: Locator) -> Result<Vec<W>, DriverError> {
        require_non_blank("value", &locator.value)?;
        let ids = self.session.find_elements(&locator).await?;
        Ok(ids.into_iter().map(|id| self.wrap(id)).collect())
    }

    /// Finds an element with any locator.
    pub async fn find_element(&self, locator: Locator) -> Result<W, DriverError> {
        self.find_one(locator).await
    }

    /// Finds elements with any locator; no match is an empty vector.
    pub async fn find_elements(&self, locator: Locator) -> Result<Vec<W>, DriverError> {
        self.find_many(locator).await
    }

    /// The current foreground activity, or `None` if the server reports none.
    pub async fn current_activity(&self) -> Result<Option<String>, DriverError> {
        let value = self
            .run(Command::GetCurrentActivity, ParameterMap::new())
            .await?;
        Ok(optional_string(value))
    }

    /// Whether the device screen is locked.
    pub async fn is_locked(&self) -> Result<bool, DriverError> {
        let value = self.run(Command::IsLocked, ParameterMap::new()).await?;
        value.as_bool().ok_or_else(|| unexpected("a boolean", &value))
    }

    /// Toggles the device location services setting.
    pub async fn toggle_location_services(&self) -> Result<(), DriverError> {
        self.run(Command::ToggleLocationServices, ParameterMap::new())
            .await?;
        Ok(())
    }

    /// Opens the notification shade.
    pub async fn open_notifications(&self) -> Result<(), DriverError> {
        self.run(Command::OpenNotifications, ParameterMap::new())
            .await?;
        Ok(())
    }

    /// Broadcasts `intent` to end an instrumented coverage run and returns
    /// the base64 contents of the coverage file at `path`, if any.
    pub async fn end_test_coverage(
        &self,
        intent: &str,
        path: &str,
    ) -> Result<Option<String>, DriverError> {
        require_non_blank("intent", intent)?;
        require_non_blank("path", path)?;
        let mut params = ParameterMap::new();
        params.insert("intent".to_string(), Value::String(intent.to_string()));
        params.insert("path".to_string(), Value::String(path.to_string()));
        let value = self.run(Command::EndTestCoverage, params).await?;
        Ok(optional_string(value))
    }

    /// Sets the `ignoreUnimportantViews` driver setting.
    pub async fn ignore_unimportant_views(&self, compress: bool) -> Result<(), DriverError> {
        self.update_setting(IGNORE_UNIMPORTANT_VIEWS, Value::Bool(compress))
            .await
    }

    /// Updates a single driver setting.
    pub async fn update_setting(&self, name: &str, value: Value) -> Result<(), DriverError> {
        require_non_blank("name", name)?;
        let mut settings = ParameterMap::new();
        settings.insert(name.to_string(), value);
        let mut params = ParameterMap::new();
        params.insert("settings".to_string(), Value::Object(settings));
        self.run(Command::UpdateSettings, params).await?;
        Ok(())
    }

    /// All current driver settings.
    pub async fn settings(&self) -> Result<ParameterMap, DriverError> {
        match self.run(Command::GetSettings, ParameterMap::new()).await? {
            Value::Object(settings) => Ok(settings),
            Value::Null => Ok(ParameterMap::new()),
            other => Err(unexpected("an object", &other)),
        }
    }

    /// Scrolls the view with `resource_id` until an element whose
    /// description or text contains `text` is visible.
    pub async fn scroll_to_in(&self, text: &str, resource_id: &str) -> Result<W, DriverError> {
        require_non_blank("text", text)?;
        require_non_blank("resourceId", resource_id)?;
        self.find_one(Locator::android_uiautomator(uiautomator::scroll_to_text(
            text,
            Some(resource_id),
        )))
        .await
    }

    /// Exact-match variant of [`scroll_to_in`](Self::scroll_to_in).
    pub async fn scroll_to_exact_in(
        &self,
        text: &str,
        resource_id: &str,
    ) -> Result<W, DriverError> {
        require_non_blank("text", text)?;
        require_non_blank("resourceId", resource_id)?;
        self.find_one(Locator::android_uiautomator(
            uiautomator::scroll_to_exact_text(text, Some(resource_id)),
        ))
        .await
    }
}

fn optional_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn start_activity_params(
    app_package: &str,
    app_activity: &str,
    app_wait_package: Option<&str>,
    app_wait_activity: Option<&str>,
) -> Result<ParameterMap, DriverError> {
    require_non_blank("appPackage", app_package)?;
    require_non_blank("appActivity", app_activity)?;

    let mut params = ParameterMap::new();
    params.insert("appPackage".to_string(), json!(app_package));
    params.insert("appActivity".to_string(), json!(app_activity));
    params.insert(
        "appWaitPackage".to_string(),
        json!(app_wait_package.unwrap_or("")),
    );
    params.insert(
        "appWaitActivity".to_string(),
        json!(app_wait_activity.unwrap_or("")),
    );
    Ok(params)
}

fn connection_params(connection: ConnectionType) -> ParameterMap {
    let mut params = ParameterMap::new();
    params.insert("name".to_string(), json!("network_connection"));
    params.insert(
        "parameters".to_string(),
        json!({ "type": connection.bitmask() }),
    );
    params
}

#[async_trait]
impl<W: WebElement> FindsByAndroidUiAutomator<W> for AndroidDriver<W> {
    async fn find_element_by_android_uiautomator(&self, selector: &str) -> Result<W, DriverError> {
        self.find_one(Locator::android_uiautomator(selector)).await
    }

    async fn find_elements_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<Vec<W>, DriverError> {
        self.find_many(Locator::android_uiautomator(selector)).await
    }
}

#[async_trait]
impl<W: WebElement> FindsByName<W> for AndroidDriver<W> {
    async fn find_element_by_name(&self, name: &str) -> Result<W, DriverError> {
        self.find_one(Locator::name(name)).await
    }

    async fn find_elements_by_name(&self, name: &str) -> Result<Vec<W>, DriverError> {
        self.find_many(Locator::name(name)).await
    }
}

#[async_trait]
impl<W: WebElement> ScrollsTo<W> for AndroidDriver<W> {}

#[async_trait]
impl<W: WebElement> StartsActivity for AndroidDriver<W> {
    async fn start_activity_and_wait(
        &self,
        app_package: &str,
        app_activity: &str,
        app_wait_package: Option<&str>,
        app_wait_activity: Option<&str>,
    ) -> Result<(), DriverError> {
        let params = start_activity_params(
            app_package,
            app_activity,
            app_wait_package,
            app_wait_activity,
        )?;
        debug!(app_package, app_activity, "starting activity");
        self.run(Command::StartActivity, params).await?;
        Ok(())
    }
}

#[async_trait]
impl<W: WebElement> HasNetworkConnection for AndroidDriver<W> {
    async fn connection_type(&self) -> Result<ConnectionType, DriverError> {
        let value = self
            .run(Command::GetConnectionType, ParameterMap::new())
            .await?;
        let bits = value
            .as_i64()
            .ok_or_else(|| unexpected("a connection bitmask", &value))?;
        Ok(ConnectionType::from(bits))
    }

    async fn set_connection_type(&self, connection: ConnectionType) -> Result<(), DriverError> {
        self.run(Command::SetConnectionType, connection_params(connection))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<W: WebElement> AndroidDeviceActionShortcuts for AndroidDriver<W> {
    async fn key_event(&self, keycode: i32, metastate: i32) -> Result<(), DriverError> {
        let mut params = ParameterMap::new();
        params.insert("keycode".to_string(), json!(keycode));
        params.insert("metastate".to_string(), json!(metastate));
        self.run(Command::KeyEvent, params).await?;
        Ok(())
    }
}

#[async_trait]
impl<W: WebElement> PushesFiles for AndroidDriver<W> {
    async fn push_file(&self, remote_path: &str, base64_data: &str) -> Result<(), DriverError> {
        require_non_blank("path", remote_path)?;
        let mut params = ParameterMap::new();
        params.insert("path".to_string(), json!(remote_path));
        params.insert("data".to_string(), json!(base64_data));
        self.run(Command::PushFile, params).await?;
        Ok(())
    }
}
