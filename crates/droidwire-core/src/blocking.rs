//! Synchronous wrapper around [`AndroidDriver`] for callers without an async
//! runtime.

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::android::AndroidDriver;
use crate::capabilities::DesiredCapabilities;
use crate::config::DroidwireConfig;
use crate::connection::ConnectionType;
use crate::driver::{
    AndroidDeviceActionShortcuts, DriverError, FindsByAndroidUiAutomator, FindsByName,
    HasNetworkConnection, PushesFiles, ScrollsTo, StartsActivity,
};
use crate::element::AndroidElement;
use crate::executor::CommandExecutor;
use crate::protocol::ParameterMap;

fn runtime() -> Result<Runtime, DriverError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| DriverError::Runtime(err.to_string()))
}

/// A blocking [`AndroidDriver`] with its own current-thread runtime.
#[derive(Debug)]
pub struct BlockingAndroidDriver {
    runtime: Runtime,
    inner: AndroidDriver<AndroidElement>,
}

impl BlockingAndroidDriver {
    pub fn new_session(
        executor: Arc<dyn CommandExecutor>,
        capabilities: DesiredCapabilities,
    ) -> Result<Self, DriverError> {
        let runtime = runtime()?;
        let inner = runtime.block_on(AndroidDriver::new_session(executor, capabilities))?;
        Ok(Self { runtime, inner })
    }

    pub fn connect(
        config: &DroidwireConfig,
        capabilities: DesiredCapabilities,
    ) -> Result<Self, DriverError> {
        let runtime = runtime()?;
        let inner = runtime.block_on(AndroidDriver::connect(config, capabilities))?;
        Ok(Self { runtime, inner })
    }

    pub fn attach(
        executor: Arc<dyn CommandExecutor>,
        session_id: impl Into<String>,
    ) -> Result<Self, DriverError> {
        Ok(Self {
            runtime: runtime()?,
            inner: AndroidDriver::attach(executor, session_id),
        })
    }

    pub fn inner(&self) -> &AndroidDriver<AndroidElement> {
        &self.inner
    }

    /// Runs any async operation of the inner driver to completion, e.g.
    /// element methods.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn session_id(&self) -> &str {
        self.inner.session_id()
    }

    pub fn quit(&self) -> Result<(), DriverError> {
        self.block_on(self.inner.quit())
    }

    pub fn start_activity(&self, app_package: &str, app_activity: &str) -> Result<(), DriverError> {
        self.block_on(self.inner.start_activity(app_package, app_activity))
    }

    pub fn start_activity_and_wait(
        &self,
        app_package: &str,
        app_activity: &str,
        app_wait_package: Option<&str>,
        app_wait_activity: Option<&str>,
    ) -> Result<(), DriverError> {
        self.block_on(self.inner.start_activity_and_wait(
            app_package,
            app_activity,
            app_wait_package,
            app_wait_activity,
        ))
    }

    pub fn current_activity(&self) -> Result<Option<String>, DriverError> {
        self.block_on(self.inner.current_activity())
    }

    pub fn connection_type(&self) -> Result<ConnectionType, DriverError> {
        self.block_on(self.inner.connection_type())
    }

    pub fn set_connection_type(&self, connection: ConnectionType) -> Result<(), DriverError> {
        self.block_on(self.inner.set_connection_type(connection))
    }

    pub fn key_event(&self, keycode: i32, metastate: i32) -> Result<(), DriverError> {
        self.block_on(self.inner.key_event(keycode, metastate))
    }

    pub fn toggle_location_services(&self) -> Result<(), DriverError> {
        self.block_on(self.inner.toggle_location_services())
    }

    pub fn is_locked(&self) -> Result<bool, DriverError> {
        self.block_on(self.inner.is_locked())
    }

    pub fn end_test_coverage(&self, intent: &str, path: &str) -> Result<Option<String>, DriverError> {
        self.block_on(self.inner.end_test_coverage(intent, path))
    }

    pub fn push_file(&self, remote_path: &str, base64_data: &str) -> Result<(), DriverError> {
        self.block_on(self.inner.push_file(remote_path, base64_data))
    }

    pub fn push_file_bytes(&self, remote_path: &str, bytes: &[u8]) -> Result<(), DriverError> {
        self.block_on(self.inner.push_file_bytes(remote_path, bytes))
    }

    pub fn open_notifications(&self) -> Result<(), DriverError> {
        self.block_on(self.inner.open_notifications())
    }

    pub fn ignore_unimportant_views(&self, compress: bool) -> Result<(), DriverError> {
        self.block_on(self.inner.ignore_unimportant_views(compress))
    }

    pub fn update_setting(&self, name: &str, value: Value) -> Result<(), DriverError> {
        self.block_on(self.inner.update_setting(name, value))
    }

    pub fn settings(&self) -> Result<ParameterMap, DriverError> {
        self.block_on(self.inner.settings())
    }

    pub fn find_element_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<AndroidElement, DriverError> {
        self.block_on(self.inner.find_element_by_android_uiautomator(selector))
    }

    pub fn find_elements_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<Vec<AndroidElement>, DriverError> {
        self.block_on(self.inner.find_elements_by_android_uiautomator(selector))
    }

    pub fn find_element_by_name(&self, name: &str) -> Result<AndroidElement, DriverError> {
        self.block_on(self.inner.find_element_by_name(name))
    }

    pub fn find_elements_by_name(&self, name: &str) -> Result<Vec<AndroidElement>, DriverError> {
        self.block_on(self.inner.find_elements_by_name(name))
    }

    pub fn scroll_to(&self, text: &str) -> Result<AndroidElement, DriverError> {
        self.block_on(self.inner.scroll_to(text))
    }

    pub fn scroll_to_exact(&self, text: &str) -> Result<AndroidElement, DriverError> {
        self.block_on(self.inner.scroll_to_exact(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandRequest;
    use crate::executor::TransportError;
    use crate::protocol::CommandResponse;
    use async_trait::async_trait;
    use serde_json::json;

    struct LockedExecutor;

    #[async_trait]
    impl CommandExecutor for LockedExecutor {
        async fn execute(&self, request: CommandRequest) -> Result<CommandResponse, TransportError> {
            assert_eq!(request.params["sessionId"], json!("sync"));
            Ok(CommandResponse::success(json!(true)))
        }
    }

    #[test]
    fn blocking_driver_runs_without_caller_runtime() {
        let driver = BlockingAndroidDriver::attach(Arc::new(LockedExecutor), "sync").unwrap();
        assert_eq!(driver.session_id(), "sync");
        assert!(driver.is_locked().unwrap());
    }

    #[test]
    fn blocking_preconditions_fail_fast() {
        let driver = BlockingAndroidDriver::attach(Arc::new(LockedExecutor), "sync").unwrap();
        let err = driver.start_activity("", ".Main").unwrap_err();
        assert!(err.is_precondition());
    }
}
