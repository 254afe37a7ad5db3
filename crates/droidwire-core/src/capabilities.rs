//! Desired capabilities for new sessions.
//!
//! Capabilities are kept as an ordered JSON map so arbitrary server-specific
//! keys pass through untouched. [`DesiredCapabilities::to_session_params`]
//! produces a new-session body both dialects accept: the legacy
//! `desiredCapabilities` object, plus a W3C `capabilities.alwaysMatch` copy
//! in which non-standard keys carry the `appium:` vendor prefix.

use serde_json::Value;

use crate::protocol::{ParameterMap, ProtocolError};

/// Capability names defined by the W3C specification; everything else needs a
/// vendor prefix in `alwaysMatch`.
const W3C_CAPABILITIES: &[&str] = &[
    "acceptInsecureCerts",
    "browserName",
    "browserVersion",
    "pageLoadStrategy",
    "platformName",
    "proxy",
    "setWindowRect",
    "strictFileInteractability",
    "timeouts",
    "unhandledPromptBehavior",
];

const VENDOR_PREFIX: &str = "appium:";

/// The platform stamped onto every session an Android driver creates.
pub const ANDROID_PLATFORM: &str = "Android";

/// An ordered set of desired capabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredCapabilities(ParameterMap);

impl DesiredCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses capabilities from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        match serde_json::from_str(json).map_err(|e| ProtocolError::InvalidJson(e.to_string()))? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ProtocolError::InvalidBody(format!(
                "capabilities must be a JSON object, got: {other}"
            ))),
        }
    }

    /// Sets a capability, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &ParameterMap {
        &self.0
    }

    pub fn platform_name(self, platform: &str) -> Self {
        self.set("platformName", platform)
    }

    pub fn device_name(self, device: &str) -> Self {
        self.set("deviceName", device)
    }

    pub fn app(self, path: &str) -> Self {
        self.set("app", path)
    }

    pub fn app_package(self, package: &str) -> Self {
        self.set("appPackage", package)
    }

    pub fn app_activity(self, activity: &str) -> Self {
        self.set("appActivity", activity)
    }

    pub fn automation_name(self, name: &str) -> Self {
        self.set("automationName", name)
    }

    pub fn new_command_timeout(self, seconds: u64) -> Self {
        self.set("newCommandTimeout", seconds)
    }

    /// Adds every entry of `defaults` not already set.
    pub fn merge_defaults(mut self, defaults: &ParameterMap) -> Self {
        for (name, value) in defaults {
            if !self.0.contains_key(name) {
                self.0.insert(name.clone(), value.clone());
            }
        }
        self
    }

    /// Builds the `POST /session` body.
    pub fn to_session_params(&self) -> ParameterMap {
        let mut always_match = ParameterMap::new();
        for (name, value) in &self.0 {
            let key = if name.contains(':') || W3C_CAPABILITIES.contains(&name.as_str()) {
                name.clone()
            } else {
                format!("{VENDOR_PREFIX}{name}")
            };
            always_match.insert(key, value.clone());
        }

        let mut capabilities = ParameterMap::new();
        capabilities.insert("alwaysMatch".to_string(), Value::Object(always_match));

        let mut params = ParameterMap::new();
        params.insert(
            "desiredCapabilities".to_string(),
            Value::Object(self.0.clone()),
        );
        params.insert("capabilities".to_string(), Value::Object(capabilities));
        params
    }
}

impl From<ParameterMap> for DesiredCapabilities {
    fn from(map: ParameterMap) -> Self {
        Self(map)
    }
}
