//! Element locators: a strategy name plus a selector value.

use serde_json::Value;

use crate::protocol::ParameterMap;

/// Locator strategies understood by the Appium Android drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorStrategy {
    AndroidUiAutomator,
    Name,
    Id,
    AccessibilityId,
    ClassName,
    XPath,
}

impl LocatorStrategy {
    /// The wire name of the strategy (the `using` field).
    pub fn as_str(self) -> &'static str {
        match self {
            LocatorStrategy::AndroidUiAutomator => "-android uiautomator",
            LocatorStrategy::Name => "name",
            LocatorStrategy::Id => "id",
            LocatorStrategy::AccessibilityId => "accessibility id",
            LocatorStrategy::ClassName => "class name",
            LocatorStrategy::XPath => "xpath",
        }
    }

    /// Parse a strategy from its wire name.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "-android uiautomator" => Some(Self::AndroidUiAutomator),
            "name" => Some(Self::Name),
            "id" => Some(Self::Id),
            "accessibility id" => Some(Self::AccessibilityId),
            "class name" => Some(Self::ClassName),
            "xpath" => Some(Self::XPath),
            _ => None,
        }
    }
}

/// A `(strategy, value)` pair describing how to find an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub value: String,
}

impl Locator {
    pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn android_uiautomator(selector: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AndroidUiAutomator, selector)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Name, name)
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::Id, id)
    }

    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::AccessibilityId, id)
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::ClassName, class)
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::new(LocatorStrategy::XPath, expression)
    }

    /// The `{using, value}` parameter map sent with find commands.
    pub fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert(
            "using".to_string(),
            Value::String(self.strategy.as_str().to_string()),
        );
        params.insert("value".to_string(), Value::String(self.value.clone()));
        params
    }
}
