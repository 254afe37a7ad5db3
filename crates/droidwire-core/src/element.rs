//! Element handles.
//!
//! An element is nothing more than a server-issued id plus the session it
//! belongs to. There is no local state to go stale; every accessor is a
//! round trip.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::command::Command;
use crate::driver::{require_non_blank, DriverError, FindsByAndroidUiAutomator};
use crate::locator::Locator;
use crate::protocol::ParameterMap;
use crate::session::{unexpected, RemoteSession};

/// Opaque element id issued by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Adds this id as the `{id}` path parameter of `params`.
    pub(crate) fn with_params(&self, mut params: ParameterMap) -> ParameterMap {
        params.insert("id".to_string(), Value::String(self.0.clone()));
        params
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal capability set of an element handle type.
///
/// Drivers are generic over this trait so callers can wrap element ids in
/// their own types.
pub trait WebElement: Send + Sync + Sized + 'static {
    /// Builds a handle for element `id` in `session`.
    fn from_remote(session: RemoteSession, id: ElementId) -> Self;

    fn id(&self) -> &ElementId;
}

/// The default element handle used by
/// [`AndroidDriver`](crate::android::AndroidDriver).
#[derive(Debug, Clone)]
pub struct AndroidElement {
    session: RemoteSession,
    id: ElementId,
}

impl WebElement for AndroidElement {
    fn from_remote(session: RemoteSession, id: ElementId) -> Self {
        Self { session, id }
    }

    fn id(&self) -> &ElementId {
        &self.id
    }
}

impl AndroidElement {
    fn params(&self) -> ParameterMap {
        self.id.with_params(ParameterMap::new())
    }

    async fn run(&self, command: Command, params: ParameterMap) -> Result<Value, DriverError> {
        Ok(self.session.execute_checked(command, params).await?.value)
    }

    async fn flag(&self, command: Command) -> Result<bool, DriverError> {
        let value = self.run(command, self.params()).await?;
        value.as_bool().ok_or_else(|| unexpected("a boolean", &value))
    }

    pub async fn click(&self) -> Result<(), DriverError> {
        self.run(Command::ClickElement, self.params()).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), DriverError> {
        self.run(Command::ClearElement, self.params()).await?;
        Ok(())
    }

    /// The visible text of the element; empty when it has none.
    pub async fn text(&self) -> Result<String, DriverError> {
        let value = self.run(Command::GetElementText, self.params()).await?;
        match value {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            other => Err(unexpected("a string", &other)),
        }
    }

    /// Types `text` into the element.
    ///
    /// Sends both the W3C `text` field and the legacy `value` character
    /// array.
    pub async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        let mut params = self.params();
        params.insert("text".to_string(), Value::String(text.to_string()));
        params.insert(
            "value".to_string(),
            Value::Array(text.chars().map(|c| Value::String(c.to_string())).collect()),
        );
        self.run(Command::SendKeysToElement, params).await?;
        Ok(())
    }

    /// Reads an element attribute; `None` when the attribute is unset.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        require_non_blank("name", name)?;
        let mut params = self.params();
        params.insert("name".to_string(), Value::String(name.to_string()));
        let value = self.run(Command::GetElementAttribute, params).await?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }

    pub async fn is_displayed(&self) -> Result<bool, DriverError> {
        self.flag(Command::IsElementDisplayed).await
    }

    pub async fn is_enabled(&self) -> Result<bool, DriverError> {
        self.flag(Command::IsElementEnabled).await
    }
}

#[async_trait]
impl FindsByAndroidUiAutomator<AndroidElement> for AndroidElement {
    async fn find_element_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<AndroidElement, DriverError> {
        require_non_blank("selector", selector)?;
        let id = self
            .session
            .find_child_element(&self.id, &Locator::android_uiautomator(selector))
            .await?;
        Ok(AndroidElement::from_remote(self.session.clone(), id))
    }

    async fn find_elements_by_android_uiautomator(
        &self,
        selector: &str,
    ) -> Result<Vec<AndroidElement>, DriverError> {
        require_non_blank("selector", selector)?;
        let ids = self
            .session
            .find_child_elements(&self.id, &Locator::android_uiautomator(selector))
            .await?;
        Ok(ids
            .into_iter()
            .map(|id| AndroidElement::from_remote(self.session.clone(), id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_params_adds_id() {
        let id = ElementId::new("42");
        let params = id.with_params(ParameterMap::new());
        assert_eq!(params["id"], Value::String("42".to_string()));
        assert_eq!(id.to_string(), "42");
    }
}
