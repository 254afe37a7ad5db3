//! Remote command identifiers and their HTTP dispatch table.
//!
//! Every operation the client can issue is a [`Command`] variant. The variant
//! maps to exactly one [`CommandSpec`] (HTTP method plus path template)
//! through [`Command::spec`], so adding a command means adding one variant and
//! one table row.
//!
//! Path templates contain `{placeholder}` segments. The transport fills them
//! from the request's parameter map and removes the consumed keys before the
//! remaining map is sent as the JSON body.

use crate::protocol::ParameterMap;

/// HTTP method used by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// The HTTP shape of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub method: HttpMethod,
    pub path: &'static str,
}

const fn get(path: &'static str) -> CommandSpec {
    CommandSpec {
        method: HttpMethod::Get,
        path,
    }
}

const fn post(path: &'static str) -> CommandSpec {
    CommandSpec {
        method: HttpMethod::Post,
        path,
    }
}

const fn delete(path: &'static str) -> CommandSpec {
    CommandSpec {
        method: HttpMethod::Delete,
        path,
    }
}

/// A named remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // Server and session
    Status,
    NewSession,
    DeleteSession,

    // Element lookup
    FindElement,
    FindElements,
    FindChildElement,
    FindChildElements,

    // Element interaction
    ClickElement,
    ClearElement,
    SendKeysToElement,
    GetElementText,
    GetElementAttribute,
    IsElementDisplayed,
    IsElementEnabled,

    // Appium device commands
    StartActivity,
    GetCurrentActivity,
    GetConnectionType,
    SetConnectionType,
    KeyEvent,
    ToggleLocationServices,
    IsLocked,
    EndTestCoverage,
    PushFile,
    OpenNotifications,
    GetSettings,
    UpdateSettings,
}

impl Command {
    /// Returns the HTTP method and path template for this command.
    pub fn spec(self) -> CommandSpec {
        match self {
            Command::Status => get("/status"),
            Command::NewSession => post("/session"),
            Command::DeleteSession => delete("/session/{sessionId}"),

            Command::FindElement => post("/session/{sessionId}/element"),
            Command::FindElements => post("/session/{sessionId}/elements"),
            Command::FindChildElement => post("/session/{sessionId}/element/{id}/element"),
            Command::FindChildElements => post("/session/{sessionId}/element/{id}/elements"),

            Command::ClickElement => post("/session/{sessionId}/element/{id}/click"),
            Command::ClearElement => post("/session/{sessionId}/element/{id}/clear"),
            Command::SendKeysToElement => post("/session/{sessionId}/element/{id}/value"),
            Command::GetElementText => get("/session/{sessionId}/element/{id}/text"),
            Command::GetElementAttribute => {
                get("/session/{sessionId}/element/{id}/attribute/{name}")
            }
            Command::IsElementDisplayed => get("/session/{sessionId}/element/{id}/displayed"),
            Command::IsElementEnabled => get("/session/{sessionId}/element/{id}/enabled"),

            Command::StartActivity => post("/session/{sessionId}/appium/device/start_activity"),
            Command::GetCurrentActivity => {
                get("/session/{sessionId}/appium/device/current_activity")
            }
            Command::GetConnectionType => get("/session/{sessionId}/network_connection"),
            Command::SetConnectionType => post("/session/{sessionId}/network_connection"),
            Command::KeyEvent => post("/session/{sessionId}/appium/device/keyevent"),
            Command::ToggleLocationServices => {
                post("/session/{sessionId}/appium/device/toggle_location_services")
            }
            Command::IsLocked => post("/session/{sessionId}/appium/device/is_locked"),
            Command::EndTestCoverage => post("/session/{sessionId}/appium/app/end_test_coverage"),
            Command::PushFile => post("/session/{sessionId}/appium/device/push_file"),
            Command::OpenNotifications => {
                post("/session/{sessionId}/appium/device/open_notifications")
            }
            Command::GetSettings => get("/session/{sessionId}/appium/settings"),
            Command::UpdateSettings => post("/session/{sessionId}/appium/settings"),
        }
    }

    /// Returns a short, static name for this command suitable for tracing
    /// span metadata.
    pub fn name(self) -> &'static str {
        match self {
            Command::Status => "status",
            Command::NewSession => "new_session",
            Command::DeleteSession => "delete_session",
            Command::FindElement => "find_element",
            Command::FindElements => "find_elements",
            Command::FindChildElement => "find_child_element",
            Command::FindChildElements => "find_child_elements",
            Command::ClickElement => "click_element",
            Command::ClearElement => "clear_element",
            Command::SendKeysToElement => "send_keys_to_element",
            Command::GetElementText => "get_element_text",
            Command::GetElementAttribute => "get_element_attribute",
            Command::IsElementDisplayed => "is_element_displayed",
            Command::IsElementEnabled => "is_element_enabled",
            Command::StartActivity => "start_activity",
            Command::GetCurrentActivity => "get_current_activity",
            Command::GetConnectionType => "get_connection_type",
            Command::SetConnectionType => "set_connection_type",
            Command::KeyEvent => "key_event",
            Command::ToggleLocationServices => "toggle_location_services",
            Command::IsLocked => "is_locked",
            Command::EndTestCoverage => "end_test_coverage",
            Command::PushFile => "push_file",
            Command::OpenNotifications => "open_notifications",
            Command::GetSettings => "get_settings",
            Command::UpdateSettings => "update_settings",
        }
    }
}

/// A command together with its parameters, ready for dispatch.
///
/// Path placeholders (`sessionId`, `id`, `name`) travel in `params` and are
/// consumed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub command: Command,
    pub params: ParameterMap,
}

impl CommandRequest {
    pub fn new(command: Command, params: ParameterMap) -> Self {
        Self { command, params }
    }

    /// A request with no parameters.
    pub fn bare(command: Command) -> Self {
        Self::new(command, ParameterMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appium_device_commands_match_server_routes() {
        assert_eq!(
            Command::StartActivity.spec(),
            post("/session/{sessionId}/appium/device/start_activity")
        );
        assert_eq!(
            Command::GetConnectionType.spec(),
            get("/session/{sessionId}/network_connection")
        );
        assert_eq!(
            Command::SetConnectionType.spec(),
            post("/session/{sessionId}/network_connection")
        );
        assert_eq!(
            Command::IsLocked.spec().method,
            HttpMethod::Post,
            "is_locked is a POST on the Appium server"
        );
        assert_eq!(
            Command::GetCurrentActivity.spec().method,
            HttpMethod::Get
        );
    }

    #[test]
    fn session_scoped_commands_carry_session_placeholder() {
        let session_scoped = [
            Command::DeleteSession,
            Command::FindElement,
            Command::FindElements,
            Command::ClickElement,
            Command::KeyEvent,
            Command::PushFile,
            Command::UpdateSettings,
        ];
        for command in session_scoped {
            assert!(
                command.spec().path.contains("{sessionId}"),
                "{} should be session scoped",
                command.name()
            );
        }
        assert!(!Command::Status.spec().path.contains("{sessionId}"));
        assert!(!Command::NewSession.spec().path.contains("{sessionId}"));
    }

    #[test]
    fn element_commands_carry_id_placeholder() {
        assert!(Command::FindChildElements.spec().path.contains("{id}"));
        assert!(Command::GetElementAttribute.spec().path.ends_with("{name}"));
    }

    #[test]
    fn method_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn bare_request_has_no_params() {
        let request = CommandRequest::bare(Command::OpenNotifications);
        assert!(request.params.is_empty());
        assert_eq!(request.command.name(), "open_notifications");
    }
}
