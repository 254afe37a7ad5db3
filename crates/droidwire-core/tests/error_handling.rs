//! Failure paths: precondition checks, remote failures and transport errors.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::{spy_driver, MockAppium, RecordingExecutor};
use droidwire_core::command::Command;
use droidwire_core::driver::{DriverError, FindsByName, PushesFiles, ScrollsTo, StartsActivity};
use droidwire_core::executor::TransportError;
use droidwire_core::http_client::HttpCommandExecutor;
use droidwire_core::protocol::{CommandResponse, ProtocolError, ResponseStatus};
use droidwire_core::AndroidDriver;

// ---------------------------------------------------------------------------
// Preconditions are checked before dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_app_package_never_dispatches() {
    let spy = RecordingExecutor::new();
    let driver = spy_driver(&spy);

    let err = driver.start_activity("", ".Settings").await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::InvalidArgument {
            name: "appPackage",
            ..
        }
    ));
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn blank_app_activity_never_dispatches() {
    let spy = RecordingExecutor::new();
    let driver = spy_driver(&spy);

    let err = driver
        .start_activity_and_wait("com.android.settings", "   ", Some("x"), None)
        .await
        .unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn other_blank_arguments_never_dispatch() {
    let spy = RecordingExecutor::new();
    let driver = spy_driver(&spy);

    assert!(driver.find_element_by_name("").await.unwrap_err().is_precondition());
    assert!(driver.scroll_to(" ").await.unwrap_err().is_precondition());
    assert!(driver.push_file("", "aGk=").await.unwrap_err().is_precondition());
    assert!(driver
        .end_test_coverage("", "/sdcard/coverage.ec")
        .await
        .unwrap_err()
        .is_precondition());
    assert_eq!(spy.call_count(), 0);
}

#[tokio::test]
async fn valid_start_activity_dispatches_once() {
    let spy = RecordingExecutor::new();
    let driver = spy_driver(&spy);

    driver
        .start_activity("com.android.settings", ".Settings")
        .await
        .unwrap();

    let requests = spy.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command, Command::StartActivity);
    assert_eq!(requests[0].params["sessionId"], "spy-session");
    assert_eq!(requests[0].params.len(), 5);
}

// ---------------------------------------------------------------------------
// Remote failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn legacy_failure_status_surfaces_as_remote_error() {
    let spy = RecordingExecutor::new();
    spy.push_response(CommandResponse::failure(
        ResponseStatus::UnhandledError,
        "device offline",
    ));
    let driver = spy_driver(&spy);

    match driver.toggle_location_services().await.unwrap_err() {
        DriverError::Remote { status, message } => {
            assert_eq!(status, ResponseStatus::UnhandledError);
            assert_eq!(message, "device offline");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn w3c_error_surfaces_as_remote_error() {
    let mock = MockAppium::start().await;
    mock.reply(
        "POST",
        "appium/device/is_locked",
        500,
        json!({"value": {"error": "unknown error", "message": "adb died"}}),
    );

    match mock.driver().is_locked().await.unwrap_err() {
        DriverError::Remote { status, message } => {
            assert_eq!(status, ResponseStatus::UnhandledError);
            assert_eq!(message, "adb died");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unrouted_command_is_unknown_command() {
    let mock = MockAppium::start().await;

    match mock.driver().open_notifications().await.unwrap_err() {
        DriverError::Remote { status, .. } => assert_eq!(status, ResponseStatus::UnknownCommand),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn absent_activity_is_not_an_error_but_failure_is() {
    let spy = RecordingExecutor::new();
    spy.push_response(CommandResponse::success(serde_json::Value::Null));
    spy.push_response(CommandResponse::failure(
        ResponseStatus::NoSuchSession,
        "session gone",
    ));
    let driver = spy_driver(&spy);

    assert_eq!(driver.current_activity().await.unwrap(), None);
    assert!(matches!(
        driver.current_activity().await.unwrap_err(),
        DriverError::Remote {
            status: ResponseStatus::NoSuchSession,
            ..
        }
    ));
}

// ---------------------------------------------------------------------------
// Transport failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_body_is_protocol_error() {
    let mock = MockAppium::start().await;
    mock.reply_raw("POST", "appium/device/is_locked", 200, "<html>oops</html>");

    let err = mock.driver().is_locked().await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Transport(TransportError::Protocol(ProtocolError::InvalidJson(_)))
    ));
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    // Bind then drop a listener to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let executor = Arc::new(
        HttpCommandExecutor::with_timeout(
            format!("http://127.0.0.1:{port}/wd/hub"),
            Duration::from_secs(2),
        )
        .unwrap(),
    );
    let driver: AndroidDriver = AndroidDriver::attach(executor, "gone");

    let err = driver.is_locked().await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Transport(TransportError::ConnectionFailed(_))
    ));
}

#[test]
fn invalid_server_url_is_rejected() {
    let err = HttpCommandExecutor::new("ftp://device:4723").unwrap_err();
    assert!(matches!(err, TransportError::InvalidUrl { .. }));
}
