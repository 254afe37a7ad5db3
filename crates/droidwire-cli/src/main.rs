//! CLI client for Android automation through an Appium server.
//!
//! Each subcommand maps to one typed driver operation on an existing session.
//!
//! # Usage
//!
//! ```bash
//! # Check the server is up
//! droidwire status
//!
//! # Create a session and remember its id
//! export DROIDWIRE_SESSION=$(droidwire new-session --device-name emulator-5554)
//!
//! # Launch an activity
//! droidwire start-activity com.android.settings .Settings
//!
//! # Read and change the network connection
//! droidwire connection
//! droidwire connection set wifi
//!
//! # Press HOME
//! droidwire key-event home
//!
//! # Find elements
//! droidwire find 'new UiSelector().text("Wi-Fi")'
//! droidwire find --by name --all "Battery"
//!
//! # Scroll until an item is visible and tap it
//! droidwire scroll-to "About phone" --click
//!
//! # Upload a file
//! droidwire push-file /data/local/tmp/fixture.json ./fixture.json
//!
//! # End the session
//! droidwire quit
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use droidwire_core::capabilities::DesiredCapabilities;
use droidwire_core::config::DroidwireConfig;
use droidwire_core::connection::ConnectionType;
use droidwire_core::driver::{
    AndroidDeviceActionShortcuts, DriverError, HasNetworkConnection, PushesFiles, ScrollsTo,
    StartsActivity,
};
use droidwire_core::element::{AndroidElement, WebElement};
use droidwire_core::executor::TransportError;
use droidwire_core::http_client::HttpCommandExecutor;
use droidwire_core::keycode::keycode_by_name;
use droidwire_core::locator::{Locator, LocatorStrategy};
use droidwire_core::session::server_status;
use droidwire_core::AndroidDriver;

/// CLI client for Android automation through an Appium server.
#[derive(Parser)]
#[command(name = "droidwire")]
#[command(about = "Drive an Android device through an Appium server")]
#[command(version)]
struct Cli {
    /// Appium server base URL (overrides ~/.droidwire/config.json)
    #[arg(long, env = "DROIDWIRE_SERVER_URL")]
    server: Option<String>,

    /// Id of the session to drive
    #[arg(short, long, env = "DROIDWIRE_SESSION")]
    session: Option<String>,

    /// Per-command timeout in milliseconds
    #[arg(short, long, env = "DROIDWIRE_COMMAND_TIMEOUT_MS")]
    timeout: Option<u64>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum FindBy {
    Uiautomator,
    Name,
    Id,
    AccessibilityId,
    ClassName,
    Xpath,
}

impl From<FindBy> for LocatorStrategy {
    fn from(by: FindBy) -> Self {
        match by {
            FindBy::Uiautomator => LocatorStrategy::AndroidUiAutomator,
            FindBy::Name => LocatorStrategy::Name,
            FindBy::Id => LocatorStrategy::Id,
            FindBy::AccessibilityId => LocatorStrategy::AccessibilityId,
            FindBy::ClassName => LocatorStrategy::ClassName,
            FindBy::Xpath => LocatorStrategy::XPath,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Query the server status
    Status,

    /// Create a new session and print its id
    NewSession {
        /// Device name capability
        #[arg(long)]
        device_name: Option<String>,
        /// Path or URL of the app to install
        #[arg(long)]
        app: Option<String>,
        /// Package of the app under test
        #[arg(long)]
        app_package: Option<String>,
        /// Activity to launch
        #[arg(long)]
        app_activity: Option<String>,
        /// Extra capabilities as a JSON object
        #[arg(long)]
        caps: Option<String>,
    },

    /// Delete the session
    Quit,

    /// Start an activity
    StartActivity {
        /// Application package, e.g. com.android.settings
        package: String,
        /// Activity name, e.g. .Settings
        activity: String,
        /// Package to wait for
        #[arg(long)]
        wait_package: Option<String>,
        /// Activity to wait for
        #[arg(long)]
        wait_activity: Option<String>,
    },

    /// Print the current foreground activity
    CurrentActivity,

    /// Show or change the network connection
    Connection {
        #[command(subcommand)]
        action: Option<ConnectionAction>,
    },

    /// Press a hardware key
    KeyEvent {
        /// Key name (home, back, enter, ...) or numeric key code
        key: String,
        /// Meta-state flags
        #[arg(short, long, default_value_t = 0)]
        metastate: i32,
    },

    /// Toggle location services
    ToggleLocation,

    /// Print whether the device is locked
    IsLocked,

    /// Upload a local file to the device
    PushFile {
        /// Destination path on the device
        remote_path: String,
        /// Local file to upload
        local_path: PathBuf,
    },

    /// Open the notification shade
    OpenNotifications,

    /// Find elements and print their ids
    Find {
        /// Selector value
        selector: String,
        /// Locator strategy
        #[arg(short, long, value_enum, default_value = "uiautomator")]
        by: FindBy,
        /// Return every match instead of the first
        #[arg(short, long)]
        all: bool,
    },

    /// Scroll until an element with the given text is visible
    ScrollTo {
        /// Text to look for
        text: String,
        /// Match the whole text instead of a substring
        #[arg(long)]
        exact: bool,
        /// Resource id of the scrollable view
        #[arg(long)]
        resource_id: Option<String>,
        /// Click the element once found
        #[arg(long)]
        click: bool,
    },

    /// Set the ignoreUnimportantViews setting
    IgnoreUnimportantViews {
        /// true or false
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConnectionAction {
    /// Set the connection type (none, airplane, wifi, data, all, or a bitmask)
    Set { value: ConnectionType },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_logging(log_file: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file.and_then(|path| Some((path.parent()?, path.file_name()?))) {
        Some((dir, name)) => {
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            let file_appender = tracing_appender::rolling::never(dir, name);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file_appender)
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[derive(Debug)]
enum CliError {
    Connection(String),
    ActionFailed(String),
    Protocol(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Connection(_) => ExitCode::from(2),
            CliError::ActionFailed(_) => ExitCode::from(1),
            CliError::Protocol(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Connection(msg) => write!(f, "Connection error: {}", msg),
            CliError::ActionFailed(msg) => write!(f, "Action failed: {}", msg),
            CliError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
        }
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Protocol(_) | TransportError::MissingPathParameter { .. } => {
                CliError::Protocol(e.to_string())
            }
            _ => CliError::Connection(e.to_string()),
        }
    }
}

impl From<DriverError> for CliError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::Transport(inner) => inner.into(),
            DriverError::UnexpectedValue { .. } | DriverError::Json(_) | DriverError::NoSession => {
                CliError::Protocol(e.to_string())
            }
            _ => CliError::ActionFailed(e.to_string()),
        }
    }
}

struct Output {
    format: OutputFormat,
}

impl Output {
    /// Prints `text` in text mode (nothing when `None`) or `json` in json mode.
    fn emit(&self, text: Option<String>, json: Value) {
        match self.format {
            OutputFormat::Json => println!("{json:#}"),
            OutputFormat::Text => {
                if let Some(text) = text {
                    println!("{text}");
                }
            }
        }
    }

    fn done(&self) {
        self.emit(None, json!({ "success": true }));
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Commands that need no server
    if let Command::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "droidwire", &mut std::io::stdout());
        return Ok(());
    }

    let config = DroidwireConfig::load()
        .with_overrides(cli.server.clone(), cli.timeout.map(|ms| ms.to_string()));
    let executor = Arc::new(HttpCommandExecutor::from_config(&config)?);
    let out = Output { format: cli.format };
    debug!(server = executor.base_url(), "using server");

    // Commands that need no session
    match cli.command {
        Command::Status => {
            let status = server_status(executor.as_ref()).await?;
            out.emit(Some(status.to_string()), status);
            return Ok(());
        }
        Command::NewSession {
            ref device_name,
            ref app,
            ref app_package,
            ref app_activity,
            ref caps,
        } => {
            let mut capabilities = match caps {
                Some(json) => DesiredCapabilities::from_json(json)
                    .map_err(|e| CliError::ActionFailed(format!("invalid --caps: {}", e)))?,
                None => DesiredCapabilities::new(),
            };
            for (name, value) in [
                ("deviceName", device_name),
                ("app", app),
                ("appPackage", app_package),
                ("appActivity", app_activity),
            ] {
                if let Some(value) = value {
                    capabilities = capabilities.set(name, value.as_str());
                }
            }
            let capabilities = capabilities.merge_defaults(&config.default_capabilities);
            let driver: AndroidDriver = AndroidDriver::new_session(executor, capabilities).await?;
            out.emit(
                Some(driver.session_id().to_string()),
                json!({ "sessionId": driver.session_id() }),
            );
            return Ok(());
        }
        _ => {} // Fall through to session commands
    }

    let session_id = cli.session.clone().ok_or_else(|| {
        CliError::ActionFailed(
            "no session; pass --session or set DROIDWIRE_SESSION".to_string(),
        )
    })?;
    let driver: AndroidDriver = AndroidDriver::attach(executor, session_id);

    match cli.command {
        Command::Quit => {
            driver.quit().await?;
            out.done();
        }
        Command::StartActivity {
            ref package,
            ref activity,
            ref wait_package,
            ref wait_activity,
        } => {
            driver
                .start_activity_and_wait(
                    package,
                    activity,
                    wait_package.as_deref(),
                    wait_activity.as_deref(),
                )
                .await?;
            out.done();
        }
        Command::CurrentActivity => {
            let activity = driver.current_activity().await?;
            out.emit(activity.clone(), json!({ "activity": activity }));
        }
        Command::Connection { ref action } => {
            if let Some(ConnectionAction::Set { value }) = action {
                driver.set_connection_type(*value).await?;
            }
            let connection = driver.connection_type().await?;
            out.emit(
                Some(connection.to_string()),
                json!({
                    "connection": connection.to_string(),
                    "bitmask": connection.bitmask(),
                    "airplaneMode": connection.airplane_mode(),
                    "wifi": connection.wifi(),
                    "data": connection.data(),
                }),
            );
        }
        Command::KeyEvent { ref key, metastate } => {
            let keycode = keycode_by_name(key)
                .or_else(|| key.parse().ok())
                .ok_or_else(|| CliError::ActionFailed(format!("unknown key `{}`", key)))?;
            driver.key_event(keycode, metastate).await?;
            out.done();
        }
        Command::ToggleLocation => {
            driver.toggle_location_services().await?;
            out.done();
        }
        Command::IsLocked => {
            let locked = driver.is_locked().await?;
            out.emit(Some(locked.to_string()), json!({ "locked": locked }));
        }
        Command::PushFile {
            ref remote_path,
            ref local_path,
        } => {
            let bytes = std::fs::read(local_path).map_err(|e| {
                CliError::ActionFailed(format!("failed to read {}: {}", local_path.display(), e))
            })?;
            driver.push_file_bytes(remote_path, &bytes).await?;
            out.done();
        }
        Command::OpenNotifications => {
            driver.open_notifications().await?;
            out.done();
        }
        Command::Find {
            ref selector,
            by,
            all,
        } => {
            let locator = Locator::new(by.into(), selector.as_str());
            let elements = if all {
                driver.find_elements(locator).await?
            } else {
                vec![driver.find_element(locator).await?]
            };
            print_elements(&out, &elements);
        }
        Command::ScrollTo {
            ref text,
            exact,
            ref resource_id,
            click,
        } => {
            let element = match (exact, resource_id) {
                (false, None) => driver.scroll_to(text).await?,
                (true, None) => driver.scroll_to_exact(text).await?,
                (false, Some(id)) => driver.scroll_to_in(text, id).await?,
                (true, Some(id)) => driver.scroll_to_exact_in(text, id).await?,
            };
            if click {
                element.click().await?;
            }
            print_elements(&out, std::slice::from_ref(&element));
        }
        Command::IgnoreUnimportantViews { enabled } => {
            driver.ignore_unimportant_views(enabled).await?;
            out.done();
        }
        // These commands are handled above
        Command::Status | Command::NewSession { .. } | Command::Completions { .. } => unreachable!(),
    }

    Ok(())
}

fn print_elements(out: &Output, elements: &[AndroidElement]) {
    let ids: Vec<&str> = elements.iter().map(|e| e.id().as_str()).collect();
    let text = (!ids.is_empty()).then(|| ids.join("\n"));
    out.emit(text, json!({ "elements": ids }));
}
