//! # droidwire-core
//!
//! Typed client for the Appium / WebDriver remote protocol on Android.
//!
//! Every operation is a thin translation: typed arguments become a JSON
//! parameter map, the map is dispatched through a [`CommandExecutor`], and
//! the loosely-typed response value is converted back into a Rust type or a
//! [`DriverError`]. Device control itself happens in the Appium server.
//!
//! ## Modules
//!
//! - [`android`] - [`AndroidDriver`], the typed driver
//! - [`driver`] - Capability traits and [`DriverError`]
//! - [`element`] - Element handles
//! - [`session`] - [`RemoteSession`], the per-session dispatch point
//! - [`command`] - Command identifiers and their HTTP routes
//! - [`protocol`] - Response decoding for the JSON-wire and W3C dialects
//! - [`http_client`] - The HTTP [`CommandExecutor`]
//! - [`uiautomator`] - UiScrollable expression builders
//! - [`config`] - Persistent configuration
//!
//! ## Example
//!
//! ```no_run
//! use droidwire_core::android::AndroidDriver;
//! use droidwire_core::capabilities::DesiredCapabilities;
//! use droidwire_core::config::DroidwireConfig;
//! use droidwire_core::driver::ScrollsTo;
//!
//! # async fn example() -> Result<(), droidwire_core::driver::DriverError> {
//! let config = DroidwireConfig::load();
//! let caps = DesiredCapabilities::new()
//!     .device_name("emulator-5554")
//!     .app_package("com.android.settings")
//!     .app_activity(".Settings");
//! let driver: AndroidDriver = AndroidDriver::connect(&config, caps).await?;
//!
//! driver.scroll_to("About phone").await?.click().await?;
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod android;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod capabilities;
pub mod command;
pub mod config;
pub mod connection;
pub mod driver;
pub mod element;
pub mod executor;
pub mod http_client;
pub mod keycode;
pub mod locator;
pub mod protocol;
pub mod session;
pub mod uiautomator;

pub use android::AndroidDriver;
pub use driver::DriverError;
pub use executor::CommandExecutor;
pub use session::RemoteSession;
