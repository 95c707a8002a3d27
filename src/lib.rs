//! Game Automation - UI and API test harness for a tic-tac-toe web game
//!
//! This library provides the pieces the test suites compose:
//! - Driver factory dispatching (OS, browser) pairs to WebDriver sessions
//! - A stateless browser wrapper with soft-fail bounded waits
//! - An API client for the application's static resources
//! - Operation tracing with per-run log files
//! - Per-test fixtures for session lifecycle and timing

pub mod api;
pub mod browser;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod page;
pub mod platform;
pub mod trace;

pub use api::{ApiClient, ManifestBody, ResponseMeta};
pub use config::Config;
pub use driver::server::ServerHandle;
pub use driver::{BrowserName, DriverFactory, DriverSession};
pub use error::{AutomationError, Result};
pub use fixtures::{api_client, DriverFixture, RunTimer};
pub use page::BasePage;
pub use platform::Os;
pub use trace::init_logging;
