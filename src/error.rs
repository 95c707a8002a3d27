//! Domain errors for the automation harness
//!
//! Two failure policies coexist and must not be conflated:
//! - hard fail: domain errors (unsupported OS/browser, missing driver) and
//!   transport errors are logged and returned as `Err`
//! - soft fail: bounded waits in [`crate::browser`] log a timeout at error
//!   level and return `false` so the caller can assert on it

use thiserror::Error;

/// Automation harness errors
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("operating system not detected: {0}")]
    UnsupportedOs(String),

    #[error("no such {0} browser exists")]
    UnsupportedBrowser(String),

    #[error("no such {0} container exists")]
    UnsupportedContainer(String),

    #[error("no usable driver binary for {browser}: nothing on PATH and no configured fallback")]
    DriverUnavailable { browser: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("standalone server error: {0}")]
    Server(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("webdriver command failed: {0}")]
    WebDriver(#[from] fantoccini::error::CmdError),

    #[error("webdriver session could not be created: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, AutomationError>;
