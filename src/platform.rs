//! Platform detection for driver dispatch

use crate::error::{AutomationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Operating system identifier
///
/// Closed set: driver dispatch only knows these three. Anything else is a
/// hard failure for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Darwin,
    Linux,
}

impl Os {
    /// Detect the OS the tests are running on.
    pub fn detect() -> Result<Os> {
        Os::from_name(std::env::consts::OS)
    }

    /// Parse a platform string, case-insensitively.
    ///
    /// Accepts the Rust spelling "macos" alongside "darwin".
    pub fn from_name(name: &str) -> Result<Os> {
        match name.to_lowercase().as_str() {
            "windows" => Ok(Os::Windows),
            "darwin" | "macos" => Ok(Os::Darwin),
            "linux" => Ok(Os::Linux),
            other => {
                let err = AutomationError::UnsupportedOs(other.to_string());
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Lowercase name, matching the configuration section keys.
    pub fn name(&self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Darwin => "darwin",
            Os::Linux => "linux",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
