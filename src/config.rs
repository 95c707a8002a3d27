//! Harness configuration
//!
//! Loaded once at process start from a TOML file and passed by reference to
//! every component that needs it. Immutable for the process lifetime; there
//! is no ambient global.

use crate::error::{AutomationError, Result};
use crate::platform::Os;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_drivers_dir() -> PathBuf {
    PathBuf::from("drivers")
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppSettings,

    #[serde(default)]
    pub drivers: DriverPaths,

    pub server: Option<ServerSettings>,

    pub container: Option<ContainerSettings>,
}

/// Application under test
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// Base URL of the game application
    pub base_url: String,

    /// Bound for UI waits, in seconds
    pub ui_delay: f64,

    /// Root directory the per-OS driver paths are relative to
    #[serde(default = "default_drivers_dir")]
    pub drivers_dir: PathBuf,

    /// Directory for per-run log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// Statically configured driver binaries, one section per OS
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverPaths {
    #[serde(default)]
    pub windows: BrowserPaths,

    #[serde(default)]
    pub linux: BrowserPaths,

    #[serde(default)]
    pub darwin: BrowserPaths,
}

/// Per-browser driver binary paths, relative to `drivers_dir`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserPaths {
    pub chrome: Option<PathBuf>,
    pub firefox: Option<PathBuf>,
    pub ie: Option<PathBuf>,
    pub edge: Option<PathBuf>,
}

/// Standalone selenium server
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Path to the standalone server jar, relative to `drivers_dir`
    pub selenium_jar: PathBuf,

    /// URL the server listens on once started
    pub url: String,
}

/// Containerized WebDriver endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSettings {
    /// Remote WebDriver URL, e.g. `http://localhost:4444/wd/hub`
    pub url: String,
}

impl Config {
    /// Load configuration from a TOML file. Read or parse failures are hard
    /// errors for the run.
    pub fn load(path: &Path) -> Result<Config> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AutomationError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Config::from_toml(&raw)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(raw: &str) -> Result<Config> {
        toml::from_str(raw).map_err(|e| AutomationError::Config(e.to_string()))
    }

    /// Statically configured driver binary for an (OS, browser) pair,
    /// resolved against `drivers_dir`. `None` when the file does not
    /// configure that combination.
    pub fn driver_path(&self, os: Os, browser: &str) -> Option<PathBuf> {
        let section = match os {
            Os::Windows => &self.drivers.windows,
            Os::Linux => &self.drivers.linux,
            Os::Darwin => &self.drivers.darwin,
        };
        let relative = match browser {
            "chrome" => section.chrome.as_ref(),
            "firefox" => section.firefox.as_ref(),
            "ie" => section.ie.as_ref(),
            "edge" => section.edge.as_ref(),
            _ => None,
        }?;
        Some(self.app.drivers_dir.join(relative))
    }

    /// Path to the standalone server jar, resolved against `drivers_dir`.
    pub fn selenium_jar(&self) -> Option<PathBuf> {
        self.server
            .as_ref()
            .map(|s| self.app.drivers_dir.join(&s.selenium_jar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [app]
        base_url = "http://localhost:3000/"
        ui_delay = 5.0
        drivers_dir = "drivers"

        [drivers.windows]
        chrome = "chromedriver.exe"
        firefox = "geckodriver.exe"
        ie = "IEDriverServer.exe"
        edge = "msedgedriver.exe"

        [drivers.linux]
        chrome = "chromedriver"
        firefox = "geckodriver"

        [drivers.darwin]
        chrome = "chromedriver"
        firefox = "geckodriver"

        [server]
        selenium_jar = "selenium-server-standalone.jar"
        url = "http://localhost:4444"

        [container]
        url = "http://localhost:4444/wd/hub"
    "#;

    #[test]
    fn full_config_parses() {
        let config = Config::from_toml(FULL).unwrap();

        assert_eq!(config.app.base_url, "http://localhost:3000/");
        assert!((config.app.ui_delay - 5.0).abs() < f64::EPSILON);
        assert_eq!(
            config.container.as_ref().unwrap().url,
            "http://localhost:4444/wd/hub"
        );
        assert_eq!(
            config.selenium_jar().unwrap(),
            PathBuf::from("drivers/selenium-server-standalone.jar")
        );
    }

    #[test]
    fn driver_paths_resolve_against_drivers_dir() {
        let config = Config::from_toml(FULL).unwrap();

        assert_eq!(
            config.driver_path(Os::Linux, "chrome").unwrap(),
            PathBuf::from("drivers/chromedriver")
        );
        assert_eq!(
            config.driver_path(Os::Windows, "ie").unwrap(),
            PathBuf::from("drivers/IEDriverServer.exe")
        );
    }

    #[test]
    fn unconfigured_combinations_are_none() {
        let config = Config::from_toml(FULL).unwrap();

        assert!(config.driver_path(Os::Linux, "ie").is_none());
        assert!(config.driver_path(Os::Darwin, "edge").is_none());
        assert!(config.driver_path(Os::Linux, "netscape").is_none());
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [app]
            base_url = "http://localhost:3000/"
            ui_delay = 2.5
        "#,
        )
        .unwrap();

        assert_eq!(config.app.drivers_dir, PathBuf::from("drivers"));
        assert_eq!(config.app.log_dir, PathBuf::from("logs"));
        assert!(config.server.is_none());
        assert!(config.driver_path(Os::Linux, "chrome").is_none());
    }

    #[test]
    fn missing_app_section_is_an_error() {
        let err = Config::from_toml("[drivers.linux]\nchrome = \"x\"").unwrap_err();
        assert!(matches!(err, AutomationError::Config(_)));
    }

    #[test]
    fn load_reads_a_config_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", FULL).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.app.base_url, "http://localhost:3000/");
    }

    #[test]
    fn unreadable_config_file_is_an_error() {
        let err = Config::load(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, AutomationError::Config(_)));
    }
}
