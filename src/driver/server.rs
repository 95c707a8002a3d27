//! Standalone selenium server lifecycle
//!
//! The server is an explicit handle with start, health-check and stop
//! operations; nothing is launched fire-and-forget.

use crate::config::Config;
use crate::driver::BrowserName;
use crate::error::{AutomationError, Result};
use crate::platform::Os;
use crate::trace;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Handle to a running standalone selenium server process
#[derive(Debug)]
pub struct ServerHandle {
    child: Child,
    url: String,
}

impl ServerHandle {
    /// Spawn `java -Dwebdriver.<browser>.driver=<path> -jar <selenium_jar>`.
    ///
    /// The driver system property comes from the configured Windows driver
    /// paths, which is where the standalone server is used.
    pub async fn start(config: &Config, browser: BrowserName) -> Result<ServerHandle> {
        trace::traced_async("ServerHandle", "start", async {
            let settings = config.server.as_ref().ok_or_else(|| {
                AutomationError::Config("no [server] section configured".to_string())
            })?;
            let jar = config.app.drivers_dir.join(&settings.selenium_jar);
            let property = driver_property(config, browser)?;

            info!("Launching standalone server from {}", jar.display());
            let child = Command::new("java")
                .arg(property)
                .arg("-jar")
                .arg(&jar)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| AutomationError::Server(format!("failed to spawn java: {}", e)))?;

            Ok(ServerHandle {
                child,
                url: settings.url.clone(),
            })
        })
        .await
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Probe the server's status endpoint. Soft result: an unreachable or
    /// unhealthy server is logged and reported as `false`.
    pub async fn health_check(&self) -> bool {
        trace::entry("ServerHandle", "health_check");
        let status_url = format!("{}/wd/hub/status", self.url.trim_end_matches('/'));

        let client = reqwest::Client::new();
        match client
            .get(&status_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Server status returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("Server status probe failed: {}", e);
                false
            }
        }
    }

    /// Kill the server process and reap it.
    pub async fn stop(mut self) -> Result<()> {
        trace::entry("ServerHandle", "stop");
        self.child
            .kill()
            .await
            .map_err(|e| AutomationError::Server(format!("failed to stop server: {}", e)))?;
        Ok(())
    }
}

/// The `-Dwebdriver.<name>.driver=<path>` system property for a browser.
fn driver_property(config: &Config, browser: BrowserName) -> Result<String> {
    let path = config
        .driver_path(Os::Windows, browser.name())
        .ok_or_else(|| AutomationError::DriverUnavailable {
            browser: browser.name().to_string(),
        })?;
    Ok(format!(
        "-Dwebdriver.{}.driver={}",
        browser.name(),
        path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_config() -> Config {
        Config::from_toml(
            r#"
            [app]
            base_url = "http://localhost:3000/"
            ui_delay = 5.0

            [drivers.windows]
            chrome = "chromedriver.exe"
            firefox = "geckodriver.exe"
            ie = "IEDriverServer.exe"
            edge = "msedgedriver.exe"

            [server]
            selenium_jar = "selenium-server-standalone.jar"
            url = "http://localhost:4444"
        "#,
        )
        .unwrap()
    }

    #[test]
    fn driver_property_names_the_browser() {
        let config = server_config();

        assert_eq!(
            driver_property(&config, BrowserName::Chrome).unwrap(),
            "-Dwebdriver.chrome.driver=drivers/chromedriver.exe"
        );
        assert_eq!(
            driver_property(&config, BrowserName::Ie).unwrap(),
            "-Dwebdriver.ie.driver=drivers/IEDriverServer.exe"
        );
    }

    #[test]
    fn missing_driver_path_fails_property_construction() {
        let config = Config::from_toml(
            r#"
            [app]
            base_url = "http://localhost:3000/"
            ui_delay = 5.0

            [server]
            selenium_jar = "selenium-server-standalone.jar"
            url = "http://localhost:4444"
        "#,
        )
        .unwrap();

        let err = driver_property(&config, BrowserName::Firefox).unwrap_err();
        assert!(matches!(err, AutomationError::DriverUnavailable { .. }));
    }

    #[test]
    fn server_handle_is_debug() {
        fn assert_debug<T: std::fmt::Debug>() {}
        assert_debug::<ServerHandle>();
    }

    #[tokio::test]
    async fn start_without_server_section_is_a_config_error() {
        let config = Config::from_toml(
            r#"
            [app]
            base_url = "http://localhost:3000/"
            ui_delay = 5.0
        "#,
        )
        .unwrap();

        let err = ServerHandle::start(&config, BrowserName::Chrome)
            .await
            .unwrap_err();
        assert!(matches!(err, AutomationError::Config(_)));
    }
}
