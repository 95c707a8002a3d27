//! Driver factory and session lifecycle
//!
//! Session construction is dispatched through a strategy table keyed by
//! (OS, browser). Binary resolution first scans `PATH` for a managed
//! driver; any failure there falls back once to the statically configured
//! path. Unsupported combinations are hard domain errors.

pub mod server;

use crate::config::Config;
use crate::error::{AutomationError, Result};
use crate::platform::Os;
use crate::trace;
use fantoccini::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Supported browsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserName {
    Chrome,
    Firefox,
    Ie,
    Edge,
}

impl Default for BrowserName {
    fn default() -> Self {
        BrowserName::Chrome
    }
}

impl BrowserName {
    /// Lowercase name, matching configuration keys and factory input.
    pub fn name(&self) -> &'static str {
        match self {
            BrowserName::Chrome => "chrome",
            BrowserName::Firefox => "firefox",
            BrowserName::Ie => "ie",
            BrowserName::Edge => "edge",
        }
    }
}

impl FromStr for BrowserName {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(BrowserName::Chrome),
            "firefox" => Ok(BrowserName::Firefox),
            "ie" => Ok(BrowserName::Ie),
            "edge" => Ok(BrowserName::Edge),
            other => Err(AutomationError::UnsupportedBrowser(other.to_string())),
        }
    }
}

/// Which WebDriver binary speaks for a browser, and how to start it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Chromedriver,
    Geckodriver,
    IeDriver,
    EdgeDriver,
}

impl DriverKind {
    /// Base binary name, without the Windows `.exe` suffix.
    pub fn binary_name(&self) -> &'static str {
        match self {
            DriverKind::Chromedriver => "chromedriver",
            DriverKind::Geckodriver => "geckodriver",
            DriverKind::IeDriver => "IEDriverServer",
            DriverKind::EdgeDriver => "msedgedriver",
        }
    }

    /// Command-line arguments selecting the listen port.
    pub fn port_args(&self, port: u16) -> Vec<String> {
        match self {
            DriverKind::Chromedriver | DriverKind::EdgeDriver => {
                vec![format!("--port={}", port)]
            }
            DriverKind::Geckodriver => vec!["--port".to_string(), port.to_string()],
            DriverKind::IeDriver => vec![format!("/port={}", port)],
        }
    }

    /// New-session capabilities for a headless local run.
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        match self {
            DriverKind::Chromedriver => {
                caps.insert(
                    "goog:chromeOptions".to_string(),
                    json!({ "args": ["--headless=new", "--no-sandbox", "--disable-gpu"] }),
                );
            }
            DriverKind::EdgeDriver => {
                caps.insert(
                    "ms:edgeOptions".to_string(),
                    json!({ "args": ["--headless=new", "--disable-gpu"] }),
                );
            }
            DriverKind::Geckodriver => {
                caps.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({ "args": ["-headless"] }),
                );
            }
            DriverKind::IeDriver => {}
        }
        caps
    }
}

/// Session-construction strategy table keyed by (OS, browser).
///
/// Absent entries (IE and Edge off Windows) are unsupported combinations.
pub fn driver_kind(os: Os, browser: BrowserName) -> Option<DriverKind> {
    match (os, browser) {
        (_, BrowserName::Chrome) => Some(DriverKind::Chromedriver),
        (_, BrowserName::Firefox) => Some(DriverKind::Geckodriver),
        (Os::Windows, BrowserName::Ie) => Some(DriverKind::IeDriver),
        (Os::Windows, BrowserName::Edge) => Some(DriverKind::EdgeDriver),
        _ => None,
    }
}

/// A live browser session: the WebDriver client plus the driver process
/// that backs it (none for containerized sessions).
///
/// Owned exclusively by the fixture that created it; its lifecycle is
/// strictly nested inside the test's execution.
#[derive(Debug)]
pub struct DriverSession {
    client: Client,
    child: Option<Child>,
    browser: BrowserName,
}

impl DriverSession {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn browser(&self) -> BrowserName {
        self.browser
    }

    /// Tear the session down: delete cookies, close the window, end the
    /// WebDriver session, kill the driver process. Individual teardown
    /// steps that fail are logged and skipped so the rest still run; the
    /// child process is killed regardless (and on drop as a backstop).
    pub async fn close(&mut self) {
        trace::entry("DriverSession", "close");

        if let Err(e) = self.client.clone().delete_all_cookies().await {
            warn!("Failed to delete cookies: {}", e);
        }
        if let Err(e) = self.client.clone().close_window().await {
            warn!("Failed to close window: {}", e);
        }
        if let Err(e) = self.client.clone().close().await {
            warn!("Failed to end webdriver session: {}", e);
        }
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill driver process: {}", e);
            }
        }
    }
}

/// Constructs configured browser sessions
pub struct DriverFactory<'a> {
    config: &'a Config,
}

impl<'a> DriverFactory<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Build a local driver session for the named browser (default Chrome):
    /// detect the OS, pick the strategy, resolve the binary, spawn the
    /// driver process and connect to it.
    ///
    /// The picked port can be taken by another process before the driver
    /// binds it, so a startup timeout gets one more attempt on a fresh
    /// port before failing.
    pub async fn get_driver(&self, browser_name: Option<&str>) -> Result<DriverSession> {
        trace::traced_async("WebDriverFactory", "get_driver", async {
            let browser = parse_browser(browser_name)?;
            let os = Os::detect()?;
            let kind = driver_kind(os, browser)
                .ok_or_else(|| AutomationError::UnsupportedBrowser(browser.name().to_string()))?;
            let binary = self.resolve_binary(os, browser, kind)?;

            retry_on_timeout(STARTUP_ATTEMPTS, "driver startup", || {
                start_local(kind, &binary, browser)
            })
            .await
        })
        .await
    }

    /// Connect a session to the configured containerized WebDriver
    /// endpoint instead of spawning a local process. Chrome and Firefox
    /// only.
    pub async fn get_container_driver(&self, browser_name: Option<&str>) -> Result<DriverSession> {
        trace::traced_async("WebDriverFactory", "get_webdriver_container", async {
            let browser = parse_browser(browser_name)?;
            match browser {
                BrowserName::Chrome | BrowserName::Firefox => {}
                other => {
                    return Err(AutomationError::UnsupportedContainer(other.name().to_string()))
                }
            }

            let container = self.config.container.as_ref().ok_or_else(|| {
                AutomationError::Config("no [container] section configured".to_string())
            })?;

            let mut caps = Map::new();
            caps.insert("browserName".to_string(), json!(browser.name()));

            let client = ClientBuilder::native()
                .capabilities(caps)
                .connect(&container.url)
                .await?;

            info!("{} container session started via {}", browser.name(), container.url);
            Ok(DriverSession {
                client,
                child: None,
                browser,
            })
        })
        .await
    }

    fn resolve_binary(&self, os: Os, browser: BrowserName, kind: DriverKind) -> Result<PathBuf> {
        self.resolve_binary_with(os, browser, kind, resolve_on_path)
    }

    /// Resolution with the managed lookup injected, so the fallback path
    /// can be tested without depending on the host's `PATH`.
    fn resolve_binary_with<F>(
        &self,
        os: Os,
        browser: BrowserName,
        kind: DriverKind,
        lookup: F,
    ) -> Result<PathBuf>
    where
        F: Fn(&str, Os) -> Option<PathBuf>,
    {
        if let Some(found) = lookup(kind.binary_name(), os) {
            info!("Resolved {} from PATH: {}", kind.binary_name(), found.display());
            return Ok(found);
        }

        warn!(
            "Could not resolve a managed {} binary, falling back to the configured path",
            kind.binary_name()
        );
        self.config
            .driver_path(os, browser.name())
            .ok_or_else(|| AutomationError::DriverUnavailable {
                browser: browser.name().to_string(),
            })
    }
}

fn parse_browser(name: Option<&str>) -> Result<BrowserName> {
    match name {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse(),
        _ => Ok(BrowserName::default()),
    }
}

fn resolve_on_path(name: &str, os: Os) -> Option<PathBuf> {
    let file = if os.is_windows() {
        format!("{}.exe", name)
    } else {
        name.to_string()
    };
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(&file))
        .find(|candidate| candidate.is_file())
}

const STARTUP_ATTEMPTS: u32 = 2;

/// Spawn the driver on a freshly picked port and connect to it. The child
/// is killed before a startup timeout is returned so a retry does not leak
/// the process.
async fn start_local(
    kind: DriverKind,
    binary: &Path,
    browser: BrowserName,
) -> Result<DriverSession> {
    let port = free_port()?;

    info!("Starting {} on port {}", binary.display(), port);
    let mut command = Command::new(binary);
    command
        .args(kind.port_args(port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    let mut child = command.spawn()?;

    let url = format!("http://localhost:{}", port);
    if let Err(e) = wait_driver_ready(&url, Duration::from_secs(10)).await {
        if let Err(kill) = child.kill().await {
            warn!("Failed to kill driver process after startup timeout: {}", kill);
        }
        return Err(e);
    }

    let client = ClientBuilder::native()
        .capabilities(kind.capabilities())
        .connect(&url)
        .await?;

    info!("{} session started via {}", browser.name(), url);
    Ok(DriverSession {
        client,
        child: Some(child),
        browser,
    })
}

/// Run a startup step, retrying timeouts up to `attempts` times total.
/// Other errors are returned immediately.
async fn retry_on_timeout<T, F, Fut>(attempts: u32, operation: &str, mut run: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match run().await {
            Err(AutomationError::Timeout(what)) if attempt < attempts => {
                warn!("{} timed out ({}), retrying", operation, what);
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// Poll the driver's `/status` endpoint until it answers, bounded.
async fn wait_driver_ready(url: &str, timeout: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    let status_url = format!("{}/status", url);

    loop {
        match reqwest::get(&status_url).await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ => {
                if tokio::time::Instant::now() >= deadline {
                    return Err(AutomationError::Timeout(format!(
                        "driver status at {}",
                        status_url
                    )));
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
