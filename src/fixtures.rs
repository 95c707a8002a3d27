//! Per-test setup and teardown helpers
//!
//! A test owns exactly one driver session at a time; the session's
//! lifecycle is strictly nested inside the test's execution.

use crate::api::ApiClient;
use crate::config::Config;
use crate::driver::{DriverFactory, DriverSession};
use crate::error::Result;
use crate::trace;
use std::time::Instant;
use tracing::info;

/// Builds a driver session for a test and closes it on teardown.
pub struct DriverFixture {
    pub session: DriverSession,
}

impl DriverFixture {
    /// Construct a local driver session for the named browser (default
    /// Chrome).
    pub async fn setup(config: &Config, browser: Option<&str>) -> Result<DriverFixture> {
        trace::traced_async("fixtures", "web_driver", async {
            info!("Driver is: {}", browser.unwrap_or("chrome"));
            let session = DriverFactory::new(config).get_driver(browser).await?;
            Ok(DriverFixture { session })
        })
        .await
    }

    /// Construct a containerized session instead of a local process.
    pub async fn setup_container(config: &Config, browser: Option<&str>) -> Result<DriverFixture> {
        trace::traced_async("fixtures", "web_driver_container", async {
            info!("Container driver is: {}", browser.unwrap_or("chrome"));
            let session = DriverFactory::new(config).get_container_driver(browser).await?;
            Ok(DriverFixture { session })
        })
        .await
    }

    /// Close the session: cookies, window, quit, driver process.
    pub async fn teardown(mut self) {
        info!(
            "TEST STOP -> Closing browser... {}",
            self.session.browser().name()
        );
        self.session.close().await;
    }
}

/// API client for a test.
pub fn api_client(config: &Config) -> Result<ApiClient> {
    trace::traced("fixtures", "api_client", || ApiClient::new(config))
}

/// Logs the wall-clock run time of a test case. Start it at the top of the
/// test; the elapsed time is logged when it drops.
pub struct RunTimer {
    test_case: String,
    start: Instant,
}

impl RunTimer {
    pub fn start(test_case: &str) -> RunTimer {
        let timer = RunTimer {
            test_case: test_case.to_string(),
            start: Instant::now(),
        };
        info!("START TIME: {:?}", timer.start);
        timer
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        info!(
            "TEST CASE {} RUN TIME: {}.{:03} seconds",
            self.test_case,
            elapsed.as_secs(),
            elapsed.subsec_millis()
        );
    }
}
