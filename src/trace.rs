//! Operation tracing and per-run log files
//!
//! Every harness operation is logged with an explicit component and
//! operation name passed by the caller. Failures are logged once, with the
//! error type and its source chain, and returned unchanged; nothing is
//! swallowed or wrapped here.

use crate::error::{AutomationError, Result};
use std::fs::OpenOptions;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log that an operation is about to run.
pub fn entry(component: &str, operation: &str) {
    info!(" {} --> {}", component, operation);
}

/// Run a fallible operation with entry and failure logging.
///
/// On success the result is returned unchanged. On failure one error-level
/// record is emitted naming the operation, the error type and its source
/// chain, and the original error is returned unmodified.
pub fn traced<T, E, F>(component: &str, operation: &str, f: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E>,
    E: std::error::Error,
{
    entry(component, operation);
    match f() {
        Ok(value) => Ok(value),
        Err(err) => {
            log_failure(operation, &err);
            Err(err)
        }
    }
}

/// Async counterpart of [`traced`].
pub async fn traced_async<T, E, Fut>(
    component: &str,
    operation: &str,
    fut: Fut,
) -> std::result::Result<T, E>
where
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::error::Error,
{
    entry(component, operation);
    match fut.await {
        Ok(value) => Ok(value),
        Err(err) => {
            log_failure(operation, &err);
            Err(err)
        }
    }
}

fn log_failure<E: std::error::Error>(operation: &str, err: &E) {
    error!(
        "{} throws an exception: {} {}{}",
        operation,
        std::any::type_name::<E>(),
        err,
        source_chain(err)
    );
}

fn source_chain(err: &dyn std::error::Error) -> String {
    let mut out = String::new();
    let mut cur = err.source();
    while let Some(cause) = cur {
        out.push_str(&format!(" <- {}", cause));
        cur = cause.source();
    }
    out
}

/// Initialize logging for a run.
///
/// Creates `{log_dir}/{unix_timestamp}_automation_test.log` and installs a
/// subscriber writing formatted records both there and to stderr. Returns
/// the log file path. One file per run, append-only.
pub fn init_logging(log_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;

    let stamp = chrono::Utc::now().timestamp();
    let path = log_dir.join(format!("{}_automation_test.log", stamp));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "game_automation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| AutomationError::Logging(e.to_string()))?;

    info!(" --- AUTOMATION LOG STARTED: {}", path.display());
    Ok(path)
}
