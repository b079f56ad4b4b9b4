//! File logging for hosts that embed the overlay.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

// Dropping the guard stops the background writer, so it lives for the process.
static TRACING_GUARD: OnceCell<WorkerGuard> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

/// Route `tracing` output to `log_file_path`, filtered by `log_level`
/// (any `EnvFilter` directive, `info` when absent). Returns the log path.
pub fn init_tracing(log_file_path: impl AsRef<Path>, log_level: Option<&str>) -> Result<PathBuf> {
    let path = log_file_path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InitTracing(format!("{} is not a file path", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| Error::CreateLogDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let filter = EnvFilter::try_new(log_level.unwrap_or("info"))
        .map_err(|e| Error::InitTracing(e.to_string()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::InitTracing(e.to_string()))?;

    let _ = TRACING_GUARD.set(guard);
    tracing::info!(?path, "Logging initialized");
    Ok(path.to_path_buf())
}

/// Log panics through `tracing` before the default hook runs. Safe to call
/// more than once.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(%info, "Panic in overlay");
            previous(info);
        }));
    });
}
