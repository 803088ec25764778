//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! The terminal belongs to the UI, so log output is appended to a file
//! instead of stderr. The filter comes from `RUST_LOG` when set, otherwise
//! from the configured level.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::{Error, Result};

/// Install the global subscriber. Returns the log file in use, if any.
///
/// Without a configured log file logging stays off.
pub fn init_logging(config: &Config) -> Result<Option<PathBuf>> {
    let Some(path) = config.log_file.clone() else {
        return Ok(None);
    };
    init_logging_to(&path, &config.log_level)?;
    Ok(Some(path))
}

/// Install the global subscriber writing to `path`.
pub fn init_logging_to(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(e, parent.to_path_buf()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(e, path.to_path_buf()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
        .try_init()
        .map_err(|e| Error::Msg(format!("Logging already initialised: {e}")))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
