//! File logging. The terminal belongs to the UI, so nothing goes to stdout.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `default_level`; anything unparsable falls back to `info`.
pub(crate) fn filter(rust_log: Option<&str>, default_level: &str) -> EnvFilter {
    rust_log
        .ok_or(())
        .and_then(|v| EnvFilter::try_new(v).map_err(|_| ()))
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub(crate) fn init(path: &Path, default_level: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
            default_level,
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))?;

    tracing::info!(path = %path.display(), "termascot starting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_falls_back_to_info() {
        assert_eq!(filter(None, "[[not a filter").to_string(), "info");
    }

    #[test]
    fn rust_log_beats_the_flag() {
        assert_eq!(filter(Some("debug"), "warn").to_string(), "debug");
        assert_eq!(filter(Some("[[bad"), "warn").to_string(), "warn");
        assert_eq!(filter(None, "trace").to_string(), "trace");
    }

    #[test]
    fn unusable_log_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let err = init(&blocker.join("logs").join("termascot.log"), "info").unwrap_err();
        assert!(format!("{err:#}").contains("creating log directory"));
    }
}
