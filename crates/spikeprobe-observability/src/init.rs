// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console output is always on. With file logging enabled each run gets its
//! own timestamped folder holding a combined JSON log:
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── spikeprobe.log
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File logging settings
#[derive(Debug, Clone)]
pub struct FileLogging {
    /// Base directory for run folders
    pub log_dir: PathBuf,
    /// Keep this many most recent run folders
    pub retention_runs: usize,
}

/// Keeps the non-blocking writers alive; logs are flushed when dropped
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    run_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Folder of the current run, when file logging is enabled
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }
}

/// Initialize the global `tracing` subscriber
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `default_level` - Level for everything not raised by a flag
/// * `file_logging` - Optional per-run JSON log file
///
/// # Errors
///
/// Fails if the run folder cannot be created or a global subscriber is
/// already installed.
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    default_level: &str,
    file_logging: Option<&FileLogging>,
) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(default_level);

    let mut layers = Vec::new();
    let mut file_guards = Vec::new();
    let mut run_dir = None;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(EnvFilter::new(&filter))
        .boxed();
    layers.push(console_layer);

    if let Some(settings) = file_logging {
        let run_folder = create_run_folder(&settings.log_dir)?;
        cleanup_old_runs(&settings.log_dir, settings.retention_runs)?;

        let appender = rolling::never(&run_folder, "spikeprobe.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        file_guards.push(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::new(&filter))
            .boxed();
        layers.push(file_layer);
        run_dir = Some(run_folder);
    }

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        run_dir,
    })
}

/// Initialize console-only logging at the given default level
pub fn init_console_logging(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<LoggingGuard> {
    init_logging(debug_flags, default_level, None)
}

fn create_run_folder(base_log_dir: &Path) -> Result<PathBuf> {
    let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    Ok(run_folder)
}

/// Remove all but the `retention_runs` most recent run folders
///
/// Folders that don't follow the `run_YYYYmmdd_HHMMSS` naming are left alone.
pub fn cleanup_old_runs(base_log_dir: &Path, retention_runs: usize) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let parsed = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| name.strip_prefix(RUN_PREFIX))
            .and_then(|stamp| NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok());
        if let Some(dt) = parsed {
            runs.push((path, dt));
        }
    }

    if runs.len() <= retention_runs {
        return Ok(());
    }

    // Oldest first
    runs.sort_by_key(|(_, dt)| *dt);
    let to_remove = runs.len() - retention_runs;
    for (path, _) in runs.iter().take(to_remove) {
        if let Err(e) = std::fs::remove_dir_all(path) {
            eprintln!("Warning: Failed to remove old log directory {}: {}", path.display(), e);
        }
    }

    Ok(())
}
