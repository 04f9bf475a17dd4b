//! Tracing setup for the toptag binaries.
//!
//! Events go to stderr, since stdout carries the scores, and to a run log in
//! `.toptag/logs`. Run logs are named `toptag_<utc time>_<pid>.log` so that
//! batch jobs started in the same second do not share a file. Because the
//! names sort chronologically, pruning works on names alone.
//!
//! The filter is read from `TOPTAG_LOG`, then `RUST_LOG`, and defaults to
//! `info`.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

/// Environment variable holding the log filter.
pub const LOG_FILTER_ENV: &str = "TOPTAG_LOG";
/// Run logs kept after a new one is opened, the new one included.
const KEPT_RUN_LOGS: usize = 10;
const RUN_LOG_PREFIX: &str = "toptag_";
const RUN_LOG_TIME: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

static RUN_LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("No directory available for run logs: {0}")]
    LogDir(#[from] AppDirError),
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format run log timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("Tracing subscriber already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// A freshly created run log.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunLog {
    dir: PathBuf,
    file_name: String,
}

impl RunLog {
    /// Create the run log for a run started at `started` by process `pid`.
    fn create(dir: &Path, started: OffsetDateTime, pid: u32) -> Result<Self, LoggingError> {
        let file_name = run_log_name(started, pid)?;
        let path = dir.join(&file_name);
        File::create(&path).map_err(|source| LoggingError::Io {
            action: "create run log",
            path,
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            file_name,
        })
    }

    fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Delete the oldest run logs so that at most `keep` remain. This run's
    /// log and files not named like run logs are never touched.
    fn prune(&self, keep: usize) -> Result<usize, LoggingError> {
        let listing = fs::read_dir(&self.dir).map_err(|source| LoggingError::Io {
            action: "list",
            path: self.dir.clone(),
            source,
        })?;
        let mut older: Vec<String> = listing
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .filter(|name| is_run_log(name) && *name != self.file_name)
            .collect();
        older.sort_unstable();
        let excess = older.len().saturating_sub(keep.saturating_sub(1));
        for name in &older[..excess] {
            let path = self.dir.join(name);
            fs::remove_file(&path).map_err(|source| LoggingError::Io {
                action: "prune run log",
                path,
                source,
            })?;
        }
        Ok(excess)
    }
}

/// Install the global subscriber.
///
/// Later calls do nothing. Errors are returned so a batch run can carry on
/// with stderr output only.
pub fn init() -> Result<(), LoggingError> {
    if RUN_LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let run_log = RunLog::create(
        &app_dirs::logs_dir()?,
        OffsetDateTime::now_utc(),
        std::process::id(),
    )?;
    let pruned = run_log.prune(KEPT_RUN_LOGS)?;
    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &run_log.dir,
        &run_log.file_name,
    ));

    let subscriber = Registry::default()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = RUN_LOG_GUARD.set(guard);

    tracing::info!(path = %run_log.path().display(), pruned, "run log opened");
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn run_log_name(started: OffsetDateTime, pid: u32) -> Result<String, LoggingError> {
    let stamp = started.format(RUN_LOG_TIME)?;
    Ok(format!("{RUN_LOG_PREFIX}{stamp}_{pid}.log"))
}

fn is_run_log(name: &str) -> bool {
    name.starts_with(RUN_LOG_PREFIX) && name.ends_with(".log")
}
