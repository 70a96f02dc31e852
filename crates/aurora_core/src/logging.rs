//! Storefront diagnostics.
//!
//! Rolling file logs in a host-chosen directory, plus the lifecycle lines the
//! storefront emits while it boots. Every line reads
//! `event=<name> module=<area> status=<outcome> key=value...` and carries
//! metadata only: cart lines, chat text, profile fields and panic payloads
//! stay out of the log.
//!
//! # Invariants
//! - One logger per process. Repeating the active settings is a no-op; a
//!   different level or directory is a `LoggingError::Conflict`.
//! - Nothing in this module panics.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "aurora";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 3;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Validated level and directory for the file logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

impl LogSettings {
    pub fn new(level: &str, dir: impl AsRef<Path>) -> Result<Self, LoggingError> {
        let level = parse_level(level)
            .ok_or_else(|| LoggingError::UnsupportedLevel(level.trim().to_string()))?;
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(LoggingError::EmptyDir);
        }
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir.to_path_buf()));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }

    /// Settings described by `config`, or `None` when it names no log
    /// directory. An unset level falls back to [`default_log_level`].
    pub fn from_config(config: &CoreConfig) -> Result<Option<Self>, LoggingError> {
        let Some(dir) = &config.log_dir else {
            return Ok(None);
        };
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        Self::new(level, dir).map(Some)
    }

    pub fn level(&self) -> &'static str {
        self.level
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Display for LogSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level={} dir={}", self.level, self.dir.display())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyDir,
    RelativeDir(PathBuf),
    CreateDir { dir: PathBuf, message: String },
    Backend(String),
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyDir => write!(f, "log_dir cannot be empty"),
            Self::RelativeDir(dir) => {
                write!(f, "log_dir must be an absolute path, got `{}`", dir.display())
            }
            Self::CreateDir { dir, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                dir.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {}

/// Starts the file logger from a level name and an absolute directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    start(LogSettings::new(level, log_dir.trim())?)
}

/// Starts the file logger described by `config`.
///
/// Returns `Ok(false)` and leaves logging untouched when `config.log_dir` is
/// unset, so a host that called [`init_logging`] itself keeps its logger.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, LoggingError> {
    match LogSettings::from_config(config)? {
        Some(settings) => start(settings).map(|()| true),
        None => Ok(false),
    }
}

/// Installs the logger once; later calls must repeat the same settings.
pub fn start(settings: LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| install(&settings))?;
    if active.settings == settings {
        Ok(())
    } else {
        Err(LoggingError::Conflict {
            active: active.settings.to_string(),
            requested: settings.to_string(),
        })
    }
}

/// Settings of the running logger, if any.
pub fn active_settings() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn parse_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn install(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        message: err.to_string(),
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!("event=logging_init module=core status=ok {settings}");

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

/// What a bootstrapped storefront ended up running with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupSummary {
    pub locale: String,
    /// `sqlite_file`, `sqlite_memory` or `memory_fallback`.
    pub persistent_store: &'static str,
    pub api_configured: bool,
    pub session_quota_bytes: usize,
}

impl Display for StartupSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "version={} platform={} locale={} persistent_store={} api={} session_quota_bytes={}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            self.locale,
            self.persistent_store,
            if self.api_configured { "configured" } else { "offline" },
            self.session_quota_bytes
        )
    }
}

pub fn log_storefront_start(summary: &StartupSummary) {
    info!("event=storefront_start module=core status=ok {summary}");
}

fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            // Payload may echo chat or search text; only its size is logged.
            error!(
                "event=panic_captured module=core status=error location={location} payload_chars={}",
                payload_chars(info.payload())
            );
            previous(info);
        }));
    });
}

fn payload_chars(payload: &(dyn std::any::Any + Send)) -> usize {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.chars().count()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.chars().count()
    } else {
        0
    }
}
