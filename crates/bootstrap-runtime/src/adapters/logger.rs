//! # Framework Logger
//!
//! The `Log` component. Accepted messages always go to `tracing`; with
//! `log_path` configured they are also appended to a daily file:
//!
//! ```text
//! <log_path>/log-2024-05-01.log
//! ERROR - 2024-05-01 10:22:13 --> Severity: Warning --> Division by zero index.php 12
//! ```

use bootstrap_types::{ConfigStore, ConfigValue, LogLevel, Logger};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const LOG_THRESHOLD_KEY: &str = "log_threshold";
pub const LOG_PATH_KEY: &str = "log_path";
pub const LOG_DATE_FORMAT_KEY: &str = "log_date_format";

/// Timestamp format used when `log_date_format` is unset or unusable.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which levels are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogThreshold {
    /// Nothing.
    Off,
    /// Every level up to and including this numeric rank; 4 and above is
    /// everything.
    UpTo(u8),
    /// Exactly these levels.
    Levels(Vec<LogLevel>),
}

impl LogThreshold {
    /// Read `log_threshold`: an integer rank or an array of level names.
    /// Unset or unreadable values switch logging off.
    pub fn from_config(config: &dyn ConfigStore) -> Self {
        match config.item(LOG_THRESHOLD_KEY) {
            Some(ConfigValue::Integer(rank)) if rank > 0 => {
                Self::UpTo(u8::try_from(rank).unwrap_or(u8::MAX))
            }
            Some(ConfigValue::Array(names)) => {
                let levels: Vec<LogLevel> = names
                    .iter()
                    .filter_map(|name| name.as_str()?.parse().ok())
                    .collect();
                if levels.is_empty() {
                    Self::Off
                } else {
                    Self::Levels(levels)
                }
            }
            _ => Self::Off,
        }
    }

    #[must_use]
    pub fn allows(&self, level: LogLevel) -> bool {
        match self {
            Self::Off => false,
            Self::UpTo(rank) => level as u8 <= *rank,
            Self::Levels(levels) => levels.contains(&level),
        }
    }
}

pub struct TracingLogger {
    threshold: LogThreshold,
    log_dir: Option<PathBuf>,
    date_format: String,
    file_lock: Mutex<()>,
}

impl TracingLogger {
    pub fn new(threshold: LogThreshold, log_dir: Option<PathBuf>, date_format: &str) -> Self {
        Self {
            threshold,
            log_dir,
            date_format: date_format.to_string(),
            file_lock: Mutex::new(()),
        }
    }

    /// Build from configuration. A relative `log_path` is taken relative to
    /// `app_path`.
    pub fn from_config(config: &dyn ConfigStore, app_path: &Path) -> Self {
        let log_dir = config
            .item_str(LOG_PATH_KEY)
            .filter(|path| !path.is_empty())
            .map(|path| app_path.join(path));
        let date_format = config
            .item_str(LOG_DATE_FORMAT_KEY)
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
        Self::new(LogThreshold::from_config(config), log_dir, &date_format)
    }

    pub fn threshold(&self) -> &LogThreshold {
        &self.threshold
    }

    /// Daily file messages are appended to, when file logging is on.
    pub fn file_for(&self, now: &DateTime<Local>) -> Option<PathBuf> {
        self.log_dir
            .as_ref()
            .map(|dir| dir.join(format!("log-{}.log", now.format("%Y-%m-%d"))))
    }

    fn timestamp(&self, now: &DateTime<Local>) -> String {
        let mut out = String::new();
        if write!(out, "{}", now.format(&self.date_format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(DEFAULT_DATE_FORMAT));
        }
        out
    }

    fn append(&self, level: LogLevel, message: &str) -> io::Result<()> {
        let now = Local::now();
        let Some(path) = self.file_for(&now) else {
            return Ok(());
        };

        let _guard = self.file_lock.lock();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(
            file,
            "{} - {} --> {}",
            level.as_str().to_uppercase(),
            self.timestamp(&now),
            message
        )
    }
}

impl Logger for TracingLogger {
    fn write_log(&self, level: LogLevel, message: &str) -> bool {
        if !self.threshold.allows(level) {
            return false;
        }

        match level {
            LogLevel::Error => error!(target: "framework", "{}", message),
            LogLevel::Debug => debug!(target: "framework", "{}", message),
            LogLevel::Info => info!(target: "framework", "{}", message),
        }

        match self.append(level, message) {
            Ok(()) => true,
            Err(e) => {
                warn!("[Log] Unable to write log file: {}", e);
                false
            }
        }
    }
}
