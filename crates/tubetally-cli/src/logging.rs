//! Structured logging using tracing.
//!
//! Console output goes to stderr so formatted playlists on stdout stay clean.
//! An optional JSON file layer writes rotated logs under the data directory.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are stored.
    pub log_directory: PathBuf,
    /// Log file name prefix (e.g. "tubetally" -> "tubetally.2024-01-15").
    pub log_file_prefix: String,
    /// Maximum log level for console output.
    pub console_level: Level,
    /// Maximum log level for file output.
    pub file_level: Level,
    /// How often to rotate log files.
    pub rotation: LogRotation,
    /// Whether to write the JSON file log at all.
    pub file_logging: bool,
    /// Whether to include ANSI color codes in console output.
    pub console_ansi: bool,
    /// Whether to include file/line info in console logs.
    pub include_file_line: bool,
    /// Whether to include target module in console logs.
    pub include_target: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// Create a new log file every hour.
    Hourly,
    /// Create a new log file every day.
    Daily,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose console and file logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "tubetally".to_string(),
            console_level: Level::DEBUG,
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            file_logging: true,
            console_ansi: true,
            include_file_line: true,
            include_target: true,
        }
    }

    /// Warnings only on the console; details go to the file.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "tubetally".to_string(),
            console_level: Level::WARN,
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            file_logging: true,
            console_ansi: true,
            include_file_line: false,
            include_target: false,
        }
    }

    /// Detect configuration based on build type.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Raise the console level by `verbosity` steps above the preset.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.console_level = match verbosity {
            0 => return self,
            1 => Level::INFO.max(self.console_level),
            2 => Level::DEBUG.max(self.console_level),
            _ => Level::TRACE,
        };
        self
    }

    /// Enable or disable the file layer.
    #[must_use]
    pub const fn with_file_logging(mut self, enabled: bool) -> Self {
        self.file_logging = enabled;
        self
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }
}

/// Guard that keeps file logging active. Drop this to flush and close log files.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// Returns a guard that must be kept alive for the duration of the program.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    // RUST_LOG overrides the console preset
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => crate_filter("warn", config.console_level)?,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.console_ansi)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_filter(console_filter);

    let (file_layer, file_guard) = if config.file_logging {
        if !config.log_directory.exists() {
            std::fs::create_dir_all(&config.log_directory).map_err(|e| {
                LoggingError::DirectoryCreationFailed {
                    path: config.log_directory.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        let file_appender = RollingFileAppender::new(
            config.rotation.into(),
            &config.log_directory,
            &config.log_file_prefix,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(crate_filter(
                level_to_directive(config.file_level),
                config.file_level,
            )?);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Filter with `base` for dependencies and `level` for our crates.
fn crate_filter(base: &str, level: Level) -> Result<EnvFilter, LoggingError> {
    let level = level_to_directive(level);
    let mut filter = EnvFilter::new(base);
    for krate in ["tubetally", "tubetally_core"] {
        let directive = format!("{krate}={level}")
            .parse()
            .map_err(|e| LoggingError::InvalidDirective(format!("{krate}={level}: {e}")))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Get the default log directory.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubetally")
        .join("logs")
}

/// Convert a tracing Level to a filter directive string.
const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for the failure.
        reason: String,
    },

    /// A filter directive did not parse.
    #[error("Invalid log directive {0}")]
    InvalidDirective(String),

    /// A global subscriber was already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_production() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, Level::WARN);
        assert_eq!(config.file_level, Level::DEBUG);
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.console_level, Level::DEBUG);
        assert_eq!(config.file_level, Level::TRACE);
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(config.include_file_line);
    }

    #[test]
    fn test_verbosity_raises_console_level() {
        let config = LoggingConfig::production();
        assert_eq!(config.clone().with_verbosity(0).console_level, Level::WARN);
        assert_eq!(config.clone().with_verbosity(1).console_level, Level::INFO);
        assert_eq!(config.clone().with_verbosity(2).console_level, Level::DEBUG);
        assert_eq!(config.with_verbosity(5).console_level, Level::TRACE);
    }

    #[test]
    fn test_verbosity_never_lowers_development() {
        let config = LoggingConfig::development().with_verbosity(1);
        assert_eq!(config.console_level, Level::DEBUG);
    }

    #[test]
    fn test_config_builder() {
        let config = LoggingConfig::production()
            .with_file_logging(false)
            .with_log_directory(PathBuf::from("/tmp/tubetally-logs"));

        assert!(!config.file_logging);
        assert_eq!(config.log_directory, PathBuf::from("/tmp/tubetally-logs"));
        assert_eq!(config.rotation, LogRotation::Daily);
    }

    #[test]
    fn test_crate_filter_parses() {
        assert!(crate_filter("warn", Level::DEBUG).is_ok());
    }

    #[test]
    fn test_default_log_directory() {
        let dir = default_log_directory();
        assert!(dir.to_string_lossy().contains("tubetally"));
        assert!(dir.to_string_lossy().contains("logs"));
    }
}
