//! Process-wide logging bootstrap.
//!
//! # Invariants
//! - The first successful `init_logging` call wins. Repeating it with the
//!   same level and sink is a no-op; anything else is refused.
//! - Log lines carry `event=... module=... status=...` metadata only.
//!   Emails, wishlists, passwords and tokens never appear in them.
//! - Initialization never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "secretsanta";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_MESSAGE_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    sink: LogSink,
    _handle: LoggerHandle,
}

/// Destination of log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Size-rotated files under an absolute directory.
    Directory(PathBuf),
}

impl LogSink {
    /// `None` or a blank value selects stderr.
    pub fn from_dir(dir: Option<&str>) -> Result<Self, LoggingError> {
        let Some(dir) = dir.map(str::trim).filter(|dir| !dir.is_empty()) else {
            return Ok(Self::Stderr);
        };
        let path = Path::new(dir);
        if !path.is_absolute() {
            return Err(LoggingError::RelativeDirectory(dir.to_string()));
        }
        Ok(Self::Directory(path.to_path_buf()))
    }
}

impl Display for LogSink {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => write!(f, "stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeDirectory(String),
    CreateDirectory { dir: PathBuf, reason: String },
    Start(String),
    /// A logger with different settings is already running.
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeDirectory(dir) => {
                write!(f, "log directory must be an absolute path, got `{dir}`")
            }
            Self::CreateDirectory { dir, reason } => write!(
                f,
                "failed to create log directory `{}`: {reason}",
                dir.display()
            ),
            Self::Start(reason) => write!(f, "failed to start logger: {reason}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already initialized as `{active}`; refusing to switch to `{requested}`"
            ),
        }
    }
}

impl Error for LoggingError {}

/// Parses a level name case-insensitively.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    level
        .trim()
        .parse()
        .map_err(|_| LoggingError::UnknownLevel(level.trim().to_string()))
}

/// Level used when none is configured.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Starts the process logger.
///
/// # Errors
/// - `UnknownLevel` for an unrecognized level name.
/// - `CreateDirectory` / `Start` when the sink cannot be opened.
/// - `Conflict` when a logger with another level or sink already runs.
pub fn init_logging(level: &str, sink: LogSink) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let active = ACTIVE.get_or_try_init(|| start(level, sink.clone()))?;

    if active.level != level || active.sink != sink {
        return Err(LoggingError::Conflict {
            active: describe(active.level, &active.sink),
            requested: describe(level, &sink),
        });
    }
    Ok(())
}

/// Level and sink of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, LogSink)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.sink.clone()))
}

fn start(level: LevelFilter, sink: LogSink) -> Result<ActiveLogger, LoggingError> {
    let spec = level.as_str().to_ascii_lowercase();
    let logger =
        Logger::try_with_str(&spec).map_err(|err| LoggingError::Start(err.to_string()))?;

    let handle = match &sink {
        LogSink::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format)
            .start(),
        LogSink::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| LoggingError::CreateDirectory {
                dir: dir.clone(),
                reason: err.to_string(),
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()
        }
    }
    .map_err(|err| LoggingError::Start(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=logging_init module=core status=ok level={} sink={} version={} os={}",
        spec,
        sink,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        level,
        sink,
        _handle: handle,
    })
}

fn describe(level: LevelFilter, sink: &LogSink) -> String {
    format!("{}@{sink}", level.as_str().to_ascii_lowercase())
}

// Runs once, from inside the logger's one-time initialization.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info.location().map_or_else(
            || "unknown".to_string(),
            |loc| format!("{}:{}", loc.file(), loc.line()),
        );
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=core status=error location={} message={}",
            location,
            single_line(&message, PANIC_MESSAGE_LIMIT)
        );
        previous(info);
    }));
}

/// Flattens `value` to one line of at most `limit` characters.
fn single_line(value: &str, limit: usize) -> String {
    let flattened: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if flattened.chars().count() <= limit {
        return flattened;
    }
    let mut cut: String = flattened.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_level, single_line, LogSink, LoggingError};
    use log::LevelFilter;

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::Warn);
        assert_eq!(
            parse_level("verbose").unwrap_err(),
            LoggingError::UnknownLevel("verbose".to_string())
        );
    }

    #[test]
    fn sink_from_dir_defaults_to_stderr_and_rejects_relative_paths() {
        assert_eq!(LogSink::from_dir(None).unwrap(), LogSink::Stderr);
        assert_eq!(LogSink::from_dir(Some("  ")).unwrap(), LogSink::Stderr);
        assert!(matches!(
            LogSink::from_dir(Some("logs/dev")),
            Err(LoggingError::RelativeDirectory(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        assert_eq!(single_line("a\nb\rc", 10), "a b c");
        assert_eq!(single_line("abcdefghij", 4), "abcd...");
    }

    // The logger is process-global, so every init scenario lives in one test.
    #[test]
    fn init_logging_is_idempotent_and_refuses_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::Directory(dir.path().join("logs"));

        init_logging("info", sink.clone()).unwrap();
        init_logging("INFO", sink.clone()).unwrap();

        let level_conflict = init_logging("debug", sink.clone()).unwrap_err();
        assert!(matches!(level_conflict, LoggingError::Conflict { .. }));

        let other_dir = LogSink::Directory(dir.path().join("other"));
        assert!(matches!(
            init_logging("info", other_dir),
            Err(LoggingError::Conflict { .. })
        ));
        let stderr_conflict = init_logging("info", LogSink::Stderr).unwrap_err();
        assert!(stderr_conflict.to_string().contains("stderr"));

        assert_eq!(logging_status(), Some((LevelFilter::Info, sink)));
    }
}
