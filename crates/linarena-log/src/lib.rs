//! Leveled logging for the `linarena` workspace.
//!
//! A single global level held in an atomic, macros that capture the calling
//! module as the log target, and plain stderr output. No dependencies.
//!
//! The level defaults to [`Level::Warn`] and can be changed programmatically
//! or from the `LINARENA_LOG` environment variable.
//!
//! # Example
//!
//! ```
//! use linarena_log::{debug, info, warn, Level};
//!
//! linarena_log::set_level(Level::Debug);
//!
//! let blocks = 3;
//! info!("arena holds {} blocks", blocks);
//! debug!("block capacities: {:?}", [1024, 2048, 4096]);
//! warn!("checkpoint from another arena ignored");
//! ```

use std::fmt::{self, Arguments};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`init_from_env`].
pub const ENV_VAR: &str = "LINARENA_LOG";

/// Level used until something calls [`set_level`].
pub const DEFAULT_LEVEL: Level = Level::Warn;

/// Severity of a log record, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Unrecoverable conditions, usually logged right before aborting.
    Error = 0,
    /// Suspicious input that was tolerated.
    Warn = 1,
    /// Coarse lifecycle events.
    Info = 2,
    /// Block reservation, growth and release.
    Debug = 3,
    /// Per-operation detail.
    Trace = 4,
}

impl Level {
    const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }

    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Upper-case name used in log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError {
    input: String,
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid log level '{}', expected one of error, warn, info, debug, trace",
            self.input
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Case-insensitive parse of a level name.
    ///
    /// ```
    /// use linarena_log::Level;
    ///
    /// assert_eq!("debug".parse::<Level>(), Ok(Level::Debug));
    /// assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
    /// assert!("loud".parse::<Level>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError {
                input: s.to_owned(),
            })
    }
}

/// Level filter shared by every macro invocation in the process.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    const fn new(level: Level) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Sets the most verbose level that is still emitted.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Current level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Whether a record at `level` would be written.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: Logger = Logger::new(DEFAULT_LEVEL);

/// The process-wide logger.
pub fn logger() -> &'static Logger {
    &LOGGER
}

/// Sets the level of the process-wide logger.
pub fn set_level(level: Level) {
    LOGGER.set_level(level);
}

/// Applies the level named by `LINARENA_LOG`, if the variable is set.
///
/// Returns the level that was applied, `None` when the variable is absent.
/// An unparsable value leaves the current level untouched.
///
/// ```
/// // With LINARENA_LOG unset this is a no-op.
/// # unsafe { std::env::remove_var(linarena_log::ENV_VAR) };
/// assert_eq!(linarena_log::init_from_env(), Ok(None));
/// ```
pub fn init_from_env() -> Result<Option<Level>, ParseLevelError> {
    match std::env::var(ENV_VAR) {
        Ok(value) => {
            let level = value.parse()?;
            set_level(level);
            Ok(Some(level))
        }
        Err(_) => Ok(None),
    }
}

#[doc(hidden)]
pub fn __write(level: Level, target: &str, args: Arguments<'_>) {
    const RESET: &str = "\x1b[0m";

    let color = level.color_code();
    eprintln!("{color}[{level}]{RESET} {target}: {args}");
}

/// Logs at an explicit level; the other macros forward here.
///
/// ```
/// use linarena_log::{log, Level};
///
/// log!(level: Level::Error, "reservation of {} bytes failed", 4096);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::logger().enabled(level) {
            $crate::__write(level, module_path!(), format_args!($($arg)*));
        }
    }};
}

/// Logs at [`Level::Error`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs at [`Level::Warn`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs at [`Level::Info`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs at [`Level::Debug`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs at [`Level::Trace`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
