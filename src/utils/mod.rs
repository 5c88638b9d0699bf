//! Logging: dynamic level derived from -v/-q, zero dependencies.
//!
//! Everything goes to stderr so the serve front end's stdout stays clean
//! for the request/response protocol.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum LogLevel {
    Error = 0,
    Info = 1,
    Debug = 2,
    Trace = 3,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

static GLOBAL_LEVEL: OnceLock<AtomicU8> = OnceLock::new();

fn level_cell() -> &'static AtomicU8 {
    GLOBAL_LEVEL.get_or_init(|| AtomicU8::new(LogLevel::Info as u8))
}

pub fn init_logging(level: LogLevel) {
    level_cell().store(level as u8, Ordering::Relaxed);
}

pub fn current_log_level() -> LogLevel {
    match level_cell().load(Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Map -v/-vv occurrences and --quiet onto a level.
pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
    if quiet {
        return LogLevel::Error;
    }
    match verbose {
        0 => LogLevel::Info,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

pub fn log(level: LogLevel, msg: impl AsRef<str>) {
    if level <= current_log_level() {
        eprintln!("[{}] {}", level.as_str(), msg.as_ref());
    }
}

pub fn error(msg: impl AsRef<str>) {
    log(LogLevel::Error, msg);
}
pub fn info(msg: impl AsRef<str>) {
    log(LogLevel::Info, msg);
}
pub fn debug(msg: impl AsRef<str>) {
    log(LogLevel::Debug, msg);
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::utils::error(format!($($t)*)) };
}
#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => { $crate::utils::info(format!($($t)*)) };
}
#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::utils::debug(format!($($t)*)) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(derive_level(2, true), LogLevel::Error);
    }

    #[test]
    fn verbosity_ladder() {
        assert_eq!(derive_level(0, false), LogLevel::Info);
        assert_eq!(derive_level(1, false), LogLevel::Debug);
        assert_eq!(derive_level(5, false), LogLevel::Trace);
    }
}
