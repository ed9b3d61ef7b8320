//! `format!`-style shorthands for the per-level methods of [`Logger`](crate::Logger).
//!
//! ```
//! use formatted_logging::{warning, LogContext, LoggerConfig, Sink};
//!
//! let logger = LogContext::new()
//!     .logger(LoggerConfig::default().sink(Sink::stdout()))
//!     .unwrap();
//! warning!(logger, "{} retries left", 3);
//! ```

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $logger.critical(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warning(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! notice {
    ($logger:expr, $($arg:tt)+) => {
        $logger.notice(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(format_args!($($arg)+))
    };
}

/// Logs at `CRITICAL` and exits the process.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(format_args!($($arg)+))
    };
}

/// Logs at `CRITICAL` and unwinds with a [`LogPanic`](crate::LogPanic).
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic(format_args!($($arg)+))
    };
}
