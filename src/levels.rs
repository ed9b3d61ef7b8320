use std::fmt::Formatter;
use std::str::FromStr;

use crate::error::LoggerError;

/// Escape sequence that ends a colored line.
pub const RESET: &str = "\x1b[0m";

/// Severity of a log line, most severe first.
///
/// A logger configured with a threshold emits a line only when its severity is
/// at or above that threshold, i.e. `severity <= threshold` numerically.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical = 1,
    Error = 2,
    Warning = 3,
    Notice = 4,
    Info = 5,
    Debug = 6,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Color used when a logger has colored output turned on.
    pub fn color(&self) -> Color {
        match self {
            Severity::Critical => Color::Magenta,
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Notice => Color::Green,
            Severity::Info => Color::White,
            Severity::Debug => Color::Cyan,
        }
    }

    /// Whether a logger with this threshold lets `severity` through.
    #[inline]
    pub fn admits(&self, severity: Severity) -> bool {
        severity as u8 <= *self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Severity {
        match value {
            1 => Severity::Critical,
            2 => Severity::Error,
            3 => Severity::Warning,
            4 => Severity::Notice,
            5 => Severity::Info,
            _ => Severity::Debug,
        }
    }

    pub(crate) fn from_log(level: log::Level) -> Severity {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info => Severity::Info,
            log::Level::Debug | log::Level::Trace => Severity::Debug,
        }
    }
}

#[cfg(feature = "DEBUG")]
impl Severity {
    pub(crate) fn debug(&self, what: &str) {
        eprintln!(
            "\x1b[90m[formatted_logging]\x1b[0m {}{}:{} {}",
            self.color().escape(), self.as_str(), RESET, what
        )
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Severity::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| LoggerError::UnknownLevel(s.to_string()))
    }
}

/// Terminal foreground colors.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Black = 30,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    pub fn escape(&self) -> String {
        format!("\x1b[{}m", *self as u8)
    }
}
