use std::fmt::Formatter;

pub enum LoggerError {
    Io(std::io::Error),
    InvalidModule,
    InvalidColor(i32),
    UnknownLevel(String),
    SetLogger(log::SetLoggerError),
    Poisoned,
}

fn format_logger_error(l: &LoggerError, fmt: &mut Formatter) -> std::fmt::Result {
    match l {
        LoggerError::Io(e) => {
            write!(fmt, "Sink Write Failed: {}", e)
        }
        LoggerError::InvalidModule => {
            write!(fmt, "Invalid Module Name")
        }
        LoggerError::InvalidColor(code) => {
            write!(fmt, "Invalid Color Code: {}", code)
        }
        LoggerError::UnknownLevel(name) => {
            write!(fmt, "Unknown Log Level: {:?}", name)
        }
        LoggerError::SetLogger(e) => {
            write!(fmt, "SetLoggerError: {:?}", e)
        }
        LoggerError::Poisoned => {
            write!(fmt, "Poisoned")
        }
    }
}

impl From<std::io::Error> for LoggerError {
    fn from(e: std::io::Error) -> Self {
        LoggerError::Io(e)
    }
}

impl From<log::SetLoggerError> for LoggerError {
    fn from(e: log::SetLoggerError) -> Self {
        LoggerError::SetLogger(e)
    }
}

impl<T> From<std::sync::PoisonError<T>> for LoggerError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        LoggerError::Poisoned
    }
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        format_logger_error(self, f)
    }
}

impl std::fmt::Debug for LoggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        format_logger_error(self, f)
    }
}

impl std::error::Error for LoggerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggerError::Io(e) => Some(e),
            LoggerError::SetLogger(e) => Some(e),
            _ => None,
        }
    }
}
