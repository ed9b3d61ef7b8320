//! Lets a [`Logger`] serve as the backend of the `log` crate.

use crate::levels::Severity;
use crate::prelude::{discard, Caller, Logger, LoggerError};

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, Severity::from_log(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let severity = Severity::from_log(record.level());
        if !Logger::enabled(self, severity) {
            return;
        }

        let caller = Caller::new(
            record.file().unwrap_or_else(|| record.target()),
            record.line().unwrap_or(0),
        );
        discard(self.emit(severity, caller, record.args().to_string()));
    }

    fn flush(&self) {
        let _ = Logger::flush(self);
    }
}

impl Logger {
    /// Installs this logger as the `log` crate's global backend.
    ///
    /// `log::warn!` and friends then go through this logger's threshold, format and
    /// sink. `log::Level::Trace` is logged as `DEBUG`.
    pub fn install(self) -> Result<(), LoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }
}
