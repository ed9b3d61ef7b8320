use std::env;
use std::ffi::OsString;
use std::fmt::{Arguments, Display, Write};
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;

pub use crate::error::LoggerError;
pub use crate::format::CompiledTemplate;
pub use crate::levels::{Color, Severity};
pub use crate::record::Record;
pub use crate::sink::Sink;

use crate::levels::RESET;
use crate::record::format_time;
use crate::sync::SequenceCounter;

#[cfg(all(feature = "singleton", not(all(test, feature = "loom"))))]
use crate::sync::Lazy;

/// Environment variable read by [`LoggerConfig::from_env`] for the threshold.
const LEVEL_VAR: &str = "LOG_LEVEL";

/// Any value of this variable turns colors off in [`LoggerConfig::from_env`].
const NO_COLOR_VAR: &str = "NO_COLOR";

/// Threshold used when `LOG_LEVEL` is not set.
const FALLBACK_LEVEL: Severity = Severity::Info;

const DEFAULT_MODULE: &str = "DEFAULT";

/// State shared by every logger built from it: the line id sequence and the format new
/// loggers start with.
#[derive(Debug)]
pub struct LogContext {
    sequence: SequenceCounter,
    default_template: RwLock<Arc<CompiledTemplate>>,
}

impl LogContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sequence: SequenceCounter::new(),
            default_template: RwLock::new(Arc::new(CompiledTemplate::default())),
        })
    }

    /// Returns the process-wide context, building it on first use.
    /// Requires the "singleton" feature to be enabled.
    #[cfg(all(feature = "singleton", not(all(test, feature = "loom"))))]
    pub fn global() -> Result<&'static Arc<LogContext>, LoggerError> {
        static CONTEXT: Lazy<Arc<LogContext>> = Lazy::new();

        CONTEXT.get_or_init(|| Ok(LogContext::new()))
    }

    /// Sets the format used by loggers created from now on. Existing loggers keep theirs.
    pub fn set_default_format(&self, format: &str) {
        let template = Arc::new(CompiledTemplate::compile(format));
        *self.default_template.write().unwrap_or_else(PoisonError::into_inner) = template;
    }

    pub fn default_template(&self) -> Arc<CompiledTemplate> {
        self.default_template.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recently issued line id, 0 before the first line.
    pub fn last_id(&self) -> u64 {
        self.sequence.last()
    }

    /// Builds a logger that draws its line ids from this context.
    ///
    /// # Errors
    ///
    /// `InvalidModule` for an empty module name and `InvalidColor` for a negative color.
    pub fn logger(self: &Arc<Self>, config: LoggerConfig) -> Result<Logger, LoggerError> {
        if config.module.is_empty() {
            return Err(LoggerError::InvalidModule);
        }
        let color = config.color.unwrap_or(0);
        if color < 0 {
            return Err(LoggerError::InvalidColor(color));
        }

        Ok(Logger {
            context: self.clone(),
            module: config.module,
            sink: config.sink,
            level: AtomicU8::new(config.level as u8),
            color: AtomicI32::new(color),
            template: RwLock::new(self.default_template()),
        })
    }
}

/// Options for building a [`Logger`].
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Name printed by `%{module}`.
    pub module: String,
    /// `None` or `Some(0)` for plain output, a positive value for colors by severity.
    pub color: Option<i32>,
    pub sink: Sink,
    /// Least severe level that is still written.
    pub level: Severity,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            color: Some(1),
            sink: Sink::stderr(),
            level: FALLBACK_LEVEL,
        }
    }
}

impl LoggerConfig {
    /// Default options, with the threshold taken from `LOG_LEVEL` and colors turned off
    /// when `NO_COLOR` is set to a non-empty value.
    pub fn from_env() -> Result<Self, LoggerError> {
        Self::from_vars(env::var(LEVEL_VAR).ok(), no_color_requested(env::var_os(NO_COLOR_VAR)))
    }

    fn from_vars(level: Option<String>, no_color: bool) -> Result<Self, LoggerError> {
        let level = match level {
            Some(name) => name.parse()?,
            None => FALLBACK_LEVEL,
        };
        let color = if no_color { None } else { Some(1) };

        Ok(Self { level, color, ..Self::default() })
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn color(mut self, color: Option<i32>) -> Self {
        self.color = color;
        self
    }

    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    pub fn level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }
}

/// `NO_COLOR` counts only when it holds a value, see <https://no-color.org>.
fn no_color_requested(value: Option<OsString>) -> bool {
    value.map_or(false, |value| !value.is_empty())
}

/// Where a log call was made.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Caller<'a> {
    file: &'a str,
    line: u32,
}

impl<'a> Caller<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }

    /// The location of the nearest caller not marked `#[track_caller]`.
    #[track_caller]
    pub fn here() -> Caller<'static> {
        Location::caller().into()
    }

    pub fn file(&self) -> &'a str {
        self.file
    }

    /// The file name without its directories.
    pub fn filename(&self) -> &'a str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&'static Location<'static>> for Caller<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Caller::new(location.file(), location.line())
    }
}

/// Payload of the unwind started by [`Logger::panic`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogPanic {
    pub message: String,
}

impl Display for LogPanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Drops the result of a convenience call.
#[inline]
pub(crate) fn discard(result: Result<(), LoggerError>) {
    #[cfg(feature = "DEBUG")]
    if let Err(e) = &result {
        Severity::Error.debug(&format!("dropped log line: {}", e));
    }
    let _ = result;
}

/// Writes leveled, formatted lines to a [`Sink`].
///
/// Every method that logs is `#[track_caller]`: `%{filename}` and `%{line}` name the
/// code that called the logger, including through the crate's macros and through user
/// helpers that are themselves `#[track_caller]`.
///
/// Threshold, color and format can be changed at any time from any thread; a change is
/// seen by lines started after it.
#[derive(Debug)]
pub struct Logger {
    context: Arc<LogContext>,
    module: String,
    sink: Sink,
    level: AtomicU8,
    color: AtomicI32,
    template: RwLock<Arc<CompiledTemplate>>,
}

impl Logger {
    /// Returns the process-wide default logger (module `DEFAULT`, stderr, colors, `INFO`),
    /// building it on first use.
    /// Requires the "singleton" feature to be enabled.
    #[cfg(all(feature = "singleton", not(all(test, feature = "loom"))))]
    pub fn global() -> Result<&'static Logger, LoggerError> {
        static LOGGER: Lazy<Logger> = Lazy::new();

        LOGGER.get_or_init(|| LogContext::global()?.logger(LoggerConfig::default()))
    }

    pub fn context(&self) -> &Arc<LogContext> {
        &self.context
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn level(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Severity) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn color(&self) -> i32 {
        self.color.load(Ordering::Relaxed)
    }

    /// `0` turns colors off, a positive value turns them on.
    pub fn set_color(&self, color: i32) -> Result<(), LoggerError> {
        if color < 0 {
            return Err(LoggerError::InvalidColor(color));
        }
        self.color.store(color, Ordering::Relaxed);
        Ok(())
    }

    pub fn template(&self) -> Arc<CompiledTemplate> {
        self.template.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_template(&self, template: CompiledTemplate) {
        *self.template.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(template);
    }

    /// Compiles `format` (see [`translate`](crate::format::translate)) and uses it for
    /// every following line.
    pub fn set_format(&self, format: &str) {
        self.set_template(CompiledTemplate::compile(format));
    }

    /// Whether a line of this severity passes the threshold.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        self.level().admits(severity)
    }

    /// Renders and writes one line.
    ///
    /// Lines below the threshold are dropped before an id is taken. A colored line is
    /// wrapped in the severity's escape and a reset. The only error is the sink's.
    pub fn emit(
        &self, severity: Severity, caller: Caller<'_>, message: String
    ) -> Result<(), LoggerError> {
        if !self.enabled(severity) {
            return Ok(());
        }

        let template = self.template();
        let record = Record::new(
            self.context.sequence.next(),
            format_time(&Local::now(), template.time_layout()),
            self.module.clone(),
            severity,
            caller.filename().to_string(),
            caller.line(),
            message,
        );
        let line = record.output(&template);

        if self.color() != 0 {
            let mut colored = String::with_capacity(line.len() + 12);
            colored.push_str(&severity.color().escape());
            colored.push_str(&line);
            colored.push_str(RESET);
            self.sink.output(&colored)
        } else {
            self.sink.output(&line)
        }
    }

    /// Logs pre-built format arguments, as produced by `format_args!`.
    #[track_caller]
    pub fn log_args(&self, severity: Severity, args: Arguments<'_>) -> Result<(), LoggerError> {
        let caller = Caller::here();
        if !self.enabled(severity) {
            return Ok(());
        }
        self.emit(severity, caller, std::fmt::format(args))
    }

    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl Display) -> Result<(), LoggerError> {
        self.log_args(severity, format_args!("{}", message))
    }

    #[track_caller]
    pub fn critical(&self, message: impl Display) {
        discard(self.log(Severity::Critical, message))
    }

    #[track_caller]
    pub fn error(&self, message: impl Display) {
        discard(self.log(Severity::Error, message))
    }

    #[track_caller]
    pub fn warning(&self, message: impl Display) {
        discard(self.log(Severity::Warning, message))
    }

    #[track_caller]
    pub fn notice(&self, message: impl Display) {
        discard(self.log(Severity::Notice, message))
    }

    #[track_caller]
    pub fn info(&self, message: impl Display) {
        discard(self.log(Severity::Info, message))
    }

    #[track_caller]
    pub fn debug(&self, message: impl Display) {
        discard(self.log(Severity::Debug, message))
    }

    /// Logs at `CRITICAL`, then exits the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl Display) -> ! {
        discard(self.log(Severity::Critical, message));
        let _ = self.flush();
        std::process::exit(1)
    }

    /// Logs at `CRITICAL`, then unwinds with a [`LogPanic`] payload carrying the message.
    #[track_caller]
    pub fn panic(&self, message: impl Display) -> ! {
        let message = message.to_string();
        discard(self.log(Severity::Critical, &message));
        std::panic::panic_any(LogPanic { message })
    }

    /// Logs `message` (or "Stack info" when it is empty) followed by a backtrace, at `ERROR`.
    #[track_caller]
    pub fn stack_as_error(&self, message: impl Display) {
        self.stack_as(Severity::Error, message)
    }

    /// Same as [`Logger::stack_as_error`] at `CRITICAL`.
    #[track_caller]
    pub fn stack_as_critical(&self, message: impl Display) {
        self.stack_as(Severity::Critical, message)
    }

    #[track_caller]
    fn stack_as(&self, severity: Severity, message: impl Display) {
        let mut message = message.to_string();
        if message.is_empty() {
            message.push_str("Stack info");
        }
        let _ = write!(message, "\n{}", std::backtrace::Backtrace::force_capture());
        discard(self.log(severity, message))
    }

    pub fn flush(&self) -> Result<(), LoggerError> {
        self.sink.flush()
    }
}

#[cfg(all(test, not(feature = "loom")))]
pub(crate) mod tests {
    use super::*;
    use crate::sink::tests::Buffer;

    pub(crate) fn buffered(ctx: &Arc<LogContext>, level: Severity) -> (Logger, Buffer) {
        let buffer = Buffer::default();
        let logger = ctx
            .logger(
                LoggerConfig::default()
                    .module("test")
                    .color(None)
                    .sink(Sink::new(buffer.clone()))
                    .level(level),
            )
            .unwrap();
        (logger, buffer)
    }

    #[test]
    fn threshold_filters_less_severe_lines() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Warning);
        logger.set_format("%{level} %{message}");

        logger.info("quiet");
        logger.notice("quiet");
        assert_eq!(buffer.contents(), "");
        assert_eq!(ctx.last_id(), 0);

        logger.error("loud");
        logger.warning("also loud");
        assert_eq!(buffer.contents(), "ERROR loud\nWARNING also loud\n");
    }

    #[test]
    fn default_format_names_the_call_site() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);

        logger.info("hello");
        let line = line!() - 1;

        let out = buffer.contents();
        assert!(out.starts_with("#1 "), "{}", out);
        assert!(out.ends_with(&format!(" prelude.rs:{} ▶ INF hello\n", line)), "{}", out);
    }

    #[test]
    fn ids_are_shared_by_loggers_of_a_context() {
        let ctx = LogContext::new();
        let (first, first_out) = buffered(&ctx, Severity::Debug);
        let (second, second_out) = buffered(&ctx, Severity::Debug);
        first.set_format("%{id} %{message}");
        second.set_format("%{id} %{message}");

        first.info("a");
        second.info("b");
        first.info("c");

        assert_eq!(first_out.contents(), "1 a\n3 c\n");
        assert_eq!(second_out.contents(), "2 b\n");

        let (other, other_out) = buffered(&LogContext::new(), Severity::Debug);
        other.set_format("%{id} %{message}");
        other.info("d");
        assert_eq!(other_out.contents(), "1 d\n");
    }

    #[test]
    fn colored_lines_are_wrapped() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);
        logger.set_format("%{lvl}: %{message}");
        logger.set_color(1).unwrap();

        logger.error("boom");
        assert_eq!(buffer.contents(), "\x1b[31mERR: boom\x1b[0m\n");

        logger.set_color(0).unwrap();
        logger.debug("plain");
        assert_eq!(buffer.contents(), "\x1b[31mERR: boom\x1b[0m\nDEB: plain\n");
    }

    #[test]
    fn module_and_time_layout() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);
        logger.set_format("[%{module}] %{time:%Y} %{message}");
        logger.notice("n");

        let year = Local::now().format("%Y").to_string();
        assert_eq!(buffer.contents(), format!("[test] {} n\n", year));
    }

    #[test]
    fn default_format_of_the_context_applies_to_new_loggers() {
        let ctx = LogContext::new();
        let (before, before_out) = buffered(&ctx, Severity::Debug);
        ctx.set_default_format("<%{lvl}> %{message}");
        let (after, after_out) = buffered(&ctx, Severity::Debug);

        before.set_format("%{message}");
        before.info("old");
        after.info("new");

        assert_eq!(before_out.contents(), "old\n");
        assert_eq!(after_out.contents(), "<INF> new\n");
    }

    #[test]
    fn compiled_templates_are_reused_as_is() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);
        let template = CompiledTemplate::compile("100% %{message}");
        logger.set_template(template.clone());

        assert_eq!(logger.template().pattern(), "100%% %[7]s");
        assert_eq!(*logger.template(), template);
        logger.info("sure");
        assert_eq!(buffer.contents(), "100% sure\n");
    }

    #[test]
    fn construction_rejects_bad_options() {
        let ctx = LogContext::new();
        assert!(matches!(
            ctx.logger(LoggerConfig::default().module("")),
            Err(LoggerError::InvalidModule)
        ));
        assert!(matches!(
            ctx.logger(LoggerConfig::default().color(Some(-1))),
            Err(LoggerError::InvalidColor(-1))
        ));

        let logger = ctx.logger(LoggerConfig::default().color(None)).unwrap();
        assert_eq!(logger.color(), 0);
        assert_eq!(logger.module(), "DEFAULT");
        assert_eq!(logger.level(), Severity::Info);
        assert!(matches!(logger.set_color(-5), Err(LoggerError::InvalidColor(-5))));
    }

    #[test]
    fn config_from_vars() {
        let config = LoggerConfig::from_vars(Some("debug".to_string()), true).unwrap();
        assert_eq!(config.level, Severity::Debug);
        assert_eq!(config.color, None);

        let config = LoggerConfig::from_vars(None, false).unwrap();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.color, Some(1));

        assert!(matches!(
            LoggerConfig::from_vars(Some("verbose".to_string()), false),
            Err(LoggerError::UnknownLevel(_))
        ));
    }

    #[test]
    fn empty_no_color_keeps_colors() {
        assert!(!no_color_requested(None));
        assert!(!no_color_requested(Some(OsString::new())));
        assert!(no_color_requested(Some(OsString::from("1"))));
    }

    #[test]
    fn caller_keeps_only_the_base_name() {
        assert_eq!(Caller::new("src/deep/dir/main.rs", 3).filename(), "main.rs");
        assert_eq!(Caller::new("main.rs", 3).filename(), "main.rs");

        let here = Caller::here();
        let line = line!() - 1;
        assert_eq!(here.filename(), "prelude.rs");
        assert_eq!(here.line(), line);
    }

    #[test]
    fn panic_unwinds_with_the_message() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);
        logger.set_format("%{level} %{message}");

        let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            logger.panic("cannot continue")
        }))
        .unwrap_err();

        let payload = payload.downcast::<LogPanic>().unwrap();
        assert_eq!(payload.message, "cannot continue");
        assert_eq!(buffer.contents(), "CRITICAL cannot continue\n");
    }

    #[test]
    fn stack_lines_start_with_the_message() {
        let ctx = LogContext::new();
        let (logger, buffer) = buffered(&ctx, Severity::Debug);
        logger.set_format("%{level} %{message}");

        logger.stack_as_error("");
        assert!(buffer.contents().starts_with("ERROR Stack info\n"));
    }
}
