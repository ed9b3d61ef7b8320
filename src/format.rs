//! Translation of `%{placeholder}` line formats into positional templates.
//!
//! A user format such as `"%{time:%H:%M} %{lvl} %{message}"` is compiled once into
//! a printf-like positional pattern (`"%[2]s %.3[6]s %[7]s"`) and a time layout
//! (`"%H:%M"`). Every log line is then rendered from the compiled form; see
//! [`Record::output`](crate::record::Record::output).

use crate::record::{parse_pattern, Segment};

/// Pattern used when no format is set, or when the given format is too short to hold a
/// placeholder.
pub const DEFAULT_FORMAT: &str = "#%[1]d %[2]s %[4]s:%[5]d ▶ %.3[6]s %[7]s";

/// chrono strftime layout used when the format has no `%{time:LAYOUT}` argument.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats shorter than `%{message}` are replaced by the defaults.
const MIN_FORMAT_LEN: usize = "%{message}".len();

const TIME_VERB: &str = "%[2]s";

/// Maps a complete placeholder (`"%{name}"` or `"%{name:arg}"`) to its positional verb
/// and argument. Unknown names map to an empty verb.
pub(crate) fn placeholder_verb(ph: &str) -> (&'static str, &str) {
    let body = match ph.strip_prefix("%{").and_then(|p| p.strip_suffix('}')) {
        Some(body) => body,
        None => return ("", ""),
    };
    let (name, arg) = body.split_once(':').unwrap_or((body, ""));
    let verb = match name {
        "id" => "%[1]d",
        "time" => TIME_VERB,
        "module" => "%[3]s",
        "filename" | "file" => "%[4]s",
        "line" => "%[5]d",
        "level" => "%[6]s",
        "lvl" => "%.3[6]s",
        "message" => "%[7]s",
        _ => "",
    };
    (verb, arg)
}

/// Splits a user format into the positional pattern and the time layout.
///
/// Never fails. Literal `%` characters are doubled, unknown placeholders vanish,
/// a `%{` without a closing brace loses its `%`, and a `%{` that runs into another
/// `%{` before its `}` is kept as literal text. The last `%{time:LAYOUT}` wins.
pub fn translate(format: &str) -> (String, String) {
    if format.len() < MIN_FORMAT_LEN {
        return (DEFAULT_FORMAT.to_string(), DEFAULT_TIME_FORMAT.to_string());
    }

    let mut pattern = String::with_capacity(format.len() + 16);
    let mut time_layout = DEFAULT_TIME_FORMAT.to_string();
    let mut rest = format;

    while let Some(idx) = rest.find('%') {
        pattern.push_str(&rest[..idx]);
        rest = &rest[idx..];

        if rest.len() <= 2 || !rest[1..].starts_with('{') {
            pattern.push_str("%%");
            rest = &rest[1..];
            continue;
        }

        let close = match rest.find('}') {
            Some(close) => close,
            None => {
                rest = &rest[1..];
                continue;
            }
        };

        // "%{oops %{message}": the first opener is literal text.
        if let Some(next) = rest[1..].find("%{") {
            if next + 1 < close {
                pattern.push_str("%%");
                rest = &rest[1..];
                continue;
            }
        }

        let (verb, arg) = placeholder_verb(&rest[..=close]);
        pattern.push_str(verb);
        if verb == TIME_VERB && !arg.is_empty() {
            time_layout = arg.to_string();
        }
        rest = &rest[close + 1..];
    }
    pattern.push_str(rest);

    (pattern, time_layout)
}

/// A translated format: positional pattern, time layout and the pattern's parsed form.
///
/// Only [`CompiledTemplate::compile`] produces one from user input, so a compiled
/// pattern is never run through the translator a second time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledTemplate {
    pattern: String,
    time_layout: String,
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn compile(format: &str) -> Self {
        #[cfg(feature = "DEBUG")]
        if format.len() < MIN_FORMAT_LEN {
            crate::levels::Severity::Notice.debug(&format!(
                "format {:?} is too short, using the default format", format
            ));
        }

        let (pattern, time_layout) = translate(format);
        Self::from_parts(pattern, time_layout)
    }

    fn from_parts(pattern: String, time_layout: String) -> Self {
        let segments = parse_pattern(&pattern);
        Self { pattern, time_layout, segments }
    }

    /// The positional pattern, e.g. `"#%[1]d %[7]s"`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn time_layout(&self) -> &str {
        &self.time_layout
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl Default for CompiledTemplate {
    fn default() -> Self {
        Self::from_parts(DEFAULT_FORMAT.to_string(), DEFAULT_TIME_FORMAT.to_string())
    }
}
