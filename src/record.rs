use std::fmt::Write;

use chrono::{DateTime, TimeZone};

use crate::format::{CompiledTemplate, DEFAULT_TIME_FORMAT};
use crate::levels::Severity;

/// One piece of a parsed positional pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    /// `%[index]v`, or `%.precision[index]v`.
    Slot { index: usize, precision: Option<usize> },
}

/// Parses a positional pattern (`%%`, `%[N]v`, `%.P[N]v`) into segments.
///
/// A `%` that starts none of those is kept as literal text.
pub(crate) fn parse_pattern(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;

    while let Some(idx) = rest.find('%') {
        literal.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];

        if let Some(stripped) = rest.strip_prefix('%') {
            literal.push('%');
            rest = stripped;
            continue;
        }

        match parse_directive(rest) {
            Some((slot, consumed)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(core::mem::take(&mut literal)));
                }
                segments.push(slot);
                rest = &rest[consumed..];
            }
            None => literal.push('%'),
        }
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

fn leading_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Parses the text following a `%`. Returns the slot and the number of bytes it used.
fn parse_directive(s: &str) -> Option<(Segment, usize)> {
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut precision = None;

    if bytes.first() == Some(&b'.') {
        let digits = leading_digits(&bytes[1..]);
        // "%.[6]s" is a precision of zero.
        precision = Some(s[1..1 + digits].parse().unwrap_or(0));
        pos = 1 + digits;
    }

    if bytes.get(pos) != Some(&b'[') {
        return None;
    }
    let digits = leading_digits(&bytes[pos + 1..]);
    if digits == 0 || bytes.get(pos + 1 + digits) != Some(&b']') {
        return None;
    }
    let index = s[pos + 1..pos + 1 + digits].parse().ok()?;
    pos += digits + 2;

    match bytes.get(pos) {
        Some(verb) if verb.is_ascii_alphabetic() => {
            Some((Segment::Slot { index, precision }, pos + 1))
        }
        _ => None,
    }
}

/// Formats `now` with a chrono strftime layout, falling back to the default layout when
/// chrono rejects the given one.
pub(crate) fn format_time<Tz>(now: &DateTime<Tz>, layout: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", now.format(layout)).is_err() {
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_TIME_FORMAT));
    }
    out
}

/// Everything known about one log call.
///
/// Built once by the logger and only read afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    id: u64,
    time: String,
    module: String,
    level: Severity,
    filename: String,
    line: u32,
    message: String,
}

impl Record {
    pub fn new(
        id: u64,
        time: String,
        module: String,
        level: Severity,
        filename: String,
        line: u32,
        message: String,
    ) -> Self {
        Self { id, time, module, level, filename, line, message }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Renders the record through a compiled template.
    ///
    /// Slots: 1 id, 2 time, 3 module, 4 filename, 5 line, 6 level, 7 message.
    /// The time is already formatted; the template's time layout is not applied again.
    pub fn output(&self, template: &CompiledTemplate) -> String {
        let mut out = String::with_capacity(template.pattern().len() + self.message.len() + 32);
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot { index, precision } => self.write_slot(&mut out, *index, *precision),
            }
        }
        out
    }

    fn write_slot(&self, out: &mut String, index: usize, precision: Option<usize>) {
        match index {
            1 => push_number(out, self.id, precision),
            2 => push_text(out, &self.time, precision),
            3 => push_text(out, &self.module, precision),
            4 => push_text(out, &self.filename, precision),
            5 => push_number(out, u64::from(self.line), precision),
            6 => push_text(out, self.level.as_str(), precision),
            7 => push_text(out, &self.message, precision),
            _ => {}
        }
    }
}

/// Precision on a string is a maximum number of characters.
fn push_text(out: &mut String, text: &str, precision: Option<usize>) {
    match precision {
        Some(max) => out.extend(text.chars().take(max)),
        None => out.push_str(text),
    }
}

/// Precision on a number is a minimum number of digits.
fn push_number(out: &mut String, value: u64, precision: Option<usize>) {
    let _ = match precision {
        Some(width) => write!(out, "{:0width$}", value, width = width),
        None => write!(out, "{}", value),
    };
}
