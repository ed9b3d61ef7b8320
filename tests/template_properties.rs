//! Property-based tests for format translation.

use formatted_logging::format::{translate, DEFAULT_FORMAT, DEFAULT_TIME_FORMAT};
use formatted_logging::{CompiledTemplate, Record, Severity};
use proptest::prelude::*;

const PLACEHOLDERS: [(&str, &str); 9] = [
    ("%{id}", "%[1]d"),
    ("%{time}", "%[2]s"),
    ("%{module}", "%[3]s"),
    ("%{filename}", "%[4]s"),
    ("%{file}", "%[4]s"),
    ("%{line}", "%[5]d"),
    ("%{level}", "%[6]s"),
    ("%{lvl}", "%.3[6]s"),
    ("%{message}", "%[7]s"),
];

/// Literal text that cannot start or end a placeholder.
fn literal_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 :|#▶-]{0,8}").expect("valid regex")
}

fn format_strategy() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec((literal_strategy(), 0..PLACEHOLDERS.len()), 1..12)
}

fn record(message: &str) -> Record {
    Record::new(
        5,
        "T".to_string(),
        "mod".to_string(),
        Severity::Notice,
        "lib.rs".to_string(),
        9,
        message.to_string(),
    )
}

proptest! {
    /// Placeholders become their verbs, once each and in input order.
    #[test]
    fn verbs_follow_the_placeholders(parts in format_strategy(), tail in literal_strategy()) {
        let mut format = String::new();
        let mut expected = String::new();
        for (literal, which) in &parts {
            format.push_str(literal);
            format.push_str(PLACEHOLDERS[*which].0);
            expected.push_str(literal);
            expected.push_str(PLACEHOLDERS[*which].1);
        }
        format.push_str(&tail);
        expected.push_str(&tail);
        prop_assume!(format.len() >= 10);

        let (pattern, layout) = translate(&format);
        prop_assert_eq!(pattern, expected);
        prop_assert_eq!(layout, DEFAULT_TIME_FORMAT);
    }

    /// Anything shorter than "%{message}" compiles to the defaults.
    #[test]
    fn short_input_gives_the_defaults(format in "[%{}a-z:]{0,9}") {
        prop_assume!(format.len() < 10);
        let (pattern, layout) = translate(&format);
        prop_assert_eq!(pattern, DEFAULT_FORMAT);
        prop_assert_eq!(layout, DEFAULT_TIME_FORMAT);
    }

    /// Literal percent signs around the message come out exactly once.
    #[test]
    fn percent_signs_render_literally(
        before in "[a-z% ]{0,10}",
        after in "[a-z% ]{0,10}",
        message in "[a-z%]{0,10}",
    ) {
        let template = CompiledTemplate::compile(&format!("{}%{{message}}{}", before, after));
        let out = record(&message).output(&template);
        prop_assert_eq!(out, format!("{}{}{}", before, message, after));
    }

    /// Unknown placeholders vanish without touching the text around them.
    #[test]
    fn unknown_names_vanish(name in "[a-z]{1,8}", before in "[a-z ]{0,6}", after in "[a-z ]{0,6}") {
        prop_assume!(PLACEHOLDERS.iter().all(|(ph, _)| *ph != format!("%{{{}}}", name)));
        let template = CompiledTemplate::compile(
            &format!("{}%{{{}}}{}%{{message}}", before, name, after)
        );
        let out = record("m").output(&template);
        prop_assert_eq!(out, format!("{}{}m", before, after));
    }

    /// Translation never panics and always yields a renderable template.
    #[test]
    fn arbitrary_input_is_accepted(format in "\\PC{0,40}") {
        let template = CompiledTemplate::compile(&format);
        let _ = record("x").output(&template);
    }
}
