//! Property-based tests for the formatter
//!
//! Random manifests built from resources, assignments, includes and comments, with
//! arbitrary spacing. Formatting must succeed and be a fixed point.

use proptest::prelude::*;
use pupfmt::manifest::{format_source, PupfmtConfig};

const RESERVED: &[&str] = &[
    "and", "case", "class", "default", "define", "else", "elsif", "false", "if", "import",
    "in", "include", "inherits", "node", "or", "true", "undef",
];

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,7}".prop_filter("reserved word", |s| !RESERVED.contains(&s.as_str()))
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,4}",
        "'[a-z ]{0,8}'",
        "\\$[a-z][a-z_]{0,5}",
        name(),
    ]
}

fn gap() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just(" ".to_string()), Just("\n  ".to_string())]
}

fn attribute() -> impl Strategy<Value = String> {
    (name(), gap(), value()).prop_map(|(key, gap, value)| format!("{}{}=>{}{}", key, gap, gap, value))
}

fn statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (name(), "[a-z/]{1,8}", prop::collection::vec(attribute(), 0..4)).prop_map(
            |(kind, title, attributes)| format!("{}{{'{}': {}}}", kind, title, attributes.join(","))
        ),
        ("[a-z][a-z_]{0,5}", value()).prop_map(|(var, value)| format!("${} = {}", var, value)),
        prop::collection::vec(name(), 1..3).prop_map(|names| format!("include {}", names.join(","))),
        "[a-z ]{0,10}".prop_map(|text| format!("#{}", text)),
    ]
}

fn manifest() -> impl Strategy<Value = String> {
    prop::collection::vec((statement(), prop_oneof![Just("\n"), Just("\n\n\n")]), 0..8).prop_map(
        |statements| {
            statements
                .into_iter()
                .map(|(statement, separator)| format!("{}{}", statement, separator))
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn formatting_is_idempotent(source in manifest()) {
        let config = PupfmtConfig::default();
        let once = format_source(&source, &config).expect("generated manifests parse");
        let twice = format_source(&once, &config).expect("formatted output parses");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn output_has_no_trailing_whitespace(source in manifest()) {
        let formatted = format_source(&source, &PupfmtConfig::default())
            .expect("generated manifests parse");
        for line in formatted.lines() {
            prop_assert_eq!(line, line.trim_end());
        }
    }
}
