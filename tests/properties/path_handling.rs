//! Property tests for lexical path arithmetic.

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use pkgsplit::domain::value_objects::{normalize, relative_path, to_specifier};

fn segments() -> impl Strategy<Value = Vec<String>> {
    let segment = proptest::string::string_regex("[a-z0-9_-]{1,8}").unwrap();
    proptest::collection::vec(segment, 0..5)
}

fn absolute(segments: &[String]) -> PathBuf {
    let mut path = PathBuf::from("/");
    path.extend(segments);
    path
}

/// Relative suffixes that may wander through `.` and `..`
fn messy_suffix() -> impl Strategy<Value = String> {
    let part = prop_oneof![
        3 => proptest::string::string_regex("[a-z]{1,4}").unwrap(),
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ];
    proptest::collection::vec(part, 0..8).prop_map(|parts| parts.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Joining the relative path onto its base lands on the target.
    #[test]
    fn property_relative_path_round_trips(from in segments(), to in segments()) {
        let from = absolute(&from);
        let to = absolute(&to);

        let rel = relative_path(&from, &to);
        prop_assert_eq!(normalize(&from.join(&rel)), to);
    }

    /// PROPERTY: Specifiers never look like bare package names.
    #[test]
    fn property_specifier_is_relative(from in segments(), to in segments()) {
        let rel = relative_path(&absolute(&from), &absolute(&to).join("index.js"));
        let specifier = to_specifier(&rel);

        prop_assert!(specifier.starts_with("./") || specifier.starts_with("../"), "{}", specifier);
        prop_assert!(!specifier.contains('\\'));
    }

    /// PROPERTY: Normalization is idempotent and leaves no `.` behind.
    #[test]
    fn property_normalize_is_idempotent(base in segments(), suffix in messy_suffix()) {
        let path = absolute(&base).join(&suffix);
        let once = normalize(&path);

        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once.is_absolute());
        prop_assert!(once
            .components()
            .all(|c| !matches!(c, std::path::Component::CurDir | std::path::Component::ParentDir)));
    }

    /// PROPERTY: Normalization never panics on arbitrary input.
    #[test]
    fn property_normalize_never_panics(s in "(?s).{0,128}") {
        let _ = normalize(Path::new(&s));
    }
}
