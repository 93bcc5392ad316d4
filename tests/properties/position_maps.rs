//! Property tests for position-map encoding and composition.

use proptest::prelude::*;

use pkgsplit::domain::services::source_map::{decode, encode, Mappings, OriginalPosition, Segment};
use pkgsplit::domain::services::{compose, SourceMap};

/// Lines of segments with strictly increasing generated columns
fn mappings() -> impl Strategy<Value = Mappings> {
    let segment = (1u32..20, 0u32..50, 0u32..200);
    let line = proptest::collection::vec(segment, 0..6).prop_map(|raw| {
        let mut column = 0;
        raw.into_iter()
            .enumerate()
            .map(|(i, (step, line, original_column))| {
                if i > 0 {
                    column += step;
                }
                Segment {
                    generated_column: column,
                    original: Some(OriginalPosition {
                        source: 0,
                        line,
                        column: original_column,
                        name: None,
                    }),
                }
            })
            .collect::<Vec<_>>()
    });
    proptest::collection::vec(line, 1..8)
}

/// `(line, generated column, original line, original column)` for every segment
fn flatten(lines: &Mappings) -> Vec<(usize, u32, u32, u32)> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            line.iter().filter_map(move |s| {
                s.original
                    .map(|o| (i, s.generated_column, o.line, o.column))
            })
        })
        .collect()
}

/// A map whose every segment points at the same position it sits at
fn identity_of(lines: &Mappings) -> SourceMap {
    let identity: Mappings = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            line.iter()
                .map(|s| Segment {
                    generated_column: s.generated_column,
                    original: Some(OriginalPosition {
                        source: 0,
                        line: i as u32,
                        column: s.generated_column,
                        name: None,
                    }),
                })
                .collect()
        })
        .collect();
    SourceMap::from_mappings(
        Some("out.js".to_string()),
        vec![Some("mid.js".to_string())],
        Vec::new(),
        &identity,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Decoding an encoded mapping yields the same segments.
    #[test]
    fn property_encoding_is_lossless(lines in mappings()) {
        let decoded = decode(&encode(&lines)).unwrap();
        prop_assert_eq!(flatten(&decoded), flatten(&lines));
    }

    /// PROPERTY: Composing with an identity stage changes nothing.
    #[test]
    fn property_identity_composition(lines in mappings()) {
        let inner = SourceMap::from_mappings(
            Some("mid.js".to_string()),
            vec![Some("../src/a.ts".to_string())],
            Vec::new(),
            &lines,
        );

        let composed = compose(&identity_of(&lines), &inner).unwrap();

        prop_assert_eq!(composed.file.as_deref(), Some("out.js"));
        if flatten(&lines).is_empty() {
            prop_assert!(composed.sources.is_empty());
        } else {
            prop_assert_eq!(composed.sources.clone(), vec![Some("../src/a.ts".to_string())]);
        }
        prop_assert_eq!(flatten(&composed.decode().unwrap()), flatten(&lines));
    }
}
