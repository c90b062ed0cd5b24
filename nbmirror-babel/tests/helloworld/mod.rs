//! The Java hello-world notebook in every built-in format
//!
//! The fixtures are the exact expected text. Each test checks both directions: the
//! notebook marshals to the fixture, and the fixture parses back to the notebook.

use crate::common::{assert_parses_to, fixture, helloworld, without_header};
use nbmirror_babel::{CellKind, DetectHint, MarshalOptions, MirrorRegistry};

#[test]
fn test_percent_fixture() {
    let registry = MirrorRegistry::default();
    let nb = helloworld();
    let expected = fixture("helloworld.percent.java");

    let text = registry
        .marshal(&nb, "percent", &MarshalOptions::default())
        .unwrap();
    assert_eq!(text, expected);
    assert_parses_to(&registry, &expected, "percent", &nb);
}

#[test]
fn test_light_fixture() {
    let registry = MirrorRegistry::default();
    let nb = helloworld();
    let expected = fixture("helloworld.light.java");

    let text = registry
        .marshal(&nb, "light", &MarshalOptions::default())
        .unwrap();
    assert_eq!(text, expected);
    assert_parses_to(&registry, &expected, "light", &nb);
}

#[test]
fn test_nbconvert_fixture_without_header() {
    let registry = MirrorRegistry::default();
    let nb = helloworld();
    let expected = fixture("helloworld.nbconvert.java");

    let text = registry.marshal(&nb, "nbconvert", &without_header()).unwrap();
    assert_eq!(text, expected);

    let parsed = registry.parse(&expected, "java", "nbconvert").unwrap();
    assert_eq!(parsed.cells.len(), 5);
    assert_eq!(parsed.cells[4].source.len(), 4);
    assert!(parsed.cells.iter().all(|cell| cell.explicit_type_marker));
}

#[test]
fn test_percent_cells_and_markers() {
    let registry = MirrorRegistry::default();
    let parsed = registry
        .parse(&fixture("helloworld.percent.java"), "java", "percent")
        .unwrap();

    let kinds: Vec<CellKind> = parsed.cells.iter().map(|cell| cell.kind).collect();
    assert_eq!(
        kinds,
        vec![
            CellKind::Markdown,
            CellKind::Code,
            CellKind::Markdown,
            CellKind::Code,
            CellKind::Markdown
        ]
    );
    // Bare `%%` markers read back as implicit code cells
    assert!(!parsed.cells[1].explicit_type_marker);
    assert!(parsed.cells[0].explicit_type_marker);
    assert_eq!(parsed.cells[1].source[3], "    }   ");
    assert_eq!(
        parsed.metadata.get("encoding"),
        Some(&serde_json::json!("// -*- coding: utf-8 -*-"))
    );
}

#[test]
fn test_fixtures_are_detected() {
    let registry = MirrorRegistry::default();
    for format in ["percent", "light", "nbconvert"] {
        let text = fixture(&format!("helloworld.{format}.java"));
        let found = registry
            .detect(&text, &DetectHint::from_filename("simple-helloworld.java"))
            .unwrap()
            .unwrap();
        assert_eq!(found.format_id, format);
        assert_eq!(found.language_id, "java");
    }
}

#[test]
fn test_fixtures_are_canonical() {
    let registry = MirrorRegistry::default();
    for format in ["percent", "light"] {
        let text = fixture(&format!("helloworld.{format}.java"));
        assert_eq!(registry.normalize_text(&text, "java").unwrap(), text);
        let resaved = nbmirror_babel::transforms::reformat(
            &registry,
            &text,
            "java",
            format,
            &MarshalOptions::default(),
        )
        .unwrap();
        assert_eq!(resaved, text);
    }
}
