//! Explicit marker formats: percent, hydrogen and nbconvert

use crate::common::{assert_parses_to, without_header};
use insta::assert_snapshot;
use nbmirror_babel::{
    Cell, CellKind, DetectHint, FormatDescriptor, FormatError, MarshalOptions, MirrorRegistry,
    Notebook,
};
use nbmirror_babel::format::HeaderRule;
use serde_json::json;

#[test]
fn test_percent_titles_and_metadata() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![
        Cell::markdown("# Report").with_metadata("title", json!("Overview")),
        Cell::code("df = load()")
            .with_metadata("title", json!("Load"))
            .with_metadata("tags", json!(["parameters"])),
        Cell::raw("{{ raw }}").with_metadata("format", json!("text/html")),
    ])
    .with_language("python");

    let text = registry.marshal(&nb, "percent", &without_header()).unwrap();
    assert_snapshot!(text, @r#"
    # %% Overview [markdown]
    # # Report

    # %% tags=["parameters"] title="Load"
    df = load()

    # %% [raw] format="text/html"
    {{ raw }}
    "#);

    let parsed = registry.parse(&text, "python", "percent").unwrap();
    assert_eq!(registry.normalize(&parsed), registry.normalize(&nb));
}

#[test]
fn test_explicit_code_marker_is_preserved() {
    let registry = MirrorRegistry::default();
    let text = "// %% [code]\nint x;\n";
    let parsed = registry.parse(text, "java", "percent").unwrap();
    assert!(parsed.cells[0].explicit_type_marker);
    assert_eq!(
        registry.marshal(&parsed, "percent", &without_header()).unwrap(),
        text
    );
}

#[test]
fn test_unknown_type_token() {
    let registry = MirrorRegistry::default();
    let err = registry
        .parse("// %%\nint x;\n\n// %% [widget]\n", "java", "percent")
        .unwrap_err();
    assert_eq!(
        err,
        FormatError::UnsupportedCellType {
            line: Some(4),
            token: "widget".to_string()
        }
    );
    assert_eq!(err.to_string(), "Unsupported cell type 'widget' at line 4");
}

#[test]
fn test_markdown_that_looks_like_a_marker_is_refused() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::markdown("%% not a marker")]).with_language("rust");
    let err = registry
        .marshal(&nb, "percent", &without_header())
        .unwrap_err();
    assert!(matches!(err, FormatError::AmbiguousCellBoundary { .. }));

    // Another marker grammar only takes it once a header names the format
    assert!(registry.marshal(&nb, "nbconvert", &without_header()).is_err());
    let text = registry
        .marshal(&nb, "nbconvert", &MarshalOptions::default())
        .unwrap();
    assert_parses_to(&registry, &text, "nbconvert", &nb);
}

#[test]
fn test_hydrogen_shares_the_percent_grammar() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![
        Cell::markdown("Plot"),
        Cell::code("%matplotlib inline
plot(x)"),
    ])
    .with_language("python");

    let body = registry.marshal(&nb, "hydrogen", &without_header()).unwrap();
    assert_eq!(
        body,
        registry.marshal(&nb, "percent", &without_header()).unwrap()
    );
    assert_eq!(body, "# %% [markdown]\n# Plot\n\n# %%\n%matplotlib inline\nplot(x)\n");

    let text = registry
        .marshal(&nb, "hydrogen", &MarshalOptions::default())
        .unwrap();
    assert!(text.contains("format_name: hydrogen"));
    assert_parses_to(&registry, &text, "hydrogen", &nb);
    let found = registry
        .detect(&text, &DetectHint::default())
        .unwrap()
        .unwrap();
    assert_eq!(found.format_id, "hydrogen");

    // Without a header the same body reads as percent
    let hint = DetectHint::default().with_language("python");
    let found = registry.detect(&body, &hint).unwrap().unwrap();
    assert_eq!(found.format_id, "percent");
}

#[test]
fn test_newer_format_version_is_refused() {
    let registry = MirrorRegistry::default();
    let text = "# ---\n# jupyter:\n#   language_id: python\n#   text_representation:\n#     format_name: percent\n#     format_version: 2\n# ---\n\n# %%\nx = 1\n";
    let err = registry.parse(text, "python", "percent").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Header parse error at line 1: format version 2 is newer than supported version 1"
    );
}

#[test]
fn test_header_language_is_checked() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("int x;")]).with_language("java");
    let text = registry
        .marshal(&nb, "percent", &MarshalOptions::default())
        .unwrap();
    assert!(registry.parse(&text, "java", "percent").is_ok());
    let err = registry.parse(&text, "c++", "percent").unwrap_err();
    assert!(matches!(err, FormatError::HeaderParseError { line: 1, .. }));
}

#[test]
fn test_required_header() {
    let mut registry = MirrorRegistry::default();
    registry.register_format(FormatDescriptor {
        id: "strict".to_string(),
        header: HeaderRule {
            required: true,
            ..HeaderRule::default()
        },
        inferable: false,
        ..nbmirror_babel::formats::percent()
    });
    let nb = Notebook::new(vec![Cell::code("int x;")]).with_language("java");

    let body = registry.marshal(&nb, "strict", &without_header()).unwrap();
    let err = registry.parse(&body, "java", "strict").unwrap_err();
    assert_eq!(
        err,
        FormatError::HeaderParseError {
            line: 1,
            message: "missing header block".to_string()
        }
    );

    let text = registry
        .marshal(&nb, "strict", &MarshalOptions::default())
        .unwrap();
    assert_parses_to(&registry, &text, "strict", &nb);
}

#[test]
fn test_pragma_free_language_refuses_shebang() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("fn main() {}")])
        .with_language("rust")
        .with_metadata("executable", json!("/usr/bin/env run-cargo-script"));
    let err = registry
        .marshal(&nb, "percent", &MarshalOptions::default())
        .unwrap_err();
    assert!(matches!(err, FormatError::InvalidMetadata { .. }));

    let nb = Notebook::new(vec![Cell::code("fn main() {}")])
        .with_language("rust")
        .with_metadata("encoding", json!("// -*- coding: utf-8 -*-"));
    let err = registry
        .marshal(&nb, "light", &MarshalOptions::default())
        .unwrap_err();
    assert!(matches!(err, FormatError::InvalidMetadata { .. }));
}

#[test]
fn test_nbconvert_round_trip_for_sql() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![
        Cell::markdown("Monthly totals"),
        Cell::code("SELECT month, SUM(amount)\nFROM sales\nGROUP BY month;"),
    ])
    .with_language("sql");
    let text = registry.marshal(&nb, "nbconvert", &without_header()).unwrap();
    assert_eq!(
        text,
        "-- <markdowncell>\n-- Monthly totals\n\n-- <codecell>\nSELECT month, SUM(amount)\nFROM sales\nGROUP BY month;\n"
    );
    let parsed = registry.parse(&text, "sql", "nbconvert").unwrap();
    assert_eq!(parsed.cells[1].kind, CellKind::Code);
    assert_eq!(registry.normalize(&parsed), registry.normalize(&nb));
}

#[test]
fn test_block_comment_language() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::markdown("Factorial"), Cell::code("let rec f n = n")])
        .with_language("ocaml");
    let text = registry.marshal(&nb, "percent", &without_header()).unwrap();
    assert_eq!(
        text,
        "(* %% [markdown] *)\n(* Factorial *)\n\n(* %% *)\nlet rec f n = n\n"
    );
    let parsed = registry.parse(&text, "ocaml", "percent").unwrap();
    assert_eq!(registry.normalize(&parsed), registry.normalize(&nb));
}
