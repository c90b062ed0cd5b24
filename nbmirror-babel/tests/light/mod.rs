//! The implicit formats: light (comment runs, blank lines and regions) and nomarker

use crate::common::without_header;
use insta::assert_snapshot;
use nbmirror_babel::{
    Cell, CellKind, DetectHint, FormatError, MarshalOptions, MirrorRegistry, Notebook,
};
use serde_json::json;

fn cells_of(registry: &MirrorRegistry, text: &str, language: &str) -> Vec<(CellKind, Vec<String>)> {
    registry
        .parse(text, language, "light")
        .unwrap()
        .cells
        .into_iter()
        .map(|cell| (cell.kind, cell.source))
        .collect()
}

#[test]
fn test_adjacent_markdown_cells_are_separated() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::markdown("First"), Cell::markdown("Second")])
        .with_language("python");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_eq!(text, "# First\n\n\n# Second\n");
    assert_eq!(registry.parse(&text, "python", "light").unwrap().cells.len(), 2);

    // With a single blank line the two runs are one cell
    let merged = cells_of(&registry, "# First\n\n# Second\n", "python");
    assert_eq!(
        merged,
        vec![(CellKind::Markdown, vec!["First".into(), "".into(), "Second".into()])]
    );
}

#[test]
fn test_adjacent_code_cells_are_separated() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("x = 1"), Cell::code("y = 2")])
        .with_language("python");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_eq!(text, "x = 1\n\ny = 2\n");
    assert_eq!(registry.parse(&text, "python", "light").unwrap().cells.len(), 2);
}

#[test]
fn test_regions_carry_what_runs_cannot() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![
        Cell::code("def f():\n\n    return 1").with_metadata("tags", json!(["helper"])),
        Cell::markdown("\nStarts with a blank line"),
        Cell::code("# only a comment"),
        Cell::code("").with_metadata("collapsed", json!(true)),
    ])
    .with_language("python");

    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_snapshot!(text, @r#"
    # + tags=["helper"]
    def f():

        return 1
    # -

    # + cell_type="markdown"

    # Starts with a blank line
    # -

    # +
    # only a comment
    # -

    # + collapsed=true
    # -
    "#);

    let parsed = registry.parse(&text, "python", "light").unwrap();
    assert_eq!(registry.normalize(&parsed), registry.normalize(&nb));
}

#[test]
fn test_comment_only_code_cell_keeps_its_kind() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("# TODO")]).with_language("python");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    let parsed = registry.parse(&text, "python", "light").unwrap();
    assert_eq!(parsed.cells[0].kind, CellKind::Code);
}

#[test]
fn test_first_cell_is_not_mistaken_for_a_shebang() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("#!/bin/bash\necho hi")]).with_language("bash");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_eq!(text, "# +\n#!/bin/bash\necho hi\n# -\n");
    let parsed = registry.parse(&text, "bash", "light").unwrap();
    assert_eq!(parsed.cells[0].source, vec!["#!/bin/bash", "echo hi"]);
    assert!(parsed.metadata.get("executable").is_none());
}

#[test]
fn test_shebang_from_metadata() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("echo hi")])
        .with_language("bash")
        .with_metadata("executable", json!("/bin/bash"));
    let text = registry
        .marshal(&nb, "light", &MarshalOptions::default())
        .unwrap();
    assert!(text.starts_with("#!/bin/bash\n# ---\n"));
    let parsed = registry.parse(&text, "bash", "light").unwrap();
    assert_eq!(parsed.metadata.get("executable"), Some(&json!("/bin/bash")));
}

#[test]
fn test_irregular_comment_is_an_error() {
    let registry = MirrorRegistry::default();
    let err = registry
        .parse("-- fine\n--not fine\n", "lua", "light")
        .unwrap_err();
    assert_eq!(
        err,
        FormatError::AmbiguousCellBoundary {
            line: Some(2),
            token: "--not fine".to_string(),
            reason: "comment token must be followed by a space".to_string()
        }
    );
}

#[test]
fn test_unterminated_region() {
    let registry = MirrorRegistry::default();
    let err = registry
        .parse("x = 1\n\n# +\ny = 2\n", "python", "light")
        .unwrap_err();
    assert!(matches!(
        err,
        FormatError::AmbiguousCellBoundary { line: Some(3), .. }
    ));
}

#[test]
fn test_other_comment_tokens() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::markdown("Fit a model"), Cell::code("y = A \\ b;")])
        .with_language("matlab");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_eq!(text, "% Fit a model\n\ny = A \\ b;\n");

    let nb = Notebook::new(vec![Cell::markdown("Fold"), Cell::code("(reduce + xs)")])
        .with_language("clojure");
    let text = registry.marshal(&nb, "light", &without_header()).unwrap();
    assert_eq!(text, ";; Fold\n\n(reduce + xs)\n");
    assert_eq!(
        cells_of(&registry, "; single semicolon\n", "clojure"),
        vec![(CellKind::Markdown, vec!["single semicolon".to_string()])]
    );
}

#[test]
fn test_nomarker_writes_every_cell_bare() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![
        Cell::markdown("Title"),
        Cell::markdown("Second"),
        Cell::code("int x = 1;\n\nint y = 2;").with_metadata("tags", json!(["setup"])),
        Cell::raw("raw"),
        Cell::code("x++;"),
    ])
    .with_language("java");

    let text = registry.marshal(&nb, "nomarker", &without_header()).unwrap();
    assert_snapshot!(text, @r"
    // Title


    // Second

    int x = 1;

    int y = 2;

    // raw

    x++;
    ");

    let parsed = registry.parse(&text, "java", "nomarker").unwrap();
    assert!(parsed.cells.iter().all(|cell| cell.metadata.is_empty()));
    assert!(parsed.cells.iter().all(|cell| cell.kind != CellKind::Raw));
    assert_eq!(parsed.cells[0], Cell::markdown("Title"));
}

#[test]
fn test_nomarker_is_only_named_by_its_header() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::markdown("Notes"), Cell::code("x = 1")])
        .with_language("python");
    let text = registry
        .marshal(&nb, "nomarker", &MarshalOptions::default())
        .unwrap();
    assert!(text.contains("format_name: nomarker"));
    let found = registry
        .detect(&text, &DetectHint::default())
        .unwrap()
        .unwrap();
    assert_eq!(found.format_id, "nomarker");

    let body = registry.marshal(&nb, "nomarker", &without_header()).unwrap();
    let found = registry
        .detect(&body, &DetectHint::default().with_language("python"))
        .unwrap()
        .unwrap();
    assert_eq!(found.format_id, "light");
}
