//! Format and language detection over marshaled text

use crate::common::without_header;
use nbmirror_babel::{Cell, DetectHint, FormatError, MarshalOptions, MirrorRegistry, Notebook};

fn sample(language: &str) -> Notebook {
    Notebook::new(vec![
        Cell::markdown("Some words"),
        Cell::code("value"),
        Cell::raw("raw text"),
    ])
    .with_language(language)
}

#[test]
fn test_detect_what_was_marshaled() {
    let registry = MirrorRegistry::default();
    for language in ["python", "java", "sql", "matlab", "scheme", "ocaml"] {
        let nb = sample(language);
        for format in registry.list_formats() {
            let text = registry
                .marshal(&nb, &format, &MarshalOptions::default())
                .unwrap();
            let found = registry
                .detect(&text, &DetectHint::default())
                .unwrap()
                .unwrap_or_else(|| panic!("{language}/{format}: no detection"));
            assert_eq!(found.format_id, format, "{language}");
            assert_eq!(found.language_id, language, "{format}");
        }
    }
}

#[test]
fn test_detect_without_header_needs_a_hint() {
    let registry = MirrorRegistry::default();
    let nb = sample("java");
    let text = registry.marshal(&nb, "percent", &without_header()).unwrap();

    assert_eq!(registry.detect(&text, &DetectHint::default()).unwrap(), None);

    let found = registry
        .detect(&text, &DetectHint::from_filename("Sample.java"))
        .unwrap()
        .unwrap();
    assert_eq!(found.format_id, "percent");
    assert_eq!(found.language_id, "java");
}

#[test]
fn test_unknown_language_hint_is_an_error() {
    let registry = MirrorRegistry::default();
    let hint = DetectHint::default().with_language("klingon");
    assert_eq!(
        registry.detect("x\n", &hint),
        Err(FormatError::UnknownLanguage("klingon".to_string()))
    );
}

#[test]
fn test_malformed_header_is_an_error() {
    let registry = MirrorRegistry::default();
    let text = "# ---\n# jupyter:\n#   language_id: python\n";
    let err = registry
        .detect(text, &DetectHint::from_filename("notes.py"))
        .unwrap_err();
    assert!(matches!(err, FormatError::HeaderParseError { line: 1, .. }));
}
