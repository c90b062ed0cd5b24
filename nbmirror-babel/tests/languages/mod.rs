//! Host languages are data: registering one needs no code

use crate::common::without_header;
use nbmirror_babel::{Cell, LanguageSyntax, MarshalOptions, MirrorRegistry, Notebook};

#[test]
fn test_registered_language_round_trips() {
    let mut registry = MirrorRegistry::default();
    registry.register_language(
        LanguageSyntax::new("kotlin", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["kt", "kts"])
            .with_aliases(&["kt"]),
    );

    let nb = Notebook::new(vec![
        Cell::markdown("Kotlin works too"),
        Cell::code("fun main() = println(\"hi\")"),
    ])
    .with_language("Kotlin");

    for format in registry.list_formats() {
        let text = registry
            .marshal(&nb, &format, &MarshalOptions::default())
            .unwrap();
        assert!(text.contains("language_id: kotlin"), "{text}");
        let parsed = registry.parse(&text, "kt", &format).unwrap();
        assert_eq!(registry.normalize(&parsed), registry.normalize(&nb));
    }
    assert_eq!(
        registry.language_for_filename("build.gradle.kts").map(|l| l.id.as_str()),
        Some("kotlin")
    );
}

#[test]
fn test_languages_share_one_algorithm() {
    let registry = MirrorRegistry::default();
    let cases = [
        ("rust", "// Notes\n\nlet x = 1;\n"),
        ("haskell", "-- Notes\n\nlet x = 1\n"),
        ("q", "/ Notes\n\nx:1\n"),
        ("latex", "% Notes\n\n\\section{x}\n"),
        ("sas", "/* Notes */\n\ndata x;\n"),
    ];
    for (language, expected) in cases {
        let code = expected.lines().last().unwrap_or_default();
        let nb = Notebook::new(vec![Cell::markdown("Notes"), Cell::code(code)])
            .with_language(language);
        let text = registry.marshal(&nb, "light", &without_header()).unwrap();
        assert_eq!(text, expected, "{language}");
    }
}

#[test]
fn test_kernelspec_language_is_a_fallback() {
    let registry = MirrorRegistry::default();
    let nb = Notebook::new(vec![Cell::code("puts 1")]).with_metadata(
        "kernelspec",
        serde_json::json!({"language": "C#", "name": "csharp"}),
    );
    let text = registry
        .marshal(&nb, "percent", &MarshalOptions::default())
        .unwrap();
    assert!(text.contains("language_id: csharp"));
    assert!(text.starts_with("// ---\n"));
}
