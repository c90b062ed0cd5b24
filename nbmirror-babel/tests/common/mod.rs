//! Shared helpers for the integration tests

use nbmirror_babel::{Cell, MarshalOptions, MirrorRegistry, Notebook};
use serde_json::json;
use std::path::PathBuf;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

pub fn without_header() -> MarshalOptions {
    MarshalOptions {
        insert_header: false,
    }
}

/// The Java hello-world notebook
pub fn helloworld() -> Notebook {
    Notebook::new(vec![
        Cell::markdown("Let's define some class."),
        Cell::code(
            "class A {\n    public void hello() {\n        System.out.println(\"Hello World\");\n    }   \n}",
        ),
        Cell::markdown("And now we call its method."),
        Cell::code("new A().hello();"),
        Cell::markdown(
            "You can run it e.g. with `jshell`\n\n* from command line, as `jshell simple-helloworld.java`\n* from jshell's shell with `/open simple-helloworld.java`",
        ),
    ])
    .with_metadata("encoding", json!("// -*- coding: utf-8 -*-"))
    .with_metadata(
        "kernelspec",
        json!({"display_name": "Java", "language": "java", "name": "java"}),
    )
}

/// Assert that `text` parses back to `notebook`, up to normalization
pub fn assert_parses_to(registry: &MirrorRegistry, text: &str, format: &str, notebook: &Notebook) {
    let language = notebook.declared_language().expect("notebook declares a language");
    let parsed = registry
        .parse(text, language, format)
        .unwrap_or_else(|e| panic!("Failed to parse {format}: {e}"));
    assert_eq!(registry.normalize(&parsed), registry.normalize(notebook));
}
