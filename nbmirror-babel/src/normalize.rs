//! Round-trip normalizer
//!
//! Defines the canonical form both directions agree on. For every notebook `n` and format
//! `f`, `normalize(parse(marshal(normalize(n), f))) == normalize(n)`, and marshaling a
//! parsed canonical text gives back [`normalize_text`] of that text.

use crate::common::{content_lines, split_lines, trim_trailing_blank};
use crate::languages::{LanguageSyntax, LanguageTable};
use crate::notebook::{Cell, CellKind, Notebook, LANGUAGE_ID_KEY, TEXT_REPRESENTATION_KEY};
use serde_json::json;

fn normalize_cell(cell: &Cell, syntax: Option<&LanguageSyntax>) -> Option<Cell> {
    let mut source: Vec<String> = content_lines(&cell.source)
        .into_iter()
        .map(|line| {
            let trim = match cell.kind {
                CellKind::Markdown | CellKind::Raw => true,
                CellKind::Code => syntax.is_some_and(|s| s.is_comment_prefixed(&line)),
            };
            if trim {
                line.trim_end().to_string()
            } else {
                line
            }
        })
        .collect();
    trim_trailing_blank(&mut source);

    if source.is_empty() && cell.metadata.is_empty() {
        return None;
    }
    Some(Cell {
        kind: cell.kind,
        source,
        metadata: cell.metadata.clone(),
        explicit_type_marker: false,
    })
}

/// Canonicalize a notebook
pub fn normalize_notebook(notebook: &Notebook, languages: &LanguageTable) -> Notebook {
    let syntax = notebook
        .declared_language()
        .and_then(|id| languages.get(id).ok());

    let mut cells: Vec<Cell> = notebook
        .cells
        .iter()
        .filter_map(|cell| normalize_cell(cell, syntax))
        .collect();
    while cells
        .last()
        .is_some_and(|cell| cell.source.is_empty() && cell.metadata.is_empty())
    {
        cells.pop();
    }

    let mut metadata = notebook.metadata.clone();
    metadata.remove(TEXT_REPRESENTATION_KEY);
    if let Some(syntax) = syntax {
        metadata.insert(LANGUAGE_ID_KEY.to_string(), json!(syntax.id));
    }
    Notebook { cells, metadata }
}

/// Canonicalize a text mirror
pub fn normalize_text(text: &str, syntax: &LanguageSyntax) -> String {
    let mut lines: Vec<String> = split_lines(text)
        .into_iter()
        .map(|line| {
            if syntax.is_comment_prefixed(&line) {
                line.trim_end().to_string()
            } else {
                line
            }
        })
        .collect();
    trim_trailing_blank(&mut lines);
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
