//! Notebook to text
//!
//! One algorithm for every dialect: the format descriptor decides whether cells open with
//! marker lines or are laid out implicitly, and the language syntax decides how lines are
//! commented. Marshaling either returns the whole text or an error, never partial output.

use crate::common::{content_lines, is_blank};
use crate::error::{FormatError, Result};
use crate::format::{FormatDescriptor, MarkerGrammar};
use crate::formats::markers::{encode_marker, match_marker};
use crate::formats::regions::{
    classify, end_marker_for, region_end, region_start, LightLine, CELL_TYPE_KEY, DEFAULT_END,
    END_OF_CELL_KEY,
};
use crate::header::{is_preamble_line, write_header};
use crate::languages::{LanguageSyntax, LanguageTable};
use crate::notebook::{Cell, CellKind, Notebook};
use serde_json::json;
use tracing::debug;

/// Options for marshaling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarshalOptions {
    /// Write the preamble and header block
    pub insert_header: bool,
}

impl Default for MarshalOptions {
    fn default() -> Self {
        MarshalOptions {
            insert_header: true,
        }
    }
}

/// Resolve the notebook's host language in `languages`
pub fn resolve_language<'t>(
    notebook: &Notebook,
    languages: &'t LanguageTable,
) -> Result<&'t LanguageSyntax> {
    let id = notebook
        .declared_language()
        .ok_or_else(|| FormatError::metadata("notebook does not declare a language_id"))?;
    languages.get(id)
}

/// Comment one content line. Whitespace-only lines become blank.
fn comment_line(syntax: &LanguageSyntax, spacing: &str, line: &str) -> String {
    if is_blank(line) {
        String::new()
    } else {
        syntax.comment_with(line, spacing)
    }
}

/// The lines of `cell` as they appear in the text, before any marker or region
fn emitted_lines(cell: &Cell, syntax: &LanguageSyntax, format: &FormatDescriptor) -> Vec<String> {
    let lines = content_lines(&cell.source);
    if format.comments(cell.kind) {
        lines
            .iter()
            .map(|line| comment_line(syntax, format.spacing(), line))
            .collect()
    } else {
        lines
    }
}

pub fn marshal(
    notebook: &Notebook,
    format: &FormatDescriptor,
    languages: &LanguageTable,
    options: &MarshalOptions,
) -> Result<String> {
    let syntax = resolve_language(notebook, languages)?;
    debug!(
        format = %format.id,
        language = %syntax.id,
        cells = notebook.cells.len(),
        "marshal notebook"
    );

    if let Some(cell) = notebook.cells.iter().find(|cell| !format.supports(cell.kind)) {
        return Err(FormatError::UnsupportedCellType {
            line: None,
            token: cell.kind.as_str().to_string(),
        });
    }

    let mut out = Vec::new();
    if options.insert_header {
        out.extend(write_header(notebook, syntax, format)?);
        out.push(String::new());
    }
    let at_top = out.is_empty();
    let body = match format.marker_grammar() {
        Some(grammar) => explicit_cells(notebook, grammar, syntax, format, at_top)?,
        None => light_cells(notebook, syntax, format, at_top)?,
    };
    out.extend(body);

    while out.last().is_some_and(|line| is_blank(line)) {
        out.pop();
    }
    if out.is_empty() {
        return Ok(String::new());
    }
    let mut text = out.join("\n");
    text.push('\n');
    Ok(text)
}

fn explicit_cells(
    notebook: &Notebook,
    grammar: &MarkerGrammar,
    syntax: &LanguageSyntax,
    format: &FormatDescriptor,
    at_top: bool,
) -> Result<Vec<String>> {
    let spacing = format.spacing();
    let styles = syntax.input_styles();
    let mut out = Vec::new();

    for (index, cell) in notebook.cells.iter().enumerate() {
        if index > 0 {
            out.push(String::new());
        }
        let marker = encode_marker(grammar, syntax, spacing, cell)?;
        if at_top && index == 0 && is_preamble_line(syntax, &marker) {
            return Err(FormatError::boundary(
                None,
                marker,
                "first marker line would read back as an encoding line",
            ));
        }
        out.push(marker);
        for line in emitted_lines(cell, syntax, format) {
            if match_marker(grammar, &styles, spacing, &line).is_some() {
                return Err(FormatError::boundary(
                    None,
                    line,
                    format!("{} cell content would read back as a cell marker", cell.kind.as_str()),
                ));
            }
            out.push(line);
        }
    }
    Ok(out)
}

/// Refuse text lines that a headerless reader would take for another format's markers.
///
/// Without a header, detection tries the marker grammars of every inferable format. A
/// line matching one of them (other than the format's own grammar, which the marshaler
/// already guards) would turn the text into a different format on the way back.
pub fn check_foreign_markers(
    text: &str,
    format: &FormatDescriptor,
    syntax: &LanguageSyntax,
    formats: &[&FormatDescriptor],
) -> Result<()> {
    let styles = syntax.input_styles();
    let own = format.marker_grammar();
    for other in formats {
        if !other.inferable || other.id == format.id {
            continue;
        }
        let Some(grammar) = other.marker_grammar() else {
            continue;
        };
        if own == Some(grammar) {
            continue;
        }
        if let Some(line) = text
            .lines()
            .find(|line| match_marker(grammar, &styles, other.spacing(), line).is_some())
        {
            return Err(FormatError::boundary(
                None,
                line,
                format!(
                    "{} text without a header would read back as {} cell markers",
                    format.id, other.id
                ),
            ));
        }
    }
    Ok(())
}

/// Whether a markdown cell survives as a bare comment run
fn bare_markdown(lines: &[String], syntax: &LanguageSyntax, spacing: &str) -> bool {
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return false;
    };
    if is_blank(first) || is_blank(last) {
        return false;
    }
    if lines.windows(2).any(|pair| is_blank(&pair[0]) && is_blank(&pair[1])) {
        return false;
    }
    lines.iter().all(|line| {
        is_blank(line) || matches!(classify(syntax, spacing, line), LightLine::Comment(_))
    })
}

/// Whether a code cell survives as a bare run of lines
fn bare_code(lines: &[String], syntax: &LanguageSyntax, spacing: &str) -> bool {
    let mut has_plain = false;
    for line in lines {
        match classify(syntax, spacing, line) {
            LightLine::Blank | LightLine::RegionStart(_) | LightLine::RegionEnd(_) => return false,
            LightLine::Plain => has_plain = true,
            LightLine::Comment(_) | LightLine::Irregular => {}
        }
    }
    has_plain
}

fn light_cells(
    notebook: &Notebook,
    syntax: &LanguageSyntax,
    format: &FormatDescriptor,
    at_top: bool,
) -> Result<Vec<String>> {
    let spacing = format.spacing();
    let regions = format.writes_regions();
    let mut out = Vec::new();
    let mut previous_bare_markdown = false;

    for (index, cell) in notebook.cells.iter().enumerate() {
        for key in [CELL_TYPE_KEY, END_OF_CELL_KEY] {
            if regions && cell.metadata.contains_key(key) {
                return Err(FormatError::metadata(format!(
                    "cell metadata key '{key}' is reserved by the {} format",
                    format.id
                )));
            }
        }

        let lines = emitted_lines(cell, syntax, format);
        let mut bare = !regions
            || (cell.metadata.is_empty()
                && match cell.kind {
                    CellKind::Markdown => bare_markdown(&lines, syntax, spacing),
                    CellKind::Code => bare_code(&lines, syntax, spacing),
                    CellKind::Raw => false,
                });
        if regions && bare && at_top && index == 0 && is_preamble_line(syntax, &lines[0]) {
            bare = false;
        }

        if index > 0 {
            out.push(String::new());
            if bare && cell.kind == CellKind::Markdown && previous_bare_markdown {
                out.push(String::new());
            }
        }

        if bare {
            out.extend(lines);
        } else {
            let dashes = end_marker_for(syntax, spacing, &lines);
            let mut options = cell.metadata.clone();
            if cell.kind != CellKind::Code {
                options.insert(CELL_TYPE_KEY.to_string(), json!(cell.kind.as_str()));
            }
            if dashes != DEFAULT_END {
                options.insert(END_OF_CELL_KEY.to_string(), json!(dashes));
            }
            let start = region_start(
                syntax,
                spacing,
                &crate::common::encode_options(&options),
            );
            out.push(start);
            out.extend(lines);
            out.push(region_end(syntax, spacing, &dashes));
        }
        previous_bare_markdown = bare && cell.kind == CellKind::Markdown;
    }
    Ok(out)
}
