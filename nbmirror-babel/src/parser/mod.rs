//! Text to notebook
//!
//! The parser reads the preamble and header first, then hands the remaining lines to the
//! explicit-marker reader or the implicit (light) reader depending on the format descriptor.
//! Anything that would need a guess to place is reported as an error with its line number.

mod explicit;
mod implicit;

use crate::common::split_lines;
use crate::error::Result;
use crate::format::FormatDescriptor;
use crate::header::{check_format, check_language, read_header};
use crate::languages::{LanguageSyntax, Uncommented};
use crate::notebook::{Notebook, LANGUAGE_ID_KEY, TEXT_REPRESENTATION_KEY};
use serde_json::json;
use tracing::{debug, trace};

/// Parse `text` written in `format` for the language described by `syntax`
pub fn parse(text: &str, syntax: &LanguageSyntax, format: &FormatDescriptor) -> Result<Notebook> {
    let owned = split_lines(text);
    let mut lines: Vec<&str> = owned.iter().map(String::as_str).collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    let styles = syntax.input_styles();
    let header = read_header(
        &lines,
        &styles,
        syntax.encoding_pragma_allowed,
        &format.header,
        format.spacing(),
    )?;
    if let Some(info) = &header.info {
        check_format(info, format)?;
        check_language(info, syntax)?;
        trace!(line = info.line, "found header block");
    }

    let cells = match format.marker_grammar() {
        Some(grammar) => explicit::parse_cells(&lines, header.body_start, grammar, syntax, format)?,
        None => implicit::parse_cells(&lines, header.body_start, syntax, format)?,
    };
    debug!(
        format = %format.id,
        language = %syntax.id,
        cells = cells.len(),
        "parsed text"
    );

    let mut metadata = header.metadata;
    metadata
        .entry(LANGUAGE_ID_KEY)
        .or_insert_with(|| json!(syntax.id));
    metadata.insert(
        TEXT_REPRESENTATION_KEY.to_string(),
        json!({"format_name": format.id, "format_version": format.version}),
    );
    Ok(Notebook { cells, metadata })
}

/// Strip the comment token from a line of a commented cell
fn uncomment_content(
    syntax: &LanguageSyntax,
    spacing: &str,
    line: &str,
    line_no: usize,
) -> Result<String> {
    if line.trim().is_empty() {
        return Ok(String::new());
    }
    match syntax.uncomment_with(line, spacing) {
        Uncommented::Text(text) => Ok(text.to_string()),
        Uncommented::Empty => Ok(String::new()),
        Uncommented::Irregular => Err(crate::error::FormatError::boundary(
            Some(line_no),
            line,
            "comment token must be followed by a space",
        )),
        Uncommented::NotComment => Err(crate::error::FormatError::boundary(
            Some(line_no),
            line,
            "expected a comment line inside a commented cell",
        )),
    }
}
