//! Explicit cell marker lines
//!
//! Matching is split from decoding: [`match_marker`] only recognises the shape of a marker
//! line (used to refuse code that would read back as a marker), while [`decode_marker`]
//! interprets the type token, title and options and can fail.

use crate::common::options::{encode_options, parse_options};
use crate::error::{FormatError, Result};
use crate::format::MarkerGrammar;
use crate::languages::{CommentStyle, LanguageSyntax};
use crate::notebook::{Cell, CellKind, Metadata};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Metadata key holding a percent cell title
pub const TITLE_KEY: &str = "title";

static TYPE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)\[(\w+)\](?:\s|$)").expect("valid type token regex"));

static CELL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(\w+)cell>").expect("valid cell tag regex"));

/// The syntactic parts of a marker line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMatch<'l> {
    /// Everything after the delimiter token, trimmed
    Delimiter(&'l str),
    /// The tag word and the options text after the tag
    Tagged { word: &'l str, options: &'l str },
}

/// What a marker line says about the cell it opens
#[derive(Debug, Clone, PartialEq)]
pub struct CellStart {
    pub kind: CellKind,
    pub explicit_type_marker: bool,
    pub metadata: Metadata,
}

/// Strip a comment token (and one optional separator) from `line`
fn strip_comment<'l>(styles: &[CommentStyle<'_>], spacing: &str, line: &'l str) -> Vec<&'l str> {
    let mut bodies = Vec::new();
    for style in styles {
        let Some(rest) = line.strip_prefix(style.prefix) else {
            continue;
        };
        let rest = match style.suffix {
            Some(suffix) => match rest.trim_end().strip_suffix(suffix) {
                Some(inner) => inner,
                None => continue,
            },
            None => rest,
        };
        bodies.push(rest.strip_prefix(spacing).unwrap_or(rest));
    }
    bodies
}

/// Recognise a marker line of `grammar` written with any of `styles`
pub fn match_marker<'l>(
    grammar: &MarkerGrammar,
    styles: &[CommentStyle<'_>],
    spacing: &str,
    line: &'l str,
) -> Option<MarkerMatch<'l>> {
    strip_comment(styles, spacing, line)
        .into_iter()
        .find_map(|body| match grammar {
            MarkerGrammar::Delimiter { token } => {
                let after = body.strip_prefix(token.as_str())?;
                if !after.is_empty() && !after.starts_with(char::is_whitespace) {
                    return None;
                }
                Some(MarkerMatch::Delimiter(after.trim()))
            }
            MarkerGrammar::Tagged => {
                let captures = CELL_TAG.captures(body)?;
                let whole = captures.get(0)?;
                let after = &body[whole.end()..];
                if !after.is_empty() && !after.starts_with(char::is_whitespace) {
                    return None;
                }
                Some(MarkerMatch::Tagged {
                    word: captures.get(1)?.as_str(),
                    options: after.trim(),
                })
            }
        })
}

fn options_at(line: usize, text: &str) -> Result<Metadata> {
    parse_options(text).map_err(|message| FormatError::InvalidMetadata {
        line: Some(line),
        message,
    })
}

fn kind_at(line: usize, token: &str, display: String) -> Result<CellKind> {
    CellKind::from_token(token).ok_or(FormatError::UnsupportedCellType {
        line: Some(line),
        token: display,
    })
}

/// Interpret a matched marker found at 1-based `line`
pub fn decode_marker(found: MarkerMatch<'_>, line: usize) -> Result<CellStart> {
    match found {
        MarkerMatch::Delimiter(body) => {
            let (title, kind, explicit, options) = match TYPE_TOKEN.captures(body) {
                Some(captures) => {
                    let (Some(whole), Some(token)) = (captures.get(0), captures.get(1)) else {
                        unreachable!("type token regex has one group")
                    };
                    let kind = kind_at(line, token.as_str(), token.as_str().to_string())?;
                    (
                        body[..whole.start()].trim(),
                        kind,
                        true,
                        body[whole.end()..].trim(),
                    )
                }
                None if parse_options(body).is_ok() => ("", CellKind::Code, false, body),
                None => (body, CellKind::Code, false, ""),
            };
            let mut metadata = options_at(line, options)?;
            if !title.is_empty() {
                if metadata.contains_key(TITLE_KEY) {
                    return Err(FormatError::InvalidMetadata {
                        line: Some(line),
                        message: "cell title given twice".to_string(),
                    });
                }
                metadata.insert(TITLE_KEY.to_string(), Value::String(title.to_string()));
            }
            Ok(CellStart {
                kind,
                explicit_type_marker: explicit,
                metadata,
            })
        }
        MarkerMatch::Tagged { word, options } => Ok(CellStart {
            kind: kind_at(line, word, format!("<{word}cell>"))?,
            explicit_type_marker: true,
            metadata: options_at(line, options)?,
        }),
    }
}

fn is_free_title(title: &str) -> bool {
    !title.is_empty()
        && title == title.trim()
        && !title.starts_with('{')
        && !title.contains(['[', ']', '=', '\n', '\r'])
}

/// Write the marker line that opens `cell`
pub fn encode_marker(
    grammar: &MarkerGrammar,
    syntax: &LanguageSyntax,
    spacing: &str,
    cell: &Cell,
) -> Result<String> {
    let mut metadata = cell.metadata.clone();
    let mut parts: Vec<String> = Vec::new();
    let explicit = match grammar {
        MarkerGrammar::Delimiter { token } => {
            parts.push(token.clone());
            let type_token = match cell.kind {
                CellKind::Code if !cell.explicit_type_marker => None,
                kind => Some(kind.as_str()),
            };
            let free_title = match metadata.get(TITLE_KEY) {
                Some(Value::String(title)) if is_free_title(title) => Some(title.clone()),
                _ => None,
            };
            if let Some(title) = free_title {
                if type_token.is_some() || metadata.len() == 1 {
                    metadata.remove(TITLE_KEY);
                    parts.push(title);
                }
            }
            if let Some(token) = type_token {
                parts.push(format!("[{token}]"));
            }
            type_token.is_some()
        }
        MarkerGrammar::Tagged => {
            parts.push(format!("<{}cell>", cell.kind.as_str()));
            true
        }
    };
    let options = encode_options(&metadata);
    if !options.is_empty() {
        parts.push(options);
    }
    let line = syntax.comment_with(&parts.join(" "), spacing);

    let expected = CellStart {
        kind: cell.kind,
        explicit_type_marker: explicit,
        metadata: cell.metadata.clone(),
    };
    let styles = syntax.input_styles();
    let decoded = match_marker(grammar, &styles, spacing, &line)
        .map(|found| decode_marker(found, 1));
    match decoded {
        Some(Ok(start)) if start == expected => Ok(line),
        _ => Err(FormatError::metadata(format!(
            "cell metadata cannot be written on a marker line: {line}"
        ))),
    }
}
