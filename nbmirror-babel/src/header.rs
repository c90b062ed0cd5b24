//! Document preamble and header block
//!
//! A text mirror may open with a shebang line, an encoding pragma and a commented YAML
//! block:
//!
//! ```text
//! // ---
//! // jupyter:
//! //   language_id: java
//! //   text_representation:
//! //     format_name: percent
//! //     format_version: 1
//! // ---
//! ```
//!
//! Notebook metadata lives under `jupyter:`. Keys found next to it are kept under
//! `root_level_metadata` so they survive a round trip.

use crate::error::{FormatError, Result};
use crate::format::{FormatDescriptor, HeaderRule};
use crate::languages::{CommentStyle, LanguageSyntax, Uncommented};
use crate::notebook::{
    Metadata, Notebook, ENCODING_KEY, EXECUTABLE_KEY, LANGUAGE_ID_KEY, ROOT_LEVEL_METADATA_KEY,
    TEXT_REPRESENTATION_KEY,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

const JUPYTER_KEY: &str = "jupyter";

static CODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\f]*\S.*?coding[:=][ \t]*([-_.a-zA-Z0-9]+)").expect("valid coding regex")
});

/// Required fields of a header block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub language_id: String,
    pub format_name: String,
    pub format_version: u64,
    /// 1-based line of the opening delimiter
    pub line: usize,
}

/// Result of reading the top of a text
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Notebook metadata recovered from the preamble and the header block
    pub metadata: Metadata,
    /// Present when a header block was found
    pub info: Option<HeaderInfo>,
    /// Index of the first line after the preamble and header
    pub body_start: usize,
}

/// Charset named by an encoding pragma line, if `line` is one
fn pragma_charset<'l>(styles: &[CommentStyle<'_>], line: &'l str) -> Option<&'l str> {
    let trimmed = line.trim_start();
    if !styles.iter().any(|style| trimmed.starts_with(style.prefix)) {
        return None;
    }
    CODING
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|charset| charset.as_str())
}

fn is_utf8(charset: &str) -> bool {
    matches!(charset.to_ascii_lowercase().as_str(), "utf-8" | "utf8" | "utf_8")
}

/// Whether `line` would be taken as a preamble line at the top of a text
pub fn is_preamble_line(syntax: &LanguageSyntax, line: &str) -> bool {
    syntax.encoding_pragma_allowed
        && (line.starts_with("#!") || pragma_charset(&syntax.input_styles(), line).is_some())
}

/// The style whose delimiter line `line` is
fn delimiter_style<'s>(
    styles: &[CommentStyle<'s>],
    rule: &HeaderRule,
    spacing: &str,
    line: &str,
) -> Option<CommentStyle<'s>> {
    styles
        .iter()
        .find(|style| style.comment(&rule.delimiter, spacing) == line.trim_end())
        .copied()
}

fn required_str(jupyter: &Metadata, path: &[&str], line: usize) -> Result<String> {
    let mut value = jupyter.get(path[0]);
    for key in &path[1..] {
        value = value.and_then(|v| v.get(key));
    }
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FormatError::header(line, format!("missing '{}'", path.join("."))))
}

/// Read the preamble and header block at the top of `lines`
pub fn read_header(
    lines: &[&str],
    styles: &[CommentStyle<'_>],
    pragma_allowed: bool,
    rule: &HeaderRule,
    spacing: &str,
) -> Result<Header> {
    let mut metadata = Metadata::new();
    let mut index = 0;

    if pragma_allowed {
        if let Some(executable) = lines.first().and_then(|line| line.strip_prefix("#!")) {
            metadata.insert(EXECUTABLE_KEY.to_string(), json!(executable));
            index = 1;
        }
        if let Some(line) = lines.get(index) {
            if let Some(charset) = pragma_charset(styles, line) {
                if !is_utf8(charset) {
                    return Err(FormatError::header(
                        index + 1,
                        format!("unsupported encoding '{charset}', only utf-8 is supported"),
                    ));
                }
                metadata.insert(ENCODING_KEY.to_string(), json!(line));
                index += 1;
            }
        }
    }

    let Some(style) = lines
        .get(index)
        .and_then(|line| delimiter_style(styles, rule, spacing, line))
    else {
        if rule.required {
            return Err(FormatError::header(index + 1, "missing header block"));
        }
        return Ok(Header {
            metadata,
            info: None,
            body_start: index,
        });
    };

    let open = index + 1;
    let delimiter = style.comment(&rule.delimiter, spacing);
    let close = (index + 1..lines.len())
        .find(|&i| lines[i].trim_end() == delimiter)
        .ok_or_else(|| FormatError::header(open, "header block is not closed"))?;

    let mut yaml = Vec::new();
    for (i, line) in lines.iter().enumerate().take(close).skip(index + 1) {
        match style.uncomment(line, spacing) {
            Uncommented::Text(text) => yaml.push(text),
            Uncommented::Empty => yaml.push(""),
            _ if line.trim().is_empty() => yaml.push(""),
            _ => {
                return Err(FormatError::header(
                    i + 1,
                    "header line is not a comment",
                ))
            }
        }
    }

    let root = match serde_yaml::from_str::<Value>(&yaml.join("\n")) {
        Ok(Value::Object(root)) => root,
        Ok(_) => return Err(FormatError::header(open, "header is not a mapping")),
        Err(err) => return Err(FormatError::header(open, format!("invalid YAML: {err}"))),
    };

    let mut root_level = Metadata::new();
    let mut jupyter = None;
    for (key, value) in root {
        match (key.as_str(), value) {
            (JUPYTER_KEY, Value::Object(section)) => jupyter = Some(section),
            (JUPYTER_KEY, _) => {
                return Err(FormatError::header(open, "'jupyter' must be a mapping"))
            }
            (_, value) => {
                root_level.insert(key, value);
            }
        }
    }
    let jupyter =
        jupyter.ok_or_else(|| FormatError::header(open, "missing 'jupyter' section"))?;

    let language_id = required_str(&jupyter, &[LANGUAGE_ID_KEY], open)?;
    let format_name = required_str(&jupyter, &[TEXT_REPRESENTATION_KEY, "format_name"], open)?;
    let format_version = jupyter
        .get(TEXT_REPRESENTATION_KEY)
        .and_then(|repr| repr.get("format_version"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            FormatError::header(open, "missing integer 'text_representation.format_version'")
        })?;

    metadata.extend(jupyter);
    if !root_level.is_empty() {
        metadata.insert(ROOT_LEVEL_METADATA_KEY.to_string(), Value::Object(root_level));
    }

    Ok(Header {
        metadata,
        info: Some(HeaderInfo {
            language_id,
            format_name,
            format_version,
            line: open,
        }),
        body_start: close + 1,
    })
}

/// Check a decoded header against the format the text is being read with
pub fn check_format(info: &HeaderInfo, format: &FormatDescriptor) -> Result<()> {
    if info.format_name != format.id {
        return Err(FormatError::header(
            info.line,
            format!(
                "header declares format '{}', expected '{}'",
                info.format_name, format.id
            ),
        ));
    }
    if info.format_version > u64::from(format.version) {
        return Err(FormatError::header(
            info.line,
            format!(
                "format version {} is newer than supported version {}",
                info.format_version, format.version
            ),
        ));
    }
    Ok(())
}

/// Check that a decoded header names the language the text is being read as
pub fn check_language(info: &HeaderInfo, syntax: &LanguageSyntax) -> Result<()> {
    if syntax.matches_name(&info.language_id) {
        return Ok(());
    }
    Err(FormatError::header(
        info.line,
        format!(
            "header declares language '{}', expected '{}'",
            info.language_id, syntax.id
        ),
    ))
}

/// Write the preamble and header block for `notebook`
pub fn write_header(
    notebook: &Notebook,
    syntax: &LanguageSyntax,
    format: &FormatDescriptor,
) -> Result<Vec<String>> {
    let spacing = format.spacing();
    let mut lines = Vec::new();

    if let Some(executable) = notebook.metadata.get(EXECUTABLE_KEY) {
        let executable = executable
            .as_str()
            .filter(|exe| !exe.contains('\n'))
            .ok_or_else(|| FormatError::metadata("'executable' must be a single-line string"))?;
        if !syntax.encoding_pragma_allowed {
            return Err(FormatError::metadata(format!(
                "language '{}' does not allow a shebang line",
                syntax.id
            )));
        }
        lines.push(format!("#!{executable}"));
    }

    if let Some(encoding) = notebook.metadata.get(ENCODING_KEY) {
        let encoding = encoding
            .as_str()
            .filter(|line| !line.contains('\n'))
            .ok_or_else(|| FormatError::metadata("'encoding' must be a single-line string"))?;
        if !syntax.encoding_pragma_allowed {
            return Err(FormatError::metadata(format!(
                "language '{}' does not allow an encoding line",
                syntax.id
            )));
        }
        match pragma_charset(&syntax.input_styles(), encoding) {
            Some(charset) if is_utf8(charset) => lines.push(encoding.to_string()),
            _ => {
                return Err(FormatError::metadata(format!(
                    "'{encoding}' is not a utf-8 encoding line"
                )))
            }
        }
    }

    let mut jupyter = notebook.metadata.clone();
    for key in [ENCODING_KEY, EXECUTABLE_KEY, ROOT_LEVEL_METADATA_KEY] {
        jupyter.remove(key);
    }
    jupyter.insert(LANGUAGE_ID_KEY.to_string(), json!(syntax.id));
    jupyter.insert(
        TEXT_REPRESENTATION_KEY.to_string(),
        json!({"format_name": format.id, "format_version": format.version}),
    );

    let mut root = match notebook.metadata.get(ROOT_LEVEL_METADATA_KEY) {
        None => Metadata::new(),
        Some(Value::Object(root)) if !root.contains_key(JUPYTER_KEY) => root.clone(),
        Some(_) => {
            return Err(FormatError::metadata(
                "'root_level_metadata' must be a mapping without a 'jupyter' key",
            ))
        }
    };
    root.insert(JUPYTER_KEY.to_string(), Value::Object(jupyter));

    let yaml = serde_yaml::to_string(&Value::Object(root))
        .map_err(|err| FormatError::metadata(format!("cannot write header: {err}")))?;

    let delimiter = syntax.comment_with(&format.header.delimiter, spacing);
    lines.push(delimiter.clone());
    for line in yaml.lines().filter(|line| *line != "---") {
        lines.push(syntax.comment_with(line, spacing));
    }
    lines.push(delimiter);
    Ok(lines)
}
