//! Format and language detection
//!
//! Detection never looks at what the code means. A well-formed header decides everything;
//! otherwise the marker grammars of inferable formats are tried, and text matching none of
//! them is taken to be the implicit format. Formats that share another format's grammar or
//! drop information (hydrogen, nomarker) are only ever named by a header.

use crate::common::split_lines;
use crate::error::{FormatError, Result};
use crate::format::HeaderRule;
use crate::formats::markers::match_marker;
use crate::formats::LIGHT;
use crate::header::read_header;
use crate::languages::CommentStyle;
use crate::registry::MirrorRegistry;
use tracing::debug;

/// What the caller knows about the text besides its content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectHint {
    /// File extension, with or without the leading dot
    pub extension: Option<String>,
    /// Declared language id or alias
    pub language: Option<String>,
}

impl DetectHint {
    pub fn from_filename(filename: &str) -> Self {
        DetectHint {
            extension: std::path::Path::new(filename)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_string),
            language: None,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub format_id: String,
    pub language_id: String,
}

/// Infer the format and language of `text`. `Ok(None)` means the language is unknown.
pub fn detect(text: &str, registry: &MirrorRegistry, hint: &DetectHint) -> Result<Option<Detection>> {
    let owned = split_lines(text);
    let lines: Vec<&str> = owned.iter().map(String::as_str).collect();

    let hinted = match &hint.language {
        Some(language) => Some(registry.language(language)?),
        None => hint
            .extension
            .as_deref()
            .and_then(|ext| registry.languages().by_extension(ext)),
    };
    let styles: Vec<CommentStyle<'_>> = match hinted {
        Some(syntax) => syntax.input_styles(),
        None => registry.languages().comment_styles(),
    };

    // Header first, under every spacing a registered format uses
    for format in registry.formats() {
        // A format that requires a header must not fail detection of the others
        let rule = HeaderRule {
            required: false,
            ..format.header.clone()
        };
        let header = read_header(&lines, &styles, true, &rule, format.spacing())?;
        if let Some(info) = header.info {
            let format = registry.format(&info.format_name)?;
            let language = registry.language(&info.language_id)?;
            debug!(format = %format.id, language = %language.id, "detected from header");
            return Ok(Some(Detection {
                format_id: format.id.clone(),
                language_id: language.id.clone(),
            }));
        }
    }

    let mut candidates: Vec<String> = registry
        .formats()
        .filter(|format| format.inferable)
        .filter_map(|format| {
            let grammar = format.marker_grammar()?;
            lines
                .iter()
                .any(|line| match_marker(grammar, &styles, format.spacing(), line).is_some())
                .then(|| format.id.clone())
        })
        .collect();
    candidates.sort();

    let format_id = match candidates.len() {
        0 => LIGHT.to_string(),
        1 => candidates.remove(0),
        _ => return Err(FormatError::AmbiguousFormat { candidates }),
    };
    debug!(format = %format_id, "detected from cell markers");

    Ok(hinted.map(|syntax| Detection {
        format_id,
        language_id: syntax.id.clone(),
    }))
}
