//! Notebook data model
//!
//! A [`Notebook`] is an ordered list of [`Cell`]s plus a document-level metadata mapping.
//! Cell sources are stored line by line without newline characters, so there is never any
//! ambiguity about a trailing newline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String-keyed mapping of arbitrary structured values
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key holding the host language id
pub const LANGUAGE_ID_KEY: &str = "language_id";
/// Metadata key holding the list of mirror targets
pub const FORMATS_KEY: &str = "formats";
/// Metadata key describing the text representation the notebook was read from or written to
pub const TEXT_REPRESENTATION_KEY: &str = "text_representation";
/// Metadata key holding the verbatim encoding pragma line
pub const ENCODING_KEY: &str = "encoding";
/// Metadata key holding the shebang payload
pub const EXECUTABLE_KEY: &str = "executable";
/// Metadata key holding header keys found outside the `jupyter:` section
pub const ROOT_LEVEL_METADATA_KEY: &str = "root_level_metadata";

/// The three kinds of notebook cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

impl CellKind {
    /// The name used for this kind in type tokens and option lines
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Markdown => "markdown",
            CellKind::Code => "code",
            CellKind::Raw => "raw",
        }
    }

    /// Resolve a type token. `md` is accepted as a short form of `markdown`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "markdown" | "md" => Some(CellKind::Markdown),
            "code" => Some(CellKind::Code),
            "raw" => Some(CellKind::Raw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub source: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Set by the parser when the marker line carried a type token.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub explicit_type_marker: bool,
}

impl Cell {
    pub fn new(kind: CellKind, source: &str) -> Self {
        Cell {
            kind,
            source: split_source(source),
            metadata: Metadata::new(),
            explicit_type_marker: false,
        }
    }

    pub fn markdown(source: &str) -> Self {
        Self::new(CellKind::Markdown, source)
    }

    pub fn code(source: &str) -> Self {
        Self::new(CellKind::Code, source)
    }

    pub fn raw(source: &str) -> Self {
        Self::new(CellKind::Raw, source)
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// The cell source joined with `\n`
    pub fn source_text(&self) -> String {
        self.source.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }
}

/// Split a source string into lines. A single trailing newline does not produce an extra
/// empty line.
pub fn split_source(source: &str) -> Vec<String> {
    if source.is_empty() {
        return Vec::new();
    }
    let body = source.strip_suffix('\n').unwrap_or(source);
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        Notebook {
            cells,
            metadata: Metadata::new(),
        }
    }

    pub fn with_language(mut self, language_id: &str) -> Self {
        self.metadata.insert(
            LANGUAGE_ID_KEY.to_string(),
            Value::String(language_id.to_string()),
        );
        self
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// The declared host language: `language_id`, else `kernelspec.language`
    pub fn declared_language(&self) -> Option<&str> {
        self.metadata
            .get(LANGUAGE_ID_KEY)
            .and_then(Value::as_str)
            .or_else(|| {
                self.metadata
                    .get("kernelspec")
                    .and_then(|spec| spec.get("language"))
                    .and_then(Value::as_str)
            })
    }

    /// The format name recorded by the last parse or marshal, if any
    pub fn format_name(&self) -> Option<&str> {
        self.metadata
            .get(TEXT_REPRESENTATION_KEY)
            .and_then(|repr| repr.get("format_name"))
            .and_then(Value::as_str)
    }
}
