//! Format descriptors
//!
//! A textual dialect is described entirely by data. The marshaler and parser are single
//! generic algorithms that read these records; there is no per-format trait object.

use crate::languages::DEFAULT_SPACING;
use crate::notebook::CellKind;

/// Grammar of an explicit cell marker line, after the comment token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerGrammar {
    /// `<comment> %%[ title][ [type]][ options]`
    Delimiter { token: String },
    /// `<comment> <codecell>|<markdowncell>|<rawcell>[ options]`
    Tagged,
}

/// How cell boundaries are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellBoundary {
    /// Every cell opens with a marker line
    Explicit(MarkerGrammar),
    /// Boundaries are inferred from comment runs and blank lines. Without `regions`,
    /// cells that cannot stand bare are still written bare and metadata is dropped.
    Implicit { regions: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRule {
    /// Parsing fails when the text has no header block
    pub required: bool,
    /// Text of the commented delimiter lines around the YAML block
    pub delimiter: String,
}

impl Default for HeaderRule {
    fn default() -> Self {
        HeaderRule {
            required: false,
            delimiter: "---".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownRule {
    /// Separator between the comment token and the markdown text
    pub spacing: String,
}

impl Default for MarkdownRule {
    fn default() -> Self {
        MarkdownRule {
            spacing: DEFAULT_SPACING.to_string(),
        }
    }
}

/// How raw cell content is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawRule {
    Verbatim,
    Commented,
}

/// A supported textual dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub id: String,
    pub description: String,
    pub version: u32,
    pub boundary: CellBoundary,
    pub header: HeaderRule,
    pub markdown: MarkdownRule,
    pub raw: RawRule,
    pub cell_kinds: Vec<CellKind>,
    /// Detection may pick this format from the body of a text without a header
    pub inferable: bool,
}

impl FormatDescriptor {
    pub fn supports(&self, kind: CellKind) -> bool {
        self.cell_kinds.contains(&kind)
    }

    /// The marker grammar, for explicit-boundary formats
    pub fn marker_grammar(&self) -> Option<&MarkerGrammar> {
        match &self.boundary {
            CellBoundary::Explicit(grammar) => Some(grammar),
            CellBoundary::Implicit { .. } => None,
        }
    }

    /// Whether implicit cells may be wrapped in `+`/`-` regions
    pub fn writes_regions(&self) -> bool {
        matches!(self.boundary, CellBoundary::Implicit { regions: true })
    }

    pub fn is_explicit(&self) -> bool {
        self.marker_grammar().is_some()
    }

    pub fn spacing(&self) -> &str {
        &self.markdown.spacing
    }

    /// Whether a cell of this kind has its lines comment-prefixed
    pub fn comments(&self, kind: CellKind) -> bool {
        match kind {
            CellKind::Markdown => true,
            CellKind::Code => false,
            CellKind::Raw => self.raw == RawRule::Commented,
        }
    }
}
