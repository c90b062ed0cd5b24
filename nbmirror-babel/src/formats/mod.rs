//! Built-in format descriptors
//!
//! This module holds the data for the dialects shipped with the crate, plus the line-level
//! grammars the marshaler and parser share: explicit marker lines ([`markers`]) and the
//! implicit format's line classes and regions ([`regions`]).

pub mod markers;
pub mod regions;

use crate::format::{
    CellBoundary, FormatDescriptor, HeaderRule, MarkdownRule, MarkerGrammar, RawRule,
};
use crate::notebook::CellKind;

pub const PERCENT: &str = "percent";
pub const NBCONVERT: &str = "nbconvert";
pub const LIGHT: &str = "light";
pub const HYDROGEN: &str = "hydrogen";
pub const NOMARKER: &str = "nomarker";

fn all_kinds() -> Vec<CellKind> {
    vec![CellKind::Markdown, CellKind::Code, CellKind::Raw]
}

/// `%%` cell markers, as understood by most notebook-aware editors
pub fn percent() -> FormatDescriptor {
    FormatDescriptor {
        id: PERCENT.to_string(),
        description: "Explicit '%%' cell markers".to_string(),
        version: 1,
        boundary: CellBoundary::Explicit(MarkerGrammar::Delimiter {
            token: "%%".to_string(),
        }),
        header: HeaderRule::default(),
        markdown: MarkdownRule::default(),
        raw: RawRule::Verbatim,
        cell_kinds: all_kinds(),
        inferable: true,
    }
}

/// The `%%` grammar under its own name. Texts only read back as hydrogen through their header.
pub fn hydrogen() -> FormatDescriptor {
    FormatDescriptor {
        id: HYDROGEN.to_string(),
        description: "Explicit '%%' cell markers (magics left uncommented)".to_string(),
        inferable: false,
        ..percent()
    }
}

/// `<codecell>` / `<markdowncell>` / `<rawcell>` tagged markers
pub fn nbconvert() -> FormatDescriptor {
    FormatDescriptor {
        id: NBCONVERT.to_string(),
        description: "Explicit tagged cell markers".to_string(),
        version: 1,
        boundary: CellBoundary::Explicit(MarkerGrammar::Tagged),
        header: HeaderRule::default(),
        markdown: MarkdownRule::default(),
        raw: RawRule::Verbatim,
        cell_kinds: all_kinds(),
        inferable: true,
    }
}

/// Marker-free scripts with optional `+`/`-` cell regions
pub fn light() -> FormatDescriptor {
    FormatDescriptor {
        id: LIGHT.to_string(),
        description: "Implicit cells from comment runs and blank lines".to_string(),
        version: 1,
        boundary: CellBoundary::Implicit { regions: true },
        header: HeaderRule::default(),
        markdown: MarkdownRule::default(),
        raw: RawRule::Commented,
        cell_kinds: all_kinds(),
        inferable: true,
    }
}

/// Light without regions: every cell is written bare and cell metadata is not kept
pub fn nomarker() -> FormatDescriptor {
    FormatDescriptor {
        id: NOMARKER.to_string(),
        description: "Bare script, no cell markers or cell metadata".to_string(),
        boundary: CellBoundary::Implicit { regions: false },
        inferable: false,
        ..light()
    }
}

pub fn builtin_formats() -> Vec<FormatDescriptor> {
    vec![percent(), hydrogen(), nbconvert(), light(), nomarker()]
}
