use super::uncomment_content;
use crate::common::{is_blank, trim_trailing_blank};
use crate::error::Result;
use crate::format::{FormatDescriptor, MarkerGrammar};
use crate::formats::markers::{decode_marker, match_marker, CellStart};
use crate::languages::LanguageSyntax;
use crate::notebook::{Cell, CellKind, Metadata};

/// A cell being collected: its marker (if any) and its `(line_no, text)` content
struct Pending<'l> {
    start: Option<CellStart>,
    content: Vec<(usize, &'l str)>,
}

impl Pending<'_> {
    fn finish(self, syntax: &LanguageSyntax, format: &FormatDescriptor) -> Result<Option<Cell>> {
        let Some(start) = self.start else {
            // Text ahead of the first marker
            let mut source: Vec<String> = self
                .content
                .iter()
                .map(|(_, line)| line.to_string())
                .skip_while(|line| is_blank(line))
                .collect();
            trim_trailing_blank(&mut source);
            if source.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Cell {
                kind: CellKind::Code,
                source,
                metadata: Metadata::new(),
                explicit_type_marker: false,
            }));
        };

        let mut source = Vec::with_capacity(self.content.len());
        for (line_no, line) in &self.content {
            if format.comments(start.kind) {
                source.push(uncomment_content(syntax, format.spacing(), line, *line_no)?);
            } else {
                source.push(line.to_string());
            }
        }
        trim_trailing_blank(&mut source);
        Ok(Some(Cell {
            kind: start.kind,
            source,
            metadata: start.metadata,
            explicit_type_marker: start.explicit_type_marker,
        }))
    }
}

pub(super) fn parse_cells(
    lines: &[&str],
    body_start: usize,
    grammar: &MarkerGrammar,
    syntax: &LanguageSyntax,
    format: &FormatDescriptor,
) -> Result<Vec<Cell>> {
    let styles = syntax.input_styles();
    let mut cells = Vec::new();
    let mut pending = Pending {
        start: None,
        content: Vec::new(),
    };

    for (index, line) in lines.iter().enumerate().skip(body_start) {
        let line_no = index + 1;
        match match_marker(grammar, &styles, format.spacing(), line) {
            Some(found) => {
                let start = decode_marker(found, line_no)?;
                let done = std::mem::replace(
                    &mut pending,
                    Pending {
                        start: Some(start),
                        content: Vec::new(),
                    },
                );
                cells.extend(done.finish(syntax, format)?);
            }
            None => pending.content.push((line_no, *line)),
        }
    }
    cells.extend(pending.finish(syntax, format)?);
    Ok(cells)
}
