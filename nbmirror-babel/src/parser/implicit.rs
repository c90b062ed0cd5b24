use super::uncomment_content;
use crate::common::parse_options;
use crate::error::{FormatError, Result};
use crate::format::FormatDescriptor;
use crate::formats::regions::{
    classify, find_region_end, LightLine, CELL_TYPE_KEY, DEFAULT_END, END_OF_CELL_KEY,
};
use crate::languages::LanguageSyntax;
use crate::notebook::{Cell, CellKind, Metadata};
use serde_json::Value;

struct Reader<'a> {
    lines: &'a [&'a str],
    classes: Vec<LightLine<'a>>,
    syntax: &'a LanguageSyntax,
    format: &'a FormatDescriptor,
}

impl<'a> Reader<'a> {
    /// End (exclusive) of the block of non-blank lines starting at `from`
    fn block_end(&self, from: usize) -> usize {
        (from..self.lines.len())
            .find(|&i| self.classes[i] == LightLine::Blank)
            .unwrap_or(self.lines.len())
    }

    fn is_comment_block(&self, from: usize, to: usize) -> bool {
        self.classes[from..to]
            .iter()
            .all(|class| matches!(class, LightLine::Comment(_)))
    }

    /// Read the block at `from`; returns the cell and the index after it
    fn block(&self, from: usize) -> Result<(Cell, usize)> {
        let mut end = self.block_end(from);
        for index in from + 1..end {
            if matches!(
                self.classes[index],
                LightLine::RegionStart(_) | LightLine::RegionEnd(_)
            ) {
                return Err(FormatError::boundary(
                    Some(index + 1),
                    self.lines[index],
                    "region marker inside a cell must follow a blank line",
                ));
            }
        }

        let block = &self.classes[from..end];
        if block.contains(&LightLine::Plain) {
            let source = self.lines[from..end].iter().map(|l| l.to_string()).collect();
            return Ok((cell(CellKind::Code, source, Metadata::new()), end));
        }
        if let Some(offset) = block.iter().position(|c| *c == LightLine::Irregular) {
            let index = from + offset;
            return Err(FormatError::boundary(
                Some(index + 1),
                self.lines[index],
                "comment token must be followed by a space",
            ));
        }

        let mut source = self.comment_texts(from, end);
        // One blank line continues a markdown cell when a comment block follows
        while end + 1 < self.lines.len()
            && self.classes[end] == LightLine::Blank
            && matches!(self.classes[end + 1], LightLine::Comment(_))
        {
            let next_end = self.block_end(end + 1);
            if !self.is_comment_block(end + 1, next_end) {
                break;
            }
            source.push(String::new());
            source.extend(self.comment_texts(end + 1, next_end));
            end = next_end;
        }
        Ok((cell(CellKind::Markdown, source, Metadata::new()), end))
    }

    fn comment_texts(&self, from: usize, to: usize) -> Vec<String> {
        self.classes[from..to]
            .iter()
            .map(|class| match class {
                LightLine::Comment(text) => text.to_string(),
                _ => String::new(),
            })
            .collect()
    }

    /// Read the region opened at `from`; returns the cell and the index after it
    fn region(&self, from: usize, options: &str) -> Result<(Cell, usize)> {
        let line_no = from + 1;
        let invalid = |message: String| FormatError::InvalidMetadata {
            line: Some(line_no),
            message,
        };
        let mut metadata = parse_options(options).map_err(invalid)?;

        let kind = match metadata.remove(CELL_TYPE_KEY) {
            None => CellKind::Code,
            Some(Value::String(token)) => {
                CellKind::from_token(&token).ok_or(FormatError::UnsupportedCellType {
                    line: Some(line_no),
                    token,
                })?
            }
            Some(other) => {
                return Err(invalid(format!(
                    "'{CELL_TYPE_KEY}' must be a string, found {other}"
                )))
            }
        };
        let dashes = match metadata.remove(END_OF_CELL_KEY) {
            None => DEFAULT_END.to_string(),
            Some(Value::String(dashes))
                if !dashes.is_empty() && dashes.chars().all(|c| c == '-') =>
            {
                dashes
            }
            Some(other) => {
                return Err(invalid(format!(
                    "'{END_OF_CELL_KEY}' must be a run of dashes, found {other}"
                )))
            }
        };

        let spacing = self.format.spacing();
        let end = find_region_end(self.syntax, spacing, self.lines, from + 1, &dashes)
            .ok_or_else(|| {
                FormatError::boundary(Some(line_no), self.lines[from], "region is not closed")
            })?;

        let mut source = Vec::with_capacity(end - from - 1);
        for index in from + 1..end {
            let line = self.lines[index];
            if self.format.comments(kind) {
                source.push(uncomment_content(self.syntax, spacing, line, index + 1)?);
            } else {
                source.push(line.to_string());
            }
        }
        Ok((cell(kind, source, metadata), end + 1))
    }
}

fn cell(kind: CellKind, source: Vec<String>, metadata: Metadata) -> Cell {
    Cell {
        kind,
        source,
        metadata,
        explicit_type_marker: false,
    }
}

pub(super) fn parse_cells(
    lines: &[&str],
    body_start: usize,
    syntax: &LanguageSyntax,
    format: &FormatDescriptor,
) -> Result<Vec<Cell>> {
    let reader = Reader {
        lines,
        classes: lines
            .iter()
            .map(|line| classify(syntax, format.spacing(), line))
            .collect(),
        syntax,
        format,
    };

    let mut cells = Vec::new();
    let mut index = body_start;
    while index < lines.len() {
        let (cell, next) = match reader.classes[index] {
            LightLine::Blank => {
                index += 1;
                continue;
            }
            LightLine::RegionStart(options) => reader.region(index, options)?,
            LightLine::RegionEnd(_) => {
                return Err(FormatError::boundary(
                    Some(index + 1),
                    lines[index],
                    "region end without a matching start",
                ))
            }
            LightLine::Comment(_) | LightLine::Irregular | LightLine::Plain => {
                reader.block(index)?
            }
        };
        cells.push(cell);
        index = next;
    }
    Ok(cells)
}
