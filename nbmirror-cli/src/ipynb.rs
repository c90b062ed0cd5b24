//! `.ipynb` adapter
//!
//! Reads and writes nbformat 4 JSON. Only the structural part of a notebook crosses this
//! boundary: cell kinds, sources and metadata. Outputs and execution counts are dropped on
//! read and written empty.

use nbmirror_babel::notebook::split_source;
use nbmirror_babel::{Cell, CellKind, Metadata, Notebook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const NBFORMAT: u32 = 4;
const NBFORMAT_MINOR: u32 = 5;

#[derive(Debug, Error)]
pub enum IpynbError {
    #[error("invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported nbformat version {0}, expected 4")]
    Version(u32),

    #[error("cell {index}: unknown cell type '{cell_type}'")]
    CellType { index: usize, cell_type: String },
}

/// nbformat stores sources either as one string or as a list of lines that keep their `\n`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Source {
    fn into_lines(self) -> Vec<String> {
        match self {
            Source::Text(text) => split_source(&text),
            Source::Lines(lines) => split_source(&lines.concat()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    metadata: Metadata,
    source: Source,
}

#[derive(Debug, Deserialize)]
struct RawNotebook {
    nbformat: u32,
    #[serde(default)]
    metadata: Metadata,
    cells: Vec<RawCell>,
}

#[derive(Debug, Serialize)]
struct OutCell<'a> {
    cell_type: &'static str,
    metadata: &'a Metadata,
    source: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_count: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct OutNotebook<'a> {
    cells: Vec<OutCell<'a>>,
    metadata: &'a Metadata,
    nbformat: u32,
    nbformat_minor: u32,
}

pub fn read_ipynb(text: &str) -> Result<Notebook, IpynbError> {
    let raw: RawNotebook = serde_json::from_str(text)?;
    if raw.nbformat != NBFORMAT {
        return Err(IpynbError::Version(raw.nbformat));
    }
    let cells = raw
        .cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| {
            let kind = CellKind::from_token(&cell.cell_type).ok_or_else(|| {
                IpynbError::CellType {
                    index,
                    cell_type: cell.cell_type.clone(),
                }
            })?;
            Ok(Cell {
                kind,
                source: cell.source.into_lines(),
                metadata: cell.metadata,
                explicit_type_marker: false,
            })
        })
        .collect::<Result<Vec<_>, IpynbError>>()?;
    Ok(Notebook {
        cells,
        metadata: raw.metadata,
    })
}

/// Lines in nbformat's list form: every line but the last keeps its newline
fn source_lines(cell: &Cell) -> Vec<String> {
    let last = cell.source.len().saturating_sub(1);
    cell.source
        .iter()
        .enumerate()
        .map(|(i, line)| if i < last { format!("{line}\n") } else { line.clone() })
        .collect()
}

pub fn write_ipynb(notebook: &Notebook) -> Result<String, IpynbError> {
    let cells = notebook
        .cells
        .iter()
        .map(|cell| {
            let code = cell.kind == CellKind::Code;
            OutCell {
                cell_type: cell.kind.as_str(),
                metadata: &cell.metadata,
                source: source_lines(cell),
                execution_count: code.then_some(Value::Null),
                outputs: code.then(Vec::new),
            }
        })
        .collect();
    let out = OutNotebook {
        cells,
        metadata: &notebook.metadata,
        nbformat: NBFORMAT,
        nbformat_minor: NBFORMAT_MINOR,
    };
    let mut text = serde_json::to_string_pretty(&out)?;
    text.push('\n');
    Ok(text)
}
