//! Shared helpers for the marshaler and parser

pub mod options;

pub use options::{encode_options, parse_options};

/// A line is blank when it holds nothing but whitespace
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Drop trailing blank lines in place
pub fn trim_trailing_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| is_blank(line)) {
        lines.pop();
    }
}

/// Split text into lines, accepting `\n`, `\r\n` and lone `\r` as line endings
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// The lines of a cell source, with any embedded line breaks split out
pub fn content_lines(source: &[String]) -> Vec<String> {
    source.iter().flat_map(|line| split_lines(line)).collect()
}
