//! Line classes and explicit regions of the implicit (light) format
//!
//! A region is a cell wrapped in `<comment> +[ options]` ... `<comment> -` lines. It carries
//! anything a bare comment run or code run cannot: metadata, raw cells, empty sources,
//! blank lines inside code. When the content itself contains the end marker, the end marker
//! grows (`--`, `---`, ...) and its dashes are recorded under [`END_OF_CELL_KEY`].

use crate::languages::{LanguageSyntax, Uncommented};

/// Region option naming the cell kind (default `code`)
pub const CELL_TYPE_KEY: &str = "cell_type";
/// Region option holding a non-default end marker
pub const END_OF_CELL_KEY: &str = "endofcell";
/// Default region end marker
pub const DEFAULT_END: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightLine<'l> {
    Blank,
    /// `<comment> +` with the options text that follows
    RegionStart(&'l str),
    /// `<comment> -`, `<comment> --`, ... with the dashes
    RegionEnd(&'l str),
    /// A regular comment line, with the comment token and separator removed
    Comment(&'l str),
    /// A comment token not followed by the separator
    Irregular,
    Plain,
}

pub fn classify<'l>(syntax: &LanguageSyntax, spacing: &str, line: &'l str) -> LightLine<'l> {
    if line.trim().is_empty() {
        return LightLine::Blank;
    }
    match syntax.uncomment_with(line, spacing) {
        Uncommented::NotComment => LightLine::Plain,
        Uncommented::Irregular => LightLine::Irregular,
        Uncommented::Empty => LightLine::Comment(""),
        Uncommented::Text(text) => {
            if let Some(rest) = text.strip_prefix('+') {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    return LightLine::RegionStart(rest.trim());
                }
            }
            let dashes = text.trim_end();
            if dashes.chars().all(|c| c == '-') {
                return LightLine::RegionEnd(dashes);
            }
            LightLine::Comment(text)
        }
    }
}

pub fn region_start(syntax: &LanguageSyntax, spacing: &str, options: &str) -> String {
    if options.is_empty() {
        syntax.comment_with("+", spacing)
    } else {
        syntax.comment_with(&format!("+ {options}"), spacing)
    }
}

pub fn region_end(syntax: &LanguageSyntax, spacing: &str, dashes: &str) -> String {
    syntax.comment_with(dashes, spacing)
}

/// The shortest run of dashes whose end marker does not occur among `content`
pub fn end_marker_for(syntax: &LanguageSyntax, spacing: &str, content: &[String]) -> String {
    let mut dashes = DEFAULT_END.to_string();
    loop {
        let marker = region_end(syntax, spacing, &dashes);
        if !content.iter().any(|line| line.trim_end() == marker) {
            return dashes;
        }
        dashes.push('-');
    }
}

/// Index of the line closing a region whose content starts at `from`
pub fn find_region_end(
    syntax: &LanguageSyntax,
    spacing: &str,
    lines: &[&str],
    from: usize,
    dashes: &str,
) -> Option<usize> {
    let marker = region_end(syntax, spacing, dashes);
    (from..lines.len()).find(|&index| lines[index].trim_end() == marker)
}
