//! Language syntax table
//!
//! A flat, data-driven mapping from language id to a small comment-syntax descriptor.
//! Adding a language is a data addition ([`LanguageTable::register`]), never a code branch:
//! every syntax decision in the marshaler and parser is driven by the descriptor looked up
//! here.

use crate::error::{FormatError, Result};
use std::collections::HashMap;

/// Separator between a comment token and the commented text
pub const DEFAULT_SPACING: &str = " ";

/// Comment syntax of one host language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSyntax {
    pub id: String,
    pub aliases: Vec<String>,
    /// File extensions without the leading dot
    pub extensions: Vec<String>,
    /// Line comment tokens, in output preference order. All are accepted on input.
    pub line_comment: Vec<String>,
    /// Block comment pair, used per line when the language has no line comment
    pub block_comment: Option<(String, String)>,
    /// Whether a shebang or `coding:` pragma line may open the file
    pub encoding_pragma_allowed: bool,
}

/// Result of matching a line against a language's comment syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uncommented<'a> {
    /// The line does not start with a comment token
    NotComment,
    /// A bare comment token (or token pair) with no text
    Empty,
    /// The text after the token and its single separating space
    Text(&'a str),
    /// The line starts with a comment token that is not followed by the separator
    Irregular,
}

/// One way of writing a comment: a prefix and, for block-only languages, a suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle<'a> {
    pub prefix: &'a str,
    pub suffix: Option<&'a str>,
}

impl CommentStyle<'_> {
    /// Comment-prefix one line, joining token and text with `spacing`
    pub fn comment(&self, line: &str, spacing: &str) -> String {
        if line.is_empty() {
            return String::new();
        }
        match self.suffix {
            Some(suffix) => format!("{}{spacing}{line}{spacing}{suffix}", self.prefix),
            None => format!("{}{spacing}{line}", self.prefix),
        }
    }

    /// Match `line` against this style. The separator must be exactly `spacing`.
    pub fn uncomment<'l>(&self, line: &'l str, spacing: &str) -> Uncommented<'l> {
        let Some(rest) = line.strip_prefix(self.prefix) else {
            return Uncommented::NotComment;
        };
        let rest = match self.suffix {
            Some(suffix) => match rest.trim_end().strip_suffix(suffix) {
                Some(inner) => inner,
                None => return Uncommented::NotComment,
            },
            None => rest,
        };
        if rest.trim().is_empty() {
            return Uncommented::Empty;
        }
        let Some(text) = rest.strip_prefix(spacing) else {
            return Uncommented::Irregular;
        };
        match self.suffix {
            Some(_) => match text.strip_suffix(spacing) {
                Some(text) => Uncommented::Text(text),
                None => Uncommented::Irregular,
            },
            None => Uncommented::Text(text),
        }
    }
}

impl LanguageSyntax {
    pub fn new(id: &str, line_comment: &[&str]) -> Self {
        LanguageSyntax {
            id: id.to_string(),
            aliases: Vec::new(),
            extensions: Vec::new(),
            line_comment: line_comment.iter().map(|s| s.to_string()).collect(),
            block_comment: None,
            encoding_pragma_allowed: true,
        }
    }

    pub fn with_block(mut self, open: &str, close: &str) -> Self {
        self.block_comment = Some((open.to_string(), close.to_string()));
        self
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn without_pragma(mut self) -> Self {
        self.encoding_pragma_allowed = false;
        self
    }

    /// The comment style used when writing text
    pub fn output_style(&self) -> CommentStyle<'_> {
        match (self.line_comment.first(), &self.block_comment) {
            (Some(token), _) => CommentStyle {
                prefix: token,
                suffix: None,
            },
            (None, Some((open, close))) => CommentStyle {
                prefix: open,
                suffix: Some(close),
            },
            (None, None) => CommentStyle {
                prefix: "#",
                suffix: None,
            },
        }
    }

    /// Every comment style accepted on input, longest prefix first
    pub fn input_styles(&self) -> Vec<CommentStyle<'_>> {
        let mut styles: Vec<CommentStyle<'_>> = self
            .line_comment
            .iter()
            .map(|token| CommentStyle {
                prefix: token,
                suffix: None,
            })
            .collect();
        if styles.is_empty() {
            styles.push(self.output_style());
        }
        styles.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        styles
    }

    /// Comment-prefix one line. Blank lines stay blank.
    pub fn comment(&self, line: &str) -> String {
        self.comment_with(line, DEFAULT_SPACING)
    }

    pub fn comment_with(&self, line: &str, spacing: &str) -> String {
        self.output_style().comment(line, spacing)
    }

    pub fn uncomment<'l>(&self, line: &'l str) -> Uncommented<'l> {
        self.uncomment_with(line, DEFAULT_SPACING)
    }

    pub fn uncomment_with<'l>(&self, line: &'l str, spacing: &str) -> Uncommented<'l> {
        for style in self.input_styles() {
            match style.uncomment(line, spacing) {
                Uncommented::NotComment => continue,
                matched => return matched,
            }
        }
        Uncommented::NotComment
    }

    /// Whether the line starts with any accepted comment prefix
    pub fn is_comment_prefixed(&self, line: &str) -> bool {
        !matches!(self.uncomment(line), Uncommented::NotComment)
    }

    /// Whether `name` is this language's id or one of its aliases, ignoring case
    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// The built-in languages
pub fn builtin_languages() -> Vec<LanguageSyntax> {
    vec![
        LanguageSyntax::new("python", &["#"])
            .with_extensions(&["py"])
            .with_aliases(&["python2", "python3", "pypy", "ipython"]),
        LanguageSyntax::new("coconut", &["#"]).with_extensions(&["coco"]),
        LanguageSyntax::new("R", &["#"]).with_extensions(&["R", "r"]),
        LanguageSyntax::new("julia", &["#"]).with_extensions(&["jl"]),
        LanguageSyntax::new("c++", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["cpp", "cc", "cxx", "hpp"])
            .with_aliases(&["cpp", "c++11", "c++14", "c++17", "xcpp"]),
        LanguageSyntax::new("c", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["c", "h"]),
        LanguageSyntax::new("scheme", &[";;", ";"]).with_extensions(&["ss", "scm"]),
        LanguageSyntax::new("clojure", &[";;", ";"]).with_extensions(&["clj"]),
        LanguageSyntax::new("bash", &["#"])
            .with_extensions(&["sh"])
            .with_aliases(&["sh", "shell"]),
        LanguageSyntax::new("powershell", &["#"]).with_extensions(&["ps1"]),
        LanguageSyntax::new("q", &["/"]).with_extensions(&["q"]),
        LanguageSyntax::new("matlab", &["%"])
            .with_extensions(&["m"])
            .with_aliases(&["octave"]),
        LanguageSyntax::new("wolfram language", &[])
            .with_block("(*", "*)")
            .with_extensions(&["wolfram"])
            .with_aliases(&["wolfram", "mathematica"])
            .without_pragma(),
        LanguageSyntax::new("idl", &[";"]).with_extensions(&["pro"]),
        LanguageSyntax::new("javascript", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["js"])
            .with_aliases(&["js", "node"]),
        LanguageSyntax::new("typescript", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["ts"]),
        LanguageSyntax::new("scala", &["//"]).with_extensions(&["scala"]),
        LanguageSyntax::new("rust", &["//"])
            .with_extensions(&["rs"])
            .without_pragma(),
        LanguageSyntax::new("robotframework", &["#"]).with_extensions(&["robot", "resource"]),
        LanguageSyntax::new("csharp", &["//"])
            .with_extensions(&["cs"])
            .with_aliases(&["c#", "cs"])
            .without_pragma(),
        LanguageSyntax::new("fsharp", &["//"])
            .with_extensions(&["fs", "fsx"])
            .with_aliases(&["f#", "fs"])
            .without_pragma(),
        LanguageSyntax::new("sos", &["#"]).with_extensions(&["sos"]),
        LanguageSyntax::new("java", &["//"])
            .with_block("/*", "*/")
            .with_extensions(&["java"]),
        LanguageSyntax::new("groovy", &["//"]).with_extensions(&["groovy"]),
        LanguageSyntax::new("sage", &["#"]).with_extensions(&["sage"]),
        LanguageSyntax::new("ocaml", &[])
            .with_block("(*", "*)")
            .with_extensions(&["ml"])
            .without_pragma(),
        LanguageSyntax::new("haskell", &["--"]).with_extensions(&["hs"]),
        LanguageSyntax::new("tcl", &["#"]).with_extensions(&["tcl"]),
        LanguageSyntax::new("maxima", &[])
            .with_block("/*", "*/")
            .with_extensions(&["mac"])
            .without_pragma(),
        LanguageSyntax::new("gnuplot", &["#"]).with_extensions(&["gp"]),
        LanguageSyntax::new("stata", &["//"]).with_extensions(&["do"]),
        LanguageSyntax::new("sas", &[])
            .with_block("/*", "*/")
            .with_extensions(&["sas"])
            .without_pragma(),
        LanguageSyntax::new("xonsh", &["#"]).with_extensions(&["xsh"]),
        LanguageSyntax::new("logtalk", &["%"]).with_extensions(&["lgt", "logtalk"]),
        LanguageSyntax::new("lua", &["--"]).with_extensions(&["lua"]),
        LanguageSyntax::new("go", &["//"]).with_extensions(&["go"]),
        LanguageSyntax::new("sql", &["--"])
            .with_block("/*", "*/")
            .with_extensions(&["sql"]),
        LanguageSyntax::new("latex", &["%"])
            .with_extensions(&["tex"])
            .with_aliases(&["tex"]),
    ]
}

/// Lookup table over language syntaxes, by id, alias and file extension
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    languages: Vec<LanguageSyntax>,
    by_name: HashMap<String, usize>,
    by_extension: HashMap<String, usize>,
}

impl LanguageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for language in builtin_languages() {
            table.register(language);
        }
        table
    }

    /// Register a language. A language with the same id replaces the existing entry.
    pub fn register(&mut self, language: LanguageSyntax) {
        let index = match self.by_name.get(&language.id.to_lowercase()) {
            Some(&index) if self.languages[index].id.eq_ignore_ascii_case(&language.id) => {
                self.languages[index] = language.clone();
                index
            }
            _ => {
                self.languages.push(language.clone());
                self.languages.len() - 1
            }
        };
        self.by_name.insert(language.id.to_lowercase(), index);
        for alias in &language.aliases {
            self.by_name.insert(alias.to_lowercase(), index);
        }
        for extension in &language.extensions {
            self.by_extension.insert(extension.clone(), index);
        }
    }

    /// Look up a language by id or alias (case-insensitive)
    pub fn get(&self, name: &str) -> Result<&LanguageSyntax> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.languages[index])
            .filter(|language| language.matches_name(name))
            .ok_or_else(|| FormatError::UnknownLanguage(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Look up a language by file extension, with or without the leading dot.
    /// Exact case is tried first (`.R` and `.r` are both R, `.m` is MATLAB).
    pub fn by_extension(&self, extension: &str) -> Option<&LanguageSyntax> {
        let extension = extension.trim_start_matches('.');
        self.by_extension
            .get(extension)
            .or_else(|| self.by_extension.get(&extension.to_lowercase()))
            .map(|&index| &self.languages[index])
    }

    /// Detect the language of a file from its name
    pub fn detect_from_filename(&self, filename: &str) -> Option<&LanguageSyntax> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;
        self.by_extension(extension)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageSyntax> {
        self.languages.iter()
    }

    /// Every distinct input comment style across the table, longest prefix first
    pub fn comment_styles(&self) -> Vec<CommentStyle<'_>> {
        let mut styles: Vec<CommentStyle<'_>> = Vec::new();
        for language in &self.languages {
            for style in language.input_styles() {
                if !styles.contains(&style) {
                    styles.push(style);
                }
            }
        }
        styles.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        styles
    }
}
