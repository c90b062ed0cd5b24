//! Mirror registry for format and language lookup
//!
//! The registry owns the language table and the format descriptor set. It is built once,
//! from the built-in data plus any configured additions, and then shared by reference:
//! every conversion goes through `&MirrorRegistry`, so any number of threads can convert
//! at the same time.

use crate::detect::{detect, DetectHint, Detection};
use crate::error::{FormatError, Result};
use crate::format::FormatDescriptor;
use crate::languages::{LanguageSyntax, LanguageTable};
use crate::marshal::{check_foreign_markers, marshal, resolve_language, MarshalOptions};
use crate::normalize::{normalize_notebook, normalize_text};
use crate::notebook::Notebook;
use crate::pairing::{read_pairing, FormatTarget};
use crate::parser::parse;
use std::collections::HashMap;

/// Registry of text formats and host languages
///
/// # Examples
///
/// ```ignore
/// let registry = MirrorRegistry::default();
/// let text = registry.marshal(&notebook, "percent", &MarshalOptions::default())?;
/// let back = registry.parse(&text, "java", "percent")?;
/// ```
#[derive(Debug, Clone)]
pub struct MirrorRegistry {
    languages: LanguageTable,
    formats: HashMap<String, FormatDescriptor>,
}

impl MirrorRegistry {
    /// Create a registry with no formats and no languages
    pub fn new() -> Self {
        MirrorRegistry {
            languages: LanguageTable::new(),
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same id already exists, it will be replaced.
    pub fn register_format(&mut self, format: FormatDescriptor) {
        self.formats.insert(format.id.clone(), format);
    }

    /// Register a language, replacing any language with the same id
    pub fn register_language(&mut self, language: LanguageSyntax) {
        self.languages.register(language);
    }

    /// Get a format by id
    pub fn format(&self, id: &str) -> Result<&FormatDescriptor> {
        self.formats
            .get(id)
            .ok_or_else(|| FormatError::FormatNotFound(id.to_string()))
    }

    /// Check if a format exists
    pub fn has_format(&self, id: &str) -> bool {
        self.formats.contains_key(id)
    }

    pub fn formats(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats.values()
    }

    /// List all available format ids (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.formats.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn languages(&self) -> &LanguageTable {
        &self.languages
    }

    /// Get a language by id or alias
    pub fn language(&self, id: &str) -> Result<&LanguageSyntax> {
        self.languages.get(id)
    }

    /// Detect the language of a file from its extension
    ///
    /// Returns None when no registered language uses the extension.
    pub fn language_for_filename(&self, filename: &str) -> Option<&LanguageSyntax> {
        self.languages.detect_from_filename(filename)
    }

    /// The notebook's mirror targets, validated against this registry
    pub fn pairing(&self, notebook: &Notebook) -> Result<Vec<FormatTarget>> {
        let targets = read_pairing(&notebook.metadata)?;
        for target in &targets {
            target.validate(&self.languages, |id| self.has_format(id))?;
        }
        Ok(targets)
    }

    /// Marshal a notebook into the format `format_id`
    ///
    /// Without a header the text must not contain marker lines of another inferable
    /// format, or detection would read it back as that format.
    pub fn marshal(
        &self,
        notebook: &Notebook,
        format_id: &str,
        options: &MarshalOptions,
    ) -> Result<String> {
        let format = self.format(format_id)?;
        self.pairing(notebook)?;
        let text = marshal(notebook, format, &self.languages, options)?;
        if !options.insert_header {
            let syntax = resolve_language(notebook, &self.languages)?;
            let formats: Vec<&FormatDescriptor> = self.formats().collect();
            check_foreign_markers(&text, format, syntax, &formats)?;
        }
        Ok(text)
    }

    /// Parse text written in `format_id` for the language `language_id`
    pub fn parse(&self, text: &str, language_id: &str, format_id: &str) -> Result<Notebook> {
        let format = self.format(format_id)?;
        let syntax = self.language(language_id)?;
        parse(text, syntax, format)
    }

    pub fn detect(&self, text: &str, hint: &DetectHint) -> Result<Option<Detection>> {
        detect(text, self, hint)
    }

    pub fn normalize(&self, notebook: &Notebook) -> Notebook {
        normalize_notebook(notebook, &self.languages)
    }

    pub fn normalize_text(&self, text: &str, language_id: &str) -> Result<String> {
        Ok(normalize_text(text, self.language(language_id)?))
    }

    /// Create a registry with the built-in formats and languages
    pub fn with_defaults() -> Self {
        let mut registry = MirrorRegistry {
            languages: LanguageTable::with_defaults(),
            formats: HashMap::new(),
        };
        for format in crate::formats::builtin_formats() {
            registry.register_format(format);
        }
        registry
    }
}

impl Default for MirrorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
