//! Mirror targets
//!
//! The `formats` metadata names every file a notebook is mirrored to: `ipynb` for the
//! notebook itself, then `<ext>` or `<ext>:<format>` for text mirrors. `auto` stands for the
//! extension of the notebook's own language.

use crate::error::{FormatError, Result};
use crate::languages::LanguageTable;
use crate::notebook::{Metadata, FORMATS_KEY};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

pub const NOTEBOOK_EXTENSION: &str = "ipynb";
pub const AUTO_EXTENSION: &str = "auto";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTarget {
    /// Extension without the leading dot, or `auto`
    pub extension: String,
    pub format: Option<String>,
}

impl FormatTarget {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (extension, format) = match text.split_once(':') {
            Some((extension, format)) => (extension, Some(format.trim())),
            None => (text, None),
        };
        let extension = extension.trim().trim_start_matches('.');
        if extension.is_empty() || format.is_some_and(str::is_empty) {
            return Err(FormatError::metadata(format!("invalid mirror target '{text}'")));
        }
        Ok(FormatTarget {
            extension: extension.to_string(),
            format: format.map(str::to_string),
        })
    }

    pub fn is_notebook(&self) -> bool {
        self.extension == NOTEBOOK_EXTENSION
    }

    /// Check the target against the known languages and a format lookup
    pub fn validate(
        &self,
        languages: &LanguageTable,
        has_format: impl Fn(&str) -> bool,
    ) -> Result<()> {
        if self.is_notebook() {
            if let Some(format) = &self.format {
                return Err(FormatError::metadata(format!(
                    "the notebook target cannot name a text format ('{format}')"
                )));
            }
            return Ok(());
        }
        if self.extension != AUTO_EXTENSION && languages.by_extension(&self.extension).is_none() {
            return Err(FormatError::metadata(format!(
                "no language is registered for extension '{}'",
                self.extension
            )));
        }
        match &self.format {
            Some(format) if !has_format(format) => Err(FormatError::FormatNotFound(format.clone())),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for FormatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{}:{}", self.extension, format),
            None => write!(f, "{}", self.extension),
        }
    }
}

/// Read the `formats` list. A missing key is an empty list.
pub fn read_pairing(metadata: &Metadata) -> Result<Vec<FormatTarget>> {
    let targets: Vec<&str> = match metadata.get(FORMATS_KEY) {
        None => return Ok(Vec::new()),
        Some(Value::String(list)) => list.split(',').filter(|t| !t.trim().is_empty()).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or_else(|| {
                    FormatError::metadata(format!("'{FORMATS_KEY}' entries must be strings"))
                })
            })
            .collect::<Result<_>>()?,
        Some(_) => {
            return Err(FormatError::metadata(format!(
                "'{FORMATS_KEY}' must be a list or a comma separated string"
            )))
        }
    };

    let parsed = targets
        .into_iter()
        .map(FormatTarget::parse)
        .collect::<Result<Vec<_>>>()?;
    let mut seen = HashSet::new();
    for target in &parsed {
        if !seen.insert(target.extension.as_str()) {
            return Err(FormatError::metadata(format!(
                "extension '{}' is paired more than once",
                target.extension
            )));
        }
    }
    Ok(parsed)
}
