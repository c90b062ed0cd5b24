//! Conversion pipelines built from parse, marshal and normalize
//!
//! These are the operations a front end actually performs: converting a text mirror from
//! one dialect to another, re-saving a text mirror in canonical form, and checking that a
//! notebook survives a trip through a format.

use crate::error::Result;
use crate::marshal::{resolve_language, MarshalOptions};
use crate::notebook::Notebook;
use crate::registry::MirrorRegistry;

/// Convert text from one format to another
///
/// # Example
///
/// ```ignore
/// let registry = MirrorRegistry::default();
/// let light = convert_text(&registry, percent_text, "java", "percent", "light", &options)?;
/// ```
pub fn convert_text(
    registry: &MirrorRegistry,
    text: &str,
    language_id: &str,
    from: &str,
    to: &str,
    options: &MarshalOptions,
) -> Result<String> {
    let notebook = registry.parse(text, language_id, from)?;
    registry.marshal(&notebook, to, options)
}

/// Round-trip transformation: parse, normalize and re-marshal in the same format
///
/// Running this twice gives the same text as running it once.
pub fn reformat(
    registry: &MirrorRegistry,
    text: &str,
    language_id: &str,
    format_id: &str,
    options: &MarshalOptions,
) -> Result<String> {
    let notebook = registry.parse(text, language_id, format_id)?;
    registry.marshal(&registry.normalize(&notebook), format_id, options)
}

/// Whether `notebook` comes back unchanged, up to normalization, from `format_id`
pub fn survives_round_trip(
    registry: &MirrorRegistry,
    notebook: &Notebook,
    format_id: &str,
) -> Result<bool> {
    let expected = registry.normalize(notebook);
    let text = registry.marshal(&expected, format_id, &MarshalOptions::default())?;
    let language = resolve_language(&expected, registry.languages())?;
    let back = registry.parse(&text, &language.id, format_id)?;
    Ok(registry.normalize(&back) == expected)
}
