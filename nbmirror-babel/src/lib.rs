//! Bidirectional notebook <-> text mirroring
//!
//!     This crate converts notebooks (an ordered list of typed cells plus metadata) into plain
//!     text scripts of the notebook's host language, and parses those scripts back. Markdown
//!     cells become comments, code cells stay code, and the two directions are inverses up to
//!     a well defined canonical form (see ./normalize.rs).
//!
//!     This is a pure lib, that is, it powers the nbmirror cli but is shell agnostic: no code
//!     here reads files, prints or looks at env vars. Logging goes through `tracing` and is
//!     only visible when the embedding program installs a subscriber.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # FormatError
//!     ├── notebook.rs             # Notebook, Cell, metadata keys
//!     ├── languages.rs            # Language syntax table (comment tokens per language)
//!     ├── format.rs               # Format descriptor types
//!     ├── formats
//!     │   ├── mod.rs              # Built-in descriptors: percent, hydrogen, nbconvert, light, nomarker
//!     │   ├── markers.rs          # Explicit marker lines
//!     │   └── regions.rs          # Light line classes and +/- regions
//!     ├── common                  # Option codec, line helpers
//!     ├── header.rs               # Shebang, encoding pragma, commented YAML header
//!     ├── marshal.rs              # Notebook -> text
//!     ├── parser                  # Text -> notebook (explicit and implicit readers)
//!     ├── detect.rs               # Format / language inference
//!     ├── normalize.rs            # Canonical forms
//!     ├── pairing.rs              # `formats` mirror targets
//!     ├── registry.rs             # MirrorRegistry: the one value every call goes through
//!     └── transforms.rs           # convert / reformat pipelines
//!
//! Testing
//!     tests
//!     ├── lib.rs
//!     ├── <area>/mod.rs
//!     └── fixtures
//!         └── <docname>.<format>.<ext>
//!
//!     Note that rust does not by default discover tests in subdirectories, so tests/lib.rs
//!     includes the test modules.
//!
//! Data, not code
//!
//!     Languages and formats are data. A language is its comment tokens, extensions and
//!     aliases; a format is a descriptor (explicit marker grammar or implicit boundaries,
//!     header rule, markdown spacing, raw cell rule). There is exactly one marshal algorithm
//!     and one parse algorithm, both driven by the descriptors. Adding a language is a table
//!     entry, never a new branch.
//!
//! Ambiguity
//!
//!     When a line could belong to two cells, or a comment is written in a way the format does
//!     not define, the parser fails with the line number instead of guessing. The marshaler
//!     applies the same rule in reverse: it refuses to write code that would read back as a
//!     cell marker (its own, or without a header another format's), and wraps light cells
//!     that a bare comment or code run cannot carry in explicit regions.
//!
pub mod common;
pub mod detect;
pub mod error;
pub mod format;
pub mod formats;
pub mod header;
pub mod languages;
pub mod marshal;
pub mod normalize;
pub mod notebook;
pub mod pairing;
pub mod parser;
pub mod registry;
pub mod transforms;

pub use detect::{DetectHint, Detection};
pub use error::FormatError;
pub use format::FormatDescriptor;
pub use languages::{LanguageSyntax, LanguageTable};
pub use marshal::MarshalOptions;
pub use notebook::{Cell, CellKind, Metadata, Notebook};
pub use pairing::FormatTarget;
pub use registry::MirrorRegistry;
