//! # poaf-loader
//!
//! Parsing and indexing engine for protein ontology (OBO) and protein
//! annotation (PAF) files.
//!
//! The crate turns two text blobs into one immutable [`ProteinIndex`]:
//!
//! - [`parse_ontology`] reads OBO stanzas into [`Term`](poaf_types::Term)s,
//!   skipping stanzas without an id and keeping the last of any repeated id.
//! - [`parse_annotations`] reads PAF rows into
//!   [`Annotation`](poaf_types::Annotation)s, keeping short rows as degraded.
//! - [`ProteinIndex`] answers id, keyword and per-protein lookups.
//!
//! ```ignore
//! use poaf_loader::{load_from_paths, LoadConfig};
//!
//! let (index, report) = load_from_paths("pr.obo", "PAF.txt", &LoadConfig::default())?;
//! println!("{} terms, {} stanzas skipped", report.ontology.terms_loaded, report.ontology.stanzas_skipped);
//!
//! for term in index.find_terms_by_keyword("kinase") {
//!     println!("{} {}", term.id, term.label());
//! }
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): stanza parsing, row parsing and search-text
//!   normalization run on the rayon thread pool.

#![warn(missing_docs)]

pub mod annotation;
mod loader;
pub mod ontology;
pub mod parser;
mod store;
mod types;

pub use annotation::{parse_annotations, ColumnLayout, ParsedAnnotations};
pub use loader::{
    discover_data_files, format_bytes, load_from_bytes, load_from_directory, load_from_paths,
};
pub use ontology::{parse_ontology, OntologyHeader, ParsedOntology};
pub use store::{IndexBuilder, ProteinIndex, ResolvedRelationship};
pub use types::{
    AnnotationStats, DataFiles, HeaderDetection, LoadConfig, LoadReport, OboConfig,
    OntologyStats, PafConfig, PoafError, PoafResult,
};

// Re-export poaf-types for convenience
pub use poaf_types;
