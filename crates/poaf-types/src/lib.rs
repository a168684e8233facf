//! # poaf-types
//!
//! Type definitions for protein ontology terms and protein annotations.
//!
//! This crate provides the record types produced by `poaf-loader`: ontology
//! [`Term`]s with their [`Relationship`] edges, and PAF [`Annotation`] rows.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use poaf_types::{Relationship, Term, TermId};
//! use poaf_types::well_known;
//!
//! let mut term = Term::new("PR:000000650");
//! term.name = Some("mitogen-activated protein kinase 1".to_string());
//! term.add_relationship(Relationship::is_a("PR:000000102"));
//!
//! let parent: TermId = term.parents().next().unwrap().to_string();
//! assert_eq!(parent, "PR:000000102");
//! assert_eq!(well_known::IS_A, "is_a");
//! ```

#![warn(missing_docs)]

mod annotation;
mod relationship;
mod term;
mod term_id;
pub mod well_known;

// Re-export all public types at crate root
pub use annotation::Annotation;
pub use relationship::Relationship;
pub use term::Term;
pub use term_id::{namespace, TermId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _id: TermId = "PR:000000001".to_string();
        let _term = Term::new("PR:000000001");
        let _rel = Relationship::is_a("PR:000000001");
        let _annotation = Annotation::default();
    }

    #[test]
    fn test_well_known_accessible() {
        assert_eq!(well_known::IS_A, "is_a");
        assert_eq!(well_known::PAF_PRO_ID, "PRO_ID");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mut term = Term::new("PR:000000650");
        term.name = Some("kinase".to_string());
        term.synonyms.push("ERK2".to_string());
        term.add_relationship(Relationship::new("part_of", "GO:0005634"));
        term.add_attribute("xref", "UniProtKB:P28482");

        let json = serde_json::to_string(&term).unwrap();
        let parsed: Term = serde_json::from_str(&json).unwrap();
        assert_eq!(term, parsed);

        let annotation = Annotation {
            protein_id: "PR:000000650".to_string(),
            fields: vec!["PR:000000650".to_string()],
            degraded: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&annotation).unwrap();
        let parsed: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(annotation, parsed);
    }
}
