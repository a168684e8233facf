//! Ontology relationship edge type.
//!
//! This module provides the `Relationship` struct, a typed directed edge from
//! one term to another, identified only by the target's id.

use crate::{well_known, TermId};

/// A typed, directed edge from a term to a target term.
///
/// Edges come from `is_a:` and `relationship:` lines of an ontology stanza.
/// The target is never checked against the loaded term set: edges pointing at
/// terms that are absent from the load are legal and kept as-is.
///
/// # Examples
///
/// ```
/// use poaf_types::Relationship;
///
/// let parent = Relationship::is_a("PR:000000001");
/// assert!(parent.is_is_a());
///
/// let location = Relationship::new("part_of", "GO:0005634");
/// assert!(!location.is_is_a());
/// assert_eq!(location.kind, "part_of");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relationship {
    /// Relation kind (`is_a`, `part_of`, `only_in_taxon`, ...).
    pub kind: String,
    /// Identifier of the target term.
    pub target: TermId,
}

impl Relationship {
    /// Creates an edge of the given kind.
    pub fn new(kind: impl Into<String>, target: impl Into<TermId>) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
        }
    }

    /// Creates an `is_a` (subtype) edge.
    pub fn is_a(target: impl Into<TermId>) -> Self {
        Self::new(well_known::IS_A, target)
    }

    /// Returns true if this is an `is_a` (subtype) edge.
    ///
    /// `is_a` edges define the taxonomy of the ontology.
    pub fn is_is_a(&self) -> bool {
        self.kind == well_known::IS_A
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_helpers() {
        let rel = Relationship::is_a("PR:000000001");
        assert_eq!(rel.kind, "is_a");
        assert_eq!(rel.target, "PR:000000001");
        assert!(rel.is_is_a());
        assert_eq!(rel.to_string(), "is_a PR:000000001");
    }

    #[test]
    fn test_typed_relationship() {
        let rel = Relationship::new("only_in_taxon", "NCBITaxon:9606");
        assert!(!rel.is_is_a());
        assert_eq!(rel, Relationship::new("only_in_taxon", "NCBITaxon:9606"));
    }
}
