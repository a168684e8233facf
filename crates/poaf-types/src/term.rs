//! Ontology term type.
//!
//! This module provides the `Term` struct representing one `[Term]` (or
//! `[Typedef]`) stanza of an OBO ontology file.

use std::collections::BTreeMap;

use crate::{well_known, Relationship, TermId};

/// One ontology entry parsed from a stanza.
///
/// Attributes the loader understands are promoted to named fields. Every
/// other attribute is kept in [`Term::attributes`] in the order its values
/// appeared, so unknown tags never cause a load failure.
///
/// # Examples
///
/// ```
/// use poaf_types::{Relationship, Term};
///
/// let mut term = Term::new("PR:000000650");
/// term.name = Some("mitogen-activated protein kinase 1".to_string());
/// term.synonyms.push("ERK2".to_string());
/// term.add_relationship(Relationship::is_a("PR:000000102"));
/// term.add_attribute("xref", "UniProtKB:P28482");
///
/// assert_eq!(term.parents().collect::<Vec<_>>(), vec!["PR:000000102"]);
/// assert_eq!(term.attribute("xref"), ["UniProtKB:P28482"]);
/// assert!(!term.is_obsolete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    /// Unique identifier (primary key).
    pub id: TermId,
    /// Human-readable label.
    pub name: Option<String>,
    /// Free-text definition, unquoted and unescaped.
    pub definition: Option<String>,
    /// Cross-references cited by the definition (`[PMID:123, GOC:x]`).
    pub definition_xrefs: Vec<String>,
    /// Synonym texts in stanza order.
    pub synonyms: Vec<String>,
    /// Outgoing edges in stanza order, without duplicates.
    pub relationships: Vec<Relationship>,
    /// Attributes not promoted to a named field, values in stanza order.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl Term {
    /// Creates an empty term with the given id.
    pub fn new(id: impl Into<TermId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Adds an edge unless an identical `(kind, target)` pair is already present.
    ///
    /// Returns true if the edge was added.
    pub fn add_relationship(&mut self, relationship: Relationship) -> bool {
        if self.relationships.contains(&relationship) {
            return false;
        }
        self.relationships.push(relationship);
        true
    }

    /// Appends a value to a raw attribute.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Returns all values of a raw attribute (empty if absent).
    pub fn attribute(&self, name: &str) -> &[String] {
        self.attributes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if the stanza carried `is_obsolete: true`.
    pub fn is_obsolete(&self) -> bool {
        self.attribute(well_known::IS_OBSOLETE)
            .iter()
            .any(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Returns the targets of this term's `is_a` edges.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(|r| r.is_is_a())
            .map(|r| r.target.as_str())
    }

    /// Returns the text fields covered by keyword search: name, definition
    /// and every synonym.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.name
            .as_deref()
            .into_iter()
            .chain(self.definition.as_deref())
            .chain(self.synonyms.iter().map(String::as_str))
    }

    /// Returns the name, or the id when the term has no name.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_relationship_deduplicates() {
        let mut term = Term::new("PR:1");
        assert!(term.add_relationship(Relationship::is_a("PR:2")));
        assert!(!term.add_relationship(Relationship::is_a("PR:2")));
        assert!(term.add_relationship(Relationship::new("part_of", "PR:2")));
        assert_eq!(term.relationships.len(), 2);
    }

    #[test]
    fn test_attributes_accumulate_in_order() {
        let mut term = Term::new("PR:1");
        term.add_attribute("xref", "A");
        term.add_attribute("xref", "B");
        assert_eq!(term.attribute("xref"), ["A", "B"]);
        assert!(term.attribute("comment").is_empty());
    }

    #[test]
    fn test_obsolete_flag() {
        let mut term = Term::new("PR:1");
        assert!(!term.is_obsolete());
        term.add_attribute("is_obsolete", "true");
        assert!(term.is_obsolete());
    }

    #[test]
    fn test_text_fields_and_label() {
        let mut term = Term::new("PR:1");
        assert_eq!(term.text_fields().count(), 0);
        assert_eq!(term.label(), "PR:1");

        term.name = Some("kinase".to_string());
        term.definition = Some("A protein.".to_string());
        term.synonyms = vec!["K1".to_string(), "K2".to_string()];
        assert_eq!(
            term.text_fields().collect::<Vec<_>>(),
            vec!["kinase", "A protein.", "K1", "K2"]
        );
        assert_eq!(term.label(), "kinase");
    }
}
