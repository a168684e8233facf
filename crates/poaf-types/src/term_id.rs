//! Ontology term identifier type.
//!
//! Term identifiers are namespaced accessions such as `PR:000000001` or
//! `GO:0005634`. They are kept as plain strings: relationship targets may name
//! terms from other ontologies that are never loaded.

/// A namespaced ontology term identifier.
///
/// # Examples
///
/// ```
/// use poaf_types::TermId;
///
/// let protein: TermId = "PR:000000001".to_string();
/// let nucleus: TermId = "GO:0005634".to_string();
/// ```
pub type TermId = String;

/// Returns the namespace prefix of an identifier (`PR` for `PR:000000001`).
///
/// Returns `None` when the identifier has no `:` separator.
///
/// ```
/// assert_eq!(poaf_types::namespace("PR:000000001"), Some("PR"));
/// assert_eq!(poaf_types::namespace("part_of"), None);
/// ```
pub fn namespace(id: &str) -> Option<&str> {
    id.split_once(':').map(|(prefix, _)| prefix)
}
