//! In-memory protein ontology and annotation index.
//!
//! Provides exact and substring lookup over parsed terms and annotations.
//! The index is built once by [`IndexBuilder`] and is immutable afterwards:
//! every query takes `&self` and nothing is cached lazily, so one index can be
//! shared across threads behind an `Arc` and replaced wholesale on reload.
//!
//! ```ignore
//! let ontology = parse_ontology(obo_text, &OboConfig::default());
//! let annotations = parse_annotations(paf_text, &PafConfig::default());
//! let index = ProteinIndex::build(ontology, annotations);
//!
//! let kinases = index.find_terms_by_keyword("kinase");
//! let erk2 = index.get_term_by_id("PR:000000650");
//! let rows = index.get_annotations_for_protein("PR:000000650");
//! ```

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use poaf_types::{Annotation, Relationship, Term, TermId};

use crate::annotation::ParsedAnnotations;
use crate::ontology::{OntologyHeader, ParsedOntology};

/// Joins the normalized text fields of one record. Queries containing it
/// never match, so a match cannot span two fields.
const FIELD_SEPARATOR: char = '\u{1f}';

/// A relationship edge together with its target, if the target is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRelationship<'a> {
    /// The edge as recorded on the source term.
    pub relationship: &'a Relationship,
    /// The target term, or `None` for a dangling edge.
    pub target: Option<&'a Term>,
}

impl ResolvedRelationship<'_> {
    /// Returns true if the target id is not in the term set.
    pub fn is_dangling(&self) -> bool {
        self.target.is_none()
    }
}

/// Collects terms and annotations for an index build.
///
/// Inserting a term whose id is already present replaces the earlier term
/// in place (last write wins).
#[derive(Debug, Default)]
pub struct IndexBuilder {
    header: OntologyHeader,
    terms: Vec<Term>,
    term_positions: HashMap<TermId, usize>,
    typedefs: HashMap<String, Term>,
    annotation_columns: Vec<String>,
    annotations: Vec<Annotation>,
}

impl IndexBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ontology header frame.
    pub fn header(mut self, header: OntologyHeader) -> Self {
        self.header = header;
        self
    }

    /// Sets the annotation column names, in column order.
    pub fn annotation_columns(mut self, columns: Vec<String>) -> Self {
        self.annotation_columns = columns;
        self
    }

    /// Inserts terms; a repeated id replaces the earlier term.
    pub fn insert_terms(&mut self, terms: impl IntoIterator<Item = Term>) {
        for term in terms {
            match self.term_positions.get(&term.id) {
                Some(&pos) => self.terms[pos] = term,
                None => {
                    self.term_positions.insert(term.id.clone(), self.terms.len());
                    self.terms.push(term);
                }
            }
        }
    }

    /// Inserts relation type definitions, keyed by id.
    pub fn insert_typedefs(&mut self, typedefs: impl IntoIterator<Item = Term>) {
        for typedef in typedefs {
            self.typedefs.insert(typedef.id.clone(), typedef);
        }
    }

    /// Appends annotations, keeping their order.
    pub fn insert_annotations(&mut self, annotations: impl IntoIterator<Item = Annotation>) {
        self.annotations.extend(annotations);
    }

    /// Builds the index in a single pass over terms and annotations.
    pub fn build(self) -> ProteinIndex {
        let IndexBuilder {
            header,
            terms,
            term_positions,
            typedefs,
            annotation_columns,
            annotations,
        } = self;

        #[cfg(feature = "parallel")]
        let term_search_text: Vec<String> = terms.par_iter().map(term_haystack).collect();
        #[cfg(not(feature = "parallel"))]
        let term_search_text: Vec<String> = terms.iter().map(term_haystack).collect();

        #[cfg(feature = "parallel")]
        let annotation_search_text: Vec<String> =
            annotations.par_iter().map(annotation_haystack).collect();
        #[cfg(not(feature = "parallel"))]
        let annotation_search_text: Vec<String> =
            annotations.iter().map(annotation_haystack).collect();

        let mut children_by_parent: HashMap<TermId, Vec<usize>> = HashMap::new();
        let mut dangling_edges = 0;
        for (pos, term) in terms.iter().enumerate() {
            for rel in &term.relationships {
                if !term_positions.contains_key(&rel.target) {
                    dangling_edges += 1;
                }
                if rel.is_is_a() {
                    children_by_parent
                        .entry(rel.target.clone())
                        .or_default()
                        .push(pos);
                }
            }
        }

        let mut annotations_by_protein: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, annotation) in annotations.iter().enumerate() {
            annotations_by_protein
                .entry(annotation.protein_id.clone())
                .or_default()
                .push(pos);
        }

        ProteinIndex {
            header,
            terms,
            term_positions,
            term_search_text,
            children_by_parent,
            typedefs,
            dangling_edges,
            annotation_columns,
            annotations,
            annotations_by_protein,
            annotation_search_text,
        }
    }
}

/// Read-only index over one load of ontology terms and annotations.
///
/// # Example
///
/// ```ignore
/// use poaf_loader::{load_from_bytes, LoadConfig};
///
/// let (index, report) = load_from_bytes(obo_bytes, paf_bytes, &LoadConfig::default())?;
///
/// match index.get_term_by_id("PR:000000650") {
///     Some(term) => println!("{}", term.label()),
///     None => println!("no such id"),
/// }
/// ```
pub struct ProteinIndex {
    /// Ontology header frame.
    header: OntologyHeader,
    /// Terms in first-appearance order.
    terms: Vec<Term>,
    /// Term id -> position in `terms`.
    term_positions: HashMap<TermId, usize>,
    /// Lower-cased name, definition and synonyms per term.
    term_search_text: Vec<String>,
    /// Parent id -> positions of terms with an `is_a` edge to it.
    children_by_parent: HashMap<TermId, Vec<usize>>,
    /// Relation type definitions by id.
    typedefs: HashMap<String, Term>,
    /// Edges whose target is not loaded.
    dangling_edges: usize,
    /// Annotation column names the rows were read with.
    annotation_columns: Vec<String>,
    /// Annotations in input order.
    annotations: Vec<Annotation>,
    /// Protein id -> positions in `annotations`, ascending.
    annotations_by_protein: HashMap<String, Vec<usize>>,
    /// Lower-cased descriptive text per annotation.
    annotation_search_text: Vec<String>,
}

impl std::fmt::Debug for ProteinIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProteinIndex")
            .field("terms", &self.terms.len())
            .field("typedefs", &self.typedefs.len())
            .field("children_by_parent", &self.children_by_parent.len())
            .field("dangling_edges", &self.dangling_edges)
            .field("annotations", &self.annotations.len())
            .field("annotations_by_protein", &self.annotations_by_protein.len())
            .finish()
    }
}

impl ProteinIndex {
    /// Builds an index from parser output.
    pub fn build(ontology: ParsedOntology, annotations: ParsedAnnotations) -> Self {
        let mut builder = IndexBuilder::new()
            .header(ontology.header)
            .annotation_columns(annotations.layout.names().to_vec());
        builder.insert_terms(ontology.terms);
        builder.insert_typedefs(ontology.typedefs);
        builder.insert_annotations(annotations.annotations);
        builder.build()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERY ENGINE
    // ═══════════════════════════════════════════════════════════════════════

    /// Finds terms whose name, definition or any synonym contains `query`,
    /// ignoring case. Results follow term order; an empty query matches every
    /// term with at least one non-empty text field.
    pub fn find_terms_by_keyword(&self, query: &str) -> Vec<&Term> {
        let Some(needle) = normalize_query(query) else {
            return Vec::new();
        };
        self.terms
            .iter()
            .zip(&self.term_search_text)
            .filter(|(_, haystack)| contains_query(haystack, &needle))
            .map(|(term, _)| term)
            .collect()
    }

    /// Gets a term by its exact id. `None` means no such id.
    pub fn get_term_by_id(&self, id: &str) -> Option<&Term> {
        self.term_positions.get(id).map(|&pos| &self.terms[pos])
    }

    /// Finds annotations whose descriptive text contains `query`, ignoring
    /// case. Results follow input order; an empty query matches every
    /// annotation with some descriptive text.
    pub fn find_annotations_by_keyword(&self, query: &str) -> Vec<&Annotation> {
        let Some(needle) = normalize_query(query) else {
            return Vec::new();
        };
        self.annotations
            .iter()
            .zip(&self.annotation_search_text)
            .filter(|(_, haystack)| contains_query(haystack, &needle))
            .map(|(annotation, _)| annotation)
            .collect()
    }

    /// Gets the annotations of a protein in input order.
    ///
    /// Empty both for unknown proteins and for proteins without rows; use
    /// [`ProteinIndex::has_protein`] to tell them apart.
    pub fn get_annotations_for_protein(&self, protein_id: &str) -> Vec<&Annotation> {
        self.annotations_by_protein
            .get(protein_id)
            .map(|positions| positions.iter().map(|&pos| &self.annotations[pos]).collect())
            .unwrap_or_default()
    }

    /// Returns true if any annotation row names this protein.
    pub fn has_protein(&self, protein_id: &str) -> bool {
        self.annotations_by_protein.contains_key(protein_id)
    }

    // Graph navigation

    /// Resolves a term's edges against the term set.
    ///
    /// Returns `None` if the term itself is unknown.
    pub fn resolve_relationships(&self, id: &str) -> Option<Vec<ResolvedRelationship<'_>>> {
        let term = self.get_term_by_id(id)?;
        Some(
            term.relationships
                .iter()
                .map(|relationship| ResolvedRelationship {
                    relationship,
                    target: self.get_term_by_id(&relationship.target),
                })
                .collect(),
        )
    }

    /// Gets the `is_a` parent ids of a term, loaded or not.
    pub fn get_parents(&self, id: &str) -> Vec<&str> {
        self.get_term_by_id(id)
            .map(|term| term.parents().collect())
            .unwrap_or_default()
    }

    /// Gets the ids of terms with an `is_a` edge to `id`.
    ///
    /// Works for ids that are not loaded themselves.
    pub fn get_children(&self, id: &str) -> Vec<&str> {
        self.children_by_parent
            .get(id)
            .map(|positions| {
                positions
                    .iter()
                    .map(|&pos| self.terms[pos].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets a relation type definition by id (`part_of`, `only_in_taxon`).
    pub fn get_typedef(&self, kind: &str) -> Option<&Term> {
        self.typedefs.get(kind)
    }

    /// Returns a display label for a relation kind: its typedef name, or the
    /// kind itself.
    pub fn relation_label<'a>(&'a self, kind: &'a str) -> &'a str {
        self.get_typedef(kind)
            .and_then(|t| t.name.as_deref())
            .unwrap_or(kind)
    }

    // Accessors

    /// Returns the ontology header frame.
    pub fn header(&self) -> &OntologyHeader {
        &self.header
    }

    /// Returns the annotation column names: the header row when the file
    /// had one, the standard layout otherwise.
    pub fn annotation_columns(&self) -> &[String] {
        &self.annotation_columns
    }

    /// Returns all terms in first-appearance order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// Returns all annotations in input order.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Returns the number of terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Returns the number of relation type definitions.
    pub fn typedef_count(&self) -> usize {
        self.typedefs.len()
    }

    /// Returns the number of annotation rows.
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    /// Returns the number of distinct annotated proteins.
    pub fn protein_count(&self) -> usize {
        self.annotations_by_protein.len()
    }

    /// Returns the number of edges whose target is not loaded.
    pub fn dangling_edge_count(&self) -> usize {
        self.dangling_edges
    }
}

/// `None` when the query can never match.
fn normalize_query(query: &str) -> Option<String> {
    if query.contains(FIELD_SEPARATOR) {
        return None;
    }
    Some(query.to_lowercase())
}

/// Empty haystacks (no text at all) match nothing, not even the empty query.
fn contains_query(haystack: &str, needle: &str) -> bool {
    !haystack.is_empty() && haystack.contains(needle)
}

/// Joins the non-empty fields, lower-cased, with [`FIELD_SEPARATOR`].
fn haystack<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for field in fields.filter(|f| !f.is_empty()) {
        if !out.is_empty() {
            out.push(FIELD_SEPARATOR);
        }
        out.push_str(&field.to_lowercase());
    }
    out
}

fn term_haystack(term: &Term) -> String {
    haystack(term.text_fields())
}

fn annotation_haystack(annotation: &Annotation) -> String {
    haystack(annotation.descriptive_text())
}
