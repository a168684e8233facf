//! OBO ontology parser.
//!
//! Turns ontology text into a term set. The text is a header frame followed by
//! stanzas, each opened by a `[Name]` line:
//!
//! ```text
//! format-version: 1.2
//! data-version: pr/releases/2024-01-01
//!
//! [Term]
//! id: PR:000000650
//! name: mitogen-activated protein kinase 1
//! def: "A protein kinase: phosphorylates things." [PMID:123]
//! synonym: "ERK2" EXACT []
//! is_a: PR:000000102 ! serine/threonine-protein kinase
//! relationship: only_in_taxon NCBITaxon:9606 ! Homo sapiens
//!
//! [Typedef]
//! id: only_in_taxon
//! name: only in taxon
//! ```
//!
//! Stanzas are cut out of the text first and then parsed independently, so a
//! malformed stanza can only affect itself. Terms are merged into the set in
//! input order; a repeated id replaces the earlier term (last write wins).

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use poaf_types::{well_known, Relationship, Term};

use crate::parser::parse;
use crate::types::{OboConfig, OntologyStats};

/// Tag/value pairs from the header frame before the first stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyHeader {
    /// Header tags and their values in file order.
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl OntologyHeader {
    /// Returns the first value of a header tag.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.attributes.get(tag)?.first().map(String::as_str)
    }

    /// Returns the OBO format version (`format-version`).
    pub fn format_version(&self) -> Option<&str> {
        self.get(well_known::FORMAT_VERSION)
    }

    /// Returns the ontology release version (`data-version`).
    pub fn data_version(&self) -> Option<&str> {
        self.get(well_known::DATA_VERSION)
    }
}

/// Result of parsing ontology text.
#[derive(Debug, Clone, Default)]
pub struct ParsedOntology {
    /// Header frame.
    pub header: OntologyHeader,
    /// Terms in first-appearance order, ids unique.
    pub terms: Vec<Term>,
    /// Relation type definitions in first-appearance order, ids unique.
    pub typedefs: Vec<Term>,
    /// Parse statistics.
    pub stats: OntologyStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StanzaKind {
    Term,
    Typedef,
    Other,
}

impl StanzaKind {
    fn from_header(name: &str) -> Self {
        match name {
            well_known::TERM_STANZA => Self::Term,
            well_known::TYPEDEF_STANZA => Self::Typedef,
            _ => Self::Other,
        }
    }
}

/// The lines of one stanza, header line excluded.
struct StanzaBlock<'a> {
    kind: StanzaKind,
    lines: Vec<&'a str>,
}

/// What parsing a single stanza produced.
struct StanzaOutcome {
    kind: StanzaKind,
    /// `None` when the stanza has no id.
    term: Option<Term>,
    malformed_lines: usize,
}

/// Parses ontology text into terms and typedefs.
///
/// Never fails: stanzas without an id are skipped and counted, unparsable
/// lines inside a stanza are dropped and counted. Empty text yields an empty
/// result with zero counts.
pub fn parse_ontology(text: &str, config: &OboConfig) -> ParsedOntology {
    let start = Instant::now();
    let (header_lines, blocks) = split_stanzas(text);

    let mut header = OntologyHeader::default();
    for line in header_lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        if let Some((tag, value)) = parse::tag_value(line) {
            header
                .attributes
                .entry(tag.to_string())
                .or_default()
                .push(parse::strip_comment(value).to_string());
        }
    }

    #[cfg(feature = "parallel")]
    let outcomes: Vec<StanzaOutcome> = blocks.par_iter().map(parse_stanza).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<StanzaOutcome> = blocks.iter().map(parse_stanza).collect();

    let mut stats = OntologyStats {
        stanzas_processed: outcomes.len(),
        ..Default::default()
    };
    let mut terms = TermSet::default();
    let mut typedefs = TermSet::default();

    for outcome in outcomes {
        stats.malformed_lines += outcome.malformed_lines;

        let target = match outcome.kind {
            StanzaKind::Term => &mut terms,
            StanzaKind::Typedef => &mut typedefs,
            StanzaKind::Other => {
                stats.ignored_stanzas += 1;
                continue;
            }
        };

        let Some(term) = outcome.term else {
            stats.stanzas_skipped += 1;
            continue;
        };

        if target.insert(term) {
            stats.duplicate_ids += 1;
        }
    }

    // Obsolescence is judged on the merged stanza, after last-write-wins.
    if !config.keep_obsolete {
        stats.obsolete_skipped = terms.retain(|term| !term.is_obsolete());
    }

    stats.terms_loaded = terms.terms.len();
    stats.typedefs_loaded = typedefs.terms.len();
    stats.parse_time_ms = start.elapsed().as_millis() as u64;

    tracing::debug!(
        stanzas = stats.stanzas_processed,
        terms = stats.terms_loaded,
        skipped = stats.stanzas_skipped,
        duplicates = stats.duplicate_ids,
        malformed_lines = stats.malformed_lines,
        "Parsed ontology"
    );

    ParsedOntology {
        header,
        terms: terms.terms,
        typedefs: typedefs.terms,
        stats,
    }
}

/// Ordered term collection with last-write-wins on duplicate ids.
#[derive(Default)]
struct TermSet {
    terms: Vec<Term>,
    positions: HashMap<String, usize>,
}

impl TermSet {
    /// Inserts a term, replacing any earlier term with the same id in place.
    ///
    /// Returns true if an earlier term was replaced.
    fn insert(&mut self, term: Term) -> bool {
        match self.positions.get(&term.id) {
            Some(&pos) => {
                self.terms[pos] = term;
                true
            }
            None => {
                self.positions.insert(term.id.clone(), self.terms.len());
                self.terms.push(term);
                false
            }
        }
    }

    /// Keeps only terms matching the predicate. Returns how many were removed.
    fn retain(&mut self, keep: impl Fn(&Term) -> bool) -> usize {
        let before = self.terms.len();
        self.terms.retain(|term| keep(term));
        self.positions = self
            .terms
            .iter()
            .enumerate()
            .map(|(pos, term)| (term.id.clone(), pos))
            .collect();
        before - self.terms.len()
    }
}

/// Cuts the text into the header frame and stanza blocks.
fn split_stanzas(text: &str) -> (Vec<&str>, Vec<StanzaBlock<'_>>) {
    let mut header = Vec::new();
    let mut blocks: Vec<StanzaBlock<'_>> = Vec::new();

    for line in text.lines() {
        if let Some(name) = parse::stanza_header(line) {
            blocks.push(StanzaBlock {
                kind: StanzaKind::from_header(name),
                lines: Vec::new(),
            });
            continue;
        }
        match blocks.last_mut() {
            Some(block) => block.lines.push(line),
            None => header.push(line),
        }
    }

    (header, blocks)
}

/// Parses one stanza. Touches nothing outside the block.
fn parse_stanza(block: &StanzaBlock<'_>) -> StanzaOutcome {
    let mut outcome = StanzaOutcome {
        kind: block.kind,
        term: None,
        malformed_lines: 0,
    };
    if block.kind == StanzaKind::Other {
        return outcome;
    }

    let mut term = Term::default();

    for line in &block.lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('!') {
            continue;
        }

        let Some((tag, raw_value)) = parse::tag_value(line) else {
            outcome.malformed_lines += 1;
            continue;
        };
        let value = parse::strip_qualifiers(parse::strip_comment(raw_value));

        match tag {
            well_known::ID => {
                if term.id.is_empty() {
                    term.id = value.to_string();
                } else {
                    outcome.malformed_lines += 1;
                }
            }
            well_known::NAME => {
                if term.name.is_none() && !value.is_empty() {
                    term.name = Some(parse::unescape(value));
                }
            }
            well_known::DEF => {
                if term.definition.is_some() {
                    continue;
                }
                match parse::quoted(value) {
                    Some((text, rest)) => {
                        term.definition = Some(text);
                        term.definition_xrefs = parse::xref_list(rest);
                    }
                    None if !value.is_empty() => term.definition = Some(parse::unescape(value)),
                    None => {}
                }
            }
            well_known::SYNONYM => {
                let text = match parse::quoted(value) {
                    Some((text, _)) => text,
                    None => parse::unescape(value),
                };
                if !text.is_empty() {
                    term.synonyms.push(text);
                }
            }
            well_known::IS_A => match value.split_whitespace().next() {
                Some(target) => {
                    term.add_relationship(Relationship::is_a(target));
                }
                None => outcome.malformed_lines += 1,
            },
            well_known::RELATIONSHIP => {
                let mut parts = value.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(kind), Some(target)) => {
                        term.add_relationship(Relationship::new(kind, target));
                    }
                    _ => outcome.malformed_lines += 1,
                }
            }
            _ => term.add_attribute(tag, parse::strip_comment(raw_value)),
        }
    }

    if !term.id.is_empty() {
        outcome.term = Some(term);
    }
    outcome
}
