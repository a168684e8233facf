//! Well-known tag names, relation kinds and PAF column names.
//!
//! ```
//! use poaf_types::well_known;
//!
//! assert_eq!(well_known::IS_A, "is_a");
//! assert_eq!(well_known::PAF_COLUMNS[0], well_known::PAF_PRO_ID);
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// OBO STANZA HEADERS
// ═══════════════════════════════════════════════════════════════════════════

/// Stanza header for ontology terms.
pub const TERM_STANZA: &str = "Term";

/// Stanza header for relation type definitions.
pub const TYPEDEF_STANZA: &str = "Typedef";

// ═══════════════════════════════════════════════════════════════════════════
// OBO TAGS
// ═══════════════════════════════════════════════════════════════════════════

/// Term identifier tag.
pub const ID: &str = "id";

/// Term label tag.
pub const NAME: &str = "name";

/// Quoted definition tag.
pub const DEF: &str = "def";

/// Quoted synonym tag.
pub const SYNONYM: &str = "synonym";

/// Subtype edge tag, also the relation kind of subtype edges.
pub const IS_A: &str = "is_a";

/// Typed edge tag (`relationship: part_of GO:0005634`).
pub const RELATIONSHIP: &str = "relationship";

/// Obsolescence flag tag.
pub const IS_OBSOLETE: &str = "is_obsolete";

/// Header tag carrying the OBO format version.
pub const FORMAT_VERSION: &str = "format-version";

/// Header tag carrying the release version of the ontology.
pub const DATA_VERSION: &str = "data-version";

// ═══════════════════════════════════════════════════════════════════════════
// PAF COLUMNS
// ═══════════════════════════════════════════════════════════════════════════

/// Protein identifier column.
pub const PAF_PRO_ID: &str = "PRO_ID";
/// Protein name column.
pub const PAF_OBJECT_TERM: &str = "Object_term";
/// Protein synonyms column.
pub const PAF_OBJECT_SYNY: &str = "Object_syny";
/// Relation column.
pub const PAF_RELATION: &str = "Relation";
/// Ontology term id column.
pub const PAF_ONTOLOGY_ID: &str = "Ontology_ID";
/// Ontology term label column.
pub const PAF_ONTOLOGY_TERM: &str = "Ontology_term";
/// Evidence source column.
pub const PAF_EVIDENCE_SOURCE: &str = "Evidence_source";
/// Evidence code column.
pub const PAF_EVIDENCE_CODE: &str = "Evidence_code";
/// Taxon column.
pub const PAF_TAXON: &str = "Taxon";

/// Standard PAF column layout, used when a file carries no header row.
pub const PAF_COLUMNS: &[&str] = &[
    PAF_PRO_ID,
    PAF_OBJECT_TERM,
    PAF_OBJECT_SYNY,
    "Modifier",
    PAF_RELATION,
    PAF_ONTOLOGY_ID,
    PAF_ONTOLOGY_TERM,
    "Relation_Modifier",
    "Interaction_Objects",
    PAF_EVIDENCE_SOURCE,
    PAF_EVIDENCE_CODE,
    PAF_TAXON,
    "Inferred_from",
    "DB_ID",
    "Date",
    "Assigned_by",
    "comment",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paf_layout_positions() {
        assert_eq!(PAF_COLUMNS.len(), 17);
        let pos = |name: &str| PAF_COLUMNS.iter().position(|c| *c == name);
        assert_eq!(pos(PAF_PRO_ID), Some(0));
        assert_eq!(pos(PAF_OBJECT_TERM), Some(1));
        assert_eq!(pos(PAF_ONTOLOGY_ID), Some(5));
        assert_eq!(pos(PAF_ONTOLOGY_TERM), Some(6));
        assert_eq!(pos(PAF_EVIDENCE_CODE), Some(10));
    }
}
