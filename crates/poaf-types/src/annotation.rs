//! Protein annotation type.
//!
//! This module provides the `Annotation` struct representing one row of a
//! PRO Association File (PAF).

/// One row of protein evidence from a PAF file.
///
/// `fields` holds every cell of the row as read (trimmed). The named fields
/// are the structured subset, resolved through the file's column layout.
/// Cells missing from a short row read as empty strings.
///
/// # Examples
///
/// ```
/// use poaf_types::Annotation;
///
/// let annotation = Annotation {
///     line_number: 2,
///     protein_id: "PR:000000650".to_string(),
///     object_term: "mitogen-activated protein kinase 1".to_string(),
///     ontology_id: "GO:0005634".to_string(),
///     ontology_term: "nucleus".to_string(),
///     relation: "located_in".to_string(),
///     ..Default::default()
/// };
///
/// assert_eq!(
///     annotation.descriptive_text().collect::<Vec<_>>(),
///     vec!["mitogen-activated protein kinase 1", "nucleus"]
/// );
/// assert!(!annotation.degraded);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Annotation {
    /// 1-based line number in the source text.
    pub line_number: usize,
    /// Annotated protein (`PRO_ID`). Not unique across rows.
    pub protein_id: String,
    /// Protein name (`Object_term`).
    pub object_term: String,
    /// Protein synonyms (`Object_syny`).
    pub object_synonyms: String,
    /// Relation to the ontology term (`Relation`).
    pub relation: String,
    /// Annotating ontology term id (`Ontology_ID`).
    pub ontology_id: String,
    /// Annotating ontology term label (`Ontology_term`).
    pub ontology_term: String,
    /// Evidence source (`Evidence_source`).
    pub evidence_source: String,
    /// Evidence code (`Evidence_code`).
    pub evidence_code: String,
    /// Taxon (`Taxon`).
    pub taxon: String,
    /// Every cell of the row, in column order.
    pub fields: Vec<String>,
    /// True when the row had fewer cells than the column layout.
    pub degraded: bool,
}

impl Annotation {
    /// Returns the non-empty descriptive text fields covered by keyword
    /// search: the protein name, its synonyms and the ontology term label.
    pub fn descriptive_text(&self) -> impl Iterator<Item = &str> {
        [
            self.object_term.as_str(),
            self.object_synonyms.as_str(),
            self.ontology_term.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
    }

    /// Returns the cell at a column position, or `""` for a missing cell.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Returns the evidence marker: the evidence code when present,
    /// otherwise the evidence source.
    pub fn evidence(&self) -> &str {
        if self.evidence_code.is_empty() {
            &self.evidence_source
        } else {
            &self.evidence_code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access_on_short_row() {
        let annotation = Annotation {
            protein_id: "PR:1".to_string(),
            fields: vec!["PR:1".to_string()],
            degraded: true,
            ..Default::default()
        };
        assert_eq!(annotation.field(0), "PR:1");
        assert_eq!(annotation.field(5), "");
        assert_eq!(annotation.descriptive_text().count(), 0);
    }

    #[test]
    fn test_evidence_marker() {
        let mut annotation = Annotation {
            evidence_source: "PMID:123".to_string(),
            ..Default::default()
        };
        assert_eq!(annotation.evidence(), "PMID:123");
        annotation.evidence_code = "ECO:0000269".to_string();
        assert_eq!(annotation.evidence(), "ECO:0000269");
    }
}
