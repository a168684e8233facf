//! PAF (PRO Association File) annotation parser.
//!
//! One row per line, cells separated by a fixed delimiter (tab by default):
//!
//! ```text
//! PRO_ID	Object_term	Object_syny	Modifier	Relation	Ontology_ID	Ontology_term	...
//! PR:000000650	mitogen-activated protein kinase 1	ERK2		located_in	GO:0005634	nucleus	...
//! ```
//!
//! Short rows are kept with their missing cells empty. Only rows that cannot
//! be attributed to a protein are dropped.

use std::time::Instant;

use csv::{ReaderBuilder, StringRecord};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use poaf_types::{well_known, Annotation};

use crate::types::{AnnotationStats, HeaderDetection, PafConfig};

/// Column positions of the structured annotation fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    names: Vec<String>,
    protein_id: usize,
    object_term: Option<usize>,
    object_synonyms: Option<usize>,
    relation: Option<usize>,
    ontology_id: Option<usize>,
    ontology_term: Option<usize>,
    evidence_source: Option<usize>,
    evidence_code: Option<usize>,
    taxon: Option<usize>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColumnLayout {
    /// The standard 17-column PAF layout.
    pub fn standard() -> Self {
        Self::from_names(well_known::PAF_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    /// Builds a layout from header column names (matched case-insensitively).
    ///
    /// If no column is named `PRO_ID`, the first column holds the protein id.
    pub fn from_names(names: Vec<String>) -> Self {
        let pos = |wanted: &str| names.iter().position(|n| n.eq_ignore_ascii_case(wanted));
        Self {
            protein_id: pos(well_known::PAF_PRO_ID).unwrap_or(0),
            object_term: pos(well_known::PAF_OBJECT_TERM),
            object_synonyms: pos(well_known::PAF_OBJECT_SYNY),
            relation: pos(well_known::PAF_RELATION),
            ontology_id: pos(well_known::PAF_ONTOLOGY_ID),
            ontology_term: pos(well_known::PAF_ONTOLOGY_TERM),
            evidence_source: pos(well_known::PAF_EVIDENCE_SOURCE),
            evidence_code: pos(well_known::PAF_EVIDENCE_CODE),
            taxon: pos(well_known::PAF_TAXON),
            names,
        }
    }

    /// Column names, in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns a complete row has.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Builds an annotation from a row's cells.
    fn annotation(&self, line_number: usize, cells: Vec<String>) -> Annotation {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| cells.get(i))
                .cloned()
                .unwrap_or_default()
        };
        Annotation {
            line_number,
            protein_id: cell(Some(self.protein_id)),
            object_term: cell(self.object_term),
            object_synonyms: cell(self.object_synonyms),
            relation: cell(self.relation),
            ontology_id: cell(self.ontology_id),
            ontology_term: cell(self.ontology_term),
            evidence_source: cell(self.evidence_source),
            evidence_code: cell(self.evidence_code),
            taxon: cell(self.taxon),
            degraded: cells.len() < self.width(),
            fields: cells,
        }
    }
}

/// Result of parsing annotation text.
#[derive(Debug, Clone, Default)]
pub struct ParsedAnnotations {
    /// Header cells, if a header row was detected.
    pub header: Option<Vec<String>>,
    /// Column layout the rows were read with.
    pub layout: ColumnLayout,
    /// Accepted rows in input order.
    pub annotations: Vec<Annotation>,
    /// Parse statistics.
    pub stats: AnnotationStats,
}

/// Parses annotation text into rows.
///
/// Never fails: blank and comment lines are skipped and counted, rows with no
/// usable protein id are dropped and counted, short rows are kept and flagged
/// as degraded. Empty text yields an empty result with zero counts.
pub fn parse_annotations(text: &str, config: &PafConfig) -> ParsedAnnotations {
    let start = Instant::now();
    let mut stats = AnnotationStats::default();

    // Header detection stays ours; quotes are literal in PAF cells.
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut lines = LineCursor::new(text);
    let mut records_seen = 0;
    let mut rows: Vec<(usize, StringRecord)> = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                // Input is already valid UTF-8 and unquoted, so this is rare.
                tracing::debug!(error = %e, "Unreadable annotation record");
                records_seen += 1;
                stats.rows_read += 1;
                stats.rows_skipped += 1;
                continue;
            }
        }
        records_seen += 1;

        if record.iter().all(str::is_empty) {
            stats.blank_lines += 1;
        } else if is_comment(&record, config) {
            stats.comment_lines += 1;
        } else {
            let line_number = record
                .position()
                .map_or(0, |pos| lines.line_at(pos.byte() as usize));
            rows.push((line_number, record.clone()));
        }
    }
    // Empty lines never reach us as records.
    stats.blank_lines += text.lines().count().saturating_sub(records_seen);

    let mut header = None;
    let mut layout = ColumnLayout::standard();
    if let Some((_, first)) = rows.first() {
        let cells = cells_of(first);
        if is_header(&cells, config) {
            layout = ColumnLayout::from_names(cells.clone());
            header = Some(cells);
            stats.header_detected = true;
            rows.remove(0);
        }
    }

    stats.rows_read += rows.len();

    #[cfg(feature = "parallel")]
    let parsed: Vec<Option<Annotation>> = rows
        .par_iter()
        .map(|(line_number, record)| parse_row(*line_number, record, &layout))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let parsed: Vec<Option<Annotation>> = rows
        .iter()
        .map(|(line_number, record)| parse_row(*line_number, record, &layout))
        .collect();

    let mut annotations = Vec::with_capacity(parsed.len());
    for row in parsed {
        match row {
            Some(annotation) => {
                if annotation.degraded {
                    stats.rows_degraded += 1;
                }
                annotations.push(annotation);
            }
            None => stats.rows_skipped += 1,
        }
    }

    stats.rows_accepted = annotations.len();
    stats.parse_time_ms = start.elapsed().as_millis() as u64;

    tracing::debug!(
        rows = stats.rows_read,
        accepted = stats.rows_accepted,
        degraded = stats.rows_degraded,
        skipped = stats.rows_skipped,
        header = stats.header_detected,
        "Parsed annotations"
    );

    ParsedAnnotations {
        header,
        layout,
        annotations,
        stats,
    }
}

/// Maps record byte offsets to 1-based line numbers.
///
/// Offsets must be requested in increasing order.
struct LineCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        // A record's position can sit on the terminators of skipped empty
        // lines; the record itself starts after them.
        let mut end = offset.min(self.bytes.len());
        while end < self.bytes.len() && matches!(self.bytes[end], b'\r' | b'\n') {
            end += 1;
        }
        if end > self.offset {
            self.line += self.bytes[self.offset..end]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = end;
        }
        self.line
    }
}

/// A record is a comment when its first (trimmed) cell starts with the prefix.
fn is_comment(record: &StringRecord, config: &PafConfig) -> bool {
    match (config.comment_prefix, record.get(0)) {
        (Some(prefix), Some(first)) => first.as_bytes().first() == Some(&prefix),
        _ => false,
    }
}

/// Decides whether the first data line is a header row.
///
/// Under [`HeaderDetection::Auto`] only a known header token in the first
/// cell makes a header; an unrecognized line is read as data.
fn is_header(cells: &[String], config: &PafConfig) -> bool {
    match config.header {
        HeaderDetection::Always => true,
        HeaderDetection::Never => false,
        HeaderDetection::Auto => cells.first().is_some_and(|first| {
            config
                .header_tokens
                .iter()
                .any(|token| first.eq_ignore_ascii_case(token))
        }),
    }
}

fn cells_of(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

/// Parses a single data row. Returns `None` if the row has no usable
/// protein id (empty, or containing whitespace).
fn parse_row(
    line_number: usize,
    record: &StringRecord,
    layout: &ColumnLayout,
) -> Option<Annotation> {
    let mut cells = cells_of(record);

    // Trailing empty cells carry no data; a row padded with delimiters is
    // complete as far as its content goes.
    while cells.len() > layout.width() && cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }

    let protein_id = cells.get(layout.protein_id)?;
    if protein_id.is_empty() || protein_id.contains(char::is_whitespace) {
        return None;
    }

    Some(layout.annotation(line_number, cells))
}
