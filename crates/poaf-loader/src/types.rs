//! Loader-specific types: errors, configuration and parse statistics.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading ontology and annotation data.
///
/// Line-level and stanza-level malformation is never an error: it is counted
/// in [`OntologyStats`] and [`AnnotationStats`]. Only input that cannot be
/// read as text at all fails a load.
#[derive(Error, Debug)]
pub enum PoafError {
    /// I/O error reading a data file.
    #[error("IO error reading data file: {0}")]
    Io(#[from] std::io::Error),

    /// The supplied bytes are not decodable as text.
    #[error("{source_name} input is unreadable: {reason}")]
    InputUnreadable {
        /// Which input failed (`ontology` or `annotations`).
        source_name: String,
        /// Why the bytes were rejected.
        reason: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required file missing from a data directory.
    #[error("Required data file not found: {file_type} in {directory}")]
    RequiredFileMissing {
        /// The type of file that was missing.
        file_type: String,
        /// The directory that was searched.
        directory: String,
    },
}

/// Result type for loader operations.
pub type PoafResult<T> = Result<T, PoafError>;

/// Configuration for ontology (OBO) parsing.
#[derive(Debug, Clone)]
pub struct OboConfig {
    /// Whether terms flagged `is_obsolete: true` enter the term set.
    pub keep_obsolete: bool,
}

impl Default for OboConfig {
    fn default() -> Self {
        Self {
            keep_obsolete: true,
        }
    }
}

impl OboConfig {
    /// Creates a config that drops obsolete terms.
    pub fn current_terms_only() -> Self {
        Self {
            keep_obsolete: false,
        }
    }
}

/// How the first data line of an annotation file is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderDetection {
    /// Header only if the first cell is a known header token; data otherwise.
    #[default]
    Auto,
    /// The first data line is always a header.
    Always,
    /// The first data line is always data.
    Never,
}

/// Configuration for annotation (PAF) parsing.
#[derive(Debug, Clone)]
pub struct PafConfig {
    /// Cell delimiter byte.
    pub delimiter: u8,
    /// Lines whose first cell starts with this byte are comments (`None` disables).
    pub comment_prefix: Option<u8>,
    /// Header row classification.
    pub header: HeaderDetection,
    /// First-cell values that mark a header row under [`HeaderDetection::Auto`].
    pub header_tokens: Vec<String>,
}

impl Default for PafConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            comment_prefix: Some(b'#'),
            header: HeaderDetection::Auto,
            header_tokens: vec![poaf_types::well_known::PAF_PRO_ID.to_string()],
        }
    }
}

impl PafConfig {
    /// Creates a config for files known to carry a header row.
    pub fn with_header() -> Self {
        Self {
            header: HeaderDetection::Always,
            ..Default::default()
        }
    }

    /// Creates a config for files known to have no header row.
    pub fn headerless() -> Self {
        Self {
            header: HeaderDetection::Never,
            ..Default::default()
        }
    }
}

/// Configuration for a complete load.
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    /// Ontology parsing options.
    pub obo: OboConfig,
    /// Annotation parsing options.
    pub paf: PafConfig,
}

/// Statistics from parsing ontology text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyStats {
    /// Stanzas of any kind seen in the text.
    pub stanzas_processed: usize,
    /// Unique terms in the resulting term set.
    pub terms_loaded: usize,
    /// Unique relation type definitions loaded.
    pub typedefs_loaded: usize,
    /// Term or Typedef stanzas dropped for lacking an id.
    pub stanzas_skipped: usize,
    /// Stanzas of other kinds (`[Instance]`, unknown headers).
    pub ignored_stanzas: usize,
    /// Obsolete terms dropped by [`OboConfig::keep_obsolete`].
    pub obsolete_skipped: usize,
    /// Stanzas whose id repeated an earlier stanza (later one kept).
    pub duplicate_ids: usize,
    /// Lines dropped inside otherwise valid stanzas.
    pub malformed_lines: usize,
    /// Time taken to parse in milliseconds.
    pub parse_time_ms: u64,
}

/// Statistics from parsing annotation text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStats {
    /// Data rows examined (header, blank and comment lines excluded).
    pub rows_read: usize,
    /// Rows kept, including degraded rows.
    pub rows_accepted: usize,
    /// Kept rows with fewer cells than the column layout.
    pub rows_degraded: usize,
    /// Rows dropped as unparsable.
    pub rows_skipped: usize,
    /// Empty or whitespace-only lines.
    pub blank_lines: usize,
    /// Comment lines.
    pub comment_lines: usize,
    /// Whether the first data line was consumed as a header.
    pub header_detected: bool,
    /// Time taken to parse in milliseconds.
    pub parse_time_ms: u64,
}

impl AnnotationStats {
    /// Returns the percentage of rows read that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            (self.rows_accepted as f64 / self.rows_read as f64) * 100.0
        }
    }
}

/// Aggregate report of a complete load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Ontology parse statistics.
    pub ontology: OntologyStats,
    /// Annotation parse statistics.
    pub annotations: AnnotationStats,
    /// Edges whose target id is not in the term set.
    pub dangling_edges: usize,
    /// Time taken to build the indices in milliseconds.
    pub build_time_ms: u64,
}

/// Data files discovered in a data directory.
#[derive(Debug, Clone, Default)]
pub struct DataFiles {
    /// Path to the ontology (`.obo`) file.
    pub ontology_file: Option<PathBuf>,
    /// Path to the annotation (`.paf` / `PAF.txt`) file.
    pub annotation_file: Option<PathBuf>,
}

impl DataFiles {
    /// Creates a new empty DataFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both the ontology and annotation files are present.
    pub fn has_required_files(&self) -> bool {
        self.ontology_file.is_some() && self.annotation_file.is_some()
    }

    /// Returns a list of missing required files.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ontology_file.is_none() {
            missing.push("Ontology");
        }
        if self.annotation_file.is_none() {
            missing.push("Annotation");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paf_config_default() {
        let config = PafConfig::default();
        assert_eq!(config.delimiter, b'\t');
        assert_eq!(config.comment_prefix, Some(b'#'));
        assert_eq!(config.header, HeaderDetection::Auto);
        assert_eq!(config.header_tokens, vec!["PRO_ID"]);
    }

    #[test]
    fn test_paf_config_presets() {
        assert_eq!(PafConfig::with_header().header, HeaderDetection::Always);
        assert_eq!(PafConfig::headerless().header, HeaderDetection::Never);
        assert!(OboConfig::default().keep_obsolete);
        assert!(!OboConfig::current_terms_only().keep_obsolete);
    }

    #[test]
    fn test_acceptance_rate() {
        let stats = AnnotationStats {
            rows_read: 200,
            rows_accepted: 150,
            ..Default::default()
        };
        assert!((stats.acceptance_rate() - 75.0).abs() < 0.01);
        assert_eq!(AnnotationStats::default().acceptance_rate(), 0.0);
    }

    #[test]
    fn test_data_files_missing() {
        let files = DataFiles {
            ontology_file: Some(PathBuf::from("pr.obo")),
            annotation_file: None,
        };

        assert!(!files.has_required_files());
        assert_eq!(files.missing_files(), vec!["Annotation"]);
    }
}
