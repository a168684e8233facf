//! Load entry points and data file discovery.
//!
//! A load is always a full rebuild: both inputs are decoded, parsed and
//! indexed from scratch, and the caller gets a fresh [`ProteinIndex`].

use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::annotation::parse_annotations;
use crate::ontology::parse_ontology;
use crate::parser::decode_text;
use crate::store::ProteinIndex;
use crate::types::{DataFiles, LoadConfig, LoadReport, PoafError, PoafResult};

/// Builds an index from raw ontology and annotation bytes.
///
/// # Errors
/// Returns [`PoafError::InputUnreadable`] if either input is not text. Malformed
/// stanzas and rows never fail the load; they are counted in the report.
pub fn load_from_bytes(
    ontology: &[u8],
    annotations: &[u8],
    config: &LoadConfig,
) -> PoafResult<(ProteinIndex, LoadReport)> {
    let ontology_text = decode_text(ontology, "ontology")?;
    let annotation_text = decode_text(annotations, "annotations")?;

    let ontology = parse_ontology(ontology_text, &config.obo);
    let annotations = parse_annotations(annotation_text, &config.paf);

    let mut report = LoadReport {
        ontology: ontology.stats.clone(),
        annotations: annotations.stats.clone(),
        ..Default::default()
    };

    let start = Instant::now();
    let index = ProteinIndex::build(ontology, annotations);
    report.build_time_ms = start.elapsed().as_millis() as u64;
    report.dangling_edges = index.dangling_edge_count();

    tracing::info!(
        terms = report.ontology.terms_loaded,
        stanzas_skipped = report.ontology.stanzas_skipped,
        annotations = report.annotations.rows_accepted,
        rows_degraded = report.annotations.rows_degraded,
        rows_skipped = report.annotations.rows_skipped,
        dangling_edges = report.dangling_edges,
        "Built protein index"
    );

    Ok((index, report))
}

/// Builds an index from an ontology file and an annotation file.
///
/// # Errors
/// Returns an error if either file is missing or unreadable.
pub fn load_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    ontology_path: P,
    annotation_path: Q,
    config: &LoadConfig,
) -> PoafResult<(ProteinIndex, LoadReport)> {
    let ontology = read_file(ontology_path.as_ref())?;
    let annotations = read_file(annotation_path.as_ref())?;
    load_from_bytes(&ontology, &annotations, config)
}

/// Builds an index from the files discovered in a data directory.
pub fn load_from_directory<P: AsRef<Path>>(
    path: P,
    config: &LoadConfig,
) -> PoafResult<(ProteinIndex, LoadReport)> {
    let path = path.as_ref();
    let files = discover_data_files(path)?;
    let missing = files.missing_files();
    let (Some(ontology), Some(annotations)) = (files.ontology_file, files.annotation_file) else {
        return Err(PoafError::RequiredFileMissing {
            file_type: missing.join(", "),
            directory: path.display().to_string(),
        });
    };
    load_from_paths(ontology, annotations, config)
}

fn read_file(path: &Path) -> PoafResult<Vec<u8>> {
    if !path.exists() {
        return Err(PoafError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    tracing::debug!(path = %path.display(), "Reading data file");
    Ok(fs::read(path)?)
}

/// Discovers the ontology and annotation files in a data directory.
///
/// The ontology file is the first `*.obo` file; the annotation file is the
/// first `*.paf` file, or `PAF.txt` as distributed by the PRO consortium.
pub fn discover_data_files<P: AsRef<Path>>(path: P) -> PoafResult<DataFiles> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(PoafError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let mut entries: Vec<_> = fs::read_dir(path)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let mut files = DataFiles::new();
    for entry in entries {
        let Some(filename) = entry.file_name().map(|f| f.to_string_lossy().into_owned()) else {
            continue;
        };
        let lower = filename.to_ascii_lowercase();

        if lower.ends_with(".obo") {
            files.ontology_file.get_or_insert(entry);
        } else if lower.ends_with(".paf") || lower == "paf.txt" {
            files.annotation_file.get_or_insert(entry);
        }
    }

    if !files.has_required_files() {
        return Err(PoafError::RequiredFileMissing {
            file_type: files.missing_files().join(", "),
            directory: path.display().to_string(),
        });
    }

    Ok(files)
}

/// Formats a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBO: &str = "format-version: 1.2\n\n[Term]\nid: PR:1\nname: kinase\n";
    const PAF: &str = "PRO_ID\tObject_term\nPR:1\tkinase\n";

    #[test]
    fn test_load_from_bytes() {
        let (index, report) =
            load_from_bytes(OBO.as_bytes(), PAF.as_bytes(), &LoadConfig::default()).unwrap();

        assert_eq!(index.term_count(), 1);
        assert_eq!(index.annotation_count(), 1);
        assert_eq!(report.ontology.terms_loaded, 1);
        assert_eq!(report.annotations.rows_accepted, 1);
        assert!(report.annotations.header_detected);
        assert_eq!(report.dangling_edges, 0);
    }

    #[test]
    fn test_unreadable_input_fails_whole_load() {
        let garbage = [0x00, 0x9f, 0x92, 0x96, 0xff];

        let err = load_from_bytes(&garbage, PAF.as_bytes(), &LoadConfig::default()).unwrap_err();
        assert!(err.to_string().contains("ontology input is unreadable"));

        let err = load_from_bytes(OBO.as_bytes(), &garbage, &LoadConfig::default()).unwrap_err();
        assert!(err.to_string().contains("annotations input is unreadable"));
    }

    #[test]
    fn test_load_from_missing_path() {
        let err = load_from_paths(
            "/definitely/not/here.obo",
            "/definitely/not/here.paf",
            &LoadConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PoafError::FileNotFound { .. }));
    }

    #[test]
    fn test_discover_missing_directory() {
        let err = discover_data_files("/definitely/not/a/dir").unwrap_err();
        assert!(matches!(err, PoafError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }
}
