//! The loaded dataset behind the interactive menu.

use std::sync::Arc;

use anyhow::{Context, Result};
use poaf_loader::{load_from_paths, LoadConfig, LoadReport, ProteinIndex};

use crate::acquisition::{DataDirectory, DataKind, VersionInfo};

/// An index loaded from a data directory.
///
/// The index is never mutated. A reload builds a new one and swaps the shared
/// handle, so readers holding the old [`Arc`] keep a consistent view.
pub struct Session {
    data: DataDirectory,
    config: LoadConfig,
    index: Arc<ProteinIndex>,
    report: LoadReport,
    versions: VersionInfo,
}

impl Session {
    /// Loads both data files from the directory.
    pub fn open(data: DataDirectory, config: LoadConfig) -> Result<Self> {
        let (index, report, versions) = Self::load(&data, &config)?;
        Ok(Self {
            data,
            config,
            index: Arc::new(index),
            report,
            versions,
        })
    }

    /// Rebuilds the index from the files on disk.
    ///
    /// On failure the current index stays in place.
    pub fn reload(&mut self) -> Result<&LoadReport> {
        let (index, report, versions) = Self::load(&self.data, &self.config)?;
        self.index = Arc::new(index);
        self.report = report;
        self.versions = versions;
        Ok(&self.report)
    }

    fn load(
        data: &DataDirectory,
        config: &LoadConfig,
    ) -> Result<(ProteinIndex, LoadReport, VersionInfo)> {
        let ontology = data.path(DataKind::Ontology);
        let annotations = data.path(DataKind::Annotations);
        tracing::info!(
            ontology = %ontology.display(),
            annotations = %annotations.display(),
            "Loading data into memory"
        );

        let (index, report) = load_from_paths(&ontology, &annotations, config)
            .with_context(|| format!("Failed to load data from {}", data.root().display()))?;
        let versions = data.load_versions()?;
        Ok((index, report, versions))
    }

    /// Shared handle to the current index.
    pub fn index(&self) -> Arc<ProteinIndex> {
        Arc::clone(&self.index)
    }

    /// Report of the most recent load.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Version ledger as of the most recent load.
    pub fn versions(&self) -> &VersionInfo {
        &self.versions
    }

    /// The data directory.
    pub fn data(&self) -> &DataDirectory {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_data(data: &DataDirectory, obo: &str, paf: &str) {
        fs::write(data.path(DataKind::Ontology), obo).unwrap();
        fs::write(data.path(DataKind::Annotations), paf).unwrap();
    }

    #[test]
    fn test_open_and_reload() {
        let dir = TempDir::new().unwrap();
        let data = DataDirectory::new(dir.path());
        write_data(&data, "[Term]\nid: PR:1\nname: kinase\n", "PR:1\tkinase\n");

        let mut session = Session::open(data.clone(), LoadConfig::default()).unwrap();
        let before = session.index();
        assert_eq!(before.term_count(), 1);

        write_data(
            &data,
            "[Term]\nid: PR:1\nname: kinase\n\n[Term]\nid: PR:2\nname: ligase\n",
            "PR:1\tkinase\nPR:2\tligase\n",
        );
        let report = session.reload().unwrap();
        assert_eq!(report.ontology.terms_loaded, 2);

        assert_eq!(session.index().term_count(), 2);
        assert_eq!(before.term_count(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_index() {
        let dir = TempDir::new().unwrap();
        let data = DataDirectory::new(dir.path());
        write_data(&data, "[Term]\nid: PR:1\n", "PR:1\n");

        let mut session = Session::open(data.clone(), LoadConfig::default()).unwrap();
        fs::write(data.path(DataKind::Ontology), [0xff, 0xfe, 0x00]).unwrap();

        assert!(session.reload().is_err());
        assert_eq!(session.index().term_count(), 1);
    }

    #[test]
    fn test_open_missing_files_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Session::open(DataDirectory::new(dir.path()), LoadConfig::default()).is_err());
    }
}
