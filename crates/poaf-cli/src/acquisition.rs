//! Data directory management.
//!
//! The data directory holds the two input files under fixed names plus a
//! `versions.json` ledger with the SHA-256 hash and update time of each:
//!
//! ```text
//! .PRO/
//! ├── protein_ontology.obo
//! ├── protein_annotations.paf
//! └── versions.json
//! ```
//!
//! Files are brought in with [`DataDirectory::import`] or downloaded by
//! [`crate::download::fetch_missing`]; [`DataDirectory::update`] compares
//! hashes against the ledger and records any file that changed.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use poaf_loader::format_bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".PRO";
/// File name of the ontology inside the data directory.
pub const ONTOLOGY_FILE_NAME: &str = "protein_ontology.obo";
/// File name of the annotations inside the data directory.
pub const ANNOTATION_FILE_NAME: &str = "protein_annotations.paf";
/// File name of the version ledger inside the data directory.
pub const VERSIONS_FILE_NAME: &str = "versions.json";

/// The two data files the tool works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// The OBO ontology file.
    Ontology,
    /// The PAF annotation file.
    Annotations,
}

impl DataKind {
    /// Both kinds, in load order.
    pub const ALL: [DataKind; 2] = [DataKind::Ontology, DataKind::Annotations];

    /// File name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            DataKind::Ontology => ONTOLOGY_FILE_NAME,
            DataKind::Annotations => ANNOTATION_FILE_NAME,
        }
    }

    /// Command-line flag that imports this kind.
    pub fn import_flag(self) -> &'static str {
        match self {
            DataKind::Ontology => "--obo",
            DataKind::Annotations => "--paf",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Ontology => write!(f, "OBO"),
            DataKind::Annotations => write!(f, "PAF"),
        }
    }
}

/// Contents of `versions.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// SHA-256 of the ontology file when last recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obo_hash: Option<String>,
    /// When the ontology file was last recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obo_last_updated: Option<DateTime<Utc>>,
    /// SHA-256 of the annotation file when last recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paf_hash: Option<String>,
    /// When the annotation file was last recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paf_last_updated: Option<DateTime<Utc>>,
}

impl VersionInfo {
    /// Recorded hash for a file.
    pub fn hash(&self, kind: DataKind) -> Option<&str> {
        match kind {
            DataKind::Ontology => self.obo_hash.as_deref(),
            DataKind::Annotations => self.paf_hash.as_deref(),
        }
    }

    /// Recorded update time for a file.
    pub fn last_updated(&self, kind: DataKind) -> Option<DateTime<Utc>> {
        match kind {
            DataKind::Ontology => self.obo_last_updated,
            DataKind::Annotations => self.paf_last_updated,
        }
    }

    /// Records a new hash for a file.
    pub fn record(&mut self, kind: DataKind, hash: String, at: DateTime<Utc>) {
        match kind {
            DataKind::Ontology => {
                self.obo_hash = Some(hash);
                self.obo_last_updated = Some(at);
            }
            DataKind::Annotations => {
                self.paf_hash = Some(hash);
                self.paf_last_updated = Some(at);
            }
        }
    }
}

/// State of one data file relative to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Which file.
    pub kind: DataKind,
    /// Its path inside the data directory.
    pub path: PathBuf,
    /// Hash of the file on disk, `None` if it does not exist.
    pub current_hash: Option<String>,
    /// Hash in `versions.json`, if any.
    pub recorded_hash: Option<String>,
}

impl FileStatus {
    /// Whether the file exists.
    pub fn is_present(&self) -> bool {
        self.current_hash.is_some()
    }

    /// Whether the file differs from what the ledger recorded.
    pub fn is_changed(&self) -> bool {
        self.current_hash != self.recorded_hash
    }
}

/// Outcome of [`DataDirectory::update`].
#[derive(Debug, Clone)]
pub struct UpdateSummary {
    /// Files imported from outside the data directory.
    pub imported: Vec<DataKind>,
    /// Files whose hash changed and was recorded.
    pub updated: Vec<DataKind>,
    /// Ledger after the update.
    pub versions: VersionInfo,
}

impl UpdateSummary {
    /// Whether both files matched the ledger already.
    pub fn is_up_to_date(&self) -> bool {
        self.updated.is_empty()
    }
}

/// The directory holding the data files and the version ledger.
#[derive(Debug, Clone)]
pub struct DataDirectory {
    root: PathBuf,
}

impl Default for DataDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl DataDirectory {
    /// Creates a handle; nothing touches the filesystem until used.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// The directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a data file.
    pub fn path(&self, kind: DataKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Path of `versions.json`.
    pub fn versions_path(&self) -> PathBuf {
        self.root.join(VERSIONS_FILE_NAME)
    }

    /// Creates the directory if needed. Returns `true` if it was created.
    pub fn ensure(&self) -> Result<bool> {
        if self.root.is_dir() {
            tracing::debug!(path = %self.root.display(), "Using existing data directory");
            return Ok(false);
        }
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {}", self.root.display()))?;
        tracing::info!(path = %self.root.display(), "Created data directory");
        Ok(true)
    }

    /// Reads `versions.json`.
    ///
    /// A missing ledger is empty. An unparseable ledger is logged and treated
    /// as empty, so every file is re-recorded on the next update.
    pub fn load_versions(&self) -> Result<VersionInfo> {
        let path = self.versions_path();
        if !path.exists() {
            return Ok(VersionInfo::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str(&text) {
            Ok(info) => Ok(info),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable version ledger"
                );
                Ok(VersionInfo::default())
            }
        }
    }

    /// Writes `versions.json`.
    pub fn save_versions(&self, info: &VersionInfo) -> Result<()> {
        let path = self.versions_path();
        let json = serde_json::to_string_pretty(info)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Copies a file into the data directory under its fixed name.
    ///
    /// Returns the number of bytes copied; importing the file onto itself is a
    /// no-op.
    pub fn import(&self, kind: DataKind, source: &Path) -> Result<u64> {
        let dest = self.path(kind);
        if !source.is_file() {
            bail!("{} source {} is not a file", kind, source.display());
        }
        if dest.exists() && fs::canonicalize(source)? == fs::canonicalize(&dest)? {
            return Ok(0);
        }
        let bytes = fs::copy(source, &dest).with_context(|| {
            format!("Failed to copy {} to {}", source.display(), dest.display())
        })?;
        tracing::info!(
            kind = %kind,
            source = %source.display(),
            size = %format_bytes(bytes),
            "Imported data file"
        );
        Ok(bytes)
    }

    /// Compares both files against the ledger.
    pub fn check(&self) -> Result<Vec<FileStatus>> {
        let versions = self.load_versions()?;
        DataKind::ALL
            .iter()
            .map(|&kind| {
                let path = self.path(kind);
                let current_hash = checksum_if_present(&path)
                    .with_context(|| format!("Failed to hash {}", path.display()))?;
                Ok(FileStatus {
                    kind,
                    path,
                    current_hash,
                    recorded_hash: versions.hash(kind).map(str::to_string),
                })
            })
            .collect()
    }

    /// Imports the given files, then records every file whose hash changed.
    ///
    /// Fails if either file is still missing afterwards.
    pub fn update(
        &self,
        ontology: Option<&Path>,
        annotations: Option<&Path>,
        now: DateTime<Utc>,
    ) -> Result<UpdateSummary> {
        self.ensure()?;

        let mut imported = Vec::new();
        for (kind, source) in [(DataKind::Ontology, ontology), (DataKind::Annotations, annotations)] {
            if let Some(source) = source {
                if self.import(kind, source)? > 0 {
                    imported.push(kind);
                }
            }
        }

        let mut versions = self.load_versions()?;
        let mut updated = Vec::new();
        for status in self.check()? {
            let Some(hash) = status.current_hash.clone() else {
                bail!(
                    "{} file not found at {}; import one with {} <path>",
                    status.kind,
                    status.path.display(),
                    status.kind.import_flag()
                );
            };
            if status.is_changed() {
                tracing::info!(kind = %status.kind, hash = %hash, "Data file changed");
                versions.record(status.kind, hash, now);
                updated.push(status.kind);
            }
        }

        if !updated.is_empty() {
            self.save_versions(&versions)?;
        }

        Ok(UpdateSummary {
            imported,
            updated,
            versions,
        })
    }
}

/// Computes the SHA-256 checksum of a file as lowercase hex.
pub fn file_checksum(path: impl AsRef<Path>) -> io::Result<String> {
    let mut file = File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

fn checksum_if_present(path: &Path) -> io::Result<Option<String>> {
    if path.is_file() {
        file_checksum(path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn sources(dir: &TempDir) -> (PathBuf, PathBuf) {
        let obo = dir.path().join("pr.obo");
        let paf = dir.path().join("PAF.txt");
        fs::write(&obo, "[Term]\nid: PR:1\nname: kinase\n").unwrap();
        fs::write(&paf, "PR:1\tkinase\n").unwrap();
        (obo, paf)
    }

    #[test]
    fn test_file_checksum() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(
            file_checksum(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_update_imports_and_records() {
        let scratch = TempDir::new().unwrap();
        let (obo, paf) = sources(&scratch);
        let data = DataDirectory::new(scratch.path().join(".PRO"));

        let summary = data.update(Some(&obo), Some(&paf), at(1)).unwrap();

        assert_eq!(summary.imported, vec![DataKind::Ontology, DataKind::Annotations]);
        assert_eq!(summary.updated, vec![DataKind::Ontology, DataKind::Annotations]);
        assert!(data.path(DataKind::Ontology).is_file());
        assert_eq!(summary.versions.obo_last_updated, Some(at(1)));

        let saved = data.load_versions().unwrap();
        assert_eq!(saved, summary.versions);
        assert_eq!(saved.hash(DataKind::Annotations), Some(file_checksum(&paf).unwrap().as_str()));
    }

    #[test]
    fn test_unchanged_files_keep_timestamps() {
        let scratch = TempDir::new().unwrap();
        let (obo, paf) = sources(&scratch);
        let data = DataDirectory::new(scratch.path().join(".PRO"));
        data.update(Some(&obo), Some(&paf), at(1)).unwrap();

        let summary = data.update(None, None, at(2)).unwrap();
        assert!(summary.is_up_to_date());
        assert_eq!(summary.versions.paf_last_updated, Some(at(1)));

        fs::write(&paf, "PR:1\tkinase\nPR:2\tligase\n").unwrap();
        let summary = data.update(None, Some(&paf), at(3)).unwrap();
        assert_eq!(summary.updated, vec![DataKind::Annotations]);
        assert_eq!(summary.versions.obo_last_updated, Some(at(1)));
        assert_eq!(summary.versions.paf_last_updated, Some(at(3)));
    }

    #[test]
    fn test_update_without_files_fails() {
        let scratch = TempDir::new().unwrap();
        let data = DataDirectory::new(scratch.path().join(".PRO"));

        let err = data.update(None, None, at(1)).unwrap_err();
        assert!(err.to_string().contains("--obo"));
        assert!(data.root().is_dir());
    }

    #[test]
    fn test_check_reports_changes() {
        let scratch = TempDir::new().unwrap();
        let (obo, _) = sources(&scratch);
        let data = DataDirectory::new(scratch.path());
        data.import(DataKind::Ontology, &obo).unwrap();

        let status = data.check().unwrap();
        assert!(status[0].is_present());
        assert!(status[0].is_changed());
        assert!(!status[1].is_present());
        assert!(!status[1].is_changed());
    }

    #[test]
    fn test_import_onto_itself_is_noop() {
        let scratch = TempDir::new().unwrap();
        let data = DataDirectory::new(scratch.path());
        let dest = data.path(DataKind::Ontology);
        fs::write(&dest, "[Term]\nid: PR:1\n").unwrap();

        assert_eq!(data.import(DataKind::Ontology, &dest).unwrap(), 0);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "[Term]\nid: PR:1\n");
    }

    #[test]
    fn test_corrupt_ledger_is_treated_as_empty() {
        let scratch = TempDir::new().unwrap();
        let data = DataDirectory::new(scratch.path());
        fs::write(data.versions_path(), "{ not json").unwrap();

        assert_eq!(data.load_versions().unwrap(), VersionInfo::default());
    }

    #[test]
    fn test_version_info_json_keys() {
        let mut info = VersionInfo::default();
        info.record(DataKind::Ontology, "abc".to_string(), at(1));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["obo_hash"], "abc");
        assert_eq!(json["obo_last_updated"], "2024-05-01T12:00:00Z");
        assert!(json.get("paf_hash").is_none());
    }
}
