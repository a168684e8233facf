//! # poaf-cli
//!
//! Command-line front end for the protein ontology and annotation index.
//!
//! - [`acquisition`]: the data directory, file import and the SHA-256
//!   version ledger.
//! - [`download`]: streamed retrieval of missing data files.
//! - [`session`]: the loaded index and reload.
//! - [`menu`]: the interactive search menu.

pub mod acquisition;
pub mod download;
pub mod menu;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use poaf_loader::{HeaderDetection, LoadConfig, OboConfig, PafConfig};

pub use acquisition::{DataDirectory, DataKind, VersionInfo};
pub use download::{fetch_missing, Downloader, Sources};
pub use menu::{Menu, MenuChoice};
pub use session::Session;

/// POAF - Protein Ontology and Annotation Framework
#[derive(Parser, Debug)]
#[command(name = "poaf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the data files and versions.json
    #[arg(long, env = "POAF_DATA_DIR", default_value = acquisition::DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Import this OBO ontology file instead of downloading one
    #[arg(long, value_name = "PATH")]
    pub obo: Option<PathBuf>,

    /// Import this PAF annotation file instead of downloading one
    #[arg(long, value_name = "PATH")]
    pub paf: Option<PathBuf>,

    /// Where to download the OBO ontology from when it is missing
    #[arg(long, value_name = "URL", default_value = download::DEFAULT_OBO_URL)]
    pub obo_url: String,

    /// Where to download the PAF annotations from when they are missing
    #[arg(long, value_name = "URL", default_value = download::DEFAULT_PAF_URL)]
    pub paf_url: String,

    /// Download both files again even if they are present
    #[arg(long)]
    pub refresh: bool,

    /// Only update data files without starting interactive mode
    #[arg(long)]
    pub update_only: bool,

    /// Leave obsolete terms out of the index
    #[arg(long)]
    pub exclude_obsolete: bool,

    /// How to treat the first row of the annotation file
    #[arg(long, value_enum, default_value_t = HeaderMode::Auto)]
    pub header: HeaderMode,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Annotation header handling, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HeaderMode {
    /// Header only if the first cell is a known column name
    Auto,
    /// First row is always a header
    Always,
    /// First row is always data
    Never,
}

impl From<HeaderMode> for HeaderDetection {
    fn from(mode: HeaderMode) -> Self {
        match mode {
            HeaderMode::Auto => HeaderDetection::Auto,
            HeaderMode::Always => HeaderDetection::Always,
            HeaderMode::Never => HeaderDetection::Never,
        }
    }
}

impl Cli {
    /// Data file sources selected by the flags.
    pub fn sources(&self) -> Sources {
        Sources {
            obo_url: self.obo_url.clone(),
            paf_url: self.paf_url.clone(),
            obo_path: self.obo.clone(),
            paf_path: self.paf.clone(),
        }
    }

    /// Loader configuration selected by the flags.
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            obo: OboConfig {
                keep_obsolete: !self.exclude_obsolete,
            },
            paf: PafConfig {
                header: self.header.into(),
                ..Default::default()
            },
        }
    }
}
