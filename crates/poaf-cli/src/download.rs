//! Remote retrieval of the data files.
//!
//! Files are streamed to a `.part` sibling and renamed into place once the
//! body is complete, so an interrupted download never leaves a truncated data
//! file behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use poaf_loader::format_bytes;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::acquisition::{DataDirectory, DataKind};

// ============================================================================
// Download Constants
// ============================================================================

/// Published location of the Protein Ontology.
pub const DEFAULT_OBO_URL: &str = "http://purl.obolibrary.org/obo/pr.obo";

/// Published location of the PRO association file.
pub const DEFAULT_PAF_URL: &str = "https://proconsortium.org/download/current/PAF.txt";

/// Default request timeout in seconds. Both files are large.
/// Can be overridden via the POAF_DOWNLOAD_TIMEOUT_SECS environment variable.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Where each data file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    /// Remote ontology URL.
    pub obo_url: String,
    /// Remote annotation URL.
    pub paf_url: String,
    /// Local ontology file; when set, the ontology is never downloaded.
    pub obo_path: Option<PathBuf>,
    /// Local annotation file; when set, the annotations are never downloaded.
    pub paf_path: Option<PathBuf>,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            obo_url: DEFAULT_OBO_URL.to_string(),
            paf_url: DEFAULT_PAF_URL.to_string(),
            obo_path: None,
            paf_path: None,
        }
    }
}

impl Sources {
    /// Remote URL of a data file.
    pub fn url(&self, kind: DataKind) -> &str {
        match kind {
            DataKind::Ontology => &self.obo_url,
            DataKind::Annotations => &self.paf_url,
        }
    }

    /// Local override of a data file, if one was given.
    pub fn local(&self, kind: DataKind) -> Option<&Path> {
        match kind {
            DataKind::Ontology => self.obo_path.as_deref(),
            DataKind::Annotations => self.paf_path.as_deref(),
        }
    }
}

/// HTTP client for the data files.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Creates a downloader with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Creates a downloader, reading the timeout from the environment.
    pub fn from_env() -> Result<Self> {
        let timeout_secs = std::env::var("POAF_DOWNLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_DOWNLOAD_TIMEOUT_SECS);
        Self::new(Duration::from_secs(timeout_secs))
    }

    /// Streams `url` into `dest`. Returns the number of bytes written.
    ///
    /// `dest` is only replaced after the whole body has arrived.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        tracing::info!(url = %url, "Downloading");
        let partial = partial_path(dest);

        match self.stream_to(url, &partial).await {
            Ok(bytes) => {
                fs::rename(&partial, dest).await.with_context(|| {
                    format!("Failed to move {} into place", partial.display())
                })?;
                tracing::info!(
                    dest = %dest.display(),
                    size = %format_bytes(bytes),
                    "Downloaded data file"
                );
                Ok(bytes)
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&partial).await {
                    tracing::debug!(error = %cleanup, "No partial download to remove");
                }
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;
        if !response.status().is_success() {
            bail!("Failed to download {}: {}", url, response.status());
        }

        let mut file = fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("Download of {} interrupted", url))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

/// Downloads every data file that has no local override and is missing from
/// the data directory (or every such file, when `refresh` is set).
///
/// Returns the kinds that were downloaded.
pub async fn fetch_missing(
    data: &DataDirectory,
    downloader: &Downloader,
    sources: &Sources,
    refresh: bool,
) -> Result<Vec<DataKind>> {
    data.ensure()?;

    let mut fetched = Vec::new();
    for kind in DataKind::ALL {
        if sources.local(kind).is_some() {
            continue;
        }
        let dest = data.path(kind);
        if dest.is_file() && !refresh {
            continue;
        }
        downloader
            .download(sources.url(kind), &dest)
            .await
            .with_context(|| format!("Failed to fetch {} file", kind))?;
        fetched.push(kind);
    }
    Ok(fetched)
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
