//! Best-effort transfer of local files and empty directories into a run's storage area.
//!
//! The storage area is writable only while the run is in CONFIGURATION, so uploads
//! happen before the start action. Every item gets its own request and its own outcome.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};
use url::Url;

use crate::transport::{child_url, ApiClient, FormField, TransportError};

/// A local file and its destination path relative to the run directory
/// (including the file name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub local_path: PathBuf,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadItem {
    File(UploadFile),
    /// Empty directory, relative to the run directory.
    Directory(String),
}

impl fmt::Display for UploadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => write!(f, "file {}", file.destination),
            Self::Directory(dir) => write!(f, "directory {dir}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server rejected upload with status {0}")]
    Rejected(u16),
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub item: UploadItem,
    pub result: Result<(), UploadError>,
}

impl UploadOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub async fn upload_files(client: &ApiClient, run_url: &Url, files: &[UploadFile]) -> Vec<UploadOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        let result = upload_file(client, run_url, file).await;
        outcomes.push(report(UploadItem::File(file.clone()), result));
    }
    outcomes
}

pub async fn upload_directories(
    client: &ApiClient,
    run_url: &Url,
    directories: &[String],
) -> Vec<UploadOutcome> {
    let mut outcomes = Vec::with_capacity(directories.len());
    for dir in directories {
        let fields = vec![FormField::text("directory", dir.as_str())];
        let result = post_form(client, run_url, fields).await;
        outcomes.push(report(UploadItem::Directory(dir.clone()), result));
    }
    outcomes
}

async fn upload_file(client: &ApiClient, run_url: &Url, file: &UploadFile) -> Result<(), UploadError> {
    let bytes = tokio::fs::read(&file.local_path)
        .await
        .map_err(|source| UploadError::Read {
            path: file.local_path.clone(),
            source,
        })?;
    post_form(client, run_url, file_fields(file, bytes)).await
}

async fn post_form(client: &ApiClient, run_url: &Url, fields: Vec<FormField>) -> Result<(), UploadError> {
    let url = child_url(run_url, "upload/")?;
    let resp = client.send_form(&url, fields).await?;
    if !resp.is_success() {
        return Err(UploadError::Rejected(resp.status));
    }
    Ok(())
}

fn report(item: UploadItem, result: Result<(), UploadError>) -> UploadOutcome {
    match &result {
        Ok(()) => info!(%item, "uploaded"),
        Err(e) => warn!(%item, error = %e, "upload failed"),
    }
    UploadOutcome { item, result }
}

/// `destination` carries the target directory, the file part carries the target name.
fn file_fields(file: &UploadFile, bytes: Vec<u8>) -> Vec<FormField> {
    let (dir, name) = match file.destination.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", file.destination.as_str()),
    };
    let name = if name.is_empty() {
        file.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        name.to_string()
    };
    vec![
        FormField::text("destination", dir),
        FormField::file("file", name, bytes),
    ]
}
