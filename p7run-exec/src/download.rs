//! Report files fetched from a run directory after it reached a terminal state.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use url::Url;

use crate::transport::{child_url, ApiClient, TransportError};

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Path relative to the run directory, as requested.
    pub path: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DownloadedFile {
    pub fn is_text(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().starts_with("text/plain"))
    }

    /// Content as text when the server labelled it `text/plain`.
    pub fn text(&self) -> Option<String> {
        self.is_text()
            .then(|| String::from_utf8_lossy(&self.bytes).into_owned())
    }

    pub fn file_name(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    /// Write the content to `dir/<file name>`.
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let target = dir.join(self.file_name());
        tokio::fs::write(&target, &self.bytes).await?;
        Ok(target)
    }
}

#[derive(Debug)]
pub struct DownloadOutcome {
    pub path: String,
    pub result: Result<DownloadedFile, TransportError>,
}

pub async fn download_file(client: &ApiClient, run_url: &Url, path: &str) -> Result<DownloadedFile, TransportError> {
    let mut url = child_url(run_url, "download/")?;
    url.set_query(Some(&format!("file={}", urlencoding::encode(path))));

    let resp = client.get_bytes(&url).await?;
    Ok(DownloadedFile {
        path: path.to_string(),
        content_type: resp.header("content-type").map(str::to_string),
        bytes: resp.body,
    })
}

/// Fetch every path; a failure is recorded for that path and the rest continue.
pub async fn download_reports(client: &ApiClient, run_url: &Url, paths: &[String]) -> Vec<DownloadOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());
    for path in paths {
        let result = download_file(client, run_url, path).await;
        match &result {
            Ok(file) => info!(path = %path, bytes = file.bytes.len(), "downloaded report"),
            Err(e) => warn!(path = %path, error = %e, "report download failed"),
        }
        outcomes.push(DownloadOutcome {
            path: path.clone(),
            result,
        });
    }
    outcomes
}
