//! Fetching and sanity-checking the scorer artifact.
//!
//! A failed download from a Git LFS backed host usually produces a small text
//! pointer or an HTML error page instead of the model. Both are caught here by
//! size and by the leading bytes of the file.

use futures::StreamExt;
use std::{
    io::Read,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs::File, io::AsyncWriteExt};

/// Anything smaller than this is not a real model export.
pub const MIN_MODEL_BYTES: u64 = 10 * 1024 * 1024;
const HEADER_LEN: usize = 8;
const PREVIEW_LEN: usize = 500;
const TEXT_MARKERS: [&[u8]; 3] = [b"git-lfs", b"<!DOCT", b"<html"];

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(
        "Downloaded file is too small ({size} bytes). It might be a Git LFS pointer or HTML error page. Preview:\n{preview}"
    )]
    TooSmall { size: u64, preview: String },
    #[error("File appears to be a text file (LFS pointer or HTML), header {header}")]
    TextHeader { header: String },
}

/// Rejects headers that look like a pointer file or an HTML page.
pub fn verify_header(header: &[u8]) -> Result<(), DownloadError> {
    let header = &header[..header.len().min(HEADER_LEN)];
    let is_text = TEXT_MARKERS
        .iter()
        .any(|marker| header.windows(marker.len()).any(|window| window == *marker));
    if is_text {
        return Err(DownloadError::TextHeader {
            header: to_hex(header),
        });
    }
    Ok(())
}

/// Checks a downloaded file by size and then by header, returning its size.
///
/// Only the first [`PREVIEW_LEN`] bytes are read.
pub fn verify_file(path: &Path) -> Result<u64, DownloadError> {
    let io_error = |source| DownloadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_error)?;
    let size = file.metadata().map_err(io_error)?.len();

    let mut prefix = Vec::with_capacity(PREVIEW_LEN);
    file.take(PREVIEW_LEN as u64)
        .read_to_end(&mut prefix)
        .map_err(io_error)?;

    if size < MIN_MODEL_BYTES {
        return Err(DownloadError::TooSmall {
            size,
            preview: String::from_utf8_lossy(&prefix).into_owned(),
        });
    }

    let header = &prefix[..HEADER_LEN.min(prefix.len())];
    tracing::info!("File header (hex): {}", to_hex(header));
    verify_header(header)?;

    Ok(size)
}

/// Streams `url` into `output`, creating parent directories, then verifies it.
pub async fn download(url: &str, output: &Path) -> Result<u64, DownloadError> {
    let io_error = |source| DownloadError::Io {
        path: output.to_path_buf(),
        source,
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    tracing::info!("Downloading model from {}", url);
    let response = reqwest::get(url).await?.error_for_status()?;

    let mut file = File::create(output).await.map_err(io_error)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await.map_err(io_error)?;
    }
    file.flush().await.map_err(io_error)?;

    let size = verify_file(output)?;
    tracing::info!(
        "Download complete. File size: {:.2} MB",
        size as f64 / (1024.0 * 1024.0)
    );
    Ok(size)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
