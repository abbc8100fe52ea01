//! Input resolution: accept a local path or an HTTP(S) URL and hand the
//! rest of the pipeline a validated local archive file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::Tex2BeamerError;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
/// Offset of the "ustar" marker inside a POSIX tar header.
const USTAR_OFFSET: usize = 257;

/// A user input resolved to a local archive on disk.
///
/// Downloaded archives land in a persisted temp directory: the workspace is
/// extracted next to the archive and the deck is written into it, so the
/// directory has to outlive the conversion.
#[derive(Debug)]
pub enum ResolvedInput {
    /// The input was already a local file.
    Local(PathBuf),
    /// The input was a URL fetched into a persisted temporary directory.
    Downloaded { path: PathBuf },
}

impl ResolvedInput {
    /// Path of the archive file on the local filesystem.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(path) => path,
            ResolvedInput::Downloaded { path } => path,
        }
    }
}

/// Returns `true` if `input` looks like an HTTP(S) URL rather than a path.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a user input string to a local archive file.
///
/// Local paths are checked for existence and readability; URLs are
/// downloaded into a fresh temporary directory. Either way the file's
/// leading bytes are validated to look like a tar or gzip archive before
/// any extraction is attempted.
pub async fn resolve_input(
    input: &str,
    download_timeout_secs: u64,
) -> Result<ResolvedInput, Tex2BeamerError> {
    if input.trim().is_empty() {
        return Err(Tex2BeamerError::InvalidInput {
            input: input.to_string(),
        });
    }

    let resolved = if is_url(input) {
        download_archive(input, download_timeout_secs).await?
    } else {
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(Tex2BeamerError::ArchiveNotFound { path });
        }
        if !path.is_file() {
            return Err(Tex2BeamerError::InvalidInput {
                input: input.to_string(),
            });
        }
        ResolvedInput::Local(path)
    };

    validate_archive_magic(resolved.path()).await?;
    Ok(resolved)
}

/// Download a remote archive into a temporary directory.
async fn download_archive(
    url: &str,
    timeout_secs: u64,
) -> Result<ResolvedInput, Tex2BeamerError> {
    info!("Downloading archive from {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Tex2BeamerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Tex2BeamerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Tex2BeamerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(Tex2BeamerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP status {}", response.status()),
        });
    }

    // Persisted on purpose: the workspace is extracted next to the archive
    // and the deck is written there, so the directory must survive the run.
    let dir = tempfile::Builder::new()
        .prefix("tex2beamer-")
        .tempdir()
        .map_err(|e| Tex2BeamerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("failed to create download directory: {e}"),
        })?
        .keep();

    let filename = url
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("download.tar.gz");
    let path = dir.join(filename);

    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        Tex2BeamerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("failed to create {}: {e}", path.display()),
        }
    })?;

    let mut stream = response;
    let mut total: u64 = 0;
    while let Some(chunk) = stream.chunk().await.map_err(|e| {
        if e.is_timeout() {
            Tex2BeamerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Tex2BeamerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })? {
        total += chunk.len() as u64;
        file.write_all(&chunk)
            .await
            .map_err(|e| Tex2BeamerError::DownloadFailed {
                url: url.to_string(),
                reason: format!("failed writing download: {e}"),
            })?;
    }
    file.flush()
        .await
        .map_err(|e| Tex2BeamerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("failed flushing download: {e}"),
        })?;

    debug!("Downloaded {} bytes to {}", total, path.display());
    Ok(ResolvedInput::Downloaded { path })
}

/// Check the file's leading bytes for a gzip or tar signature.
///
/// Accepts gzip (`1f 8b`) and POSIX tar ("ustar" at offset 257). Anything
/// else is rejected up front with the first four bytes in the error so the
/// user can see what they actually pointed us at.
async fn validate_archive_magic(path: &Path) -> Result<(), Tex2BeamerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            Tex2BeamerError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            Tex2BeamerError::ExtractionFailed {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        }
    })?;

    if bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC {
        return Ok(());
    }
    if bytes.len() > USTAR_OFFSET + 5 && &bytes[USTAR_OFFSET..USTAR_OFFSET + 5] == b"ustar" {
        return Ok(());
    }

    let mut magic = [0u8; 4];
    for (i, b) in bytes.iter().take(4).enumerate() {
        magic[i] = *b;
    }
    Err(Tex2BeamerError::NotAnArchive {
        path: path.to_path_buf(),
        magic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_urls() {
        assert!(is_url("https://arxiv.org/e-print/2101.00001"));
        assert!(is_url("http://example.com/paper.tar.gz"));
        assert!(!is_url("/home/user/paper.tar.gz"));
        assert!(!is_url("paper.tar.gz"));
        assert!(!is_url("ftp://example.com/paper.tar.gz"));
    }

    #[tokio::test]
    async fn missing_local_file_is_fatal() {
        let err = resolve_input("/definitely/not/here.tar.gz", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Tex2BeamerError::ArchiveNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_input_is_invalid() {
        let err = resolve_input("  ", 5).await.unwrap_err();
        assert!(matches!(err, Tex2BeamerError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn rejects_non_archive_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.tar.gz");
        std::fs::write(&path, b"%PDF-1.7 not a tarball").unwrap();

        let err = resolve_input(path.to_str().unwrap(), 5).await.unwrap_err();
        match err {
            Tex2BeamerError::NotAnArchive { magic, .. } => {
                assert_eq!(&magic, b"%PDF");
            }
            other => panic!("expected NotAnArchive, got {other}"),
        }
    }

    #[tokio::test]
    async fn accepts_gzip_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.tar.gz");
        std::fs::write(&path, [0x1f, 0x8b, 0x08, 0x00, 0x00]).unwrap();

        let resolved = resolve_input(path.to_str().unwrap(), 5).await.unwrap();
        assert_eq!(resolved.path(), path);
    }
}
