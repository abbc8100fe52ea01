//! Archive extraction into a sibling `_extracted` workspace.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::error::Tex2BeamerError;

/// Suffix appended to the archive stem to name the workspace directory.
pub const WORKSPACE_SUFFIX: &str = "_extracted";

/// Compute the workspace directory for an archive path.
///
/// The archive extension is stripped (`.tar.gz`, `.tgz`, `.tar`) and
/// `_extracted` appended, so `paper.tar.gz` maps to `paper_extracted`
/// next to the archive.
pub fn workspace_dir_for(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = name
        .strip_suffix(".tar.gz")
        .or_else(|| name.strip_suffix(".tgz"))
        .or_else(|| name.strip_suffix(".tar"))
        .unwrap_or(&name);

    let dir_name = format!("{stem}{WORKSPACE_SUFFIX}");
    match archive.parent() {
        Some(parent) => parent.join(dir_name),
        None => PathBuf::from(dir_name),
    }
}

/// Extract `archive` into its workspace directory, creating it if needed.
///
/// If the workspace already exists the extraction is skipped entirely and
/// the existing directory reused, which makes repeated runs against the
/// same archive cheap. On failure any partially written workspace is
/// removed so a later run starts clean.
///
/// Blocking I/O; call through `spawn_blocking` from async contexts.
pub fn extract(archive: &Path) -> Result<PathBuf, Tex2BeamerError> {
    let workspace = workspace_dir_for(archive);

    if workspace.is_dir() {
        debug!("Workspace {} already exists, skipping extraction", workspace.display());
        return Ok(workspace);
    }

    info!("Extracting {} to {}", archive.display(), workspace.display());

    std::fs::create_dir_all(&workspace).map_err(|e| Tex2BeamerError::ExtractionFailed {
        path: archive.to_path_buf(),
        detail: format!("failed to create workspace: {e}"),
    })?;

    if let Err(err) = unpack_into(archive, &workspace) {
        // Don't leave a half-written workspace behind: it would be taken
        // for a complete one on the next run.
        let _ = std::fs::remove_dir_all(&workspace);
        return Err(err);
    }

    Ok(workspace)
}

fn unpack_into(archive: &Path, workspace: &Path) -> Result<(), Tex2BeamerError> {
    let mut file = File::open(archive).map_err(|e| map_open_error(archive, e))?;

    let mut magic = [0u8; 2];
    let gzipped = match file.read_exact(&mut magic) {
        Ok(()) => magic == [0x1f, 0x8b],
        Err(_) => false,
    };
    file.seek(SeekFrom::Start(0))
        .map_err(|e| Tex2BeamerError::ExtractionFailed {
            path: archive.to_path_buf(),
            detail: e.to_string(),
        })?;

    let reader = BufReader::new(file);
    let result = if gzipped {
        tar::Archive::new(GzDecoder::new(reader)).unpack(workspace)
    } else {
        tar::Archive::new(reader).unpack(workspace)
    };

    result.map_err(|e| Tex2BeamerError::ExtractionFailed {
        path: archive.to_path_buf(),
        detail: e.to_string(),
    })
}

fn map_open_error(path: &Path, err: std::io::Error) -> Tex2BeamerError {
    match err.kind() {
        std::io::ErrorKind::NotFound => Tex2BeamerError::ArchiveNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Tex2BeamerError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Tex2BeamerError::ExtractionFailed {
            path: path.to_path_buf(),
            detail: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn build_tar_gz(dest: &Path, files: &[(&str, &str)]) {
        let file = File::create(dest).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, content.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn workspace_naming_strips_known_extensions() {
        assert_eq!(
            workspace_dir_for(Path::new("/tmp/paper.tar.gz")),
            PathBuf::from("/tmp/paper_extracted")
        );
        assert_eq!(
            workspace_dir_for(Path::new("/tmp/paper.tgz")),
            PathBuf::from("/tmp/paper_extracted")
        );
        assert_eq!(
            workspace_dir_for(Path::new("/tmp/paper.tar")),
            PathBuf::from("/tmp/paper_extracted")
        );
        assert_eq!(
            workspace_dir_for(Path::new("/tmp/2101.00001")),
            PathBuf::from("/tmp/2101.00001_extracted")
        );
    }

    #[test]
    fn extracts_gzipped_tar() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("paper.tar.gz");
        build_tar_gz(&archive, &[("main.tex", "\\documentclass{article}")]);

        let workspace = extract(&archive).unwrap();
        assert_eq!(workspace, dir.path().join("paper_extracted"));
        let content = std::fs::read_to_string(workspace.join("main.tex")).unwrap();
        assert_eq!(content, "\\documentclass{article}");
    }

    #[test]
    fn extracts_plain_tar() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("paper.tar");
        let file = File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(file);
        let mut header = tar::Header::new_gnu();
        header.set_size(5);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "notes.tex", "hello".as_bytes())
            .unwrap();
        builder.into_inner().unwrap();

        let workspace = extract(&archive).unwrap();
        assert_eq!(
            std::fs::read_to_string(workspace.join("notes.tex")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn existing_workspace_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("paper.tar.gz");
        build_tar_gz(&archive, &[("main.tex", "first")]);

        let workspace = extract(&archive).unwrap();
        std::fs::write(workspace.join("sentinel"), "kept").unwrap();

        // Rebuild the archive with different content; the workspace must
        // still reflect the first extraction.
        build_tar_gz(&archive, &[("main.tex", "second")]);
        let again = extract(&archive).unwrap();
        assert_eq!(again, workspace);
        assert!(workspace.join("sentinel").exists());
        assert_eq!(
            std::fs::read_to_string(workspace.join("main.tex")).unwrap(),
            "first"
        );
    }

    #[test]
    fn corrupt_archive_cleans_up_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("broken.tar.gz");
        // Valid gzip magic followed by garbage.
        std::fs::write(&archive, [0x1f, 0x8b, 0xff, 0x00, 0x12, 0x34]).unwrap();

        let err = extract(&archive).unwrap_err();
        assert!(matches!(err, Tex2BeamerError::ExtractionFailed { .. }));
        assert!(!dir.path().join("broken_extracted").exists());
    }
}
