//! Workspace indexing: find image assets and the root LaTeX document.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Tex2BeamerError;

/// File extensions (lowercased) considered image assets for slides.
const ASSET_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Marker that identifies the root document among the `.tex` files.
const DOCUMENT_MARKER: &str = "\\begin{document}";

/// What a scan of the extracted workspace found.
#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    /// Image asset file names (not full paths), sorted.
    pub assets: Vec<String>,
    /// First `.tex` file containing `\begin{document}`, in traversal order.
    pub root_document: Option<PathBuf>,
}

/// Walk the workspace and build a [`WorkspaceIndex`].
///
/// The traversal is depth-first with directory entries sorted by name, so
/// the same workspace always yields the same index regardless of readdir
/// order. Entries that cannot be read are skipped with a warning rather
/// than aborting the scan. `.tex` files are read lossily since papers in
/// the wild are not reliably UTF-8.
///
/// Blocking I/O; call through `spawn_blocking` from async contexts.
pub fn index_workspace(workspace: &Path) -> Result<WorkspaceIndex, Tex2BeamerError> {
    let mut index = WorkspaceIndex::default();
    walk(workspace, &mut index);
    index.assets.sort();

    debug!(
        "Indexed workspace {}: {} assets, root document {:?}",
        workspace.display(),
        index.assets.len(),
        index.root_document
    );
    Ok(index)
}

fn walk(dir: &Path, index: &mut WorkspaceIndex) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(&path, index);
            continue;
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ASSET_EXTENSIONS.contains(&ext.as_str()) {
            if let Some(name) = path.file_name() {
                index.assets.push(name.to_string_lossy().into_owned());
            }
        } else if ext == "tex" && index.root_document.is_none() {
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let content = String::from_utf8_lossy(&bytes);
                    if content.contains(DOCUMENT_MARKER) {
                        index.root_document = Some(path);
                    }
                }
                Err(e) => warn!("Skipping unreadable file {}: {}", path.display(), e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_document_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("macros.tex"), "\\newcommand{\\x}{y}").unwrap();
        std::fs::write(
            dir.path().join("main.tex"),
            "\\documentclass{article}\n\\begin{document}\nhi\n\\end{document}\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("figs")).unwrap();
        std::fs::write(dir.path().join("figs/plot.PNG"), b"png").unwrap();
        std::fs::write(dir.path().join("figs/diagram.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("refs.bib"), "@article{}").unwrap();

        let index = index_workspace(dir.path()).unwrap();
        assert_eq!(index.assets, vec!["diagram.pdf", "plot.PNG"]);
        assert_eq!(index.root_document, Some(dir.path().join("main.tex")));
    }

    #[test]
    fn no_root_document_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("preamble.tex"), "\\usepackage{amsmath}").unwrap();

        let index = index_workspace(dir.path()).unwrap();
        assert!(index.root_document.is_none());
    }

    #[test]
    fn traversal_order_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        // Two candidate roots; the lexicographically first wins.
        std::fs::write(
            dir.path().join("b.tex"),
            "\\begin{document}b\\end{document}",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.tex"),
            "\\begin{document}a\\end{document}",
        )
        .unwrap();

        let index = index_workspace(dir.path()).unwrap();
        assert_eq!(index.root_document, Some(dir.path().join("a.tex")));
    }

    #[test]
    fn non_utf8_tex_is_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"\\begin{document}caf".to_vec();
        bytes.push(0xe9); // latin-1 e-acute
        bytes.extend_from_slice(b"\\end{document}");
        std::fs::write(dir.path().join("main.tex"), bytes).unwrap();

        let index = index_workspace(dir.path()).unwrap();
        assert!(index.root_document.is_some());
    }
}
