//! discovery.rs
//!
//! Finds test scripts by extension under a root directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// All files under `root` whose extension is `ext`, recursively.
///
/// Entries are visited in file-name order so the list is stable between
/// runs. Unreadable directory entries are skipped. Paths under `.` are
/// returned relative (`a/b.morpho`, not `./a/b.morpho`).
pub fn discover(root: &Path, ext: &str) -> Vec<PathBuf> {
    let ext = ext.trim_start_matches('.');

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some(ext))
        .map(|e| display_path(root, e.path()))
        .collect()
}

fn display_path(root: &Path, path: &Path) -> PathBuf {
    if root == Path::new(".") {
        if let Ok(rel) = path.strip_prefix(".") {
            return rel.to_path_buf();
        }
    }
    path.to_path_buf()
}
