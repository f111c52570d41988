//! Assertions over retrieved artifact trees

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// All files below `root`, relative to it, sorted
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .expect("walkdir yields paths under root")
                .to_path_buf()
        })
        .collect();
    files.sort();
    files
}

/// Default session directory for the fixture record, relative to the root
pub fn default_session_dir() -> PathBuf {
    ["Simple Test", "Google Page", "1000x700", "Linux", "Chrome", "00000251", "00000252"]
        .iter()
        .collect()
}

/// Assert that exactly `names` exist in the session directory
pub fn assert_session_files(root: &Path, session_dir: &Path, names: &[&str]) {
    let mut expected: Vec<PathBuf> = names.iter().map(|n| session_dir.join(n)).collect();
    expected.sort();
    assert_eq!(files_under(root), expected);
}
