//! VCS ignore-file hygiene for generated key files.
//!
//! A key file created next to a tracked secrets store is one careless
//! `git add .` away from leaking.  When `create --keyfile` generates a
//! key under a detected version-control root, the key path is appended
//! to that root's ignore file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::output;

/// Ignore-file names per supported VCS marker directory.
const VCS_MARKERS: &[(&str, &str)] = &[(".git", ".gitignore"), (".hg", ".hgignore")];

/// Add `key_path` to the ignore file of the VCS root that contains it,
/// if any.  Silently does nothing outside a working copy; ignore-file
/// hygiene is a convenience, not a requirement.
pub fn ignore_key_path(key_path: &Path) {
    let abs = match key_path.canonicalize() {
        Ok(p) => p,
        Err(_) => return,
    };

    let Some((root, ignore_file)) = find_vcs_root(&abs) else {
        return;
    };

    let Ok(rel) = abs.strip_prefix(&root) else {
        return;
    };
    let entry = rel.to_string_lossy().replace('\\', "/");

    patch_ignore_file(&root.join(ignore_file), &entry);
}

/// Walk up from `path` looking for a directory containing a VCS marker.
fn find_vcs_root(path: &Path) -> Option<(PathBuf, &'static str)> {
    for dir in path.ancestors().skip(1) {
        for (marker, ignore_file) in VCS_MARKERS {
            if dir.join(marker).is_dir() {
                return Some((dir.to_path_buf(), ignore_file));
            }
        }
    }
    None
}

/// Append `entry` to the ignore file if not already present.
///
/// Creates the file if it doesn't exist.  Write errors are swallowed.
fn patch_ignore_file(ignore_path: &Path, entry: &str) {
    let existing = fs::read_to_string(ignore_path).unwrap_or_default();

    if existing.lines().any(|line| line.trim() == entry) {
        return;
    }

    let separator = if existing.ends_with('\n') || existing.is_empty() {
        ""
    } else {
        "\n"
    };

    if fs::write(ignore_path, format!("{existing}{separator}{entry}\n")).is_ok() {
        output::info(&format!(
            "Added '{entry}' to {}",
            ignore_path.file_name().unwrap_or_default().to_string_lossy()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn adds_entry_to_new_ignore_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        patch_ignore_file(&path, "secrets.key");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "secrets.key\n");
    }

    #[test]
    fn does_not_duplicate_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "secrets.key\n").unwrap();

        patch_ignore_file(&path, "secrets.key");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("secrets.key").count(), 1);
    }

    #[test]
    fn appends_with_newline_separator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "target/").unwrap(); // no trailing newline

        patch_ignore_file(&path, "secrets.key");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "target/\nsecrets.key\n");
    }

    #[test]
    fn ignores_key_inside_git_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let key_path = dir.path().join("secrets.key");
        fs::write(&key_path, b"key").unwrap();

        ignore_key_path(&key_path);

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.contains("secrets.key"));
    }

    #[test]
    fn does_nothing_outside_a_working_copy() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("secrets.key");
        fs::write(&key_path, b"key").unwrap();

        ignore_key_path(&key_path);

        assert!(!dir.path().join(".gitignore").exists());
    }
}
