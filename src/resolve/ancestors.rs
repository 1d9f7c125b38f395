//! Ancestor walk from a starting directory up to the filesystem root

use crate::error::{Result, SettingsError};
use std::path::{Component, Path, PathBuf};

/// Lazy iterator over a directory and each of its ancestors, root included.
///
/// Calling [`walk_to_root`] again restarts the walk.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<PathBuf>,
}

impl Iterator for Ancestors {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let current = self.next.take()?;
        // The root is its own parent; `Path::parent` reports that as `None`.
        self.next = current.parent().map(Path::to_path_buf);
        Some(current)
    }
}

impl std::iter::FusedIterator for Ancestors {}

/// Walk from `start` up to the filesystem root.
///
/// `start` must exist. When it names a file the walk begins at the file's
/// directory. Relative paths are resolved against the current directory and
/// `.`/`..` components are removed lexically, without following symlinks.
pub fn walk_to_root(start: &Path) -> Result<Ancestors> {
    if !start.exists() {
        return Err(SettingsError::NotFound { what: "Starting path", path: start.to_path_buf() });
    }

    let absolute = absolutize(start)?;
    let first = if absolute.is_file() {
        match absolute.parent() {
            Some(parent) => parent.to_path_buf(),
            None => absolute,
        }
    } else {
        absolute
    };

    Ok(Ancestors { next: Some(first) })
}

/// Make `path` absolute and lexically normalized.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)
        .map_err(|source| SettingsError::Io { path: path.to_path_buf(), source })?;
    Ok(normalize_lexically(&absolute))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root.
                let at_root = out.parent().is_none();
                if !at_root {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_ends_at_root_and_each_step_is_the_parent() {
        let tmp = TempDir::new().expect("tmp");
        let deep = tmp.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).expect("mkdir");

        let dirs: Vec<PathBuf> = walk_to_root(&deep).expect("walk").collect();
        assert_eq!(dirs.first(), Some(&absolutize(&deep).expect("abs")));
        for pair in dirs.windows(2) {
            assert_eq!(pair[0].parent(), Some(pair[1].as_path()));
        }
        let last = dirs.last().expect("root");
        assert!(last.parent().is_none(), "walk should end at the root: {}", last.display());
    }

    #[test]
    fn walk_from_file_starts_at_its_directory() {
        let tmp = TempDir::new().expect("tmp");
        let file = tmp.path().join("settings.py");
        fs::write(&file, "DEBUG = True\n").expect("write");

        let first = walk_to_root(&file).expect("walk").next().expect("first");
        assert_eq!(first, absolutize(tmp.path()).expect("abs"));
    }

    #[test]
    fn walk_from_missing_path_is_not_found() {
        let tmp = TempDir::new().expect("tmp");
        let err = walk_to_root(&tmp.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Starting path not found"));
    }

    #[test]
    fn walk_removes_dot_components() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir_all(tmp.path().join("a").join("b")).expect("mkdir");
        let dotted = tmp.path().join("a").join("b").join("..").join(".");

        let first = walk_to_root(&dotted).expect("walk").next().expect("first");
        assert_eq!(first, absolutize(&tmp.path().join("a")).expect("abs"));
    }

    #[test]
    fn walk_is_restartable() {
        let tmp = TempDir::new().expect("tmp");
        let first: Vec<_> = walk_to_root(tmp.path()).expect("walk").collect();
        let second: Vec<_> = walk_to_root(tmp.path()).expect("walk").collect();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn root_walk_yields_only_the_root() {
        let dirs: Vec<_> = walk_to_root(Path::new("/")).expect("walk").collect();
        assert_eq!(dirs, vec![PathBuf::from("/")]);
    }
}
