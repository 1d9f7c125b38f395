//! Nearest-ancestor search for a settings file

use super::ancestors::walk_to_root;
use crate::error::{Result, SettingsError};
use std::path::{Path, PathBuf};

/// File name searched for when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.py";

/// Search `anchor` and its ancestors for `filename`.
///
/// The directory closest to `anchor` wins. `anchor` defaults to the current
/// directory. When nothing is found this returns `Ok(None)`, or
/// [`SettingsError::NotFound`] if `raise_if_missing` is set.
pub fn find_settings(
    anchor: Option<&Path>,
    filename: &str,
    raise_if_missing: bool,
) -> Result<Option<PathBuf>> {
    Finder::new().anchor_opt(anchor).filename(filename).raise_if_missing(raise_if_missing).find()
}

/// Builder form of [`find_settings`].
#[derive(Debug, Clone)]
pub struct Finder {
    anchor: Option<PathBuf>,
    filename: String,
    raise_if_missing: bool,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new()
    }
}

impl Finder {
    pub fn new() -> Self {
        Self { anchor: None, filename: DEFAULT_SETTINGS_FILE.to_string(), raise_if_missing: false }
    }

    /// Directory the search starts from.
    pub fn anchor(mut self, anchor: impl Into<PathBuf>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    fn anchor_opt(mut self, anchor: Option<&Path>) -> Self {
        self.anchor = anchor.map(Path::to_path_buf);
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn raise_if_missing(mut self, raise: bool) -> Self {
        self.raise_if_missing = raise;
        self
    }

    pub fn find(&self) -> Result<Option<PathBuf>> {
        let anchor = match &self.anchor {
            Some(anchor) => anchor.clone(),
            None => std::env::current_dir()
                .map_err(|source| SettingsError::Io { path: PathBuf::from("."), source })?,
        };

        for dir in walk_to_root(&anchor)? {
            let candidate = dir.join(&self.filename);
            tracing::trace!("Checking for settings file at {}", candidate.display());
            if candidate.is_file() {
                tracing::debug!("Found settings file {}", candidate.display());
                return Ok(Some(candidate));
            }
        }

        if self.raise_if_missing {
            return Err(SettingsError::NotFound {
                what: "Settings file",
                path: anchor.join(&self.filename),
            });
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().expect("tmp");
        let a = tmp.path().join("a");
        let c = a.join("b").join("c");
        fs::create_dir_all(&c).expect("mkdir");
        (tmp, a, c)
    }

    #[test]
    fn finds_settings_in_an_ancestor() {
        let (_tmp, a, c) = tree();
        fs::write(a.join("settings.py"), "DEBUG = True\n").expect("write");

        let found = find_settings(Some(c.as_path()), DEFAULT_SETTINGS_FILE, false).expect("find");
        let found = found.expect("settings should be found");
        assert_eq!(found.file_name().and_then(|n| n.to_str()), Some("settings.py"));
        assert_eq!(found.parent().and_then(|p| p.file_name()), a.file_name());
    }

    #[test]
    fn nearest_ancestor_wins() {
        let (_tmp, a, c) = tree();
        fs::write(a.join("settings.py"), "LEVEL = 'a'\n").expect("write");
        fs::write(a.join("b").join("settings.py"), "LEVEL = 'b'\n").expect("write");

        let found = find_settings(Some(c.as_path()), DEFAULT_SETTINGS_FILE, false)
            .expect("find")
            .expect("settings should be found");
        assert!(found.ends_with("a/b/settings.py"), "unexpected match: {}", found.display());
    }

    #[test]
    fn directory_with_the_target_name_is_skipped() {
        let (_tmp, a, c) = tree();
        fs::create_dir_all(a.join("b").join("settings.py")).expect("mkdir");
        fs::write(a.join("settings.py"), "").expect("write");

        let found = find_settings(Some(c.as_path()), DEFAULT_SETTINGS_FILE, false)
            .expect("find")
            .expect("settings should be found");
        assert!(found.is_file());
        assert!(found.ends_with("a/settings.py"));
    }

    #[test]
    fn missing_file_is_none_unless_strict() {
        let (_tmp, _a, c) = tree();
        let name = "get-settings-test-file-that-does-not-exist.py";

        assert_eq!(find_settings(Some(c.as_path()), name, false).expect("find"), None);

        let err = find_settings(Some(c.as_path()), name, true).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("Settings file not found"));
    }

    #[test]
    fn missing_anchor_is_not_found_even_when_lenient() {
        let tmp = TempDir::new().expect("tmp");
        let err = find_settings(Some(tmp.path().join("nope").as_path()), DEFAULT_SETTINGS_FILE, false)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn builder_uses_custom_filename() {
        let (_tmp, a, c) = tree();
        fs::write(a.join("app.toml"), "DEBUG = true\n").expect("write");

        let found = Finder::new().anchor(&c).filename("app.toml").find().expect("find");
        assert!(found.expect("found").ends_with("a/app.toml"));
    }
}
