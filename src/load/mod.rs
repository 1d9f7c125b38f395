//! Settings loading
//!
//! Resolves a settings file (explicitly, or by searching upward from an
//! anchor), evaluates it and keeps the upper-case, non-callable top-level
//! bindings.
//!
//! Python settings files are code: loading one runs it through the
//! evaluator in [`python`], which may read environment variables and probe
//! paths. Only load files you trust.

pub mod data;
pub mod python;
pub mod value;

pub use data::DataFormat;
pub use value::{SettingsMap, SettingsValue};

use crate::error::{Result, SettingsError};
use crate::resolve::{find_settings, DEFAULT_SETTINGS_FILE};
use python::Namespace;
use std::fs;
use std::path::{Path, PathBuf};

/// Load settings from `path`, or from the nearest `settings.py` above the
/// current directory when `path` is `None`.
///
/// A missing settings file is not an error: a warning is logged and an empty
/// map returned. Parse and evaluation failures are returned as
/// [`SettingsError::Load`].
pub fn load_settings(path: Option<&Path>) -> Result<SettingsMap> {
    let mut loader = SettingsLoader::new();
    if let Some(path) = path {
        loader = loader.path(path);
    }
    loader.load()
}

/// Builder form of [`load_settings`].
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    path: Option<PathBuf>,
    anchor: Option<PathBuf>,
    filename: String,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self { path: None, anchor: None, filename: DEFAULT_SETTINGS_FILE.to_string() }
    }

    /// Load this file instead of searching for one.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Directory the search starts from when no path is set.
    pub fn anchor(mut self, anchor: impl Into<PathBuf>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// File name searched for when no path is set.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn load(&self) -> Result<SettingsMap> {
        let resolved = match &self.path {
            // An empty path is the "nothing found" sentinel.
            Some(path) if path.as_os_str().is_empty() => None,
            Some(path) => Some(path.clone()),
            None => find_settings(self.anchor.as_deref(), &self.filename, false)?,
        };

        let Some(path) = resolved else {
            tracing::warn!("get-settings could not find settings file {}.", self.filename);
            return Ok(SettingsMap::new());
        };

        load_file(&path)
    }
}

/// Read and evaluate one settings file, dispatching on its extension.
///
/// `.toml`, `.yaml`/`.yml` and `.json` are parsed as data; anything else is
/// evaluated as Python.
pub fn load_file(path: &Path) -> Result<SettingsMap> {
    let content = fs::read_to_string(path)
        .map_err(|source| SettingsError::Io { path: path.to_path_buf(), source })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let namespace = match DataFormat::from_extension(ext) {
        Some(format) => data::parse_table(&content, format, path)?,
        None => python::evaluate(&content, path)
            .map_err(|source| SettingsError::Load { path: path.to_path_buf(), source })?,
    };

    let settings = harvest(namespace);
    tracing::debug!("Loaded {} settings from {}", settings.len(), path.display());
    Ok(settings)
}

/// Keep the bindings that count as settings.
pub fn harvest(namespace: Namespace) -> SettingsMap {
    namespace.into_iter().filter(|(name, value)| is_setting(name, value)).collect()
}

/// A binding is a setting when its name is not dunder-prefixed, its value is
/// not callable and its name is upper-case.
pub fn is_setting(name: &str, value: &SettingsValue) -> bool {
    !name.starts_with("__") && !value.is_callable() && is_upper(name)
}

/// `str.isupper`: at least one cased character and no lower- or title-case ones.
fn is_upper(name: &str) -> bool {
    let mut cased = false;
    for c in name.chars() {
        if c.is_lowercase() || is_titlecase(c) {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Title-case letters such as `ǅ` are neither upper nor lower case but still
/// change under case mapping.
fn is_titlecase(c: char) -> bool {
    !c.is_uppercase() && !c.is_lowercase() && c.to_lowercase().ne(std::iter::once(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).expect("write");
        path
    }

    #[test]
    fn keeps_only_uppercase_non_callable_bindings() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(
            tmp.path(),
            "settings.py",
            "DEBUG = True\n_secret = 1\nhelper = lambda: None\nname = \"x\"\n",
        );

        let settings = load_settings(Some(path.as_path())).expect("load");
        let expected: SettingsMap = [("DEBUG".to_string(), SettingsValue::Bool(true))].into();
        assert_eq!(settings, expected);
    }

    #[test]
    fn uppercase_callables_and_dunders_are_dropped() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(
            tmp.path(),
            "settings.py",
            "import os\nOS = os\nGETENV = os.getenv\nclass HANDLER:\n    pass\ndef FACTORY():\n    pass\n__ALL__ = ['X']\nMAX_RETRIES_2 = 3\n",
        );

        let settings = load_settings(Some(path.as_path())).expect("load");
        let names: Vec<&str> = settings.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["MAX_RETRIES_2", "OS"]);
        assert_eq!(settings["OS"], SettingsValue::Module("os".into()));
    }

    #[test]
    fn syntax_error_is_a_load_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(tmp.path(), "settings.py", "DEBUG = (\n");

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(err.is_load(), "expected load error, got {err}");
    }

    #[test]
    fn runtime_error_is_a_load_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(tmp.path(), "settings.py", "DEBUG = 1 / 0\n");

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Load { source: crate::error::EvalError::ZeroDivision { line: 1 }, .. }
        ));
    }

    #[test]
    fn unresolvable_import_is_a_load_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(tmp.path(), "settings.py", "from local_settings import SECRET_KEY\n");

        let err = load_settings(Some(path.as_path())).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Load { source: crate::error::EvalError::Import { line: 1, .. }, .. }
        ));
    }

    #[test]
    fn missing_settings_yield_an_empty_map() {
        let tmp = TempDir::new().expect("tmp");
        let settings = SettingsLoader::new()
            .anchor(tmp.path())
            .filename("get-settings-test-no-such-file.py")
            .load()
            .expect("load");
        assert!(settings.is_empty());
    }

    #[test]
    fn empty_path_is_treated_as_not_found() {
        let settings = load_settings(Some(Path::new(""))).expect("load");
        assert!(settings.is_empty());
    }

    #[test]
    fn explicit_missing_file_is_an_io_error() {
        let tmp = TempDir::new().expect("tmp");
        let err = load_settings(Some(tmp.path().join("absent.py").as_path())).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn search_loads_the_nearest_file() {
        let tmp = TempDir::new().expect("tmp");
        let nested = tmp.path().join("a").join("b").join("c");
        fs::create_dir_all(&nested).expect("mkdir");
        write(&tmp.path().join("a"), "settings.py", "LEVEL = 'a'\n");
        write(&tmp.path().join("a").join("b"), "settings.py", "LEVEL = 'b'\n");

        let settings = SettingsLoader::new().anchor(&nested).load().expect("load");
        assert_eq!(settings.get("LEVEL"), Some(&SettingsValue::Str("b".into())));
    }

    #[test]
    fn repeated_loads_do_not_share_state() {
        let tmp = TempDir::new().expect("tmp");
        let first = write(tmp.path(), "first.py", "ONLY_FIRST = 1\nSHARED = 'first'\n");
        let second = write(tmp.path(), "second.py", "SHARED = 'second'\n");

        load_settings(Some(first.as_path())).expect("first");
        let settings = load_settings(Some(second.as_path())).expect("second");
        assert!(!settings.contains_key("ONLY_FIRST"));
        assert_eq!(settings["SHARED"], SettingsValue::Str("second".into()));
    }

    #[test]
    fn data_files_use_the_same_filter() {
        let tmp = TempDir::new().expect("tmp");
        let path = write(tmp.path(), "settings.toml", "DEBUG = true\nlower = 1\n__DUNDER__ = 2\n");

        let settings = load_file(&path).expect("load");
        let expected: SettingsMap = [("DEBUG".to_string(), SettingsValue::Bool(true))].into();
        assert_eq!(settings, expected);
    }

    #[test]
    fn isupper_semantics() {
        assert!(is_upper("DEBUG"));
        assert!(is_upper("_SECRET_2"));
        assert!(!is_upper("Debug"));
        assert!(!is_upper("_123"));
        assert!(!is_upper(""));
        assert!(!is_upper("\u{1C5}"));
        assert!(!is_upper("A\u{1C5}"));
        assert!(is_upper("\u{1C4}"));
    }
}
