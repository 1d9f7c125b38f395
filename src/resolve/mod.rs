//! Settings file discovery
//!
//! Walks from an anchor directory up to the filesystem root and reports the
//! nearest directory holding the requested settings file.

pub mod ancestors;
pub mod finder;

pub use ancestors::{walk_to_root, Ancestors};
pub use finder::{find_settings, Finder, DEFAULT_SETTINGS_FILE};
