//! get-settings: find the nearest settings file above a directory and load
//! its upper-case settings.
//!
//! ```no_run
//! use get_settings::{load_settings, SettingsLoader};
//!
//! // Nearest `settings.py` above the current directory.
//! let settings = load_settings(None)?;
//!
//! // Nearest `app.toml` above an explicit anchor.
//! let settings = SettingsLoader::new().anchor("/srv/app/src").filename("app.toml").load()?;
//! # Ok::<(), get_settings::SettingsError>(())
//! ```

pub mod error;
pub mod load;
pub mod resolve;

pub use error::{EvalError, Result, SettingsError};
pub use load::{load_file, load_settings, SettingsLoader, SettingsMap, SettingsValue};
pub use resolve::{find_settings, walk_to_root, Ancestors, Finder, DEFAULT_SETTINGS_FILE};
