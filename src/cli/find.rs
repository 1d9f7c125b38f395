//! Find command implementation

use anyhow::{Context, Result};
use clap::Args;
use get_settings::{Finder, DEFAULT_SETTINGS_FILE};
use std::path::PathBuf;

#[derive(Args)]
pub struct FindArgs {
    /// Directory to start searching from (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    pub anchor: Option<PathBuf>,

    /// Settings file name to look for
    #[arg(short, long, value_name = "NAME", env = "GET_SETTINGS_FILE", default_value = DEFAULT_SETTINGS_FILE)]
    pub filename: String,

    /// Fail when no settings file is found
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: FindArgs) -> Result<()> {
    let mut finder = Finder::new().filename(&args.filename).raise_if_missing(args.strict);
    if let Some(anchor) = &args.anchor {
        finder = finder.anchor(anchor);
    }

    let found = finder
        .find()
        .with_context(|| format!("Failed to find settings file '{}'", args.filename))?;

    if let Some(path) = found {
        println!("{}", path.display());
    }
    Ok(())
}
