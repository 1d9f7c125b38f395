//! Ancestors command implementation

use anyhow::{Context, Result};
use clap::Args;
use get_settings::walk_to_root;
use std::path::PathBuf;

#[derive(Args)]
pub struct AncestorsArgs {
    /// Directory or file to start from
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

pub fn run(args: AncestorsArgs) -> Result<()> {
    let ancestors = walk_to_root(&args.path)
        .with_context(|| format!("Cannot walk up from {}", args.path.display()))?;
    for dir in ancestors {
        println!("{}", dir.display());
    }
    Ok(())
}
