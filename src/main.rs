//! get-settings: find and load the nearest settings file
//!
//! Searches upward from a directory for a settings file, evaluates it and
//! prints the upper-case settings it defines.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
