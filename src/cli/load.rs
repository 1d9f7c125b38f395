//! Load command implementation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use get_settings::{SettingsLoader, SettingsMap, DEFAULT_SETTINGS_FILE};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Toml,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Settings file to load (searched for when omitted)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory to start searching from (defaults to the current directory)
    #[arg(short, long, value_name = "DIR", conflicts_with = "path")]
    pub anchor: Option<PathBuf>,

    /// Settings file name to look for
    #[arg(short, long, value_name = "NAME", env = "GET_SETTINGS_FILE", default_value = DEFAULT_SETTINGS_FILE)]
    pub filename: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run(args: LoadArgs) -> Result<()> {
    let mut loader = SettingsLoader::new().filename(&args.filename);
    if let Some(path) = &args.path {
        loader = loader.path(path);
    }
    if let Some(anchor) = &args.anchor {
        loader = loader.anchor(anchor);
    }

    let settings = loader.load().context("Failed to load settings")?;
    println!("{}", render(&settings, args.format)?);
    Ok(())
}

fn render(settings: &SettingsMap, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(settings).context("Failed to serialize settings as JSON")
        }
        OutputFormat::Toml => toml::to_string_pretty(settings)
            .map(|s| s.trim_end().to_string())
            .context("Failed to serialize settings as TOML (TOML has no null value)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use get_settings::SettingsValue;

    fn sample() -> SettingsMap {
        [
            ("DEBUG".to_string(), SettingsValue::Bool(true)),
            ("HOSTS".to_string(), SettingsValue::List(vec![SettingsValue::Str("a".into())])),
        ]
        .into()
    }

    #[test]
    fn renders_json() {
        let out = render(&sample(), OutputFormat::Json).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("parse");
        assert_eq!(parsed, serde_json::json!({"DEBUG": true, "HOSTS": ["a"]}));
    }

    #[test]
    fn renders_toml() {
        let out = render(&sample(), OutputFormat::Toml).expect("toml");
        assert!(out.contains("DEBUG = true"));
        assert!(out.contains("HOSTS = [\"a\"]"));
    }

    #[test]
    fn toml_rejects_none() {
        let settings: SettingsMap = [("EMPTY".to_string(), SettingsValue::None)].into();
        assert!(render(&settings, OutputFormat::Toml).is_err());
    }
}
