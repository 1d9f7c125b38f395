//! TOML, YAML and JSON settings files

use crate::error::{Result, SettingsError};
use crate::load::python::Namespace;
use crate::load::value::SettingsValue;
use std::path::Path;

/// Data formats understood besides Python source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Toml,
    Yaml,
    Json,
}

impl DataFormat {
    /// Pick a format from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(DataFormat::Toml),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            "json" => Some(DataFormat::Json),
            _ => None,
        }
    }
}

/// Parse `content` and return its top-level table as a namespace.
pub fn parse_table(content: &str, format: DataFormat, path: &Path) -> Result<Namespace> {
    let format_error = |message: String| SettingsError::Format { path: path.to_path_buf(), message };

    let value = match format {
        DataFormat::Toml => {
            let table: toml::Table = toml::from_str(content)
                .map_err(|e| format_error(format!("Invalid TOML syntax: {}", e)))?;
            from_toml(toml::Value::Table(table))
        }
        DataFormat::Yaml => {
            // An empty YAML document is an empty table, not `null`.
            if content.trim().is_empty() {
                return Ok(Namespace::new());
            }
            let raw: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| format_error(format!("Invalid YAML syntax: {}", e)))?;
            from_yaml(raw)
        }
        DataFormat::Json => {
            let raw: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| format_error(format!("Invalid JSON syntax: {}", e)))?;
            from_json(raw)
        }
    };

    match value {
        SettingsValue::Dict(pairs) => {
            let mut namespace = Namespace::new();
            for (key, value) in pairs {
                namespace.insert(key.to_display_string(), value);
            }
            Ok(namespace)
        }
        other => Err(format_error(format!(
            "top level must be a table, found {}",
            other.type_name()
        ))),
    }
}

fn from_toml(value: toml::Value) -> SettingsValue {
    match value {
        toml::Value::String(s) => SettingsValue::Str(s),
        toml::Value::Integer(i) => SettingsValue::Int(i),
        toml::Value::Float(f) => SettingsValue::Float(f),
        toml::Value::Boolean(b) => SettingsValue::Bool(b),
        toml::Value::Datetime(dt) => SettingsValue::Str(dt.to_string()),
        toml::Value::Array(items) => SettingsValue::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => SettingsValue::Dict(
            table.into_iter().map(|(k, v)| (SettingsValue::Str(k), from_toml(v))).collect(),
        ),
    }
}

fn from_yaml(value: serde_yaml::Value) -> SettingsValue {
    match value {
        serde_yaml::Value::Null => SettingsValue::None,
        serde_yaml::Value::Bool(b) => SettingsValue::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => SettingsValue::Int(i),
            None => SettingsValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => SettingsValue::Str(s),
        serde_yaml::Value::Sequence(items) => {
            SettingsValue::List(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => SettingsValue::Dict(
            mapping.into_iter().map(|(k, v)| (from_yaml(k), from_yaml(v))).collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn from_json(value: serde_json::Value) -> SettingsValue {
    match value {
        serde_json::Value::Null => SettingsValue::None,
        serde_json::Value::Bool(b) => SettingsValue::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => SettingsValue::Int(i),
            None => SettingsValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => SettingsValue::Str(s),
        serde_json::Value::Array(items) => {
            SettingsValue::List(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => SettingsValue::Dict(
            map.into_iter().map(|(k, v)| (SettingsValue::Str(k), from_json(v))).collect(),
        ),
    }
}
