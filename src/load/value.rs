//! Dynamic setting values and the settings map

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Settings harvested from one load, keyed by setting name.
pub type SettingsMap = BTreeMap<String, SettingsValue>;

/// A value bound at the top level of a settings file.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<SettingsValue>),
    Tuple(Vec<SettingsValue>),
    Set(Vec<SettingsValue>),
    /// Insertion-ordered key/value pairs; keys are unique under `py_eq`.
    Dict(Vec<(SettingsValue, SettingsValue)>),
    /// A module bound by an `import` statement, by dotted name.
    Module(String),
    Function(String),
    Class(String),
    Builtin(String),
}

impl SettingsValue {
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            SettingsValue::Function(_) | SettingsValue::Class(_) | SettingsValue::Builtin(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SettingsValue::None => "NoneType",
            SettingsValue::Bool(_) => "bool",
            SettingsValue::Int(_) => "int",
            SettingsValue::Float(_) => "float",
            SettingsValue::Str(_) => "str",
            SettingsValue::Bytes(_) => "bytes",
            SettingsValue::List(_) => "list",
            SettingsValue::Tuple(_) => "tuple",
            SettingsValue::Set(_) => "set",
            SettingsValue::Dict(_) => "dict",
            SettingsValue::Module(_) => "module",
            SettingsValue::Function(_) => "function",
            SettingsValue::Class(_) => "type",
            SettingsValue::Builtin(_) => "builtin_function_or_method",
        }
    }

    /// Python truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            SettingsValue::None => false,
            SettingsValue::Bool(b) => *b,
            SettingsValue::Int(i) => *i != 0,
            SettingsValue::Float(f) => *f != 0.0,
            SettingsValue::Str(s) => !s.is_empty(),
            SettingsValue::Bytes(b) => !b.is_empty(),
            SettingsValue::List(items) | SettingsValue::Tuple(items) | SettingsValue::Set(items) => {
                !items.is_empty()
            }
            SettingsValue::Dict(pairs) => !pairs.is_empty(),
            _ => true,
        }
    }

    pub fn is_hashable(&self) -> bool {
        match self {
            SettingsValue::List(_) | SettingsValue::Set(_) | SettingsValue::Dict(_) => false,
            SettingsValue::Tuple(items) => items.iter().all(SettingsValue::is_hashable),
            _ => true,
        }
    }

    /// Numeric view used for mixed int/float/bool arithmetic and comparison.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingsValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            SettingsValue::Int(i) => Some(*i as f64),
            SettingsValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view; bools count as 0/1 the way Python treats them.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingsValue::Bool(b) => Some(i64::from(*b)),
            SettingsValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Equality with Python semantics: `1 == 1.0 == True`, containers compared
    /// element-wise, dicts and sets compared without regard to order.
    pub fn py_eq(&self, other: &SettingsValue) -> bool {
        use SettingsValue as V;
        match (self, other) {
            (V::None, V::None) => true,
            (V::Str(a), V::Str(b)) => a == b,
            (V::Bytes(a), V::Bytes(b)) => a == b,
            (V::List(a), V::List(b)) | (V::Tuple(a), V::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
            }
            (V::Set(a), V::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.py_eq(y)))
            }
            (V::Dict(a), V::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter().any(|(k2, v2)| k.py_eq(k2) && v.py_eq(v2))
                    })
            }
            (V::Module(a), V::Module(b))
            | (V::Function(a), V::Function(b))
            | (V::Class(a), V::Class(b))
            | (V::Builtin(a), V::Builtin(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => match (self.as_i64(), other.as_i64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => a == b,
                },
                _ => false,
            },
        }
    }

    /// `str(value)`: strings render bare, everything else as its repr.
    pub fn to_display_string(&self) -> String {
        match self {
            SettingsValue::Str(s) => s.clone(),
            other => other.repr(),
        }
    }

    /// `repr(value)` in Python's notation.
    pub fn repr(&self) -> String {
        match self {
            SettingsValue::None => "None".to_string(),
            SettingsValue::Bool(true) => "True".to_string(),
            SettingsValue::Bool(false) => "False".to_string(),
            SettingsValue::Int(i) => i.to_string(),
            SettingsValue::Float(f) => float_repr(*f),
            SettingsValue::Str(s) => str_repr(s),
            SettingsValue::Bytes(b) => bytes_repr(b),
            SettingsValue::List(items) => format!("[{}]", join_repr(items)),
            SettingsValue::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            SettingsValue::Tuple(items) => format!("({})", join_repr(items)),
            SettingsValue::Set(items) if items.is_empty() => "set()".to_string(),
            SettingsValue::Set(items) => format!("{{{}}}", join_repr(items)),
            SettingsValue::Dict(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{}}}", body)
            }
            SettingsValue::Module(name) => format!("<module '{}'>", name),
            SettingsValue::Function(name) => format!("<function {}>", name),
            SettingsValue::Class(name) => format!("<class '{}'>", name),
            SettingsValue::Builtin(name) => format!("<built-in function {}>", name),
        }
    }
}

fn join_repr(items: &[SettingsValue]) -> String {
    items.iter().map(SettingsValue::repr).collect::<Vec<_>>().join(", ")
}

fn float_repr(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let sign = if f > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        // Shortest round-trip digits; Python switches to exponent form
        // outside 1e-4 <= |f| < 1e16.
        let sci = format!("{:e}", f);
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        if f != 0.0 && !(-4..16).contains(&exponent) {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        } else if f.fract() == 0.0 {
            format!("{:.1}", f)
        } else {
            format!("{}", f)
        }
    }
}

fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn bytes_repr(bytes: &[u8]) -> String {
    let mut out = String::from("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02x}", b)),
        }
    }
    out.push('\'');
    out
}

impl fmt::Display for SettingsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl Serialize for SettingsValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SettingsValue::None => serializer.serialize_unit(),
            SettingsValue::Bool(b) => serializer.serialize_bool(*b),
            SettingsValue::Int(i) => serializer.serialize_i64(*i),
            SettingsValue::Float(f) => serializer.serialize_f64(*f),
            SettingsValue::Str(s) => serializer.serialize_str(s),
            SettingsValue::Bytes(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            SettingsValue::List(items) | SettingsValue::Tuple(items) | SettingsValue::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            SettingsValue::Dict(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(&key.to_display_string(), value)?;
                }
                map.end()
            }
            callable => serializer.serialize_str(&callable.repr()),
        }
    }
}

impl From<bool> for SettingsValue {
    fn from(value: bool) -> Self {
        SettingsValue::Bool(value)
    }
}

impl From<i64> for SettingsValue {
    fn from(value: i64) -> Self {
        SettingsValue::Int(value)
    }
}

impl From<f64> for SettingsValue {
    fn from(value: f64) -> Self {
        SettingsValue::Float(value)
    }
}

impl From<&str> for SettingsValue {
    fn from(value: &str) -> Self {
        SettingsValue::Str(value.to_string())
    }
}

impl From<String> for SettingsValue {
    fn from(value: String) -> Self {
        SettingsValue::Str(value)
    }
}

impl<T: Into<SettingsValue>> From<Vec<T>> for SettingsValue {
    fn from(values: Vec<T>) -> Self {
        SettingsValue::List(values.into_iter().map(Into::into).collect())
    }
}
