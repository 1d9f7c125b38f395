//! Builtin functions, module attributes and methods available to settings files
//!
//! Settings files may read the environment and inspect paths; nothing here
//! writes to disk or runs programs.

use super::ops;
use crate::error::EvalError;
use crate::load::value::SettingsValue;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

type EvalResult<T> = Result<T, EvalError>;

/// Dotted name of the module value standing in for `os.environ`.
pub(super) const ENVIRON: &str = "os.environ";

static BUILTIN_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "str", "int", "float", "bool", "len", "list", "tuple", "dict", "set", "min", "max",
        "abs", "sorted", "repr",
    ]
    .into_iter()
    .collect()
});

static MODULE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "os.getenv",
        "os.environ.get",
        "os.path.join",
        "os.path.dirname",
        "os.path.basename",
        "os.path.abspath",
        "os.path.exists",
        "os.path.isdir",
        "os.path.isfile",
    ]
    .into_iter()
    .collect()
});

/// Keyword arguments in call order.
pub(super) type Kwargs = Vec<(String, SettingsValue)>;

pub(super) fn lookup_builtin(name: &str) -> Option<SettingsValue> {
    BUILTIN_FUNCTIONS.contains(name).then(|| SettingsValue::Builtin(name.to_string()))
}

/// Modules a settings file may import.
pub(super) const MODULES: &[&str] = &["os", "os.path", "sys"];

pub(super) fn is_known_module(name: &str) -> bool {
    MODULES.contains(&name)
}

/// Resolve `module.attr` for a known module. `None` means unknown.
pub(super) fn module_attr(module: &str, attr: &str) -> Option<SettingsValue> {
    let dotted = format!("{}.{}", module, attr);
    if MODULE_FUNCTIONS.contains(dotted.as_str()) {
        return Some(SettingsValue::Builtin(dotted));
    }
    match dotted.as_str() {
        "os.path" | ENVIRON => Some(SettingsValue::Module(dotted)),
        "os.sep" => Some(SettingsValue::Str(std::path::MAIN_SEPARATOR.to_string())),
        "os.linesep" => Some(SettingsValue::Str(if cfg!(windows) { "\r\n" } else { "\n" }.into())),
        "sys.platform" => Some(SettingsValue::Str(python_platform().to_string())),
        _ => None,
    }
}

fn python_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Argument binding for one call: positional slots first, then keywords.
struct Args<'a> {
    func: &'a str,
    positional: Vec<SettingsValue>,
    kwargs: Kwargs,
    line: usize,
}

impl<'a> Args<'a> {
    fn new(func: &'a str, positional: Vec<SettingsValue>, kwargs: Kwargs, line: usize) -> Self {
        Self { func, positional, kwargs, line }
    }

    fn type_error(&self, message: String) -> EvalError {
        EvalError::Type { line: self.line, message }
    }

    /// Fail when more than `max` arguments are supplied or an unknown keyword is used.
    fn check(&self, max: usize, keywords: &[&str]) -> EvalResult<()> {
        if self.positional.len() > max {
            return Err(self.type_error(format!(
                "{}() takes at most {} arguments ({} given)",
                self.func,
                max,
                self.positional.len()
            )));
        }
        if let Some((name, _)) = self.kwargs.iter().find(|(k, _)| !keywords.contains(&k.as_str())) {
            return Err(self.type_error(format!(
                "{}() got an unexpected keyword argument '{}'",
                self.func, name
            )));
        }
        Ok(())
    }

    /// Argument at `index`, or the keyword `name`.
    fn get(&self, index: usize, name: &str) -> Option<&SettingsValue> {
        self.positional
            .get(index)
            .or_else(|| self.kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v))
    }

    fn require(&self, index: usize, name: &str) -> EvalResult<&SettingsValue> {
        self.get(index, name).ok_or_else(|| {
            self.type_error(format!("{}() missing required argument: '{}'", self.func, name))
        })
    }

    fn require_str(&self, index: usize, name: &str) -> EvalResult<&str> {
        match self.require(index, name)? {
            SettingsValue::Str(s) => Ok(s.as_str()),
            other => Err(self.type_error(format!(
                "{}() argument '{}' must be str, not {}",
                self.func,
                name,
                other.type_name()
            ))),
        }
    }
}

/// Call a builtin by its (possibly dotted) name.
pub(super) fn call(
    name: &str,
    positional: Vec<SettingsValue>,
    kwargs: Kwargs,
    line: usize,
) -> EvalResult<SettingsValue> {
    let args = Args::new(name, positional, kwargs, line);
    match name {
        "str" => {
            args.check(1, &[])?;
            Ok(SettingsValue::Str(args.get(0, "").map(|v| v.to_display_string()).unwrap_or_default()))
        }
        "repr" => {
            args.check(1, &[])?;
            Ok(SettingsValue::Str(args.require(0, "obj")?.repr()))
        }
        "int" => to_int(&args),
        "float" => to_float(&args),
        "bool" => {
            args.check(1, &[])?;
            Ok(SettingsValue::Bool(args.get(0, "").is_some_and(SettingsValue::truthy)))
        }
        "len" => {
            args.check(1, &[])?;
            length(args.require(0, "obj")?, line)
        }
        "list" | "tuple" | "set" => {
            args.check(1, &[])?;
            let items = match args.get(0, "") {
                Some(v) => ops::iterate(v, line)?,
                None => Vec::new(),
            };
            match name {
                "list" => Ok(SettingsValue::List(items)),
                "tuple" => Ok(SettingsValue::Tuple(items)),
                _ => {
                    let mut set = Vec::new();
                    for item in items {
                        ops::set_insert(&mut set, item, line)?;
                    }
                    Ok(SettingsValue::Set(set))
                }
            }
        }
        "dict" => to_dict(args),
        "min" | "max" => extremum(&args, name == "max"),
        "abs" => {
            args.check(1, &[])?;
            match args.require(0, "x")? {
                SettingsValue::Float(f) => Ok(SettingsValue::Float(f.abs())),
                v => v
                    .as_i64()
                    .ok_or_else(|| {
                        args.type_error(format!("bad operand type for abs(): '{}'", v.type_name()))
                    })?
                    .checked_abs()
                    .map(SettingsValue::Int)
                    .ok_or(EvalError::Overflow { line }),
            }
        }
        "sorted" => {
            args.check(1, &["reverse"])?;
            let mut items = ops::iterate(args.require(0, "iterable")?, line)?;
            sort_values(&mut items, line)?;
            if args.kwargs.iter().any(|(k, v)| k == "reverse" && v.truthy()) {
                items.reverse();
            }
            Ok(SettingsValue::List(items))
        }
        "os.getenv" | "os.environ.get" => {
            args.check(2, &["key", "default"])?;
            let key = args.require_str(0, "key")?;
            Ok(match std::env::var(key) {
                Ok(value) => SettingsValue::Str(value),
                Err(_) => args.get(1, "default").cloned().unwrap_or(SettingsValue::None),
            })
        }
        "os.path.join" => {
            if !args.kwargs.is_empty() {
                return Err(args.type_error("join() takes no keyword arguments".to_string()));
            }
            let mut joined = args.require_str(0, "a")?.to_string();
            for index in 1..args.positional.len() {
                path_join(&mut joined, args.require_str(index, "p")?);
            }
            Ok(SettingsValue::Str(joined))
        }
        "os.path.dirname" => {
            args.check(1, &[])?;
            Ok(SettingsValue::Str(dirname(args.require_str(0, "p")?).to_string()))
        }
        "os.path.basename" => {
            args.check(1, &[])?;
            Ok(SettingsValue::Str(basename(args.require_str(0, "p")?).to_string()))
        }
        "os.path.abspath" => {
            args.check(1, &[])?;
            let path = args.require_str(0, "path")?;
            let absolute = crate::resolve::ancestors::absolutize(Path::new(path)).map_err(|e| {
                EvalError::Value { line, message: e.to_string() }
            })?;
            Ok(SettingsValue::Str(absolute.to_string_lossy().into_owned()))
        }
        "os.path.exists" | "os.path.isdir" | "os.path.isfile" => {
            args.check(1, &[])?;
            let path = Path::new(args.require_str(0, "path")?);
            let result = match name {
                "os.path.exists" => path.exists(),
                "os.path.isdir" => path.is_dir(),
                _ => path.is_file(),
            };
            Ok(SettingsValue::Bool(result))
        }
        other => Err(EvalError::Unsupported {
            line,
            construct: format!("call to '{}'", other),
        }),
    }
}

fn to_int(args: &Args<'_>) -> EvalResult<SettingsValue> {
    args.check(2, &["base"])?;
    let line = args.line;
    let value_error = |text: &str| EvalError::Value {
        line,
        message: format!("invalid literal for int(): '{}'", text),
    };
    let base = match args.get(1, "base") {
        Some(b) => Some(b.as_i64().ok_or_else(|| {
            args.type_error(format!("'{}' object cannot be interpreted as an integer", b.type_name()))
        })?),
        None => None,
    };

    match (args.get(0, "x"), base) {
        (None, _) => Ok(SettingsValue::Int(0)),
        (Some(SettingsValue::Str(s)), base) => {
            let cleaned: String = s.trim().chars().filter(|&c| c != '_').collect();
            let radix = base.unwrap_or(10);
            if !(2..=36).contains(&radix) {
                return Err(EvalError::Value {
                    line,
                    message: "int() base must be >= 2 and <= 36".to_string(),
                });
            }
            let (negative, digits) = match cleaned.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
            };
            let digits = strip_radix_prefix(digits, radix);
            let magnitude = i64::from_str_radix(digits, radix as u32).map_err(|_| value_error(s.as_str()))?;
            Ok(SettingsValue::Int(if negative { -magnitude } else { magnitude }))
        }
        (Some(_), Some(_)) => {
            Err(args.type_error("int() can't convert non-string with explicit base".to_string()))
        }
        (Some(SettingsValue::Float(f)), None) => {
            if !f.is_finite() || f.abs() >= 9.2e18 {
                return Err(EvalError::Overflow { line });
            }
            Ok(SettingsValue::Int(f.trunc() as i64))
        }
        (Some(v), None) => v.as_i64().map(SettingsValue::Int).ok_or_else(|| {
            args.type_error(format!(
                "int() argument must be a string or a number, not '{}'",
                v.type_name()
            ))
        }),
    }
}

fn strip_radix_prefix(digits: &str, radix: i64) -> &str {
    let prefix = match radix {
        16 => ["0x", "0X"],
        8 => ["0o", "0O"],
        2 => ["0b", "0B"],
        _ => return digits,
    };
    prefix.iter().find_map(|p| digits.strip_prefix(p)).unwrap_or(digits)
}

fn to_float(args: &Args<'_>) -> EvalResult<SettingsValue> {
    args.check(1, &[])?;
    match args.get(0, "x") {
        None => Ok(SettingsValue::Float(0.0)),
        Some(SettingsValue::Str(s)) => {
            s.trim().replace('_', "").parse::<f64>().map(SettingsValue::Float).map_err(|_| {
                EvalError::Value {
                    line: args.line,
                    message: format!("could not convert string to float: '{}'", s),
                }
            })
        }
        Some(v) => v.as_f64().map(SettingsValue::Float).ok_or_else(|| {
            args.type_error(format!(
                "float() argument must be a string or a number, not '{}'",
                v.type_name()
            ))
        }),
    }
}

fn to_dict(args: Args<'_>) -> EvalResult<SettingsValue> {
    let line = args.line;
    if args.positional.len() > 1 {
        return Err(args.type_error(format!(
            "dict expected at most 1 argument, got {}",
            args.positional.len()
        )));
    }
    let mut pairs = Vec::new();
    if let Some(source) = args.positional.first() {
        match source {
            SettingsValue::Dict(existing) => pairs = existing.clone(),
            other => {
                for item in ops::iterate(other, line)? {
                    let pair = ops::iterate(&item, line)?;
                    let [key, value]: [SettingsValue; 2] = pair.try_into().map_err(|_| {
                        EvalError::Value {
                            line,
                            message: "dictionary update sequence element has wrong length"
                                .to_string(),
                        }
                    })?;
                    ops::dict_insert(&mut pairs, key, value, line)?;
                }
            }
        }
    }
    for (key, value) in args.kwargs {
        ops::dict_insert(&mut pairs, SettingsValue::Str(key), value, line)?;
    }
    Ok(SettingsValue::Dict(pairs))
}

fn extremum(args: &Args<'_>, want_max: bool) -> EvalResult<SettingsValue> {
    args.check(usize::MAX, &["default"])?;
    let line = args.line;
    let candidates = match args.positional.as_slice() {
        [] => return Err(args.type_error(format!("{} expected at least 1 argument", args.func))),
        [single] => ops::iterate(single, line)?,
        many => many.to_vec(),
    };

    let mut best: Option<SettingsValue> = None;
    for candidate in candidates {
        best = Some(match best {
            None => candidate,
            Some(current) => {
                let ord = ops::order(&candidate, &current, line)?;
                let better = if want_max { ord.is_gt() } else { ord.is_lt() };
                if better {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    match best {
        Some(value) => Ok(value),
        None => args.get(usize::MAX, "default").cloned().ok_or_else(|| EvalError::Value {
            line,
            message: format!("{}() arg is an empty sequence", args.func),
        }),
    }
}

/// Stable insertion sort that surfaces the first incomparable pair.
fn sort_values(items: &mut [SettingsValue], line: usize) -> EvalResult<()> {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && ops::order(&items[j - 1], &items[j], line)?.is_gt() {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

fn length(value: &SettingsValue, line: usize) -> EvalResult<SettingsValue> {
    let len = match value {
        SettingsValue::Str(s) => s.chars().count(),
        SettingsValue::Bytes(b) => b.len(),
        SettingsValue::List(items) | SettingsValue::Tuple(items) | SettingsValue::Set(items) => {
            items.len()
        }
        SettingsValue::Dict(pairs) => pairs.len(),
        other => {
            return Err(EvalError::Type {
                line,
                message: format!("object of type '{}' has no len()", other.type_name()),
            })
        }
    };
    i64::try_from(len).map(SettingsValue::Int).map_err(|_| EvalError::Overflow { line })
}

fn path_join(base: &mut String, part: &str) {
    if part.starts_with('/') || Path::new(part).is_absolute() {
        *base = part.to_string();
    } else if base.is_empty() || base.ends_with(std::path::is_separator) {
        base.push_str(part);
    } else {
        base.push(std::path::MAIN_SEPARATOR);
        base.push_str(part);
    }
}

fn dirname(path: &str) -> &str {
    match path.rfind(std::path::is_separator) {
        Some(index) => {
            let head = &path[..=index];
            let trimmed = head.trim_end_matches(std::path::is_separator);
            if trimmed.is_empty() {
                head
            } else {
                trimmed
            }
        }
        None => "",
    }
}

fn basename(path: &str) -> &str {
    match path.rfind(std::path::is_separator) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Call `receiver.method(...)` on a str, dict or list value.
pub(super) fn call_method(
    receiver: &SettingsValue,
    method: &str,
    positional: Vec<SettingsValue>,
    kwargs: Kwargs,
    line: usize,
) -> EvalResult<SettingsValue> {
    let qualified = format!("{}.{}", receiver.type_name(), method);
    let args = Args::new(&qualified, positional, kwargs, line);
    match (receiver, method) {
        (SettingsValue::Str(s), "lower") => {
            args.check(0, &[])?;
            Ok(SettingsValue::Str(s.to_lowercase()))
        }
        (SettingsValue::Str(s), "upper") => {
            args.check(0, &[])?;
            Ok(SettingsValue::Str(s.to_uppercase()))
        }
        (SettingsValue::Str(s), "strip" | "lstrip" | "rstrip") => {
            args.check(1, &[])?;
            let chars: Option<Vec<char>> = match args.get(0, "chars") {
                Some(SettingsValue::Str(c)) => Some(c.chars().collect()),
                Some(SettingsValue::None) | None => None,
                Some(other) => {
                    return Err(args.type_error(format!(
                        "strip arg must be None or str, not {}",
                        other.type_name()
                    )))
                }
            };
            let matches = |c: char| match &chars {
                Some(set) => set.contains(&c),
                None => c.is_whitespace(),
            };
            let stripped = match method {
                "lstrip" => s.trim_start_matches(matches),
                "rstrip" => s.trim_end_matches(matches),
                _ => s.trim_matches(matches),
            };
            Ok(SettingsValue::Str(stripped.to_string()))
        }
        (SettingsValue::Str(s), "split") => {
            args.check(2, &["sep", "maxsplit"])?;
            let maxsplit = match args.get(1, "maxsplit") {
                Some(v) => v.as_i64().unwrap_or(-1),
                None => -1,
            };
            let parts: Vec<String> = match args.get(0, "sep") {
                None | Some(SettingsValue::None) => {
                    let words = s.split_whitespace();
                    if maxsplit < 0 {
                        words.map(str::to_string).collect()
                    } else {
                        split_whitespace_limited(s, maxsplit as usize)
                    }
                }
                Some(SettingsValue::Str(sep)) if sep.is_empty() => {
                    return Err(EvalError::Value { line, message: "empty separator".to_string() })
                }
                Some(SettingsValue::Str(sep)) => {
                    if maxsplit < 0 {
                        s.split(sep.as_str()).map(str::to_string).collect()
                    } else {
                        s.splitn(maxsplit as usize + 1, sep.as_str()).map(str::to_string).collect()
                    }
                }
                Some(other) => {
                    return Err(args.type_error(format!(
                        "must be str or None, not {}",
                        other.type_name()
                    )))
                }
            };
            Ok(SettingsValue::List(parts.into_iter().map(SettingsValue::Str).collect()))
        }
        (SettingsValue::Str(s), "replace") => {
            args.check(2, &[])?;
            let old = args.require_str(0, "old")?;
            let new = args.require_str(1, "new")?;
            Ok(SettingsValue::Str(s.replace(old, new)))
        }
        (SettingsValue::Str(s), "startswith" | "endswith") => {
            args.check(1, &[])?;
            let candidates = match args.require(0, "prefix")? {
                SettingsValue::Str(p) => vec![p.clone()],
                SettingsValue::Tuple(items) => items
                    .iter()
                    .map(|item| match item {
                        SettingsValue::Str(p) => Ok(p.clone()),
                        other => Err(args.type_error(format!(
                            "tuple for {} must only contain str, not {}",
                            method,
                            other.type_name()
                        ))),
                    })
                    .collect::<EvalResult<Vec<_>>>()?,
                other => {
                    return Err(args.type_error(format!(
                        "{} first arg must be str or a tuple of str, not {}",
                        method,
                        other.type_name()
                    )))
                }
            };
            let hit = candidates.iter().any(|p| {
                if method == "startswith" {
                    s.starts_with(p.as_str())
                } else {
                    s.ends_with(p.as_str())
                }
            });
            Ok(SettingsValue::Bool(hit))
        }
        (SettingsValue::Str(sep), "join") => {
            args.check(1, &[])?;
            let mut parts = Vec::new();
            for item in ops::iterate(args.require(0, "iterable")?, line)? {
                match item {
                    SettingsValue::Str(part) => parts.push(part),
                    other => {
                        return Err(args.type_error(format!(
                            "sequence item: expected str instance, {} found",
                            other.type_name()
                        )))
                    }
                }
            }
            Ok(SettingsValue::Str(parts.join(sep)))
        }
        (SettingsValue::Str(template), "format") => {
            str_format(template, &args.positional, &args.kwargs, line).map(SettingsValue::Str)
        }
        (SettingsValue::Dict(pairs), "get") => {
            args.check(2, &[])?;
            let key = args.require(0, "key")?;
            Ok(ops::dict_get(pairs, key).or(args.get(1, "default")).cloned().unwrap_or(SettingsValue::None))
        }
        (SettingsValue::Dict(pairs), "keys") => {
            args.check(0, &[])?;
            Ok(SettingsValue::List(pairs.iter().map(|(k, _)| k.clone()).collect()))
        }
        (SettingsValue::Dict(pairs), "values") => {
            args.check(0, &[])?;
            Ok(SettingsValue::List(pairs.iter().map(|(_, v)| v.clone()).collect()))
        }
        (SettingsValue::Dict(pairs), "items") => {
            args.check(0, &[])?;
            Ok(SettingsValue::List(
                pairs.iter().map(|(k, v)| SettingsValue::Tuple(vec![k.clone(), v.clone()])).collect(),
            ))
        }
        (SettingsValue::Dict(_) | SettingsValue::List(_) | SettingsValue::Set(_), "copy") => {
            args.check(0, &[])?;
            Ok(receiver.clone())
        }
        (other, _) => Err(EvalError::Attribute {
            line,
            message: format!("'{}' object has no attribute '{}'", other.type_name(), method),
        }),
    }
}

fn split_whitespace_limited(s: &str, maxsplit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while parts.len() < maxsplit {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(rest[..end].to_string());
                rest = rest[end..].trim_start();
            }
            None => break,
        }
    }
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

/// `str.format` with `{}`, `{0}` and `{name}` fields and `{{`/`}}` escapes.
fn str_format(
    template: &str,
    positional: &[SettingsValue],
    kwargs: &Kwargs,
    line: usize,
) -> EvalResult<String> {
    let value_error = |message: String| EvalError::Value { line, message };
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut auto_index = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(value_error("Single '}' encountered in format string".to_string())),
            '{' => {
                let field: String = chars.by_ref().take_while(|&f| f != '}').collect();
                let (name, conversion) = match field.split_once('!') {
                    Some((name, conv)) => (name, Some(conv)),
                    None => (field.as_str(), None),
                };
                if name.contains(':') {
                    return Err(EvalError::Unsupported {
                        line,
                        construct: "format spec in str.format".to_string(),
                    });
                }
                let value = if name.is_empty() {
                    let value = positional.get(auto_index);
                    auto_index += 1;
                    value
                } else if let Ok(index) = name.parse::<usize>() {
                    positional.get(index)
                } else {
                    kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
                };
                let value = value.ok_or_else(|| EvalError::Key {
                    line,
                    key: if name.is_empty() { auto_index.saturating_sub(1).to_string() } else { format!("'{}'", name) },
                })?;
                match conversion {
                    Some("r") => out.push_str(&value.repr()),
                    Some("s") | None => out.push_str(&value.to_display_string()),
                    Some(other) => {
                        return Err(value_error(format!("Unknown conversion specifier {}", other)))
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
