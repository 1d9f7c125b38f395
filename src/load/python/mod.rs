//! Evaluation of Python settings files
//!
//! Settings files are parsed with `rustpython-parser` and their top-level
//! statements executed against a fresh namespace. Only a subset of Python is
//! understood: assignments, imports, `def`/`class` (bound but never run),
//! `if` chains and the expressions settings files are made of. Anything else
//! fails with [`EvalError::Unsupported`] rather than being skipped.

mod builtins;
mod expr;
mod ops;

use crate::error::EvalError;
use crate::load::value::SettingsValue;
use rustpython_parser::ast::{self, Ranged};
use rustpython_parser::Parse;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Value bound to `__name__` while a settings file runs.
pub const MODULE_NAME: &str = "settings";

/// Top-level bindings left behind by a settings file.
pub type Namespace = BTreeMap<String, SettingsValue>;

/// Parse and run `source`, returning every top-level binding it made.
///
/// `path` is bound to `__file__` and used in syntax error messages.
pub fn evaluate(source: &str, path: &Path) -> Result<Namespace, EvalError> {
    let display = path.to_string_lossy();
    let suite = ast::Suite::parse(source, &display)
        .map_err(|e| EvalError::Syntax(e.to_string()))?;

    let mut interpreter = Interpreter::new(source, path);
    interpreter.exec_block(&suite)?;
    Ok(interpreter.globals)
}

struct Interpreter<'src> {
    source: &'src str,
    globals: Namespace,
    /// Names whose container may also be reachable through another binding.
    /// Values are copied on assignment, so mutating one of these in place
    /// would silently diverge from the other binding.
    shared: BTreeSet<String>,
    /// Container-valued names read while evaluating the current statement.
    container_reads: Vec<String>,
    line: usize,
}

impl<'src> Interpreter<'src> {
    fn new(source: &'src str, path: &Path) -> Self {
        let mut globals = Namespace::new();
        globals.insert("__file__".to_string(), SettingsValue::Str(path.to_string_lossy().into_owned()));
        globals.insert("__name__".to_string(), SettingsValue::Str(MODULE_NAME.to_string()));
        globals.insert("__doc__".to_string(), SettingsValue::None);
        Self { source, globals, shared: BTreeSet::new(), container_reads: Vec::new(), line: 1 }
    }

    fn line_at(&self, offset: usize) -> usize {
        let end = offset.min(self.source.len());
        self.source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn unsupported(&self, construct: impl Into<String>) -> EvalError {
        EvalError::Unsupported { line: self.line, construct: construct.into() }
    }

    fn import_error(&self, message: String) -> EvalError {
        EvalError::Import { line: self.line, message }
    }

    fn exec_block(&mut self, body: &[ast::Stmt]) -> Result<(), EvalError> {
        for stmt in body {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &ast::Stmt) -> Result<(), EvalError> {
        self.line = self.line_at(usize::from(stmt.start()));
        self.container_reads.clear();

        match stmt {
            ast::Stmt::Assign(ast::StmtAssign { targets, value: expr, .. }) => {
                let value = self.eval(expr)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
                self.track_sharing(targets, expr, &value);
            }
            ast::Stmt::AnnAssign(ast::StmtAnnAssign { target, value: expr, .. }) => {
                // A bare annotation binds nothing.
                if let Some(expr) = expr {
                    let value = self.eval(expr)?;
                    self.assign(target, value.clone())?;
                    self.track_sharing(std::slice::from_ref(&**target), expr, &value);
                }
            }
            ast::Stmt::AugAssign(ast::StmtAugAssign { target, op, value, .. }) => {
                let name = match target.as_ref() {
                    ast::Expr::Name(ast::ExprName { id, .. }) => id.as_str(),
                    _ => return Err(self.unsupported("augmented assignment to a non-name target")),
                };
                let current = self.lookup(name)?;
                // Lists, dicts and sets are updated in place by `+=`, `|=` and friends.
                if is_mutable_container(&current) && self.shared.contains(name) {
                    return Err(self.unsupported(format!(
                        "in-place update of '{}', whose value is also bound elsewhere",
                        name
                    )));
                }
                let rhs = self.eval(value)?;
                let result = ops::binary(op, current, rhs, self.line)?;
                let reads = std::mem::take(&mut self.container_reads);
                if holds_references(&result) {
                    self.shared.extend(reads);
                }
                self.globals.insert(name.to_string(), result);
            }
            ast::Stmt::FunctionDef(ast::StmtFunctionDef { name, .. })
            | ast::Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { name, .. }) => {
                self.globals
                    .insert(name.as_str().to_string(), SettingsValue::Function(name.as_str().to_string()));
            }
            ast::Stmt::ClassDef(ast::StmtClassDef { name, .. }) => {
                self.globals
                    .insert(name.as_str().to_string(), SettingsValue::Class(name.as_str().to_string()));
            }
            ast::Stmt::Import(ast::StmtImport { names, .. }) => {
                for alias in names {
                    let full = alias.name.as_str();
                    if !builtins::is_known_module(full) {
                        return Err(self.import_error(format!(
                            "module '{}' is not available to settings files",
                            full
                        )));
                    }
                    let (bound, value) = match &alias.asname {
                        Some(asname) => (asname.as_str(), SettingsValue::Module(full.to_string())),
                        None => {
                            let root = full.split('.').next().unwrap_or(full);
                            (root, SettingsValue::Module(root.to_string()))
                        }
                    };
                    self.globals.insert(bound.to_string(), value);
                }
            }
            ast::Stmt::ImportFrom(ast::StmtImportFrom { module, names, level, .. }) => {
                let module = module.as_ref().map(|m| m.as_str()).unwrap_or_default();
                if level.as_ref().map_or(0, |l| l.to_u32()) > 0 {
                    return Err(self.import_error(
                        "relative imports are not available to settings files".to_string(),
                    ));
                }
                if !builtins::is_known_module(module) {
                    return Err(self.import_error(format!(
                        "module '{}' is not available to settings files",
                        module
                    )));
                }
                for alias in names {
                    let name = alias.name.as_str();
                    if name == "*" {
                        return Err(self.unsupported(format!("from {} import *", module)));
                    }
                    let value = builtins::module_attr(module, name).ok_or_else(|| {
                        self.import_error(format!("cannot import name '{}' from '{}'", name, module))
                    })?;
                    let bound = alias.asname.as_ref().map(|a| a.as_str()).unwrap_or(name);
                    self.globals.insert(bound.to_string(), value);
                }
            }
            ast::Stmt::If(ast::StmtIf { test, body, orelse, .. }) => {
                if self.eval(test)?.truthy() {
                    self.exec_block(body)?;
                } else {
                    self.exec_block(orelse)?;
                }
            }
            ast::Stmt::Expr(ast::StmtExpr { value, .. }) => {
                // Docstrings and other bare literals are no-ops.
                if !matches!(value.as_ref(), ast::Expr::Constant(_)) {
                    self.eval(value)?;
                }
            }
            ast::Stmt::Pass(_) => {}
            ast::Stmt::Delete(ast::StmtDelete { targets, .. }) => {
                for target in targets {
                    match target {
                        ast::Expr::Name(ast::ExprName { id, .. }) => {
                            self.shared.remove(id.as_str());
                            if self.globals.remove(id.as_str()).is_none() {
                                return Err(EvalError::UndefinedName {
                                    line: self.line,
                                    name: id.as_str().to_string(),
                                });
                            }
                        }
                        _ => return Err(self.unsupported("del of a non-name target")),
                    }
                }
            }
            ast::Stmt::Assert(ast::StmtAssert { test, msg, .. }) => {
                if !self.eval(test)?.truthy() {
                    let detail = match msg {
                        Some(msg) => format!("AssertionError: {}", self.eval(msg)?.to_display_string()),
                        None => "AssertionError".to_string(),
                    };
                    return Err(EvalError::Raised { line: self.line, message: detail });
                }
            }
            ast::Stmt::Raise(ast::StmtRaise { exc, .. }) => {
                let message = match exc {
                    Some(exc) => self.describe_exception(exc),
                    None => "RuntimeError: No active exception to reraise".to_string(),
                };
                return Err(EvalError::Raised { line: self.line, message });
            }
            other => return Err(self.unsupported(statement_kind(other))),
        }
        Ok(())
    }

    /// Best-effort rendering of `raise Exc("msg")` without evaluating `Exc`.
    fn describe_exception(&mut self, exc: &ast::Expr) -> String {
        match exc {
            ast::Expr::Call(ast::ExprCall { func, args, .. }) => {
                let name = expr_name(func).unwrap_or_else(|| "Exception".to_string());
                let rendered: Vec<String> = args
                    .iter()
                    .map(|arg| match self.eval(arg) {
                        Ok(value) => value.to_display_string(),
                        Err(_) => "?".to_string(),
                    })
                    .collect();
                if rendered.is_empty() {
                    name
                } else {
                    format!("{}: {}", name, rendered.join(", "))
                }
            }
            other => expr_name(other).unwrap_or_else(|| "Exception".to_string()),
        }
    }

    fn lookup(&self, name: &str) -> Result<SettingsValue, EvalError> {
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        builtins::lookup_builtin(name)
            .ok_or_else(|| EvalError::UndefinedName { line: self.line, name: name.to_string() })
    }

    fn assign(&mut self, target: &ast::Expr, value: SettingsValue) -> Result<(), EvalError> {
        match target {
            ast::Expr::Name(ast::ExprName { id, .. }) => {
                self.shared.remove(id.as_str());
                self.globals.insert(id.as_str().to_string(), value);
                Ok(())
            }
            ast::Expr::Tuple(ast::ExprTuple { elts, .. }) | ast::Expr::List(ast::ExprList { elts, .. }) => {
                if elts.iter().any(|e| matches!(e, ast::Expr::Starred(_))) {
                    return Err(self.unsupported("starred assignment target"));
                }
                let items = ops::iterate(&value, self.line)?;
                if items.len() != elts.len() {
                    return Err(EvalError::Value {
                        line: self.line,
                        message: format!(
                            "cannot unpack {} values into {} targets",
                            items.len(),
                            elts.len()
                        ),
                    });
                }
                for (elt, item) in elts.iter().zip(items) {
                    self.assign(elt, item)?;
                }
                Ok(())
            }
            ast::Expr::Subscript(ast::ExprSubscript { value: container, slice, .. }) => {
                let name = match container.as_ref() {
                    ast::Expr::Name(ast::ExprName { id, .. }) => id.as_str().to_string(),
                    _ => return Err(self.unsupported("item assignment on a nested target")),
                };
                if self.shared.contains(&name) {
                    return Err(self.unsupported(format!(
                        "item assignment to '{}', whose value is also bound elsewhere",
                        name
                    )));
                }
                let key = self.eval(slice)?;
                let line = self.line;
                let slot = self
                    .globals
                    .get_mut(&name)
                    .ok_or_else(|| EvalError::UndefinedName { line, name: name.clone() })?;
                match slot {
                    SettingsValue::Dict(pairs) => ops::dict_insert(pairs, key, value, line),
                    SettingsValue::List(items) => {
                        let index = key.as_i64().ok_or_else(|| EvalError::Type {
                            line,
                            message: format!(
                                "list indices must be integers, not {}",
                                key.type_name()
                            ),
                        })?;
                        let index = ops::normalize_index(index, items.len(), line)?;
                        items[index] = value;
                        Ok(())
                    }
                    other => Err(EvalError::Type {
                        line,
                        message: format!(
                            "'{}' object does not support item assignment",
                            other.type_name()
                        ),
                    }),
                }
            }
            _ => Err(self.unsupported("assignment target")),
        }
    }

    /// Record which bindings may share a container after `targets = expr`.
    fn track_sharing(&mut self, targets: &[ast::Expr], expr: &ast::Expr, value: &SettingsValue) {
        let reads = std::mem::take(&mut self.container_reads);
        if !holds_references(value) {
            return;
        }
        let mut names = Vec::new();
        for target in targets {
            target_names(target, &mut names);
        }
        if targets.len() > 1 || (!reads.is_empty() && !builds_fresh(expr)) {
            self.shared.extend(names);
        }
        if !copies_name(expr) {
            self.shared.extend(reads);
        }
    }
}

/// Builtins and methods whose result is a new top-level container.
const COPYING_BUILTINS: &[&str] = &["dict", "list", "set", "tuple", "sorted"];
const COPYING_METHODS: &[&str] = &["copy", "keys", "values", "items"];

fn holds_references(value: &SettingsValue) -> bool {
    matches!(
        value,
        SettingsValue::List(_)
            | SettingsValue::Tuple(_)
            | SettingsValue::Set(_)
            | SettingsValue::Dict(_)
    )
}

fn is_mutable_container(value: &SettingsValue) -> bool {
    matches!(value, SettingsValue::List(_) | SettingsValue::Set(_) | SettingsValue::Dict(_))
}

fn target_names(target: &ast::Expr, out: &mut Vec<String>) {
    match target {
        ast::Expr::Name(ast::ExprName { id, .. }) => out.push(id.as_str().to_string()),
        ast::Expr::Tuple(ast::ExprTuple { elts, .. }) | ast::Expr::List(ast::ExprList { elts, .. }) => {
            for elt in elts {
                target_names(elt, out);
            }
        }
        _ => {}
    }
}

/// Whether `expr` always builds a new outermost container.
fn builds_fresh(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::List(_)
        | ast::Expr::Tuple(_)
        | ast::Expr::Set(_)
        | ast::Expr::Dict(_)
        | ast::Expr::BinOp(_) => true,
        ast::Expr::Call(ast::ExprCall { func, .. }) => match func.as_ref() {
            ast::Expr::Name(ast::ExprName { id, .. }) => COPYING_BUILTINS.contains(&id.as_str()),
            ast::Expr::Attribute(ast::ExprAttribute { attr, .. }) => {
                COPYING_METHODS.contains(&attr.as_str())
            }
            _ => false,
        },
        _ => false,
    }
}

/// `dict(NAME)`, `list(NAME)` or `NAME.copy()`: a shallow copy of one binding.
fn copies_name(expr: &ast::Expr) -> bool {
    let ast::Expr::Call(ast::ExprCall { func, args, keywords, .. }) = expr else {
        return false;
    };
    if !keywords.is_empty() {
        return false;
    }
    let is_name = |e: &ast::Expr| matches!(e, ast::Expr::Name(_));
    match func.as_ref() {
        ast::Expr::Name(ast::ExprName { id, .. }) => {
            COPYING_BUILTINS.contains(&id.as_str()) && args.len() == 1 && is_name(&args[0])
        }
        ast::Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
            attr.as_str() == "copy" && args.is_empty() && is_name(value)
        }
        _ => false,
    }
}

/// Dotted source name of a `Name`/`Attribute` chain.
fn expr_name(expr: &ast::Expr) -> Option<String> {
    match expr {
        ast::Expr::Name(ast::ExprName { id, .. }) => Some(id.as_str().to_string()),
        ast::Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
            expr_name(value).map(|base| format!("{}.{}", base, attr.as_str()))
        }
        _ => None,
    }
}

fn statement_kind(stmt: &ast::Stmt) -> &'static str {
    match stmt {
        ast::Stmt::For(_) | ast::Stmt::AsyncFor(_) => "for loop",
        ast::Stmt::While(_) => "while loop",
        ast::Stmt::With(_) | ast::Stmt::AsyncWith(_) => "with statement",
        ast::Stmt::Try(_) | ast::Stmt::TryStar(_) => "try statement",
        ast::Stmt::Match(_) => "match statement",
        ast::Stmt::Global(_) | ast::Stmt::Nonlocal(_) => "global declaration",
        ast::Stmt::Return(_) => "return outside function",
        ast::Stmt::Break(_) | ast::Stmt::Continue(_) => "loop control outside loop",
        _ => "statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SettingsValue as V;

    fn run(source: &str) -> Result<Namespace, EvalError> {
        evaluate(source, Path::new("/project/settings.py"))
    }

    fn get(ns: &Namespace, name: &str) -> SettingsValue {
        ns.get(name).cloned().unwrap_or_else(|| panic!("{} not bound", name))
    }

    #[test]
    fn binds_literals_and_derived_values() {
        let ns = run("DEBUG = True\nPORT = 8000 + 80\nHOSTS = ['a', 'b']\nNAME = 'x' * 2\n")
            .expect("eval");
        assert_eq!(get(&ns, "DEBUG"), V::Bool(true));
        assert_eq!(get(&ns, "PORT"), V::Int(8080));
        assert_eq!(get(&ns, "HOSTS"), V::List(vec![V::Str("a".into()), V::Str("b".into())]));
        assert_eq!(get(&ns, "NAME"), V::Str("xx".into()));
    }

    #[test]
    fn seeds_module_dunders() {
        let ns = run("").expect("eval");
        assert_eq!(get(&ns, "__file__"), V::Str("/project/settings.py".into()));
        assert_eq!(get(&ns, "__name__"), V::Str(MODULE_NAME.into()));
    }

    #[test]
    fn def_class_and_lambda_bind_callables() {
        let ns = run(
            "def helper():\n    return open('/etc/passwd')\n\nclass Config:\n    x = 1\n\nCB = lambda: None\n",
        )
        .expect("eval");
        assert_eq!(get(&ns, "helper"), V::Function("helper".into()));
        assert_eq!(get(&ns, "Config"), V::Class("Config".into()));
        assert!(get(&ns, "CB").is_callable());
    }

    #[test]
    fn if_chains_pick_one_branch() {
        let source = "ENV = 'prod'\nif ENV == 'dev':\n    LEVEL = 1\nelif ENV == 'prod':\n    LEVEL = 2\nelse:\n    LEVEL = 3\n";
        let ns = run(source).expect("eval");
        assert_eq!(get(&ns, "LEVEL"), V::Int(2));
    }

    #[test]
    fn unpacking_and_augmented_assignment() {
        let ns = run("A, B = 1, 2\nA += 10\nITEMS = [1]\nITEMS += [2]\n").expect("eval");
        assert_eq!(get(&ns, "A"), V::Int(11));
        assert_eq!(get(&ns, "B"), V::Int(2));
        assert_eq!(get(&ns, "ITEMS"), V::List(vec![V::Int(1), V::Int(2)]));

        let err = run("A, B = 1, 2, 3\n").unwrap_err();
        assert!(matches!(err, EvalError::Value { line: 1, .. }));
    }

    #[test]
    fn item_assignment_updates_dicts_and_lists() {
        let ns = run("DB = {}\nDB['host'] = 'h'\nL = [0, 0]\nL[-1] = 5\n").expect("eval");
        assert_eq!(get(&ns, "DB"), V::Dict(vec![(V::Str("host".into()), V::Str("h".into()))]));
        assert_eq!(get(&ns, "L"), V::List(vec![V::Int(0), V::Int(5)]));
    }

    #[test]
    fn imports_bind_modules() {
        let ns = run("import os\nimport os.path as osp\nfrom os import path, getenv\nimport sys\n")
            .expect("eval");
        assert_eq!(get(&ns, "os"), V::Module("os".into()));
        assert_eq!(get(&ns, "osp"), V::Module("os.path".into()));
        assert_eq!(get(&ns, "path"), V::Module("os.path".into()));
        assert_eq!(get(&ns, "getenv"), V::Builtin("os.getenv".into()));
        assert_eq!(get(&ns, "sys"), V::Module("sys".into()));
    }

    #[test]
    fn unavailable_imports_fail() {
        let err = run("from local_settings import SECRET_KEY\n").unwrap_err();
        assert!(matches!(err, EvalError::Import { line: 1, .. }), "got {err:?}");

        let err = run("DEBUG = True\nfrom . import DB\n").unwrap_err();
        assert!(matches!(err, EvalError::Import { line: 2, .. }), "got {err:?}");

        let err = run("import json\n").unwrap_err();
        assert!(matches!(err, EvalError::Import { line: 1, .. }), "got {err:?}");

        let err = run("from os import system\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: ImportError: cannot import name 'system' from 'os'"
        );
    }

    #[test]
    fn mutating_an_aliased_container_fails() {
        let err = run("BASE = {}\nOTHER = BASE\nOTHER['x'] = 1\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 3, .. }), "got {err:?}");

        let err = run("BASE = {}\nOTHER = BASE\nBASE['x'] = 1\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 3, .. }), "got {err:?}");

        let err = run("DB = {'default': {}}\nD = DB['default']\nD['NAME'] = 'x'\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 3, .. }), "got {err:?}");

        let err = run("A = B = []\nA += [1]\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 2, .. }), "got {err:?}");

        let err = run("INNER = {}\nOUTER = {'k': INNER}\nINNER['x'] = 1\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 3, .. }), "got {err:?}");
    }

    #[test]
    fn mutating_copies_and_fresh_values_is_allowed() {
        let ns = run("BASE = {'a': 1}\nOTHER = dict(BASE)\nOTHER['b'] = 2\nBASE['c'] = 3\n")
            .expect("eval");
        assert_eq!(get(&ns, "BASE"), V::Dict(vec![
            (V::Str("a".into()), V::Int(1)),
            (V::Str("c".into()), V::Int(3)),
        ]));
        assert_eq!(get(&ns, "OTHER"), V::Dict(vec![
            (V::Str("a".into()), V::Int(1)),
            (V::Str("b".into()), V::Int(2)),
        ]));

        let ns = run("A = {}\nB = A\nB = {}\nB['k'] = 1\nN = 1\nM = N\nM += 1\n").expect("eval");
        assert_eq!(get(&ns, "B"), V::Dict(vec![(V::Str("k".into()), V::Int(1))]));
        assert_eq!(get(&ns, "M"), V::Int(2));

        let ns = run("L = [1]\nL += [2]\nL[0] = 0\n").expect("eval");
        assert_eq!(get(&ns, "L"), V::List(vec![V::Int(0), V::Int(2)]));
    }

    #[test]
    fn integers_are_64_bit() {
        let ns = run("MAX = 9223372036854775807\nHALF = 2 ** 62\n").expect("eval");
        assert_eq!(get(&ns, "MAX"), V::Int(i64::MAX));
        assert_eq!(get(&ns, "HALF"), V::Int(1 << 62));

        let err = run("MAX_UPLOAD = 2 ** 64\n").unwrap_err();
        assert_eq!(err, EvalError::Overflow { line: 1 });

        let err = run("BIG = 100000000000000000000\n").unwrap_err();
        assert_eq!(err, EvalError::Overflow { line: 1 });
    }

    #[test]
    fn base_dir_idiom_resolves() {
        let ns = run("import os\nBASE_DIR = os.path.dirname(os.path.abspath(__file__))\n")
            .expect("eval");
        let base = get(&ns, "BASE_DIR").to_display_string();
        assert!(base.ends_with("project"), "unexpected BASE_DIR {}", base);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = run("DEBUG = = True\n").unwrap_err();
        assert!(matches!(err, EvalError::Syntax(_)));
    }

    #[test]
    fn raise_and_failed_assert_abort_evaluation() {
        let err = run("X = 1\nraise ValueError('bad config')\n").unwrap_err();
        assert_eq!(
            err,
            EvalError::Raised { line: 2, message: "ValueError: bad config".to_string() }
        );

        let err = run("assert 1 == 2, 'mismatch'\n").unwrap_err();
        assert_eq!(
            err,
            EvalError::Raised { line: 1, message: "AssertionError: mismatch".to_string() }
        );
    }

    #[test]
    fn undefined_names_and_unsupported_statements_fail() {
        let err = run("A = 1\nB = MISSING\n").unwrap_err();
        assert_eq!(err, EvalError::UndefinedName { line: 2, name: "MISSING".to_string() });

        let err = run("for i in range(3):\n    pass\n").unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 1, ref construct } if construct == "for loop"));
    }

    #[test]
    fn delete_removes_bindings() {
        let ns = run("TMP = 1\ndel TMP\n").expect("eval");
        assert!(!ns.contains_key("TMP"));
    }
}
