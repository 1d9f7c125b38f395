//! Expression evaluation

use super::builtins::{self, Kwargs};
use super::{ops, Interpreter};
use crate::error::EvalError;
use crate::load::value::SettingsValue;
use rustpython_parser::ast;

type EvalResult<T> = Result<T, EvalError>;

/// What a call expression resolved to before its arguments are evaluated.
enum Callee<'a> {
    Value(SettingsValue),
    Method(SettingsValue, &'a str),
}

impl Interpreter<'_> {
    pub(super) fn eval(&mut self, expr: &ast::Expr) -> EvalResult<SettingsValue> {
        use SettingsValue as V;
        match expr {
            ast::Expr::Constant(ast::ExprConstant { value, .. }) => self.constant(value),
            ast::Expr::Name(ast::ExprName { id, .. }) => {
                let value = self.lookup(id.as_str())?;
                if super::holds_references(&value) {
                    self.container_reads.push(id.as_str().to_string());
                }
                Ok(value)
            }
            ast::Expr::List(ast::ExprList { elts, .. }) => Ok(V::List(self.eval_elements(elts)?)),
            ast::Expr::Tuple(ast::ExprTuple { elts, .. }) => Ok(V::Tuple(self.eval_elements(elts)?)),
            ast::Expr::Set(ast::ExprSet { elts, .. }) => {
                let mut set = Vec::new();
                for item in self.eval_elements(elts)? {
                    ops::set_insert(&mut set, item, self.line)?;
                }
                Ok(V::Set(set))
            }
            ast::Expr::Dict(ast::ExprDict { keys, values, .. }) => {
                let mut pairs = Vec::new();
                for (key, value) in keys.iter().zip(values) {
                    match key {
                        Some(key) => {
                            let key = self.eval(key)?;
                            let value = self.eval(value)?;
                            ops::dict_insert(&mut pairs, key, value, self.line)?;
                        }
                        // `**other` inside a dict display.
                        None => match self.eval(value)? {
                            V::Dict(other) => {
                                for (k, v) in other {
                                    ops::dict_insert(&mut pairs, k, v, self.line)?;
                                }
                            }
                            other => {
                                return Err(self.type_error(format!(
                                    "'{}' object is not a mapping",
                                    other.type_name()
                                )))
                            }
                        },
                    }
                }
                Ok(V::Dict(pairs))
            }
            ast::Expr::UnaryOp(ast::ExprUnaryOp { op, operand, .. }) => {
                let operand = self.eval(operand)?;
                ops::unary(op, operand, self.line)
            }
            ast::Expr::BinOp(ast::ExprBinOp { left, op, right, .. }) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                ops::binary(op, left, right, self.line)
            }
            ast::Expr::BoolOp(ast::ExprBoolOp { op, values, .. }) => {
                let mut last = V::None;
                for value in values {
                    last = self.eval(value)?;
                    let decided = match op {
                        ast::BoolOp::And => !last.truthy(),
                        ast::BoolOp::Or => last.truthy(),
                    };
                    if decided {
                        break;
                    }
                }
                Ok(last)
            }
            ast::Expr::Compare(ast::ExprCompare { left, ops: cmp_ops, comparators, .. }) => {
                let mut left = self.eval(left)?;
                for (op, right) in cmp_ops.iter().zip(comparators) {
                    let right = self.eval(right)?;
                    if !ops::compare(op, &left, &right, self.line)? {
                        return Ok(V::Bool(false));
                    }
                    left = right;
                }
                Ok(V::Bool(true))
            }
            ast::Expr::IfExp(ast::ExprIfExp { test, body, orelse, .. }) => {
                if self.eval(test)?.truthy() {
                    self.eval(body)
                } else {
                    self.eval(orelse)
                }
            }
            ast::Expr::NamedExpr(ast::ExprNamedExpr { target, value, .. }) => {
                let value = self.eval(value)?;
                self.assign(target, value.clone())?;
                // The enclosing expression now holds the same value as the target.
                if super::holds_references(&value) {
                    if let ast::Expr::Name(ast::ExprName { id, .. }) = target.as_ref() {
                        self.container_reads.push(id.as_str().to_string());
                    }
                }
                Ok(value)
            }
            ast::Expr::Lambda(_) => Ok(V::Function("<lambda>".to_string())),
            ast::Expr::JoinedStr(ast::ExprJoinedStr { values, .. }) => {
                let mut out = String::new();
                for part in values {
                    match part {
                        ast::Expr::Constant(ast::ExprConstant {
                            value: ast::Constant::Str(text), ..
                        }) => out.push_str(text),
                        ast::Expr::FormattedValue(formatted) => {
                            out.push_str(&self.formatted_value(formatted)?)
                        }
                        other => out.push_str(&self.eval(other)?.to_display_string()),
                    }
                }
                Ok(V::Str(out))
            }
            ast::Expr::FormattedValue(formatted) => Ok(V::Str(self.formatted_value(formatted)?)),
            ast::Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
                let base = self.eval(value)?;
                self.get_attribute(&base, attr.as_str())
            }
            ast::Expr::Subscript(ast::ExprSubscript { value, slice, .. }) => {
                self.subscript(value, slice)
            }
            ast::Expr::Call(ast::ExprCall { func, args, keywords, .. }) => {
                self.call(func, args, keywords)
            }
            other => Err(self.unsupported(expression_kind(other))),
        }
    }

    fn type_error(&self, message: String) -> EvalError {
        EvalError::Type { line: self.line, message }
    }

    fn constant(&self, value: &ast::Constant) -> EvalResult<SettingsValue> {
        use SettingsValue as V;
        Ok(match value {
            ast::Constant::None => V::None,
            ast::Constant::Bool(b) => V::Bool(*b),
            ast::Constant::Str(s) => V::Str(s.clone()),
            ast::Constant::Bytes(b) => V::Bytes(b.clone()),
            ast::Constant::Int(i) => V::Int(
                i.to_string().parse::<i64>().map_err(|_| EvalError::Overflow { line: self.line })?,
            ),
            ast::Constant::Float(f) => V::Float(*f),
            ast::Constant::Tuple(items) => V::Tuple(
                items.iter().map(|item| self.constant(item)).collect::<EvalResult<Vec<_>>>()?,
            ),
            ast::Constant::Complex { .. } => return Err(self.unsupported("complex literal")),
            ast::Constant::Ellipsis => return Err(self.unsupported("Ellipsis")),
        })
    }

    /// Evaluate display/argument elements, expanding `*iterable`.
    fn eval_elements(&mut self, elts: &[ast::Expr]) -> EvalResult<Vec<SettingsValue>> {
        let mut out = Vec::with_capacity(elts.len());
        for elt in elts {
            match elt {
                ast::Expr::Starred(ast::ExprStarred { value, .. }) => {
                    let value = self.eval(value)?;
                    out.extend(ops::iterate(&value, self.line)?);
                }
                other => out.push(self.eval(other)?),
            }
        }
        Ok(out)
    }

    fn formatted_value(&mut self, formatted: &ast::ExprFormattedValue) -> EvalResult<String> {
        if formatted.format_spec.is_some() {
            return Err(self.unsupported("format spec in f-string"));
        }
        let value = self.eval(&formatted.value)?;
        Ok(match formatted.conversion {
            ast::ConversionFlag::Repr => value.repr(),
            _ => value.to_display_string(),
        })
    }

    fn get_attribute(&self, base: &SettingsValue, attr: &str) -> EvalResult<SettingsValue> {
        match base {
            SettingsValue::Module(module) => {
                if let Some(value) = builtins::module_attr(module, attr) {
                    return Ok(value);
                }
                Err(self.unsupported(format!("attribute '{}' of module '{}'", attr, module)))
            }
            other => Err(EvalError::Attribute {
                line: self.line,
                message: format!("'{}' object has no attribute '{}'", other.type_name(), attr),
            }),
        }
    }

    fn slice_bound(&mut self, bound: Option<&ast::Expr>) -> EvalResult<Option<i64>> {
        let Some(bound) = bound else {
            return Ok(None);
        };
        match self.eval(bound)? {
            SettingsValue::None => Ok(None),
            value => value.as_i64().map(Some).ok_or_else(|| {
                self.type_error(
                    "slice indices must be integers or None".to_string(),
                )
            }),
        }
    }

    fn subscript(&mut self, value: &ast::Expr, slice: &ast::Expr) -> EvalResult<SettingsValue> {
        use SettingsValue as V;
        let base = self.eval(value)?;
        let line = self.line;

        if let ast::Expr::Slice(ast::ExprSlice { lower, upper, step, .. }) = slice {
            let lower = self.slice_bound(lower.as_deref())?;
            let upper = self.slice_bound(upper.as_deref())?;
            let step = self.slice_bound(step.as_deref())?;
            return match base {
                V::Str(s) => {
                    let chars: Vec<char> = s.chars().collect();
                    let picked = ops::slice_indices(chars.len(), lower, upper, step, line)?;
                    Ok(V::Str(picked.into_iter().map(|i| chars[i]).collect()))
                }
                V::Bytes(b) => {
                    let picked = ops::slice_indices(b.len(), lower, upper, step, line)?;
                    Ok(V::Bytes(picked.into_iter().map(|i| b[i]).collect()))
                }
                V::List(items) => {
                    let picked = ops::slice_indices(items.len(), lower, upper, step, line)?;
                    Ok(V::List(picked.into_iter().map(|i| items[i].clone()).collect()))
                }
                V::Tuple(items) => {
                    let picked = ops::slice_indices(items.len(), lower, upper, step, line)?;
                    Ok(V::Tuple(picked.into_iter().map(|i| items[i].clone()).collect()))
                }
                other => {
                    Err(self.type_error(format!("'{}' object is not subscriptable", other.type_name())))
                }
            };
        }

        let key = self.eval(slice)?;
        let index_of = |len: usize| -> EvalResult<usize> {
            let index = key.as_i64().ok_or_else(|| EvalError::Type {
                line,
                message: format!("indices must be integers, not {}", key.type_name()),
            })?;
            ops::normalize_index(index, len, line)
        };

        match &base {
            V::Dict(pairs) => ops::dict_get(pairs, &key)
                .cloned()
                .ok_or_else(|| EvalError::Key { line, key: key.repr() }),
            V::List(items) | V::Tuple(items) => Ok(items[index_of(items.len())?].clone()),
            V::Str(s) => {
                let chars: Vec<char> = s.chars().collect();
                Ok(V::Str(chars[index_of(chars.len())?].to_string()))
            }
            V::Bytes(b) => Ok(V::Int(i64::from(b[index_of(b.len())?]))),
            V::Module(name) if name == builtins::ENVIRON => match &key {
                V::Str(var) => std::env::var(var)
                    .map(V::Str)
                    .map_err(|_| EvalError::Key { line, key: key.repr() }),
                other => Err(self.type_error(format!(
                    "environment keys must be str, not {}",
                    other.type_name()
                ))),
            },
            other => {
                Err(self.type_error(format!("'{}' object is not subscriptable", other.type_name())))
            }
        }
    }

    fn call(
        &mut self,
        func: &ast::Expr,
        args: &[ast::Expr],
        keywords: &[ast::Keyword],
    ) -> EvalResult<SettingsValue> {
        use SettingsValue as V;

        let callee = match func {
            ast::Expr::Attribute(ast::ExprAttribute { value, attr, .. }) => {
                match self.eval(value)? {
                    module @ V::Module(_) => Callee::Value(self.get_attribute(&module, attr.as_str())?),
                    receiver => Callee::Method(receiver, attr.as_str()),
                }
            }
            other => Callee::Value(self.eval(other)?),
        };

        let positional = self.eval_elements(args)?;
        let kwargs = self.eval_keywords(keywords)?;

        match callee {
            Callee::Method(receiver, method) => {
                builtins::call_method(&receiver, method, positional, kwargs, self.line)
            }
            Callee::Value(V::Builtin(name)) => builtins::call(&name, positional, kwargs, self.line),
            Callee::Value(V::Function(name) | V::Class(name)) => {
                Err(self.unsupported(format!("call to '{}' defined in the settings file", name)))
            }
            Callee::Value(other) => {
                Err(self.type_error(format!("'{}' object is not callable", other.type_name())))
            }
        }
    }

    fn eval_keywords(&mut self, keywords: &[ast::Keyword]) -> EvalResult<Kwargs> {
        let mut kwargs = Kwargs::with_capacity(keywords.len());
        for keyword in keywords {
            let value = self.eval(&keyword.value)?;
            match &keyword.arg {
                Some(name) => kwargs.push((name.as_str().to_string(), value)),
                // `**mapping` in a call.
                None => match value {
                    SettingsValue::Dict(pairs) => {
                        for (key, value) in pairs {
                            match key {
                                SettingsValue::Str(key) => kwargs.push((key, value)),
                                other => {
                                    return Err(self.type_error(format!(
                                        "keywords must be strings, not {}",
                                        other.type_name()
                                    )))
                                }
                            }
                        }
                    }
                    other => {
                        return Err(self.type_error(format!(
                            "argument after ** must be a mapping, not {}",
                            other.type_name()
                        )))
                    }
                },
            }
        }
        Ok(kwargs)
    }
}

fn expression_kind(expr: &ast::Expr) -> &'static str {
    match expr {
        ast::Expr::ListComp(_)
        | ast::Expr::SetComp(_)
        | ast::Expr::DictComp(_)
        | ast::Expr::GeneratorExp(_) => "comprehension",
        ast::Expr::Await(_) => "await expression",
        ast::Expr::Yield(_) | ast::Expr::YieldFrom(_) => "yield expression",
        ast::Expr::Starred(_) => "starred expression",
        ast::Expr::Slice(_) => "slice outside subscript",
        _ => "expression",
    }
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use crate::error::EvalError;
    use crate::load::value::SettingsValue as V;
    use std::path::Path;

    fn value_of(expr: &str) -> Result<V, EvalError> {
        let source = format!("RESULT = {}\n", expr);
        let ns = evaluate(&source, Path::new("settings.py"))?;
        Ok(ns.get("RESULT").cloned().expect("RESULT bound"))
    }

    #[test]
    fn containers_and_unpacking() {
        assert_eq!(
            value_of("{'a': 1, **{'b': 2}}").expect("dict"),
            V::Dict(vec![(V::Str("a".into()), V::Int(1)), (V::Str("b".into()), V::Int(2))])
        );
        assert_eq!(
            value_of("[*(1, 2), 3]").expect("list"),
            V::List(vec![V::Int(1), V::Int(2), V::Int(3)])
        );
        assert_eq!(value_of("{1, 1, 2}").expect("set"), V::Set(vec![V::Int(1), V::Int(2)]));
        assert_eq!(value_of("()").expect("tuple"), V::Tuple(vec![]));
    }

    #[test]
    fn boolean_operators_return_operands() {
        assert_eq!(value_of("'' or 'fallback'").expect("or"), V::Str("fallback".into()));
        assert_eq!(value_of("0 and 1/0").expect("and"), V::Int(0));
        assert_eq!(value_of("not []").expect("not"), V::Bool(true));
    }

    #[test]
    fn chained_comparisons() {
        assert_eq!(value_of("1 < 2 <= 2 < 3").expect("cmp"), V::Bool(true));
        assert_eq!(value_of("1 < 2 > 3").expect("cmp"), V::Bool(false));
        assert_eq!(value_of("'a' not in ('b', 'c')").expect("cmp"), V::Bool(true));
        assert_eq!(value_of("None is None").expect("cmp"), V::Bool(true));
    }

    #[test]
    fn conditional_and_walrus() {
        assert_eq!(value_of("'on' if 0 else 'off'").expect("ifexp"), V::Str("off".into()));
        assert_eq!(value_of("(n := 4) * 2").expect("walrus"), V::Int(8));
    }

    #[test]
    fn fstrings_and_formatting() {
        let ns = evaluate(
            "HOST = 'db'\nPORT = 5432\nURL = f'postgres://{HOST}:{PORT}/{HOST!r}'\n",
            Path::new("settings.py"),
        )
        .expect("eval");
        assert_eq!(ns.get("URL"), Some(&V::Str("postgres://db:5432/'db'".into())));
        assert!(matches!(value_of("f'{3.14159:.2f}'"), Err(EvalError::Unsupported { .. })));
        assert_eq!(value_of("'%s-%d' % ('v', 2)").expect("percent"), V::Str("v-2".into()));
    }

    #[test]
    fn subscripts_and_slices() {
        assert_eq!(value_of("[10, 20, 30][-1]").expect("index"), V::Int(30));
        assert_eq!(value_of("'hello'[1:3]").expect("slice"), V::Str("el".into()));
        assert_eq!(value_of("(1, 2, 3, 4)[::2]").expect("slice"), V::Tuple(vec![V::Int(1), V::Int(3)]));
        assert_eq!(value_of("{'k': 'v'}['k']").expect("key"), V::Str("v".into()));
        assert!(matches!(value_of("{'k': 1}['missing']"), Err(EvalError::Key { .. })));
        assert!(matches!(value_of("[1][5]"), Err(EvalError::Index { .. })));
    }

    #[test]
    fn environment_access() {
        std::env::set_var("GET_SETTINGS_EXPR_TEST", "secret");
        let ns = evaluate(
            "import os\nA = os.environ['GET_SETTINGS_EXPR_TEST']\nB = os.environ.get('GET_SETTINGS_EXPR_MISSING', 'dflt')\nC = 'GET_SETTINGS_EXPR_TEST' in os.environ\nD = os.getenv('GET_SETTINGS_EXPR_MISSING')\n",
            Path::new("settings.py"),
        )
        .expect("eval");
        assert_eq!(ns.get("A"), Some(&V::Str("secret".into())));
        assert_eq!(ns.get("B"), Some(&V::Str("dflt".into())));
        assert_eq!(ns.get("C"), Some(&V::Bool(true)));
        assert_eq!(ns.get("D"), Some(&V::None));

        let err = evaluate(
            "import os\nX = os.environ['GET_SETTINGS_EXPR_MISSING']\n",
            Path::new("settings.py"),
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::Key { line: 2, .. }));
    }

    #[test]
    fn calls_and_methods() {
        assert_eq!(value_of("int('8080') + 1").expect("int"), V::Int(8081));
        assert_eq!(
            value_of("'a,b'.split(',')").expect("split"),
            V::List(vec![V::Str("a".into()), V::Str("b".into())])
        );
        assert_eq!(value_of("dict(a=1)['a']").expect("dict"), V::Int(1));
        assert_eq!(value_of("len({'x': 1, **dict(y=2)})").expect("len"), V::Int(2));
        assert!(matches!(value_of("open('x')"), Err(EvalError::UndefinedName { .. })));
        assert!(matches!(value_of("(1)()"), Err(EvalError::Type { .. })));
    }

    #[test]
    fn user_defined_callables_cannot_be_called() {
        let err = evaluate("def f():\n    return 1\nX = f()\n", Path::new("settings.py")).unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 3, .. }));
    }

    #[test]
    fn unknown_module_attributes_are_unsupported() {
        let err = evaluate("import os\nX = os.system\n", Path::new("settings.py")).unwrap_err();
        assert!(matches!(err, EvalError::Unsupported { line: 2, .. }));
        let ns = evaluate("import os.path\nX = os.path\n", Path::new("settings.py")).expect("eval");
        assert_eq!(ns.get("X"), Some(&V::Module("os.path".into())));
    }

    #[test]
    fn comprehensions_are_unsupported() {
        assert!(matches!(
            value_of("[x for x in (1, 2)]"),
            Err(EvalError::Unsupported { ref construct, .. }) if construct == "comprehension"
        ));
    }
}
