//! Operators and container helpers with Python semantics

use crate::error::EvalError;
use crate::load::value::SettingsValue;
use rustpython_parser::ast;
use std::cmp::Ordering;

type EvalResult<T> = Result<T, EvalError>;

fn type_error(line: usize, message: String) -> EvalError {
    EvalError::Type { line, message }
}

fn operand_error(line: usize, symbol: &str, l: &SettingsValue, r: &SettingsValue) -> EvalError {
    type_error(
        line,
        format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            symbol,
            l.type_name(),
            r.type_name()
        ),
    )
}

pub(super) fn operator_symbol(op: &ast::Operator) -> &'static str {
    match op {
        ast::Operator::Add => "+",
        ast::Operator::Sub => "-",
        ast::Operator::Mult => "*",
        ast::Operator::MatMult => "@",
        ast::Operator::Div => "/",
        ast::Operator::Mod => "%",
        ast::Operator::Pow => "**",
        ast::Operator::LShift => "<<",
        ast::Operator::RShift => ">>",
        ast::Operator::BitOr => "|",
        ast::Operator::BitXor => "^",
        ast::Operator::BitAnd => "&",
        ast::Operator::FloorDiv => "//",
    }
}

fn is_int_like(v: &SettingsValue) -> bool {
    matches!(v, SettingsValue::Int(_) | SettingsValue::Bool(_))
}

fn is_numeric(v: &SettingsValue) -> bool {
    matches!(v, SettingsValue::Int(_) | SettingsValue::Bool(_) | SettingsValue::Float(_))
}

pub(super) fn binary(
    op: &ast::Operator,
    l: SettingsValue,
    r: SettingsValue,
    line: usize,
) -> EvalResult<SettingsValue> {
    use SettingsValue as V;
    let symbol = operator_symbol(op);

    // Integer arithmetic first; bools behave as 0/1.
    if let (V::Bool(a), V::Bool(b)) = (&l, &r) {
        match op {
            ast::Operator::BitAnd => return Ok(V::Bool(*a & *b)),
            ast::Operator::BitOr => return Ok(V::Bool(*a | *b)),
            ast::Operator::BitXor => return Ok(V::Bool(*a ^ *b)),
            _ => {}
        }
    }
    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
        if let Some(result) = int_binary(op, a, b, line)? {
            return Ok(result);
        }
    }

    if is_numeric(&l) && is_numeric(&r) && !matches!(op, ast::Operator::MatMult) {
        let a = l.as_f64().unwrap_or_default();
        let b = r.as_f64().unwrap_or_default();
        return float_binary(op, a, b, line)
            .ok_or_else(|| operand_error(line, symbol, &l, &r))?
            .map(V::Float);
    }

    match (op, l, r) {
        (ast::Operator::Add, V::Str(a), V::Str(b)) => Ok(V::Str(a + &b)),
        (ast::Operator::Add, V::Bytes(mut a), V::Bytes(b)) => {
            a.extend(b);
            Ok(V::Bytes(a))
        }
        (ast::Operator::Add, V::List(mut a), V::List(b)) => {
            a.extend(b);
            Ok(V::List(a))
        }
        (ast::Operator::Add, V::Tuple(mut a), V::Tuple(b)) => {
            a.extend(b);
            Ok(V::Tuple(a))
        }
        (ast::Operator::Mult, seq, n) | (ast::Operator::Mult, n, seq)
            if is_int_like(&n) && !is_numeric(&seq) =>
        {
            repeat(seq, n.as_i64().unwrap_or_default(), line)
        }
        (ast::Operator::Mod, V::Str(fmt), args) => percent_format(&fmt, &args, line).map(V::Str),
        (ast::Operator::BitOr, V::Dict(mut a), V::Dict(b)) => {
            for (k, v) in b {
                dict_insert(&mut a, k, v, line)?;
            }
            Ok(V::Dict(a))
        }
        (ast::Operator::BitOr, V::Set(mut a), V::Set(b)) => {
            for item in b {
                set_insert(&mut a, item, line)?;
            }
            Ok(V::Set(a))
        }
        (ast::Operator::BitAnd, V::Set(a), V::Set(b)) => {
            Ok(V::Set(a.into_iter().filter(|x| b.iter().any(|y| x.py_eq(y))).collect()))
        }
        (ast::Operator::Sub, V::Set(a), V::Set(b)) => {
            Ok(V::Set(a.into_iter().filter(|x| !b.iter().any(|y| x.py_eq(y))).collect()))
        }
        (ast::Operator::BitXor, V::Set(a), V::Set(b)) => {
            let mut out: Vec<SettingsValue> =
                a.iter().filter(|x| !b.iter().any(|y| x.py_eq(y))).cloned().collect();
            out.extend(b.iter().filter(|y| !a.iter().any(|x| x.py_eq(y))).cloned());
            Ok(V::Set(out))
        }
        (_, l, r) => Err(operand_error(line, symbol, &l, &r)),
    }
}

/// Integer-only operators. `Ok(None)` means "fall through to float rules".
fn int_binary(
    op: &ast::Operator,
    a: i64,
    b: i64,
    line: usize,
) -> EvalResult<Option<SettingsValue>> {
    let overflow = || EvalError::Overflow { line };
    let value = match op {
        ast::Operator::Add => a.checked_add(b).ok_or_else(overflow)?,
        ast::Operator::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        ast::Operator::Mult => a.checked_mul(b).ok_or_else(overflow)?,
        ast::Operator::FloorDiv => {
            if b == 0 {
                return Err(EvalError::ZeroDivision { line });
            }
            floor_div(a, b).ok_or_else(overflow)?
        }
        ast::Operator::Mod => {
            if b == 0 {
                return Err(EvalError::ZeroDivision { line });
            }
            floor_mod(a, b)
        }
        ast::Operator::Pow if b >= 0 => {
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).ok_or_else(overflow)?
        }
        ast::Operator::LShift | ast::Operator::RShift if b < 0 => {
            return Err(EvalError::Value { line, message: "negative shift count".to_string() });
        }
        ast::Operator::LShift => {
            let shift = u32::try_from(b).map_err(|_| overflow())?;
            let shifted = a.checked_shl(shift).ok_or_else(overflow)?;
            if shifted >> shift != a {
                return Err(overflow());
            }
            shifted
        }
        ast::Operator::RShift => a >> b.min(63),
        ast::Operator::BitAnd => a & b,
        ast::Operator::BitOr => a | b,
        ast::Operator::BitXor => a ^ b,
        _ => return Ok(None),
    };
    Ok(Some(SettingsValue::Int(value)))
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

/// `None` when the operator has no float meaning.
fn float_binary(op: &ast::Operator, a: f64, b: f64, line: usize) -> Option<EvalResult<f64>> {
    let zero_guard = |v: f64| {
        if b == 0.0 {
            Err(EvalError::ZeroDivision { line })
        } else {
            Ok(v)
        }
    };
    match op {
        ast::Operator::Add => Some(Ok(a + b)),
        ast::Operator::Sub => Some(Ok(a - b)),
        ast::Operator::Mult => Some(Ok(a * b)),
        ast::Operator::Div => Some(zero_guard(a / b)),
        ast::Operator::FloorDiv => Some(zero_guard((a / b).floor())),
        ast::Operator::Mod => Some(zero_guard(a - b * (a / b).floor())),
        ast::Operator::Pow => Some(Ok(a.powf(b))),
        _ => None,
    }
}

/// Upper bound on the length of a sequence built by `*`.
const MAX_REPEAT_LEN: usize = 1 << 28;

fn repeat(seq: SettingsValue, n: i64, line: usize) -> EvalResult<SettingsValue> {
    let count = usize::try_from(n.max(0)).map_err(|_| EvalError::Overflow { line })?;
    let checked_len = |len: usize| -> EvalResult<usize> {
        match len.checked_mul(count) {
            Some(total) if total <= MAX_REPEAT_LEN => Ok(total),
            _ => Err(EvalError::Overflow { line }),
        }
    };
    Ok(match seq {
        SettingsValue::Str(s) => {
            checked_len(s.len())?;
            SettingsValue::Str(s.repeat(count))
        }
        SettingsValue::Bytes(b) => {
            checked_len(b.len())?;
            SettingsValue::Bytes(b.repeat(count))
        }
        SettingsValue::List(items) => {
            SettingsValue::List(repeat_items(&items, count, checked_len(items.len())?))
        }
        SettingsValue::Tuple(items) => {
            SettingsValue::Tuple(repeat_items(&items, count, checked_len(items.len())?))
        }
        other => {
            return Err(type_error(
                line,
                format!("can't multiply sequence by non-int of type '{}'", other.type_name()),
            ))
        }
    })
}

fn repeat_items(items: &[SettingsValue], count: usize, total: usize) -> Vec<SettingsValue> {
    let mut out = Vec::with_capacity(total);
    if items.is_empty() {
        return out;
    }
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    out
}

pub(super) fn unary(
    op: &ast::UnaryOp,
    value: SettingsValue,
    line: usize,
) -> EvalResult<SettingsValue> {
    use SettingsValue as V;
    match (op, value) {
        (ast::UnaryOp::Not, v) => Ok(V::Bool(!v.truthy())),
        (ast::UnaryOp::USub, V::Float(f)) => Ok(V::Float(-f)),
        (ast::UnaryOp::USub, v) if is_int_like(&v) => v
            .as_i64()
            .and_then(i64::checked_neg)
            .map(V::Int)
            .ok_or(EvalError::Overflow { line }),
        (ast::UnaryOp::UAdd, V::Float(f)) => Ok(V::Float(f)),
        (ast::UnaryOp::UAdd, v) if is_int_like(&v) => Ok(V::Int(v.as_i64().unwrap_or_default())),
        (ast::UnaryOp::Invert, v) if is_int_like(&v) => Ok(V::Int(!v.as_i64().unwrap_or_default())),
        (op, v) => {
            let symbol = match op {
                ast::UnaryOp::USub => "unary -",
                ast::UnaryOp::UAdd => "unary +",
                _ => "unary ~",
            };
            Err(type_error(line, format!("bad operand type for {}: '{}'", symbol, v.type_name())))
        }
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`, `min`, `max` and `sorted`.
pub(super) fn order(l: &SettingsValue, r: &SettingsValue, line: usize) -> EvalResult<Ordering> {
    use SettingsValue as V;
    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
        return Ok(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        return a.partial_cmp(&b).ok_or_else(|| {
            type_error(line, "cannot order NaN".to_string())
        });
    }
    match (l, r) {
        (V::Str(a), V::Str(b)) => Ok(a.cmp(b)),
        (V::Bytes(a), V::Bytes(b)) => Ok(a.cmp(b)),
        (V::List(a), V::List(b)) | (V::Tuple(a), V::Tuple(b)) => {
            for (x, y) in a.iter().zip(b) {
                if !x.py_eq(y) {
                    return order(x, y, line);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(type_error(
            line,
            format!(
                "'<' not supported between instances of '{}' and '{}'",
                l.type_name(),
                r.type_name()
            ),
        )),
    }
}

pub(super) fn compare(
    op: &ast::CmpOp,
    l: &SettingsValue,
    r: &SettingsValue,
    line: usize,
) -> EvalResult<bool> {
    Ok(match op {
        ast::CmpOp::Eq => l.py_eq(r),
        ast::CmpOp::NotEq => !l.py_eq(r),
        ast::CmpOp::Lt => order(l, r, line)? == Ordering::Less,
        ast::CmpOp::LtE => order(l, r, line)? != Ordering::Greater,
        ast::CmpOp::Gt => order(l, r, line)? == Ordering::Greater,
        ast::CmpOp::GtE => order(l, r, line)? != Ordering::Less,
        ast::CmpOp::Is => identical(l, r),
        ast::CmpOp::IsNot => !identical(l, r),
        ast::CmpOp::In => contains(r, l, line)?,
        ast::CmpOp::NotIn => !contains(r, l, line)?,
    })
}

/// Identity is only observable for singletons and same-kind scalars here.
fn identical(l: &SettingsValue, r: &SettingsValue) -> bool {
    std::mem::discriminant(l) == std::mem::discriminant(r) && l.py_eq(r)
}

pub(super) fn contains(
    container: &SettingsValue,
    item: &SettingsValue,
    line: usize,
) -> EvalResult<bool> {
    use SettingsValue as V;
    match (container, item) {
        (V::Str(haystack), V::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        (V::Str(_), other) => Err(type_error(
            line,
            format!("'in <string>' requires string as left operand, not {}", other.type_name()),
        )),
        (V::Bytes(haystack), V::Bytes(needle)) => {
            Ok(needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle.as_slice()))
        }
        (V::List(items) | V::Tuple(items) | V::Set(items), item) => {
            Ok(items.iter().any(|x| x.py_eq(item)))
        }
        (V::Dict(pairs), key) => Ok(pairs.iter().any(|(k, _)| k.py_eq(key))),
        (V::Module(name), V::Str(key)) if name == super::builtins::ENVIRON => {
            Ok(std::env::var_os(key).is_some())
        }
        (other, _) => Err(type_error(
            line,
            format!("argument of type '{}' is not iterable", other.type_name()),
        )),
    }
}

/// Elements produced by iterating `value`.
pub(super) fn iterate(value: &SettingsValue, line: usize) -> EvalResult<Vec<SettingsValue>> {
    use SettingsValue as V;
    match value {
        V::Str(s) => Ok(s.chars().map(|c| V::Str(c.to_string())).collect()),
        V::Bytes(b) => Ok(b.iter().map(|&x| V::Int(i64::from(x))).collect()),
        V::List(items) | V::Tuple(items) | V::Set(items) => Ok(items.clone()),
        V::Dict(pairs) => Ok(pairs.iter().map(|(k, _)| k.clone()).collect()),
        other => {
            Err(type_error(line, format!("'{}' object is not iterable", other.type_name())))
        }
    }
}

fn unhashable(line: usize, value: &SettingsValue) -> EvalError {
    type_error(line, format!("unhashable type: '{}'", value.type_name()))
}

/// Insert or replace `key` in an ordered dict.
pub(super) fn dict_insert(
    pairs: &mut Vec<(SettingsValue, SettingsValue)>,
    key: SettingsValue,
    value: SettingsValue,
    line: usize,
) -> EvalResult<()> {
    if !key.is_hashable() {
        return Err(unhashable(line, &key));
    }
    match pairs.iter_mut().find(|(k, _)| k.py_eq(&key)) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
    Ok(())
}

pub(super) fn dict_get<'v>(
    pairs: &'v [(SettingsValue, SettingsValue)],
    key: &SettingsValue,
) -> Option<&'v SettingsValue> {
    pairs.iter().find(|(k, _)| k.py_eq(key)).map(|(_, v)| v)
}

pub(super) fn set_insert(
    items: &mut Vec<SettingsValue>,
    item: SettingsValue,
    line: usize,
) -> EvalResult<()> {
    if !item.is_hashable() {
        return Err(unhashable(line, &item));
    }
    if !items.iter().any(|x| x.py_eq(&item)) {
        items.push(item);
    }
    Ok(())
}

/// Resolve a possibly negative index against a sequence length.
pub(super) fn normalize_index(index: i64, len: usize, line: usize) -> EvalResult<usize> {
    let len_i = i64::try_from(len).map_err(|_| EvalError::Overflow { line })?;
    let resolved = if index < 0 { index + len_i } else { index };
    if resolved < 0 || resolved >= len_i {
        return Err(EvalError::Index { line, message: "index out of range".to_string() });
    }
    Ok(resolved as usize)
}

/// Indices selected by `[lower:upper:step]` on a sequence of `len` items.
pub(super) fn slice_indices(
    len: usize,
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
    line: usize,
) -> EvalResult<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(EvalError::Value { line, message: "slice step cannot be zero".to_string() });
    }
    let len = i64::try_from(len).map_err(|_| EvalError::Overflow { line })?;
    let clamp = |bound: i64, low: i64, high: i64| {
        let b = if bound < 0 { bound + len } else { bound };
        b.clamp(low, high)
    };

    let mut out = Vec::new();
    if step > 0 {
        let start = lower.map_or(0, |b| clamp(b, 0, len));
        let stop = upper.map_or(len, |b| clamp(b, 0, len));
        let mut i = start;
        while i < stop {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else {
        let start = lower.map_or(len - 1, |b| clamp(b, -1, len - 1));
        let stop = upper.map_or(-1, |b| clamp(b, -1, len - 1));
        let mut i = start;
        while i > stop {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    Ok(out)
}

/// `format % args` for the `%s %r %d %i %f %%` conversions, with an optional
/// `.N` precision and `%(name)s` lookups when `args` is a dict.
pub(super) fn percent_format(fmt: &str, args: &SettingsValue, line: usize) -> EvalResult<String> {
    let mut positional: Vec<SettingsValue> = match args {
        SettingsValue::Tuple(items) => items.clone(),
        SettingsValue::Dict(_) if fmt.contains("%(") => Vec::new(),
        other => vec![other.clone()],
    };
    positional.reverse();

    let value_error = |message: &str| EvalError::Value { line, message: message.to_string() };
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let mut mapping_key = None;
        if chars.peek() == Some(&'(') {
            chars.next();
            let key: String = chars.by_ref().take_while(|&k| k != ')').collect();
            mapping_key = Some(key);
        }

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            precision = digits.parse::<usize>().ok();
        }

        let conversion = chars.next().ok_or_else(|| value_error("incomplete format"))?;
        if conversion == '%' {
            out.push('%');
            continue;
        }

        let value = match (&mapping_key, args) {
            (Some(key), SettingsValue::Dict(pairs)) => {
                dict_get(pairs, &SettingsValue::Str(key.clone()))
                    .cloned()
                    .ok_or_else(|| EvalError::Key { line, key: format!("'{}'", key) })?
            }
            (Some(_), _) => return Err(type_error(line, "format requires a mapping".to_string())),
            (None, _) => positional
                .pop()
                .ok_or_else(|| type_error(line, "not enough arguments for format string".to_string()))?,
        };

        match conversion {
            's' => out.push_str(&value.to_display_string()),
            'r' => out.push_str(&value.repr()),
            'd' | 'i' => {
                let n = match &value {
                    SettingsValue::Float(f) => f.trunc() as i64,
                    v => v.as_i64().ok_or_else(|| {
                        type_error(
                            line,
                            format!("%{} format: a number is required, not {}", conversion, v.type_name()),
                        )
                    })?,
                };
                out.push_str(&n.to_string());
            }
            'f' => {
                let f = value.as_f64().ok_or_else(|| {
                    type_error(line, format!("must be real number, not {}", value.type_name()))
                })?;
                out.push_str(&format!("{:.*}", precision.unwrap_or(6), f));
            }
            other => {
                return Err(value_error(&format!("unsupported format character '{}'", other)))
            }
        }
    }

    if !positional.is_empty() {
        return Err(type_error(
            line,
            "not all arguments converted during string formatting".to_string(),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use SettingsValue as V;

    #[test]
    fn integer_division_floors_like_python() {
        let r = binary(&ast::Operator::FloorDiv, V::Int(-7), V::Int(2), 1).expect("div");
        assert_eq!(r, V::Int(-4));
        let r = binary(&ast::Operator::Mod, V::Int(-7), V::Int(2), 1).expect("mod");
        assert_eq!(r, V::Int(1));
        let r = binary(&ast::Operator::Div, V::Int(7), V::Int(2), 1).expect("div");
        assert_eq!(r, V::Float(3.5));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let err = binary(&ast::Operator::FloorDiv, V::Int(1), V::Int(0), 4).unwrap_err();
        assert_eq!(err, EvalError::ZeroDivision { line: 4 });
        let err = binary(&ast::Operator::Div, V::Float(1.0), V::Int(0), 4).unwrap_err();
        assert_eq!(err, EvalError::ZeroDivision { line: 4 });
    }

    #[test]
    fn overflow_is_reported_instead_of_wrapping() {
        let err = binary(&ast::Operator::Pow, V::Int(10), V::Int(40), 2).unwrap_err();
        assert_eq!(err, EvalError::Overflow { line: 2 });
    }

    #[test]
    fn sequences_repeat_and_concatenate() {
        let r = binary(&ast::Operator::Mult, V::Int(2), V::Str("ab".into()), 1).expect("mul");
        assert_eq!(r, V::Str("abab".into()));
        let r = binary(
            &ast::Operator::Add,
            V::List(vec![V::Int(1)]),
            V::List(vec![V::Int(2)]),
            1,
        )
        .expect("add");
        assert_eq!(r, V::List(vec![V::Int(1), V::Int(2)]));
    }

    #[test]
    fn mixed_operands_are_type_errors() {
        let err = binary(&ast::Operator::Add, V::Int(1), V::Str("a".into()), 3).unwrap_err();
        assert!(matches!(err, EvalError::Type { line: 3, .. }));
        assert!(err.to_string().contains("'int' and 'str'"));
    }

    #[test]
    fn percent_formatting() {
        let args = V::Tuple(vec![V::Str("db".into()), V::Int(5432), V::Float(0.5)]);
        let s = percent_format("%s:%d (%.2f) 100%%", &args, 1).expect("fmt");
        assert_eq!(s, "db:5432 (0.50) 100%");

        let mapping = V::Dict(vec![(V::Str("host".into()), V::Str("localhost".into()))]);
        assert_eq!(percent_format("%(host)s", &mapping, 1).expect("fmt"), "localhost");

        assert!(percent_format("%s %s", &V::Int(1), 1).is_err());
    }

    #[test]
    fn slices_follow_python_bounds() {
        assert_eq!(slice_indices(5, Some(1), Some(-1), None, 1).expect("slice"), vec![1, 2, 3]);
        assert_eq!(slice_indices(5, None, None, Some(-2), 1).expect("slice"), vec![4, 2, 0]);
        assert_eq!(slice_indices(3, Some(10), None, None, 1).expect("slice"), Vec::<usize>::new());
        assert!(slice_indices(3, None, None, Some(0), 1).is_err());
    }

    #[test]
    fn huge_slice_steps_stop_at_the_bounds() {
        assert_eq!(slice_indices(3, Some(2), None, Some(i64::MAX), 1).expect("slice"), vec![2]);
        assert_eq!(slice_indices(3, Some(0), None, Some(i64::MIN), 1).expect("slice"), vec![0]);
    }

    #[test]
    fn oversized_repetition_is_an_overflow() {
        let list = V::List(vec![V::Int(0), V::Int(0)]);
        let err = binary(&ast::Operator::Mult, list, V::Int(i64::MAX), 5).unwrap_err();
        assert_eq!(err, EvalError::Overflow { line: 5 });

        let err = binary(&ast::Operator::Mult, V::Str("ab".into()), V::Int(1 << 40), 5).unwrap_err();
        assert_eq!(err, EvalError::Overflow { line: 5 });

        let empty = binary(&ast::Operator::Mult, V::List(vec![]), V::Int(i64::MAX), 5).expect("mul");
        assert_eq!(empty, V::List(vec![]));
    }

    #[test]
    fn comparisons_chain_on_numbers_and_strings() {
        assert!(compare(&ast::CmpOp::Lt, &V::Int(1), &V::Float(1.5), 1).expect("cmp"));
        assert!(compare(&ast::CmpOp::In, &V::Str("b".into()), &V::Str("abc".into()), 1)
            .expect("in"));
        assert!(compare(&ast::CmpOp::Is, &V::None, &V::None, 1).expect("is"));
        assert!(!compare(&ast::CmpOp::Is, &V::Int(1), &V::Bool(true), 1).expect("is"));
        assert!(compare(&ast::CmpOp::Lt, &V::Int(1), &V::Str("a".into()), 1).is_err());
    }

    #[test]
    fn dict_insert_replaces_equal_keys() {
        let mut pairs = Vec::new();
        dict_insert(&mut pairs, V::Int(1), V::Str("a".into()), 1).expect("insert");
        dict_insert(&mut pairs, V::Float(1.0), V::Str("b".into()), 1).expect("insert");
        assert_eq!(pairs, vec![(V::Int(1), V::Str("b".into()))]);
        assert!(dict_insert(&mut pairs, V::List(vec![]), V::None, 1).is_err());
    }
}
