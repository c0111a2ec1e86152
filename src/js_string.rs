use crate::core::number::{relative_index, to_integer_or_infinity, to_uint32};
use crate::core::{DeclKind, Environment, Value, arg, call_function, to_number, value_to_string};
use crate::error::JSError;
use crate::unicode::{utf8_to_utf16, utf16_find, utf16_find_all, utf16_rfind, utf16_slice, utf16_to_utf8};
use crate::{raise_eval_error, raise_type_error};

const STRING_METHODS: &[&str] = &[
    "at",
    "charAt",
    "charCodeAt",
    "concat",
    "endsWith",
    "includes",
    "indexOf",
    "lastIndexOf",
    "localeCompare",
    "padEnd",
    "padStart",
    "repeat",
    "replace",
    "replaceAll",
    "slice",
    "split",
    "startsWith",
    "substr",
    "substring",
    "toLowerCase",
    "toString",
    "toUpperCase",
    "trim",
    "trimEnd",
    "trimStart",
    "valueOf",
];

pub fn initialize_string(env: &Environment) -> Result<(), JSError> {
    env.declare("String", Value::Function("String".to_string()), DeclKind::Const)
}

pub fn is_string_method(name: &str) -> bool {
    STRING_METHODS.contains(&name)
}

pub fn string_static_property(key: &str) -> Option<Value> {
    (key == "fromCharCode").then(|| Value::Function("String.fromCharCode".to_string()))
}

pub fn handle_string_static_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "fromCharCode" => {
            let units: Vec<u16> = args.iter().map(|v| to_uint32(to_number(v)) as u16).collect();
            Ok(Value::String(utf16_to_utf8(&units)))
        }
        _ => Err(raise_type_error!(format!("String.{method} is not a function"))),
    }
}

/// The code unit at `index` as a one-unit string, as `s[i]` reads it.
pub fn code_unit_at(s: &str, index: usize) -> Option<String> {
    s.encode_utf16().nth(index).map(|u| utf16_to_utf8(&[u]))
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn arg_string(args: &[Value], index: usize) -> String {
    value_to_string(&arg(args, index))
}

// Position argument that defaults to `default` when absent or undefined.
fn arg_position(args: &[Value], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(Value::Undefined) => default,
        Some(v) => to_integer_or_infinity(to_number(v)),
    }
}

fn clamp_position(n: f64, len: usize) -> usize {
    n.clamp(0.0, len as f64) as usize
}

/// Longest string, in UTF-16 code units, a method may build (V8's limit).
pub const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

fn invalid_string_length() -> JSError {
    raise_eval_error!("RangeError: Invalid string length")
}

fn pad(s: &[u16], args: &[Value], at_start: bool) -> Result<String, JSError> {
    let target = arg_position(args, 0, 0.0);
    let filler = match args.get(1) {
        None | Some(Value::Undefined) => vec![b' ' as u16],
        Some(v) => utf8_to_utf16(&value_to_string(v)),
    };
    if target <= s.len() as f64 || filler.is_empty() {
        return Ok(utf16_to_utf8(s));
    }
    if target > MAX_STRING_LENGTH as f64 {
        return Err(invalid_string_length());
    }
    let fill_len = target as usize - s.len();
    let padding: Vec<u16> = filler.iter().copied().cycle().take(fill_len).collect();
    let mut out = Vec::with_capacity(target as usize);
    if at_start {
        out.extend_from_slice(&padding);
        out.extend_from_slice(s);
    } else {
        out.extend_from_slice(s);
        out.extend_from_slice(&padding);
    }
    Ok(utf16_to_utf8(&out))
}

fn replace_matches(s: &[u16], search: &[u16], positions: &[usize], replacement: &Value) -> Result<String, JSError> {
    let matched = utf16_to_utf8(search);
    let whole = Value::String(utf16_to_utf8(s));
    let mut out = String::new();
    let mut last = 0;
    for &pos in positions {
        out.push_str(&utf16_slice(s, last, pos));
        if replacement.is_callable() {
            let args = [Value::String(matched.clone()), Value::Number(pos as f64), whole.clone()];
            out.push_str(&value_to_string(&call_function(replacement, &args)?));
        } else {
            out.push_str(&value_to_string(replacement));
        }
        last = pos + search.len();
    }
    out.push_str(&utf16_slice(s, last, s.len()));
    Ok(out)
}

fn split(s: &[u16], args: &[Value]) -> Value {
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => u32::MAX as usize,
        Some(v) => to_uint32(to_number(v)) as usize,
    };
    let parts: Vec<String> = match args.first() {
        None | Some(Value::Undefined) => vec![utf16_to_utf8(s)],
        Some(sep) => {
            let sep = utf8_to_utf16(&value_to_string(sep));
            if sep.is_empty() {
                s.iter().map(|u| utf16_to_utf8(&[*u])).collect()
            } else {
                let mut parts = Vec::new();
                let mut last = 0;
                for pos in utf16_find_all(s, &sep) {
                    parts.push(utf16_slice(s, last, pos));
                    last = pos + sep.len();
                }
                parts.push(utf16_slice(s, last, s.len()));
                parts
            }
        }
    };
    Value::array(parts.into_iter().take(limit).map(Value::String).collect())
}

/// Dispatch `"str".method(args)`.
pub fn handle_string_method(s: &str, method: &str, args: &[Value]) -> Result<Value, JSError> {
    let units = utf8_to_utf16(s);
    let len = units.len();
    let result = match method {
        "toString" | "valueOf" => Value::string(s),
        "charAt" => {
            let i = arg_position(args, 0, 0.0);
            let out = if (0.0..len as f64).contains(&i) { utf16_slice(&units, i as usize, i as usize + 1) } else { String::new() };
            Value::String(out)
        }
        "charCodeAt" => {
            let i = arg_position(args, 0, 0.0);
            Value::Number(if (0.0..len as f64).contains(&i) { units[i as usize] as f64 } else { f64::NAN })
        }
        "at" => {
            let i = arg_position(args, 0, 0.0);
            let i = if i < 0.0 { i + len as f64 } else { i };
            if (0.0..len as f64).contains(&i) {
                Value::String(utf16_slice(&units, i as usize, i as usize + 1))
            } else {
                Value::Undefined
            }
        }
        "indexOf" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let from = clamp_position(arg_position(args, 1, 0.0), len);
            Value::Number(utf16_find(&units, &search, from).map_or(-1.0, |p| p as f64))
        }
        "lastIndexOf" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let from = match args.get(1).map(to_number) {
                Some(n) if !n.is_nan() => clamp_position(n.trunc(), len),
                _ => len,
            };
            Value::Number(utf16_rfind(&units, &search, from).map_or(-1.0, |p| p as f64))
        }
        "includes" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let from = clamp_position(arg_position(args, 1, 0.0), len);
            Value::Boolean(utf16_find(&units, &search, from).is_some())
        }
        "startsWith" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let start = clamp_position(arg_position(args, 1, 0.0), len);
            Value::Boolean(units[start..].starts_with(&search))
        }
        "endsWith" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let end = clamp_position(arg_position(args, 1, len as f64), len);
            Value::Boolean(units[..end].ends_with(&search))
        }
        "slice" => {
            let start = relative_index(arg_position(args, 0, 0.0), len);
            let end = relative_index(arg_position(args, 1, len as f64), len);
            Value::String(utf16_slice(&units, start, end))
        }
        "substring" => {
            let a = clamp_position(arg_position(args, 0, 0.0), len);
            let b = clamp_position(arg_position(args, 1, len as f64), len);
            Value::String(utf16_slice(&units, a.min(b), a.max(b)))
        }
        "substr" => {
            let start = relative_index(arg_position(args, 0, 0.0), len);
            let count = clamp_position(arg_position(args, 1, len as f64), len - start);
            Value::String(utf16_slice(&units, start, start + count))
        }
        "toLowerCase" => Value::String(s.to_lowercase()),
        "toUpperCase" => Value::String(s.to_uppercase()),
        "trim" => Value::string(s.trim_matches(is_js_whitespace)),
        "trimStart" => Value::string(s.trim_start_matches(is_js_whitespace)),
        "trimEnd" => Value::string(s.trim_end_matches(is_js_whitespace)),
        "padStart" => Value::String(pad(&units, args, true)?),
        "padEnd" => Value::String(pad(&units, args, false)?),
        "repeat" => {
            let count = to_integer_or_infinity(to_number(&arg(args, 0)));
            if count < 0.0 || count.is_infinite() {
                return Err(raise_eval_error!(format!("RangeError: Invalid count value: {}", value_to_string(&arg(args, 0)))));
            }
            if units.is_empty() || count == 0.0 {
                return Ok(Value::string(""));
            }
            if count * units.len() as f64 > MAX_STRING_LENGTH as f64 {
                return Err(invalid_string_length());
            }
            Value::String(s.repeat(count as usize))
        }
        "replace" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let positions: Vec<usize> = utf16_find(&units, &search, 0).into_iter().collect();
            Value::String(replace_matches(&units, &search, &positions, &arg(args, 1))?)
        }
        "replaceAll" => {
            let search = utf8_to_utf16(&arg_string(args, 0));
            let positions = utf16_find_all(&units, &search);
            Value::String(replace_matches(&units, &search, &positions, &arg(args, 1))?)
        }
        "split" => split(&units, args),
        "concat" => {
            let mut out = s.to_string();
            for v in args {
                out.push_str(&value_to_string(v));
            }
            Value::String(out)
        }
        "localeCompare" => {
            let other = arg_string(args, 0);
            Value::Number(match s.cmp(other.as_str()) {
                std::cmp::Ordering::Less => -1.0,
                std::cmp::Ordering::Equal => 0.0,
                std::cmp::Ordering::Greater => 1.0,
            })
        }
        _ => return Err(raise_type_error!(format!("\"{s}\".{method} is not a function"))),
    };
    Ok(result)
}
