use crate::core::number::{parse_float_prefix, parse_int_prefix, to_int32, to_integer_or_infinity};
use crate::core::{DeclKind, Environment, Value, arg, format_js_number, to_number, value_to_string};
use crate::error::JSError;
use crate::{raise_eval_error, raise_type_error};

const NUMBER_METHODS: &[&str] = &["toFixed", "toPrecision", "toString", "valueOf", "toLocaleString"];

pub fn initialize_number_module(env: &Environment) -> Result<(), JSError> {
    for name in ["Number", "Boolean", "parseInt", "parseFloat", "isNaN", "isFinite"] {
        env.declare(name, Value::Function(name.to_string()), DeclKind::Const)?;
    }
    env.declare("NaN", Value::Number(f64::NAN), DeclKind::Const)?;
    env.declare("Infinity", Value::Number(f64::INFINITY), DeclKind::Const)?;
    env.declare("undefined", Value::Undefined, DeclKind::Const)?;
    Ok(())
}

pub fn is_number_method(name: &str) -> bool {
    NUMBER_METHODS.contains(&name)
}

pub fn number_static_property(key: &str) -> Option<Value> {
    let constant = match key {
        "MAX_SAFE_INTEGER" => 9007199254740991.0,
        "MIN_SAFE_INTEGER" => -9007199254740991.0,
        "EPSILON" => f64::EPSILON,
        "MAX_VALUE" => f64::MAX,
        "MIN_VALUE" => 5e-324,
        "POSITIVE_INFINITY" => f64::INFINITY,
        "NEGATIVE_INFINITY" => f64::NEG_INFINITY,
        "NaN" => f64::NAN,
        "isInteger" | "isNaN" | "isFinite" | "isSafeInteger" | "parseFloat" | "parseInt" => {
            return Some(Value::Function(format!("Number.{key}")));
        }
        _ => return None,
    };
    Some(Value::Number(constant))
}

fn is_integer(v: &Value) -> bool {
    matches!(v, Value::Number(n) if n.is_finite() && n.trunc() == *n)
}

pub fn handle_number_static_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    let first = arg(args, 0);
    match method {
        "isInteger" => Ok(Value::Boolean(is_integer(&first))),
        "isSafeInteger" => Ok(Value::Boolean(
            is_integer(&first) && matches!(first, Value::Number(n) if n.abs() <= 9007199254740991.0),
        )),
        "isNaN" => Ok(Value::Boolean(matches!(first, Value::Number(n) if n.is_nan()))),
        "isFinite" => Ok(Value::Boolean(matches!(first, Value::Number(n) if n.is_finite()))),
        "parseFloat" | "parseInt" => handle_global_function(method, args),
        _ => Err(raise_type_error!(format!("Number.{method} is not a function"))),
    }
}

/// `parseInt`, `parseFloat`, `isNaN` and `isFinite` as global functions.
pub fn handle_global_function(name: &str, args: &[Value]) -> Result<Value, JSError> {
    let first = arg(args, 0);
    let result = match name {
        "parseInt" => {
            let radix = match args.get(1) {
                None | Some(Value::Undefined) => None,
                Some(r) => Some(to_int32(to_number(r)) as u32),
            };
            parse_int_prefix(&value_to_string(&first), radix)
        }
        "parseFloat" => parse_float_prefix(&value_to_string(&first)),
        "isNaN" => return Ok(Value::Boolean(to_number(&first).is_nan())),
        "isFinite" => return Ok(Value::Boolean(to_number(&first).is_finite())),
        _ => return Err(raise_eval_error!(format!("Unknown global function {name}"))),
    };
    Ok(Value::Number(result))
}

// ─── toFixed ────────────────────────────────────────────────

/// Fixed-point rendering with ties rounded away from zero, computed on the
/// exact decimal expansion of `n`.
fn to_fixed(n: f64, digits: usize) -> String {
    let expanded = format!("{:.*}", digits + 30, n.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));
    let mut kept: Vec<u8> = int_part.bytes().chain(frac_part.bytes().take(digits)).collect();
    let mut int_len = int_part.len();
    if frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                int_len += 1;
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }
    let mut out = String::new();
    if n < 0.0 {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&kept[..int_len]));
    if digits > 0 {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&kept[int_len..]));
    }
    out
}

// ─── toPrecision ────────────────────────────────────────────

fn to_precision(n: f64, precision: usize) -> String {
    let negative = n < 0.0;
    let abs_x = n.abs();
    let s_exp = format!("{:.prec$e}", abs_x, prec = precision - 1);
    let (mantissa, exponent) = s_exp.split_once('e').unwrap_or((s_exp.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let result = if abs_x != 0.0 && (exponent < -6 || exponent >= precision as i32) {
        format!("{mantissa}e{exponent:+}")
    } else {
        let digits_after = (precision as i32 - 1 - exponent).max(0) as usize;
        format!("{abs_x:.digits_after$}")
    };
    if negative { format!("-{result}") } else { result }
}

// ─── toString(radix) ────────────────────────────────────────

/// Number→string in non-decimal radix (2–36), with fractional part.
fn number_to_radix_string(n: f64, radix: u32) -> String {
    if !n.is_finite() || n == 0.0 {
        return format_js_number(n);
    }
    let digit_char = |d: u32| std::char::from_digit(d, radix).unwrap_or('?');
    let negative = n < 0.0;
    let abs_n = n.abs();
    let mut int_part = abs_n.trunc();
    let mut frac = abs_n - int_part;

    let mut int_digits = Vec::new();
    if int_part == 0.0 {
        int_digits.push('0');
    }
    while int_part >= 1.0 {
        int_digits.push(digit_char((int_part % radix as f64) as u32));
        int_part = (int_part / radix as f64).trunc();
    }
    int_digits.reverse();

    let mut out: String = int_digits.into_iter().collect();
    if frac > 0.0 {
        out.push('.');
        for _ in 0..52 {
            frac *= radix as f64;
            let digit = frac.trunc();
            out.push(digit_char(digit as u32));
            frac -= digit;
            if frac < f64::EPSILON * radix as f64 {
                break;
            }
        }
    }
    if negative { format!("-{out}") } else { out }
}

pub fn handle_number_method(n: f64, method: &str, args: &[Value]) -> Result<Value, JSError> {
    let text = match method {
        "valueOf" => return Ok(Value::Number(n)),
        "toString" => match args.first() {
            None | Some(Value::Undefined) => format_js_number(n),
            Some(r) => {
                let radix = to_integer_or_infinity(to_number(r));
                if !(2.0..=36.0).contains(&radix) {
                    return Err(raise_eval_error!("RangeError: toString() radix must be between 2 and 36"));
                }
                if radix == 10.0 { format_js_number(n) } else { number_to_radix_string(n, radix as u32) }
            }
        },
        "toLocaleString" => format_js_number(n),
        "toFixed" => {
            let digits = to_integer_or_infinity(to_number(&arg(args, 0)));
            if !(0.0..=100.0).contains(&digits) {
                return Err(raise_eval_error!("RangeError: toFixed() digits argument must be between 0 and 100"));
            }
            if !n.is_finite() || n.abs() >= 1e21 {
                format_js_number(n)
            } else {
                to_fixed(n, digits as usize)
            }
        }
        "toPrecision" => match args.first() {
            None | Some(Value::Undefined) => format_js_number(n),
            Some(p) => {
                let precision = to_integer_or_infinity(to_number(p));
                if !n.is_finite() {
                    format_js_number(n)
                } else if !(1.0..=100.0).contains(&precision) {
                    return Err(raise_eval_error!("RangeError: toPrecision() argument must be between 1 and 100"));
                } else {
                    to_precision(n, precision as usize)
                }
            }
        },
        _ => return Err(raise_type_error!(format!("Number.prototype.{method} is not a function"))),
    };
    Ok(Value::String(text))
}

pub fn handle_boolean_method(b: bool, method: &str) -> Result<Value, JSError> {
    match method {
        "toString" => Ok(Value::String(b.to_string())),
        "valueOf" => Ok(Value::Boolean(b)),
        _ => Err(raise_type_error!(format!("Boolean.prototype.{method} is not a function"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_rounding() {
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(9.995, 1), "10.0");
        assert_eq!(to_fixed(-1.5, 0), "-2");
        assert_eq!(to_fixed(0.0, 3), "0.000");
    }

    #[test]
    fn precision_switches_to_exponent() {
        assert_eq!(to_precision(123.456, 4), "123.5");
        assert_eq!(to_precision(123456.0, 2), "1.2e+5");
        assert_eq!(to_precision(0.000123, 2), "0.00012");
    }

    #[test]
    fn radix_strings() {
        assert_eq!(number_to_radix_string(255.0, 16), "ff");
        assert_eq!(number_to_radix_string(5.0, 2), "101");
        assert_eq!(number_to_radix_string(-10.0, 36), "-a");
        assert_eq!(number_to_radix_string(0.5, 2), "0.1");
    }

    #[test]
    fn global_parsers() {
        let parse_int = |args: &[Value]| match handle_global_function("parseInt", args).unwrap() {
            Value::Number(n) => n,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(parse_int(&[Value::string("42px")]), 42.0);
        assert_eq!(parse_int(&[Value::string("ff"), Value::Number(16.0)]), 255.0);
        assert!(parse_int(&[Value::string("abc")]).is_nan());
        assert!(matches!(handle_global_function("isNaN", &[Value::string("abc")]).unwrap(), Value::Boolean(true)));
        assert!(matches!(handle_number_static_method("isNaN", &[Value::string("abc")]).unwrap(), Value::Boolean(false)));
        assert!(matches!(handle_number_static_method("isInteger", &[Value::Number(5.0)]).unwrap(), Value::Boolean(true)));
        assert!(matches!(handle_number_static_method("isInteger", &[Value::Number(5.5)]).unwrap(), Value::Boolean(false)));
    }
}
