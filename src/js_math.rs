use crate::core::{DeclKind, Environment, JSObject, Value, to_number};
use crate::error::JSError;
use crate::raise_eval_error;
use std::cell::Cell;

const MATH_FUNCTIONS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "cbrt", "ceil", "cos", "cosh", "exp", "floor", "hypot", "log", "log10", "log2", "max",
    "min", "pow", "random", "round", "sign", "sin", "sinh", "sqrt", "tan", "tanh", "trunc",
];

/// Create the Math object with all mathematical constants and functions
pub fn initialize_math(env: &Environment) -> Result<(), JSError> {
    let mut math_obj = JSObject::new();
    math_obj.insert("PI".into(), Value::Number(std::f64::consts::PI));
    math_obj.insert("E".into(), Value::Number(std::f64::consts::E));
    math_obj.insert("LN2".into(), Value::Number(std::f64::consts::LN_2));
    math_obj.insert("LN10".into(), Value::Number(std::f64::consts::LN_10));
    math_obj.insert("LOG2E".into(), Value::Number(std::f64::consts::LOG2_E));
    math_obj.insert("LOG10E".into(), Value::Number(std::f64::consts::LOG10_E));
    math_obj.insert("SQRT1_2".into(), Value::Number(std::f64::consts::FRAC_1_SQRT_2));
    math_obj.insert("SQRT2".into(), Value::Number(std::f64::consts::SQRT_2));
    for name in MATH_FUNCTIONS {
        math_obj.insert(name.to_string(), Value::Function(format!("Math.{name}")));
    }
    env.declare("Math", Value::object(math_obj), DeclKind::Const)
}

/// `**` and `Math.pow`. Unlike `f64::powf`, `1 ** Infinity` and `x ** NaN` are NaN.
pub(crate) fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}

/// Rounds half-way cases towards +Infinity: 2.5 -> 3, -2.5 -> -2.
fn js_round(n: f64) -> f64 {
    if !n.is_finite() || n.fract() == 0.0 {
        return n;
    }
    let floor = n.floor();
    let rounded = if n - floor >= 0.5 { floor + 1.0 } else { floor };
    if rounded == 0.0 && n < 0.0 { -0.0 } else { rounded }
}

fn js_sign(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        n
    } else {
        n.signum()
    }
}

fn extremum(args: &[Value], want_max: bool) -> f64 {
    let mut best = if want_max { f64::NEG_INFINITY } else { f64::INFINITY };
    for n in args.iter().map(to_number) {
        if n.is_nan() {
            return f64::NAN;
        }
        let better = if want_max {
            n > best || (n == 0.0 && best == 0.0 && best.is_sign_negative())
        } else {
            n < best || (n == 0.0 && best == 0.0 && n.is_sign_negative())
        };
        if better {
            best = n;
        }
    }
    best
}

thread_local! {
    static RANDOM_STATE: Cell<u64> = Cell::new(random_seed());
}

fn random_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as u64).unwrap_or(0);
    nanos | 1
}

// xorshift64*; the top 53 bits become a double in [0, 1)
fn next_random() -> f64 {
    RANDOM_STATE.with(|state| {
        let mut x = state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        state.set(x);
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11) as f64 / (1u64 << 53) as f64
    })
}

/// Handle Math object method calls
pub fn handle_math_call(method: &str, args: &[Value]) -> Result<Value, JSError> {
    let n = |i: usize| args.get(i).map_or(f64::NAN, to_number);
    let result = match method {
        "abs" => n(0).abs(),
        "acos" => n(0).acos(),
        "asin" => n(0).asin(),
        "atan" => n(0).atan(),
        "atan2" => n(0).atan2(n(1)),
        "cbrt" => n(0).cbrt(),
        "ceil" => n(0).ceil(),
        "cos" => n(0).cos(),
        "cosh" => n(0).cosh(),
        "exp" => n(0).exp(),
        "floor" => n(0).floor(),
        "hypot" => {
            let values: Vec<f64> = args.iter().map(to_number).collect();
            if values.iter().any(|v| v.is_infinite()) {
                f64::INFINITY
            } else {
                values.iter().map(|v| v * v).sum::<f64>().sqrt()
            }
        }
        "log" => n(0).ln(),
        "log10" => n(0).log10(),
        "log2" => n(0).log2(),
        "max" => extremum(args, true),
        "min" => extremum(args, false),
        "pow" => js_pow(n(0), n(1)),
        "random" => next_random(),
        "round" => js_round(n(0)),
        "sign" => js_sign(n(0)),
        "sin" => n(0).sin(),
        "sinh" => n(0).sinh(),
        "sqrt" => n(0).sqrt(),
        "tan" => n(0).tan(),
        "tanh" => n(0).tanh(),
        "trunc" => n(0).trunc(),
        _ => return Err(raise_eval_error!(format!("Math.{method} is not a function"))),
    };
    Ok(Value::Number(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(method: &str, args: &[f64]) -> f64 {
        let args: Vec<Value> = args.iter().map(|n| Value::Number(*n)).collect();
        match handle_math_call(method, &args).unwrap() {
            Value::Number(n) => n,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rounding_family() {
        assert_eq!(call("floor", &[4.7]), 4.0);
        assert_eq!(call("ceil", &[4.2]), 5.0);
        assert_eq!(call("round", &[4.7]), 5.0);
        assert_eq!(call("round", &[4.5]), 5.0);
        assert_eq!(call("round", &[-4.5]), -4.0);
        assert_eq!(call("trunc", &[4.9]), 4.0);
        assert_eq!(call("trunc", &[-4.9]), -4.0);
        assert_eq!(call("floor", &[-4.1]), -5.0);
        assert!(call("round", &[-0.4]).is_sign_negative());
    }

    #[test]
    fn min_max_edges() {
        assert_eq!(call("max", &[]), f64::NEG_INFINITY);
        assert_eq!(call("min", &[]), f64::INFINITY);
        assert_eq!(call("max", &[1.0, 5.0, 3.0]), 5.0);
        assert!(call("min", &[1.0, f64::NAN]).is_nan());
        assert!(!call("max", &[-0.0, 0.0]).is_sign_negative());
    }

    #[test]
    fn powers_and_roots() {
        assert_eq!(call("pow", &[2.0, 10.0]), 1024.0);
        assert_eq!(call("cbrt", &[27.0]), 3.0);
        assert_eq!(call("hypot", &[3.0, 4.0]), 5.0);
        assert!(js_pow(1.0, f64::INFINITY).is_nan());
        assert_eq!(js_pow(f64::NAN, 0.0), 1.0);
        assert_eq!(call("sign", &[-3.0]), -1.0);
    }

    #[test]
    fn random_is_in_unit_interval() {
        for _ in 0..100 {
            let r = call("random", &[]);
            assert!((0.0..1.0).contains(&r));
        }
    }
}
