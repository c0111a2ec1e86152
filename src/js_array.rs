use crate::core::number::{relative_index, to_integer_or_infinity};
use crate::core::{
    DeclKind, Environment, Value, arg, call_function, is_truthy, iterate_values, same_value_zero, strict_equal, to_number,
    value_to_string,
};
use crate::error::JSError;
use crate::{raise_eval_error, raise_type_error};
use std::cmp::Ordering;
use std::rc::Rc;

const ARRAY_METHODS: &[&str] = &[
    "at",
    "concat",
    "every",
    "filter",
    "find",
    "findIndex",
    "findLast",
    "findLastIndex",
    "flat",
    "flatMap",
    "forEach",
    "includes",
    "indexOf",
    "join",
    "lastIndexOf",
    "map",
    "reduce",
    "reduceRight",
    "reverse",
    "slice",
    "some",
    "sort",
    "toReversed",
    "toSorted",
    "toString",
];

// Methods that would change the receiver in place.
const MUTATING_METHODS: &[&str] = &["copyWithin", "fill", "pop", "push", "shift", "splice", "unshift"];

pub fn initialize_array(env: &Environment) -> Result<(), JSError> {
    env.declare("Array", Value::Function("Array".to_string()), DeclKind::Const)
}

pub fn is_array_method(name: &str) -> bool {
    ARRAY_METHODS.contains(&name) || MUTATING_METHODS.contains(&name)
}

pub fn array_static_property(key: &str) -> Option<Value> {
    matches!(key, "isArray" | "of" | "from").then(|| Value::Function(format!("Array.{key}")))
}

/// `Array(...)` and `new Array(...)`: a single numeric argument is a length.
pub fn construct_array(args: &[Value]) -> Result<Value, JSError> {
    match args {
        [Value::Number(len)] => {
            if *len < 0.0 || len.fract() != 0.0 || *len > u32::MAX as f64 {
                return Err(raise_eval_error!("RangeError: Invalid array length"));
            }
            Ok(Value::array(vec![Value::Undefined; *len as usize]))
        }
        _ => Ok(Value::array(args.to_vec())),
    }
}

pub fn handle_array_static_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "isArray" => Ok(Value::Boolean(matches!(args.first(), Some(Value::Array(_))))),
        "of" => Ok(Value::array(args.to_vec())),
        "from" => {
            let items = match args.first() {
                None | Some(Value::Undefined | Value::Null) => {
                    return Err(raise_type_error!("Array.from requires an array-like or iterable"));
                }
                Some(Value::Object(props)) => {
                    // array-like: { length: n }
                    let len = props.get("length").map_or(0.0, to_number);
                    let len = to_integer_or_infinity(len).max(0.0);
                    if len > u32::MAX as f64 {
                        return Err(raise_eval_error!("RangeError: Invalid array length"));
                    }
                    let len = len as usize;
                    (0..len).map(|i| props.get(&i.to_string()).cloned().unwrap_or(Value::Undefined)).collect()
                }
                Some(source) => iterate_values(source)?,
            };
            match args.get(1) {
                Some(f) if !matches!(f, Value::Undefined) => {
                    let mut mapped = Vec::with_capacity(items.len());
                    for (i, item) in items.into_iter().enumerate() {
                        mapped.push(call_function(f, &[item, Value::Number(i as f64)])?);
                    }
                    Ok(Value::array(mapped))
                }
                _ => Ok(Value::array(items)),
            }
        }
        _ => Err(raise_type_error!(format!("Array.{method} is not a function"))),
    }
}

fn callback(args: &[Value], method: &str) -> Result<Value, JSError> {
    match args.first() {
        Some(f) if f.is_callable() => Ok(f.clone()),
        other => Err(raise_type_error!(format!(
            "{} is not a function (in Array.prototype.{method})",
            other.map_or_else(|| "undefined".to_string(), value_to_string)
        ))),
    }
}

fn call_with_item(f: &Value, items: &Rc<Vec<Value>>, index: usize) -> Result<Value, JSError> {
    call_function(f, &[items[index].clone(), Value::Number(index as f64), Value::Array(items.clone())])
}

fn flatten_into(out: &mut Vec<Value>, items: &[Value], depth: f64) {
    for item in items {
        match item {
            Value::Array(inner) if depth >= 1.0 => flatten_into(out, inner, depth - 1.0),
            other => out.push(other.clone()),
        }
    }
}

fn default_sort_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => Ordering::Equal,
        (Value::Undefined, _) => Ordering::Greater,
        (_, Value::Undefined) => Ordering::Less,
        _ => value_to_string(a).encode_utf16().cmp(value_to_string(b).encode_utf16()),
    }
}

fn sorted(items: &[Value], comparator: &Value) -> Result<Vec<Value>, JSError> {
    let mut out = items.to_vec();
    if matches!(comparator, Value::Undefined) {
        out.sort_by(default_sort_order);
        return Ok(out);
    }
    if !comparator.is_callable() {
        return Err(raise_type_error!("The comparison function must be either a function or undefined"));
    }
    let mut failure = None;
    out.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        match call_function(comparator, &[a.clone(), b.clone()]) {
            Ok(v) => to_number(&v).partial_cmp(&0.0).unwrap_or(Ordering::Equal),
            Err(e) => {
                failure = Some(e);
                Ordering::Equal
            }
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// Dispatch `array.method(args)`. Every method leaves the receiver untouched.
pub fn handle_array_method(items: &Rc<Vec<Value>>, method: &str, args: &[Value]) -> Result<Value, JSError> {
    let len = items.len();
    if MUTATING_METHODS.contains(&method) {
        return Err(raise_eval_error!(format!(
            "TypeError: Array.prototype.{method} would modify the array in place; arrays are immutable"
        )));
    }
    log::trace!("handle_array_method {method} on {len} items");
    let result = match method {
        "map" => {
            let f = callback(args, method)?;
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                out.push(call_with_item(&f, items, i)?);
            }
            Value::array(out)
        }
        "filter" => {
            let f = callback(args, method)?;
            let mut out = Vec::new();
            for i in 0..len {
                if is_truthy(&call_with_item(&f, items, i)?) {
                    out.push(items[i].clone());
                }
            }
            Value::array(out)
        }
        "forEach" => {
            let f = callback(args, method)?;
            for i in 0..len {
                call_with_item(&f, items, i)?;
            }
            Value::Undefined
        }
        "some" | "every" => {
            let f = callback(args, method)?;
            let want = method == "some";
            for i in 0..len {
                if is_truthy(&call_with_item(&f, items, i)?) == want {
                    return Ok(Value::Boolean(want));
                }
            }
            Value::Boolean(!want)
        }
        "find" | "findIndex" | "findLast" | "findLastIndex" => {
            let f = callback(args, method)?;
            let indices: Box<dyn Iterator<Item = usize>> = if method.starts_with("findLast") {
                Box::new((0..len).rev())
            } else {
                Box::new(0..len)
            };
            let wants_index = method.ends_with("Index");
            for i in indices {
                if is_truthy(&call_with_item(&f, items, i)?) {
                    return Ok(if wants_index { Value::Number(i as f64) } else { items[i].clone() });
                }
            }
            if wants_index { Value::Number(-1.0) } else { Value::Undefined }
        }
        "reduce" | "reduceRight" => {
            let f = callback(args, method)?;
            let order: Vec<usize> = if method == "reduce" { (0..len).collect() } else { (0..len).rev().collect() };
            let mut order = order.into_iter();
            let mut acc = match args.get(1) {
                Some(initial) => initial.clone(),
                None => match order.next() {
                    Some(first) => items[first].clone(),
                    None => return Err(raise_type_error!("Reduce of empty array with no initial value")),
                },
            };
            for i in order {
                acc = call_function(&f, &[acc, items[i].clone(), Value::Number(i as f64), Value::Array(items.clone())])?;
            }
            acc
        }
        "includes" => {
            let target = arg(args, 0);
            let from = relative_index(to_number(&arg(args, 1)), len);
            Value::Boolean(items[from..].iter().any(|v| same_value_zero(v, &target)))
        }
        "indexOf" => {
            let target = arg(args, 0);
            let from = relative_index(to_number(&arg(args, 1)), len);
            let pos = items[from..].iter().position(|v| strict_equal(v, &target)).map(|p| p + from);
            Value::Number(pos.map_or(-1.0, |p| p as f64))
        }
        "lastIndexOf" => {
            let target = arg(args, 0);
            let end = match args.get(1) {
                Some(v) => {
                    let n = to_integer_or_infinity(to_number(v));
                    if n < 0.0 { len as f64 + n } else { n.min(len as f64 - 1.0) }
                }
                None => len as f64 - 1.0,
            };
            let pos = if end < 0.0 { None } else { items[..=end as usize].iter().rposition(|v| strict_equal(v, &target)) };
            Value::Number(pos.map_or(-1.0, |p| p as f64))
        }
        "join" => {
            let sep = match args.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(v) => value_to_string(v),
            };
            let parts: Vec<String> = items.iter().map(|v| if v.is_nullish() { String::new() } else { value_to_string(v) }).collect();
            Value::String(parts.join(&sep))
        }
        "toString" => Value::String(value_to_string(&Value::Array(items.clone()))),
        "slice" => {
            let start = relative_index(to_number(&arg(args, 0)), len);
            let end = match args.get(1) {
                None | Some(Value::Undefined) => len,
                Some(v) => relative_index(to_number(v), len),
            };
            Value::array(if start < end { items[start..end].to_vec() } else { Vec::new() })
        }
        "concat" => {
            let mut out = items.to_vec();
            for v in args {
                match v {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::array(out)
        }
        "flat" => {
            let depth = match args.first() {
                None | Some(Value::Undefined) => 1.0,
                Some(v) => to_integer_or_infinity(to_number(v)),
            };
            let mut out = Vec::new();
            flatten_into(&mut out, items, depth);
            Value::array(out)
        }
        "flatMap" => {
            let f = callback(args, method)?;
            let mut mapped = Vec::with_capacity(len);
            for i in 0..len {
                mapped.push(call_with_item(&f, items, i)?);
            }
            let mut out = Vec::new();
            flatten_into(&mut out, &mapped, 1.0);
            Value::array(out)
        }
        "at" => {
            let i = to_integer_or_infinity(to_number(&arg(args, 0)));
            let i = if i < 0.0 { i + len as f64 } else { i };
            if (0.0..len as f64).contains(&i) { items[i as usize].clone() } else { Value::Undefined }
        }
        "reverse" | "toReversed" => Value::array(items.iter().rev().cloned().collect()),
        "sort" | "toSorted" => Value::array(sorted(items, &arg(args, 0))?),
        _ => return Err(raise_type_error!(format!("Array.prototype.{method} is not a function"))),
    };
    Ok(result)
}
