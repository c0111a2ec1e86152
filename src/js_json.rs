use crate::core::{DeclKind, Environment, JSObject, Value, arg, call_function, value_to_string};
use crate::error::JSError;
use crate::{raise_eval_error, raise_type_error};
use serde::Serialize;

pub fn initialize_json(env: &Environment) -> Result<(), JSError> {
    let mut json_obj = JSObject::new();
    json_obj.insert("parse".into(), Value::Function("JSON.parse".to_string()));
    json_obj.insert("stringify".into(), Value::Function("JSON.stringify".to_string()));
    env.declare("JSON", Value::object(json_obj), DeclKind::Const)
}

pub fn handle_json_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "parse" => {
            let text = value_to_string(&arg(args, 0));
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(json_value) => Ok(json_value_to_js_value(json_value)),
                Err(e) => Err(raise_eval_error!(format!("SyntaxError: JSON.parse: {e}"))),
            }
        }
        "stringify" => {
            let replacer = Replacer::from_arg(&arg(args, 1));
            let Some(json_value) = js_value_to_json_value(&arg(args, 0), "", &replacer)? else {
                return Ok(Value::Undefined);
            };
            let json_str = match indent_of(&arg(args, 2)) {
                Some(indent) if !indent.is_empty() => to_string_with_indent(&json_value, &indent)?,
                _ => json_value.to_string(),
            };
            log::debug!("JSON.stringify produced: {json_str}");
            Ok(Value::String(json_str))
        }
        _ => Err(raise_type_error!(format!("JSON.{method} is not a function"))),
    }
}

// The `space` argument: a count of spaces (at most 10) or a string prefix of at most 10 chars.
fn indent_of(space: &Value) -> Option<String> {
    match space {
        Value::Number(n) => Some(" ".repeat(n.clamp(0.0, 10.0) as usize)),
        Value::String(s) => Some(s.chars().take(10).collect()),
        _ => None,
    }
}

fn to_string_with_indent(json_value: &serde_json::Value, indent: &str) -> Result<String, JSError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    json_value
        .serialize(&mut ser)
        .map_err(|e| raise_eval_error!(format!("JSON.stringify failed: {e}")))?;
    String::from_utf8(buf).map_err(|e| raise_eval_error!(format!("JSON.stringify failed: {e}")))
}

enum Replacer {
    None,
    Keys(Vec<String>),
    Function(Value),
}

impl Replacer {
    fn from_arg(val: &Value) -> Self {
        match val {
            Value::Array(items) => Replacer::Keys(items.iter().map(value_to_string).collect()),
            f if f.is_callable() => Replacer::Function(f.clone()),
            _ => Replacer::None,
        }
    }
}

fn json_value_to_js_value(json_value: serde_json::Value) -> Value {
    match json_value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::array(arr.into_iter().map(json_value_to_js_value).collect()),
        serde_json::Value::Object(obj) => Value::object(obj.into_iter().map(|(k, v)| (k, json_value_to_js_value(v))).collect()),
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n == n.trunc() && n.abs() < 9007199254740992.0 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

/// `None` marks values JSON cannot represent (undefined, functions): they are
/// skipped in objects and become `null` in arrays.
fn js_value_to_json_value(js_value: &Value, key: &str, replacer: &Replacer) -> Result<Option<serde_json::Value>, JSError> {
    let replaced;
    let js_value = match replacer {
        Replacer::Function(f) => {
            replaced = call_function(f, &[Value::string(key), js_value.clone()])?;
            &replaced
        }
        _ => js_value,
    };
    Ok(match js_value {
        Value::Undefined | Value::Closure(_) | Value::Function(_) => None,
        Value::Null => Some(serde_json::Value::Null),
        Value::Boolean(b) => Some(serde_json::Value::Bool(*b)),
        Value::Number(n) => Some(number_to_json(*n)),
        Value::String(s) => Some(serde_json::Value::String(s.clone())),
        Value::Date(d) => Some(match crate::js_date::date_to_iso_string(d.time) {
            Some(iso) => serde_json::Value::String(iso),
            None => serde_json::Value::Null,
        }),
        Value::Array(items) => {
            let mut arr = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                arr.push(js_value_to_json_value(item, &i.to_string(), replacer)?.unwrap_or(serde_json::Value::Null));
            }
            Some(serde_json::Value::Array(arr))
        }
        Value::Object(props) => {
            let mut map = serde_json::Map::new();
            for (k, v) in props.iter() {
                if let Replacer::Keys(keys) = replacer
                    && !keys.contains(k)
                {
                    continue;
                }
                if let Some(json_val) = js_value_to_json_value(v, k, replacer)? {
                    map.insert(k.clone(), json_val);
                }
            }
            Some(serde_json::Value::Object(map))
        }
    })
}
