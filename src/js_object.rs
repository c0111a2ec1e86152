use crate::core::{DeclKind, Environment, JSObject, Value, arg, iterate_values, strict_equal, to_property_key, value_to_string};
use crate::error::JSError;
use crate::raise_type_error;
use std::rc::Rc;

const OBJECT_METHODS: &[&str] = &["hasOwnProperty", "toString", "valueOf"];
const OBJECT_STATIC_METHODS: &[&str] = &["assign", "entries", "freeze", "fromEntries", "is", "isFrozen", "keys", "values"];

pub fn initialize_object_module(env: &Environment) -> Result<(), JSError> {
    env.declare("Object", Value::Function("Object".to_string()), DeclKind::Const)
}

pub fn is_object_method(name: &str) -> bool {
    OBJECT_METHODS.contains(&name)
}

pub fn object_static_property(key: &str) -> Option<Value> {
    OBJECT_STATIC_METHODS.contains(&key).then(|| Value::Function(format!("Object.{key}")))
}

/// `Object(value)` / `new Object(value)`. Primitives are not boxed.
pub fn construct_object(args: &[Value]) -> Value {
    match args.first() {
        None | Some(Value::Null | Value::Undefined) => Value::object(JSObject::new()),
        Some(v) => v.clone(),
    }
}

/// Own enumerable `(key, value)` pairs, in insertion order.
fn own_entries(val: &Value) -> Result<Vec<(String, Value)>, JSError> {
    Ok(match val {
        Value::Object(props) => props.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone())).collect(),
        Value::String(s) => s.chars().enumerate().map(|(i, c)| (i.to_string(), Value::String(c.to_string()))).collect(),
        Value::Null | Value::Undefined => {
            return Err(raise_type_error!("Cannot convert undefined or null to object"));
        }
        _ => Vec::new(),
    })
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        (Value::Number(x), Value::Number(y)) if *x == 0.0 && *y == 0.0 => x.is_sign_negative() == y.is_sign_negative(),
        _ => strict_equal(a, b),
    }
}

pub fn handle_object_static_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "keys" => Ok(Value::array(own_entries(&arg(args, 0))?.into_iter().map(|(k, _)| Value::String(k)).collect())),
        "values" => Ok(Value::array(own_entries(&arg(args, 0))?.into_iter().map(|(_, v)| v).collect())),
        "entries" => Ok(Value::array(
            own_entries(&arg(args, 0))?
                .into_iter()
                .map(|(k, v)| Value::array(vec![Value::String(k), v]))
                .collect(),
        )),
        "assign" => {
            // Values are immutable, so the merged result is a new object.
            let mut merged = JSObject::new();
            for (i, source) in args.iter().enumerate() {
                if i > 0 && source.is_nullish() {
                    continue;
                }
                merged.extend(own_entries(source)?);
            }
            Ok(Value::object(merged))
        }
        "fromEntries" => {
            let mut props = JSObject::new();
            for entry in iterate_values(&arg(args, 0))? {
                match &entry {
                    Value::Array(pair) => {
                        let key = to_property_key(pair.first().unwrap_or(&Value::Undefined));
                        props.insert(key, pair.get(1).cloned().unwrap_or(Value::Undefined));
                    }
                    other => {
                        return Err(raise_type_error!(format!("Iterator value {} is not an entry object", value_to_string(other))));
                    }
                }
            }
            Ok(Value::object(props))
        }
        "freeze" => Ok(arg(args, 0)),
        "isFrozen" => Ok(Value::Boolean(true)),
        "is" => Ok(Value::Boolean(same_value(&arg(args, 0), &arg(args, 1)))),
        _ => Err(raise_type_error!(format!("Object.{method} is not a function"))),
    }
}

pub fn handle_object_method(props: &Rc<JSObject>, method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "hasOwnProperty" => Ok(Value::Boolean(props.contains_key(&to_property_key(&arg(args, 0))))),
        "toString" => Ok(Value::string("[object Object]")),
        "valueOf" => Ok(Value::Object(props.clone())),
        _ => Err(raise_type_error!(format!("Object.prototype.{method} is not a function"))),
    }
}
