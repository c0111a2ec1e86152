use crate::core::{DeclKind, Environment, JSObject, Value, inspect, value_to_string};
use crate::error::JSError;

const ERROR_CONSTRUCTORS: &[&str] = &["Error", "TypeError", "RangeError", "ReferenceError", "SyntaxError"];

pub fn initialize_error(env: &Environment) -> Result<(), JSError> {
    for name in ERROR_CONSTRUCTORS {
        env.declare(name, Value::Function(name.to_string()), DeclKind::Const)?;
    }
    Ok(())
}

pub fn is_error_constructor(name: &str) -> bool {
    ERROR_CONSTRUCTORS.contains(&name)
}

/// An error value: a plain object carrying `name` and `message`.
pub fn error_object(name: &str, message: &str) -> Value {
    let mut props = JSObject::new();
    props.insert("name".into(), Value::string(name));
    props.insert("message".into(), Value::string(message));
    Value::object(props)
}

/// `new Error(message)` and `Error(message)` build the same value.
pub fn construct_error(name: &str, args: &[Value]) -> Value {
    let message = match args.first() {
        None | Some(Value::Undefined) => String::new(),
        Some(v) => value_to_string(v),
    };
    error_object(name, &message)
}

/// `Name: message` for error objects, the inspected value otherwise.
pub fn describe_thrown(value: &Value) -> String {
    if let Value::Object(props) = value
        && let (Some(Value::String(name)), Some(Value::String(message))) = (props.get("name"), props.get("message"))
    {
        return if message.is_empty() { name.clone() } else { format!("{name}: {message}") };
    }
    inspect(value, false)
}

/// The value a `catch` clause binds for `err`. Syntax errors in the source
/// never reach a handler.
pub fn caught_value(err: &JSError) -> Option<Value> {
    match err {
        JSError::SyntaxError { .. } => None,
        JSError::EvaluationError { .. } => Some(match err.thrown_value() {
            Some(value) => value.clone(),
            None => error_from_message(&err.message()),
        }),
    }
}

// "TypeError: x is not a function" becomes { name: 'TypeError', message: 'x is not a function' }.
fn error_from_message(message: &str) -> Value {
    match message.split_once(": ") {
        Some((name, rest)) if name.ends_with("Error") && name.chars().all(|c| c.is_ascii_alphabetic()) => error_object(name, rest),
        _ => error_object("Error", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{raise_eval_error, raise_syntax_error, raise_thrown_value};

    fn prop(value: &Value, key: &str) -> String {
        match value {
            Value::Object(props) => props.get(key).map(value_to_string).unwrap_or_default(),
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn constructed_errors_carry_name_and_message() {
        let err = construct_error("RangeError", &[Value::string("too big")]);
        assert_eq!(prop(&err, "name"), "RangeError");
        assert_eq!(prop(&err, "message"), "too big");
        assert_eq!(describe_thrown(&err), "RangeError: too big");
        assert_eq!(describe_thrown(&construct_error("Error", &[])), "Error");
        assert_eq!(describe_thrown(&Value::string("oops")), "oops");
    }

    #[test]
    fn runtime_errors_are_caught_as_error_objects() {
        let caught = caught_value(&raise_eval_error!("TypeError: x is not a function")).unwrap();
        assert_eq!(prop(&caught, "name"), "TypeError");
        assert_eq!(prop(&caught, "message"), "x is not a function");

        let caught = caught_value(&raise_eval_error!("Infinite loop detected (executed 1000000 iterations)")).unwrap();
        assert_eq!(prop(&caught, "name"), "Error");

        let thrown = caught_value(&raise_thrown_value!(Value::Number(42.0), "Uncaught 42")).unwrap();
        assert!(matches!(thrown, Value::Number(n) if n == 42.0));

        assert!(caught_value(&raise_syntax_error!("Unexpected token", 1, 1)).is_none());
    }
}
