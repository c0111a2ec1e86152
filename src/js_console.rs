use crate::core::{DeclKind, Environment, JSObject, Value, inspect};
use crate::error::JSError;
use crate::raise_type_error;

const CONSOLE_METHODS: &[&str] = &["log", "info", "debug", "warn", "error"];

pub fn initialize_console(env: &Environment) -> Result<(), JSError> {
    let mut console = JSObject::new();
    for method in CONSOLE_METHODS {
        console.insert(method.to_string(), Value::Function(format!("console.{method}")));
    }
    env.declare("console", Value::object(console), DeclKind::Const)
}

/// One console line: strings print bare, everything else inspected, joined by spaces.
pub fn format_console_args(args: &[Value]) -> String {
    args.iter().map(|v| inspect(v, false)).collect::<Vec<_>>().join(" ")
}

pub fn handle_console_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    let line = format_console_args(args);
    match method {
        "log" | "info" | "debug" => println!("{line}"),
        "warn" | "error" => eprintln!("{line}"),
        _ => return Err(raise_type_error!(format!("console.{method} is not a function"))),
    }
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_joined_with_spaces() {
        let args = [
            Value::string("0: red"),
            Value::Number(1.0),
            Value::array(vec![Value::string("a"), Value::Boolean(true)]),
        ];
        assert_eq!(format_console_args(&args), "0: red 1 [ 'a', true ]");
        assert_eq!(format_console_args(&[]), "");
    }

    #[test]
    fn unknown_methods_are_rejected() {
        assert!(handle_console_method("table", &[]).is_err());
        assert!(matches!(handle_console_method("log", &[Value::string("hi")]).unwrap(), Value::Undefined));
    }
}
