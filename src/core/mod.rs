use crate::error::JSError;
use crate::js_array::initialize_array;
use crate::js_console::initialize_console;
use crate::js_date::initialize_date;
use crate::js_error::initialize_error;
use crate::js_json::initialize_json;
use crate::js_math::initialize_math;
use crate::js_number::initialize_number_module;
use crate::js_object::initialize_object_module;
use crate::js_string::initialize_string;

mod env;
pub use env::*;

mod value;
pub use value::*;

mod statement;
pub use statement::*;

mod token;
pub use token::*;

pub(crate) mod number;
pub use number::string_to_number;

mod expr;
pub use expr::*;

mod eval;
pub use eval::*;

pub(crate) mod parser;
pub use parser::*;

thread_local! {
    static GLOBAL_ENV: Environment = new_global_env();
}

fn new_global_env() -> Environment {
    let env = Environment::new();
    if let Err(e) = initialize_global_constructors(&env) {
        log::error!("failed to initialize builtins: {e}");
    }
    env
}

/// Bind every builtin (`Math`, `JSON`, `Object`, `console`, `Error`, ...) in `env`.
pub fn initialize_global_constructors(env: &Environment) -> Result<(), JSError> {
    initialize_object_module(env)?;
    initialize_number_module(env)?;
    initialize_math(env)?;
    initialize_string(env)?;
    initialize_array(env)?;
    initialize_json(env)?;
    initialize_date(env)?;
    initialize_error(env)?;
    initialize_console(env)?;
    log::debug!("initialized {} global bindings", env.names().len());
    Ok(())
}

/// Builtin fallback for identifiers the caller's scope chain does not bind.
pub(crate) fn global_binding(name: &str) -> Option<Value> {
    GLOBAL_ENV.with(|env| env.get(name))
}

impl Environment {
    /// The shared scope holding the builtins, one per thread. Its bindings are constant.
    pub fn global() -> Environment {
        GLOBAL_ENV.with(Environment::clone)
    }
}

/// Evaluate a script in a fresh child of `env` (or of the builtin scope)
/// and return its completion value.
pub fn evaluate_script_with_env(script: impl AsRef<str>, env: Option<&Environment>) -> Result<Value, JSError> {
    let script = script.as_ref();
    log::debug!("evaluate_script: {} bytes", script.len());
    let statements = parse_script(script)?;
    let scope = match env {
        Some(env) => env.child(),
        None => Environment::global().child(),
    };
    evaluate_statements(&scope, &statements)
}

pub fn evaluate_script(script: impl AsRef<str>) -> Result<Value, JSError> {
    evaluate_script_with_env(script, None)
}

/// Evaluate `source` and render the result the way Node's REPL prints it.
pub fn evaluate(source: &str, env: Option<&Environment>) -> Result<String, JSError> {
    evaluate_script_with_env(source, env).map(|value| value.to_string())
}
