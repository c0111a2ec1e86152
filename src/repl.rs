use crate::{
    JSError,
    core::{Environment, Value, evaluate_statements, parse_script},
};

/// A small persistent REPL environment wrapper.
///
/// Notes:
/// - `Repl::new()` creates a scope nested in the builtin global scope.
/// - `Repl::eval(&self, code)` evaluates the provided code in that scope,
///   so `let`/`const` bindings and functions persist between calls.
pub struct Repl {
    env: Environment,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        Repl {
            env: Environment::global().child(),
        }
    }

    /// Start from a caller-supplied scope instead of the builtin one.
    pub fn with_env(env: &Environment) -> Self {
        Repl { env: env.child() }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluate a script in the persistent environment.
    /// Returns the completion value of the last statement or an error.
    pub fn eval<T: AsRef<str>>(&self, script: T) -> Result<Value, JSError> {
        let statements = parse_script(script.as_ref())?;
        log::trace!("repl: evaluating {} statement(s)", statements.len());
        evaluate_statements(&self.env, &statements)
    }

    /// Returns true when `input` looks complete enough to evaluate; see
    /// [`crate::repl_utils::is_complete_input`].
    pub fn is_complete_input(input: &str) -> bool {
        crate::repl_utils::is_complete_input(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_persist_between_calls() {
        let repl = Repl::new();
        repl.eval("let count = 1").unwrap();
        repl.eval("count += 41").unwrap();
        assert!(matches!(repl.eval("count").unwrap(), Value::Number(n) if n == 42.0));
    }

    #[test]
    fn errors_leave_the_session_usable() {
        let repl = Repl::new();
        assert!(repl.eval("missing + 1").is_err());
        assert!(repl.eval("let x = (").is_err());
        assert!(matches!(repl.eval("'ok'").unwrap(), Value::String(s) if s == "ok"));
    }
}
