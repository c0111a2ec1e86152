/// The two failure classes an evaluation can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JSErrorKind {
    SyntaxError,
    EvaluationError,
}

#[derive(thiserror::Error, Debug)]
pub enum JSError {
    #[error("SyntaxError: {message} (line {line}, column {column})")]
    SyntaxError {
        message: String,
        line: usize,
        column: usize,
        file: String,
        method: String,
    },

    #[error("EvaluationError: {message}{}", context_suffix(.context))]
    EvaluationError {
        message: String,
        /// Source rendering of the innermost expression that failed.
        context: String,
        /// The value passed to `throw`, if this error came from one.
        thrown: Option<Box<crate::core::Value>>,
        file: String,
        line: usize,
        method: String,
    },
}

fn context_suffix(context: &str) -> String {
    if context.is_empty() { String::new() } else { format!(" in `{context}`") }
}

impl JSError {
    pub fn kind(&self) -> JSErrorKind {
        match self {
            JSError::SyntaxError { .. } => JSErrorKind::SyntaxError,
            JSError::EvaluationError { .. } => JSErrorKind::EvaluationError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            JSError::SyntaxError { message, .. } | JSError::EvaluationError { message, .. } => message.clone(),
        }
    }

    pub fn context(&self) -> Option<&str> {
        match self {
            JSError::EvaluationError { context, .. } if !context.is_empty() => Some(context),
            _ => None,
        }
    }

    /// The value a script threw, for errors raised by `throw`.
    pub fn thrown_value(&self) -> Option<&crate::core::Value> {
        match self {
            JSError::EvaluationError { thrown, .. } => thrown.as_deref(),
            JSError::SyntaxError { .. } => None,
        }
    }

    /// Script line of a syntax error, 1-based.
    pub fn js_line(&self) -> Option<usize> {
        match self {
            JSError::SyntaxError { line, .. } => Some(*line),
            JSError::EvaluationError { .. } => None,
        }
    }

    pub fn js_column(&self) -> Option<usize> {
        match self {
            JSError::SyntaxError { column, .. } => Some(*column),
            JSError::EvaluationError { .. } => None,
        }
    }

    /// Rust source location (`file:line`) that raised this error.
    pub fn raised_at(&self) -> String {
        match self {
            JSError::SyntaxError { file, method, .. } => format!("{method} {file}"),
            JSError::EvaluationError { file, line, method, .. } => format!("{method} {file}:{line}"),
        }
    }

    /// Point a syntax error raised at end of input (no token left to blame)
    /// just past the last character of `source`.
    pub(crate) fn at_end_of(mut self, source: &str) -> Self {
        if let JSError::SyntaxError { line, column, .. } = &mut self
            && *line == 0
        {
            let last_line = source.rsplit('\n').next().unwrap_or("");
            *line = source.matches('\n').count() + 1;
            *column = last_line.chars().count() + 1;
        }
        self
    }

    /// Attach the offending expression if no inner node claimed the error yet.
    pub(crate) fn with_context(mut self, node: &dyn std::fmt::Display) -> Self {
        if let JSError::EvaluationError { context, .. } = &mut self
            && context.is_empty()
        {
            *context = node.to_string();
        }
        self
    }
}

impl From<JSError> for std::io::Error {
    fn from(err: JSError) -> std::io::Error {
        std::io::Error::other(err.to_string())
    }
}

// Builds a SyntaxError at a token position. A macro keeps `file!()` pointing
// at the raising parser function rather than at this module.
#[macro_export]
macro_rules! raise_syntax_error {
    ($msg:expr, $line:expr, $column:expr) => {
        $crate::JSError::SyntaxError {
            message: $msg.to_string(),
            line: $line,
            column: $column,
            file: file!().to_string(),
            method: $crate::function_name!().to_string(),
        }
    };
    ($msg:expr) => {
        $crate::raise_syntax_error!($msg, 0, 0)
    };
}

#[macro_export]
macro_rules! raise_eval_error {
    ($msg:expr) => {
        $crate::JSError::EvaluationError {
            message: $msg.to_string(),
            context: String::new(),
            thrown: None,
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

// An uncaught `throw`: `$value` travels with the error so `catch` can bind it.
#[macro_export]
macro_rules! raise_thrown_value {
    ($value:expr, $msg:expr) => {
        $crate::JSError::EvaluationError {
            message: $msg.to_string(),
            context: String::new(),
            thrown: Some(Box::new($value)),
            file: file!().to_string(),
            line: line!() as usize,
            method: $crate::function_name!().to_string(),
        }
    };
}

#[macro_export]
macro_rules! raise_type_error {
    ($msg:expr) => {
        $crate::raise_eval_error!(format!("TypeError: {}", $msg))
    };
}

#[macro_export]
macro_rules! raise_reference_error {
    ($name:expr) => {
        $crate::raise_eval_error!(format!("ReferenceError: {} is not defined", $name))
    };
}

#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        // remove the trailing "::f"
        &name[..name.len() - 3]
    }};
}
