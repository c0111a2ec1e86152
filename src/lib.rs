pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod js_array;
pub(crate) mod js_console;
pub(crate) mod js_date;
pub(crate) mod js_error;
pub(crate) mod js_json;
pub(crate) mod js_math;
pub(crate) mod js_number;
pub(crate) mod js_object;
pub(crate) mod js_string;
pub(crate) mod repl;
pub(crate) mod repl_utils;
pub(crate) mod unicode;

pub use core::{
    BinaryOp, CatchClause, Closure, DeclKind, Environment, Expr, JSDate, JSObject, MAX_CALL_DEPTH, MAX_LOOP_ITERATIONS, Pattern,
    PatternElement, Statement, StatementKind, SwitchCase, Token, TokenData, UnaryOp, Value, binary_op, call_function, evaluate,
    evaluate_expr, evaluate_script, evaluate_script_with_env, evaluate_statements, get_property, initialize_global_constructors,
    inspect, is_truthy, loose_equal, parse, parse_script, parse_statements, strict_equal, to_number, tokenize, unary_op,
    value_to_string,
};
pub use error::{JSError, JSErrorKind};
pub use repl::Repl;
