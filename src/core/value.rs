use crate::core::{Environment, Expr, FunctionDef, string_to_number};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Property storage of a plain object, in insertion order.
pub type JSObject = IndexMap<String, Value>;

/// An arrow function or function expression together with the scope it was created in.
#[derive(Clone)]
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub env: Environment,
    /// The declared name, or the binding an anonymous function was first assigned to.
    pub name: Option<String>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({})", self.name.as_deref().unwrap_or("anonymous"))
    }
}

#[derive(Clone, Debug)]
pub struct JSDate {
    /// Milliseconds since the Unix epoch, NaN for an invalid date.
    pub time: f64,
}

#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
    Array(Rc<Vec<Value>>),
    Object(Rc<JSObject>),
    Closure(Rc<Closure>),
    /// Builtin function addressed by its qualified name, e.g. `Math.floor`.
    Function(String),
    Date(Rc<JSDate>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    pub fn object(props: JSObject) -> Self {
        Value::Object(Rc::new(props))
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Undefined => "undefined",
            Value::Closure(_) | Value::Function(_) => "function",
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Date(_) => "object",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure(_) | Value::Function(_))
    }

    fn is_primitive(&self) -> bool {
        matches!(self, Value::Number(_) | Value::String(_) | Value::Boolean(_) | Value::Null | Value::Undefined)
    }
}

/// ToBoolean: 0, -0, NaN, "", false, null and undefined are falsy.
pub fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Boolean(b) => *b,
        Value::Null | Value::Undefined => false,
        _ => true,
    }
}

/// ToPrimitive with the default hint. Dates and aggregates become strings.
pub fn to_primitive(val: &Value) -> Value {
    if val.is_primitive() { val.clone() } else { Value::String(value_to_string(val)) }
}

/// ToNumber
pub fn to_number(val: &Value) -> f64 {
    match val {
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Undefined => f64::NAN,
        Value::Date(d) => d.time,
        Value::Array(_) => string_to_number(&value_to_string(val)),
        Value::Object(_) | Value::Closure(_) | Value::Function(_) => f64::NAN,
    }
}

pub fn format_js_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n.is_sign_negative() { "-Infinity" } else { "Infinity" }.to_string();
    }
    // ECMAScript ToString(-0) is "0"
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        // Rust prints the shortest round-trip mantissa; JS wants an explicit exponent sign.
        let s = format!("{n:e}");
        if let Some((mant, exp)) = s.split_once('e')
            && let Ok(exp) = exp.parse::<i32>()
        {
            return format!("{mant}e{exp:+}");
        }
        return s;
    }
    format!("{n}")
}

/// ToString
pub fn value_to_string(val: &Value) -> String {
    match val {
        Value::Number(n) => format_js_number(*n),
        Value::String(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| if v.is_nullish() { String::new() } else { value_to_string(v) })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        Value::Closure(c) => Expr::Function(c.def.clone()).to_string(),
        Value::Function(name) => {
            let short = name.rsplit('.').next().unwrap_or(name);
            format!("function {short}() {{ [native code] }}")
        }
        Value::Date(d) => crate::js_date::date_to_string(d.time),
    }
}

/// Property key used for member access: numbers print the way JS prints them.
pub fn to_property_key(val: &Value) -> String {
    value_to_string(val)
}

/// Strict equality (`===`): no coercion, NaN is unequal to itself, aggregates compare by identity.
pub fn strict_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => Rc::ptr_eq(x, y),
        (Value::Closure(x), Value::Closure(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Loose equality (`==`) following the abstract equality comparison.
pub fn loose_equal(a: &Value, b: &Value) -> bool {
    if std::mem::discriminant(a) == std::mem::discriminant(b) {
        return strict_equal(a, b);
    }
    match (a, b) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Null | Value::Undefined, _) | (_, Value::Null | Value::Undefined) => false,
        (Value::Number(x), Value::String(s)) | (Value::String(s), Value::Number(x)) => *x == string_to_number(s),
        (Value::Boolean(_), _) => loose_equal(&Value::Number(to_number(a)), b),
        (_, Value::Boolean(_)) => loose_equal(a, &Value::Number(to_number(b))),
        (Value::Number(_) | Value::String(_), _) if !b.is_primitive() => loose_equal(a, &to_primitive(b)),
        (_, Value::Number(_) | Value::String(_)) if !a.is_primitive() => loose_equal(&to_primitive(a), b),
        _ => false,
    }
}

/// SameValueZero, used by `includes`: like `===` except NaN equals NaN.
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => strict_equal(a, b),
    }
}

fn is_identifier_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$'),
        _ => false,
    }
}

fn quote_single(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n"))
}

/// Node-inspector style rendering. Strings are quoted only when nested.
pub fn inspect(val: &Value, nested: bool) -> String {
    match val {
        Value::String(s) if nested => quote_single(s),
        Value::Number(n) if *n == 0.0 && n.is_sign_negative() => "-0".to_string(),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner: Vec<String> = items.iter().map(|v| inspect(v, true)).collect();
            format!("[ {} ]", inner.join(", "))
        }
        Value::Object(props) => {
            if props.is_empty() {
                return "{}".to_string();
            }
            let inner: Vec<String> = props
                .iter()
                .map(|(k, v)| {
                    let key = if is_identifier_name(k) { k.clone() } else { quote_single(k) };
                    format!("{key}: {}", inspect(v, true))
                })
                .collect();
            format!("{{ {} }}", inner.join(", "))
        }
        Value::Closure(c) => match &c.name {
            Some(name) => format!("[Function: {name}]"),
            None => "[Function (anonymous)]".to_string(),
        },
        Value::Function(name) => format!("[Function: {}]", name.rsplit('.').next().unwrap_or(name)),
        Value::Date(d) => crate::js_date::date_to_iso_string(d.time).unwrap_or_else(|| "Invalid Date".to_string()),
        other => value_to_string(other),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", inspect(self, false))
    }
}
