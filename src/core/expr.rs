use crate::core::{Statement, format_js_number};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    In,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::In => "in",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof ",
            UnaryOp::Void => "void ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }
}

/// Compound forms carry the operator applied before storing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
    Logical(LogicalOp),
}

/// Binding target of a declaration, parameter, `for...of` head or `catch` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Identifier(String),
    /// `[a, , b = 1, ...rest]`; `None` marks a hole.
    Array(Vec<Option<PatternElement>>, Option<Box<Pattern>>),
    /// `{ a, b: c, d = 1, ...rest }`
    Object(Vec<(PropertyKey, PatternElement)>, Option<String>),
}

/// A nested target with its default, used when the matched value is `undefined`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternElement {
    pub target: Pattern,
    pub default: Option<Expr>,
}

impl Pattern {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Pattern::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for PatternElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Identifier(name) => write!(f, "{name}"),
            Pattern::Array(elements, rest) => {
                let mut parts: Vec<String> = elements
                    .iter()
                    .map(|e| e.as_ref().map(ToString::to_string).unwrap_or_default())
                    .collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{rest}"));
                }
                write!(f, "[{}]", parts.join(", "))
            }
            Pattern::Object(props, rest) => {
                let mut parts: Vec<String> = props
                    .iter()
                    .map(|(key, element)| match (key, &element.target) {
                        (PropertyKey::Static(k), Pattern::Identifier(name)) if k == name => element.to_string(),
                        (PropertyKey::Static(k), _) => format!("{k}: {element}"),
                        (PropertyKey::Computed(k), _) => format!("[{k}]: {element}"),
                    })
                    .collect();
                if let Some(rest) = rest {
                    parts.push(format!("...{rest}"));
                }
                write!(f, "{{ {} }}", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub pattern: Pattern,
    pub default: Option<Expr>,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Expr(Box<Expr>),
    Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Static(String),
    Computed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property(PropertyKey, Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    StringLit(String),
    Boolean(bool),
    Null,
    Var(String),
    /// Alternating string and expression parts of a template literal.
    Template(Vec<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Logical(Box<Expr>, LogicalOp, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    /// `++x` / `x--`: target, delta, is_prefix
    Update(Box<Expr>, f64, bool),
    Assign(Box<Expr>, AssignOp, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    /// obj.prop / obj?.prop
    Property(Box<Expr>, String, bool),
    /// obj[key] / obj?.[key]
    Index(Box<Expr>, Box<Expr>, bool),
    /// callee(args) / callee?.(args)
    Call(Box<Expr>, Vec<Expr>, bool),
    /// Root of a member/call chain containing at least one `?.` link.
    OptionalChain(Box<Expr>),
    New(Box<Expr>, Vec<Expr>),
    Array(Vec<Expr>),
    Object(Vec<ObjectMember>),
    Spread(Box<Expr>),
    Function(Rc<FunctionDef>),
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", format_js_number(*n)),
            Expr::StringLit(s) => write!(f, "{s:?}"),
            Expr::Boolean(b) => write!(f, "{b}"),
            Expr::Null => write!(f, "null"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Template(parts) => {
                write!(f, "`")?;
                for part in parts {
                    match part {
                        Expr::StringLit(s) => write!(f, "{s}")?,
                        other => write!(f, "${{{other}}}")?,
                    }
                }
                write!(f, "`")
            }
            Expr::Binary(l, op, r) => write!(f, "{l} {} {r}", op.symbol()),
            Expr::Logical(l, op, r) => write!(f, "{l} {} {r}", op.symbol()),
            Expr::Unary(op, e) => write!(f, "{}{e}", op.symbol()),
            Expr::Update(e, delta, prefix) => {
                let op = if *delta > 0.0 { "++" } else { "--" };
                if *prefix { write!(f, "{op}{e}") } else { write!(f, "{e}{op}") }
            }
            Expr::Assign(target, op, value) => {
                let sym = match op {
                    AssignOp::Assign => "=".to_string(),
                    AssignOp::Compound(b) => format!("{}=", b.symbol()),
                    AssignOp::Logical(l) => format!("{}=", l.symbol()),
                };
                write!(f, "{target} {sym} {value}")
            }
            Expr::Conditional(c, t, e) => write!(f, "{c} ? {t} : {e}"),
            Expr::Property(obj, name, optional) => write!(f, "{obj}{}{name}", if *optional { "?." } else { "." }),
            Expr::Index(obj, key, optional) => write!(f, "{obj}{}[{key}]", if *optional { "?." } else { "" }),
            Expr::Call(callee, args, optional) => {
                write!(f, "{callee}{}(", if *optional { "?." } else { "" })?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::OptionalChain(inner) => write!(f, "{inner}"),
            Expr::New(callee, args) => {
                write!(f, "new {callee}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Expr::Array(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            Expr::Object(members) => {
                if members.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match member {
                        ObjectMember::Property(PropertyKey::Static(k), v) => write!(f, "{k}: {v}")?,
                        ObjectMember::Property(PropertyKey::Computed(k), v) => write!(f, "[{k}]: {v}")?,
                        ObjectMember::Spread(e) => write!(f, "...{e}")?,
                    }
                }
                write!(f, " }}")
            }
            Expr::Spread(e) => write!(f, "...{e}"),
            Expr::Function(def) => {
                let params: Vec<String> = def
                    .params
                    .iter()
                    .map(|p| if p.rest { format!("...{}", p.pattern) } else { p.pattern.to_string() })
                    .collect();
                if def.is_arrow {
                    write!(f, "({}) => ...", params.join(", "))
                } else {
                    write!(f, "function {}({}) {{ ... }}", def.name.as_deref().unwrap_or(""), params.join(", "))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_member_chains() {
        let e = Expr::Property(
            Box::new(Expr::Property(Box::new(Expr::Var("obj".into())), "user".into(), false)),
            "address".into(),
            true,
        );
        assert_eq!(e.to_string(), "obj.user?.address");
    }

    #[test]
    fn renders_binary_and_calls() {
        let call = Expr::Call(
            Box::new(Expr::Property(Box::new(Expr::Var("Math".into())), "floor".into(), false)),
            vec![Expr::Binary(Box::new(Expr::Number(4.5)), BinaryOp::Add, Box::new(Expr::StringLit("x".into())))],
            false,
        );
        assert_eq!(call.to_string(), "Math.floor(4.5 + \"x\")");
    }

    #[test]
    fn renders_patterns() {
        let pattern = Pattern::Object(
            vec![
                (
                    PropertyKey::Static("name".into()),
                    PatternElement {
                        target: Pattern::Identifier("name".into()),
                        default: None,
                    },
                ),
                (
                    PropertyKey::Static("age".into()),
                    PatternElement {
                        target: Pattern::Identifier("years".into()),
                        default: Some(Expr::Number(25.0)),
                    },
                ),
            ],
            Some("others".into()),
        );
        assert_eq!(pattern.to_string(), "{ name, age: years = 25, ...others }");
        let holes = Pattern::Array(vec![None, Some(PatternElement { target: Pattern::Identifier("b".into()), default: None })], None);
        assert_eq!(holes.to_string(), "[, b]");
    }
}
