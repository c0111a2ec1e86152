use crate::{JSError, raise_syntax_error};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    StringLit(String),
    TemplateString(Vec<TemplatePart>),
    Identifier(String),
    Plus,
    Minus,
    Multiply,
    /// Exponentiation operator `**`
    Exponent,
    Divide,
    Mod,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Dot,
    Comma,
    Semicolon,
    Let,
    Var,
    Const,
    New,
    TypeOf,
    In,
    Of,
    Void,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Break,
    Continue,
    Do,
    Switch,
    Case,
    Default,
    Throw,
    Try,
    Catch,
    Finally,
    True,
    False,
    Null,
    Assign,
    Equal,
    StrictEqual,
    NotEqual,
    StrictNotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Arrow,
    Spread,
    OptionalChain,
    QuestionMark,
    NullishCoalescing,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
    LogicalAndAssign,
    LogicalOrAssign,
    NullishAssign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    /// Exponentiation assignment (`**=`)
    PowAssign,
    Increment,
    Decrement,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LeftShift,
    RightShift,
    UnsignedRightShift,
}

impl Token {
    /// Keywords are still valid property names after a `.` or as object keys.
    pub fn as_identifier_string(&self) -> Option<String> {
        let s = match self {
            Token::Identifier(s) => return Some(s.clone()),
            Token::Let => "let",
            Token::Var => "var",
            Token::Const => "const",
            Token::New => "new",
            Token::TypeOf => "typeof",
            Token::In => "in",
            Token::Of => "of",
            Token::Void => "void",
            Token::Function => "function",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Do => "do",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Throw => "throw",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            _ => return None,
        };
        Some(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    String(String),
    Expr(Vec<TokenData>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub token: Token,
    pub line: usize,
    pub column: usize,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

fn keyword(ident: &str) -> Option<Token> {
    let tok = match ident {
        "let" => Token::Let,
        "var" => Token::Var,
        "const" => Token::Const,
        "new" => Token::New,
        "typeof" => Token::TypeOf,
        "in" => Token::In,
        "of" => Token::Of,
        "void" => Token::Void,
        "function" => Token::Function,
        "return" => Token::Return,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "do" => Token::Do,
        "switch" => Token::Switch,
        "case" => Token::Case,
        "default" => Token::Default,
        "throw" => Token::Throw,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "true" => Token::True,
        "false" => Token::False,
        "null" => Token::Null,
        _ => return None,
    };
    Some(tok)
}

// Longest operators first so that `===` wins over `==` and `=`.
const OPERATORS: &[(&str, Token)] = &[
    (">>>", Token::UnsignedRightShift),
    ("===", Token::StrictEqual),
    ("!==", Token::StrictNotEqual),
    ("**=", Token::PowAssign),
    ("...", Token::Spread),
    ("&&=", Token::LogicalAndAssign),
    ("||=", Token::LogicalOrAssign),
    ("??=", Token::NullishAssign),
    ("=>", Token::Arrow),
    ("==", Token::Equal),
    ("!=", Token::NotEqual),
    ("<=", Token::LessEqual),
    (">=", Token::GreaterEqual),
    ("<<", Token::LeftShift),
    (">>", Token::RightShift),
    ("**", Token::Exponent),
    ("&&", Token::LogicalAnd),
    ("||", Token::LogicalOr),
    ("??", Token::NullishCoalescing),
    ("++", Token::Increment),
    ("--", Token::Decrement),
    ("+=", Token::AddAssign),
    ("-=", Token::SubAssign),
    ("*=", Token::MulAssign),
    ("/=", Token::DivAssign),
    ("%=", Token::ModAssign),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Multiply),
    ("/", Token::Divide),
    ("%", Token::Mod),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    (":", Token::Colon),
    (".", Token::Dot),
    (",", Token::Comma),
    (";", Token::Semicolon),
    ("=", Token::Assign),
    ("<", Token::LessThan),
    (">", Token::GreaterThan),
    ("!", Token::LogicalNot),
    ("?", Token::QuestionMark),
    ("&", Token::BitAnd),
    ("|", Token::BitOr),
    ("^", Token::BitXor),
    ("~", Token::BitNot),
];

struct Lexer<'a> {
    chars: &'a [char],
    i: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.i + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.i).copied()?;
        self.i += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(k, c)| self.peek(k) == Some(c))
    }

    fn error(&self, msg: impl std::fmt::Display) -> JSError {
        raise_syntax_error!(msg, self.line, self.column)
    }

    fn run(&mut self, stop_at_template_close: bool) -> Result<Vec<TokenData>, JSError> {
        let mut tokens = Vec::new();
        let mut brace_depth = 0usize;
        let mut newline_before = false;
        while let Some(c) = self.peek(0) {
            let (line, column) = (self.line, self.column);
            if c.is_whitespace() {
                newline_before |= c == '\n';
                self.bump();
                continue;
            }
            if self.starts_with("//") {
                while let Some(c) = self.peek(0)
                    && c != '\n'
                {
                    self.bump();
                }
                continue;
            }
            if self.starts_with("/*") {
                self.bump();
                self.bump();
                loop {
                    if self.starts_with("*/") {
                        self.bump();
                        self.bump();
                        break;
                    }
                    match self.bump() {
                        None => return Err(raise_syntax_error!("Unterminated comment", line, column)),
                        Some('\n') => newline_before = true,
                        Some(_) => {}
                    }
                }
                continue;
            }
            if stop_at_template_close && c == '}' && brace_depth == 0 {
                return Ok(tokens);
            }

            let token = if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
                Token::Number(self.number()?)
            } else if c == '"' || c == '\'' {
                self.bump();
                Token::StringLit(self.string_literal(c)?)
            } else if c == '`' {
                self.bump();
                Token::TemplateString(self.template_literal()?)
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                let mut ident = String::new();
                while let Some(c) = self.peek(0)
                    && (c.is_alphanumeric() || c == '_' || c == '$')
                {
                    ident.push(c);
                    self.bump();
                }
                keyword(&ident).unwrap_or(Token::Identifier(ident))
            } else if self.starts_with("?.") && !self.peek(2).is_some_and(|d| d.is_ascii_digit()) {
                // `a?.5:1` is a ternary, not an optional chain
                self.bump();
                self.bump();
                Token::OptionalChain
            } else if let Some((op, tok)) = OPERATORS.iter().find(|(op, _)| self.starts_with(op)) {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                tok.clone()
            } else {
                return Err(self.error(format!("Unexpected character '{c}'")));
            };

            match token {
                Token::LBrace => brace_depth += 1,
                Token::RBrace => brace_depth = brace_depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(TokenData {
                token,
                line,
                column,
                newline_before,
            });
            newline_before = false;
        }
        if stop_at_template_close {
            return Err(self.error("Unterminated template expression"));
        }
        Ok(tokens)
    }

    fn number(&mut self) -> Result<f64, JSError> {
        if self.peek(0) == Some('0')
            && let Some(prefix) = self.peek(1)
        {
            let radix = match prefix {
                'x' | 'X' => Some(16),
                'o' | 'O' => Some(8),
                'b' | 'B' => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.bump();
                self.bump();
                let mut digits = String::new();
                while let Some(c) = self.peek(0)
                    && (c.is_digit(radix) || c == '_')
                {
                    if c != '_' {
                        digits.push(c);
                    }
                    self.bump();
                }
                return u64::from_str_radix(&digits, radix)
                    .map(|n| n as f64)
                    .map_err(|_| self.error(format!("Invalid number literal with radix {radix}")));
            }
        }

        let mut text = String::new();
        while let Some(c) = self.peek(0)
            && (c.is_ascii_digit() || c == '_')
        {
            if c != '_' {
                text.push(c);
            }
            self.bump();
        }
        if self.peek(0) == Some('.') && !self.starts_with("..") {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek(0)
                && c.is_ascii_digit()
            {
                text.push(c);
                self.bump();
            }
        }
        if let Some('e' | 'E') = self.peek(0) {
            let sign = self.peek(1);
            let has_digits = match sign {
                Some('+' | '-') => self.peek(2).is_some_and(|d| d.is_ascii_digit()),
                Some(d) => d.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                text.push('e');
                self.bump();
                if let Some(s @ ('+' | '-')) = self.peek(0) {
                    text.push(s);
                    self.bump();
                }
                while let Some(c) = self.peek(0)
                    && c.is_ascii_digit()
                {
                    text.push(c);
                    self.bump();
                }
            }
        }
        if self.peek(0).is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$') {
            return Err(self.error("Identifier starts immediately after numeric literal"));
        }
        text.parse::<f64>().map_err(|_| self.error(format!("Invalid number literal '{text}'")))
    }

    fn escape(&mut self) -> Result<char, JSError> {
        let c = self.bump().ok_or_else(|| self.error("Unterminated string literal"))?;
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' => '\0',
            'x' | 'u' => {
                let len = if c == 'x' { 2 } else { 4 };
                let mut hex = String::new();
                for _ in 0..len {
                    hex.push(self.bump().ok_or_else(|| self.error("Invalid escape sequence"))?);
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(format!("Invalid escape sequence '\\{c}{hex}'")))?
            }
            other => other,
        };
        Ok(decoded)
    }

    fn string_literal(&mut self, quote: char) -> Result<String, JSError> {
        let (line, column) = (self.line, self.column);
        let mut result = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(raise_syntax_error!("Unterminated string literal", line, column)),
                Some('\\') => result.push(self.escape()?),
                Some(c) if c == quote => return Ok(result),
                Some(c) => result.push(c),
            }
        }
    }

    fn template_literal(&mut self) -> Result<Vec<TemplatePart>, JSError> {
        let (line, column) = (self.line, self.column);
        let mut parts = Vec::new();
        let mut current = String::new();
        loop {
            match self.bump() {
                None => return Err(raise_syntax_error!("Unterminated template literal", line, column)),
                Some('`') => break,
                Some('\\') => current.push(self.escape()?),
                Some('$') if self.peek(0) == Some('{') => {
                    self.bump();
                    if !current.is_empty() {
                        parts.push(TemplatePart::String(std::mem::take(&mut current)));
                    }
                    let expr_tokens = self.run(true)?;
                    self.bump(); // consume the closing '}'
                    parts.push(TemplatePart::Expr(expr_tokens));
                }
                Some(c) => current.push(c),
            }
        }
        if !current.is_empty() {
            parts.push(TemplatePart::String(current));
        }
        Ok(parts)
    }
}

pub fn tokenize(expr: &str) -> Result<Vec<TokenData>, JSError> {
    let chars: Vec<char> = expr.chars().collect();
    let mut lexer = Lexer {
        chars: &chars,
        i: 0,
        line: 1,
        column: 1,
    };
    let tokens = lexer.run(false)?;
    log::trace!("tokenize: {} tokens from {} chars", tokens.len(), chars.len());
    Ok(tokens)
}
