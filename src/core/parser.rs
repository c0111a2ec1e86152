use crate::{
    JSError,
    core::{
        AssignOp, BinaryOp, Expr, FunctionBody, FunctionDef, LogicalOp, ObjectMember, Param, Pattern, PatternElement, PropertyKey,
        TemplatePart, Token, TokenData, UnaryOp, parse_statements, tokenize,
    },
    raise_syntax_error,
};
use std::rc::Rc;

pub(crate) fn raise_parse_error_at(tokens: &[TokenData]) -> JSError {
    match tokens.first() {
        Some(t) => raise_syntax_error!(format!("Unexpected token {}", describe(&t.token)), t.line, t.column),
        None => raise_syntax_error!("Unexpected end of input"),
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number {n}"),
        Token::StringLit(s) => format!("string {s:?}"),
        Token::TemplateString(_) => "template literal".to_string(),
        Token::Identifier(name) => format!("identifier '{name}'"),
        other => format!("{other:?}"),
    }
}

/// Line and column of the next token; `(0, 0)` at end of input.
pub(crate) fn position(tokens: &[TokenData]) -> (usize, usize) {
    tokens.first().map_or((0, 0), |t| (t.line, t.column))
}

pub(crate) fn peek(tokens: &[TokenData]) -> Option<&Token> {
    tokens.first().map(|t| &t.token)
}

pub(crate) fn next_is(tokens: &[TokenData], token: &Token) -> bool {
    peek(tokens) == Some(token)
}

pub(crate) fn expect(tokens: &mut Vec<TokenData>, token: Token) -> Result<TokenData, JSError> {
    if next_is(tokens, &token) {
        Ok(tokens.remove(0))
    } else {
        Err(raise_parse_error_at(tokens))
    }
}

pub(crate) fn expect_identifier(tokens: &mut Vec<TokenData>) -> Result<String, JSError> {
    if let Some(Token::Identifier(name)) = peek(tokens) {
        let name = name.clone();
        tokens.remove(0);
        Ok(name)
    } else {
        Err(raise_parse_error_at(tokens))
    }
}

/// Parse one complete expression; any input left over is a syntax error.
pub fn parse(source: &str) -> Result<Expr, JSError> {
    let mut tokens = tokenize(source)?;
    let expr = parse_expression(&mut tokens).map_err(|e| e.at_end_of(source))?;
    if !tokens.is_empty() {
        return Err(raise_parse_error_at(&tokens));
    }
    Ok(expr)
}

pub fn parse_expression(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    log::trace!("parse_expression: next tokens {:?}", tokens.iter().take(4).map(|t| &t.token).collect::<Vec<_>>());
    parse_assignment(tokens)
}

pub fn parse_assignment(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    if is_arrow_function_start(tokens) {
        return parse_arrow_function(tokens);
    }
    let left = parse_conditional(tokens)?;
    let op = match peek(tokens) {
        Some(Token::Assign) => AssignOp::Assign,
        Some(Token::AddAssign) => AssignOp::Compound(BinaryOp::Add),
        Some(Token::SubAssign) => AssignOp::Compound(BinaryOp::Sub),
        Some(Token::MulAssign) => AssignOp::Compound(BinaryOp::Mul),
        Some(Token::DivAssign) => AssignOp::Compound(BinaryOp::Div),
        Some(Token::ModAssign) => AssignOp::Compound(BinaryOp::Mod),
        Some(Token::PowAssign) => AssignOp::Compound(BinaryOp::Pow),
        Some(Token::LogicalAndAssign) => AssignOp::Logical(LogicalOp::And),
        Some(Token::LogicalOrAssign) => AssignOp::Logical(LogicalOp::Or),
        Some(Token::NullishAssign) => AssignOp::Logical(LogicalOp::Nullish),
        _ => return Ok(left),
    };
    let op_token = tokens.remove(0);
    if !matches!(left, Expr::Var(_)) {
        return Err(raise_syntax_error!("Invalid left-hand side in assignment", op_token.line, op_token.column));
    }
    let right = parse_assignment(tokens)?;
    Ok(Expr::Assign(Box::new(left), op, Box::new(right)))
}

pub fn parse_conditional(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let condition = parse_nullish(tokens)?;
    if !next_is(tokens, &Token::QuestionMark) {
        return Ok(condition);
    }
    tokens.remove(0); // consume ?
    let true_expr = parse_assignment(tokens)?;
    expect(tokens, Token::Colon)?;
    let false_expr = parse_assignment(tokens)?;
    Ok(Expr::Conditional(Box::new(condition), Box::new(true_expr), Box::new(false_expr)))
}

fn parse_nullish(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let (mut left, mut mixed) = parse_logical_or(tokens)?;
    while next_is(tokens, &Token::NullishCoalescing) {
        let op_token = tokens.remove(0);
        let (right, right_mixed) = parse_logical_or(tokens)?;
        if mixed || right_mixed {
            return Err(raise_syntax_error!(
                "Unexpected token '??': cannot mix with '||' or '&&' without parentheses",
                op_token.line,
                op_token.column
            ));
        }
        left = Expr::Logical(Box::new(left), LogicalOp::Nullish, Box::new(right));
        mixed = false;
    }
    Ok(left)
}

// The flag is set when a `||` or `&&` was consumed outside parentheses.
fn parse_logical_or(tokens: &mut Vec<TokenData>) -> Result<(Expr, bool), JSError> {
    let (mut left, mut bare) = parse_logical_and(tokens)?;
    while next_is(tokens, &Token::LogicalOr) {
        tokens.remove(0);
        let (right, _) = parse_logical_and(tokens)?;
        left = Expr::Logical(Box::new(left), LogicalOp::Or, Box::new(right));
        bare = true;
    }
    Ok((left, bare))
}

fn parse_logical_and(tokens: &mut Vec<TokenData>) -> Result<(Expr, bool), JSError> {
    let mut left = parse_bit_or(tokens)?;
    let mut bare = false;
    while next_is(tokens, &Token::LogicalAnd) {
        tokens.remove(0);
        let right = parse_bit_or(tokens)?;
        left = Expr::Logical(Box::new(left), LogicalOp::And, Box::new(right));
        bare = true;
    }
    Ok((left, bare))
}

// Left-associative binary level: `a op b op c` folds as `(a op b) op c`.
fn parse_binary_level(
    tokens: &mut Vec<TokenData>,
    ops: &[(Token, BinaryOp)],
    next: fn(&mut Vec<TokenData>) -> Result<Expr, JSError>,
) -> Result<Expr, JSError> {
    let mut left = next(tokens)?;
    while let Some(op) = peek(tokens).and_then(|t| ops.iter().find(|(tok, _)| tok == t).map(|(_, op)| *op)) {
        tokens.remove(0);
        let right = next(tokens)?;
        left = Expr::Binary(Box::new(left), op, Box::new(right));
    }
    Ok(left)
}

fn parse_bit_or(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(tokens, &[(Token::BitOr, BinaryOp::BitOr)], parse_bit_xor)
}

fn parse_bit_xor(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(tokens, &[(Token::BitXor, BinaryOp::BitXor)], parse_bit_and)
}

fn parse_bit_and(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(tokens, &[(Token::BitAnd, BinaryOp::BitAnd)], parse_equality)
}

fn parse_equality(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(
        tokens,
        &[
            (Token::Equal, BinaryOp::Equal),
            (Token::NotEqual, BinaryOp::NotEqual),
            (Token::StrictEqual, BinaryOp::StrictEqual),
            (Token::StrictNotEqual, BinaryOp::StrictNotEqual),
        ],
        parse_relational,
    )
}

fn parse_relational(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(
        tokens,
        &[
            (Token::LessThan, BinaryOp::LessThan),
            (Token::GreaterThan, BinaryOp::GreaterThan),
            (Token::LessEqual, BinaryOp::LessEqual),
            (Token::GreaterEqual, BinaryOp::GreaterEqual),
            (Token::In, BinaryOp::In),
        ],
        parse_shift,
    )
}

fn parse_shift(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(
        tokens,
        &[
            (Token::LeftShift, BinaryOp::LeftShift),
            (Token::RightShift, BinaryOp::RightShift),
            (Token::UnsignedRightShift, BinaryOp::UnsignedRightShift),
        ],
        parse_additive,
    )
}

fn parse_additive(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(tokens, &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)], parse_multiplicative)
}

fn parse_multiplicative(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    parse_binary_level(
        tokens,
        &[(Token::Multiply, BinaryOp::Mul), (Token::Divide, BinaryOp::Div), (Token::Mod, BinaryOp::Mod)],
        parse_exponentiation,
    )
}

fn parse_exponentiation(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    // Right-associative exponentiation operator: a ** b ** c -> a ** (b ** c)
    let starts_with_unary = matches!(
        peek(tokens),
        Some(Token::LogicalNot | Token::Minus | Token::Plus | Token::BitNot | Token::TypeOf | Token::Void)
    );
    let left = parse_unary(tokens)?;
    if !next_is(tokens, &Token::Exponent) {
        return Ok(left);
    }
    if starts_with_unary {
        let t = &tokens[0];
        return Err(raise_syntax_error!(
            "Unary operator used immediately before exponentiation expression",
            t.line,
            t.column
        ));
    }
    tokens.remove(0);
    let right = parse_exponentiation(tokens)?;
    Ok(Expr::Binary(Box::new(left), BinaryOp::Pow, Box::new(right)))
}

fn parse_unary(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let op = match peek(tokens) {
        Some(Token::LogicalNot) => UnaryOp::Not,
        Some(Token::Minus) => UnaryOp::Neg,
        Some(Token::Plus) => UnaryOp::Plus,
        Some(Token::BitNot) => UnaryOp::BitNot,
        Some(Token::TypeOf) => UnaryOp::TypeOf,
        Some(Token::Void) => UnaryOp::Void,
        Some(Token::Increment | Token::Decrement) => {
            let op_token = tokens.remove(0);
            let delta = if op_token.token == Token::Increment { 1.0 } else { -1.0 };
            let target = parse_unary(tokens)?;
            if !matches!(target, Expr::Var(_)) {
                return Err(raise_syntax_error!(
                    "Invalid left-hand side expression in prefix operation",
                    op_token.line,
                    op_token.column
                ));
            }
            return Ok(Expr::Update(Box::new(target), delta, true));
        }
        _ => return parse_postfix(tokens),
    };
    tokens.remove(0);
    let inner = parse_unary(tokens)?;
    Ok(Expr::Unary(op, Box::new(inner)))
}

fn parse_postfix(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let expr = parse_call_member(tokens)?;
    match tokens.first() {
        Some(t) if matches!(t.token, Token::Increment | Token::Decrement) && !t.newline_before => {
            let op_token = tokens.remove(0);
            if !matches!(expr, Expr::Var(_)) {
                return Err(raise_syntax_error!(
                    "Invalid left-hand side expression in postfix operation",
                    op_token.line,
                    op_token.column
                ));
            }
            let delta = if op_token.token == Token::Increment { 1.0 } else { -1.0 };
            Ok(Expr::Update(Box::new(expr), delta, false))
        }
        _ => Ok(expr),
    }
}

fn parse_arguments(tokens: &mut Vec<TokenData>) -> Result<Vec<Expr>, JSError> {
    expect(tokens, Token::LParen)?;
    parse_element_list(tokens, Token::RParen)
}

// Comma separated expressions with optional spread, up to and including `close`.
fn parse_element_list(tokens: &mut Vec<TokenData>, close: Token) -> Result<Vec<Expr>, JSError> {
    let mut items = Vec::new();
    loop {
        if next_is(tokens, &close) {
            tokens.remove(0);
            return Ok(items);
        }
        if next_is(tokens, &Token::Spread) {
            tokens.remove(0);
            items.push(Expr::Spread(Box::new(parse_assignment(tokens)?)));
        } else {
            items.push(parse_assignment(tokens)?);
        }
        match peek(tokens) {
            Some(Token::Comma) => {
                tokens.remove(0);
            }
            Some(t) if *t == close => {}
            _ => return Err(raise_parse_error_at(tokens)),
        }
    }
}

fn parse_property_name(tokens: &mut Vec<TokenData>) -> Result<String, JSError> {
    match tokens.first().and_then(|t| t.token.as_identifier_string()) {
        Some(name) => {
            tokens.remove(0);
            Ok(name)
        }
        None => Err(raise_parse_error_at(tokens)),
    }
}

fn parse_call_member(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let mut expr = if next_is(tokens, &Token::New) {
        tokens.remove(0);
        let mut callee = parse_primary(tokens)?;
        loop {
            match peek(tokens) {
                Some(Token::Dot) => {
                    tokens.remove(0);
                    let name = parse_property_name(tokens)?;
                    callee = Expr::Property(Box::new(callee), name, false);
                }
                Some(Token::LBracket) => {
                    tokens.remove(0);
                    let key = parse_expression(tokens)?;
                    expect(tokens, Token::RBracket)?;
                    callee = Expr::Index(Box::new(callee), Box::new(key), false);
                }
                _ => break,
            }
        }
        let args = if next_is(tokens, &Token::LParen) { parse_arguments(tokens)? } else { Vec::new() };
        Expr::New(Box::new(callee), args)
    } else {
        parse_primary(tokens)?
    };

    let mut has_optional = false;
    loop {
        match peek(tokens) {
            Some(Token::Dot) => {
                tokens.remove(0);
                let name = parse_property_name(tokens)?;
                expr = Expr::Property(Box::new(expr), name, false);
            }
            Some(Token::OptionalChain) => {
                tokens.remove(0);
                has_optional = true;
                match peek(tokens) {
                    Some(Token::LParen) => {
                        let args = parse_arguments(tokens)?;
                        expr = Expr::Call(Box::new(expr), args, true);
                    }
                    Some(Token::LBracket) => {
                        tokens.remove(0);
                        let key = parse_expression(tokens)?;
                        expect(tokens, Token::RBracket)?;
                        expr = Expr::Index(Box::new(expr), Box::new(key), true);
                    }
                    _ => {
                        let name = parse_property_name(tokens)?;
                        expr = Expr::Property(Box::new(expr), name, true);
                    }
                }
            }
            Some(Token::LBracket) => {
                tokens.remove(0);
                let key = parse_expression(tokens)?;
                expect(tokens, Token::RBracket)?;
                expr = Expr::Index(Box::new(expr), Box::new(key), false);
            }
            Some(Token::LParen) => {
                let args = parse_arguments(tokens)?;
                expr = Expr::Call(Box::new(expr), args, false);
            }
            _ => break,
        }
    }
    if has_optional {
        expr = Expr::OptionalChain(Box::new(expr));
    }
    Ok(expr)
}

fn parse_template(parts: Vec<TemplatePart>) -> Result<Expr, JSError> {
    let mut exprs = Vec::new();
    for part in parts {
        match part {
            TemplatePart::String(s) => exprs.push(Expr::StringLit(s)),
            TemplatePart::Expr(mut expr_tokens) => {
                let expr = parse_expression(&mut expr_tokens)?;
                if !expr_tokens.is_empty() {
                    return Err(raise_parse_error_at(&expr_tokens));
                }
                exprs.push(expr);
            }
        }
    }
    Ok(Expr::Template(exprs))
}

fn parse_primary(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    if tokens.is_empty() {
        return Err(raise_parse_error_at(tokens));
    }
    let current = tokens.remove(0);
    let expr = match current.token {
        Token::Number(n) => Expr::Number(n),
        Token::StringLit(s) => Expr::StringLit(s),
        Token::TemplateString(parts) => parse_template(parts)?,
        Token::True => Expr::Boolean(true),
        Token::False => Expr::Boolean(false),
        Token::Null => Expr::Null,
        Token::Identifier(name) => Expr::Var(name),
        Token::LParen => {
            let inner = parse_expression(tokens)?;
            expect(tokens, Token::RParen)?;
            inner
        }
        Token::LBracket => Expr::Array(parse_element_list(tokens, Token::RBracket)?),
        Token::LBrace => parse_object_literal(tokens)?,
        Token::Function => {
            let name = match peek(tokens) {
                Some(Token::Identifier(_)) => Some(expect_identifier(tokens)?),
                _ => None,
            };
            parse_function_rest(tokens, name)?
        }
        _ => {
            tokens.insert(0, current);
            return Err(raise_parse_error_at(tokens));
        }
    };
    Ok(expr)
}

// After `{`: members up to and including the closing `}`.
fn parse_object_literal(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let mut members = Vec::new();
    loop {
        if next_is(tokens, &Token::RBrace) {
            tokens.remove(0);
            return Ok(Expr::Object(members));
        }
        if next_is(tokens, &Token::Spread) {
            tokens.remove(0);
            members.push(ObjectMember::Spread(parse_assignment(tokens)?));
        } else {
            let (key, shorthand_name) = match peek(tokens) {
                Some(Token::LBracket) => {
                    tokens.remove(0);
                    let key = parse_assignment(tokens)?;
                    expect(tokens, Token::RBracket)?;
                    (PropertyKey::Computed(key), None)
                }
                Some(Token::StringLit(s)) => {
                    let s = s.clone();
                    tokens.remove(0);
                    (PropertyKey::Static(s), None)
                }
                Some(Token::Number(n)) => {
                    let n = *n;
                    tokens.remove(0);
                    (PropertyKey::Static(crate::core::format_js_number(n)), None)
                }
                Some(Token::Identifier(name)) => {
                    let name = name.clone();
                    tokens.remove(0);
                    (PropertyKey::Static(name.clone()), Some(name))
                }
                _ => {
                    let name = parse_property_name(tokens)?;
                    (PropertyKey::Static(name), None)
                }
            };
            let value = match peek(tokens) {
                Some(Token::Colon) => {
                    tokens.remove(0);
                    parse_assignment(tokens)?
                }
                Some(Token::LParen) => {
                    let name = match &key {
                        PropertyKey::Static(s) => Some(s.clone()),
                        PropertyKey::Computed(_) => None,
                    };
                    parse_function_rest(tokens, name)?
                }
                _ => match shorthand_name {
                    Some(name) => Expr::Var(name),
                    None => return Err(raise_parse_error_at(tokens)),
                },
            };
            members.push(ObjectMember::Property(key, value));
        }
        match peek(tokens) {
            Some(Token::Comma) => {
                tokens.remove(0);
            }
            Some(Token::RBrace) => {}
            _ => return Err(raise_parse_error_at(tokens)),
        }
    }
}

/// Parameter list after `(`, up to and including `)`.
pub fn parse_parameters(tokens: &mut Vec<TokenData>) -> Result<Vec<Param>, JSError> {
    let mut params = Vec::new();
    loop {
        if next_is(tokens, &Token::RParen) {
            tokens.remove(0);
            return Ok(params);
        }
        let rest = next_is(tokens, &Token::Spread);
        if rest {
            tokens.remove(0);
        }
        let pattern = parse_binding_pattern(tokens)?;
        let default = if !rest && next_is(tokens, &Token::Assign) {
            tokens.remove(0);
            Some(parse_assignment(tokens)?)
        } else {
            None
        };
        params.push(Param { pattern, default, rest });
        match peek(tokens) {
            Some(Token::Comma) if !rest => {
                tokens.remove(0);
            }
            Some(Token::RParen) => {}
            _ => return Err(raise_parse_error_at(tokens)),
        }
    }
}

/// A binding target: a name, or an array or object destructuring pattern.
pub(crate) fn parse_binding_pattern(tokens: &mut Vec<TokenData>) -> Result<Pattern, JSError> {
    match peek(tokens) {
        Some(Token::LBracket) => {
            tokens.remove(0);
            parse_array_pattern(tokens)
        }
        Some(Token::LBrace) => {
            tokens.remove(0);
            parse_object_pattern(tokens)
        }
        _ => Ok(Pattern::Identifier(expect_identifier(tokens)?)),
    }
}

fn parse_pattern_element(tokens: &mut Vec<TokenData>, target: Pattern) -> Result<PatternElement, JSError> {
    let default = if next_is(tokens, &Token::Assign) {
        tokens.remove(0);
        Some(parse_assignment(tokens)?)
    } else {
        None
    };
    Ok(PatternElement { target, default })
}

// After `[`: elements up to and including `]`.
fn parse_array_pattern(tokens: &mut Vec<TokenData>) -> Result<Pattern, JSError> {
    let mut elements = Vec::new();
    loop {
        match peek(tokens) {
            Some(Token::RBracket) => {
                tokens.remove(0);
                return Ok(Pattern::Array(elements, None));
            }
            Some(Token::Comma) => {
                tokens.remove(0);
                elements.push(None);
                continue;
            }
            Some(Token::Spread) => {
                tokens.remove(0);
                let rest = parse_binding_pattern(tokens)?;
                expect(tokens, Token::RBracket)?;
                return Ok(Pattern::Array(elements, Some(Box::new(rest))));
            }
            _ => {
                let target = parse_binding_pattern(tokens)?;
                elements.push(Some(parse_pattern_element(tokens, target)?));
            }
        }
        match peek(tokens) {
            Some(Token::Comma) => {
                tokens.remove(0);
            }
            Some(Token::RBracket) => {}
            _ => return Err(raise_parse_error_at(tokens)),
        }
    }
}

// After `{`: properties up to and including `}`.
fn parse_object_pattern(tokens: &mut Vec<TokenData>) -> Result<Pattern, JSError> {
    let mut props = Vec::new();
    loop {
        if next_is(tokens, &Token::RBrace) {
            tokens.remove(0);
            return Ok(Pattern::Object(props, None));
        }
        if next_is(tokens, &Token::Spread) {
            tokens.remove(0);
            let rest = expect_identifier(tokens)?;
            expect(tokens, Token::RBrace)?;
            return Ok(Pattern::Object(props, Some(rest)));
        }
        let (key, shorthand) = match peek(tokens) {
            Some(Token::LBracket) => {
                tokens.remove(0);
                let key = parse_assignment(tokens)?;
                expect(tokens, Token::RBracket)?;
                (PropertyKey::Computed(key), None)
            }
            Some(Token::StringLit(s)) => {
                let key = s.clone();
                tokens.remove(0);
                (PropertyKey::Static(key), None)
            }
            Some(Token::Number(n)) => {
                let key = crate::core::format_js_number(*n);
                tokens.remove(0);
                (PropertyKey::Static(key), None)
            }
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                tokens.remove(0);
                (PropertyKey::Static(name.clone()), Some(name))
            }
            _ => (PropertyKey::Static(parse_property_name(tokens)?), None),
        };
        let element = if next_is(tokens, &Token::Colon) {
            tokens.remove(0);
            let target = parse_binding_pattern(tokens)?;
            parse_pattern_element(tokens, target)?
        } else {
            match shorthand {
                Some(name) => parse_pattern_element(tokens, Pattern::Identifier(name))?,
                None => return Err(raise_parse_error_at(tokens)),
            }
        };
        props.push((key, element));
        match peek(tokens) {
            Some(Token::Comma) => {
                tokens.remove(0);
            }
            Some(Token::RBrace) => {}
            _ => return Err(raise_parse_error_at(tokens)),
        }
    }
}

pub(crate) fn parse_block_body(tokens: &mut Vec<TokenData>) -> Result<Vec<crate::core::Statement>, JSError> {
    expect(tokens, Token::LBrace)?;
    let body = parse_statements(tokens)?;
    expect(tokens, Token::RBrace)?;
    Ok(body)
}

/// `(params) { body }` of a function expression, declaration or method.
pub(crate) fn parse_function_rest(tokens: &mut Vec<TokenData>, name: Option<String>) -> Result<Expr, JSError> {
    expect(tokens, Token::LParen)?;
    let params = parse_parameters(tokens)?;
    let body = parse_block_body(tokens)?;
    Ok(Expr::Function(Rc::new(FunctionDef {
        name,
        params,
        body: FunctionBody::Block(body),
        is_arrow: false,
    })))
}

fn is_arrow_function_start(tokens: &[TokenData]) -> bool {
    match peek(tokens) {
        Some(Token::Identifier(_)) => matches!(tokens.get(1).map(|t| &t.token), Some(Token::Arrow)),
        Some(Token::LParen) => {
            let mut depth = 0usize;
            for (i, t) in tokens.iter().enumerate() {
                match t.token {
                    Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                    Token::RParen | Token::RBracket | Token::RBrace => {
                        depth -= 1;
                        if depth == 0 {
                            return matches!(tokens.get(i + 1).map(|t| &t.token), Some(Token::Arrow));
                        }
                    }
                    _ => {}
                }
            }
            false
        }
        _ => false,
    }
}

fn parse_arrow_function(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    let params = if next_is(tokens, &Token::LParen) {
        tokens.remove(0);
        parse_parameters(tokens)?
    } else {
        let name = expect_identifier(tokens)?;
        vec![Param {
            pattern: Pattern::Identifier(name),
            default: None,
            rest: false,
        }]
    };
    expect(tokens, Token::Arrow)?;
    let body = if next_is(tokens, &Token::LBrace) {
        FunctionBody::Block(parse_block_body(tokens)?)
    } else {
        FunctionBody::Expr(Box::new(parse_assignment(tokens)?))
    };
    Ok(Expr::Function(Rc::new(FunctionDef {
        name: None,
        params,
        body,
        is_arrow: true,
    })))
}
