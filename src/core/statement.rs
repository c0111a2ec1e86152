use crate::{
    JSError,
    core::parser::{
        expect, expect_identifier, next_is, parse_binding_pattern, parse_block_body, parse_function_rest, peek, position,
        raise_parse_error_at,
    },
    core::{Expr, FunctionDef, Pattern, Token, TokenData, parse_expression, tokenize},
    raise_syntax_error,
};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub column: usize,
}

impl From<StatementKind> for Statement {
    fn from(kind: StatementKind) -> Self {
        Statement { kind, line: 0, column: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

/// One `case test:` (or `default:` when `test` is `None`) with the statements after it.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    /// `catch (e)`; `None` for a bare `catch { ... }`.
    pub param: Option<Pattern>,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
    Declare(DeclKind, Vec<(Pattern, Option<Expr>)>),
    FunctionDeclaration(Rc<FunctionDef>),
    Expr(Expr),
    Return(Option<Expr>),
    If(Expr, Vec<Statement>, Option<Vec<Statement>>), // condition, then_body, else_body
    While(Expr, Vec<Statement>),
    DoWhile(Vec<Statement>, Expr),
    For(Option<Box<Statement>>, Option<Expr>, Option<Expr>, Vec<Statement>), // init, condition, update, body
    ForOf(DeclKind, Pattern, Expr, Vec<Statement>),                          // binding, iterable, body
    ForIn(DeclKind, Pattern, Expr, Vec<Statement>),                          // binding, object, body
    Switch(Expr, Vec<SwitchCase>),
    Throw(Expr),
    Try(Vec<Statement>, Option<CatchClause>, Option<Vec<Statement>>), // block, handler, finalizer
    Break,
    Continue,
}

/// Tokenize and parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Statement>, JSError> {
    let mut tokens = tokenize(source)?;
    let statements = parse_statements(&mut tokens).map_err(|e| e.at_end_of(source))?;
    if !tokens.is_empty() {
        return Err(raise_parse_error_at(&tokens));
    }
    log::debug!("parse_script: {} statements", statements.len());
    Ok(statements)
}

/// Statements up to (not including) a closing `}` or the end of input.
pub fn parse_statements(tokens: &mut Vec<TokenData>) -> Result<Vec<Statement>, JSError> {
    parse_statements_until(tokens, &[Token::RBrace])
}

fn parse_statements_until(tokens: &mut Vec<TokenData>, stop: &[Token]) -> Result<Vec<Statement>, JSError> {
    let mut statements = Vec::new();
    while let Some(next) = peek(tokens)
        && !stop.contains(next)
    {
        if next_is(tokens, &Token::Semicolon) {
            tokens.remove(0);
            continue;
        }
        log::trace!("parse_statements next token: {:?}", tokens.first().map(|t| &t.token));
        statements.push(parse_statement(tokens)?);
    }
    Ok(statements)
}

pub fn parse_statement(tokens: &mut Vec<TokenData>) -> Result<Statement, JSError> {
    let (line, column) = position(tokens);
    let kind = parse_statement_kind(tokens)?;
    Ok(Statement { kind, line, column })
}

// A statement ends at `;`, before `}`, at end of input, or at a line break.
fn consume_terminator(tokens: &mut Vec<TokenData>) -> Result<(), JSError> {
    match tokens.first() {
        None => Ok(()),
        Some(t) if t.token == Token::Semicolon => {
            tokens.remove(0);
            Ok(())
        }
        Some(t) if t.token == Token::RBrace || t.newline_before => Ok(()),
        Some(_) => Err(raise_parse_error_at(tokens)),
    }
}

fn parse_body(tokens: &mut Vec<TokenData>) -> Result<Vec<Statement>, JSError> {
    if next_is(tokens, &Token::LBrace) {
        parse_block_body(tokens)
    } else {
        Ok(vec![parse_statement(tokens)?])
    }
}

fn parse_condition(tokens: &mut Vec<TokenData>) -> Result<Expr, JSError> {
    expect(tokens, Token::LParen)?;
    let condition = parse_expression(tokens)?;
    expect(tokens, Token::RParen)?;
    Ok(condition)
}

fn parse_declarations(tokens: &mut Vec<TokenData>, kind: DeclKind) -> Result<StatementKind, JSError> {
    let first = parse_binding_pattern(tokens)?;
    parse_declarations_from(tokens, kind, first)
}

// Declarators starting with an already parsed first target.
fn parse_declarations_from(tokens: &mut Vec<TokenData>, kind: DeclKind, first: Pattern) -> Result<StatementKind, JSError> {
    let mut decls = Vec::new();
    let mut target = first;
    loop {
        let init = if next_is(tokens, &Token::Assign) {
            tokens.remove(0);
            Some(parse_expression(tokens)?)
        } else if kind == DeclKind::Const || target.identifier().is_none() {
            let (line, column) = position(tokens);
            let what = if kind == DeclKind::Const { "const" } else { "destructuring" };
            return Err(raise_syntax_error!(format!("Missing initializer in {what} declaration"), line, column));
        } else {
            None
        };
        decls.push((target, init));
        if !next_is(tokens, &Token::Comma) {
            break;
        }
        tokens.remove(0);
        target = parse_binding_pattern(tokens)?;
    }
    Ok(StatementKind::Declare(kind, decls))
}

fn decl_kind(token: Option<&Token>) -> Option<DeclKind> {
    match token {
        Some(Token::Let) => Some(DeclKind::Let),
        Some(Token::Const) => Some(DeclKind::Const),
        Some(Token::Var) => Some(DeclKind::Var),
        _ => None,
    }
}

fn parse_for(tokens: &mut Vec<TokenData>) -> Result<StatementKind, JSError> {
    expect(tokens, Token::LParen)?;

    let (line, column) = position(tokens);
    let init = if next_is(tokens, &Token::Semicolon) {
        None
    } else if let Some(kind) = decl_kind(peek(tokens)) {
        tokens.remove(0);
        let target = parse_binding_pattern(tokens)?;
        // for (const x of items) / for (let k in obj)
        if let Some(is_of) = match peek(tokens) {
            Some(Token::Of) => Some(true),
            Some(Token::In) => Some(false),
            _ => None,
        } {
            tokens.remove(0);
            let source = parse_expression(tokens)?;
            expect(tokens, Token::RParen)?;
            let body = parse_body(tokens)?;
            return Ok(if is_of {
                StatementKind::ForOf(kind, target, source, body)
            } else {
                StatementKind::ForIn(kind, target, source, body)
            });
        }
        Some(Box::new(Statement {
            kind: parse_declarations_from(tokens, kind, target)?,
            line,
            column,
        }))
    } else {
        Some(Box::new(Statement {
            kind: StatementKind::Expr(parse_expression(tokens)?),
            line,
            column,
        }))
    };
    expect(tokens, Token::Semicolon)?;
    let condition = if next_is(tokens, &Token::Semicolon) { None } else { Some(parse_expression(tokens)?) };
    expect(tokens, Token::Semicolon)?;
    let update = if next_is(tokens, &Token::RParen) { None } else { Some(parse_expression(tokens)?) };
    expect(tokens, Token::RParen)?;
    let body = parse_body(tokens)?;
    Ok(StatementKind::For(init, condition, update, body))
}

// After `switch`: `(discriminant) { case ...: ... default: ... }`.
fn parse_switch(tokens: &mut Vec<TokenData>) -> Result<StatementKind, JSError> {
    let discriminant = parse_condition(tokens)?;
    expect(tokens, Token::LBrace)?;
    let mut cases = Vec::new();
    let mut has_default = false;
    loop {
        let test = match peek(tokens) {
            Some(Token::RBrace) => {
                tokens.remove(0);
                return Ok(StatementKind::Switch(discriminant, cases));
            }
            Some(Token::Case) => {
                tokens.remove(0);
                Some(parse_expression(tokens)?)
            }
            Some(Token::Default) => {
                let t = tokens.remove(0);
                if has_default {
                    return Err(raise_syntax_error!("More than one default clause in switch statement", t.line, t.column));
                }
                has_default = true;
                None
            }
            _ => return Err(raise_parse_error_at(tokens)),
        };
        expect(tokens, Token::Colon)?;
        let body = parse_statements_until(tokens, &[Token::Case, Token::Default, Token::RBrace])?;
        cases.push(SwitchCase { test, body });
    }
}

// After `try`: the block, then `catch` and/or `finally`.
fn parse_try(tokens: &mut Vec<TokenData>) -> Result<StatementKind, JSError> {
    let block = parse_block_body(tokens)?;
    let handler = if next_is(tokens, &Token::Catch) {
        tokens.remove(0);
        let param = if next_is(tokens, &Token::LParen) {
            tokens.remove(0);
            let param = parse_binding_pattern(tokens)?;
            expect(tokens, Token::RParen)?;
            Some(param)
        } else {
            None
        };
        let body = parse_block_body(tokens)?;
        Some(CatchClause { param, body })
    } else {
        None
    };
    let finalizer = if next_is(tokens, &Token::Finally) {
        tokens.remove(0);
        Some(parse_block_body(tokens)?)
    } else {
        None
    };
    if handler.is_none() && finalizer.is_none() {
        let (line, column) = position(tokens);
        return Err(raise_syntax_error!("Missing catch or finally after try", line, column));
    }
    Ok(StatementKind::Try(block, handler, finalizer))
}

pub fn parse_statement_kind(tokens: &mut Vec<TokenData>) -> Result<StatementKind, JSError> {
    if let Some(kind) = decl_kind(peek(tokens)) {
        tokens.remove(0);
        let stmt = parse_declarations(tokens, kind)?;
        consume_terminator(tokens)?;
        return Ok(stmt);
    }

    match peek(tokens) {
        Some(Token::Function) if matches!(tokens.get(1).map(|t| &t.token), Some(Token::Identifier(_))) => {
            tokens.remove(0);
            let name = expect_identifier(tokens)?;
            match parse_function_rest(tokens, Some(name))? {
                Expr::Function(def) => Ok(StatementKind::FunctionDeclaration(def)),
                _ => Err(raise_parse_error_at(tokens)),
            }
        }
        Some(Token::Return) => {
            tokens.remove(0);
            let value = match tokens.first() {
                None => None,
                Some(t) if matches!(t.token, Token::Semicolon | Token::RBrace) || t.newline_before => None,
                Some(_) => Some(parse_expression(tokens)?),
            };
            consume_terminator(tokens)?;
            Ok(StatementKind::Return(value))
        }
        Some(Token::If) => {
            tokens.remove(0);
            let condition = parse_condition(tokens)?;
            let then_body = parse_body(tokens)?;
            let else_body = if next_is(tokens, &Token::Else) {
                tokens.remove(0);
                Some(parse_body(tokens)?)
            } else {
                None
            };
            Ok(StatementKind::If(condition, then_body, else_body))
        }
        Some(Token::While) => {
            tokens.remove(0);
            let condition = parse_condition(tokens)?;
            let body = parse_body(tokens)?;
            Ok(StatementKind::While(condition, body))
        }
        Some(Token::Do) => {
            tokens.remove(0);
            let body = parse_body(tokens)?;
            expect(tokens, Token::While)?;
            let condition = parse_condition(tokens)?;
            if next_is(tokens, &Token::Semicolon) {
                tokens.remove(0);
            }
            Ok(StatementKind::DoWhile(body, condition))
        }
        Some(Token::For) => {
            tokens.remove(0);
            parse_for(tokens)
        }
        Some(Token::Switch) => {
            tokens.remove(0);
            parse_switch(tokens)
        }
        Some(Token::Try) => {
            tokens.remove(0);
            parse_try(tokens)
        }
        Some(Token::Throw) => {
            let t = tokens.remove(0);
            if tokens.first().is_none_or(|next| next.newline_before) {
                return Err(raise_syntax_error!("Illegal newline after throw", t.line, t.column));
            }
            let value = parse_expression(tokens)?;
            consume_terminator(tokens)?;
            Ok(StatementKind::Throw(value))
        }
        Some(Token::Break) => {
            tokens.remove(0);
            consume_terminator(tokens)?;
            Ok(StatementKind::Break)
        }
        Some(Token::Continue) => {
            tokens.remove(0);
            consume_terminator(tokens)?;
            Ok(StatementKind::Continue)
        }
        _ => {
            let expr = parse_expression(tokens)?;
            consume_terminator(tokens)?;
            Ok(StatementKind::Expr(expr))
        }
    }
}
