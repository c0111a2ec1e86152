//! Input-completeness check for the interactive REPL.
//!
//! `is_complete_input` decides whether a buffer can be handed to the
//! evaluator or whether the prompt should keep collecting lines. It is a
//! scanner, not a parser: brackets are matched while skipping string
//! literals, comments and the text parts of template literals.

#[derive(Clone, Copy, PartialEq, Debug)]
enum Mode {
    Code,
    Quoted(char),
    Template,
    LineComment,
    BlockComment,
}

/// Returns true when `src` has no open bracket, string, template literal or
/// block comment left at its end.
///
/// A mismatched or surplus closing bracket also counts as complete, so that
/// the parser gets to report the syntax error.
pub fn is_complete_input(src: &str) -> bool {
    // Expected closers. A `}` that came from `${` also returns to template mode.
    let mut closers: Vec<(char, bool)> = Vec::new();
    let mut mode = Mode::Code;
    let mut chars = src.chars().peekable();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::LineComment => {
                if ch == '\n' {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                }
            }
            Mode::Quoted(quote) => match ch {
                '\\' => {
                    chars.next();
                }
                '\n' => return true,
                c if c == quote => mode = Mode::Code,
                _ => {}
            },
            Mode::Template => match ch {
                '\\' => {
                    chars.next();
                }
                '`' => mode = Mode::Code,
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    closers.push(('}', true));
                    mode = Mode::Code;
                }
                _ => {}
            },
            Mode::Code => match ch {
                '\'' | '"' => mode = Mode::Quoted(ch),
                '`' => mode = Mode::Template,
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    mode = Mode::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                '(' => closers.push((')', false)),
                '[' => closers.push((']', false)),
                '{' => closers.push(('}', false)),
                ')' | ']' | '}' => match closers.pop() {
                    Some((expected, resume_template)) if expected == ch => {
                        if resume_template {
                            mode = Mode::Template;
                        }
                    }
                    _ => return true,
                },
                _ => {}
            },
        }
    }

    closers.is_empty() && matches!(mode, Mode::Code | Mode::LineComment)
}
