use jsref::{Environment, JSError, JSErrorKind, evaluate, parse, parse_script, tokenize};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn eval_err(script: &str) -> JSError {
    match evaluate(script, None) {
        Ok(v) => panic!("Expected `{script}` to fail, got {v}"),
        Err(e) => e,
    }
}

#[test]
fn malformed_input_is_a_syntax_error() {
    for src in ["(1 + 2", "1 +", "'unterminated", "`open template", "/* open comment", "1 @ 2", "let = 5", "[1, 2", "a ? b"] {
        assert_eq!(eval_err(src).kind(), JSErrorKind::SyntaxError, "{src}");
    }
}

#[test]
fn syntax_errors_report_positions() {
    let err = parse_script("let a = 1;\nlet b = ;").unwrap_err();
    assert_eq!(err.js_line(), Some(2));
    assert_eq!(err.js_column(), Some(9));
    assert!(err.to_string().starts_with("SyntaxError: Unexpected token"), "{err}");
}

#[test]
fn trailing_input_is_rejected() {
    assert!(parse("1 2").is_err());
    assert!(parse("(1))").is_err());
    assert!(tokenize("1 + 2").is_ok());
}

#[test]
fn undefined_identifier_is_an_evaluation_error() {
    let err = eval_err("1 + notDefined");
    assert_eq!(err.kind(), JSErrorKind::EvaluationError);
    assert_eq!(err.message(), "ReferenceError: notDefined is not defined");
    assert_eq!(err.context(), Some("notDefined"));
    assert!(err.js_line().is_none());
}

#[test]
fn reading_from_null_and_undefined() {
    let err = eval_err("null.x");
    assert_eq!(err.message(), "TypeError: Cannot read properties of null (reading 'x')");
    let err = eval_err("let u; u.length");
    assert_eq!(err.message(), "TypeError: Cannot read properties of undefined (reading 'length')");
}

#[test]
fn constructors_are_limited() {
    let err = eval_err("new Math.floor(1)");
    assert!(err.message().contains("is not a constructor"), "{}", err.message());
}

#[test]
fn error_display_includes_context() {
    let err = eval_err("const o = { a: 1 }; o.a.b.c");
    let shown = err.to_string();
    assert!(shown.starts_with("EvaluationError: TypeError: Cannot read properties of undefined (reading 'c')"), "{shown}");
    assert!(shown.contains("o.a.b.c"), "{shown}");
    assert!(!err.raised_at().is_empty());
}

#[test]
fn caller_environment_is_read_only_for_evaluations() {
    let env = Environment::new();
    env.define("limit", jsref::Value::Number(3.0));
    assert_eq!(evaluate("let local = limit * 2; local", Some(&env)).unwrap(), "6");
    // Bindings made by one evaluation live in its own child scope.
    assert!(!env.has("local"));
    assert!(evaluate("local", Some(&env)).is_err());
}

#[test]
fn truncated_statements_are_syntax_errors() {
    for src in ["for (", "for (let i = 0;", "for (const x of", "while (", "switch (x) {", "try {} ", "do {} while"] {
        assert_eq!(eval_err(src).kind(), JSErrorKind::SyntaxError, "{src}");
    }
}

#[test]
fn end_of_input_errors_point_past_the_last_character() {
    let err = parse_script("let a = 1;\nlet b =").unwrap_err();
    assert_eq!((err.js_line(), err.js_column()), (Some(2), Some(8)), "{err}");
    let err = eval_err("for (");
    assert_eq!((err.js_line(), err.js_column()), (Some(1), Some(6)), "{err}");
    assert!(err.to_string().contains("Unexpected end of input"), "{err}");
}

#[test]
fn nullish_coalescing_does_not_mix_with_logical_operators() {
    for src in ["a || b ?? c", "a ?? b || c", "a && b ?? c", "a ?? b && c"] {
        let err = eval_err(&format!("let a, b, c; {src}"));
        assert_eq!(err.kind(), JSErrorKind::SyntaxError, "{src}");
        assert!(err.message().contains("'??'"), "{}", err.message());
    }
    assert_eq!(evaluate("let a = 0, b = null; (a || b) ?? 'c'", None).unwrap(), "c");
    assert_eq!(evaluate("let a = null; a ?? (0 || 'd')", None).unwrap(), "d");
    assert_eq!(evaluate("null ?? undefined ?? 3", None).unwrap(), "3");
}

#[test]
fn thrown_errors_are_caught_and_finally_always_runs() {
    let script = r#"
        let log = [];
        function divide(a, b) {
            if (b === 0) throw new Error('Division by zero');
            return a / b;
        }
        try {
            log = [...log, divide(10, 2)];
            log = [...log, divide(1, 0)];
            log = [...log, 'unreachable'];
        } catch (e) {
            log = [...log, e.name + ': ' + e.message];
        } finally {
            log = [...log, 'done'];
        }
        log
    "#;
    assert_eq!(evaluate(script, None).unwrap(), "[ 5, 'Error: Division by zero', 'done' ]");
}

#[test]
fn runtime_errors_are_catchable_as_error_objects() {
    let script = "let r; try { null.x } catch (err) { r = [err.name, err.message.includes('null')] } r";
    assert_eq!(evaluate(script, None).unwrap(), "[ 'TypeError', true ]");
    assert_eq!(evaluate("let r; try { missing } catch { r = 'caught' } r", None).unwrap(), "caught");
    assert_eq!(evaluate("let r; try { throw { code: 7 } } catch ({ code }) { r = code } r", None).unwrap(), "7");
}

#[test]
fn uncaught_throws_end_the_script() {
    let err = eval_err("throw new RangeError('out of range')");
    assert_eq!(err.kind(), JSErrorKind::EvaluationError);
    assert_eq!(err.message(), "Uncaught RangeError: out of range");
    assert!(err.thrown_value().is_some());
    assert_eq!(eval_err("throw 'plain'").message(), "Uncaught plain");
    // finally runs, then the error keeps propagating
    let err = eval_err("let n = 0; try { throw new Error('x') } finally { n = 1 }");
    assert_eq!(err.message(), "Uncaught Error: x");
}

#[test]
fn finally_can_override_the_outcome() {
    let script = "function f() { try { return 'try' } finally { return 'finally' } } f()";
    assert_eq!(evaluate(script, None).unwrap(), "finally");
    let script = "function g() { try { throw new Error('lost') } finally { return 'kept' } } g()";
    assert_eq!(evaluate(script, None).unwrap(), "kept");
}
