use jsref::{JSErrorKind, MAX_LOOP_ITERATIONS, Value, evaluate, evaluate_script};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn show(script: &str) -> String {
    match evaluate(script, None) {
        Ok(s) => s,
        Err(e) => panic!("`{script}` failed: {e}"),
    }
}

#[test]
fn for_loop_accumulates() {
    match evaluate_script("let total = 0; for (let i = 1; i <= 10; i++) { total += i; } total") {
        Ok(Value::Number(n)) => assert_eq!(n, 55.0),
        other => panic!("Expected 55, got {other:?}"),
    }
}

#[test]
fn while_with_break_and_continue() {
    let script = r#"
        let i = 0;
        let odds = '';
        while (true) {
            i++;
            if (i > 9) break;
            if (i % 2 === 0) continue;
            odds += i;
        }
        odds
    "#;
    assert_eq!(show(script), "13579");
}

#[test]
fn break_only_leaves_the_inner_loop() {
    let script = r#"
        let pairs = 0;
        for (let a = 0; a < 3; a++) {
            for (let b = 0; b < 3; b++) {
                if (b === 1) break;
                pairs++;
            }
        }
        pairs
    "#;
    assert_eq!(show(script), "3");
}

#[test]
fn for_of_and_for_in() {
    assert_eq!(show("let out = ''; for (const c of ['a', 'b', 'c']) { out += c.toUpperCase(); } out"), "ABC");
    assert_eq!(show("let out = []; for (const ch of 'hey') out = [...out, ch]; out"), "[ 'h', 'e', 'y' ]");
    assert_eq!(show("let keys = ''; for (const k in { x: 1, y: 2 }) keys += k; keys"), "xy");
    assert_eq!(show("let idx = ''; for (const i in ['a', 'b']) idx += i; idx"), "01");
    assert!(evaluate("for (const x of 5) {}", None).is_err());
}

#[test]
fn if_else_chains() {
    let script = r#"
        function grade(score) {
            if (score >= 90) {
                return 'A';
            } else if (score >= 80) {
                return 'B';
            } else {
                return 'C';
            }
        }
        [grade(95), grade(85), grade(10)]
    "#;
    assert_eq!(show(script), "[ 'A', 'B', 'C' ]");
    assert_eq!(show("const n = 7; n % 2 === 0 ? 'even' : 'odd'"), "odd");
}

#[test]
fn return_from_inside_a_loop() {
    let script = "function firstOver(xs, limit) { for (const x of xs) { if (x > limit) return x; } return null; } [firstOver([1, 5, 9], 4), firstOver([1], 4)]";
    assert_eq!(show(script), "[ 5, null ]");
}

#[test]
fn completion_value_is_the_last_expression() {
    assert_eq!(show("let x = 1; x + 1"), "2");
    assert_eq!(show("let y = 1;"), "undefined");
    assert_eq!(show("if (true) { 'yes' } else { 'no' }"), "yes");
}

#[test]
fn infinite_loops_are_stopped() {
    let err = evaluate("while (true) {}", None).unwrap_err();
    assert_eq!(err.kind(), JSErrorKind::EvaluationError);
    assert!(
        err.message().contains(&format!("Infinite loop detected (executed {MAX_LOOP_ITERATIONS} iterations)")),
        "{}",
        err.message()
    );
}

#[test]
fn loops_up_to_the_cap_are_allowed() {
    assert_eq!(show("let n = 0; for (let i = 0; i < 100000; i++) n++; n"), "100000");
}

#[test]
fn declarations_and_scoping() {
    assert_eq!(show("var a = 1; var a = 2; a"), "2");
    assert_eq!(show("let s = 'outer'; if (true) { let s = 'inner'; } s"), "outer");
    assert_eq!(show("let a = 1, b = a + 1; b"), "2");
    let err = evaluate("let dup = 1; let dup = 2;", None).unwrap_err();
    assert!(err.message().contains("has already been declared"), "{}", err.message());
}

#[test]
fn const_and_builtin_bindings_cannot_be_reassigned() {
    let err = evaluate("const c = 1; c = 2", None).unwrap_err();
    assert!(err.message().contains("Assignment to constant variable."), "{}", err.message());
    let err = evaluate("Math = {}", None).unwrap_err();
    assert!(err.message().contains("Assignment to constant variable."), "{}", err.message());
    assert_eq!(show("let Math = 'shadowed'; Math"), "shadowed");
}

#[test]
fn assigning_an_undeclared_name_fails() {
    let err = evaluate("undeclared = 5", None).unwrap_err();
    assert!(err.message().contains("ReferenceError: undeclared is not defined"), "{}", err.message());
}

#[test]
fn switch_falls_through_until_break() {
    let script = r#"
        function describe(day) {
            let out = '';
            switch (day) {
                case 'sat':
                case 'sun':
                    out += 'weekend';
                    break;
                case 'mon':
                    out += 'start ';
                default:
                    out += 'weekday';
            }
            return out;
        }
        [describe('sun'), describe('mon'), describe('wed')]
    "#;
    assert_eq!(show(script), "[ 'weekend', 'start weekday', 'weekday' ]");
}

#[test]
fn switch_matches_strictly_and_may_match_nothing() {
    assert_eq!(show("let r = 'none'; switch (1) { case '1': r = 'string'; break; case 1: r = 'number' } r"), "number");
    assert_eq!(show("let r = 'none'; switch (3) { case 1: r = 'one' } r"), "none");
    // default placed first still only runs when no case matches
    assert_eq!(show("let r = ''; switch (2) { default: r += 'd'; case 2: r += '2' } r"), "2");
    assert_eq!(show("let r = ''; switch (9) { default: r += 'd'; case 2: r += '2' } r"), "d2");
}

#[test]
fn continue_inside_switch_targets_the_loop() {
    let script = "let s = ''; for (const n of [1, 2, 3]) { switch (n) { case 2: continue; } s += n } s";
    assert_eq!(show(script), "13");
    let err = evaluate("switch (1) { default: break; default: break }", None).unwrap_err();
    assert_eq!(err.kind(), JSErrorKind::SyntaxError);
}

#[test]
fn do_while_runs_its_body_at_least_once() {
    assert_eq!(show("let n = 10, runs = 0; do { runs++; n++ } while (n < 5); runs"), "1");
    assert_eq!(show("let i = 0, s = ''; do { s += i; i++ } while (i < 4); s"), "0123");
    assert_eq!(show("let i = 0; do { i++; if (i === 3) break } while (true); i"), "3");
    let err = evaluate("do {} while (true)", None).unwrap_err();
    assert_eq!(err.message(), format!("Infinite loop detected (executed {MAX_LOOP_ITERATIONS} iterations)"));
}
