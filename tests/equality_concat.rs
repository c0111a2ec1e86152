use jsref::{Environment, Value, evaluate, evaluate_script};
use proptest::prelude::*;

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn eval_bool(script: &str) -> bool {
    match evaluate_script(script) {
        Ok(Value::Boolean(b)) => b,
        other => panic!("Expected boolean from `{script}`, got {other:?}"),
    }
}

#[test]
fn loose_equality_coerces_numeric_strings() {
    assert!(eval_bool("5 == '5'"));
    assert!(eval_bool("0 == ''"));
    assert!(eval_bool("true == 1"));
    assert!(eval_bool("false == '0'"));
    assert!(eval_bool("null == undefined"));
    assert!(!eval_bool("null == 0"));
    assert!(!eval_bool("NaN == NaN"));
}

#[test]
fn strict_equality_never_coerces() {
    assert!(!eval_bool("5 === '5'"));
    assert!(eval_bool("5 !== '5'"));
    assert!(!eval_bool("null === undefined"));
    assert!(!eval_bool("NaN === NaN"));
}

#[test]
fn aggregates_compare_by_identity() {
    assert!(eval_bool("let a = {}; let b = a; a === b"));
    assert!(!eval_bool("let a = {}; a === {}"));
    assert!(!eval_bool("[1, 2] == [1, 2]"));
    assert!(eval_bool("[1, 2] == '1,2'"));
}

#[test]
fn string_concat_wins_for_plus() {
    match evaluate_script("\"5\" + 3") {
        Ok(Value::String(s)) => assert_eq!(s, "53"),
        other => panic!("Expected string '53', got {other:?}"),
    }
    match evaluate_script("\"5\" - 3") {
        Ok(Value::Number(n)) => assert_eq!(n, 2.0),
        other => panic!("Expected number 2, got {other:?}"),
    }
    match evaluate_script("'a' + undefined") {
        Ok(Value::String(s)) => assert_eq!(s, "aundefined"),
        other => panic!("Expected string 'aundefined', got {other:?}"),
    }
}

#[test]
fn other_arithmetic_coerces_to_number() {
    assert_eq!(evaluate("'6' * '7'", None).unwrap(), "42");
    assert_eq!(evaluate("'10' / 4", None).unwrap(), "2.5");
    assert_eq!(evaluate("'abc' * 2", None).unwrap(), "NaN");
    assert_eq!(evaluate("1 + 2 + '3'", None).unwrap(), "33");
    assert_eq!(evaluate("'1' + 2 + 3", None).unwrap(), "123");
    assert_eq!(evaluate("true + true", None).unwrap(), "2");
    assert_eq!(evaluate("null + 1", None).unwrap(), "1");
    assert_eq!(evaluate("undefined + 1", None).unwrap(), "NaN");
}

#[test]
fn template_literals_stringify_values() {
    assert_eq!(evaluate("const name = 'Ann'; `Hi ${name}, ${1 + 1} times`", None).unwrap(), "Hi Ann, 2 times");
    assert_eq!(evaluate("`${[1, 2]} and ${null}`", None).unwrap(), "1,2 and null");
}

proptest! {
    #[test]
    fn number_loosely_equals_its_string(a in proptest::num::f64::NORMAL | proptest::num::f64::ZERO | proptest::num::f64::SUBNORMAL) {
        let env = Environment::new();
        env.define("a", Value::Number(a));
        prop_assert_eq!(evaluate("a == String(a)", Some(&env)).unwrap(), "true");
    }

    #[test]
    fn integers_loosely_equal_their_string(a in -1_000_000_000i64..1_000_000_000i64) {
        let script = format!("{a} == String({a})");
        prop_assert_eq!(evaluate(&script, None).unwrap(), "true");
    }
}
