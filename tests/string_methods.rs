use jsref::{Value, evaluate, evaluate_script};

#[ctor::ctor]
fn __init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default()).is_test(true).try_init();
}

fn eval_str(script: &str) -> String {
    match evaluate_script(script) {
        Ok(Value::String(s)) => s,
        other => panic!("Expected string from `{script}`, got {other:?}"),
    }
}

#[test]
fn length_and_index_access() {
    assert_eq!(evaluate("'Hello'.length", None).unwrap(), "5");
    assert_eq!(eval_str("const s = 'Hello'; s[1]"), "e");
    assert_eq!(evaluate("'Hello'[10]", None).unwrap(), "undefined");
    assert_eq!(eval_str("'Hello'.charAt(0)"), "H");
    assert_eq!(evaluate("'Hello'.charCodeAt(0)", None).unwrap(), "72");
    assert_eq!(eval_str("'Hello'.at(-1)"), "o");
}

#[test]
fn searching() {
    assert_eq!(evaluate("'Hello World'.indexOf('o')", None).unwrap(), "4");
    assert_eq!(evaluate("'Hello World'.lastIndexOf('o')", None).unwrap(), "7");
    assert_eq!(evaluate("'Hello World'.indexOf('xyz')", None).unwrap(), "-1");
    assert_eq!(evaluate("'Hello World'.includes('World')", None).unwrap(), "true");
    assert_eq!(evaluate("'Hello World'.startsWith('Hello')", None).unwrap(), "true");
    assert_eq!(evaluate("'Hello World'.endsWith('World')", None).unwrap(), "true");
    assert_eq!(evaluate("'Hello World'.startsWith('World', 6)", None).unwrap(), "true");
}

#[test]
fn extracting() {
    assert_eq!(eval_str("'Hello World'.slice(0, 5)"), "Hello");
    assert_eq!(eval_str("'Hello World'.slice(-5)"), "World");
    assert_eq!(eval_str("'Hello World'.substring(6)"), "World");
    assert_eq!(eval_str("'Hello World'.substring(5, 0)"), "Hello");
    assert_eq!(eval_str("'Hello World'.substr(6, 3)"), "Wor");
}

#[test]
fn transforming() {
    assert_eq!(eval_str("'Hello'.toUpperCase()"), "HELLO");
    assert_eq!(eval_str("'Hello'.toLowerCase()"), "hello");
    assert_eq!(eval_str("'  padded  '.trim()"), "padded");
    assert_eq!(eval_str("'  padded  '.trimStart()"), "padded  ");
    assert_eq!(eval_str("'  padded  '.trimEnd()"), "  padded");
    assert_eq!(eval_str("\"5\".padStart(3, \"0\")"), "005");
    assert_eq!(eval_str("'5'.padEnd(3, '*')"), "5**");
    assert_eq!(eval_str("\"ha\".repeat(3)"), "hahaha");
    assert_eq!(eval_str("'a'.concat('b', 1, null)"), "ab1null");
}

#[test]
fn replacing_and_splitting() {
    assert_eq!(eval_str("'cat cat'.replace('cat', 'dog')"), "dog cat");
    assert_eq!(eval_str("'cat cat'.replaceAll('cat', 'dog')"), "dog dog");
    assert_eq!(eval_str("'a-b'.replace('-', m => `[${m}]`)"), "a[-]b");
    assert_eq!(evaluate("'a,b,c'.split(',')", None).unwrap(), "[ 'a', 'b', 'c' ]");
    assert_eq!(evaluate("'abc'.split('')", None).unwrap(), "[ 'a', 'b', 'c' ]");
    assert_eq!(evaluate("'a,b,c'.split(',', 2)", None).unwrap(), "[ 'a', 'b' ]");
    assert_eq!(evaluate("'abc'.split()", None).unwrap(), "[ 'abc' ]");
}

#[test]
fn chained_calls_and_conversions() {
    assert_eq!(eval_str("'  Hello World  '.trim().split(' ').map(w => w.toUpperCase()).join('-')"), "HELLO-WORLD");
    assert_eq!(eval_str("String(123)"), "123");
    assert_eq!(eval_str("String(null)"), "null");
    assert_eq!(eval_str("String([1, [2, 3]])"), "1,2,3");
    assert_eq!(eval_str("(255).toString(16)"), "ff");
    assert_eq!(eval_str("String.fromCharCode(72, 105)"), "Hi");
}

#[test]
fn repeat_rejects_negative_counts() {
    let err = evaluate("'x'.repeat(-1)", None).unwrap_err();
    assert!(err.message().starts_with("RangeError"), "{}", err.message());
}

#[test]
fn oversized_results_are_range_errors() {
    for script in ["'ab'.repeat(1e300)", "'x'.padStart(Infinity)", "'x'.padEnd(2 ** 30, '-')"] {
        let err = evaluate(script, None).unwrap_err();
        assert_eq!(err.message(), "RangeError: Invalid string length", "{script}");
    }
    assert_eq!(eval_str("''.repeat(1e300)"), "");
    assert_eq!(eval_str("'ab'.repeat(0)"), "");
    assert_eq!(eval_str("'5'.padStart(3, '0')"), "005");
    let err = evaluate("'x'.repeat(Infinity)", None).unwrap_err();
    assert!(err.message().starts_with("RangeError: Invalid count value"), "{}", err.message());
}
