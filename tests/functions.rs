use jsref::{Value, evaluate, evaluate_script};

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
fn closure_counter_keeps_private_state() {
    let script = r#"
        function makeCounter() {
            let count = 0;
            return () => {
                count++;
                return count;
            };
        }
        const counter = makeCounter();
        const other = makeCounter();
        counter();
        counter();
        [counter(), other()]
    "#;
    assert_eq!(show(script), "[ 3, 1 ]");
}

#[test]
fn currying() {
    match evaluate_script("const multiply = (a) => (b) => a * b; const double = multiply(2); double(21)") {
        Ok(Value::Number(n)) => assert_eq!(n, 42.0),
        other => panic!("Expected 42, got {other:?}"),
    }
    assert_eq!(show("const add = a => b => c => a + b + c; add(1)(2)(3)"), "6");
}

#[test]
fn default_and_rest_parameters() {
    assert_eq!(show("function greet(name = 'Guest') { return 'Hello, ' + name; } [greet(), greet('Ann')]"), "[ 'Hello, Guest', 'Hello, Ann' ]");
    assert_eq!(show("const sum = (...nums) => nums.reduce((a, b) => a + b, 0); sum(1, 2, 3, 4)"), "10");
    assert_eq!(show("const f = (first, ...others) => others; f(1)"), "[]");
    assert_eq!(show("const f = (a, b = a * 2) => a + b; f(3)"), "9");
    assert_eq!(show("const f = (a, b = 5) => a + b; f(1, undefined)"), "6");
    assert_eq!(show("const f = (a, b = 5) => b; f(1, null)"), "null");
}

#[test]
fn function_names_and_arity() {
    assert_eq!(show("const add = (a, b) => a + b; add.name"), "add");
    assert_eq!(show("const add = (a, b) => a + b; add"), "[Function: add]");
    assert_eq!(show("function named() {} named"), "[Function: named]");
    assert_eq!(show("[() => 1][0]"), "[Function (anonymous)]");
    assert_eq!(show("const f = (a, b = 1, ...c) => 0; f.length"), "1");
    assert_eq!(show("const o = { run: () => 1 }; o.run.name"), "run");
}

#[test]
fn recursion_and_hoisting() {
    assert_eq!(show("function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); } fact(10)"), "3628800");
    // Declarations are hoisted within their block.
    assert_eq!(show("const r = twice(4); function twice(x) { return x * 2; } r"), "8");
    assert_eq!(show("const fib = function inner(n) { return n < 2 ? n : inner(n - 1) + inner(n - 2); }; fib(12)"), "144");
}

#[test]
fn higher_order_functions() {
    assert_eq!(show("const compose = (f, g) => x => f(g(x)); compose(x => x + 1, x => x * 2)(5)"), "11");
    assert_eq!(show("(function () { return 42; })()"), "42");
    assert_eq!(show("['1', '2', '3'].map(Number)"), "[ 1, 2, 3 ]");
    assert_eq!(show("[0, 1, '', 'a'].filter(Boolean)"), "[ 1, 'a' ]");
}

#[test]
fn block_body_without_return_yields_undefined() {
    assert_eq!(show("const f = () => { 1 + 1; }; f()"), "undefined");
    assert_eq!(show("const f = () => ({ wrapped: true }); f()"), "{ wrapped: true }");
}

#[test]
fn calling_a_non_function_fails() {
    let err = evaluate("const x = 5; x()", None).unwrap_err();
    assert!(err.message().contains("x is not a function"), "{}", err.message());
    let err = evaluate("({}).missing()", None).unwrap_err();
    assert!(err.message().contains("is not a function"), "{}", err.message());
}

#[test]
fn runaway_recursion_is_stopped() {
    // Deep interpreter recursion needs more than the default test thread stack.
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            // JSError is not Send, so check it on the spawned thread.
            let err = evaluate("function down(n) { return down(n + 1); } down(0)", None).unwrap_err();
            assert!(err.message().contains("Maximum call stack size exceeded"), "{}", err.message());
        })
        .unwrap();
    handle.join().unwrap();

    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            assert_eq!(
                evaluate("function depth(n) { return n === 0 ? 0 : 1 + depth(n - 1); } depth(200)", None).unwrap(),
                "200"
            );
        })
        .unwrap();
    handle.join().unwrap();
}
