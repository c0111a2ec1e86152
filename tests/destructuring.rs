use jsref::{JSErrorKind, evaluate};

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

const PERSON: &str = "const person = { name: 'John', age: 30, email: 'john@example.com' };";

#[test]
fn array_patterns() {
    assert_eq!(show("let [first, second, ...rest] = [1, 2, 3, 4, 5]; [first, second, rest]"), "[ 1, 2, [ 3, 4, 5 ] ]");
    assert_eq!(show("let [r, g, b = 0] = ['red', 'green']; [r, g, b]"), "[ 'red', 'green', 0 ]");
    assert_eq!(show("let [a, , c] = [1, 2, 3]; [a, c]"), "[ 1, 3 ]");
    assert_eq!(show("let [p, q = 10] = [5]; p + q"), "15");
    assert_eq!(show("let [head, ...tail] = [1]; tail"), "[]");
    assert_eq!(show("const [x, y] = 'hi'; y + x"), "ih");
    assert_eq!(show("const [[n1, n2], [n3]] = [[1, 2], [3]]; n1 + n2 + n3"), "6");
}

#[test]
fn object_patterns() {
    assert_eq!(show(&format!("{PERSON} let {{ name, age, country = 'Unknown' }} = person; [name, age, country]")), "[ 'John', 30, 'Unknown' ]");
    assert_eq!(show(&format!("{PERSON} let {{ name: fullName, age: yearsOld }} = person; `${{fullName}} ${{yearsOld}}`")), "John 30");
    assert_eq!(show(&format!("{PERSON} let {{ name, ...others }} = person; others")), "{ age: 30, email: 'john@example.com' }");
    assert_eq!(show("let { a, ...remaining } = { a: 1, b: 2, c: 3 }; remaining"), "{ b: 2, c: 3 }");
    assert_eq!(show("const { length } = 'four'; length"), "4");
    assert_eq!(show("const key = 'k'; const { [key]: v, 'quoted key': q } = { k: 1, 'quoted key': 2 }; v + q"), "3");
}

#[test]
fn nested_patterns() {
    let script = r#"
        const user = { id: 1, info: { name: 'Ann', contact: { email: 'ann@example.com' } } };
        let { info: { name, contact: { email } } } = user;
        `${name} <${email}>`
    "#;
    assert_eq!(show(script), "Ann <ann@example.com>");
    assert_eq!(show("const { list: [one, ...more] = [] } = { list: [1, 2] }; [one, more]"), "[ 1, [ 2 ] ]");
    assert_eq!(show("const { missing: [m = 'fallback'] = [] } = {}; m"), "fallback");
}

#[test]
fn parameter_patterns() {
    let script = r#"
        function greetUser({ name, age = 25 }) {
            return `Hello ${name}, you are ${age} years old`;
        }
        [greetUser({ name: 'Ann' }), greetUser({ name: 'Bob', age: 40 })]
    "#;
    assert_eq!(show(script), "[ 'Hello Ann, you are 25 years old', 'Hello Bob, you are 40 years old' ]");
    assert_eq!(show("const sum = ([a, b], { c } = { c: 100 }) => a + b + c; [sum([1, 2]), sum([1, 2], { c: 3 })]"), "[ 103, 6 ]");
    assert_eq!(show("const pairs = Object.entries({ x: 1, y: 2 }); pairs.map(([k, v]) => k + v).join(',')"), "x1,y2");
}

#[test]
fn loop_heads_bind_patterns() {
    let script = "let out = ''; for (const [key, value] of Object.entries({ a: 1, b: 2 })) { out += `${key}=${value};` } out";
    assert_eq!(show(script), "a=1;b=2;");
    let script = "let total = 0; for (const { n } of [{ n: 1 }, { n: 2 }]) total += n; total";
    assert_eq!(show(script), "3");
}

#[test]
fn destructuring_failures() {
    let err = evaluate("const { a } = null", None).unwrap_err();
    assert_eq!(err.kind(), JSErrorKind::EvaluationError);
    assert_eq!(err.message(), "TypeError: Cannot destructure 'null' as it is null.");
    assert!(evaluate("const [a] = 5", None).unwrap_err().message().starts_with("TypeError"));
    let err = evaluate("const [a, b]", None).unwrap_err();
    assert_eq!(err.kind(), JSErrorKind::SyntaxError);
    assert!(err.message().contains("Missing initializer"), "{}", err.message());
    let err = evaluate("const { a } = { a: 1 }; a = 2", None).unwrap_err();
    assert!(err.message().contains("constant"), "{}", err.message());
}
