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

const PERSON: &str = "const person = { name: 'John', age: 30, active: true };";

#[test]
fn property_access() {
    assert_eq!(show(&format!("{PERSON} person.name")), "John");
    assert_eq!(show(&format!("{PERSON} person['age']")), "30");
    assert_eq!(show(&format!("{PERSON} person.missing")), "undefined");
    assert_eq!(show(&format!("{PERSON} const key = 'active'; person[key]")), "true");
}

#[test]
fn literal_forms() {
    assert_eq!(show("const x = 1, y = 2; ({ x, y })"), "{ x: 1, y: 2 }");
    assert_eq!(show("const k = 'dyn'; ({ [k + 'amic']: 1, 'with space': 2 })"), "{ dynamic: 1, 'with space': 2 }");
    assert_eq!(show("const o = { greet() { return 'hi'; } }; o.greet()"), "hi");
    assert_eq!(show("const base = { a: 1, b: 2 }; ({ ...base, b: 3, c: 4 })"), "{ a: 1, b: 3, c: 4 }");
}

#[test]
fn object_statics() {
    assert_eq!(show(&format!("{PERSON} Object.keys(person)")), "[ 'name', 'age', 'active' ]");
    assert_eq!(show(&format!("{PERSON} Object.values(person)")), "[ 'John', 30, true ]");
    assert_eq!(show("Object.entries({ a: 1, b: 2 })"), "[ [ 'a', 1 ], [ 'b', 2 ] ]");
    assert_eq!(show("Object.fromEntries([['a', 1], ['b', 2]])"), "{ a: 1, b: 2 }");
}

#[test]
fn assign_returns_a_new_object() {
    let script = "const target = { a: 1 };\n\
                  const merged = Object.assign(target, { b: 2 }, { a: 3 });\n\
                  [target, merged, target === merged]";
    assert_eq!(show(script), "[ { a: 1 }, { a: 3, b: 2 }, false ]");
}

#[test]
fn membership_checks() {
    assert_eq!(show(&format!("{PERSON} person.hasOwnProperty('age')")), "true");
    assert_eq!(show(&format!("{PERSON} person.hasOwnProperty('toString')")), "false");
    assert_eq!(show(&format!("{PERSON} 'name' in person")), "true");
    assert_eq!(show(&format!("{PERSON} 'email' in person")), "false");
    assert_eq!(show("0 in [10, 20]"), "true");
    assert!(evaluate("'a' in 'abc'", None).is_err());
}

#[test]
fn property_assignment_is_rejected() {
    let err = evaluate("const o = { a: 1 }; o.a = 2", None).unwrap_err();
    assert_eq!(err.kind(), jsref::JSErrorKind::SyntaxError);
}

#[test]
fn json_stringify() {
    match evaluate_script(r#"JSON.stringify({name: "John", age: 30, active: true})"#) {
        Ok(Value::String(s)) => assert_eq!(s, r#"{"name":"John","age":30,"active":true}"#),
        other => panic!("Expected JSON text, got {other:?}"),
    }
    assert_eq!(show("JSON.stringify([1, 'a', null, undefined])"), r#"[1,"a",null,null]"#);
    assert_eq!(show("JSON.stringify({ a: undefined, f: () => 1, b: 2 })"), r#"{"b":2}"#);
    assert_eq!(show("JSON.stringify({ a: [1, 2] }, null, 2)"), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
    assert_eq!(show("JSON.stringify('quote\"d')"), r#""quote\"d""#);
    assert_eq!(show("JSON.stringify(undefined)"), "undefined");
}

#[test]
fn json_stringify_with_replacer() {
    assert_eq!(show("JSON.stringify({ a: 1, b: 2, c: 3 }, ['a', 'c'])"), r#"{"a":1,"c":3}"#);
    let script = "JSON.stringify({ a: 1, b: 'x' }, (k, v) => typeof v === 'number' ? v * 10 : v)";
    assert_eq!(show(script), r#"{"a":10,"b":"x"}"#);
}

#[test]
fn json_parse() {
    let script = r#"const data = JSON.parse('{"name":"John","tags":["a","b"],"nested":{"n":1.5}}'); [data.name, data.tags[1], data.nested.n]"#;
    assert_eq!(show(script), "[ 'John', 'b', 1.5 ]");
    assert_eq!(show("JSON.parse('[1, null, true]')"), "[ 1, null, true ]");
    let err = evaluate("JSON.parse('{bad json}')", None).unwrap_err();
    assert!(err.message().starts_with("SyntaxError"), "{}", err.message());
}

#[test]
fn json_round_trip_keeps_key_order() {
    let script = "const src = { z: 1, a: [true, null], m: { k: 'v' } }; JSON.stringify(JSON.parse(JSON.stringify(src)))";
    assert_eq!(show(script), r#"{"z":1,"a":[true,null],"m":{"k":"v"}}"#);
}
