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
fn date_from_iso_string() {
    let setup = "const d = new Date('2023-12-25');";
    assert_eq!(show(&format!("{setup} d.getFullYear()")), "2023");
    assert_eq!(show(&format!("{setup} d.getMonth()")), "11");
    assert_eq!(show(&format!("{setup} d.getDate()")), "25");
    assert_eq!(show(&format!("{setup} d.getDay()")), "1");
    assert_eq!(show(&format!("{setup} d.toISOString()")), "2023-12-25T00:00:00.000Z");
    assert_eq!(show(&format!("{setup} d.toDateString()")), "Mon Dec 25 2023");
}

#[test]
fn date_time_string() {
    let setup = "const d = new Date('2023-12-25T10:30:45Z');";
    assert_eq!(show(&format!("{setup} [d.getHours(), d.getMinutes(), d.getSeconds()]")), "[ 10, 30, 45 ]");
    assert_eq!(show("new Date('2023-12-25T10:30:00').getHours()"), "10");
}

#[test]
fn date_from_components_is_utc() {
    let setup = "const d = new Date(2024, 0, 15, 9, 5, 7);";
    assert_eq!(show(&format!("{setup} d.toISOString()")), "2024-01-15T09:05:07.000Z");
    assert_eq!(show(&format!("{setup} d.getMonth()")), "0");
    assert_eq!(show("new Date(2024, 1, 30).toISOString()"), "2024-03-01T00:00:00.000Z");
}

#[test]
fn date_from_milliseconds() {
    assert_eq!(show("new Date(0).toISOString()"), "1970-01-01T00:00:00.000Z");
    assert_eq!(show("new Date(86400000).getTime()"), "86400000");
    assert_eq!(show("new Date(0)"), "1970-01-01T00:00:00.000Z");
}

#[test]
fn now_is_a_recent_timestamp() {
    match evaluate_script("Date.now()") {
        Ok(Value::Number(n)) => assert!(n > 1_600_000_000_000.0, "{n}"),
        other => panic!("Expected a number, got {other:?}"),
    }
    assert_eq!(show("new Date().getTime() >= Date.now() - 1000"), "true");
}

#[test]
fn static_helpers() {
    assert_eq!(show("Date.UTC(2020, 0, 1)"), "1577836800000");
    assert_eq!(show("Date.parse('2020-01-01')"), "1577836800000");
    assert_eq!(show("Date.parse('nonsense')"), "NaN");
}

#[test]
fn invalid_dates() {
    assert_eq!(show("new Date('not a date').getTime()"), "NaN");
    assert_eq!(show("String(new Date('not a date'))"), "Invalid Date");
    let err = evaluate("new Date('not a date').toISOString()", None).unwrap_err();
    assert!(err.message().contains("Invalid time value"));
}

#[test]
fn date_arithmetic_uses_timestamps() {
    let script = "const a = new Date('2024-01-01'); const b = new Date('2024-01-31'); (b - a) / 86400000";
    assert_eq!(show(script), "30");
    assert_eq!(show("JSON.stringify({ at: new Date(0) })"), r#"{"at":"1970-01-01T00:00:00.000Z"}"#);
}
