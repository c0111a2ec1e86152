use crate::core::{DeclKind, Environment, JSDate, Value, arg, to_number, value_to_string};
use crate::error::JSError;
use crate::{raise_eval_error, raise_type_error};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::rc::Rc;

const MS_PER_DAY: f64 = 86_400_000.0;
// ECMAScript time values are limited to ±100,000,000 days around the epoch.
const MAX_TIME: f64 = 8.64e15;

const DATE_METHODS: &[&str] = &[
    "getDate",
    "getDay",
    "getFullYear",
    "getHours",
    "getMilliseconds",
    "getMinutes",
    "getMonth",
    "getSeconds",
    "getTime",
    "getTimezoneOffset",
    "getUTCDate",
    "getUTCDay",
    "getUTCFullYear",
    "getUTCHours",
    "getUTCMilliseconds",
    "getUTCMinutes",
    "getUTCMonth",
    "getUTCSeconds",
    "toDateString",
    "toISOString",
    "toJSON",
    "toLocaleDateString",
    "toLocaleString",
    "toLocaleTimeString",
    "toString",
    "toTimeString",
    "toUTCString",
    "valueOf",
];

const DATE_SETTERS: &[&str] = &[
    "setDate",
    "setFullYear",
    "setHours",
    "setMilliseconds",
    "setMinutes",
    "setMonth",
    "setSeconds",
    "setTime",
];

pub(crate) fn initialize_date(env: &Environment) -> Result<(), JSError> {
    env.declare("Date", Value::Function("Date".to_string()), DeclKind::Const)
}

pub fn is_date_method(name: &str) -> bool {
    DATE_METHODS.contains(&name) || DATE_SETTERS.contains(&name)
}

pub fn date_static_property(key: &str) -> Option<Value> {
    matches!(key, "now" | "parse" | "UTC").then(|| Value::Function(format!("Date.{key}")))
}

pub fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}

fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME { f64::NAN } else { t.trunc() + 0.0 }
}

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if ms.is_nan() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
}

/// Parse a date string into a timestamp (milliseconds since Unix epoch).
/// Strings without an explicit offset are read as UTC.
pub(crate) fn parse_date_string(date_str: &str) -> Option<f64> {
    let date_str = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.timestamp_millis() as f64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(date_str) {
        return Some(dt.timestamp_millis() as f64);
    }
    if let Some(timestamp) = parse_month_day_year(date_str) {
        return Some(timestamp);
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    for format in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(Utc.from_utc_datetime(&dt).timestamp_millis() as f64);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for format in &date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format)
            && let Some(midnight) = date.and_hms_opt(0, 0, 0)
        {
            return Some(Utc.from_utc_datetime(&midnight).timestamp_millis() as f64);
        }
    }
    None
}

/// Parse dates in "Aug 9, 1995" format
fn parse_month_day_year(date_str: &str) -> Option<f64> {
    let parts: Vec<&str> = date_str.split_whitespace().collect();
    let [month_str, day_str, year_str] = parts.as_slice() else {
        return None;
    };
    let month = MONTH_NAMES.iter().position(|m| month_str.starts_with(m))? as u32 + 1;
    let day = day_str.trim_end_matches(',').parse::<u32>().ok()?;
    let year = year_str.parse::<i32>().ok()?;
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .map(|date| date.timestamp_millis() as f64)
}

const MONTH_NAMES: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

/// Time value for year, month (0-based), day, hour, minute, second, millisecond, read as UTC.
/// Fields past their range roll over into the next larger one.
pub(crate) fn construct_date_from_components(components: &[f64]) -> f64 {
    let field = |i: usize, default: f64| components.get(i).copied().unwrap_or(default);
    if components.iter().any(|c| !c.is_finite()) {
        return f64::NAN;
    }
    let mut year = field(0, f64::NAN).trunc();
    if (0.0..=99.0).contains(&year) {
        year += 1900.0;
    }
    let month = field(1, 0.0).trunc();
    let year = year + (month / 12.0).floor();
    let month = month.rem_euclid(12.0);
    let Some(first_of_month) = NaiveDate::from_ymd_opt(year as i32, month as u32 + 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return f64::NAN;
    };
    let base = Utc.from_utc_datetime(&first_of_month).timestamp_millis() as f64;
    let day_offset = (field(2, 1.0).trunc() - 1.0) * MS_PER_DAY;
    let time_ms = field(3, 0.0).trunc() * 3_600_000.0
        + field(4, 0.0).trunc() * 60_000.0
        + field(5, 0.0).trunc() * 1_000.0
        + field(6, 0.0).trunc();
    time_clip(base + day_offset + time_ms)
}

/// `new Date(...)`
pub fn construct_date(args: &[Value]) -> Result<Value, JSError> {
    let time = match args {
        [] => now_millis(),
        [Value::Date(d)] => d.time,
        [Value::String(s)] => parse_date_string(s).unwrap_or(f64::NAN),
        [single] => to_number(single),
        many => construct_date_from_components(&many.iter().map(to_number).collect::<Vec<_>>()),
    };
    log::trace!("construct_date -> {time}");
    Ok(Value::Date(Rc::new(JSDate { time: time_clip(time) })))
}

pub fn handle_date_static_method(method: &str, args: &[Value]) -> Result<Value, JSError> {
    match method {
        "now" => Ok(Value::Number(now_millis())),
        "parse" => Ok(Value::Number(parse_date_string(&value_to_string(&arg(args, 0))).unwrap_or(f64::NAN))),
        "UTC" => Ok(Value::Number(construct_date_from_components(
            &args.iter().map(to_number).collect::<Vec<_>>(),
        ))),
        _ => Err(raise_type_error!(format!("Date.{method} is not a function"))),
    }
}

/// `Date.prototype.toString` rendering; the zone is always UTC.
pub fn date_to_string(ms: f64) -> String {
    match to_datetime(ms) {
        Some(dt) => dt.format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)").to_string(),
        None => "Invalid Date".to_string(),
    }
}

pub fn date_to_iso_string(ms: f64) -> Option<String> {
    to_datetime(ms).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn twelve_hour(dt: &DateTime<Utc>) -> String {
    let (pm, hour) = dt.hour12();
    format!("{hour}:{:02}:{:02} {}", dt.minute(), dt.second(), if pm { "PM" } else { "AM" })
}

pub fn handle_date_method(date: &JSDate, method: &str, _args: &[Value]) -> Result<Value, JSError> {
    if DATE_SETTERS.contains(&method) {
        return Err(raise_eval_error!(format!(
            "TypeError: Date.prototype.{method} would modify the date in place; dates are immutable"
        )));
    }
    let Some(dt) = to_datetime(date.time) else {
        return Ok(match method {
            "toISOString" => return Err(raise_eval_error!("RangeError: Invalid time value")),
            "toJSON" => Value::Null,
            m if m.starts_with("get") || m == "valueOf" => Value::Number(f64::NAN),
            _ => Value::string("Invalid Date"),
        });
    };
    let number = |n: f64| Ok(Value::Number(n));
    match method {
        "getTime" | "valueOf" => number(date.time),
        "getFullYear" | "getUTCFullYear" => number(dt.year() as f64),
        "getMonth" | "getUTCMonth" => number(dt.month0() as f64),
        "getDate" | "getUTCDate" => number(dt.day() as f64),
        "getDay" | "getUTCDay" => number(dt.weekday().num_days_from_sunday() as f64),
        "getHours" | "getUTCHours" => number(dt.hour() as f64),
        "getMinutes" | "getUTCMinutes" => number(dt.minute() as f64),
        "getSeconds" | "getUTCSeconds" => number(dt.second() as f64),
        "getMilliseconds" | "getUTCMilliseconds" => number(dt.timestamp_subsec_millis() as f64),
        "getTimezoneOffset" => number(0.0),
        "toISOString" | "toJSON" => Ok(Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())),
        "toString" => Ok(Value::String(date_to_string(date.time))),
        "toDateString" => Ok(Value::String(dt.format("%a %b %d %Y").to_string())),
        "toTimeString" => Ok(Value::String(dt.format("%H:%M:%S GMT+0000 (Coordinated Universal Time)").to_string())),
        "toUTCString" => Ok(Value::String(dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())),
        "toLocaleDateString" => Ok(Value::String(format!("{}/{}/{}", dt.month(), dt.day(), dt.year()))),
        "toLocaleTimeString" => Ok(Value::String(twelve_hour(&dt))),
        "toLocaleString" => Ok(Value::String(format!("{}/{}/{}, {}", dt.month(), dt.day(), dt.year(), twelve_hour(&dt)))),
        _ => Err(raise_type_error!(format!("Date.prototype.{method} is not a function"))),
    }
}
