// Shared numeric conversion helpers used by core evaluation

const TWO_32: f64 = 2_i64.pow(32) as f64; // 2^32

/// JS ToInt32 semantics for Number inputs
pub(crate) fn to_int32(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let int = n.trunc();
    let int32bit = ((int % TWO_32) + TWO_32) % TWO_32;
    if int32bit >= TWO_32 / 2.0 {
        (int32bit - TWO_32) as i32
    } else {
        int32bit as i32
    }
}

/// JS ToUint32 semantics for Number inputs
pub(crate) fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0_u32;
    }
    let int = n.trunc();
    let u = ((int % TWO_32) + TWO_32) % TWO_32;
    u as u32
}

/// ToIntegerOrInfinity: NaN becomes 0, fractions truncate toward zero.
pub(crate) fn to_integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// Resolve a possibly negative position against `len`, clamped to `0..=len`.
pub(crate) fn relative_index(n: f64, len: usize) -> usize {
    let n = to_integer_or_infinity(n);
    let len = len as f64;
    (if n < 0.0 { (len + n).max(0.0) } else { n.min(len) }) as usize
}

/// StringToNumber: surrounding whitespace is ignored, the empty string is 0,
/// `0x`/`0o`/`0b` prefixes are honoured and anything unparsable is NaN.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    let radix_prefix = |prefix: &[&str], radix: u32| {
        prefix
            .iter()
            .find_map(|p| t.strip_prefix(p))
            .map(|digits| u64::from_str_radix(digits, radix).map(|v| v as f64).unwrap_or(f64::NAN))
    };
    if let Some(n) = radix_prefix(&["0x", "0X"], 16)
        .or_else(|| radix_prefix(&["0o", "0O"], 8))
        .or_else(|| radix_prefix(&["0b", "0B"], 2))
    {
        return n;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf"/"nan" spellings, which JS does not.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// The longest numeric prefix of `s`, as `parseFloat` reads it.
pub(crate) fn parse_float_prefix(s: &str) -> f64 {
    let t = s.trim_start();
    if t.starts_with("Infinity") || t.starts_with("+Infinity") {
        return f64::INFINITY;
    }
    if t.starts_with("-Infinity") {
        return f64::NEG_INFINITY;
    }
    let bytes = t.as_bytes();
    let mut end = 0;
    let mut best = None;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_dot = false;
    let mut seen_exp = false;
    while end < bytes.len() {
        let c = bytes[end];
        if c.is_ascii_digit() {
            end += 1;
            best = Some(end);
        } else if c == b'.' && !seen_dot && !seen_exp {
            seen_dot = true;
            end += 1;
        } else if (c == b'e' || c == b'E') && !seen_exp && best.is_some() {
            seen_exp = true;
            end += 1;
            if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                end += 1;
            }
        } else {
            break;
        }
    }
    match best {
        Some(end) => t[..end].parse::<f64>().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// `parseInt(s, radix)`: optional sign, optional `0x` prefix for radix 16,
/// then as many digits as are valid in `radix`.
pub(crate) fn parse_int_prefix(s: &str, radix: Option<u32>) -> f64 {
    let mut t = s.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = t.strip_prefix('-') {
        sign = -1.0;
        t = rest;
    } else if let Some(rest) = t.strip_prefix('+') {
        t = rest;
    }
    let hex_prefix = t.starts_with("0x") || t.starts_with("0X");
    let radix = match radix {
        None | Some(0) if hex_prefix => 16,
        None | Some(0) => 10,
        Some(r) => r,
    };
    if radix == 16 && hex_prefix {
        t = &t[2..];
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut value = 0.0;
    let mut any = false;
    for c in t.chars() {
        match c.to_digit(radix) {
            Some(d) => {
                value = value * radix as f64 + d as f64;
                any = true;
            }
            None => break,
        }
    }
    if any { sign * value } else { f64::NAN }
}
