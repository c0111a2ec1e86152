// Helper functions for UTF-16 string operations. String indices and
// lengths are measured in UTF-16 code units.

pub fn utf8_to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

pub fn utf16_to_utf8(v: &[u16]) -> String {
    String::from_utf16_lossy(v)
}

pub fn utf16_slice(v: &[u16], start: usize, end: usize) -> String {
    if start >= end || start >= v.len() {
        String::new()
    } else {
        utf16_to_utf8(&v[start..end.min(v.len())])
    }
}

/// First occurrence of `pattern` at or after `from`.
pub fn utf16_find(v: &[u16], pattern: &[u16], from: usize) -> Option<usize> {
    if pattern.len() > v.len() || from > v.len() - pattern.len() {
        return None;
    }
    (from..=v.len() - pattern.len()).find(|&i| v[i..i + pattern.len()] == *pattern)
}

/// Last occurrence of `pattern` starting at or before `from`.
pub fn utf16_rfind(v: &[u16], pattern: &[u16], from: usize) -> Option<usize> {
    if pattern.len() > v.len() {
        return None;
    }
    let last = (v.len() - pattern.len()).min(from);
    (0..=last).rev().find(|&i| v[i..i + pattern.len()] == *pattern)
}

/// Every non-overlapping occurrence of `pattern`. An empty pattern matches
/// before each code unit and at the end.
pub fn utf16_find_all(v: &[u16], pattern: &[u16]) -> Vec<usize> {
    if pattern.is_empty() {
        return (0..=v.len()).collect();
    }
    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(pos) = utf16_find(v, pattern, from) {
        positions.push(pos);
        from = pos + pattern.len();
    }
    positions
}
