//! String handling utilities
//!
//! ISO9660 identifiers are space padded d-characters or a-characters.

/// Trim trailing spaces from byte slice
fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        end -= 1;
    }
    &bytes[..end]
}

/// Convert a space padded a-character identifier (volume id etc.) to a string
pub fn achars_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(trim_trailing_spaces(bytes)).into_owned()
}

/// Decode a directory or path table identifier
///
/// The single-byte identifiers 0x00 and 0x01 stand for "." and "..".
pub fn decode_identifier(bytes: &[u8]) -> String {
    match bytes {
        [0x00] => String::from("."),
        [0x01] => String::from(".."),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Strip version suffix from filename (e.g., "FILE.TXT;1" -> "FILE.TXT")
/// Also removes trailing dot if present (e.g., "FILE.;1" -> "FILE")
pub fn strip_version(name: &str) -> &str {
    let base = name.split(';').next().unwrap_or(name);
    if let Some(stripped) = base.strip_suffix('.') {
        stripped
    } else {
        base
    }
}

/// Case-folded comparison of a record name against a lookup component
///
/// Both sides are compared in uppercase. A record name also matches when only
/// its version suffix differs, so "VMLINUZ64" finds "VMLINUZ64.;1".
pub fn names_match(record_name: &str, component: &str) -> bool {
    record_name.eq_ignore_ascii_case(component)
        || (record_name.contains(';') && strip_version(record_name).eq_ignore_ascii_case(component))
}
