use serde::Serialize;

/// Serialize a value into canonical JSON: sorted object keys, compact
/// separators, non-ASCII characters escaped.
///
/// Every JSON sub-object persisted by the store goes through this function
/// so that stored diffs and event records are byte-reproducible.
pub fn to_canonical_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    // Routing through Value sorts object keys (serde_json's map is a BTreeMap
    // unless the preserve_order feature is enabled, which we do not enable).
    let value = serde_json::to_value(value)?;
    Ok(escape_non_ascii(&value.to_string()))
}

/// Parse canonical JSON back into a typed value.
pub fn from_canonical_json<T: serde::de::DeserializeOwned>(s: &str) -> serde_json::Result<T> {
    serde_json::from_str(s)
}

// In serialized JSON any char above 0x7F can only occur inside a string
// literal, so a char-level pass is exact.
fn escape_non_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
