//! Deterministic identifier derivation from free-text labels.
//!
//! The same fallback policy is used for field keys, preset slugs and option
//! values in both the export and import directions, so a label always maps
//! back to the key it was exported under.

/// Convert free text into an identifier-safe slug.
///
/// Lowercases, trims, drops everything that is not an ASCII word character,
/// whitespace or hyphen, collapses runs of whitespace/underscore/hyphen into a
/// single hyphen and strips hyphens from both ends.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(c);
        } else if c == '_' || c == '-' || c.is_whitespace() {
            pending_sep = true;
        }
        // anything else is dropped without acting as a separator
    }

    out
}

/// Slugify a JSON scalar, coercing numbers and booleans through their string form.
///
/// `null`, `false`, `0` and the empty string yield `""`.
pub fn slugify_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => slugify(s),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => slugify(&n.to_string()),
        serde_json::Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}

/// `slugify(source)` when that is non-empty, otherwise `<prefix>-<index + 1>`.
///
/// The prefix is slugified too and defaults to `item` if it is itself empty.
pub fn build_slug_with_fallback(source: &str, prefix: &str, index: usize) -> String {
    let slug = slugify(source);
    if !slug.is_empty() {
        return slug;
    }
    let prefix = slugify(prefix);
    let prefix = if prefix.is_empty() { "item" } else { prefix.as_str() };
    format!("{prefix}-{}", index + 1)
}

/// Case- and whitespace-insensitive comparison key for names.
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
#[path = "tests/slug_tests.rs"]
mod tests;
