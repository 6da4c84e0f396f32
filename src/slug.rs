//! URL-safe slugs for heading anchors.

use deunicode::deunicode;

/// Produce a URL-safe slug for arbitrary text.
///
/// Rules:
/// - Transliterate into ASCII using `deunicode` (`Gödel` -> `godel`).
/// - Lowercase.
/// - Every run of characters outside `[a-z0-9]` becomes a single `-`.
/// - Leading and trailing `-` are trimmed.
///
/// Empty (or all-punctuation) text yields an empty slug. Callers decide what
/// an empty anchor means; this function never invents one.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text).to_ascii_lowercase();

    let mut out = String::with_capacity(ascii.len());
    let mut pending_sep = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    out
}
