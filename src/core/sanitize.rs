// LogPanel - core/sanitize.rs
//
// Strips terminal escape residue from supervisor and add-on log text.
// The host delivers these sequences with the ESC byte rendered as a literal
// backslash, e.g. `\[31merror\[0m`. Pure logic, no I/O.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Backslash, `[`, optional digits, one word character. ASCII classes only:
/// `\d` and `\w` would also take non-ASCII letters and digits.
const ESCAPE_PATTERN: &str = r"\\\[[0-9]*[A-Za-z0-9_]";

fn escape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ESCAPE_PATTERN).expect("sanitize: invalid escape pattern"))
}

/// Remove every escape sequence from `raw`.
///
/// A removal can splice the surrounding text into a fresh match
/// (`\` + `\[1m` + `[5a` leaves `\[5a`), so the pattern is applied until the
/// text is stable. Each pass shortens the text, so this terminates.
/// Every pass rescans the whole text, so input built from `k` nested splices
/// costs `k` passes. Real log text settles after one or two.
/// Borrows when nothing matches.
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    let re = escape_regex();
    if !re.is_match(raw) {
        return Cow::Borrowed(raw);
    }
    let mut text = re.replace_all(raw, "").into_owned();
    while re.is_match(&text) {
        text = re.replace_all(&text, "").into_owned();
    }
    Cow::Owned(text)
}
