use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static FILTER_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z-]+$").expect("filter key pattern is valid"));

/// Whether `key` is shaped like a column key. Checked on the text as typed, so
/// `Lang` or `key1` are rejected rather than lowercased into a match.
pub fn is_filter_key(key: &str) -> bool {
    FILTER_KEY_REGEX.is_match(key)
}

/// Remove the first pair of double quotes from a value that starts with one.
///
/// A leading quote without a closing one is dropped too. Text after the
/// closing quote is kept: `"en to fr` → `en to fr`, `"a"b` → `ab`.
pub fn strip_quotes(value: &str) -> Cow<'_, str> {
    let Some(rest) = value.strip_prefix('"') else {
        return Cow::Borrowed(value);
    };
    match rest.split_once('"') {
        Some((quoted, "")) => Cow::Borrowed(quoted),
        Some((quoted, after)) => Cow::Owned(format!("{quoted}{after}")),
        None => Cow::Borrowed(rest),
    }
}

/// Lowercase and unquote a filter value.
pub fn normalize_value(value: &str) -> String {
    strip_quotes(value).to_lowercase()
}
