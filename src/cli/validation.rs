use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::cli::errors::{CliError, CliResult};
use crate::dashboard;
use crate::search_query::ColumnKeys;

static LANG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("language pattern is valid"));

/// Validates a language tag such as `en` or `zh-Hant`
pub fn validate_lang(field: &str, lang: &str) -> CliResult<()> {
    if lang.trim().is_empty() {
        return Err(CliError::validation(field, "language cannot be empty"));
    }
    if !LANG_REGEX.is_match(lang) {
        return Err(CliError::validation(
            field,
            format!("{lang:?} is not a language tag"),
        ));
    }
    Ok(())
}

/// Validates a `src-trg` language pair
pub fn validate_langpair(langpair: &str) -> CliResult<()> {
    match langpair.split_once('-') {
        Some((src, trg)) if LANG_REGEX.is_match(src) && LANG_REGEX.is_match(trg) => Ok(()),
        _ => Err(CliError::validation(
            "langpair",
            format!("{langpair:?} is not a language pair like en-fr"),
        )),
    }
}

/// Validates URL format
pub fn validate_url(field: &str, url: &str) -> CliResult<()> {
    if url.trim().is_empty() {
        return Err(CliError::validation(field, "URL cannot be empty"));
    }

    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(CliError::validation(field, "URL must be http:// or https://")),
        Err(_) => Err(CliError::validation(field, "Invalid URL format")),
    }
}

/// Validates that a sort key names a dashboard column
pub fn validate_sort_key(key: &str) -> CliResult<()> {
    if dashboard::columns().resolve_column(key).is_some() {
        return Ok(());
    }
    let known: Vec<String> = dashboard::columns()
        .into_iter()
        .filter_map(|c| c.key)
        .collect();
    Err(CliError::validation(
        "sort",
        format!("unknown column {key:?}, expected one of: {}", known.join(", ")),
    ))
}
