mod eval;
mod lexer;
mod normalize;
mod parser;

pub use eval::{apply_filter, ColumnKeys};
pub use parser::ParsedQuery;

/// Parse a search box string into terms and `key:value` filters.
///
/// Behavior:
/// - Empty/whitespace → empty query (matches everything)
/// - `key:value`, `key:"quoted value"`, `-key:value` → filters
/// - Keys must look like `^[a-z-]+$` as typed; anything else is free text
/// - Unterminated quotes run to the end of the input
///
/// Never fails.
pub fn parse_search_query(input: &str) -> ParsedQuery {
    parser::parse(lexer::tokenize(input.trim()))
}

/// The text to put in the search box to filter on one cell value.
pub fn filter_expression(key: &str, value: &str) -> String {
    if value.contains(' ') {
        format!("{key}:\"{value}\"")
    } else {
        format!("{key}:{value}")
    }
}

#[cfg(test)]
mod tests;
