use serde::{Deserialize, Serialize};

use super::lexer::Token;
use super::normalize::{is_filter_key, normalize_value, strip_quotes};

/// A `key:value` clause scoped to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub value: String,
    pub negated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Lowercase words that must appear somewhere in the row.
    pub terms: Vec<String>,
    pub filters: Vec<Filter>,
}

impl ParsedQuery {
    /// An empty query shows every row.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.filters.is_empty()
    }
}

/// Turn tokens into terms and filters. Every token lands in one or the other
/// (or is dropped when it is only a `-`).
pub fn parse(tokens: Vec<Token>) -> ParsedQuery {
    let mut query = ParsedQuery::default();

    for token in tokens {
        let (negated, body) = match token.text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token.text.as_str()),
        };

        if let Some(filter) = parse_filter(body, negated) {
            query.filters.push(filter);
            continue;
        }

        // A bare term has no negated form; `-foo` searches for `foo`.
        let term = strip_quotes(body);
        if !term.is_empty() {
            query.terms.push(term.to_lowercase());
        }
    }

    query
}

fn parse_filter(body: &str, negated: bool) -> Option<Filter> {
    let (key, value) = body.split_once(':')?;
    if !is_filter_key(key) {
        return None;
    }
    Some(Filter {
        key: key.to_string(),
        value: normalize_value(value),
        negated,
    })
}
