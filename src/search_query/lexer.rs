/// A whitespace-delimited piece of the search box, quotes preserved.
///
/// `name:"en to fr"` is a single token; `-lang:en` keeps its leading dash so the
/// parser can decide whether the negation applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
}

impl Token {
    fn new(text: String) -> Self {
        Self { text }
    }
}

/// Split a search string into tokens.
///
/// Whitespace separates tokens except inside a double-quoted span. An
/// unterminated quote swallows the rest of the input, whitespace included.
/// Never fails.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(Token::new(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(Token::new(current));
    }

    tokens
}
