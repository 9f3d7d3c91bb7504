//! Input tokens and token ranges.
//!
//! The engine never looks inside a lexeme: a token only matters through
//! the name of the terminal it was classified as.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A classified piece of input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub lexeme: String,
    /// Name of the grammar terminal this token stands for
    pub terminal: String,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, terminal: impl Into<String>) -> Self {
        Token {
            lexeme: lexeme.into(),
            terminal: terminal.into(),
        }
    }
}

/// Half-open range `[low, high)` of token indices covered by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TokenRange {
    pub low: usize,
    pub high: usize,
}

impl TokenRange {
    pub fn new(low: usize, high: usize) -> Self {
        debug_assert!(low <= high, "inverted token range [{}, {})", low, high);
        TokenRange { low, high }
    }

    pub fn len(&self) -> usize {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for TokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Split `input` on whitespace, tagging every word with the terminal name
/// chosen by `classify`.
pub fn classify_words<F>(input: &str, mut classify: F) -> Vec<Token>
where
    F: FnMut(&str) -> String,
{
    input
        .split_whitespace()
        .map(|word| Token::new(word, classify(word)))
        .collect()
}

/// Whitespace tokenizer where every word is its own terminal.
pub fn split_words(input: &str) -> Vec<Token> {
    classify_words(input, |word| word.to_string())
}
