// Shared fixtures for unit tests

use crate::grammars::{load_grammar, Grammar};
use crate::tokens::{classify_words, split_words, Token};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Grammar from `grammars/<name>.json`
pub fn fixture(name: &str) -> Grammar {
    init_logging();
    load_grammar("grammars", name).expect("Failed to load fixture grammar")
}

/// Every word is its own terminal
pub fn words(input: &str) -> Vec<Token> {
    split_words(input)
}

/// Tokens for the `ambi` grammar: `+` or an identifier
pub fn ambi_tokens(input: &str) -> Vec<Token> {
    classify_words(input, |word| match word {
        "+" => "+".to_string(),
        _ => "id".to_string(),
    })
}

/// Tokens for the `array` grammar: brackets, commas and numbers
pub fn array_tokens(input: &str) -> Vec<Token> {
    classify_words(input, |word| {
        match word {
            "[" => "begin-array",
            "]" => "end-array",
            "," => "value-separator",
            _ => "number",
        }
        .to_string()
    })
}
