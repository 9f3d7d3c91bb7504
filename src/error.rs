//! Error types for grammar construction, parsing and tree building.
//!
//! Three families are kept apart because callers treat them differently:
//! a [`GrammarError`] is reported once when a grammar is finalized, a
//! [`ParseFailure`] is the ordinary "input not in the language" outcome of
//! a parse, and a [`ForestError`] means the chart and the tree builder
//! disagree, which is a defect rather than a user mistake.

use crate::tokens::Token;
use std::fmt;
use thiserror::Error;

/// A grammar could not be declared, loaded or validated.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("start symbol '{0}' is not defined by any production")]
    UndefinedStart(String),

    #[error("non-terminal '{0}' is referenced but has no productions")]
    MissingProductions(String),

    #[error("'{0}' is declared both as a terminal and as a non-terminal")]
    NameCollision(String),

    #[error("no production {lhs} -> {rhs}")]
    UnknownRule { lhs: String, rhs: String },

    #[error("invalid grammar declaration: {0}")]
    Format(String),

    #[error("failed to read grammar file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse grammar JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The token stream is not derivable from the grammar.
///
/// `position` is the last input position the chart reached; `expected`
/// lists the terminal names that could have been shifted there, sorted.
/// `found` is the token at that position, or `None` at end of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub position: usize,
    pub expected: Vec<String>,
    pub found: Option<Token>,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at position {}: ", self.position)?;
        match self.expected.as_slice() {
            [] => write!(f, "no further input expected")?,
            [single] => write!(f, "expected '{}'", single)?,
            many => write!(f, "expected one of [{}]", many.join(", "))?,
        }
        match &self.found {
            Some(token) => write!(f, ", found '{}' ({})", token.lexeme, token.terminal),
            None => write!(f, ", found end of input"),
        }
    }
}

impl std::error::Error for ParseFailure {}

/// The chart, the walker and a tree builder disagree.
///
/// None of these can be triggered by user input on a chart produced by
/// this crate; they carry enough context to locate the defect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForestError {
    #[error("chart entry {entry} in state set {position} has no antecedent")]
    MissingAntecedent { entry: String, position: usize },

    #[error("no caller entry for {vertex} with origin {origin} in state set {position}")]
    MissingCaller {
        vertex: String,
        origin: usize,
        position: usize,
    },

    #[error("reduce of production {production} is missing child slot {slot}")]
    MissingChild { production: usize, slot: usize },

    #[error("reduce of production {found} while production {expected} is pending")]
    ProductionMismatch { expected: usize, found: usize },

    #[error("slot {slot} is out of range for production {production} with {len} symbols")]
    SlotOutOfRange {
        production: usize,
        slot: usize,
        len: usize,
    },

    #[error("slot {slot} of production {production} is filled twice")]
    SlotOccupied { production: usize, slot: usize },

    #[error("leaf refers to token {token} but the parse holds {len} tokens")]
    TokenOutOfRange { token: usize, len: usize },

    #[error("{0} event received with no pending node")]
    EmptyStack(&'static str),

    #[error("event stream ended with {0} pending nodes")]
    UnbalancedTree(usize),

    #[error("event stream produced no root node")]
    NoRoot,
}

/// Any error surfaced by the [`Engine`](crate::engine::Engine) facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Forest(#[from] ForestError),
}
