//! General context-free parsing over a Grammar Flow Graph.
//!
//! A [`Grammar`] is compiled once into a [`GrammarFlowGraph`]; the
//! [`EarleyParser`] runs a chart directly over that graph for each token
//! stream. A successful [`Parsing`] is replayed by the forest walker into
//! concrete trees ([`ParseTree`]) or caller-defined ASTs ([`AstBuilder`]).
//!
//! ```no_run
//! use gfg_earley::{load_grammar, split_words, Engine};
//!
//! let engine = Engine::new(load_grammar("grammars", "abc").unwrap());
//! let tree = engine.parse_tree(split_words("a a b c c")).unwrap();
//! println!("{}", tree.display());
//! ```

pub mod builders;
pub mod dotted_item;
pub mod engine;
pub mod error;
pub mod gfg;
pub mod grammars;
pub mod parse_tree;
pub mod parsers;
pub mod tokens;

#[cfg(test)]
mod testing;

pub use builders::{build_tree, AstBuilder, CstFactory, NodeFactory, TreeBuilder};
pub use engine::Engine;
pub use error::{Error, ForestError, GrammarError, ParseFailure};
pub use gfg::GrammarFlowGraph;
pub use grammars::{
    load_grammar, load_grammar_from_file, load_grammar_from_str, Grammar, GrammarBuilder, ProdId,
    Production, Symbol,
};
pub use parse_tree::{ParseSymbol, ParseTree};
pub use parsers::earley::{EarleyParser, Parsing};
pub use parsers::walker::{ParseWalker, WalkEvent};
pub use tokens::{classify_words, split_words, Token, TokenRange};
