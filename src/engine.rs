// Engine facade: one shared GFG, any number of parses

use crate::builders::cst::build_cst;
use crate::builders::AstBuilder;
use crate::error::{Error, ForestError, GrammarError, ParseFailure};
use crate::gfg::GrammarFlowGraph;
use crate::grammars::{load_grammar_from_file, Grammar};
use crate::parse_tree::ParseTree;
use crate::parsers::earley::{EarleyParser, Parsing};
use crate::parsers::walker::ParseWalker;
use crate::tokens::Token;
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Entry point bundling the parser with the tree builders.
///
/// Cloning is cheap and clones share the same GFG.
#[derive(Debug, Clone)]
pub struct Engine {
    parser: EarleyParser,
}

impl Engine {
    pub fn new(grammar: Grammar) -> Self {
        debug!(
            "building GFG for grammar '{}' ({} productions)",
            grammar.name(),
            grammar.productions().len()
        );
        Engine {
            parser: EarleyParser::new(grammar),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
        Ok(Self::new(load_grammar_from_file(path)?))
    }

    pub fn grammar(&self) -> &Grammar {
        self.parser.grammar()
    }

    pub fn graph(&self) -> &Arc<GrammarFlowGraph> {
        self.parser.graph()
    }

    pub fn parse<I>(&self, tokens: I) -> Result<Parsing, ParseFailure>
    where
        I: IntoIterator<Item = Token>,
    {
        self.parser.parse(tokens)
    }

    /// Raw walker events for one derivation
    pub fn walk<'p>(&self, parsing: &'p Parsing) -> ParseWalker<'p> {
        parsing.walker()
    }

    pub fn to_ptree(&self, parsing: &Parsing) -> Result<ParseTree, ForestError> {
        build_cst(parsing)
    }

    pub fn to_ast<N>(&self, parsing: &Parsing, builder: &mut AstBuilder<N>) -> Result<N, ForestError> {
        builder.build(parsing)
    }

    /// Parse and build the concrete tree in one go
    pub fn parse_tree<I>(&self, tokens: I) -> Result<ParseTree, Error>
    where
        I: IntoIterator<Item = Token>,
    {
        let parsing = self.parse(tokens)?;
        Ok(self.to_ptree(&parsing)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::Production;
    use crate::testing::{ambi_tokens, fixture, init_logging, words};
    use crate::tokens::TokenRange;
    use std::thread;

    #[test]
    fn test_engine_from_file() {
        init_logging();
        let engine = Engine::from_file("grammars/list.json").unwrap();
        let tree = engine.parse_tree(words("[ item , item ]")).unwrap();
        assert_eq!(tree.symbol_name(), "L");
        assert_eq!(tree.lexemes(), vec!["[", "item", ",", "item", "]"]);

        let missing = Engine::from_file("grammars/none.json");
        assert!(matches!(missing, Err(GrammarError::Io(_))));
    }

    #[test]
    fn test_parse_tree_errors() {
        let engine = Engine::new(fixture("abc"));
        let err = engine.parse_tree(words("a a b c")).unwrap_err();
        assert!(matches!(err, Error::Parse(ref f) if f.position == 4));
        assert_eq!(
            err.to_string(),
            "syntax error at position 4: expected 'c', found end of input"
        );
    }

    #[test]
    fn test_walk_and_ast() {
        let engine = Engine::new(fixture("ambi"));
        let parsing = engine.parse(ambi_tokens("a + b")).unwrap();
        assert_eq!(engine.walk(&parsing).count(), 11);

        let mut builder = AstBuilder::new(
            |token: &Token, _| token.lexeme.clone(),
            |_: &Production, _: TokenRange, children: Vec<String>| match children.len() {
                1 => children.concat(),
                _ => format!("({})", children.join(" ")),
            },
        );
        assert_eq!(engine.to_ast(&parsing, &mut builder).unwrap(), "(a + b)");
    }

    #[test]
    fn test_engine_shared_between_threads() {
        let engine = Engine::new(fixture("abc"));
        let inputs = ["b", "a b c", "a a b c c", "a a a b c c c"];
        let handles: Vec<_> = inputs
            .iter()
            .map(|input| {
                let engine = engine.clone();
                let input = input.to_string();
                thread::spawn(move || engine.parse_tree(words(&input)).map(|t| t.span))
            })
            .collect();

        for (handle, input) in handles.into_iter().zip(inputs) {
            let span = handle.join().unwrap().unwrap();
            assert_eq!(span.len(), input.split_whitespace().count());
        }
        assert_eq!(Arc::strong_count(engine.graph()), 1);
    }
}
