// Default builder: one ParseTree node per walker event

use super::{build_tree, NodeFactory};
use crate::error::ForestError;
use crate::grammars::{Grammar, Production};
use crate::parse_tree::ParseTree;
use crate::parsers::earley::Parsing;
use crate::tokens::{Token, TokenRange};

#[derive(Debug, Default, Clone, Copy)]
pub struct CstFactory;

impl NodeFactory for CstFactory {
    type Node = ParseTree;

    fn leaf(&mut self, _grammar: &Grammar, token: &Token, span: TokenRange) -> ParseTree {
        ParseTree::leaf(&token.terminal, &token.lexeme, span)
    }

    fn reduce(
        &mut self,
        grammar: &Grammar,
        production: &Production,
        span: TokenRange,
        children: Vec<ParseTree>,
    ) -> ParseTree {
        ParseTree::node(grammar.non_terminal_name(production.lhs), span, children)
    }
}

pub fn build_cst(parsing: &Parsing) -> Result<ParseTree, ForestError> {
    build_tree(parsing, CstFactory)
}
