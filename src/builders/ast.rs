//! Extensible builder for abstract syntax trees.
//!
//! Reduction hooks are registered per production, leaf hooks per terminal
//! name. Anything without a hook goes through the default hooks given at
//! construction. Hooks only see the span and the children (or the token),
//! never the chart.

use super::{build_tree, NodeFactory};
use crate::error::{ForestError, GrammarError};
use crate::grammars::{Grammar, ProdId, Production};
use crate::parsers::earley::Parsing;
use crate::tokens::{Token, TokenRange};
use rustc_hash::FxHashMap;

pub type ReduceHook<N> = Box<dyn Fn(&Production, TokenRange, Vec<N>) -> N + Send + Sync>;
pub type LeafHook<N> = Box<dyn Fn(&Token, TokenRange) -> N + Send + Sync>;

pub struct AstBuilder<N> {
    reducers: FxHashMap<ProdId, ReduceHook<N>>,
    leaves: FxHashMap<String, LeafHook<N>>,
    default_leaf: LeafHook<N>,
    default_reduce: ReduceHook<N>,
}

impl<N> AstBuilder<N> {
    pub fn new<L, R>(default_leaf: L, default_reduce: R) -> Self
    where
        L: Fn(&Token, TokenRange) -> N + Send + Sync + 'static,
        R: Fn(&Production, TokenRange, Vec<N>) -> N + Send + Sync + 'static,
    {
        AstBuilder {
            reducers: FxHashMap::default(),
            leaves: FxHashMap::default(),
            default_leaf: Box::new(default_leaf),
            default_reduce: Box::new(default_reduce),
        }
    }

    /// Replaces any hook already registered for `production`
    pub fn on_production<R>(mut self, production: ProdId, hook: R) -> Self
    where
        R: Fn(&Production, TokenRange, Vec<N>) -> N + Send + Sync + 'static,
    {
        self.reducers.insert(production, Box::new(hook));
        self
    }

    /// Registers a hook for the production `lhs -> rhs` of `grammar`
    pub fn on_rule<R>(
        self,
        grammar: &Grammar,
        lhs: &str,
        rhs: &[&str],
        hook: R,
    ) -> Result<Self, GrammarError>
    where
        R: Fn(&Production, TokenRange, Vec<N>) -> N + Send + Sync + 'static,
    {
        let production = grammar.find_production(lhs, rhs)?;
        Ok(self.on_production(production, hook))
    }

    pub fn on_terminal<L>(mut self, terminal: &str, hook: L) -> Self
    where
        L: Fn(&Token, TokenRange) -> N + Send + Sync + 'static,
    {
        self.leaves.insert(terminal.to_string(), Box::new(hook));
        self
    }

    pub fn has_hook(&self, production: ProdId) -> bool {
        self.reducers.contains_key(&production)
    }

    pub fn build(&mut self, parsing: &Parsing) -> Result<N, ForestError> {
        build_tree(parsing, self)
    }
}

impl<N> NodeFactory for AstBuilder<N> {
    type Node = N;

    fn leaf(&mut self, _grammar: &Grammar, token: &Token, span: TokenRange) -> N {
        match self.leaves.get(&token.terminal) {
            Some(hook) => hook(token, span),
            None => (self.default_leaf)(token, span),
        }
    }

    fn reduce(
        &mut self,
        _grammar: &Grammar,
        production: &Production,
        span: TokenRange,
        children: Vec<N>,
    ) -> N {
        match self.reducers.get(&production.id) {
            Some(hook) => hook(production, span, children),
            None => (self.default_reduce)(production, span, children),
        }
    }
}
