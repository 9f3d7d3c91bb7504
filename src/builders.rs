//! Tree builders driven by the forest walker.
//!
//! A [`TreeBuilder`] keeps one explicit stack of pending nodes. Each node
//! owns a fixed row of child slots sized by its production, and events
//! fill those slots by index, so the right-to-left walk needs no reversal.
//! What a node actually is comes from a [`NodeFactory`].

use crate::error::ForestError;
use crate::grammars::{Grammar, ProdId, Production};
use crate::parsers::earley::Parsing;
use crate::parsers::walker::WalkEvent;
use crate::tokens::{Token, TokenRange};
use log::trace;

pub mod ast;
pub mod cst;

pub use ast::AstBuilder;
pub use cst::CstFactory;

/// Makes the nodes of a tree
pub trait NodeFactory {
    type Node;

    fn leaf(&mut self, grammar: &Grammar, token: &Token, span: TokenRange) -> Self::Node;

    /// `children` holds one node per rhs symbol, in rhs order
    fn reduce(
        &mut self,
        grammar: &Grammar,
        production: &Production,
        span: TokenRange,
        children: Vec<Self::Node>,
    ) -> Self::Node;
}

impl<F: NodeFactory + ?Sized> NodeFactory for &mut F {
    type Node = F::Node;

    fn leaf(&mut self, grammar: &Grammar, token: &Token, span: TokenRange) -> Self::Node {
        (**self).leaf(grammar, token, span)
    }

    fn reduce(
        &mut self,
        grammar: &Grammar,
        production: &Production,
        span: TokenRange,
        children: Vec<Self::Node>,
    ) -> Self::Node {
        (**self).reduce(grammar, production, span, children)
    }
}

struct PendingNode<N> {
    production: ProdId,
    span: TokenRange,
    /// Slot in the parent, `None` for the root
    slot: Option<usize>,
    children: Vec<Option<N>>,
}

pub struct TreeBuilder<'p, F: NodeFactory> {
    parsing: &'p Parsing,
    factory: F,
    stack: Vec<PendingNode<F::Node>>,
    root: Option<F::Node>,
}

impl<'p, F: NodeFactory> TreeBuilder<'p, F> {
    pub fn new(parsing: &'p Parsing, factory: F) -> Self {
        TreeBuilder {
            parsing,
            factory,
            stack: Vec::new(),
            root: None,
        }
    }

    /// Number of pending nodes
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn receive(&mut self, event: WalkEvent) -> Result<(), ForestError> {
        let parsing = self.parsing;
        let grammar = parsing.grammar();
        match event {
            WalkEvent::Enter {
                production,
                span,
                slot,
                ..
            } => {
                let len = grammar.production(production).len();
                self.stack.push(PendingNode {
                    production,
                    span,
                    slot,
                    children: (0..len).map(|_| None).collect(),
                });
            }
            WalkEvent::Leaf { token, slot, .. } => {
                let tokens = parsing.tokens();
                let tok = tokens.get(token).ok_or(ForestError::TokenOutOfRange {
                    token,
                    len: tokens.len(),
                })?;
                let node = self
                    .factory
                    .leaf(grammar, tok, TokenRange::new(token, token + 1));
                let top = self.stack.last_mut().ok_or(ForestError::EmptyStack("leaf"))?;
                place(top, Some(slot), node)?;
            }
            WalkEvent::Reduce { production, .. } => {
                let pending = self.stack.pop().ok_or(ForestError::EmptyStack("reduce"))?;
                if pending.production != production {
                    return Err(ForestError::ProductionMismatch {
                        expected: pending.production.0,
                        found: production.0,
                    });
                }
                let mut children = Vec::with_capacity(pending.children.len());
                for (slot, child) in pending.children.into_iter().enumerate() {
                    match child {
                        Some(node) => children.push(node),
                        None => {
                            return Err(ForestError::MissingChild {
                                production: production.0,
                                slot,
                            })
                        }
                    }
                }
                trace!(
                    "reduce {} over {}",
                    grammar.production_to_string(production),
                    pending.span
                );
                let node = self.factory.reduce(
                    grammar,
                    grammar.production(production),
                    pending.span,
                    children,
                );
                match self.stack.last_mut() {
                    Some(parent) => place(parent, pending.slot, node)?,
                    None if self.root.is_none() => self.root = Some(node),
                    None => return Err(ForestError::UnbalancedTree(0)),
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<F::Node, ForestError> {
        if !self.stack.is_empty() {
            return Err(ForestError::UnbalancedTree(self.stack.len()));
        }
        self.root.ok_or(ForestError::NoRoot)
    }
}

/// Put `node` at `slot`, or at the rightmost free slot when none is given
fn place<N>(pending: &mut PendingNode<N>, slot: Option<usize>, node: N) -> Result<(), ForestError> {
    let production = pending.production.0;
    let len = pending.children.len();
    let slot = match slot {
        Some(slot) => slot,
        None => pending
            .children
            .iter()
            .rposition(Option::is_none)
            .ok_or(ForestError::SlotOutOfRange {
                production,
                slot: len,
                len,
            })?,
    };
    let cell = pending
        .children
        .get_mut(slot)
        .ok_or(ForestError::SlotOutOfRange {
            production,
            slot,
            len,
        })?;
    if cell.is_some() {
        return Err(ForestError::SlotOccupied { production, slot });
    }
    *cell = Some(node);
    Ok(())
}

/// Walk one derivation of `parsing` and build it with `factory`
pub fn build_tree<F: NodeFactory>(parsing: &Parsing, factory: F) -> Result<F::Node, ForestError> {
    let mut builder = TreeBuilder::new(parsing, factory);
    for event in parsing.walker() {
        builder.receive(event?)?;
    }
    builder.finish()
}
