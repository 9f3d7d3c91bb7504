//! Forest walker: replays one derivation of a successful parse as a lazy
//! stream of events.
//!
//! The walk starts from the accepting entry and follows antecedents
//! backwards through the chart, so productions are visited top-down and
//! their right-hand sides right-to-left. Every event carries the rhs slot
//! it fills in its parent, which lets a consumer place children without
//! reversing anything.
//!
//! Where an entry has several antecedents the walker takes the first one
//! discovered. That antecedent was always created before the entry, so
//! the walk terminates even on cyclic grammars.

use crate::dotted_item::DotPosition;
use crate::error::ForestError;
use crate::gfg::{Vertex, VertexId};
use crate::grammars::{ProdId, Symbol};
use crate::parsers::earley::{EntryRef, Parsing};
use crate::tokens::TokenRange;
use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    /// A non-terminal node begins. `slot` is its position in the parent's
    /// rhs, `None` for the root.
    Enter {
        non_terminal: u32,
        production: ProdId,
        span: TokenRange,
        slot: Option<usize>,
    },
    /// Token `token` matched `terminal` at rhs slot `slot` of the open node
    Leaf {
        terminal: u32,
        token: usize,
        slot: usize,
    },
    /// All children of the open node for `production` have been emitted
    Reduce { production: ProdId, span: TokenRange },
}

/// Call site to resume once the callee's Start entry is reached
#[derive(Debug, Clone, Copy)]
struct ReturnPoint {
    caller: VertexId,
    origin: usize,
}

pub struct ParseWalker<'p> {
    parsing: &'p Parsing,
    current: Option<EntryRef>,
    returns: Vec<ReturnPoint>,
    open: Vec<TokenRange>,
    next_slot: Option<usize>,
}

impl<'p> ParseWalker<'p> {
    pub fn new(parsing: &'p Parsing) -> Self {
        ParseWalker {
            parsing,
            current: Some(parsing.accepting_entry()),
            returns: Vec::new(),
            open: Vec::new(),
            next_slot: None,
        }
    }

    fn first_antecedent(&self, at: EntryRef) -> Result<EntryRef, ForestError> {
        let entry = self.parsing.chart().entry(at);
        entry
            .antecedents()
            .first()
            .copied()
            .ok_or_else(|| ForestError::MissingAntecedent {
                entry: self.parsing.graph().label(entry.vertex),
                position: at.position,
            })
    }

    /// Advance by one entry, yielding at most one event
    fn step(&mut self, at: EntryRef) -> Result<Option<WalkEvent>, ForestError> {
        let parsing = self.parsing;
        let gfg = parsing.graph();
        let chart = parsing.chart();
        let entry = chart.entry(at);

        match gfg.vertex(entry.vertex) {
            Vertex::End(nt) => {
                let exit = self.first_antecedent(at)?;
                let production = match gfg.vertex(chart.entry(exit).vertex) {
                    Vertex::Item(item) => item.production,
                    _ => {
                        return Err(ForestError::MissingAntecedent {
                            entry: gfg.label(entry.vertex),
                            position: at.position,
                        })
                    }
                };
                let span = TokenRange::new(entry.origin, at.position);
                self.open.push(span);
                self.current = Some(exit);
                Ok(Some(WalkEvent::Enter {
                    non_terminal: nt,
                    production,
                    span,
                    slot: self.next_slot.take(),
                }))
            }
            Vertex::Item(item)
                if matches!(
                    item.position(gfg.grammar()),
                    DotPosition::Empty | DotPosition::AtStart
                ) =>
            {
                let span = self.open.pop().ok_or(ForestError::EmptyStack("reduce"))?;
                self.current = Some(self.first_antecedent(at)?);
                Ok(Some(WalkEvent::Reduce {
                    production: item.production,
                    span,
                }))
            }
            Vertex::Item(item) => {
                let previous = self.first_antecedent(at)?;
                match item.prev_symbol(gfg.grammar()) {
                    Some(Symbol::Terminal(terminal)) => {
                        self.current = Some(previous);
                        Ok(Some(WalkEvent::Leaf {
                            terminal,
                            token: at.position - 1,
                            slot: item.dot - 1,
                        }))
                    }
                    Some(Symbol::NonTerminal(_)) => {
                        // previous is the End entry of the callee
                        let caller = gfg.predecessor(entry.vertex).ok_or_else(|| {
                            ForestError::MissingAntecedent {
                                entry: gfg.label(entry.vertex),
                                position: at.position,
                            }
                        })?;
                        self.returns.push(ReturnPoint {
                            caller,
                            origin: entry.origin,
                        });
                        self.next_slot = Some(item.dot - 1);
                        self.current = Some(previous);
                        Ok(None)
                    }
                    None => Err(ForestError::MissingAntecedent {
                        entry: gfg.label(entry.vertex),
                        position: at.position,
                    }),
                }
            }
            Vertex::Start(_) => {
                match self.returns.pop() {
                    None => self.current = None,
                    Some(point) => {
                        let caller = chart
                            .find(at.position, point.caller, point.origin)
                            .ok_or_else(|| ForestError::MissingCaller {
                                vertex: gfg.label(point.caller),
                                origin: point.origin,
                                position: at.position,
                            })?;
                        self.current = Some(caller);
                    }
                }
                Ok(None)
            }
        }
    }
}

impl Iterator for ParseWalker<'_> {
    type Item = Result<WalkEvent, ForestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let at = self.current?;
            match self.step(at) {
                Ok(Some(event)) => {
                    trace!("walk {:?}", event);
                    return Some(Ok(event));
                }
                Ok(None) => continue,
                Err(err) => {
                    self.current = None;
                    return Some(Err(err));
                }
            }
        }
    }
}
