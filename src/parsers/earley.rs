// Earley parser running directly over the Grammar Flow Graph
use crate::dotted_item::DotPosition;
use crate::error::ParseFailure;
use crate::gfg::{EdgeKind, GrammarFlowGraph, Vertex, VertexId};
use crate::grammars::{Grammar, Symbol};
use crate::parsers::walker::ParseWalker;
use crate::tokens::Token;
use log::{debug, trace, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

pub mod chart;

pub use chart::{Chart, EntryRef, ParseEntry, StateSet};

type DerivationTerms = Vec<(EntryRef, Option<EntryRef>)>;

/// Chart parser over a shared, immutable GFG.
///
/// The parser holds no per-parse state, so one instance (or clones of its
/// graph handle) can serve parses on several threads at once.
#[derive(Debug, Clone)]
pub struct EarleyParser {
    gfg: Arc<GrammarFlowGraph>,
}

impl EarleyParser {
    pub fn new(grammar: Grammar) -> Self {
        Self::from_graph(Arc::new(GrammarFlowGraph::new(grammar)))
    }

    pub fn from_graph(gfg: Arc<GrammarFlowGraph>) -> Self {
        EarleyParser { gfg }
    }

    pub fn graph(&self) -> &Arc<GrammarFlowGraph> {
        &self.gfg
    }

    pub fn grammar(&self) -> &Grammar {
        self.gfg.grammar()
    }

    /// Run the chart over `tokens`, pulling them one at a time in order.
    ///
    /// Stops at the first position where no entry survives the shift, so
    /// tokens past a syntax error are never requested.
    pub fn parse<I>(&self, tokens: I) -> Result<Parsing, ParseFailure>
    where
        I: IntoIterator<Item = Token>,
    {
        let grammar = self.gfg.grammar();
        let mut input = tokens.into_iter();
        let mut consumed: Vec<Token> = Vec::new();

        let mut chart = Chart::new();
        chart.push(0, self.gfg.start_vertex(grammar.start()), 0, None);

        let mut i = 0;
        loop {
            let token = input.next();
            let terminal = match &token {
                Some(tok) => {
                    chart.add_set();
                    let id = grammar.terminal_id(&tok.terminal);
                    if id.is_none() {
                        warn!(
                            "token '{}' at position {} names undeclared terminal '{}'",
                            tok.lexeme, i, tok.terminal
                        );
                    }
                    id
                }
                None => None,
            };

            self.fill_set(&mut chart, i, terminal);
            trace!("state set {}: {} entries", i, chart.set(i).len());

            let token = match token {
                Some(token) => token,
                None => break,
            };
            if chart.set(i + 1).is_empty() {
                let failure = self.failure(&chart, i, Some(token));
                debug!("parse failed: {}", failure);
                return Err(failure);
            }
            consumed.push(token);
            i += 1;
        }

        match chart.find(i, self.gfg.end_vertex(grammar.start()), 0) {
            Some(accept) => {
                debug!(
                    "accepted {} tokens with {} chart entries",
                    consumed.len(),
                    chart.total_entries()
                );
                Ok(Parsing {
                    gfg: Arc::clone(&self.gfg),
                    chart,
                    tokens: consumed,
                    accept,
                })
            }
            None => {
                let failure = self.failure(&chart, i, None);
                debug!("parse failed: {}", failure);
                Err(failure)
            }
        }
    }

    pub fn recognize<I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = Token>,
    {
        self.parse(tokens).is_ok()
    }

    /// Close state set `i` with a work list. Shifts of `next_terminal` seed
    /// set `i + 1`.
    fn fill_set(&self, chart: &mut Chart, i: usize, next_terminal: Option<u32>) {
        let mut j = 0;
        while j < chart.set(i).len() {
            let here = EntryRef::new(i, j);
            let (vertex, origin) = {
                let entry = chart.entry(here);
                (entry.vertex, entry.origin)
            };

            if let Vertex::End(nt) = self.gfg.vertex(vertex) {
                self.complete(chart, here, nt, origin);
            } else {
                for edge in self.gfg.edges(vertex) {
                    match edge.kind {
                        EdgeKind::Start => {
                            chart.push(i, edge.to, origin, Some(here));
                        }
                        EdgeKind::End => {
                            chart.push(i, edge.to, origin, Some(here));
                        }
                        EdgeKind::Shift(t) => {
                            if next_terminal == Some(t) {
                                chart.push(i + 1, edge.to, origin, Some(here));
                            }
                        }
                        EdgeKind::Call(callee) => {
                            self.call(chart, here, vertex, origin, callee, edge.to);
                        }
                        // only End vertices carry return edges
                        EdgeKind::Return(_) => {}
                    }
                }
            }
            j += 1;
        }
    }

    fn call(
        &self,
        chart: &mut Chart,
        here: EntryRef,
        vertex: VertexId,
        origin: usize,
        callee: u32,
        callee_start: VertexId,
    ) {
        let i = here.position;
        chart.register_caller(here, callee);
        chart.push(i, callee_start, i, Some(here));

        // The callee may already have completed at this very position
        // through an empty derivation; its End entry will not be revisited.
        if let Some(end) = chart.find(i, self.gfg.end_vertex(callee), i) {
            if let Some(next) = self.gfg.successor(vertex) {
                chart.push(i, next, origin, Some(end));
            }
        }
    }

    fn complete(&self, chart: &mut Chart, here: EntryRef, nt: u32, origin: usize) {
        let callers = chart.set(origin).callers(nt).to_vec();
        for index in callers {
            let (caller_vertex, caller_origin) = {
                let caller = chart.entry(EntryRef::new(origin, index));
                (caller.vertex, caller.origin)
            };
            if let Some(next) = self.gfg.successor(caller_vertex) {
                chart.push(here.position, next, caller_origin, Some(here));
            }
        }
    }

    fn failure(&self, chart: &Chart, position: usize, found: Option<Token>) -> ParseFailure {
        let grammar = self.gfg.grammar();
        let mut expected: Vec<String> = chart
            .expected_terminals(&self.gfg, position)
            .into_iter()
            .map(|t| grammar.terminal_name(t).to_string())
            .collect();
        expected.sort();
        ParseFailure {
            position,
            expected,
            found,
        }
    }
}

/// A successful parse: the chart, the consumed tokens and the accepting
/// entry `(End(start), 0)` in the last state set.
#[derive(Debug, Clone)]
pub struct Parsing {
    gfg: Arc<GrammarFlowGraph>,
    chart: Chart,
    tokens: Vec<Token>,
    accept: EntryRef,
}

impl Parsing {
    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn graph(&self) -> &GrammarFlowGraph {
        &self.gfg
    }

    pub fn grammar(&self) -> &Grammar {
        self.gfg.grammar()
    }

    pub fn accepting_entry(&self) -> EntryRef {
        self.accept
    }

    /// Lazy event stream for one derivation of the input
    pub fn walker(&self) -> ParseWalker<'_> {
        ParseWalker::new(self)
    }

    /// Entries with several antecedents anywhere in the chart. Some of them
    /// may belong to partial parses that do not reach the accepting entry.
    pub fn ambiguous_entries(&self) -> Vec<EntryRef> {
        self.chart.ambiguous_entries()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.count_derivations().map_or(true, |n| n > 1)
    }

    /// Number of distinct derivation trees of the input, or `None` when a
    /// cycle in the grammar makes it unbounded. Saturates at `u128::MAX`.
    ///
    /// Entries are counted in post-order with an explicit stack, so deeply
    /// nested inputs do not grow the call stack.
    pub fn count_derivations(&self) -> Option<u128> {
        let mut memo: FxHashMap<EntryRef, u128> = FxHashMap::default();
        // entries whose count is in progress; meeting one again is a cycle
        let mut active: FxHashSet<EntryRef> = FxHashSet::default();
        let mut stack = vec![(self.accept, false)];

        while let Some((at, expanded)) = stack.pop() {
            if memo.contains_key(&at) {
                continue;
            }
            let terms = self.derivation_terms(at);

            if !expanded {
                if !active.insert(at) {
                    return None;
                }
                stack.push((at, true));
                for &(left, right) in terms.iter().flatten() {
                    for dep in std::iter::once(left).chain(right) {
                        if !memo.contains_key(&dep) {
                            stack.push((dep, false));
                        }
                    }
                }
                continue;
            }

            let count = |dep: &EntryRef| memo.get(dep).copied().unwrap_or_default();
            let total = match terms {
                None => 1,
                Some(terms) => terms.iter().fold(0u128, |sum, (left, right)| {
                    let product = match right {
                        Some(right) => count(left).saturating_mul(count(right)),
                        None => count(left),
                    };
                    sum.saturating_add(product)
                }),
            };
            active.remove(&at);
            memo.insert(at, total);
        }

        memo.get(&self.accept).copied()
    }

    /// How the count of `at` decomposes: a sum of products of one or two
    /// other entries. `None` marks an entry that opens a production and
    /// counts once.
    fn derivation_terms(&self, at: EntryRef) -> Option<DerivationTerms> {
        let entry = self.chart.entry(at);
        let grammar = self.gfg.grammar();
        let single = || -> Option<DerivationTerms> {
            Some(entry.antecedents().iter().map(|&from| (from, None)).collect())
        };

        let item = match self.gfg.vertex(entry.vertex) {
            Vertex::Start(_) => return None,
            Vertex::End(_) => return single(),
            Vertex::Item(item) => item,
        };
        match item.position(grammar) {
            DotPosition::Empty | DotPosition::AtStart => None,
            DotPosition::Middle | DotPosition::AtEnd => match item.prev_symbol(grammar) {
                // each antecedent is a callee End; pair it with the caller
                // entry that predicted it
                Some(Symbol::NonTerminal(_)) => {
                    let caller_vertex = self.gfg.predecessor(entry.vertex);
                    let terms = entry
                        .antecedents()
                        .iter()
                        .filter_map(|&end| {
                            let end_origin = self.chart.entry(end).origin;
                            let caller = caller_vertex
                                .and_then(|v| self.chart.find(end_origin, v, entry.origin))?;
                            Some((end, Some(caller)))
                        })
                        .collect();
                    Some(terms)
                }
                _ => single(),
            },
        }
    }
}

#[cfg(test)]
#[path = "earley_tests.rs"]
mod tests;
