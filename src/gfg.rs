// Grammar Flow Graph - the grammar compiled into vertices and labelled edges

use crate::dotted_item::DottedItem;
use crate::grammars::{Grammar, ProdId, Symbol};

/// Index of a vertex in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    /// `.N` - entry point for recognizing the non-terminal N
    Start(u32),
    /// `N.` - some production of N has been fully recognized
    End(u32),
    Item(DottedItem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `.N -> N => . alpha`
    Start,
    /// `N => alpha . -> N.`
    End,
    /// Consumes one token of the given terminal
    Shift(u32),
    /// Predicts the given non-terminal
    Call(u32),
    /// Completion of the given non-terminal back into its caller
    Return(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub kind: EdgeKind,
    pub to: VertexId,
}

#[derive(Debug)]
struct GNode {
    vertex: Vertex,
    edges: Vec<Edge>,
}

/// The GFG of a grammar. Immutable once built and safe to share between
/// threads; every parse keeps its own chart.
#[derive(Debug)]
pub struct GrammarFlowGraph {
    grammar: Grammar,
    nodes: Vec<GNode>,
    /// Start vertex of each non-terminal
    start_vertices: Vec<VertexId>,
    /// End vertex of each non-terminal
    end_vertices: Vec<VertexId>,
    /// Dot-0 item vertex of each production; dot k lives at base + k
    item_base: Vec<VertexId>,
}

impl GrammarFlowGraph {
    pub fn new(grammar: Grammar) -> Self {
        let mut nodes = Vec::new();
        let push = |nodes: &mut Vec<GNode>, vertex: Vertex| {
            nodes.push(GNode {
                vertex,
                edges: Vec::new(),
            });
            VertexId(nodes.len() - 1)
        };

        let nt_count = grammar.non_terminals().len() as u32;
        let mut start_vertices = Vec::with_capacity(nt_count as usize);
        let mut end_vertices = Vec::with_capacity(nt_count as usize);
        for nt in 0..nt_count {
            start_vertices.push(push(&mut nodes, Vertex::Start(nt)));
            end_vertices.push(push(&mut nodes, Vertex::End(nt)));
        }

        // One item per dot position; an empty rhs gets its single dot-0 item
        let mut item_base = Vec::with_capacity(grammar.productions().len());
        for prod in grammar.productions() {
            let base = VertexId(nodes.len());
            for dot in 0..=prod.len() {
                push(&mut nodes, Vertex::Item(DottedItem::new(prod.id, dot)));
            }
            item_base.push(base);
        }

        let mut graph = GrammarFlowGraph {
            grammar,
            nodes,
            start_vertices,
            end_vertices,
            item_base,
        };
        graph.wire_edges();
        graph
    }

    fn wire_edges(&mut self) {
        for nt in 0..self.grammar.non_terminals().len() as u32 {
            let start = self.start_vertex(nt);
            for i in 0..self.grammar.productions_of(nt).len() {
                let prod = self.grammar.productions_of(nt)[i];
                let entry = self.item_vertex(prod, 0);
                self.add_edge(start, EdgeKind::Start, entry);
            }
        }

        for p in 0..self.grammar.productions().len() {
            let (lhs, rhs) = {
                let prod = &self.grammar.productions()[p];
                (prod.lhs, prod.rhs.clone())
            };
            let prod = ProdId(p);
            for (k, sym) in rhs.iter().enumerate() {
                let here = self.item_vertex(prod, k);
                let next = self.item_vertex(prod, k + 1);
                match *sym {
                    Symbol::Terminal(t) => self.add_edge(here, EdgeKind::Shift(t), next),
                    Symbol::NonTerminal(m) => {
                        let callee_start = self.start_vertex(m);
                        let callee_end = self.end_vertex(m);
                        self.add_edge(here, EdgeKind::Call(m), callee_start);
                        self.add_edge(callee_end, EdgeKind::Return(m), next);
                    }
                }
            }
            let exit = self.item_vertex(prod, rhs.len());
            let end = self.end_vertex(lhs);
            self.add_edge(exit, EdgeKind::End, end);
        }
    }

    fn add_edge(&mut self, from: VertexId, kind: EdgeKind, to: VertexId) {
        self.nodes[from.0].edges.push(Edge { kind, to });
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn vertex(&self, id: VertexId) -> Vertex {
        self.nodes[id.0].vertex
    }

    /// Outgoing edges in wiring order
    pub fn edges(&self, id: VertexId) -> &[Edge] {
        &self.nodes[id.0].edges
    }

    pub fn start_vertex(&self, nt: u32) -> VertexId {
        self.start_vertices[nt as usize]
    }

    pub fn end_vertex(&self, nt: u32) -> VertexId {
        self.end_vertices[nt as usize]
    }

    pub fn item_vertex(&self, prod: ProdId, dot: usize) -> VertexId {
        debug_assert!(dot <= self.grammar.production(prod).len());
        VertexId(self.item_base[prod.0].0 + dot)
    }

    /// `Item(P, k+1)` for an item vertex `Item(P, k)` that is not complete.
    /// This is the target of the shift edge, or of the return edge paired
    /// with the call edge, leaving `Item(P, k)`.
    pub fn successor(&self, id: VertexId) -> Option<VertexId> {
        match self.vertex(id) {
            Vertex::Item(item) if !item.is_complete(&self.grammar) => Some(VertexId(id.0 + 1)),
            _ => None,
        }
    }

    /// Item vertex preceding `Item(P, k)`, for k > 0
    pub fn predecessor(&self, id: VertexId) -> Option<VertexId> {
        match self.vertex(id) {
            Vertex::Item(item) if item.dot > 0 => Some(VertexId(id.0 - 1)),
            _ => None,
        }
    }

    /// Human readable vertex label: `.N`, `N.` or `N => a . B c`
    pub fn label(&self, id: VertexId) -> String {
        match self.vertex(id) {
            Vertex::Start(nt) => format!(".{}", self.grammar.non_terminal_name(nt)),
            Vertex::End(nt) => format!("{}.", self.grammar.non_terminal_name(nt)),
            Vertex::Item(item) => item.display(&self.grammar).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn abc_graph() -> GrammarFlowGraph {
        let grammar = GrammarBuilder::new("abc")
            .terminals(["a", "b", "c"])
            .rule("S", &["A"])
            .rule("A", &["a", "A", "c"])
            .rule("A", &["b"])
            .rule("A", &[])
            .build()
            .unwrap();
        GrammarFlowGraph::new(grammar)
    }

    fn edge_labels(graph: &GrammarFlowGraph, id: VertexId) -> Vec<(EdgeKind, String)> {
        graph
            .edges(id)
            .iter()
            .map(|e| (e.kind, graph.label(e.to)))
            .collect()
    }

    #[test]
    fn test_vertex_count() {
        let graph = abc_graph();
        // 2 non-terminals * (start + end) + items 2 + 4 + 2 + 1
        assert_eq!(graph.len(), 13);
        assert_eq!(graph.label(graph.start_vertex(1)), ".A");
        assert_eq!(graph.label(graph.end_vertex(1)), "A.");
        assert_eq!(graph.label(graph.item_vertex(ProdId(1), 2)), "A => a A . c");
        assert_eq!(graph.label(graph.item_vertex(ProdId(3), 0)), "A => .");
    }

    #[test]
    fn test_start_edges() {
        let graph = abc_graph();
        let a = graph.grammar().non_terminal_id("A").unwrap();
        assert_eq!(
            edge_labels(&graph, graph.start_vertex(a)),
            vec![
                (EdgeKind::Start, "A => . a A c".to_string()),
                (EdgeKind::Start, "A => . b".to_string()),
                (EdgeKind::Start, "A => .".to_string()),
            ]
        );
    }

    #[test]
    fn test_call_return_pairs() {
        let graph = abc_graph();
        let a = graph.grammar().non_terminal_id("A").unwrap();
        let call_site = graph.item_vertex(ProdId(1), 1);
        assert_eq!(
            edge_labels(&graph, call_site),
            vec![(EdgeKind::Call(a), ".A".to_string())]
        );

        // Every return edge lands right after a call of the same non-terminal
        let returns = graph.edges(graph.end_vertex(a));
        assert_eq!(returns.len(), 2);
        for edge in returns {
            assert_eq!(edge.kind, EdgeKind::Return(a));
            let caller = graph.predecessor(edge.to).unwrap();
            assert!(graph
                .edges(caller)
                .iter()
                .any(|e| e.kind == EdgeKind::Call(a) && e.to == graph.start_vertex(a)));
            assert_eq!(graph.successor(caller), Some(edge.to));
        }
    }

    #[test]
    fn test_shift_and_end_edges() {
        let graph = abc_graph();
        let b = graph.grammar().terminal_id("b").unwrap();
        let entry = graph.item_vertex(ProdId(2), 0);
        assert_eq!(
            edge_labels(&graph, entry),
            vec![(EdgeKind::Shift(b), "A => b .".to_string())]
        );
        let exit = graph.item_vertex(ProdId(2), 1);
        assert_eq!(edge_labels(&graph, exit), vec![(EdgeKind::End, "A.".to_string())]);
        assert_eq!(graph.successor(exit), None);
    }

    #[test]
    fn test_empty_production_single_item() {
        let graph = abc_graph();
        let item = graph.item_vertex(ProdId(3), 0);
        // Entry and exit coincide: reached by a start edge, left by an end edge
        assert_eq!(edge_labels(&graph, item), vec![(EdgeKind::End, "A.".to_string())]);
        assert_eq!(graph.successor(item), None);
        assert_eq!(graph.predecessor(item), None);
    }
}
