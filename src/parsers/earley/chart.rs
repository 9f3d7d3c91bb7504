// Chart storage for the Earley engine: one state set per input position

use crate::gfg::{EdgeKind, GrammarFlowGraph, VertexId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

type HashMap<K, V> = FxHashMap<K, V>;
type HashSet<T> = FxHashSet<T>;

/// Address of an entry: state set index and position inside that set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryRef {
    pub position: usize,
    pub index: usize,
}

impl EntryRef {
    pub fn new(position: usize, index: usize) -> Self {
        EntryRef { position, index }
    }
}

/// A `(vertex, origin)` pair living in some state set.
///
/// Antecedents are the entries this one was derived from, in discovery
/// order. The first antecedent always sits at a smaller `(position, index)`
/// than the entry itself.
#[derive(Debug, Clone)]
pub struct ParseEntry {
    pub vertex: VertexId,
    pub origin: usize,
    antecedents: Vec<EntryRef>,
}

impl ParseEntry {
    pub fn antecedents(&self) -> &[EntryRef] {
        &self.antecedents
    }

    pub fn is_ambiguous(&self) -> bool {
        self.antecedents.len() > 1
    }
}

#[derive(Debug, Default, Clone)]
pub struct StateSet {
    entries: Vec<ParseEntry>,
    lookup: HashMap<(VertexId, usize), usize>,
    /// `(entry index, antecedent)` links already recorded in `entries`
    links: HashSet<(usize, EntryRef)>,
    /// Entries of this set whose next symbol is the keyed non-terminal
    callers: HashMap<u32, Vec<usize>>,
}

impl StateSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ParseEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ParseEntry> {
        self.entries.get(index)
    }

    pub fn find(&self, vertex: VertexId, origin: usize) -> Option<usize> {
        self.lookup.get(&(vertex, origin)).copied()
    }

    /// Indices of the entries waiting for `nt` to complete
    pub fn callers(&self, nt: u32) -> &[usize] {
        self.callers.get(&nt).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the index of the entry and whether it is new
    fn add_entry(
        &mut self,
        vertex: VertexId,
        origin: usize,
        antecedent: Option<EntryRef>,
    ) -> (usize, bool) {
        if let Some(&index) = self.lookup.get(&(vertex, origin)) {
            if let Some(from) = antecedent {
                if self.links.insert((index, from)) {
                    self.entries[index].antecedents.push(from);
                }
            }
            return (index, false);
        }

        let index = self.entries.len();
        self.entries.push(ParseEntry {
            vertex,
            origin,
            antecedents: antecedent.into_iter().collect(),
        });
        self.lookup.insert((vertex, origin), index);
        if let Some(from) = antecedent {
            self.links.insert((index, from));
        }
        (index, true)
    }

    fn register_caller(&mut self, nt: u32, index: usize) {
        let callers = self.callers.entry(nt).or_default();
        if !callers.contains(&index) {
            callers.push(index);
        }
    }
}

/// The `n + 1` state sets of one parse
#[derive(Debug, Clone)]
pub struct Chart {
    sets: Vec<StateSet>,
}

impl Chart {
    pub(crate) fn new() -> Self {
        Chart {
            sets: vec![StateSet::default()],
        }
    }

    pub(crate) fn add_set(&mut self) {
        self.sets.push(StateSet::default());
    }

    /// Number of state sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[StateSet] {
        &self.sets
    }

    pub fn set(&self, position: usize) -> &StateSet {
        &self.sets[position]
    }

    /// Panics on an address that was not handed out by this chart
    pub fn entry(&self, at: EntryRef) -> &ParseEntry {
        &self.sets[at.position].entries[at.index]
    }

    pub fn find(&self, position: usize, vertex: VertexId, origin: usize) -> Option<EntryRef> {
        self.sets
            .get(position)?
            .find(vertex, origin)
            .map(|index| EntryRef::new(position, index))
    }

    pub(crate) fn push(
        &mut self,
        position: usize,
        vertex: VertexId,
        origin: usize,
        antecedent: Option<EntryRef>,
    ) -> (EntryRef, bool) {
        let (index, added) = self.sets[position].add_entry(vertex, origin, antecedent);
        (EntryRef::new(position, index), added)
    }

    pub(crate) fn register_caller(&mut self, at: EntryRef, nt: u32) {
        self.sets[at.position].register_caller(nt, at.index);
    }

    pub fn total_entries(&self) -> usize {
        self.sets.iter().map(StateSet::len).sum()
    }

    /// Index of the last non-empty state set
    pub fn last_index(&self) -> usize {
        self.sets.iter().rposition(|set| !set.is_empty()).unwrap_or(0)
    }

    /// Terminals that some entry at `position` could shift next, sorted by id
    pub fn expected_terminals(&self, gfg: &GrammarFlowGraph, position: usize) -> Vec<u32> {
        let Some(set) = self.sets.get(position) else {
            return Vec::new();
        };
        let mut expected = BTreeSet::new();
        for entry in &set.entries {
            for edge in gfg.edges(entry.vertex) {
                if let EdgeKind::Shift(t) = edge.kind {
                    expected.insert(t);
                }
            }
        }
        expected.into_iter().collect()
    }

    /// `(vertex, origin)` pairs of a state set in a canonical order, for
    /// comparisons that must not depend on discovery order
    pub fn sorted_entries(&self, position: usize) -> Vec<(VertexId, usize)> {
        let mut pairs: Vec<_> = self.sets[position]
            .entries
            .iter()
            .map(|e| (e.vertex, e.origin))
            .collect();
        pairs.sort();
        pairs
    }

    /// Entries reached along more than one antecedent, in chart order
    pub fn ambiguous_entries(&self) -> Vec<EntryRef> {
        let mut found = Vec::new();
        for (position, set) in self.sets.iter().enumerate() {
            for (index, entry) in set.entries.iter().enumerate() {
                if entry.is_ambiguous() {
                    found.push(EntryRef::new(position, index));
                }
            }
        }
        found
    }
}
