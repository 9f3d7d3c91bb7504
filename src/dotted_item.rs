use crate::grammars::{Grammar, ProdId, Symbol};
use std::fmt;

/// A production with a dot marking how much of its rhs is recognized.
///
/// `dot` ranges over `0..=rhs.len()`. For an empty rhs the single item
/// `dot == 0` is both the entry and the exit of the production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DottedItem {
    pub production: ProdId,
    pub dot: usize,
}

/// Where the dot sits relative to the rhs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotPosition {
    /// Empty rhs: entry and exit coincide
    Empty,
    AtStart,
    Middle,
    AtEnd,
}

impl DottedItem {
    pub fn new(production: ProdId, dot: usize) -> Self {
        DottedItem { production, dot }
    }

    pub fn position(&self, grammar: &Grammar) -> DotPosition {
        let len = grammar.production(self.production).len();
        match (len, self.dot) {
            (0, _) => DotPosition::Empty,
            (_, 0) => DotPosition::AtStart,
            (len, dot) if dot == len => DotPosition::AtEnd,
            _ => DotPosition::Middle,
        }
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.production).len()
    }

    /// Symbol right after the dot
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.production(self.production).rhs.get(self.dot).copied()
    }

    /// Symbol right before the dot
    pub fn prev_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        let dot = self.dot.checked_sub(1)?;
        grammar.production(self.production).rhs.get(dot).copied()
    }

    pub fn advance(&self) -> Self {
        DottedItem::new(self.production, self.dot + 1)
    }

    /// `A => a . A c` style label
    pub fn display<'g>(&self, grammar: &'g Grammar) -> DisplayItem<'g> {
        DisplayItem {
            item: *self,
            grammar,
        }
    }
}

pub struct DisplayItem<'g> {
    item: DottedItem,
    grammar: &'g Grammar,
}

impl fmt::Display for DisplayItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prod = self.grammar.production(self.item.production);
        write!(f, "{} =>", self.grammar.non_terminal_name(prod.lhs))?;
        for (i, sym) in prod.rhs.iter().enumerate() {
            if i == self.item.dot {
                write!(f, " .")?;
            }
            write!(f, " {}", self.grammar.symbol_name(*sym))?;
        }
        if self.item.dot >= prod.rhs.len() {
            write!(f, " .")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammars::GrammarBuilder;

    fn grammar() -> Grammar {
        GrammarBuilder::new("abc")
            .terminals(["a", "b", "c"])
            .rule("S", &["A"])
            .rule("A", &["a", "A", "c"])
            .rule("A", &[])
            .build()
            .unwrap()
    }

    #[test]
    fn test_positions() {
        let g = grammar();
        let p = ProdId(1);
        assert_eq!(DottedItem::new(p, 0).position(&g), DotPosition::AtStart);
        assert_eq!(DottedItem::new(p, 2).position(&g), DotPosition::Middle);
        assert_eq!(DottedItem::new(p, 3).position(&g), DotPosition::AtEnd);
        assert_eq!(DottedItem::new(ProdId(2), 0).position(&g), DotPosition::Empty);
        assert!(DottedItem::new(ProdId(2), 0).is_complete(&g));
    }

    #[test]
    fn test_symbols_around_dot() {
        let g = grammar();
        let item = DottedItem::new(ProdId(1), 1);
        assert_eq!(item.prev_symbol(&g), g.symbol("a"));
        assert_eq!(item.next_symbol(&g), g.symbol("A"));
        assert_eq!(item.advance(), DottedItem::new(ProdId(1), 2));
        assert_eq!(DottedItem::new(ProdId(1), 0).prev_symbol(&g), None);
        assert_eq!(DottedItem::new(ProdId(1), 3).next_symbol(&g), None);
    }

    #[test]
    fn test_display() {
        let g = grammar();
        assert_eq!(DottedItem::new(ProdId(1), 1).display(&g).to_string(), "A => a . A c");
        assert_eq!(DottedItem::new(ProdId(1), 3).display(&g).to_string(), "A => a A c .");
        assert_eq!(DottedItem::new(ProdId(2), 0).display(&g).to_string(), "A => .");
    }
}
