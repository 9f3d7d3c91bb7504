use crate::tokens::TokenRange;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "symbol")]
pub enum ParseSymbol {
    NonTerminal(String),
    Terminal(String),
}

impl ParseSymbol {
    pub fn name(&self) -> &str {
        match self {
            ParseSymbol::NonTerminal(s) | ParseSymbol::Terminal(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ParseSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A concrete syntax tree node.
///
/// Terminal nodes carry the lexeme of the token they matched; non-terminal
/// nodes have one child per rhs symbol of the production that built them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    pub name: ParseSymbol,
    pub span: TokenRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexeme: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn node(name: &str, span: TokenRange, children: Vec<ParseTree>) -> Self {
        ParseTree {
            name: ParseSymbol::NonTerminal(name.to_string()),
            span,
            lexeme: None,
            children,
        }
    }

    pub fn leaf(terminal: &str, lexeme: &str, span: TokenRange) -> Self {
        ParseTree {
            name: ParseSymbol::Terminal(terminal.to_string()),
            span,
            lexeme: Some(lexeme.to_string()),
            children: Vec::new(),
        }
    }

    pub fn symbol_name(&self) -> &str {
        self.name.name()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.name, ParseSymbol::Terminal(_))
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Nodes in pre-order with their depth, root at depth 0
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            stack: vec![(0, self)],
        }
    }

    /// Terminal nodes from left to right
    pub fn leaves(&self) -> Vec<&ParseTree> {
        self.preorder()
            .map(|(_, node)| node)
            .filter(|node| node.is_terminal())
            .collect()
    }

    pub fn lexemes(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| leaf.lexeme.as_deref())
            .collect()
    }

    fn label(&self) -> String {
        match &self.lexeme {
            Some(lexeme) => format!("{}{}: '{}'", self.name, self.span, lexeme),
            None => format!("{}{}", self.name, self.span),
        }
    }

    /// Display tree as ASCII art with box-drawing characters
    /// Output format:
    ///
    /// ```text
    /// S[0, 1]
    /// └─ A[0, 1]
    ///     └─ b[0, 1]: 'b'
    /// ```
    pub fn display(&self) -> String {
        let mut lines = Vec::new();
        self.build_display(&mut lines, String::new(), true, true);
        lines.join("\n")
    }

    fn build_display(&self, lines: &mut Vec<String>, prefix: String, is_last: bool, is_root: bool) {
        if is_root {
            lines.push(self.label());
        } else {
            let connector = if is_last { "└─ " } else { "├─ " };
            lines.push(format!("{}{}{}", prefix, connector, self.label()));
        }

        let child_prefix = if is_root {
            String::new()
        } else if is_last {
            format!("{}    ", prefix)
        } else {
            format!("{}│   ", prefix)
        };

        let num_children = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.build_display(lines, child_prefix.clone(), i == num_children - 1, false);
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Preorder<'t> {
    stack: Vec<(usize, &'t ParseTree)>,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = (usize, &'t ParseTree);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn r(low: usize, high: usize) -> TokenRange {
        TokenRange::new(low, high)
    }

    /// S -> A, A -> a A c | b over `a b c`
    fn sample() -> ParseTree {
        ParseTree::node(
            "S",
            r(0, 3),
            vec![ParseTree::node(
                "A",
                r(0, 3),
                vec![
                    ParseTree::leaf("a", "a", r(0, 1)),
                    ParseTree::node("A", r(1, 2), vec![ParseTree::leaf("b", "b", r(1, 2))]),
                    ParseTree::leaf("c", "c", r(2, 3)),
                ],
            )],
        )
    }

    #[test]
    fn test_leaf() {
        let leaf = ParseTree::leaf("id", "x", r(0, 1));
        assert_eq!(leaf.name, ParseSymbol::Terminal("id".to_string()));
        assert!(leaf.is_terminal());
        assert_eq!(leaf.symbol_name(), "id");
    }

    #[test]
    fn test_preorder() {
        let tree = sample();
        let visited: Vec<(usize, &str)> = tree
            .preorder()
            .map(|(depth, node)| (depth, node.symbol_name()))
            .collect();
        assert_eq!(
            visited,
            vec![(0, "S"), (1, "A"), (2, "a"), (2, "A"), (3, "b"), (2, "c")]
        );
        assert_eq!(tree.lexemes(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display() {
        let expected = "\
S[0, 3]
└─ A[0, 3]
    ├─ a[0, 1]: 'a'
    ├─ A[1, 2]
    │   └─ b[1, 2]: 'b'
    └─ c[2, 3]: 'c'";
        assert_eq!(sample().display(), expected);
    }

    #[test]
    fn test_json() {
        let tree = ParseTree::node("L", r(0, 2), vec![ParseTree::leaf("[", "[", r(0, 1))]);
        let value: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": {"kind": "NonTerminal", "symbol": "L"},
                "span": {"low": 0, "high": 2},
                "children": [{
                    "name": {"kind": "Terminal", "symbol": "["},
                    "span": {"low": 0, "high": 1},
                    "lexeme": "["
                }]
            })
        );
    }
}
