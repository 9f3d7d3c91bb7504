// Grammars module - symbol tables, productions, validation and JSON loading

use crate::error::GrammarError;
use serde::Deserialize;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Symbol Table - maps between strings and numeric IDs
// ============================================================================

/// Bidirectional mapping between symbol names and numeric IDs
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// String to ID mapping
    str_to_id: FxHashMap<String, u32>,
    /// ID to String mapping
    id_to_str: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create an ID for a symbol string
    pub fn get_or_insert(&mut self, symbol: &str) -> u32 {
        if let Some(&id) = self.str_to_id.get(symbol) {
            id
        } else {
            let id = self.id_to_str.len() as u32;
            self.str_to_id.insert(symbol.to_string(), id);
            self.id_to_str.push(symbol.to_string());
            id
        }
    }

    pub fn get_id(&self, symbol: &str) -> Option<u32> {
        self.str_to_id.get(symbol).copied()
    }

    pub fn get_str(&self, id: u32) -> Option<&str> {
        self.id_to_str.get(id as usize).map(|s| s.as_str())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.str_to_id.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.id_to_str.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_str.is_empty()
    }

    /// Names in ID order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.id_to_str.iter().map(|s| s.as_str())
    }
}

// ============================================================================
// Symbols and productions
// ============================================================================

/// A grammar symbol, identified by its index in the terminal or
/// non-terminal table of the owning grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(u32),
    NonTerminal(u32),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    pub fn id(&self) -> u32 {
        match self {
            Symbol::Terminal(id) | Symbol::NonTerminal(id) => *id,
        }
    }
}

/// Stable identity of a production: its index in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProdId(pub usize);

impl fmt::Display for ProdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rewrite rule `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub id: ProdId,
    /// Non-terminal ID of the left-hand side
    pub lhs: u32,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }
}

// ============================================================================
// Grammar
// ============================================================================

/// A validated context-free grammar.
///
/// Every non-terminal has at least one production, the start symbol is a
/// non-terminal and terminal names never appear as a left-hand side.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    start: u32,
    terminals: SymbolTable,
    non_terminals: SymbolTable,
    productions: Vec<Production>,
    /// Productions of each non-terminal, indexed by non-terminal ID
    rules: Vec<Vec<ProdId>>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Non-terminal ID of the start symbol
    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn start_name(&self) -> &str {
        self.non_terminal_name(self.start)
    }

    pub fn terminals(&self) -> &SymbolTable {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &SymbolTable {
        &self.non_terminals
    }

    /// All productions in declaration order
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> &Production {
        &self.productions[id.0]
    }

    /// Productions whose left-hand side is the non-terminal `nt`
    pub fn productions_of(&self, nt: u32) -> &[ProdId] {
        &self.rules[nt as usize]
    }

    pub fn terminal_id(&self, name: &str) -> Option<u32> {
        self.terminals.get_id(name)
    }

    pub fn non_terminal_id(&self, name: &str) -> Option<u32> {
        self.non_terminals.get_id(name)
    }

    pub fn terminal_name(&self, id: u32) -> &str {
        self.terminals.get_str(id).unwrap_or("?")
    }

    pub fn non_terminal_name(&self, id: u32) -> &str {
        self.non_terminals.get_str(id).unwrap_or("?")
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(id) => self.terminal_name(id),
            Symbol::NonTerminal(id) => self.non_terminal_name(id),
        }
    }

    /// Resolve a name to a symbol of either kind
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.terminal_id(name)
            .map(Symbol::Terminal)
            .or_else(|| self.non_terminal_id(name).map(Symbol::NonTerminal))
    }

    /// Find the production `lhs -> rhs` by symbol names.
    pub fn find_production(&self, lhs: &str, rhs: &[&str]) -> Result<ProdId, GrammarError> {
        let unknown = || GrammarError::UnknownRule {
            lhs: lhs.to_string(),
            rhs: rhs.join(" "),
        };
        let nt = self.non_terminal_id(lhs).ok_or_else(unknown)?;
        self.productions_of(nt)
            .iter()
            .copied()
            .find(|&id| {
                let prod = self.production(id);
                prod.rhs.len() == rhs.len()
                    && prod
                        .rhs
                        .iter()
                        .zip(rhs)
                        .all(|(sym, name)| self.symbol_name(*sym) == *name)
            })
            .ok_or_else(unknown)
    }

    /// Text form of a production, e.g. `A -> a A c`
    pub fn production_to_string(&self, id: ProdId) -> String {
        let prod = self.production(id);
        let lhs = self.non_terminal_name(prod.lhs);
        if prod.rhs.is_empty() {
            format!("{} -> ε", lhs)
        } else {
            let rhs: Vec<&str> = prod.rhs.iter().map(|s| self.symbol_name(*s)).collect();
            format!("{} -> {}", lhs, rhs.join(" "))
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar {} (start: {})", self.name, self.start_name())?;
        for prod in &self.productions {
            writeln!(f, "  {}", self.production_to_string(prod.id))?;
        }
        Ok(())
    }
}

// ============================================================================
// Grammar builder
// ============================================================================

/// Declares terminals and rules, then validates them into a [`Grammar`].
///
/// Any rhs name that was not declared as a terminal is a non-terminal.
/// The start symbol defaults to the lhs of the first rule.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    name: String,
    terminals: Vec<String>,
    rules: Vec<(String, Vec<String>)>,
    start: Option<String>,
}

impl GrammarBuilder {
    pub fn new(name: &str) -> Self {
        GrammarBuilder {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminals.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn rule(mut self, lhs: &str, rhs: &[&str]) -> Self {
        self.rules.push((
            lhs.to_string(),
            rhs.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn start(mut self, name: &str) -> Self {
        self.start = Some(name.to_string());
        self
    }

    pub fn build(self) -> Result<Grammar, GrammarError> {
        let first_lhs = match self.rules.first() {
            Some((lhs, _)) => lhs.clone(),
            None => return Err(GrammarError::EmptyGrammar),
        };

        let mut terminals = SymbolTable::new();
        for name in &self.terminals {
            terminals.get_or_insert(name);
        }

        // Left-hand sides first, in order of appearance
        let mut non_terminals = SymbolTable::new();
        for (lhs, _) in &self.rules {
            if terminals.contains(lhs) {
                return Err(GrammarError::NameCollision(lhs.clone()));
            }
            non_terminals.get_or_insert(lhs);
        }

        let start_name = self.start.unwrap_or(first_lhs);
        if terminals.contains(&start_name) {
            return Err(GrammarError::NameCollision(start_name));
        }
        let start = non_terminals
            .get_id(&start_name)
            .ok_or(GrammarError::UndefinedStart(start_name))?;

        let mut productions = Vec::with_capacity(self.rules.len());
        for (lhs, rhs) in &self.rules {
            let lhs_id = non_terminals.get_or_insert(lhs);
            let rhs = rhs
                .iter()
                .map(|name| match terminals.get_id(name) {
                    Some(id) => Symbol::Terminal(id),
                    None => Symbol::NonTerminal(non_terminals.get_or_insert(name)),
                })
                .collect();
            productions.push(Production {
                id: ProdId(productions.len()),
                lhs: lhs_id,
                rhs,
            });
        }

        let mut rules = vec![Vec::new(); non_terminals.len()];
        for prod in &productions {
            rules[prod.lhs as usize].push(prod.id);
        }
        if let Some(nt) = rules.iter().position(|prods| prods.is_empty()) {
            let name = non_terminals.get_str(nt as u32).unwrap_or("?");
            return Err(GrammarError::MissingProductions(name.to_string()));
        }

        Ok(Grammar {
            name: self.name,
            start,
            terminals,
            non_terminals,
            productions,
            rules,
        })
    }
}

// ============================================================================
// Grammar Loading
// ============================================================================

/// JSON structure for grammar files
#[derive(Debug, Deserialize)]
struct GrammarJson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    start: Option<String>,
    /// When absent, `<Name>` marks a non-terminal and anything else is a terminal
    #[serde(default)]
    terminals: Option<Vec<String>>,
    rules: serde_json::Map<String, Value>,
}

/// Load a grammar from a JSON file
pub fn load_grammar_from_file<P: AsRef<Path>>(path: P) -> Result<Grammar, GrammarError> {
    let content = fs::read_to_string(&path)?;
    load_grammar_from_str(&content)
}

/// Load a specific grammar by name from a grammars directory
pub fn load_grammar(grammars_dir: &str, name: &str) -> Result<Grammar, GrammarError> {
    let path = Path::new(grammars_dir).join(format!("{}.json", name));
    load_grammar_from_file(&path)
}

/// Load a grammar from a JSON string
pub fn load_grammar_from_str(json: &str) -> Result<Grammar, GrammarError> {
    let parsed: GrammarJson = serde_json::from_str(json)?;
    let bracketed = parsed.terminals.is_none();

    let mut rules = Vec::new();
    for (lhs, value) in &parsed.rules {
        for prod in parse_rules(value)? {
            rules.push((lhs.clone(), prod));
        }
    }

    let mut builder = GrammarBuilder::new(&parsed.name);
    builder = match parsed.terminals {
        Some(terminals) => builder.terminals(terminals),
        None => {
            let mut seen = FxHashSet::default();
            let terminals: Vec<String> = rules
                .iter()
                .flat_map(|(_, rhs)| rhs.iter())
                .filter(|sym| !is_bracketed(sym))
                .filter(|sym| seen.insert(sym.to_string()))
                .cloned()
                .collect();
            builder.terminals(terminals)
        }
    };

    let strip = |name: &str| -> String {
        if bracketed && is_bracketed(name) {
            name[1..name.len() - 1].to_string()
        } else {
            name.to_string()
        }
    };

    for (lhs, rhs) in &rules {
        let rhs: Vec<String> = rhs.iter().map(|s| strip(s.as_str())).collect();
        let rhs: Vec<&str> = rhs.iter().map(String::as_str).collect();
        builder = builder.rule(&strip(lhs.as_str()), &rhs);
    }
    if let Some(start) = &parsed.start {
        builder = builder.start(&strip(start.as_str()));
    }

    builder.build()
}

fn is_bracketed(name: &str) -> bool {
    name.len() > 2 && name.starts_with('<') && name.ends_with('>')
}

/// Parse the alternatives of one rule: `[["a", "<B>"], ["c"], []]`
fn parse_rules(value: &Value) -> Result<Vec<Vec<String>>, GrammarError> {
    let productions = value
        .as_array()
        .ok_or_else(|| GrammarError::Format("rules must map to an array of productions".into()))?;

    productions
        .iter()
        .map(|prod| match prod {
            Value::Array(symbols) => parse_production(symbols),
            _ => Err(GrammarError::Format("production must be an array".into())),
        })
        .collect()
}

/// Parse a single production from JSON array
fn parse_production(symbols: &[Value]) -> Result<Vec<String>, GrammarError> {
    symbols
        .iter()
        .map(|s| {
            s.as_str()
                .map(str::to_string)
                .ok_or_else(|| GrammarError::Format(format!("symbol must be a string, got {}", s)))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "grammars_tests.rs"]
mod tests;
