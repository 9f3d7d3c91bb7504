//! Tests for the grammars module - builder validation and grammar loading

use super::*;
use pretty_assertions::assert_eq;

fn abc_builder() -> GrammarBuilder {
    GrammarBuilder::new("abc")
        .terminals(["a", "b", "c"])
        .rule("S", &["A"])
        .rule("A", &["a", "A", "c"])
        .rule("A", &["b"])
}

#[test]
fn test_build_grammar() {
    let grammar = abc_builder().build().expect("valid grammar");

    assert_eq!(grammar.name(), "abc");
    assert_eq!(grammar.start_name(), "S");
    assert_eq!(grammar.productions().len(), 3);
    assert_eq!(grammar.terminals().len(), 3);
    assert_eq!(grammar.non_terminals().len(), 2);

    // Declaration order is the production identity
    let a = grammar.non_terminal_id("A").unwrap();
    assert_eq!(grammar.productions_of(a), &[ProdId(1), ProdId(2)]);
    assert_eq!(grammar.production_to_string(ProdId(1)), "A -> a A c");
    assert_eq!(
        grammar.production(ProdId(1)).rhs,
        vec![
            Symbol::Terminal(0),
            Symbol::NonTerminal(a),
            Symbol::Terminal(2)
        ]
    );
}

#[test]
fn test_grammar_display() {
    let grammar = abc_builder().rule("A", &[]).build().unwrap();
    let expected = "grammar abc (start: S)\n  S -> A\n  A -> a A c\n  A -> b\n  A -> ε\n";
    assert_eq!(grammar.to_string(), expected);
}

#[test]
fn test_explicit_start() {
    let grammar = abc_builder().start("A").build().unwrap();
    assert_eq!(grammar.start_name(), "A");
}

#[test]
fn test_undefined_start() {
    let err = abc_builder().start("Z").build().unwrap_err();
    assert!(matches!(err, GrammarError::UndefinedStart(ref name) if name == "Z"));
}

#[test]
fn test_missing_productions() {
    let err = GrammarBuilder::new("typo")
        .terminals(["x"])
        .rule("S", &["x", "Tail"])
        .build()
        .unwrap_err();
    assert!(matches!(err, GrammarError::MissingProductions(ref name) if name == "Tail"));
    assert_eq!(
        err.to_string(),
        "non-terminal 'Tail' is referenced but has no productions"
    );
}

#[test]
fn test_name_collision() {
    let err = abc_builder().rule("b", &["a"]).build().unwrap_err();
    assert!(matches!(err, GrammarError::NameCollision(ref name) if name == "b"));

    let err = abc_builder().start("a").build().unwrap_err();
    assert!(matches!(err, GrammarError::NameCollision(_)));
}

#[test]
fn test_empty_grammar() {
    let err = GrammarBuilder::new("empty").terminals(["a"]).build().unwrap_err();
    assert!(matches!(err, GrammarError::EmptyGrammar));
}

#[test]
fn test_find_production() {
    let grammar = abc_builder().rule("A", &[]).build().unwrap();
    assert_eq!(grammar.find_production("A", &["b"]).unwrap(), ProdId(2));
    assert_eq!(grammar.find_production("A", &[]).unwrap(), ProdId(3));
    assert_eq!(grammar.find_production("S", &["A"]).unwrap(), ProdId(0));

    let err = grammar.find_production("A", &["c"]).unwrap_err();
    assert_eq!(err.to_string(), "no production A -> c");
    assert!(grammar.find_production("Nope", &[]).is_err());
}

#[test]
fn test_symbol_lookup() {
    let grammar = abc_builder().build().unwrap();
    assert_eq!(grammar.symbol("a"), Some(Symbol::Terminal(0)));
    assert_eq!(grammar.symbol("A"), Some(Symbol::NonTerminal(1)));
    assert_eq!(grammar.symbol("x"), None);
    assert_eq!(grammar.symbol_name(Symbol::NonTerminal(0)), "S");
    assert!(grammar.symbol("c").is_some_and(|s| s.is_terminal()));
}

#[test]
fn test_load_bracketed_grammar() {
    let json = r#"{
        "name": "nested",
        "start": "<S>",
        "rules": {
            "<S>": [["b"], ["a", "<X>", "z"]],
            "<X>": [["x", "<X>"], ["y", "<X>"], []]
        }
    }"#;

    let grammar = load_grammar_from_str(json).expect("Failed to load grammar");
    assert_eq!(grammar.start_name(), "S");
    let terminals: Vec<&str> = grammar.terminals().names().collect();
    assert_eq!(terminals, vec!["b", "a", "z", "x", "y"]);
    assert_eq!(grammar.productions().len(), 5);
    assert_eq!(grammar.production_to_string(ProdId(1)), "S -> a X z");
    assert_eq!(grammar.production_to_string(ProdId(4)), "X -> ε");
}

#[test]
fn test_load_grammar_with_terminals() {
    let json = r#"{
        "name": "list",
        "terminals": ["[", "]", "item"],
        "rules": {
            "L": [["[", "]"], ["[", "Items", "]"]],
            "Items": [["Items", "item"], ["item"]]
        }
    }"#;

    let grammar = load_grammar_from_str(json).unwrap();
    // start defaults to the first rule
    assert_eq!(grammar.start_name(), "L");
    assert_eq!(grammar.find_production("Items", &["Items", "item"]).unwrap(), ProdId(2));
}

#[test]
fn test_load_invalid_json() {
    let err = load_grammar_from_str("{ not json").unwrap_err();
    assert!(matches!(err, GrammarError::Json(_)));

    let err = load_grammar_from_str(r#"{"name": "x", "rules": {"<S>": "a"}}"#).unwrap_err();
    assert!(matches!(err, GrammarError::Format(_)));

    let err = load_grammar_from_str(r#"{"name": "x", "rules": {"<S>": [[1]]}}"#).unwrap_err();
    assert!(matches!(err, GrammarError::Format(_)));
}

#[test]
fn test_load_fixture_files() {
    let abc = load_grammar("grammars", "abc").expect("abc fixture");
    assert_eq!(abc.productions().len(), 3);
    assert_eq!(abc.start_name(), "S");

    let array = load_grammar("grammars", "array").expect("array fixture");
    assert_eq!(array.start_name(), "value");
    assert_eq!(
        array.production_to_string(ProdId(4)),
        "array-items -> array-items value-separator value"
    );

    let missing = load_grammar("grammars", "does-not-exist");
    assert!(matches!(missing, Err(GrammarError::Io(_))));
}
