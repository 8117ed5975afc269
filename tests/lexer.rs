//! End-to-end lexing: pattern definitions through the full NFA, DFA and
//! simulator pipeline.

use std::collections::BTreeSet;

use parsegen_core::dfa::{determinize, Alphabet};
use parsegen_core::lexer::Lexer;
use parsegen_core::minimize::minimize;
use parsegen_core::nfa;
use parsegen_core::token::{LexicalToken, TokenType};

fn keyword() -> TokenType {
    TokenType::new(1, "KEYWORD")
}

fn number() -> TokenType {
    TokenType::new(2, "NUMBER")
}

fn ident() -> TokenType {
    TokenType::new(3, "IDENT")
}

fn operator() -> TokenType {
    TokenType::new(4, "OP")
}

fn whitespace() -> TokenType {
    TokenType::new(6, "WHITESPACE")
}

fn digits() -> String {
    "(0|1|2|3|4|5|6|7|8|9)".to_string()
}

fn letters() -> String {
    // p, m and s are reserved for the operator token; identifiers leaving
    // them out keeps the two patterns from competing over one-letter input.
    let all: Vec<String> = ('a'..='z')
        .filter(|c| !matches!(c, 'p' | 'm' | 's'))
        .map(|c| c.to_string())
        .collect();
    format!("({})", all.join("|"))
}

fn full_alphabet() -> Alphabet {
    ('a'..='z').chain('0'..='9').chain([' ']).collect()
}

/// The demo token set: keywords beat identifiers, operators are spelled as
/// letters (p for plus and so on) since the pattern language treats symbol
/// characters as operators.
fn demo_lexer(minimized: bool) -> Lexer {
    let Ok(lexer) = Lexer::builder()
        .pattern("if|while|for", keyword())
        .pattern(&format!("{d}{d}*", d = digits()), number())
        .pattern(&format!("{l}{l}*", l = letters()), ident())
        .pattern("p|m|s", operator())
        .pattern(" ", whitespace())
        .ignore(whitespace())
        .minimize(minimized)
        .build(&full_alphabet())
    else {
        panic!()
    };
    lexer
}

#[test]
fn single_token_classification() {
    let lexer = demo_lexer(false);

    assert_eq!(
        lexer.tokenize("if"),
        vec![LexicalToken::new(keyword(), "if")]
    );
    assert_eq!(
        lexer.tokenize("hello"),
        vec![LexicalToken::new(ident(), "hello")]
    );
    assert_eq!(
        lexer.tokenize("123"),
        vec![LexicalToken::new(number(), "123")]
    );
}

#[test]
fn maximal_munch_wins_over_keyword_priority() {
    // "iff" extends past the keyword, so the longer identifier match wins.
    let lexer = demo_lexer(false);
    assert_eq!(
        lexer.tokenize("iff"),
        vec![LexicalToken::new(ident(), "iff")]
    );
}

#[test]
fn keywords_and_operators_in_a_stream() {
    let lexer = demo_lexer(false);
    let names: Vec<String> = lexer
        .tokenize("if x m 123")
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    assert_eq!(names, ["KEYWORD", "IDENT", "OP", "NUMBER"]);
}

#[test]
fn one_pattern_spans_the_whole_input() {
    let sigma: Alphabet = "abc".chars().collect();
    let Ok(lexer) = Lexer::builder()
        .pattern("a(b|c)*", ident())
        .build(&sigma)
    else {
        panic!()
    };

    assert_eq!(
        lexer.tokenize("abcbc"),
        vec![LexicalToken::new(ident(), "abcbc")]
    );
    assert_eq!(lexer.tokenize("b"), vec![LexicalToken::error("b")]);
}

#[test]
fn validator_reports_the_highest_priority_pattern() {
    let lexer = demo_lexer(false);
    assert_eq!(lexer.validate("while"), Some(keyword()));
    assert_eq!(lexer.validate("whilex"), Some(ident()));
    assert_eq!(lexer.validate("12x"), None);
}

#[test]
fn minimization_does_not_change_tokenization() {
    let plain = demo_lexer(false);
    let minimized = demo_lexer(true);

    for input in [
        "if", "iff", "123", "hello", "if x m 123", "for while", "9 9 9", "   ",
    ] {
        assert_eq!(
            plain.tokenize(input),
            minimized.tokenize(input),
            "input: {input}"
        );
    }
    assert!(minimized.dfa.len() <= plain.dfa.len());
}

#[test]
fn minimizer_reaches_the_four_state_dfa() {
    let Ok(tagged) = nfa::compile_pattern("(a|b)*abb", TokenType::new(1, "T")) else {
        panic!()
    };
    let sigma: BTreeSet<char> = "ab".chars().collect();
    let dfa = determinize(&tagged, &sigma);
    let min = minimize(&dfa, &sigma);

    assert_eq!(min.len(), 4);
    for input in ["abb", "aabb", "ababb", "", "ab", "abab"] {
        assert_eq!(min.accepts(input), dfa.accepts(input), "input: {input}");
    }
}

#[test]
fn errors_do_not_derail_the_stream() {
    let lexer = demo_lexer(false);
    let tokens = lexer.tokenize("if !! 42");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0], LexicalToken::new(keyword(), "if"));
    assert_eq!(tokens[1], LexicalToken::error("!!"));
    assert_eq!(tokens[2], LexicalToken::new(number(), "42"));
}
