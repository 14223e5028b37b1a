// tests/lexer_tests.rs

use rust_decimal::Decimal;
use std::str::FromStr;
use tagql::ast::{CompareOp, Keyword, Token};
use tagql::lexer::{tokenize, LexError, Lexer};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords_canonical_lowercase() {
    let test_cases = vec![
        ("find", Keyword::Find),
        ("FIND", Keyword::Find),
        ("Find", Keyword::Find),
        ("wHeRe", Keyword::Where),
        ("ORDER", Keyword::Order),
        ("by", Keyword::By),
        ("LIMIT", Keyword::Limit),
        ("Offset", Keyword::Offset),
        ("AND", Keyword::And),
        ("Or", Keyword::Or),
        ("NOT", Keyword::Not),
        ("Exists", Keyword::Exists),
        ("SELECT", Keyword::Select),
    ];

    for (input, expected) in test_cases {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens, vec![Token::Keyword(expected)], "input: {}", input);
    }
}

#[test]
fn test_keyword_wins_over_identifier() {
    let tokens = tokenize("where").unwrap();
    assert_eq!(tokens, vec![Token::Keyword(Keyword::Where)]);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_all_operators() {
    let test_cases = vec![
        ("=", CompareOp::Eq),
        ("!=", CompareOp::NotEq),
        (">", CompareOp::Gt),
        (">=", CompareOp::GtEq),
        ("<", CompareOp::Lt),
        ("<=", CompareOp::LtEq),
        ("~", CompareOp::Contains),
    ];

    for (input, expected) in test_cases {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens, vec![Token::Operator(expected)], "input: {}", input);
    }
}

#[test]
fn test_operators_longest_first() {
    let tokens = tokenize("Count >= 3").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Identifier("Count".to_string()),
            Token::Operator(CompareOp::GtEq),
            Token::Number(dec("3")),
        ]
    );
}

#[test]
fn test_bare_exclamation_is_error() {
    assert!(matches!(
        tokenize("Status ! Done"),
        Err(LexError::UnexpectedChar { ch: '!', .. })
    ));
}

// ============================================================================
// Whole-query token sequences
// ============================================================================

#[test]
fn test_simple_query_token_sequence() {
    let tokens = tokenize("find task where Status = Done").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::Find),
            Token::Identifier("task".to_string()),
            Token::Keyword(Keyword::Where),
            Token::Identifier("Status".to_string()),
            Token::Operator(CompareOp::Eq),
            Token::Identifier("Done".to_string()),
        ]
    );
    assert_eq!(tokens.len(), 6);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_quoted_strings() {
    let tokens = tokenize(r#"Status = "In Progress""#).unwrap();
    assert_eq!(tokens[2], Token::String("In Progress".to_string()));

    let tokens = tokenize("Status = 'single quoted'").unwrap();
    assert_eq!(tokens[2], Token::String("single quoted".to_string()));
}

#[test]
fn test_escaped_quotes() {
    let tokens = tokenize(r#"Note = "say \"hi\"""#).unwrap();
    assert_eq!(tokens[2], Token::String("say \"hi\"".to_string()));

    let tokens = tokenize(r"Note = 'it\'s done'").unwrap();
    assert_eq!(tokens[2], Token::String("it's done".to_string()));
}

#[test]
fn test_unterminated_string_is_error() {
    assert!(matches!(
        tokenize("\"unclosed"),
        Err(LexError::UnterminatedString { position: 0 })
    ));
    assert!(matches!(
        tokenize("Status = 'unclosed"),
        Err(LexError::UnterminatedString { .. })
    ));
}

// ============================================================================
// Numbers and sign-prefixed identifiers
// ============================================================================

#[test]
fn test_numbers() {
    let test_cases = vec![("42", "42"), ("9.99", "9.99"), ("-3", "-3"), ("-0.5", "-0.5")];
    for (input, expected) in test_cases {
        let tokens = tokenize(input).unwrap();
        assert_eq!(tokens, vec![Token::Number(dec(expected))], "input: {}", input);
    }
}

#[test]
fn test_descending_sort_field() {
    let tokens = tokenize("order by -Priority").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::Order),
            Token::Keyword(Keyword::By),
            Token::Identifier("-Priority".to_string()),
        ]
    );
}

// ============================================================================
// Bare words after operators
// ============================================================================

#[test]
fn test_bare_word_value_is_identifier() {
    // Unquoted comparison values stay identifiers, never strings, and may
    // contain characters a plain identifier could not.
    let tokens = tokenize("Status = in-progress").unwrap();
    assert_eq!(tokens[2], Token::Identifier("in-progress".to_string()));

    let tokens = tokenize("Email ~ alice@example.com").unwrap();
    assert_eq!(tokens[2], Token::Identifier("alice@example.com".to_string()));
}

#[test]
fn test_bare_word_value_not_keyword_matched() {
    // A value spelled like a keyword is still a value.
    let tokens = tokenize("Status = select").unwrap();
    assert_eq!(tokens[2], Token::Identifier("select".to_string()));
}

#[test]
fn test_bare_word_stops_at_paren() {
    let tokens = tokenize("(Status = Done)").unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::LParen,
            Token::Identifier("Status".to_string()),
            Token::Operator(CompareOp::Eq),
            Token::Identifier("Done".to_string()),
            Token::RParen,
        ]
    );
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_wildcard() {
    let tokens = tokenize("find *").unwrap();
    assert_eq!(tokens[1], Token::Identifier("*".to_string()));
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize("").unwrap(), vec![]);
    assert_eq!(tokenize("   \t  ").unwrap(), vec![]);
}

#[test]
fn test_dotted_identifier() {
    let tokens = tokenize("parent.Status").unwrap();
    assert_eq!(tokens, vec![Token::Identifier("parent.Status".to_string())]);
}

#[test]
fn test_streaming_interface_ends_with_eof() {
    let mut lexer = Lexer::new("limit 5");
    assert_eq!(lexer.next_token(), Ok(Token::Keyword(Keyword::Limit)));
    assert_eq!(lexer.next_token(), Ok(Token::Number(dec("5"))));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}
