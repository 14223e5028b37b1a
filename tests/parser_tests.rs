// tests/parser_tests.rs

use rust_decimal::Decimal;
use std::str::FromStr;
use tagql::ast::{CompareOp, FilterExpr, Literal, OrderKey, Target};
use tagql::parser::{parse_filter, parse_query, ParseError};

fn comparison(field: &str, op: CompareOp, value: Literal) -> FilterExpr {
    FilterExpr::Comparison {
        field: field.to_string(),
        op,
        value,
    }
}

fn word(w: &str) -> Literal {
    Literal::Word(w.to_string())
}

// ============================================================================
// Basic queries
// ============================================================================

#[test]
fn test_minimal_query() {
    let query = parse_query("find task").unwrap();
    assert_eq!(query.target, Target::Tag("task".to_string()));
    assert_eq!(query.filter, None);
    assert!(query.order_by.is_empty());
    assert_eq!(query.limit, None);
    assert_eq!(query.offset, None);
    assert_eq!(query.select, None);
}

#[test]
fn test_wildcard_target() {
    let query = parse_query("find *").unwrap();
    assert_eq!(query.target, Target::All);
}

#[test]
fn test_simple_comparison() {
    let query = parse_query("find task where Status = Done").unwrap();
    assert_eq!(
        query.filter,
        Some(comparison("Status", CompareOp::Eq, word("Done")))
    );
}

#[test]
fn test_value_kinds() {
    let query = parse_query(r#"find task where Note = "has spaces""#).unwrap();
    assert_eq!(
        query.filter,
        Some(comparison(
            "Note",
            CompareOp::Eq,
            Literal::String("has spaces".to_string())
        ))
    );

    let query = parse_query("find task where ItemCount > 3").unwrap();
    assert_eq!(
        query.filter,
        Some(comparison(
            "ItemCount",
            CompareOp::Gt,
            Literal::Number(Decimal::from_str("3").unwrap())
        ))
    );
}

#[test]
fn test_exists() {
    let query = parse_query("find contact where Email exists").unwrap();
    assert_eq!(
        query.filter,
        Some(FilterExpr::Exists {
            field: "Email".to_string()
        })
    );
}

// ============================================================================
// Precedence and grouping
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let query = parse_query("find t where A = 1 or B = 2 and C = 3").unwrap();
    // or(A, and(B, C))
    match query.filter.unwrap() {
        FilterExpr::Or(left, right) => {
            assert!(matches!(*left, FilterExpr::Comparison { ref field, .. } if field == "A"));
            assert!(matches!(*right, FilterExpr::And(..)));
        }
        other => panic!("expected Or at root, got {:?}", other),
    }
}

#[test]
fn test_not_binds_tighter_than_and() {
    let query = parse_query("find t where not A exists and B exists").unwrap();
    match query.filter.unwrap() {
        FilterExpr::And(left, _) => assert!(matches!(*left, FilterExpr::Not(_))),
        other => panic!("expected And at root, got {:?}", other),
    }
}

#[test]
fn test_parenthesized_or_under_and() {
    let query = parse_query("find task where (Status = Done or Status = Active)").unwrap();
    match query.filter.unwrap() {
        FilterExpr::Or(left, right) => {
            assert_eq!(*left, comparison("Status", CompareOp::Eq, word("Done")));
            assert_eq!(*right, comparison("Status", CompareOp::Eq, word("Active")));
        }
        other => panic!("expected Or at root, got {:?}", other),
    }
}

#[test]
fn test_left_associative_chains() {
    let query = parse_query("find t where A = 1 and B = 2 and C = 3").unwrap();
    // and(and(A, B), C)
    match query.filter.unwrap() {
        FilterExpr::And(left, right) => {
            assert!(matches!(*left, FilterExpr::And(..)));
            assert!(matches!(*right, FilterExpr::Comparison { ref field, .. } if field == "C"));
        }
        other => panic!("expected And at root, got {:?}", other),
    }
}

#[test]
fn test_double_negation() {
    let query = parse_query("find t where not not A exists").unwrap();
    match query.filter.unwrap() {
        FilterExpr::Not(inner) => assert!(matches!(*inner, FilterExpr::Not(_))),
        other => panic!("expected Not at root, got {:?}", other),
    }
}

// ============================================================================
// Ordering, pagination, projection
// ============================================================================

#[test]
fn test_order_by_directions() {
    let query = parse_query("find task order by -DueDate, Name").unwrap();
    assert_eq!(
        query.order_by,
        vec![
            OrderKey {
                field: "DueDate".to_string(),
                descending: true
            },
            OrderKey {
                field: "Name".to_string(),
                descending: false
            },
        ]
    );
}

#[test]
fn test_limit_offset() {
    let query = parse_query("find task limit 10 offset 20").unwrap();
    assert_eq!(query.limit, Some(10));
    assert_eq!(query.offset, Some(20));
}

#[test]
fn test_select_clause() {
    let query = parse_query("find task select Name, Status").unwrap();
    assert_eq!(
        query.select,
        Some(vec!["Name".to_string(), "Status".to_string()])
    );
}

#[test]
fn test_all_clauses_together() {
    let query = parse_query(
        "find task where Status = Done order by -DueDate limit 5 offset 10 select Name, Status",
    )
    .unwrap();
    assert!(query.filter.is_some());
    assert_eq!(query.order_by.len(), 1);
    assert_eq!(query.limit, Some(5));
    assert_eq!(query.offset, Some(10));
    assert_eq!(query.select.as_ref().map(Vec::len), Some(2));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_find() {
    assert!(matches!(
        parse_query("task where Status = Done"),
        Err(ParseError::Unexpected { .. })
    ));
}

#[test]
fn test_missing_target() {
    assert!(parse_query("find").is_err());
    assert!(parse_query("find where Status = Done").is_err());
}

#[test]
fn test_trailing_tokens() {
    assert!(parse_query("find task Status").is_err());
}

#[test]
fn test_unmatched_paren() {
    assert!(parse_query("find task where (Status = Done").is_err());
}

#[test]
fn test_missing_operand() {
    assert!(parse_query("find task where Status =").is_err());
    assert!(parse_query("find task where and Status = Done").is_err());
}

#[test]
fn test_negative_limit_rejected() {
    assert!(parse_query("find task limit -1").is_err());
    assert!(parse_query("find task limit 1.5").is_err());
}

#[test]
fn test_error_names_position() {
    let err = parse_query("find task where Status = Done garbage").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("expected"), "message: {}", message);
    assert!(message.contains("position"), "message: {}", message);
}

// ============================================================================
// Whitespace invariance
// ============================================================================

#[test]
fn test_whitespace_variants_yield_identical_ast() {
    let compact = parse_query("find task where Status=Done order by -DueDate,Name limit 10").unwrap();
    let spaced =
        parse_query("find   task  where  Status  =  Done  order  by  -DueDate ,  Name  limit  10")
            .unwrap();
    assert_eq!(compact, spaced);
}

// ============================================================================
// Standalone filters
// ============================================================================

#[test]
fn test_parse_filter_standalone() {
    let filter = parse_filter("Status = Done and Priority exists").unwrap();
    assert!(matches!(filter, FilterExpr::And(..)));
}

#[test]
fn test_parse_filter_rejects_trailing() {
    assert!(parse_filter("Status = Done limit").is_err());
}
