use crate::ast::operators::CompareOp;
use rust_decimal::Decimal;

/// Literal comparison value.
///
/// Bare words are kept distinct from quoted strings: the lexer never coerces
/// an unquoted value to a string, so the compiler can tell `Status = Done`
/// from `Status = "Done"` if it ever needs to. Both coerce the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted string literal
    String(String),
    /// Numeric literal
    Number(Decimal),
    /// Bare (unquoted) word
    Word(String),
}

impl Literal {
    /// Raw text form of the literal, as fed to type coercion.
    pub fn as_text(&self) -> String {
        match self {
            Literal::String(s) => s.clone(),
            Literal::Number(n) => n.to_string(),
            Literal::Word(w) => w.clone(),
        }
    }
}

/// Filter expression tree.
///
/// Parenthesized sub-expressions bind tightest, then `not`, then `and`,
/// then `or`. Chained same-precedence operators associate left. The
/// compiler lowers this tree structurally, so no associativity is lost
/// between parse and execution.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Field/operator/value comparison
    ///
    /// # Example
    /// ```text
    /// Status = Done
    /// ```
    Comparison {
        field: String,
        op: CompareOp,
        value: Literal,
    },

    /// Field existence check
    ///
    /// # Example
    /// ```text
    /// Email exists
    /// ```
    Exists { field: String },

    /// Logical negation
    Not(Box<FilterExpr>),

    /// Logical conjunction
    And(Box<FilterExpr>, Box<FilterExpr>),

    /// Logical disjunction
    Or(Box<FilterExpr>, Box<FilterExpr>),
}
