/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Exact equality (`=`)
    Eq,
    /// Inequality (`!=`)
    NotEq,
    /// Ordered greater-than (`>`)
    Gt,
    /// Ordered greater-or-equal (`>=`)
    GtEq,
    /// Ordered less-than (`<`)
    Lt,
    /// Ordered less-or-equal (`<=`)
    LtEq,
    /// Contains / fuzzy match (`~`)
    Contains,
}

impl CompareOp {
    /// Source-level spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Contains => "~",
        }
    }

    /// Whether the operator requires an orderable operand type
    /// (number or date).
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::GtEq | CompareOp::Lt | CompareOp::LtEq
        )
    }
}
