use crate::ast::filter::FilterExpr;

/// Query target: a single tag by name, or every tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The tag named after `find`
    Tag(String),
    /// The wildcard `*`: match entities across all tags
    All,
}

/// One `order by` key.
///
/// A leading `-` on the field identifier marks descending order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderKey {
    pub field: String,
    pub descending: bool,
}

/// Complete parsed query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Target tag (required)
    pub target: Target,

    /// Optional filter expression from the `where` clause
    pub filter: Option<FilterExpr>,

    /// Order keys in priority order; empty means store order
    pub order_by: Vec<OrderKey>,

    /// Row cap; `None` means unbounded
    pub limit: Option<u64>,

    /// Rows to skip before the first result
    pub offset: Option<u64>,

    /// Field projection from the `select` clause, applied after execution
    pub select: Option<Vec<String>>,
}
