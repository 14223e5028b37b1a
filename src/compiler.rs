//! Lowers a parsed [`Query`] into an executable SQL query over the three
//! data relations (`entities`, `tag_memberships`, `field_values`).
//!
//! Comparisons are typed: the resolved field's inferred type decides how the
//! literal is coerced and which value column the comparison targets.
//! `value_order` holds the sortable form the ingestion pipeline computed
//! (numbers as-is, dates as epoch milliseconds, checkboxes as 0/1);
//! `value_text` holds the raw stored text. Boolean structure of the filter
//! tree is preserved with parentheses, so nothing about associativity is
//! decided here.

use crate::ast::{CompareOp, FilterExpr, Literal, OrderKey, Query, Target};
use crate::schema::{
    infer_field_type, normalize_name, FieldType, ResolveMode, ResolvedTag, Resolver, SchemaError,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A positional SQL parameter.
///
/// Kept free of any driver type so the compiler stays pure; the store layer
/// implements the binding.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Int(i64),
    Real(f64),
}

/// An executable relational query: SQL text, bound parameters in positional
/// order, and the projection the caller applies after execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
    pub projection: Option<Vec<String>>,
}

/// Compilation failure: a schema miss or a literal the field's type
/// refuses.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Schema(SchemaError),
    NonNumericLiteral { field: String, value: String },
    BadDateLiteral { field: String, value: String },
    NonBooleanLiteral { field: String, value: String },
    UnorderedComparison { field: String, field_type: FieldType },
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Schema(e) => write!(f, "schema error: {}", e),
            CompileError::NonNumericLiteral { field, value } => {
                write!(f, "field '{}' is numeric, '{}' is not a number", field, value)
            }
            CompileError::BadDateLiteral { field, value } => {
                write!(
                    f,
                    "field '{}' is a date, '{}' is not ISO-8601 or YYYY-MM-DD",
                    field, value
                )
            }
            CompileError::NonBooleanLiteral { field, value } => {
                write!(
                    f,
                    "field '{}' is a checkbox, '{}' is not boolean-like",
                    field, value
                )
            }
            CompileError::UnorderedComparison { field, field_type } => {
                write!(
                    f,
                    "ordered comparison on field '{}' of type {} (only number and date order)",
                    field, field_type
                )
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for CompileError {
    fn from(e: SchemaError) -> Self {
        CompileError::Schema(e)
    }
}

/// Where filter field identifiers resolve.
///
/// A tag target gives strict resolution against that tag's effective field
/// list. The wildcard target resolves best-effort: types are inferred from
/// the identifier itself and the name match spans every tag's declared
/// fields, with an unknown name compiling to "matches nothing" rather than
/// an error.
pub enum FieldScope<'a> {
    Tag(&'a ResolvedTag),
    All,
}

/// Parse an ISO-8601 / `YYYY-MM-DD` date literal to epoch milliseconds.
/// Bare dates land at UTC midnight.
fn parse_date_literal(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Coerce a comparison literal to its SQL parameter form for the field's
/// type. Pure; the whole coercion table is enumerable in tests.
fn coerce(field: &str, field_type: FieldType, value: &Literal) -> Result<SqlParam, CompileError> {
    let text = value.as_text();
    match field_type {
        FieldType::Number => {
            let number = match value {
                Literal::Number(n) => *n,
                _ => Decimal::from_str(&text).map_err(|_| CompileError::NonNumericLiteral {
                    field: field.to_string(),
                    value: text.clone(),
                })?,
            };
            number
                .to_f64()
                .map(SqlParam::Real)
                .ok_or(CompileError::NonNumericLiteral {
                    field: field.to_string(),
                    value: text,
                })
        }
        FieldType::Date => parse_date_literal(&text)
            .map(SqlParam::Int)
            .ok_or(CompileError::BadDateLiteral {
                field: field.to_string(),
                value: text,
            }),
        FieldType::Checkbox => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(SqlParam::Int(1)),
            "false" | "no" | "0" => Ok(SqlParam::Int(0)),
            _ => Err(CompileError::NonBooleanLiteral {
                field: field.to_string(),
                value: text,
            }),
        },
        FieldType::Text | FieldType::Url | FieldType::Reference => Ok(SqlParam::Text(text)),
    }
}

/// Escape `%`, `_`, and `\` in a contains-literal for `LIKE ... ESCAPE '\'`.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Compiles resolved queries to SQL.
pub struct Compiler<'a> {
    resolver: &'a Resolver,
}

impl<'a> Compiler<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Compiler { resolver }
    }

    /// Lower a parsed query to an executable one.
    pub fn compile(&self, query: &Query) -> Result<CompiledQuery, CompileError> {
        let mut params = vec![];
        let mut sql = String::from("SELECT DISTINCT e.entity_id, e.name FROM entities e");

        let resolved_tag;
        let scope = match &query.target {
            Target::Tag(name) => {
                resolved_tag = self.resolver.resolve_tag(name)?;
                sql.push_str(" JOIN tag_memberships tm ON tm.entity_id = e.entity_id");
                sql.push_str(" WHERE tm.tag_id = ?");
                params.push(SqlParam::Text(resolved_tag.tag_id.clone()));
                FieldScope::Tag(&resolved_tag)
            }
            Target::All => {
                sql.push_str(" WHERE 1");
                FieldScope::All
            }
        };

        if let Some(filter) = &query.filter {
            let fragment = self.filter_sql(filter, &scope, &mut params)?;
            sql.push_str(" AND ");
            sql.push_str(&fragment);
        }

        if !query.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, key) in query.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.order_sql(key, &scope, &mut params)?);
            }
        }

        // SQLite needs a LIMIT clause to accept OFFSET; -1 means unbounded.
        match (query.limit, query.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        Ok(CompiledQuery {
            sql,
            params,
            projection: query.select.clone(),
        })
    }

    /// Lower a filter expression to a SQL fragment, appending its bound
    /// parameters in positional order. Exposed for the aggregation engine,
    /// which reuses the lowering under its COUNT queries.
    pub fn filter_sql(
        &self,
        expr: &FilterExpr,
        scope: &FieldScope<'_>,
        params: &mut Vec<SqlParam>,
    ) -> Result<String, CompileError> {
        match expr {
            FilterExpr::Comparison { field, op, value } => {
                self.comparison_sql(field, *op, value, scope, params)
            }
            FilterExpr::Exists { field } => {
                let names = self.field_names(field, scope)?;
                if names.is_empty() {
                    return Ok("0".to_string());
                }
                Ok(format!(
                    "EXISTS (SELECT 1 FROM field_values fv WHERE fv.entity_id = e.entity_id AND {})",
                    name_match(&names, params)
                ))
            }
            FilterExpr::Not(inner) => {
                let inner = self.filter_sql(inner, scope, params)?;
                Ok(format!("(NOT {})", inner))
            }
            FilterExpr::And(left, right) => {
                let left = self.filter_sql(left, scope, params)?;
                let right = self.filter_sql(right, scope, params)?;
                Ok(format!("({} AND {})", left, right))
            }
            FilterExpr::Or(left, right) => {
                let left = self.filter_sql(left, scope, params)?;
                let right = self.filter_sql(right, scope, params)?;
                Ok(format!("({} OR {})", left, right))
            }
        }
    }

    fn comparison_sql(
        &self,
        field: &str,
        op: CompareOp,
        value: &Literal,
        scope: &FieldScope<'_>,
        params: &mut Vec<SqlParam>,
    ) -> Result<String, CompileError> {
        let (names, field_type) = self.field_info(field, scope)?;

        if op.is_ordered() && !field_type.is_orderable() {
            return Err(CompileError::UnorderedComparison {
                field: field.to_string(),
                field_type,
            });
        }

        if names.is_empty() {
            // Wildcard scope, name unknown to every tag: matches nothing.
            return Ok("0".to_string());
        }

        // Name parameters bind before the comparison parameter, matching
        // their textual order in the fragment below.
        let names_fragment = name_match(&names, params);

        let condition = match op {
            CompareOp::Contains => {
                params.push(SqlParam::Text(format!("%{}%", escape_like(&value.as_text()))));
                "fv.value_text LIKE ? ESCAPE '\\'".to_string()
            }
            CompareOp::Eq | CompareOp::NotEq => {
                let cmp = if op == CompareOp::Eq { "=" } else { "<>" };
                let param = coerce(field, field_type, value)?;
                let column = match param {
                    SqlParam::Text(_) => "fv.value_text",
                    _ => "fv.value_order",
                };
                params.push(param);
                format!("{} {} ?", column, cmp)
            }
            // Ordered comparison on the sortable column
            _ => {
                params.push(coerce(field, field_type, value)?);
                format!("fv.value_order {} ?", op.symbol())
            }
        };

        Ok(format!(
            "EXISTS (SELECT 1 FROM field_values fv WHERE fv.entity_id = e.entity_id AND {} AND {})",
            names_fragment, condition
        ))
    }

    fn order_sql(
        &self,
        key: &OrderKey,
        scope: &FieldScope<'_>,
        params: &mut Vec<SqlParam>,
    ) -> Result<String, CompileError> {
        let (names, field_type) = self.field_info(&key.field, scope)?;
        if names.is_empty() {
            return Ok("NULL".to_string());
        }

        let column = match field_type {
            FieldType::Number | FieldType::Date | FieldType::Checkbox => "fv.value_order",
            _ => "fv.value_text",
        };
        let direction = if key.descending { " DESC" } else { "" };
        Ok(format!(
            "(SELECT {} FROM field_values fv WHERE fv.entity_id = e.entity_id AND {} LIMIT 1){}",
            column,
            name_match(&names, params),
            direction
        ))
    }

    /// Stored field names plus effective type for an identifier, per scope.
    fn field_info(
        &self,
        identifier: &str,
        scope: &FieldScope<'_>,
    ) -> Result<(Vec<String>, FieldType), CompileError> {
        match scope {
            FieldScope::Tag(tag) => {
                let field = self
                    .resolver
                    .resolve_field(tag, identifier, ResolveMode::Strict)?
                    .ok_or_else(|| SchemaError::FieldNotFound {
                        tag: tag.name.clone(),
                        field: identifier.to_string(),
                    })?;
                Ok((vec![field.name.clone()], field.field_type))
            }
            FieldScope::All => {
                let normalized = normalize_name(identifier);
                let names = self.resolver.field_names_matching(&normalized);
                Ok((names, infer_field_type(&normalized)))
            }
        }
    }

    fn field_names(
        &self,
        identifier: &str,
        scope: &FieldScope<'_>,
    ) -> Result<Vec<String>, CompileError> {
        self.field_info(identifier, scope).map(|(names, _)| names)
    }
}

/// `fv.field_name` match fragment for one or more stored names.
fn name_match(names: &[String], params: &mut Vec<SqlParam>) -> String {
    for name in names {
        params.push(SqlParam::Text(name.clone()));
    }
    if names.len() == 1 {
        "fv.field_name = ?".to_string()
    } else {
        format!("fv.field_name IN ({})", vec!["?"; names.len()].join(", "))
    }
}
