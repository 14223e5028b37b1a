//! Grouped counts over tagged entities.
//!
//! Reuses the schema resolver for tag and group-by field lookup and the
//! compiler's filter lowering for the optional condition, then issues COUNT
//! queries. Groups are keyed by the raw stored value text: `"Done"` and
//! `"done"` are distinct groups.

use crate::ast::FilterExpr;
use crate::compiler::{CompileError, Compiler, FieldScope, SqlParam};
use crate::schema::{ResolveMode, Resolver, SchemaError};
use crate::store::{SqliteStore, StoreError};
use std::collections::BTreeMap;

/// Aggregation result: total matching entities and, when grouping,
/// per-group counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub total: u64,
    pub groups: BTreeMap<String, u64>,
}

#[derive(Debug)]
pub enum AggregateError {
    Schema(SchemaError),
    Compile(CompileError),
    Store(StoreError),
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::Schema(e) => write!(f, "schema error: {}", e),
            AggregateError::Compile(e) => write!(f, "compile error: {}", e),
            AggregateError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AggregateError::Schema(e) => Some(e),
            AggregateError::Compile(e) => Some(e),
            AggregateError::Store(e) => Some(e),
        }
    }
}

impl From<SchemaError> for AggregateError {
    fn from(e: SchemaError) -> Self {
        AggregateError::Schema(e)
    }
}

impl From<CompileError> for AggregateError {
    fn from(e: CompileError) -> Self {
        AggregateError::Compile(e)
    }
}

impl From<StoreError> for AggregateError {
    fn from(e: StoreError) -> Self {
        AggregateError::Store(e)
    }
}

/// Count entities carrying `tag_name`, optionally grouped by a field of
/// that tag and narrowed by a filter.
pub fn aggregate(
    store: &SqliteStore,
    resolver: &Resolver,
    tag_name: &str,
    group_by: Option<&str>,
    filter: Option<&FilterExpr>,
) -> Result<Aggregation, AggregateError> {
    let tag = resolver.resolve_tag(tag_name)?;
    let compiler = Compiler::new(resolver);
    let scope = FieldScope::Tag(&tag);

    let mut filter_params = vec![];
    let filter_fragment = match filter {
        Some(expr) => {
            let fragment = compiler.filter_sql(expr, &scope, &mut filter_params)?;
            format!(" AND {}", fragment)
        }
        None => String::new(),
    };

    let total_sql = format!(
        "SELECT COUNT(DISTINCT e.entity_id) FROM entities e \
         JOIN tag_memberships tm ON tm.entity_id = e.entity_id \
         WHERE tm.tag_id = ?{}",
        filter_fragment
    );
    let mut total_params = vec![SqlParam::Text(tag.tag_id.clone())];
    total_params.extend(filter_params.iter().cloned());
    let total = store.query_count(&total_sql, &total_params)?;

    let groups = match group_by {
        Some(field_name) => {
            let field = resolver
                .resolve_field(&tag, field_name, ResolveMode::Strict)?
                .ok_or_else(|| SchemaError::FieldNotFound {
                    tag: tag.name.clone(),
                    field: field_name.to_string(),
                })?;

            let group_sql = format!(
                "SELECT fv.value_text, COUNT(DISTINCT e.entity_id) FROM entities e \
                 JOIN tag_memberships tm ON tm.entity_id = e.entity_id \
                 JOIN field_values fv ON fv.entity_id = e.entity_id AND fv.field_name = ? \
                 WHERE tm.tag_id = ?{} \
                 GROUP BY fv.value_text",
                filter_fragment
            );
            let mut group_params = vec![
                SqlParam::Text(field.name.clone()),
                SqlParam::Text(tag.tag_id.clone()),
            ];
            group_params.extend(filter_params);
            store.query_group_counts(&group_sql, &group_params)?
        }
        None => BTreeMap::new(),
    };

    Ok(Aggregation { total, groups })
}
