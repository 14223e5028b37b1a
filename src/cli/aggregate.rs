//! Grouped counts from the command line.

use super::CliError;
use crate::aggregate;
use crate::output;
use crate::parser;
use crate::schema::Resolver;
use crate::store::SqliteStore;
use std::path::PathBuf;

/// Options for the aggregate command
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Target tag name
    pub tag: String,
    /// Optional field to group by
    pub group_by: Option<String>,
    /// Optional filter expression (the text after `where`)
    pub filter: Option<String>,
    /// Path to the workspace database
    pub db: PathBuf,
    /// Pretty-print the JSON output
    pub pretty: bool,
}

/// Resolve, count, and render an aggregation as JSON.
pub fn execute_aggregate(options: &AggregateOptions) -> Result<String, CliError> {
    let filter = options
        .filter
        .as_deref()
        .map(parser::parse_filter)
        .transpose()?;

    let store = SqliteStore::open(&options.db)?;
    let snapshot = store.schema_snapshot()?;
    let resolver = Resolver::new(&snapshot);

    let result = aggregate::aggregate(
        &store,
        &resolver,
        &options.tag,
        options.group_by.as_deref(),
        filter.as_ref(),
    )?;
    Ok(output::aggregation_to_json(&result, options.pretty))
}
