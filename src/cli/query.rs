//! Execute tagql queries against a workspace database.

use super::CliError;
use crate::compiler::Compiler;
use crate::output::{self, OutputFormat};
use crate::parser;
use crate::schema::Resolver;
use crate::store::SqliteStore;
use std::path::PathBuf;

/// Options for the query command
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// The query text
    pub query: String,
    /// Path to the workspace database
    pub db: PathBuf,
    /// Output format
    pub format: OutputFormat,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Parse, compile, and execute a query, returning the formatted output.
pub fn execute_query(options: &QueryOptions) -> Result<String, CliError> {
    let query = parser::parse_query(&options.query)?;

    let store = SqliteStore::open(&options.db)?;
    let snapshot = store.schema_snapshot()?;
    let resolver = Resolver::new(&snapshot);

    let compiled = Compiler::new(&resolver).compile(&query)?;
    let rows = store.execute(&compiled)?;

    let projection = compiled.projection.as_deref();
    let rendered = match options.format {
        OutputFormat::Json if options.pretty => output::to_json_pretty(&rows, projection),
        OutputFormat::Json => output::to_json(&rows, projection),
        OutputFormat::Csv => output::to_csv(&rows, projection),
        OutputFormat::Table => output::to_table(&rows, projection),
    };
    Ok(rendered)
}
