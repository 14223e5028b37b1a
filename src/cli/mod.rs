//! CLI support for tagql
//!
//! Provides programmatic access to the CLI commands for embedding in other
//! tools; the binary itself is argument plumbing over these entry points.

mod aggregate;
mod query;
mod schema;

pub use aggregate::{execute_aggregate, AggregateOptions};
pub use query::{execute_query, QueryOptions};
pub use schema::{list_fields, list_tags};

use crate::aggregate::AggregateError;
use crate::compiler::CompileError;
use crate::parser::ParseError;
use crate::schema::SchemaError;
use crate::store::StoreError;
use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query text failed to parse
    Parse(ParseError),
    /// Field/tag resolution or literal coercion failed
    Compile(CompileError),
    /// Schema lookup failed
    Schema(SchemaError),
    /// Aggregation failed
    Aggregate(AggregateError),
    /// The store rejected or failed the query
    Store(StoreError),
    /// IO error
    Io(io::Error),
    /// No query text provided
    NoQuery,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Compile(e) => write!(f, "Compile error: {}", e),
            CliError::Schema(e) => write!(f, "Schema error: {}", e),
            CliError::Aggregate(e) => write!(f, "Aggregation error: {}", e),
            CliError::Store(e) => write!(f, "Store error: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoQuery => write!(f, "No query provided. Pass it as an argument or pipe it to stdin."),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Compile(e) => Some(e),
            CliError::Schema(e) => Some(e),
            CliError::Aggregate(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoQuery => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        CliError::Schema(e)
    }
}

impl From<AggregateError> for CliError {
    fn from(e: AggregateError) -> Self {
        CliError::Aggregate(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
