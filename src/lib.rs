pub mod aggregate;
pub mod ast;
pub mod cli;
pub mod compiler;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod schema;
pub mod store;

pub use aggregate::{aggregate, AggregateError, Aggregation};
pub use ast::{CompareOp, FilterExpr, Keyword, Literal, OrderKey, Query, Target, Token};
pub use compiler::{CompileError, CompiledQuery, Compiler, FieldScope, SqlParam};
pub use lexer::{tokenize, LexError, Lexer};
pub use output::OutputFormat;
pub use parser::{parse_filter, parse_query, ParseError, Parser};
pub use schema::{
    infer_field_type, normalize_name, FieldType, ResolveMode, ResolvedField, ResolvedTag, Resolver,
    SchemaError, SchemaSnapshot,
};
pub use store::{ResultRow, SqliteStore, StoreError};
