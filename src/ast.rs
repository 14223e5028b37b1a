//! # tagql - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the tagql query
//! language, a small language for finding tagged entities in a workspace
//! export.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison operators
//! - **[filter]** - Filter expression tree and literal values
//! - **[query]** - Complete query structure
//!
//! ## Quick Start
//!
//! ```text
//! find task where Status = Done order by -DueDate limit 10
//! ```
//!
//! This query finds entities tagged `task` whose `Status` field equals
//! `Done`, latest due date first, at most ten of them.
//!
//! ## Core Concepts
//!
//! ### Query Shape
//!
//! Every query names a target tag (or `*` for all tags) and optionally
//! narrows, orders, and paginates the result:
//!
//! ```text
//! find TAG (where FILTER)? (order by KEYS)? (limit N)? (offset M)? (select FIELDS)?
//! ```
//!
//! ### Filters
//!
//! Filters combine field comparisons with `and`, `or`, `not` and
//! parentheses. `not` binds tighter than `and`, which binds tighter than
//! `or`; chains of the same operator associate left.
//!
//! ```text
//! find task where (Status = Done or Status = Active) and not Archived exists
//! ```
//!
//! ### Values
//!
//! Comparison values are quoted strings, numbers, or bare words. Bare words
//! stay identifiers in the AST; the compiler coerces them according to the
//! field's inferred type.
//!
//! ## Examples
//!
//! ### Ordered comparison on a date field
//!
//! ```text
//! find task where DueDate < 2025-01-01
//! ```
//!
//! ### Existence check
//!
//! ```text
//! find contact where Email exists
//! ```
//!
//! ### Wildcard target
//!
//! ```text
//! find * where Name ~ report
//! ```

pub mod tokens;
pub mod operators;
pub mod filter;
pub mod query;

pub use tokens::{Keyword, Token};
pub use operators::CompareOp;
pub use filter::{FilterExpr, Literal};
pub use query::{OrderKey, Query, Target};
