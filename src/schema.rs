//! # tagql - Schema resolution
//!
//! Maps user-typed tag and field names onto the schema tables of a
//! workspace export: tag metadata, per-tag field declarations, and the
//! tag-parent inheritance edges.
//!
//! - **[normalize]** - name normalization used for all matching
//! - **[types]** - inferred field data types and the name→type rule table
//! - **[resolver]** - tag/field resolution over the inheritance graph
//!
//! A tag's effective field list is its own fields plus everything reachable
//! through parent edges, own fields shadowing inherited ones of the same
//! normalized name and closer ancestors shadowing farther ones. The
//! traversal is breadth-first with a visited set; a revisited tag id is an
//! inheritance cycle and a fatal [`SchemaError`].

pub mod normalize;
pub mod types;
pub mod resolver;

pub use normalize::normalize_name;
pub use types::{infer_field_type, FieldType};
pub use resolver::{
    FieldMeta, ResolveMode, ResolvedField, ResolvedTag, Resolver, SchemaError, SchemaSnapshot,
    TagMeta,
};
