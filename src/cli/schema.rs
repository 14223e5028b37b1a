//! Schema inspection commands.

use super::CliError;
use crate::schema::Resolver;
use crate::store::SqliteStore;
use std::path::Path;

/// All tag names in the workspace, one per line.
pub fn list_tags(db: &Path) -> Result<String, CliError> {
    let store = SqliteStore::open(db)?;
    let snapshot = store.schema_snapshot()?;
    let resolver = Resolver::new(&snapshot);

    let mut out = String::new();
    for name in resolver.tag_names() {
        out.push_str(name);
        out.push('\n');
    }
    Ok(out)
}

/// A tag's effective field list: name, inferred type, and the ancestor a
/// field was inherited from.
pub fn list_fields(db: &Path, tag_name: &str) -> Result<String, CliError> {
    let store = SqliteStore::open(db)?;
    let snapshot = store.schema_snapshot()?;
    let resolver = Resolver::new(&snapshot);
    let tag = resolver.resolve_tag(tag_name)?;

    let mut out = String::new();
    for field in &tag.fields {
        match &field.inherited_from {
            Some(ancestor_id) => {
                let ancestor = resolver.tag_display_name(ancestor_id).unwrap_or(ancestor_id);
                out.push_str(&format!(
                    "{} ({}, inherited from {})\n",
                    field.name, field.field_type, ancestor
                ));
            }
            None => out.push_str(&format!("{} ({})\n", field.name, field.field_type)),
        }
    }
    Ok(out)
}
