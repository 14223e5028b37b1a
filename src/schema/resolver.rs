use crate::schema::normalize::normalize_name;
use crate::schema::types::{infer_field_type, FieldType};
use std::collections::{HashMap, HashSet};

/// Tag metadata row, as loaded from the `tags` relation.
#[derive(Debug, Clone)]
pub struct TagMeta {
    pub tag_id: String,
    pub name: String,
    pub normalized_name: String,
}

/// Field declaration row, as loaded from the `tag_fields` relation.
#[derive(Debug, Clone)]
pub struct FieldMeta {
    pub tag_id: String,
    pub name: String,
    pub normalized_name: String,
    /// Declaration order within the owning tag
    pub position: i64,
    /// Pre-computed type, when the ingestion pipeline stored one
    pub type_override: Option<FieldType>,
}

/// In-memory snapshot of the three schema relations.
///
/// Read-only input to the resolver; loaded fresh from the store and never
/// mutated by the query subsystem.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    pub tags: Vec<TagMeta>,
    pub fields: Vec<FieldMeta>,
    /// `(child_id, parent_id)` inheritance edges
    pub parents: Vec<(String, String)>,
}

/// A field reference after matching against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedField {
    /// Field name as declared (and as stored in `field_values`)
    pub name: String,
    pub normalized: String,
    pub field_type: FieldType,
    /// The tag whose effective field list this entry belongs to
    pub owner_tag_id: String,
    /// The ancestor that declared the field, when inherited
    pub inherited_from: Option<String>,
}

/// A tag with its full effective field list: own fields in declaration
/// order, then inherited fields in ascending inheritance depth.
#[derive(Debug, Clone)]
pub struct ResolvedTag {
    pub tag_id: String,
    pub name: String,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedTag {
    /// Look a field up by its normalized name.
    pub fn field(&self, normalized: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.normalized == normalized)
    }

    /// Fields the tag declares itself.
    pub fn own_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.inherited_from.is_none())
    }

    /// Fields contributed by ancestors.
    pub fn inherited_fields(&self) -> impl Iterator<Item = &ResolvedField> {
        self.fields.iter().filter(|f| f.inherited_from.is_some())
    }
}

/// How to treat a field identifier that matches nothing.
///
/// Strict resolution fails; lenient resolution reports "no match" and lets
/// the caller skip the field (record-creation flows warn and move on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    Strict,
    Lenient,
}

/// Schema resolution failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    TagNotFound(String),
    FieldNotFound { tag: String, field: String },
    InheritanceCycle { tag_id: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::TagNotFound(name) => write!(f, "tag not found: '{}'", name),
            SchemaError::FieldNotFound { tag, field } => {
                write!(f, "field '{}' not found on tag '{}'", field, tag)
            }
            SchemaError::InheritanceCycle { tag_id } => {
                write!(f, "inheritance cycle through tag '{}'", tag_id)
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Resolves tag names and field identifiers against a schema snapshot.
///
/// Purely functional over the snapshot it indexed at construction; safe to
/// share across concurrent queries.
pub struct Resolver {
    tags_by_norm: HashMap<String, TagMeta>,
    tags_by_id: HashMap<String, TagMeta>,
    /// Declared fields per tag, in declaration order
    fields_by_tag: HashMap<String, Vec<FieldMeta>>,
    /// Parent adjacency, in edge-declaration order
    parents: HashMap<String, Vec<String>>,
}

impl Resolver {
    pub fn new(snapshot: &SchemaSnapshot) -> Self {
        let mut tags_by_norm = HashMap::new();
        let mut tags_by_id = HashMap::new();
        for tag in &snapshot.tags {
            tags_by_norm.insert(tag.normalized_name.clone(), tag.clone());
            tags_by_id.insert(tag.tag_id.clone(), tag.clone());
        }

        let mut fields_by_tag: HashMap<String, Vec<FieldMeta>> = HashMap::new();
        for field in &snapshot.fields {
            fields_by_tag
                .entry(field.tag_id.clone())
                .or_default()
                .push(field.clone());
        }
        for fields in fields_by_tag.values_mut() {
            fields.sort_by_key(|f| f.position);
        }

        let mut parents: HashMap<String, Vec<String>> = HashMap::new();
        for (child, parent) in &snapshot.parents {
            parents.entry(child.clone()).or_default().push(parent.clone());
        }

        Resolver {
            tags_by_norm,
            tags_by_id,
            fields_by_tag,
            parents,
        }
    }

    /// Display name for a tag id.
    pub fn tag_display_name(&self, tag_id: &str) -> Option<&str> {
        self.tags_by_id.get(tag_id).map(|t| t.name.as_str())
    }

    /// All tag display names, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags_by_id.values().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a tag name to its identity and effective field list.
    pub fn resolve_tag(&self, tag_name: &str) -> Result<ResolvedTag, SchemaError> {
        let tag = self
            .tags_by_norm
            .get(&normalize_name(tag_name))
            .ok_or_else(|| SchemaError::TagNotFound(tag_name.to_string()))?;

        let mut fields = vec![];
        let mut claimed: HashSet<String> = HashSet::new();

        // Own fields first, in declaration order.
        for meta in self.fields_by_tag.get(&tag.tag_id).into_iter().flatten() {
            if claimed.insert(meta.normalized_name.clone()) {
                fields.push(self.resolved_field(meta, &tag.tag_id, None));
            }
        }

        // Breadth-first over the parent graph, one depth at a time, so a
        // strictly closer ancestor always claims a name before a farther
        // one. A tag id seen twice means the graph has a cycle.
        let mut visited: HashSet<String> = HashSet::from([tag.tag_id.clone()]);
        let mut level: Vec<String> = self.parents_of(&tag.tag_id).to_vec();

        while !level.is_empty() {
            for ancestor_id in &level {
                if !visited.insert(ancestor_id.clone()) {
                    return Err(SchemaError::InheritanceCycle {
                        tag_id: ancestor_id.clone(),
                    });
                }
            }

            let mut level_claims: HashSet<String> = HashSet::new();
            for ancestor_id in &level {
                for meta in self.fields_by_tag.get(ancestor_id).into_iter().flatten() {
                    if claimed.contains(&meta.normalized_name)
                        || !level_claims.insert(meta.normalized_name.clone())
                    {
                        continue;
                    }
                    fields.push(self.resolved_field(meta, &tag.tag_id, Some(ancestor_id.clone())));
                }
            }
            claimed.extend(level_claims);

            level = level
                .iter()
                .flat_map(|id| self.parents_of(id).iter().cloned())
                .collect();
        }

        Ok(ResolvedTag {
            tag_id: tag.tag_id.clone(),
            name: tag.name.clone(),
            fields,
        })
    }

    /// Resolve a free-standing field identifier against a tag's effective
    /// field list.
    ///
    /// Strict mode fails on a miss; lenient mode returns `Ok(None)` so the
    /// caller can skip the field with a warning.
    pub fn resolve_field<'a>(
        &self,
        tag: &'a ResolvedTag,
        identifier: &str,
        mode: ResolveMode,
    ) -> Result<Option<&'a ResolvedField>, SchemaError> {
        match tag.field(&normalize_name(identifier)) {
            Some(field) => Ok(Some(field)),
            None => match mode {
                ResolveMode::Strict => Err(SchemaError::FieldNotFound {
                    tag: tag.name.clone(),
                    field: identifier.to_string(),
                }),
                ResolveMode::Lenient => Ok(None),
            },
        }
    }

    /// Distinct declared field names (as stored) whose normalized form
    /// matches, across every tag. Used for wildcard-target queries, where
    /// no single tag scopes the lookup.
    pub fn field_names_matching(&self, normalized: &str) -> Vec<String> {
        let mut names: Vec<String> = vec![];
        for fields in self.fields_by_tag.values() {
            for meta in fields {
                if meta.normalized_name == normalized && !names.contains(&meta.name) {
                    names.push(meta.name.clone());
                }
            }
        }
        names.sort_unstable();
        names
    }

    fn parents_of(&self, tag_id: &str) -> &[String] {
        self.parents.get(tag_id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn resolved_field(
        &self,
        meta: &FieldMeta,
        owner_tag_id: &str,
        inherited_from: Option<String>,
    ) -> ResolvedField {
        let field_type = meta
            .type_override
            .unwrap_or_else(|| infer_field_type(&meta.normalized_name));
        ResolvedField {
            name: meta.name.clone(),
            normalized: meta.normalized_name.clone(),
            field_type,
            owner_tag_id: owner_tag_id.to_string(),
            inherited_from,
        }
    }
}
