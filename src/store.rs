//! SQLite-backed store for the workspace export.
//!
//! Holds the three schema relations the resolver reads (`tags`,
//! `tag_fields`, `tag_parents`) and the three data relations compiled
//! queries run against (`entities`, `tag_memberships`, `field_values`).
//! The write API exists for the ingestion pipeline (and tests); the query
//! subsystem itself only reads.

use crate::compiler::{CompiledQuery, SqlParam};
use crate::schema::{normalize_name, FieldMeta, FieldType, SchemaSnapshot, TagMeta};
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, Connection, ToSql};
use std::collections::BTreeMap;
use std::path::Path;

/// Store failure. Execution errors from SQLite are wrapped and propagated
/// unchanged, never swallowed or retried.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "io: {}", e),
            StoreError::Sql(e) => write!(f, "sqlite: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Sql(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        StoreError::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Sql(value)
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Int(i) => i.to_sql(),
            SqlParam::Real(r) => r.to_sql(),
        }
    }
}

/// One result row: the entity plus all its stored field values, keyed by
/// the stored field name. Multi-valued fields join with `", "`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub entity_id: String,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS tags (
              tag_id TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              normalized_name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_tags_normalized ON tags(normalized_name);

            CREATE TABLE IF NOT EXISTS tag_fields (
              tag_id TEXT NOT NULL,
              field_name TEXT NOT NULL,
              normalized_name TEXT NOT NULL,
              position INTEGER NOT NULL,
              field_type TEXT,
              PRIMARY KEY (tag_id, field_name)
            );

            CREATE TABLE IF NOT EXISTS tag_parents (
              child_id TEXT NOT NULL,
              parent_id TEXT NOT NULL,
              PRIMARY KEY (child_id, parent_id)
            );

            CREATE TABLE IF NOT EXISTS entities (
              entity_id TEXT PRIMARY KEY,
              name TEXT NOT NULL,
              created_at INTEGER NOT NULL,
              updated_at INTEGER NOT NULL,
              parent_id TEXT
            );

            CREATE TABLE IF NOT EXISTS tag_memberships (
              entity_id TEXT NOT NULL,
              tag_id TEXT NOT NULL,
              PRIMARY KEY (entity_id, tag_id)
            );
            CREATE INDEX IF NOT EXISTS idx_memberships_tag ON tag_memberships(tag_id);

            CREATE TABLE IF NOT EXISTS field_values (
              tuple_id TEXT PRIMARY KEY,
              entity_id TEXT NOT NULL,
              field_name TEXT NOT NULL,
              value_order REAL,
              value_text TEXT NOT NULL,
              created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_values_entity ON field_values(entity_id, field_name);
            CREATE INDEX IF NOT EXISTS idx_values_field ON field_values(field_name);
            "#,
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Write API (ingestion pipeline and tests)
    // ------------------------------------------------------------------

    pub fn insert_tag(&self, tag_id: &str, name: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tags (tag_id, name, normalized_name) VALUES (?1, ?2, ?3)",
            params![tag_id, name, normalize_name(name)],
        )?;
        Ok(())
    }

    pub fn insert_field(
        &self,
        tag_id: &str,
        field_name: &str,
        position: i64,
        type_override: Option<FieldType>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tag_fields (tag_id, field_name, normalized_name, position, field_type) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                tag_id,
                field_name,
                normalize_name(field_name),
                position,
                type_override.map(|t| t.as_str())
            ],
        )?;
        Ok(())
    }

    pub fn insert_parent(&self, child_id: &str, parent_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tag_parents (child_id, parent_id) VALUES (?1, ?2)",
            params![child_id, parent_id],
        )?;
        Ok(())
    }

    pub fn insert_entity(&self, entity_id: &str, name: &str) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT OR REPLACE INTO entities (entity_id, name, created_at, updated_at, parent_id) \
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![entity_id, name, now, now],
        )?;
        Ok(())
    }

    pub fn add_membership(&self, entity_id: &str, tag_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO tag_memberships (entity_id, tag_id) VALUES (?1, ?2)",
            params![entity_id, tag_id],
        )?;
        Ok(())
    }

    /// Store one field value tuple. `value_order` is the pre-computed
    /// sortable form: the number itself, epoch milliseconds for dates,
    /// 0/1 for checkboxes, `None` for plain text.
    pub fn insert_value(
        &self,
        tuple_id: &str,
        entity_id: &str,
        field_name: &str,
        value_text: &str,
        value_order: Option<f64>,
    ) -> Result<(), StoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT OR REPLACE INTO field_values (tuple_id, entity_id, field_name, value_order, value_text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![tuple_id, entity_id, field_name, value_order, value_text, now],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read API
    // ------------------------------------------------------------------

    /// Load the three schema relations into an immutable snapshot for the
    /// resolver.
    pub fn schema_snapshot(&self) -> Result<SchemaSnapshot, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag_id, name, normalized_name FROM tags ORDER BY tag_id")?;
        let tags = stmt
            .query_map([], |row| {
                Ok(TagMeta {
                    tag_id: row.get(0)?,
                    name: row.get(1)?,
                    normalized_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT tag_id, field_name, normalized_name, position, field_type \
             FROM tag_fields ORDER BY tag_id, position",
        )?;
        let fields = stmt
            .query_map([], |row| {
                let type_override: Option<String> = row.get(4)?;
                Ok(FieldMeta {
                    tag_id: row.get(0)?,
                    name: row.get(1)?,
                    normalized_name: row.get(2)?,
                    position: row.get(3)?,
                    type_override: type_override.as_deref().and_then(FieldType::from_str),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT child_id, parent_id FROM tag_parents ORDER BY rowid")?;
        let parents = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SchemaSnapshot {
            tags,
            fields,
            parents,
        })
    }

    /// Execute a compiled query, returning ordered result rows with each
    /// entity's field values attached.
    pub fn execute(&self, compiled: &CompiledQuery) -> Result<Vec<ResultRow>, StoreError> {
        let mut stmt = self.conn.prepare(&compiled.sql)?;
        let entities = stmt
            .query_map(rusqlite::params_from_iter(compiled.params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut values_stmt = self.conn.prepare(
            "SELECT field_name, value_text FROM field_values WHERE entity_id = ?1 ORDER BY created_at, tuple_id",
        )?;

        let mut rows = Vec::with_capacity(entities.len());
        for (entity_id, name) in entities {
            let mut fields: BTreeMap<String, String> = BTreeMap::new();
            let values = values_stmt
                .query_map(params![entity_id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            for (field_name, value_text) in values {
                fields
                    .entry(field_name)
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(&value_text);
                    })
                    .or_insert(value_text);
            }
            rows.push(ResultRow {
                entity_id,
                name,
                fields,
            });
        }
        Ok(rows)
    }

    /// Run a single-row COUNT query.
    pub fn query_count(&self, sql: &str, params: &[SqlParam]) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row(sql, rusqlite::params_from_iter(params.iter()), |row| {
                row.get(0)
            })?;
        Ok(count.max(0) as u64)
    }

    /// Run a `GROUP BY` counting query mapping group key to count.
    pub fn query_group_counts(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<BTreeMap<String, u64>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let pairs = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs
            .into_iter()
            .map(|(key, count)| (key, count.max(0) as u64))
            .collect())
    }
}
