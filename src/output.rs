//! Result formatting for query rows and aggregations.
//!
//! Supports JSON (via serde_json, compact or pretty), CSV, and an aligned
//! text table. Column order is deterministic: `id` and `name` first, then
//! field columns. A projection (from the query's `select` clause) replaces
//! the field columns with exactly the requested ones, in the requested
//! order.

use crate::aggregate::Aggregation;
use crate::schema::normalize_name;
use crate::store::ResultRow;
use serde_json::{json, Map, Value};

/// Output format selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            other => Err(format!(
                "unknown format '{}' (expected json, csv, or table)",
                other
            )),
        }
    }
}

/// Field columns for a row set: projected fields verbatim when a projection
/// is given, otherwise the union of stored field names in sorted order.
fn field_columns(rows: &[ResultRow], projection: Option<&[String]>) -> Vec<String> {
    match projection {
        Some(fields) => fields.to_vec(),
        None => {
            let mut columns: Vec<String> = vec![];
            for row in rows {
                for name in row.fields.keys() {
                    if !columns.contains(name) {
                        columns.push(name.clone());
                    }
                }
            }
            columns.sort_unstable();
            columns
        }
    }
}

/// A row's value for a column, matching projected names by normalization so
/// `select due_date` finds the stored `Due Date` column.
fn column_value<'a>(row: &'a ResultRow, column: &str) -> Option<&'a str> {
    if let Some(value) = row.fields.get(column) {
        return Some(value);
    }
    let normalized = normalize_name(column);
    row.fields
        .iter()
        .find(|(name, _)| normalize_name(name) == normalized)
        .map(|(_, value)| value.as_str())
}

fn rows_to_value(rows: &[ResultRow], projection: Option<&[String]>) -> Value {
    let columns = field_columns(rows, projection);
    Value::Array(
        rows.iter()
            .map(|row| {
                let mut obj = Map::new();
                obj.insert("id".to_string(), Value::String(row.entity_id.clone()));
                obj.insert("name".to_string(), Value::String(row.name.clone()));
                for column in &columns {
                    let value = match column_value(row, column) {
                        Some(v) => Value::String(v.to_string()),
                        None => Value::Null,
                    };
                    obj.insert(column.clone(), value);
                }
                Value::Object(obj)
            })
            .collect(),
    )
}

/// Render rows as compact JSON.
pub fn to_json(rows: &[ResultRow], projection: Option<&[String]>) -> String {
    rows_to_value(rows, projection).to_string()
}

/// Render rows as pretty-printed JSON.
pub fn to_json_pretty(rows: &[ResultRow], projection: Option<&[String]>) -> String {
    serde_json::to_string_pretty(&rows_to_value(rows, projection))
        .unwrap_or_else(|_| "[]".to_string())
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render rows as CSV with a header line.
pub fn to_csv(rows: &[ResultRow], projection: Option<&[String]>) -> String {
    let columns = field_columns(rows, projection);
    let mut out = String::new();

    let mut header = vec!["id".to_string(), "name".to_string()];
    header.extend(columns.iter().cloned());
    out.push_str(&header.iter().map(|h| escape_csv(h)).collect::<Vec<_>>().join(","));
    out.push('\n');

    for row in rows {
        let mut cells = vec![escape_csv(&row.entity_id), escape_csv(&row.name)];
        for column in &columns {
            cells.push(escape_csv(column_value(row, column).unwrap_or("")));
        }
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Render rows as an aligned text table.
pub fn to_table(rows: &[ResultRow], projection: Option<&[String]>) -> String {
    let columns = field_columns(rows, projection);
    let mut header = vec!["id".to_string(), "name".to_string()];
    header.extend(columns.iter().cloned());

    let mut table: Vec<Vec<String>> = vec![header];
    for row in rows {
        let mut cells = vec![row.entity_id.clone(), row.name.clone()];
        for column in &columns {
            cells.push(column_value(row, column).unwrap_or("").to_string());
        }
        table.push(cells);
    }

    let width = table[0].len();
    let mut widths = vec![0usize; width];
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (index, row) in table.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
        if index == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(rule.join("  ").trim_end());
            out.push('\n');
        }
    }
    out
}

/// Render an aggregation as JSON: `{"total": N, "groups": {...}}`.
pub fn aggregation_to_json(aggregation: &Aggregation, pretty: bool) -> String {
    let value = json!({
        "total": aggregation.total,
        "groups": aggregation.groups,
    });
    if pretty {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}
