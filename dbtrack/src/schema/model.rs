//! Types describing one schema snapshot, suitable for JSON persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete structural description of a schema at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Database/catalog name the snapshot was taken from, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// When the metadata provider captured this snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,

    /// All tables, in provider order
    pub tables: Vec<TableMeta>,
}

impl SchemaSnapshot {
    pub fn new(tables: Vec<TableMeta>) -> Self {
        Self {
            database: None,
            captured_at: None,
            tables,
        }
    }
}

/// One table with its columns and constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    /// Table name as reported by the provider (e.g. "MEMBER")
    pub name: String,

    /// Schema qualifier, if the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Table comment from database metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// All columns, in ordinal position order
    pub columns: Vec<ColumnMeta>,

    /// Primary key constraint, absent for keyless tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<ConstraintMeta>,

    /// Unique key constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_keys: Vec<ConstraintMeta>,

    /// Indexes (non-PK)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<IndexMeta>,
}

impl TableMeta {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMeta>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            comment: None,
            columns,
            primary_key: None,
            unique_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }
}

/// One column's structural attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name
    pub name: String,

    /// Type name as reported by the provider (e.g. "VARCHAR", "INTEGER")
    #[serde(rename = "type")]
    pub type_name: String,

    /// Column size (precision for numeric types)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_size: Option<u32>,

    /// Decimal digits (scale), only meaningful for numeric types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_digits: Option<u32>,

    /// NOT NULL constraint
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_null: bool,

    /// Column default expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Column comment from database metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            column_size: None,
            decimal_digits: None,
            not_null: false,
            default_value: None,
            comment: None,
        }
    }

    /// Size expression for display and diffing: "10", "10, 2", or "".
    pub fn size_expression(&self) -> String {
        match (self.column_size, self.decimal_digits) {
            (Some(size), Some(digits)) => format!("{size}, {digits}"),
            (Some(size), None) => size.to_string(),
            (None, _) => String::new(),
        }
    }
}

/// Named constraint over an ordered column list (primary key, unique key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintMeta {
    /// Constraint name
    pub name: String,

    /// Member columns in key order
    pub columns: Vec<String>,
}

impl ConstraintMeta {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Comma-joined member columns, the comparison unit for key diffs.
    pub fn column_expression(&self) -> String {
        self.columns.join(", ")
    }
}

/// Named index over an ordered column list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Index name
    pub name: String,

    /// Member columns in index order
    pub columns: Vec<String>,

    /// Whether the index enforces uniqueness
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
}

impl IndexMeta {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
        }
    }

    pub fn column_expression(&self) -> String {
        self.columns.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_expression() {
        let mut column = ColumnMeta::new("PRICE", "DECIMAL");
        assert_eq!(column.size_expression(), "");
        column.column_size = Some(10);
        assert_eq!(column.size_expression(), "10");
        column.decimal_digits = Some(2);
        assert_eq!(column.size_expression(), "10, 2");
    }

    #[test]
    fn test_column_expression() {
        let constraint = ConstraintMeta::new(
            "UQ_MEMBER",
            vec!["MEMBER_ACCOUNT".to_string(), "MEMBER_NAME".to_string()],
        );
        assert_eq!(constraint.column_expression(), "MEMBER_ACCOUNT, MEMBER_NAME");
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut table = TableMeta::new("MEMBER", vec![ColumnMeta::new("MEMBER_ID", "INTEGER")]);
        table.primary_key = Some(ConstraintMeta::new("PK_MEMBER", vec!["MEMBER_ID".to_string()]));
        let snapshot = SchemaSnapshot::new(vec![table]);

        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let reparsed: SchemaSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed.tables.len(), 1);
        assert_eq!(reparsed.tables[0].name, "MEMBER");
        assert_eq!(reparsed.tables[0].primary_key.as_ref().unwrap().name, "PK_MEMBER");
    }
}
