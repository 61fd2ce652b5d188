//! Diff tree node types.

use chrono::NaiveDateTime;

/// Fate assigned to one entity when two snapshots are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffType {
    Add,
    Change,
    Delete,
}

impl DiffType {
    /// Stable code used in persisted diff maps.
    pub fn code(self) -> &'static str {
        match self {
            DiffType::Add => "ADD",
            DiffType::Change => "CHANGE",
            DiffType::Delete => "DELETE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ADD" => Some(DiffType::Add),
            "CHANGE" => Some(DiffType::Change),
            "DELETE" => Some(DiffType::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Before/after pair for one changed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrevious {
    /// Attribute name (e.g. "columnList", "typeName")
    pub attribute: String,
    /// Value in the previous snapshot
    pub previous: String,
    /// Value in the next snapshot
    pub next: String,
}

impl NextPrevious {
    pub fn new(
        attribute: impl Into<String>,
        previous: impl Into<String>,
        next: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            previous: previous.into(),
            next: next.into(),
        }
    }
}

/// Leaf diff for one named element: a constraint, index, or column.
///
/// An unchanged element emits no diff at all, so every constructed node
/// represents a real difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDiff {
    pub diff_type: DiffType,
    /// Constraint/index/column name the diff is keyed by
    pub key_name: String,
    /// One pair per changed attribute; empty for ADD and DELETE
    pub pairs: Vec<NextPrevious>,
}

impl ElementDiff {
    pub fn added(key_name: impl Into<String>) -> Self {
        Self {
            diff_type: DiffType::Add,
            key_name: key_name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn deleted(key_name: impl Into<String>) -> Self {
        Self {
            diff_type: DiffType::Delete,
            key_name: key_name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn changed(key_name: impl Into<String>, pairs: Vec<NextPrevious>) -> Self {
        Self {
            diff_type: DiffType::Change,
            key_name: key_name.into(),
            pairs,
        }
    }

    pub fn has_diff(&self) -> bool {
        // Existence of the node is the difference for ADD/DELETE.
        !matches!(self.diff_type, DiffType::Change) || !self.pairs.is_empty()
    }
}

/// Diff for one table, composing the per-kind element diffs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    pub diff_type: DiffType,
    pub table_name: String,
    /// Table-level attribute changes (schema qualifier, comment)
    pub attributes: Vec<NextPrevious>,
    pub primary_key_diff: Option<ElementDiff>,
    pub unique_key_diffs: Vec<ElementDiff>,
    pub index_diffs: Vec<ElementDiff>,
    pub column_diffs: Vec<ElementDiff>,
}

impl TableDiff {
    pub fn added(table_name: impl Into<String>) -> Self {
        Self::bare(DiffType::Add, table_name)
    }

    pub fn deleted(table_name: impl Into<String>) -> Self {
        Self::bare(DiffType::Delete, table_name)
    }

    pub fn changed(table_name: impl Into<String>) -> Self {
        Self::bare(DiffType::Change, table_name)
    }

    fn bare(diff_type: DiffType, table_name: impl Into<String>) -> Self {
        Self {
            diff_type,
            table_name: table_name.into(),
            attributes: Vec::new(),
            primary_key_diff: None,
            unique_key_diffs: Vec::new(),
            index_diffs: Vec::new(),
            column_diffs: Vec::new(),
        }
    }

    /// True if this table has its own change or any nested element differs.
    ///
    /// Computed bottom-up on every call; never cached.
    pub fn has_diff(&self) -> bool {
        if !matches!(self.diff_type, DiffType::Change) {
            return true;
        }
        !self.attributes.is_empty()
            || self.primary_key_diff.as_ref().is_some_and(ElementDiff::has_diff)
            || self.unique_key_diffs.iter().any(ElementDiff::has_diff)
            || self.index_diffs.iter().any(ElementDiff::has_diff)
            || self.column_diffs.iter().any(ElementDiff::has_diff)
    }
}

/// Whole-schema diff: every differing table, stamped with the diff datetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiff {
    pub diff_datetime: NaiveDateTime,
    pub table_diffs: Vec<TableDiff>,
}

impl SchemaDiff {
    pub fn has_diff(&self) -> bool {
        self.table_diffs.iter().any(TableDiff::has_diff)
    }

    pub fn added_count(&self) -> usize {
        self.count_of(DiffType::Add)
    }

    pub fn changed_count(&self) -> usize {
        self.count_of(DiffType::Change)
    }

    pub fn deleted_count(&self) -> usize {
        self.count_of(DiffType::Delete)
    }

    fn count_of(&self, diff_type: DiffType) -> usize {
        self.table_diffs
            .iter()
            .filter(|t| t.diff_type == diff_type)
            .count()
    }
}
