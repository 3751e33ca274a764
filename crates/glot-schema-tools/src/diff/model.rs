//! Table diff data structures
//!
//! A `TableDiff` is the caller-supplied description of desired
//! additions/changes/deletions to one table's columns, indexes, and foreign
//! keys, plus a bag of table-level option changes. It carries everything the
//! DDL generator needs to render a statement batch; nothing in here touches
//! a connection.

use glot_core::{ColumnInfo, ForeignKeyAction, IndexInfo};
use serde::{Deserialize, Serialize};

/// Represents the changes to apply to a single table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDiff {
    /// The table being altered (current name)
    pub table_name: String,
    /// Schema of the table
    pub schema: Option<String>,
    /// Columns to add
    pub added_columns: Vec<ColumnInfo>,
    /// Columns whose type/nullability/default changes
    pub changed_columns: Vec<ColumnChange>,
    /// Columns to drop, by name
    pub removed_columns: Vec<String>,
    /// Columns to rename
    pub renamed_columns: Vec<ColumnRename>,
    /// Indexes to create
    pub added_indexes: Vec<IndexInfo>,
    /// Indexes to redefine (dropped by old name, recreated from new)
    pub changed_indexes: Vec<IndexChange>,
    /// Indexes to drop
    pub removed_indexes: Vec<IndexInfo>,
    /// Foreign keys to add
    pub added_foreign_keys: Vec<ForeignKeyDef>,
    /// Foreign key constraints to drop, by name
    pub removed_foreign_keys: Vec<String>,
    /// Primary/unique key constraints to drop, by name
    pub removed_constraints: Vec<String>,
    /// Table-level option changes
    pub options: TableOptionsDiff,
}

impl TableDiff {
    /// Creates a new empty diff for a table
    pub fn new(table_name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            table_name: table_name.into(),
            schema,
            ..Default::default()
        }
    }

    /// Returns the qualified table name (schema.table or just table)
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.table_name),
            None => self.table_name.clone(),
        }
    }

    /// Returns true if there are no changes in this diff
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.changed_columns.is_empty()
            && self.removed_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.added_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.removed_indexes.is_empty()
            && self.added_foreign_keys.is_empty()
            && self.removed_foreign_keys.is_empty()
            && self.removed_constraints.is_empty()
            && self.options.is_empty()
    }

    /// Returns true if all changes are additive (no drops, renames, or
    /// nullable tightening)
    pub fn is_safe(&self) -> bool {
        self.removed_columns.is_empty()
            && self.renamed_columns.is_empty()
            && self.removed_indexes.is_empty()
            && self.changed_indexes.is_empty()
            && self.removed_foreign_keys.is_empty()
            && self.removed_constraints.is_empty()
            && self.changed_columns.iter().all(|c| c.is_safe())
            && self.options.name_change.is_none()
    }
}

/// Represents changes to a single column.
///
/// `column` carries the full desired state; the flags mark which aspects
/// actually changed. A type change restates nullability and default even
/// when those did not change, so the rendered conversion is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnChange {
    /// Full desired column state
    pub column: ColumnInfo,
    /// Data type (or length/precision/scale) changed
    pub type_changed: bool,
    /// Nullability changed
    pub nullable_changed: bool,
    /// Default value changed
    pub default_changed: bool,
    /// Auto-increment state changed
    pub auto_increment_changed: bool,
}

impl ColumnChange {
    /// Creates a change record with no aspects flagged
    pub fn new(column: ColumnInfo) -> Self {
        Self {
            column,
            type_changed: false,
            nullable_changed: false,
            default_changed: false,
            auto_increment_changed: false,
        }
    }

    /// Marks the data type as changed
    pub fn with_type_change(mut self) -> Self {
        self.type_changed = true;
        self
    }

    /// Marks nullability as changed
    pub fn with_nullable_change(mut self) -> Self {
        self.nullable_changed = true;
        self
    }

    /// Marks the default value as changed
    pub fn with_default_change(mut self) -> Self {
        self.default_changed = true;
        self
    }

    /// Marks the auto-increment state as changed
    pub fn with_auto_increment_change(mut self) -> Self {
        self.auto_increment_changed = true;
        self
    }

    /// Returns true if no aspect is flagged
    pub fn is_empty(&self) -> bool {
        !self.type_changed
            && !self.nullable_changed
            && !self.default_changed
            && !self.auto_increment_changed
    }

    /// Returns true if the change carries no data loss risk.
    /// Tightening a column to NOT NULL can fail on existing rows.
    pub fn is_safe(&self) -> bool {
        !(self.nullable_changed && !self.column.nullable) && !self.type_changed
    }
}

/// A column rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

impl ColumnRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// An index redefinition: the old index is dropped by name, the new one
/// created from its definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexChange {
    /// Old index definition (dropped)
    pub old: IndexInfo,
    /// New index definition (created)
    pub new: IndexInfo,
}

impl IndexChange {
    pub fn new(old: IndexInfo, new: IndexInfo) -> Self {
        Self { old, new }
    }
}

/// A grouped foreign key definition, as rendered into an ADD CONSTRAINT
/// clause. Distinct from the flat per-column usage rows introspection
/// returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    /// Constraint name; generated by the backend when absent
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_schema: Option<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,
}

impl ForeignKeyDef {
    /// Creates a single-column foreign key with default actions
    pub fn new(
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            columns: vec![column.into()],
            referenced_schema: None,
            referenced_table: referenced_table.into(),
            referenced_columns: vec![referenced_column.into()],
            on_update: ForeignKeyAction::NoAction,
            on_delete: ForeignKeyAction::NoAction,
        }
    }

    /// Sets the constraint name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ON UPDATE action
    pub fn with_on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }

    /// Sets the ON DELETE action
    pub fn with_on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }
}

/// Table-level option changes. Each entry is `(old, new)`; `None` means the
/// option is untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableOptionsDiff {
    /// Table rename; always rendered as the last statement of a batch
    pub name_change: Option<(String, String)>,
    /// Comment change
    pub comment_change: Option<(Option<String>, Option<String>)>,
    /// Storage engine change (engine-capable backends only)
    pub engine_change: Option<(Option<String>, Option<String>)>,
    /// Default collation change
    pub collation_change: Option<(Option<String>, Option<String>)>,
    /// Auto-increment counter change
    pub auto_increment_change: Option<(Option<i64>, Option<i64>)>,
}

impl TableOptionsDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no option changed
    pub fn is_empty(&self) -> bool {
        self.name_change.is_none()
            && self.comment_change.is_none()
            && self.engine_change.is_none()
            && self.collation_change.is_none()
            && self.auto_increment_change.is_none()
    }
}
