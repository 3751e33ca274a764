//! Table definition model for CREATE TABLE synthesis

use glot_core::{ColumnInfo, IndexInfo};
use serde::{Deserialize, Serialize};

use crate::diff::ForeignKeyDef;

/// Full description of a table to create
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name
    pub name: String,
    /// Schema name (optional)
    pub schema: Option<String>,
    /// Columns, in order
    pub columns: Vec<ColumnInfo>,
    /// Secondary indexes
    pub indexes: Vec<IndexInfo>,
    /// Foreign keys
    pub foreign_keys: Vec<ForeignKeyDef>,
    /// Table comment
    pub comment: Option<String>,
}

impl TableDefinition {
    /// Creates an empty definition with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set schema
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Builder: add a column, assigning its ordinal
    pub fn with_column(mut self, column: ColumnInfo) -> Self {
        let mut col = column;
        col.ordinal = self.columns.len();
        self.columns.push(col);
        self
    }

    /// Builder: add an index
    pub fn with_index(mut self, index: IndexInfo) -> Self {
        self.indexes.push(index);
        self
    }

    /// Builder: add a foreign key
    pub fn with_foreign_key(mut self, fk: ForeignKeyDef) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Builder: set the table comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Columns participating in the primary key, in definition order
    pub fn primary_key_columns(&self) -> Vec<&ColumnInfo> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }
}
