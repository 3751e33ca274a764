//! Schema introspection traits and types

use crate::{BackendAttr, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Schema introspection interface
///
/// All descriptors are rebuilt on every call; nothing here caches. A missing
/// object is an expected outcome and surfaces as `Ok(None)` or an empty list,
/// never as an error.
#[async_trait]
pub trait SchemaIntrospection: Send + Sync {
    /// Get the full catalog structure.
    ///
    /// Every schema the backend exposes appears in the result. Schemas named
    /// in `schemas` are hydrated with their tables, views, triggers, and
    /// routines; the rest come back with empty collections so callers can
    /// enumerate the whole catalog without paying for it.
    async fn get_structure(&self, schemas: &HashSet<String>) -> Result<Vec<SchemaStructure>>;

    /// Get columns for a table
    async fn get_table_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>>;

    /// Get indexes for a table
    async fn get_table_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<IndexInfo>>;

    /// Get foreign key usage rows for a table
    async fn get_key_usage(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<KeyUsageInfo>>;

    /// Reconstruct CREATE TABLE DDL for a table, if it exists
    async fn get_table_ddl(&self, schema: Option<&str>, table: &str) -> Result<Option<String>>;

    /// Get a view with its definition, if it exists
    async fn get_view(&self, schema: Option<&str>, name: &str) -> Result<Option<ViewInfo>>;

    /// Get a routine with its definition, if it exists.
    ///
    /// Body, language, and definer extraction is best-effort; fields the
    /// catalog does not expose stay `None`.
    async fn get_routine(
        &self,
        schema: Option<&str>,
        name: &str,
        kind: RoutineKind,
    ) -> Result<Option<RoutineInfo>>;

    /// Get a trigger on a table, if it exists
    async fn get_trigger(
        &self,
        schema: Option<&str>,
        table: &str,
        name: &str,
    ) -> Result<Option<TriggerInfo>>;

    /// List database users/roles
    async fn get_users(&self) -> Result<Vec<UserInfo>>;

    /// List server variables/settings
    async fn get_variables(&self) -> Result<Vec<VariableInfo>>;

    /// List available storage engines.
    /// Default returns an empty list since most backends have exactly one.
    async fn get_engines(&self) -> Result<Vec<EngineInfo>> {
        Ok(Vec::new())
    }

    /// Get server version information
    async fn get_version(&self) -> Result<VersionInfo>;

    /// List running sessions/processes
    async fn get_processes(&self) -> Result<Vec<ProcessInfo>>;

    /// Resolve internal table identifiers to schema-qualified names.
    ///
    /// Result columns carry the backend's internal table id; nest-mode
    /// shaping uses this reverse lookup to turn ids into names. Unknown ids
    /// are simply absent from the map.
    async fn resolve_table_ids(&self, ids: &[u32]) -> Result<HashMap<u32, TableRef>>;
}

/// One schema's slice of the catalog structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaStructure {
    pub name: String,
    pub tables: Vec<TableInfo>,
    pub views: Vec<ViewInfo>,
    pub triggers: Vec<TriggerInfo>,
    pub procedures: Vec<RoutineInfo>,
    pub functions: Vec<RoutineInfo>,
    pub trigger_functions: Vec<RoutineInfo>,
    /// Scheduled events; backends without a scheduler report `Unsupported`
    pub events: BackendAttr<Vec<EventInfo>>,
}

impl SchemaStructure {
    /// A present-but-not-hydrated entry for a schema outside the requested set
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            views: Vec::new(),
            triggers: Vec::new(),
            procedures: Vec::new(),
            functions: Vec::new(),
            trigger_functions: Vec::new(),
            events: BackendAttr::Absent,
        }
    }

    /// Whether any collection was hydrated
    pub fn is_hydrated(&self) -> bool {
        !self.tables.is_empty()
            || !self.views.is_empty()
            || !self.triggers.is_empty()
            || !self.procedures.is_empty()
            || !self.functions.is_empty()
            || !self.trigger_functions.is_empty()
    }
}

/// Table information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: Option<String>,
    pub name: String,
    pub table_type: TableType,
    /// Planner row estimate, not an exact count
    pub row_estimate: Option<i64>,
    pub size_bytes: Option<i64>,
    pub comment: Option<String>,
    /// Storage engine; single-engine backends report `Unsupported`
    pub engine: BackendAttr<String>,
    pub collation: BackendAttr<String>,
}

/// Table type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    Table,
    View,
    MaterializedView,
    ForeignTable,
    Temporary,
    System,
}

/// View information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub schema: Option<String>,
    pub name: String,
    pub is_materialized: bool,
    pub definition: Option<String>,
    pub comment: Option<String>,
}

/// Column information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub ordinal: usize,
    /// Dialect-normalized logical type (upper case)
    pub data_type: String,
    /// Whether the column holds arrays of `data_type`
    pub is_array: bool,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub max_length: Option<i64>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_unique: bool,
    /// ON UPDATE expression; backends without one report `Unsupported`
    pub on_update: BackendAttr<String>,
    pub comment: Option<String>,
}

/// Index information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
    pub index_type: String,
    /// Distinct-value estimate; backends that don't track it report `Unsupported`
    pub cardinality: BackendAttr<i64>,
    pub comment: Option<String>,
}

/// One foreign key usage row: a single column-to-column reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyUsageInfo {
    pub schema: String,
    pub table: String,
    pub column: String,
    /// 1-based position of the column within its constraint
    pub position: i32,
    pub constraint_name: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_update: ForeignKeyAction,
    pub on_delete: ForeignKeyAction,
}

/// Foreign key action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    /// Parse a catalog rule string ("NO ACTION", "CASCADE", ...)
    pub fn from_rule(rule: &str) -> Self {
        match rule.to_ascii_uppercase().as_str() {
            "RESTRICT" => Self::Restrict,
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            _ => Self::NoAction,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// How a column participates in keys, in catalog shorthand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKey {
    /// Part of the primary key
    Pri,
    /// Covered by a unique index
    Uni,
    /// Covered by a non-unique index
    Mul,
}

impl ColumnKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pri => "pri",
            Self::Uni => "uni",
            Self::Mul => "mul",
        }
    }
}

/// Routine kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
    Function,
    Procedure,
    /// Function invoked by triggers rather than callers
    TriggerFunction,
}

/// Routine (function/procedure) information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineInfo {
    pub schema: Option<String>,
    pub name: String,
    pub kind: RoutineKind,
    pub language: Option<String>,
    pub return_type: Option<String>,
    /// Raw argument signature as the catalog prints it
    pub arguments: Option<String>,
    pub definer: Option<String>,
    pub definition: Option<String>,
    pub comment: Option<String>,
}

/// Trigger information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerInfo {
    pub schema: Option<String>,
    pub name: String,
    pub table_name: String,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub for_each: TriggerForEach,
    pub definer: Option<String>,
    /// Invoked statement or function call, when the catalog exposes it
    pub definition: Option<String>,
    pub enabled: bool,
    pub comment: Option<String>,
}

/// Trigger timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::InsteadOf => "INSTEAD OF",
        }
    }
}

/// Trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl TriggerEvent {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
        }
    }
}

/// Trigger for each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerForEach {
    Row,
    Statement,
}

impl TriggerForEach {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Row => "FOR EACH ROW",
            Self::Statement => "FOR EACH STATEMENT",
        }
    }
}

/// Scheduled event information (scheduler-capable backends only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub schema: Option<String>,
    pub name: String,
    pub definer: Option<String>,
    pub schedule: Option<String>,
    pub enabled: bool,
    pub definition: Option<String>,
    pub comment: Option<String>,
}

/// Database user/role information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    /// Host scope; backends without per-host accounts report `Unsupported`
    pub host: BackendAttr<String>,
    pub is_superuser: bool,
    pub can_create_db: bool,
}

/// Server variable/setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
    pub context: Option<String>,
}

/// Storage engine information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub name: String,
    pub comment: Option<String>,
    pub is_default: bool,
    pub supports_transactions: bool,
}

/// Parsed server version banner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version number (e.g., "16.2")
    pub number: String,
    /// Product name (e.g., "PostgreSQL")
    pub name: String,
    pub arch: Option<String>,
    pub os: Option<String>,
}

/// A running session/process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub id: i64,
    pub user: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub application: Option<String>,
    pub state: Option<String>,
    pub query: Option<String>,
}

/// A schema-qualified table name, as resolved from an internal table id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}
