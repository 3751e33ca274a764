//! Raw SQL execution and result shaping
//!
//! The common execution path everything funnels into: split the input,
//! execute each statement sequentially, time it, and shape the results.
//! Shaping optionally nests row keys by originating table and enriches
//! field metadata from the catalog; both are best-effort and never fail
//! the execution itself.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glot_core::{
    ColumnKey, Connection, DialectInfo, IndexInfo, KeyUsageInfo, QueryResult, Result,
    SchemaIntrospection,
};
use serde::{Deserialize, Serialize};

use crate::origin::resolve_origin;

use super::splitter::split_statements;

/// Options recognized by [`RawExecutor::execute`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteOptions {
    /// Key rows by `"<table>.<column>"` instead of flat column names
    pub nest: bool,
    /// Enrich fields with column/index/key metadata from the catalog
    pub details: bool,
    /// Split the input on statement terminators before execution
    pub split: bool,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nest(mut self, nest: bool) -> Self {
        self.nest = nest;
        self
    }

    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    pub fn with_split(mut self, split: bool) -> Self {
        self.split = split;
        self
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            nest: false,
            details: false,
            split: true,
        }
    }
}

/// Per-result-column metadata after shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub table_alias: Option<String>,
    /// Dialect-normalized logical type
    pub data_type: String,
    pub is_array: bool,
    /// Declared character length, merged in details mode
    pub length: Option<i64>,
    /// Key participation marker, merged in details mode
    pub key: Option<ColumnKey>,
}

/// Command status for a statement that returned no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReport {
    pub affected_rows: u64,
}

/// One executed statement with its shaped output
#[derive(Debug, Clone, Serialize)]
pub struct ShapedResult {
    /// The SQL that was executed
    pub sql: String,
    /// Rows as JSON objects; nest mode keys them by `"<table>.<column>"`
    pub rows: Vec<serde_json::Value>,
    /// Present when the statement produced a command status instead of rows
    pub report: Option<CommandReport>,
    /// Always present, possibly empty
    pub fields: Vec<FieldDescriptor>,
    /// Foreign key usage rows, present only in details mode
    pub keys: Option<Vec<KeyUsageInfo>>,
    /// Wall-clock execution time for this statement
    pub duration: Duration,
}

/// Outcome of an execution: one statement yields a single result, several
/// yield an always-ordered sequence
#[derive(Debug, Clone)]
pub enum ExecuteOutcome {
    Single(ShapedResult),
    Sequence(Vec<ShapedResult>),
}

impl ExecuteOutcome {
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Sequence(results) => results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first(&self) -> Option<&ShapedResult> {
        match self {
            Self::Single(result) => Some(result),
            Self::Sequence(results) => results.first(),
        }
    }

    pub fn into_vec(self) -> Vec<ShapedResult> {
        match self {
            Self::Single(result) => vec![result],
            Self::Sequence(results) => results,
        }
    }
}

/// Raw statement executor
#[derive(Debug, Clone, Default)]
pub struct RawExecutor;

impl RawExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute raw SQL text against a connection.
    ///
    /// With `split` on, the text is partitioned into statements and each is
    /// executed strictly in order; later statements may depend on earlier
    /// ones. The first statement error aborts the call and propagates.
    #[tracing::instrument(skip(self, conn, sql), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    pub async fn execute(
        &self,
        conn: &Arc<dyn Connection>,
        sql: &str,
        options: &ExecuteOptions,
    ) -> Result<ExecuteOutcome> {
        let statements = if options.split {
            split_statements(sql)
        } else {
            let trimmed = sql.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        };

        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            results.push(self.execute_one(conn, &statement, options).await?);
        }

        if results.len() == 1 {
            Ok(ExecuteOutcome::Single(results.remove(0)))
        } else {
            Ok(ExecuteOutcome::Sequence(results))
        }
    }

    async fn execute_one(
        &self,
        conn: &Arc<dyn Connection>,
        sql: &str,
        options: &ExecuteOptions,
    ) -> Result<ShapedResult> {
        let start = Instant::now();
        let result = conn.execute(sql, &[]).await.map_err(|e| {
            tracing::error!(error = %e, "statement execution failed");
            e
        })?;
        let duration = start.elapsed();

        match result.result {
            Some(query_result) => {
                Ok(self
                    .shape_query_result(conn, sql, query_result, options, duration)
                    .await)
            }
            None => Ok(ShapedResult {
                sql: sql.to_string(),
                rows: Vec::new(),
                report: Some(CommandReport {
                    affected_rows: result.affected_rows,
                }),
                fields: Vec::new(),
                keys: if options.details {
                    Some(Vec::new())
                } else {
                    None
                },
                duration,
            }),
        }
    }

    async fn shape_query_result(
        &self,
        conn: &Arc<dyn Connection>,
        sql: &str,
        result: QueryResult,
        options: &ExecuteOptions,
        duration: Duration,
    ) -> ShapedResult {
        let origin = resolve_origin(sql);
        let dialect = conn.dialect_info();
        let default_schema = conn.default_schema().map(|s| s.to_string());

        let mut fields: Vec<FieldDescriptor> = result
            .columns
            .iter()
            .map(|meta| {
                let (data_type, is_array) = normalize_type(&dialect, &meta.data_type);
                FieldDescriptor {
                    name: meta.name.clone(),
                    schema: origin
                        .as_ref()
                        .and_then(|o| o.schema.clone())
                        .or_else(|| default_schema.clone()),
                    table: origin.as_ref().map(|o| o.table.clone()),
                    table_alias: origin.as_ref().and_then(|o| o.alias.clone()),
                    data_type,
                    is_array,
                    length: None,
                    key: None,
                }
            })
            .collect();

        let introspection = conn.as_schema_introspection();

        if options.nest {
            if let Some(intro) = introspection {
                self.resolve_field_tables(intro, &result, &mut fields).await;
            }
        }

        let keys = if options.details {
            match introspection {
                Some(intro) => Some(self.enrich_fields(intro, &mut fields).await),
                None => Some(Vec::new()),
            }
        } else {
            None
        };

        let rows: Vec<serde_json::Value> = result
            .rows
            .iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                for (idx, meta) in result.columns.iter().enumerate() {
                    let value = row
                        .get(idx)
                        .map(|v| v.to_json())
                        .unwrap_or(serde_json::Value::Null);
                    let key = if options.nest {
                        match &fields[idx].table {
                            Some(table) => format!("{}.{}", table, meta.name),
                            None => meta.name.clone(),
                        }
                    } else {
                        meta.name.clone()
                    };
                    object.insert(key, value);
                }
                serde_json::Value::Object(object)
            })
            .collect();

        ShapedResult {
            sql: sql.to_string(),
            rows: guard_array_rows(rows),
            report: None,
            fields,
            keys,
            duration,
        }
    }

    /// Resolve internal table ids into schema-qualified names for nest mode.
    /// Failure falls back to the parsed origin.
    async fn resolve_field_tables(
        &self,
        intro: &dyn SchemaIntrospection,
        result: &QueryResult,
        fields: &mut [FieldDescriptor],
    ) {
        let ids: Vec<u32> = result
            .columns
            .iter()
            .filter_map(|c| c.table_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return;
        }

        match intro.resolve_table_ids(&ids).await {
            Ok(map) => {
                for (field, meta) in fields.iter_mut().zip(result.columns.iter()) {
                    if let Some(table_ref) = meta.table_id.and_then(|id| map.get(&id)) {
                        field.schema = Some(table_ref.schema.clone());
                        field.table = Some(table_ref.name.clone());
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "table id resolution failed, keeping parsed origin");
            }
        }
    }

    /// Merge column lengths, key markers, and foreign key usage into fields.
    /// Unresolved tables are skipped; lookup failures degrade silently.
    async fn enrich_fields(
        &self,
        intro: &dyn SchemaIntrospection,
        fields: &mut [FieldDescriptor],
    ) -> Vec<KeyUsageInfo> {
        let mut keys = Vec::new();
        let mut pairs: Vec<(Option<String>, String)> = Vec::new();
        for field in fields.iter() {
            let Some(table) = &field.table else { continue };
            let pair = (field.schema.clone(), table.clone());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }

        for (schema, table) in pairs {
            let schema_ref = schema.as_deref();
            let columns = match intro.get_table_columns(schema_ref, &table).await {
                Ok(columns) => columns,
                Err(e) => {
                    tracing::debug!(error = %e, table = %table, "column lookup failed, leaving fields bare");
                    continue;
                }
            };
            let indexes = intro
                .get_table_indexes(schema_ref, &table)
                .await
                .unwrap_or_default();
            let markers = key_markers(&indexes);

            for field in fields.iter_mut() {
                if field.schema != schema || field.table.as_deref() != Some(table.as_str()) {
                    continue;
                }
                if let Some(column) = columns.iter().find(|c| c.name == field.name) {
                    field.length = column.max_length;
                }
                field.key = markers.get(&field.name).copied();
            }

            match intro.get_key_usage(schema_ref, &table).await {
                Ok(mut usage) => keys.append(&mut usage),
                Err(e) => {
                    tracing::debug!(error = %e, table = %table, "key usage lookup failed");
                }
            }
        }

        keys
    }
}

fn normalize_type(dialect: &DialectInfo, raw: &str) -> (String, bool) {
    match dialect.array_types.resolve(raw) {
        Some(element) => (element, true),
        None => (raw.to_uppercase(), false),
    }
}

/// Strongest marker wins when a column sits in several indexes
fn key_markers(indexes: &[IndexInfo]) -> HashMap<String, ColumnKey> {
    fn rank(key: ColumnKey) -> u8 {
        match key {
            ColumnKey::Pri => 0,
            ColumnKey::Uni => 1,
            ColumnKey::Mul => 2,
        }
    }

    let mut markers: HashMap<String, ColumnKey> = HashMap::new();
    for index in indexes {
        let marker = if index.is_primary {
            ColumnKey::Pri
        } else if index.is_unique {
            ColumnKey::Uni
        } else {
            ColumnKey::Mul
        };
        for column in &index.columns {
            let entry = markers.entry(column.clone()).or_insert(marker);
            if rank(marker) < rank(*entry) {
                *entry = marker;
            }
        }
    }
    markers
}

/// A row that is itself an array is a nest-mode artifact; blank the rows
/// rather than leak it to callers expecting objects.
pub(super) fn guard_array_rows(rows: Vec<serde_json::Value>) -> Vec<serde_json::Value> {
    if rows.iter().any(|row| row.is_array()) {
        return Vec::new();
    }
    rows
}
