//! PostgreSQL schema introspection implementation
//!
//! Reads `information_schema` where it is sufficient and drops down to
//! `pg_catalog` for planner estimates, routine bodies, and index details.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use glot_core::{
    BackendAttr, ColumnInfo, Connection, ForeignKeyAction, IndexInfo, KeyUsageInfo, ProcessInfo,
    Result, RoutineInfo, RoutineKind, Row, SchemaIntrospection, SchemaStructure, TableInfo,
    TableRef, TableType, TriggerEvent, TriggerForEach, TriggerInfo, TriggerTiming, UserInfo,
    Value, VariableInfo, VersionInfo, ViewInfo,
};

use crate::PostgresConnection;
use crate::connection::escape_identifier;
use crate::dialect::PG_ARRAY_TYPES;

#[async_trait]
impl SchemaIntrospection for PostgresConnection {
    #[tracing::instrument(skip(self, schemas))]
    async fn get_structure(&self, schemas: &HashSet<String>) -> Result<Vec<SchemaStructure>> {
        let result = self
            .query(
                "SELECT schema_name
                 FROM information_schema.schemata
                 WHERE schema_name NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
                 ORDER BY schema_name",
                &[],
            )
            .await?;

        let mut structures = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let name = row
                .get(0)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            if !schemas.contains(&name) {
                structures.push(SchemaStructure::empty(name));
                continue;
            }

            let tables = self.load_tables(&name).await?;
            let views = self.load_views(&name).await?;
            let triggers = self.load_triggers(&name).await?;
            let (functions, procedures, trigger_functions) = self.load_routines(&name).await?;

            structures.push(SchemaStructure {
                name,
                tables,
                views,
                triggers,
                procedures,
                functions,
                trigger_functions,
                // No scheduler in PostgreSQL
                events: BackendAttr::Unsupported,
            });
        }

        tracing::debug!(
            schema_count = structures.len(),
            hydrated = structures.iter().filter(|s| s.is_hydrated()).count(),
            "catalog structure loaded"
        );
        Ok(structures)
    }

    #[tracing::instrument(skip(self))]
    async fn get_table_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<ColumnInfo>> {
        let schema = self.effective_schema(schema);
        let result = self
            .query(
                "SELECT
                    column_name,
                    ordinal_position,
                    data_type,
                    udt_name,
                    is_nullable,
                    column_default,
                    character_maximum_length,
                    numeric_precision,
                    numeric_scale,
                    is_identity
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?;

        let mut columns: Vec<ColumnInfo> = result
            .rows
            .iter()
            .map(|row| {
                let name = row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string();
                let ordinal = row.get(1).and_then(|v| v.as_i64()).unwrap_or(0) as usize;
                let raw_type = row.get(2).and_then(|v| v.as_str()).unwrap_or("");
                let udt_name = row.get(3).and_then(|v| v.as_str()).unwrap_or("");
                let nullable = row.get(4).and_then(|v| v.as_str()).unwrap_or("NO") == "YES";
                let default_value = row.get(5).and_then(|v| v.as_str()).map(|s| s.to_string());
                let max_length = row.get(6).and_then(|v| v.as_i64());
                let precision = row.get(7).and_then(|v| v.as_i64()).map(|i| i as i32);
                let scale = row.get(8).and_then(|v| v.as_i64()).map(|i| i as i32);
                let is_identity = row.get(9).and_then(|v| v.as_str()).unwrap_or("NO") == "YES";

                let (data_type, is_array) = normalize_column_type(raw_type, udt_name);
                let is_auto_increment = is_identity
                    || default_value
                        .as_ref()
                        .map(|default| default.to_lowercase().contains("nextval("))
                        .unwrap_or(false);

                ColumnInfo {
                    name,
                    ordinal,
                    data_type,
                    is_array,
                    nullable,
                    default_value,
                    max_length,
                    precision,
                    scale,
                    is_primary_key: false,
                    is_auto_increment,
                    is_unique: false,
                    on_update: BackendAttr::Unsupported,
                    comment: None,
                }
            })
            .collect();

        // Key flags come from the index catalog
        if !columns.is_empty() {
            let indexes = self.get_table_indexes(Some(schema), table).await?;
            for column in &mut columns {
                for index in &indexes {
                    if index.is_primary && index.columns.contains(&column.name) {
                        column.is_primary_key = true;
                    }
                    if index.is_unique
                        && !index.is_primary
                        && index.columns.len() == 1
                        && index.columns[0] == column.name
                    {
                        column.is_unique = true;
                    }
                }
            }
        }

        Ok(columns)
    }

    #[tracing::instrument(skip(self))]
    async fn get_table_indexes(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<IndexInfo>> {
        let schema = self.effective_schema(schema);
        let result = self
            .query(
                "SELECT
                    i.relname AS index_name,
                    ix.indisunique AS is_unique,
                    ix.indisprimary AS is_primary,
                    array_agg(a.attname ORDER BY array_position(ix.indkey, a.attnum)) AS columns,
                    am.amname AS index_method,
                    obj_description(i.oid, 'pg_class') AS comment
                 FROM pg_class t
                 JOIN pg_index ix ON t.oid = ix.indrelid
                 JOIN pg_class i ON i.oid = ix.indexrelid
                 JOIN pg_am am ON am.oid = i.relam
                 JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
                 JOIN pg_namespace n ON n.oid = t.relnamespace
                 WHERE n.nspname = $1 AND t.relname = $2
                 GROUP BY i.oid, i.relname, ix.indisunique, ix.indisprimary, am.amname
                 ORDER BY i.relname",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?;

        let indexes = result
            .rows
            .iter()
            .filter_map(|row| {
                let name = row.get(0).and_then(|v| v.as_str())?.to_string();
                let is_unique = row.get(1).and_then(|v| v.as_bool()).unwrap_or(false);
                let is_primary = row.get(2).and_then(|v| v.as_bool()).unwrap_or(false);
                let columns = row
                    .get(3)
                    .and_then(|v| v.as_string_array())
                    .unwrap_or_default();
                let index_type = row
                    .get(4)
                    .and_then(|v| v.as_str())
                    .unwrap_or("btree")
                    .to_string();
                let comment = row.get(5).and_then(|v| v.as_str()).map(|s| s.to_string());

                Some(IndexInfo {
                    name,
                    columns,
                    is_unique,
                    is_primary,
                    index_type,
                    // PostgreSQL tracks estimates per table, not per index
                    cardinality: BackendAttr::Unsupported,
                    comment,
                })
            })
            .collect();

        Ok(indexes)
    }

    #[tracing::instrument(skip(self))]
    async fn get_key_usage(&self, schema: Option<&str>, table: &str) -> Result<Vec<KeyUsageInfo>> {
        let schema = self.effective_schema(schema);
        let result = self
            .query(
                "SELECT
                    kcu.table_schema,
                    kcu.table_name,
                    kcu.column_name,
                    kcu.ordinal_position,
                    kcu.constraint_name,
                    ccu.table_schema AS referenced_schema,
                    ccu.table_name AS referenced_table,
                    ccu.column_name AS referenced_column,
                    rc.update_rule,
                    rc.delete_rule
                 FROM information_schema.table_constraints tc
                 JOIN information_schema.key_column_usage kcu
                   ON tc.constraint_name = kcu.constraint_name
                   AND tc.table_schema = kcu.table_schema
                 JOIN information_schema.referential_constraints rc
                   ON rc.constraint_name = tc.constraint_name
                   AND rc.constraint_schema = tc.table_schema
                 JOIN information_schema.constraint_column_usage ccu
                   ON ccu.constraint_name = tc.constraint_name
                   AND ccu.table_schema = tc.table_schema
                 WHERE tc.constraint_type = 'FOREIGN KEY'
                   AND tc.table_schema = $1
                   AND tc.table_name = $2
                 ORDER BY kcu.constraint_name, kcu.ordinal_position",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                ],
            )
            .await?;

        let keys = result
            .rows
            .iter()
            .map(|row| {
                let get_text = |idx: usize| {
                    row.get(idx)
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string()
                };

                KeyUsageInfo {
                    schema: get_text(0),
                    table: get_text(1),
                    column: get_text(2),
                    position: row.get(3).and_then(|v| v.as_i64()).unwrap_or(0) as i32,
                    constraint_name: get_text(4),
                    referenced_schema: get_text(5),
                    referenced_table: get_text(6),
                    referenced_column: get_text(7),
                    on_update: ForeignKeyAction::from_rule(
                        row.get(8).and_then(|v| v.as_str()).unwrap_or("NO ACTION"),
                    ),
                    on_delete: ForeignKeyAction::from_rule(
                        row.get(9).and_then(|v| v.as_str()).unwrap_or("NO ACTION"),
                    ),
                }
            })
            .collect();

        Ok(keys)
    }

    #[tracing::instrument(skip(self))]
    async fn get_table_ddl(&self, schema: Option<&str>, table: &str) -> Result<Option<String>> {
        let schema = self.effective_schema(schema);
        let columns = self.get_table_columns(Some(schema), table).await?;
        if columns.is_empty() {
            return Ok(None);
        }

        let indexes = self.get_table_indexes(Some(schema), table).await?;
        let keys = self.get_key_usage(Some(schema), table).await?;
        Ok(Some(build_create_table(
            schema, table, &columns, &indexes, &keys,
        )))
    }

    async fn get_view(&self, schema: Option<&str>, name: &str) -> Result<Option<ViewInfo>> {
        let schema = self.effective_schema(schema);

        let result = self
            .query(
                "SELECT view_definition
                 FROM information_schema.views
                 WHERE table_schema = $1 AND table_name = $2",
                &[
                    Value::String(schema.to_string()),
                    Value::String(name.to_string()),
                ],
            )
            .await?;
        if let Some(row) = result.rows.first() {
            // Definition is NULL without ownership; pg_get_viewdef still works
            let definition = match row.get(0).and_then(|v| v.as_str()) {
                Some(definition) => Some(clean_view_definition(definition)),
                None => self.view_definition_fallback(schema, name).await?,
            };
            return Ok(Some(ViewInfo {
                schema: Some(schema.to_string()),
                name: name.to_string(),
                is_materialized: false,
                definition,
                comment: None,
            }));
        }

        let result = self
            .query(
                "SELECT definition
                 FROM pg_matviews
                 WHERE schemaname = $1 AND matviewname = $2",
                &[
                    Value::String(schema.to_string()),
                    Value::String(name.to_string()),
                ],
            )
            .await?;
        if let Some(row) = result.rows.first() {
            let definition = row
                .get(0)
                .and_then(|v| v.as_str())
                .map(clean_view_definition);
            return Ok(Some(ViewInfo {
                schema: Some(schema.to_string()),
                name: name.to_string(),
                is_materialized: true,
                definition,
                comment: None,
            }));
        }

        Ok(None)
    }

    async fn get_routine(
        &self,
        schema: Option<&str>,
        name: &str,
        kind: RoutineKind,
    ) -> Result<Option<RoutineInfo>> {
        let schema = self.effective_schema(schema);
        let kind_filter = match kind {
            RoutineKind::Function => "p.prokind = 'f' AND p.prorettype <> 'trigger'::regtype",
            RoutineKind::Procedure => "p.prokind = 'p'",
            RoutineKind::TriggerFunction => {
                "p.prokind = 'f' AND p.prorettype = 'trigger'::regtype"
            }
        };
        let sql = format!(
            "SELECT
                p.proname,
                l.lanname AS language,
                pg_get_function_identity_arguments(p.oid) AS arguments,
                pg_catalog.format_type(p.prorettype, NULL) AS return_type,
                r.rolname AS definer,
                p.prosrc AS definition
             FROM pg_proc p
             JOIN pg_namespace n ON p.pronamespace = n.oid
             LEFT JOIN pg_language l ON l.oid = p.prolang
             LEFT JOIN pg_roles r ON r.oid = p.proowner
             WHERE n.nspname = $1 AND p.proname = $2 AND {}
             LIMIT 1",
            kind_filter
        );

        let result = self
            .query(
                &sql,
                &[
                    Value::String(schema.to_string()),
                    Value::String(name.to_string()),
                ],
            )
            .await?;

        let Some(row) = result.rows.first() else {
            return Ok(None);
        };

        Ok(Some(RoutineInfo {
            schema: Some(schema.to_string()),
            name: name.to_string(),
            kind,
            language: row.get(1).and_then(|v| v.as_str()).map(|s| s.to_string()),
            return_type: row.get(3).and_then(|v| v.as_str()).map(|s| s.to_string()),
            arguments: row.get(2).and_then(|v| v.as_str()).map(|s| s.to_string()),
            definer: row.get(4).and_then(|v| v.as_str()).map(|s| s.to_string()),
            // prosrc is the bare body, which is what DDL synthesis wraps
            definition: row
                .get(5)
                .and_then(|v| v.as_str())
                .map(|s| s.trim_matches('\n').to_string()),
            comment: None,
        }))
    }

    async fn get_trigger(
        &self,
        schema: Option<&str>,
        table: &str,
        name: &str,
    ) -> Result<Option<TriggerInfo>> {
        let schema = self.effective_schema(schema);
        let result = self
            .query(
                "SELECT
                    trigger_name,
                    event_object_table,
                    action_timing,
                    event_manipulation,
                    action_orientation,
                    action_statement
                 FROM information_schema.triggers
                 WHERE trigger_schema = $1 AND event_object_table = $2 AND trigger_name = $3
                 ORDER BY event_manipulation",
                &[
                    Value::String(schema.to_string()),
                    Value::String(table.to_string()),
                    Value::String(name.to_string()),
                ],
            )
            .await?;

        let mut triggers = fold_trigger_rows(schema, &result.rows);
        Ok(triggers.pop())
    }

    async fn get_users(&self) -> Result<Vec<UserInfo>> {
        let result = self
            .query(
                "SELECT usename, usesuper, usecreatedb FROM pg_user ORDER BY usename",
                &[],
            )
            .await?;

        let users = result
            .rows
            .iter()
            .map(|row| UserInfo {
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                // Accounts are not scoped by client host
                host: BackendAttr::Unsupported,
                is_superuser: row.get(1).and_then(|v| v.as_bool()).unwrap_or(false),
                can_create_db: row.get(2).and_then(|v| v.as_bool()).unwrap_or(false),
            })
            .collect();

        Ok(users)
    }

    async fn get_variables(&self) -> Result<Vec<VariableInfo>> {
        let result = self
            .query(
                "SELECT name, setting, unit, context FROM pg_settings ORDER BY name",
                &[],
            )
            .await?;

        let variables = result
            .rows
            .iter()
            .map(|row| VariableInfo {
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                value: row
                    .get(1)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                unit: row.get(2).and_then(|v| v.as_str()).map(|s| s.to_string()),
                context: row.get(3).and_then(|v| v.as_str()).map(|s| s.to_string()),
            })
            .collect();

        Ok(variables)
    }

    async fn get_version(&self) -> Result<VersionInfo> {
        let result = self.query("SELECT version()", &[]).await?;
        let banner = result
            .rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        Ok(parse_version_banner(banner))
    }

    async fn get_processes(&self) -> Result<Vec<ProcessInfo>> {
        let result = self
            .query(
                "SELECT pid, usename, client_addr::text AS host, datname, application_name, state, query
                 FROM pg_stat_activity
                 ORDER BY pid",
                &[],
            )
            .await?;

        let processes = result
            .rows
            .iter()
            .map(|row| {
                let get_text = |idx: usize| {
                    row.get(idx)
                        .and_then(|v| v.as_str())
                        .filter(|s| !s.is_empty())
                        .map(|s| s.to_string())
                };

                ProcessInfo {
                    id: row.get(0).and_then(|v| v.as_i64()).unwrap_or(0),
                    user: get_text(1),
                    host: get_text(2),
                    database: get_text(3),
                    application: get_text(4),
                    state: get_text(5),
                    query: get_text(6),
                }
            })
            .collect();

        Ok(processes)
    }

    async fn resolve_table_ids(&self, ids: &[u32]) -> Result<HashMap<u32, TableRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        // oids are numeric, so an inline list is safe and avoids needing
        // array parameter support
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT c.oid::bigint, n.nspname, c.relname
             FROM pg_class c
             JOIN pg_namespace n ON n.oid = c.relnamespace
             WHERE c.oid IN ({})",
            id_list
        );

        let result = self.query(&sql, &[]).await?;

        let mut resolved = HashMap::with_capacity(result.rows.len());
        for row in &result.rows {
            let Some(id) = row.get(0).and_then(|v| v.as_i64()) else {
                continue;
            };
            let schema = row
                .get(1)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let name = row
                .get(2)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            resolved.insert(id as u32, TableRef { schema, name });
        }

        Ok(resolved)
    }
}

impl PostgresConnection {
    /// Explicit schema, else the session's configured schema, else "public"
    fn effective_schema<'a>(&'a self, schema: Option<&'a str>) -> &'a str {
        schema.or_else(|| self.default_schema()).unwrap_or("public")
    }

    async fn load_tables(&self, schema: &str) -> Result<Vec<TableInfo>> {
        let result = self
            .query(
                "SELECT
                    t.table_name,
                    t.table_type,
                    CASE WHEN c.reltuples >= 0 THEN c.reltuples::bigint END AS row_estimate,
                    CASE WHEN c.relkind IN ('r', 'p', 'm', 't')
                         THEN pg_total_relation_size(c.oid)
                    END AS size_bytes,
                    obj_description(c.oid, 'pg_class') AS comment
                 FROM information_schema.tables t
                 LEFT JOIN pg_namespace n ON n.nspname = t.table_schema
                 LEFT JOIN pg_class c ON c.relnamespace = n.oid AND c.relname = t.table_name
                 WHERE t.table_schema = $1
                 ORDER BY t.table_name",
                &[Value::String(schema.to_string())],
            )
            .await?;

        let tables = result
            .rows
            .iter()
            .map(|row| TableInfo {
                schema: Some(schema.to_string()),
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                table_type: parse_table_type(row.get(1).and_then(|v| v.as_str()).unwrap_or("")),
                row_estimate: row.get(2).and_then(|v| v.as_i64()),
                size_bytes: row.get(3).and_then(|v| v.as_i64()),
                comment: row.get(4).and_then(|v| v.as_str()).map(|s| s.to_string()),
                engine: BackendAttr::Unsupported,
                collation: BackendAttr::Unsupported,
            })
            .collect();

        Ok(tables)
    }

    async fn load_views(&self, schema: &str) -> Result<Vec<ViewInfo>> {
        let result = self
            .query(
                "SELECT table_name, view_definition
                 FROM information_schema.views
                 WHERE table_schema = $1
                 ORDER BY table_name",
                &[Value::String(schema.to_string())],
            )
            .await?;

        let mut views: Vec<ViewInfo> = result
            .rows
            .iter()
            .map(|row| ViewInfo {
                schema: Some(schema.to_string()),
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                is_materialized: false,
                definition: row
                    .get(1)
                    .and_then(|v| v.as_str())
                    .map(clean_view_definition),
                comment: None,
            })
            .collect();

        // Materialized views live in their own catalog
        let result = self
            .query(
                "SELECT matviewname, definition
                 FROM pg_matviews
                 WHERE schemaname = $1
                 ORDER BY matviewname",
                &[Value::String(schema.to_string())],
            )
            .await?;

        views.extend(result.rows.iter().map(|row| ViewInfo {
            schema: Some(schema.to_string()),
            name: row
                .get(0)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            is_materialized: true,
            definition: row
                .get(1)
                .and_then(|v| v.as_str())
                .map(clean_view_definition),
            comment: None,
        }));

        Ok(views)
    }

    async fn load_triggers(&self, schema: &str) -> Result<Vec<TriggerInfo>> {
        let result = self
            .query(
                "SELECT
                    trigger_name,
                    event_object_table,
                    action_timing,
                    event_manipulation,
                    action_orientation,
                    action_statement
                 FROM information_schema.triggers
                 WHERE trigger_schema = $1
                 ORDER BY trigger_name, event_object_table",
                &[Value::String(schema.to_string())],
            )
            .await?;

        Ok(fold_trigger_rows(schema, &result.rows))
    }

    /// One pass over pg_proc, split into functions, procedures, and
    /// trigger functions
    async fn load_routines(
        &self,
        schema: &str,
    ) -> Result<(Vec<RoutineInfo>, Vec<RoutineInfo>, Vec<RoutineInfo>)> {
        let result = self
            .query(
                "SELECT
                    p.proname,
                    p.prokind::text,
                    l.lanname AS language,
                    pg_get_function_identity_arguments(p.oid) AS arguments,
                    pg_catalog.format_type(p.prorettype, NULL) AS return_type,
                    p.prorettype = 'trigger'::regtype AS returns_trigger
                 FROM pg_proc p
                 JOIN pg_namespace n ON p.pronamespace = n.oid
                 LEFT JOIN pg_language l ON l.oid = p.prolang
                 WHERE n.nspname = $1 AND p.prokind IN ('f', 'p')
                 ORDER BY p.proname",
                &[Value::String(schema.to_string())],
            )
            .await?;

        let mut functions = Vec::new();
        let mut procedures = Vec::new();
        let mut trigger_functions = Vec::new();

        for row in &result.rows {
            let is_procedure = row.get(1).and_then(|v| v.as_str()) == Some("p");
            let returns_trigger = row.get(5).and_then(|v| v.as_bool()).unwrap_or(false);
            let kind = if is_procedure {
                RoutineKind::Procedure
            } else if returns_trigger {
                RoutineKind::TriggerFunction
            } else {
                RoutineKind::Function
            };

            let routine = RoutineInfo {
                schema: Some(schema.to_string()),
                name: row
                    .get(0)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                kind,
                language: row.get(2).and_then(|v| v.as_str()).map(|s| s.to_string()),
                return_type: row.get(4).and_then(|v| v.as_str()).map(|s| s.to_string()),
                arguments: row.get(3).and_then(|v| v.as_str()).map(|s| s.to_string()),
                definer: None,
                // Bodies are fetched on demand by get_routine
                definition: None,
                comment: None,
            };

            match kind {
                RoutineKind::Function => functions.push(routine),
                RoutineKind::Procedure => procedures.push(routine),
                RoutineKind::TriggerFunction => trigger_functions.push(routine),
            }
        }

        Ok((functions, procedures, trigger_functions))
    }

    async fn view_definition_fallback(&self, schema: &str, name: &str) -> Result<Option<String>> {
        let result = self
            .query(
                "SELECT pg_get_viewdef(to_regclass($1), true)",
                &[Value::String(format!(
                    "{}.{}",
                    escape_identifier(schema),
                    escape_identifier(name)
                ))],
            )
            .await?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.get(0))
            .and_then(|v| v.as_str())
            .map(clean_view_definition))
    }
}

fn parse_table_type(raw: &str) -> TableType {
    match raw.to_ascii_uppercase().as_str() {
        "VIEW" => TableType::View,
        "FOREIGN" | "FOREIGN TABLE" => TableType::ForeignTable,
        "LOCAL TEMPORARY" => TableType::Temporary,
        "SYSTEM VIEW" => TableType::System,
        _ => TableType::Table,
    }
}

/// Normalize an information_schema type into the dialect's logical name.
/// Array columns report `ARRAY` with the element type in `udt_name`.
pub(crate) fn normalize_column_type(data_type: &str, udt_name: &str) -> (String, bool) {
    if data_type.eq_ignore_ascii_case("ARRAY") {
        let element = PG_ARRAY_TYPES
            .resolve(udt_name)
            .unwrap_or_else(|| udt_name.to_ascii_uppercase());
        return (element, true);
    }
    if data_type.eq_ignore_ascii_case("USER-DEFINED") {
        return (udt_name.to_ascii_uppercase(), false);
    }
    let lowered = data_type.to_ascii_lowercase();
    let base = lowered.strip_suffix(" without time zone").unwrap_or(&lowered);
    let canonical = match base {
        "character varying" => "VARCHAR",
        "character" => "CHAR",
        other => return (other.to_ascii_uppercase(), false),
    };
    (canonical.to_string(), false)
}

fn clean_view_definition(raw: &str) -> String {
    raw.trim().trim_end_matches(';').trim_end().to_string()
}

fn parse_trigger_timing(raw: &str) -> TriggerTiming {
    match raw.to_ascii_uppercase().as_str() {
        "AFTER" => TriggerTiming::After,
        "INSTEAD OF" => TriggerTiming::InsteadOf,
        _ => TriggerTiming::Before,
    }
}

fn parse_trigger_event(raw: &str) -> Option<TriggerEvent> {
    match raw.to_ascii_uppercase().as_str() {
        "INSERT" => Some(TriggerEvent::Insert),
        "UPDATE" => Some(TriggerEvent::Update),
        "DELETE" => Some(TriggerEvent::Delete),
        "TRUNCATE" => Some(TriggerEvent::Truncate),
        _ => None,
    }
}

fn parse_trigger_for_each(raw: &str) -> TriggerForEach {
    if raw.eq_ignore_ascii_case("STATEMENT") {
        TriggerForEach::Statement
    } else {
        TriggerForEach::Row
    }
}

/// information_schema.triggers emits one row per event; fold rows that
/// share a trigger name and table into one descriptor with merged events
pub(crate) fn fold_trigger_rows(schema: &str, rows: &[Row]) -> Vec<TriggerInfo> {
    let mut triggers: Vec<TriggerInfo> = Vec::new();

    for row in rows {
        let name = row
            .get(0)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let table_name = row
            .get(1)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let event = row.get(3).and_then(|v| v.as_str()).and_then(parse_trigger_event);

        if let Some(last) = triggers.last_mut() {
            if last.name == name && last.table_name == table_name {
                if let Some(event) = event {
                    if !last.events.contains(&event) {
                        last.events.push(event);
                    }
                }
                continue;
            }
        }

        triggers.push(TriggerInfo {
            schema: Some(schema.to_string()),
            name,
            table_name,
            timing: row
                .get(2)
                .and_then(|v| v.as_str())
                .map(parse_trigger_timing)
                .unwrap_or(TriggerTiming::Before),
            events: event.into_iter().collect(),
            for_each: row
                .get(4)
                .and_then(|v| v.as_str())
                .map(parse_trigger_for_each)
                .unwrap_or(TriggerForEach::Row),
            definer: None,
            definition: row.get(5).and_then(|v| v.as_str()).map(|s| s.to_string()),
            enabled: true,
            comment: None,
        });
    }

    triggers
}

/// Parse the `version()` banner, e.g.
/// "PostgreSQL 16.2 on x86_64-pc-linux-gnu, compiled by gcc ..., 64-bit"
pub(crate) fn parse_version_banner(banner: &str) -> VersionInfo {
    let mut words = banner.split_whitespace();
    let name = words.next().unwrap_or("PostgreSQL").to_string();
    let number = words.next().unwrap_or("").to_string();

    let mut arch = None;
    let mut os = None;
    if let Some(rest) = banner.split(" on ").nth(1) {
        let triple = rest.split([',', ' ']).next().unwrap_or("");
        let mut parts = triple.split('-');
        arch = parts.next().filter(|p| !p.is_empty()).map(|p| p.to_string());
        // Target triples read arch-vendor-os
        os = parts.nth(1).filter(|p| !p.is_empty()).map(|p| p.to_string());
    }

    VersionInfo {
        number,
        name,
        arch,
        os,
    }
}

/// Rebuild CREATE TABLE DDL from the column, index, and key catalogs
pub(crate) fn build_create_table(
    schema: &str,
    table: &str,
    columns: &[ColumnInfo],
    indexes: &[IndexInfo],
    keys: &[KeyUsageInfo],
) -> String {
    let qualified = format!("{}.{}", escape_identifier(schema), escape_identifier(table));
    let mut lines = Vec::with_capacity(columns.len());

    for column in columns {
        let mut line = format!(
            "    {} {}",
            escape_identifier(&column.name),
            render_column_type(column)
        );
        if column.is_auto_increment && column.default_value.is_none() {
            line.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        }
        if !column.nullable {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default_value {
            line.push_str(&format!(" DEFAULT {}", default));
        }
        lines.push(line);
    }

    if let Some(primary) = indexes.iter().find(|index| index.is_primary) {
        let key_columns = primary
            .columns
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "    CONSTRAINT {} PRIMARY KEY ({})",
            escape_identifier(&primary.name),
            key_columns
        ));
    }

    // Key usage rows arrive ordered by constraint and position
    let mut fk_groups: Vec<(String, Vec<&KeyUsageInfo>)> = Vec::new();
    for key in keys {
        match fk_groups.last_mut() {
            Some((name, group)) if *name == key.constraint_name => group.push(key),
            _ => fk_groups.push((key.constraint_name.clone(), vec![key])),
        }
    }
    for (name, group) in &fk_groups {
        let fk_columns = group
            .iter()
            .map(|k| escape_identifier(&k.column))
            .collect::<Vec<_>>()
            .join(", ");
        let ref_columns = group
            .iter()
            .map(|k| escape_identifier(&k.referenced_column))
            .collect::<Vec<_>>()
            .join(", ");
        let first = group[0];
        lines.push(format!(
            "    CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}.{} ({}) ON UPDATE {} ON DELETE {}",
            escape_identifier(name),
            fk_columns,
            escape_identifier(&first.referenced_schema),
            escape_identifier(&first.referenced_table),
            ref_columns,
            first.on_update.as_sql(),
            first.on_delete.as_sql(),
        ));
    }

    let mut ddl = format!("CREATE TABLE {} (\n{}\n);", qualified, lines.join(",\n"));

    for index in indexes.iter().filter(|index| !index.is_primary) {
        let unique = if index.is_unique { "UNIQUE " } else { "" };
        let index_columns = index
            .columns
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        ddl.push_str(&format!(
            "\n\nCREATE {}INDEX {} ON {} USING {} ({});",
            unique,
            escape_identifier(&index.name),
            qualified,
            index.index_type,
            index_columns
        ));
    }

    ddl
}

fn render_column_type(column: &ColumnInfo) -> String {
    let mut rendered = column.data_type.clone();
    if let Some(max_length) = column.max_length {
        rendered.push_str(&format!("({})", max_length));
    } else if column.data_type == "NUMERIC" {
        if let (Some(precision), Some(scale)) = (column.precision, column.scale) {
            rendered.push_str(&format!("({}, {})", precision, scale));
        }
    }
    if column.is_array {
        rendered.push_str("[]");
    }
    rendered
}
