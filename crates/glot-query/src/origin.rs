//! Best-effort resolution of a statement's originating table
//!
//! The executor wants to know which schema/table a result column came from
//! so it can enrich fields with catalog metadata. Parsing is strictly
//! optional: anything the parser cannot digest resolves to `None` and the
//! caller degrades to default-schema metadata.

use sqlparser::ast::{Delete, FromTable, ObjectName, Query, SetExpr, Statement, TableFactor};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// The table a statement's result columns originate from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementOrigin {
    pub schema: Option<String>,
    pub table: String,
    pub alias: Option<String>,
}

/// Resolve the originating table of a single statement, if it can be parsed.
///
/// Only the first relation of the first statement is considered; joins and
/// set operations resolve to their leading table.
pub fn resolve_origin(sql: &str) -> Option<StatementOrigin> {
    let dialect = GenericDialect {};
    let Ok(statements) = Parser::parse_sql(&dialect, sql) else {
        tracing::trace!(sql_preview = %sql.chars().take(50).collect::<String>(), "statement did not parse, origin unknown");
        return None;
    };

    match statements.into_iter().next()? {
        Statement::Query(query) => origin_from_query(&query),
        Statement::Update { table, .. } => origin_from_factor(&table.relation),
        Statement::Delete(delete) => origin_from_delete(&delete),
        Statement::Insert(insert) => {
            let (schema, table) = split_object_name(&insert.table_name);
            Some(StatementOrigin {
                schema,
                table,
                alias: None,
            })
        }
        _ => None,
    }
}

fn origin_from_query(query: &Query) -> Option<StatementOrigin> {
    match query.body.as_ref() {
        SetExpr::Select(select) => origin_from_factor(&select.from.first()?.relation),
        _ => None,
    }
}

fn origin_from_delete(delete: &Delete) -> Option<StatementOrigin> {
    let tables = match &delete.from {
        FromTable::WithFromKeyword(tables) => tables,
        FromTable::WithoutKeyword(tables) => tables,
    };
    origin_from_factor(&tables.first()?.relation)
}

fn origin_from_factor(factor: &TableFactor) -> Option<StatementOrigin> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let (schema, table) = split_object_name(name);
            Some(StatementOrigin {
                schema,
                table,
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            })
        }
        _ => None,
    }
}

fn split_object_name(name: &ObjectName) -> (Option<String>, String) {
    let parts: Vec<&str> = name.0.iter().map(|p| p.value.as_str()).collect();
    match parts.len() {
        1 => (None, parts[0].to_string()),
        2 => (Some(parts[0].to_string()), parts[1].to_string()),
        _ => (None, name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_with_schema_and_alias() {
        let origin = resolve_origin("SELECT u.id FROM public.users u").unwrap();
        assert_eq!(origin.schema.as_deref(), Some("public"));
        assert_eq!(origin.table, "users");
        assert_eq!(origin.alias.as_deref(), Some("u"));
    }

    #[test]
    fn test_bare_select_has_no_origin() {
        assert_eq!(resolve_origin("SELECT 1"), None);
    }

    #[test]
    fn test_update_and_delete_targets() {
        let origin = resolve_origin("UPDATE users SET name = 'x' WHERE id = 1").unwrap();
        assert_eq!(origin.table, "users");
        assert_eq!(origin.schema, None);

        let origin = resolve_origin("DELETE FROM sales.orders WHERE id = 2").unwrap();
        assert_eq!(origin.schema.as_deref(), Some("sales"));
        assert_eq!(origin.table, "orders");
    }

    #[test]
    fn test_insert_target() {
        let origin = resolve_origin("INSERT INTO logs (msg) VALUES ('hi')").unwrap();
        assert_eq!(origin.table, "logs");
    }

    #[test]
    fn test_unparseable_sql_is_swallowed() {
        assert_eq!(resolve_origin("THIS IS NOT SQL AT ALL ;;;"), None);
        assert_eq!(resolve_origin(""), None);
    }

    #[test]
    fn test_join_resolves_to_leading_table() {
        let origin =
            resolve_origin("SELECT * FROM orders o JOIN users u ON u.id = o.user_id").unwrap();
        assert_eq!(origin.table, "orders");
        assert_eq!(origin.alias.as_deref(), Some("o"));
    }
}
