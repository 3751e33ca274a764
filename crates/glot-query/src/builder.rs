//! Fluent SQL statement builder
//!
//! Accumulates a dialect-neutral description of a statement and renders it
//! to SQL text once. Clause fragments are caller-supplied literals; the
//! builder guarantees clause ordering and joining, not escaping.

/// Accumulated builder state
///
/// Which statement kind gets rendered is decided by what is populated:
/// insert rows win over update assignments, which win over the delete flag;
/// everything else renders as a SELECT.
#[derive(Debug, Clone, Default)]
pub struct QueryDescriptor {
    pub select: Vec<String>,
    pub schema: Option<String>,
    pub from: Option<String>,
    pub where_predicates: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
    pub update_assignments: Vec<String>,
    pub insert_columns: Vec<String>,
    pub insert_rows: Vec<Vec<String>>,
    pub delete: bool,
}

impl QueryDescriptor {
    fn target(&self) -> Option<String> {
        let from = self.from.as_ref()?;
        Some(match &self.schema {
            Some(schema) => format!("{}.{}", schema, from),
            None => from.clone(),
        })
    }
}

/// Fluent statement builder
///
/// Build incrementally, render once, then discard; a descriptor is not meant
/// to be reused across unrelated statements.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    descriptor: QueryDescriptor,
}

impl QueryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column (or expression) to the select list
    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.descriptor.select.push(column.into());
        self
    }

    /// Set the schema qualifying the target table
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.descriptor.schema = Some(schema.into());
        self
    }

    /// Set the target table
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.descriptor.from = Some(table.into());
        self
    }

    /// Add a predicate; predicates are joined with `AND`
    pub fn and_where(mut self, predicate: impl Into<String>) -> Self {
        self.descriptor.where_predicates.push(predicate.into());
        self
    }

    /// Add a GROUP BY expression
    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.descriptor.group_by.push(expr.into());
        self
    }

    /// Add an ORDER BY expression
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.descriptor.order_by.push(expr.into());
        self
    }

    /// Set the row limit; only emitted for statements with a select list
    pub fn limit(mut self, limit: u64) -> Self {
        self.descriptor.limit = Some(limit);
        self
    }

    /// Add an UPDATE assignment fragment (e.g. `name = 'x'`)
    pub fn update(mut self, assignment: impl Into<String>) -> Self {
        self.descriptor.update_assignments.push(assignment.into());
        self
    }

    /// Set the column list for an INSERT
    pub fn insert_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor.insert_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add one row of INSERT value fragments
    pub fn insert_row<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .insert_rows
            .push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Mark this statement as a DELETE
    pub fn delete(mut self) -> Self {
        self.descriptor.delete = true;
        self
    }

    /// Inspect the accumulated state
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Render the accumulated statement to SQL text.
    ///
    /// Clauses are concatenated in a fixed order: verb, FROM/INTO target,
    /// WHERE, GROUP BY, ORDER BY, LIMIT, and a trailing VALUES list for
    /// inserts. An empty builder renders an empty string.
    pub fn render(&self) -> String {
        let d = &self.descriptor;
        let mut parts: Vec<String> = Vec::new();

        let is_insert = !d.insert_rows.is_empty();
        let is_update = !is_insert && !d.update_assignments.is_empty();
        let is_delete = !is_insert && !is_update && d.delete;

        if is_insert {
            match d.target() {
                Some(target) if d.insert_columns.is_empty() => {
                    parts.push(format!("INSERT INTO {}", target));
                }
                Some(target) => {
                    parts.push(format!(
                        "INSERT INTO {} ({})",
                        target,
                        d.insert_columns.join(", ")
                    ));
                }
                None => {
                    tracing::warn!("insert rows configured without a target table");
                    return String::new();
                }
            }
        } else if is_update {
            match d.target() {
                Some(target) => parts.push(format!(
                    "UPDATE {} SET {}",
                    target,
                    d.update_assignments.join(", ")
                )),
                None => {
                    tracing::warn!("update assignments configured without a target table");
                    return String::new();
                }
            }
        } else if is_delete {
            match d.target() {
                Some(target) => parts.push(format!("DELETE FROM {}", target)),
                None => {
                    tracing::warn!("delete configured without a target table");
                    return String::new();
                }
            }
        } else {
            let columns = if d.select.is_empty() {
                "*".to_string()
            } else {
                d.select.join(", ")
            };
            match d.target() {
                Some(target) => parts.push(format!("SELECT {} FROM {}", columns, target)),
                None if !d.select.is_empty() => parts.push(format!("SELECT {}", columns)),
                None => return String::new(),
            }
        }

        if !d.where_predicates.is_empty() {
            parts.push(format!("WHERE {}", d.where_predicates.join(" AND ")));
        }
        if !d.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", d.group_by.join(", ")));
        }
        if !d.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", d.order_by.join(", ")));
        }
        if let Some(limit) = d.limit {
            if !d.select.is_empty() && !is_insert && !is_update && !is_delete {
                parts.push(format!("LIMIT {}", limit));
            }
        }
        if is_insert {
            let rows: Vec<String> = d
                .insert_rows
                .iter()
                .map(|row| format!("({})", row.join(", ")))
                .collect();
            parts.push(format!("VALUES {}", rows.join(", ")));
        }

        let sql = parts.join(" ");
        tracing::debug!(sql_preview = %sql.chars().take(100).collect::<String>(), "rendered statement");
        sql
    }
}
