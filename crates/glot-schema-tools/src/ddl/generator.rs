//! DDL generator implementation
//!
//! Renders SQL from table diffs, table definitions, and object definitions.
//! `alter_table` produces one statement batch in a fixed dependency order so
//! the batch is valid as a single transaction: sequence creates, index drops,
//! the combined ALTER TABLE clause list, table comment, index creates, column
//! renames, and the table rename last. Object alters render a four-step
//! rewrite executed by the apply module.

use glot_core::{
    ColumnInfo, DiffStep, ForeignKeyAction, IndexInfo, RoutineInfo, RoutineKind, TriggerInfo,
    ViewInfo,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::table_spec::TableDefinition;
use crate::diff::{ColumnChange, ForeignKeyDef, TableDiff};

/// Errors that can occur during DDL synthesis
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Definition text required but absent
    #[error("missing definition for {0}")]
    MissingDefinition(String),
    /// Operation the dialect cannot express
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

/// Result type for DDL synthesis
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// SQL dialect for DDL synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DdlDialect {
    #[default]
    PostgreSQL,
    MySQL,
}

impl DdlDialect {
    /// Returns the identifier quote character for this dialect
    pub fn quote_char(&self) -> char {
        match self {
            DdlDialect::PostgreSQL => '"',
            DdlDialect::MySQL => '`',
        }
    }

    /// Quotes an identifier
    pub fn quote_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        format!("{}{}{}", quote, name, quote)
    }

    /// Returns whether this dialect supports IF EXISTS
    pub fn supports_if_exists(&self) -> bool {
        true
    }

    /// Returns whether this dialect supports CASCADE
    pub fn supports_cascade(&self) -> bool {
        matches!(self, DdlDialect::PostgreSQL)
    }

    /// Returns whether this dialect supports CREATE OR REPLACE for views
    pub fn supports_create_or_replace_view(&self) -> bool {
        true
    }

    /// Returns whether this dialect backs auto-increment columns with
    /// sequences
    pub fn supports_sequences(&self) -> bool {
        matches!(self, DdlDialect::PostgreSQL)
    }

    /// Returns whether this dialect supports COMMENT ON statements
    pub fn supports_comment_on(&self) -> bool {
        matches!(self, DdlDialect::PostgreSQL)
    }
}

/// Configuration for DDL synthesis
#[derive(Debug, Clone, Copy)]
pub struct DdlConfig {
    /// Target dialect
    pub dialect: DdlDialect,
    /// Emit IF EXISTS / IF NOT EXISTS where the dialect allows it
    pub use_if_exists: bool,
    /// Emit CASCADE on drops where the dialect allows it
    pub use_cascade: bool,
}

impl Default for DdlConfig {
    fn default() -> Self {
        Self {
            dialect: DdlDialect::default(),
            use_if_exists: true,
            use_cascade: false,
        }
    }
}

impl DdlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: DdlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_if_exists(mut self, use_if_exists: bool) -> Self {
        self.use_if_exists = use_if_exists;
        self
    }

    pub fn with_cascade(mut self, use_cascade: bool) -> Self {
        self.use_cascade = use_cascade;
        self
    }
}

/// The four statements of an object rewrite, in execution order.
///
/// The new definition is first created under a temporary name, which
/// validates that it compiles, then the temporary and the original are
/// dropped and the final definition is created under the real name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRewrite {
    /// Qualified name of the object being rewritten
    pub object_name: String,
    pub create_temp: String,
    pub drop_temp: String,
    pub drop_original: String,
    pub create_final: String,
}

impl ObjectRewrite {
    /// The statements paired with their step identifiers, in execution order
    pub fn steps(&self) -> [(DiffStep, &str); 4] {
        [
            (DiffStep::CreateTemp, self.create_temp.as_str()),
            (DiffStep::DropTemp, self.drop_temp.as_str()),
            (DiffStep::DropOriginal, self.drop_original.as_str()),
            (DiffStep::CreateFinal, self.create_final.as_str()),
        ]
    }
}

/// Stateless DDL generator parameterized by dialect
#[derive(Debug, Clone, Default)]
pub struct DdlGenerator {
    config: DdlConfig,
}

impl DdlGenerator {
    /// Creates a generator with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator for a specific dialect
    pub fn for_dialect(dialect: DdlDialect) -> Self {
        Self {
            config: DdlConfig::default().with_dialect(dialect),
        }
    }

    /// Creates a generator with a custom configuration
    pub fn with_config(config: DdlConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration
    pub fn config(&self) -> &DdlConfig {
        &self.config
    }

    /// Returns the target dialect
    pub fn dialect(&self) -> DdlDialect {
        self.config.dialect
    }

    /// Renders the statement batch for a table diff.
    ///
    /// Statement order: (1) sequence creates for auto-increment columns,
    /// (2) index drops, (3) one combined ALTER TABLE statement, (4) table
    /// comment, (5) index creates for plain indexes, (6) column renames,
    /// (7) table rename. Sequences must exist before defaults reference
    /// them; drops precede recreates under the same name; renames come
    /// last so every preceding statement can use the original name.
    pub fn alter_table(&self, diff: &TableDiff) -> SynthesisResult<Vec<String>> {
        let mut statements = Vec::new();
        if diff.is_empty() {
            return Ok(statements);
        }
        let table = self.qualified_name(&diff.table_name, diff.schema.as_deref());

        // Sequences
        for col in diff.added_columns.iter().filter(|c| c.is_auto_increment) {
            if let Some(stmt) =
                self.render_create_sequence(&diff.table_name, diff.schema.as_deref(), &col.name)
            {
                statements.push(stmt);
            }
        }
        for change in diff
            .changed_columns
            .iter()
            .filter(|c| c.auto_increment_changed && c.column.is_auto_increment)
        {
            if let Some(stmt) = self.render_create_sequence(
                &diff.table_name,
                diff.schema.as_deref(),
                &change.column.name,
            ) {
                statements.push(stmt);
            }
        }

        // Index drops
        for idx in diff.removed_indexes.iter().filter(|i| !i.is_primary) {
            statements.push(self.render_drop_index(&table, idx, diff.schema.as_deref()));
        }
        for change in &diff.changed_indexes {
            if !change.old.is_primary {
                statements.push(self.render_drop_index(&table, &change.old, diff.schema.as_deref()));
            }
        }

        // Combined ALTER TABLE clause list
        let clauses = self.alter_table_clauses(diff)?;
        if !clauses.is_empty() {
            statements.push(format!("ALTER TABLE {} {}", table, clauses.join(", ")));
        }

        // Table comment
        if self.config.dialect.supports_comment_on() {
            if let Some((_, new_comment)) = &diff.options.comment_change {
                statements.push(self.render_table_comment(&table, new_comment.as_deref()));
            }
        }

        // Index creates for plain indexes; unique and primary additions are
        // rendered as constraints in the clause list instead
        for idx in diff
            .added_indexes
            .iter()
            .filter(|i| !i.is_unique && !i.is_primary)
        {
            statements.push(self.render_create_index(&table, idx));
        }
        for change in &diff.changed_indexes {
            if !change.new.is_unique && !change.new.is_primary {
                statements.push(self.render_create_index(&table, &change.new));
            }
        }

        // Column renames
        for rename in &diff.renamed_columns {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                table,
                self.quote(&rename.from),
                self.quote(&rename.to)
            ));
        }

        // Table rename
        if let Some((_, new_name)) = &diff.options.name_change {
            statements.push(format!(
                "ALTER TABLE {} RENAME TO {}",
                table,
                self.quote(new_name)
            ));
        }

        Ok(statements)
    }

    /// Builds the clause list for the combined ALTER TABLE statement:
    /// column adds, column changes, key drops/adds, foreign key drops/adds,
    /// column drops, then dialect-specific table options.
    fn alter_table_clauses(&self, diff: &TableDiff) -> SynthesisResult<Vec<String>> {
        let options = &diff.options;
        if self.config.dialect == DdlDialect::PostgreSQL
            && (options.engine_change.is_some()
                || options.collation_change.is_some()
                || options.auto_increment_change.is_some())
        {
            return Err(SynthesisError::UnsupportedOperation(
                "table storage options".to_string(),
            ));
        }

        let mut clauses = Vec::new();

        for col in &diff.added_columns {
            let sequence = self.sequence_for_column(diff, col);
            clauses.push(format!(
                "ADD COLUMN {}",
                self.column_definition(col, sequence.as_deref())
            ));
        }

        for change in &diff.changed_columns {
            self.push_column_change_clauses(diff, change, &mut clauses);
        }

        // Key drops before adds so a redefined key never collides with itself
        for idx in diff.removed_indexes.iter().filter(|i| i.is_primary) {
            clauses.push(self.primary_key_drop_clause(&idx.name));
        }
        for change in &diff.changed_indexes {
            if change.old.is_primary {
                clauses.push(self.primary_key_drop_clause(&change.old.name));
            }
        }
        for name in &diff.removed_constraints {
            clauses.push(self.key_drop_clause(name));
        }
        for idx in &diff.added_indexes {
            if let Some(clause) = self.key_add_clause(idx) {
                clauses.push(clause);
            }
        }
        for change in &diff.changed_indexes {
            if let Some(clause) = self.key_add_clause(&change.new) {
                clauses.push(clause);
            }
        }

        for name in &diff.removed_foreign_keys {
            clauses.push(self.foreign_key_drop_clause(name));
        }
        for fk in &diff.added_foreign_keys {
            clauses.push(format!("ADD {}", self.foreign_key_fragment(fk)));
        }

        for column in &diff.removed_columns {
            let clause = match self.config.dialect {
                DdlDialect::PostgreSQL => format!(
                    "DROP COLUMN {}{}{}",
                    self.if_exists(),
                    self.quote(column),
                    self.cascade()
                ),
                DdlDialect::MySQL => format!("DROP COLUMN {}", self.quote(column)),
            };
            clauses.push(clause);
        }

        if self.config.dialect == DdlDialect::MySQL {
            if let Some((_, new_comment)) = &options.comment_change {
                clauses.push(format!(
                    "COMMENT = {}",
                    self.quote_literal(new_comment.as_deref().unwrap_or(""))
                ));
            }
            if let Some((_, Some(engine))) = &options.engine_change {
                clauses.push(format!("ENGINE = {}", engine));
            }
            if let Some((_, Some(collation))) = &options.collation_change {
                clauses.push(format!("COLLATE = {}", collation));
            }
            if let Some((_, Some(value))) = &options.auto_increment_change {
                clauses.push(format!("AUTO_INCREMENT = {}", value));
            }
        }

        Ok(clauses)
    }

    /// Renders the statements to create a table: sequences, the CREATE
    /// TABLE itself, secondary indexes, and comments.
    pub fn create_table(&self, def: &TableDefinition) -> SynthesisResult<Vec<String>> {
        let table = self.qualified_name(&def.name, def.schema.as_deref());
        let mut statements = Vec::new();

        for col in def.columns.iter().filter(|c| c.is_auto_increment) {
            if let Some(stmt) =
                self.render_create_sequence(&def.name, def.schema.as_deref(), &col.name)
            {
                statements.push(stmt);
            }
        }

        let pk_columns = def.primary_key_columns();
        let inline_pk = pk_columns.len() == 1;
        let mut entries = Vec::new();
        for col in &def.columns {
            let sequence = if col.is_auto_increment && self.config.dialect.supports_sequences() {
                Some(self.sequence_name(&def.name, def.schema.as_deref(), &col.name))
            } else {
                None
            };
            let mut entry = self.column_definition(col, sequence.as_deref());
            if inline_pk && col.is_primary_key {
                entry.push_str(" PRIMARY KEY");
            } else if col.is_unique && !col.is_primary_key {
                entry.push_str(" UNIQUE");
            }
            entries.push(entry);
        }
        if pk_columns.len() > 1 {
            let columns: Vec<String> = pk_columns.iter().map(|c| self.quote(&c.name)).collect();
            entries.push(format!("PRIMARY KEY ({})", columns.join(", ")));
        }
        for fk in &def.foreign_keys {
            entries.push(self.foreign_key_fragment(fk));
        }

        let mut create = format!("CREATE TABLE {} ({})", table, entries.join(", "));
        if self.config.dialect == DdlDialect::MySQL {
            if let Some(comment) = &def.comment {
                create.push_str(&format!(" COMMENT = {}", self.quote_literal(comment)));
            }
        }
        statements.push(create);

        for idx in def.indexes.iter().filter(|i| !i.is_primary) {
            statements.push(self.render_create_index(&table, idx));
        }

        if self.config.dialect.supports_comment_on() {
            if let Some(comment) = &def.comment {
                statements.push(self.render_table_comment(&table, Some(comment)));
            }
            for col in &def.columns {
                if let Some(comment) = &col.comment {
                    statements.push(format!(
                        "COMMENT ON COLUMN {}.{} IS {}",
                        table,
                        self.quote(&col.name),
                        self.quote_literal(comment)
                    ));
                }
            }
        }

        Ok(statements)
    }

    /// Renders a DROP TABLE statement
    pub fn drop_table(&self, name: &str, schema: Option<&str>) -> SynthesisResult<String> {
        Ok(format!(
            "DROP TABLE {}{}{}",
            self.if_exists(),
            self.qualified_name(name, schema),
            self.cascade()
        ))
    }

    /// Renders a TRUNCATE TABLE statement
    pub fn truncate_table(&self, name: &str, schema: Option<&str>) -> SynthesisResult<String> {
        Ok(format!(
            "TRUNCATE TABLE {}{}",
            self.qualified_name(name, schema),
            self.cascade()
        ))
    }

    /// Renders a CREATE VIEW statement
    pub fn create_view(&self, view: &ViewInfo) -> SynthesisResult<String> {
        let definition = view
            .definition
            .as_deref()
            .ok_or_else(|| SynthesisError::MissingDefinition(format!("view {}", view.name)))?;
        let name = self.qualified_name(&view.name, view.schema.as_deref());
        if view.is_materialized {
            if self.config.dialect == DdlDialect::MySQL {
                return Err(SynthesisError::UnsupportedOperation(
                    "materialized views".to_string(),
                ));
            }
            // No OR REPLACE for materialized views
            Ok(format!("CREATE MATERIALIZED VIEW {} AS {}", name, definition))
        } else if self.config.dialect.supports_create_or_replace_view() {
            Ok(format!("CREATE OR REPLACE VIEW {} AS {}", name, definition))
        } else {
            Ok(format!("CREATE VIEW {} AS {}", name, definition))
        }
    }

    /// Renders a DROP VIEW statement
    pub fn drop_view(&self, view: &ViewInfo) -> SynthesisResult<String> {
        let name = self.qualified_name(&view.name, view.schema.as_deref());
        let materialized = if view.is_materialized {
            if self.config.dialect == DdlDialect::MySQL {
                return Err(SynthesisError::UnsupportedOperation(
                    "materialized views".to_string(),
                ));
            }
            "MATERIALIZED "
        } else {
            ""
        };
        Ok(format!(
            "DROP {}VIEW {}{}{}",
            materialized,
            self.if_exists(),
            name,
            self.cascade()
        ))
    }

    /// Renders a CREATE statement for a function or procedure
    pub fn create_routine(&self, routine: &RoutineInfo) -> SynthesisResult<String> {
        let body = routine.definition.as_deref().ok_or_else(|| {
            SynthesisError::MissingDefinition(format!("routine {}", routine.name))
        })?;
        let name = self.qualified_name(&routine.name, routine.schema.as_deref());
        let args = routine.arguments.as_deref().unwrap_or("");
        match (self.config.dialect, routine.kind) {
            (DdlDialect::PostgreSQL, RoutineKind::Procedure) => Ok(format!(
                "CREATE OR REPLACE PROCEDURE {}({}) LANGUAGE {} AS $${}$$",
                name,
                args,
                routine.language.as_deref().unwrap_or("plpgsql"),
                body
            )),
            (DdlDialect::PostgreSQL, _) => Ok(format!(
                "CREATE OR REPLACE FUNCTION {}({}) RETURNS {} LANGUAGE {} AS $${}$$",
                name,
                args,
                self.routine_return_type(routine),
                routine.language.as_deref().unwrap_or("plpgsql"),
                body
            )),
            (DdlDialect::MySQL, RoutineKind::Procedure) => {
                Ok(format!("CREATE PROCEDURE {}({}) {}", name, args, body))
            }
            (DdlDialect::MySQL, _) => Ok(format!(
                "CREATE FUNCTION {}({}) RETURNS {} {}",
                name,
                args,
                self.routine_return_type(routine),
                body
            )),
        }
    }

    /// Renders a DROP statement for a function or procedure.
    /// The argument signature disambiguates overloads where the dialect
    /// allows them.
    pub fn drop_routine(&self, routine: &RoutineInfo) -> SynthesisResult<String> {
        let keyword = match routine.kind {
            RoutineKind::Procedure => "PROCEDURE",
            _ => "FUNCTION",
        };
        let name = self.qualified_name(&routine.name, routine.schema.as_deref());
        match (self.config.dialect, &routine.arguments) {
            (DdlDialect::PostgreSQL, Some(args)) => Ok(format!(
                "DROP {} {}{}({})",
                keyword,
                self.if_exists(),
                name,
                args
            )),
            _ => Ok(format!("DROP {} {}{}", keyword, self.if_exists(), name)),
        }
    }

    /// Renders a CREATE TRIGGER statement
    pub fn create_trigger(&self, trigger: &TriggerInfo) -> SynthesisResult<String> {
        let action = trigger.definition.as_deref().ok_or_else(|| {
            SynthesisError::MissingDefinition(format!("trigger {}", trigger.name))
        })?;
        let table = self.qualified_name(&trigger.table_name, trigger.schema.as_deref());
        let events: Vec<&str> = trigger.events.iter().map(|e| e.as_sql()).collect();
        Ok(format!(
            "CREATE TRIGGER {} {} {} ON {} {} {}",
            self.quote(&trigger.name),
            trigger.timing.as_sql(),
            events.join(" OR "),
            table,
            trigger.for_each.as_sql(),
            action
        ))
    }

    /// Renders a DROP TRIGGER statement
    pub fn drop_trigger(&self, trigger: &TriggerInfo) -> SynthesisResult<String> {
        match self.config.dialect {
            DdlDialect::PostgreSQL => {
                let table = self.qualified_name(&trigger.table_name, trigger.schema.as_deref());
                Ok(format!(
                    "DROP TRIGGER {}{} ON {}",
                    self.if_exists(),
                    self.quote(&trigger.name),
                    table
                ))
            }
            DdlDialect::MySQL => Ok(format!(
                "DROP TRIGGER {}{}",
                self.if_exists(),
                self.qualified_name(&trigger.name, trigger.schema.as_deref())
            )),
        }
    }

    /// Renders a CREATE SCHEMA statement
    pub fn create_schema(&self, name: &str) -> SynthesisResult<String> {
        Ok(format!(
            "CREATE SCHEMA {}{}",
            self.if_not_exists(),
            self.quote(name)
        ))
    }

    /// Renders a DROP SCHEMA statement
    pub fn drop_schema(&self, name: &str) -> SynthesisResult<String> {
        Ok(format!(
            "DROP SCHEMA {}{}{}",
            self.if_exists(),
            self.quote(name),
            self.cascade()
        ))
    }

    /// Builds the rewrite sequence replacing a view's definition
    pub fn alter_view(&self, view: &ViewInfo) -> SynthesisResult<ObjectRewrite> {
        let mut temp = view.clone();
        temp.name = self.temp_name(&view.name);
        Ok(ObjectRewrite {
            object_name: self.qualified_name(&view.name, view.schema.as_deref()),
            create_temp: self.create_view(&temp)?,
            drop_temp: self.drop_view(&temp)?,
            drop_original: self.drop_view(view)?,
            create_final: self.create_view(view)?,
        })
    }

    /// Builds the rewrite sequence replacing a function or procedure.
    /// Covers every routine kind; the rendered statements dispatch on it.
    pub fn alter_routine(&self, routine: &RoutineInfo) -> SynthesisResult<ObjectRewrite> {
        let mut temp = routine.clone();
        temp.name = self.temp_name(&routine.name);
        Ok(ObjectRewrite {
            object_name: self.qualified_name(&routine.name, routine.schema.as_deref()),
            create_temp: self.create_routine(&temp)?,
            drop_temp: self.drop_routine(&temp)?,
            drop_original: self.drop_routine(routine)?,
            create_final: self.create_routine(routine)?,
        })
    }

    /// Builds the rewrite sequence replacing a trigger
    pub fn alter_trigger(&self, trigger: &TriggerInfo) -> SynthesisResult<ObjectRewrite> {
        let mut temp = trigger.clone();
        temp.name = self.temp_name(&trigger.name);
        Ok(ObjectRewrite {
            object_name: self.qualified_name(&trigger.name, trigger.schema.as_deref()),
            create_temp: self.create_trigger(&temp)?,
            drop_temp: self.drop_trigger(&temp)?,
            drop_original: self.drop_trigger(trigger)?,
            create_final: self.create_trigger(trigger)?,
        })
    }

    // Rendering helpers

    fn quote(&self, name: &str) -> String {
        self.config.dialect.quote_identifier(name)
    }

    fn qualified_name(&self, name: &str, schema: Option<&str>) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(name)),
            None => self.quote(name),
        }
    }

    fn if_exists(&self) -> &'static str {
        if self.config.use_if_exists && self.config.dialect.supports_if_exists() {
            "IF EXISTS "
        } else {
            ""
        }
    }

    fn if_not_exists(&self) -> &'static str {
        if self.config.use_if_exists && self.config.dialect.supports_if_exists() {
            "IF NOT EXISTS "
        } else {
            ""
        }
    }

    fn cascade(&self) -> &'static str {
        if self.config.use_cascade && self.config.dialect.supports_cascade() {
            " CASCADE"
        } else {
            ""
        }
    }

    fn quote_literal(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    fn temp_name(&self, name: &str) -> String {
        format!("temp_{}", name)
    }

    /// Unqualified quoting is wrong for sequences referenced from DEFAULT
    /// expressions, so the raw dotted name goes inside the nextval literal
    fn sequence_name(&self, table: &str, schema: Option<&str>, column: &str) -> String {
        let base = format!("{}_{}_seq", table, column);
        match schema {
            Some(schema) => format!("{}.{}", schema, base),
            None => base,
        }
    }

    fn render_create_sequence(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &str,
    ) -> Option<String> {
        if !self.config.dialect.supports_sequences() {
            return None;
        }
        let name = self.qualified_name(&format!("{}_{}_seq", table, column), schema);
        Some(format!("CREATE SEQUENCE {}{}", self.if_not_exists(), name))
    }

    fn sequence_for_column(&self, diff: &TableDiff, col: &ColumnInfo) -> Option<String> {
        if col.is_auto_increment && self.config.dialect.supports_sequences() {
            Some(self.sequence_name(&diff.table_name, diff.schema.as_deref(), &col.name))
        } else {
            None
        }
    }

    /// Renders `name type[(args)] [NOT NULL] [DEFAULT ...]` plus the
    /// dialect-specific auto-increment and comment attributes
    fn column_definition(&self, col: &ColumnInfo, sequence: Option<&str>) -> String {
        let mut def = format!("{} {}", self.quote(&col.name), self.column_type_spec(col));

        if !col.nullable {
            def.push_str(" NOT NULL");
        }

        match self.config.dialect {
            DdlDialect::PostgreSQL => {
                if let Some(sequence) = sequence {
                    def.push_str(&format!(" DEFAULT nextval('{}')", sequence));
                } else if let Some(default) = &col.default_value {
                    def.push_str(&format!(" DEFAULT {}", default));
                }
            }
            DdlDialect::MySQL => {
                if col.is_auto_increment {
                    def.push_str(" AUTO_INCREMENT");
                } else if let Some(default) = &col.default_value {
                    def.push_str(&format!(" DEFAULT {}", default));
                }
                if let Some(comment) = &col.comment {
                    def.push_str(&format!(" COMMENT {}", self.quote_literal(comment)));
                }
            }
        }

        def
    }

    fn column_type_spec(&self, col: &ColumnInfo) -> String {
        let mut spec = col.data_type.clone();

        if let Some(len) = col.max_length {
            spec.push_str(&format!("({})", len));
        } else if col.precision.is_some() || col.scale.is_some() {
            let precision = col.precision.unwrap_or(0);
            if let Some(scale) = col.scale {
                spec.push_str(&format!("({}, {})", precision, scale));
            } else {
                spec.push_str(&format!("({})", precision));
            }
        }

        if col.is_array && self.config.dialect == DdlDialect::PostgreSQL {
            spec.push_str("[]");
        }

        spec
    }

    /// A type change restates nullability and default alongside the
    /// conversion so the resulting column state is explicit rather than
    /// inherited
    fn push_column_change_clauses(
        &self,
        diff: &TableDiff,
        change: &ColumnChange,
        clauses: &mut Vec<String>,
    ) {
        let col = &change.column;
        match self.config.dialect {
            DdlDialect::PostgreSQL => {
                let name = self.quote(&col.name);
                let nullability = if col.nullable {
                    format!("ALTER COLUMN {} DROP NOT NULL", name)
                } else {
                    format!("ALTER COLUMN {} SET NOT NULL", name)
                };
                let default = match self.changed_column_default(diff, col) {
                    Some(value) => format!("ALTER COLUMN {} SET DEFAULT {}", name, value),
                    None => format!("ALTER COLUMN {} DROP DEFAULT", name),
                };
                if change.type_changed {
                    let spec = self.column_type_spec(col);
                    clauses.push(format!(
                        "ALTER COLUMN {} TYPE {} USING {}::{}",
                        name, spec, name, spec
                    ));
                    clauses.push(nullability);
                    clauses.push(default);
                } else {
                    if change.nullable_changed {
                        clauses.push(nullability);
                    }
                    if change.default_changed || change.auto_increment_changed {
                        clauses.push(default);
                    }
                }
            }
            DdlDialect::MySQL => {
                clauses.push(format!(
                    "MODIFY COLUMN {}",
                    self.column_definition(col, None)
                ));
            }
        }
    }

    fn changed_column_default(&self, diff: &TableDiff, col: &ColumnInfo) -> Option<String> {
        if col.is_auto_increment && self.config.dialect.supports_sequences() {
            Some(format!(
                "nextval('{}')",
                self.sequence_name(&diff.table_name, diff.schema.as_deref(), &col.name)
            ))
        } else {
            col.default_value.clone()
        }
    }

    fn render_drop_index(&self, table: &str, index: &IndexInfo, schema: Option<&str>) -> String {
        match self.config.dialect {
            DdlDialect::PostgreSQL => format!(
                "DROP INDEX {}{}",
                self.if_exists(),
                self.qualified_name(&index.name, schema)
            ),
            DdlDialect::MySQL => format!("DROP INDEX {} ON {}", self.quote(&index.name), table),
        }
    }

    fn render_create_index(&self, table: &str, index: &IndexInfo) -> String {
        let unique = if index.is_unique { "UNIQUE " } else { "" };
        let columns: Vec<String> = index.columns.iter().map(|c| self.quote(c)).collect();
        let using = match self.config.dialect {
            DdlDialect::PostgreSQL
                if !index.index_type.is_empty() && index.index_type != "btree" =>
            {
                format!(" USING {}", index.index_type)
            }
            _ => String::new(),
        };
        format!(
            "CREATE {}INDEX {} ON {}{} ({})",
            unique,
            self.quote(&index.name),
            table,
            using,
            columns.join(", ")
        )
    }

    fn key_add_clause(&self, index: &IndexInfo) -> Option<String> {
        let columns: Vec<String> = index.columns.iter().map(|c| self.quote(c)).collect();
        if index.is_primary {
            Some(format!("ADD PRIMARY KEY ({})", columns.join(", ")))
        } else if index.is_unique {
            Some(format!(
                "ADD CONSTRAINT {} UNIQUE ({})",
                self.quote(&index.name),
                columns.join(", ")
            ))
        } else {
            None
        }
    }

    fn key_drop_clause(&self, name: &str) -> String {
        match self.config.dialect {
            DdlDialect::PostgreSQL => {
                format!("DROP CONSTRAINT {}{}", self.if_exists(), self.quote(name))
            }
            DdlDialect::MySQL => {
                if name.eq_ignore_ascii_case("PRIMARY") {
                    "DROP PRIMARY KEY".to_string()
                } else {
                    format!("DROP INDEX {}", self.quote(name))
                }
            }
        }
    }

    fn primary_key_drop_clause(&self, index_name: &str) -> String {
        match self.config.dialect {
            DdlDialect::PostgreSQL => format!(
                "DROP CONSTRAINT {}{}",
                self.if_exists(),
                self.quote(index_name)
            ),
            DdlDialect::MySQL => "DROP PRIMARY KEY".to_string(),
        }
    }

    fn foreign_key_drop_clause(&self, name: &str) -> String {
        match self.config.dialect {
            DdlDialect::PostgreSQL => {
                format!("DROP CONSTRAINT {}{}", self.if_exists(), self.quote(name))
            }
            DdlDialect::MySQL => format!("DROP FOREIGN KEY {}", self.quote(name)),
        }
    }

    /// `[CONSTRAINT name ]FOREIGN KEY (...) REFERENCES ... [actions]`;
    /// actions render only when they deviate from NO ACTION
    fn foreign_key_fragment(&self, fk: &ForeignKeyDef) -> String {
        let columns: Vec<String> = fk.columns.iter().map(|c| self.quote(c)).collect();
        let ref_columns: Vec<String> = fk.referenced_columns.iter().map(|c| self.quote(c)).collect();
        let ref_table = self.qualified_name(&fk.referenced_table, fk.referenced_schema.as_deref());

        let mut fragment = match &fk.name {
            Some(name) => format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                self.quote(name),
                columns.join(", "),
                ref_table,
                ref_columns.join(", ")
            ),
            None => format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                columns.join(", "),
                ref_table,
                ref_columns.join(", ")
            ),
        };
        if fk.on_update != ForeignKeyAction::NoAction {
            fragment.push_str(&format!(" ON UPDATE {}", fk.on_update.as_sql()));
        }
        if fk.on_delete != ForeignKeyAction::NoAction {
            fragment.push_str(&format!(" ON DELETE {}", fk.on_delete.as_sql()));
        }
        fragment
    }

    fn render_table_comment(&self, table: &str, comment: Option<&str>) -> String {
        match comment {
            Some(text) => format!("COMMENT ON TABLE {} IS {}", table, self.quote_literal(text)),
            None => format!("COMMENT ON TABLE {} IS NULL", table),
        }
    }

    fn routine_return_type<'a>(&self, routine: &'a RoutineInfo) -> &'a str {
        routine.return_type.as_deref().unwrap_or(match routine.kind {
            RoutineKind::TriggerFunction => "trigger",
            _ => "void",
        })
    }
}
