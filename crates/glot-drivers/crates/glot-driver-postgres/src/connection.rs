//! PostgreSQL connection implementation
//!
//! A connection is either a single dedicated session or a deadpool-backed
//! pool, selected by `ConnectionConfig::pool_size`. Both are hidden behind
//! one [`Connection`] surface; statements borrow a client through an
//! internal lease so callers never see the difference.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use bytes::BytesMut;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{CancelToken, Client, NoTls, Row as PgRow, Socket, Statement};
use uuid::Uuid;

use glot_core::{
    ColumnMeta, Connection, ConnectionConfig, DialectInfo, GlotError, QueryCancelHandle,
    QueryResult, Result, Row, SchemaIntrospection, StatementResult, Value,
};

use crate::dialect::postgres_dialect;
use crate::tls::{TlsMode, build_tls_connector};

/// Flatten a tokio-postgres error into readable text plus the SQLSTATE,
/// folding in the server's detail, hint, and column fields when present.
fn describe_pg_error(error: &tokio_postgres::Error) -> (String, Option<String>) {
    let Some(db_error) = error.as_db_error() else {
        return (error.to_string(), None);
    };

    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail() {
        if !detail.trim().is_empty() {
            message.push_str(&format!(" (detail: {})", detail));
        }
    }

    if let Some(hint) = db_error.hint() {
        if !hint.trim().is_empty() {
            message.push_str(&format!(" (hint: {})", hint));
        }
    }

    if let Some(column) = db_error.column() {
        if !column.trim().is_empty() {
            message.push_str(&format!(" (column: {})", column));
        }
    }

    (message, Some(db_error.code().code().to_string()))
}

/// Statement failures keep the SQLSTATE so callers can branch on it.
pub(crate) fn statement_error(error: tokio_postgres::Error) -> GlotError {
    let (message, code) = describe_pg_error(&error);
    GlotError::Statement { message, code }
}

fn connection_error(error: tokio_postgres::Error) -> GlotError {
    let (message, code) = describe_pg_error(&error);
    match code {
        Some(code) => GlotError::Connection(format!("{} (SQLSTATE {})", message, code)),
        None => GlotError::Connection(message),
    }
}

/// Whether a statement produces a row set and must run through the query
/// path. Covers row-returning leading keywords plus DML with RETURNING.
pub(crate) fn returns_rows(sql: &str) -> bool {
    if matches!(
        leading_keyword(sql).as_deref(),
        Some("SELECT" | "WITH" | "SHOW" | "EXPLAIN" | "VALUES" | "TABLE" | "FETCH")
    ) {
        return true;
    }
    has_returning_clause(sql)
}

/// First keyword of the statement, uppercased, with leading comments skipped.
pub(crate) fn leading_keyword(sql: &str) -> Option<String> {
    let stripped = strip_leading_trivia(sql);
    let word: String = stripped
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if word.is_empty() {
        None
    } else {
        Some(word.to_ascii_uppercase())
    }
}

fn strip_leading_trivia(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

/// Word-boundary scan for RETURNING outside quoted strings, quoted
/// identifiers, comments, and dollar-quoted bodies.
pub(crate) fn has_returning_clause(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'\'' {
                        // Doubled quote is an escaped quote, not a terminator
                        if bytes.get(i + 1) == Some(&b'\'') {
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            b'"' => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == b'"' {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => match sql[i..].find('\n') {
                Some(offset) => i += offset + 1,
                None => return false,
            },
            b'/' if bytes.get(i + 1) == Some(&b'*') => match sql[i + 2..].find("*/") {
                Some(offset) => i += offset + 4,
                None => return false,
            },
            b'$' => match dollar_tag_end(bytes, i) {
                Some(tag_end) => {
                    let tag = &sql[i..tag_end];
                    match sql[tag_end..].find(tag) {
                        Some(offset) => i = tag_end + offset + tag.len(),
                        None => return false,
                    }
                }
                None => i += 1,
            },
            b'R' | b'r' => {
                let end = i + "RETURNING".len();
                let starts_word = i == 0 || !is_word_byte(bytes[i - 1]);
                let ends_word = end >= bytes.len() || !is_word_byte(bytes[end]);
                if end <= bytes.len()
                    && starts_word
                    && ends_word
                    && sql[i..end].eq_ignore_ascii_case("RETURNING")
                {
                    return true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    false
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// End offset of a `$tag$` opener at `start`, or None when the dollar sign
/// is a parameter placeholder like `$1`.
fn dollar_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if i < bytes.len() && bytes[i].is_ascii_digit() {
        return None;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'$' => return Some(i + 1),
            byte if is_word_byte(byte) => i += 1,
            _ => return None,
        }
    }
    None
}

/// Escape a PostgreSQL identifier (column name, etc.)
pub(crate) fn escape_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Escape a table name which may include a schema qualifier
pub(crate) fn escape_table_name(table_name: &str) -> String {
    match table_name.split_once('.') {
        Some((schema, table)) => {
            format!("{}.{}", escape_identifier(schema), escape_identifier(table))
        }
        None => escape_identifier(table_name),
    }
}

enum ClientHandle {
    Single(Mutex<Client>),
    Pooled(Pool),
}

/// A borrowed client, either the dedicated session or a pool checkout
pub(crate) enum ClientLease<'a> {
    Single(MutexGuard<'a, Client>),
    Pooled(Object),
}

impl std::ops::Deref for ClientLease<'_> {
    type Target = Client;

    fn deref(&self) -> &Client {
        match self {
            ClientLease::Single(guard) => guard,
            ClientLease::Pooled(object) => object,
        }
    }
}

/// PostgreSQL connection wrapper
pub struct PostgresConnection {
    handle: ClientHandle,
    /// Present only in single mode; pooled sessions cannot be cancelled.
    cancel_token: Option<CancelToken>,
    /// Rendered `SET search_path` statement for a non-default schema
    search_path: Option<String>,
    default_schema: Option<String>,
    closed: AtomicBool,
}

async fn connect_single<T>(pg_config: &tokio_postgres::Config, tls: T) -> Result<Client>
where
    T: MakeTlsConnect<Socket> + Send + 'static,
    T::Stream: Send + 'static,
    T::TlsConnect: Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let (client, connection) = pg_config.connect(tls).await.map_err(connection_error)?;

    // The connection future drives all I/O for this session
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection task failed");
        }
    });

    Ok(client)
}

impl PostgresConnection {
    /// Connect to a PostgreSQL database, opening a pool when the config asks
    /// for one and a dedicated session otherwise.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let host = config
            .get_string("host")
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.get_port(5432);
        let database = config
            .get_string("database")
            .filter(|database| !database.is_empty())
            .unwrap_or_else(|| "postgres".to_string());
        let user = config.get_string("user");
        let password = config.get_string("password");
        let ssl_mode = TlsMode::from_param(config.get_string("ssl_mode").as_deref());

        tracing::info!(
            host = %host,
            port = %port,
            database = %database,
            ssl_mode = ?ssl_mode,
            pooled = config.is_pooled(),
            "connecting to PostgreSQL database"
        );

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&host)
            .port(port)
            .dbname(&database)
            .ssl_mode(ssl_mode.negotiation());
        if let Some(user) = &user {
            pg_config.user(user);
        }
        if let Some(password) = &password {
            pg_config.password(password);
        }
        if let Some(application_name) = config.get_string("application_name") {
            pg_config.application_name(&application_name);
        }

        let tls = if ssl_mode.uses_tls() {
            Some(build_tls_connector(
                ssl_mode,
                config.get_string("ssl_ca_cert").as_deref(),
                config.get_string("ssl_client_cert").as_deref(),
                config.get_string("ssl_client_key").as_deref(),
            )?)
        } else {
            None
        };

        let default_schema = config.default_schema.clone();
        // "public" is already every session's default; only divergent schemas
        // need an explicit statement
        let search_path = default_schema
            .as_deref()
            .filter(|schema| !schema.is_empty() && *schema != "public")
            .map(|schema| format!("SET search_path TO {}", escape_identifier(schema)));

        if config.is_pooled() {
            let manager_config = ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            };
            let manager = match tls {
                Some(connector) => Manager::from_config(pg_config, connector, manager_config),
                None => Manager::from_config(pg_config, NoTls, manager_config),
            };
            let pool = Pool::builder(manager)
                .max_size(config.pool_size as usize)
                .runtime(Runtime::Tokio1)
                .build()
                .map_err(|e| {
                    GlotError::Connection(format!("Failed to build connection pool: {}", e))
                })?;

            tracing::info!(max_size = config.pool_size, "PostgreSQL connection pool ready");
            Ok(Self {
                handle: ClientHandle::Pooled(pool),
                cancel_token: None,
                search_path,
                default_schema,
                closed: AtomicBool::new(false),
            })
        } else {
            let client = match tls {
                Some(connector) => connect_single(&pg_config, connector).await?,
                None => connect_single(&pg_config, NoTls).await?,
            };
            let cancel_token = client.cancel_token();

            if let Some(statement) = &search_path {
                client
                    .execute(statement.as_str(), &[])
                    .await
                    .map_err(connection_error)?;
            }

            tracing::info!("PostgreSQL connection established");
            Ok(Self {
                handle: ClientHandle::Single(Mutex::new(client)),
                cancel_token: Some(cancel_token),
                search_path,
                default_schema,
                closed: AtomicBool::new(false),
            })
        }
    }

    /// Borrow a client. A pool checkout may be a brand-new session, so the
    /// schema override is re-applied on every lease.
    pub(crate) async fn lease(&self) -> Result<ClientLease<'_>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GlotError::NotConnected);
        }
        match &self.handle {
            ClientHandle::Single(client) => Ok(ClientLease::Single(client.lock().await)),
            ClientHandle::Pooled(pool) => {
                let object = pool.get().await.map_err(|e| {
                    GlotError::Connection(format!("Failed to check out pooled connection: {}", e))
                })?;
                if let Some(statement) = &self.search_path {
                    object
                        .execute(statement.as_str(), &[])
                        .await
                        .map_err(statement_error)?;
                }
                Ok(ClientLease::Pooled(object))
            }
        }
    }

    async fn run_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let start_time = Instant::now();
        let client = self.lease().await?;

        // Prepare first so empty result sets still carry column metadata and
        // parameters bind with the statement's concrete types
        let statement = client.prepare(sql).await.map_err(statement_error)?;
        let pg_params = bind_params(&statement, params);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let pg_rows = client
            .query(&statement, &param_refs)
            .await
            .map_err(statement_error)?;

        let mut columns = Vec::with_capacity(statement.columns().len());
        let mut column_names = Vec::with_capacity(statement.columns().len());
        for (ordinal, column) in statement.columns().iter().enumerate() {
            column_names.push(column.name().to_string());
            columns.push(ColumnMeta {
                name: column.name().to_string(),
                // Raw pg_type name; display normalization happens in the
                // shaping layer against the dialect's type table
                data_type: column.type_().name().to_string(),
                nullable: true,
                ordinal,
                table_id: column.table_oid(),
            });
        }

        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let mut values = Vec::with_capacity(pg_row.len());
            for idx in 0..pg_row.len() {
                values.push(postgres_to_value(pg_row, idx)?);
            }
            rows.push(Row::new(column_names.clone(), values));
        }

        Ok(QueryResult {
            id: Uuid::new_v4(),
            columns,
            rows,
            affected_rows: 0,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
            warnings: Vec::new(),
        })
    }

    async fn run_command(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let client = self.lease().await?;
        let statement = client.prepare(sql).await.map_err(statement_error)?;
        let pg_params = bind_params(&statement, params);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        client
            .execute(&statement, &param_refs)
            .await
            .map_err(statement_error)
    }
}

fn bind_params(statement: &Statement, params: &[Value]) -> Vec<PgValue> {
    let param_types = statement.params();
    params
        .iter()
        .enumerate()
        .map(|(idx, value)| match param_types.get(idx) {
            Some(target_type) => PgValue::from_value_for_type(value, target_type),
            None => PgValue::from_value(value),
        })
        .collect()
}

#[async_trait]
impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgres"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        tracing::debug!(
            sql_preview = %sql.chars().take(100).collect::<String>(),
            "executing statement"
        );

        if returns_rows(sql) {
            let result = self.run_query(sql, params).await?;
            Ok(StatementResult {
                is_query: true,
                result: Some(result),
                affected_rows: 0,
                error: None,
            })
        } else {
            let affected_rows = self.run_command(sql, params).await?;
            tracing::debug!(affected_rows, "statement completed");
            Ok(StatementResult {
                is_query: false,
                result: None,
                affected_rows,
                error: None,
            })
        }
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        tracing::debug!(
            sql_preview = %sql.chars().take(100).collect::<String>(),
            "executing query"
        );
        self.run_query(sql, params).await
    }

    fn dialect_info(&self) -> DialectInfo {
        postgres_dialect()
    }

    fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing PostgreSQL connection");
        self.closed.store(true, Ordering::SeqCst);
        if let ClientHandle::Pooled(pool) = &self.handle {
            pool.close();
        }
        // The dedicated session's socket closes when the last handle drops
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn as_schema_introspection(&self) -> Option<&dyn SchemaIntrospection> {
        Some(self)
    }

    fn cancel_handle(&self) -> Option<Arc<dyn QueryCancelHandle>> {
        self.cancel_token.clone().map(|cancel_token| {
            Arc::new(PostgresCancelHandle { cancel_token }) as Arc<dyn QueryCancelHandle>
        })
    }
}

/// Cancels the in-flight statement on a dedicated session by opening a
/// short-lived cancel connection to the server.
pub struct PostgresCancelHandle {
    cancel_token: CancelToken,
}

impl QueryCancelHandle for PostgresCancelHandle {
    fn cancel(&self) {
        let cancel_token = self.cancel_token.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tracing::debug!("sending cancel request to PostgreSQL server");
                    if let Err(e) = cancel_token.cancel_query(NoTls).await {
                        tracing::warn!(error = %e, "failed to cancel PostgreSQL query");
                    }
                });
            }
            Err(_) => {
                tracing::warn!("no async runtime available to issue cancel request");
            }
        }
    }
}

/// Owned parameter value with a concrete wire encoding
#[derive(Debug)]
pub(crate) enum PgValue {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    DateTimeUtc(chrono::DateTime<chrono::Utc>),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
}

/// Decodes the binary NUMERIC wire format into decimal text.
///
/// Converting NUMERIC through f64 would silently lose precision, so the
/// payload is parsed directly: a header of four 16-bit fields followed by
/// base-10000 digit groups.
#[derive(Debug)]
pub(crate) struct PgNumericString(pub(crate) String);

/// Raw UTF-8 decode for types without a native mapping (enums, domains)
#[derive(Debug)]
pub(crate) struct PgFallbackString(pub(crate) String);

impl PgNumericString {
    pub(crate) fn parse(
        raw: &[u8],
    ) -> std::result::Result<String, Box<dyn std::error::Error + Sync + Send>> {
        if raw.len() < 8 {
            return Err("invalid NUMERIC payload: too short".into());
        }

        let ndigits = i16::from_be_bytes([raw[0], raw[1]]) as usize;
        let weight = i16::from_be_bytes([raw[2], raw[3]]);
        let sign = u16::from_be_bytes([raw[4], raw[5]]);
        let dscale = i16::from_be_bytes([raw[6], raw[7]]) as usize;

        if raw.len() < 8 + ndigits * 2 {
            return Err("invalid NUMERIC payload: truncated digits".into());
        }

        if sign == 0xC000 {
            return Ok("NaN".to_string());
        }

        let mut digits = Vec::with_capacity(ndigits);
        for index in 0..ndigits {
            let offset = 8 + index * 2;
            let group = u16::from_be_bytes([raw[offset], raw[offset + 1]]);
            if group > 9999 {
                return Err("invalid NUMERIC payload: digit group out of range".into());
            }
            digits.push(group);
        }

        if digits.is_empty() {
            return Ok("0".to_string());
        }

        let integer_group_count = if weight >= 0 { weight as usize + 1 } else { 0 };

        let mut integer_text = String::new();
        if integer_group_count == 0 {
            integer_text.push('0');
        } else {
            for group_index in 0..integer_group_count {
                let group = digits.get(group_index).copied().unwrap_or(0);
                if group_index == 0 {
                    integer_text.push_str(&group.to_string());
                } else {
                    integer_text.push_str(&format!("{group:04}"));
                }
            }
        }

        let mut fraction_text = String::new();
        if dscale > 0 {
            // Groups between the decimal point and the first stored group
            // are implicit zeros when the weight sits below -1
            if weight < -1 {
                let gap_groups = (-(weight as i32) - 1) as usize;
                fraction_text.push_str(&"0".repeat(gap_groups * 4));
            }

            let start = integer_group_count.min(digits.len());
            for group in digits.iter().skip(start) {
                fraction_text.push_str(&format!("{group:04}"));
            }

            if fraction_text.len() < dscale {
                fraction_text.push_str(&"0".repeat(dscale - fraction_text.len()));
            } else {
                fraction_text.truncate(dscale);
            }

            while fraction_text.ends_with('0') {
                fraction_text.pop();
            }
        }

        let mut output = String::new();
        if sign == 0x4000 && (integer_text != "0" || !fraction_text.is_empty()) {
            output.push('-');
        }
        output.push_str(&integer_text);
        if !fraction_text.is_empty() {
            output.push('.');
            output.push_str(&fraction_text);
        }

        Ok(output)
    }
}

impl<'a> FromSql<'a> for PgNumericString {
    fn from_sql(
        _: &Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(Self(Self::parse(raw)?))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

impl<'a> FromSql<'a> for PgFallbackString {
    fn from_sql(
        _: &Type,
        raw: &'a [u8],
    ) -> std::result::Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        let text = String::from_utf8(raw.to_vec())?;
        Ok(Self(text))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

impl PgValue {
    /// Convert a parameter into the variant matching the prepared statement's
    /// declared type, so tokio-postgres writes the correct binary width
    /// (4 bytes for an INT4 target, not 8 bytes from an i64).
    pub(crate) fn from_value_for_type(value: &Value, target_type: &Type) -> Self {
        match value {
            Value::Null => PgValue::Null,
            Value::Bool(v) => PgValue::Bool(*v),

            Value::Int8(v) => Self::coerce_int(*v as i64, target_type),
            Value::Int16(v) => Self::coerce_int(*v as i64, target_type),
            Value::Int32(v) => Self::coerce_int(*v as i64, target_type),
            Value::Int64(v) => Self::coerce_int(*v, target_type),

            Value::Float32(v) => match *target_type {
                Type::FLOAT8 => PgValue::Float64(*v as f64),
                _ => PgValue::Float32(*v),
            },
            Value::Float64(v) => match *target_type {
                Type::FLOAT4 => PgValue::Float32(*v as f32),
                _ => PgValue::Float64(*v),
            },

            Value::Decimal(v) => PgValue::String(v.clone()),
            Value::String(v) => Self::coerce_string(v, target_type),
            Value::Bytes(v) => PgValue::Bytes(v.clone()),
            Value::Uuid(v) => PgValue::Uuid(*v),
            Value::Json(v) => PgValue::Json(v.clone()),
            Value::DateTimeUtc(v) => PgValue::DateTimeUtc(*v),
            Value::Date(v) => PgValue::Date(*v),
            Value::Time(v) => PgValue::Time(*v),
            Value::DateTime(v) => PgValue::DateTime(*v),
            Value::Array(_) => PgValue::String(value.to_string()),
        }
    }

    /// Pick the integer variant that matches the target column width
    fn coerce_int(value: i64, target_type: &Type) -> Self {
        match *target_type {
            Type::INT2 => PgValue::Int16(value as i16),
            Type::INT4 => PgValue::Int32(value as i32),
            _ => PgValue::Int64(value),
        }
    }

    /// Coerce string literals into strongly typed parameter values when the
    /// prepared statement provides a concrete target type
    fn coerce_string(value: &str, target_type: &Type) -> Self {
        match *target_type {
            Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(value)
                .map(PgValue::Json)
                .unwrap_or_else(|_| PgValue::String(value.to_string())),
            Type::DATE => chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(PgValue::Date)
                .unwrap_or_else(|_| PgValue::String(value.to_string())),
            Type::TIME => chrono::NaiveTime::parse_from_str(value, "%H:%M:%S")
                .or_else(|_| chrono::NaiveTime::parse_from_str(value, "%H:%M:%S%.f"))
                .map(PgValue::Time)
                .unwrap_or_else(|_| PgValue::String(value.to_string())),
            Type::TIMESTAMP => {
                let parsed = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .or_else(|| {
                        chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()
                    })
                    .or_else(|| {
                        chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .ok()
                            .and_then(|date| {
                                chrono::NaiveTime::from_hms_opt(0, 0, 0)
                                    .map(|time| date.and_time(time))
                            })
                    });
                parsed
                    .map(PgValue::DateTime)
                    .unwrap_or_else(|| PgValue::String(value.to_string()))
            }
            Type::TIMESTAMPTZ => {
                let parsed = chrono::DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|timestamp| timestamp.with_timezone(&chrono::Utc))
                    .or_else(|| {
                        chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                            .ok()
                            .or_else(|| {
                                chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
                                    .ok()
                            })
                            .map(|timestamp| {
                                chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
                                    timestamp,
                                    chrono::Utc,
                                )
                            })
                    })
                    .or_else(|| {
                        chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .ok()
                            .and_then(|date| {
                                chrono::NaiveTime::from_hms_opt(0, 0, 0).map(|time| {
                                    chrono::DateTime::<chrono::Utc>::from_naive_utc_and_offset(
                                        date.and_time(time),
                                        chrono::Utc,
                                    )
                                })
                            })
                    });
                parsed
                    .map(PgValue::DateTimeUtc)
                    .unwrap_or_else(|| PgValue::String(value.to_string()))
            }
            _ => PgValue::String(value.to_string()),
        }
    }

    /// Fallback used when the statement declares fewer parameters than were
    /// supplied and no target type is known
    pub(crate) fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => PgValue::Null,
            Value::Bool(v) => PgValue::Bool(*v),
            Value::Int8(v) => PgValue::Int16(*v as i16),
            Value::Int16(v) => PgValue::Int16(*v),
            Value::Int32(v) => PgValue::Int32(*v),
            Value::Int64(v) => PgValue::Int64(*v),
            Value::Float32(v) => PgValue::Float32(*v),
            Value::Float64(v) => PgValue::Float64(*v),
            Value::Decimal(v) => PgValue::String(v.clone()),
            Value::String(v) => PgValue::String(v.clone()),
            Value::Bytes(v) => PgValue::Bytes(v.clone()),
            Value::Uuid(v) => PgValue::Uuid(*v),
            Value::Json(v) => PgValue::Json(v.clone()),
            Value::DateTimeUtc(v) => PgValue::DateTimeUtc(*v),
            Value::Date(v) => PgValue::Date(*v),
            Value::Time(v) => PgValue::Time(*v),
            Value::DateTime(v) => PgValue::DateTime(*v),
            Value::Array(_) => PgValue::String(value.to_string()),
        }
    }
}

impl ToSql for PgValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<postgres_types::IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            PgValue::Null => Ok(postgres_types::IsNull::Yes),
            PgValue::Bool(v) => v.to_sql(ty, out),
            PgValue::Int16(v) => v.to_sql(ty, out),
            PgValue::Int32(v) => v.to_sql(ty, out),
            PgValue::Int64(v) => v.to_sql(ty, out),
            PgValue::Float32(v) => v.to_sql(ty, out),
            PgValue::Float64(v) => v.to_sql(ty, out),
            PgValue::String(v) => v.to_sql(ty, out),
            PgValue::Bytes(v) => v.to_sql(ty, out),
            PgValue::Uuid(v) => v.to_sql(ty, out),
            PgValue::Json(v) => v.to_sql(ty, out),
            PgValue::DateTimeUtc(v) => v.to_sql(ty, out),
            PgValue::Date(v) => v.to_sql(ty, out),
            PgValue::Time(v) => v.to_sql(ty, out),
            PgValue::DateTime(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    postgres_types::to_sql_checked!();
}

/// Convert one PostgreSQL row cell into a [`Value`], keyed on the pg_type
/// name of the column
pub(crate) fn postgres_to_value(row: &PgRow, idx: usize) -> Result<Value> {
    let column = &row.columns()[idx];
    let type_name = column.type_().name();

    let value = match type_name {
        "bool" => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "int2" | "smallint" => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(Value::Int16)
            .unwrap_or(Value::Null),
        "int4" | "int" | "integer" => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(Value::Int32)
            .unwrap_or(Value::Null),
        "int8" | "bigint" => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(Value::Int64)
            .unwrap_or(Value::Null),
        "float4" | "real" => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(Value::Float32)
            .unwrap_or(Value::Null),
        "float8" | "double precision" => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .map(Value::Float64)
            .unwrap_or(Value::Null),
        "text" | "varchar" | "char" | "bpchar" | "name" => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
        "bytea" => row
            .try_get::<_, Option<Vec<u8>>>(idx)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        "uuid" => row
            .try_get::<_, Option<uuid::Uuid>>(idx)
            .ok()
            .flatten()
            .map(Value::Uuid)
            .unwrap_or(Value::Null),
        "json" | "jsonb" => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .ok()
            .flatten()
            .map(Value::Json)
            .unwrap_or(Value::Null),
        "date" => row
            .try_get::<_, Option<chrono::NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),
        "time" => row
            .try_get::<_, Option<chrono::NaiveTime>>(idx)
            .ok()
            .flatten()
            .map(Value::Time)
            .unwrap_or(Value::Null),
        "timestamp" => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        "timestamptz" => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .ok()
            .flatten()
            .map(Value::DateTimeUtc)
            .unwrap_or(Value::Null),
        "numeric" | "decimal" => row
            .try_get::<_, Option<PgNumericString>>(idx)
            .ok()
            .flatten()
            .map(|value| Value::Decimal(value.0))
            .unwrap_or(Value::Null),
        // Array types report the element type with an underscore prefix
        "_text" | "_varchar" | "_bpchar" | "_name" => row
            .try_get::<_, Option<Vec<String>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::String).collect()))
            .unwrap_or(Value::Null),
        "_int2" => row
            .try_get::<_, Option<Vec<i16>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Int16).collect()))
            .unwrap_or(Value::Null),
        "_int4" => row
            .try_get::<_, Option<Vec<i32>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Int32).collect()))
            .unwrap_or(Value::Null),
        "_int8" => row
            .try_get::<_, Option<Vec<i64>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Int64).collect()))
            .unwrap_or(Value::Null),
        "_float4" => row
            .try_get::<_, Option<Vec<f32>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Float32).collect()))
            .unwrap_or(Value::Null),
        "_float8" => row
            .try_get::<_, Option<Vec<f64>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Float64).collect()))
            .unwrap_or(Value::Null),
        "_bool" => row
            .try_get::<_, Option<Vec<bool>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Bool).collect()))
            .unwrap_or(Value::Null),
        "_uuid" => row
            .try_get::<_, Option<Vec<uuid::Uuid>>>(idx)
            .ok()
            .flatten()
            .map(|arr| Value::Array(arr.into_iter().map(Value::Uuid).collect()))
            .unwrap_or(Value::Null),
        _ => {
            // Custom types (enums, domains): decode the raw UTF-8 payload
            row.try_get::<_, Option<PgFallbackString>>(idx)
                .ok()
                .flatten()
                .map(|value| Value::String(value.0))
                .unwrap_or(Value::Null)
        }
    };

    Ok(value)
}
