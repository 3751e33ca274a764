//! SQL dialect metadata
//!
//! Drivers provide all metadata about their dialect: supported data types,
//! quoting rules, and the encoding they use for array column types. The rest
//! of the codebase consumes this metadata without hardcoding per-driver logic.

use std::borrow::Cow;

/// Information about a SQL data type
#[derive(Debug, Clone)]
pub struct DataTypeInfo {
    /// Type name as used in DDL (e.g., "VARCHAR", "INTEGER")
    pub name: Cow<'static, str>,
    /// Aliases (e.g., "INT" for "INTEGER")
    pub aliases: Vec<Cow<'static, str>>,
    /// Category for grouping
    pub category: DataTypeCategory,
    /// Whether this type accepts a length/precision parameter
    pub accepts_length: bool,
    /// Whether this type accepts scale (for decimals)
    pub accepts_scale: bool,
    /// Default length if applicable
    pub default_length: Option<u32>,
    /// Maximum length if applicable
    pub max_length: Option<u64>,
}

impl DataTypeInfo {
    pub const fn new(name: &'static str, category: DataTypeCategory) -> Self {
        Self {
            name: Cow::Borrowed(name),
            aliases: Vec::new(),
            category,
            accepts_length: false,
            accepts_scale: false,
            default_length: None,
            max_length: None,
        }
    }

    pub fn with_length(mut self, default: Option<u32>, max: Option<u64>) -> Self {
        self.accepts_length = true;
        self.default_length = default;
        self.max_length = max;
        self
    }

    pub fn with_scale(mut self) -> Self {
        self.accepts_scale = true;
        self
    }

    pub fn with_alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(Cow::Borrowed(alias));
        self
    }

    /// Whether `name` matches this type's name or one of its aliases
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Categories of SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataTypeCategory {
    /// Integer types (INTEGER, BIGINT, etc.)
    Integer,
    /// Floating point (REAL, DOUBLE, etc.)
    Float,
    /// Fixed precision (DECIMAL, NUMERIC)
    Decimal,
    /// Character/String (VARCHAR, TEXT, etc.)
    String,
    /// Binary data (BLOB, BYTEA, etc.)
    Binary,
    /// Boolean
    Boolean,
    /// Date only
    Date,
    /// Time only
    Time,
    /// Date and time
    DateTime,
    /// Interval/Duration
    Interval,
    /// JSON/JSONB
    Json,
    /// UUID
    Uuid,
    /// Network types (INET, CIDR, etc.)
    Network,
    /// Geometric types
    Geometry,
    /// Other database-specific
    Other,
}

/// How a dialect encodes array column types in its catalog.
///
/// PostgreSQL reports array columns with an element type name prefixed by an
/// underscore (`_int4` for an `integer[]` column). The static mapping covers
/// the common element encodings; anything else falls back to stripping the
/// marker prefix and upper-casing the remainder.
#[derive(Debug, Clone)]
pub struct ArrayTypeMapping {
    /// Prefix marking an encoded array element type (e.g. "_")
    pub marker_prefix: &'static str,
    /// Encoded name to normalized logical type
    pub mappings: &'static [(&'static str, &'static str)],
}

impl ArrayTypeMapping {
    /// Normalize an encoded array element type name.
    ///
    /// Returns `None` when `encoded` does not carry the marker prefix, i.e.
    /// the column is not an array.
    pub fn resolve(&self, encoded: &str) -> Option<String> {
        let stripped = encoded.strip_prefix(self.marker_prefix)?;
        let mapped = self
            .mappings
            .iter()
            .find(|(from, _)| *from == encoded)
            .map(|(_, to)| (*to).to_string());
        Some(mapped.unwrap_or_else(|| stripped.to_uppercase()))
    }

    /// Whether `encoded` carries the array marker prefix
    pub fn is_array_encoding(&self, encoded: &str) -> bool {
        encoded.starts_with(self.marker_prefix)
    }
}

/// Complete dialect information provided by a driver
#[derive(Debug, Clone)]
pub struct DialectInfo {
    /// Dialect identifier (e.g., "postgres")
    pub id: Cow<'static, str>,
    /// Display name
    pub display_name: Cow<'static, str>,
    /// All supported data types
    pub data_types: Vec<DataTypeInfo>,
    /// Array type encoding used by this dialect's catalog
    pub array_types: ArrayTypeMapping,
    /// Identifier quote character (e.g., '"' for SQL standard, '`' for MySQL)
    pub identifier_quote: char,
    /// String literal quote (usually '\'')
    pub string_quote: char,
    /// Statement terminator (usually ';')
    pub statement_terminator: char,
}

impl Default for DialectInfo {
    fn default() -> Self {
        Self {
            id: Cow::Borrowed("generic"),
            display_name: Cow::Borrowed("SQL"),
            data_types: Vec::new(),
            array_types: ArrayTypeMapping {
                marker_prefix: "_",
                mappings: &[],
            },
            identifier_quote: '"',
            string_quote: '\'',
            statement_terminator: ';',
        }
    }
}

impl DialectInfo {
    /// Get data types by category
    pub fn data_types_by_category(
        &self,
        category: DataTypeCategory,
    ) -> impl Iterator<Item = &DataTypeInfo> {
        self.data_types
            .iter()
            .filter(move |t| t.category == category)
    }

    /// Look up a type by name or alias
    pub fn find_type(&self, name: &str) -> Option<&DataTypeInfo> {
        self.data_types.iter().find(|t| t.matches(name))
    }

    /// Get all data type names
    pub fn data_type_names(&self) -> impl Iterator<Item = &str> {
        self.data_types.iter().map(|t| t.name.as_ref())
    }

    /// Quote an identifier with this dialect's quote character, doubling any
    /// embedded quote characters
    pub fn quote_ident(&self, ident: &str) -> String {
        let q = self.identifier_quote;
        let doubled = ident.replace(q, &format!("{}{}", q, q));
        format!("{}{}{}", q, doubled, q)
    }
}
