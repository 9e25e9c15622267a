//! Column types and the column flag grammar.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::SchemaError;

/// The semantic kind of a model field.
///
/// Dialects map a kind to a native column type; [`ColumnType::data_type`]
/// overrides the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
    Time,
    Json,
}

impl FieldKind {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Time => "time",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "int" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" | "uint" => Self::Uint32,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" | "float" => Self::Float64,
            "string" | "text" => Self::String,
            "bytes" => Self::Bytes,
            "time" | "timestamp" => Self::Time,
            "json" => Self::Json,
            _ => return Err(SchemaError::UnknownKind(s.to_string())),
        };
        Ok(kind)
    }
}

/// What happens to a deprecated column on the next migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecatedActs {
    /// Column the deprecated one is renamed to. `None` drops it.
    pub rename_to: Option<String>,
}

/// The declared type and constraints of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub kind: FieldKind,
    /// Native type overriding the dialect's mapping of `kind`.
    pub data_type: Option<String>,
    pub length: u64,
    pub decimal: u64,
    /// Default value as literal SQL text, e.g. `'x'` or `0`.
    pub default: Option<String>,
    pub on_update: Option<String>,
    pub null: bool,
    pub auto_increment: bool,
    pub comment: String,
    pub description: Vec<String>,
    pub relation: Vec<String>,
    pub deprecated: Option<DeprecatedActs>,
}

impl ColumnType {
    /// Creates a non-null column type of `kind`.
    #[must_use]
    pub const fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            data_type: None,
            length: 0,
            decimal: 0,
            default: None,
            on_update: None,
            null: false,
            auto_increment: false,
            comment: String::new(),
            description: Vec::new(),
            relation: Vec::new(),
            deprecated: None,
        }
    }

    /// Overrides the native data type.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    #[must_use]
    pub fn autoincrement(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn null(mut self) -> Self {
        self.null = true;
        self
    }

    #[must_use]
    pub fn size(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    #[must_use]
    pub fn decimal(mut self, decimal: u64) -> Self {
        self.decimal = decimal;
        self
    }

    /// Sets the default as literal SQL text.
    #[must_use]
    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    #[must_use]
    pub fn on_update(mut self, literal: impl Into<String>) -> Self {
        self.on_update = Some(literal.into());
        self
    }

    /// Marks the column deprecated; the next migration drops it.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = Some(DeprecatedActs::default());
        self
    }

    /// Marks the column deprecated in favour of `target`; the next migration
    /// renames it.
    #[must_use]
    pub fn rename_to(mut self, target: impl Into<String>) -> Self {
        self.deprecated = Some(DeprecatedActs {
            rename_to: Some(target.into()),
        });
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    #[must_use]
    pub fn description(mut self, lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.description = lines.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn relation(mut self, path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.relation = path.into_iter().map(Into::into).collect();
        self
    }

    /// Applies a comma-separated flag list.
    ///
    /// The vocabulary is `autoincrement`, `null`, `size=N`, `decimal=N`,
    /// `default=<literal>`, `onupdate=<literal>` and `deprecated[=target]`.
    /// Flag names are case-insensitive; unknown flags are ignored with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingFlagValue`] when a flag needing a value
    /// has none, and [`SchemaError::InvalidFlagValue`] when a numeric value
    /// does not parse.
    pub fn with_flags(mut self, flags: &str) -> Result<Self, SchemaError> {
        for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name.trim(), Some(value.trim())),
                None => (flag, None),
            };
            match name.to_ascii_lowercase().as_str() {
                "null" => self.null = true,
                "autoincrement" => self.auto_increment = true,
                "deprecated" => {
                    self.deprecated = Some(DeprecatedActs {
                        rename_to: value.filter(|v| !v.is_empty()).map(str::to_string),
                    });
                }
                "size" => self.length = parse_number(name, value)?,
                "decimal" => self.decimal = parse_number(name, value)?,
                "default" => self.default = Some(required(name, value)?.to_string()),
                "onupdate" => self.on_update = Some(required(name, value)?.to_string()),
                _ => warn!(flag, "ignoring unknown column flag"),
            }
        }
        Ok(self)
    }
}

fn required<'a>(flag: &str, value: Option<&'a str>) -> Result<&'a str, SchemaError> {
    value.ok_or_else(|| SchemaError::MissingFlagValue(flag.to_string()))
}

fn parse_number(flag: &str, value: Option<&str>) -> Result<u64, SchemaError> {
    let value = required(flag, value)?;
    value.parse().map_err(|_| SchemaError::InvalidFlagValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
