//! Error types for schema compilation, decoding and encoding.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced when compiling [crate::field::Field]s into a [crate::schema::Schema].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Struct kind name is empty.
    #[error("schema name must not be empty")]
    InvalidSchemaName,
    /// Field name is invalid (empty or duplicate).
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
    /// A schema definition could not be turned into a schema.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
}

/// Errors produced while decoding a byte slice (e.g. during [crate::schema::Schema::parse]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The resolved field length runs past the end of the input.
    #[error("field {field:?} needs {needed} bytes but only {remaining} remain")]
    Truncated {
        field: String,
        needed: usize,
        remaining: usize,
    },
    /// A context-dependent length could not be resolved.
    #[error("cannot resolve length of field {field:?}: {reason}")]
    InvalidLength { field: String, reason: String },
    /// A codec rejected the bytes of a field.
    #[error("invalid value for field {field:?}: {reason}")]
    InvalidValue { field: String, reason: String },
    /// Input had bytes left over after the last field. `field` names the enclosing field
    /// when the leftover bytes belong to a nested record, and is empty at the top level.
    #[error("extra data found in {field:?}: {count} bytes")]
    TrailingBytes { field: String, count: usize },
}

impl ReadError {
    /// Builds an [ReadError::InvalidValue]; codecs fill in the field name later via [ReadError::in_field].
    pub fn invalid(reason: impl Into<String>) -> Self {
        ReadError::InvalidValue {
            field: String::new(),
            reason: reason.into(),
        }
    }

    /// Attaches `name` to errors raised while decoding that field. Errors from a nested record
    /// already name an inner field and get the path `name.inner`.
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            ReadError::Truncated {
                field,
                needed,
                remaining,
            } => ReadError::Truncated {
                field: field_path(name, field),
                needed,
                remaining,
            },
            ReadError::InvalidLength { field, reason } => ReadError::InvalidLength {
                field: field_path(name, field),
                reason,
            },
            ReadError::InvalidValue { field, reason } => ReadError::InvalidValue {
                field: field_path(name, field),
                reason,
            },
            ReadError::TrailingBytes { field, count } => ReadError::TrailingBytes {
                field: field_path(name, field),
                count,
            },
        }
    }
}

/// Errors produced while encoding a record (e.g. during [crate::schema::Schema::build]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// No strategy could turn the field value into bytes.
    #[error("cannot build field {field:?}: {value}")]
    Unencodable { field: String, value: String },
    /// A codec rejected the value (wrong kind, out of range, ...).
    #[error("invalid value for field {field:?}: {reason}")]
    InvalidValue { field: String, reason: String },
    /// The record has no field with this name.
    #[error("unknown field {0:?}")]
    UnknownField(String),
}

impl WriteError {
    /// Builds an [WriteError::InvalidValue]; the engine fills in the field name.
    pub fn invalid(reason: impl Into<String>) -> Self {
        WriteError::InvalidValue {
            field: String::new(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a codec receiving a value of the wrong kind.
    pub fn unexpected(expected: ValueKind, found: ValueKind) -> Self {
        Self::invalid(format!("expected {expected}, found {found}"))
    }

    /// Same path rules as [ReadError::in_field].
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            WriteError::Unencodable { field, value } => WriteError::Unencodable {
                field: field_path(name, field),
                value,
            },
            WriteError::InvalidValue { field, reason } => WriteError::InvalidValue {
                field: field_path(name, field),
                reason,
            },
            WriteError::UnknownField(field) => WriteError::UnknownField(field_path(name, field)),
        }
    }
}

fn field_path(outer: &str, inner: String) -> String {
    if inner.is_empty() {
        outer.to_string()
    } else {
        format!("{outer}.{inner}")
    }
}
