//! JSON‑deserializable schema description.
//!
//! These types describe the *shape* of a binary record. They are intended to be
//! constructed from JSON (for example a schema file shipped with your
//! application) and then compiled into a [`Schema`] with [`Schema::from_def`] or
//! [`Schema::from_json`].
//!
//! ```json
//! {
//!   "name": "Packet",
//!   "fields": [
//!     { "name": "version", "kind": { "type": "UInt", "width": 1 } },
//!     { "name": "length",  "kind": { "type": "UInt", "width": 2 } },
//!     { "name": "payload", "kind": { "type": "Bytes", "length": { "type": "Field", "name": "length" } } }
//!   ]
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    bits::ByteOrder,
    codec::Length,
    errors::CompileError,
    field::{Field, Hint},
    schema::Schema,
    types::{Nested, RawBytes, Signed, Text, Unsigned},
    value::Value,
};

/// Top‑level definition of a struct kind.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Struct kind name, shown in record representations.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    /// Field name; becomes the key in records and in the decode context.
    pub name: String,
    /// Field type and its parameters.
    pub kind: FieldKindDef,
}

/// Byte order of an integer field.
#[derive(Debug, Deserialize, Serialize, Default, Clone, Copy)]
pub enum ByteOrderDef {
    #[default]
    BigEndian,
    LittleEndian,
}

/// Declared type of a field without a codec.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum HintDef {
    Bytes,
    UInt,
    Int,
    Str,
}

/// How many bytes a field occupies.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(tag = "type")]
pub enum LengthDef {
    /// A constant number of bytes.
    Fixed { size: usize },
    /// The integer value of an earlier field.
    Field { name: String },
    /// Every byte left in the input.
    #[default]
    Remaining,
}

/// A literal default value.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    UInt(u64),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

/// Kind of field in the schema.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldKindDef {
    /// Unsigned integer of `width` bytes (1 to 8).
    UInt {
        width: usize,
        #[serde(default)]
        byte_order: ByteOrderDef,
    },
    /// Two's complement integer of `width` bytes (1 to 8).
    Int {
        width: usize,
        #[serde(default)]
        byte_order: ByteOrderDef,
    },
    /// Raw bytes.
    Bytes {
        #[serde(default)]
        length: LengthDef,
    },
    /// UTF‑8 text.
    Text {
        #[serde(default)]
        length: LengthDef,
        /// Strip (and pad with) trailing zero bytes. Requires a `Fixed` length.
        #[serde(default)]
        zero_padded: bool,
    },
    /// Nested struct kind. Without a length, the nested schema's fixed size is used when it
    /// has one, otherwise the rest of the input.
    Nested {
        schema: SchemaDef,
        #[serde(default)]
        length: Option<LengthDef>,
    },
    /// Field without a codec: the raw slice, coerced to the hint's type.
    Scalar {
        hint: HintDef,
        #[serde(default)]
        default: Option<ValueDef>,
    },
}

impl From<ByteOrderDef> for ByteOrder {
    fn from(value: ByteOrderDef) -> Self {
        match value {
            ByteOrderDef::BigEndian => ByteOrder::BigEndian,
            ByteOrderDef::LittleEndian => ByteOrder::LittleEndian,
        }
    }
}

impl From<HintDef> for Hint {
    fn from(value: HintDef) -> Self {
        match value {
            HintDef::Bytes => Hint::Bytes,
            HintDef::UInt => Hint::UInt,
            HintDef::Int => Hint::Int,
            HintDef::Str => Hint::Str,
        }
    }
}

impl From<LengthDef> for Length {
    fn from(value: LengthDef) -> Self {
        match value {
            LengthDef::Fixed { size } => Length::Fixed(size),
            LengthDef::Field { name } => Length::FromField(name),
            LengthDef::Remaining => Length::Remaining,
        }
    }
}

impl From<ValueDef> for Value {
    fn from(value: ValueDef) -> Self {
        match value {
            ValueDef::UInt(v) => Value::UInt(v),
            ValueDef::Int(v) => Value::Int(v),
            ValueDef::Str(v) => Value::Str(v),
            ValueDef::Bytes(v) => Value::Bytes(v),
        }
    }
}

fn check_width(field: &str, width: usize) -> Result<usize, CompileError> {
    if (1..=8).contains(&width) {
        Ok(width)
    } else {
        Err(CompileError::InvalidDefinition(format!(
            "field {field:?}: integer width {width} is not between 1 and 8"
        )))
    }
}

impl TryFrom<FieldDef> for Field {
    type Error = CompileError;

    fn try_from(value: FieldDef) -> Result<Self, Self::Error> {
        let name = value.name;
        let field = match value.kind {
            FieldKindDef::UInt { width, byte_order } => Field::with_codec(
                name.clone(),
                Unsigned::new(check_width(&name, width)?, byte_order.into()),
            ),
            FieldKindDef::Int { width, byte_order } => Field::with_codec(
                name.clone(),
                Signed::new(check_width(&name, width)?, byte_order.into()),
            ),
            FieldKindDef::Bytes { length } => Field::with_codec(name, RawBytes::new(length.into())),
            FieldKindDef::Text {
                length,
                zero_padded,
            } => {
                let text = match (length, zero_padded) {
                    (LengthDef::Fixed { size }, true) => Text::fixed(size).zero_padded(),
                    (_, true) => {
                        return Err(CompileError::InvalidDefinition(format!(
                            "field {name:?}: zero padding requires a fixed length"
                        )));
                    }
                    (length, false) => Text::new(length.into()),
                };
                Field::with_codec(name, text)
            }
            FieldKindDef::Nested { schema, length } => {
                let schema = Schema::from_def(schema)?;
                let codec = match length {
                    Some(length) => Nested::with_length(schema, length.into()),
                    None => Nested::new(schema),
                };
                Field::with_codec(name, codec)
            }
            FieldKindDef::Scalar { hint, default } => match default {
                Some(default) => Field::with_default(name, hint.into(), Value::from(default)),
                None => Field::new(name, hint.into()),
            },
        };

        Ok(field)
    }
}

impl Schema {
    /// Compiles a deserialized [SchemaDef].
    pub fn from_def(def: SchemaDef) -> Result<Arc<Schema>, CompileError> {
        let fields = def
            .fields
            .into_iter()
            .map(Field::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Schema::compile(def.name, fields)
    }

    /// Parses a JSON [SchemaDef] and compiles it.
    pub fn from_json(json: &str) -> Result<Arc<Schema>, CompileError> {
        let def: SchemaDef = serde_json::from_str(json)
            .map_err(|e| CompileError::InvalidDefinition(e.to_string()))?;
        Schema::from_def(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_def_defaults_to_remaining() {
        let def: FieldKindDef = serde_json::from_str(r#"{ "type": "Bytes" }"#).unwrap();
        assert!(matches!(
            def,
            FieldKindDef::Bytes {
                length: LengthDef::Remaining
            }
        ));
    }

    #[test]
    fn test_value_def_untagged() {
        let values: Vec<ValueDef> = serde_json::from_str(r#"[5, -5, "x", [1, 2]]"#).unwrap();
        let values: Vec<Value> = values.into_iter().map(Value::from).collect();
        assert_eq!(
            values,
            vec![
                Value::UInt(5),
                Value::Int(-5),
                Value::from("x"),
                Value::Bytes(vec![1, 2])
            ]
        );
    }

    #[test]
    fn test_invalid_width() {
        let field = FieldDef {
            name: "n".to_string(),
            kind: FieldKindDef::UInt {
                width: 9,
                byte_order: ByteOrderDef::BigEndian,
            },
        };
        assert!(matches!(
            Field::try_from(field),
            Err(CompileError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_zero_padding_requires_fixed_length() {
        let kind: FieldKindDef = serde_json::from_str(
            r#"{ "type": "Text", "length": { "type": "Field", "name": "n" }, "zero_padded": true }"#,
        )
        .unwrap();
        let field = FieldDef {
            name: "label".to_string(),
            kind,
        };
        assert!(matches!(
            Field::try_from(field),
            Err(CompileError::InvalidDefinition(_))
        ));

        let kind: FieldKindDef = serde_json::from_str(
            r#"{ "type": "Text", "length": { "type": "Fixed", "size": 4 }, "zero_padded": true }"#,
        )
        .unwrap();
        let field = Field::try_from(FieldDef {
            name: "label".to_string(),
            kind,
        })
        .unwrap();
        assert!(matches!(field.length(), Length::Fixed(4)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Schema::from_json("{"),
            Err(CompileError::InvalidDefinition(_))
        ));
    }
}
