//! Definition of the named fields used to build a [crate::schema::Schema].

use std::sync::Arc;

use crate::{
    codec::{Codec, Length},
    errors::ReadError,
    schema::Schema,
    value::{Value, ValueKind},
};

/// Declared type of a field: a coercion hint and the source of its implicit default.
#[derive(Debug, Clone)]
pub enum Hint {
    Bytes,
    UInt,
    Int,
    Str,
    /// A nested struct kind; fields with this hint decode their slice with the nested schema.
    Record(Arc<Schema>),
}

impl Hint {
    /// Hint matching the shape of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::UInt(_) => Hint::UInt,
            Value::Int(_) => Hint::Int,
            Value::Bytes(_) => Hint::Bytes,
            Value::Str(_) => Hint::Str,
            Value::Record(r) => Hint::Record(r.schema().clone()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Hint::Bytes => ValueKind::Bytes,
            Hint::UInt => ValueKind::UInt,
            Hint::Int => ValueKind::Int,
            Hint::Str => ValueKind::Str,
            Hint::Record(_) => ValueKind::Record,
        }
    }

    /// The value a field of this type holds when nothing else is declared.
    pub fn default_value(&self) -> Value {
        match self {
            Hint::Bytes => Value::Bytes(Vec::new()),
            Hint::UInt => Value::UInt(0),
            Hint::Int => Value::Int(0),
            Hint::Str => Value::Str(String::new()),
            Hint::Record(schema) => Value::Record(schema.default_record()),
        }
    }

    /// Decoder offered by the type itself. Only nested struct kinds have one, and it must
    /// consume the whole slice; every other type leaves the raw slice untouched.
    pub fn parse(&self, bytes: &[u8]) -> Option<Result<Value, ReadError>> {
        match self {
            Hint::Record(schema) => Some(schema.parse_exact(bytes).map(Value::Record)),
            _ => None,
        }
    }
}

/// A field's default: either a plain value used as a coercion target, or a codec.
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Scalar(Value),
    Codec(Arc<dyn Codec>),
}

impl FieldDefault {
    pub fn codec(&self) -> Option<&dyn Codec> {
        match self {
            FieldDefault::Codec(codec) => Some(codec.as_ref()),
            FieldDefault::Scalar(_) => None,
        }
    }

    /// Value used when construction receives nothing for the field.
    pub fn value(&self) -> Value {
        match self {
            FieldDefault::Scalar(v) => v.clone(),
            FieldDefault::Codec(codec) => codec.default_value(),
        }
    }

    /// Length policy; fields without a codec consume the rest of the buffer.
    pub fn length(&self) -> Length {
        match self {
            FieldDefault::Codec(codec) => codec.length(),
            FieldDefault::Scalar(_) => Length::Remaining,
        }
    }
}

/// A single named field in a struct kind.
#[derive(Debug, Clone)]
pub struct Field {
    /// Name used as the key in records and in the decode/encode context.
    pub name: String,
    pub hint: Hint,
    pub default: FieldDefault,
}

impl Field {
    /// Field whose default is the hint's implicit default.
    pub fn new(name: impl Into<String>, hint: Hint) -> Self {
        let default = FieldDefault::Scalar(hint.default_value());
        Field {
            name: name.into(),
            hint,
            default,
        }
    }

    /// Field with an explicit scalar default.
    pub fn with_default(name: impl Into<String>, hint: Hint, default: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            hint,
            default: FieldDefault::Scalar(default.into()),
        }
    }

    /// Field decoded and encoded by `codec`.
    pub fn with_codec(name: impl Into<String>, codec: impl Codec + 'static) -> Self {
        Self::with_shared_codec(name, Arc::new(codec))
    }

    pub fn with_shared_codec(name: impl Into<String>, codec: Arc<dyn Codec>) -> Self {
        Field {
            name: name.into(),
            hint: codec.hint(),
            default: FieldDefault::Codec(codec),
        }
    }

    pub fn length(&self) -> Length {
        self.default.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unsigned;

    #[test]
    fn test_implicit_defaults() {
        assert_eq!(Field::new("a", Hint::Bytes).default.value(), Value::Bytes(vec![]));
        assert_eq!(Field::new("a", Hint::UInt).default.value(), Value::UInt(0));
        assert_eq!(Field::new("a", Hint::Str).default.value(), Value::from(""));
    }

    #[test]
    fn test_scalar_default_is_unbounded() {
        let field = Field::with_default("a", Hint::UInt, 5u8);
        assert!(field.length().is_unbounded());
        assert!(field.default.codec().is_none());
    }

    #[test]
    fn test_codec_field_takes_hint_from_codec() {
        let field = Field::with_codec("version", Unsigned::u8());
        assert_eq!(field.hint.kind(), ValueKind::UInt);
        assert!(matches!(field.length(), Length::Fixed(1)));
        assert_eq!(field.default.value(), Value::UInt(0));
    }

    #[test]
    fn test_plain_hints_have_no_parser() {
        assert!(Hint::Bytes.parse(b"abc").is_none());
        assert!(Hint::UInt.parse(b"abc").is_none());
    }
}
