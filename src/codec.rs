//! The field capability: how one field turns bytes into a value and back.

use std::{fmt, sync::Arc};

use crate::{
    context::Context,
    errors::{ReadError, WriteError},
    field::Hint,
    value::Value,
};

/// Context-dependent length function. The result is clamped to zero.
pub type LengthFn = Arc<dyn Fn(&Context) -> Result<i64, ReadError> + Send + Sync>;

/// How many bytes a field occupies when decoding.
///
/// Resolution follows the variant: a context-dependent length ([Length::FromField],
/// [Length::Dynamic]) is evaluated against the fields resolved so far, a [Length::Fixed]
/// size is used as is, and [Length::Remaining] takes every unconsumed byte.
#[derive(Clone, Default)]
pub enum Length {
    Fixed(usize),
    /// Integer value of an earlier field.
    FromField(String),
    Dynamic(LengthFn),
    #[default]
    Remaining,
}

impl Length {
    pub fn from_field(name: impl Into<String>) -> Self {
        Length::FromField(name.into())
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Context) -> Result<i64, ReadError> + Send + Sync + 'static,
    {
        Length::Dynamic(Arc::new(f))
    }

    /// True if the field swallows the rest of the buffer.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Length::Remaining)
    }

    /// Number of bytes requested by this field given `ctx` and the `remaining` input.
    ///
    /// The result may exceed `remaining`; the caller decides how to treat that.
    pub fn resolve(&self, ctx: &Context, remaining: usize) -> Result<usize, ReadError> {
        let requested = match self {
            Length::Fixed(size) => return Ok(*size),
            Length::Remaining => return Ok(remaining),
            Length::FromField(name) => {
                let value = ctx.get(name).ok_or_else(|| ReadError::InvalidLength {
                    field: String::new(),
                    reason: format!("field {name:?} is not resolved yet"),
                })?;
                value.as_i64().ok_or_else(|| ReadError::InvalidLength {
                    field: String::new(),
                    reason: format!("field {name:?} holds {}, not an integer", value.kind()),
                })?
            }
            Length::Dynamic(f) => f(ctx)?,
        };

        Ok(usize::try_from(requested.max(0)).unwrap_or(usize::MAX))
    }

    /// Checks that `actual` encoded bytes are exactly what decoding will request given `ctx`.
    pub fn check(&self, ctx: &Context, actual: usize) -> Result<(), WriteError> {
        if self.is_unbounded() {
            return Ok(());
        }

        let expected = self
            .resolve(ctx, actual)
            .map_err(|e| WriteError::invalid(e.to_string()))?;
        if expected != actual {
            return Err(WriteError::invalid(format!(
                "encoded to {actual} bytes but the field length is {expected}"
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Length::FromField(name) => f.debug_tuple("FromField").field(name).finish(),
            Length::Dynamic(_) => f.write_str("Dynamic(..)"),
            Length::Remaining => f.write_str("Remaining"),
        }
    }
}

/// Behavior attached to a field: its length policy, decoder and encoder.
///
/// Implementations must be pure functions of their inputs and length-stable: bytes produced
/// by [Codec::build] must be exactly what [Codec::length] asks for when the same context
/// is decoded again.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Length policy used when decoding. Defaults to consuming every remaining byte.
    fn length(&self) -> Length {
        Length::Remaining
    }

    /// Decodes exactly the field's slice.
    fn parse(&self, bytes: &[u8], ctx: &Context) -> Result<Value, ReadError>;

    /// Encodes `value` to its exact byte form.
    fn build(&self, value: &Value, ctx: &Context) -> Result<Vec<u8>, WriteError>;

    /// Value a record gets when construction does not supply one.
    fn default_value(&self) -> Value;

    /// Declared type of fields using this codec.
    fn hint(&self) -> Hint {
        Hint::of(&self.default_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        [("length", Value::UInt(12)), ("name", Value::from("x"))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fixed() {
        assert_eq!(Length::Fixed(2).resolve(&ctx(), 0), Ok(2));
    }

    #[test]
    fn test_remaining() {
        assert_eq!(Length::Remaining.resolve(&ctx(), 7), Ok(7));
        assert!(Length::Remaining.is_unbounded());
    }

    #[test]
    fn test_from_field() {
        assert_eq!(Length::from_field("length").resolve(&ctx(), 0), Ok(12));
    }

    #[test]
    fn test_from_field_missing() {
        assert!(matches!(
            Length::from_field("missing").resolve(&ctx(), 0),
            Err(ReadError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_from_field_not_integer() {
        assert!(matches!(
            Length::from_field("name").resolve(&ctx(), 0),
            Err(ReadError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_dynamic_is_clamped() {
        let length = Length::dynamic(|_| Ok(-5));
        assert_eq!(length.resolve(&ctx(), 3), Ok(0));
    }

    #[test]
    fn test_dynamic_reads_context() {
        let length = Length::dynamic(|ctx| {
            Ok(ctx.get("length").and_then(Value::as_i64).unwrap_or(0) * 2)
        });
        assert_eq!(length.resolve(&ctx(), 0), Ok(24));
    }

    #[test]
    fn test_check() {
        assert_eq!(Length::from_field("length").check(&ctx(), 12), Ok(()));
        assert!(Length::from_field("length").check(&ctx(), 11).is_err());
        assert_eq!(Length::Remaining.check(&ctx(), 99), Ok(()));
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Length::dynamic(|_| Ok(0))), "Dynamic(..)");
        assert_eq!(format!("{:?}", Length::Fixed(1)), "Fixed(1)");
    }
}
