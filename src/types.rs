//! Field-type catalog: fixed-width integers, byte strings, text and nested struct kinds.
//!
//! Each type implements [Codec] and can be attached to a field with
//! [crate::field::Field::with_codec] or [crate::schema::SchemaBuilder::codec].

use std::sync::Arc;

use crate::{
    bits::{self, ByteOrder},
    codec::{Codec, Length},
    context::Context,
    errors::{ReadError, WriteError},
    field::Hint,
    schema::Schema,
    value::{Value, ValueKind},
};

/// Unsigned integer stored in `width` bytes (1 to 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unsigned {
    width: usize,
    order: ByteOrder,
}

impl Unsigned {
    /// `width` is clamped to 1..=8.
    pub fn new(width: usize, order: ByteOrder) -> Self {
        Unsigned {
            width: width.clamp(1, 8),
            order,
        }
    }

    pub fn u8() -> Self {
        Self::new(1, ByteOrder::BigEndian)
    }

    pub fn u16() -> Self {
        Self::new(2, ByteOrder::BigEndian)
    }

    pub fn u32() -> Self {
        Self::new(4, ByteOrder::BigEndian)
    }

    pub fn u64() -> Self {
        Self::new(8, ByteOrder::BigEndian)
    }

    pub fn little_endian(mut self) -> Self {
        self.order = ByteOrder::LittleEndian;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Codec for Unsigned {
    fn length(&self) -> Length {
        Length::Fixed(self.width)
    }

    fn parse(&self, bytes: &[u8], _ctx: &Context) -> Result<Value, ReadError> {
        if bytes.len() != self.width {
            return Err(ReadError::invalid(format!(
                "expected {} bytes, got {}",
                self.width,
                bytes.len()
            )));
        }

        bits::read_uint(bytes, self.order)
            .map(Value::UInt)
            .ok_or_else(|| ReadError::invalid("integer wider than 8 bytes"))
    }

    fn build(&self, value: &Value, _ctx: &Context) -> Result<Vec<u8>, WriteError> {
        let v = match value {
            Value::UInt(v) => *v,
            Value::Int(v) => u64::try_from(*v)
                .map_err(|_| WriteError::invalid(format!("{v} is negative")))?,
            other => return Err(WriteError::unexpected(ValueKind::UInt, other.kind())),
        };

        if v > bits::max_uint(self.width) {
            return Err(WriteError::invalid(format!(
                "{v} does not fit in {} bytes",
                self.width
            )));
        }

        Ok(bits::write_uint(v, self.width, self.order))
    }

    fn default_value(&self) -> Value {
        Value::UInt(0)
    }
}

/// Two's complement signed integer stored in `width` bytes (1 to 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signed {
    width: usize,
    order: ByteOrder,
}

impl Signed {
    /// `width` is clamped to 1..=8.
    pub fn new(width: usize, order: ByteOrder) -> Self {
        Signed {
            width: width.clamp(1, 8),
            order,
        }
    }

    pub fn i8() -> Self {
        Self::new(1, ByteOrder::BigEndian)
    }

    pub fn i16() -> Self {
        Self::new(2, ByteOrder::BigEndian)
    }

    pub fn i32() -> Self {
        Self::new(4, ByteOrder::BigEndian)
    }

    pub fn i64() -> Self {
        Self::new(8, ByteOrder::BigEndian)
    }

    pub fn little_endian(mut self) -> Self {
        self.order = ByteOrder::LittleEndian;
        self
    }
}

impl Codec for Signed {
    fn length(&self) -> Length {
        Length::Fixed(self.width)
    }

    fn parse(&self, bytes: &[u8], _ctx: &Context) -> Result<Value, ReadError> {
        if bytes.len() != self.width {
            return Err(ReadError::invalid(format!(
                "expected {} bytes, got {}",
                self.width,
                bytes.len()
            )));
        }

        let raw = bits::read_uint(bytes, self.order)
            .ok_or_else(|| ReadError::invalid("integer wider than 8 bytes"))?;
        Ok(Value::Int(bits::sign_extend(raw, self.width * 8)))
    }

    fn build(&self, value: &Value, _ctx: &Context) -> Result<Vec<u8>, WriteError> {
        let v = match value {
            Value::Int(v) => *v,
            Value::UInt(v) => i64::try_from(*v)
                .map_err(|_| WriteError::invalid(format!("{v} is too large")))?,
            other => return Err(WriteError::unexpected(ValueKind::Int, other.kind())),
        };

        let (min, max) = bits::int_range(self.width);
        if v < min || v > max {
            return Err(WriteError::invalid(format!(
                "{v} does not fit in {} bytes",
                self.width
            )));
        }

        Ok(bits::write_uint(v as u64, self.width, self.order))
    }

    fn default_value(&self) -> Value {
        Value::Int(0)
    }
}

/// Raw byte string whose size comes from its [Length].
#[derive(Debug, Clone, Default)]
pub struct RawBytes {
    length: Length,
}

impl RawBytes {
    pub fn new(length: Length) -> Self {
        RawBytes { length }
    }

    /// Byte string sized by the integer value of an earlier field.
    pub fn sized_by(field: impl Into<String>) -> Self {
        Self::new(Length::from_field(field))
    }

    pub fn fixed(size: usize) -> Self {
        Self::new(Length::Fixed(size))
    }

    /// Byte string consuming the rest of the input.
    pub fn rest() -> Self {
        Self::new(Length::Remaining)
    }
}

impl Codec for RawBytes {
    fn length(&self) -> Length {
        self.length.clone()
    }

    fn parse(&self, bytes: &[u8], _ctx: &Context) -> Result<Value, ReadError> {
        Ok(Value::Bytes(bytes.to_vec()))
    }

    fn build(&self, value: &Value, ctx: &Context) -> Result<Vec<u8>, WriteError> {
        let bytes = value
            .to_bytes()
            .ok_or_else(|| WriteError::unexpected(ValueKind::Bytes, value.kind()))?;
        self.length.check(ctx, bytes.len())?;
        Ok(bytes)
    }

    fn default_value(&self) -> Value {
        Value::Bytes(Vec::new())
    }
}

/// UTF-8 text whose size comes from its [Length].
#[derive(Debug, Clone, Default)]
pub struct Text {
    length: Length,
    zero_padded: bool,
}

impl Text {
    pub fn new(length: Length) -> Self {
        Text {
            length,
            zero_padded: false,
        }
    }

    pub fn sized_by(field: impl Into<String>) -> Self {
        Self::new(Length::from_field(field))
    }

    pub fn fixed(size: usize) -> Self {
        Self::new(Length::Fixed(size))
    }

    pub fn rest() -> Self {
        Self::new(Length::Remaining)
    }

    /// With a [Length::Fixed] size, shorter text is padded with NUL bytes when encoding and
    /// trailing NUL bytes are stripped when decoding. Text that itself ends in NUL is
    /// rejected when encoding. Has no effect on other lengths.
    pub fn zero_padded(mut self) -> Self {
        self.zero_padded = true;
        self
    }

    fn pads(&self) -> bool {
        self.zero_padded && matches!(self.length, Length::Fixed(_))
    }
}

impl Codec for Text {
    fn length(&self) -> Length {
        self.length.clone()
    }

    fn parse(&self, bytes: &[u8], _ctx: &Context) -> Result<Value, ReadError> {
        let bytes = if self.pads() {
            let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            &bytes[..end]
        } else {
            bytes
        };

        std::str::from_utf8(bytes)
            .map(|s| Value::Str(s.to_string()))
            .map_err(|e| ReadError::invalid(e.to_string()))
    }

    fn build(&self, value: &Value, ctx: &Context) -> Result<Vec<u8>, WriteError> {
        let mut bytes = match value {
            Value::Str(s) => s.as_bytes().to_vec(),
            other => return Err(WriteError::unexpected(ValueKind::Str, other.kind())),
        };

        if let (true, Length::Fixed(size)) = (self.pads(), &self.length) {
            if bytes.last() == Some(&0) {
                return Err(WriteError::invalid("zero-padded text must not end with NUL"));
            }
            if bytes.len() > *size {
                return Err(WriteError::invalid(format!(
                    "text is {} bytes, longer than {size}",
                    bytes.len()
                )));
            }
            bytes.resize(*size, 0);
        }

        self.length.check(ctx, bytes.len())?;
        Ok(bytes)
    }

    fn default_value(&self) -> Value {
        Value::Str(String::new())
    }
}

/// A nested struct kind embedded as one field.
#[derive(Debug, Clone)]
pub struct Nested {
    schema: Arc<Schema>,
    length: Length,
}

impl Nested {
    /// Nested struct whose length is its schema's fixed size, or the rest of the input when
    /// the schema has variable-length fields.
    pub fn new(schema: Arc<Schema>) -> Self {
        let length = schema
            .fixed_size()
            .map(Length::Fixed)
            .unwrap_or(Length::Remaining);
        Nested { schema, length }
    }

    pub fn with_length(schema: Arc<Schema>, length: Length) -> Self {
        Nested { schema, length }
    }
}

impl Codec for Nested {
    fn length(&self) -> Length {
        self.length.clone()
    }

    fn parse(&self, bytes: &[u8], _ctx: &Context) -> Result<Value, ReadError> {
        self.schema.parse_exact(bytes).map(Value::Record)
    }

    fn build(&self, value: &Value, ctx: &Context) -> Result<Vec<u8>, WriteError> {
        let record = value
            .as_record()
            .ok_or_else(|| WriteError::unexpected(ValueKind::Record, value.kind()))?;
        let bytes = record.build()?;
        self.length.check(ctx, bytes.len())?;
        Ok(bytes)
    }

    fn default_value(&self) -> Value {
        Value::Record(self.schema.default_record())
    }

    fn hint(&self) -> Hint {
        Hint::Record(self.schema.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_parse() {
        let ctx = Context::new();
        assert_eq!(Unsigned::u16().parse(&[0x00, 0x0c], &ctx), Ok(Value::UInt(12)));
        assert_eq!(
            Unsigned::u16().little_endian().parse(&[0x0c, 0x00], &ctx),
            Ok(Value::UInt(12))
        );
    }

    #[test]
    fn test_unsigned_parse_wrong_size() {
        assert!(Unsigned::u16().parse(&[0x00], &Context::new()).is_err());
    }

    #[test]
    fn test_unsigned_build() {
        let ctx = Context::new();
        assert_eq!(Unsigned::u8().build(&Value::UInt(1), &ctx), Ok(vec![0x01]));
        assert_eq!(Unsigned::u16().build(&Value::Int(12), &ctx), Ok(vec![0x00, 0x0c]));
    }

    #[test]
    fn test_unsigned_build_out_of_range() {
        let ctx = Context::new();
        assert!(Unsigned::u8().build(&Value::UInt(256), &ctx).is_err());
        assert!(Unsigned::u8().build(&Value::Int(-1), &ctx).is_err());
        assert!(Unsigned::u8().build(&Value::from(b"x"), &ctx).is_err());
    }

    #[test]
    fn test_unsigned_width_is_clamped() {
        assert_eq!(Unsigned::new(12, ByteOrder::BigEndian).width(), 8);
        assert_eq!(Unsigned::new(0, ByteOrder::BigEndian).width(), 1);
    }

    #[test]
    fn test_signed() {
        let ctx = Context::new();
        assert_eq!(Signed::i8().parse(&[0xff], &ctx), Ok(Value::Int(-1)));
        assert_eq!(Signed::i16().build(&Value::Int(-2), &ctx), Ok(vec![0xff, 0xfe]));
        assert!(Signed::i8().build(&Value::Int(128), &ctx).is_err());
    }

    #[test]
    fn test_raw_bytes_checks_length_against_context() {
        let ctx: Context = [("length", Value::UInt(3))].into_iter().collect();
        let codec = RawBytes::sized_by("length");

        assert_eq!(codec.build(&Value::from(b"abc"), &ctx), Ok(b"abc".to_vec()));
        assert!(codec.build(&Value::from(b"ab"), &ctx).is_err());
    }

    #[test]
    fn test_raw_bytes_rest_accepts_any_length() {
        let codec = RawBytes::rest();
        assert_eq!(
            codec.build(&Value::from(b"abcdef"), &Context::new()),
            Ok(b"abcdef".to_vec())
        );
    }

    #[test]
    fn test_text_zero_padded() {
        let ctx = Context::new();
        let codec = Text::fixed(6).zero_padded();

        assert_eq!(codec.build(&Value::from("abc"), &ctx), Ok(b"abc\0\0\0".to_vec()));
        assert_eq!(codec.parse(b"abc\0\0\0", &ctx), Ok(Value::from("abc")));
        assert!(codec.build(&Value::from("abcdefg"), &ctx).is_err());
    }

    #[test]
    fn test_text_zero_padded_rejects_trailing_nul() {
        let codec = Text::fixed(4).zero_padded();
        assert!(codec.build(&Value::from("a\0"), &Context::new()).is_err());
    }

    #[test]
    fn test_text_zero_padded_ignored_without_fixed_length() {
        let ctx = Context::new();
        let codec = Text::rest().zero_padded();

        assert_eq!(codec.build(&Value::from("a\0"), &ctx), Ok(b"a\0".to_vec()));
        assert_eq!(codec.parse(b"a\0", &ctx), Ok(Value::from("a\0")));
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        assert!(Text::rest().parse(&[0xff, 0xfe], &Context::new()).is_err());
    }

    #[test]
    fn test_nested() {
        let inner = Schema::builder("Inner")
            .codec("a", Unsigned::u8())
            .codec("b", Unsigned::u16())
            .compile()
            .unwrap();
        let codec = Nested::new(inner.clone());
        assert!(matches!(codec.length(), Length::Fixed(3)));

        let value = codec.parse(&[1, 0, 2], &Context::new()).unwrap();
        let record = value.as_record().unwrap();
        assert_eq!(record.get("b"), Some(&Value::UInt(2)));
        assert_eq!(codec.build(&value, &Context::new()), Ok(vec![1, 0, 2]));
        assert!(matches!(codec.hint(), Hint::Record(_)));
    }

    #[test]
    fn test_nested_rejects_leftover_bytes() {
        let inner = Schema::builder("Inner")
            .codec("a", Unsigned::u8())
            .compile()
            .unwrap();
        let codec = Nested::with_length(inner, Length::Fixed(3));

        assert_eq!(
            codec.parse(&[1, 2, 3], &Context::new()),
            Err(ReadError::TrailingBytes {
                field: String::new(),
                count: 2,
            })
        );
    }
}
