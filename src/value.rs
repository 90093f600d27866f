//! Field values and the lenient coercion applied at construction time.

use std::fmt::{self, Write as _};

use crate::record::Record;

/// A value held by a record field, produced when decoding or supplied when constructing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    UInt(u64),
    Int(i64),
    /// Raw bytes; also the value of any field decoded without a codec.
    Bytes(Vec<u8>),
    Str(String),
    /// A nested record. Carries its own encoder, so it is never coerced.
    Record(Record),
}

/// The shape of a [Value] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    UInt,
    Int,
    Bytes,
    Str,
    Record,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::UInt => "unsigned integer",
            ValueKind::Int => "signed integer",
            ValueKind::Bytes => "bytes",
            ValueKind::Str => "string",
            ValueKind::Record => "record",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::UInt(_) => ValueKind::UInt,
            Value::Int(_) => ValueKind::Int,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Str(_) => ValueKind::Str,
            Value::Record(_) => ValueKind::Record,
        }
    }

    /// Integer view of the value, used by length functions reading earlier fields.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::UInt(v) => i64::try_from(*v).ok(),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Converts the value into `kind`. Returns `None` when no conversion exists.
    ///
    /// Records are never converted, and converting to the value's own kind is the identity.
    pub fn coerce_to(&self, kind: ValueKind) -> Option<Value> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        match (self, kind) {
            (Value::Int(v), ValueKind::UInt) => u64::try_from(*v).ok().map(Value::UInt),
            (Value::UInt(v), ValueKind::Int) => i64::try_from(*v).ok().map(Value::Int),
            (Value::UInt(v), ValueKind::Str) => Some(Value::Str(v.to_string())),
            (Value::Int(v), ValueKind::Str) => Some(Value::Str(v.to_string())),

            (Value::Bytes(b), ValueKind::UInt | ValueKind::Int) => {
                let text = std::str::from_utf8(b).ok()?;
                parse_decimal(text, kind)
            }
            (Value::Str(s), ValueKind::UInt | ValueKind::Int) => parse_decimal(s, kind),

            (Value::Bytes(b), ValueKind::Str) => String::from_utf8(b.clone()).ok().map(Value::Str),
            (Value::Str(s), ValueKind::Bytes) => Some(Value::Bytes(s.as_bytes().to_vec())),

            _ => None,
        }
    }

    /// Generic byte conversion used by the encoder when neither the value nor the field has a
    /// codec. Integers are written as ASCII decimal, the inverse of the bytes-to-integer
    /// coercion.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(b) => Some(b.clone()),
            Value::Str(s) => Some(s.as_bytes().to_vec()),
            Value::UInt(v) => Some(v.to_string().into_bytes()),
            Value::Int(v) => Some(v.to_string().into_bytes()),
            Value::Record(_) => None,
        }
    }

    /// Renders the value the way a record's representation shows it.
    pub fn repr(&self) -> String {
        self.to_string()
    }
}

fn parse_decimal(text: &str, kind: ValueKind) -> Option<Value> {
    let text = text.trim();
    match kind {
        ValueKind::UInt => text.parse::<u64>().ok().map(Value::UInt),
        ValueKind::Int => text.parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::UInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bytes(b) => write_bytes_repr(f, b),
            Value::Str(s) => write_str_repr(f, s),
            Value::Record(r) => write!(f, "{r}"),
        }
    }
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double { '"' } else { '\'' }
}

fn write_bytes_repr(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    f.write_char('b')?;
    f.write_char(quote)?;
    for &b in bytes {
        match b {
            b'\\' => f.write_str("\\\\")?,
            b'\t' => f.write_str("\\t")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            _ if b as char == quote => write!(f, "\\{quote}")?,
            0x20..=0x7e => f.write_char(b as char)?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char(quote)
}

fn write_str_repr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            _ if c == quote => write!(f, "\\{quote}")?,
            _ if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_same_kind_is_identity() {
        assert_eq!(Value::UInt(7).coerce_to(ValueKind::UInt), Some(Value::UInt(7)));
    }

    #[test]
    fn test_coerce_integers() {
        assert_eq!(Value::Int(7).coerce_to(ValueKind::UInt), Some(Value::UInt(7)));
        assert_eq!(Value::Int(-1).coerce_to(ValueKind::UInt), None);
        assert_eq!(Value::UInt(u64::MAX).coerce_to(ValueKind::Int), None);
        assert_eq!(Value::UInt(12).coerce_to(ValueKind::Str), Some(Value::from("12")));
    }

    #[test]
    fn test_coerce_decimal_text() {
        assert_eq!(Value::from(b"12").coerce_to(ValueKind::UInt), Some(Value::UInt(12)));
        assert_eq!(Value::from(" -3 ").coerce_to(ValueKind::Int), Some(Value::Int(-3)));
        assert_eq!(Value::from(b"\x01\x02").coerce_to(ValueKind::UInt), None);
    }

    #[test]
    fn test_coerce_text_and_bytes() {
        assert_eq!(Value::from(b"hi").coerce_to(ValueKind::Str), Some(Value::from("hi")));
        assert_eq!(Value::from(&[0xff][..]).coerce_to(ValueKind::Str), None);
        assert_eq!(Value::from("hi").coerce_to(ValueKind::Bytes), Some(Value::from(b"hi")));
        assert_eq!(Value::UInt(1).coerce_to(ValueKind::Bytes), None);
    }

    #[test]
    fn test_to_bytes() {
        assert_eq!(Value::from("ab").to_bytes(), Some(b"ab".to_vec()));
        assert_eq!(Value::UInt(123).to_bytes(), Some(b"123".to_vec()));
        assert_eq!(Value::Int(-4).to_bytes(), Some(b"-4".to_vec()));
    }

    #[test]
    fn test_repr_bytes() {
        assert_eq!(Value::from(b"Hello World!").repr(), "b'Hello World!'");
        assert_eq!(Value::from(&[0x00, b'\n', 0xff][..]).repr(), "b'\\x00\\n\\xff'");
        assert_eq!(Value::from(b"it's").repr(), "b\"it's\"");
    }

    #[test]
    fn test_repr_str() {
        assert_eq!(Value::from("abc").repr(), "'abc'");
        assert_eq!(Value::from("a'b\"").repr(), "'a\\'b\"'");
        assert_eq!(Value::Int(-4).repr(), "-4");
    }
}
