//! Low-level integer read and write utilities for byte slices.

use std::fmt;

/// Byte order used by an integer codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::BigEndian => f.write_str("big-endian"),
            ByteOrder::LittleEndian => f.write_str("little-endian"),
        }
    }
}

/// Reads `data` (at most 8 bytes) as an unsigned integer in `order`.
pub fn read_uint(data: &[u8], order: ByteOrder) -> Option<u64> {
    if data.len() > 8 {
        return None;
    }

    let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;
    let value = match order {
        ByteOrder::BigEndian => data.iter().fold(0u64, fold),
        ByteOrder::LittleEndian => data.iter().rev().fold(0u64, fold),
    };

    Some(value)
}

/// Writes the low `width` bytes of `value` in `order`. `width` must be at most 8.
pub fn write_uint(value: u64, width: usize, order: ByteOrder) -> Vec<u8> {
    let width = width.min(8);
    let be = value.to_be_bytes();
    let mut out = be[8 - width..].to_vec();
    if order == ByteOrder::LittleEndian {
        out.reverse();
    }

    out
}

/// Largest unsigned value representable in `width` bytes.
pub fn max_uint(width: usize) -> u64 {
    if width >= 8 {
        u64::MAX
    } else {
        (1u64 << (width * 8)) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits == 0 || bits >= 64 {
        return value as i64;
    }

    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Inclusive range of signed values representable in `width` bytes.
pub fn int_range(width: usize) -> (i64, i64) {
    if width >= 8 {
        return (i64::MIN, i64::MAX);
    }

    let bits = width * 8;
    (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
}
