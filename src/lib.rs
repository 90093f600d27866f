//! # structcraft
//!
//! A library for declarative binary structs.
//!
//! Describe a struct kind as an ordered list of named fields, each with a declared type and a
//! default or a codec, then decode byte slices into records and encode records back into
//! bytes. A field's length and value may depend on fields declared before it, such as a
//! length prefix sizing the payload that follows.
//!
//! ## Example
//!
//! ```
//! use structcraft::schema::Schema;
//! use structcraft::types::{RawBytes, Unsigned};
//! use structcraft::value::Value;
//!
//! let schema = Schema::builder("Packet")
//!     .codec("version", Unsigned::u8())
//!     .codec("length", Unsigned::u16())
//!     .codec("payload", RawBytes::sized_by("length"))
//!     .compile()
//!     .unwrap();
//!
//! let packet = schema.construct([
//!     ("version", Value::UInt(1)),
//!     ("length", Value::UInt(2)),
//!     ("payload", Value::from(b"hi")),
//! ]);
//! let bytes = packet.build().unwrap();
//! assert_eq!(bytes, [0x01, 0x00, 0x02, b'h', b'i']);
//!
//! let parsed = schema.parse(&bytes).unwrap();
//! assert_eq!(parsed, packet);
//! assert_eq!(parsed.to_string(), "Packet(version=1, length=2, payload=b'hi')");
//! ```

pub mod bits;
pub mod codec;
pub mod context;
pub mod errors;
pub mod field;
pub mod record;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod types;
pub mod value;

pub use codec::{Codec, Length};
pub use context::Context;
pub use errors::{CompileError, ReadError, WriteError};
pub use field::{Field, FieldDefault, Hint};
pub use record::Record;
pub use schema::{CoercionSkipped, Schema, SchemaBuilder};
pub use value::{Value, ValueKind};
