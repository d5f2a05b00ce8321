//! # TLV Encoding
//!
//! Schema-driven Type-Length-Value encoding of records, over [UFOTOFU](https://crates.io/crates/ufotofu) producers and consumers.
//!
//! A stream is a sequence of *entries*. Each entry is a Type (the tag of a field), a Length, and Length many value bytes. Type and Length use the [compact width](compact_width) framing; unsigned integer values use the minimal [`FixedWidth`] of 1, 2, 4, or 8 bytes.
//!
//! The wire does not describe itself: which kind of value an entry holds is known only from the [`Schema`] of the record being decoded.
//!
//! ## Records and schemas
//!
//! A [`Record`] is an ordered list of [`Field`]s, each with a tag, an optionality flag, and a [`Value`]. [`encode_fields`] writes the fields in order, leaving out optional fields that hold their zero value (for nested records: all fields zero, recursively). Lists become one entry per element, all under the field's tag; nested records become one entry holding the entries of their fields.
//!
//! [`decode_fields`] walks a [`Schema`] in the same order. It uses the single entry of lookahead of a [`Reader`] to notice absent optional fields and to collect every entry of a list.
//!
//! Encoding and decoding are `async`, since consumers and producers may have to wait on their transport. Working on in-memory buffers never waits, so the `*_into_vec` and `*_from_slice` functions can be driven to completion with a simple executor such as [`pollster::block_on`].
//!
//! ## Typed records
//!
//! Types implementing [`TlvRecord`] describe themselves with a schema and convert to and from records. They are thereby [`Encodable`] and [`Decodable`] under any tag, and can be [`copy`]ed through their encoding. The [`EncodableSync`] and [`DecodableSync`] traits add synchronous methods for in-memory encodings.
//!
//! ## Property Testing
//!
//! When the `dev` feature is enabled, the [`proptest`] module provides helpers for fuzz testing the invariants of the codec, and the option types implement `Arbitrary`.

#[cfg(feature = "dev")]
pub mod proptest;

mod bytes;
pub mod compact_width;
mod copy;
mod decode;
mod encode;
mod error;
mod fixed_width;
mod reader;
mod schema;
mod traits;
mod value;

pub use compact_width::{
    compact_width_len, decode_compact_width, decode_compact_width_after, encode_compact_width,
};
pub use copy::copy;
pub use decode::{
    decode_fields, decode_fields_from_slice, decode_record, decode_value, DecodeOptions,
    UnknownEntries,
};
pub use encode::{encode_fields, encode_fields_into_vec, encode_value, encode_value_into_vec};
pub use error::*;
pub use fixed_width::{decode_fixed_width_uint, encode_fixed_width_uint, FixedWidth};
pub use reader::{Entry, EntryReader, Reader};
pub use schema::{FieldSpec, Kind, Schema};
pub use traits::{Decodable, DecodableSync, Encodable, EncodableSync, TlvRecord};
pub use value::{Field, FromValue, Record, Value};
