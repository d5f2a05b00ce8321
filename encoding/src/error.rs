use core::convert::Infallible;
use core::{fmt::Display, fmt::Formatter, num::TryFromIntError};
use either::Either;
use std::error::Error;
use ufotofu::ProduceAtLeastError as OverwriteFullSliceError;

/// Ways in which the framing of a byte stream can be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedStream {
    /// The stream ended in the middle of an entry: inside an escaped Type or Length, or before all `Length` value bytes arrived.
    UnexpectedEndOfInput,
    /// A Type or Length used an escape byte for a value that fits into a shorter encoding.
    NonMinimalWidth,
}

impl Display for MalformedStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            MalformedStream::UnexpectedEndOfInput => {
                write!(f, "the stream ended in the middle of an entry")
            }
            MalformedStream::NonMinimalWidth => {
                write!(f, "a type or length was not encoded in its shortest form")
            }
        }
    }
}

/// Why the value bytes of a well-framed entry do not fit the kind its schema declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidValue {
    /// An unsigned integer payload whose length is not 1, 2, 4, or 8 bytes.
    UintWidth(usize),
    /// A text payload that is not valid UTF-8.
    Utf8,
    /// A boolean entry that carries value bytes.
    BoolWithPayload(usize),
}

impl Display for InvalidValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            InvalidValue::UintWidth(len) => {
                write!(f, "an unsigned integer cannot be {} bytes wide", len)
            }
            InvalidValue::Utf8 => write!(f, "text is not valid UTF-8"),
            InvalidValue::BoolWithPayload(len) => {
                write!(f, "a boolean carries {} value bytes instead of none", len)
            }
        }
    }
}

/// Everything that can be wrong with a schema, or with a value checked against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field declaration carries no tag.
    MissingTag { field: String },
    /// A field declaration carries a tag that is not an unsigned 64-bit integer.
    InvalidTag { field: String, declaration: String },
    /// A field declares a kind the codec cannot represent.
    UnsupportedKind { field: String, kind: &'static str },
    /// There is no field of the given name.
    UnknownField { field: String },
    /// A value of one kind was supplied for (or requested from) a field of another kind.
    KindMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            SchemaError::MissingTag { field } => write!(f, "field `{}` has no tag", field),
            SchemaError::InvalidTag { field, declaration } => write!(
                f,
                "field `{}` has a tag that is not an unsigned 64-bit integer: {:?}",
                field, declaration
            ),
            SchemaError::UnsupportedKind { field, kind } => {
                write!(f, "field `{}` has an unsupported kind: {}", field, kind)
            }
            SchemaError::UnknownField { field } => write!(f, "there is no field `{}`", field),
            SchemaError::KindMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field `{}` holds a {} but a {} was used",
                field, expected, found
            ),
        }
    }
}

impl Error for SchemaError {}

/// Everything that can go wrong when decoding a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError<ProducerError> {
    /// The producer of the bytes to be decoded errored somehow.
    Producer(ProducerError),
    /// The bytes do not form a valid sequence of entries.
    Malformed(MalformedStream),
    /// A non-optional field was expected, but the stream holds an entry with a different tag (or no entry at all).
    SchemaMismatch { expected: u64, found: Option<u64> },
    /// An entry remained after every field of the record had been decoded.
    UnexpectedEntry { tag: u64 },
    /// An entry is well-framed, but its value bytes are not a valid value of the declared kind.
    InvalidValue { tag: u64, reason: InvalidValue },
    /// The decoded record could not be converted into the requested type.
    Schema(SchemaError),
    /// Tried to use a u64 as a usize when the current compilation target's usize is not big enough.
    U64DoesNotFitUsize,
}

impl<ProducerError> DecodeError<ProducerError> {
    /// Converts the producer error with the given function, leaving every other variant as is.
    pub fn map_producer<F, E>(self, f: F) -> DecodeError<E>
    where
        F: FnOnce(ProducerError) -> E,
    {
        match self {
            DecodeError::Producer(err) => DecodeError::Producer(f(err)),
            DecodeError::Malformed(malformed) => DecodeError::Malformed(malformed),
            DecodeError::SchemaMismatch { expected, found } => {
                DecodeError::SchemaMismatch { expected, found }
            }
            DecodeError::UnexpectedEntry { tag } => DecodeError::UnexpectedEntry { tag },
            DecodeError::InvalidValue { tag, reason } => DecodeError::InvalidValue { tag, reason },
            DecodeError::Schema(err) => DecodeError::Schema(err),
            DecodeError::U64DoesNotFitUsize => DecodeError::U64DoesNotFitUsize,
        }
    }
}

impl DecodeError<Infallible> {
    /// Turns an error from decoding an in-memory buffer into an error of any producer type.
    pub fn widen<E>(self) -> DecodeError<E> {
        self.map_producer(|never| match never {})
    }
}

impl<F, E> From<OverwriteFullSliceError<F, E>> for DecodeError<E> {
    fn from(value: OverwriteFullSliceError<F, E>) -> Self {
        match value.reason {
            Either::Left(_) => DecodeError::Malformed(MalformedStream::UnexpectedEndOfInput),
            Either::Right(err) => DecodeError::Producer(err),
        }
    }
}

impl<ProducerError> From<TryFromIntError> for DecodeError<ProducerError> {
    fn from(_: TryFromIntError) -> Self {
        DecodeError::U64DoesNotFitUsize
    }
}

impl<ProducerError> From<SchemaError> for DecodeError<ProducerError> {
    fn from(err: SchemaError) -> Self {
        DecodeError::Schema(err)
    }
}

impl<E> Error for DecodeError<E>
where
    E: 'static + Error,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Producer(err) => Some(err),
            DecodeError::Schema(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> Display for DecodeError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::Producer(_) => {
                write!(f, "The underlying producer encountered an error")
            }
            DecodeError::Malformed(malformed) => {
                write!(f, "Decoding failed due to a malformed stream: {}", malformed)
            }
            DecodeError::SchemaMismatch {
                expected,
                found: Some(found),
            } => write!(
                f,
                "Expected an entry with tag {}, but found tag {}",
                expected, found
            ),
            DecodeError::SchemaMismatch {
                expected,
                found: None,
            } => write!(
                f,
                "Expected an entry with tag {}, but the stream had no more entries",
                expected
            ),
            DecodeError::UnexpectedEntry { tag } => {
                write!(f, "Found an unexpected entry with tag {}", tag)
            }
            DecodeError::InvalidValue { tag, reason } => {
                write!(f, "The entry with tag {} is invalid: {}", tag, reason)
            }
            DecodeError::Schema(err) => write!(f, "The decoded record does not fit: {}", err),
            DecodeError::U64DoesNotFitUsize => {
                write!(f, "Tried (and failed) to decode a u64 to a 32-bit usize")
            }
        }
    }
}

/// Everything that can go wrong when encoding a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError<ConsumerError> {
    /// The consumer of the encoded bytes errored somehow.
    Consumer(ConsumerError),
    /// A value of a kind that has no wire representation.
    UnsupportedKind { kind: &'static str },
    /// The value could not be turned into a record of its schema.
    Schema(SchemaError),
}

impl<ConsumerError> EncodeError<ConsumerError> {
    /// Converts the consumer error with the given function, leaving every other variant as is.
    pub fn map_consumer<F, E>(self, f: F) -> EncodeError<E>
    where
        F: FnOnce(ConsumerError) -> E,
    {
        match self {
            EncodeError::Consumer(err) => EncodeError::Consumer(f(err)),
            EncodeError::UnsupportedKind { kind } => EncodeError::UnsupportedKind { kind },
            EncodeError::Schema(err) => EncodeError::Schema(err),
        }
    }
}

impl EncodeError<Infallible> {
    /// Turns an error from encoding into an in-memory buffer into an error of any consumer type.
    pub fn widen<E>(self) -> EncodeError<E> {
        self.map_consumer(|never| match never {})
    }
}

impl<ConsumerError> From<SchemaError> for EncodeError<ConsumerError> {
    fn from(err: SchemaError) -> Self {
        EncodeError::Schema(err)
    }
}

impl<E> Error for EncodeError<E>
where
    E: 'static + Error,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::Consumer(err) => Some(err),
            EncodeError::UnsupportedKind { .. } => None,
            EncodeError::Schema(err) => Some(err),
        }
    }
}

impl<E> Display for EncodeError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::Consumer(_) => {
                write!(f, "The underlying consumer encountered an error")
            }
            EncodeError::UnsupportedKind { kind } => {
                write!(f, "Cannot encode a value of kind {}", kind)
            }
            EncodeError::Schema(err) => write!(f, "Cannot encode the value: {}", err),
        }
    }
}

/// Everything that can go wrong when copying a value through its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyError {
    /// Encoding the source failed.
    Encode(EncodeError<Infallible>),
    /// Decoding the destination failed.
    Decode(DecodeError<Infallible>),
}

impl From<EncodeError<Infallible>> for CopyError {
    fn from(err: EncodeError<Infallible>) -> Self {
        CopyError::Encode(err)
    }
}

impl From<DecodeError<Infallible>> for CopyError {
    fn from(err: DecodeError<Infallible>) -> Self {
        CopyError::Decode(err)
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CopyError::Encode(err) => Some(err),
            CopyError::Decode(err) => Some(err),
        }
    }
}

impl Display for CopyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            CopyError::Encode(err) => write!(f, "Copying failed while encoding: {}", err),
            CopyError::Decode(err) => write!(f, "Copying failed while decoding: {}", err),
        }
    }
}
