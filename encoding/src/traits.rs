use core::convert::Infallible;
use core::future::Future;

use ufotofu::consumer::IntoVec;
use ufotofu::producer::FromSlice;
use ufotofu::BulkConsumer;

use crate::decode::{decode_record, DecodeOptions};
use crate::encode::encode_value;
use crate::error::{DecodeError, EncodeError, SchemaError};
use crate::reader::{EntryReader, Reader};
use crate::schema::Schema;
use crate::value::{Record, Value};

/// A type that can write itself as a single entry under a tag chosen by its container.
pub trait Encodable {
    /// Writes `self` as one entry with the given tag into the consumer.
    fn encode<C>(
        &self,
        tag: u64,
        consumer: &mut C,
    ) -> impl Future<Output = Result<(), EncodeError<C::Error>>>
    where
        C: BulkConsumer<Item = u8>;

    /// Encodes into a [Vec] instead of a given consumer.
    fn encode_into_vec(
        &self,
        tag: u64,
    ) -> impl Future<Output = Result<Vec<u8>, EncodeError<Infallible>>> {
        async move {
            let mut consumer = IntoVec::new();

            match self.encode(tag, &mut consumer).await {
                Ok(()) => Ok(consumer.into_vec()),
                Err(err) => Err(err.map_consumer(|_| unreachable!())),
            }
        }
    }
}

/// An encodable whose only asynchrony is that of the consumer it writes to, so it can be encoded into memory synchronously.
pub trait EncodableSync: Encodable {
    /// Synchronously encodes into a [Vec] instead of a given consumer.
    fn sync_encode_into_vec(&self, tag: u64) -> Result<Vec<u8>, EncodeError<Infallible>> {
        pollster::block_on(self.encode_into_vec(tag))
    }
}

/// A type that can populate itself from the single entry its container wrote under a given tag.
pub trait Decodable: Sized {
    /// Consumes the next entry of the reader, which must carry the given tag, and decodes `Self` from it.
    fn decode<R>(
        tag: u64,
        reader: &mut R,
    ) -> impl Future<Output = Result<Self, DecodeError<R::Error>>>
    where
        R: Reader;

    /// Decodes from a slice that holds exactly one entry with the given tag.
    fn decode_from_slice(
        tag: u64,
        enc: &[u8],
    ) -> impl Future<Output = Result<Self, DecodeError<Infallible>>> {
        async move {
            let mut reader = EntryReader::new(FromSlice::new(enc));
            let decoded = Self::decode(tag, &mut reader).await?;

            match reader.read().await? {
                None => Ok(decoded),
                Some(entry) => Err(DecodeError::<Infallible>::UnexpectedEntry { tag: entry.tag }),
            }
        }
    }
}

/// A decodable whose only asynchrony is that of the reader it reads from, so it can be decoded from memory synchronously.
pub trait DecodableSync: Decodable {
    /// Synchronously decodes from a slice instead of a given reader.
    fn sync_decode_from_slice(tag: u64, enc: &[u8]) -> Result<Self, DecodeError<Infallible>> {
        pollster::block_on(Self::decode_from_slice(tag, enc))
    }
}

/// A Rust type described by a [`Schema`], which converts to and from the matching [`Record`].
///
/// Every `TlvRecord` is [`Encodable`] and [`Decodable`], and also [`EncodableSync`] and [`DecodableSync`].
///
/// ```
/// use tlv_encoding::*;
///
/// #[derive(Debug, PartialEq)]
/// struct Ping {
///     seq: u64,
///     note: String,
/// }
///
/// impl TlvRecord for Ping {
///     fn schema() -> Schema {
///         Schema::new(vec![
///             FieldSpec::required("seq", 1, Kind::Uint),
///             FieldSpec::optional("note", 2, Kind::Text),
///         ])
///         .unwrap()
///     }
///
///     fn to_record(&self) -> Result<Record, SchemaError> {
///         let mut record = Self::schema().zeroed();
///         record.set("seq", self.seq)?;
///         record.set("note", self.note.clone())?;
///         Ok(record)
///     }
///
///     fn from_record(mut record: Record) -> Result<Self, SchemaError> {
///         Ok(Ping {
///             seq: record.take("seq")?,
///             note: record.take("note")?,
///         })
///     }
/// }
///
/// let ping = Ping { seq: 3, note: String::new() };
/// let enc = ping.sync_encode_into_vec(9).unwrap();
/// assert_eq!(enc, vec![9, 3, 1, 1, 3]);
/// assert_eq!(Ping::sync_decode_from_slice(9, &enc).unwrap(), ping);
/// ```
pub trait TlvRecord: Sized {
    /// The fields of this type, in wire order.
    fn schema() -> Schema;

    /// Converts `self` into a record of [`Self::schema`].
    fn to_record(&self) -> Result<Record, SchemaError>;

    /// Converts a record of [`Self::schema`] into `Self`.
    fn from_record(record: Record) -> Result<Self, SchemaError>;

    /// How to decode values of this type.
    fn decode_options() -> DecodeOptions {
        DecodeOptions::default()
    }
}

impl<T: TlvRecord> Encodable for T {
    async fn encode<C>(&self, tag: u64, consumer: &mut C) -> Result<(), EncodeError<C::Error>>
    where
        C: BulkConsumer<Item = u8>,
    {
        let record = self.to_record()?;
        encode_value(&Value::Record(record), tag, consumer).await
    }
}

impl<T: TlvRecord> EncodableSync for T {}

impl<T: TlvRecord> Decodable for T {
    async fn decode<R>(tag: u64, reader: &mut R) -> Result<Self, DecodeError<R::Error>>
    where
        R: Reader,
    {
        let record = decode_record(reader, tag, &T::schema(), &T::decode_options()).await?;
        Ok(T::from_record(record)?)
    }
}

impl<T: TlvRecord> DecodableSync for T {}

#[cfg(test)]
mod tests {
    use ufotofu::consumer::{TestConsumer, TestConsumerBuilder};

    use super::*;
    use crate::schema::{FieldSpec, Kind};

    #[derive(Debug, PartialEq)]
    struct Pair {
        left: u64,
        right: String,
    }

    impl TlvRecord for Pair {
        fn schema() -> Schema {
            Schema::new(vec![
                FieldSpec::required("left", 1, Kind::Uint),
                FieldSpec::required("right", 2, Kind::Text),
            ])
            .unwrap()
        }

        fn to_record(&self) -> Result<Record, SchemaError> {
            let mut record = Self::schema().zeroed();
            record.set("left", self.left)?;
            record.set("right", self.right.clone())?;
            Ok(record)
        }

        fn from_record(mut record: Record) -> Result<Self, SchemaError> {
            Ok(Pair {
                left: record.take("left")?,
                right: record.take("right")?,
            })
        }
    }

    fn pair() -> Pair {
        Pair {
            left: 7,
            right: "ab".to_string(),
        }
    }

    #[test]
    fn sync_helpers_agree_with_async() {
        let enc = pair().sync_encode_into_vec(4).unwrap();
        assert_eq!(enc, vec![4, 7, 1, 1, 7, 2, 2, b'a', b'b']);
        assert_eq!(
            pollster::block_on(pair().encode_into_vec(4)),
            Ok(enc.clone())
        );

        assert_eq!(Pair::sync_decode_from_slice(4, &enc), Ok(pair()));
        assert_eq!(
            pollster::block_on(Pair::decode_from_slice(4, &enc)),
            Ok(pair())
        );
    }

    #[test]
    fn decode_reports_the_missing_tag() {
        // The right field is required but absent.
        let enc = [4, 3, 1, 1, 7];

        assert_eq!(
            Pair::sync_decode_from_slice(4, &enc),
            Err(DecodeError::SchemaMismatch {
                expected: 2,
                found: None
            })
        );
        assert_eq!(
            Pair::sync_decode_from_slice(5, &enc),
            Err(DecodeError::SchemaMismatch {
                expected: 5,
                found: Some(4)
            })
        );
    }

    #[test]
    fn encode_passes_consumer_errors_through() {
        let mut consumer: TestConsumer<u8, (), i16> = TestConsumerBuilder::new(-4, 2).build();

        assert_eq!(
            pollster::block_on(pair().encode(4, &mut consumer)),
            Err(EncodeError::Consumer(-4))
        );
    }
}
