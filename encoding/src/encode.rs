use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;

use ufotofu::consumer::IntoVec;
use ufotofu::BulkConsumer;

use crate::compact_width::encode_compact_width;
use crate::error::EncodeError;
use crate::fixed_width::encode_fixed_width_uint;
use crate::value::{Record, Value};

/// Writes `value` under `tag`.
///
/// - A `true` boolean is an entry with an empty value; a `false` boolean writes nothing at all.
/// - An unsigned integer is an entry of its minimal fixed width.
/// - Byte and text strings are a single entry holding their bytes.
/// - A record is a single entry holding the concatenated entries of its fields (see [`encode_fields`]).
/// - A list is one entry per element, all under `tag`. Lists of lists and lists of booleans cannot be encoded.
pub async fn encode_value<C>(
    value: &Value,
    tag: u64,
    consumer: &mut C,
) -> Result<(), EncodeError<C::Error>>
where
    C: BulkConsumer<Item = u8>,
{
    match value {
        Value::List(elements) => {
            for element in elements.iter() {
                if let Value::Bool(_) = element {
                    return Err(EncodeError::UnsupportedKind {
                        kind: "list of booleans",
                    });
                }

                encode_single(element, tag, consumer).await?;
            }

            Ok(())
        }
        value => encode_single(value, tag, consumer).await,
    }
}

/// Writes the entries of the fields of `record` in order, without an enclosing entry.
///
/// Optional fields holding their zero value are skipped.
pub async fn encode_fields<C>(
    record: &Record,
    consumer: &mut C,
) -> Result<(), EncodeError<C::Error>>
where
    C: BulkConsumer<Item = u8>,
{
    for field in record.fields().iter() {
        if field.optional && field.value.is_zero() {
            continue;
        }

        encode_value(&field.value, field.tag, consumer).await?;
    }

    Ok(())
}

/// Encodes the fields of `record` into a [`Vec`] instead of a given consumer.
pub async fn encode_fields_into_vec(record: &Record) -> Result<Vec<u8>, EncodeError<Infallible>> {
    let mut consumer = IntoVec::new();

    match encode_fields(record, &mut consumer).await {
        Ok(()) => Ok(consumer.into_vec()),
        Err(err) => Err(err.map_consumer(|_| unreachable!())),
    }
}

/// Encodes `value` under `tag` into a [`Vec`] instead of a given consumer.
pub async fn encode_value_into_vec(
    value: &Value,
    tag: u64,
) -> Result<Vec<u8>, EncodeError<Infallible>> {
    let mut consumer = IntoVec::new();

    match encode_value(value, tag, &mut consumer).await {
        Ok(()) => Ok(consumer.into_vec()),
        Err(err) => Err(err.map_consumer(|_| unreachable!())),
    }
}

/// Writes a value that is not a list as exactly one entry, or nothing for `false`.
async fn encode_single<C>(
    value: &Value,
    tag: u64,
    consumer: &mut C,
) -> Result<(), EncodeError<C::Error>>
where
    C: BulkConsumer<Item = u8>,
{
    match value {
        Value::Bool(false) => Ok(()),
        Value::Bool(true) => {
            encode_compact_width(tag, consumer)
                .await
                .map_err(EncodeError::Consumer)?;
            encode_compact_width(0, consumer)
                .await
                .map_err(EncodeError::Consumer)
        }
        Value::Uint(n) => {
            encode_compact_width(tag, consumer)
                .await
                .map_err(EncodeError::Consumer)?;
            encode_fixed_width_uint(*n, consumer)
                .await
                .map_err(EncodeError::Consumer)
        }
        Value::Bytes(bytes) => encode_length_prefixed(tag, bytes, consumer).await,
        Value::Text(text) => encode_length_prefixed(tag, text.as_bytes(), consumer).await,
        Value::Record(record) => {
            // The length prefix needs the whole body, so it is built in memory first.
            let body = encode_body(record)
                .await
                .map_err(EncodeError::widen)?;
            encode_length_prefixed(tag, &body, consumer).await
        }
        Value::List(_) => Err(EncodeError::UnsupportedKind {
            kind: "list of lists",
        }),
    }
}

type BodyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<u8>, EncodeError<Infallible>>> + 'a>>;

/// Boxes the encoding of a nested record, which recurses into [`encode_value`].
fn encode_body(record: &Record) -> BodyFuture<'_> {
    Box::pin(encode_fields_into_vec(record))
}

async fn encode_length_prefixed<C>(
    tag: u64,
    bytes: &[u8],
    consumer: &mut C,
) -> Result<(), EncodeError<C::Error>>
where
    C: BulkConsumer<Item = u8>,
{
    encode_compact_width(tag, consumer)
        .await
        .map_err(EncodeError::Consumer)?;
    encode_compact_width(bytes.len() as u64, consumer)
        .await
        .map_err(EncodeError::Consumer)?;
    consumer
        .bulk_consume_full_slice(bytes)
        .await
        .map_err(|err| EncodeError::Consumer(err.into_reason()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use pollster::block_on;
    use ufotofu::consumer::{TestConsumer, TestConsumerBuilder};

    use super::*;
    use crate::value::Field;

    #[test]
    fn list_repeats_tag() {
        let list = Value::from(vec![10_u64, 20, 30]);
        let encoded = block_on(encode_value_into_vec(&list, 9)).unwrap();
        assert_eq!(encoded, vec![9, 1, 10, 9, 1, 20, 9, 1, 30]);
    }

    #[test]
    fn bytes_are_one_entry() {
        let bytes = Value::Bytes(vec![1, 2, 3]);
        let encoded = block_on(encode_value_into_vec(&bytes, 9)).unwrap();
        assert_eq!(encoded, vec![9, 3, 1, 2, 3]);
    }

    #[test]
    fn booleans() {
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Bool(true), 4)).unwrap(),
            vec![4, 0]
        );
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Bool(false), 4)).unwrap(),
            vec![]
        );
    }

    #[test]
    fn uint_widths() {
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Uint(255), 1)).unwrap(),
            vec![1, 1, 0xFF]
        );
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Uint(256), 1)).unwrap(),
            vec![1, 2, 0x01, 0x00]
        );
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Uint(65536), 1)).unwrap(),
            vec![1, 4, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(
            block_on(encode_value_into_vec(&Value::Uint(4294967296), 1)).unwrap(),
            vec![1, 8, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn nested_record_inherits_tag() {
        let inner = Record::new()
            .with(Field::required("a", 1, 5_u64))
            .with(Field::required("b", 2, "hi"));
        let outer = Record::new().with(Field::required("inner", 300, inner));

        assert_eq!(
            block_on(encode_fields_into_vec(&outer)).unwrap(),
            vec![0xFD, 0x01, 0x2C, 7, 1, 1, 5, 2, 2, b'h', b'i']
        );
    }

    #[test]
    fn required_zero_is_emitted_optional_zero_is_not() {
        let record = Record::new()
            .with(Field::required("a", 1, 0_u64))
            .with(Field::optional("b", 2, 0_u64))
            .with(Field::required("c", 3, ""));

        assert_eq!(
            block_on(encode_fields_into_vec(&record)).unwrap(),
            vec![1, 1, 0, 3, 0]
        );
    }

    #[test]
    fn optional_zero_matches_absent_field() {
        let deep_zero = Record::new().with(Field::required(
            "deep",
            2,
            Record::new().with(Field::optional("x", 3, 0_u64)),
        ));

        let with_zero = Record::new()
            .with(Field::required("a", 1, "x"))
            .with(Field::optional("nested", 5, deep_zero))
            .with(Field::optional("n", 6, 0_u64))
            .with(Field::required("z", 7, true));
        let without = Record::new()
            .with(Field::required("a", 1, "x"))
            .with(Field::required("z", 7, true));

        assert_eq!(
            block_on(encode_fields_into_vec(&with_zero)).unwrap(),
            block_on(encode_fields_into_vec(&without)).unwrap()
        );
    }

    #[test]
    fn unsupported_kinds() {
        let nested = Value::List(vec![Value::List(vec![Value::Uint(1)])]);
        assert_eq!(
            block_on(encode_value_into_vec(&nested, 1)),
            Err(EncodeError::UnsupportedKind {
                kind: "list of lists"
            })
        );

        let bools = Value::List(vec![Value::Bool(true)]);
        assert_eq!(
            block_on(encode_value_into_vec(&bools, 1)),
            Err(EncodeError::UnsupportedKind {
                kind: "list of booleans"
            })
        );
    }

    #[test]
    fn consumer_errors_pass_through() {
        let record = Record::new()
            .with(Field::required("a", 1, 5_u64))
            .with(Field::required("b", 2, "hello"));

        // The consumer fails after accepting three bytes.
        let mut consumer: TestConsumer<u8, (), i16> = TestConsumerBuilder::new(-4, 3).build();

        assert_eq!(
            block_on(encode_fields(&record, &mut consumer)),
            Err(EncodeError::Consumer(-4))
        );
    }
}
