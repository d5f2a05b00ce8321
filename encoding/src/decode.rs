use core::convert::Infallible;
use core::future::Future;
use core::pin::Pin;

use log::{debug, trace};
use ufotofu::producer::FromSlice;

use crate::error::{DecodeError, InvalidValue, SchemaError};
use crate::fixed_width::decode_fixed_width_uint;
use crate::reader::{Entry, EntryReader, Reader};
use crate::schema::{FieldSpec, Kind, Schema};
use crate::value::{Record, Value};

/// What to do with entries whose tag the schema of the record being decoded does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "dev", derive(arbitrary::Arbitrary))]
pub enum UnknownEntries {
    /// Fail with [`DecodeError::UnexpectedEntry`] or [`DecodeError::SchemaMismatch`].
    #[default]
    Reject,
    /// Discard them, wherever they appear among the fields of a record.
    Skip,
}

/// Configuration of the decode walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "dev", derive(arbitrary::Arbitrary))]
pub struct DecodeOptions {
    pub unknown_entries: UnknownEntries,
}

impl DecodeOptions {
    pub fn with_unknown_entries(mut self, unknown_entries: UnknownEntries) -> Self {
        self.unknown_entries = unknown_entries;
        self
    }
}

/// Decodes the fields of a record of the given schema from `reader`, until the reader has no more entries.
///
/// Fields are matched in schema order, looking one entry ahead:
///
/// - a non-optional field must come next, otherwise decoding fails with [`DecodeError::SchemaMismatch`],
/// - an optional field that does not come next keeps its zero value,
/// - a boolean is `true` if its entry comes next and `false` otherwise,
/// - a list takes every consecutive entry with its tag, possibly none.
///
/// Entries left over after the last field are handled according to [`DecodeOptions::unknown_entries`].
pub async fn decode_fields<R>(
    reader: &mut R,
    schema: &Schema,
    options: &DecodeOptions,
) -> Result<Record, DecodeError<R::Error>>
where
    R: Reader,
{
    let mut record = schema.zeroed();

    for (spec, field) in schema.fields().iter().zip(record.fields_mut().iter_mut()) {
        skip_unknown(reader, schema, options).await;
        field.value = decode_field(reader, schema, spec, options).await?;
    }

    skip_unknown(reader, schema, options).await;

    match reader.read().await? {
        None => Ok(record),
        Some(entry) => {
            debug!("unexpected entry with tag {} after the last field", entry.tag);
            Err(DecodeError::UnexpectedEntry { tag: entry.tag })
        }
    }
}

/// Decodes a record of the given schema from a slice holding exactly the encodings of its fields.
pub async fn decode_fields_from_slice(
    enc: &[u8],
    schema: &Schema,
    options: &DecodeOptions,
) -> Result<Record, DecodeError<Infallible>> {
    let mut reader = EntryReader::new(FromSlice::new(enc));
    decode_fields(&mut reader, schema, options).await
}

/// Consumes the next entry, which must have the given tag, and decodes its value as the given kind.
///
/// This decodes the value of a single field that is nested under `tag`, e.g. a whole record written by [`encode_value`](crate::encode_value).
pub async fn decode_value<R>(
    reader: &mut R,
    tag: u64,
    kind: &Kind,
    options: &DecodeOptions,
) -> Result<Value, DecodeError<R::Error>>
where
    R: Reader,
{
    if reader.peek().await != Some(tag) {
        return Err(mismatch(reader, tag).await?);
    }

    match kind {
        Kind::List(element) => {
            let mut elements = Vec::new();

            while reader.peek().await == Some(tag) {
                let entry = next_entry(reader, tag).await?;
                let element = decode_entry(entry, element, options)
                    .await
                    .map_err(DecodeError::widen)?;
                elements.push(element);
            }

            Ok(Value::List(elements))
        }
        kind => {
            let entry = next_entry(reader, tag).await?;
            decode_entry(entry, kind, options)
                .await
                .map_err(DecodeError::widen)
        }
    }
}

/// Consumes the next entry, which must have the given tag, and decodes a record of the given schema from its value.
pub async fn decode_record<R>(
    reader: &mut R,
    tag: u64,
    schema: &Schema,
    options: &DecodeOptions,
) -> Result<Record, DecodeError<R::Error>>
where
    R: Reader,
{
    if reader.peek().await != Some(tag) {
        return Err(mismatch(reader, tag).await?);
    }

    let entry = next_entry(reader, tag).await?;
    decode_body(&entry.value, schema, options)
        .await
        .map_err(DecodeError::widen)
}

async fn decode_field<R>(
    reader: &mut R,
    schema: &Schema,
    spec: &FieldSpec,
    options: &DecodeOptions,
) -> Result<Value, DecodeError<R::Error>>
where
    R: Reader,
{
    if let Kind::List(element) = &spec.kind {
        let mut elements = Vec::new();

        while reader.peek().await == Some(spec.tag) {
            let entry = next_entry(reader, spec.tag).await?;
            let element = decode_entry(entry, element, options)
                .await
                .map_err(DecodeError::widen)?;
            elements.push(element);
            skip_unknown(reader, schema, options).await;
        }

        return Ok(Value::List(elements));
    }

    if reader.peek().await == Some(spec.tag) {
        let entry = next_entry(reader, spec.tag).await?;
        decode_entry(entry, &spec.kind, options)
            .await
            .map_err(DecodeError::widen)
    } else if spec.optional || spec.kind == Kind::Bool {
        trace!("field `{}` (tag {}) is absent", spec.name, spec.tag);
        Ok(spec.kind.zero_value())
    } else {
        Err(mismatch(reader, spec.tag).await?)
    }
}

/// Decodes the value bytes of a single entry, which have already been read into memory.
async fn decode_entry(
    entry: Entry,
    kind: &Kind,
    options: &DecodeOptions,
) -> Result<Value, DecodeError<Infallible>> {
    let Entry { tag, value } = entry;

    match kind {
        Kind::Bool => {
            if value.is_empty() {
                Ok(Value::Bool(true))
            } else {
                Err(DecodeError::InvalidValue {
                    tag,
                    reason: InvalidValue::BoolWithPayload(value.len()),
                })
            }
        }
        Kind::Uint => match decode_fixed_width_uint(&value) {
            Some(n) => Ok(Value::Uint(n)),
            None => Err(DecodeError::InvalidValue {
                tag,
                reason: InvalidValue::UintWidth(value.len()),
            }),
        },
        Kind::Bytes => Ok(Value::Bytes(value)),
        Kind::Text => match String::from_utf8(value) {
            Ok(text) => Ok(Value::Text(text)),
            Err(_) => Err(DecodeError::InvalidValue {
                tag,
                reason: InvalidValue::Utf8,
            }),
        },
        // The value bytes are a bounded stream of their own.
        Kind::Record(schema) => {
            let record = decode_body(&value, schema, options).await?;
            Ok(Value::Record(record))
        }
        Kind::List(_) => Err(DecodeError::Schema(SchemaError::UnsupportedKind {
            field: format!("tag {}", tag),
            kind: "list of lists",
        })),
    }
}

type BodyFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Record, DecodeError<Infallible>>> + 'a>>;

/// Boxes the decoding of a nested record, which recurses into [`decode_entry`].
fn decode_body<'a>(
    enc: &'a [u8],
    schema: &'a Schema,
    options: &'a DecodeOptions,
) -> BodyFuture<'a> {
    Box::pin(decode_fields_from_slice(enc, schema, options))
}

/// Consumes the entry whose tag was just peeked.
async fn next_entry<R: Reader>(
    reader: &mut R,
    tag: u64,
) -> Result<Entry, DecodeError<R::Error>> {
    match reader.read().await? {
        Some(entry) => Ok(entry),
        None => Err(DecodeError::SchemaMismatch {
            expected: tag,
            found: None,
        }),
    }
}

/// Builds the error for a missing non-optional entry, unless the lookahead failed for a different reason.
async fn mismatch<R: Reader>(
    reader: &mut R,
    expected: u64,
) -> Result<DecodeError<R::Error>, DecodeError<R::Error>> {
    let found = match reader.peek().await {
        Some(tag) => Some(tag),
        // Surfaces a parse error hidden behind the failed lookahead.
        None => reader.read().await?.map(|entry| entry.tag),
    };

    debug!("expected an entry with tag {}, found {:?}", expected, found);
    Ok(DecodeError::SchemaMismatch { expected, found })
}

async fn skip_unknown<R: Reader>(reader: &mut R, schema: &Schema, options: &DecodeOptions) {
    if options.unknown_entries != UnknownEntries::Skip {
        return;
    }

    while let Some(tag) = reader.peek().await {
        if schema.declares(tag) {
            return;
        }

        trace!("skipping entry with unknown tag {}", tag);
        // The entry was parsed by the peek, so reading it cannot fail.
        let _ = reader.read().await;
    }
}
