use either::Either::*;
use ufotofu::BulkProducer;

use crate::error::{DecodeError, MalformedStream};

/// Value bytes are read in pieces of at most this size, so that a large Length only costs memory once its bytes arrive.
const READ_CHUNK: usize = 4096;

/// Produce exactly one byte, or return a [`DecodeError`].
pub async fn produce_byte<Producer>(
    producer: &mut Producer,
) -> Result<u8, DecodeError<Producer::Error>>
where
    Producer: BulkProducer<Item = u8>,
{
    match produce_byte_or_end(producer).await? {
        Some(byte) => Ok(byte),
        None => Err(DecodeError::Malformed(
            MalformedStream::UnexpectedEndOfInput,
        )),
    }
}

/// Produce one byte, or `None` if the producer emitted its final value instead.
pub async fn produce_byte_or_end<Producer>(
    producer: &mut Producer,
) -> Result<Option<u8>, DecodeError<Producer::Error>>
where
    Producer: BulkProducer<Item = u8>,
{
    match producer.produce().await {
        Ok(Left(item)) => Ok(Some(item)),
        Ok(Right(_)) => Ok(None),
        Err(err) => Err(DecodeError::Producer(err)),
    }
}

/// Produce exactly `len` bytes into a fresh [`Vec`].
pub async fn produce_exact<Producer>(
    producer: &mut Producer,
    len: usize,
) -> Result<Vec<u8>, DecodeError<Producer::Error>>
where
    Producer: BulkProducer<Item = u8>,
{
    let mut buf = Vec::with_capacity(len.min(READ_CHUNK));

    while buf.len() < len {
        let start = buf.len();
        let end = start + (len - start).min(READ_CHUNK);
        buf.resize(end, 0);
        producer
            .bulk_overwrite_full_slice(&mut buf[start..end])
            .await?;
    }

    Ok(buf)
}
