//! The escape-byte framing used for the Type and Length of every entry.
//!
//! Values up to `0xFC` are a single literal byte. Larger values are an escape byte followed by a big-endian integer:
//!
//! | value                         | encoding            |
//! |-------------------------------|---------------------|
//! | `0 ..= 0xFC`                  | the value itself    |
//! | `0xFD ..= 0xFFFF`             | `0xFD`, two bytes   |
//! | `0x1_0000 ..= 0xFFFF_FFFF`    | `0xFE`, four bytes  |
//! | `0x1_0000_0000 ..= u64::MAX`  | `0xFF`, eight bytes |
//!
//! The escape bytes lie outside the range of literal bytes, so every encoding is unambiguous.

use ufotofu::{BulkConsumer, BulkProducer};

use crate::bytes::produce_byte;
use crate::error::{DecodeError, MalformedStream};

/// Greatest value that is encoded as a single literal byte.
pub const MAX_LITERAL: u64 = 0xFC;
/// Escape byte announcing a two-byte value.
pub const ESCAPE_U16: u8 = 0xFD;
/// Escape byte announcing a four-byte value.
pub const ESCAPE_U32: u8 = 0xFE;
/// Escape byte announcing an eight-byte value.
pub const ESCAPE_U64: u8 = 0xFF;

/// Returns the number of bytes in the compact width encoding of `value`: 1, 3, 5, or 9.
///
/// ```
/// use tlv_encoding::compact_width_len;
///
/// assert_eq!(compact_width_len(252), 1);
/// assert_eq!(compact_width_len(253), 3);
/// assert_eq!(compact_width_len(65536), 5);
/// assert_eq!(compact_width_len(u64::MAX), 9);
/// ```
pub const fn compact_width_len(value: u64) -> usize {
    if value <= MAX_LITERAL {
        1
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

/// Encode a `u64` in compact width framing, and consume that with a [`BulkConsumer`].
pub async fn encode_compact_width<Consumer: BulkConsumer<Item = u8>>(
    value: u64,
    consumer: &mut Consumer,
) -> Result<(), Consumer::Error> {
    let mut buf = [0u8; 9];

    let len = if value <= MAX_LITERAL {
        buf[0] = value as u8;
        1
    } else if value <= u16::MAX as u64 {
        buf[0] = ESCAPE_U16;
        buf[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        3
    } else if value <= u32::MAX as u64 {
        buf[0] = ESCAPE_U32;
        buf[1..5].copy_from_slice(&(value as u32).to_be_bytes());
        5
    } else {
        buf[0] = ESCAPE_U64;
        buf[1..9].copy_from_slice(&value.to_be_bytes());
        9
    };

    consumer
        .bulk_consume_full_slice(&buf[..len])
        .await
        .map_err(|err| err.into_reason())?;

    Ok(())
}

/// Decode a compact width value from a [`BulkProducer`].
pub async fn decode_compact_width<Producer: BulkProducer<Item = u8>>(
    producer: &mut Producer,
) -> Result<u64, DecodeError<Producer::Error>> {
    let first = produce_byte(producer).await?;
    decode_compact_width_after(first, producer).await
}

/// Decode a compact width value whose first byte has already been produced.
///
/// Escaped values that would have fit a shorter encoding are rejected, so that every value has exactly one encoding.
pub async fn decode_compact_width_after<Producer: BulkProducer<Item = u8>>(
    first: u8,
    producer: &mut Producer,
) -> Result<u64, DecodeError<Producer::Error>> {
    let (value, min) = match first {
        ESCAPE_U16 => {
            let mut bytes = [0u8; 2];
            producer.bulk_overwrite_full_slice(&mut bytes).await?;
            (u16::from_be_bytes(bytes) as u64, MAX_LITERAL + 1)
        }
        ESCAPE_U32 => {
            let mut bytes = [0u8; 4];
            producer.bulk_overwrite_full_slice(&mut bytes).await?;
            (u32::from_be_bytes(bytes) as u64, u16::MAX as u64 + 1)
        }
        ESCAPE_U64 => {
            let mut bytes = [0u8; 8];
            producer.bulk_overwrite_full_slice(&mut bytes).await?;
            (u64::from_be_bytes(bytes), u32::MAX as u64 + 1)
        }
        literal => return Ok(literal as u64),
    };

    if value < min {
        return Err(DecodeError::Malformed(MalformedStream::NonMinimalWidth));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use pollster::block_on;
    use ufotofu::consumer::{IntoVec, TestConsumer, TestConsumerBuilder};
    use ufotofu::producer::{FromSlice, TestProducer, TestProducerBuilder};

    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut consumer = IntoVec::<u8>::new();
        block_on(encode_compact_width(value, &mut consumer)).unwrap();
        consumer.into_vec()
    }

    fn decode(bytes: &[u8]) -> Result<u64, DecodeError<Infallible>> {
        block_on(decode_compact_width(&mut FromSlice::new(bytes)))
    }

    #[test]
    fn boundaries() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(252), vec![0xFC]);
        assert_eq!(encode(253), vec![0xFD, 0x00, 0xFD]);
        assert_eq!(encode(65535), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(encode(65536), vec![0xFE, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(encode(4294967295), vec![0xFE, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            encode(4294967296),
            vec![0xFF, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encode(u64::MAX),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn encoding() {
        let values = [
            0,
            1,
            MAX_LITERAL,
            MAX_LITERAL + 1,
            u8::MAX as u64,
            u16::MAX as u64,
            u16::MAX as u64 + 1,
            u32::MAX as u64,
            u32::MAX as u64 + 1,
            u64::MAX,
        ];

        for value in values {
            let encoded = encode(value);
            assert_eq!(encoded.len(), compact_width_len(value));

            assert_eq!(decode(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn rejects_non_minimal() {
        assert_eq!(
            decode(&[0xFD, 0x00, 0x05]),
            Err(DecodeError::Malformed(MalformedStream::NonMinimalWidth))
        );

        assert_eq!(
            decode(&[0xFE, 0x00, 0x00, 0xFF, 0xFF]),
            Err(DecodeError::Malformed(MalformedStream::NonMinimalWidth))
        );

        assert_eq!(
            decode(&[0xFF, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(DecodeError::Malformed(MalformedStream::NonMinimalWidth))
        );
    }

    #[test]
    fn rejects_truncated_escape() {
        assert_eq!(
            decode(&[0xFE, 0x00, 0x01]),
            Err(DecodeError::Malformed(MalformedStream::UnexpectedEndOfInput))
        );

        assert_eq!(
            decode(&[]),
            Err(DecodeError::Malformed(MalformedStream::UnexpectedEndOfInput))
        );
    }

    #[test]
    fn transport_errors_pass_through() {
        // Room for the escape byte only.
        let mut consumer: TestConsumer<u8, (), i16> = TestConsumerBuilder::new(-4, 1).build();
        assert_eq!(block_on(encode_compact_width(300, &mut consumer)), Err(-4));

        let mut producer: TestProducer<u8, (), i16> =
            TestProducerBuilder::new(vec![0xFD, 0x01].into(), Err(-17)).build();
        assert_eq!(
            block_on(decode_compact_width(&mut producer)),
            Err(DecodeError::Producer(-17))
        );
    }
}
