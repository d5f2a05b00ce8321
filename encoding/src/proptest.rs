//! Helpers for property tests and fuzz targets, checking the invariants the codec must uphold.

use core::fmt::Debug;

use pollster::block_on;
use ufotofu::consumer::IntoVec;
use ufotofu::producer::FromSlice;

use crate::{
    compact_width_len, copy, decode_compact_width, decode_fields_from_slice, encode_compact_width,
    encode_fields_into_vec, DecodableSync, DecodeOptions, EncodableSync, Schema, TlvRecord,
};

/// Compact width encoding of a value has the predicted length and decodes back to the value.
pub fn assert_compact_width_roundtrip(value: u64) {
    let mut consumer = IntoVec::new();
    if block_on(encode_compact_width(value, &mut consumer)).is_err() {
        unreachable!()
    }
    let enc = consumer.into_vec();

    assert_eq!(
        enc.len(),
        compact_width_len(value),
        "Compact width encoding of {} has an unexpected length: {:?}",
        value,
        enc
    );

    let mut producer = FromSlice::new(&enc[..]);
    match block_on(decode_compact_width(&mut producer)) {
        Ok(decoded) => assert_eq!(decoded, value, "Encoding: {:?}", enc),
        Err(err) => panic!(
            "Failed to decode the compact width encoding of {}.\n\nEncoding: {:?}\n\nError: {:?}",
            value, enc, err
        ),
    }
}

/// Decoding arbitrary bytes as a compact width value either fails, or yields a value that encodes to exactly the bytes that were read.
pub fn assert_compact_width_random(data: &[u8]) {
    let mut producer = FromSlice::new(data);

    if let Ok(value) = block_on(decode_compact_width(&mut producer)) {
        let mut consumer = IntoVec::new();
        if block_on(encode_compact_width(value, &mut consumer)).is_err() {
            unreachable!()
        }
        let enc = consumer.into_vec();

        assert_eq!(
            &enc[..],
            &data[..enc.len()],
            "Decoded {} from {:?}, which is not its canonic encoding {:?}",
            value,
            data,
            enc
        );
    }
}

/// Encoding a value under a tag and decoding it again, directly or through [`copy`], yields an equal value.
pub fn assert_roundtrip<T>(t: &T, tag: u64)
where
    T: TlvRecord + Debug + PartialEq,
{
    let enc = match t.sync_encode_into_vec(tag) {
        Ok(enc) => enc,
        Err(err) => panic!("Failed to encode {:?}: {}", t, err),
    };

    match T::sync_decode_from_slice(tag, &enc) {
        Ok(decoded) => assert_eq!(
            &decoded, t,
            "Decoding the encoding of a value yielded a different value.\n\nEncoding: {:?}",
            enc
        ),
        Err(err) => panic!(
            "Failed to decode the encoding of {:?}.\n\nEncoding: {:?}\n\nError: {}",
            t, enc, err
        ),
    }

    match copy::<T, T>(t, tag) {
        Ok(copied) => assert_eq!(&copied, t, "Copying a value yielded a different value."),
        Err(err) => panic!("Failed to copy {:?}: {}", t, err),
    }
}

/// Decoding arbitrary bytes either fails, or yields a value that survives another encoding and decoding unchanged.
pub fn assert_random_input<T>(data: &[u8], tag: u64)
where
    T: TlvRecord + Debug + PartialEq,
{
    if let Ok(decoded) = T::sync_decode_from_slice(tag, data) {
        assert_roundtrip(&decoded, tag);
    }
}

/// Like [`assert_random_input`], but for a bare sequence of fields of a dynamic schema.
pub fn assert_random_fields(data: &[u8], schema: &Schema, options: &DecodeOptions) {
    if let Ok(record) = block_on(decode_fields_from_slice(data, schema, options)) {
        let enc = match block_on(encode_fields_into_vec(&record)) {
            Ok(enc) => enc,
            Err(err) => panic!("Failed to encode decoded record {:?}: {}", record, err),
        };

        match block_on(decode_fields_from_slice(&enc, schema, options)) {
            Ok(again) => assert_eq!(again, record, "Encoding: {:?}", enc),
            Err(err) => panic!(
                "Failed to decode the re-encoding of {:?}.\n\nEncoding: {:?}\n\nError: {}",
                record, enc, err
            ),
        }
    }
}
