#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::{decode_fixed_width_uint, encode_fixed_width_uint, FixedWidth};
use ufotofu::consumer::IntoVec;

fuzz_target!(|data: (u64, FixedWidth)| {
    let (value, wider) = data;

    let mut consumer = IntoVec::new();
    if pollster::block_on(encode_fixed_width_uint(value, &mut consumer)).is_err() {
        unreachable!()
    }
    let enc = consumer.into_vec();

    let width = FixedWidth::from_u64(value).width();
    assert_eq!(enc.len(), 1 + width);
    assert_eq!(enc[0] as usize, width);
    assert_eq!(decode_fixed_width_uint(&enc[1..]), Some(value));

    // Non-minimal widths still decode.
    if wider.width() >= width {
        let padded = &value.to_be_bytes()[8 - wider.width()..];
        assert_eq!(decode_fixed_width_uint(padded), Some(value));
    }
});
