#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::proptest::assert_random_fields;
use tlv_encoding::{DecodeOptions, TlvRecord};
use tlv_fuzz::Sample;

fuzz_target!(|data: (&[u8], DecodeOptions)| {
    let (bytes, options) = data;
    assert_random_fields(bytes, &Sample::schema(), &options);
});
