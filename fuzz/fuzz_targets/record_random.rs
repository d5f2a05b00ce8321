#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::proptest::assert_random_input;
use tlv_fuzz::Sample;

fuzz_target!(|data: (&[u8], u64)| {
    let (bytes, tag) = data;
    assert_random_input::<Sample>(bytes, tag);
});
