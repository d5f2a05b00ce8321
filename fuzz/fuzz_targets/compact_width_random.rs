#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::proptest::assert_compact_width_random;

fuzz_target!(|data: &[u8]| {
    assert_compact_width_random(data);
});
