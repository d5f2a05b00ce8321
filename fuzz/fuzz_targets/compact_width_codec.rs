#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::proptest::assert_compact_width_roundtrip;

fuzz_target!(|value: u64| {
    assert_compact_width_roundtrip(value);
});
