#![no_main]

use libfuzzer_sys::fuzz_target;
use tlv_encoding::proptest::assert_roundtrip;
use tlv_fuzz::Sample;

fuzz_target!(|data: (Sample, u64)| {
    let (sample, tag) = data;
    assert_roundtrip(&sample, tag);
});
