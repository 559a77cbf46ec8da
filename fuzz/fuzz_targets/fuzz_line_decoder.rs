//! Fuzz target: `LineDecoder::feed`
//!
//! Feeds arbitrary bytes, split at a fuzzer-chosen point, and checks that
//! every yielded line is non-empty, newline-free and within the buffer
//! bound.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use pixelpal::link::lines::{LineDecoder, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let Some((&cut, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(cut).min(rest.len());

    let mut decoder = LineDecoder::new();
    let mut check = |line: &[u8]| {
        assert!(!line.is_empty(), "decoder must not yield empty lines");
        assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
        assert!(!line.contains(&b'\n'));
    };
    decoder.feed(&rest[..split], &mut check);
    decoder.feed(&rest[split..], &mut check);

    decoder.reset();
    decoder.feed(rest, |_| {});
});
