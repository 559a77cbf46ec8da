//! Fuzz target: `codec::decode` and `codec::decode_stored_message`
//!
//! Any UTF-8 input must decode or fail cleanly, and an accepted message
//! must survive re-encoding for persistence.
//!
//! cargo fuzz run fuzz_message_codec

#![no_main]

use libfuzzer_sys::fuzz_target;
use pixelpal::codec::{self, TextStyle};

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(decoded) = codec::decode(payload) else {
        return;
    };

    let mut style = TextStyle::default();
    if let Some(msg) = decoded.apply(&mut style) {
        let stored = codec::encode_message(&msg).expect("message encodes");
        let restored = codec::decode_stored_message(&stored).expect("stored record decodes");
        assert_eq!(restored, msg);
    }
});
