//! Fuzz target: retained RTC blob decoder
//!
//! Feeds arbitrary bytes to `decode_blob` and verifies:
//! - No panics under arbitrary input, including short and oversized slices
//! - Anything that decodes re-encodes to a blob that decodes to the same state
//!
//! cargo fuzz run fuzz_retained_state

#![no_main]

use camkeeper::adapters::retained::{decode_blob, encode_blob};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(state) = decode_blob(data) {
        let blob = encode_blob(&state);
        assert_eq!(
            decode_blob(&blob),
            Some(state),
            "re-encoded state did not survive"
        );
    }
});
