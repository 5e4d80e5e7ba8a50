#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding untrusted bytes must fail cleanly, never panic or loop
    if let Ok(value) = ledger_binary_codec::decode(data) {
        let _ = ledger_binary_codec::encode(&value, false);
    }
});
