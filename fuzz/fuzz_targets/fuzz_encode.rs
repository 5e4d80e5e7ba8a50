#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary JSON objects go through field lookup and every type parser
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = ledger_binary_codec::encode(&value, false);
        let _ = ledger_binary_codec::encode_for_signing(&value);
    }
});
