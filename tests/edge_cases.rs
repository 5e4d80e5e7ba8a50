#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for malformed input, limits and value boundaries
//! Truncated buffers, bad headers, nesting limits, amount and tag edge cases

use ledger_binary_codec::config::LimitsConfig;
use ledger_binary_codec::{decode, encode, Codec, CodecError};
use serde_json::json;
use std::sync::Arc;
use std::thread;

const ACCOUNT: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";

// ============================================================================
// MALFORMED BUFFERS
// ============================================================================

#[test]
fn test_truncated_fixed_width_value() {
    // Sequence header then only two of four bytes
    assert!(matches!(
        decode(&[0x24, 0x00, 0x01]),
        Err(CodecError::BufferUnderrun { needed: 4, remaining: 2 })
    ));
}

#[test]
fn test_truncated_escaped_header() {
    // type code escape with nothing after it
    assert!(matches!(decode(&[0x01]), Err(CodecError::BufferUnderrun { .. })));
}

#[test]
fn test_invalid_length_prefix() {
    assert!(matches!(
        decode(&[0x77, 0xFF, 0x00]),
        Err(CodecError::InvalidLengthPrefix(0xFF))
    ));
}

#[test]
fn test_escaped_code_below_sixteen() {
    // (0, type, field) form must only be used when both codes are >= 16
    assert!(matches!(decode(&[0x00, 0x02, 0x04]), Err(CodecError::InvalidFieldHeader(_))));
}

#[test]
fn test_unterminated_array() {
    // Memos containing one complete Memo and no array end marker
    assert!(decode(&[0xF9, 0xEA, 0x7C, 0x01, 0xAB, 0xE1]).is_err());
}

#[test]
fn test_unterminated_path_set() {
    let mut bytes = vec![0x01, 0x12, 0x01];
    bytes.extend(hex::decode(ACCOUNT).expect("hex"));
    assert!(matches!(decode(&bytes), Err(CodecError::MalformedPathSet(_))));
}

#[test]
fn test_path_step_with_unknown_flag() {
    let bytes = [0x01, 0x12, 0x02, 0x00];
    assert!(matches!(decode(&bytes), Err(CodecError::MalformedPathStep(_))));
}

#[test]
fn test_garbage_never_panics() {
    let samples: [&[u8]; 6] = [
        &[0xFF; 16],
        &[0x00; 16],
        &[0xE1, 0xE1, 0xE1],
        &[0xF9, 0xF9, 0xF9, 0xF9],
        &[0x7C, 0xF0],
        &[0x01, 0x12, 0xFF, 0xFF],
    ];
    for bytes in samples {
        let _ = decode(bytes);
    }
}

// ============================================================================
// LIMITS
// ============================================================================

#[test]
fn test_nesting_limit_applies_to_decode() {
    let shallow = Codec::new().with_limits(&LimitsConfig {
        max_nesting_depth: 2,
        ..LimitsConfig::default()
    });

    let two = encode(&json!({"Memo": {"Memo": {}}}), false).expect("encode");
    assert!(shallow.decode(&two).is_ok());

    let three = encode(&json!({"Memo": {"Memo": {"Memo": {}}}}), false).expect("encode");
    assert!(matches!(shallow.decode(&three), Err(CodecError::NestingTooDeep(2))));
}

#[test]
fn test_deep_nesting_within_default_limit() {
    let mut value = json!({"MemoType": "AB"});
    for _ in 0..32 {
        value = json!({ "Memo": value });
    }
    let bytes = encode(&value, false).expect("encode");
    assert_eq!(decode(&bytes).expect("decode"), value);
}

#[test]
fn test_oversized_blob_rejected_on_encode() {
    let value = json!({"Domain": "00".repeat(918_745)});
    assert!(matches!(encode(&value, false), Err(CodecError::LengthOverflow(918_745))));
}

// ============================================================================
// VALUE BOUNDARIES
// ============================================================================

#[test]
fn test_uint_ranges() {
    assert!(encode(&json!({"Sequence": 4_294_967_295u64}), false).is_ok());
    assert!(encode(&json!({"Sequence": 4_294_967_296u64}), false).is_err());
    assert!(encode(&json!({"Sequence": -1}), false).is_err());
    assert!(encode(&json!({"TransferFee": 65_536}), false).is_err());
}

#[test]
fn test_uint64_is_hex_text() {
    let value = json!({"OwnerNode": "00000000000000FF"});
    let bytes = encode(&value, false).expect("encode");
    assert_eq!(decode(&bytes).expect("decode"), value);
}

#[test]
fn test_native_amount_limits() {
    assert!(encode(&json!({"Fee": "100000000000000000"}), false).is_ok());
    assert!(encode(&json!({"Fee": "100000000000000001"}), false).is_err());
    assert!(encode(&json!({"Fee": "1.5"}), false).is_err());
}

#[test]
fn test_issued_amount_extremes() {
    for value in ["9999999999999999e80", "1e-81", "-0.000001", "0"] {
        let plain = json!({"Amount": {"currency": "USD", "issuer": ACCOUNT, "value": value}});
        let bytes = encode(&plain, false).expect(value);
        let back = decode(&bytes).expect(value);
        assert_eq!(
            encode(&back, false).expect("re-encode"),
            bytes,
            "{value} is not stable"
        );
    }
    let too_precise = json!({
        "Amount": {"currency": "USD", "issuer": ACCOUNT, "value": "1.2345678901234567"}
    });
    assert!(encode(&too_precise, false).is_err());
}

#[test]
fn test_issued_amount_rejects_native_currency() {
    let plain = json!({"Amount": {"currency": "XRP", "issuer": ACCOUNT, "value": "1"}});
    assert!(encode(&plain, false).is_err());
}

#[test]
fn test_issued_amount_with_huge_exponent_is_an_error() {
    for value in ["1e-9223372036854775808", "1e9223372036854775807"] {
        let plain = json!({"Amount": {"currency": "USD", "issuer": ACCOUNT, "value": value}});
        assert!(encode(&plain, false).is_err(), "{value}");
    }
}

#[test]
fn test_decode_rejects_native_code_in_standard_form() {
    // Amount header, issued 1, currency with "XRP" at bytes 12..15, issuer
    let mut bytes = vec![0x61, 0xD4, 0x83, 0x8D, 0x7E, 0xA4, 0xC6, 0x80, 0x00];
    let mut currency = [0u8; 20];
    currency[12..15].copy_from_slice(b"XRP");
    bytes.extend_from_slice(&currency);
    bytes.extend_from_slice(&hex::decode(ACCOUNT).unwrap());
    assert!(decode(&bytes).is_err());

    // the same bytes with a real code decode and re-encode identically
    bytes[21..24].copy_from_slice(b"USD");
    let back = decode(&bytes).unwrap();
    assert_eq!(back["Amount"]["currency"], "USD");
    assert_eq!(encode(&back, false).unwrap(), bytes);
}

#[test]
fn test_unknown_enum_value() {
    match encode(&json!({"TransactionType": "Teleport"}), false) {
        Err(CodecError::UnsupportedEnumValue { field, value }) => {
            assert_eq!(field, "TransactionType");
            assert_eq!(value, "Teleport");
        }
        other => panic!("unexpected: {other:?}"),
    }
    // unknown code on the wire
    assert!(matches!(
        decode(&[0x12, 0xFF, 0xFE]),
        Err(CodecError::UnsupportedEnumValue { .. })
    ));
}

#[test]
fn test_numeric_enum_code_accepted() {
    assert_eq!(
        encode(&json!({"TransactionType": 0}), false).expect("numeric"),
        encode(&json!({"TransactionType": "Payment"}), false).expect("named")
    );
}

#[test]
fn test_null_fields_are_skipped() {
    assert_eq!(
        encode(&json!({"Sequence": 1, "Fee": null}), false).expect("encode"),
        vec![0x24, 0, 0, 0, 1]
    );
}

#[test]
fn test_end_marker_names_rejected_as_fields() {
    assert!(encode(&json!({"ArrayEndMarker": []}), false).is_err());
    assert!(encode(&json!({"ObjectEndMarker": {}}), false).is_err());
}

#[test]
fn test_odd_length_blob_hex() {
    assert!(encode(&json!({"Domain": "ABC"}), false).is_err());
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_shared_codec_across_threads() {
    let codec = Arc::new(Codec::new());
    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let codec = Arc::clone(&codec);
            thread::spawn(move || {
                let value = json!({"Account": ACCOUNT, "Sequence": i, "Fee": "10"});
                let bytes = codec.encode(&value, false).expect("encode");
                assert_eq!(codec.decode(&bytes).expect("decode"), value);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread panicked");
    }
}
