//! Integration tests for the signing encodings

#![allow(clippy::expect_used, clippy::unwrap_used)]

use ledger_binary_codec::codec::{CLAIM_PREFIX, MULTISIGNING_PREFIX, SIGNING_PREFIX};
use ledger_binary_codec::types::ACCOUNT_ID_LENGTH;
use ledger_binary_codec::{
    decode, encode, encode_for_multisigning, encode_for_signing, encode_for_signing_claim,
    AddressCodec, Codec, CodecError, HexAddressCodec, Result,
};
use serde_json::{json, Value};
use std::sync::Arc;

const ACCOUNT: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";
const SIGNER: &str = "0A20B3C85F482532A9578DBB3950B85CA06594D1";

fn signed_tx() -> Value {
    json!({
        "TransactionType": "Payment",
        "Account": ACCOUNT,
        "Destination": SIGNER,
        "Amount": "1000",
        "Fee": "10",
        "Sequence": 3,
        "SigningPubKey": "03AB40A0490F9B7ED8DF29D246BF2D6269820A0EE7742ACDD457BEA7C7D0931EDB",
        "TxnSignature": "30440220",
        "hash": "00".repeat(32)
    })
}

#[test]
fn test_signing_encoding_drops_signature() {
    let full = encode(&signed_tx(), false).expect("full");
    let signing = encode(&signed_tx(), true).expect("signing");
    assert!(signing.len() < full.len());

    let decoded = decode(&signing).expect("decode");
    let map = decoded.as_object().expect("object");
    assert!(!map.contains_key("TxnSignature"));
    assert!(map.contains_key("SigningPubKey"));
    // non-serialized fields never reach the wire
    assert!(!map.contains_key("hash"));
}

#[test]
fn test_signing_data_is_prefix_plus_signing_fields() {
    let data = encode_for_signing(&signed_tx()).expect("signing data");
    let body = encode(&signed_tx(), true).expect("signing fields");
    assert_eq!(&data[..4], &SIGNING_PREFIX);
    assert_eq!(&data[4..], &body[..]);
    assert_eq!(hex::encode_upper(&data[..4]), "53545800");
}

#[test]
fn test_signing_filter_is_top_level_only() {
    let tx = json!({
        "Sequence": 1,
        "TxnSignature": "AB",
        "Memos": [{"Memo": {"MemoType": "01"}}],
        "Signers": [{"Signer": {"Account": SIGNER, "TxnSignature": "CD"}}]
    });
    let signing = decode(&encode(&tx, true).expect("encode")).expect("decode");
    assert_eq!(
        signing,
        json!({"Sequence": 1, "Memos": [{"Memo": {"MemoType": "01"}}]})
    );

    // inside a kept object, non-signing fields survive
    let nested = json!({"Memo": {"MemoType": "01"}, "Sequence": 1});
    assert_eq!(
        encode(&nested, true).expect("signing"),
        encode(&nested, false).expect("full")
    );
}

#[test]
fn test_multisigning_data_layout() {
    let data = encode_for_multisigning(&signed_tx(), SIGNER).expect("multisigning");
    assert_eq!(&data[..4], &MULTISIGNING_PREFIX);

    let (body, suffix) = data[4..].split_at(data.len() - 4 - ACCOUNT_ID_LENGTH);
    assert_eq!(hex::encode_upper(suffix), SIGNER);

    let decoded = decode(body).expect("decode body");
    assert_eq!(decoded["SigningPubKey"], json!(""));
    assert!(decoded.get("TxnSignature").is_none());
}

#[test]
fn test_multisigning_leaves_input_untouched() {
    let tx = signed_tx();
    encode_for_multisigning(&tx, SIGNER).expect("multisigning");
    assert_eq!(tx, signed_tx());
}

#[test]
fn test_multisigning_rejects_bad_signer() {
    assert!(encode_for_multisigning(&signed_tx(), "not-an-account").is_err());
    assert!(encode_for_multisigning(&json!([1]), SIGNER).is_err());
}

#[test]
fn test_claim_data() {
    let channel = "5DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3";
    let data = encode_for_signing_claim(&json!({"channel": channel, "amount": "1000"}))
        .expect("claim");

    let mut expected = CLAIM_PREFIX.to_vec();
    expected.extend(hex::decode(channel).expect("hex"));
    expected.extend(1000u64.to_be_bytes());
    assert_eq!(data, expected);
}

#[test]
fn test_claim_rejects_issued_and_negative_amounts() {
    let channel = "00".repeat(32);
    let issued = json!({"currency": "USD", "issuer": SIGNER, "value": "1"});
    for amount in [issued, json!("-5")] {
        match encode_for_signing_claim(&json!({"channel": channel, "amount": amount})) {
            Err(CodecError::TypeMismatch { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}

#[test]
fn test_claim_rejects_short_channel() {
    assert!(encode_for_signing_claim(&json!({"channel": "ABCD", "amount": "1"})).is_err());
}

/// Addresses written as `acct:` followed by hex
struct PrefixedAddresses;

impl AddressCodec for PrefixedAddresses {
    fn decode_account(&self, address: &str) -> Result<[u8; ACCOUNT_ID_LENGTH]> {
        let hex = address
            .strip_prefix("acct:")
            .ok_or_else(|| CodecError::InvalidValue {
                type_name: "AccountID",
                reason: format!("{address} has no acct: prefix"),
            })?;
        HexAddressCodec.decode_account(hex)
    }

    fn encode_account(&self, account: &[u8; ACCOUNT_ID_LENGTH]) -> String {
        format!("acct:{}", hex::encode_upper(account))
    }
}

#[test]
fn test_custom_address_codec_in_signing_paths() {
    let codec = Codec::new().with_address_codec(Arc::new(PrefixedAddresses));
    let tx = json!({"Account": format!("acct:{ACCOUNT}"), "Sequence": 1});

    let data = codec.encode_for_signing(&tx).expect("signing");
    let plain = encode_for_signing(&json!({"Account": ACCOUNT, "Sequence": 1})).expect("plain");
    assert_eq!(data, plain);

    let multi = codec
        .encode_for_multisigning(&tx, &format!("acct:{SIGNER}"))
        .expect("multisigning");
    assert_eq!(hex::encode_upper(&multi[multi.len() - 20..]), SIGNER);

    let decoded = codec.decode(&data[4..]).expect("decode");
    assert_eq!(decoded["Account"], json!(format!("acct:{ACCOUNT}")));
}
