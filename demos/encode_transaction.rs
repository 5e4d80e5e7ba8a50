//! Example: Encoding and Signing a Payment
//!
//! Encodes a payment to its canonical bytes, decodes it back, and prints the
//! data a single signer and a multi-signer would sign.
//!
//! Run with: `cargo run --example encode_transaction`

use ledger_binary_codec::config::CodecConfig;
use ledger_binary_codec::utils::logging::init_logging;
use ledger_binary_codec::utils::metrics::global_metrics;
use ledger_binary_codec::Codec;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CodecConfig::from_env()?;
    init_logging(&config.logging)?;
    let codec = Codec::from_config(&config)?;

    let tx = json!({
        "TransactionType": "Payment",
        "Account": "B5F762798A53D543A014CAF8B297CFF8F2F937E8",
        "Destination": "0A20B3C85F482532A9578DBB3950B85CA06594D1",
        "Amount": {
            "currency": "USD",
            "issuer": "0A20B3C85F482532A9578DBB3950B85CA06594D1",
            "value": "12.5"
        },
        "Fee": "12",
        "Sequence": 42,
        "SigningPubKey": "03AB40A0490F9B7ED8DF29D246BF2D6269820A0EE7742ACDD457BEA7C7D0931EDB",
        "Memos": [{"Memo": {"MemoType": "6C696E6B", "MemoData": "68656C6C6F"}}]
    });

    println!("=== Canonical Encoding ===\n");
    let encoded = codec.encode_hex(&tx, false)?;
    println!("Encoded ({} bytes):\n{}\n", encoded.len() / 2, encoded);

    let decoded = codec.decode_hex(&encoded)?;
    println!("Decoded:\n{}\n", serde_json::to_string_pretty(&decoded)?);
    println!("Round trip: {}\n", if decoded == tx { "ok" } else { "MISMATCH" });

    println!("=== Signing Data ===\n");
    let single = codec.encode_for_signing(&tx)?;
    println!("Single signer: {}", hex::encode_upper(&single));

    let multi = codec.encode_for_multisigning(&tx, "0A20B3C85F482532A9578DBB3950B85CA06594D1")?;
    println!("Multi signer:  {}\n", hex::encode_upper(&multi));

    global_metrics().log_metrics();
    println!("{:?}", global_metrics().snapshot());
    Ok(())
}
