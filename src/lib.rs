//! # Ledger Binary Codec
//!
//! Canonical binary encoding for a field-typed ledger wire format.
//!
//! A plain JSON object maps to exactly one byte sequence: fields are resolved
//! through a schema-driven registry, sorted by `(type_code, field_code)` and
//! written with their type's encoder. Nested objects close with `0xE1`,
//! arrays with `0xF1`, and payment paths use their own delimiters. Because the
//! encoding is canonical it can be hashed and signed.
//!
//! ## Modules
//! - [`definitions`]: the field registry and enum tables
//! - [`core`]: the byte cursor and writer
//! - [`types`]: every serializable value type
//! - [`codec`]: the [`Codec`] entry points, including signing encodings
//! - [`config`]: TOML and environment configuration
//! - [`utils`]: logging setup and metrics
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//!
//! let tx = json!({
//!     "TransactionType": "Payment",
//!     "Account": "B5F762798A53D543A014CAF8B297CFF8F2F937E8",
//!     "Fee": "10",
//!     "Sequence": 1,
//! });
//! let bytes = ledger_binary_codec::encode(&tx, false).unwrap();
//! assert_eq!(ledger_binary_codec::decode(&bytes).unwrap(), tx);
//! ```

pub mod codec;
pub mod config;
pub mod core;
pub mod definitions;
pub mod error;
pub mod types;
pub mod utils;

pub use codec::Codec;
pub use config::CodecConfig;
pub use definitions::{Definitions, FieldHeader, FieldInstance, FieldType};
pub use error::{CodecError, Result};
pub use types::{AddressCodec, HexAddressCodec, StValue};

use once_cell::sync::Lazy;
use serde_json::Value;

static DEFAULT_CODEC: Lazy<Codec> = Lazy::new(Codec::new);

/// Codec over the bundled registry, shared by the free functions
pub fn default_codec() -> &'static Codec {
    &DEFAULT_CODEC
}

/// Canonical encoding of `value`; see [`Codec::encode`]
pub fn encode(value: &Value, only_signing: bool) -> Result<Vec<u8>> {
    DEFAULT_CODEC.encode(value, only_signing)
}

/// Decode a top-level object; see [`Codec::decode`]
pub fn decode(bytes: &[u8]) -> Result<Value> {
    DEFAULT_CODEC.decode(bytes)
}

pub fn encode_hex(value: &Value, only_signing: bool) -> Result<String> {
    DEFAULT_CODEC.encode_hex(value, only_signing)
}

pub fn decode_hex(text: &str) -> Result<Value> {
    DEFAULT_CODEC.decode_hex(text)
}

pub fn encode_for_signing(value: &Value) -> Result<Vec<u8>> {
    DEFAULT_CODEC.encode_for_signing(value)
}

pub fn encode_for_multisigning(value: &Value, signing_account: &str) -> Result<Vec<u8>> {
    DEFAULT_CODEC.encode_for_multisigning(value, signing_account)
}

pub fn encode_for_signing_claim(value: &Value) -> Result<Vec<u8>> {
    DEFAULT_CODEC.encode_for_signing_claim(value)
}
