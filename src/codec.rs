//! # Codec Entry Points
//!
//! [`Codec`] ties a field registry, an address codec and decode limits
//! together and exposes the encode and decode operations. It is cheap to
//! clone and safe to share between threads: every call builds its own parser
//! or serializer and the registry is never mutated.
//!
//! ## Signing encodings
//! Signatures cover a hash prefix followed by the signing-only encoding:
//!
//! | Operation | Prefix | Suffix |
//! |-----------|--------|--------|
//! | single signing | `53545800` | none |
//! | multi-signing | `534D5400` | signer's 20-byte account id |
//! | payment channel claim | `434C4D00` | n/a, fixed layout |

use crate::config::{CodecConfig, LimitsConfig, MAX_INPUT_SIZE};
use crate::core::{BinaryParser, BinarySerializer, DEFAULT_MAX_NESTING_DEPTH};
use crate::definitions::Definitions;
use crate::error::{constants, CodecError, Result};
use crate::types::{
    AccountId, AddressCodec, Amount, CodecContext, Hash256, HexAddressCodec, SerializedType,
    StObject,
};
use crate::utils::metrics::{global_metrics, Timer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Prefix of single-signature signing data ("STX\0")
pub const SIGNING_PREFIX: [u8; 4] = [0x53, 0x54, 0x58, 0x00];

/// Prefix of multi-signature signing data ("SMT\0")
pub const MULTISIGNING_PREFIX: [u8; 4] = [0x53, 0x4D, 0x54, 0x00];

/// Prefix of payment channel claim signing data ("CLM\0")
pub const CLAIM_PREFIX: [u8; 4] = [0x43, 0x4C, 0x4D, 0x00];

/// Encoder and decoder bound to one registry
#[derive(Clone)]
pub struct Codec {
    definitions: Arc<Definitions>,
    addresses: Arc<dyn AddressCodec>,
    max_nesting_depth: usize,
    max_input_size: usize,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("fields", &self.definitions.fields().count())
            .field("max_nesting_depth", &self.max_nesting_depth)
            .field("max_input_size", &self.max_input_size)
            .finish_non_exhaustive()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Codec over the bundled registry with hex addresses and default limits
    pub fn new() -> Self {
        Self::with_definitions(Arc::clone(Definitions::bundled()))
    }

    pub fn with_definitions(definitions: Arc<Definitions>) -> Self {
        Self {
            definitions,
            addresses: Arc::new(HexAddressCodec),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_input_size: MAX_INPUT_SIZE,
        }
    }

    /// Build a codec from configuration, loading the registry it names
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        config.validate_strict()?;
        let definitions = match &config.registry.definitions_path {
            Some(path) => Arc::new(Definitions::from_file(path)?),
            None => Arc::clone(Definitions::bundled()),
        };
        Ok(Self::with_definitions(definitions).with_limits(&config.limits))
    }

    /// Render and parse account ids with `addresses` instead of plain hex
    pub fn with_address_codec(mut self, addresses: Arc<dyn AddressCodec>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_limits(mut self, limits: &LimitsConfig) -> Self {
        self.max_nesting_depth = limits.max_nesting_depth;
        self.max_input_size = limits.max_input_size;
        self
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    fn context(&self) -> CodecContext<'_> {
        CodecContext::new(&self.definitions, self.addresses.as_ref())
    }

    fn encode_into(
        &self,
        serializer: &mut BinarySerializer,
        value: &Value,
        only_signing: bool,
    ) -> Result<()> {
        let object = StObject::from_value_with(value, &self.context(), only_signing)?;
        object.write_to(serializer)?;
        debug!(fields = object.len(), only_signing, "Encoded object");
        Ok(())
    }

    fn record_encode(result: Result<Vec<u8>>) -> Result<Vec<u8>> {
        global_metrics().encode_finished(result.as_ref().ok().map(Vec::len));
        if let Err(e) = &result {
            debug!(error = %e, "Encode failed");
        }
        result
    }

    /// Canonical encoding of a plain object.
    ///
    /// With `only_signing` set, top-level fields that are not signing fields
    /// are left out.
    pub fn encode(&self, value: &Value, only_signing: bool) -> Result<Vec<u8>> {
        let _timer = Timer::start("encode");
        let mut serializer = BinarySerializer::new();
        let result = self
            .encode_into(&mut serializer, value, only_signing)
            .map(|()| serializer.into_bytes());
        Self::record_encode(result)
    }

    /// Decode a top-level object back to its plain form
    pub fn decode(&self, bytes: &[u8]) -> Result<Value> {
        let _timer = Timer::start("decode");
        let result = self.decode_inner(bytes);
        global_metrics().decode_finished(bytes.len(), result.is_ok());
        if let Err(e) = &result {
            debug!(error = %e, len = bytes.len(), "Decode failed");
        }
        result
    }

    fn decode_inner(&self, bytes: &[u8]) -> Result<Value> {
        if bytes.len() > self.max_input_size {
            warn!(size = bytes.len(), limit = self.max_input_size, "Rejecting oversized input");
            return Err(CodecError::OversizedInput {
                size: bytes.len(),
                limit: self.max_input_size,
            });
        }
        let mut parser =
            BinaryParser::new(bytes, &self.definitions).with_max_depth(self.max_nesting_depth);
        let object = StObject::from_parser_root(&mut parser)?;
        if !parser.is_end(None) {
            debug!(trailing = parser.remaining(), "Bytes left after object end marker");
        }
        object.to_json(&self.context())
    }

    /// [`encode`](Self::encode) rendered as uppercase hex
    pub fn encode_hex(&self, value: &Value, only_signing: bool) -> Result<String> {
        self.encode(value, only_signing).map(hex::encode_upper)
    }

    /// [`decode`](Self::decode) from a hex string
    pub fn decode_hex(&self, text: &str) -> Result<Value> {
        let bytes = hex::decode(text)?;
        self.decode(&bytes)
    }

    /// Data covered by a single signature
    pub fn encode_for_signing(&self, value: &Value) -> Result<Vec<u8>> {
        let _timer = Timer::start("encode_for_signing");
        global_metrics().signing_encode();
        let mut serializer = BinarySerializer::new();
        serializer.append(&SIGNING_PREFIX);
        let result = self
            .encode_into(&mut serializer, value, true)
            .map(|()| serializer.into_bytes());
        Self::record_encode(result)
    }

    /// Data covered by one signer of a multi-signed transaction.
    ///
    /// `SigningPubKey` is forced to empty, and the signer's account id is
    /// appended after the signing fields.
    pub fn encode_for_multisigning(&self, value: &Value, signing_account: &str) -> Result<Vec<u8>> {
        let _timer = Timer::start("encode_for_multisigning");
        global_metrics().signing_encode();
        let result = self.multisigning_data(value, signing_account);
        Self::record_encode(result)
    }

    fn multisigning_data(&self, value: &Value, signing_account: &str) -> Result<Vec<u8>> {
        let mut map = value.as_object().cloned().ok_or_else(|| {
            CodecError::invalid(StObject::TYPE_NAME, constants::ERR_NOT_AN_OBJECT)
        })?;
        map.insert("SigningPubKey".into(), Value::String(String::new()));
        let account = AccountId::from_text(signing_account, &self.context())
            .map_err(|e| e.for_field("signing_account"))?;

        let mut serializer = BinarySerializer::new();
        serializer.append(&MULTISIGNING_PREFIX);
        self.encode_into(&mut serializer, &Value::Object(map), true)?;
        account.write_to(&mut serializer)?;
        Ok(serializer.into_bytes())
    }

    /// Data covered by a payment channel claim signature: the prefix, the
    /// 32-byte `channel` id and the `amount` in drops as 8 bytes.
    pub fn encode_for_signing_claim(&self, value: &Value) -> Result<Vec<u8>> {
        let _timer = Timer::start("encode_for_signing_claim");
        global_metrics().signing_encode();
        let result = self.claim_data(value);
        Self::record_encode(result)
    }

    fn claim_data(&self, value: &Value) -> Result<Vec<u8>> {
        let ctx = self.context();
        let channel = value.get("channel").ok_or(CodecError::MissingField("channel"))?;
        let channel = Hash256::from_value(channel, &ctx).map_err(|e| e.for_field("channel"))?;
        let amount = value.get("amount").ok_or(CodecError::MissingField("amount"))?;
        let drops = match Amount::from_value(amount, &ctx).map_err(|e| e.for_field("amount"))? {
            Amount::Native {
                drops,
                negative: false,
            } => drops,
            _ => {
                return Err(CodecError::invalid(
                    Amount::TYPE_NAME,
                    "claim amounts are non-negative drops",
                )
                .for_field("amount"))
            }
        };

        let mut serializer = BinarySerializer::with_capacity(CLAIM_PREFIX.len() + 32 + 8);
        serializer.append(&CLAIM_PREFIX);
        channel.write_to(&mut serializer)?;
        serializer.put_u64(drops);
        Ok(serializer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ACCOUNT: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";

    #[test]
    fn test_encode_decode() {
        let codec = Codec::new();
        let value = json!({"Account": ACCOUNT, "Sequence": 5});
        let bytes = codec.encode(&value, false).expect("encode");
        assert_eq!(codec.decode(&bytes).expect("decode"), value);
    }

    #[test]
    fn test_hex_wrappers() {
        let codec = Codec::new();
        let hex = codec.encode_hex(&json!({"Sequence": 1}), false).expect("encode");
        assert_eq!(hex, "2400000001");
        assert_eq!(codec.decode_hex(&hex).expect("decode"), json!({"Sequence": 1}));
        assert!(matches!(codec.decode_hex("24Z"), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn test_signing_prefix_and_filter() {
        let codec = Codec::new();
        let value = json!({"Sequence": 1, "TxnSignature": "ABCD"});
        let bytes = codec.encode_for_signing(&value).expect("signing");
        assert_eq!(&bytes[..4], &SIGNING_PREFIX);
        assert_eq!(&bytes[4..], &[0x24, 0, 0, 0, 1]);
    }

    #[test]
    fn test_multisigning_appends_account() {
        let codec = Codec::new();
        let value = json!({"Sequence": 1, "SigningPubKey": "ABCD"});
        let bytes = codec.encode_for_multisigning(&value, ACCOUNT).expect("multisigning");
        assert_eq!(&bytes[..4], &MULTISIGNING_PREFIX);
        // Sequence, then an empty SigningPubKey, then the raw account id
        assert_eq!(&bytes[4..11], &[0x24, 0, 0, 0, 1, 0x73, 0x00]);
        assert_eq!(hex::encode_upper(&bytes[11..]), ACCOUNT);
    }

    #[test]
    fn test_claim_layout() {
        let codec = Codec::new();
        let channel = "AB".repeat(32);
        let bytes = codec
            .encode_for_signing_claim(&json!({"channel": channel, "amount": "1000"}))
            .expect("claim");
        assert_eq!(bytes.len(), 4 + 32 + 8);
        assert_eq!(&bytes[..4], &CLAIM_PREFIX);
        assert_eq!(&bytes[36..], &1000u64.to_be_bytes());
    }

    #[test]
    fn test_claim_missing_keys() {
        let codec = Codec::new();
        assert!(matches!(
            codec.encode_for_signing_claim(&json!({"amount": "1"})),
            Err(CodecError::MissingField("channel"))
        ));
        assert!(matches!(
            codec.encode_for_signing_claim(&json!({"channel": "00".repeat(32)})),
            Err(CodecError::MissingField("amount"))
        ));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let codec = Codec::new().with_limits(&LimitsConfig {
            max_nesting_depth: 4,
            max_input_size: 4,
        });
        assert!(matches!(
            codec.decode(&[0x24, 0, 0, 0, 1]),
            Err(CodecError::OversizedInput { size: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_from_config_with_missing_definitions_file() {
        let config = CodecConfig::default_with_overrides(|c| {
            c.registry.definitions_path = Some("/nonexistent/definitions.json".into());
        });
        assert!(matches!(Codec::from_config(&config), Err(CodecError::ConfigError(_))));
    }
}
