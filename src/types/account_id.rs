use super::{check_fixed_width, decode_hex_exact, expect_str, CodecContext, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::Value;

pub const ACCOUNT_ID_LENGTH: usize = 20;

/// Boundary to the address codec that renders account ids for humans.
///
/// Checksummed address alphabets live outside this crate. Implement this trait
/// to plug one in; the codec only needs raw 20-byte ids.
pub trait AddressCodec: Send + Sync {
    /// Parse a textual address into a raw account id
    fn decode_account(&self, address: &str) -> Result<[u8; ACCOUNT_ID_LENGTH]>;

    /// Render a raw account id
    fn encode_account(&self, account: &[u8; ACCOUNT_ID_LENGTH]) -> String;

    /// Split an extended address (account plus optional tag) into its parts.
    /// Returns `None` for anything that is not an extended address.
    fn decode_extended(&self, _address: &str) -> Option<([u8; ACCOUNT_ID_LENGTH], Option<u32>)> {
        None
    }
}

/// Address codec that uses 40-character uppercase hex and has no extended form
#[derive(Debug, Clone, Copy, Default)]
pub struct HexAddressCodec;

impl AddressCodec for HexAddressCodec {
    fn decode_account(&self, address: &str) -> Result<[u8; ACCOUNT_ID_LENGTH]> {
        decode_hex_exact(AccountId::TYPE_NAME, address)
    }

    fn encode_account(&self, account: &[u8; ACCOUNT_ID_LENGTH]) -> String {
        hex::encode_upper(account)
    }
}

/// 20-byte account identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LENGTH]);

impl AccountId {
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LENGTH] {
        &self.0
    }

    pub(crate) fn from_text(text: &str, ctx: &CodecContext<'_>) -> Result<Self> {
        if text.len() == ACCOUNT_ID_LENGTH * 2 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(AccountId(decode_hex_exact(Self::TYPE_NAME, text)?));
        }
        ctx.addresses.decode_account(text).map(AccountId)
    }
}

impl SerializedType for AccountId {
    const TYPE_NAME: &'static str = "AccountID";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        // Schemas that mark account fields as variable-length still carry 20 bytes
        check_fixed_width(Self::TYPE_NAME, length_hint, ACCOUNT_ID_LENGTH)?;
        Ok(AccountId(parser.read_array()?))
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let text = expect_str(Self::TYPE_NAME, value)?;
        Self::from_text(text, ctx).map_err(|e| match e {
            CodecError::InvalidHex(_) => {
                CodecError::invalid(Self::TYPE_NAME, format!("{text} is not a valid address"))
            }
            other => other,
        })
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        Ok(Value::String(ctx.addresses.encode_account(&self.0)))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        serializer.append(&self.0);
        Ok(())
    }
}
