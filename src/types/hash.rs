use super::{check_fixed_width, decode_hex_exact, expect_str, CodecContext, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::Result;
use serde_json::Value;

const fn hash_type_name(width: usize) -> &'static str {
    match width {
        16 => "Hash128",
        20 => "Hash160",
        32 => "Hash256",
        _ => "Hash",
    }
}

/// Fixed-width opaque identifier. The width belongs to the type, so no length
/// prefix is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const N: usize>(pub [u8; N]);

pub type Hash128 = Hash<16>;
pub type Hash160 = Hash<20>;
pub type Hash256 = Hash<32>;

impl<const N: usize> Hash<N> {
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for Hash<N> {
    fn from(bytes: [u8; N]) -> Self {
        Hash(bytes)
    }
}

impl<const N: usize> SerializedType for Hash<N> {
    const TYPE_NAME: &'static str = hash_type_name(N);

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        check_fixed_width(Self::TYPE_NAME, length_hint, N)?;
        Ok(Hash(parser.read_array()?))
    }

    fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
        let text = expect_str(Self::TYPE_NAME, value)?;
        Ok(Hash(decode_hex_exact(Self::TYPE_NAME, text)?))
    }

    fn to_json(&self, _ctx: &CodecContext<'_>) -> Result<Value> {
        Ok(Value::String(hex::encode_upper(self.0)))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        serializer.append(&self.0);
        Ok(())
    }
}
