use super::{decode_hex_exact, expect_str, CodecContext, Hash256, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::Value;

const HASH_WIDTH: usize = 32;

/// List of 256-bit hashes, written back to back inside one length prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Vector256(pub Vec<Hash256>);

impl SerializedType for Vector256 {
    const TYPE_NAME: &'static str = "Vector256";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        let length = length_hint.ok_or_else(|| {
            CodecError::invalid(Self::TYPE_NAME, "vector fields require a length prefix")
        })?;
        if length % HASH_WIDTH != 0 {
            return Err(CodecError::invalid(
                Self::TYPE_NAME,
                format!("length {length} is not a multiple of {HASH_WIDTH}"),
            ));
        }
        let hashes = (0..length / HASH_WIDTH)
            .map(|_| parser.read_array::<HASH_WIDTH>().map(Hash256::from))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector256(hashes))
    }

    fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            CodecError::invalid(Self::TYPE_NAME, format!("expected a list, got {value}"))
        })?;
        let hashes = items
            .iter()
            .map(|item| {
                let text = expect_str(Self::TYPE_NAME, item)?;
                decode_hex_exact::<HASH_WIDTH>(Self::TYPE_NAME, text).map(Hash256::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector256(hashes))
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        self.0
            .iter()
            .map(|hash| hash.to_json(ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        for hash in &self.0 {
            hash.write_to(serializer)?;
        }
        Ok(())
    }
}
