use super::{expect_str, CodecContext, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::Value;

/// Variable-length opaque bytes. The length travels in the field's prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(pub Vec<u8>);

impl SerializedType for Blob {
    const TYPE_NAME: &'static str = "Blob";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        let length = length_hint.ok_or_else(|| {
            CodecError::invalid(Self::TYPE_NAME, "blob fields require a length prefix")
        })?;
        Ok(Blob(parser.read(length)?.to_vec()))
    }

    fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
        let text = expect_str(Self::TYPE_NAME, value)?;
        Ok(Blob(hex::decode(text)?))
    }

    fn to_json(&self, _ctx: &CodecContext<'_>) -> Result<Value> {
        Ok(Value::String(hex::encode_upper(&self.0)))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        serializer.append(&self.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{ctx, parse_all};
    use serde_json::json;

    #[test]
    fn test_empty_blob() {
        let ctx = ctx();
        let blob = Blob::from_value(&json!(""), &ctx).expect("empty");
        assert!(blob.0.is_empty());
        assert_eq!(blob.to_json(&ctx).expect("json"), json!(""));
    }

    #[test]
    fn test_reads_exactly_the_hinted_length() {
        let bytes = [1, 2, 3];
        assert_eq!(parse_all::<Blob>(&bytes, Some(3)).expect("blob").0, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_hint_is_error() {
        assert!(parse_all::<Blob>(&[1], None).is_err());
    }

    #[test]
    fn test_odd_hex_rejected() {
        let ctx = ctx();
        assert!(matches!(
            Blob::from_value(&json!("ABC"), &ctx),
            Err(CodecError::InvalidHex(_))
        ));
    }
}
