use super::{check_fixed_width, CodecContext, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::Value;

/// Extract an unsigned integer from a JSON number or decimal string
fn unsigned_from_value(type_name: &'static str, value: &Value, max: u64) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v <= max => Ok(v),
        Some(v) => Err(CodecError::invalid(
            type_name,
            format!("{v} exceeds maximum {max}"),
        )),
        None => Err(CodecError::invalid(
            type_name,
            format!("expected an unsigned integer, got {value}"),
        )),
    }
}

macro_rules! impl_uint {
    ($name:ident, $inner:ty, $read:ident, $put:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $inner);

        impl SerializedType for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
                check_fixed_width(Self::TYPE_NAME, length_hint, std::mem::size_of::<$inner>())?;
                Ok($name(parser.$read()?))
            }

            fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
                let v = unsigned_from_value(Self::TYPE_NAME, value, <$inner>::MAX as u64)?;
                Ok($name(v as $inner))
            }

            fn to_json(&self, _ctx: &CodecContext<'_>) -> Result<Value> {
                Ok(Value::from(self.0))
            }

            fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
                serializer.$put(self.0);
                Ok(())
            }
        }
    };
}

impl_uint!(UInt8, u8, read_uint8, put_u8);
impl_uint!(UInt16, u16, read_uint16, put_u16);
impl_uint!(UInt32, u32, read_uint32, put_u32);

/// 64-bit unsigned integer. Its plain form is a hex string because JSON
/// numbers cannot carry the full range reliably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UInt64(pub u64);

impl SerializedType for UInt64 {
    const TYPE_NAME: &'static str = "UInt64";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        check_fixed_width(Self::TYPE_NAME, length_hint, 8)?;
        Ok(UInt64(parser.read_uint64()?))
    }

    fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
        match value {
            Value::String(s) if !s.is_empty() && s.len() <= 16 => u64::from_str_radix(s, 16)
                .map(UInt64)
                .map_err(|e| CodecError::invalid(Self::TYPE_NAME, format!("{s}: {e}"))),
            Value::Number(n) => n.as_u64().map(UInt64).ok_or_else(|| {
                CodecError::invalid(Self::TYPE_NAME, format!("{n} is not an unsigned integer"))
            }),
            other => Err(CodecError::invalid(
                Self::TYPE_NAME,
                format!("expected up to 16 hex characters, got {other}"),
            )),
        }
    }

    fn to_json(&self, _ctx: &CodecContext<'_>) -> Result<Value> {
        Ok(Value::String(format!("{:016X}", self.0)))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        serializer.put_u64(self.0);
        Ok(())
    }
}
