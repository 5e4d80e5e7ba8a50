//! # Serializable Type Set
//!
//! Every value that can appear in a field implements [`SerializedType`]: it can
//! be read from a [`BinaryParser`], built from a plain JSON value, rendered back
//! to JSON and written to a [`BinarySerializer`].
//!
//! [`StValue`] is the closed tagged union over all of them. Dispatch is keyed by
//! the [`FieldType`] the registry resolved for a field when it was loaded.
//!
//! | Type | Wire width | Plain value |
//! |------|-----------|-------------|
//! | UInt8/16/32 | 1/2/4 | number |
//! | UInt64 | 8 | 16-char hex string |
//! | Hash128/160/256 | 16/20/32 | hex string |
//! | AccountID | 20 | address |
//! | Blob | length prefix | hex string |
//! | Currency | 20 | ISO code, `"XRP"` or hex |
//! | Amount | 8 or 48 | drops string or `{currency, issuer, value}` |
//! | Issue | 20 or 40 | `{currency, issuer?}` |
//! | Vector256 | length prefix | list of hex strings |
//! | PathSet | self-delimited | list of lists of steps |
//! | STObject | self-delimited | object |
//! | STArray | self-delimited | list of single-key objects |

mod account_id;
mod amount;
mod blob;
mod currency;
mod hash;
mod issue;
mod path_set;
mod st_array;
mod st_object;
mod uint;
mod vector256;

pub use account_id::{AccountId, AddressCodec, HexAddressCodec, ACCOUNT_ID_LENGTH};
pub use amount::{Amount, IssuedValue, MAX_DROPS};
pub use blob::Blob;
pub use currency::Currency;
pub use hash::{Hash, Hash128, Hash160, Hash256};
pub use issue::Issue;
pub use path_set::{Path, PathSet, PathStep};
pub use st_array::StArray;
pub use st_object::StObject;
pub use uint::{UInt16, UInt32, UInt64, UInt8};
pub use vector256::Vector256;

use crate::core::{BinaryParser, BinarySerializer};
use crate::definitions::{Definitions, FieldType};
use crate::error::{CodecError, Result};
use serde_json::Value;

/// Registry and address codec shared by every conversion to or from plain values
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub definitions: &'a Definitions,
    pub addresses: &'a dyn AddressCodec,
}

impl<'a> CodecContext<'a> {
    pub fn new(definitions: &'a Definitions, addresses: &'a dyn AddressCodec) -> Self {
        Self {
            definitions,
            addresses,
        }
    }
}

/// Capability set of every serializable type
pub trait SerializedType: Sized {
    /// Schema name used in error messages
    const TYPE_NAME: &'static str;

    /// Read a value. `length_hint` is the decoded length prefix for
    /// variable-length fields and `None` otherwise.
    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self>;

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self>;

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value>;

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut serializer = BinarySerializer::new();
        self.write_to(&mut serializer)?;
        Ok(serializer.into_bytes())
    }
}

/// Any field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StValue {
    UInt8(UInt8),
    UInt16(UInt16),
    UInt32(UInt32),
    UInt64(UInt64),
    Hash128(Hash128),
    Hash160(Hash160),
    Hash256(Hash256),
    AccountId(AccountId),
    Blob(Blob),
    Amount(Amount),
    Currency(Currency),
    Issue(Issue),
    Vector256(Vector256),
    PathSet(PathSet),
    Object(StObject),
    Array(StArray),
}

impl StValue {
    pub fn from_parser(
        kind: FieldType,
        parser: &mut BinaryParser<'_>,
        length_hint: Option<usize>,
    ) -> Result<Self> {
        let value = match kind {
            FieldType::UInt8 => StValue::UInt8(UInt8::from_parser(parser, length_hint)?),
            FieldType::UInt16 => StValue::UInt16(UInt16::from_parser(parser, length_hint)?),
            FieldType::UInt32 => StValue::UInt32(UInt32::from_parser(parser, length_hint)?),
            FieldType::UInt64 => StValue::UInt64(UInt64::from_parser(parser, length_hint)?),
            FieldType::Hash128 => StValue::Hash128(Hash128::from_parser(parser, length_hint)?),
            FieldType::Hash160 => StValue::Hash160(Hash160::from_parser(parser, length_hint)?),
            FieldType::Hash256 => StValue::Hash256(Hash256::from_parser(parser, length_hint)?),
            FieldType::AccountId => {
                StValue::AccountId(AccountId::from_parser(parser, length_hint)?)
            }
            FieldType::Blob => StValue::Blob(Blob::from_parser(parser, length_hint)?),
            FieldType::Amount => StValue::Amount(Amount::from_parser(parser, length_hint)?),
            FieldType::Currency => StValue::Currency(Currency::from_parser(parser, length_hint)?),
            FieldType::Issue => StValue::Issue(Issue::from_parser(parser, length_hint)?),
            FieldType::Vector256 => {
                StValue::Vector256(Vector256::from_parser(parser, length_hint)?)
            }
            FieldType::PathSet => StValue::PathSet(PathSet::from_parser(parser, length_hint)?),
            FieldType::StObject => StValue::Object(StObject::from_parser(parser, length_hint)?),
            FieldType::StArray => StValue::Array(StArray::from_parser(parser, length_hint)?),
        };
        Ok(value)
    }

    pub fn from_value(kind: FieldType, value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let value = match kind {
            FieldType::UInt8 => StValue::UInt8(UInt8::from_value(value, ctx)?),
            FieldType::UInt16 => StValue::UInt16(UInt16::from_value(value, ctx)?),
            FieldType::UInt32 => StValue::UInt32(UInt32::from_value(value, ctx)?),
            FieldType::UInt64 => StValue::UInt64(UInt64::from_value(value, ctx)?),
            FieldType::Hash128 => StValue::Hash128(Hash128::from_value(value, ctx)?),
            FieldType::Hash160 => StValue::Hash160(Hash160::from_value(value, ctx)?),
            FieldType::Hash256 => StValue::Hash256(Hash256::from_value(value, ctx)?),
            FieldType::AccountId => StValue::AccountId(AccountId::from_value(value, ctx)?),
            FieldType::Blob => StValue::Blob(Blob::from_value(value, ctx)?),
            FieldType::Amount => StValue::Amount(Amount::from_value(value, ctx)?),
            FieldType::Currency => StValue::Currency(Currency::from_value(value, ctx)?),
            FieldType::Issue => StValue::Issue(Issue::from_value(value, ctx)?),
            FieldType::Vector256 => StValue::Vector256(Vector256::from_value(value, ctx)?),
            FieldType::PathSet => StValue::PathSet(PathSet::from_value(value, ctx)?),
            FieldType::StObject => StValue::Object(StObject::from_value(value, ctx)?),
            FieldType::StArray => StValue::Array(StArray::from_value(value, ctx)?),
        };
        Ok(value)
    }

    pub fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        match self {
            StValue::UInt8(v) => v.to_json(ctx),
            StValue::UInt16(v) => v.to_json(ctx),
            StValue::UInt32(v) => v.to_json(ctx),
            StValue::UInt64(v) => v.to_json(ctx),
            StValue::Hash128(v) => v.to_json(ctx),
            StValue::Hash160(v) => v.to_json(ctx),
            StValue::Hash256(v) => v.to_json(ctx),
            StValue::AccountId(v) => v.to_json(ctx),
            StValue::Blob(v) => v.to_json(ctx),
            StValue::Amount(v) => v.to_json(ctx),
            StValue::Currency(v) => v.to_json(ctx),
            StValue::Issue(v) => v.to_json(ctx),
            StValue::Vector256(v) => v.to_json(ctx),
            StValue::PathSet(v) => v.to_json(ctx),
            StValue::Object(v) => v.to_json(ctx),
            StValue::Array(v) => v.to_json(ctx),
        }
    }

    pub fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        match self {
            StValue::UInt8(v) => v.write_to(serializer),
            StValue::UInt16(v) => v.write_to(serializer),
            StValue::UInt32(v) => v.write_to(serializer),
            StValue::UInt64(v) => v.write_to(serializer),
            StValue::Hash128(v) => v.write_to(serializer),
            StValue::Hash160(v) => v.write_to(serializer),
            StValue::Hash256(v) => v.write_to(serializer),
            StValue::AccountId(v) => v.write_to(serializer),
            StValue::Blob(v) => v.write_to(serializer),
            StValue::Amount(v) => v.write_to(serializer),
            StValue::Currency(v) => v.write_to(serializer),
            StValue::Issue(v) => v.write_to(serializer),
            StValue::Vector256(v) => v.write_to(serializer),
            StValue::PathSet(v) => v.write_to(serializer),
            StValue::Object(v) => v.write_to(serializer),
            StValue::Array(v) => v.write_to(serializer),
        }
    }

    /// Declared type this value belongs to
    pub fn field_type(&self) -> FieldType {
        match self {
            StValue::UInt8(_) => FieldType::UInt8,
            StValue::UInt16(_) => FieldType::UInt16,
            StValue::UInt32(_) => FieldType::UInt32,
            StValue::UInt64(_) => FieldType::UInt64,
            StValue::Hash128(_) => FieldType::Hash128,
            StValue::Hash160(_) => FieldType::Hash160,
            StValue::Hash256(_) => FieldType::Hash256,
            StValue::AccountId(_) => FieldType::AccountId,
            StValue::Blob(_) => FieldType::Blob,
            StValue::Amount(_) => FieldType::Amount,
            StValue::Currency(_) => FieldType::Currency,
            StValue::Issue(_) => FieldType::Issue,
            StValue::Vector256(_) => FieldType::Vector256,
            StValue::PathSet(_) => FieldType::PathSet,
            StValue::Object(_) => FieldType::StObject,
            StValue::Array(_) => FieldType::StArray,
        }
    }
}

/// Reject a length hint that disagrees with a fixed wire width
pub(crate) fn check_fixed_width(
    type_name: &'static str,
    length_hint: Option<usize>,
    width: usize,
) -> Result<()> {
    match length_hint {
        Some(hint) if hint != width => Err(CodecError::invalid(
            type_name,
            format!("length prefix {hint} does not match fixed width {width}"),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn expect_str<'v>(type_name: &'static str, value: &'v Value) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| CodecError::invalid(type_name, format!("expected a string, got {value}")))
}

/// Decode a hex string into exactly `N` bytes
pub(crate) fn decode_hex_exact<const N: usize>(
    type_name: &'static str,
    text: &str,
) -> Result<[u8; N]> {
    if text.len() != N * 2 {
        return Err(CodecError::invalid(
            type_name,
            format!("expected {} hex characters, got {}", N * 2, text.len()),
        ));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(text, &mut out)?;
    Ok(out)
}
