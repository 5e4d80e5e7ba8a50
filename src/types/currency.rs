use super::{check_fixed_width, decode_hex_exact, expect_str, CodecContext, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::Value;

pub const CURRENCY_LENGTH: usize = 20;

const NATIVE_CODE: &str = "XRP";

/// Byte range of a three-letter code inside the 20-byte currency
const ISO_RANGE: std::ops::Range<usize> = 12..15;

fn is_iso_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || b"?!@#$%^&*(){}[]|".contains(&c)
}

fn is_iso_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(is_iso_char)
}

/// 20-byte currency identifier.
///
/// All zero bytes denote the native asset. Standard codes place three ASCII
/// characters at bytes 12..15 with every other byte zero. Anything else is a
/// raw 160-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Currency(pub [u8; CURRENCY_LENGTH]);

impl Currency {
    pub const NATIVE: Currency = Currency([0u8; CURRENCY_LENGTH]);

    pub fn is_native(&self) -> bool {
        self.0 == [0u8; CURRENCY_LENGTH]
    }

    pub fn as_bytes(&self) -> &[u8; CURRENCY_LENGTH] {
        &self.0
    }

    /// Every byte outside the code range is zero
    fn is_standard_form(&self) -> bool {
        self.0[..ISO_RANGE.start]
            .iter()
            .chain(&self.0[ISO_RANGE.end..])
            .all(|&b| b == 0)
    }

    /// Three-letter code when the bytes are in standard form
    pub fn iso_code(&self) -> Option<&str> {
        let code = &self.0[ISO_RANGE];
        if !self.is_standard_form() || !code.iter().all(|&c| is_iso_char(c)) {
            return None;
        }
        std::str::from_utf8(code)
            .ok()
            .filter(|code| *code != NATIVE_CODE)
    }

    /// Reject the native code spelled out in standard form; only all zeros denotes it
    pub(crate) fn checked(self) -> Result<Self> {
        if self.is_standard_form() && self.0[ISO_RANGE] == *NATIVE_CODE.as_bytes() {
            return Err(CodecError::invalid(
                Self::TYPE_NAME,
                "the native code cannot be used in standard form",
            ));
        }
        Ok(self)
    }

    pub(crate) fn from_text(text: &str) -> Result<Self> {
        if text == NATIVE_CODE {
            return Ok(Currency::NATIVE);
        }
        if is_iso_code(text) {
            let mut bytes = [0u8; CURRENCY_LENGTH];
            bytes[ISO_RANGE].copy_from_slice(text.as_bytes());
            return Ok(Currency(bytes));
        }
        if text.len() == CURRENCY_LENGTH * 2 {
            return Currency(decode_hex_exact(Self::TYPE_NAME, text)?).checked();
        }
        Err(CodecError::invalid(
            Self::TYPE_NAME,
            format!("{text} is neither a three-letter code nor 40 hex characters"),
        ))
    }

    pub(crate) fn to_text(&self) -> String {
        if self.is_native() {
            return NATIVE_CODE.to_string();
        }
        match self.iso_code() {
            Some(code) => code.to_string(),
            None => hex::encode_upper(self.0),
        }
    }
}

impl SerializedType for Currency {
    const TYPE_NAME: &'static str = "Currency";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        check_fixed_width(Self::TYPE_NAME, length_hint, CURRENCY_LENGTH)?;
        Currency(parser.read_array()?).checked()
    }

    fn from_value(value: &Value, _ctx: &CodecContext<'_>) -> Result<Self> {
        Self::from_text(expect_str(Self::TYPE_NAME, value)?)
    }

    fn to_json(&self, _ctx: &CodecContext<'_>) -> Result<Value> {
        Ok(Value::String(self.to_text()))
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
    fn test_native_is_all_zero() {
        let currency = Currency::from_text("XRP").expect("XRP");
        assert!(currency.is_native());
        assert_eq!(currency.to_text(), "XRP");
    }

    #[test]
    fn test_iso_code_layout() {
        let currency = Currency::from_text("USD").expect("USD");
        let mut expected = [0u8; 20];
        expected[12..15].copy_from_slice(b"USD");
        assert_eq!(currency.0, expected);
        assert_eq!(currency.iso_code(), Some("USD"));
    }

    #[test]
    fn test_nonstandard_code_renders_as_hex() {
        let ctx = ctx();
        let text = "534F4C4F00000000000000000000000000000000";
        let currency = Currency::from_value(&json!(text), &ctx).expect("hex code");
        assert_eq!(currency.iso_code(), None);
        assert_eq!(currency.to_json(&ctx).expect("json"), json!(text));
    }

    #[test]
    fn test_standard_form_hex_renders_as_code() {
        let currency =
            Currency::from_text("0000000000000000000000005553440000000000").expect("hex USD");
        assert_eq!(currency.to_text(), "USD");
    }

    #[test]
    fn test_native_code_in_standard_form_rejected() {
        assert!(Currency::from_text("0000000000000000000000005852500000000000").is_err());
    }

    #[test]
    fn test_native_code_in_standard_form_rejected_on_decode() {
        let mut bytes = [0u8; 20];
        bytes[12..15].copy_from_slice(b"XRP");
        assert!(matches!(
            parse_all::<Currency>(&bytes, None),
            Err(CodecError::InvalidValue { type_name: "Currency", .. })
        ));
        bytes[12..15].copy_from_slice(b"USD");
        assert_eq!(parse_all::<Currency>(&bytes, None).expect("USD").to_text(), "USD");
    }

    #[test]
    fn test_bad_codes_rejected() {
        assert!(Currency::from_text("US").is_err());
        assert!(Currency::from_text("U D").is_err());
        assert!(Currency::from_text("USDX").is_err());
    }
}
