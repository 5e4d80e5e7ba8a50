use super::{check_fixed_width, AccountId, CodecContext, Currency, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::{Map, Value};

/// An asset: the native currency alone, or a currency with its issuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Issue {
    pub currency: Currency,
    pub issuer: Option<AccountId>,
}

impl Issue {
    pub fn native() -> Self {
        Issue {
            currency: Currency::NATIVE,
            issuer: None,
        }
    }
}

impl SerializedType for Issue {
    const TYPE_NAME: &'static str = "Issue";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        let currency = Currency(parser.read_array()?).checked()?;
        if currency.is_native() {
            check_fixed_width(Self::TYPE_NAME, length_hint, 20)?;
            return Ok(Issue::native());
        }
        check_fixed_width(Self::TYPE_NAME, length_hint, 40)?;
        Ok(Issue {
            currency,
            issuer: Some(AccountId(parser.read_array()?)),
        })
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            CodecError::invalid(Self::TYPE_NAME, format!("expected an object, got {value}"))
        })?;
        let currency = map.get("currency").ok_or_else(|| {
            CodecError::invalid(Self::TYPE_NAME, "issue is missing currency")
        })?;
        let currency = Currency::from_value(currency, ctx)?;
        let issuer = map.get("issuer").filter(|v| !v.is_null());

        match (currency.is_native(), issuer) {
            (true, None) => Ok(Issue::native()),
            (true, Some(_)) => Err(CodecError::invalid(
                Self::TYPE_NAME,
                "the native currency has no issuer",
            )),
            (false, Some(issuer)) => Ok(Issue {
                currency,
                issuer: Some(AccountId::from_value(issuer, ctx)?),
            }),
            (false, None) => Err(CodecError::invalid(
                Self::TYPE_NAME,
                "issued currencies need an issuer",
            )),
        }
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        let mut map = Map::new();
        map.insert("currency".into(), self.currency.to_json(ctx)?);
        if let Some(issuer) = &self.issuer {
            map.insert("issuer".into(), issuer.to_json(ctx)?);
        }
        Ok(Value::Object(map))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        self.currency.write_to(serializer)?;
        if let Some(issuer) = &self.issuer {
            issuer.write_to(serializer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{ctx, parse_all};
    use serde_json::json;

    const ISSUER: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";

    #[test]
    fn test_native_issue_is_currency_only() {
        let ctx = ctx();
        let issue = Issue::from_value(&json!({"currency": "XRP"}), &ctx).expect("xrp");
        let bytes = issue.to_bytes().expect("bytes");
        assert_eq!(bytes, vec![0u8; 20]);
        assert_eq!(parse_all::<Issue>(&bytes, None).expect("decode"), issue);
    }

    #[test]
    fn test_issued_currency_round_trip() {
        let ctx = ctx();
        let plain = json!({"currency": "USD", "issuer": ISSUER});
        let issue = Issue::from_value(&plain, &ctx).expect("usd");
        let bytes = issue.to_bytes().expect("bytes");
        assert_eq!(bytes.len(), 40);
        let decoded = parse_all::<Issue>(&bytes, None).expect("decode");
        assert_eq!(decoded.to_json(&ctx).expect("json"), plain);
    }

    #[test]
    fn test_issuer_presence_must_match_currency() {
        let ctx = ctx();
        assert!(Issue::from_value(&json!({"currency": "USD"}), &ctx).is_err());
        assert!(Issue::from_value(&json!({"currency": "XRP", "issuer": ISSUER}), &ctx).is_err());
        assert!(Issue::from_value(&json!("USD"), &ctx).is_err());
    }
}
