use super::{AccountId, CodecContext, Currency, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{constants, CodecError, Result};
use serde_json::{Map, Value};

pub const TYPE_ACCOUNT: u8 = 0x01;
pub const TYPE_CURRENCY: u8 = 0x10;
pub const TYPE_ISSUER: u8 = 0x20;
const TYPE_ALL: u8 = TYPE_ACCOUNT | TYPE_CURRENCY | TYPE_ISSUER;

pub const PATH_SEPARATOR: u8 = 0xFF;
pub const PATH_SET_END: u8 = 0x00;

/// One hop of a payment path. At least one member is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PathStep {
    pub account: Option<AccountId>,
    pub currency: Option<Currency>,
    pub issuer: Option<AccountId>,
}

impl PathStep {
    /// Tag byte announcing which members follow
    pub fn type_tag(&self) -> u8 {
        let mut tag = 0;
        if self.account.is_some() {
            tag |= TYPE_ACCOUNT;
        }
        if self.currency.is_some() {
            tag |= TYPE_CURRENCY;
        }
        if self.issuer.is_some() {
            tag |= TYPE_ISSUER;
        }
        tag
    }

    fn from_parser(parser: &mut BinaryParser<'_>) -> Result<Self> {
        let tag = parser.read_uint8()?;
        if tag & !TYPE_ALL != 0 {
            return Err(CodecError::MalformedPathStep(format!(
                "unknown type bits in tag {tag:#04x}"
            )));
        }
        let truncated = |_: CodecError| {
            CodecError::MalformedPathStep(format!("step with tag {tag:#04x} is truncated"))
        };

        let mut step = PathStep::default();
        if tag & TYPE_ACCOUNT != 0 {
            step.account = Some(AccountId(parser.read_array().map_err(truncated)?));
        }
        if tag & TYPE_CURRENCY != 0 {
            let currency = Currency(parser.read_array().map_err(truncated)?);
            step.currency = Some(currency.checked()?);
        }
        if tag & TYPE_ISSUER != 0 {
            step.issuer = Some(AccountId(parser.read_array().map_err(truncated)?));
        }
        Ok(step)
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            CodecError::MalformedPathStep(constants::ERR_PATH_STEP_NOT_OBJECT.to_string())
        })?;
        // "type" and "type_hex" are derived from the members and ignored here
        let step = PathStep {
            account: map
                .get("account")
                .map(|v| AccountId::from_value(v, ctx))
                .transpose()?,
            currency: map
                .get("currency")
                .map(|v| Currency::from_value(v, ctx))
                .transpose()?,
            issuer: map
                .get("issuer")
                .map(|v| AccountId::from_value(v, ctx))
                .transpose()?,
        };
        if step.type_tag() == 0 {
            return Err(CodecError::MalformedPathStep(
                constants::ERR_PATH_STEP_EMPTY.to_string(),
            ));
        }
        Ok(step)
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        let mut map = Map::new();
        if let Some(account) = &self.account {
            map.insert("account".into(), account.to_json(ctx)?);
        }
        if let Some(currency) = &self.currency {
            map.insert("currency".into(), currency.to_json(ctx)?);
        }
        if let Some(issuer) = &self.issuer {
            map.insert("issuer".into(), issuer.to_json(ctx)?);
        }
        Ok(Value::Object(map))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        serializer.put_u8(self.type_tag());
        if let Some(account) = &self.account {
            account.write_to(serializer)?;
        }
        if let Some(currency) = &self.currency {
            currency.write_to(serializer)?;
        }
        if let Some(issuer) = &self.issuer {
            issuer.write_to(serializer)?;
        }
        Ok(())
    }
}

/// Non-empty sequence of steps
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path(pub Vec<PathStep>);

impl Path {
    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let steps = value.as_array().ok_or_else(|| {
            CodecError::MalformedPathSet(constants::ERR_PATH_NOT_LIST.to_string())
        })?;
        if steps.is_empty() {
            return Err(CodecError::MalformedPathSet(
                constants::ERR_PATH_EMPTY.to_string(),
            ));
        }
        steps
            .iter()
            .map(|step| PathStep::from_value(step, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Path)
    }
}

/// Alternative payment paths.
///
/// Wire form: each path's steps, then `0xFF` between paths and a single
/// `0x00` after the last one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathSet(pub Vec<Path>);

impl SerializedType for PathSet {
    const TYPE_NAME: &'static str = "PathSet";

    fn from_parser(parser: &mut BinaryParser<'_>, _length_hint: Option<usize>) -> Result<Self> {
        let unterminated = |_: CodecError| {
            CodecError::MalformedPathSet(constants::ERR_PATH_SET_UNTERMINATED.to_string())
        };

        let mut paths = Vec::new();
        loop {
            let mut steps = Vec::new();
            loop {
                let next = parser.peek().map_err(unterminated)?;
                if next == PATH_SEPARATOR || next == PATH_SET_END {
                    break;
                }
                steps.push(PathStep::from_parser(parser)?);
            }
            if steps.is_empty() {
                return Err(CodecError::MalformedPathSet(
                    constants::ERR_PATH_EMPTY.to_string(),
                ));
            }
            paths.push(Path(steps));

            // The inner loop only stops on a delimiter
            if parser.read_uint8()? == PATH_SET_END {
                break;
            }
        }
        Ok(PathSet(paths))
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let paths = value.as_array().ok_or_else(|| {
            CodecError::MalformedPathSet(constants::ERR_PATH_SET_NOT_LIST.to_string())
        })?;
        if paths.is_empty() {
            return Err(CodecError::MalformedPathSet(
                constants::ERR_PATH_SET_EMPTY.to_string(),
            ));
        }
        paths
            .iter()
            .map(|path| Path::from_value(path, ctx))
            .collect::<Result<Vec<_>>>()
            .map(PathSet)
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        let mut paths = Vec::with_capacity(self.0.len());
        for path in &self.0 {
            let steps = path
                .0
                .iter()
                .map(|step| step.to_json(ctx))
                .collect::<Result<Vec<_>>>()?;
            paths.push(Value::Array(steps));
        }
        Ok(Value::Array(paths))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        if self.0.is_empty() {
            return Err(CodecError::MalformedPathSet(
                constants::ERR_PATH_SET_EMPTY.to_string(),
            ));
        }
        let last = self.0.len() - 1;
        for (i, path) in self.0.iter().enumerate() {
            for step in &path.0 {
                step.write_to(serializer)?;
            }
            serializer.put_u8(if i == last { PATH_SET_END } else { PATH_SEPARATOR });
        }
        Ok(())
    }
}
