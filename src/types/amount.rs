use super::{check_fixed_width, AccountId, CodecContext, Currency, SerializedType};
use crate::core::{BinaryParser, BinarySerializer};
use crate::error::{CodecError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Largest native amount, in drops
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;

const NOT_NATIVE_BIT: u64 = 1 << 63;
const POSITIVE_BIT: u64 = 1 << 62;
const NATIVE_DROPS_MASK: u64 = POSITIVE_BIT - 1;
const EXPONENT_SHIFT: u32 = 54;
const MANTISSA_MASK: u64 = (1 << EXPONENT_SHIFT) - 1;
const EXPONENT_BIAS: i64 = 97;

const MIN_MANTISSA: u64 = 1_000_000_000_000_000;
const MAX_MANTISSA: u64 = 9_999_999_999_999_999;
const MIN_EXPONENT: i64 = -96;
const MAX_EXPONENT: i64 = 80;
const MAX_PRECISION: usize = 16;

const ISSUED_TYPE_NAME: &str = "IssuedValue";

/// Decimal floating point value of an issued amount.
///
/// Nonzero values are kept normalized: `mantissa` in `[10^15, 10^16)` and
/// `exponent` in `-96..=80`. Zero has a mantissa of 0 and is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssuedValue {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl IssuedValue {
    pub const ZERO: IssuedValue = IssuedValue {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    /// Scale `mantissa` into `[10^15, 10^16)` and range-check the exponent.
    ///
    /// Values too small to represent are an error here. The ledger itself
    /// rounds them to zero, so fixtures relying on that underflow will not
    /// encode.
    fn normalize(negative: bool, mut mantissa: u64, mut exponent: i64) -> Result<Self> {
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }
        let slack = MAX_PRECISION as i64;
        if !(MIN_EXPONENT - slack..=MAX_EXPONENT + slack).contains(&exponent) {
            return Err(CodecError::invalid(
                ISSUED_TYPE_NAME,
                format!("exponent {exponent} outside {MIN_EXPONENT}..={MAX_EXPONENT}"),
            ));
        }
        while mantissa < MIN_MANTISSA {
            mantissa *= 10;
            exponent -= 1;
        }
        if mantissa > MAX_MANTISSA {
            return Err(CodecError::invalid(
                ISSUED_TYPE_NAME,
                format!("more than {MAX_PRECISION} significant digits"),
            ));
        }
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(CodecError::invalid(
                ISSUED_TYPE_NAME,
                format!("exponent {exponent} outside {MIN_EXPONENT}..={MAX_EXPONENT}"),
            ));
        }
        Ok(IssuedValue {
            negative,
            mantissa,
            exponent: exponent as i32,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Packed 8-byte wire form
    pub fn to_bits(&self) -> u64 {
        if self.is_zero() {
            return NOT_NATIVE_BIT;
        }
        let sign = if self.negative { 0 } else { POSITIVE_BIT };
        let biased = (i64::from(self.exponent) + EXPONENT_BIAS) as u64;
        NOT_NATIVE_BIT | sign | (biased << EXPONENT_SHIFT) | self.mantissa
    }

    pub fn from_bits(bits: u64) -> Result<Self> {
        if bits & NOT_NATIVE_BIT == 0 {
            return Err(CodecError::invalid(ISSUED_TYPE_NAME, "native bit pattern"));
        }
        let mantissa = bits & MANTISSA_MASK;
        if mantissa == 0 {
            if bits != NOT_NATIVE_BIT {
                return Err(CodecError::invalid(
                    ISSUED_TYPE_NAME,
                    format!("non-canonical zero {bits:016X}"),
                ));
            }
            return Ok(Self::ZERO);
        }
        if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa) {
            return Err(CodecError::invalid(
                ISSUED_TYPE_NAME,
                format!("mantissa {mantissa} is not normalized"),
            ));
        }
        let exponent = ((bits >> EXPONENT_SHIFT) & 0xFF) as i64 - EXPONENT_BIAS;
        Self::normalize(bits & POSITIVE_BIT == 0, mantissa, exponent)
    }
}

impl FromStr for IssuedValue {
    type Err = CodecError;

    fn from_str(text: &str) -> Result<Self> {
        let malformed = || {
            CodecError::invalid(ISSUED_TYPE_NAME, format!("{text:?} is not a decimal number"))
        };

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (number, mut exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => (
                &unsigned[..at],
                unsigned[at + 1..].parse::<i64>().map_err(|_| malformed())?,
            ),
            None => (unsigned, 0),
        };
        let (integer, fraction) = number.split_once('.').unwrap_or((number, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(malformed());
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let digits = format!("{integer}{fraction}");
        exponent = exponent
            .checked_sub(fraction.len() as i64)
            .ok_or_else(malformed)?;
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(Self::ZERO);
        }
        let trimmed = significant.trim_end_matches('0');
        exponent = exponent
            .checked_add((significant.len() - trimmed.len()) as i64)
            .ok_or_else(malformed)?;
        if trimmed.len() > MAX_PRECISION {
            return Err(CodecError::invalid(
                ISSUED_TYPE_NAME,
                format!("{text} has more than {MAX_PRECISION} significant digits"),
            ));
        }
        let mantissa = trimmed.parse::<u64>().map_err(|_| malformed())?;
        Self::normalize(negative, mantissa, exponent)
    }
}

/// Plain decimal notation with trailing zeros stripped
impl fmt::Display for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        let raw = self.mantissa.to_string();
        let digits = raw.trim_end_matches('0');
        let exponent = i64::from(self.exponent) + (raw.len() - digits.len()) as i64;

        if exponent >= 0 {
            write!(f, "{digits}{}", "0".repeat(exponent as usize))
        } else {
            let point = digits.len() as i64 + exponent;
            if point > 0 {
                let (whole, frac) = digits.split_at(point as usize);
                write!(f, "{whole}.{frac}")
            } else {
                write!(f, "0.{}{digits}", "0".repeat((-point) as usize))
            }
        }
    }
}

/// Native drops or an issued amount with its currency and issuer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amount {
    Native {
        drops: u64,
        negative: bool,
    },
    Issued {
        value: IssuedValue,
        currency: Currency,
        issuer: AccountId,
    },
}

impl Amount {
    pub fn native(drops: u64) -> Result<Self> {
        check_drops(drops)?;
        Ok(Amount::Native {
            drops,
            negative: false,
        })
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Amount::Native { .. })
    }

    fn native_from_text(text: &str) -> Result<Self> {
        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::invalid(
                Self::TYPE_NAME,
                format!("{text:?} is not a whole number of drops"),
            ));
        }
        let drops = digits.parse::<u64>().map_err(|_| {
            CodecError::invalid(Self::TYPE_NAME, format!("{text} exceeds {MAX_DROPS} drops"))
        })?;
        check_drops(drops)?;
        Ok(Amount::Native {
            drops,
            negative: negative && drops != 0,
        })
    }

    fn issued_from_map(map: &Map<String, Value>, ctx: &CodecContext<'_>) -> Result<Self> {
        let member = |key: &str| {
            map.get(key).ok_or_else(|| {
                CodecError::invalid(Self::TYPE_NAME, format!("issued amount is missing {key}"))
            })
        };
        let value = match member("value")? {
            Value::String(text) => text.parse::<IssuedValue>()?,
            Value::Number(n) => n.to_string().parse::<IssuedValue>()?,
            other => {
                return Err(CodecError::invalid(
                    Self::TYPE_NAME,
                    format!("issued value must be a string, got {other}"),
                ))
            }
        };
        let currency = Currency::from_value(member("currency")?, ctx)?;
        if currency.is_native() {
            return Err(CodecError::invalid(
                Self::TYPE_NAME,
                "issued amounts cannot use the native currency",
            ));
        }
        let issuer = AccountId::from_value(member("issuer")?, ctx)?;
        Ok(Amount::Issued {
            value,
            currency,
            issuer,
        })
    }
}

fn check_drops(drops: u64) -> Result<()> {
    if drops > MAX_DROPS {
        return Err(CodecError::invalid(
            Amount::TYPE_NAME,
            format!("{drops} exceeds {MAX_DROPS} drops"),
        ));
    }
    Ok(())
}

impl SerializedType for Amount {
    const TYPE_NAME: &'static str = "Amount";

    fn from_parser(parser: &mut BinaryParser<'_>, length_hint: Option<usize>) -> Result<Self> {
        let width = if parser.peek()? & 0x80 == 0 { 8 } else { 48 };
        check_fixed_width(Self::TYPE_NAME, length_hint, width)?;

        let bits = parser.read_uint64()?;
        if bits & NOT_NATIVE_BIT == 0 {
            let drops = bits & NATIVE_DROPS_MASK;
            check_drops(drops)?;
            let negative = bits & POSITIVE_BIT == 0;
            if negative && drops == 0 {
                return Err(CodecError::invalid(Self::TYPE_NAME, "negative zero drops"));
            }
            return Ok(Amount::Native { drops, negative });
        }

        let value = IssuedValue::from_bits(bits)?;
        let currency = Currency(parser.read_array()?).checked()?;
        if currency.is_native() {
            return Err(CodecError::invalid(
                Self::TYPE_NAME,
                "issued amount carries the native currency",
            ));
        }
        let issuer = AccountId(parser.read_array()?);
        Ok(Amount::Issued {
            value,
            currency,
            issuer,
        })
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        match value {
            Value::String(text) => Self::native_from_text(text),
            Value::Number(n) => Self::native_from_text(&n.to_string()),
            Value::Object(map) => Self::issued_from_map(map, ctx),
            other => Err(CodecError::invalid(
                Self::TYPE_NAME,
                format!("expected drops or an issued amount object, got {other}"),
            )),
        }
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        match self {
            Amount::Native { drops, negative } => {
                let sign = if *negative { "-" } else { "" };
                Ok(Value::String(format!("{sign}{drops}")))
            }
            Amount::Issued {
                value,
                currency,
                issuer,
            } => {
                let mut map = Map::new();
                map.insert("currency".into(), currency.to_json(ctx)?);
                map.insert("issuer".into(), issuer.to_json(ctx)?);
                map.insert("value".into(), Value::String(value.to_string()));
                Ok(Value::Object(map))
            }
        }
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        match self {
            Amount::Native { drops, negative } => {
                let sign = if *negative { 0 } else { POSITIVE_BIT };
                serializer.put_u64(sign | drops);
            }
            Amount::Issued {
                value,
                currency,
                issuer,
            } => {
                serializer.put_u64(value.to_bits());
                currency.write_to(serializer)?;
                issuer.write_to(serializer)?;
            }
        }
        Ok(())
    }
}
