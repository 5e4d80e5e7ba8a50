use super::{CodecContext, SerializedType, StValue};
use crate::core::{BinaryParser, BinarySerializer};
use crate::definitions::{
    EnumTable, FieldInstance, ARRAY_END_MARKER_NAME, OBJECT_END_MARKER, OBJECT_END_MARKER_NAME,
};
use crate::error::{constants, CodecError, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::trace;

/// Address fields that may carry a tag, and the field the tag expands into
const TAGGED_ADDRESS_FIELDS: [(&str, &str); 2] = [
    ("Account", "SourceTag"),
    ("Destination", "DestinationTag"),
];

fn tag_field_for(name: &str) -> Option<&'static str> {
    TAGGED_ADDRESS_FIELDS
        .iter()
        .find(|(address, _)| *address == name)
        .map(|(_, tag)| *tag)
}

fn explicit_tag(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Split extended addresses into a plain account and a sibling tag field.
/// The input map is borrowed untouched when nothing needs expanding.
fn expand_addresses<'m>(
    map: &'m Map<String, Value>,
    ctx: &CodecContext<'_>,
) -> Result<Cow<'m, Map<String, Value>>> {
    let mut expanded = Cow::Borrowed(map);
    for (name, value) in map {
        let Some((account, tag)) = value.as_str().and_then(|s| ctx.addresses.decode_extended(s))
        else {
            continue;
        };
        let out = expanded.to_mut();
        out.insert(name.clone(), Value::String(hex::encode_upper(account)));

        let Some(tag) = tag else {
            continue;
        };
        let tag_field =
            tag_field_for(name).ok_or_else(|| CodecError::UnexpectedAddressTag(name.clone()))?;
        if let Some(explicit) = map.get(tag_field).filter(|v| !v.is_null()) {
            if explicit_tag(explicit) != Some(tag) {
                return Err(CodecError::MismatchedAddressTag {
                    field: name.clone(),
                    tag_field,
                    expanded: tag,
                    explicit: explicit.to_string(),
                });
            }
        }
        out.insert(tag_field.to_string(), Value::from(tag));
    }
    Ok(expanded)
}

/// Translate an enum name (or a known code) to the integer the wire carries
fn enum_code(field: &FieldInstance, table: &EnumTable, value: &Value) -> Result<Value> {
    let code = match value {
        Value::String(name) => table.code_of(name),
        Value::Number(n) => n.as_i64().filter(|code| table.name_of(*code).is_some()),
        _ => None,
    };
    code.map(Value::from)
        .ok_or_else(|| CodecError::UnsupportedEnumValue {
            field: field.name.clone(),
            value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
        })
}

fn enum_name(field: &FieldInstance, table: &EnumTable, value: &StValue) -> Result<Value> {
    let code = match value {
        StValue::UInt8(v) => i64::from(v.0),
        StValue::UInt16(v) => i64::from(v.0),
        StValue::UInt32(v) => i64::from(v.0),
        other => {
            return Err(CodecError::invalid(
                other.field_type().name(),
                "enum fields must have an integer type",
            )
            .for_field(&field.name))
        }
    };
    table
        .name_of(code)
        .map(|name| Value::String(name.to_string()))
        .ok_or_else(|| CodecError::UnsupportedEnumValue {
            field: field.name.clone(),
            value: code.to_string(),
        })
}

/// Ordered field list of one object.
///
/// Objects built from plain values are kept in canonical order. Decoded
/// objects keep wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StObject {
    fields: Vec<(FieldInstance, StValue)>,
}

impl StObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldInstance, &StValue)> {
        self.fields.iter().map(|(field, value)| (field, value))
    }

    pub fn get(&self, name: &str) -> Option<&StValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.name == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build an object from a plain map.
    ///
    /// With `only_signing` set, fields that are not signing fields are left
    /// out. The filter applies to this level only; nested objects always keep
    /// every serialized field.
    pub fn from_value_with(
        value: &Value,
        ctx: &CodecContext<'_>,
        only_signing: bool,
    ) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| CodecError::invalid(Self::TYPE_NAME, constants::ERR_NOT_AN_OBJECT))?;
        let map = expand_addresses(map, ctx)?;

        let mut fields = Vec::with_capacity(map.len());
        for (name, value) in map.iter() {
            if value.is_null() {
                continue;
            }
            let field = ctx.definitions.field_by_name(name)?;
            if field.name == OBJECT_END_MARKER_NAME || field.name == ARRAY_END_MARKER_NAME {
                return Err(
                    CodecError::invalid(Self::TYPE_NAME, constants::ERR_MARKER_AS_FIELD)
                        .for_field(name),
                );
            }
            if !field.is_serialized {
                trace!(field = %name, "Dropping non-serialized field");
                continue;
            }
            if only_signing && !field.is_signing_field {
                continue;
            }

            let st_value = match ctx.definitions.enum_table(name) {
                Some(table) => {
                    let code = enum_code(field, table, value)?;
                    StValue::from_value(field.field_type, &code, ctx)
                }
                None => StValue::from_value(field.field_type, value, ctx),
            }
            .map_err(|e| e.for_field(name))?;
            fields.push((field.clone(), st_value));
        }

        // Stable sort; names are unique so ordinals never tie
        fields.sort_by_key(|(field, _)| field.ordinal());
        Ok(StObject { fields })
    }

    /// Decode a top-level object, which ends at the end of the buffer or at
    /// an object end marker.
    pub fn from_parser_root(parser: &mut BinaryParser<'_>) -> Result<Self> {
        Self::read_fields(parser, false)
    }

    fn read_fields(parser: &mut BinaryParser<'_>, nested: bool) -> Result<Self> {
        let mut fields = Vec::new();
        // A nested object must close with its marker, so running out of bytes
        // surfaces as an underrun from `read_field`.
        while nested || !parser.is_end(None) {
            let field = parser.read_field()?;
            if field.name == OBJECT_END_MARKER_NAME {
                break;
            }
            if field.name == ARRAY_END_MARKER_NAME {
                return Err(CodecError::InvalidFieldHeader(constants::ERR_STRAY_ARRAY_END));
            }
            let value = parser.read_field_value(field)?;
            fields.push((field.clone(), value));
        }
        Ok(StObject { fields })
    }
}

impl SerializedType for StObject {
    const TYPE_NAME: &'static str = "STObject";

    /// Decode a nested object, consuming its end marker
    fn from_parser(parser: &mut BinaryParser<'_>, _length_hint: Option<usize>) -> Result<Self> {
        parser.enter_nested()?;
        let object = Self::read_fields(parser, true);
        parser.leave_nested();
        object
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        Self::from_value_with(value, ctx, false)
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        let mut map = Map::with_capacity(self.fields.len());
        for (field, value) in &self.fields {
            let json = match ctx.definitions.enum_table(&field.name) {
                Some(table) => enum_name(field, table, value)?,
                None => value.to_json(ctx)?,
            };
            map.insert(field.name.clone(), json);
        }
        Ok(Value::Object(map))
    }

    /// Write every field in order. Object-typed fields are closed with the
    /// end marker; this object's own close is left to the caller.
    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        for (field, value) in &self.fields {
            serializer.write_field_and_value(field, value)?;
            if field.is_object() {
                serializer.append(&[OBJECT_END_MARKER]);
            }
        }
        Ok(())
    }
}
