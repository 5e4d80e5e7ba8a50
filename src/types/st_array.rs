use super::{CodecContext, SerializedType, StObject};
use crate::core::{BinaryParser, BinarySerializer};
use crate::definitions::{
    FieldInstance, FieldType, ARRAY_END_MARKER, ARRAY_END_MARKER_NAME, OBJECT_END_MARKER,
    OBJECT_END_MARKER_NAME,
};
use crate::error::{constants, CodecError, Result};
use serde_json::{Map, Value};

fn is_element_field(field: &FieldInstance) -> bool {
    field.field_type == FieldType::StObject && field.name != OBJECT_END_MARKER_NAME
}

fn element_type_error(field: &str) -> CodecError {
    CodecError::invalid(StArray::TYPE_NAME, constants::ERR_ARRAY_ELEMENT_TYPE).for_field(field)
}

/// Sequence of objects, each wrapped in a named STObject field.
///
/// Plain form is `[{"Wrapper": {...}}, ...]`. On the wire every element is
/// `header + object + 0xE1` and the array closes with `0xF1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StArray(pub Vec<(FieldInstance, StObject)>);

impl StArray {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn read_elements(parser: &mut BinaryParser<'_>) -> Result<Self> {
        let mut elements = Vec::new();
        loop {
            let field = parser.read_field()?;
            if field.name == ARRAY_END_MARKER_NAME {
                break;
            }
            if !is_element_field(field) {
                return Err(element_type_error(&field.name));
            }
            let object = StObject::from_parser(parser, None)?;
            elements.push((field.clone(), object));
        }
        Ok(StArray(elements))
    }
}

impl SerializedType for StArray {
    const TYPE_NAME: &'static str = "STArray";

    fn from_parser(parser: &mut BinaryParser<'_>, _length_hint: Option<usize>) -> Result<Self> {
        parser.enter_nested()?;
        let array = Self::read_elements(parser);
        parser.leave_nested();
        array
    }

    fn from_value(value: &Value, ctx: &CodecContext<'_>) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| CodecError::invalid(Self::TYPE_NAME, constants::ERR_NOT_A_LIST))?;

        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let (name, inner) = match item.as_object() {
                Some(map) if map.len() == 1 => map.iter().next(),
                _ => None,
            }
            .ok_or_else(|| {
                CodecError::invalid(Self::TYPE_NAME, constants::ERR_ARRAY_ELEMENT_SHAPE)
            })?;

            let field = ctx.definitions.field_by_name(name)?;
            if !is_element_field(field) {
                return Err(element_type_error(name));
            }
            let object = StObject::from_value(inner, ctx).map_err(|e| e.for_field(name))?;
            elements.push((field.clone(), object));
        }
        Ok(StArray(elements))
    }

    fn to_json(&self, ctx: &CodecContext<'_>) -> Result<Value> {
        let mut items = Vec::with_capacity(self.0.len());
        for (field, object) in &self.0 {
            let mut wrapper = Map::with_capacity(1);
            wrapper.insert(field.name.clone(), object.to_json(ctx)?);
            items.push(Value::Object(wrapper));
        }
        Ok(Value::Array(items))
    }

    fn write_to(&self, serializer: &mut BinarySerializer) -> Result<()> {
        for (field, object) in &self.0 {
            serializer.write_field_header(field);
            object.write_to(serializer)?;
            serializer.append(&[OBJECT_END_MARKER]);
        }
        serializer.append(&[ARRAY_END_MARKER]);
        Ok(())
    }
}
