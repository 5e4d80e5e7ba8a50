use crate::core::DEFAULT_MAX_NESTING_DEPTH;
use crate::definitions::{Definitions, FieldHeader, FieldInstance};
use crate::error::{constants, CodecError, Result};
use crate::types::StValue;
use tracing::trace;

/// Sequential reader over an encoded buffer.
///
/// The read offset only moves forward. After any error the parser state is
/// unspecified and the caller must abandon it.
#[derive(Debug, Clone)]
pub struct BinaryParser<'a> {
    data: &'a [u8],
    pos: usize,
    definitions: &'a Definitions,
    depth: usize,
    max_depth: usize,
}

impl<'a> BinaryParser<'a> {
    pub fn new(data: &'a [u8], definitions: &'a Definitions) -> Self {
        Self {
            data,
            pos: 0,
            definitions,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Limit how deeply objects and arrays may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn definitions(&self) -> &'a Definitions {
        self.definitions
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// True when no bytes remain, or at most `custom_end` bytes remain
    pub fn is_end(&self, custom_end: Option<usize>) -> bool {
        let remaining = self.remaining();
        remaining == 0 || custom_end.is_some_and(|end| remaining <= end)
    }

    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            Err(CodecError::BufferUnderrun {
                needed: n,
                remaining: self.remaining(),
            })
        } else {
            Ok(())
        }
    }

    /// Look at the next byte without consuming it
    pub fn peek(&self) -> Result<u8> {
        self.need(1)?;
        Ok(self.data[self.pos])
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.need(n)?;
        self.pos += n;
        Ok(())
    }

    /// Consume the next `n` bytes
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        self.need(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume exactly `N` bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn read_uint8(&mut self) -> Result<u8> {
        self.need(1)?;
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_uint16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_uint32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_uint64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Decode a 1-3 byte variable length prefix
    pub fn read_length_prefix(&mut self) -> Result<usize> {
        let b1 = self.read_uint8()? as usize;
        match b1 {
            0..=192 => Ok(b1),
            193..=240 => {
                let b2 = self.read_uint8()? as usize;
                Ok(193 + (b1 - 193) * 256 + b2)
            }
            241..=254 => {
                let b2 = self.read_uint8()? as usize;
                let b3 = self.read_uint8()? as usize;
                Ok(12_481 + (b1 - 241) * 65_536 + b2 * 256 + b3)
            }
            _ => Err(CodecError::InvalidLengthPrefix(b1 as u8)),
        }
    }

    /// Decode a compact or escaped field header
    pub fn read_field_header(&mut self) -> Result<FieldHeader> {
        let first = self.read_uint8()?;
        let mut type_code = u16::from(first >> 4);
        let mut field_code = u16::from(first & 0x0F);

        if type_code == 0 {
            type_code = u16::from(self.read_uint8()?);
            if type_code < 16 {
                return Err(CodecError::InvalidFieldHeader(constants::ERR_TYPE_CODE_RANGE));
            }
        }
        if field_code == 0 {
            field_code = u16::from(self.read_uint8()?);
            if field_code < 16 {
                return Err(CodecError::InvalidFieldHeader(constants::ERR_FIELD_CODE_RANGE));
            }
        }
        Ok(FieldHeader::new(type_code, field_code))
    }

    /// Read a header and resolve it through the registry
    pub fn read_field(&mut self) -> Result<&'a FieldInstance> {
        let header = self.read_field_header()?;
        let field = self.definitions.field_by_header(header)?;
        trace!(field = %field.name, position = self.pos, "Read field header");
        Ok(field)
    }

    /// Read the value of `field`, honoring its length prefix when it has one
    pub fn read_field_value(&mut self, field: &FieldInstance) -> Result<StValue> {
        if !field.is_variable_length_encoded {
            return StValue::from_parser(field.field_type, self, None);
        }
        let length = self.read_length_prefix()?;
        self.need(length)?;
        let start = self.pos;
        let value = StValue::from_parser(field.field_type, self, Some(length))?;
        if self.pos - start != length {
            return Err(CodecError::invalid(
                field.field_type.name(),
                format!("value used {} of {length} prefixed bytes", self.pos - start),
            )
            .for_field(&field.name));
        }
        Ok(value)
    }

    pub(crate) fn enter_nested(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(CodecError::NestingTooDeep(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(bytes: &[u8]) -> BinaryParser<'_> {
        BinaryParser::new(bytes, Definitions::bundled())
    }

    #[test]
    fn test_fixed_width_reads_are_big_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut p = parser(&bytes);
        assert_eq!(p.read_uint8().expect("u8"), 0x01);
        assert_eq!(p.read_uint16().expect("u16"), 0x0203);
        assert_eq!(p.read_uint32().expect("u32"), 0x0405_0607);
        assert!(p.is_end(None));
    }

    #[test]
    fn test_read_past_end_is_underrun() {
        let bytes = [0x01, 0x02];
        let mut p = parser(&bytes);
        match p.read(3) {
            Err(CodecError::BufferUnderrun { needed, remaining }) => {
                assert_eq!(needed, 3);
                assert_eq!(remaining, 2);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_length_prefix_tiers() {
        assert_eq!(parser(&[0]).read_length_prefix().expect("0"), 0);
        assert_eq!(parser(&[192]).read_length_prefix().expect("192"), 192);
        assert_eq!(parser(&[193, 0]).read_length_prefix().expect("193"), 193);
        assert_eq!(parser(&[200, 5]).read_length_prefix().expect("1990"), 1990);
        assert_eq!(parser(&[240, 255]).read_length_prefix().expect("12480"), 12_480);
        assert_eq!(parser(&[241, 0, 0]).read_length_prefix().expect("12481"), 12_481);
        assert_eq!(
            parser(&[254, 0xD4, 0x17]).read_length_prefix().expect("918744"),
            918_744
        );
    }

    #[test]
    fn test_length_prefix_255_is_invalid() {
        assert!(matches!(
            parser(&[255, 0, 0]).read_length_prefix(),
            Err(CodecError::InvalidLengthPrefix(255))
        ));
    }

    #[test]
    fn test_truncated_length_prefix() {
        assert!(matches!(
            parser(&[241, 0]).read_length_prefix(),
            Err(CodecError::BufferUnderrun { .. })
        ));
    }

    #[test]
    fn test_field_header_forms() {
        assert_eq!(
            parser(&[0x24]).read_field_header().expect("compact"),
            FieldHeader::new(2, 4)
        );
        assert_eq!(
            parser(&[0x10, 0x10]).read_field_header().expect("field escape"),
            FieldHeader::new(1, 16)
        );
        assert_eq!(
            parser(&[0x03, 0x10]).read_field_header().expect("type escape"),
            FieldHeader::new(16, 3)
        );
        assert_eq!(
            parser(&[0x00, 0x10, 0x10]).read_field_header().expect("both"),
            FieldHeader::new(16, 16)
        );
    }

    #[test]
    fn test_escaped_code_below_16_is_rejected() {
        assert!(matches!(
            parser(&[0x20, 0x04]).read_field_header(),
            Err(CodecError::InvalidFieldHeader(_))
        ));
        assert!(matches!(
            parser(&[0x00, 0x02, 0x04]).read_field_header(),
            Err(CodecError::InvalidFieldHeader(_))
        ));
    }

    #[test]
    fn test_read_field_resolves_registry() {
        let mut p = parser(&[0x24]);
        assert_eq!(p.read_field().expect("field").name, "Sequence");
    }

    #[test]
    fn test_unknown_header_is_error() {
        // UInt32 field code 47 is unassigned in the bundled schema
        let mut p = parser(&[0x20, 47]);
        assert!(matches!(p.read_field(), Err(CodecError::UnknownField(_))));
    }

    #[test]
    fn test_is_end_with_custom_end() {
        let bytes = [1, 2, 3];
        let p = parser(&bytes);
        assert!(!p.is_end(None));
        assert!(!p.is_end(Some(2)));
        assert!(p.is_end(Some(3)));
    }

    #[test]
    fn test_nesting_limit() {
        let bytes = [];
        let mut p = parser(&bytes).with_max_depth(1);
        p.enter_nested().expect("first level");
        assert!(matches!(p.enter_nested(), Err(CodecError::NestingTooDeep(1))));
        p.leave_nested();
        p.enter_nested().expect("after leaving");
    }
}
