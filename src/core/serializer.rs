use crate::core::{MAX_DOUBLE_BYTE_LENGTH, MAX_LENGTH_VALUE, MAX_SINGLE_BYTE_LENGTH};
use crate::definitions::FieldInstance;
use crate::error::{CodecError, Result};
use crate::types::StValue;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

/// Encode a variable length prefix into `buf`.
///
/// Fails with `LengthOverflow` above 918744 bytes.
pub fn encode_length_prefix<B: BufMut>(length: usize, buf: &mut B) -> Result<()> {
    if length <= MAX_SINGLE_BYTE_LENGTH {
        buf.put_u8(length as u8);
    } else if length <= MAX_DOUBLE_BYTE_LENGTH {
        let rest = length - 193;
        buf.put_u8(193 + (rest >> 8) as u8);
        buf.put_u8((rest & 0xFF) as u8);
    } else if length <= MAX_LENGTH_VALUE {
        let rest = length - 12_481;
        buf.put_u8(241 + (rest >> 16) as u8);
        buf.put_u8(((rest >> 8) & 0xFF) as u8);
        buf.put_u8((rest & 0xFF) as u8);
    } else {
        return Err(CodecError::LengthOverflow(length));
    }
    Ok(())
}

/// Growable output buffer for canonical encodings
#[derive(Debug, Default)]
pub struct BinarySerializer {
    buf: BytesMut,
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(cap),
        }
    }

    /// Raw passthrough, used for end markers and signing prefixes
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn put_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    pub fn write_length_prefix(&mut self, length: usize) -> Result<()> {
        encode_length_prefix(length, &mut self.buf)
    }

    pub fn write_field_header(&mut self, field: &FieldInstance) {
        field.header.write_to(&mut self.buf);
    }

    /// Write a field header, the length prefix for variable-length fields, then the value.
    pub fn write_field_and_value(&mut self, field: &FieldInstance, value: &StValue) -> Result<()> {
        trace!(field = %field.name, offset = self.buf.len(), "Writing field");
        self.write_field_header(field);
        if field.is_variable_length_encoded {
            let mut inner = BinarySerializer::new();
            value.write_to(&mut inner)?;
            self.write_length_prefix(inner.len())?;
            self.buf.extend_from_slice(&inner.buf);
        } else {
            value.write_to(self)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Finish and return an immutable view of the encoding
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}
