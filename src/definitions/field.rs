//! Field metadata: declared types, wire headers and registry entries.

use bytes::BufMut;

/// Closed set of serialized types the codec implements.
///
/// Each registry field is resolved to one of these once, when the registry is
/// built, so encode and decode dispatch with a `match` instead of a name lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Hash128,
    Hash160,
    Hash256,
    AccountId,
    Blob,
    Amount,
    Currency,
    Issue,
    Vector256,
    PathSet,
    StObject,
    StArray,
}

impl FieldType {
    /// Resolve a schema type name
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "UInt8" => FieldType::UInt8,
            "UInt16" => FieldType::UInt16,
            "UInt32" => FieldType::UInt32,
            "UInt64" => FieldType::UInt64,
            "Hash128" => FieldType::Hash128,
            "Hash160" => FieldType::Hash160,
            "Hash256" => FieldType::Hash256,
            "AccountID" => FieldType::AccountId,
            "Blob" => FieldType::Blob,
            "Amount" => FieldType::Amount,
            "Currency" => FieldType::Currency,
            "Issue" => FieldType::Issue,
            "Vector256" => FieldType::Vector256,
            "PathSet" => FieldType::PathSet,
            "STObject" => FieldType::StObject,
            "STArray" => FieldType::StArray,
            _ => return None,
        };
        Some(kind)
    }

    /// Schema name of this type
    pub fn name(self) -> &'static str {
        match self {
            FieldType::UInt8 => "UInt8",
            FieldType::UInt16 => "UInt16",
            FieldType::UInt32 => "UInt32",
            FieldType::UInt64 => "UInt64",
            FieldType::Hash128 => "Hash128",
            FieldType::Hash160 => "Hash160",
            FieldType::Hash256 => "Hash256",
            FieldType::AccountId => "AccountID",
            FieldType::Blob => "Blob",
            FieldType::Amount => "Amount",
            FieldType::Currency => "Currency",
            FieldType::Issue => "Issue",
            FieldType::Vector256 => "Vector256",
            FieldType::PathSet => "PathSet",
            FieldType::StObject => "STObject",
            FieldType::StArray => "STArray",
        }
    }
}

/// `(type_code, field_code)` pair identifying one field on the wire.
///
/// Ordering is lexicographic on `(type_code, field_code)`, which is exactly the
/// canonical field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldHeader {
    pub type_code: u16,
    pub field_code: u16,
}

impl FieldHeader {
    pub const fn new(type_code: u16, field_code: u16) -> Self {
        Self {
            type_code,
            field_code,
        }
    }

    /// Number of bytes the header occupies on the wire (1, 2 or 3)
    pub fn encoded_len(&self) -> usize {
        match (self.type_code < 16, self.field_code < 16) {
            (true, true) => 1,
            (false, false) => 3,
            _ => 2,
        }
    }

    /// Write the compact or escaped header form.
    ///
    /// A zero nibble means the corresponding code follows in its own byte.
    /// Codes are expected to fit in one byte; the registry rejects larger ones.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        let type_code = self.type_code as u8;
        let field_code = self.field_code as u8;
        match (self.type_code < 16, self.field_code < 16) {
            (true, true) => buf.put_u8((type_code << 4) | field_code),
            (true, false) => {
                buf.put_u8(type_code << 4);
                buf.put_u8(field_code);
            }
            (false, true) => {
                buf.put_u8(field_code);
                buf.put_u8(type_code);
            }
            (false, false) => {
                buf.put_u8(0);
                buf.put_u8(type_code);
                buf.put_u8(field_code);
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }
}

/// Immutable registry entry for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInstance {
    pub name: String,
    pub type_name: String,
    pub field_type: FieldType,
    pub nth: u16,
    pub is_variable_length_encoded: bool,
    pub is_serialized: bool,
    pub is_signing_field: bool,
    pub header: FieldHeader,
}

impl FieldInstance {
    /// Canonical sort key: type code in the high half, field code in the low half
    pub fn ordinal(&self) -> u32 {
        ((self.header.type_code as u32) << 16) | self.header.field_code as u32
    }

    pub fn is_object(&self) -> bool {
        self.field_type == FieldType::StObject
    }
}
