//! # Core Wire Primitives
//!
//! Low-level reading and writing of the canonical binary format.
//!
//! ## Components
//! - **BinaryParser**: forward-only cursor with length-prefix and field-header decoding
//! - **BinarySerializer**: growable buffer writing headers, length prefixes and values
//!
//! ## Wire Format
//! ```text
//! field   := header [length-prefix] value
//! header  := 1 byte  (type << 4 | field)           both codes < 16
//!          | 2 bytes (type << 4, field)            field code >= 16
//!          | 2 bytes (field, type)                 type code >= 16
//!          | 3 bytes (0, type, field)              both codes >= 16
//! length  := 1..3 bytes, thresholds 192 / 12480 / 918744
//! object  := field* 0xE1        (nested objects only)
//! array   := (header object 0xE1)* 0xF1
//! ```

pub mod parser;
pub mod serializer;

pub use parser::BinaryParser;
pub use serializer::{encode_length_prefix, BinarySerializer};

/// Largest length representable by a one-byte prefix
pub const MAX_SINGLE_BYTE_LENGTH: usize = 192;

/// Largest length representable by a two-byte prefix
pub const MAX_DOUBLE_BYTE_LENGTH: usize = 12_480;

/// Largest length representable by a three-byte prefix
pub const MAX_LENGTH_VALUE: usize = 918_744;

/// Default limit on nested object/array depth during decode
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
