//! # Error Types
//!
//! Error handling for the ledger binary codec.
//!
//! Every failure in an encode or decode call is unrecoverable for that call:
//! the error propagates to the caller and no partial output is produced.
//!
//! ## Error Categories
//! - **Wire Errors**: buffer underruns, bad length prefixes, bad field headers
//! - **Registry Errors**: unknown fields, unknown enum names or codes, schema load failures
//! - **Value Errors**: plain values that do not fit the declared type of a field
//! - **Structure Errors**: malformed path sets, conflicting address tags, excessive nesting
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! ## Example Usage
//! ```rust
//! use ledger_binary_codec::error::{CodecError, Result};
//! use tracing::{error, info};
//!
//! fn decode_hex(blob: &str) -> Result<serde_json::Value> {
//!     ledger_binary_codec::decode_hex(blob)
//! }
//!
//! fn main() {
//!     match decode_hex("2200000000") {
//!         Ok(value) => info!(%value, "decoded"),
//!         Err(e) => error!(error = %e, "decode failed"),
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Path set shape errors
    pub const ERR_PATH_SET_NOT_LIST: &str = "path set must be a list of paths";
    pub const ERR_PATH_SET_EMPTY: &str = "path set must contain at least one path";
    pub const ERR_PATH_NOT_LIST: &str = "path must be a list of path steps";
    pub const ERR_PATH_EMPTY: &str = "path must contain at least one step";
    pub const ERR_PATH_SET_UNTERMINATED: &str = "path set ended without a terminator byte";

    /// Path step shape errors
    pub const ERR_PATH_STEP_NOT_OBJECT: &str = "path step must be an object";
    pub const ERR_PATH_STEP_EMPTY: &str = "path step needs at least one of account, currency, issuer";

    /// Object structure errors
    pub const ERR_NOT_AN_OBJECT: &str = "expected a JSON object";
    pub const ERR_NOT_A_LIST: &str = "expected a list of wrapped objects";
    pub const ERR_ARRAY_ELEMENT_SHAPE: &str = "array elements must be single-key objects";
    pub const ERR_ARRAY_ELEMENT_TYPE: &str = "array elements must wrap an STObject field";
    pub const ERR_STRAY_ARRAY_END: &str = "array end marker outside an array";
    pub const ERR_MARKER_AS_FIELD: &str = "end markers cannot be given as fields";

    /// Field header errors
    pub const ERR_TYPE_CODE_RANGE: &str = "escaped type code must be at least 16";
    pub const ERR_FIELD_CODE_RANGE: &str = "escaped field code must be at least 16";
}

/// CodecError is the error type for every encode, decode and registry operation
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Invalid length prefix byte: {0:#04x}")]
    InvalidLengthPrefix(u8),

    #[error("Length {0} exceeds the maximum encodable length")]
    LengthOverflow(usize),

    #[error("Invalid field header: {0}")]
    InvalidFieldHeader(&'static str),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Type mismatch for field {field}: expected {expected} ({reason})")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Invalid {type_name} value: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: String,
    },

    #[error("Malformed path set: {0}")]
    MalformedPathSet(String),

    #[error("Malformed path step: {0}")]
    MalformedPathStep(String),

    #[error("Mismatched address tag: {field} carries {tag_field}={expanded} but {tag_field}={explicit} was also given")]
    MismatchedAddressTag {
        field: String,
        tag_field: &'static str,
        expanded: u32,
        explicit: String,
    },

    #[error("Field {0} cannot carry an address tag")]
    UnexpectedAddressTag(String),

    #[error("Unsupported value for enum field {field}: {value}")]
    UnsupportedEnumValue { field: String, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Nesting depth exceeds limit of {0}")]
    NestingTooDeep(usize),

    #[error("Input too large: {size} bytes (limit {limit})")]
    OversizedInput { size: usize, limit: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Shorthand for a type-level validation failure
    pub(crate) fn invalid(type_name: &'static str, reason: impl Into<String>) -> Self {
        CodecError::InvalidValue {
            type_name,
            reason: reason.into(),
        }
    }

    /// Attach a field name to a type-level validation failure.
    /// Other variants already carry enough context and pass through unchanged.
    pub(crate) fn for_field(self, field: &str) -> Self {
        match self {
            CodecError::InvalidValue { type_name, reason } => CodecError::TypeMismatch {
                field: field.to_string(),
                expected: type_name,
                reason,
            },
            other => other,
        }
    }
}

/// Type alias for Results using CodecError
pub type Result<T> = std::result::Result<T, CodecError>;
