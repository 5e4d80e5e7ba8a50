//! # Field Registry
//!
//! Static field metadata: maps field names to `(type_code, field_code)` headers,
//! declared types and flags, and translates enum-like fields between names and
//! integer codes.
//!
//! The registry is built once from a JSON schema in the ledger's
//! `definitions.json` layout and is immutable afterwards, so it is shared by
//! reference across threads without locking.
//!
//! ## Schema Layout
//! ```text
//! {
//!   "TYPES":               { "UInt16": 1, ... },
//!   "FIELDS":              [ ["Sequence", { "nth": 4, "isVLEncoded": false,
//!                              "isSerialized": true, "isSigningField": true,
//!                              "type": "UInt32" }], ... ],
//!   "TRANSACTION_TYPES":   { "Payment": 0, ... },
//!   "TRANSACTION_RESULTS": { "tesSUCCESS": 0, ... },
//!   "LEDGER_ENTRY_TYPES":  { "AccountRoot": 97, ... }
//! }
//! ```

mod field;

pub use field::{FieldHeader, FieldInstance, FieldType};

use crate::error::{CodecError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Schema shipped with the crate
pub const BUNDLED_DEFINITIONS: &str = include_str!("definitions.json");

/// Wire byte closing a nested object (`STObject`, field 1)
pub const OBJECT_END_MARKER: u8 = 0xE1;

/// Wire byte closing an array (`STArray`, field 1)
pub const ARRAY_END_MARKER: u8 = 0xF1;

pub const OBJECT_END_MARKER_NAME: &str = "ObjectEndMarker";
pub const ARRAY_END_MARKER_NAME: &str = "ArrayEndMarker";

static BUNDLED: Lazy<Arc<Definitions>> = Lazy::new(|| {
    let definitions = Definitions::from_json(BUNDLED_DEFINITIONS)
        .unwrap_or_else(|e| panic!("bundled field definitions are invalid: {e}"));
    Arc::new(definitions)
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawDefinitions {
    types: HashMap<String, i64>,
    fields: Vec<(String, RawFieldInfo)>,
    #[serde(default)]
    transaction_types: HashMap<String, i64>,
    #[serde(default)]
    transaction_results: HashMap<String, i64>,
    #[serde(default)]
    ledger_entry_types: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct RawFieldInfo {
    nth: i64,
    #[serde(rename = "isVLEncoded")]
    is_vl_encoded: bool,
    #[serde(rename = "isSerialized")]
    is_serialized: bool,
    #[serde(rename = "isSigningField")]
    is_signing_field: bool,
    #[serde(rename = "type")]
    type_name: String,
}

/// Bidirectional name/code table for an enum-like field
#[derive(Debug, Clone, Default)]
pub struct EnumTable {
    by_name: HashMap<String, i64>,
    by_code: HashMap<i64, String>,
}

impl EnumTable {
    fn from_map(entries: HashMap<String, i64>) -> Self {
        let by_code = entries
            .iter()
            .map(|(name, code)| (*code, name.clone()))
            .collect();
        Self {
            by_name: entries,
            by_code,
        }
    }

    pub fn code_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, code: i64) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// The field registry
#[derive(Debug)]
pub struct Definitions {
    type_ordinals: HashMap<String, u16>,
    fields: Vec<FieldInstance>,
    by_name: HashMap<String, usize>,
    by_header: HashMap<FieldHeader, usize>,
    transaction_types: EnumTable,
    transaction_results: EnumTable,
    ledger_entry_types: EnumTable,
}

impl Definitions {
    /// Process-wide registry built from the bundled schema on first use
    pub fn bundled() -> &'static Arc<Definitions> {
        &BUNDLED
    }

    /// Load a schema from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CodecError::RegistryError(format!(
                "Failed to read definitions file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Build a registry from a JSON schema document
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDefinitions = serde_json::from_str(json)
            .map_err(|e| CodecError::RegistryError(format!("Failed to parse definitions: {e}")))?;

        let mut type_ordinals = HashMap::with_capacity(raw.types.len());
        for (name, code) in &raw.types {
            // Pseudo-types such as "Done" or "Transaction" have codes outside
            // the header range and never appear on the wire.
            if (1..=255).contains(code) {
                type_ordinals.insert(name.clone(), *code as u16);
            }
        }

        let mut fields = Vec::with_capacity(raw.fields.len());
        let mut by_name = HashMap::with_capacity(raw.fields.len());
        let mut by_header = HashMap::with_capacity(raw.fields.len());

        for (name, info) in raw.fields {
            let Some(field_type) = FieldType::from_name(&info.type_name) else {
                debug!(field = %name, type_name = %info.type_name, "Skipping field of unsupported type");
                continue;
            };
            let type_code = *type_ordinals.get(&info.type_name).ok_or_else(|| {
                CodecError::RegistryError(format!(
                    "Field {name} has type {} with no valid type code",
                    info.type_name
                ))
            })?;

            if info.is_serialized && !(1..=255).contains(&info.nth) {
                return Err(CodecError::RegistryError(format!(
                    "Serialized field {name} has out-of-range nth {}",
                    info.nth
                )));
            }
            if !(0..=i64::from(u16::MAX)).contains(&info.nth) {
                return Err(CodecError::RegistryError(format!(
                    "Field {name} has out-of-range nth {}",
                    info.nth
                )));
            }

            let nth = info.nth as u16;
            let instance = FieldInstance {
                header: FieldHeader::new(type_code, nth),
                name: name.clone(),
                type_name: info.type_name,
                field_type,
                nth,
                is_variable_length_encoded: info.is_vl_encoded,
                is_serialized: info.is_serialized,
                is_signing_field: info.is_signing_field,
            };

            let index = fields.len();
            if by_name.insert(name.clone(), index).is_some() {
                return Err(CodecError::RegistryError(format!(
                    "Duplicate field name {name}"
                )));
            }
            if instance.is_serialized {
                if let Some(previous) = by_header.insert(instance.header, index) {
                    let previous: &FieldInstance = &fields[previous];
                    return Err(CodecError::RegistryError(format!(
                        "Fields {} and {name} share header {:?}",
                        previous.name, instance.header
                    )));
                }
            }
            fields.push(instance);
        }

        let definitions = Self {
            type_ordinals,
            fields,
            by_name,
            by_header,
            transaction_types: EnumTable::from_map(raw.transaction_types),
            transaction_results: EnumTable::from_map(raw.transaction_results),
            ledger_entry_types: EnumTable::from_map(raw.ledger_entry_types),
        };
        definitions.check_markers()?;

        info!(
            fields = definitions.fields.len(),
            types = definitions.type_ordinals.len(),
            transaction_types = definitions.transaction_types.len(),
            "Field registry loaded"
        );
        Ok(definitions)
    }

    fn check_markers(&self) -> Result<()> {
        for (name, byte) in [
            (OBJECT_END_MARKER_NAME, OBJECT_END_MARKER),
            (ARRAY_END_MARKER_NAME, ARRAY_END_MARKER),
        ] {
            let field = self.field_by_name(name).map_err(|_| {
                CodecError::RegistryError(format!("Schema lacks the {name} field"))
            })?;
            if field.header.to_bytes() != [byte] {
                return Err(CodecError::RegistryError(format!(
                    "{name} must encode as {byte:#04x}"
                )));
            }
        }
        Ok(())
    }

    /// Look up a field by its logical name
    pub fn field_by_name(&self, name: &str) -> Result<&FieldInstance> {
        self.by_name
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| CodecError::UnknownField(name.to_string()))
    }

    /// Look up a serialized field by its wire header
    pub fn field_by_header(&self, header: FieldHeader) -> Result<&FieldInstance> {
        self.by_header
            .get(&header)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| {
                CodecError::UnknownField(format!(
                    "type_code={} field_code={}",
                    header.type_code, header.field_code
                ))
            })
    }

    /// Type code for a schema type name
    pub fn type_ordinal(&self, type_name: &str) -> Result<u16> {
        self.type_ordinals
            .get(type_name)
            .copied()
            .ok_or_else(|| CodecError::RegistryError(format!("Unknown type {type_name}")))
    }

    /// Enum table backing a field whose plain value is a name, if any
    pub fn enum_table(&self, field_name: &str) -> Option<&EnumTable> {
        match field_name {
            "TransactionType" => Some(&self.transaction_types),
            "TransactionResult" => Some(&self.transaction_results),
            "LedgerEntryType" => Some(&self.ledger_entry_types),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldInstance> {
        self.fields.iter()
    }

    pub fn transaction_types(&self) -> &EnumTable {
        &self.transaction_types
    }

    pub fn transaction_results(&self) -> &EnumTable {
        &self.transaction_results
    }

    pub fn ledger_entry_types(&self) -> &EnumTable {
        &self.ledger_entry_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "TYPES": { "UInt32": 2, "STObject": 14, "STArray": 15, "Done": -1 },
        "FIELDS": [
            ["ObjectEndMarker", {"nth": 1, "isVLEncoded": false, "isSerialized": true, "isSigningField": true, "type": "STObject"}],
            ["ArrayEndMarker", {"nth": 1, "isVLEncoded": false, "isSerialized": true, "isSigningField": true, "type": "STArray"}],
            ["Sequence", {"nth": 4, "isVLEncoded": false, "isSerialized": true, "isSigningField": true, "type": "UInt32"}]
        ]
    }"#;

    #[test]
    fn test_bundled_registry_loads() {
        let defs = Definitions::bundled();
        let account = defs.field_by_name("Account").expect("Account");
        assert_eq!(account.header, FieldHeader::new(8, 1));
        assert_eq!(account.field_type, FieldType::AccountId);
        assert!(account.is_signing_field);
    }

    #[test]
    fn test_lookup_by_header_is_inverse_of_name() {
        let defs = Definitions::bundled();
        for field in defs.fields().filter(|f| f.is_serialized) {
            let found = defs.field_by_header(field.header).expect("header lookup");
            assert_eq!(found.name, field.name);
        }
    }

    #[test]
    fn test_non_serialized_fields_have_no_header_entry() {
        let defs = Definitions::bundled();
        let hash = defs.field_by_name("hash").expect("hash");
        assert!(!hash.is_serialized);
        assert!(defs.field_by_header(hash.header).is_err());
    }

    #[test]
    fn test_unknown_name_is_error() {
        let defs = Definitions::bundled();
        assert!(matches!(
            defs.field_by_name("NoSuchField"),
            Err(CodecError::UnknownField(_))
        ));
    }

    #[test]
    fn test_type_ordinal() {
        let defs = Definitions::bundled();
        assert_eq!(defs.type_ordinal("UInt8").expect("UInt8"), 16);
        assert_eq!(defs.type_ordinal("STObject").expect("STObject"), 14);
        assert!(defs.type_ordinal("Done").is_err());
    }

    #[test]
    fn test_enum_tables() {
        let defs = Definitions::bundled();
        let tx = defs.enum_table("TransactionType").expect("table");
        assert_eq!(tx.code_of("Payment"), Some(0));
        assert_eq!(tx.name_of(7), Some("OfferCreate"));
        let results = defs.enum_table("TransactionResult").expect("table");
        assert_eq!(results.code_of("tesSUCCESS"), Some(0));
        assert!(defs.enum_table("Sequence").is_none());
    }

    #[test]
    fn test_minimal_schema() {
        let defs = Definitions::from_json(MINIMAL).expect("minimal schema");
        assert_eq!(defs.fields().count(), 3);
        assert!(defs.transaction_types().is_empty());
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let json = MINIMAL.replace(
            r#"["Sequence", {"nth": 4"#,
            r#"["Flags", {"nth": 4, "isVLEncoded": false, "isSerialized": true, "isSigningField": true, "type": "UInt32"}],
            ["Sequence", {"nth": 4"#,
        );
        let err = Definitions::from_json(&json).expect_err("duplicate header");
        assert!(matches!(err, CodecError::RegistryError(_)));
    }

    #[test]
    fn test_missing_end_marker_rejected() {
        let json = MINIMAL.replace("ArrayEndMarker", "SomethingElse");
        let err = Definitions::from_json(&json).expect_err("missing marker");
        assert!(err.to_string().contains("ArrayEndMarker"));
    }

    #[test]
    fn test_unsupported_types_are_skipped() {
        let json = MINIMAL.replace(
            r#""Done": -1"#,
            r#""Done": -1, "Number": 9"#,
        )
        .replace(
            r#"["Sequence""#,
            r#"["Quantity", {"nth": 1, "isVLEncoded": false, "isSerialized": true, "isSigningField": true, "type": "Number"}],
            ["Sequence""#,
        );
        let defs = Definitions::from_json(&json).expect("schema");
        assert!(defs.field_by_name("Quantity").is_err());
    }
}
