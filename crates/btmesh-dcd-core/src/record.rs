//! Input records for the `.btmeshconf` config and `.dcd` fragment files
//!
//! These are the raw, serde-decoded shapes of the JSON inputs. Numeric
//! fields are kept as [`Literal`] until an entity is built from the record,
//! at which point they are parsed and range-checked.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Failed to read record file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse record: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid numeric literal for {field}: {value:?}")]
    InvalidLiteral { field: &'static str, value: String },
    #[error("Value {value:#x} for {field} does not fit in 16 bits")]
    OutOfRange { field: &'static str, value: u64 },
}

/// A numeric field as written in the input
///
/// Accepts either a bare JSON integer or a string literal such as
/// `"0x1000"`, `"42"`, `"0o17"` or `"0b1010"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(u64),
    Text(String),
}

impl Literal {
    /// Parse the literal into an unsigned value
    pub fn value(&self, field: &'static str) -> Result<u64, RecordError> {
        match self {
            Literal::Int(value) => Ok(*value),
            Literal::Text(text) => {
                parse_int_literal(text).ok_or_else(|| RecordError::InvalidLiteral {
                    field,
                    value: text.clone(),
                })
            }
        }
    }

    /// Parse the literal and check that it fits a 16-bit mesh field
    pub fn to_u16(&self, field: &'static str) -> Result<u16, RecordError> {
        let value = self.value(field)?;
        u16::try_from(value).map_err(|_| RecordError::OutOfRange { field, value })
    }
}

impl From<&str> for Literal {
    fn from(text: &str) -> Self {
        Literal::Text(text.to_string())
    }
}

/// Parse an integer literal, inferring the base from its prefix
///
/// Supports `0x`/`0o`/`0b` prefixes (case-insensitive), an optional leading
/// `+`, surrounding whitespace and single `_` separators between digits.
/// Decimal literals may not carry leading zeros unless the value is zero.
pub fn parse_int_literal(text: &str) -> Option<u64> {
    let s = text.trim();
    let s = s.strip_prefix('+').unwrap_or(s);

    let prefix = s.get(..2).map(|p| p.to_ascii_lowercase());
    let (radix, digits) = match prefix.as_deref() {
        Some("0x") => (16, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0b") => (2, &s[2..]),
        _ => (10, s),
    };

    // A single separator may follow the base prefix
    let digits = if radix == 10 {
        digits
    } else {
        digits.strip_prefix('_').unwrap_or(digits)
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    if radix == 10 && cleaned.starts_with('0') && cleaned.chars().any(|c| c != '0') {
        return None;
    }

    u64::from_str_radix(&cleaned, radix).ok()
}

/// Top-level `.btmeshconf` document
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigRecord {
    pub composition_data: CompositionDataRecord,
}

impl ConfigRecord {
    /// Load a config record from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, RecordError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a config record from a JSON string
    pub fn from_json(content: &str) -> Result<Self, RecordError> {
        let record: ConfigRecord = serde_json::from_str(content)?;
        Ok(record)
    }
}

/// Node-level composition data header plus optional initial elements
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionDataRecord {
    /// Company identifier
    pub cid: Literal,
    /// Product identifier
    pub pid: Literal,
    /// Product version identifier
    pub vid: Literal,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
}

/// A `.dcd` fragment file: a plain list of element records
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FragmentRecord {
    pub elements: Vec<ElementRecord>,
}

impl FragmentRecord {
    /// Load a fragment from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, RecordError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a fragment from a JSON string
    pub fn from_json(content: &str) -> Result<Self, RecordError> {
        let record: FragmentRecord = serde_json::from_str(content)?;
        Ok(record)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementRecord {
    pub name: String,
    pub location: Literal,
    /// Sub-purpose label used to generate a group index macro
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub sig_models: Vec<SigModelRecord>,
    #[serde(default)]
    pub vendor_models: Vec<VendorModelRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigModelRecord {
    pub mid: Literal,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorModelRecord {
    pub mid: Literal,
    pub cid: Literal,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_literal_bases() {
        assert_eq!(parse_int_literal("0x1000"), Some(0x1000));
        assert_eq!(parse_int_literal("0X02ff"), Some(0x02FF));
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0o17"), Some(0o17));
        assert_eq!(parse_int_literal("0b1010"), Some(0b1010));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("000"), Some(0));
        assert_eq!(parse_int_literal(" +7 "), Some(7));
        assert_eq!(parse_int_literal("1_000"), Some(1000));
        assert_eq!(parse_int_literal("0x_ff"), Some(0xFF));
    }

    #[test]
    fn test_parse_int_literal_rejects() {
        assert_eq!(parse_int_literal(""), None);
        assert_eq!(parse_int_literal("0x"), None);
        assert_eq!(parse_int_literal("012"), None);
        assert_eq!(parse_int_literal("-1"), None);
        assert_eq!(parse_int_literal("++1"), None);
        assert_eq!(parse_int_literal("1__0"), None);
        assert_eq!(parse_int_literal("10_"), None);
        assert_eq!(parse_int_literal("0b102"), None);
        assert_eq!(parse_int_literal("main"), None);
    }

    #[test]
    fn test_literal_range_check() {
        assert_eq!(Literal::from("0xffff").to_u16("mid").unwrap(), 0xFFFF);
        assert_eq!(Literal::Int(5).to_u16("mid").unwrap(), 5);

        let err = Literal::from("0x10000").to_u16("mid").unwrap_err();
        assert!(matches!(err, RecordError::OutOfRange { field: "mid", value: 0x10000 }));

        let err = Literal::from("nope").to_u16("location").unwrap_err();
        assert!(matches!(err, RecordError::InvalidLiteral { field: "location", .. }));
    }

    #[test]
    fn test_config_record() {
        let json = r#"{
            "composition_data": {
                "cid": "0x02FF",
                "pid": "0x0001",
                "vid": 3,
                "elements": [
                    { "name": "main", "location": "0x0000" }
                ]
            }
        }"#;

        let config = ConfigRecord::from_json(json).unwrap();
        let cd = &config.composition_data;
        assert_eq!(cd.cid.to_u16("cid").unwrap(), 0x02FF);
        assert_eq!(cd.vid.to_u16("vid").unwrap(), 3);
        assert_eq!(cd.elements.len(), 1);
        assert!(cd.elements[0].sig_models.is_empty());
        assert!(cd.elements[0].group.is_none());
    }

    #[test]
    fn test_config_elements_default_empty() {
        let json = r#"{"composition_data": {"cid": "0x1", "pid": "0x2", "vid": "0x3"}}"#;
        let config = ConfigRecord::from_json(json).unwrap();
        assert!(config.composition_data.elements.is_empty());
    }

    #[test]
    fn test_fragment_record() {
        let json = r#"[
            {
                "name": "main",
                "location": "0x0",
                "group": "light",
                "sig_models": [{ "mid": "0x1000", "name": "Generic OnOff Server" }],
                "vendor_models": [{ "mid": "0x0001", "cid": "0x02FF", "name": "Vendor Server" }]
            }
        ]"#;

        let fragment = FragmentRecord::from_json(json).unwrap();
        assert_eq!(fragment.elements.len(), 1);
        let element = &fragment.elements[0];
        assert_eq!(element.group.as_deref(), Some("light"));
        assert_eq!(element.sig_models[0].mid, Literal::from("0x1000"));
        assert_eq!(element.vendor_models[0].name, "Vendor Server");
    }

    #[test]
    fn test_unknown_element_field_rejected() {
        let json = r#"[{ "name": "main", "location": "0x0", "colour": "red" }]"#;
        assert!(matches!(
            FragmentRecord::from_json(json),
            Err(RecordError::ParseError(_))
        ));
    }
}
