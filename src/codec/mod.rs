//! Codec trait and serialization formats
//!
//! A codec turns a typed value into a byte payload and back. The payload
//! carries no header or format tag, so a value must be decoded with the same
//! format it was encoded with.

mod xml;

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Trait for serialization strategies used by the entry store
///
/// Implement this to plug a custom wire format into
/// [`entries::save_with`](crate::entries::save_with) and friends.
pub trait Codec: Send + Sync {
    /// Short format name used in errors and logs (e.g., "xml", "json")
    fn name(&self) -> &'static str;

    /// Conventional file extension for this format
    fn extension(&self) -> &'static str;

    /// Serialize a value to bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Deserialize bytes into the requested type
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if the bytes are malformed or do not match `T`.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

fn as_text<'a>(format: &'static str, bytes: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| Error::codec(format, e))
}

// =============================================================================
// XML (Format A)
// =============================================================================

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Markup codec: tag-based XML with the root element named after the type
///
/// `5i32` is written as `<i32>5</i32>`, a struct as one child element per
/// field, a sequence as repeated `<item>` children. `None` fields are left
/// out and read back as `None`; empty collections are written as empty
/// elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec {
    declaration: bool,
}

impl XmlCodec {
    /// Create an XML codec without a declaration header
    #[must_use]
    pub fn new() -> Self {
        Self { declaration: false }
    }

    /// Prefix every payload with an `<?xml ...?>` declaration
    #[must_use]
    pub fn with_declaration() -> Self {
        Self { declaration: true }
    }
}

impl Codec for XmlCodec {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        let tree = serde_json::to_value(value).map_err(|e| Error::codec("xml", e))?;
        let body = xml::to_bytes(xml::root_name::<T>(), &tree)?;
        if !self.declaration {
            return Ok(body);
        }
        let mut out = XML_DECLARATION.as_bytes().to_vec();
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let text = as_text("xml", bytes)?;
        xml::from_str(text)
    }
}

// =============================================================================
// JSON (Format B)
// =============================================================================

/// Compact structured-data codec backed by JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Create a compact JSON codec
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create a JSON codec with pretty printing
    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        if self.pretty {
            serde_json::to_vec_pretty(value).map_err(Error::from)
        } else {
            serde_json::to_vec(value).map_err(Error::from)
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }
}

// =============================================================================
// TOML (optional)
// =============================================================================

/// TOML codec; top-level values must be tables (structs or maps)
#[cfg(feature = "toml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

#[cfg(feature = "toml")]
impl Codec for TomlCodec {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn extension(&self) -> &'static str {
        "toml"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        toml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| Error::codec("toml", e))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        let text = as_text("toml", bytes)?;
        toml::from_str(text).map_err(|e| Error::codec("toml", e))
    }
}

// =============================================================================
// YAML (optional)
// =============================================================================

/// YAML codec
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

#[cfg(feature = "yaml")]
impl Codec for YamlCodec {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn extension(&self) -> &'static str {
        "yaml"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| Error::codec("yaml", e))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_yaml::from_slice(bytes).map_err(|e| Error::codec("yaml", e))
    }
}

// =============================================================================
// Format selector
// =============================================================================

/// Per-operation format choice
///
/// Nothing about the format is persisted alongside an entry. Load with the
/// same format that was used to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Format A: XML markup (default)
    #[default]
    Xml,
    /// Format B: compact JSON
    Json,
    /// TOML (requires the `toml` feature)
    #[cfg(feature = "toml")]
    Toml,
    /// YAML (requires the `yaml` feature)
    #[cfg(feature = "yaml")]
    Yaml,
}

impl Format {
    /// Map the boolean selector onto a format: `true` picks JSON, `false` XML
    #[must_use]
    pub fn from_use_json(use_json: bool) -> Self {
        if use_json { Format::Json } else { Format::Xml }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Codec for Format {
    fn name(&self) -> &'static str {
        match self {
            Format::Xml => XmlCodec::new().name(),
            Format::Json => JsonCodec::new().name(),
            #[cfg(feature = "toml")]
            Format::Toml => TomlCodec.name(),
            #[cfg(feature = "yaml")]
            Format::Yaml => YamlCodec.name(),
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Format::Xml => XmlCodec::new().extension(),
            Format::Json => JsonCodec::new().extension(),
            #[cfg(feature = "toml")]
            Format::Toml => TomlCodec.extension(),
            #[cfg(feature = "yaml")]
            Format::Yaml => YamlCodec.extension(),
        }
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            Format::Xml => XmlCodec::new().encode(value),
            Format::Json => JsonCodec::new().encode(value),
            #[cfg(feature = "toml")]
            Format::Toml => TomlCodec.encode(value),
            #[cfg(feature = "yaml")]
            Format::Yaml => YamlCodec.encode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            Format::Xml => XmlCodec::new().decode(bytes),
            Format::Json => JsonCodec::new().decode(bytes),
            #[cfg(feature = "toml")]
            Format::Toml => TomlCodec.decode(bytes),
            #[cfg(feature = "yaml")]
            Format::Yaml => YamlCodec.decode(bytes),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
