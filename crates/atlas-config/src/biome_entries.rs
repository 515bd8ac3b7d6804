//! Color-to-biome entry lists, either inline or referenced by id.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A raster color, written either as an integer (`0xFF0000`) or a hex string (`"#FF0000"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Packed `0xRRGGBB`.
    Packed(u32),
    /// `#RRGGBB` or `RRGGBB`, parsed lazily.
    Hex(String),
}

impl ColorValue {
    /// Returns the packed `0xRRGGBB` value.
    pub fn to_packed(&self) -> Result<u32, ConfigError> {
        match self {
            Self::Packed(rgb) if *rgb <= 0xFF_FFFF => Ok(*rgb),
            Self::Packed(rgb) => Err(ConfigError::Invalid(format!(
                "color {rgb:#x} does not fit in 24-bit RGB"
            ))),
            Self::Hex(text) => {
                let digits = text.strip_prefix('#').unwrap_or(text);
                if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(ConfigError::Invalid(format!(
                        "color '{text}' is not in #RRGGBB form"
                    )));
                }
                u32::from_str_radix(digits, 16)
                    .map_err(|_| ConfigError::Invalid(format!("color '{text}' is not valid hex")))
            }
        }
    }
}

/// One `color -> biome` pair as written in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeEntryConfig {
    /// Raster color selecting this biome.
    pub color: ColorValue,
    /// Biome identifier, e.g. `"atlas:plains"`.
    pub biome: String,
}

/// The `biomes` field: an inline list, or the id of a shared list resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiomeEntries {
    /// Entries given directly in the dimension config.
    Inline(Vec<BiomeEntryConfig>),
    /// Id of a JSON entry list (`"ns:name"` resolves to `ns/name.json`).
    Reference(String),
}

/// The on-disk shape of a referenced entry list: `{ "biomes": [ ... ] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeEntryList {
    /// The entries.
    pub biomes: Vec<BiomeEntryConfig>,
}

impl BiomeEntryList {
    /// Parse a JSON entry list document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(bytes).map_err(ConfigError::JsonError)
    }
}
