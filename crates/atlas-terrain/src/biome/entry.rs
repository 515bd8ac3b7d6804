//! A single `color -> biome` mapping.

use atlas_config::{BiomeEntryConfig, ConfigError};
use atlas_voxel::BiomeId;

/// One raster color and the biome it selects.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BiomeEntry {
    /// Packed `0xRRGGBB`.
    pub color: u32,
    /// Biome placed where the raster has `color`.
    pub biome: BiomeId,
}

impl BiomeEntry {
    /// Creates an entry.
    pub fn new(color: u32, biome: impl Into<BiomeId>) -> Self {
        Self {
            color,
            biome: biome.into(),
        }
    }

    /// Convert a config entry, parsing its color.
    pub fn from_config(config: &BiomeEntryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            color: config.color.to_packed()?,
            biome: BiomeId::new(&config.biome),
        })
    }

    /// Convert a list of config entries, stopping at the first bad color.
    pub fn from_configs(configs: &[BiomeEntryConfig]) -> Result<Vec<Self>, ConfigError> {
        configs.iter().map(Self::from_config).collect()
    }
}
