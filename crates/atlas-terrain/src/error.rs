//! Errors raised while building or running an image-driven generator.

use atlas_config::ConfigError;
use atlas_raster::{RasterError, ResourceError};
use atlas_voxel::{BiomeId, RegistryError};
use thiserror::Error;

/// Everything that can stop a dimension from generating.
///
/// All variants except [`GenerationError::Spawn`] indicate misconfiguration
/// and are reported once at initialization; none are retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A raster could not be resolved, decoded or windowed.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A configured block is not registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A referenced biome entry list does not exist.
    #[error("'{id}' is not a valid biome entry list: {source}")]
    BiomeEntriesMissing {
        /// List id as written in the config.
        id: String,
        /// Resolver failure.
        #[source]
        source: ResourceError,
    },

    /// A referenced biome entry list exists but is malformed.
    #[error("error when parsing biome entry list '{id}': {source}")]
    BiomeEntriesInvalid {
        /// List id as written in the config.
        id: String,
        /// Parse failure.
        #[source]
        source: ConfigError,
    },

    /// A biome table was built from an empty list.
    #[error("biome table needs at least one entry")]
    EmptyBiomeTable,

    /// Two entries in one table share a color.
    #[error("color {color:#08x} is mapped to both {first} and {second}")]
    DuplicateColor {
        /// The shared color.
        color: u32,
        /// Biome of the earlier entry.
        first: BiomeId,
        /// Biome of the later entry.
        second: BiomeId,
    },

    /// A generation worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[source] std::io::Error),
}
