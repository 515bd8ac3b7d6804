//! Declarative configuration for image-driven terrain generation.
//!
//! Dimension settings persist to disk as RON (`atlas.ron`); biome entry lists
//! referenced by id are JSON documents. Parsing is a pure function from text
//! to typed structs, kept apart from the runtime generator. CLI overrides are
//! applied through clap.

mod biome_entries;
mod cli;
mod config;
mod error;

pub use biome_entries::{BiomeEntries, BiomeEntryConfig, BiomeEntryList, ColorValue};
pub use cli::CliArgs;
pub use config::{
    AtlasConfig, BiomeSourceConfig, CEILING_UNSET, CaveLayerConfig, DebugConfig,
    GeneratorConfig, RasterConfig, WorldShapeConfig,
};
pub use error::ConfigError;
