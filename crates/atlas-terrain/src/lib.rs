//! Image-driven terrain generation.
//!
//! Grayscale rasters give the surface elevation, fluid level and ceiling of
//! every column; a color raster picks the biome of every 4×4 cell. An
//! [`AtlasGenerator`] ties them together for one dimension and writes into any
//! [`ChunkWriter`](atlas_voxel::ChunkWriter). [`AsyncChunkGenerator`] runs it
//! across a worker pool.

mod async_generation;
mod cave;
mod column;
mod error;
mod generator;
mod terrain;

pub mod biome;

pub use async_generation::{
    AsyncChunkGenerator, GeneratedChunk, GenerationTask, generate_chunk_sync,
};
pub use biome::{BiomeEntry, BiomeEntryCache, BiomeSampler, ColorBiomeTable};
pub use cave::CaveLayer;
pub use column::{ColumnFill, ColumnMaterials, ColumnSynthesizer};
pub use error::GenerationError;
pub use generator::{AtlasGenerator, ChunkFill, TerrainSource};
pub use terrain::{TerrainParams, TerrainSampler, TerrainSnapshot};
