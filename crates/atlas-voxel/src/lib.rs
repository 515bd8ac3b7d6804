//! Block types, palette-compressed chunk sections, and the chunk write surface
//! the terrain generator fills.

pub mod biome_id;
pub mod packed;
pub mod proto_chunk;
pub mod registry;
pub mod section;

pub use biome_id::BiomeId;
pub use proto_chunk::{
    BIOME_GRID_WIDTH, CHUNK_WIDTH, ChunkPos, ChunkWriter, HeightMarker, HeightmapKind, ProtoChunk,
};
pub use registry::{BlockDef, BlockId, BlockRegistry, RegistryError};
pub use section::{SECTION_SIZE, SECTION_VOLUME, Section};
