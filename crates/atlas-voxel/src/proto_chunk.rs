//! The write surface terrain generation fills, and an in-memory implementation.
//!
//! [`ChunkWriter`] is the narrow interface the generator calls: block and
//! biome writes, height marker updates, post-processing marks and light
//! sources. Hosts with their own chunk type implement it; [`ProtoChunk`] is
//! the implementation used by the standalone tools and tests.

use glam::IVec3;
use rustc_hash::FxHashSet;

use crate::biome_id::BiomeId;
use crate::registry::BlockId;
use crate::section::{SECTION_SIZE, Section};

/// Horizontal side length of a chunk in blocks.
pub const CHUNK_WIDTH: i32 = 16;

/// Side length of a chunk's biome grid; one cell per 4×4 block area.
pub const BIOME_GRID_WIDTH: usize = 4;

/// Chunk coordinates: block `x = pos.x * 16 + local_x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ChunkPos {
    /// Chunk x.
    pub x: i32,
    /// Chunk z.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing block `(x, z)`.
    pub const fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x >> 4,
            z: z >> 4,
        }
    }

    /// Lowest block x in the chunk.
    pub const fn start_x(self) -> i32 {
        self.x * CHUNK_WIDTH
    }

    /// Lowest block z in the chunk.
    pub const fn start_z(self) -> i32 {
        self.z * CHUNK_WIDTH
    }

    /// Block-space center `(x, z)`.
    pub const fn center(self) -> (i32, i32) {
        (self.start_x() + CHUNK_WIDTH / 2, self.start_z() + CHUNK_WIDTH / 2)
    }
}

/// Which height marker map a generator update targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeightmapKind {
    /// Topmost placed block of any kind, fluids included.
    WorldSurface,
    /// Topmost solid block, ignoring fluid above it.
    OceanFloor,
}

/// A recorded surface height and the block that set it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeightMarker {
    /// Recorded elevation.
    pub y: i32,
    /// Block that produced the marker.
    pub block: BlockId,
}

/// Operations terrain synthesis performs on a chunk under construction.
///
/// Local coordinates are `0..16`; `y` is an absolute block height.
pub trait ChunkWriter {
    /// Position of the chunk being written.
    fn chunk_pos(&self) -> ChunkPos;

    /// Place a block. Heights outside the chunk's vertical range are ignored.
    fn set_block(&mut self, local_x: u8, y: i32, local_z: u8, block: BlockId);

    /// Record a surface height marker for one column.
    fn track_surface_height(
        &mut self,
        kind: HeightmapKind,
        local_x: u8,
        local_z: u8,
        y: i32,
        block: BlockId,
    );

    /// Request a settle/update pass for the block at a chunk-local position.
    fn mark_for_post_processing(&mut self, local_pos: IVec3);

    /// Register a light-emitting block at a chunk-local position.
    fn add_light_source(&mut self, local_pos: IVec3);

    /// Assign the biome of one biome grid cell (`0..4` on each axis).
    fn set_biome(&mut self, quart_x: u8, quart_z: u8, biome: BiomeId);
}

/// An in-memory chunk: a vertical stack of sections plus generation metadata.
#[derive(Clone, Debug)]
pub struct ProtoChunk {
    pos: ChunkPos,
    min_y: i32,
    height: u32,
    sections: Vec<Section>,
    world_surface: [Option<HeightMarker>; 256],
    ocean_floor: [Option<HeightMarker>; 256],
    post_processing: FxHashSet<IVec3>,
    light_sources: Vec<IVec3>,
    biomes: [Option<BiomeId>; BIOME_GRID_WIDTH * BIOME_GRID_WIDTH],
}

impl ProtoChunk {
    /// An all-air chunk spanning `[min_y, min_y + height)`.
    pub fn new(pos: ChunkPos, min_y: i32, height: u32) -> Self {
        let section_count = (height as usize).div_ceil(SECTION_SIZE);
        Self {
            pos,
            min_y,
            height,
            sections: vec![Section::empty(); section_count],
            world_surface: [None; 256],
            ocean_floor: [None; 256],
            post_processing: FxHashSet::default(),
            light_sources: Vec::new(),
            biomes: Default::default(),
        }
    }

    /// Lowest block y.
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Number of block layers.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Block at a chunk-local column and absolute height. Out of range reads air.
    pub fn block(&self, local_x: u8, y: i32, local_z: u8) -> BlockId {
        match self.locate(local_x, y, local_z) {
            Some((section, sy)) => {
                self.sections[section].get(local_x as usize, sy, local_z as usize)
            }
            None => BlockId::AIR,
        }
    }

    /// The blocks of one column from `min_y` upward.
    pub fn column(&self, local_x: u8, local_z: u8) -> Vec<BlockId> {
        (self.min_y..self.min_y + self.height as i32)
            .map(|y| self.block(local_x, y, local_z))
            .collect()
    }

    /// Recorded height marker for one column.
    pub fn height_marker(
        &self,
        kind: HeightmapKind,
        local_x: u8,
        local_z: u8,
    ) -> Option<HeightMarker> {
        let i = Self::column_index(local_x, local_z);
        match kind {
            HeightmapKind::WorldSurface => self.world_surface[i],
            HeightmapKind::OceanFloor => self.ocean_floor[i],
        }
    }

    /// Positions marked for post-processing.
    pub fn post_processing(&self) -> &FxHashSet<IVec3> {
        &self.post_processing
    }

    /// Registered light sources, in registration order.
    pub fn light_sources(&self) -> &[IVec3] {
        &self.light_sources
    }

    /// Biome of one grid cell, if populated.
    pub fn biome(&self, quart_x: u8, quart_z: u8) -> Option<&BiomeId> {
        self.biomes
            .get(quart_z as usize * BIOME_GRID_WIDTH + quart_x as usize)
            .and_then(Option::as_ref)
    }

    /// Sections from the bottom up.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of non-air blocks in the whole chunk.
    pub fn non_air_count(&self) -> usize {
        self.sections.iter().map(Section::non_air_count).sum()
    }

    fn locate(&self, local_x: u8, y: i32, local_z: u8) -> Option<(usize, usize)> {
        if local_x as i32 >= CHUNK_WIDTH || local_z as i32 >= CHUNK_WIDTH {
            return None;
        }
        let offset = y.checked_sub(self.min_y)?;
        if offset < 0 || offset >= self.height as i32 {
            return None;
        }
        let offset = offset as usize;
        Some((offset / SECTION_SIZE, offset % SECTION_SIZE))
    }

    fn column_index(local_x: u8, local_z: u8) -> usize {
        debug_assert!((local_x as i32) < CHUNK_WIDTH && (local_z as i32) < CHUNK_WIDTH);
        local_z as usize * CHUNK_WIDTH as usize + local_x as usize
    }
}

impl ChunkWriter for ProtoChunk {
    fn chunk_pos(&self) -> ChunkPos {
        self.pos
    }

    fn set_block(&mut self, local_x: u8, y: i32, local_z: u8, block: BlockId) {
        let Some((section, sy)) = self.locate(local_x, y, local_z) else {
            tracing::trace!("ProtoChunk::set_block out of range: ({local_x}, {y}, {local_z})");
            return;
        };
        self.sections[section].set(local_x as usize, sy, local_z as usize, block);
    }

    fn track_surface_height(
        &mut self,
        kind: HeightmapKind,
        local_x: u8,
        local_z: u8,
        y: i32,
        block: BlockId,
    ) {
        let i = Self::column_index(local_x, local_z);
        let slot = match kind {
            HeightmapKind::WorldSurface => &mut self.world_surface[i],
            HeightmapKind::OceanFloor => &mut self.ocean_floor[i],
        };
        if slot.is_none_or(|marker| y >= marker.y) {
            *slot = Some(HeightMarker { y, block });
        }
    }

    fn mark_for_post_processing(&mut self, local_pos: IVec3) {
        self.post_processing.insert(local_pos);
    }

    fn add_light_source(&mut self, local_pos: IVec3) {
        self.light_sources.push(local_pos);
    }

    fn set_biome(&mut self, quart_x: u8, quart_z: u8, biome: BiomeId) {
        let (qx, qz) = (quart_x as usize, quart_z as usize);
        if qx >= BIOME_GRID_WIDTH || qz >= BIOME_GRID_WIDTH {
            return;
        }
        self.biomes[qz * BIOME_GRID_WIDTH + qx] = Some(biome);
    }
}
