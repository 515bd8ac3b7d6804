//! Turns sampled elevation, fluid level and ceiling into a column of blocks.

use atlas_voxel::{
    BlockId, BlockRegistry, CHUNK_WIDTH, ChunkWriter, HeightmapKind, RegistryError,
};
use glam::IVec3;

use crate::terrain::TerrainSnapshot;

/// Blocks placed by the synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnMaterials {
    /// Fills below the surface and the ceiling.
    pub solid: BlockId,
    /// Fills between the surface and the fluid level.
    pub fluid: BlockId,
    /// Whether `solid` emits light.
    pub solid_emits_light: bool,
}

impl ColumnMaterials {
    /// Look the named blocks up in `registry`.
    pub fn from_registry(
        registry: &BlockRegistry,
        solid: &str,
        fluid: &str,
    ) -> Result<Self, RegistryError> {
        let solid = registry.require(solid)?;
        Ok(Self {
            solid,
            fluid: registry.require(fluid)?,
            solid_emits_light: registry.emits_light(solid),
        })
    }
}

/// What one column received.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnFill {
    /// Clamped surface elevation; `None` when the floor was skipped.
    pub elevation: Option<i32>,
    /// Fluid level used for the column.
    pub fluid_level: i32,
    /// Solid blocks written below the surface.
    pub solid_blocks: u32,
    /// Fluid blocks written above the surface.
    pub fluid_blocks: u32,
    /// Solid blocks written by the ceiling pass.
    pub ceiling_blocks: u32,
}

impl ColumnFill {
    /// `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.solid_blocks == 0 && self.fluid_blocks == 0 && self.ceiling_blocks == 0
    }
}

/// Fills one column at a time from a [`TerrainSnapshot`].
///
/// The floor pass writes solid blocks in `[min_y, elevation)` and fluid in
/// `[elevation, fluid_level)`. The ceiling pass runs afterwards and fills
/// downward from the ceiling height, so it wins where the two overlap.
#[derive(Clone, Debug)]
pub struct ColumnSynthesizer {
    materials: ColumnMaterials,
    min_y: i32,
    ceiling_height: Option<i32>,
}

impl ColumnSynthesizer {
    /// A synthesizer for a world whose lowest block is `min_y`.
    pub fn new(materials: ColumnMaterials, min_y: i32, ceiling_height: Option<i32>) -> Self {
        Self {
            materials,
            min_y,
            ceiling_height,
        }
    }

    /// Placed materials.
    pub fn materials(&self) -> &ColumnMaterials {
        &self.materials
    }

    /// Top of the ceiling fill, if configured.
    pub fn ceiling_height(&self) -> Option<i32> {
        self.ceiling_height
    }

    /// Surface elevation at block `(x, z)`: the sample clamped to the maximum
    /// elevation and truncated, or `None` when the floor must be skipped.
    pub fn surface_elevation(&self, terrain: &TerrainSnapshot, x: i32, z: i32) -> Option<i32> {
        let max = f64::from(terrain.params().max_elevation());
        let elevation = terrain.elevation(x, z)?.min(max) as i32;
        (elevation >= self.min_y).then_some(elevation)
    }

    /// Fill local column `(local_x, local_z)` of `chunk`.
    pub fn fill_column<W: ChunkWriter + ?Sized>(
        &self,
        terrain: &TerrainSnapshot,
        chunk: &mut W,
        local_x: u8,
        local_z: u8,
    ) -> ColumnFill {
        debug_assert!((local_x as i32) < CHUNK_WIDTH && (local_z as i32) < CHUNK_WIDTH);
        let pos = chunk.chunk_pos();
        let x = pos.start_x() + i32::from(local_x);
        let z = pos.start_z() + i32::from(local_z);
        let local = |y: i32| IVec3::new(i32::from(local_x), y, i32::from(local_z));
        let ColumnMaterials {
            solid,
            fluid,
            solid_emits_light,
        } = self.materials;

        let mut fill = ColumnFill {
            fluid_level: terrain.fluid_level(x, z),
            ..ColumnFill::default()
        };

        if let Some(elevation) = self.surface_elevation(terrain, x, z) {
            fill.elevation = Some(elevation);
            for y in self.min_y..elevation {
                chunk.set_block(local_x, y, local_z, solid);
                fill.solid_blocks += 1;
            }
            if solid_emits_light && elevation > self.min_y {
                chunk.add_light_source(local(elevation - 1));
            }

            let surface = if elevation < fill.fluid_level {
                for y in elevation..fill.fluid_level {
                    chunk.set_block(local_x, y, local_z, fluid);
                    chunk.mark_for_post_processing(local(y));
                    fill.fluid_blocks += 1;
                }
                fluid
            } else {
                solid
            };
            chunk.track_surface_height(
                HeightmapKind::WorldSurface,
                local_x,
                local_z,
                elevation,
                surface,
            );
            chunk.track_surface_height(
                HeightmapKind::OceanFloor,
                local_x,
                local_z,
                elevation,
                solid,
            );
        }

        if let Some(ceiling) = self.ceiling_height
            && let Some(depth) = terrain.ceiling_elevation(x, z)
        {
            let bottom = f64::from(ceiling) - depth;
            let mut y = ceiling;
            while f64::from(y) > bottom && y >= self.min_y {
                chunk.set_block(local_x, y, local_z, solid);
                fill.ceiling_blocks += 1;
                y -= 1;
            }
            chunk.track_surface_height(
                HeightmapKind::WorldSurface,
                local_x,
                local_z,
                ceiling,
                solid,
            );
        }

        fill
    }

    /// Blocks of the column at block `(x, z)` from `min_y` upward: solid up to
    /// the surface, then fluid up to the fluid level. Empty when the floor
    /// would be skipped or has no blocks.
    pub fn column_sample(&self, terrain: &TerrainSnapshot, x: i32, z: i32) -> Vec<BlockId> {
        let Some(elevation) = self.surface_elevation(terrain, x, z) else {
            return Vec::new();
        };
        if elevation <= self.min_y {
            return Vec::new();
        }
        let fluid_level = terrain.fluid_level(x, z).max(elevation);
        let solid = (elevation - self.min_y) as usize;
        let fluid = (fluid_level - elevation) as usize;
        let mut column = Vec::with_capacity(solid + fluid);
        column.extend(std::iter::repeat_n(self.materials.solid, solid));
        column.extend(std::iter::repeat_n(self.materials.fluid, fluid));
        column
    }
}
