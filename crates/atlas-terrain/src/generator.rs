//! The per-dimension driver tying rasters, biome lookup and column filling
//! together.

use atlas_config::AtlasConfig;
use atlas_raster::{RasterImage, ResourceResolver, WindowPolicy};
use atlas_voxel::{
    BIOME_GRID_WIDTH, BiomeId, BlockId, BlockRegistry, CHUNK_WIDTH, ChunkWriter, HeightmapKind,
};

use crate::biome::{BiomeEntryCache, BiomeSampler, ColorBiomeTable};
use crate::cave::CaveLayer;
use crate::column::{ColumnFill, ColumnMaterials, ColumnSynthesizer};
use crate::error::GenerationError;
use crate::terrain::{TerrainParams, TerrainSampler};

/// What a host needs from a terrain generator.
///
/// Hosts drive generation through this trait instead of depending on the
/// concrete generator type.
pub trait TerrainSource: Send + Sync {
    /// Biome at biome grid cell `(quart_x, quart_z)`.
    fn sample_biome(&self, quart_x: i32, quart_z: i32) -> BiomeId;

    /// Surface elevation at block `(x, z)`, or `None` where there is no data.
    fn sample_elevation(&self, x: i32, z: i32) -> Option<f64>;

    /// Fill one column of `chunk`.
    fn fill_column(&self, chunk: &mut dyn ChunkWriter, local_x: u8, local_z: u8) -> ColumnFill;
}

/// Summary of one [`AtlasGenerator::fill_chunk`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkFill {
    /// Columns that received a floor.
    pub floor_columns: u32,
    /// Columns that received ceiling blocks.
    pub ceiling_columns: u32,
    /// Blocks written in total.
    pub blocks: u64,
}

/// Image-driven generator for one dimension.
///
/// Construct with [`from_config`](Self::from_config), then call
/// [`find_maps`](Self::find_maps) once before generating. After that the
/// generator is shared read-only between worker threads.
#[derive(Debug)]
pub struct AtlasGenerator {
    terrain: TerrainSampler,
    biomes: BiomeSampler,
    caves: Vec<CaveLayer>,
    column: ColumnSynthesizer,
    min_y: i32,
    height: u32,
    sea_level: i32,
}

impl AtlasGenerator {
    /// Build an unloaded generator from configuration.
    ///
    /// Block names are looked up in `registry`; a referenced biome entry list
    /// is loaded through `cache`.
    pub fn from_config(
        config: &AtlasConfig,
        registry: &BlockRegistry,
        cache: &BiomeEntryCache,
        resolver: &dyn ResourceResolver,
    ) -> Result<Self, GenerationError> {
        config.validate()?;
        let generator = &config.generator;
        let world = &config.world;

        let params = TerrainParams {
            starting_y: generator.starting_y,
            vertical_scale: generator.vertical_scale,
            horizontal_scale: generator.horizontal_scale,
            sea_level: world.sea_level,
            world_height: world.height,
        };
        let policy = if config.raster.windowed {
            WindowPolicy::Windowed
        } else {
            WindowPolicy::Whole
        };
        let terrain = TerrainSampler::new(
            params,
            &generator.height_map,
            generator.aquifer_path(),
            generator.roof_path(),
            policy,
        )
        .with_gen_radius(config.raster.gen_radius);

        let source = &config.biome_source;
        let entries = cache.resolve_entries(&source.biomes, resolver)?;
        let default = source.default.as_deref().map(BiomeId::new);
        let table = ColorBiomeTable::new(&entries, default)?;
        let biomes = BiomeSampler::new(
            source.biome_map.clone(),
            table,
            source.effective_scale(generator),
        );

        let caves = generator
            .caves
            .iter()
            .map(|layer| CaveLayer::from_config(layer, params))
            .collect();

        let materials = ColumnMaterials::from_registry(
            registry,
            &generator.default_block,
            &generator.default_fluid,
        )?;
        let column = ColumnSynthesizer::new(materials, world.min_y, generator.ceiling_height());

        Ok(Self {
            terrain,
            biomes,
            caves,
            column,
            min_y: world.min_y,
            height: world.height,
            sea_level: world.sea_level,
        })
    }

    /// Resolve and decode every raster: height, aquifer, roof, cave layers and
    /// the biome map.
    ///
    /// Missing or undecodable rasters fail the whole dimension.
    pub fn find_maps(
        &mut self,
        resolver: &dyn ResourceResolver,
        dimension: &str,
    ) -> Result<(), GenerationError> {
        let _span = tracing::info_span!("find_maps", dimension).entered();

        self.terrain.initialize(resolver)?;
        log_raster("elevation", dimension, self.terrain.height_raster());
        match self.terrain.aquifer_raster() {
            Some(aquifer) => log_raster("aquifer", dimension, aquifer),
            None => tracing::warn!(
                "No aquifer for dimension {dimension}, defaulting to sea level {}",
                self.sea_level
            ),
        }
        if let Some(roof) = self.terrain.roof_raster() {
            log_raster("roof", dimension, roof);
            if self.column_ceiling().is_none() {
                tracing::warn!(
                    "Dimension {dimension} has a roof map but no ceiling_height, ignoring the roof"
                );
            }
        }
        if self.terrain.params().vertical_scale != 1.0 {
            tracing::warn!(
                "Dimension {dimension} uses vertical scale {}, terrain may look unusual",
                self.terrain.params().vertical_scale
            );
        }

        for (index, layer) in self.caves.iter_mut().enumerate() {
            layer.initialize(resolver)?;
            tracing::info!("Loaded cave layer {index} for dimension {dimension}");
        }

        self.biomes.initialize(resolver)?;
        log_raster("biome", dimension, self.biomes.raster());
        Ok(())
    }

    /// Assign every cell of the chunk's 4×4 biome grid.
    pub fn populate_biomes<W: ChunkWriter + ?Sized>(&self, chunk: &mut W) {
        let pos = chunk.chunk_pos();
        let window = self.biomes.raster().window();
        let cells = BIOME_GRID_WIDTH as i32;
        for qz in 0..BIOME_GRID_WIDTH as u8 {
            for qx in 0..BIOME_GRID_WIDTH as u8 {
                let quart_x = pos.x * cells + i32::from(qx);
                let quart_z = pos.z * cells + i32::from(qz);
                let biome = self.biomes.resolve_in(&window, quart_x, quart_z).clone();
                chunk.set_biome(qx, qz, biome);
            }
        }
    }

    /// Load raster windows covering the chunk, then fill all 256 columns.
    pub fn fill_chunk<W: ChunkWriter + ?Sized>(
        &self,
        chunk: &mut W,
    ) -> Result<ChunkFill, GenerationError> {
        let pos = chunk.chunk_pos();
        let min = (pos.start_x(), pos.start_z());
        let max = (min.0 + CHUNK_WIDTH - 1, min.1 + CHUNK_WIDTH - 1);
        let snapshot = self.terrain.load_windows(min, max)?;

        let mut summary = ChunkFill::default();
        for local_x in 0..CHUNK_WIDTH as u8 {
            for local_z in 0..CHUNK_WIDTH as u8 {
                let fill = self
                    .column
                    .fill_column(&snapshot, chunk, local_x, local_z);
                summary.floor_columns += u32::from(fill.elevation.is_some());
                summary.ceiling_columns += u32::from(fill.ceiling_blocks > 0);
                summary.blocks +=
                    u64::from(fill.solid_blocks + fill.fluid_blocks + fill.ceiling_blocks);
            }
        }
        tracing::trace!("Filled chunk {:?}: {summary:?}", chunk.chunk_pos());
        Ok(summary)
    }

    /// Surface height at block `(x, z)`.
    ///
    /// The ocean floor is the raw elevation; the world surface is never below
    /// sea level. `None` outside the height raster.
    pub fn height(&self, x: i32, z: i32, kind: HeightmapKind) -> Option<i32> {
        let elevation = self.terrain.elevation(x, z)?;
        let height = match kind {
            HeightmapKind::OceanFloor => elevation,
            HeightmapKind::WorldSurface => elevation.max(f64::from(self.sea_level)),
        };
        Some(height as i32)
    }

    /// The blocks a column at block `(x, z)` would receive, from `min_y` up.
    pub fn column_sample(&self, x: i32, z: i32) -> Vec<BlockId> {
        self.column
            .column_sample(&self.terrain.snapshot_at(x, z), x, z)
    }

    /// Elevation, fluid and ceiling sampling.
    pub fn terrain(&self) -> &TerrainSampler {
        &self.terrain
    }

    /// Biome lookups.
    pub fn biome_sampler(&self) -> &BiomeSampler {
        &self.biomes
    }

    /// Cave layers in configuration order.
    pub fn cave_layers(&self) -> &[CaveLayer] {
        &self.caves
    }

    /// Every biome the dimension can produce.
    pub fn possible_biomes(&self) -> &[BiomeId] {
        self.biomes.table().biomes()
    }

    /// Lowest block y.
    pub fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Number of block layers.
    pub fn world_height(&self) -> u32 {
        self.height
    }

    /// Constant sea level.
    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    fn column_ceiling(&self) -> Option<i32> {
        self.column.ceiling_height()
    }
}

impl TerrainSource for AtlasGenerator {
    fn sample_biome(&self, quart_x: i32, quart_z: i32) -> BiomeId {
        self.biomes.resolve(quart_x, quart_z)
    }

    fn sample_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.terrain.elevation(x, z)
    }

    fn fill_column(&self, chunk: &mut dyn ChunkWriter, local_x: u8, local_z: u8) -> ColumnFill {
        let pos = chunk.chunk_pos();
        let x = pos.start_x() + i32::from(local_x);
        let z = pos.start_z() + i32::from(local_z);
        self.column
            .fill_column(&self.terrain.snapshot_at(x, z), chunk, local_x, local_z)
    }
}

fn log_raster(what: &str, dimension: &str, raster: &RasterImage) {
    tracing::info!(
        "Found {what} data for dimension {dimension} in a {}x{} map: {}",
        raster.width(),
        raster.height(),
        raster.key()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, BIOME_MAP, HEIGHT_MAP};
    use atlas_raster::{MemoryResolver, RasterError};
    use atlas_voxel::{ChunkPos, ProtoChunk};
    use image::{DynamicImage, GrayImage, Luma};

    fn chunk() -> ProtoChunk {
        ProtoChunk::new(ChunkPos::new(0, 0), 0, 64)
    }

    #[test]
    fn test_find_maps_requires_height_map() {
        let config = test_support::config();
        let resolver = MemoryResolver::new()
            .with(BIOME_MAP, test_support::flat_color([0, 0, 255]))
            .unwrap();
        let mut generator = AtlasGenerator::from_config(
            &config,
            &BlockRegistry::with_defaults(),
            &BiomeEntryCache::new(),
            &resolver,
        )
        .unwrap();
        let err = generator.find_maps(&resolver, "overworld").unwrap_err();
        let GenerationError::Raster(RasterError::ResourceMissing { key, .. }) = err else {
            panic!("expected a missing raster, got {err:?}");
        };
        assert_eq!(key, HEIGHT_MAP);
    }

    #[test]
    fn test_unknown_block_is_rejected() {
        let mut config = test_support::config();
        config.generator.default_block = "granite".into();
        let err = AtlasGenerator::from_config(
            &config,
            &BlockRegistry::with_defaults(),
            &BiomeEntryCache::new(),
            &test_support::resolver(10),
        )
        .unwrap_err();
        assert!(matches!(err, GenerationError::Registry(_)));
    }

    #[test]
    fn test_populate_biomes_uses_default_outside_raster() {
        let generator = test_support::flat_generator(10);
        let mut chunk = chunk();
        generator.populate_biomes(&mut chunk);
        assert_eq!(chunk.biome(0, 0).map(BiomeId::as_str), Some("ocean"));
        assert_eq!(chunk.biome(1, 0).map(BiomeId::as_str), Some("plains"));
        assert_eq!(chunk.biome(3, 3).map(BiomeId::as_str), Some("plains"));
    }

    #[test]
    fn test_fill_chunk_summary() {
        let generator = test_support::flat_generator(10);
        let mut chunk = chunk();
        let summary = generator.fill_chunk(&mut chunk).unwrap();
        assert_eq!(
            summary,
            ChunkFill {
                floor_columns: 4,
                ceiling_columns: 0,
                blocks: 40,
            }
        );
        assert_eq!(chunk.non_air_count(), 40);
    }

    #[test]
    fn test_height_by_kind() {
        let generator = test_support::flat_generator(2);
        assert_eq!(generator.height(0, 0, HeightmapKind::OceanFloor), Some(2));
        assert_eq!(generator.height(0, 0, HeightmapKind::WorldSurface), Some(5));
        assert_eq!(generator.height(40, 0, HeightmapKind::WorldSurface), None);
    }

    #[test]
    fn test_column_sample_lists_solid_then_fluid() {
        let generator = test_support::flat_generator(2);
        let materials = *generator.column.materials();
        assert_eq!(
            generator.column_sample(0, 0),
            vec![
                materials.solid,
                materials.solid,
                materials.fluid,
                materials.fluid,
                materials.fluid
            ]
        );
        assert!(generator.column_sample(40, 40).is_empty());
    }

    #[test]
    fn test_terrain_source_object() {
        let generator = test_support::flat_generator(10);
        let source: &dyn TerrainSource = &generator;
        assert_eq!(source.sample_elevation(0, 0), Some(10.0));
        assert_eq!(source.sample_biome(0, 0), "ocean");

        let mut chunk = chunk();
        let fill = source.fill_column(&mut chunk, 1, 1);
        assert_eq!(fill.elevation, Some(10));
        assert_eq!(fill.solid_blocks, 10);
    }

    #[test]
    fn test_windowed_host_queries_load_their_own_windows() {
        let mut config = test_support::config();
        config.raster.windowed = true;
        config.raster.gen_radius = 4;
        let height = GrayImage::from_pixel(64, 64, Luma([10]));
        let resolver = MemoryResolver::new()
            .with(HEIGHT_MAP, test_support::png(DynamicImage::ImageLuma8(height)))
            .unwrap()
            .with(BIOME_MAP, test_support::flat_color([0, 0, 255]))
            .unwrap();
        let generator = test_support::loaded_generator(&config, &resolver);
        assert!(generator.terrain().height_raster().window().is_empty());

        // No fill_chunk ran first; every query must still see the raster.
        let source: &dyn TerrainSource = &generator;
        let mut chunk = chunk();
        assert_eq!(source.fill_column(&mut chunk, 0, 0).elevation, Some(10));
        assert_eq!(source.sample_elevation(-30, 25), Some(10.0));
        assert_eq!(generator.height(31, -32, HeightmapKind::OceanFloor), Some(10));
        assert_eq!(generator.column_sample(-17, 9).len(), 10);
        assert_eq!(generator.height(32, 0, HeightmapKind::OceanFloor), None);
    }

    #[test]
    fn test_possible_biomes_include_default() {
        let generator = test_support::flat_generator(10);
        let names: Vec<_> = generator
            .possible_biomes()
            .iter()
            .map(BiomeId::as_str)
            .collect();
        assert!(names.contains(&"ocean"));
        assert!(names.contains(&"desert"));
        assert!(names.contains(&"plains"));
    }
}
