//! Biome lookups against a color raster.

use atlas_raster::{
    BIOME_GRID_FACTOR, RasterError, RasterImage, RasterKind, RasterWindow, ResourceResolver,
    WindowPolicy, biome_pixel,
};
use atlas_voxel::BiomeId;

use super::ColorBiomeTable;

/// Resolves the biome at a biome grid position from a color raster.
///
/// The color raster is always fully resident; biome lookups are cheap and
/// happen for positions outside the chunk being generated.
#[derive(Debug)]
pub struct BiomeSampler {
    raster: RasterImage,
    table: ColorBiomeTable,
    horizontal_scale: f32,
}

impl BiomeSampler {
    /// A sampler for the color raster at `biome_map`. Call
    /// [`initialize`](Self::initialize) before resolving.
    pub fn new(
        biome_map: impl Into<String>,
        table: ColorBiomeTable,
        horizontal_scale: f32,
    ) -> Self {
        Self {
            raster: RasterImage::new(biome_map, RasterKind::Color, WindowPolicy::Whole),
            table,
            horizontal_scale,
        }
    }

    /// Decode the color raster.
    pub fn initialize(&mut self, resolver: &dyn ResourceResolver) -> Result<(), RasterError> {
        self.raster.initialize(resolver)
    }

    /// Biome at biome grid cell `(quart_x, quart_z)`.
    ///
    /// Positions outside the raster and unmapped colors give the default biome.
    pub fn resolve(&self, quart_x: i32, quart_z: i32) -> BiomeId {
        self.resolve_in(&self.raster.window(), quart_x, quart_z).clone()
    }

    /// Biome at block `(x, z)`.
    pub fn resolve_block(&self, x: i32, z: i32) -> BiomeId {
        let shift = BIOME_GRID_FACTOR.trailing_zeros();
        self.resolve(x >> shift, z >> shift)
    }

    /// Resolve against a window snapshot, for callers doing many lookups.
    pub fn resolve_in<'a>(
        &'a self,
        window: &RasterWindow,
        quart_x: i32,
        quart_z: i32,
    ) -> &'a BiomeId {
        let (width, height) = window.raster_size();
        biome_pixel(quart_x, quart_z, self.horizontal_scale, width, height)
            .and_then(|(px, pz)| window.get(px, pz))
            .map_or(self.table.default_biome(), |color| {
                self.table.resolve(color as u32)
            })
    }

    /// The color table.
    pub fn table(&self) -> &ColorBiomeTable {
        &self.table
    }

    /// The backing color raster.
    pub fn raster(&self) -> &RasterImage {
        &self.raster
    }

    /// World blocks per raster pixel.
    pub fn horizontal_scale(&self) -> f32 {
        self.horizontal_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeEntry;
    use atlas_raster::MemoryResolver;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// 4×4 raster: left half red, right half green, bottom-right pixel blue.
    fn biome_png() -> Vec<u8> {
        let image = RgbImage::from_fn(4, 4, |x, z| match (x, z) {
            (3, 3) => Rgb([0, 0, 0xFF]),
            (0..=1, _) => Rgb([0xFF, 0, 0]),
            _ => Rgb([0, 0xFF, 0]),
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn sampler(scale: f32) -> BiomeSampler {
        let table = ColorBiomeTable::new(
            &[
                BiomeEntry::new(0xFF0000, "plains"),
                BiomeEntry::new(0x00FF00, "desert"),
            ],
            Some(BiomeId::new("ocean")),
        )
        .unwrap();
        let resolver = MemoryResolver::new().with("atlas:biomes.png", biome_png()).unwrap();
        let mut sampler = BiomeSampler::new("atlas:biomes.png", table, scale);
        sampler.initialize(&resolver).unwrap();
        sampler
    }

    #[test]
    fn test_resolves_mapped_colors() {
        // Scale 4: one biome cell per pixel, origin at pixel (2, 2).
        let sampler = sampler(4.0);
        assert_eq!(sampler.resolve(-2, 0), "plains");
        assert_eq!(sampler.resolve(-1, 0), "plains");
        assert_eq!(sampler.resolve(0, 0), "desert");
    }

    #[test]
    fn test_unmapped_color_is_default() {
        let sampler = sampler(4.0);
        assert_eq!(sampler.resolve(1, 1), "ocean");
    }

    #[test]
    fn test_outside_raster_is_default() {
        let sampler = sampler(4.0);
        for (qx, qz) in [(-3, 0), (2, 0), (0, -3), (0, 2), (i32::MAX / 8, i32::MIN / 8)] {
            assert_eq!(sampler.resolve(qx, qz), "ocean", "({qx}, {qz})");
        }
    }

    #[test]
    fn test_resolve_block_uses_quarter_grid() {
        let sampler = sampler(4.0);
        // Blocks -8..-5 share biome cell -2.
        assert_eq!(sampler.resolve_block(-8, 0), "plains");
        assert_eq!(sampler.resolve_block(-5, 3), "plains");
        assert_eq!(sampler.resolve_block(0, 0), "desert");
        assert_eq!(sampler.resolve_block(4, 4), "ocean");
    }

    #[test]
    fn test_uninitialized_sampler_returns_default() {
        let table = ColorBiomeTable::new(&[BiomeEntry::new(1, "plains")], None).unwrap();
        let sampler = BiomeSampler::new("atlas:missing.png", table, 1.0);
        assert_eq!(sampler.resolve(0, 0), "plains");
    }
}
