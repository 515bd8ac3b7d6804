//! Enclosed cave layers described by floor and ceiling rasters.
//!
//! Layers are loaded with the dimension and sampled by whatever carves them;
//! the generator itself places no cave blocks.

use atlas_config::CaveLayerConfig;
use atlas_raster::{
    RasterError, RasterImage, RasterKind, ResourceResolver, WindowPolicy, biome_pixel,
};

use crate::terrain::TerrainParams;

/// One cave layer: a floor and ceiling surface with optional biome and fluid
/// rasters, all scaled like the main terrain.
#[derive(Debug)]
pub struct CaveLayer {
    params: TerrainParams,
    floor: RasterImage,
    ceiling: RasterImage,
    biomes: Option<RasterImage>,
    aquifer: Option<RasterImage>,
}

impl CaveLayer {
    /// An unloaded layer for `config`.
    pub fn from_config(config: &CaveLayerConfig, params: TerrainParams) -> Self {
        let gray = |key: &str| RasterImage::new(key, RasterKind::Grayscale, WindowPolicy::Whole);
        Self {
            params,
            floor: gray(&config.floor),
            ceiling: gray(&config.ceiling),
            biomes: config
                .biome_map
                .as_deref()
                .map(|key| RasterImage::new(key, RasterKind::Color, WindowPolicy::Whole)),
            aquifer: config.aquifer.as_deref().map(gray),
        }
    }

    /// Decode every raster of the layer.
    pub fn initialize(&mut self, resolver: &dyn ResourceResolver) -> Result<(), RasterError> {
        self.ceiling.initialize(resolver)?;
        self.floor.initialize(resolver)?;
        if let Some(biomes) = self.biomes.as_mut() {
            biomes.initialize(resolver)?;
        }
        if let Some(aquifer) = self.aquifer.as_mut() {
            aquifer.initialize(resolver)?;
        }
        Ok(())
    }

    /// Floor elevation at block `(x, z)`.
    pub fn floor_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.params.sample(&self.floor.window(), x, z)
    }

    /// Ceiling elevation at block `(x, z)`.
    pub fn ceiling_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.params.sample(&self.ceiling.window(), x, z)
    }

    /// Fluid level inside the layer; sea level without a layer aquifer.
    pub fn fluid_level(&self, x: i32, z: i32) -> i32 {
        let aquifer = self
            .aquifer
            .as_ref()
            .and_then(|raster| self.params.sample(&raster.window(), x, z));
        self.params.fluid_level(aquifer)
    }

    /// `true` if block `(x, y, z)` lies in the open space between floor and
    /// ceiling.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        match (self.floor_elevation(x, z), self.ceiling_elevation(x, z)) {
            (Some(floor), Some(ceiling)) => f64::from(y) >= floor && f64::from(y) < ceiling,
            _ => false,
        }
    }

    /// Packed color of the layer's biome raster at biome grid cell
    /// `(quart_x, quart_z)`, if the layer has one and the cell is inside it.
    pub fn biome_color(&self, quart_x: i32, quart_z: i32) -> Option<u32> {
        let raster = self.biomes.as_ref()?;
        let window = raster.window();
        let (width, height) = window.raster_size();
        let (px, pz) = biome_pixel(quart_x, quart_z, self.params.horizontal_scale, width, height)?;
        window.get(px, pz).map(|color| color as u32)
    }

    /// Every raster of the layer, floor first.
    pub fn rasters(&self) -> impl Iterator<Item = &RasterImage> {
        [Some(&self.floor), Some(&self.ceiling), self.biomes.as_ref(), self.aquifer.as_ref()]
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_raster::MemoryResolver;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    fn png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn gray(value: u8) -> Vec<u8> {
        png(DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([value]))))
    }

    fn params() -> TerrainParams {
        TerrainParams {
            starting_y: -10,
            vertical_scale: 1.0,
            horizontal_scale: 1.0,
            sea_level: 0,
            world_height: 200,
        }
    }

    fn config(biomes: bool, aquifer: bool) -> CaveLayerConfig {
        CaveLayerConfig {
            floor: "atlas:cave/floor.png".into(),
            ceiling: "atlas:cave/ceiling.png".into(),
            biome_map: biomes.then(|| "atlas:cave/biomes.png".into()),
            aquifer: aquifer.then(|| "atlas:cave/aquifer.png".into()),
        }
    }

    fn resolver() -> MemoryResolver {
        let biomes = png(DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))));
        MemoryResolver::new()
            .with("atlas:cave/floor.png", gray(20))
            .unwrap()
            .with("atlas:cave/ceiling.png", gray(50))
            .unwrap()
            .with("atlas:cave/biomes.png", biomes)
            .unwrap()
            .with("atlas:cave/aquifer.png", gray(25))
            .unwrap()
    }

    #[test]
    fn test_layer_samples_floor_and_ceiling() {
        let mut layer = CaveLayer::from_config(&config(false, false), params());
        layer.initialize(&resolver()).unwrap();
        assert_eq!(layer.floor_elevation(0, 0), Some(10.0));
        assert_eq!(layer.ceiling_elevation(0, 0), Some(40.0));
        assert!(layer.contains(0, 10, 0));
        assert!(layer.contains(0, 39, 0));
        assert!(!layer.contains(0, 40, 0));
        assert!(!layer.contains(100, 20, 0));
        assert_eq!(layer.fluid_level(0, 0), 0);
        assert_eq!(layer.biome_color(0, 0), None);
        assert_eq!(layer.rasters().count(), 2);
    }

    #[test]
    fn test_optional_rasters() {
        let mut layer = CaveLayer::from_config(&config(true, true), params());
        layer.initialize(&resolver()).unwrap();
        assert_eq!(layer.fluid_level(0, 0), 15);
        assert_eq!(layer.biome_color(0, 0), Some(0x010203));
        assert_eq!(layer.rasters().count(), 4);
        assert!(layer.rasters().all(RasterImage::is_loaded));
    }

    #[test]
    fn test_missing_floor_fails() {
        let mut layer = CaveLayer::from_config(&config(false, false), params());
        let resolver = MemoryResolver::new()
            .with("atlas:cave/ceiling.png", gray(50))
            .unwrap();
        assert!(matches!(
            layer.initialize(&resolver),
            Err(RasterError::ResourceMissing { key, .. }) if key == "atlas:cave/floor.png"
        ));
    }
}
