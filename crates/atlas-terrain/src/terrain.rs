//! Elevation, fluid level and ceiling sampling from grayscale rasters.
//!
//! A [`TerrainSampler`] owns the height raster and the optional aquifer and
//! roof rasters. Chunk generation works from a [`TerrainSnapshot`]: the
//! windows captured once per chunk, so re-windowing by other chunks cannot
//! change what a chunk in flight reads.

use std::sync::Arc;

use atlas_raster::{
    RasterError, RasterImage, RasterKind, RasterWindow, ResourceResolver, WindowPolicy,
    terrain_coord, terrain_pixel_span,
};

/// Scaling shared by every terrain raster of one generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    /// Elevation added to every scaled sample.
    pub starting_y: i32,
    /// Multiplier applied to raw samples.
    pub vertical_scale: f32,
    /// World blocks per raster pixel.
    pub horizontal_scale: f32,
    /// Fluid level when no aquifer applies.
    pub sea_level: i32,
    /// Layers above `starting_y` that elevations are clamped to.
    pub world_height: u32,
}

impl TerrainParams {
    /// Highest elevation any sample may produce.
    pub fn max_elevation(&self) -> i32 {
        self.starting_y.saturating_add_unsigned(self.world_height)
    }

    /// `vertical_scale * sample + starting_y` at block `(x, z)`, or `None`
    /// outside the raster or its resident window.
    pub fn sample(&self, window: &RasterWindow, x: i32, z: i32) -> Option<f64> {
        let (width, height) = window.raster_size();
        let coord = terrain_coord(x, z, self.horizontal_scale, width, height)?;
        let raw = window.bilinear(coord.px, coord.fx, coord.pz, coord.fz)?;
        Some(f64::from(self.vertical_scale) * raw + f64::from(self.starting_y))
    }

    /// Fluid level from an aquifer sample: at least sea level, at most the
    /// maximum elevation, truncated toward zero.
    pub fn fluid_level(&self, aquifer: Option<f64>) -> i32 {
        let sea = f64::from(self.sea_level);
        aquifer
            .unwrap_or(sea)
            .max(sea)
            .min(f64::from(self.max_elevation())) as i32
    }
}

/// Windows captured for one chunk.
#[derive(Clone, Debug)]
pub struct TerrainSnapshot {
    params: TerrainParams,
    height: Arc<RasterWindow>,
    aquifer: Option<Arc<RasterWindow>>,
    roof: Option<Arc<RasterWindow>>,
}

impl TerrainSnapshot {
    /// A snapshot over explicit windows.
    pub fn from_windows(
        params: TerrainParams,
        height: Arc<RasterWindow>,
        aquifer: Option<Arc<RasterWindow>>,
        roof: Option<Arc<RasterWindow>>,
    ) -> Self {
        Self {
            params,
            height,
            aquifer,
            roof,
        }
    }

    /// Elevation at block `(x, z)`; `None` outside the height raster.
    pub fn elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.params.sample(&self.height, x, z)
    }

    /// Fluid level at block `(x, z)`. Sea level without an aquifer raster or
    /// outside it.
    pub fn fluid_level(&self, x: i32, z: i32) -> i32 {
        let aquifer = self
            .aquifer
            .as_deref()
            .and_then(|window| self.params.sample(window, x, z));
        self.params.fluid_level(aquifer)
    }

    /// Aquifer elevation at block `(x, z)` before clamping, if any.
    pub fn aquifer_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.params.sample(self.aquifer.as_deref()?, x, z)
    }

    /// Roof depth at block `(x, z)`; `None` without a roof raster or outside it.
    pub fn ceiling_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.params.sample(self.roof.as_deref()?, x, z)
    }

    /// Whether a roof raster is configured.
    pub fn has_roof(&self) -> bool {
        self.roof.is_some()
    }

    /// Scaling used by this snapshot.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }
}

/// Owner of the height, aquifer and roof rasters.
///
/// Point queries load whatever window they need before sampling, so they
/// work under either [`WindowPolicy`].
#[derive(Debug)]
pub struct TerrainSampler {
    params: TerrainParams,
    height: RasterImage,
    aquifer: Option<RasterImage>,
    roof: Option<RasterImage>,
    gen_radius: u32,
}

impl TerrainSampler {
    /// A sampler over unloaded rasters. Without an aquifer the fluid level is
    /// sea level; without a roof there is no ceiling.
    pub fn new(
        params: TerrainParams,
        height_map: &str,
        aquifer: Option<&str>,
        roof: Option<&str>,
        policy: WindowPolicy,
    ) -> Self {
        let raster = |key: &str| RasterImage::new(key, RasterKind::Grayscale, policy);
        Self {
            params,
            height: raster(height_map),
            aquifer: aquifer.map(raster),
            roof: roof.map(raster),
            gen_radius: 0,
        }
    }

    /// Extra pixels kept resident around every loaded region.
    pub fn with_gen_radius(mut self, gen_radius: u32) -> Self {
        self.gen_radius = gen_radius;
        self
    }

    /// Decode every configured raster.
    pub fn initialize(&mut self, resolver: &dyn ResourceResolver) -> Result<(), RasterError> {
        self.height.initialize(resolver)?;
        if let Some(aquifer) = self.aquifer.as_mut() {
            aquifer.initialize(resolver)?;
        }
        if let Some(roof) = self.roof.as_mut() {
            roof.initialize(resolver)?;
        }
        Ok(())
    }

    /// Snapshot of the currently published windows.
    pub fn snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot {
            params: self.params,
            height: self.height.window(),
            aquifer: self.aquifer.as_ref().map(RasterImage::window),
            roof: self.roof.as_ref().map(RasterImage::window),
        }
    }

    /// Ensure every raster has the pixels under blocks `min..=max` resident,
    /// grown by the generation radius, and capture the resulting windows.
    ///
    /// Rasters the rectangle does not touch keep their current window.
    pub fn load_windows(
        &self,
        min: (i32, i32),
        max: (i32, i32),
    ) -> Result<TerrainSnapshot, RasterError> {
        let scale = self.params.horizontal_scale;
        let load = |raster: &RasterImage| -> Result<Arc<RasterWindow>, RasterError> {
            let span_x = terrain_pixel_span(min.0, max.0, scale, raster.width());
            let span_z = terrain_pixel_span(min.1, max.1, scale, raster.height());
            match span_x.zip(span_z) {
                Some(((x0, x1), (z0, z1))) => {
                    raster.load_region((x0, z0), (x1, z1), self.gen_radius)
                }
                None => Ok(raster.window()),
            }
        };
        Ok(TerrainSnapshot {
            params: self.params,
            height: load(&self.height)?,
            aquifer: self.aquifer.as_ref().map(load).transpose()?,
            roof: self.roof.as_ref().map(load).transpose()?,
        })
    }

    /// Snapshot whose windows cover block `(x, z)`.
    ///
    /// Falls back to the current windows if a raster cannot load one, which
    /// only happens before `initialize`.
    pub fn snapshot_at(&self, x: i32, z: i32) -> TerrainSnapshot {
        self.load_windows((x, z), (x, z)).unwrap_or_else(|err| {
            tracing::warn!("Sampling ({x}, {z}) without loaded windows: {err}");
            self.snapshot()
        })
    }

    /// Elevation at block `(x, z)`.
    pub fn elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.snapshot_at(x, z).elevation(x, z)
    }

    /// Fluid level at block `(x, z)`.
    pub fn fluid_level(&self, x: i32, z: i32) -> i32 {
        self.snapshot_at(x, z).fluid_level(x, z)
    }

    /// Roof depth at block `(x, z)`.
    pub fn ceiling_elevation(&self, x: i32, z: i32) -> Option<f64> {
        self.snapshot_at(x, z).ceiling_elevation(x, z)
    }

    /// Scaling parameters.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// The height raster.
    pub fn height_raster(&self) -> &RasterImage {
        &self.height
    }

    /// The aquifer raster, if configured.
    pub fn aquifer_raster(&self) -> Option<&RasterImage> {
        self.aquifer.as_ref()
    }

    /// The roof raster, if configured.
    pub fn roof_raster(&self) -> Option<&RasterImage> {
        self.roof.as_ref()
    }
}
