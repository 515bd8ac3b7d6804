//! [`RasterImage`]: a decoded raster with a swappable resident window.

use std::sync::{Arc, PoisonError, RwLock};

use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, Luma, RgbImage};

use crate::error::RasterError;
use crate::resource::ResourceResolver;
use crate::window::RasterWindow;

/// How a raster's pixels are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterKind {
    /// One scalar channel. 16-bit sources keep 16-bit values.
    Grayscale,
    /// Packed `0xRRGGBB`; alpha is ignored.
    Color,
}

/// How much of a raster stays resident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    /// Every pixel is resident from `initialize` on. Windows never change.
    #[default]
    Whole,
    /// Only the region around the last requested center is resident.
    Windowed,
}

/// Decoded pixels in their compact source form.
enum SourcePixels {
    Gray8(GrayImage),
    Gray16(ImageBuffer<Luma<u16>, Vec<u16>>),
    Rgb(RgbImage),
}

impl SourcePixels {
    fn decode(image: DynamicImage, kind: RasterKind) -> Self {
        match kind {
            RasterKind::Color => Self::Rgb(image.to_rgb8()),
            RasterKind::Grayscale => match image.color() {
                ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
                    Self::Gray16(image.to_luma16())
                }
                _ => Self::Gray8(image.to_luma8()),
            },
        }
    }

    fn value(&self, x: u32, z: u32) -> i32 {
        match self {
            Self::Gray8(img) => i32::from(img.get_pixel(x, z).0[0]),
            Self::Gray16(img) => i32::from(img.get_pixel(x, z).0[0]),
            Self::Rgb(img) => {
                let [r, g, b] = img.get_pixel(x, z).0;
                (i32::from(r) << 16) | (i32::from(g) << 8) | i32::from(b)
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Gray8(_) => "8-bit grayscale",
            Self::Gray16(_) => "16-bit grayscale",
            Self::Rgb(_) => "color",
        }
    }
}

/// One raster resource: key, decoded source and the currently published window.
///
/// Created unloaded. [`initialize`](Self::initialize) decodes the resource once.
/// Sampling and [`load_window`](Self::load_window) take `&self` and may run
/// from many threads.
pub struct RasterImage {
    key: String,
    kind: RasterKind,
    policy: WindowPolicy,
    width: u32,
    height: u32,
    /// Kept only for windowed rasters; whole rasters live entirely in the window.
    source: Option<SourcePixels>,
    loaded: bool,
    window: RwLock<Arc<RasterWindow>>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

impl RasterImage {
    /// An unloaded raster for `key`.
    pub fn new(key: impl Into<String>, kind: RasterKind, policy: WindowPolicy) -> Self {
        Self {
            key: key.into(),
            kind,
            policy,
            width: 0,
            height: 0,
            source: None,
            loaded: false,
            window: RwLock::new(Arc::new(RasterWindow::empty(0, 0))),
        }
    }

    /// Resolve and decode the raster.
    ///
    /// Re-invoking replaces the previous contents. Must not run concurrently
    /// with sampling; `&mut self` enforces that.
    pub fn initialize(&mut self, resolver: &dyn ResourceResolver) -> Result<(), RasterError> {
        let bytes = resolver
            .resolve(&self.key)
            .map_err(|source| RasterError::ResourceMissing {
                key: self.key.clone(),
                source,
            })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| RasterError::Decode {
            key: self.key.clone(),
            source,
        })?;
        let (width, height) = (decoded.width(), decoded.height());
        if width % 2 != 0 || height % 2 != 0 {
            return Err(RasterError::InvalidDimensions {
                key: self.key.clone(),
                width,
                height,
            });
        }

        let source = SourcePixels::decode(decoded, self.kind);
        tracing::info!(
            "Found {} raster {} ({}x{})",
            source.describe(),
            self.key,
            width,
            height
        );

        self.width = width;
        self.height = height;
        let window = match self.policy {
            WindowPolicy::Whole => {
                RasterWindow::from_fn((0, 0), (width, height), (width, height), |x, z| {
                    source.value(x, z)
                })
            }
            WindowPolicy::Windowed => RasterWindow::empty(width, height),
        };
        self.source = match self.policy {
            WindowPolicy::Whole => None,
            WindowPolicy::Windowed => Some(source),
        };
        *self.window.get_mut().unwrap_or_else(PoisonError::into_inner) = Arc::new(window);
        self.loaded = true;
        Ok(())
    }

    /// Resource key this raster was created with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Channel interpretation.
    pub fn kind(&self) -> RasterKind {
        self.kind
    }

    /// Residency policy.
    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    /// `true` once `initialize` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Pixel width; 0 before `initialize`.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height; 0 before `initialize`.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Snapshot of the currently published window.
    pub fn window(&self) -> Arc<RasterWindow> {
        Arc::clone(&self.window.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Raw stored value at pixel `(px, pz)`.
    pub fn sample_nearest(&self, px: i32, pz: i32) -> Result<i32, RasterError> {
        self.ensure_loaded()?;
        self.window()
            .get(px, pz)
            .ok_or_else(|| self.out_of_range(px, pz))
    }

    /// Bilinear sample around `(px + fx, pz + fz)`, clamping neighbors at the
    /// raster edge.
    pub fn sample_bilinear(&self, px: i32, fx: f64, pz: i32, fz: f64) -> Result<f64, RasterError> {
        self.ensure_loaded()?;
        self.window()
            .bilinear(px, fx, pz, fz)
            .ok_or_else(|| self.out_of_range(px, pz))
    }

    /// Make pixels within `radius` of `(center_x, center_z)` resident and
    /// return the window that covers them.
    ///
    /// Whole rasters, and windowed rasters whose current window already covers
    /// the region, return the current window unchanged. Otherwise a new window
    /// is built and published; snapshots taken earlier stay valid.
    pub fn load_window(
        &self,
        center_x: i32,
        center_z: i32,
        radius: u32,
    ) -> Result<Arc<RasterWindow>, RasterError> {
        self.load_region((center_x, center_z), (center_x, center_z), radius)
    }

    /// Make the inclusive pixel rectangle `min..=max`, grown by `margin` on
    /// every side, resident and return the window that covers it.
    ///
    /// Same publication rules as [`load_window`](Self::load_window).
    pub fn load_region(
        &self,
        min: (i32, i32),
        max: (i32, i32),
        margin: u32,
    ) -> Result<Arc<RasterWindow>, RasterError> {
        self.ensure_loaded()?;
        let Some(source) = self.source.as_ref() else {
            return Ok(self.window());
        };

        // One extra pixel so bilinear neighbors at the window edge are resident.
        let reach = i64::from(margin) + 1;
        let clamp_x = |v: i64| v.clamp(0, i64::from(self.width) - 1) as i32;
        let clamp_z = |v: i64| v.clamp(0, i64::from(self.height) - 1) as i32;
        let min = (
            clamp_x(i64::from(min.0) - reach),
            clamp_z(i64::from(min.1) - reach),
        );
        let max = (
            clamp_x(i64::from(max.0) + reach),
            clamp_z(i64::from(max.1) + reach),
        );

        let current = self.window();
        if current.covers(min, max) {
            return Ok(current);
        }

        let mut slot = self.window.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have published a covering window while we waited.
        if slot.covers(min, max) {
            return Ok(Arc::clone(&slot));
        }
        let extent = ((max.0 - min.0 + 1) as u32, (max.1 - min.1 + 1) as u32);
        let window = Arc::new(RasterWindow::from_fn(
            min,
            extent,
            (self.width, self.height),
            |x, z| source.value(x, z),
        ));
        tracing::debug!(
            "Raster {} window moved to {:?} ({}x{}, {} KiB)",
            self.key,
            min,
            extent.0,
            extent.1,
            window.memory_bytes() / 1024
        );
        *slot = Arc::clone(&window);
        Ok(window)
    }

    fn ensure_loaded(&self) -> Result<(), RasterError> {
        if self.loaded {
            Ok(())
        } else {
            Err(RasterError::NotLoaded {
                key: self.key.clone(),
            })
        }
    }

    fn out_of_range(&self, x: i32, z: i32) -> RasterError {
        RasterError::OutOfRange {
            key: self.key.clone(),
            x,
            z,
        }
    }
}
