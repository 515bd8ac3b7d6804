//! Raster images sampled as terrain data.
//!
//! A [`RasterImage`] decodes a grayscale or color image from a
//! [`ResourceResolver`] once, then serves nearest and bilinear samples from an
//! immutable [`RasterWindow`]. Windowed images keep only a region around the
//! area being generated resident and publish new windows by pointer swap, so
//! readers holding a window snapshot are never affected by re-windowing.
//!
//! The [`transform`] module maps world coordinates onto raster pixels.

pub mod error;
pub mod raster;
pub mod resource;
pub mod transform;
pub mod window;

pub use error::{RasterError, ResourceError};
pub use raster::{RasterImage, RasterKind, WindowPolicy};
pub use resource::{
    DEFAULT_NAMESPACE, DirectoryResolver, MemoryResolver, ResourceKey, ResourceResolver,
};
pub use transform::{
    BIOME_GRID_FACTOR, RasterCoord, biome_pixel, terrain_coord, terrain_pixel_span,
};
pub use window::RasterWindow;
