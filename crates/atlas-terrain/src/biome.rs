//! Biome resolution from a color-coded raster.
//!
//! Entries pair a raster color with a biome id. A [`ColorBiomeTable`] is built
//! once from them; the [`BiomeSampler`] maps biome grid positions onto the
//! color raster and looks the pixel up in the table. Entry lists referenced by
//! id are loaded through a [`BiomeEntryCache`].

mod cache;
mod entry;
mod sampler;
mod table;

pub use cache::BiomeEntryCache;
pub use entry::BiomeEntry;
pub use sampler::BiomeSampler;
pub use table::ColorBiomeTable;
