//! Grayscale surface-height preview of a generated area.

use std::path::Path;

use atlas_voxel::{CHUNK_WIDTH, ChunkPos, ChunkWriter, HeightmapKind, ProtoChunk};
use image::{GrayImage, Luma};

/// Top-down image of the world-surface markers of a square of chunks centred
/// on the origin. Brighter is higher; columns without a surface stay black.
pub struct SurfacePreview {
    radius: i32,
    min_y: i32,
    height: u32,
    image: GrayImage,
}

impl SurfacePreview {
    /// An all-black preview covering chunks `-radius..=radius` on both axes.
    pub fn new(radius: u32, min_y: i32, height: u32) -> Self {
        let side = (2 * radius + 1) * CHUNK_WIDTH as u32;
        Self {
            radius: radius as i32,
            min_y,
            height,
            image: GrayImage::new(side, side),
        }
    }

    /// Shade the pixels of one chunk. Chunks outside the area are ignored.
    pub fn record(&mut self, chunk: &ProtoChunk) {
        let Some((base_x, base_z)) = self.pixel_origin(chunk.chunk_pos()) else {
            return;
        };
        for local_x in 0..CHUNK_WIDTH as u8 {
            for local_z in 0..CHUNK_WIDTH as u8 {
                let Some(marker) =
                    chunk.height_marker(HeightmapKind::WorldSurface, local_x, local_z)
                else {
                    continue;
                };
                let shade = self.shade(marker.y);
                self.image.put_pixel(
                    base_x + u32::from(local_x),
                    base_z + u32::from(local_z),
                    Luma([shade]),
                );
            }
        }
    }

    /// Write the preview; the format follows the file extension.
    pub fn save(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save(path)
    }

    /// The shaded pixels so far.
    #[cfg(test)]
    fn image(&self) -> &GrayImage {
        &self.image
    }

    fn pixel_origin(&self, pos: ChunkPos) -> Option<(u32, u32)> {
        let range = -self.radius..=self.radius;
        if !range.contains(&pos.x) || !range.contains(&pos.z) {
            return None;
        }
        let width = CHUNK_WIDTH as u32;
        Some((
            (pos.x + self.radius) as u32 * width,
            (pos.z + self.radius) as u32 * width,
        ))
    }

    fn shade(&self, y: i32) -> u8 {
        let above = (i64::from(y) - i64::from(self.min_y)).clamp(0, i64::from(self.height));
        (above * 255 / i64::from(self.height.max(1))) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_voxel::BlockId;

    #[test]
    fn test_record_shades_surface_columns() {
        let mut preview = SurfacePreview::new(1, 0, 255);
        assert_eq!(preview.image().dimensions(), (48, 48));

        let mut chunk = ProtoChunk::new(ChunkPos::new(-1, 1), 0, 255);
        chunk.track_surface_height(HeightmapKind::WorldSurface, 3, 4, 200, BlockId(1));
        preview.record(&chunk);

        assert_eq!(preview.image().get_pixel(3, 32 + 4), &Luma([200]));
        assert_eq!(preview.image().get_pixel(4, 32 + 4), &Luma([0]));
    }

    #[test]
    fn test_chunks_outside_area_are_ignored() {
        let mut preview = SurfacePreview::new(0, 0, 255);
        let mut chunk = ProtoChunk::new(ChunkPos::new(2, 0), 0, 255);
        chunk.track_surface_height(HeightmapKind::WorldSurface, 0, 0, 100, BlockId(1));
        preview.record(&chunk);
        assert!(preview.image().pixels().all(|p| p.0 == [0]));
    }

    #[test]
    fn test_shade_clamps_to_world() {
        let preview = SurfacePreview::new(0, -64, 384);
        assert_eq!(preview.shade(-100), 0);
        assert_eq!(preview.shade(320), 255);
        assert_eq!(preview.shade(1000), 255);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        SurfacePreview::new(0, 0, 64).save(&path).unwrap();
        assert_eq!(image::open(&path).unwrap().width(), 16);
    }
}
