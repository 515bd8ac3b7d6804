//! World-to-raster coordinate transforms.
//!
//! The world origin maps to the raster center `(W/2, H/2)`; one raster pixel
//! spans `scale` world blocks. Terrain lookups work on block coordinates and
//! keep the fractional part for bilinear sampling. Biome lookups work on the
//! quarter-resolution biome grid and snap to the nearest pixel.

/// Blocks per biome grid cell along each horizontal axis.
pub const BIOME_GRID_FACTOR: i32 = 4;

/// A raster position split into integer pixel and fractional offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterCoord {
    /// Pixel column.
    pub px: i32,
    /// Offset toward column `px + 1`, in `[0, 1)`.
    pub fx: f64,
    /// Pixel row.
    pub pz: i32,
    /// Offset toward row `pz + 1`, in `[0, 1)`.
    pub fz: f64,
}

/// Map block `(x, z)` onto a `width × height` raster.
///
/// Returns `None` when the position falls outside the raster.
pub fn terrain_coord(x: i32, z: i32, scale: f32, width: u32, height: u32) -> Option<RasterCoord> {
    let rx = x as f32 / scale + (width / 2) as f32;
    let rz = z as f32 / scale + (height / 2) as f32;
    if !(rx >= 0.0 && rz >= 0.0 && rx < width as f32 && rz < height as f32) {
        return None;
    }
    let (ix, iz) = (rx.floor(), rz.floor());
    Some(RasterCoord {
        px: ix as i32,
        fx: f64::from(rx - ix),
        pz: iz as i32,
        fz: f64::from(rz - iz),
    })
}

/// Pixels along one axis of a `size`-pixel raster that blocks `min..=max`
/// map onto, clamped to the raster.
///
/// Returns `None` when the block range lies entirely outside the raster.
pub fn terrain_pixel_span(min: i32, max: i32, scale: f32, size: u32) -> Option<(i32, i32)> {
    let pixel = |block: i32| (block as f32 / scale + (size / 2) as f32).floor() as i64;
    let (lo, hi) = (pixel(min), pixel(max));
    let last = i64::from(size) - 1;
    if size == 0 || hi < 0 || lo > last {
        return None;
    }
    Some((lo.max(0) as i32, hi.min(last) as i32))
}

/// Map biome grid cell `(quart_x, quart_z)` onto the nearest raster pixel.
///
/// Halves round up. Returns `None` when the pixel falls outside the raster.
pub fn biome_pixel(
    quart_x: i32,
    quart_z: i32,
    scale: f32,
    width: u32,
    height: u32,
) -> Option<(i32, i32)> {
    let snap = |quart: i32, half: u32| -> i64 {
        let scaled = quart as f32 * BIOME_GRID_FACTOR as f32 / scale;
        (scaled + 0.5).floor() as i64 + i64::from(half)
    };
    let px = snap(quart_x, width / 2);
    let pz = snap(quart_z, height / 2);
    if px < 0 || pz < 0 || px >= i64::from(width) || pz >= i64::from(height) {
        return None;
    }
    Some((px as i32, pz as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_center() {
        for (w, h, s) in [(4, 4, 1.0), (16, 8, 3.0), (1024, 512, 0.25)] {
            let coord = terrain_coord(0, 0, s, w, h).unwrap();
            assert_eq!((coord.px, coord.pz), ((w / 2) as i32, (h / 2) as i32));
            assert_eq!((coord.fx, coord.fz), (0.0, 0.0));
            assert_eq!(biome_pixel(0, 0, s, w, h), Some(((w / 2) as i32, (h / 2) as i32)));
        }
    }

    #[test]
    fn test_terrain_bounds() {
        // 4 wide at scale 1 covers blocks -2..=1.
        assert!(terrain_coord(-2, -2, 1.0, 4, 4).is_some());
        assert!(terrain_coord(1, 1, 1.0, 4, 4).is_some());
        assert!(terrain_coord(-3, 0, 1.0, 4, 4).is_none());
        assert!(terrain_coord(2, 0, 1.0, 4, 4).is_none());
        assert!(terrain_coord(0, 2, 1.0, 4, 4).is_none());
    }

    #[test]
    fn test_terrain_fraction_with_scale() {
        let coord = terrain_coord(3, -3, 2.0, 8, 8).unwrap();
        assert_eq!((coord.px, coord.fx), (5, 0.5));
        assert_eq!((coord.pz, coord.fz), (2, 0.5));
    }

    #[test]
    fn test_pixel_span_clamps_partial_overlap() {
        // 40 pixels at scale 1 cover blocks -20..=19.
        assert_eq!(terrain_pixel_span(16, 31, 1.0, 40), Some((36, 39)));
        assert_eq!(terrain_pixel_span(-40, -10, 1.0, 40), Some((0, 10)));
        assert_eq!(terrain_pixel_span(20, 35, 1.0, 40), None);
        assert_eq!(terrain_pixel_span(-60, -21, 1.0, 40), None);
    }

    #[test]
    fn test_pixel_span_agrees_with_terrain_coord() {
        for (min, max, scale) in [(0, 15, 0.25), (-16, -1, 3.0), (-7, 8, 1.0)] {
            let (lo, hi) = terrain_pixel_span(min, max, scale, 256).unwrap();
            assert_eq!(terrain_coord(min, 0, scale, 256, 256).unwrap().px, lo);
            assert_eq!(terrain_coord(max, 0, scale, 256, 256).unwrap().px, hi);
        }
        // At a quarter block per pixel, block 15 starts 60 pixels past block 0.
        assert_eq!(terrain_pixel_span(0, 15, 0.25, 256), Some((128, 188)));
    }

    #[test]
    fn test_biome_grid_is_quarter_resolution() {
        // One biome cell spans four blocks, so cell 1 lands four pixels from center.
        assert_eq!(biome_pixel(1, -1, 1.0, 16, 16), Some((12, 4)));
        assert_eq!(biome_pixel(2, 0, 1.0, 16, 16), None);
        assert_eq!(biome_pixel(-2, 0, 1.0, 16, 16), Some((0, 8)));
        assert_eq!(biome_pixel(-3, 0, 1.0, 16, 16), None);
    }

    #[test]
    fn test_biome_rounds_half_up() {
        // 4 / 8 = 0.5 rounds to 1; -4 / 8 = -0.5 rounds to 0.
        assert_eq!(biome_pixel(1, 0, 8.0, 4, 4), Some((3, 2)));
        assert_eq!(biome_pixel(-1, 0, 8.0, 4, 4), Some((2, 2)));
    }
}
