//! Immutable resident regions of a raster.

/// A rectangular block of decoded pixels, in raster pixel coordinates.
///
/// Windows are never mutated after construction. Re-windowing builds a new
/// window and swaps it in, so a reader can hold an `Arc<RasterWindow>` for as
/// long as it needs.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterWindow {
    x0: i32,
    z0: i32,
    width: u32,
    height: u32,
    raster_width: u32,
    raster_height: u32,
    pixels: Vec<i32>,
}

impl RasterWindow {
    /// A window with no resident pixels.
    pub fn empty(raster_width: u32, raster_height: u32) -> Self {
        Self {
            x0: 0,
            z0: 0,
            width: 0,
            height: 0,
            raster_width,
            raster_height,
            pixels: Vec::new(),
        }
    }

    /// Build a window over `[x0, x0 + width) × [z0, z0 + height)`, reading each
    /// pixel with `sample(px, pz)`.
    ///
    /// The region must lie inside the raster.
    pub fn from_fn(
        (x0, z0): (i32, i32),
        (width, height): (u32, u32),
        (raster_width, raster_height): (u32, u32),
        mut sample: impl FnMut(u32, u32) -> i32,
    ) -> Self {
        debug_assert!(x0 >= 0 && z0 >= 0);
        debug_assert!(x0 as u32 + width <= raster_width && z0 as u32 + height <= raster_height);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for dz in 0..height {
            for dx in 0..width {
                pixels.push(sample(x0 as u32 + dx, z0 as u32 + dz));
            }
        }
        Self {
            x0,
            z0,
            width,
            height,
            raster_width,
            raster_height,
            pixels,
        }
    }

    /// Lowest resident pixel `(x, z)`.
    pub fn origin(&self) -> (i32, i32) {
        (self.x0, self.z0)
    }

    /// Resident `(width, height)` in pixels.
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Full raster `(width, height)`.
    pub fn raster_size(&self) -> (u32, u32) {
        (self.raster_width, self.raster_height)
    }

    /// `true` if no pixels are resident.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// `true` if every raster pixel is resident.
    pub fn is_whole(&self) -> bool {
        self.x0 == 0
            && self.z0 == 0
            && self.width == self.raster_width
            && self.height == self.raster_height
    }

    /// Approximate heap size of the resident pixels.
    pub fn memory_bytes(&self) -> usize {
        self.pixels.len() * size_of::<i32>()
    }

    /// `true` if every pixel in the inclusive rectangle is resident.
    pub fn covers(&self, (min_x, min_z): (i32, i32), (max_x, max_z): (i32, i32)) -> bool {
        !self.is_empty()
            && min_x >= self.x0
            && min_z >= self.z0
            && i64::from(max_x) < i64::from(self.x0) + i64::from(self.width)
            && i64::from(max_z) < i64::from(self.z0) + i64::from(self.height)
    }

    /// The stored value at pixel `(px, pz)`, or `None` if not resident.
    pub fn get(&self, px: i32, pz: i32) -> Option<i32> {
        let dx = px.checked_sub(self.x0)?;
        let dz = pz.checked_sub(self.z0)?;
        if dx < 0 || dz < 0 || dx as u32 >= self.width || dz as u32 >= self.height {
            return None;
        }
        Some(self.pixels[dz as usize * self.width as usize + dx as usize])
    }

    /// Interpolate between the four pixels around `(px + fx, pz + fz)`.
    ///
    /// Neighbor indices are clamped to the raster, so the last row and column
    /// interpolate against themselves. Returns `None` if a needed pixel is not
    /// resident.
    pub fn bilinear(&self, px: i32, fx: f64, pz: i32, fz: f64) -> Option<f64> {
        let max_x = self.raster_width.saturating_sub(1) as i32;
        let max_z = self.raster_height.saturating_sub(1) as i32;
        let x0 = px.clamp(0, max_x);
        let x1 = px.saturating_add(1).clamp(0, max_x);
        let z0 = pz.clamp(0, max_z);
        let z1 = pz.saturating_add(1).clamp(0, max_z);

        let v00 = f64::from(self.get(x0, z0)?);
        let v10 = f64::from(self.get(x1, z0)?);
        let v01 = f64::from(self.get(x0, z1)?);
        let v11 = f64::from(self.get(x1, z1)?);

        Some(
            v00 * (1.0 - fx) * (1.0 - fz)
                + v10 * fx * (1.0 - fz)
                + v01 * (1.0 - fx) * fz
                + v11 * fx * fz,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4×4 window whose pixel value is `10 * x + z`.
    fn ramp() -> RasterWindow {
        RasterWindow::from_fn((0, 0), (4, 4), (4, 4), |x, z| (10 * x + z) as i32)
    }

    #[test]
    fn test_get_inside_and_outside() {
        let window = ramp();
        assert_eq!(window.get(2, 3), Some(23));
        assert_eq!(window.get(4, 0), None);
        assert_eq!(window.get(-1, 0), None);
        assert!(window.is_whole());
    }

    #[test]
    fn test_bilinear_exact_at_grid_points() {
        let window = ramp();
        for z in 0..4 {
            for x in 0..4 {
                let sampled = window.bilinear(x, 0.0, z, 0.0).unwrap();
                assert_eq!(sampled, window.get(x, z).unwrap() as f64);
            }
        }
    }

    #[test]
    fn test_bilinear_monotonic_between_corners() {
        let window = RasterWindow::from_fn((0, 0), (2, 2), (2, 2), |x, z| match (x, z) {
            (0, 0) => 0,
            (1, 0) => 100,
            (0, 1) => 40,
            _ => 200,
        });
        let mut previous_x = f64::MIN;
        let mut previous_z = f64::MIN;
        for step in 0..=10 {
            let t = step as f64 / 10.0;
            let along_x = window.bilinear(0, t, 0, 0.5).unwrap();
            let along_z = window.bilinear(0, 0.5, 0, t).unwrap();
            assert!(along_x >= previous_x, "x sweep decreased at t={t}");
            assert!(along_z >= previous_z, "z sweep decreased at t={t}");
            previous_x = along_x;
            previous_z = along_z;
        }
        assert_eq!(window.bilinear(0, 0.5, 0, 0.5), Some(85.0));
    }

    #[test]
    fn test_bilinear_clamps_at_edge() {
        let window = ramp();
        // Column 3 has no right neighbor; it interpolates against itself.
        assert_eq!(window.bilinear(3, 0.5, 0, 0.0), Some(30.0));
        assert_eq!(window.bilinear(3, 0.5, 3, 0.5), Some(33.0));
    }

    #[test]
    fn test_partial_window() {
        let window = RasterWindow::from_fn((2, 2), (2, 2), (8, 8), |x, z| (x * z) as i32);
        assert_eq!(window.get(3, 3), Some(9));
        assert_eq!(window.get(1, 3), None);
        assert!(window.covers((2, 2), (3, 3)));
        assert!(!window.covers((2, 2), (4, 3)));
        assert!(!window.is_whole());
        // Right neighbor of column 3 is not resident.
        assert_eq!(window.bilinear(3, 0.5, 2, 0.0), None);
        assert_eq!(window.memory_bytes(), 16);
    }

    #[test]
    fn test_empty_window_covers_nothing() {
        let window = RasterWindow::empty(4, 4);
        assert!(window.is_empty());
        assert!(!window.covers((0, 0), (0, 0)));
        assert_eq!(window.bilinear(0, 0.0, 0, 0.0), None);
    }
}
