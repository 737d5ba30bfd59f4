//! Logical-to-physical address mapping for the serpentine panel chain.
//!
//! The deployed display is sixteen 32x32 panels on one electrical chain,
//! presented to the driver as a 512x32 strip. Logically the panels form a
//! 128x128 square: two bands of 64 rows, each band four 32-column strips
//! of two stacked panels. Consecutive strips alternate scan direction
//! (serpentine wiring), and the two bands run in opposite chain order, so
//! every write has to be remapped before it reaches the driver.

/// Geometry of the panel chain. The default is the deployed layout; the
/// derived constants for it (bases 192/128/64/0 and 256/320/384/448)
/// match the device's wiring exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainLayout {
    /// Pixels per panel side.
    pub panel_size: i32,
    /// Logical rows per band: two stacked panels.
    pub band_rows: i32,
    /// Vertical strips per band.
    pub strips_per_band: i32,
    /// Bands stacked vertically.
    pub bands: i32,
}

impl Default for ChainLayout {
    fn default() -> Self {
        Self {
            panel_size: 32,
            band_rows: 64,
            strips_per_band: 4,
            bands: 2,
        }
    }
}

impl ChainLayout {
    /// Width of the logical coordinate space.
    pub fn logical_width(&self) -> i32 {
        self.panel_size * self.strips_per_band
    }

    /// Height of the logical coordinate space.
    pub fn logical_height(&self) -> i32 {
        self.band_rows * self.bands
    }

    /// Map a logical coordinate to the chain address the driver expects.
    ///
    /// Pure and total: coordinates outside the logical extent return the
    /// chain origin `(0, 0)` rather than failing, matching the device's
    /// documented catch-all.
    pub fn map(&self, x: i32, y: i32) -> (i32, i32) {
        if x < 0 || y < 0 || x >= self.logical_width() || y >= self.logical_height() {
            return (0, 0);
        }

        let band = y / self.band_rows;
        let strip = x / self.panel_size;
        let yh = y % self.band_rows;
        let xh = x % self.panel_size;

        // Bands serpentine at the strip level too: even bands run
        // tail-first along the chain, odd bands head-first.
        let strip_index = if band % 2 == 0 {
            band * self.strips_per_band + (self.strips_per_band - 1 - strip)
        } else {
            band * self.strips_per_band + strip
        };
        let base = strip_index * self.band_rows;

        if strip % 2 == 0 {
            (base + yh, self.panel_size - 1 - xh)
        } else {
            (base + self.band_rows - 1 - yh, xh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashSet;

    // Spot checks against the wiring table, one or more per sub-range.
    #[rstest]
    // band 0
    #[case(0, 0, 192, 31)]
    #[case(31, 0, 192, 0)]
    #[case(0, 63, 255, 31)]
    #[case(10, 20, 212, 21)]
    #[case(32, 0, 191, 0)]
    #[case(63, 63, 128, 31)]
    #[case(40, 5, 186, 8)]
    #[case(64, 0, 64, 31)]
    #[case(95, 63, 127, 0)]
    #[case(96, 0, 63, 0)]
    #[case(127, 63, 0, 31)]
    // band 1
    #[case(0, 64, 256, 31)]
    #[case(31, 127, 319, 0)]
    #[case(32, 64, 383, 0)]
    #[case(63, 127, 320, 31)]
    #[case(64, 64, 384, 31)]
    #[case(64, 127, 447, 31)]
    #[case(96, 64, 511, 0)]
    #[case(127, 127, 448, 31)]
    // catch-all
    #[case(128, 0, 0, 0)]
    #[case(200, 10, 0, 0)]
    #[case(0, 128, 0, 0)]
    #[case(10, 200, 0, 0)]
    #[case(-1, 0, 0, 0)]
    #[case(0, -1, 0, 0)]
    fn map_matches_wiring_table(
        #[case] x: i32,
        #[case] y: i32,
        #[case] px: i32,
        #[case] py: i32,
    ) {
        let layout = ChainLayout::default();
        assert_eq!(layout.map(x, y), (px, py), "map({x},{y})");
    }

    #[test]
    fn map_is_a_bijection_onto_the_chain() {
        let layout = ChainLayout::default();
        let mut seen = HashSet::new();
        for y in 0..layout.logical_height() {
            for x in 0..layout.logical_width() {
                let (px, py) = layout.map(x, y);
                assert!((0..512).contains(&px), "x'={px} out of chain");
                assert!((0..32).contains(&py), "y'={py} out of panel");
                assert!(seen.insert((px, py)), "duplicate address ({px},{py})");
            }
        }
        assert_eq!(seen.len(), 512 * 32);
    }

    #[test]
    fn map_is_deterministic() {
        let layout = ChainLayout::default();
        assert_eq!(layout.map(77, 99), layout.map(77, 99));
    }

    #[test]
    fn single_band_layout_scales_down() {
        // One band of two strips: a 64x64 logical square on a 256x32 chain.
        let layout = ChainLayout {
            panel_size: 32,
            band_rows: 64,
            strips_per_band: 2,
            bands: 1,
        };
        assert_eq!(layout.logical_width(), 64);
        assert_eq!(layout.logical_height(), 64);
        // Band 0 runs tail-first: strip 0 maps behind strip 1.
        assert_eq!(layout.map(0, 0), (64, 31));
        assert_eq!(layout.map(32, 0), (63, 0));
        assert_eq!(layout.map(64, 0), (0, 0)); // out of range
    }
}
