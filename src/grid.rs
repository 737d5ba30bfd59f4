//! Toroidal cell grid and seeding strategies.
//!
//! The grid wraps at all edges: any `i32` coordinate is valid, opposite
//! edges are adjacent. Seeding fills a fresh grid from a random scatter,
//! a text layout, or a decoded image, with a silent fallback to random
//! when a seed file is missing or unreadable.

use crate::Color;
use image::{ImageReader, RgbImage};
use rand::Rng;
use std::error::Error;
use std::fs;
use std::path::Path;

/// One cell of the simulation.
///
/// `vitality == 0` means dead; the engine never reads a dead cell's color.
/// Alive cells count consecutive generations, saturating at the rule cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub vitality: u8,
    pub color: Color,
}

impl Cell {
    pub const DEAD: Cell = Cell {
        vitality: 0,
        color: Color::CLEAR,
    };

    pub fn is_alive(&self) -> bool {
        self.vitality > 0
    }
}

/// A `width x height` torus of cells, row-major storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate an all-dead grid. Errors on non-positive dimensions —
    /// the only fatal configuration error in the simulation core.
    pub fn new(width: i32, height: i32) -> Result<Self, Box<dyn Error>> {
        if width < 1 || height < 1 {
            return Err(format!("invalid grid dimensions {width}x{height}").into());
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::DEAD; (width * height) as usize],
        })
    }

    /// All-dead grid with the same dimensions, for building the next generation.
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: vec![Cell::DEAD; self.cells.len()],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        let x = x.rem_euclid(self.width);
        let y = y.rem_euclid(self.height);
        (y * self.width + x) as usize
    }

    /// Read the cell at the wrapped coordinate. Never fails; negative and
    /// out-of-range coordinates wrap onto the torus.
    pub fn get(&self, x: i32, y: i32) -> Cell {
        self.cells[self.index(x, y)]
    }

    /// Write a cell at the wrapped coordinate. A non-positive vitality
    /// always stores a cleared cell, discarding the color argument.
    pub fn set(&mut self, x: i32, y: i32, vitality: u8, color: Color) {
        let idx = self.index(x, y);
        self.cells[idx] = if vitality < 1 {
            Cell::DEAD
        } else {
            Cell { vitality, color }
        };
    }

    /// Number of alive cells, used by the seeding tests and status logging.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    // ── Seeding strategies ──────────────────────────────────────────

    /// Uniform random scatter: `width*height/4` placements of vitality-1
    /// cells with random colors. Collisions are allowed, so the resulting
    /// population is at most a quarter of the grid.
    pub fn random(width: i32, height: i32, rng: &mut impl Rng) -> Result<Self, Box<dyn Error>> {
        let mut grid = Self::new(width, height)?;
        for _ in 0..(width * height / 4) {
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);
            grid.set(x, y, 1, random_color(rng));
        }
        Ok(grid)
    }

    /// Text layout: rows separated by `\n`; digits `1`..`9` seed that
    /// vitality, a space stays dead, any other byte seeds vitality 1.
    /// Every alive cell gets a fresh random color.
    pub fn from_text(
        width: i32,
        height: i32,
        bytes: &[u8],
        rng: &mut impl Rng,
    ) -> Result<Self, Box<dyn Error>> {
        let mut grid = Self::new(width, height)?;
        let mut x = 0;
        let mut y = 0;
        for &byte in bytes {
            match byte {
                b'\n' => {
                    y += 1;
                    x = 0;
                    continue;
                }
                b'1'..=b'9' => grid.set(x, y, byte - b'0', random_color(rng)),
                b' ' => grid.set(x, y, 0, Color::CLEAR),
                _ => grid.set(x, y, 1, random_color(rng)),
            }
            x += 1;
        }
        Ok(grid)
    }

    /// Image layout: threshold the first 127x127 source pixels. A bright
    /// pixel (any channel above 128) seeds vitality 9 with the source
    /// color, a dim one (any channel above 16) vitality 1, else dead.
    pub fn from_image(width: i32, height: i32, img: &RgbImage) -> Result<Self, Box<dyn Error>> {
        let mut grid = Self::new(width, height)?;
        for y in 0..127u32.min(img.height()) {
            for x in 0..127u32.min(img.width()) {
                let p = img.get_pixel(x, y);
                let (r, g, b) = (p[0], p[1], p[2]);
                let color = Color::new(r, g, b);
                if r > 128 || g > 128 || b > 128 {
                    grid.set(x as i32, y as i32, 9, color);
                } else if r > 16 || g > 16 || b > 16 {
                    grid.set(x as i32, y as i32, 1, color);
                }
            }
        }
        Ok(grid)
    }
}

fn random_color(rng: &mut impl Rng) -> Color {
    Color::new(rng.random(), rng.random(), rng.random())
}

/// Seed a grid from a file, falling back to random seeding when the path
/// is missing, a directory, or fails to decode. Seed-source problems are
/// never fatal; only invalid dimensions produce an error.
pub fn load_seed(
    path: &Path,
    width: i32,
    height: i32,
    rng: &mut impl Rng,
) -> Result<Grid, Box<dyn Error>> {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => {
            tracing::warn!("{} doesn't exist, seeding randomly", path.display());
            return Grid::random(width, height, rng);
        }
    };
    if meta.is_dir() {
        tracing::warn!("{} is a directory, seeding randomly", path.display());
        return Grid::random(width, height, rng);
    }

    let is_text = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "txt");

    if is_text {
        match fs::read(path) {
            Ok(bytes) => Grid::from_text(width, height, &bytes, rng),
            Err(e) => {
                tracing::warn!("failed to read {}: {e}, seeding randomly", path.display());
                Grid::random(width, height, rng)
            }
        }
    } else {
        let decoded = ImageReader::open(path)
            .map_err(image::ImageError::IoError)
            .and_then(|r| r.decode());
        match decoded {
            Ok(img) => Grid::from_image(width, height, &img.to_rgb8()),
            Err(e) => {
                tracing::warn!("failed to decode {}: {e}, seeding randomly", path.display());
                Grid::random(width, height, rng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use tempfile::TempDir;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn new_rejects_non_positive_dimensions() {
        assert!(Grid::new(0, 10).is_err());
        assert!(Grid::new(10, 0).is_err());
        assert!(Grid::new(-1, -1).is_err());
    }

    #[test]
    fn new_grid_is_all_dead() {
        let grid = Grid::new(8, 8).unwrap();
        assert_eq!(grid.population(), 0);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 5)]
    #[case(9, 7)]
    fn toroidal_wrap(#[case] x: i32, #[case] y: i32) {
        let mut grid = Grid::new(10, 8).unwrap();
        grid.set(x, y, 1, Color::new(1, 2, 3));

        for k in -3..=3 {
            for j in -3..=3 {
                assert_eq!(grid.get(x + k * 10, y + j * 8), grid.get(x, y));
            }
        }
    }

    #[test]
    fn set_wraps_negative_coordinates() {
        let mut grid = Grid::new(10, 8).unwrap();
        grid.set(-1, -1, 1, Color::new(9, 9, 9));
        assert_eq!(grid.get(9, 7).vitality, 1);
    }

    #[test]
    fn dead_write_clears_color() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.set(1, 1, 0, Color::new(200, 100, 50));
        assert_eq!(grid.get(1, 1), Cell::DEAD);
    }

    #[test]
    fn random_seed_density() {
        let grid = Grid::random(32, 32, &mut rng()).unwrap();
        let pop = grid.population();
        // 256 placements with collisions: strictly positive, at most a quarter.
        assert!(pop > 0);
        assert!(pop <= 32 * 32 / 4);
    }

    #[test]
    fn text_seed_places_digits_spaces_and_fillers() {
        let grid = Grid::from_text(16, 16, b"19 x\n 2", &mut rng()).unwrap();
        assert_eq!(grid.get(0, 0).vitality, 1);
        assert_eq!(grid.get(1, 0).vitality, 9);
        assert_eq!(grid.get(2, 0).vitality, 0); // space
        assert_eq!(grid.get(3, 0).vitality, 1); // any other byte
        assert_eq!(grid.get(0, 1).vitality, 0); // space on second row
        assert_eq!(grid.get(1, 1).vitality, 2);
    }

    #[test]
    fn text_seed_newline_resets_column() {
        let grid = Grid::from_text(8, 8, b"1\n1", &mut rng()).unwrap();
        assert!(grid.get(0, 0).is_alive());
        assert!(grid.get(0, 1).is_alive());
        assert_eq!(grid.population(), 2);
    }

    #[test]
    fn image_seed_thresholds() {
        let mut img = RgbImage::new(4, 4);
        img.put_pixel(0, 0, image::Rgb([200, 0, 0])); // bright
        img.put_pixel(1, 0, image::Rgb([0, 20, 0])); // dim
        img.put_pixel(2, 0, image::Rgb([10, 10, 10])); // dead

        let grid = Grid::from_image(16, 16, &img).unwrap();
        assert_eq!(grid.get(0, 0).vitality, 9);
        assert_eq!(grid.get(0, 0).color, Color::new(200, 0, 0));
        assert_eq!(grid.get(1, 0).vitality, 1);
        assert_eq!(grid.get(2, 0).vitality, 0);
    }

    #[test]
    fn load_seed_missing_file_falls_back_to_random() {
        let tmp = TempDir::new().unwrap();
        let grid = load_seed(&tmp.path().join("nope.txt"), 32, 32, &mut rng()).unwrap();
        assert!(grid.population() > 0);
        assert!(grid.population() <= 32 * 32 / 4);
    }

    #[test]
    fn load_seed_directory_falls_back_to_random() {
        let tmp = TempDir::new().unwrap();
        let grid = load_seed(tmp.path(), 32, 32, &mut rng()).unwrap();
        assert!(grid.population() > 0);
    }

    #[test]
    fn load_seed_undecodable_image_falls_back_to_random() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        let grid = load_seed(&path, 32, 32, &mut rng()).unwrap();
        assert!(grid.population() > 0);
    }

    #[test]
    fn load_seed_reads_text_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seed.txt");
        std::fs::write(&path, "3").unwrap();
        let grid = load_seed(&path, 8, 8, &mut rng()).unwrap();
        assert_eq!(grid.get(0, 0).vitality, 3);
        assert_eq!(grid.population(), 1);
    }
}
