//! Game-of-life step engine, parametrized over the two rule variants.
//!
//! Both variants share the B3/S23 birth/survival condition on the 8
//! toroidal neighbors. The standard rules keep cells boolean and white;
//! the colorized rules age cells up to a vitality cap and blend each
//! newborn's color from its alive neighbors.

use crate::Color;
use crate::grid::{Cell, Grid};

/// How a surviving or newborn cell is colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coloring {
    /// Solid white, the classic look.
    Mono,
    /// Average of the alive neighbors' channels, with a saturation boost
    /// so dim averages stay visible on the panel.
    Blend,
}

/// Rule parameters for one automaton variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Consecutive-generation counter saturates here.
    pub vitality_cap: u8,
    pub coloring: Coloring,
}

impl Rules {
    /// Boolean variant: alive/dead only, solid white.
    pub fn standard() -> Self {
        Self {
            vitality_cap: 1,
            coloring: Coloring::Mono,
        }
    }

    /// Colorized variant: aging up to 8, neighbor-averaged colors.
    pub fn colorized() -> Self {
        Self {
            vitality_cap: 8,
            coloring: Coloring::Blend,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::colorized()
    }
}

/// Channel sum below which the dominant channel gets boosted.
const BOOST_FLOOR: u32 = 400;
const BOOST: u32 = 100;

/// Engine-side dead color: deterministic opaque black, distinct in intent
/// from [`Color::CLEAR`] which marks cells that were never written.
const DEAD_BLACK: Color = Color { r: 0, g: 0, b: 0 };

/// Compute the next generation. Reads only from `grid` and writes a fresh
/// grid, so no cell ever observes a partially updated generation. Total
/// over every valid grid; never fails.
pub fn step(grid: &Grid, rules: Rules) -> Grid {
    let mut next = grid.empty_like();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = next_cell(grid, x, y, rules);
            next.set(x, y, cell.vitality, cell.color);
        }
    }
    next
}

fn next_cell(grid: &Grid, x: i32, y: i32, rules: Rules) -> Cell {
    let mut alive = 0u32;
    let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbor = grid.get(x + dx, y + dy);
            if neighbor.is_alive() {
                alive += 1;
                r += neighbor.color.r as u32;
                g += neighbor.color.g as u32;
                b += neighbor.color.b as u32;
            }
        }
    }

    let cell = grid.get(x, y);
    if alive == 3 || (alive == 2 && cell.is_alive()) {
        let vitality = if cell.vitality < rules.vitality_cap {
            cell.vitality + 1
        } else {
            cell.vitality
        };
        let color = match rules.coloring {
            Coloring::Mono => Color::new(255, 255, 255),
            Coloring::Blend => blend(r, g, b, alive),
        };
        Cell { vitality, color }
    } else {
        Cell {
            vitality: 0,
            color: DEAD_BLACK,
        }
    }
}

/// Average the accumulated neighbor channels and apply the saturation
/// boost. A single alive neighbor keeps its raw channels — the division
/// is skipped on purpose.
fn blend(mut r: u32, mut g: u32, mut b: u32, alive: u32) -> Color {
    if alive > 1 {
        r /= alive;
        g /= alive;
        b /= alive;
    }

    // Dim averages get +100 on the dominant channel; ties resolve
    // red, then green, then blue.
    if r + g + b < BOOST_FLOOR {
        if r >= g && r >= b {
            r += BOOST;
        } else if g >= b && g >= r {
            g += BOOST;
        } else {
            b += BOOST;
        }
    }

    Color::new(r.min(255) as u8, g.min(255) as u8, b.min(255) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    fn grid_with_alive(coords: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(16, 16).unwrap();
        for &(x, y) in coords {
            grid.set(x, y, 1, WHITE);
        }
        grid
    }

    #[test]
    fn blinker_oscillates() {
        // Horizontal blinker flips to vertical and back.
        let grid = grid_with_alive(&[(4, 5), (5, 5), (6, 5)]);

        let next = step(&grid, Rules::standard());
        for (x, y, alive) in [
            (5, 4, true),
            (5, 5, true),
            (5, 6, true),
            (4, 5, false),
            (6, 5, false),
        ] {
            assert_eq!(next.get(x, y).is_alive(), alive, "at ({x},{y})");
        }
        assert_eq!(next.population(), 3);

        let back = step(&next, Rules::standard());
        for x in 4..=6 {
            assert!(back.get(x, 5).is_alive());
        }
        assert_eq!(back.population(), 3);
    }

    #[test]
    fn blinker_oscillates_colorized() {
        let grid = grid_with_alive(&[(4, 5), (5, 5), (6, 5)]);
        let next = step(&grid, Rules::colorized());
        assert!(next.get(5, 4).is_alive());
        assert!(next.get(5, 5).is_alive());
        assert!(next.get(5, 6).is_alive());
        assert_eq!(next.population(), 3);
    }

    // A center cell surrounded by `n` alive neighbors, itself alive or not.
    #[rstest]
    #[case(0, false, false)]
    #[case(1, false, false)]
    #[case(1, true, false)]
    #[case(2, false, false)]
    #[case(2, true, true)]
    #[case(3, false, true)]
    #[case(3, true, true)]
    #[case(4, true, false)]
    #[case(4, false, false)]
    #[case(5, true, false)]
    #[case(6, true, false)]
    #[case(7, true, false)]
    #[case(8, true, false)]
    fn birth_survival_counts(
        #[case] neighbors: usize,
        #[case] self_alive: bool,
        #[case] expect_alive: bool,
    ) {
        let offsets = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];
        let mut coords: Vec<(i32, i32)> = offsets[..neighbors]
            .iter()
            .map(|&(dx, dy)| (8 + dx, 8 + dy))
            .collect();
        if self_alive {
            coords.push((8, 8));
        }
        let grid = grid_with_alive(&coords);
        let next = step(&grid, Rules::standard());
        assert_eq!(next.get(8, 8).is_alive(), expect_alive);
    }

    #[test]
    fn boolean_variant_renders_white_and_never_ages() {
        // A 2x2 block is stable: every cell keeps exactly 3 neighbors.
        let mut grid = grid_with_alive(&[(4, 4), (5, 4), (4, 5), (5, 5)]);
        for _ in 0..5 {
            grid = step(&grid, Rules::standard());
        }
        let cell = grid.get(4, 4);
        assert_eq!(cell.vitality, 1);
        assert_eq!(cell.color, WHITE);
    }

    #[test]
    fn vitality_saturates_at_cap() {
        let mut grid = grid_with_alive(&[(4, 4), (5, 4), (4, 5), (5, 5)]);
        for _ in 0..12 {
            grid = step(&grid, Rules::colorized());
        }
        assert_eq!(grid.get(4, 4).vitality, 8);
        assert_eq!(grid.get(5, 5).vitality, 8);
    }

    #[test]
    fn dead_cells_are_black() {
        let grid = grid_with_alive(&[(4, 4)]);
        let next = step(&grid, Rules::colorized());
        let corpse = next.get(4, 4);
        assert_eq!(corpse.vitality, 0);
        assert_eq!(corpse.color, Color::new(0, 0, 0));
    }

    // ── blend ──────────────────────────────────────────────────────

    #[test]
    fn single_neighbor_keeps_raw_channels() {
        // Sum >= 400 so the boost stays out of the way.
        assert_eq!(blend(200, 150, 60, 1), Color::new(200, 150, 60));
    }

    #[test]
    fn multiple_neighbors_average_channels() {
        assert_eq!(blend(401, 403, 405, 2), Color::new(200, 201, 202));
    }

    #[test]
    fn boost_raises_dominant_channel() {
        assert_eq!(blend(100, 80, 50, 1), Color::new(200, 80, 50));
        assert_eq!(blend(50, 120, 80, 1), Color::new(50, 220, 80));
        assert_eq!(blend(10, 20, 120, 1), Color::new(10, 20, 220));
    }

    #[test]
    fn boost_tie_breaks_red_first() {
        assert_eq!(blend(100, 100, 40, 1), Color::new(200, 100, 40));
        // Green-blue tie with red lower goes to green.
        assert_eq!(blend(10, 100, 100, 1), Color::new(10, 200, 100));
    }

    #[test]
    fn boost_clamps_to_255() {
        assert_eq!(blend(200, 0, 0, 1), Color::new(255, 0, 0));
    }

    #[test]
    fn bright_colors_are_not_boosted() {
        assert_eq!(blend(150, 150, 150, 1), Color::new(150, 150, 150));
    }

    #[test]
    fn step_does_not_mutate_input() {
        let grid = grid_with_alive(&[(4, 5), (5, 5), (6, 5)]);
        let snapshot = grid.clone();
        let _ = step(&grid, Rules::colorized());
        assert_eq!(grid, snapshot);
    }
}
