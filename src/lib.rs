//! Generative patterns for chained RGB LED matrix panels.
//!
//! The simulation core — toroidal cell grid, game-of-life step engine and
//! the serpentine chain address mapper — lives in `grid`, `life` and
//! `mapper` and builds everywhere. Everything touching the panel hardware
//! (`render`, matrix initialization) sits behind the `hardware` feature so
//! the core stays testable off-Pi.

pub mod clock;
pub mod grid;
pub mod life;
pub mod mapper;
#[cfg(feature = "hardware")]
pub mod render;

#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedMatrix, LedMatrixOptions, LedRuntimeOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Matrix configuration ───────────────────────────────────────────

/// Electrical configuration of the panel chain, as the driver sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Rows per physical panel.
    pub rows: u32,
    /// Columns per physical panel.
    pub cols: u32,
    /// Panels daisy-chained on one data line.
    pub chain: u32,
    /// Parallel chains.
    pub parallel: u32,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 32,
            chain: 16,
            parallel: 1,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the hardware crate.
///
/// Lets the simulation and its tests run without `rpi-led-matrix`; at the
/// hardware boundary we convert via `Into<LedColor>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Placeholder stored in cells that were cleared or never written.
    pub const CLEAR: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply brightness scaling (0-100) to this color.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

// ── Matrix initialization ──────────────────────────────────────────

/// Create a matrix for the configured chain with the device's proven
/// PWM timing (6-bit PWM, 95ns LSB, interlaced scan).
#[cfg(feature = "hardware")]
pub fn create_matrix(config: MatrixConfig) -> Result<LedMatrix, Box<dyn std::error::Error>> {
    let mut options = LedMatrixOptions::new();
    options.set_rows(config.rows);
    options.set_cols(config.cols);
    options.set_chain_length(config.chain);
    options.set_parallel(config.parallel);
    options.set_pwm_bits(6)?;
    options.set_pwm_lsb_nanoseconds(95);
    options.set_scan_mode(1); // interlaced

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(2);

    let matrix = LedMatrix::new(Some(options), Some(rt_options))?;

    Ok(matrix)
}

// ── Shutdown plumbing ──────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets `running` to false. Playback loops
/// check the flag between frames only, never mid-generation.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the frame loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
