//! Render thread: owns the LED matrix and processes commands via a channel.
//!
//! The `rpi-led-matrix` C library is not thread-safe, so all matrix
//! operations happen on a single dedicated thread. The driver in `main`
//! sends one `RenderCommand` through an `mpsc` channel and the thread
//! runs it until shutdown or until a new command interrupts it. Every
//! pixel write goes through the `ChainLayout` mapper to land on the
//! serpentine panel chain.

use crate::clock::clock_face;
use crate::grid::{self, Grid};
use crate::life::{Coloring, Rules, step};
use crate::mapper::ChainLayout;
use crate::{Color, MatrixConfig, create_matrix, is_running};
use chrono::Local;
use image::codecs::gif::GifDecoder;
use image::imageops::FilterType;
use image::{AnimationDecoder, ImageReader, RgbImage};
use rand::Rng;
use rpi_led_matrix::LedCanvas;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

/// How long the initial seed frame stays up before stepping begins.
const SEED_HOLD: Duration = Duration::from_secs(3);
/// Clock redraw interval.
const CLOCK_TICK: Duration = Duration::from_millis(100);

// ── Commands ─────────────────────────────────────────────────────────

/// Commands sent from the driver to the render thread.
pub enum RenderCommand {
    /// Run the life simulation, reseeding when the generation budget ends.
    Life {
        seed: Option<PathBuf>,
        rules: Rules,
        width: i32,
        height: i32,
        fps: u32,
        /// Generations per round; negative runs forever.
        generations: i64,
    },
    /// Show the analog clock, redrawn continuously.
    Clock,
    /// Display a static image, resized to the logical square.
    ShowImage(PathBuf),
    /// Play an animated GIF honoring its per-frame delays.
    PlayGif { path: PathBuf, loop_playback: bool },
    /// Clear the display (all pixels off).
    Clear,
}

// ── Drawing helpers ──────────────────────────────────────────────────

/// Draw one generation. Colorized cells younger than 4 generations get a
/// random sparkle color; settled cells show their own blended color.
fn draw_grid(
    canvas: &mut LedCanvas,
    grid: &Grid,
    layout: &ChainLayout,
    coloring: Coloring,
    brightness: u8,
    rng: &mut impl Rng,
) {
    canvas.clear();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let cell = grid.get(x, y);
            if !cell.is_alive() {
                continue;
            }
            let color = match coloring {
                Coloring::Mono => Color::new(255, 255, 255),
                Coloring::Blend if cell.vitality > 3 => cell.color,
                Coloring::Blend => Color::new(
                    rng.random_range(0..250),
                    rng.random_range(0..250),
                    rng.random_range(0..250),
                ),
            };
            let (px, py) = layout.map(x, y);
            canvas.set(px, py, &color.apply_brightness(brightness).into());
        }
    }
}

/// Draw an image through the chain mapper, pixel by pixel.
fn draw_image(canvas: &mut LedCanvas, img: &RgbImage, layout: &ChainLayout, brightness: u8) {
    canvas.clear();
    for (x, y, pixel) in img.enumerate_pixels() {
        let (px, py) = layout.map(x as i32, y as i32);
        let c = Color::new(pixel[0], pixel[1], pixel[2]).apply_brightness(brightness);
        canvas.set(px, py, &c.into());
    }
}

/// Load an image from disk and resize it to the logical panel square.
fn load_and_resize_image(path: &Path, layout: &ChainLayout) -> Result<RgbImage, Box<dyn Error>> {
    let img = ImageReader::open(path)?.decode()?;
    let resized = img
        .resize_exact(
            layout.logical_width() as u32,
            layout.logical_height() as u32,
            FilterType::Lanczos3,
        )
        .to_rgb8();
    Ok(resized)
}

/// Decode every GIF frame up front, keeping each frame's delay.
fn load_gif_frames(path: &Path) -> Result<Vec<(RgbImage, Duration)>, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader)?;

    let mut frames = Vec::new();
    for frame in decoder.into_frames() {
        let frame = frame?;
        let delay = Duration::from(frame.delay());
        let rgb = image::DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8();
        frames.push((rgb, delay));
    }
    if frames.is_empty() {
        return Err(format!("no frames in {}", path.display()).into());
    }
    Ok(frames)
}

// ── Render loop ──────────────────────────────────────────────────────

/// Main render loop — runs on a dedicated thread, owns the LED matrix.
///
/// Returns when the channel closes (sender dropped). During playback we
/// use `try_recv()` between frames; an arriving command is stashed in
/// `pending_cmd` and processed once the current playback breaks out.
/// The `running` flag is likewise checked only between frames.
pub fn render_loop(
    rx: Receiver<RenderCommand>,
    running: Arc<AtomicBool>,
    matrix_config: MatrixConfig,
    layout: ChainLayout,
    brightness: u8,
) {
    let matrix = match create_matrix(matrix_config) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("failed to initialize LED matrix: {e}");
            return;
        }
    };

    let mut canvas = matrix.offscreen_canvas();
    let mut rng = rand::rng();
    let mut pending_cmd: Option<RenderCommand> = None;

    tracing::info!("render thread started, waiting for commands...");

    loop {
        if !is_running(&running) {
            break;
        }
        let cmd = if let Some(cmd) = pending_cmd.take() {
            cmd
        } else {
            match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => {
                    tracing::info!("render thread: channel closed, shutting down");
                    break;
                }
            }
        };

        match cmd {
            RenderCommand::Clear => {
                canvas.clear();
                canvas = matrix.swap(canvas);
            }

            RenderCommand::Life {
                seed,
                rules,
                width,
                height,
                fps,
                generations,
            } => {
                let frame_duration = Duration::from_millis(1000 / fps.max(1) as u64);

                'rounds: loop {
                    let seeded = match &seed {
                        Some(path) => {
                            tracing::info!("seeding from {}", path.display());
                            grid::load_seed(path, width, height, &mut rng)
                        }
                        None => {
                            tracing::info!("seeding randomly");
                            Grid::random(width, height, &mut rng)
                        }
                    };
                    let mut field = match seeded {
                        Ok(g) => g,
                        Err(e) => {
                            tracing::error!("cannot seed {width}x{height} grid: {e}");
                            break 'rounds;
                        }
                    };
                    tracing::info!("seeded, population {}", field.population());

                    draw_grid(
                        &mut canvas,
                        &field,
                        &layout,
                        rules.coloring,
                        brightness,
                        &mut rng,
                    );
                    canvas = matrix.swap(canvas);

                    // Hold the seed frame, still responsive to shutdown.
                    let hold_until = Instant::now() + SEED_HOLD;
                    while Instant::now() < hold_until {
                        if !is_running(&running) {
                            break 'rounds;
                        }
                        thread::sleep(Duration::from_millis(50));
                    }

                    let mut generation: i64 = 0;
                    while generation != generations {
                        if !is_running(&running) {
                            break 'rounds;
                        }
                        if let Ok(new_cmd) = rx.try_recv() {
                            pending_cmd = Some(new_cmd);
                            break 'rounds;
                        }

                        field = step(&field, rules);
                        draw_grid(
                            &mut canvas,
                            &field,
                            &layout,
                            rules.coloring,
                            brightness,
                            &mut rng,
                        );
                        canvas = matrix.swap(canvas);

                        generation += 1;
                        thread::sleep(frame_duration);
                    }

                    tracing::info!("generation budget reached, reseeding");
                }
            }

            RenderCommand::Clock => {
                let size = layout.logical_width().min(layout.logical_height()) as u32;
                'clock: loop {
                    if !is_running(&running) {
                        break 'clock;
                    }
                    if let Ok(new_cmd) = rx.try_recv() {
                        pending_cmd = Some(new_cmd);
                        break 'clock;
                    }

                    let face = clock_face(size, &Local::now());
                    draw_image(&mut canvas, &face, &layout, brightness);
                    canvas = matrix.swap(canvas);
                    thread::sleep(CLOCK_TICK);
                }
            }

            RenderCommand::ShowImage(path) => match load_and_resize_image(&path, &layout) {
                Ok(img) => {
                    draw_image(&mut canvas, &img, &layout, brightness);
                    canvas = matrix.swap(canvas);
                    tracing::info!("displaying image: {}", path.display());
                }
                Err(e) => {
                    tracing::error!("failed to load image {}: {e}", path.display());
                }
            },

            RenderCommand::PlayGif {
                path,
                loop_playback,
            } => {
                let frames = match load_gif_frames(&path) {
                    Ok(f) => f,
                    Err(e) => {
                        tracing::error!("failed to decode {}: {e}", path.display());
                        continue;
                    }
                };
                tracing::info!("playing {} ({} frames)", path.display(), frames.len());

                let mut frame_index = 0;
                'playback: loop {
                    if !is_running(&running) {
                        break 'playback;
                    }
                    if let Ok(new_cmd) = rx.try_recv() {
                        pending_cmd = Some(new_cmd);
                        break 'playback;
                    }

                    let frame_start = Instant::now();
                    let (img, delay) = &frames[frame_index];
                    draw_image(&mut canvas, img, &layout, brightness);
                    canvas = matrix.swap(canvas);

                    // Sleep only the remainder of the frame's delay.
                    let elapsed = frame_start.elapsed();
                    if *delay > elapsed {
                        thread::sleep(*delay - elapsed);
                    }

                    frame_index += 1;
                    if frame_index >= frames.len() {
                        if loop_playback {
                            frame_index = 0;
                        } else {
                            canvas.clear();
                            canvas = matrix.swap(canvas);
                            tracing::info!("GIF playback finished");
                            break 'playback;
                        }
                    }
                }
            }
        }
    }
}
