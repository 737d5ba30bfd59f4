//! LED pattern driver.
//!
//! One binary, four patterns: the game-of-life simulation (colorized or
//! classic white), an analog clock, static images and animated GIFs. The
//! chosen pattern runs on a dedicated render thread that owns the matrix
//! (see `render`), while this thread waits for Ctrl+C.
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/led-patterns life
//! sudo ./target/release/led-patterns life --standard -o seed.txt
//! sudo ./target/release/led-patterns gif animation.gif
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This binary requires the 'hardware' feature (rpi-led-matrix).");
    eprintln!("Build with: cargo build --release");
    eprintln!("Tests can run without it: cargo test --no-default-features");
    std::process::exit(1);
}

#[cfg(feature = "hardware")]
fn main() {
    if let Err(e) = hardware_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(feature = "hardware")]
fn hardware_main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::{Parser, Subcommand};
    use led_patterns::life::Rules;
    use led_patterns::mapper::ChainLayout;
    use led_patterns::render::{RenderCommand, render_loop};
    use led_patterns::{MatrixConfig, is_running, setup_signal_handler};
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    /// Generative patterns for a chained RGB LED matrix
    #[derive(Parser)]
    #[command(name = "led-patterns")]
    #[command(about = "Render generative patterns on a serpentine LED panel chain")]
    #[command(version)]
    struct Args {
        #[command(subcommand)]
        pattern: Pattern,

        /// Rows per physical panel
        #[arg(long, default_value_t = 32)]
        led_rows: u32,

        /// Columns per physical panel
        #[arg(long, default_value_t = 32)]
        led_cols: u32,

        /// Number of panels daisy-chained on one data line
        #[arg(long, default_value_t = 16)]
        led_chain: u32,

        /// Number of parallel chains
        #[arg(long, default_value_t = 1)]
        led_parallel: u32,

        /// Brightness (0-100)
        #[arg(long, default_value_t = 99)]
        brightness: u8,

        /// Logical grid width
        #[arg(short = 'w', long, default_value_t = 128)]
        width: i32,

        /// Logical grid height
        #[arg(short = 'H', long, default_value_t = 128)]
        height: i32,
    }

    #[derive(Subcommand)]
    enum Pattern {
        /// Game of life with color blending and aging
        Life {
            /// Seed file (.txt layout or an image); falls back to random
            #[arg(short = 'o', long)]
            seed: Option<PathBuf>,

            /// Classic boolean rules, solid white cells
            #[arg(long)]
            standard: bool,

            /// Generations per second
            #[arg(short = 'f', long, default_value_t = 20)]
            fps: u32,

            /// Generations before reseeding; negative runs forever
            #[arg(short = 'd', long, default_value_t = -1, allow_negative_numbers = true)]
            generations: i64,
        },
        /// Analog clock with date and time labels
        Clock,
        /// Display a static image
        Image { path: PathBuf },
        /// Play an animated GIF
        Gif {
            path: PathBuf,

            /// Play once and clear instead of looping
            #[arg(long)]
            once: bool,
        },
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false) // no ANSI color codes for systemd/journald
        .compact()
        .init();

    let args = Args::parse();

    if args.width < 1 || args.height < 1 {
        return Err(format!("invalid grid dimensions {}x{}", args.width, args.height).into());
    }

    let matrix_config = MatrixConfig {
        rows: args.led_rows,
        cols: args.led_cols,
        chain: args.led_chain,
        parallel: args.led_parallel,
    };

    // Two stacked panels per band, the logical extent carved into strips.
    let panel = args.led_rows as i32;
    let layout = ChainLayout {
        panel_size: panel,
        band_rows: panel * 2,
        strips_per_band: (args.width / panel).max(1),
        bands: (args.height / (panel * 2)).max(1),
    };

    tracing::info!("led-patterns v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "chain: {} panels of {}x{}, logical {}x{}",
        matrix_config.chain,
        matrix_config.cols,
        matrix_config.rows,
        layout.logical_width(),
        layout.logical_height()
    );

    let command = match args.pattern {
        Pattern::Life {
            seed,
            standard,
            fps,
            generations,
        } => RenderCommand::Life {
            seed,
            rules: if standard {
                Rules::standard()
            } else {
                Rules::colorized()
            },
            width: args.width,
            height: args.height,
            fps,
            generations,
        },
        Pattern::Clock => RenderCommand::Clock,
        Pattern::Image { path } => RenderCommand::ShowImage(path),
        Pattern::Gif { path, once } => RenderCommand::PlayGif {
            path,
            loop_playback: !once,
        },
    };

    let running = setup_signal_handler()?;
    let (tx, rx) = mpsc::channel();

    let render_running = running.clone();
    let render_handle = std::thread::spawn(move || {
        render_loop(rx, render_running, matrix_config, layout, args.brightness);
    });

    tx.send(command)?;

    while is_running(&running) {
        std::thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("shutting down");
    drop(tx);
    render_handle
        .join()
        .map_err(|_| "render thread panicked")?;

    Ok(())
}
