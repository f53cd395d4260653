//! NavCanvas CLI - Command-line interface
//!
//! This binary provides command-line tools over the NavCanvas library:
//! tile coordinate lookup, visible-window inspection, and an offline map
//! snapshot renderer that drives the full fetch → stage → upload → frame
//! pipeline against a real tile server.

mod compositor;
mod error;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use navcanvas::camera::{visible_tiles, Camera};
use navcanvas::config::{EngineConfig, ViewConfig};
use navcanvas::coord::{tile_to_lat_lon, to_tile_coords};
use navcanvas::engine::{MapEngine, ViewKind};
use navcanvas::provider::HttpTileProvider;
use navcanvas::texture::SoftwareTextureBackend;

use compositor::composite_frame;
use error::CliError;

#[derive(Parser)]
#[command(name = "navcanvas")]
#[command(version = navcanvas::VERSION)]
#[command(about = "Tile cache and camera-projection tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tile containing a geographic position
    Locate {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Zoom level (0-18)
        #[arg(long, default_value = "13")]
        zoom: u8,
    },

    /// Print the visible tile window around a camera position
    Window {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Zoom level (clamped to 1-18)
        #[arg(long, default_value = "13")]
        zoom: f64,

        /// Window radius in tiles (Chebyshev)
        #[arg(long, default_value = "2")]
        radius: u32,
    },

    /// Fetch the visible window and render it to a PNG
    Snapshot {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Zoom level (clamped to 1-18)
        #[arg(long, default_value = "13")]
        zoom: f64,

        /// Window radius in tiles (Chebyshev)
        #[arg(long, default_value = "2")]
        radius: u32,

        /// Tile URL template with {x}, {y}, {z} placeholders
        #[arg(long, default_value = "https://tile.openstreetmap.org/{z}/{x}/{y}.png")]
        url_template: String,

        /// Output PNG path
        #[arg(long, default_value = "snapshot.png")]
        output: String,

        /// Output width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Output height in pixels
        #[arg(long, default_value = "768")]
        height: u32,

        /// Give up after this many seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Locate { lat, lon, zoom } => locate(lat, lon, zoom),
        Command::Window {
            lat,
            lon,
            zoom,
            radius,
        } => window(lat, lon, zoom, radius),
        Command::Snapshot {
            lat,
            lon,
            zoom,
            radius,
            url_template,
            output,
            width,
            height,
            timeout_secs,
        } => snapshot(
            lat,
            lon,
            zoom,
            radius,
            &url_template,
            &output,
            width,
            height,
            timeout_secs,
        ),
    };

    if let Err(error) = result {
        error.exit();
    }
}

fn locate(lat: f64, lon: f64, zoom: u8) -> Result<(), CliError> {
    let tile = to_tile_coords(lat, lon, zoom)?;
    let (nw_lat, nw_lon) = tile_to_lat_lon(&tile);

    println!("tile:      {}", tile);
    println!("x:         {}", tile.x);
    println!("y:         {}", tile.y);
    println!("zoom:      {}", tile.zoom);
    println!("nw corner: {:.6}, {:.6}", nw_lat, nw_lon);
    Ok(())
}

fn window(lat: f64, lon: f64, zoom: f64, radius: u32) -> Result<(), CliError> {
    let camera = Camera::new(lat, lon, zoom);
    let keys = visible_tiles(&camera, radius)?;

    println!(
        "{} tiles at zoom {} (radius {}):",
        keys.len(),
        camera.tile_zoom(),
        radius
    );
    for key in keys {
        println!("  {}", key);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn snapshot(
    lat: f64,
    lon: f64,
    zoom: f64,
    radius: u32,
    url_template: &str,
    output: &str,
    width: u32,
    height: u32,
    timeout_secs: u64,
) -> Result<(), CliError> {
    let _logging = navcanvas::logging::init_logging("logs", "navcanvas.log")
        .map_err(CliError::LoggingInit)?;

    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");

    let config = EngineConfig::primary_only(ViewConfig::primary().with_tile_radius(radius));
    let engine = Arc::new(MapEngine::new(config));
    engine.resize_viewport(ViewKind::Primary, width, height)?;

    let canvas = runtime.block_on(async {
        let provider = HttpTileProvider::new(url_template, engine.clone())?;
        engine.attach_provider(Arc::new(provider));

        let expected = engine.update_camera(ViewKind::Primary, lat, lon, zoom, 0.0, 0.0)?;
        println!("requested {} tiles, waiting...", expected);

        let mut backend = SoftwareTextureBackend::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
        let frame = loop {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let frame = engine.prepare_frame(ViewKind::Primary, &mut backend)?;
            if frame.tiles.len() >= expected {
                break frame;
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(CliError::SnapshotTimeout {
                    loaded: frame.tiles.len(),
                    expected,
                });
            }
        };

        println!("composing {} tiles", frame.tiles.len());
        Ok(composite_frame(&frame, &backend, width, height))
    })?;

    canvas.save(output).map_err(|error| CliError::FileWrite {
        path: output.to_string(),
        error,
    })?;

    println!("wrote {}", output);
    Ok(())
}
