use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Level};

use frame_compositor::{
    composition::FrameGenerator,
    config::Config,
    frames::{FrameSource, Selection},
    raster::{ImageDecoder, Rotation},
};

#[derive(Parser)]
#[command(
    name = "frame-compositor",
    version,
    about = "Put a decorative frame around your picture",
    long_about = "Frame-Compositor scales your picture to fit a square canvas, draws the selected frame overlay on top (optionally rotated in 90° steps) and writes the result as a PNG."
)]
struct Cli {
    /// Picture to frame (PNG, JPEG, GIF, WebP, BMP)
    #[arg(short, long, required_unless_present = "list_frames")]
    image: Option<PathBuf>,

    /// Frame to apply, by id or zero-based index (defaults to the configured frame)
    #[arg(short, long)]
    frame: Option<String>,

    /// Number of clockwise quarter turns applied to the frame
    #[arg(short, long, default_value_t = 0, conflicts_with = "rotation", allow_negative_numbers = true)]
    turns: i32,

    /// Frame rotation in degrees (multiple of 90)
    #[arg(short, long, allow_negative_numbers = true)]
    rotation: Option<i32>,

    /// Output PNG path (defaults to the configured download name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the result as a data URL instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// List available frames and exit
    #[arg(long)]
    list_frames: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Frame-Compositor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    let generator = FrameGenerator::from_config(config)?;

    if cli.list_frames {
        for (index, asset) in generator.catalog().iter().enumerate() {
            let location = match &asset.source {
                FrameSource::File(path) => path.display().to_string(),
                FrameSource::Memory(bytes) => format!("<{} bytes in memory>", bytes.len()),
            };
            println!("{:>2}  {:<14} {:<14} {}", index, asset.id, asset.label, location);
        }
        return Ok(());
    }

    let Some(image_path) = cli.image else {
        bail!("--image is required");
    };
    if !ImageDecoder::is_image_path(&image_path) {
        bail!("{:?} does not have an image file extension", image_path);
    }

    let rotation = match cli.rotation {
        Some(degrees) => {
            let rotation = Rotation::from_degrees(degrees);
            if !rotation.is_quarter_turn() {
                bail!("Rotation must be a multiple of 90 degrees, got {}", degrees);
            }
            rotation
        }
        None => Rotation::from_quarter_turns(cli.turns),
    };

    let frame_index = match &cli.frame {
        Some(selector) => generator.catalog().resolve(selector).map_err(|e| anyhow::anyhow!(e.user_message()))?,
        None => generator.default_selection().frame_index(),
    };
    let selection = Selection::new(frame_index, rotation);

    info!("Image: {:?}", image_path);
    info!("Frame: {} at {}", generator.catalog().get(frame_index)?.id, rotation);

    let result = match generator.generate_from_file(&image_path, &selection).await {
        Ok(result) => result,
        Err(e) => bail!(e.user_message()),
    };

    if cli.data_url {
        println!("{}", result.to_data_url());
        return Ok(());
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&generator.config().output.file_name));
    result.save(&output)?;

    info!("Done! Output saved to: {:?}", output);
    Ok(())
}
