// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use orthomosaic_client::Config;
use orthomosaic_client::constants::MAX_SIDE_CROP_PIXELS;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "orthomosaic")]
#[command(about = "Submit backdown images to the orthomosaic stitching service")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/orthomosaic-client/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Orthomosaic service endpoint
    #[arg(long, global = true, env = "ORTHOMOSAIC_ENDPOINT")]
    endpoint: Option<String>,

    /// Directory for session state and downloaded images
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check images against a settings table without uploading
    Validate {
        /// Backdown images, settings tables or directories containing them
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Settings table to use instead of one found among FILES
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },

    /// Validate and upload images one by one to build an orthomosaic
    Upload {
        /// Backdown images, settings tables or directories containing them
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Settings table to use instead of one found among FILES
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Pixels cropped from each side of every image
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_SIDE_CROP_PIXELS as i64))]
        side_crop: Option<u32>,

        /// Add to an existing orthomosaic (default: the last one used)
        #[arg(long, value_name = "ID", num_args = 0..=1)]
        append: Option<Option<String>>,

        /// Add to the orthomosaic described by the stored origin.json
        #[arg(long, conflicts_with = "append")]
        append_origin: bool,

        /// Confirm the orthomosaic being added to
        #[arg(long)]
        confirm: bool,
    },

    /// Build an orthomosaic from a folder in the service's storage
    Folder {
        /// Name of the storage folder
        location: String,

        /// Pixels cropped from each side of every image
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_SIDE_CROP_PIXELS as i64))]
        side_crop: Option<u32>,
    },

    /// Download an orthomosaic image
    Download {
        /// Orthomosaic id (default: the last one used)
        #[arg(long)]
        id: Option<String>,

        /// Resolution in metres per pixel
        #[arg(long)]
        resolution: Option<f64>,

        /// Origin easting in metres
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        origin_x: f64,

        /// Origin northing in metres
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        origin_y: f64,
    },

    /// Orthorectify a single backdown image
    Orthorectify {
        /// Backdown image (png, jpg, jpeg)
        image: PathBuf,

        /// Camera roll in degrees
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        roll: f64,

        /// Camera pitch in degrees
        #[arg(long, default_value = "-48", allow_hyphen_values = true)]
        pitch: f64,

        /// Output file path (default: ./orthorectified_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the remembered orthomosaic and stored files
    Session,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=orthomosaic_client=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = Some(state_dir);
    }
    config.validate()?;

    match cli.command {
        Commands::Validate { files, settings } => cli::validate(&config, &files, settings),
        Commands::Upload {
            files,
            settings,
            side_crop,
            append,
            append_origin,
            confirm,
        } => cli::upload(
            &config,
            &files,
            settings,
            cli::UploadArgs {
                side_crop_pixels: side_crop.unwrap_or(config.side_crop_pixels),
                append,
                append_origin,
                confirm,
            },
        ),
        Commands::Folder {
            location,
            side_crop,
        } => cli::folder(&config, &location, side_crop.unwrap_or(config.side_crop_pixels)),
        Commands::Download {
            id,
            resolution,
            origin_x,
            origin_y,
        } => cli::download(
            &config,
            id,
            resolution.unwrap_or(config.download_resolution),
            origin_x,
            origin_y,
        ),
        Commands::Orthorectify {
            image,
            roll,
            pitch,
            output,
        } => cli::orthorectify(&config, &image, roll, pitch, output),
        Commands::Session => cli::show_session(&config),
    }
}
