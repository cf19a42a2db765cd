//! Photoframe CLI: frame photos and inspect crop geometry.
//!
//! Usage:
//!   photoframe compose --photo <PATH> [OPTIONS]   Export a framed PNG
//!   photoframe resolve --width W --height H      Print the sample region

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;
mod config;
mod logging;

#[derive(Parser)]
#[command(
    name = "photoframe",
    about = "Crop, rotate and frame photos for campaign profile pictures",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/photoframe/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Crop settings shared by every subcommand.
#[derive(Args, Debug, Clone, Copy)]
pub struct CropArgs {
    /// Zoom factor (1.0 frames the short edge)
    #[arg(long, default_value = "1.0")]
    zoom: f64,

    /// Clockwise rotation in degrees
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    rotate: f64,

    /// Horizontal pan in [-1, 1]
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pan_x: f64,

    /// Vertical pan in [-1, 1]
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pan_y: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame a photo and save the PNG
    Compose {
        /// Photo to frame (JPEG, PNG or WebP)
        #[arg(long)]
        photo: PathBuf,

        /// Frame overlay PNG (overrides the configured one)
        #[arg(long)]
        frame: Option<PathBuf>,

        /// Clip the photo to a circle
        #[arg(long)]
        circle: bool,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        crop: CropArgs,
    },

    /// Print the region of a photo that an export would sample
    Resolve {
        /// Photo width in pixels
        #[arg(long)]
        width: u32,

        /// Photo height in pixels
        #[arg(long)]
        height: u32,

        #[command(flatten)]
        crop: CropArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut app_config = config::AppConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        app_config.logging.level = "debug".to_string();
    }
    logging::init_logging(&app_config.logging);

    match cli.command {
        Commands::Compose {
            photo,
            frame,
            circle,
            out_dir,
            crop,
        } => {
            let options = commands::compose::ComposeOptions {
                photo,
                frame,
                circle,
                out_dir,
                crop,
            };
            commands::compose::run(app_config.campaign, options).await
        }
        Commands::Resolve {
            width,
            height,
            crop,
        } => commands::resolve::run(&app_config.campaign, width, height, crop),
    }
}
