//! SlideKit CLI: create, edit, preview and export carousel projects.
//!
//! Usage:
//!   slidekit init <NAME>          Create a new project
//!   slidekit info <ID>            Show project information
//!   slidekit frame <ACTION> <ID>  Add, remove, update or select frames
//!   slidekit preview <ID>         Render the reduced-scale preview
//!   slidekit export <ID>          Export one frame or the whole carousel
//!   slidekit validate <ID>        Check that every image reference resolves

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "slidekit",
    about = "Design and export social media carousels",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project store directory (defaults to the configured projects_dir)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory relative image paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project with one frame
    Init {
        /// Project name
        name: String,

        /// Output size: square, portrait, story, landscape
        #[arg(long, default_value = "square")]
        size: String,
    },

    /// Show project information
    Info {
        /// Project id
        id: String,

        /// Print the project record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit the frames of a project
    Frame {
        #[command(subcommand)]
        action: commands::frame::FrameAction,
    },

    /// Render the live-preview image of one frame
    Preview {
        /// Project id
        id: String,

        /// One-based frame number
        #[arg(short, long, default_value = "1")]
        frame: usize,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview scale (defaults to the configured scale)
        #[arg(long)]
        scale: Option<f32>,
    },

    /// Export a single frame or the whole carousel
    Export {
        /// Project id
        id: String,

        /// One-based frame number; exports a zip of all frames when omitted
        #[arg(short, long)]
        frame: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image format: png or jpeg
        #[arg(long)]
        format: Option<String>,
    },

    /// Check that a project loads and its images resolve
    Validate {
        /// Project id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = slidekit_common::AppConfig::load();

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    slidekit_common::logging::init_logging(&logging);

    let ctx = commands::Context::new(config, cli.store, cli.assets);

    match cli.command {
        Commands::Init { name, size } => commands::init::run(&ctx, name, size),
        Commands::Info { id, json } => commands::info::run(&ctx, id, json),
        Commands::Frame { action } => commands::frame::run(&ctx, action),
        Commands::Preview {
            id,
            frame,
            output,
            scale,
        } => commands::preview::run(&ctx, id, frame, output, scale).await,
        Commands::Export {
            id,
            frame,
            output,
            format,
        } => commands::export::run(&ctx, id, frame, output, format).await,
        Commands::Validate { id } => commands::validate::run(&ctx, id).await,
    }
}
