//! Command-line interface for glyphcache.
//!
//! Each subcommand drives one part of the font subsystem against font
//! files on disk; see [`crate::inspect`] for the implementations.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::inspect;

/// glyphcache - inspect fonts through the glyph cache
#[derive(Parser, Debug)]
#[command(name = "glyphcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set log level (overrides GLYPHCACHE_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Font file and glyph request options shared by the glyph commands
#[derive(clap::Args, Debug, Clone)]
pub struct FaceArgs {
    /// Font file (TTF/OTF/TTC)
    pub font: PathBuf,

    /// Face index within a collection
    #[arg(long, default_value_t = 0)]
    pub index: u32,

    /// Pixel height
    #[arg(long, default_value_t = 16)]
    pub size: u32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory and list the faces found
    Scan {
        /// Directory to scan recursively
        dir: PathBuf,
    },

    /// Print line metrics and capabilities of a face
    Metrics {
        #[command(flatten)]
        face: FaceArgs,
    },

    /// Render one character and print it as ASCII art
    Render {
        #[command(flatten)]
        face: FaceArgs,

        /// Character to render
        character: char,

        /// Rotation in tenths of a degree, counter-clockwise
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        orientation: i32,

        /// Render 1-bit instead of 8-bit
        #[arg(long)]
        mono: bool,

        /// Vertical writing (rotation and vertical substitutions)
        #[arg(long)]
        vertical: bool,

        /// Request bold (synthesized when the face is regular)
        #[arg(long)]
        bold: bool,

        /// Request italic (synthesized when the face is upright)
        #[arg(long)]
        italic: bool,
    },

    /// Print the outline of one character as contours
    Outline {
        #[command(flatten)]
        face: FaceArgs,

        /// Character to outline
        character: char,
    },
}

/// Run the parsed command.
pub fn run(cli: Cli) -> Result<()> {
    let config = inspect::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Scan { dir } => inspect::scan(&config, &dir),
        Commands::Metrics { face } => inspect::metrics(&config, &face),
        Commands::Render {
            face,
            character,
            orientation,
            mono,
            vertical,
            bold,
            italic,
        } => {
            let request = inspect::RenderRequest {
                character,
                orientation,
                mono,
                vertical,
                bold,
                italic,
            };
            inspect::render(&config, &face, &request)
        }
        Commands::Outline { face, character } => inspect::outline(&config, &face, character),
    }
}
