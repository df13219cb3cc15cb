//! CLI commands using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use imginfo::ImageType;

/// Inspect and read raw disk images.
#[derive(Parser)]
#[command(name = "imginfo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random-access disk image reader", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that opens an image
#[derive(clap::Args)]
pub struct ImageArgs {
    /// Image file(s); a single split segment pulls in its siblings
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Image type (detect, raw, ewf, aff, vmdk, vhd)
    #[arg(short = 't', long)]
    pub image_type: Option<ImageType>,

    /// Report this size instead of the physical size
    #[arg(long)]
    pub size: Option<u64>,

    /// Sector size in bytes
    #[arg(long)]
    pub sector_size: Option<u32>,

    /// Use file reads instead of memory mapping
    #[arg(long)]
    pub no_mmap: bool,

    /// JSON file with reader options (flags override it)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a JSON summary of the image
    Info {
        #[command(flatten)]
        image: ImageArgs,
    },

    /// Hex dump bytes at an offset
    Read {
        #[command(flatten)]
        image: ImageArgs,

        /// Byte offset to read from
        #[arg(short, long, allow_hyphen_values = true)]
        offset: i64,

        /// Number of bytes to read
        #[arg(short, long, default_value = "512")]
        length: usize,
    },

    /// SHA-256 of the readable image bytes
    Hash {
        #[command(flatten)]
        image: ImageArgs,
    },
}
