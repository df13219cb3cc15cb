mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use sha2::{Digest, Sha256};
use tracing::Level;

use cli::{Cli, Commands, ImageArgs};
use imginfo::{ImageReader, ReaderOptions};

const HASH_CHUNK: usize = 4 * 1024 * 1024;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { image } => {
            let mut reader = open_image(&image)?;
            let info = reader.info()?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            reader.close()?;
        }
        Commands::Read {
            image,
            offset,
            length,
        } => {
            let mut reader = open_image(&image)?;
            let data = reader
                .read(offset, length)
                .with_context(|| format!("Failed to read {} bytes at offset {}", length, offset))?;
            print_hex_dump(offset as u64, &data);
            reader.close()?;
        }
        Commands::Hash { image } => {
            let mut reader = open_image(&image)?;
            let (digest, hashed) = sha256_image(&mut reader)?;
            println!("{}  {} bytes", digest, hashed);
            reader.close()?;
        }
    }
    Ok(())
}

fn reader_options(args: &ImageArgs) -> Result<ReaderOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            ReaderOptions::from_json(&json)?
        }
        None => ReaderOptions::default(),
    };

    if let Some(image_type) = args.image_type {
        options = options.with_type(image_type);
    }
    if let Some(size) = args.size {
        options = options.with_declared_size(size);
    }
    if let Some(sector_size) = args.sector_size {
        options = options.with_sector_size(sector_size);
    }
    if args.no_mmap {
        options = options.without_mmap();
    }
    Ok(options)
}

fn open_image(args: &ImageArgs) -> Result<ImageReader<'static>> {
    let options = reader_options(args)?;
    let paths = match args.paths.as_slice() {
        [single] => imginfo::segment_paths(single),
        many => many.to_vec(),
    };

    ImageReader::open_with(&paths, options)
        .with_context(|| format!("Failed to open image: {:?}", args.paths[0]))
}

/// Hashes every readable byte of the image, stopping at the physical end.
fn sha256_image(reader: &mut ImageReader<'_>) -> Result<(String, u64)> {
    let physical = reader.info()?.physical_size.unwrap_or(reader.size()?);
    let mut hasher = Sha256::new();
    let mut offset = 0u64;

    while offset < physical {
        let data = reader.read(offset as i64, HASH_CHUNK)?;
        if data.is_empty() {
            break;
        }
        hasher.update(&data);
        offset += data.len() as u64;
    }

    Ok((hex::encode(hasher.finalize()), offset))
}

fn print_hex_dump(base: u64, data: &[u8]) {
    for line in hex_dump_lines(base, data) {
        println!("{}", line);
    }
}

fn hex_dump_lines(base: u64, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(i, line)| {
            let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
            let ascii: String = line
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!(
                "{:08x}  {:<47}  |{}|",
                base + (i * 16) as u64,
                hex.join(" "),
                ascii
            )
        })
        .collect()
}
