pub mod backing;
pub mod config;
pub mod detect;
pub mod error;
pub mod reader;
pub mod source;
pub mod types;

pub use backing::{RawImage, StreamSource, segment_paths};
pub use config::ReaderOptions;
pub use error::{ImageError, Result};
pub use reader::ImageReader;
pub use source::ImageSource;
pub use types::{BackingKind, DEFAULT_SECTOR_SIZE, ImageInfo, ImageType, OverrunPolicy};
