//! Reader options

use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};
use crate::types::{DEFAULT_SECTOR_SIZE, ImageType};

/// Options for opening an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Type hint; `Raw` disables detection
    pub image_type: ImageType,
    /// Size to report instead of the physical length
    pub declared_size: Option<u64>,
    /// Logical sector size in bytes
    pub sector_size: u32,
    /// Memory-map engine-backed segments when possible
    pub use_mmap: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            image_type: ImageType::Raw,
            declared_size: None,
            sector_size: DEFAULT_SECTOR_SIZE,
            use_mmap: true,
        }
    }
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| ImageError::InvalidArgument(format!("invalid reader options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_type(mut self, image_type: ImageType) -> Self {
        self.image_type = image_type;
        self
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }

    pub fn with_sector_size(mut self, sector_size: u32) -> Self {
        self.sector_size = sector_size;
        self
    }

    /// Disables memory mapping
    pub fn without_mmap(mut self) -> Self {
        self.use_mmap = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sector_size == 0 || self.sector_size % DEFAULT_SECTOR_SIZE != 0 {
            return Err(ImageError::InvalidArgument(format!(
                "sector size {} is not a multiple of {}",
                self.sector_size, DEFAULT_SECTOR_SIZE
            )));
        }
        Ok(())
    }
}
