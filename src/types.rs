//! Shared value types for image readers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImageError;

/// Default logical sector size in bytes
pub const DEFAULT_SECTOR_SIZE: u32 = 512;

/// Image type hint guiding how the bytes of an image are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    /// Probe the backing store and pick a type
    Detect,
    /// Plain raw (dd) bytes, no detection
    #[default]
    Raw,
    /// Expert Witness Format (EnCase)
    Ewf,
    /// Advanced Forensics Format
    Aff,
    /// VMware virtual disk
    Vmdk,
    /// Microsoft virtual hard disk
    Vhd,
}

impl ImageType {
    pub fn name(&self) -> &'static str {
        match self {
            ImageType::Detect => "detect",
            ImageType::Raw => "raw",
            ImageType::Ewf => "ewf",
            ImageType::Aff => "aff",
            ImageType::Vmdk => "vmdk",
            ImageType::Vhd => "vhd",
        }
    }

    /// Container formats whose payload must be decoded before it is readable
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ImageType::Ewf | ImageType::Aff | ImageType::Vmdk | ImageType::Vhd
        )
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ImageType {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "detect" | "auto" => Ok(ImageType::Detect),
            "raw" | "dd" => Ok(ImageType::Raw),
            "ewf" | "e01" => Ok(ImageType::Ewf),
            "aff" => Ok(ImageType::Aff),
            "vmdk" => Ok(ImageType::Vmdk),
            "vhd" => Ok(ImageType::Vhd),
            other => Err(ImageError::InvalidArgument(format!(
                "unknown image type '{}'",
                other
            ))),
        }
    }
}

/// What a backing store does when asked to read at or past its physical end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrunPolicy {
    /// Return zero bytes, as a POSIX seek+read would
    Empty,
    /// Fail with `ReadPastEnd`
    Error,
}

/// Which kind of backing store a reader is using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackingKind {
    Engine,
    Stream,
}

/// Summary of an open image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub backing: BackingKind,
    pub image_type: ImageType,
    pub size: u64,
    /// Unknown for stream-backed images
    pub physical_size: Option<u64>,
    pub sector_size: u32,
    pub segments: Vec<String>,
}

impl ImageInfo {
    /// Number of whole sectors covered by the declared size
    pub fn sector_count(&self) -> u64 {
        self.size / self.sector_size as u64
    }
}
