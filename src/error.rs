use std::io;
use thiserror::Error;

use crate::types::ImageType;

/// Errors raised while opening or reading a disk image
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid offset: {offset}")]
    InvalidOffset { offset: i64 },

    #[error("Read past end of image: offset {offset} exceeds image size {size}")]
    ReadPastEnd { offset: u64, size: u64 },

    #[error("Image handle is closed")]
    ClosedHandle,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedType(ImageType),
}

impl ImageError {
    /// Returns true for failures of the I/O class: bad offsets, overruns and
    /// errors surfaced by the backing store itself.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            ImageError::InvalidOffset { .. }
                | ImageError::ReadPastEnd { .. }
                | ImageError::Io(_)
                | ImageError::NotFound(_)
                | ImageError::PermissionDenied(_)
        )
    }

    pub(crate) fn from_open(err: io::Error, path: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ImageError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => {
                ImageError::PermissionDenied(format!("{} - try running with sudo", path))
            }
            _ => ImageError::Io(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_classification() {
        assert!(ImageError::InvalidOffset { offset: -1 }.is_io());
        assert!(ImageError::ReadPastEnd { offset: 10, size: 5 }.is_io());
        assert!(!ImageError::ClosedHandle.is_io());
        assert!(!ImageError::InvalidArgument("x".into()).is_io());
    }

    #[test]
    fn test_from_open_maps_kinds() {
        let err = ImageError::from_open(io::Error::from(io::ErrorKind::NotFound), "/x.raw");
        assert!(matches!(err, ImageError::NotFound(p) if p == "/x.raw"));

        let err = ImageError::from_open(
            io::Error::from(io::ErrorKind::PermissionDenied),
            "/dev/sda",
        );
        assert!(matches!(err, ImageError::PermissionDenied(_)));
    }
}
