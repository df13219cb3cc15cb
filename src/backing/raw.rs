//! Engine-backed raw images: one or more files opened and owned by the reader.

use std::path::{Path, PathBuf};

use super::segment::Segment;
use crate::error::{ImageError, Result};
use crate::source::ImageSource;
use crate::types::OverrunPolicy;

/// A raw image made of one or more segment files read back to back.
///
/// Reads past the physical end fail instead of returning no data, matching
/// the analysis engine's own image layer.
pub struct RawImage {
    segments: Vec<Segment>,
    /// Absolute offset at which each segment starts
    starts: Vec<u64>,
    paths: Vec<PathBuf>,
    len: u64,
}

impl RawImage {
    pub fn open<P: AsRef<Path>>(paths: &[P], use_mmap: bool) -> Result<Self> {
        if paths.is_empty() {
            return Err(ImageError::InvalidArgument(
                "at least one image path is required".into(),
            ));
        }

        let mut segments = Vec::with_capacity(paths.len());
        let mut starts = Vec::with_capacity(paths.len());
        let mut len = 0u64;

        for path in paths {
            let segment = Segment::open(path.as_ref(), use_mmap)?;
            starts.push(len);
            len += segment.len();
            segments.push(segment);
        }

        tracing::debug!(
            "Opened raw image {} ({} segments, {} bytes)",
            paths[0].as_ref().display(),
            segments.len(),
            len
        );

        Ok(Self {
            segments,
            starts,
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            len,
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    fn segment_index(&self, offset: u64) -> usize {
        self.starts.partition_point(|&start| start <= offset) - 1
    }
}

impl ImageSource for RawImage {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        if offset >= self.len || buffer.is_empty() {
            return Ok(0);
        }

        let mut index = self.segment_index(offset);
        let mut position = offset;
        let mut filled = 0;

        while filled < buffer.len() && index < self.segments.len() {
            let local = position - self.starts[index];
            let n = self.segments[index].read_at(local, &mut buffer[filled..])?;
            filled += n;
            position += n as u64;

            if local + n as u64 >= self.segments[index].len() {
                index += 1;
            } else if n == 0 {
                break;
            }
        }
        Ok(filled)
    }

    fn physical_len(&self) -> Option<u64> {
        Some(self.len)
    }

    fn overrun(&self) -> OverrunPolicy {
        OverrunPolicy::Error
    }
}
