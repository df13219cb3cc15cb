use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{ImageError, Result};

/// A single image file read through positioned file I/O.
pub struct DiskSegment {
    file: File,
    len: u64,
}

impl DiskSegment {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path)
            .map_err(|e| ImageError::from_open(e, &path.display().to_string()))?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{Advice, fadvise};
            let _ = fadvise(&file, 0, None, Advice::Random);
        }

        let len = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self { file, len })
    }

    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        if offset >= self.len {
            return Ok(0);
        }
        self.file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buffer.len() {
            match self.file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// A single image file mapped into memory.
pub struct MmapSegment {
    mmap: Mmap,
}

impl MmapSegment {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ImageError::from_open(e, &path.display().to_string()))?;

        if file.metadata()?.len() == 0 {
            return Err(ImageError::InvalidArgument("Cannot mmap empty file".into()));
        }

        let mmap = unsafe { Mmap::map(&file) }?;

        if mmap.is_empty() {
            return Err(ImageError::InvalidArgument(
                "mmap returned empty mapping (block device not supported)".into(),
            ));
        }

        #[cfg(unix)]
        {
            let _ = mmap.advise(memmap2::Advice::Random);
        }

        Ok(Self { mmap })
    }

    #[inline]
    pub fn slice(&self, offset: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        if start >= self.mmap.len() {
            return None;
        }
        let end = start.saturating_add(len).min(self.mmap.len());
        Some(&self.mmap[start..end])
    }
}

/// One file of a (possibly split) raw image.
pub enum Segment {
    Mmap(MmapSegment),
    Disk(DiskSegment),
}

impl Segment {
    /// Opens a segment, memory-mapping it when allowed and possible.
    pub fn open(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        if use_mmap {
            match MmapSegment::new(path) {
                Ok(m) => return Ok(Segment::Mmap(m)),
                Err(e @ (ImageError::NotFound(_) | ImageError::PermissionDenied(_))) => {
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!("mmap of {} failed ({}), using file reads", path.display(), e);
                }
            }
        }
        Ok(Segment::Disk(DiskSegment::new(path)?))
    }

    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self, Segment::Mmap(_))
    }

    pub fn len(&self) -> u64 {
        match self {
            Segment::Mmap(m) => m.mmap.len() as u64,
            Segment::Disk(d) => d.len,
        }
    }

    pub fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        match self {
            Segment::Mmap(m) => match m.slice(offset, buffer.len()) {
                Some(slice) => {
                    let len = slice.len();
                    buffer[..len].copy_from_slice(slice);
                    Ok(len)
                }
                None => Ok(0),
            },
            Segment::Disk(d) => d.read_at(offset, buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(data: &[u8]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(data).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_disk_segment_basic() {
        let temp_file = temp_with(b"Hello, World! This is test data for DiskSegment.");
        let mut segment = Segment::open(temp_file.path(), false).unwrap();
        assert!(!segment.is_mmap());
        assert_eq!(segment.len(), 48);

        let mut buffer = vec![0u8; 4];
        assert_eq!(segment.read_at(7, &mut buffer).unwrap(), 4);
        assert_eq!(&buffer, b"Worl");
    }

    #[test]
    fn test_mmap_segment_basic() {
        let temp_file = temp_with(b"Hello, World! This is test data for MmapSegment.");
        let mut segment = Segment::open(temp_file.path(), true).unwrap();
        assert!(segment.is_mmap());

        let mut buffer = vec![0u8; 13];
        assert_eq!(segment.read_at(0, &mut buffer).unwrap(), 13);
        assert_eq!(&buffer, b"Hello, World!");
    }

    #[test]
    fn test_short_read_at_end() {
        let temp_file = temp_with(b"Short");
        for use_mmap in [true, false] {
            let mut segment = Segment::open(temp_file.path(), use_mmap).unwrap();
            let mut buffer = vec![0u8; 100];
            assert_eq!(segment.read_at(2, &mut buffer).unwrap(), 3);
            assert_eq!(&buffer[..3], b"ort");
            assert_eq!(segment.read_at(5, &mut buffer).unwrap(), 0);
            assert_eq!(segment.read_at(500, &mut buffer).unwrap(), 0);
        }
    }

    #[test]
    fn test_empty_file_falls_back_to_disk() {
        let temp_file = NamedTempFile::new().unwrap();
        let segment = Segment::open(temp_file.path(), true).unwrap();
        assert!(!segment.is_mmap());
        assert_eq!(segment.len(), 0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = Segment::open("/nonexistent/image.raw", true);
        assert!(matches!(result, Err(ImageError::NotFound(_))));
    }
}
