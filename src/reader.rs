//! The image reader handed to filesystem analysis.
//!
//! An [`ImageReader`] couples a backing store with a declared size and an
//! image type. The declared size is what callers see from [`ImageReader::size`];
//! it is fixed at construction and may be larger than the bytes actually
//! behind the reader. Reads always come from the real backing data.

use std::io::{Read, Seek};
use std::path::Path;

use crate::backing::{RawImage, StreamSource, segment_paths};
use crate::config::ReaderOptions;
use crate::detect;
use crate::error::{ImageError, Result};
use crate::source::ImageSource;
use crate::types::{BackingKind, ImageInfo, ImageType, OverrunPolicy};

/// Largest single allocation step when the readable length is unknown
const READ_CHUNK: usize = 1024 * 1024;

enum Backing<'a> {
    Engine(RawImage),
    Stream(Box<dyn ImageSource + 'a>),
}

impl Backing<'_> {
    fn source_mut(&mut self) -> &mut dyn ImageSource {
        match self {
            Backing::Engine(image) => image,
            Backing::Stream(source) => source.as_mut(),
        }
    }

    fn kind(&self) -> BackingKind {
        match self {
            Backing::Engine(_) => BackingKind::Engine,
            Backing::Stream(_) => BackingKind::Stream,
        }
    }
}

/// A random-access disk image.
///
/// # Example
///
/// ```ignore
/// let mut image = ImageReader::open("image.raw")?;
/// let boot = image.read(0, 512)?;
/// image.close()?;
///
/// let mut file = File::open("image.raw")?;
/// let mut image = ImageReader::from_stream(Some(&mut file), 102_400, ImageType::Raw)?;
/// assert!(image.read(1 << 40, 16)?.is_empty());
/// ```
pub struct ImageReader<'a> {
    backing: Option<Backing<'a>>,
    declared_size: u64,
    image_type: ImageType,
    sector_size: u32,
}

impl ImageReader<'static> {
    /// Opens a raw image file, picking up split segments next to it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&segment_paths(path), ReaderOptions::default())
    }

    /// Opens the given segment files as one engine-backed image.
    ///
    /// Without a declared size in `options` the reader reports the combined
    /// length of the segments.
    pub fn open_with<P: AsRef<Path>>(paths: &[P], options: ReaderOptions) -> Result<Self> {
        options.validate()?;
        let mut image = RawImage::open(paths, options.use_mmap)?;

        let declared_size = options.declared_size.unwrap_or(image.len());
        let image_type = resolve_type(&mut image, options.image_type, declared_size)?;

        tracing::info!(
            "Opened {} image {} ({} bytes declared, {} bytes physical)",
            image_type,
            image.paths()[0].display(),
            declared_size,
            image.len()
        );

        Ok(Self {
            backing: Some(Backing::Engine(image)),
            declared_size,
            image_type,
            sector_size: options.sector_size,
        })
    }
}

impl<'a> ImageReader<'a> {
    /// Wraps a caller-supplied stream.
    ///
    /// Passing `None` fails with `InvalidArgument`. `declared_size` is
    /// reported verbatim by [`size`](Self::size) and may exceed the length of
    /// the stream.
    ///
    /// A stream passed by value is dropped by [`close`](Self::close). Lend it
    /// as `Some(&mut stream)` to keep using it afterwards.
    pub fn from_stream<S>(
        stream: Option<S>,
        declared_size: u64,
        image_type: ImageType,
    ) -> Result<Self>
    where
        S: Read + Seek + 'a,
    {
        let options = ReaderOptions::new()
            .with_type(image_type)
            .with_declared_size(declared_size);
        Self::from_stream_with(stream, options)
    }

    /// Wraps a caller-supplied stream using `options`, which must carry a
    /// declared size.
    pub fn from_stream_with<S>(stream: Option<S>, options: ReaderOptions) -> Result<Self>
    where
        S: Read + Seek + 'a,
    {
        let mut source = StreamSource::new(stream)?;
        options.validate()?;

        let declared_size = options.declared_size.ok_or_else(|| {
            ImageError::InvalidArgument("stream-backed images need a declared size".into())
        })?;
        let image_type = resolve_type(&mut source, options.image_type, declared_size)?;

        tracing::debug!(
            "Wrapped stream as {} image ({} bytes declared)",
            image_type,
            declared_size
        );

        Ok(Self {
            backing: Some(Backing::Stream(Box::new(source))),
            declared_size,
            image_type,
            sector_size: options.sector_size,
        })
    }

    fn backing_mut(&mut self) -> Result<&mut Backing<'a>> {
        self.backing.as_mut().ok_or(ImageError::ClosedHandle)
    }

    fn backing(&self) -> Result<&Backing<'a>> {
        self.backing.as_ref().ok_or(ImageError::ClosedHandle)
    }

    /// Returns the declared size of the image.
    pub fn size(&self) -> Result<u64> {
        self.backing()?;
        Ok(self.declared_size)
    }

    pub fn image_type(&self) -> Result<ImageType> {
        self.backing()?;
        Ok(self.image_type)
    }

    pub fn sector_size(&self) -> Result<u32> {
        self.backing()?;
        Ok(self.sector_size)
    }

    pub fn is_open(&self) -> bool {
        self.backing.is_some()
    }

    /// Reads up to `length` bytes starting at `offset`.
    ///
    /// Negative offsets fail with `InvalidOffset`. Fewer than `length` bytes
    /// are returned when the backing data ends first. At or past the end of
    /// the backing data, stream-backed readers return an empty vector and
    /// engine-backed readers fail with `ReadPastEnd`.
    pub fn read(&mut self, offset: i64, length: usize) -> Result<Vec<u8>> {
        let source = self.backing_mut()?.source_mut();
        if offset < 0 {
            return Err(ImageError::InvalidOffset { offset });
        }
        let offset = offset as u64;
        let physical = source.physical_len();

        if let Some(len) = physical {
            if offset >= len {
                return overrun(source.overrun(), offset, len);
            }
        }

        let wanted = match physical {
            Some(len) => length.min(usize::try_from(len - offset).unwrap_or(usize::MAX)),
            None => length,
        };

        let mut data = Vec::new();
        while data.len() < wanted {
            let start = data.len();
            let step = (wanted - start).min(READ_CHUNK);
            data.resize(start + step, 0);

            let n = source.read_at(offset + start as u64, &mut data[start..])?;
            data.truncate(start + n);
            if n < step {
                break;
            }
        }

        if data.is_empty() && length > 0 {
            if let OverrunPolicy::Error = source.overrun() {
                return Err(ImageError::ReadPastEnd {
                    offset,
                    size: physical.unwrap_or(offset),
                });
            }
        }
        Ok(data)
    }

    /// Summarises the open image.
    pub fn info(&self) -> Result<ImageInfo> {
        let backing = self.backing()?;
        let (physical_size, segments) = match backing {
            Backing::Engine(image) => (
                Some(image.len()),
                image
                    .paths()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect(),
            ),
            Backing::Stream(source) => (source.physical_len(), Vec::new()),
        };

        Ok(ImageInfo {
            backing: backing.kind(),
            image_type: self.image_type,
            size: self.declared_size,
            physical_size,
            sector_size: self.sector_size,
            segments,
        })
    }

    /// Releases the backing store. A borrowed stream is handed back to its
    /// owner untouched; every later call fails with `ClosedHandle`.
    pub fn close(&mut self) -> Result<()> {
        let backing = self.backing.take().ok_or(ImageError::ClosedHandle)?;
        tracing::debug!("Closed {:?}-backed image", backing.kind());
        Ok(())
    }
}

fn overrun(policy: OverrunPolicy, offset: u64, size: u64) -> Result<Vec<u8>> {
    match policy {
        OverrunPolicy::Empty => Ok(Vec::new()),
        OverrunPolicy::Error => Err(ImageError::ReadPastEnd { offset, size }),
    }
}

fn resolve_type<S: ImageSource + ?Sized>(
    source: &mut S,
    hint: ImageType,
    size_hint: u64,
) -> Result<ImageType> {
    let resolved = match hint {
        ImageType::Detect => {
            let found = detect::detect(source, size_hint)?;
            tracing::debug!("Detected image type: {}", found);
            found
        }
        other => other,
    };

    if resolved.is_container() {
        tracing::warn!("{} images must be decoded before they can be read", resolved);
        return Err(ImageError::UnsupportedType(resolved));
    }
    Ok(resolved)
}
