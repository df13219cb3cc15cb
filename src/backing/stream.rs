//! Stream-backed images: bytes come from a caller-supplied `Read + Seek`.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{ImageError, Result};
use crate::source::ImageSource;
use crate::types::OverrunPolicy;

/// Adapts any seekable stream into an [`ImageSource`].
///
/// The stream is owned for as long as the source lives and dropped with it;
/// pass `&mut stream` to keep ownership with the caller. Reads past the end
/// of the stream yield no data, following POSIX seek semantics.
pub struct StreamSource<S> {
    stream: S,
}

impl<S: Read + Seek> StreamSource<S> {
    /// Wraps `stream`, failing with `InvalidArgument` if none was given.
    pub fn new(stream: Option<S>) -> Result<Self> {
        let stream =
            stream.ok_or_else(|| ImageError::InvalidArgument("stream backing is required".into()))?;
        Ok(Self { stream })
    }
}

impl<S: Read + Seek> ImageSource for StreamSource<S> {
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.stream.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buffer.len() {
            match self.stream.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Streams are not asked for their length; end of data is signalled by
    /// a zero-byte read.
    fn physical_len(&self) -> Option<u64> {
        None
    }

    fn overrun(&self) -> OverrunPolicy {
        OverrunPolicy::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_missing_stream() {
        let result = StreamSource::<Cursor<Vec<u8>>>::new(None);
        assert!(matches!(result, Err(ImageError::InvalidArgument(msg)) if msg == "stream backing is required"));
    }

    #[test]
    fn test_read_at_is_positioned() {
        let mut source = StreamSource::new(Some(Cursor::new(b"abcdefgh".to_vec()))).unwrap();
        let mut buffer = [0u8; 3];

        assert_eq!(source.read_at(5, &mut buffer).unwrap(), 3);
        assert_eq!(&buffer, b"fgh");
        assert_eq!(source.read_at(1, &mut buffer).unwrap(), 3);
        assert_eq!(&buffer, b"bcd");
    }

    #[test]
    fn test_read_past_end_is_empty() {
        let mut source = StreamSource::new(Some(Cursor::new(b"abc".to_vec()))).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(source.read_at(100, &mut buffer).unwrap(), 0);
        assert_eq!(source.overrun(), OverrunPolicy::Empty);
    }

    #[test]
    fn test_borrowed_stream_stays_with_caller() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        {
            let mut source = StreamSource::new(Some(&mut cursor)).unwrap();
            let mut buffer = [0u8; 1];
            source.read_at(2, &mut buffer).unwrap();
        }
        assert_eq!(cursor.get_ref(), b"abc");
    }
}
