//! Image type detection by signature

use crate::error::Result;
use crate::source::ImageSource;
use crate::types::ImageType;

const EWF_SIGNATURE: &[u8] = b"EVF\x09\x0d\x0a\xff\x00";
const AFF_SIGNATURE: &[u8] = b"AFF10\r\n";
const VMDK_SIGNATURE: &[u8] = b"KDMV";
const VHD_COOKIE: &[u8] = b"conectix";
const VHD_FOOTER_LEN: u64 = 512;

/// Identifies a container from its leading bytes.
pub fn detect_header(header: &[u8]) -> Option<ImageType> {
    if header.starts_with(EWF_SIGNATURE) {
        Some(ImageType::Ewf)
    } else if header.starts_with(AFF_SIGNATURE) {
        Some(ImageType::Aff)
    } else if header.starts_with(VMDK_SIGNATURE) {
        Some(ImageType::Vmdk)
    } else {
        None
    }
}

/// Probes `source` and returns the image type it holds.
///
/// Anything that is not a recognised container is raw. `size_hint` locates
/// the VHD footer when the source cannot report its own length.
pub fn detect<S: ImageSource + ?Sized>(source: &mut S, size_hint: u64) -> Result<ImageType> {
    let mut header = [0u8; 8];
    let n = source.read_at(0, &mut header)?;
    if let Some(found) = detect_header(&header[..n]) {
        return Ok(found);
    }

    let len = source.physical_len().unwrap_or(size_hint);
    if len >= VHD_FOOTER_LEN {
        let mut cookie = [0u8; 8];
        let n = source.read_at(len - VHD_FOOTER_LEN, &mut cookie)?;
        if &cookie[..n] == VHD_COOKIE {
            return Ok(ImageType::Vhd);
        }
    }

    Ok(ImageType::Raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::StreamSource;
    use std::io::Cursor;

    fn probe(data: Vec<u8>) -> ImageType {
        let len = data.len() as u64;
        let mut source = StreamSource::new(Some(Cursor::new(data))).unwrap();
        detect(&mut source, len).unwrap()
    }

    #[test]
    fn test_detect_headers() {
        assert_eq!(detect_header(b"EVF\x09\x0d\x0a\xff\x00\x01"), Some(ImageType::Ewf));
        assert_eq!(detect_header(b"AFF10\r\n\0"), Some(ImageType::Aff));
        assert_eq!(detect_header(b"KDMV\x01\0\0\0"), Some(ImageType::Vmdk));
        assert_eq!(detect_header(b"\xeb\x3c\x90MSDOS"), None);
    }

    #[test]
    fn test_detect_vhd_footer() {
        let mut data = vec![0u8; 4096];
        data[4096 - 512..4096 - 504].copy_from_slice(VHD_COOKIE);
        assert_eq!(probe(data), ImageType::Vhd);
    }

    #[test]
    fn test_detect_raw() {
        assert_eq!(probe(vec![0u8; 1024]), ImageType::Raw);
        assert_eq!(probe(Vec::new()), ImageType::Raw);
    }

    #[test]
    fn test_oversized_hint_on_stream_is_raw() {
        let data = vec![0u8; 1024];
        let mut source = StreamSource::new(Some(Cursor::new(data))).unwrap();
        assert_eq!(detect(&mut source, 1_000_000_000_000).unwrap(), ImageType::Raw);
    }
}
