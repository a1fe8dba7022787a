//! Strip identifying metadata from images before they are encrypted
//!
//! Segments and chunks are removed from the container without touching
//! the compressed pixel data, so the image is bit-for-bit the same picture.
//!
//! - JPEG: APP1 (EXIF, XMP) and APP13 (IPTC) segments
//! - PNG: `eXIf`, text and timestamp chunks
//! - WebP: `EXIF` and `XMP ` chunks
//!
//! Other formats are reported as `Unsupported` and left to the caller.

use bytes::Bytes;
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::ImageEXIF;

const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// APP1 carries EXIF and XMP, APP13 carries IPTC
const JPEG_APP1: u8 = 0xe1;
const JPEG_APP13: u8 = 0xed;

const PNG_METADATA_CHUNKS: [[u8; 4]; 5] = [*b"eXIf", *b"tEXt", *b"iTXt", *b"zTXt", *b"tIME"];
const WEBP_XMP_CHUNK: [u8; 4] = *b"XMP ";

#[derive(Debug, thiserror::Error)]
pub enum ScrubError {
    #[error("no metadata stripping for this image format")]
    Unsupported,
    #[error("failed to parse image: {0}")]
    Parse(String),
    #[error("failed to rebuild image: {0}")]
    Encode(#[from] std::io::Error),
}

fn parse_error(e: impl std::fmt::Debug) -> ScrubError {
    ScrubError::Parse(format!("{:?}", e))
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Return `data` with location, camera and text metadata removed
pub fn strip_metadata(data: &[u8]) -> Result<Vec<u8>, ScrubError> {
    let input = Bytes::copy_from_slice(data);
    let mut out = Vec::with_capacity(data.len());

    if data.starts_with(JPEG_SIGNATURE) {
        let mut jpeg = Jpeg::from_bytes(input).map_err(parse_error)?;
        jpeg.remove_segments_by_marker(JPEG_APP1);
        jpeg.remove_segments_by_marker(JPEG_APP13);
        jpeg.encoder().write_to(&mut out)?;
    } else if data.starts_with(PNG_SIGNATURE) {
        let mut png = Png::from_bytes(input).map_err(parse_error)?;
        for kind in PNG_METADATA_CHUNKS {
            png.remove_chunks_by_type(kind);
        }
        png.encoder().write_to(&mut out)?;
    } else if is_webp(data) {
        let mut webp = WebP::from_bytes(input).map_err(parse_error)?;
        webp.set_exif(None);
        webp.remove_chunks_by_id(WEBP_XMP_CHUNK);
        webp.encoder().write_to(&mut out)?;
    } else {
        return Err(ScrubError::Unsupported);
    }

    Ok(out)
}
