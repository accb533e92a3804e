//! Helpers for files that were transcoded from JPEG
//!
//! Such files decode to the original JPEG bitstream. Its APP segments hold
//! the authoritative EXIF, XMP and ICC data, and its pixels are decoded with
//! the `image` crate.

use byteorder::{BigEndian, ReadBytesExt};
use image::ImageFormat;
use jxl_core::*;
use std::io::{Cursor, Read, Seek, SeekFrom};

// JPEG markers
const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;
const APP1: u8 = 0xE1; // EXIF, XMP
const APP2: u8 = 0xE2; // ICC profile chunks
const TEM: u8 = 0x01;
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;

const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const ICC_SIGNATURE: &[u8] = b"ICC_PROFILE\0";

/// Read EXIF, XMP and ICC data from the APP segments before the first scan.
///
/// Only the first EXIF and XMP segments are used. ICC chunks are reassembled
/// in sequence order. Parsing stops quietly at the first damaged segment,
/// keeping whatever was found up to that point.
pub fn read_jpeg_metadata(jpeg: &[u8]) -> JxlResult<MetadataBundle> {
    let mut reader = Cursor::new(jpeg);
    if reader.read_u8()? != 0xFF || reader.read_u8()? != SOI {
        return Err(JxlError::CodecFailure(
            "reconstructed JPEG does not start with SOI".to_string(),
        ));
    }

    let mut bundle = MetadataBundle::new();
    let mut icc_chunks: Vec<(u8, Vec<u8>)> = Vec::new();

    while let Some((marker, segment)) = next_segment(&mut reader) {
        match marker {
            APP1 => {
                if let Some(exif) = segment.strip_prefix(consts::EXIF_SIGNATURE) {
                    if bundle.exif.is_none() {
                        bundle.exif = Some(exif.to_vec());
                    }
                } else if let Some(xmp) = segment.strip_prefix(XMP_SIGNATURE) {
                    if bundle.xmp.is_none() {
                        bundle.xmp = Some(xmp.to_vec());
                    }
                }
            }
            APP2 => {
                if let Some(chunk) = segment.strip_prefix(ICC_SIGNATURE) {
                    // sequence number, chunk count, data
                    if chunk.len() > 2 {
                        icc_chunks.push((chunk[0], chunk[2..].to_vec()));
                    }
                }
            }
            _ => {}
        }
    }

    if !icc_chunks.is_empty() {
        icc_chunks.sort_by_key(|(seq, _)| *seq);
        bundle.icc_profile = Some(icc_chunks.into_iter().flat_map(|(_, data)| data).collect());
    }

    tracing::trace!(
        exif = bundle.exif.is_some(),
        xmp = bundle.xmp.is_some(),
        icc = bundle.icc_profile.is_some(),
        "embedded JPEG metadata"
    );
    Ok(bundle)
}

/// Next marker segment with its payload, or `None` at the first scan, the
/// end of the image, or damaged data
fn next_segment(reader: &mut Cursor<&[u8]>) -> Option<(u8, Vec<u8>)> {
    loop {
        if reader.read_u8().ok()? != 0xFF {
            return None;
        }
        let mut marker = reader.read_u8().ok()?;
        while marker == 0xFF {
            marker = reader.read_u8().ok()?;
        }

        match marker {
            SOS | EOI => return None,
            TEM | RST0..=RST7 => continue,
            _ => {}
        }

        let size = reader.read_u16::<BigEndian>().ok()? as usize;
        let data_size = size.checked_sub(2)?;
        let remaining = reader.get_ref().len() as u64 - reader.position();
        if data_size as u64 > remaining {
            return None;
        }

        if matches!(marker, APP1 | APP2) {
            let mut segment = vec![0u8; data_size];
            reader.read_exact(&mut segment).ok()?;
            return Some((marker, segment));
        }
        reader.seek(SeekFrom::Current(data_size as i64)).ok()?;
    }
}

/// Decode the embedded JPEG into interleaved 8-bit pixels of `mode`
pub fn decode_jpeg_pixels(jpeg: &[u8], mode: HostPixelMode) -> JxlResult<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg)?;
    let pixels = match mode {
        HostPixelMode::L => decoded.into_luma8().into_raw(),
        HostPixelMode::LA => decoded.into_luma_alpha8().into_raw(),
        HostPixelMode::RGB => decoded.into_rgb8().into_raw(),
        HostPixelMode::RGBA => decoded.into_rgba8().into_raw(),
        other => {
            return Err(JxlError::UnsupportedMode(format!(
                "cannot expand an embedded JPEG to {}",
                other
            )))
        }
    };
    Ok(pixels)
}
