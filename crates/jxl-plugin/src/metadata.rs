//! Moving metadata between container boxes and the host image
//!
//! On decode, `Exif`, `xml ` and `jumb` boxes are read straight from the
//! container; the codec only reports the ICC profile. Files transcoded from
//! JPEG carry their metadata inside the JPEG itself, and that copy wins.
//!
//! On encode, the host's metadata and explicit save options are gathered into
//! one [`MetadataBundle`] for the codec.

use crate::jpeg::read_jpeg_metadata;
use crate::options::{self, SaveOptions};
use jxl_codec::DecodedImage;
use jxl_core::*;
use jxl_headers::{find_box, sniff, BoxRef};

const EXIF_FOURCC: &[u8; 4] = b"Exif";
const XMP_FOURCC: &[u8; 4] = b"xml ";
const JUMB_FOURCC: &[u8; 4] = b"jumb";

/// Turn the payload of an `Exif` box into TIFF-structured EXIF.
///
/// The payload normally starts with a big-endian offset to the TIFF header.
/// Some writers store the JPEG form instead (`Exif\0\0` after a 4-byte
/// prefix) or the bare TIFF data, and both are accepted. Returns `None` when
/// nothing usable remains.
pub fn normalize_exif_box(payload: &[u8]) -> Option<Vec<u8>> {
    if payload.starts_with(consts::TIFF_LE_MARKER) || payload.starts_with(consts::TIFF_BE_MARKER) {
        return Some(payload.to_vec());
    }

    if payload.len() > 8 && &payload[4..8] == b"Exif" {
        let rest = &payload[8..];
        let rest = rest.strip_prefix(b"\0\0").unwrap_or(rest);
        return Some(rest.to_vec());
    }

    let offset_bytes: [u8; 4] = payload.get(..4)?.try_into().ok()?;
    let offset = u32::from_be_bytes(offset_bytes) as usize;
    let tiff = payload.get(offset.checked_add(4)?..)?;
    if tiff.is_empty() {
        None
    } else {
        Some(tiff.to_vec())
    }
}

/// Drop the JPEG APP1 `Exif\0\0` signature if present
pub fn strip_exif_signature(exif: &[u8]) -> &[u8] {
    exif.strip_prefix(consts::EXIF_SIGNATURE).unwrap_or(exif)
}

fn locate(data: &[u8], fourcc: &[u8; 4], start: usize) -> JxlResult<Option<BoxRef>> {
    let found = find_box(data, fourcc, start)?;
    if found.is_none() {
        tracing::trace!(
            fourcc = %String::from_utf8_lossy(fourcc),
            "metadata box not present"
        );
    }
    Ok(found)
}

/// Read the metadata boxes of a container file.
///
/// A naked codestream has no boxes and yields an empty bundle, as does a
/// container without metadata boxes. Malformed box headers are reported.
pub fn read_container_metadata(data: &[u8]) -> JxlResult<MetadataBundle> {
    let mut bundle = MetadataBundle::new();
    let Some(start) = sniff(data).and_then(|signature| signature.first_box_offset()) else {
        return Ok(bundle);
    };

    if let Some(exif) = locate(data, EXIF_FOURCC, start)? {
        bundle.exif = normalize_exif_box(exif.payload(data));
    }
    if let Some(xmp) = locate(data, XMP_FOURCC, start)? {
        bundle.xmp = Some(xmp.payload(data).to_vec());
    }
    if let Some(jumb) = locate(data, JUMB_FOURCC, start)? {
        bundle.jumb = Some(jumb.payload(data).to_vec());
    }

    Ok(bundle)
}

fn prefer(name: &str, primary: Option<Vec<u8>>, fallback: Option<Vec<u8>>) -> Option<Vec<u8>> {
    match (primary, fallback) {
        (Some(primary), Some(_)) => {
            tracing::warn!(payload = name, "container copy superseded by the embedded JPEG");
            Some(primary)
        }
        (primary, fallback) => primary.or(fallback),
    }
}

/// All metadata for a freshly decoded file.
///
/// `file` is the complete encoded file, `decoded` the codec's result for it.
pub fn decoded_metadata(file: &[u8], decoded: &DecodedImage) -> JxlResult<MetadataBundle> {
    let container = read_container_metadata(file)?;

    let mut bundle = if decoded.is_jpeg_reconstruction {
        let jpeg = read_jpeg_metadata(&decoded.data)?;
        MetadataBundle {
            exif: prefer("exif", jpeg.exif, container.exif),
            xmp: prefer("xmp", jpeg.xmp, container.xmp),
            jumb: container.jumb,
            icc_profile: jpeg.icc_profile,
            compress: false,
        }
    } else {
        container
    };

    if bundle.icc_profile.is_none() {
        bundle.icc_profile = decoded.icc_profile.clone();
    }

    Ok(bundle)
}

fn option_or(options: &SaveOptions, key: &str, fallback: Option<&[u8]>) -> JxlResult<Option<Vec<u8>>> {
    Ok(options.get_bytes(key)?.or(fallback).map(<[u8]>::to_vec))
}

/// Gather what the encoder should embed.
///
/// Explicit save options take precedence over the host image's own metadata.
pub fn collect_encode_metadata(image: &HostImage, options: &SaveOptions) -> JxlResult<MetadataBundle> {
    let exif = options
        .get_bytes(options::EXIF)?
        .or_else(|| image.exif())
        .map(|exif| strip_exif_signature(exif).to_vec());

    Ok(MetadataBundle {
        exif,
        xmp: option_or(options, options::XMP, image.metadata.xmp.as_deref())?,
        jumb: option_or(options, options::JUMB, image.metadata.jumb.as_deref())?,
        icc_profile: option_or(options, options::ICC_PROFILE, image.metadata.icc_profile.as_deref())?,
        compress: options.get_bool(options::COMPRESS_METADATA)?.unwrap_or(false),
    })
}
