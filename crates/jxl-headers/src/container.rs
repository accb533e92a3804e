//! JPEG XL container format (ISO/IEC 18181-2)
//!
//! JPEG XL supports two bitstream formats:
//! 1. Naked codestream: 0xFF0A signature (minimal overhead)
//! 2. Container format: Box-based structure, required for metadata boxes
//!
//! Reading works on a borrowed buffer: [`boxes`] walks the top-level box
//! sequence and [`find_box`] locates a single box, both returning offsets
//! into the caller's bytes. Writing goes through [`JxlBox`] and [`Container`].

use byteorder::{BigEndian, ByteOrder};
use jxl_core::*;
use std::io::Write;
use std::ops::Range;

/// JPEG XL container signature (12 bytes)
///
/// Format: `\0\0\0\x0C JXL \x0D\x0A\x87\x0A`
/// - First 4 bytes: Box size (12 for signature box)
/// - Next 4 bytes: "JXL " (box type)
/// - Last 4 bytes: CR+LF+0x87+LF (corruption detection)
pub const CONTAINER_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, // Box size = 12
    0x4A, 0x58, 0x4C, 0x20, // "JXL "
    0x0D, 0x0A, 0x87, 0x0A, // CR LF 0x87 LF
];

/// Naked codestream signature (2 bytes)
pub const CODESTREAM_SIGNATURE: [u8; 2] = [0xFF, 0x0A];

/// File type box (ftyp) brand
pub const BRAND_JXL: [u8; 4] = [0x6A, 0x78, 0x6C, 0x20]; // "jxl "

const HEADER_SIZE: usize = 8; // 4 byte size + 4 byte type
const HEADER_SIZE_LARGE: usize = 16; // 4 byte size + 4 byte type + 8 byte large size

/// Box types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxType {
    /// Signature box (`JXL `)
    Signature,
    /// File type box
    FileType,
    /// JXL codestream box
    JxlCodestream,
    /// Partial JXL codestream box
    JxlPartial,
    /// JPEG bitstream reconstruction data
    JpegReconstruction,
    /// Exif metadata
    Exif,
    /// XML metadata (XMP)
    Xml,
    /// JUMBF superbox
    Jumbf,
    /// Brotli-compressed box
    Brotli,
    /// Unknown/custom box
    Unknown([u8; 4]),
}

impl BoxType {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Self {
        match fourcc {
            b"JXL " => BoxType::Signature,
            b"ftyp" => BoxType::FileType,
            b"jxlc" => BoxType::JxlCodestream,
            b"jxlp" => BoxType::JxlPartial,
            b"jbrd" => BoxType::JpegReconstruction,
            b"Exif" => BoxType::Exif,
            b"xml " => BoxType::Xml,
            b"jumb" => BoxType::Jumbf,
            b"brob" => BoxType::Brotli,
            _ => BoxType::Unknown(*fourcc),
        }
    }

    pub fn to_fourcc(&self) -> [u8; 4] {
        match self {
            BoxType::Signature => *b"JXL ",
            BoxType::FileType => *b"ftyp",
            BoxType::JxlCodestream => *b"jxlc",
            BoxType::JxlPartial => *b"jxlp",
            BoxType::JpegReconstruction => *b"jbrd",
            BoxType::Exif => *b"Exif",
            BoxType::Xml => *b"xml ",
            BoxType::Jumbf => *b"jumb",
            BoxType::Brotli => *b"brob",
            BoxType::Unknown(fourcc) => *fourcc,
        }
    }
}

/// Location of one box inside a container buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRef {
    pub box_type: BoxType,
    /// Offset of the box header from the start of the container
    pub offset: usize,
    /// 8, or 16 when the extended length field is present
    pub header_len: usize,
    pub payload_len: usize,
}

impl BoxRef {
    pub fn payload_offset(&self) -> usize {
        self.offset + self.header_len
    }

    pub fn payload_range(&self) -> Range<usize> {
        self.payload_offset()..self.end()
    }

    /// Offset one past the last byte of this box
    pub fn end(&self) -> usize {
        self.payload_offset() + self.payload_len
    }

    /// Borrow the payload from the container this box was found in
    pub fn payload<'a>(&self, container: &'a [u8]) -> &'a [u8] {
        &container[self.payload_range()]
    }
}

fn read_box_header(data: &[u8], offset: usize) -> JxlResult<BoxRef> {
    let remaining = data.len() - offset;
    if remaining < HEADER_SIZE {
        return Err(JxlError::malformed(offset, "truncated box header"));
    }

    let size = BigEndian::read_u32(&data[offset..offset + 4]);
    let mut fourcc = [0u8; 4];
    fourcc.copy_from_slice(&data[offset + 4..offset + 8]);

    let (header_len, box_len) = match size {
        0 => (HEADER_SIZE, remaining as u64),
        1 => {
            if remaining < HEADER_SIZE_LARGE {
                return Err(JxlError::malformed(offset, "truncated extended box length"));
            }
            let large = BigEndian::read_u64(&data[offset + 8..offset + 16]);
            if large <= HEADER_SIZE_LARGE as u64 {
                return Err(JxlError::malformed(
                    offset,
                    format!("extended box length {} must exceed {}", large, HEADER_SIZE_LARGE),
                ));
            }
            (HEADER_SIZE_LARGE, large)
        }
        2..=8 => {
            return Err(JxlError::malformed(offset, format!("invalid box length {}", size)));
        }
        n => (HEADER_SIZE, n as u64),
    };

    if box_len > remaining as u64 {
        return Err(JxlError::malformed(
            offset,
            format!("box length {} exceeds the {} bytes left", box_len, remaining),
        ));
    }

    Ok(BoxRef {
        box_type: BoxType::from_fourcc(&fourcc),
        offset,
        header_len,
        payload_len: box_len as usize - header_len,
    })
}

/// Iterator over the top-level boxes of a container buffer.
///
/// Yields an error once and then stops if a header is malformed.
pub struct Boxes<'a> {
    data: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Boxes<'a> {
    type Item = JxlResult<BoxRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }

        match read_box_header(self.data, self.offset) {
            Ok(found) => {
                tracing::trace!(
                    offset = found.offset,
                    fourcc = ?found.box_type,
                    payload_len = found.payload_len,
                    "box"
                );
                self.offset = found.end();
                Some(Ok(found))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Walk the box sequence starting at `start`
pub fn boxes(data: &[u8], start: usize) -> Boxes<'_> {
    Boxes {
        data,
        offset: start,
        failed: false,
    }
}

/// Find the first top-level box with the given four-character code.
///
/// Scans linearly from `start` without descending into nested boxes.
/// Returns `Ok(None)` when the end of the buffer is reached without a match.
pub fn find_box(data: &[u8], fourcc: &[u8; 4], start: usize) -> JxlResult<Option<BoxRef>> {
    for item in boxes(data, start) {
        let found = item?;
        if found.box_type.to_fourcc() == *fourcc {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// A box in the JPEG XL container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JxlBox {
    pub box_type: BoxType,
    pub data: Vec<u8>,
}

impl JxlBox {
    pub fn new(box_type: BoxType, data: Vec<u8>) -> Self {
        Self { box_type, data }
    }

    /// Create a file type box
    pub fn file_type(brand: [u8; 4], minor_version: u32, compatible_brands: Vec<[u8; 4]>) -> Self {
        let mut data = Vec::new();
        data.extend_from_slice(&brand);
        data.extend_from_slice(&minor_version.to_be_bytes());
        for compat_brand in compatible_brands {
            data.extend_from_slice(&compat_brand);
        }
        Self::new(BoxType::FileType, data)
    }

    /// Create a JXL codestream box
    pub fn jxl_codestream(codestream_data: Vec<u8>) -> Self {
        Self::new(BoxType::JxlCodestream, codestream_data)
    }

    /// Create an Exif box from bare TIFF data (TIFF header offset 0)
    pub fn exif(tiff: &[u8]) -> Self {
        let mut data = Vec::with_capacity(4 + tiff.len());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(tiff);
        Self::new(BoxType::Exif, data)
    }

    /// Total encoded size including the header
    pub fn encoded_len(&self) -> u64 {
        let short = (HEADER_SIZE + self.data.len()) as u64;
        if short <= u32::MAX as u64 {
            short
        } else {
            (HEADER_SIZE_LARGE + self.data.len()) as u64
        }
    }

    /// Write box to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        let box_size = self.encoded_len();
        let extended = box_size > u32::MAX as u64;

        // Box size (big-endian u32, or 1 for extended size)
        if extended {
            writer.write_all(&1u32.to_be_bytes())?;
        } else {
            writer.write_all(&(box_size as u32).to_be_bytes())?;
        }

        writer.write_all(&self.box_type.to_fourcc())?;

        if extended {
            writer.write_all(&box_size.to_be_bytes())?;
        }

        writer.write_all(&self.data)?;

        Ok(())
    }
}

/// JPEG XL container
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub boxes: Vec<JxlBox>,
}

impl Container {
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// Create a container with default boxes for a single codestream
    pub fn with_codestream(codestream_data: Vec<u8>) -> Self {
        let mut container = Self::new();
        container.push(JxlBox::file_type(BRAND_JXL, 0, vec![BRAND_JXL]));
        container.push(JxlBox::jxl_codestream(codestream_data));
        container
    }

    pub fn push(&mut self, item: JxlBox) {
        self.boxes.push(item);
    }

    /// Write container to output
    pub fn write<W: Write>(&self, writer: &mut W) -> JxlResult<()> {
        writer.write_all(&CONTAINER_SIGNATURE)?;
        for box_item in &self.boxes {
            box_item.write(writer)?;
        }
        Ok(())
    }

    pub fn to_vec(&self) -> JxlResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    /// Parse a complete container, copying every box payload
    pub fn parse(data: &[u8]) -> JxlResult<Self> {
        if !data.starts_with(&CONTAINER_SIGNATURE) {
            return Err(JxlError::InvalidSignature);
        }

        let boxes = boxes(data, CONTAINER_SIGNATURE.len())
            .map(|item| item.map(|found| JxlBox::new(found.box_type, found.payload(data).to_vec())))
            .collect::<JxlResult<Vec<_>>>()?;

        Ok(Self { boxes })
    }

    /// Extract codestream data from container
    pub fn extract_codestream(&self) -> JxlResult<Vec<u8>> {
        let mut codestream = Vec::new();

        for box_item in &self.boxes {
            match box_item.box_type {
                BoxType::JxlCodestream => {
                    codestream.extend_from_slice(&box_item.data);
                }
                BoxType::JxlPartial => {
                    // jxlp payloads carry a 4-byte index before the codestream part
                    if box_item.data.len() >= 4 {
                        codestream.extend_from_slice(&box_item.data[4..]);
                    }
                }
                _ => {}
            }
        }

        if codestream.is_empty() {
            return Err(JxlError::malformed(0, "no codestream found in container"));
        }

        Ok(codestream)
    }
}
