//! Image metadata structures

/// Metadata payloads carried alongside the pixels.
///
/// A `None` field means "no such payload", which is distinct from an empty
/// payload: the encoder omits the box entirely for `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBundle {
    /// TIFF-structured EXIF, without the JPEG `Exif\0\0` signature
    pub exif: Option<Vec<u8>>,
    /// XMP packet
    pub xmp: Option<Vec<u8>>,
    /// JUMBF superbox
    pub jumb: Option<Vec<u8>>,
    /// ICC color profile
    pub icc_profile: Option<Vec<u8>>,
    /// Ask the encoder to Brotli-compress metadata boxes
    pub compress: bool,
}

impl MetadataBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no payload of any kind is present
    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.xmp.is_none() && self.jumb.is_none() && self.icc_profile.is_none()
    }
}
