//! JPEG XL container parsing, generation and format detection

pub mod container;

use jxl_core::*;

pub use container::{
    boxes, find_box, BoxRef, BoxType, Boxes, Container, JxlBox, CODESTREAM_SIGNATURE,
    CONTAINER_SIGNATURE,
};

/// Which of the two JPEG XL layouts a file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Naked codestream, no boxes
    Codestream,
    /// Box-structured container
    Container,
}

impl Signature {
    /// Offset of the first box after the signature box, if the layout has boxes
    pub fn first_box_offset(&self) -> Option<usize> {
        match self {
            Signature::Codestream => None,
            Signature::Container => Some(CONTAINER_SIGNATURE.len()),
        }
    }
}

/// Recognise a JPEG XL file from its first bytes.
///
/// Accepts the 2-byte codestream marker, the full 12-byte container
/// signature, or the `JXL` tag at offset 4 of a container whose first box
/// header was not fully supplied.
pub fn sniff(prefix: &[u8]) -> Option<Signature> {
    if prefix.starts_with(&CODESTREAM_SIGNATURE) {
        Some(Signature::Codestream)
    } else if prefix.starts_with(&CONTAINER_SIGNATURE) || prefix.get(4..7) == Some(b"JXL".as_slice()) {
        Some(Signature::Container)
    } else {
        None
    }
}

/// Like [`sniff`], failing with [`JxlError::InvalidSignature`]
pub fn signature(data: &[u8]) -> JxlResult<Signature> {
    sniff(data).ok_or(JxlError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_sniff_container() {
        let mut data = CONTAINER_SIGNATURE.to_vec();
        data.extend_from_slice(&[0, 0, 0, 0x14]);
        assert_eq!(sniff(&data), Some(Signature::Container));
    }

    #[test]
    fn test_sniff_codestream() {
        assert_eq!(sniff(&[0xFF, 0x0A, 0xFA, 0x12]), Some(Signature::Codestream));
    }

    #[test]
    fn test_sniff_tag_at_offset_four() {
        assert_eq!(sniff(b"\0\0\0\x0cJXL "), Some(Signature::Container));
    }

    #[test]
    fn test_sniff_rejects_others() {
        assert_eq!(sniff(PNG_MAGIC), None);
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), None);
        assert_eq!(sniff(&[0xFF]), None);
        assert_eq!(sniff(&[]), None);
        assert!(matches!(signature(PNG_MAGIC), Err(JxlError::InvalidSignature)));
    }

    #[test]
    fn test_first_box_offset() {
        assert_eq!(Signature::Container.first_box_offset(), Some(12));
        assert_eq!(Signature::Codestream.first_box_offset(), None);
    }
}
