//! Contract between the plugin bridge and a native JPEG XL codec
//!
//! The bridge never touches the JPEG XL bitstream itself. It hands whole
//! files to a [`NativeCodec`] and receives either pixels or, for files that
//! were transcoded from JPEG, the original JPEG bytes. Encoding works the same
//! way in reverse.
//!
//! With the `libjxl` feature enabled, [`LibJxlCodec`] implements the contract
//! on top of the reference C++ library through `jpegxl-rs`.

pub mod config;
#[cfg(feature = "libjxl")]
pub mod libjxl;

use jxl_core::consts::MAX_IMAGE_DIMENSION;
use jxl_core::*;

pub use config::{EncodeConfig, JpegReconstructionPolicy};
#[cfg(feature = "libjxl")]
pub use libjxl::LibJxlCodec;

/// Result of a native decode call
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// `data` holds a reconstructed JPEG bitstream rather than pixels
    pub is_jpeg_reconstruction: bool,
    pub width: u32,
    pub height: u32,
    pub format: NativePixelFormat,
    /// Interleaved pixels, or JPEG bytes when `is_jpeg_reconstruction`
    pub data: Vec<u8>,
    pub icc_profile: Option<Vec<u8>>,
}

impl DecodedImage {
    /// Image facts in host terms.
    ///
    /// Fails if the pixel format has no host mode, or if either dimension is
    /// zero or larger than [`MAX_IMAGE_DIMENSION`].
    pub fn info(&self) -> JxlResult<ImageInfo> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_IMAGE_DIMENSION
            || self.height > MAX_IMAGE_DIMENSION
        {
            return Err(JxlError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(ImageInfo {
            width: self.width,
            height: self.height,
            mode: native_mode_to_host_mode(&self.format)?,
        })
    }
}

/// What to encode
#[derive(Debug, Clone, Copy)]
pub enum EncodeInput<'a> {
    /// Raw interleaved 8-bit pixels
    Pixels {
        data: &'a [u8],
        width: u32,
        height: u32,
        channels: EncodeChannels,
    },
    /// A complete JPEG file to transcode losslessly
    Jpeg(&'a [u8]),
}

impl EncodeInput<'_> {
    pub fn is_jpeg(&self) -> bool {
        matches!(self, EncodeInput::Jpeg(_))
    }
}

/// A JPEG XL encoder/decoder
///
/// Calls are synchronous and run to completion; any internal parallelism is
/// the implementation's business.
pub trait NativeCodec {
    /// Decode a complete file (container or naked codestream)
    fn decode(&self, data: &[u8]) -> JxlResult<DecodedImage>;

    /// Encode pixels or transcode a JPEG, embedding `metadata` in boxes
    fn encode(
        &self,
        input: EncodeInput<'_>,
        config: &EncodeConfig,
        metadata: &MetadataBundle,
    ) -> JxlResult<Vec<u8>>;

    /// Whether `encode` writes `metadata.icc_profile` into the output.
    ///
    /// Codecs that return false never see an ICC profile: the bridge drops it
    /// before resolving the config, so it cannot force container output.
    fn embeds_icc_profile(&self) -> bool {
        true
    }
}

impl<C: NativeCodec + ?Sized> NativeCodec for &C {
    fn decode(&self, data: &[u8]) -> JxlResult<DecodedImage> {
        (**self).decode(data)
    }

    fn encode(
        &self,
        input: EncodeInput<'_>,
        config: &EncodeConfig,
        metadata: &MetadataBundle,
    ) -> JxlResult<Vec<u8>> {
        (**self).encode(input, config, metadata)
    }

    fn embeds_icc_profile(&self) -> bool {
        (**self).embeds_icc_profile()
    }
}

impl<C: NativeCodec + ?Sized> NativeCodec for Box<C> {
    fn decode(&self, data: &[u8]) -> JxlResult<DecodedImage> {
        (**self).decode(data)
    }

    fn encode(
        &self,
        input: EncodeInput<'_>,
        config: &EncodeConfig,
        metadata: &MetadataBundle,
    ) -> JxlResult<Vec<u8>> {
        (**self).encode(input, config, metadata)
    }

    fn embeds_icc_profile(&self) -> bool {
        (**self).embeds_icc_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_info_maps_mode() {
        let decoded = DecodedImage {
            is_jpeg_reconstruction: false,
            width: 3,
            height: 2,
            format: NativePixelFormat::uint8(1, true),
            data: vec![0; 12],
            icc_profile: None,
        };
        let info = decoded.info().unwrap();
        assert_eq!(info.mode, HostPixelMode::LA);
        assert_eq!(info.buffer_len().unwrap(), 12);
    }

    #[test]
    fn test_decoded_info_rejects_bad_dimensions() {
        let mut decoded = DecodedImage {
            is_jpeg_reconstruction: false,
            width: u32::MAX,
            height: u32::MAX,
            format: NativePixelFormat::uint8(3, true),
            data: vec![0; 16],
            icc_profile: None,
        };
        assert!(matches!(
            decoded.info(),
            Err(JxlError::InvalidDimensions { width: u32::MAX, height: u32::MAX })
        ));

        decoded.width = 0;
        decoded.height = 1;
        assert!(matches!(decoded.info(), Err(JxlError::InvalidDimensions { .. })));

        decoded.width = MAX_IMAGE_DIMENSION;
        assert!(decoded.info().is_ok());
    }

    #[test]
    fn test_decoded_info_rejects_unknown_format() {
        let decoded = DecodedImage {
            is_jpeg_reconstruction: false,
            width: 1,
            height: 1,
            format: NativePixelFormat::uint8(4, false),
            data: vec![0; 4],
            icc_profile: None,
        };
        assert!(matches!(decoded.info(), Err(JxlError::UnsupportedMode(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = EncodeConfig::default();
        assert_eq!(config.quality, 90.0);
        assert_eq!(config.effort, 7);
        assert_eq!(config.decoding_speed, 0);
        assert!(!config.use_container);
        assert_eq!(config.thread_count, -1);
        assert_eq!(config.jpeg_reconstruction, JpegReconstructionPolicy::Auto);
        assert!(!config.lossless && !config.use_original_profile);
    }

    struct Plain;

    impl NativeCodec for Plain {
        fn decode(&self, _data: &[u8]) -> JxlResult<DecodedImage> {
            Err(JxlError::CodecFailure("unused".into()))
        }

        fn encode(&self, _: EncodeInput<'_>, _: &EncodeConfig, _: &MetadataBundle) -> JxlResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_icc_support_forwarded() {
        assert!(Plain.embeds_icc_profile());
        assert!((&Plain).embeds_icc_profile());
        let boxed: Box<dyn NativeCodec> = Box::new(Plain);
        assert!(boxed.embeds_icc_profile());
    }
}
