//! Encoder configuration handed to the native codec

use jxl_core::consts;

/// Whether a JPEG-sourced image should be losslessly re-wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JpegReconstructionPolicy {
    /// Re-wrap when the original JPEG bytes are available, otherwise encode pixels
    #[default]
    Auto,
    /// Re-wrap, failing if the original JPEG bytes are unavailable
    Force,
    /// Always encode pixels
    Disable,
}

/// Resolved encoder settings for one save call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeConfig {
    pub lossless: bool,
    /// Quality (0-100, higher is better); 100 when lossless
    pub quality: f32,
    /// Encoding effort (1-9, higher is slower but better compression)
    pub effort: u8,
    /// Decoding speed tier (0-4, higher decodes faster at some quality cost)
    pub decoding_speed: u8,
    /// Emit the box container instead of a naked codestream
    pub use_container: bool,
    /// Keep the input color profile instead of converting to XYB
    pub use_original_profile: bool,
    /// Worker threads: -1 lets the codec decide, 0 disables threading
    pub thread_count: i32,
    pub jpeg_reconstruction: JpegReconstructionPolicy,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            lossless: false,
            quality: consts::DEFAULT_QUALITY,
            effort: consts::DEFAULT_EFFORT,
            decoding_speed: consts::DEFAULT_DECODING_SPEED,
            use_container: false,
            use_original_profile: false,
            thread_count: consts::AUTO_THREADS,
            jpeg_reconstruction: JpegReconstructionPolicy::Auto,
        }
    }
}
