//! Error types for the JPEG XL plugin bridge

use crate::HostPixelMode;
use thiserror::Error;

/// Result type for JPEG XL bridge operations
pub type JxlResult<T> = Result<T, JxlError>;

/// Errors that can occur while bridging JPEG XL files to the host
#[derive(Error, Debug)]
pub enum JxlError {
    #[error("Invalid file signature")]
    InvalidSignature,

    #[error("Malformed container at offset {offset}: {reason}")]
    MalformedContainer { offset: usize, reason: String },

    #[error("Unsupported pixel format: {0}")]
    UnsupportedMode(String),

    #[error("Unsupported mode for encoding: {0} (only RGB, RGBA, L, LA are supported)")]
    UnsupportedEncodeMode(HostPixelMode),

    #[error("Cannot seek to frame {requested} from frame {current}: only single-step forward seeking is supported")]
    UnsupportedSeek { requested: u32, current: u32 },

    #[error("Codec failure: {0}")]
    CodecFailure(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

impl JxlError {
    /// Shorthand for [`JxlError::MalformedContainer`]
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        JxlError::MalformedContainer {
            offset,
            reason: reason.into(),
        }
    }
}
