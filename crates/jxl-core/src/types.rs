//! Pixel formats on both sides of the bridge and the mapping between them

use crate::{JxlError, JxlResult};
use std::fmt;
use std::str::FromStr;

/// Sample representation reported by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    /// Unsigned integer samples
    UnsignedInt,
    /// IEEE floating point samples
    Float,
}

/// The codec's description of a decoded pixel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativePixelFormat {
    /// Number of color channels (1 = gray, 3 = RGB), alpha excluded
    pub num_color_channels: u32,
    pub has_alpha: bool,
    pub bits_per_sample: u32,
    pub sample_type: SampleType,
}

impl NativePixelFormat {
    /// 8-bit unsigned layout with the given channel configuration
    pub fn uint8(num_color_channels: u32, has_alpha: bool) -> Self {
        Self {
            num_color_channels,
            has_alpha,
            bits_per_sample: 8,
            sample_type: SampleType::UnsignedInt,
        }
    }

    /// Total channel count including alpha
    pub fn channel_count(&self) -> u32 {
        self.num_color_channels + u32::from(self.has_alpha)
    }
}

impl fmt::Display for NativePixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sample = match self.sample_type {
            SampleType::UnsignedInt => "uint",
            SampleType::Float => "float",
        };
        write!(
            f,
            "{} color channel(s){}, {}-bit {}",
            self.num_color_channels,
            if self.has_alpha { " + alpha" } else { "" },
            self.bits_per_sample,
            sample
        )
    }
}

/// Named pixel modes of the host image library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostPixelMode {
    /// 1-bit bilevel (`"1"`)
    Bilevel,
    /// 8-bit luminance
    L,
    /// 8-bit luminance + alpha
    LA,
    /// 8-bit palette indices
    P,
    /// 8-bit RGB
    RGB,
    /// 8-bit RGBA
    RGBA,
    /// 8-bit CMYK
    CMYK,
    /// 8-bit YCbCr
    YCbCr,
    /// 16-bit unsigned grayscale (`"I;16"`)
    I16,
    /// 32-bit signed grayscale (`"I"`)
    I32,
    /// 32-bit float grayscale (`"F"`)
    F32,
}

impl HostPixelMode {
    /// Host name of the mode
    pub fn name(&self) -> &'static str {
        match self {
            HostPixelMode::Bilevel => "1",
            HostPixelMode::L => "L",
            HostPixelMode::LA => "LA",
            HostPixelMode::P => "P",
            HostPixelMode::RGB => "RGB",
            HostPixelMode::RGBA => "RGBA",
            HostPixelMode::CMYK => "CMYK",
            HostPixelMode::YCbCr => "YCbCr",
            HostPixelMode::I16 => "I;16",
            HostPixelMode::I32 => "I",
            HostPixelMode::F32 => "F",
        }
    }

    /// Number of channels per pixel
    pub fn channel_count(&self) -> usize {
        match self {
            HostPixelMode::Bilevel
            | HostPixelMode::L
            | HostPixelMode::P
            | HostPixelMode::I16
            | HostPixelMode::I32
            | HostPixelMode::F32 => 1,
            HostPixelMode::LA => 2,
            HostPixelMode::RGB | HostPixelMode::YCbCr => 3,
            HostPixelMode::RGBA | HostPixelMode::CMYK => 4,
        }
    }

    /// Bytes per pixel in the host's unpacked raw layout
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            HostPixelMode::I16 => 2,
            HostPixelMode::I32 | HostPixelMode::F32 => 4,
            _ => self.channel_count(),
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, HostPixelMode::LA | HostPixelMode::RGBA)
    }
}

impl fmt::Display for HostPixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HostPixelMode {
    type Err = JxlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s {
            "1" => HostPixelMode::Bilevel,
            "L" => HostPixelMode::L,
            "LA" => HostPixelMode::LA,
            "P" => HostPixelMode::P,
            "RGB" => HostPixelMode::RGB,
            "RGBA" => HostPixelMode::RGBA,
            "CMYK" => HostPixelMode::CMYK,
            "YCbCr" => HostPixelMode::YCbCr,
            "I;16" => HostPixelMode::I16,
            "I" => HostPixelMode::I32,
            "F" => HostPixelMode::F32,
            other => return Err(JxlError::UnsupportedMode(other.to_string())),
        };
        Ok(mode)
    }
}

/// Color encoding handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    /// sRGB color space
    Srgb,
    /// sRGB transfer with a single luminance channel
    SrgbLuma,
}

/// Channel layout the encoder is configured with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeChannels {
    /// Total channel count including alpha
    pub num_channels: u32,
    pub has_alpha: bool,
    pub color_encoding: ColorEncoding,
}

/// Translate a codec pixel descriptor into a host mode.
///
/// Only the combinations in the fixed table below are accepted; anything
/// else is rejected rather than approximated.
pub fn native_mode_to_host_mode(format: &NativePixelFormat) -> JxlResult<HostPixelMode> {
    use SampleType::{Float, UnsignedInt};

    let mode = match (
        format.num_color_channels,
        format.has_alpha,
        format.bits_per_sample,
        format.sample_type,
    ) {
        (3, false, 8, UnsignedInt) => HostPixelMode::RGB,
        (3, true, 8, UnsignedInt) => HostPixelMode::RGBA,
        (1, false, 8, UnsignedInt) => HostPixelMode::L,
        (1, true, 8, UnsignedInt) => HostPixelMode::LA,
        (1, false, 16, UnsignedInt) => HostPixelMode::I16,
        (1, false, 32, Float) => HostPixelMode::F32,
        _ => return Err(JxlError::UnsupportedMode(format.to_string())),
    };
    Ok(mode)
}

/// Channel configuration for encoding a host mode.
///
/// Encoding is restricted to RGB, RGBA, L and LA.
pub fn host_mode_to_encode_channels(mode: HostPixelMode) -> JxlResult<EncodeChannels> {
    let (num_channels, color_encoding) = match mode {
        HostPixelMode::RGB => (3, ColorEncoding::Srgb),
        HostPixelMode::RGBA => (4, ColorEncoding::Srgb),
        HostPixelMode::L => (1, ColorEncoding::SrgbLuma),
        HostPixelMode::LA => (2, ColorEncoding::SrgbLuma),
        other => return Err(JxlError::UnsupportedEncodeMode(other)),
    };
    Ok(EncodeChannels {
        num_channels,
        has_alpha: mode.has_alpha(),
        color_encoding,
    })
}

/// Image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `None` when the count does not fit in `usize`
    pub fn pixel_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }
}
