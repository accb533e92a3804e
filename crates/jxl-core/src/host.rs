//! Host-side image buffer and decoded image facts

use crate::consts::MAX_IMAGE_DIMENSION;
use crate::{Dimensions, HostPixelMode, JxlError, JxlResult, MetadataBundle};
use image::{DynamicImage, ImageBuffer, Luma};
use std::path::PathBuf;

/// Basic facts about a decoded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mode: HostPixelMode,
}

impl ImageInfo {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Size in bytes of the raw pixel buffer for this image.
    ///
    /// Fails with `InvalidDimensions` when the size does not fit in `usize`.
    pub fn buffer_len(&self) -> JxlResult<usize> {
        self.dimensions()
            .pixel_count()
            .and_then(|count| count.checked_mul(self.mode.bytes_per_pixel()))
            .ok_or(JxlError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
    }
}

/// Encoding an image was originally read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Jxl,
    Other(String),
}

/// Where a host image came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOrigin {
    pub format: SourceFormat,
    /// Backing file, when the image was opened from disk
    pub path: Option<PathBuf>,
}

/// A host-side pixel buffer with its metadata.
///
/// The pixels are only reachable through accessors so that `origin` never
/// outlives them: taking the buffer mutably detaches the image from the file
/// it was read from.
#[derive(Debug, Clone)]
pub struct HostImage {
    mode: HostPixelMode,
    dimensions: Dimensions,
    /// Raw interleaved samples in the host layout for `mode`
    data: Vec<u8>,
    pub metadata: MetadataBundle,
    pub origin: Option<ImageOrigin>,
}

impl HostImage {
    pub fn new(mode: HostPixelMode, width: u32, height: u32, data: Vec<u8>) -> JxlResult<Self> {
        if width == 0 || height == 0 || width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(JxlError::InvalidDimensions { width, height });
        }

        let expected = ImageInfo { width, height, mode }.buffer_len()?;
        if data.len() < expected {
            return Err(JxlError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }
        if data.len() > expected {
            return Err(JxlError::InvalidParameter(format!(
                "pixel buffer holds {} bytes, {}x{} {} needs {}",
                data.len(),
                width,
                height,
                mode,
                expected
            )));
        }

        Ok(Self {
            mode,
            dimensions: Dimensions::new(width, height),
            data,
            metadata: MetadataBundle::default(),
            origin: None,
        })
    }

    pub fn with_origin(mut self, origin: ImageOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataBundle) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn mode(&self) -> HostPixelMode {
        self.mode
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pixels. The image no longer matches its source file
    /// afterwards, so `origin` is dropped.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.origin = None;
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// EXIF attached to the image, in whatever form the host stored it
    pub fn exif(&self) -> Option<&[u8]> {
        self.metadata.exif.as_deref()
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width(),
            height: self.height(),
            mode: self.mode,
        }
    }

    /// Wrap an `image` crate buffer
    pub fn from_dynamic(image: &DynamicImage) -> JxlResult<Self> {
        let (mode, data) = match image {
            DynamicImage::ImageLuma8(buf) => (HostPixelMode::L, buf.as_raw().clone()),
            DynamicImage::ImageLumaA8(buf) => (HostPixelMode::LA, buf.as_raw().clone()),
            DynamicImage::ImageRgb8(buf) => (HostPixelMode::RGB, buf.as_raw().clone()),
            DynamicImage::ImageRgba8(buf) => (HostPixelMode::RGBA, buf.as_raw().clone()),
            DynamicImage::ImageLuma16(buf) => (
                HostPixelMode::I16,
                buf.as_raw().iter().flat_map(|v| v.to_le_bytes()).collect(),
            ),
            other => {
                return Err(JxlError::UnsupportedMode(format!(
                    "{:?} has no host pixel mode",
                    other.color()
                )))
            }
        };
        Self::new(mode, image.width(), image.height(), data)
    }

    /// Convert into an `image` crate buffer
    pub fn to_dynamic(&self) -> JxlResult<DynamicImage> {
        let (w, h) = (self.width(), self.height());
        let too_small = || JxlError::BufferTooSmall {
            expected: self.info().buffer_len().unwrap_or(usize::MAX),
            actual: self.data.len(),
        };

        let image = match self.mode {
            HostPixelMode::L => {
                DynamicImage::ImageLuma8(ImageBuffer::from_raw(w, h, self.data.clone()).ok_or_else(too_small)?)
            }
            HostPixelMode::LA => {
                DynamicImage::ImageLumaA8(ImageBuffer::from_raw(w, h, self.data.clone()).ok_or_else(too_small)?)
            }
            HostPixelMode::RGB => {
                DynamicImage::ImageRgb8(ImageBuffer::from_raw(w, h, self.data.clone()).ok_or_else(too_small)?)
            }
            HostPixelMode::RGBA => {
                DynamicImage::ImageRgba8(ImageBuffer::from_raw(w, h, self.data.clone()).ok_or_else(too_small)?)
            }
            HostPixelMode::I16 => {
                let samples: Vec<u16> = self
                    .data
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
                    ImageBuffer::from_raw(w, h, samples).ok_or_else(too_small)?;
                DynamicImage::ImageLuma16(buf)
            }
            other => {
                return Err(JxlError::UnsupportedMode(format!(
                    "{} cannot be represented as an image::DynamicImage",
                    other
                )))
            }
        };
        Ok(image)
    }
}
