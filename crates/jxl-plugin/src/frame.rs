//! Decoded image handle and its frame lifecycle
//!
//! Opening a file runs the codec once and records the image facts and
//! metadata. Pixels are materialised lazily by [`JxlImage::load`]. Only a
//! single frame is exposed, so every seek is rejected.

use crate::jpeg::decode_jpeg_pixels;
use crate::metadata::decoded_metadata;
use jxl_codec::NativeCodec;
use jxl_core::*;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

/// Which frame is selected and which one has been materialised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameState {
    loaded_frame: Option<u32>,
    current_frame: u32,
}

impl Default for FrameState {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameState {
    pub fn new() -> Self {
        Self {
            loaded_frame: None,
            current_frame: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current_frame
    }

    pub fn loaded(&self) -> Option<u32> {
        self.loaded_frame
    }

    pub fn needs_load(&self) -> bool {
        self.loaded_frame != Some(self.current_frame)
    }

    fn mark_loaded(&mut self) {
        self.loaded_frame = Some(self.current_frame);
    }

    /// Only the frame after the current one may be selected
    fn check_seek(&self, frame: u32, n_frames: u32) -> JxlResult<()> {
        let next = self.current_frame.checked_add(1);
        if Some(frame) != next || frame >= n_frames {
            return Err(JxlError::UnsupportedSeek {
                requested: frame,
                current: self.current_frame,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
enum PendingPixels {
    Raw(Vec<u8>),
    Jpeg(Vec<u8>),
}

/// An opened JPEG XL image
#[derive(Debug)]
pub struct JxlImage {
    info: ImageInfo,
    metadata: MetadataBundle,
    is_jpeg_reconstruction: bool,
    frame: FrameState,
    pending: Option<PendingPixels>,
    stream: Option<Cursor<Vec<u8>>>,
    /// File opened by [`JxlImage::open_path`], released on load
    source: Option<File>,
}

impl JxlImage {
    /// Decode a complete file held in memory
    pub fn from_bytes<C: NativeCodec + ?Sized>(codec: &C, data: &[u8]) -> JxlResult<Self> {
        jxl_headers::signature(data)?;

        let decoded = codec.decode(data)?;
        let info = decoded.info()?;
        let metadata = decoded_metadata(data, &decoded)?;

        let pending = if decoded.is_jpeg_reconstruction {
            PendingPixels::Jpeg(decoded.data)
        } else {
            let expected = info.buffer_len()?;
            if decoded.data.len() < expected {
                return Err(JxlError::BufferTooSmall {
                    expected,
                    actual: decoded.data.len(),
                });
            }
            let mut pixels = decoded.data;
            pixels.truncate(expected);
            PendingPixels::Raw(pixels)
        };

        tracing::debug!(
            width = info.width,
            height = info.height,
            mode = %info.mode,
            is_jpeg_reconstruction = decoded.is_jpeg_reconstruction,
            "opened JPEG XL image"
        );

        Ok(Self {
            info,
            metadata,
            is_jpeg_reconstruction: decoded.is_jpeg_reconstruction,
            frame: FrameState::new(),
            pending: Some(pending),
            stream: None,
            source: None,
        })
    }

    /// Read everything from `reader` and decode it
    pub fn open<C: NativeCodec + ?Sized, R: Read>(codec: &C, mut reader: R) -> JxlResult<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(codec, &data)
    }

    /// Open a file, keeping it until the pixels are loaded
    pub fn open_path<C: NativeCodec + ?Sized, P: AsRef<Path>>(codec: &C, path: P) -> JxlResult<Self> {
        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let mut image = Self::from_bytes(codec, &data)?;
        image.source = Some(file);
        Ok(image)
    }

    pub fn info(&self) -> ImageInfo {
        self.info
    }

    pub fn mode(&self) -> HostPixelMode {
        self.info.mode
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn metadata(&self) -> &MetadataBundle {
        &self.metadata
    }

    pub fn exif(&self) -> Option<&[u8]> {
        self.metadata.exif.as_deref()
    }

    pub fn xmp(&self) -> Option<&[u8]> {
        self.metadata.xmp.as_deref()
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.metadata.icc_profile.as_deref()
    }

    /// The file decoded to an embedded JPEG rather than pixels
    pub fn is_jpeg_reconstruction(&self) -> bool {
        self.is_jpeg_reconstruction
    }

    pub fn frame_state(&self) -> FrameState {
        self.frame
    }

    /// Whether the source file opened by [`JxlImage::open_path`] is still held
    pub fn holds_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn n_frames(&self) -> u32 {
        consts::NUM_FRAMES
    }

    pub fn is_animated(&self) -> bool {
        false
    }

    pub fn tell(&self) -> u32 {
        self.frame.current()
    }

    /// Materialise the current frame's pixels.
    ///
    /// Does nothing if the frame is already loaded. On first load any source
    /// file is released and the pixels become readable through
    /// [`JxlImage::pixel_reader`].
    pub fn load(&mut self) -> JxlResult<&[u8]> {
        if self.frame.needs_load() {
            let pixels = match self.pending.take() {
                Some(PendingPixels::Raw(pixels)) => pixels,
                Some(PendingPixels::Jpeg(jpeg)) => match decode_jpeg_pixels(&jpeg, self.info.mode) {
                    Ok(pixels) => pixels,
                    Err(e) => {
                        self.pending = Some(PendingPixels::Jpeg(jpeg));
                        return Err(e);
                    }
                },
                None => {
                    return Err(JxlError::CodecFailure(format!(
                        "no pixel data for frame {}",
                        self.frame.current()
                    )))
                }
            };

            self.source = None;
            self.stream = Some(Cursor::new(pixels));
            self.frame.mark_loaded();
            tracing::debug!(frame = self.frame.current(), "frame loaded");
        }

        Ok(self.stream.as_ref().map_or(&[][..], |s| s.get_ref().as_slice()))
    }

    /// Select a frame.
    ///
    /// Loads the current frame first, then fails with
    /// [`JxlError::UnsupportedSeek`] since only one frame exists. The handle
    /// stays usable afterwards.
    pub fn seek(&mut self, frame: u32) -> JxlResult<()> {
        self.load()?;
        self.frame.check_seek(frame, self.n_frames())?;
        self.frame.current_frame = frame;
        Ok(())
    }

    /// Loaded pixels as a byte stream, positioned at the start
    pub fn pixel_reader(&mut self) -> JxlResult<&mut Cursor<Vec<u8>>> {
        self.load()?;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| JxlError::CodecFailure("pixel stream missing after load".to_string()))?;
        stream.set_position(0);
        Ok(stream)
    }

    /// Load and hand over the pixels as a host image
    pub fn into_host_image(mut self) -> JxlResult<HostImage> {
        self.load()?;
        let pixels = self
            .stream
            .take()
            .map(Cursor::into_inner)
            .unwrap_or_default();
        let image = HostImage::new(self.info.mode, self.info.width, self.info.height, pixels)?;
        Ok(image.with_metadata(self.metadata).with_origin(ImageOrigin {
            format: SourceFormat::Jxl,
            path: None,
        }))
    }
}
