//! Host-facing format handler and handler registry

use crate::frame::JxlImage;
use crate::options::{plan_encode, EncodeSource, SaveOptions};
use jxl_codec::{EncodeInput, NativeCodec};
use jxl_core::*;
use std::io::{Read, Write};
use std::path::Path;

/// An opened image as the host sees it
pub trait FrameSource {
    fn info(&self) -> ImageInfo;
    fn metadata(&self) -> &MetadataBundle;
    fn load(&mut self) -> JxlResult<&[u8]>;
    fn seek(&mut self, frame: u32) -> JxlResult<()>;
    fn tell(&self) -> u32;
    fn n_frames(&self) -> u32;
    fn is_animated(&self) -> bool;
}

impl FrameSource for JxlImage {
    fn info(&self) -> ImageInfo {
        JxlImage::info(self)
    }

    fn metadata(&self) -> &MetadataBundle {
        JxlImage::metadata(self)
    }

    fn load(&mut self) -> JxlResult<&[u8]> {
        JxlImage::load(self)
    }

    fn seek(&mut self, frame: u32) -> JxlResult<()> {
        JxlImage::seek(self, frame)
    }

    fn tell(&self) -> u32 {
        JxlImage::tell(self)
    }

    fn n_frames(&self) -> u32 {
        JxlImage::n_frames(self)
    }

    fn is_animated(&self) -> bool {
        JxlImage::is_animated(self)
    }
}

/// A file format the host can open and save
pub trait FormatHandler {
    /// Short format identifier, e.g. `JXL`
    fn format(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// File extensions including the leading dot
    fn extensions(&self) -> &'static [&'static str];
    fn mime_type(&self) -> &'static str;
    /// Whether the leading bytes of a file belong to this format
    fn sniff(&self, prefix: &[u8]) -> bool;
    fn open(&self, reader: &mut dyn Read) -> JxlResult<Box<dyn FrameSource>>;
    fn save(&self, image: &HostImage, options: &SaveOptions, writer: &mut dyn Write) -> JxlResult<()>;
}

/// JPEG XL support on top of a native codec
#[derive(Debug, Clone, Default)]
pub struct JxlFormat<C> {
    codec: C,
}

impl<C: NativeCodec> JxlFormat<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn open_image<R: Read>(&self, reader: R) -> JxlResult<JxlImage> {
        JxlImage::open(&self.codec, reader)
    }

    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> JxlResult<JxlImage> {
        JxlImage::open_path(&self.codec, path)
    }

    /// Encode a host image to a complete JPEG XL file.
    ///
    /// Fails with [`JxlError::UnsupportedEncodeMode`] before the codec is
    /// involved when the mode is not L, LA, RGB or RGBA.
    pub fn encode(&self, image: &HostImage, options: &SaveOptions) -> JxlResult<Vec<u8>> {
        let channels = host_mode_to_encode_channels(image.mode())?;
        let plan = plan_encode(image, options, self.codec.embeds_icc_profile())?;

        tracing::debug!(
            mode = %image.mode(),
            width = image.width(),
            height = image.height(),
            lossless = plan.config.lossless,
            quality = plan.config.quality,
            effort = plan.config.effort,
            use_container = plan.config.use_container,
            jpeg = matches!(plan.source, EncodeSource::Jpeg(_)),
            "encoding JPEG XL"
        );

        let input = match &plan.source {
            EncodeSource::Jpeg(jpeg) => EncodeInput::Jpeg(jpeg),
            EncodeSource::Pixels => EncodeInput::Pixels {
                data: image.data(),
                width: image.width(),
                height: image.height(),
                channels,
            },
        };
        self.codec.encode(input, &plan.config, &plan.metadata)
    }
}

impl<C: NativeCodec> FormatHandler for JxlFormat<C> {
    fn format(&self) -> &'static str {
        "JXL"
    }

    fn description(&self) -> &'static str {
        "JPEG XL image"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".jxl"]
    }

    fn mime_type(&self) -> &'static str {
        "image/jxl"
    }

    fn sniff(&self, prefix: &[u8]) -> bool {
        jxl_headers::sniff(prefix).is_some()
    }

    fn open(&self, reader: &mut dyn Read) -> JxlResult<Box<dyn FrameSource>> {
        Ok(Box::new(self.open_image(reader)?))
    }

    fn save(&self, image: &HostImage, options: &SaveOptions, writer: &mut dyn Write) -> JxlResult<()> {
        let encoded = self.encode(image, options)?;
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }
}

/// Handlers known to the host, looked up by content, extension or MIME type
#[derive(Default)]
pub struct Registry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H: FormatHandler + 'static>(&mut self, handler: H) -> &mut Self {
        tracing::debug!(format = handler.format(), "registered format handler");
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn by_format(&self, format: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.format().eq_ignore_ascii_case(format))
            .map(|h| h.as_ref())
    }

    /// Accepts `jxl`, `.jxl` or a file name ending in the extension
    pub fn by_extension(&self, name: &str) -> Option<&dyn FormatHandler> {
        let name = name.to_ascii_lowercase();
        self.handlers
            .iter()
            .find(|h| {
                h.extensions().iter().any(|ext| {
                    name == ext.trim_start_matches('.') || name.ends_with(&ext.to_ascii_lowercase())
                })
            })
            .map(|h| h.as_ref())
    }

    pub fn by_mime(&self, mime: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.mime_type().eq_ignore_ascii_case(mime))
            .map(|h| h.as_ref())
    }

    pub fn sniff(&self, prefix: &[u8]) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.sniff(prefix))
            .map(|h| h.as_ref())
    }

    /// Open in-memory file data with whichever handler recognises it
    pub fn open(&self, data: &[u8]) -> JxlResult<Box<dyn FrameSource>> {
        let handler = self.sniff(data).ok_or(JxlError::InvalidSignature)?;
        let mut reader = data;
        handler.open(&mut reader)
    }
}
