//! Shared fixtures for the integration tests
//!
//! `MockCodec` stands in for libjxl. Its "codestream" is the `FF 0A`
//! signature followed by a small header and the raw payload, so pixels
//! survive a round trip bit for bit. With `use_container` set it wraps the
//! codestream in a real box container and writes metadata boxes the way
//! libjxl does.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};
use jxl_plugin::*;
use std::cell::{Cell, RefCell};

const MAGIC: &[u8; 4] = b"MOCK";
const KIND_PIXELS: u8 = 0;
const KIND_JPEG: u8 = 1;

/// Route plugin logs to the test output; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a mock codestream
pub fn codestream(kind: u8, width: u32, height: u32, format: NativePixelFormat, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0x0A];
    out.extend_from_slice(MAGIC);
    out.push(kind);
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.push(format.num_color_channels as u8);
    out.push(format.has_alpha as u8);
    out.push(format.bits_per_sample as u8);
    out.push((format.sample_type == SampleType::Float) as u8);
    out.extend_from_slice(payload);
    out
}

/// A naked mock codestream holding raw pixels
pub fn pixel_file(width: u32, height: u32, format: NativePixelFormat, pixels: &[u8]) -> Vec<u8> {
    codestream(KIND_PIXELS, width, height, format, pixels)
}

/// A container around a mock codestream plus extra boxes
pub fn container_file(codestream: Vec<u8>, extra: Vec<JxlBox>) -> Vec<u8> {
    let mut container = Container::with_codestream(codestream);
    for item in extra {
        container.push(item);
    }
    container.to_vec().expect("container serializes")
}

fn parse_codestream(data: &[u8]) -> JxlResult<DecodedImage> {
    let bad = || JxlError::CodecFailure("not a mock codestream".to_string());
    if data.len() < 19 || &data[..2] != [0xFF, 0x0A] || &data[2..6] != MAGIC {
        return Err(bad());
    }
    let kind = data[6];
    let width = u32::from_be_bytes([data[7], data[8], data[9], data[10]]);
    let height = u32::from_be_bytes([data[11], data[12], data[13], data[14]]);
    let format = NativePixelFormat {
        num_color_channels: data[15].into(),
        has_alpha: data[16] != 0,
        bits_per_sample: data[17].into(),
        sample_type: if data[18] != 0 {
            SampleType::Float
        } else {
            SampleType::UnsignedInt
        },
    };
    Ok(DecodedImage {
        is_jpeg_reconstruction: kind == KIND_JPEG,
        width,
        height,
        format,
        data: data[19..].to_vec(),
        icc_profile: None,
    })
}

/// Recording stand-in for the native codec
#[derive(Default)]
pub struct MockCodec {
    pub decode_calls: Cell<usize>,
    pub encode_calls: Cell<usize>,
    pub last_config: RefCell<Option<EncodeConfig>>,
    pub last_metadata: RefCell<Option<MetadataBundle>>,
    pub last_input_was_jpeg: Cell<bool>,
    /// Reported as the decoded image's ICC profile
    pub icc_profile: Option<Vec<u8>>,
    /// Behave like a backend that cannot write ICC profiles
    pub drops_icc: bool,
}

impl MockCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icc(icc: &[u8]) -> Self {
        Self {
            icc_profile: Some(icc.to_vec()),
            ..Self::default()
        }
    }

    pub fn without_icc_support() -> Self {
        Self {
            drops_icc: true,
            ..Self::default()
        }
    }

    pub fn config(&self) -> EncodeConfig {
        self.last_config.borrow().clone().expect("encode was called")
    }

    pub fn metadata(&self) -> MetadataBundle {
        self.last_metadata.borrow().clone().expect("encode was called")
    }
}

impl NativeCodec for MockCodec {
    fn decode(&self, data: &[u8]) -> JxlResult<DecodedImage> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        let stream = match sniff(data) {
            Some(Signature::Container) => Container::parse(data)?.extract_codestream()?,
            Some(Signature::Codestream) => data.to_vec(),
            None => return Err(JxlError::InvalidSignature),
        };
        let mut decoded = parse_codestream(&stream)?;
        decoded.icc_profile = self.icc_profile.clone();
        Ok(decoded)
    }

    fn encode(
        &self,
        input: EncodeInput<'_>,
        config: &EncodeConfig,
        metadata: &MetadataBundle,
    ) -> JxlResult<Vec<u8>> {
        self.encode_calls.set(self.encode_calls.get() + 1);
        *self.last_config.borrow_mut() = Some(config.clone());
        *self.last_metadata.borrow_mut() = Some(metadata.clone());
        self.last_input_was_jpeg.set(input.is_jpeg());

        let stream = match input {
            EncodeInput::Pixels {
                data,
                width,
                height,
                channels,
            } => {
                let color = if channels.has_alpha {
                    channels.num_channels - 1
                } else {
                    channels.num_channels
                };
                let format = NativePixelFormat::uint8(color, channels.has_alpha);
                codestream(KIND_PIXELS, width, height, format, data)
            }
            EncodeInput::Jpeg(jpeg) => {
                let decoded = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg)?;
                let color = decoded.color().channel_count() as u32;
                let format = NativePixelFormat::uint8(color, false);
                codestream(KIND_JPEG, decoded.width(), decoded.height(), format, jpeg)
            }
        };

        if !config.use_container {
            return Ok(stream);
        }

        let mut container = Container::with_codestream(stream);
        if let Some(exif) = metadata.exif.as_deref() {
            container.push(JxlBox::exif(exif));
        }
        if let Some(xmp) = metadata.xmp.clone() {
            container.push(JxlBox::new(BoxType::Xml, xmp));
        }
        if let Some(jumb) = metadata.jumb.clone() {
            container.push(JxlBox::new(BoxType::Jumbf, jumb));
        }
        container.to_vec()
    }

    fn embeds_icc_profile(&self) -> bool {
        !self.drops_icc
    }
}

/// Deterministic pattern for a mode's raw buffer
pub fn pattern(mode: HostPixelMode, width: u32, height: u32) -> Vec<u8> {
    let len = width as usize * height as usize * mode.bytes_per_pixel();
    (0..len).map(|i| (i * 37 % 251) as u8).collect()
}

/// A small RGB JPEG produced by the `image` crate
pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let pixels: Vec<u8> = (0..width * height)
        .flat_map(|i| {
            let x = (i % width) as u8;
            [x.wrapping_mul(16), 96, 200]
        })
        .collect();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .encode(&pixels, width, height, ExtendedColorType::Rgb8)
        .expect("jpeg encodes");
    out
}

/// Insert an APP1 EXIF segment right after SOI
pub fn jpeg_with_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let mut payload = consts::EXIF_SIGNATURE.to_vec();
    payload.extend_from_slice(tiff);
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
