//! [`NativeCodec`] backed by libjxl through `jpegxl-rs`

use crate::{EncodeConfig, EncodeInput, NativeCodec};
use jpegxl_rs::decode::{Data, Pixels};
use jpegxl_rs::encode::{
    ColorEncoding as LibColorEncoding, EncoderFrame, EncoderSpeed, Metadata as LibMetadata,
};
use jpegxl_rs::parallel::threads_runner::ThreadsRunner;
use jpegxl_rs::{decoder_builder, encoder_builder};
use jxl_core::*;

use crate::DecodedImage;

/// libjxl-based codec
#[derive(Debug, Clone)]
pub struct LibJxlCodec {
    /// Decode with libjxl's default thread pool
    parallel: bool,
}

impl LibJxlCodec {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }
}

impl Default for LibJxlCodec {
    fn default() -> Self {
        Self::new(true)
    }
}

fn codec_error(e: impl std::fmt::Display) -> JxlError {
    JxlError::CodecFailure(e.to_string())
}

fn encoder_speed(effort: u8) -> JxlResult<EncoderSpeed> {
    let speed = match effort {
        1 => EncoderSpeed::Lightning,
        2 => EncoderSpeed::Thunder,
        3 => EncoderSpeed::Falcon,
        4 => EncoderSpeed::Cheetah,
        5 => EncoderSpeed::Hare,
        6 => EncoderSpeed::Wombat,
        7 => EncoderSpeed::Squirrel,
        8 => EncoderSpeed::Kitten,
        9 => EncoderSpeed::Tortoise,
        _ => return Err(JxlError::InvalidParameter(format!("invalid effort {}", effort))),
    };
    Ok(speed)
}

fn color_encoding(encoding: ColorEncoding) -> LibColorEncoding {
    match encoding {
        ColorEncoding::Srgb => LibColorEncoding::Srgb,
        ColorEncoding::SrgbLuma => LibColorEncoding::SrgbLuma,
    }
}

/// Exif boxes start with the offset of the TIFF header within the payload
fn exif_box_payload(tiff: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(tiff.len() + 4);
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(tiff);
    payload
}

impl NativeCodec for LibJxlCodec {
    fn decode(&self, data: &[u8]) -> JxlResult<DecodedImage> {
        let parallel_runner: ThreadsRunner;
        let decoder = if self.parallel {
            parallel_runner = ThreadsRunner::default();
            decoder_builder()
                .parallel_runner(&parallel_runner)
                .icc_profile(true)
                .build()
                .map_err(codec_error)?
        } else {
            decoder_builder().icc_profile(true).build().map_err(codec_error)?
        };

        let (metadata, decoded) = decoder.reconstruct(data).map_err(codec_error)?;
        let num_color_channels = metadata.num_color_channels;
        let has_alpha = metadata.has_alpha_channel;

        let (is_jpeg_reconstruction, format, bytes) = match decoded {
            Data::Jpeg(jpeg) => (
                true,
                NativePixelFormat::uint8(num_color_channels, false),
                jpeg,
            ),
            Data::Pixels(Pixels::Uint8(pixels)) => (
                false,
                NativePixelFormat::uint8(num_color_channels, has_alpha),
                pixels,
            ),
            Data::Pixels(Pixels::Uint16(pixels)) => (
                false,
                NativePixelFormat {
                    num_color_channels,
                    has_alpha,
                    bits_per_sample: 16,
                    sample_type: SampleType::UnsignedInt,
                },
                pixels.iter().flat_map(|v| v.to_le_bytes()).collect(),
            ),
            Data::Pixels(Pixels::Float(pixels)) => (
                false,
                NativePixelFormat {
                    num_color_channels,
                    has_alpha,
                    bits_per_sample: 32,
                    sample_type: SampleType::Float,
                },
                bytemuck::cast_slice(&pixels).to_vec(),
            ),
            Data::Pixels(_) => {
                return Err(JxlError::UnsupportedMode(
                    "half-float samples are not supported".to_string(),
                ))
            }
        };

        tracing::debug!(
            width = metadata.width,
            height = metadata.height,
            %format,
            is_jpeg_reconstruction,
            "libjxl decode finished"
        );

        Ok(DecodedImage {
            is_jpeg_reconstruction,
            width: metadata.width,
            height: metadata.height,
            format,
            data: bytes,
            icc_profile: metadata.icc_profile,
        })
    }

    fn encode(
        &self,
        input: EncodeInput<'_>,
        config: &EncodeConfig,
        metadata: &MetadataBundle,
    ) -> JxlResult<Vec<u8>> {
        let workers = if config.thread_count < 0 {
            None
        } else {
            Some(config.thread_count as usize)
        };
        let parallel_runner = ThreadsRunner::new(None, workers)
            .ok_or_else(|| codec_error("could not create libjxl thread runner"))?;

        let has_alpha = match input {
            EncodeInput::Pixels { channels, .. } => channels.has_alpha,
            EncodeInput::Jpeg(_) => false,
        };
        let mut encoder = encoder_builder()
            .parallel_runner(&parallel_runner)
            .jpeg_quality(config.quality)
            .has_alpha(has_alpha)
            .lossless(config.lossless)
            .use_container(config.use_container)
            .decoding_speed(i64::from(config.decoding_speed))
            .build()
            .map_err(codec_error)?;
        encoder.uses_original_profile = config.use_original_profile;
        encoder.speed = encoder_speed(config.effort)?;

        let result = match input {
            EncodeInput::Jpeg(jpeg) => encoder.encode_jpeg(jpeg).map_err(codec_error)?.data,
            EncodeInput::Pixels {
                data,
                width,
                height,
                channels,
            } => {
                encoder.color_encoding = color_encoding(channels.color_encoding);

                if let Some(exif) = metadata.exif.as_deref() {
                    encoder
                        .add_metadata(&LibMetadata::Exif(&exif_box_payload(exif)), metadata.compress)
                        .map_err(codec_error)?;
                }
                if let Some(xmp) = metadata.xmp.as_deref() {
                    encoder
                        .add_metadata(&LibMetadata::Xmp(xmp), metadata.compress)
                        .map_err(codec_error)?;
                }
                if let Some(jumb) = metadata.jumb.as_deref() {
                    encoder
                        .add_metadata(&LibMetadata::Jumb(jumb), metadata.compress)
                        .map_err(codec_error)?;
                }
                if metadata.icc_profile.is_some() {
                    tracing::debug!("ignoring ICC profile, see embeds_icc_profile");
                }

                let frame = EncoderFrame::new(data).num_channels(channels.num_channels);
                encoder
                    .encode_frame::<u8, u8>(&frame, width, height)
                    .map_err(codec_error)?
                    .data
            }
        };

        Ok(result)
    }

    /// jpegxl-rs only exposes the enumerated color encodings
    fn embeds_icc_profile(&self) -> bool {
        false
    }
}
