//! Save options and their resolution into an encoder configuration
//!
//! The host passes a loosely typed option bag on every save. [`resolve_config`]
//! turns it into an [`EncodeConfig`] following a fixed precedence:
//!
//! 1. `lossless` forces quality 100 (and keeps the original color profile)
//! 2. `quality` defaults to 90
//! 3. `decoding_speed` defaults to 0
//! 4. `effort` defaults to 7
//! 5. `use_container` defaults to false, but is forced on when any metadata
//!    payload is present, since metadata can only travel in container boxes
//! 6. `lossless_jpeg` selects the [`JpegReconstructionPolicy`]
//! 7. `num_threads` defaults to -1, leaving the thread count to the codec
//!
//! [`plan_encode`] then decides whether the pixels or the original JPEG
//! bytes are handed to the codec. An ICC profile the codec cannot embed is
//! dropped first and so never forces the container.

use crate::metadata::collect_encode_metadata;
use jxl_codec::{EncodeConfig, JpegReconstructionPolicy};
use jxl_core::*;
use std::collections::BTreeMap;
use std::fs;

pub const LOSSLESS: &str = "lossless";
pub const QUALITY: &str = "quality";
pub const DECODING_SPEED: &str = "decoding_speed";
pub const EFFORT: &str = "effort";
pub const USE_CONTAINER: &str = "use_container";
pub const USE_ORIGINAL_PROFILE: &str = "use_original_profile";
pub const EXIF: &str = "exif";
pub const XMP: &str = "xmp";
pub const JUMB: &str = "jumb";
pub const ICC_PROFILE: &str = "icc_profile";
pub const LOSSLESS_JPEG: &str = "lossless_jpeg";
pub const COMPRESS_METADATA: &str = "compress_metadata";
pub const NUM_THREADS: &str = "num_threads";

/// Every key the resolver reads
pub const RECOGNIZED_KEYS: &[&str] = &[
    LOSSLESS,
    QUALITY,
    DECODING_SPEED,
    EFFORT,
    USE_CONTAINER,
    USE_ORIGINAL_PROFILE,
    EXIF,
    XMP,
    JUMB,
    ICC_PROFILE,
    LOSSLESS_JPEG,
    COMPRESS_METADATA,
    NUM_THREADS,
];

/// A single value in the option bag
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(untagged))]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl OptionValue {
    fn kind(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Bytes(_) => "bytes",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<u8> for OptionValue {
    fn from(v: u8) -> Self {
        OptionValue::Int(v.into())
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<f32> for OptionValue {
    fn from(v: f32) -> Self {
        OptionValue::Float(v.into())
    }
}

impl From<Vec<u8>> for OptionValue {
    fn from(v: Vec<u8>) -> Self {
        OptionValue::Bytes(v)
    }
}

impl From<&[u8]> for OptionValue {
    fn from(v: &[u8]) -> Self {
        OptionValue::Bytes(v.to_vec())
    }
}

fn wrong_type(key: &str, expected: &str, value: &OptionValue) -> JxlError {
    JxlError::InvalidParameter(format!(
        "option `{}` expects {}, got {}",
        key,
        expected,
        value.kind()
    ))
}

/// The host's option bag for one save call
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct SaveOptions {
    values: BTreeMap<String, OptionValue>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn get_bool(&self, key: &str) -> JxlResult<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Bool(v)) => Ok(Some(*v)),
            Some(OptionValue::Int(v)) => Ok(Some(*v != 0)),
            Some(other) => Err(wrong_type(key, "a boolean", other)),
        }
    }

    pub fn get_int(&self, key: &str) -> JxlResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(wrong_type(key, "an integer", other)),
        }
    }

    pub fn get_float(&self, key: &str) -> JxlResult<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Float(v)) => Ok(Some(*v)),
            Some(OptionValue::Int(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(wrong_type(key, "a number", other)),
        }
    }

    pub fn get_bytes(&self, key: &str) -> JxlResult<Option<&[u8]>> {
        match self.get(key) {
            None => Ok(None),
            Some(OptionValue::Bytes(v)) => Ok(Some(v.as_slice())),
            Some(other) => Err(wrong_type(key, "bytes", other)),
        }
    }

    pub fn lossless(self, lossless: bool) -> Self {
        self.set(LOSSLESS, lossless)
    }

    pub fn quality(self, quality: f32) -> Self {
        self.set(QUALITY, quality)
    }

    pub fn effort(self, effort: u8) -> Self {
        self.set(EFFORT, effort)
    }

    pub fn decoding_speed(self, speed: u8) -> Self {
        self.set(DECODING_SPEED, speed)
    }

    pub fn use_container(self, use_container: bool) -> Self {
        self.set(USE_CONTAINER, use_container)
    }

    pub fn use_original_profile(self, keep: bool) -> Self {
        self.set(USE_ORIGINAL_PROFILE, keep)
    }

    pub fn exif(self, exif: impl Into<Vec<u8>>) -> Self {
        self.set(EXIF, exif.into())
    }

    pub fn xmp(self, xmp: impl Into<Vec<u8>>) -> Self {
        self.set(XMP, xmp.into())
    }

    pub fn jumb(self, jumb: impl Into<Vec<u8>>) -> Self {
        self.set(JUMB, jumb.into())
    }

    pub fn icc_profile(self, icc: impl Into<Vec<u8>>) -> Self {
        self.set(ICC_PROFILE, icc.into())
    }

    pub fn lossless_jpeg(self, reconstruct: bool) -> Self {
        self.set(LOSSLESS_JPEG, reconstruct)
    }

    pub fn compress_metadata(self, compress: bool) -> Self {
        self.set(COMPRESS_METADATA, compress)
    }

    pub fn num_threads(self, threads: i32) -> Self {
        self.set(NUM_THREADS, threads)
    }
}

fn ranged_int(options: &SaveOptions, key: &str, min: i64, max: i64, default: u8) -> JxlResult<u8> {
    match options.get_int(key)? {
        None => Ok(default),
        Some(v) if (min..=max).contains(&v) => Ok(v as u8),
        Some(v) => Err(JxlError::InvalidParameter(format!(
            "{} must be between {} and {}, got {}",
            key, min, max, v
        ))),
    }
}

/// `lossless_jpeg`: absent is Auto, true is Force, false is Disable
fn jpeg_policy(options: &SaveOptions) -> JxlResult<JpegReconstructionPolicy> {
    Ok(match options.get_bool(LOSSLESS_JPEG)? {
        None => JpegReconstructionPolicy::Auto,
        Some(true) => JpegReconstructionPolicy::Force,
        Some(false) => JpegReconstructionPolicy::Disable,
    })
}

/// Resolve the option bag into an encoder configuration.
///
/// `metadata` is the bundle that will actually be embedded; a non-empty
/// bundle forces the container layout.
pub fn resolve_config(options: &SaveOptions, metadata: &MetadataBundle) -> JxlResult<EncodeConfig> {
    for key in options.keys() {
        if !RECOGNIZED_KEYS.contains(&key) {
            tracing::trace!(key, "ignoring unrecognized save option");
        }
    }

    let lossless = options.get_bool(LOSSLESS)?.unwrap_or(false);

    let quality = if lossless {
        consts::LOSSLESS_QUALITY
    } else {
        match options.get_float(QUALITY)? {
            None => consts::DEFAULT_QUALITY,
            Some(q) if (consts::MIN_QUALITY as f64..=consts::MAX_QUALITY as f64).contains(&q) => q as f32,
            Some(q) => {
                return Err(JxlError::InvalidParameter(format!(
                    "quality must be between 0 and 100, got {}",
                    q
                )))
            }
        }
    };

    let decoding_speed = ranged_int(
        options,
        DECODING_SPEED,
        0,
        consts::MAX_DECODING_SPEED.into(),
        consts::DEFAULT_DECODING_SPEED,
    )?;
    let effort = ranged_int(
        options,
        EFFORT,
        consts::MIN_EFFORT.into(),
        consts::MAX_EFFORT.into(),
        consts::DEFAULT_EFFORT,
    )?;

    let mut use_container = options.get_bool(USE_CONTAINER)?.unwrap_or(false);
    if !use_container && !metadata.is_empty() {
        tracing::debug!(
            requested = options.contains(USE_CONTAINER),
            "metadata present, forcing container output"
        );
        use_container = true;
    }

    let use_original_profile = lossless || options.get_bool(USE_ORIGINAL_PROFILE)?.unwrap_or(false);

    let jpeg_reconstruction = jpeg_policy(options)?;

    let thread_count = match options.get_int(NUM_THREADS)? {
        None => consts::AUTO_THREADS,
        Some(n) if (-1..=i32::MAX as i64).contains(&n) => n as i32,
        Some(n) => {
            return Err(JxlError::InvalidParameter(format!(
                "num_threads must be -1 (auto), 0 (disabled) or positive, got {}",
                n
            )))
        }
    };

    Ok(EncodeConfig {
        lossless,
        quality,
        effort,
        decoding_speed,
        use_container,
        use_original_profile,
        thread_count,
        jpeg_reconstruction,
    })
}

/// What the codec will be given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeSource {
    /// The host's pixel buffer
    Pixels,
    /// The original JPEG file, re-wrapped losslessly
    Jpeg(Vec<u8>),
}

/// Everything needed for one encode call
#[derive(Debug, Clone)]
pub struct EncodePlan {
    pub config: EncodeConfig,
    pub metadata: MetadataBundle,
    pub source: EncodeSource,
}

/// Original JPEG bytes of an image opened from a JPEG file, if still readable
fn original_jpeg(image: &HostImage) -> Option<Vec<u8>> {
    let origin = image.origin.as_ref()?;
    if origin.format != SourceFormat::Jpeg {
        return None;
    }
    let path = origin.path.as_ref()?;
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "original JPEG not readable");
            None
        }
    }
}

/// Decide what to encode and with which settings.
///
/// When the JPEG path is taken the host's pixels and metadata are ignored:
/// the original bitstream already carries both. `embeds_icc` reports whether
/// the codec writes ICC profiles; when it does not, the profile is left out of
/// the plan.
pub fn plan_encode(image: &HostImage, options: &SaveOptions, embeds_icc: bool) -> JxlResult<EncodePlan> {
    let jpeg = match jpeg_policy(options)? {
        JpegReconstructionPolicy::Disable => None,
        JpegReconstructionPolicy::Auto => original_jpeg(image),
        JpegReconstructionPolicy::Force => Some(original_jpeg(image).ok_or_else(|| {
            JxlError::InvalidParameter(
                "lossless_jpeg requested but the image has no readable JPEG source file".to_string(),
            )
        })?),
    };

    match jpeg {
        Some(bytes) => {
            let metadata = MetadataBundle::default();
            let config = resolve_config(options, &metadata)?;
            tracing::debug!(len = bytes.len(), "re-wrapping original JPEG bitstream");
            Ok(EncodePlan {
                config,
                metadata,
                source: EncodeSource::Jpeg(bytes),
            })
        }
        None => {
            let mut metadata = collect_encode_metadata(image, options)?;
            if !embeds_icc && metadata.icc_profile.take().is_some() {
                tracing::debug!("codec does not embed ICC profiles, dropping it");
            }
            let config = resolve_config(options, &metadata)?;
            Ok(EncodePlan {
                config,
                metadata,
                source: EncodeSource::Pixels,
            })
        }
    }
}
