//! # JPEG XL plugin bridge
//!
//! Connects a host imaging library's format-plugin interface to a native
//! JPEG XL codec. The bridge sniffs files, exposes decoded pixels and
//! metadata through a single-frame handle, and turns host save options into
//! encoder settings.
//!
//! ## Quick Start
//!
//! ### Decoding
//!
//! ```ignore
//! use jxl_plugin::{JxlFormat, LibJxlCodec};
//!
//! let format = JxlFormat::new(LibJxlCodec::default());
//! let mut image = format.open_path("input.jxl")?;
//! println!("{}x{} {}", image.width(), image.height(), image.mode());
//! let pixels = image.load()?;
//! ```
//!
//! ### Encoding
//!
//! ```ignore
//! use jxl_plugin::{FormatHandler, HostImage, HostPixelMode, JxlFormat, LibJxlCodec, SaveOptions};
//!
//! let image = HostImage::new(HostPixelMode::RGB, 2, 1, vec![255, 0, 0, 0, 0, 255])?;
//! let options = SaveOptions::new().quality(85.0).effort(5);
//! let mut out = Vec::new();
//! JxlFormat::new(LibJxlCodec::default()).save(&image, &options, &mut out)?;
//! ```
//!
//! ## Features
//!
//! - `libjxl`: the libjxl backend ([`LibJxlCodec`])
//! - `serde`: serialization for save options and pixel modes

pub mod frame;
pub mod handler;
pub mod jpeg;
pub mod metadata;
pub mod options;

// Re-export core types
pub use jxl_core::{
    consts, ColorEncoding, Dimensions, EncodeChannels, HostImage, HostPixelMode, ImageInfo,
    ImageOrigin, JxlError, JxlResult, MetadataBundle, NativePixelFormat, SampleType, SourceFormat,
};

// Re-export container helpers
pub use jxl_headers::{find_box, sniff, BoxRef, BoxType, Container, JxlBox, Signature};

// Re-export codec contract
pub use jxl_codec::{DecodedImage, EncodeConfig, EncodeInput, JpegReconstructionPolicy, NativeCodec};
#[cfg(feature = "libjxl")]
pub use jxl_codec::LibJxlCodec;

pub use frame::{FrameState, JxlImage};
pub use handler::{FormatHandler, FrameSource, JxlFormat, Registry};
pub use options::{OptionValue, SaveOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
