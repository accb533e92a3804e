//! Constants used throughout the plugin bridge

/// Maximum supported image dimension
pub const MAX_IMAGE_DIMENSION: u32 = 268435456; // 2^28

/// Number of frames exposed per image (animation is not supported)
pub const NUM_FRAMES: u32 = 1;

/// Default quality for lossy encoding (0-100)
pub const DEFAULT_QUALITY: f32 = 90.0;

/// Quality used for lossless encoding
pub const LOSSLESS_QUALITY: f32 = 100.0;

/// Default encoding effort (1-9)
pub const DEFAULT_EFFORT: u8 = 7;

/// Default decoding speed tier (0 = slowest, best quality)
pub const DEFAULT_DECODING_SPEED: u8 = 0;

/// Thread count meaning "let the codec decide"
pub const AUTO_THREADS: i32 = -1;

/// Minimum and maximum quality values
pub const MIN_QUALITY: f32 = 0.0;
pub const MAX_QUALITY: f32 = 100.0;

/// Minimum and maximum effort values
pub const MIN_EFFORT: u8 = 1;
pub const MAX_EFFORT: u8 = 9;

/// Maximum decoding speed tier
pub const MAX_DECODING_SPEED: u8 = 4;

/// Signature that prefixes EXIF payloads in JPEG APP1 segments
pub const EXIF_SIGNATURE: &[u8; 6] = b"Exif\0\0";

/// TIFF byte-order markers (little and big endian)
pub const TIFF_LE_MARKER: &[u8; 4] = b"II*\0";
pub const TIFF_BE_MARKER: &[u8; 4] = b"MM\0*";
