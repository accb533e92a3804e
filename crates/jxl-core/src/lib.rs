//! Core types for the JPEG XL plugin bridge
//!
//! This crate provides the data structures shared by every layer of the bridge:
//! the host and codec pixel formats and the mapping between them, metadata
//! payloads, the host image buffer, and error types.

pub mod consts;
pub mod error;
pub mod host;
pub mod metadata;
pub mod types;

pub use error::{JxlError, JxlResult};
pub use host::*;
pub use metadata::*;
pub use types::*;
