//! Shared low-level helpers.
//!
//! - [`io`] - Bounds-checked little-endian readers and writers used by every codec

pub mod io;
