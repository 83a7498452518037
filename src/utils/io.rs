//! Low-level, bounds-checked little-endian reading and writing.
//!
//! Every multi-byte value stored in an event payload (block headers, collection lengths, entry
//! fields, references) goes through this module. Reads are performed against a byte slice with
//! an explicit cursor that is advanced on success and left untouched on failure. Writes append
//! to a growable buffer, which is how encoders build collection blocks.
//!
//! # Key Components
//!
//! - [`crate::utils::io::LeIO`] - Trait for primitive types with a fixed little-endian layout
//! - [`crate::utils::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::utils::io::read_le_at`] - Read a value at a cursor and advance it
//! - [`crate::utils::io::read_bytes_at`] - Borrow a run of bytes at a cursor and advance it
//! - [`crate::utils::io::read_str_at`] - Borrow a UTF-8 string at a cursor and advance it
//! - [`crate::utils::io::push_le`] - Append a value to a buffer
//!
//! # Examples
//!
//! ```rust
//! use eventbuf::utils::io::{push_le, read_le_at};
//!
//! let mut data = Vec::new();
//! push_le(&mut data, 1u16);
//! push_le(&mut data, 3u32);
//!
//! let mut offset = 0;
//! let first: u16 = read_le_at(&data, &mut offset)?;
//! let second: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 3, 6));
//! # Ok::<(), eventbuf::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Error::OutOfBounds`] if there are insufficient bytes
//! in the buffer to complete the operation.

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be read from and written to little-endian byte buffers.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size byte
/// array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait LeIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_le_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LeIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_le_io!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

/// Safely reads T in little-endian from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_le<T: LeIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads T in little-endian from a buffer at `offset`, advancing the offset past it.
///
/// # Arguments
/// * `data` - The buffer to read from
/// * `offset` - The cursor, advanced by `size_of::<T>()` on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would pass the end of the buffer.
pub fn read_le_at<T: LeIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Borrows `len` bytes from `data` at `offset`, advancing the offset past them.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
pub fn read_bytes_at<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    let Some(end) = offset.checked_add(len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let bytes = &data[*offset..end];
    *offset = end;

    Ok(bytes)
}

/// Borrows a `len` byte UTF-8 string from `data` at `offset`, advancing the offset past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain, or
/// [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
pub fn read_str_at<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a str> {
    let start = *offset;
    let bytes = read_bytes_at(data, offset, len)?;
    match std::str::from_utf8(bytes) {
        Ok(value) => Ok(value),
        Err(_) => {
            *offset = start;
            Err(malformed_error!("Invalid UTF-8 string at offset - {}", start))
        }
    }
}

/// Appends T in little-endian to the end of `data`.
pub fn push_le<T: LeIO>(data: &mut Vec<u8>, value: T) {
    data.extend_from_slice(value.to_le_bytes().as_ref());
}
