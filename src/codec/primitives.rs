//! [`Entry`] implementations for primitive values, plus sequence helpers for entry types that
//! embed lists (e.g. a track holding references to its hits).

use crate::{
    codec::Entry,
    utils::io::{push_le, read_le_at, read_str_at},
    Error::OutOfBounds,
    Result,
};

macro_rules! impl_entry_le {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Entry for $ty {
                const TYPE_NAME: &'static str = $name;

                fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
                    push_le(out, *self);
                    Ok(())
                }

                fn decode(data: &[u8], offset: &mut usize) -> Result<Self> {
                    read_le_at::<$ty>(data, offset)
                }
            }
        )*
    };
}

impl_entry_le!(
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    i32 => "i32",
    i64 => "i64",
    f32 => "f32",
    f64 => "f64",
);

impl Entry for bool {
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        push_le(out, u8::from(*self));
        Ok(())
    }

    fn decode(data: &[u8], offset: &mut usize) -> Result<Self> {
        let start = *offset;
        match read_le_at::<u8>(data, offset)? {
            0 => Ok(false),
            1 => Ok(true),
            other => {
                *offset = start;
                Err(malformed_error!(
                    "Invalid bool value {} at offset {}",
                    other,
                    start
                ))
            }
        }
    }
}

impl Entry for String {
    const TYPE_NAME: &'static str = "string";

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let Ok(len) = u32::try_from(self.len()) else {
            return Err(OutOfBounds);
        };
        push_le(out, len);
        out.extend_from_slice(self.as_bytes());
        Ok(())
    }

    fn decode(data: &[u8], offset: &mut usize) -> Result<Self> {
        let start = *offset;
        let len = read_le_at::<u32>(data, offset)?;
        match read_str_at(data, offset, len as usize) {
            Ok(value) => Ok(value.to_string()),
            Err(error) => {
                *offset = start;
                Err(error)
            }
        }
    }
}

/// Appends a `u32` count followed by every item's encoding
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] for more than `u32::MAX` items, or the first error
/// reported by an item's encoder.
pub fn encode_seq<T: Entry>(items: &[T], out: &mut Vec<u8>) -> Result<()> {
    let Ok(count) = u32::try_from(items.len()) else {
        return Err(OutOfBounds);
    };

    push_le(out, count);
    for item in items {
        item.encode(out)?;
    }

    Ok(())
}

/// Decodes a sequence written by [`encode_seq`], advancing `offset` past it
///
/// # Errors
/// Returns an error if the count or any item is truncated or invalid
pub fn decode_seq<T: Entry>(data: &[u8], offset: &mut usize) -> Result<Vec<T>> {
    let count = read_le_at::<u32>(data, offset)? as usize;

    // Preallocation is capped by the bytes left, a corrupt count must not drive allocation
    let remaining = data.len().saturating_sub(*offset);
    let mut items = Vec::with_capacity(count.min(remaining));
    for _ in 0..count {
        items.push(T::decode(data, offset)?);
    }

    Ok(items)
}
