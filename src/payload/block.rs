//! Block headers of the event payload.
//!
//! Every collection in a payload is stored as one block. A block header gives the collection
//! name, the type name its codec is registered under, and the length of the data that follows.
//! The length of a block header is not fixed, as it depends on both names.
//!
//! ```text
//! u16 name_len | name (UTF-8) | u16 type_len | type name (UTF-8) | u32 data_len | data
//! ```

use std::ops::Range;

use crate::{
    utils::io::{push_le, read_le_at, read_str_at},
    Error::{self, OutOfBounds},
    Result,
};

/// Location and identity of one collection block inside a payload.
///
/// # Examples
///
/// ```rust
/// use eventbuf::payload::BlockHeader;
///
/// let data = [0x01, 0x00, b'h', 0x01, 0x00, b't', 0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB];
/// let header = BlockHeader::read(&data, 0)?;
/// assert_eq!(header.name, "h");
/// assert_eq!(header.data_range(), 10..12);
/// # Ok::<(), eventbuf::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Name of the collection stored in this block
    pub name: String,
    /// Type name of the codec that decodes the block data
    pub type_name: String,
    /// Offset of the first byte of the block header within the payload
    pub offset: usize,
    /// Offset of the first byte of the block data within the payload
    pub data_offset: usize,
    /// Size of the block data in bytes
    pub size: usize,
}

impl BlockHeader {
    /// Reads the block header starting at `offset` of `data`
    ///
    /// # Arguments
    /// * `data` - The complete payload
    /// * `offset` - Position of the block within the payload
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header or the data it announces does not
    /// fit into `data`, and [`crate::Error::Malformed`] for empty or non UTF-8 names.
    pub fn read(data: &[u8], offset: usize) -> Result<BlockHeader> {
        let mut cursor = offset;

        let name_len = read_le_at::<u16>(data, &mut cursor)?;
        if name_len == 0 {
            return Err(malformed_error!("Empty block name at offset - {}", offset));
        }
        let name = read_str_at(data, &mut cursor, name_len as usize)?.to_string();

        let type_len = read_le_at::<u16>(data, &mut cursor)?;
        let type_name = read_str_at(data, &mut cursor, type_len as usize)?.to_string();

        let size = read_le_at::<u32>(data, &mut cursor)? as usize;
        match cursor.checked_add(size) {
            Some(end) => {
                if end > data.len() {
                    return Err(OutOfBounds);
                }
            }
            None => {
                return Err(malformed_error!(
                    "Block data size causing integer overflow - {} + {}",
                    cursor,
                    size
                ))
            }
        }

        Ok(BlockHeader {
            name,
            type_name,
            offset,
            data_offset: cursor,
            size,
        })
    }

    /// Offset one past the last byte of this block
    #[must_use]
    pub fn end(&self) -> usize {
        self.data_offset + self.size
    }

    /// Byte range of the complete block, header included
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Byte range of the block data
    #[must_use]
    pub fn data_range(&self) -> Range<usize> {
        self.data_offset..self.end()
    }
}

/// Serializes a complete block (header and data)
///
/// # Errors
/// Returns [`crate::Error::InvalidName`] if `name` is empty or longer than `u16::MAX`
/// bytes, [`crate::Error::Malformed`] for an oversized type name and
/// [`crate::Error::OutOfBounds`] if `data` is larger than `u32::MAX` bytes.
pub fn encode_block(name: &str, type_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let name_len = match u16::try_from(name.len()) {
        Ok(0) | Err(_) => return Err(Error::InvalidName(name.to_string())),
        Ok(len) => len,
    };
    let Ok(type_len) = u16::try_from(type_name.len()) else {
        return Err(malformed_error!("Type name too long - {}", type_name.len()));
    };
    let Ok(size) = u32::try_from(data.len()) else {
        return Err(OutOfBounds);
    };

    let mut block = Vec::with_capacity(8 + name.len() + type_name.len() + data.len());
    push_le(&mut block, name_len);
    block.extend_from_slice(name.as_bytes());
    push_le(&mut block, type_len);
    block.extend_from_slice(type_name.as_bytes());
    push_le(&mut block, size);
    block.extend_from_slice(data);

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let block_bytes = [
            0xFF, 0xFF,                    // leading garbage, block starts at 2
            0x04, 0x00,
            b'h', b'i', b't', b's',
            0x03, 0x00,
            b'h', b'i', b't',
            0x02, 0x00, 0x00, 0x00,
            0xAA, 0xBB,
        ];

        let header = BlockHeader::read(&block_bytes, 2).unwrap();

        assert_eq!(header.name, "hits");
        assert_eq!(header.type_name, "hit");
        assert_eq!(header.offset, 2);
        assert_eq!(header.data_offset, 17);
        assert_eq!(header.size, 2);
        assert_eq!(header.end(), block_bytes.len());
        assert_eq!(&block_bytes[header.data_range()], &[0xAA, 0xBB]);
    }

    #[test]
    fn crafted_empty_name() {
        #[rustfmt::skip]
        let block_bytes = [
            0x00, 0x00,
            0x01, 0x00, b't',
            0x00, 0x00, 0x00, 0x00,
        ];

        assert!(matches!(
            BlockHeader::read(&block_bytes, 0),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn crafted_truncated_data() {
        #[rustfmt::skip]
        let block_bytes = [
            0x01, 0x00, b'h',
            0x01, 0x00, b't',
            0x08, 0x00, 0x00, 0x00,
            0x01, 0x02,
        ];

        assert!(matches!(
            BlockHeader::read(&block_bytes, 0),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn encode() {
        let block = encode_block("hits", "hit", &[0xAA, 0xBB]).unwrap();
        let header = BlockHeader::read(&block, 0).unwrap();

        assert_eq!(header.name, "hits");
        assert_eq!(header.type_name, "hit");
        assert_eq!(header.range(), 0..block.len());

        assert!(matches!(
            encode_block("", "hit", &[]),
            Err(Error::InvalidName(_))
        ));
    }
}
