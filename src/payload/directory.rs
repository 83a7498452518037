//! Block directory of an event payload.
//!
//! The [`Directory`] is the ordered list of block headers found by walking a payload from its
//! first byte to its last. It is recomputed from the bytes whenever it is needed, since the
//! payload bytes are the only source of truth for which collections an event holds.

use std::collections::HashSet;

use crate::{payload::BlockHeader, Result};

/// Ordered list of all blocks in a payload.
///
/// # Example
///
/// ```rust
/// use eventbuf::payload::{encode_block, Directory};
///
/// let mut payload = encode_block("hits", "hit", &[0x01])?;
/// payload.extend(encode_block("tracks", "track", &[])?);
///
/// let directory = Directory::read(&payload)?;
/// assert_eq!(directory.names(), vec!["hits", "tracks"]);
/// assert_eq!(directory.find("tracks").map(|b| b.size), Some(0));
/// # Ok::<(), eventbuf::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    blocks: Vec<BlockHeader>,
}

impl Directory {
    /// Reads the block directory of a payload.
    ///
    /// An empty payload yields an empty directory.
    ///
    /// # Arguments
    /// * `data` - The complete payload
    ///
    /// # Errors
    /// Returns an error if any block header is truncated or malformed, if a block extends past
    /// the end of the payload, or if two blocks carry the same name.
    pub fn read(data: &[u8]) -> Result<Directory> {
        let mut blocks = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = 0_usize;

        while offset < data.len() {
            let block = BlockHeader::read(data, offset)?;
            if !seen.insert(block.name.clone()) {
                return Err(malformed_error!(
                    "Duplicate block name - {} at offset {}",
                    block.name,
                    offset
                ));
            }

            offset = block.end();
            blocks.push(block);
        }

        Ok(Directory { blocks })
    }

    /// Returns the header of the block named `name`, if present
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&BlockHeader> {
        self.blocks.iter().find(|block| block.name == name)
    }

    /// Returns the collection names in payload order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.blocks.iter().map(|block| block.name.clone()).collect()
    }

    /// Returns all block headers in payload order
    #[must_use]
    pub fn blocks(&self) -> &[BlockHeader] {
        &self.blocks
    }

    /// Returns the number of blocks
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the payload holds no blocks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
