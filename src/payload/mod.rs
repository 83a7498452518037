//! The event payload: one contiguous buffer of named, length-delimited blocks.
//!
//! # Architecture
//!
//! All collections of an event are serialized back to back into a single byte buffer. Each one
//! is stored as a block, which is a [`BlockHeader`] naming the collection and its type,
//! followed by the bytes produced by the collection's codec. There is no separate table of
//! contents; the [`Directory`] is rebuilt by walking the blocks.
//!
//! ```text
//! ┌────────────────────────┬────────────────────────┬─────┐
//! │ block "hits"  (hit)    │ block "tracks" (track) │ ... │
//! └────────────────────────┴────────────────────────┴─────┘
//! ```
//!
//! Replacing a block splices the new bytes into the old block's range, which shifts every later
//! block. Removing a block excises its range and shrinks the buffer.
//!
//! # Key Components
//!
//! - [`Payload`] - The owned, resizable buffer and its block-level edit operations
//! - [`BlockHeader`] - Position and identity of one block
//! - [`Directory`] - Ordered list of all blocks in a buffer
//! - [`encode_block`] - Serialization of a single block

mod block;
mod directory;

pub use block::{encode_block, BlockHeader};
pub use directory::Directory;

use crate::Result;

/// Owned payload buffer of an event.
///
/// [`Payload::len`] always equals the length of the slice returned by [`Payload::as_slice`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    data: Vec<u8>,
}

impl Payload {
    /// Creates an empty payload
    #[must_use]
    pub fn new() -> Self {
        Payload { data: Vec::new() }
    }

    /// Takes ownership of raw payload bytes without inspecting them
    #[must_use]
    pub fn from_vec(data: Vec<u8>) -> Self {
        Payload { data }
    }

    /// Returns the payload bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload bytes for direct modification
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the payload size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload holds no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resizes the buffer to `size` bytes, zero-filling on growth, and returns all of it
    pub fn resize(&mut self, size: usize) -> &mut [u8] {
        self.data.resize(size, 0);
        &mut self.data
    }

    /// Consumes the payload and returns the underlying buffer
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Reads the block directory of the current bytes
    ///
    /// # Errors
    /// Returns an error if the payload is not a valid sequence of blocks
    pub fn directory(&self) -> Result<Directory> {
        Directory::read(&self.data)
    }

    /// Returns the data bytes of the block named `name`, if present
    ///
    /// # Errors
    /// Returns an error if the payload is not a valid sequence of blocks
    pub fn block_data(&self, name: &str) -> Result<Option<(BlockHeader, &[u8])>> {
        let directory = self.directory()?;
        Ok(directory
            .find(name)
            .cloned()
            .map(|block| {
                let range = block.data_range();
                (block, &self.data[range])
            }))
    }

    /// Writes the block `name`, replacing an existing block of that name in place or
    /// appending a new one at the end.
    ///
    /// # Errors
    /// Returns an error if the current payload is malformed or the block can not be encoded.
    /// The payload is unchanged in both cases.
    pub fn upsert(&mut self, name: &str, type_name: &str, data: &[u8]) -> Result<()> {
        let block = encode_block(name, type_name, data)?;
        self.write_block(name, block)
    }

    /// Writes a complete block produced by [`encode_block`] for `name`, replacing an existing
    /// block of that name in place or appending it.
    ///
    /// # Errors
    /// Returns an error if the current payload is malformed, leaving it unchanged.
    pub fn write_block(&mut self, name: &str, block: Vec<u8>) -> Result<()> {
        let directory = self.directory()?;
        match directory.find(name) {
            Some(existing) => {
                self.data.splice(existing.range(), block);
            }
            None => self.data.extend_from_slice(&block),
        }

        Ok(())
    }

    /// Removes the block `name` and shrinks the payload.
    ///
    /// Returns `false` if no such block exists.
    ///
    /// # Errors
    /// Returns an error if the current payload is malformed.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let directory = self.directory()?;
        match directory.find(name) {
            Some(existing) => {
                self.data.drain(existing.range());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
