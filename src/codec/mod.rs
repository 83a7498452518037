//! Collection codecs.
//!
//! The container never interprets collection bytes itself. It delegates to three capabilities
//! defined here:
//!
//! - [`Entry`] - one record type with a stable type name and a byte encoding
//! - [`Collection`] - a decoded, typed sequence of entries as stored in the cache
//! - [`Codec`] - turns the bytes of a payload block back into a [`Collection`]
//!
//! [`Records`] is the stock collection, a `Vec` of one [`Entry`] type, and [`RecordsCodec`]
//! its codec. [`CodecRegistry`] resolves the type name stored in each payload block to the
//! codec that decodes it.
//!
//! # Examples
//!
//! Defining an entry type and storing a collection of it:
//!
//! ```rust
//! use eventbuf::prelude::*;
//! use eventbuf::utils::io::{push_le, read_le_at};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Hit {
//!     channel: u32,
//!     energy: f32,
//! }
//!
//! impl Entry for Hit {
//!     const TYPE_NAME: &'static str = "example.Hit";
//!
//!     fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
//!         push_le(out, self.channel);
//!         push_le(out, self.energy);
//!         Ok(())
//!     }
//!
//!     fn decode(data: &[u8], offset: &mut usize) -> Result<Self> {
//!         Ok(Hit {
//!             channel: read_le_at(data, offset)?,
//!             energy: read_le_at(data, offset)?,
//!         })
//!     }
//! }
//!
//! let mut event = EventContainer::new();
//! event.add("hits", Records::from(vec![Hit { channel: 3, energy: 1.5 }]))?;
//! event.flush_cache()?;
//!
//! let hits = event.get_as::<Records<Hit>>("hits")?;
//! assert_eq!(hits[0].channel, 3);
//! # Ok::<(), eventbuf::Error>(())
//! ```

mod primitives;
mod records;
mod registry;

pub use primitives::{decode_seq, encode_seq};
pub use records::{Records, RecordsCodec};
pub use registry::CodecRegistry;

use std::{any::Any, fmt, sync::Arc};

use crate::Result;

/// A single record type that can live inside a collection.
///
/// `TYPE_NAME` is written into every payload block holding a collection of this type, and
/// is the key under which its codec is registered; it must be unique per type and stable
/// across program versions.
pub trait Entry: Any + Clone + fmt::Debug + PartialEq + Send + Sync {
    /// Stable schema name of this entry type
    const TYPE_NAME: &'static str;

    /// Appends the encoding of this entry to `out`
    ///
    /// # Errors
    /// Returns an error if the entry can not be represented in its encoding
    fn encode(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Decodes one entry from `data` at `offset`, advancing the offset past it
    ///
    /// # Errors
    /// Returns an error if the bytes are truncated or invalid
    fn decode(data: &[u8], offset: &mut usize) -> Result<Self>;
}

/// A decoded collection, as held in the container's cache.
pub trait Collection: Any + fmt::Debug + Send {
    /// Schema name shared by every instance of this collection type, the value
    /// [`Collection::type_name`] returns
    fn schema_name() -> &'static str
    where
        Self: Sized;

    /// Returns the schema name of the collection's entries
    fn type_name(&self) -> &str;

    /// Returns the number of entries
    fn len(&self) -> usize;

    /// Returns true if the collection holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the block encoding of the whole collection to `out`
    ///
    /// # Errors
    /// Returns an error if any entry can not be encoded
    fn encode(&self, out: &mut Vec<u8>) -> Result<()>;

    /// Returns the entry at `index` as [`Any`], for downcasting to the entry type
    fn entry(&self, index: usize) -> Option<&dyn Any>;

    /// Returns the codec that decodes blocks written by [`Collection::encode`]
    fn codec(&self) -> Arc<dyn Codec>;

    /// Returns this collection as [`Any`], to allow downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Returns this collection as mutable [`Any`], to allow downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Decoder for the blocks of one collection type.
pub trait Codec: Send + Sync {
    /// Returns the type name this codec decodes
    fn type_name(&self) -> &str;

    /// Decodes the data bytes of one payload block
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid encoding of this collection type
    fn decode(&self, data: &[u8]) -> Result<Box<dyn Collection>>;
}
