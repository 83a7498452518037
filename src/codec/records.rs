use std::{any::Any, marker::PhantomData, ops::Index, sync::Arc};

use crate::{
    codec::{decode_seq, encode_seq, Codec, Collection, Entry},
    Result,
};

/// The stock collection: an ordered sequence of entries of one type.
///
/// Block layout: `u32 count` followed by `count` entry encodings.
///
/// # Examples
///
/// ```rust
/// use eventbuf::Records;
///
/// let mut energies: Records<f32> = Records::new();
/// energies.push(1.5);
/// energies.push(0.25);
/// assert_eq!(energies.len(), 2);
/// assert_eq!(energies[1], 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Records<T: Entry> {
    entries: Vec<T>,
}

impl<T: Entry> Records<T> {
    /// Creates an empty collection
    #[must_use]
    pub fn new() -> Self {
        Records {
            entries: Vec::new(),
        }
    }

    /// Appends an entry and returns its index
    pub fn push(&mut self, entry: T) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Returns the entry at `index`, if present
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// Returns a mutable reference to the entry at `index`, if present
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    /// Removes and returns the last entry
    pub fn pop(&mut self) -> Option<T> {
        self.entries.pop()
    }

    /// Shortens the collection to `len` entries
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the collection holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all entries
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Returns all entries as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Consumes the collection and returns its entries
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.entries
    }
}

impl<T: Entry> Default for Records<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entry> From<Vec<T>> for Records<T> {
    fn from(entries: Vec<T>) -> Self {
        Records { entries }
    }
}

impl<T: Entry> FromIterator<T> for Records<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Records {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Entry> Index<usize> for Records<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.entries[index]
    }
}

impl<'a, T: Entry> IntoIterator for &'a Records<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T: Entry> Collection for Records<T> {
    fn schema_name() -> &'static str {
        T::TYPE_NAME
    }

    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        encode_seq(&self.entries, out)
    }

    fn entry(&self, index: usize) -> Option<&dyn Any> {
        self.entries.get(index).map(|entry| entry as &dyn Any)
    }

    fn codec(&self) -> Arc<dyn Codec> {
        Arc::new(RecordsCodec::<T>::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Codec decoding blocks written by [`Records<T>`].
pub struct RecordsCodec<T> {
    _entry: PhantomData<fn() -> T>,
}

impl<T: Entry> RecordsCodec<T> {
    /// Creates the codec for `Records<T>`
    #[must_use]
    pub fn new() -> Self {
        RecordsCodec {
            _entry: PhantomData,
        }
    }
}

impl<T: Entry> Default for RecordsCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entry> Codec for RecordsCodec<T> {
    fn type_name(&self) -> &str {
        T::TYPE_NAME
    }

    fn decode(&self, data: &[u8]) -> Result<Box<dyn Collection>> {
        let mut offset = 0;
        let entries = decode_seq::<T>(data, &mut offset)?;
        if offset != data.len() {
            return Err(malformed_error!(
                "{} trailing bytes after {} entries of '{}'",
                data.len() - offset,
                entries.len(),
                T::TYPE_NAME
            ));
        }

        Ok(Box::new(Records { entries }))
    }
}
