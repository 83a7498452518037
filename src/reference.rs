//! Cross-collection references.
//!
//! A [`Reference`] names one entry inside one collection of the same event: the collection
//! name plus the entry's position in it. Entries of one collection can embed references to
//! entries of another instead of carrying full copies, since [`Reference`] is itself an
//! [`crate::Entry`] with a compact wire form:
//!
//! ```text
//! u16 name_len | name (UTF-8) | u32 index
//! ```
//!
//! References are plain values. They stay meaningful across cache flushes and re-decoding,
//! because they never hold an address into decoded memory. They dangle once the target
//! collection is removed or shrinks; [`crate::EventContainer::dereference`] reports that as
//! [`crate::Error::NotFound`] or [`crate::Error::OutOfRange`].

use std::fmt;

use crate::{
    codec::Entry,
    utils::io::{push_le, read_le_at, read_str_at},
    Error, Result,
};

/// A reference to a single entry of a named collection.
///
/// Obtained from [`crate::EventContainer::make_reference`] and resolved with
/// [`crate::EventContainer::dereference`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    name: String,
    index: usize,
}

impl Reference {
    /// Creates a reference to entry `index` of the collection `name`.
    ///
    /// No validation happens here, use [`crate::EventContainer::make_reference`] to build a
    /// reference that is checked against the event.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Reference {
            name: name.into(),
            index,
        }
    }

    /// Returns the name of the referenced collection
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the position of the referenced entry within its collection
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reference(collection: {:?}, index: {})",
            self.name, self.index
        )
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

impl Entry for Reference {
    const TYPE_NAME: &'static str = "reference";

    fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let Ok(name_len) = u16::try_from(self.name.len()) else {
            return Err(Error::InvalidName(self.name.clone()));
        };
        let Ok(index) = u32::try_from(self.index) else {
            return Err(Error::OutOfBounds);
        };

        push_le(out, name_len);
        out.extend_from_slice(self.name.as_bytes());
        push_le(out, index);

        Ok(())
    }

    fn decode(data: &[u8], offset: &mut usize) -> Result<Self> {
        let name_len = read_le_at::<u16>(data, offset)?;
        let name = read_str_at(data, offset, name_len as usize)?;
        let index = read_le_at::<u32>(data, offset)?;

        Ok(Reference::new(name, index as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_reference_accessors() {
        let reference = Reference::new("hits", 3);
        assert_eq!(reference.name(), "hits");
        assert_eq!(reference.index(), 3);
    }

    #[test]
    fn test_reference_display() {
        let reference = Reference::new("tracks", 12);
        assert_eq!(format!("{}", reference), "tracks[12]");
    }

    #[test]
    fn test_reference_debug() {
        let reference = Reference::new("tracks", 12);
        let debug_str = format!("{:?}", reference);
        assert!(debug_str.contains("collection: \"tracks\""));
        assert!(debug_str.contains("index: 12"));
    }

    #[test]
    fn test_reference_ordering() {
        let first = Reference::new("a", 5);
        let second = Reference::new("b", 0);
        let third = Reference::new("b", 1);

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_reference_hash() {
        let mut map = HashMap::new();
        map.insert(Reference::new("hits", 0), "first");
        map.insert(Reference::new("hits", 1), "second");

        assert_eq!(map.get(&Reference::new("hits", 1)), Some(&"second"));
        assert_eq!(map.get(&Reference::new("hits", 2)), None);
    }

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x04, 0x00,
            b'h', b'i', b't', b's',
            0x07, 0x00, 0x00, 0x00,
        ];

        let mut offset = 0;
        let reference = Reference::decode(&data, &mut offset).unwrap();
        assert_eq!(reference, Reference::new("hits", 7));
        assert_eq!(offset, data.len());

        let mut encoded = Vec::new();
        reference.encode(&mut encoded).unwrap();
        assert_eq!(encoded, data);
    }

    #[test]
    fn crafted_truncated() {
        #[rustfmt::skip]
        let data = [
            0x04, 0x00,
            b'h', b'i', b't', b's',
            0x07, 0x00,
        ];

        let mut offset = 0;
        assert!(matches!(
            Reference::decode(&data, &mut offset),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn encode_rejects_oversized_name() {
        let reference = Reference::new("x".repeat(u16::MAX as usize + 1), 0);
        let mut out = Vec::new();
        assert!(matches!(
            reference.encode(&mut out),
            Err(Error::InvalidName(_))
        ));
    }
}
