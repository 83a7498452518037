use std::{any::Any, fmt};

use tracing::{debug, trace, warn};

use crate::{
    codec::{Codec, CodecRegistry, Collection, Entry},
    config::ContainerConfig,
    event::cache::{CollectionCache, Residency},
    header::Header,
    payload::{encode_block, Directory, Payload},
    Error, Reference, Result,
};

/// A single event: a header plus any number of named collections, all serialized into one
/// payload buffer.
///
/// The payload bytes are the source of truth. Decoded collections are cached on first access
/// and served from memory afterwards; any raw access to the buffer drops the cache, so the next
/// lookup decodes again.
///
/// All operations that may populate the cache take `&mut self`. A container is `Send`, but it
/// is not meant to be shared between threads.
///
/// # Examples
///
/// ```rust
/// use eventbuf::{EventContainer, EventHeader, Records};
///
/// let mut event = EventContainer::new();
/// event.set_header(EventHeader::new(1));
/// event.add("energies", Records::from(vec![1.5f32, 0.5]))?;
///
/// let reference = event.make_reference("energies", 1)?;
/// assert_eq!(event.dereference_as::<f32>(&reference)?, &0.5);
///
/// event.remove("energies")?;
/// assert!(event.names()?.is_empty());
/// # Ok::<(), eventbuf::Error>(())
/// ```
pub struct EventContainer {
    header: Option<Box<dyn Header>>,
    payload: Payload,
    cache: CollectionCache,
    /// Collection names in payload order; `None` once stale
    names: Option<Vec<String>>,
    registry: CodecRegistry,
    config: ContainerConfig,
}

impl EventContainer {
    /// Creates an empty event with the default configuration, able to decode collections of
    /// every primitive entry type
    #[must_use]
    pub fn new() -> Self {
        Self::build(CodecRegistry::with_primitives(), ContainerConfig::default())
    }

    /// Creates an empty event with the given configuration
    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        Self::build(CodecRegistry::with_primitives(), config)
    }

    /// Creates an empty event that decodes with `registry`
    #[must_use]
    pub fn with_registry(registry: CodecRegistry) -> Self {
        Self::build(registry, ContainerConfig::default())
    }

    /// Creates an event from raw payload bytes, e.g. as received from a network peer.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a valid sequence of blocks
    pub fn from_bytes(payload: Vec<u8>) -> Result<Self> {
        let mut event = Self::new();
        event.load(payload)?;
        Ok(event)
    }

    fn build(registry: CodecRegistry, config: ContainerConfig) -> Self {
        EventContainer {
            header: None,
            payload: Payload::new(),
            cache: CollectionCache::new(config.max_resident),
            names: None,
            registry,
            config,
        }
    }

    /// Returns the active configuration
    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns the codec registry
    #[must_use]
    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Returns the codec registry for registering additional entry types
    pub fn registry_mut(&mut self) -> &mut CodecRegistry {
        &mut self.registry
    }

    /// Replaces the payload with `payload`, dropping all cached state.
    ///
    /// With [`ContainerConfig::validate_on_load`] set, the block directory is checked first
    /// and invalid bytes are rejected without touching the current payload.
    ///
    /// # Errors
    /// Returns an error if validation is enabled and the bytes are malformed
    pub fn load(&mut self, payload: Vec<u8>) -> Result<()> {
        if self.config.validate_on_load {
            Directory::read(&payload)?;
        }

        self.invalidate("load");
        self.payload = Payload::from_vec(payload);
        Ok(())
    }

    /// Adds `collection` under `name`, replacing a collection of the same type.
    ///
    /// The collection is encoded into the payload immediately and stays resident in the cache.
    /// Its codec is registered, so the block can be decoded again after a cache flush.
    ///
    /// # Errors
    /// - [`Error::InvalidName`] for an empty or over-long name
    /// - [`Error::TypeConflict`] if `name` holds a collection of a different type
    /// - [`Error::EncodeFailure`] if the collection can not be encoded (or verified)
    ///
    /// No mutation is performed on error.
    pub fn add<C: Collection>(&mut self, name: &str, collection: C) -> Result<()> {
        self.validate_name(name)?;

        let requested = collection.type_name().to_string();
        if let Some(existing) = self.existing_type(name)? {
            if existing != requested {
                return Err(Error::TypeConflict {
                    name: name.to_string(),
                    existing,
                    requested,
                });
            }
        }

        let mut data = Vec::new();
        collection
            .encode(&mut data)
            .map_err(|error| encode_failure(name, &error))?;

        let codec = collection.codec();
        if self.config.verify_encoding {
            Self::verify(name, codec.as_ref(), &data, collection.len())?;
        }

        let block =
            encode_block(name, &requested, &data).map_err(|error| encode_failure(name, &error))?;
        self.payload.write_block(name, block)?;
        self.registry.register_codec(codec);
        self.cache.insert(name, Box::new(collection));
        self.names = None;

        debug!(
            collection = name,
            type_name = %requested,
            bytes = data.len(),
            payload = self.payload.len(),
            "added collection"
        );
        Ok(())
    }

    /// Removes the collection `name` from the cache and the payload.
    ///
    /// Returns `false` if there was nothing to remove. References into the removed collection
    /// dangle from here on.
    ///
    /// # Errors
    /// Returns an error if the payload directory is malformed
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let in_payload = self.payload.remove(name)?;
        let in_cache = self.cache.remove(name).is_some();
        if !(in_payload || in_cache) {
            return Ok(false);
        }

        self.names = None;
        debug!(
            collection = name,
            payload = self.payload.len(),
            "removed collection"
        );
        Ok(true)
    }

    /// Returns the collection `name`, decoding it from the payload if it is not resident.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the event has no such collection
    /// - [`Error::UnknownType`] if no codec is registered for the block's type
    /// - [`Error::DecodeFailure`] if the block bytes are corrupt
    pub fn get(&mut self, name: &str) -> Result<&dyn Collection> {
        self.ensure_resident(name)?;
        self.cache
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Returns the collection `name` as its concrete type `C`.
    ///
    /// # Errors
    /// Everything [`EventContainer::get`] returns, plus [`Error::TypeConflict`] if the
    /// collection is not a `C`
    pub fn get_as<C: Collection>(&mut self, name: &str) -> Result<&C> {
        let collection = self.get(name)?;
        collection
            .as_any()
            .downcast_ref::<C>()
            .ok_or_else(|| Error::TypeConflict {
                name: name.to_string(),
                existing: collection.type_name().to_string(),
                requested: C::schema_name().to_string(),
            })
    }

    /// Returns the collection `name` for modification.
    ///
    /// The collection is marked dirty; its changes reach the payload on
    /// [`EventContainer::commit`] or [`EventContainer::flush_cache`].
    ///
    /// # Errors
    /// Same as [`EventContainer::get`]
    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn Collection> {
        self.ensure_resident(name)?;
        self.cache
            .get_mut(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Returns the collection `name` for modification as its concrete type `C`.
    ///
    /// # Errors
    /// Same as [`EventContainer::get_as`]
    pub fn get_mut_as<C: Collection>(&mut self, name: &str) -> Result<&mut C> {
        let collection = self.get_mut(name)?;
        let existing = collection.type_name().to_string();
        match collection.as_any_mut().downcast_mut::<C>() {
            Some(concrete) => Ok(concrete),
            None => Err(Error::TypeConflict {
                name: name.to_string(),
                existing,
                requested: C::schema_name().to_string(),
            }),
        }
    }

    /// Returns the collection names in payload order.
    ///
    /// The list is cached and only recomputed after a structural change.
    ///
    /// # Errors
    /// Returns an error if the payload directory is malformed
    pub fn names(&mut self) -> Result<&[String]> {
        if self.names.is_none() {
            let names = self.payload.directory()?.names();
            trace!(count = names.len(), "recomputed collection names");
            self.names = Some(names);
        }

        Ok(self.names.as_deref().unwrap_or(&[]))
    }

    /// Returns true if the event holds a collection named `name`
    ///
    /// # Errors
    /// Returns an error if the payload directory is malformed
    pub fn contains(&self, name: &str) -> Result<bool> {
        if self.cache.contains(name) {
            return Ok(true);
        }
        Ok(self.payload.directory()?.find(name).is_some())
    }

    /// Returns true if the event holds no collections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty() && self.cache.len() == 0
    }

    /// Returns the cache state of the collection `name`
    #[must_use]
    pub fn residency(&self, name: &str) -> Residency {
        self.cache.residency(name)
    }

    /// Builds a reference to entry `index` of the collection `name`.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the collection does not exist in this event
    /// - [`Error::OutOfRange`] if `index` is not within the collection
    /// - any decoding error of [`EventContainer::get`]
    pub fn make_reference(&mut self, name: &str, index: usize) -> Result<Reference> {
        let len = self.get(name)?.len();
        if index >= len {
            return Err(Error::OutOfRange {
                name: name.to_string(),
                index,
                len,
            });
        }

        Ok(Reference::new(name, index))
    }

    /// Resolves `reference` to the entry it points at.
    ///
    /// # Errors
    /// - [`Error::NotFound`] if the referenced collection is gone
    /// - [`Error::OutOfRange`] if the collection no longer reaches the referenced index
    /// - any decoding error of [`EventContainer::get`]
    pub fn dereference(&mut self, reference: &Reference) -> Result<&dyn Any> {
        let collection = self.get(reference.name())?;
        collection
            .entry(reference.index())
            .ok_or_else(|| Error::OutOfRange {
                name: reference.name().to_string(),
                index: reference.index(),
                len: collection.len(),
            })
    }

    /// Resolves `reference` to an entry of type `T`.
    ///
    /// # Errors
    /// Everything [`EventContainer::dereference`] returns, plus [`Error::TypeConflict`] if
    /// the referenced collection does not hold `T` entries
    pub fn dereference_as<T: Entry>(&mut self, reference: &Reference) -> Result<&T> {
        let collection = self.get(reference.name())?;
        let entry = collection
            .entry(reference.index())
            .ok_or_else(|| Error::OutOfRange {
                name: reference.name().to_string(),
                index: reference.index(),
                len: collection.len(),
            })?;

        entry
            .downcast_ref::<T>()
            .ok_or_else(|| Error::TypeConflict {
                name: reference.name().to_string(),
                existing: collection.type_name().to_string(),
                requested: T::TYPE_NAME.to_string(),
            })
    }

    /// Returns the unique identifier of this event, as reported by its header.
    ///
    /// # Errors
    /// Returns [`Error::NoHeader`] if no header has been set
    pub fn unique_id(&self) -> Result<u64> {
        self.header
            .as_ref()
            .map(|header| header.unique_id())
            .ok_or(Error::NoHeader)
    }

    /// Takes ownership of `header`, returning the header it replaces
    pub fn set_header<H: Header>(&mut self, header: H) -> Option<Box<dyn Header>> {
        self.header.replace(Box::new(header))
    }

    /// Returns the current header
    #[must_use]
    pub fn header(&self) -> Option<&dyn Header> {
        self.header.as_deref()
    }

    /// Returns the current header as its concrete type `H`
    #[must_use]
    pub fn header_as<H: Header>(&self) -> Option<&H> {
        self.header()?.as_any().downcast_ref::<H>()
    }

    /// Removes and returns the current header
    pub fn take_header(&mut self) -> Option<Box<dyn Header>> {
        self.header.take()
    }

    /// Returns the payload size in bytes, always equal to `self.payload().len()`
    #[must_use]
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    /// Returns the raw payload bytes.
    ///
    /// Changes made through [`EventContainer::get_mut`] are only visible here after
    /// [`EventContainer::commit`].
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.payload.as_slice()
    }

    /// Resizes the payload to `size` bytes and returns the whole buffer for an external reader
    /// to fill.
    ///
    /// This drops every cached collection, including uncommitted modifications, since the bytes
    /// underneath may change completely. Every later lookup decodes again. The returned slice
    /// borrows the event, so it can not outlive the next resize.
    pub fn set_payload_size(&mut self, size: usize) -> &mut [u8] {
        self.invalidate("resize");
        self.payload.resize(size)
    }

    /// Returns the raw payload bytes for direct modification, dropping all cached state like
    /// [`EventContainer::set_payload_size`]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        self.invalidate("raw access");
        self.payload.as_mut_slice()
    }

    /// Returns the type name of `collection`, as stored in its payload block
    #[must_use]
    pub fn type_of<'c>(&self, collection: &'c dyn Collection) -> &'c str {
        collection.type_name()
    }

    /// Returns the type name of the collection `name` without decoding it
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if there is no such collection, or an error if the payload
    /// directory is malformed
    pub fn collection_type(&self, name: &str) -> Result<String> {
        self.existing_type(name)?
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Writes every modified collection back into the payload
    ///
    /// # Errors
    /// Returns [`Error::EncodeFailure`] if a modified collection can not be encoded. Collections
    /// committed before the failure stay committed, the failing one stays
    /// [`Residency::Dirty`] and can be fixed or removed before committing again.
    pub fn commit(&mut self) -> Result<()> {
        for name in self.cache.dirty_names() {
            let Some(collection) = self.cache.get(&name) else {
                continue;
            };

            let mut data = Vec::new();
            collection
                .encode(&mut data)
                .map_err(|error| encode_failure(&name, &error))?;
            let block = encode_block(&name, collection.type_name(), &data)
                .map_err(|error| encode_failure(&name, &error))?;

            self.payload.write_block(&name, block)?;
            self.cache.mark_clean(&name);
            debug!(collection = %name, bytes = data.len(), "committed collection");
        }

        Ok(())
    }

    /// Drops every cached collection, so that the next lookup decodes from the payload again.
    ///
    /// Modified collections are committed first; the payload bytes of unmodified collections
    /// are not touched.
    ///
    /// # Errors
    /// Same as [`EventContainer::commit`]; nothing is dropped on error
    pub fn flush_cache(&mut self) -> Result<()> {
        self.commit()?;

        let dropped = self.cache.clear();
        debug!(dropped, "flushed collection cache");
        Ok(())
    }

    /// Splits the event into its header and payload bytes.
    ///
    /// Only committed state is returned. Call [`EventContainer::commit`] first; modifications
    /// still pending here are dropped with a warning.
    #[must_use]
    pub fn into_parts(self) -> (Option<Box<dyn Header>>, Vec<u8>) {
        let dirty = self.cache.dirty_names();
        if !dirty.is_empty() {
            warn!(discarded = ?dirty, "dropping uncommitted collection changes");
        }

        (self.header, self.payload.into_vec())
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.len() > self.config.name_limit() {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(())
    }

    fn existing_type(&self, name: &str) -> Result<Option<String>> {
        if let Some(collection) = self.cache.get(name) {
            return Ok(Some(collection.type_name().to_string()));
        }

        Ok(self
            .payload
            .directory()?
            .find(name)
            .map(|block| block.type_name.clone()))
    }

    fn verify(name: &str, codec: &dyn Codec, data: &[u8], len: usize) -> Result<()> {
        let decoded = codec.decode(data).map_err(|error| Error::EncodeFailure {
            name: name.to_string(),
            message: format!("encoded block does not decode - {error}"),
        })?;

        if decoded.len() != len {
            return Err(Error::EncodeFailure {
                name: name.to_string(),
                message: format!("encoded {} entries, decoded {}", len, decoded.len()),
            });
        }
        Ok(())
    }

    fn ensure_resident(&mut self, name: &str) -> Result<()> {
        if self.cache.contains(name) {
            trace!(collection = name, "cache hit");
            return Ok(());
        }

        let Some((block, data)) = self.payload.block_data(name)? else {
            return Err(Error::NotFound(name.to_string()));
        };

        let collection = self
            .registry
            .decode(&block.type_name, data)
            .map_err(|error| match error {
                Error::UnknownType(_) => error,
                other => Error::DecodeFailure {
                    name: name.to_string(),
                    source: Box::new(other),
                },
            })?;

        debug!(
            collection = name,
            type_name = %block.type_name,
            entries = collection.len(),
            "decoded collection"
        );
        self.cache.insert(name, collection);
        Ok(())
    }

    fn invalidate(&mut self, reason: &str) {
        let dirty = self.cache.dirty_names();
        if !dirty.is_empty() {
            warn!(
                reason,
                discarded = ?dirty,
                "dropping uncommitted collection changes"
            );
        }

        let dropped = self.cache.clear();
        self.names = None;
        debug!(reason, dropped, "invalidated collection cache");
    }
}

fn encode_failure(name: &str, error: &Error) -> Error {
    Error::EncodeFailure {
        name: name.to_string(),
        message: error.to_string(),
    }
}

impl Default for EventContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContainer")
            .field("header", &self.header)
            .field("payload_size", &self.payload.len())
            .field("resident", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

impl fmt::Display for EventContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unique_id() {
            Ok(id) => writeln!(f, "Event {id}")?,
            Err(_) => writeln!(f, "Event (no header)")?,
        }

        match self.payload.directory() {
            Ok(directory) => {
                for block in directory.blocks() {
                    writeln!(
                        f,
                        "  {}: {} ({} bytes) [{}]",
                        block.name,
                        block.type_name,
                        block.size,
                        self.cache.residency(&block.name)
                    )?;
                }
                Ok(())
            }
            Err(error) => writeln!(f, "  <malformed payload: {error}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventHeader, Records};

    fn event_with_hits() -> EventContainer {
        let mut event = EventContainer::new();
        event
            .add("hits", Records::from(vec![10u32, 20, 30]))
            .unwrap();
        event
    }

    #[test]
    fn scenario() {
        let mut event = EventContainer::new();
        assert!(event.names().unwrap().is_empty());

        let hits = Records::from(vec![1u32, 2, 3]);
        event.add("hits", hits.clone()).unwrap();
        assert_eq!(event.names().unwrap(), &["hits".to_string()]);
        assert_eq!(event.get_as::<Records<u32>>("hits").unwrap(), &hits);

        assert!(event.remove("hits").unwrap());
        assert!(event.names().unwrap().is_empty());
        assert!(matches!(event.get("hits"), Err(Error::NotFound(_))));
        assert!(!event.remove("hits").unwrap());
        assert!(event.is_empty());
    }

    #[test]
    fn lazy_decode_after_flush() {
        let mut event = event_with_hits();
        assert_eq!(event.residency("hits"), Residency::Resident);

        event.flush_cache().unwrap();
        assert_eq!(event.residency("hits"), Residency::Absent);

        assert_eq!(event.get("hits").unwrap().len(), 3);
        assert_eq!(event.residency("hits"), Residency::Resident);
    }

    #[test]
    fn add_rejects_type_change() {
        let mut event = event_with_hits();
        let before = event.payload().to_vec();

        let result = event.add("hits", Records::from(vec![1.0f64]));
        assert!(matches!(
            result,
            Err(Error::TypeConflict { ref existing, ref requested, .. })
                if existing == "u32" && requested == "f64"
        ));
        assert_eq!(event.payload(), before.as_slice());

        // the conflict is also detected against a non-resident block
        event.flush_cache().unwrap();
        assert!(event.add("hits", Records::from(vec![true])).is_err());
    }

    #[test]
    fn add_rejects_invalid_names() {
        let mut event = EventContainer::with_config(ContainerConfig::strict());

        assert!(matches!(
            event.add("", Records::from(vec![1u8])),
            Err(Error::InvalidName(_))
        ));
        assert!(matches!(
            event.add(&"n".repeat(65), Records::from(vec![1u8])),
            Err(Error::InvalidName(_))
        ));
        assert!(event.is_empty());
    }

    #[test]
    fn overwrite_same_type() {
        let mut event = event_with_hits();
        event.add("hits", Records::from(vec![7u32])).unwrap();
        event.flush_cache().unwrap();

        assert_eq!(event.names().unwrap().len(), 1);
        assert_eq!(
            event.get_as::<Records<u32>>("hits").unwrap().as_slice(),
            &[7]
        );
    }

    #[test]
    fn references() {
        let mut event = event_with_hits();

        let reference = event.make_reference("hits", 2).unwrap();
        assert_eq!(event.dereference_as::<u32>(&reference).unwrap(), &30);

        event.flush_cache().unwrap();
        let entry = event.dereference(&reference).unwrap();
        assert_eq!(entry.downcast_ref::<u32>(), Some(&30));

        assert!(matches!(
            event.make_reference("hits", 3),
            Err(Error::OutOfRange { index: 3, len: 3, .. })
        ));
        assert!(matches!(
            event.make_reference("tracks", 0),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            event.dereference_as::<u64>(&reference),
            Err(Error::TypeConflict { .. })
        ));
    }

    #[test]
    fn dangling_after_shrink() {
        let mut event = event_with_hits();
        let reference = event.make_reference("hits", 2).unwrap();

        event.add("hits", Records::from(vec![1u32])).unwrap();
        assert!(matches!(
            event.dereference(&reference),
            Err(Error::OutOfRange { index: 2, len: 1, .. })
        ));

        event.remove("hits").unwrap();
        assert!(matches!(
            event.dereference(&reference),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn header_ownership() {
        let mut event = EventContainer::new();
        assert!(matches!(event.unique_id(), Err(Error::NoHeader)));

        assert!(event.set_header(EventHeader::new(1)).is_none());
        let previous = event.set_header(EventHeader::new(2)).unwrap();

        assert_eq!(previous.unique_id(), 1);
        assert_eq!(event.unique_id().unwrap(), 2);
        assert_eq!(event.header_as::<EventHeader>().unwrap().id, 2);

        assert!(event.take_header().is_some());
        assert!(event.header().is_none());
    }

    #[test]
    fn raw_resize_invalidates() {
        let mut event = event_with_hits();
        let bytes = event.payload().to_vec();

        let mut other = EventContainer::new();
        other.add("stale", Records::from(vec![0u8])).unwrap();
        assert_eq!(other.names().unwrap().len(), 1);

        let buffer = other.set_payload_size(bytes.len());
        buffer.copy_from_slice(&bytes);

        assert_eq!(other.residency("stale"), Residency::Absent);
        assert_eq!(other.payload_size(), other.payload().len());
        assert_eq!(other.names().unwrap(), &["hits".to_string()]);
        assert_eq!(
            other.get_as::<Records<u32>>("hits").unwrap().as_slice(),
            &[10, 20, 30]
        );
    }

    #[test]
    fn mutation_is_committed() {
        let mut event = event_with_hits();

        event
            .get_mut_as::<Records<u32>>("hits")
            .unwrap()
            .push(40);
        assert_eq!(event.residency("hits"), Residency::Dirty);

        event.flush_cache().unwrap();
        assert_eq!(event.get("hits").unwrap().len(), 4);
    }

    #[test]
    fn mutation_is_dropped_by_raw_access() {
        let mut event = event_with_hits();
        let bytes = event.payload().to_vec();

        event
            .get_mut_as::<Records<u32>>("hits")
            .unwrap()
            .truncate(0);
        event.payload_mut();

        assert_eq!(event.payload(), bytes.as_slice());
        assert_eq!(event.get("hits").unwrap().len(), 3);
    }

    #[test]
    fn unknown_and_corrupt_blocks() {
        let mut source = EventContainer::new();
        source.add("hits", Records::from(vec![1u32, 2])).unwrap();
        let mut bytes = source.payload().to_vec();

        let mut event = EventContainer::with_registry(CodecRegistry::new());
        event.load(bytes.clone()).unwrap();
        assert!(matches!(event.get("hits"), Err(Error::UnknownType(_))));

        // claim three entries where there are two
        let count_offset = bytes.len() - 12;
        bytes[count_offset] = 3;
        let mut event = EventContainer::from_bytes(bytes).unwrap();
        assert!(matches!(
            event.get("hits"),
            Err(Error::DecodeFailure { ref name, .. }) if name == "hits"
        ));
    }

    #[test]
    fn load_validates() {
        let mut event = event_with_hits();
        let before = event.payload().to_vec();

        assert!(event.load(vec![0x01]).is_err());
        assert_eq!(event.payload(), before.as_slice());

        let mut lenient = EventContainer::with_config(ContainerConfig::minimal());
        lenient.load(vec![0x01]).unwrap();
        assert!(lenient.names().is_err());
    }

    #[test]
    fn verify_encoding() {
        #[derive(Debug)]
        struct Lossy;

        impl Collection for Lossy {
            fn schema_name() -> &'static str {
                "u8"
            }
            fn type_name(&self) -> &str {
                "u8"
            }
            fn len(&self) -> usize {
                2
            }
            fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
                Records::from(vec![1u8]).encode(out)
            }
            fn entry(&self, _index: usize) -> Option<&dyn Any> {
                None
            }
            fn codec(&self) -> std::sync::Arc<dyn Codec> {
                Records::<u8>::new().codec()
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let mut lenient = EventContainer::new();
        assert!(lenient.add("lossy", Lossy).is_ok());

        let mut strict = EventContainer::with_config(ContainerConfig::strict());
        assert!(matches!(
            strict.add("lossy", Lossy),
            Err(Error::EncodeFailure { .. })
        ));
        assert!(strict.is_empty());
    }

    #[test]
    fn add_rejects_unencodable_entries() {
        let mut event = event_with_hits();
        let before = event.payload().to_vec();

        let oversized = Records::from(vec![Reference::new("x".repeat(70_000), 0)]);
        assert!(matches!(
            event.add("refs", oversized),
            Err(Error::EncodeFailure { ref name, .. }) if name == "refs"
        ));

        assert_eq!(event.payload(), before.as_slice());
        assert_eq!(event.names().unwrap(), &["hits"]);
        assert_eq!(event.residency("refs"), Residency::Absent);
    }

    #[test]
    fn add_reports_block_limits_as_encode_failure() {
        #[derive(Debug)]
        struct Untyped {
            type_name: String,
        }

        impl Collection for Untyped {
            fn schema_name() -> &'static str {
                "untyped"
            }
            fn type_name(&self) -> &str {
                &self.type_name
            }
            fn len(&self) -> usize {
                0
            }
            fn encode(&self, _out: &mut Vec<u8>) -> Result<()> {
                Ok(())
            }
            fn entry(&self, _index: usize) -> Option<&dyn Any> {
                None
            }
            fn codec(&self) -> std::sync::Arc<dyn Codec> {
                Records::<u8>::new().codec()
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let mut event = EventContainer::new();
        let collection = Untyped {
            type_name: "t".repeat(usize::from(u16::MAX) + 1),
        };

        assert!(matches!(
            event.add("untyped", collection),
            Err(Error::EncodeFailure { ref name, .. }) if name == "untyped"
        ));
        assert!(event.is_empty());
    }

    #[test]
    fn typed_access_reports_schema_names() {
        let mut event = event_with_hits();

        assert!(matches!(
            event.get_as::<Records<f64>>("hits"),
            Err(Error::TypeConflict { ref existing, ref requested, .. })
                if existing == "u32" && requested == "f64"
        ));
        assert!(matches!(
            event.get_mut_as::<Records<String>>("hits"),
            Err(Error::TypeConflict { ref existing, ref requested, .. })
                if existing == "u32" && requested == "string"
        ));
    }

    #[test]
    fn display() {
        let mut event = event_with_hits();
        event.set_header(EventHeader::new(77));
        event.add("flags", Records::from(vec![true])).unwrap();
        event.flush_cache().unwrap();
        event.get("flags").unwrap();

        let printed = event.to_string();
        assert!(printed.starts_with("Event 77\n"));
        assert!(printed.contains("  hits: u32 (16 bytes) [absent]"));
        assert!(printed.contains("  flags: bool (5 bytes) [resident]"));
    }

    #[test]
    fn into_parts() {
        let mut event = event_with_hits();
        event.set_header(EventHeader::new(3));
        event.get_mut_as::<Records<u32>>("hits").unwrap().push(1);
        event.commit().unwrap();

        let (header, payload) = event.into_parts();
        assert_eq!(header.unwrap().unique_id(), 3);

        let mut restored = EventContainer::from_bytes(payload).unwrap();
        assert_eq!(restored.get("hits").unwrap().len(), 4);
    }

    #[test]
    fn into_parts_returns_committed_state() {
        let mut event = event_with_hits();
        event.set_header(EventHeader::new(3));
        let committed = event.payload().to_vec();

        event.get_mut_as::<Records<u32>>("hits").unwrap().push(1);
        let (_, payload) = event.into_parts();

        assert_eq!(payload, committed);
    }

    #[test]
    fn failed_commit_keeps_event() {
        let mut event = event_with_hits();
        event.set_header(EventHeader::new(5));
        event
            .add("refs", Records::from(vec![Reference::new("hits", 0)]))
            .unwrap();
        let committed = event.payload().to_vec();

        event
            .get_mut_as::<Records<Reference>>("refs")
            .unwrap()
            .push(Reference::new("y".repeat(70_000), 0));

        assert!(matches!(
            event.commit(),
            Err(Error::EncodeFailure { ref name, .. }) if name == "refs"
        ));
        assert!(event.flush_cache().is_err());
        assert_eq!(event.residency("refs"), Residency::Dirty);
        assert_eq!(event.payload(), committed.as_slice());
        assert_eq!(event.unique_id().unwrap(), 5);

        event.get_mut_as::<Records<Reference>>("refs").unwrap().pop();
        event.commit().unwrap();

        let (header, payload) = event.into_parts();
        assert_eq!(header.unwrap().unique_id(), 5);

        let mut restored = EventContainer::from_bytes(payload).unwrap();
        assert_eq!(restored.get("hits").unwrap().len(), 3);
        assert_eq!(restored.get("refs").unwrap().len(), 1);
    }
}
