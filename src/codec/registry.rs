use std::{collections::HashMap, fmt, sync::Arc};

use crate::{
    codec::{Codec, Collection, Entry, RecordsCodec},
    Error, Reference, Result,
};

/// Maps the type names stored in payload blocks to the codecs that decode them.
///
/// Adding a collection to an event registers its codec automatically. A registry only needs to
/// be prepared by hand for payloads that arrive as raw bytes, before any collection of that type
/// was added.
///
/// # Examples
///
/// ```rust
/// use eventbuf::{CodecRegistry, EventContainer, Records};
///
/// let mut registry = CodecRegistry::new();
/// registry.register::<f32>();
///
/// let mut source = EventContainer::new();
/// source.add("energies", Records::from(vec![0.5f32, 2.0]))?;
///
/// let mut target = EventContainer::with_registry(registry);
/// target.load(source.payload().to_vec())?;
/// assert_eq!(target.get_as::<Records<f32>>("energies")?.len(), 2);
/// # Ok::<(), eventbuf::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        CodecRegistry {
            codecs: HashMap::new(),
        }
    }

    /// Creates a registry that already knows `Records` of every primitive entry type and of
    /// [`Reference`]
    #[must_use]
    pub fn with_primitives() -> Self {
        let mut registry = CodecRegistry::new();
        registry
            .register::<u8>()
            .register::<u16>()
            .register::<u32>()
            .register::<u64>()
            .register::<i32>()
            .register::<i64>()
            .register::<f32>()
            .register::<f64>()
            .register::<bool>()
            .register::<String>()
            .register::<Reference>();
        registry
    }

    /// Registers the codec for `Records<T>`, keeping an existing codec of the same type name
    pub fn register<T: Entry>(&mut self) -> &mut Self {
        self.register_codec(Arc::new(RecordsCodec::<T>::new()));
        self
    }

    /// Registers `codec` under its type name.
    ///
    /// Returns `false`, leaving the registry unchanged, if a codec with that type name is
    /// already present.
    pub fn register_codec(&mut self, codec: Arc<dyn Codec>) -> bool {
        if self.codecs.contains_key(codec.type_name()) {
            return false;
        }

        self.codecs.insert(codec.type_name().to_string(), codec);
        true
    }

    /// Returns the codec registered for `type_name`
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Codec>> {
        self.codecs.get(type_name)
    }

    /// Returns true if a codec is registered for `type_name`
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.codecs.contains_key(type_name)
    }

    /// Decodes `data` with the codec registered for `type_name`
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownType`] if no codec is registered, or the codec's error
    pub fn decode(&self, type_name: &str, data: &[u8]) -> Result<Box<dyn Collection>> {
        match self.codecs.get(type_name) {
            Some(codec) => codec.decode(data),
            None => Err(Error::UnknownType(type_name.to_string())),
        }
    }

    /// Returns all registered type names, sorted
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered codecs
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns true if no codec is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
