use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every fallible operation of [`crate::EventContainer`] reports one of these variants to its
/// immediate caller. None of them is fatal; the container stays usable after any error, and an
/// operation that fails performs no mutation.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::NotFound`] - No collection exists under the requested name
/// - [`Error::OutOfRange`] - A reference points past the end of its collection
///
/// ## Type Errors
/// - [`Error::TypeConflict`] - A name is already bound to a different collection type
/// - [`Error::UnknownType`] - No codec is registered for a block's type name
///
/// ## Codec Errors
/// - [`Error::DecodeFailure`] - The bytes of a named block could not be decoded
/// - [`Error::EncodeFailure`] - A collection could not be serialized
///
/// ## Structural Errors
/// - [`Error::Malformed`] - The payload block directory is corrupt
/// - [`Error::OutOfBounds`] - A read or write would have left the buffer
/// - [`Error::InvalidName`] - A collection name is empty or too long
///
/// ## Precondition Errors
/// - [`Error::NoHeader`] - The unique identifier was requested before a header was set
///
/// # Examples
///
/// ```rust
/// use eventbuf::{Error, EventContainer};
///
/// let mut event = EventContainer::new();
/// match event.get("hits") {
///     Ok(collection) => println!("{} entries", collection.len()),
///     Err(Error::NotFound(name)) => println!("no collection named {name}"),
///     Err(e) => eprintln!("corrupt event: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No collection with the given name exists in the event.
    ///
    /// Returned by lookups, dereferencing and reference construction. Recoverable.
    #[error("No collection named '{0}'")]
    NotFound(String),

    /// An entry index lies outside the current bounds of its collection.
    ///
    /// This is how a dangling [`crate::Reference`] is reported once the collection it points
    /// into has shrunk.
    #[error("Index {index} is out of range for collection '{name}' with {len} entries")]
    OutOfRange {
        /// Name of the collection that was indexed
        name: String,
        /// The requested entry index
        index: usize,
        /// The current number of entries in the collection
        len: usize,
    },

    /// The name is already bound to a collection of a different type.
    ///
    /// Returned by [`crate::EventContainer::add`] (no mutation is performed) and by the typed
    /// accessors when the resident instance is not of the requested type.
    #[error("Collection '{name}' has type '{existing}', not '{requested}'")]
    TypeConflict {
        /// Name of the collection
        name: String,
        /// Type name currently bound to the collection
        existing: String,
        /// Type name that was requested
        requested: String,
    },

    /// The bytes of a named block could not be decoded by its codec.
    ///
    /// Distinct from [`Error::NotFound`]: the block exists, but its contents are corrupt.
    #[error("Failed to decode collection '{name}' - {source}")]
    DecodeFailure {
        /// Name of the collection that failed to decode
        name: String,
        /// The underlying failure reported by the codec
        #[source]
        source: Box<Error>,
    },

    /// A collection could not be serialized into its payload block.
    ///
    /// The payload is left untouched when this is returned.
    #[error("Failed to encode collection '{name}' - {message}")]
    EncodeFailure {
        /// Name of the collection that failed to encode
        name: String,
        /// Description of the failure
        message: String,
    },

    /// No codec is registered for the type name stored in a payload block.
    ///
    /// Register the entry type with [`crate::CodecRegistry::register`] before decoding
    /// payloads that were received over the wire.
    #[error("No codec registered for type '{0}'")]
    UnknownType(String),

    /// The collection name is empty or exceeds the configured maximum length.
    #[error("Invalid collection name - '{0}'")]
    InvalidName(String),

    /// The unique identifier was requested, but no header has been set.
    #[error("No header has been set on this event")]
    NoHeader,

    /// The payload is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// Source file that detected the malformation
        file: &'static str,
        /// Source line that detected the malformation
        line: u32,
    },

    /// An out of bound access was attempted while reading or writing a buffer.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,
}
