//! # eventbuf Prelude
//!
//! The types needed to build, fill, ship and read events, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all eventbuf operations
pub use crate::Error;

/// The result type used throughout eventbuf
pub use crate::Result;

/// Behavior switches of a container
pub use crate::ContainerConfig;

// ================================================================================================
// Event
// ================================================================================================

/// An event: header, payload and collection cache
pub use crate::EventContainer;

/// Cache state of a collection
pub use crate::Residency;

/// Event metadata
pub use crate::{EventHeader, Header};

/// Handle to one entry of a named collection
pub use crate::Reference;

// ================================================================================================
// Collections and Codecs
// ================================================================================================

/// Record, collection and decoder capabilities
pub use crate::{Codec, Collection, Entry};

/// The stock collection and its codec
pub use crate::{Records, RecordsCodec};

/// Type name to codec lookup
pub use crate::CodecRegistry;
