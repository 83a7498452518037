//! The event container and its collection cache.
//!
//! An [`EventContainer`] owns one payload buffer of named blocks plus a cache of the
//! collections decoded from it. [`Residency`] reports where a collection currently lives.

mod cache;
mod container;

pub use cache::Residency;
pub use container::EventContainer;
