// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # eventbuf
//!
//! An in-memory container for one physics event: an optional header plus any number of named,
//! typed collections, all serialized into a single self-describing payload buffer.
//!
//! Collections are decoded lazily. The payload bytes are always authoritative; decoded
//! collections live in a per-event cache, are served from memory on repeated access and are
//! dropped as soon as the bytes underneath change. References name an entry of a collection
//! by collection name and index, and resolve through the same cache.
//!
//! ## Features
//!
//! - **Lazy decoding** - a collection is decoded on first access, never on load
//! - **Self-describing payload** - every block carries its name and type name
//! - **Pluggable codecs** - register any [`Entry`] type, or implement [`Collection`] and
//!   [`Codec`] for custom layouts
//! - **Write-back** - collections borrowed mutably are committed into the payload on demand
//! - **Raw access** - the payload can be resized and filled in place by an external reader
//!
//! ## Quick Start
//!
//! ```rust
//! use eventbuf::prelude::*;
//!
//! let mut event = EventContainer::new();
//! event.set_header(EventHeader::new(1001).with_run(7, 12));
//! event.add("energies", Records::from(vec![12.5f32, 3.0, 7.25]))?;
//!
//! // ship the bytes somewhere else ...
//! let bytes = event.payload().to_vec();
//!
//! // ... and read them back, decoding only what is asked for
//! let mut received = EventContainer::from_bytes(bytes)?;
//! assert_eq!(received.names()?, &["energies".to_string()]);
//!
//! let energies = received.get_as::<Records<f32>>("energies")?;
//! assert_eq!(energies[2], 7.25);
//! # Ok::<(), eventbuf::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`payload`] - the block layout, its directory and in-place block editing
//! - [`codec`] - entry, collection and codec traits, the stock [`Records`] collection and
//!   the [`CodecRegistry`]
//! - [`event`] - [`EventContainer`] and its residency cache
//! - [`header`], [`reference`] - event metadata and cross-collection references
//! - [`config`] - container behavior switches
//! - [`utils`] - bounds-checked little-endian helpers for writing codecs
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` for structural changes (add, remove, decode,
//! commit, cache invalidation), `trace` for cache hits and `warn` whenever uncommitted
//! modifications are dropped or the residency limit has to evict. Install any subscriber to
//! see them.
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use eventbuf::prelude::*;
///
/// let mut event = EventContainer::new();
/// event.add("ids", Records::from(vec![1u64, 2, 3]))?;
/// assert_eq!(event.get("ids")?.len(), 3);
/// # Ok::<(), eventbuf::Error>(())
/// ```
pub mod prelude;

pub mod codec;
pub mod config;
pub mod event;
pub mod header;
pub mod payload;
pub mod reference;
pub mod utils;

/// `eventbuf` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `eventbuf` Error type
///
/// # Examples
///
/// ```rust
/// use eventbuf::{Error, EventContainer};
///
/// let mut event = EventContainer::new();
/// match event.get("tracks") {
///     Err(Error::NotFound(name)) => assert_eq!(name, "tracks"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
pub use error::Error;

pub use codec::{Codec, CodecRegistry, Collection, Entry, Records, RecordsCodec};
pub use config::ContainerConfig;
pub use event::{EventContainer, Residency};
pub use header::{EventHeader, Header};
pub use reference::Reference;
