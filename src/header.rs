//! Event header capability.
//!
//! The container treats its header as an opaque, exclusively owned metadata block. The only
//! thing it ever asks of a header is its unique identifier; everything else (run bookkeeping,
//! timestamps, descriptions) is the business of the concrete header type.
//!
//! [`EventHeader`] is the stock implementation, but any `Debug + Send + 'static` type can be
//! used by implementing [`Header`].

use std::{any::Any, fmt};

/// Metadata block attached to an event.
///
/// Ownership is transferred into the container with [`crate::EventContainer::set_header`],
/// which hands back the previously owned header.
pub trait Header: Any + fmt::Debug + Send {
    /// Returns the identifier that uniquely names this event
    fn unique_id(&self) -> u64;

    /// Returns this header as [`Any`], to allow downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Default header carrying the event identity.
///
/// # Examples
///
/// ```rust
/// use eventbuf::{EventContainer, EventHeader};
///
/// let mut event = EventContainer::new();
/// event.set_header(EventHeader::new(42).with_run(7, 1001));
/// assert_eq!(event.unique_id()?, 42);
/// # Ok::<(), eventbuf::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventHeader {
    /// Unique identifier of the event
    pub id: u64,
    /// Number of the run this event was recorded in
    pub run_number: u64,
    /// Sequence number of the event within its run
    pub event_number: u64,
    /// Acquisition timestamp, in nanoseconds since the unix epoch
    pub timestamp: u64,
}

impl EventHeader {
    /// Creates a header with the given unique identifier and all other fields zeroed
    #[must_use]
    pub fn new(id: u64) -> Self {
        EventHeader {
            id,
            ..Default::default()
        }
    }

    /// Sets the run and event numbers
    #[must_use]
    pub fn with_run(mut self, run_number: u64, event_number: u64) -> Self {
        self.run_number = run_number;
        self.event_number = event_number;
        self
    }

    /// Sets the acquisition timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl Header for EventHeader {
    fn unique_id(&self) -> u64 {
        self.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let header = EventHeader::new(9).with_run(2, 40).with_timestamp(1_000);

        assert_eq!(header.unique_id(), 9);
        assert_eq!(header.run_number, 2);
        assert_eq!(header.event_number, 40);
        assert_eq!(header.timestamp, 1_000);
    }

    #[test]
    fn downcast() {
        let header: Box<dyn Header> = Box::new(EventHeader::new(5));
        let concrete = header.as_any().downcast_ref::<EventHeader>().unwrap();
        assert_eq!(concrete.id, 5);
    }
}
