//! Container configuration
//!
//! This module provides the knobs that control how much checking an
//! [`crate::EventContainer`] performs when payload bytes enter it, and how much decoded
//! state it is allowed to keep resident.

/// Configuration for an [`crate::EventContainer`]
///
/// The container always validates what it needs to serve a request (block bounds, names,
/// codec results). These settings add eager checks on top, or bound memory use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Scan and validate the complete block directory when raw payload bytes are loaded
    /// through [`crate::EventContainer::load`] / [`crate::EventContainer::from_bytes`].
    /// When disabled, corruption is only reported once the damaged part is accessed.
    pub validate_on_load: bool,

    /// Decode freshly encoded bytes once before they are written into the payload.
    /// Catches codecs whose `encode` and `decode` disagree, at the cost of one extra decode
    /// per add.
    pub verify_encoding: bool,

    /// Maximum length of a collection name in bytes (default: 255, never above `u16::MAX`)
    pub max_name_length: usize,

    /// Maximum number of resident decoded collections, `0` for unbounded (default: 0)
    /// When exceeded, the oldest clean entry is evicted; it is decoded again on next access.
    pub max_resident: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            validate_on_load: true,
            verify_encoding: false,
            max_name_length: 255,
            max_resident: 0,
        }
    }
}

impl ContainerConfig {
    /// Creates a minimal configuration for maximum throughput
    ///
    /// Skips eager validation of loaded payloads and verification of encoded blocks.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            validate_on_load: false,
            verify_encoding: false,
            max_name_length: u16::MAX as usize,
            max_resident: 0,
        }
    }

    /// Creates a configuration with all checks enabled and short collection names
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_on_load: true,
            verify_encoding: true,
            max_name_length: 64,
            max_resident: 0,
        }
    }

    /// Creates the default configuration with at most `max_resident` decoded collections
    #[must_use]
    pub fn bounded(max_resident: usize) -> Self {
        Self {
            max_resident,
            ..Self::default()
        }
    }

    /// Returns the effective name length limit, clamped to what a block header can store
    #[must_use]
    pub fn name_limit(&self) -> usize {
        self.max_name_length.min(u16::MAX as usize)
    }
}
