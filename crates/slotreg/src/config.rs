//! Registry configuration.
//!
//! Capacity is fixed for the lifetime of a registry, so it has to be sized for
//! the worst-case number of simultaneously live objects. The free-list reuse
//! threshold trades slot-reuse speed against the chance that a just-freed
//! handle immediately aliases a new object:
//!
//! ```text
//! low threshold   → freed slots come back quickly, stale handles alias sooner
//! high threshold  → more linear scanning in create(), aliasing is rarer
//! ```
//!
//! Configs can be built in code or read from JSON:
//!
//! ```
//! use slotreg::config::RegistryConfig;
//!
//! let cfg = RegistryConfig::from_json_str(r#"{ "capacity": 64 }"#).unwrap();
//! assert_eq!(cfg.capacity, 64);
//! assert_eq!(cfg.free_list_reuse_threshold, 30);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::handle::MAX_INDEX;

/// Free-list length a registry waits for before reusing freed slots.
pub const DEFAULT_FREE_LIST_REUSE_THRESHOLD: usize = 30;

/// Capacity used by [`RegistryConfig::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of slots, allocated up front.
    pub capacity: usize,
    /// `create` pops the free list only while it holds *more* than this many
    /// entries; otherwise it scans for the first dead slot.
    pub free_list_reuse_threshold: usize,
}

impl RegistryConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_free_list_reuse_threshold(mut self, threshold: usize) -> Self {
        self.free_list_reuse_threshold = threshold;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the capacity is non-zero and addressable by a handle.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.capacity == 0 {
            return Err(RegistryError::ZeroCapacity);
        }
        if (self.capacity - 1) as u64 > MAX_INDEX {
            return Err(RegistryError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_INDEX + 1,
            });
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            free_list_reuse_threshold: DEFAULT_FREE_LIST_REUSE_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.free_list_reuse_threshold, 30);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let cfg = RegistryConfig::default()
            .with_capacity(8)
            .with_free_list_reuse_threshold(0);
        assert_eq!(cfg.capacity, 8);
        assert_eq!(cfg.free_list_reuse_threshold, 0);
    }

    #[test]
    fn json_fills_missing_fields() {
        let cfg = RegistryConfig::from_json_str(r#"{ "free_list_reuse_threshold": 4 }"#).unwrap();
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert_eq!(cfg.free_list_reuse_threshold, 4);
    }

    #[test]
    fn json_rejects_zero_capacity() {
        let err = RegistryConfig::from_json_str(r#"{ "capacity": 0 }"#).unwrap_err();
        assert_eq!(err, RegistryError::ZeroCapacity);
    }

    #[test]
    fn json_reports_parse_errors() {
        let err = RegistryConfig::from_json_str("{ capacity: ").unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
        assert!(err.to_string().starts_with("invalid registry config"));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn capacity_beyond_48_bits_is_rejected() {
        let cfg = RegistryConfig::default().with_capacity((MAX_INDEX as usize) + 2);
        assert!(matches!(
            cfg.validate(),
            Err(RegistryError::CapacityTooLarge { .. })
        ));
        let cfg = RegistryConfig::default().with_capacity((MAX_INDEX as usize) + 1);
        assert!(cfg.validate().is_ok());
    }
}
