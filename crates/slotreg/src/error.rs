//! Errors returned by the fallible registry entry points.
//!
//! A stale handle is not an error: it resolves to `None`. These variants cover
//! the configuration mistakes that the panicking constructors and
//! [`Registry::create`](crate::registry::Registry::create) treat as fatal.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A registry was configured with zero slots.
    ZeroCapacity,
    /// More slots were requested than a 48-bit handle index can address.
    CapacityTooLarge { requested: usize, max: u64 },
    /// Every slot is alive; capacity is fixed at construction.
    Full { capacity: usize },
    /// The configuration document could not be parsed.
    Config(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::ZeroCapacity => write!(f, "registry capacity must be more than zero"),
            RegistryError::CapacityTooLarge { requested, max } => {
                write!(f, "registry capacity {requested} exceeds the {max} addressable slots")
            }
            RegistryError::Full { capacity } => {
                write!(f, "registry is full: all {capacity} slots are alive")
            }
            RegistryError::Config(e) => write!(f, "invalid registry config: {e}"),
        }
    }
}

impl std::error::Error for RegistryError {}
