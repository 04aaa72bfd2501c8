//! Convenience re-exports — `use slotreg::prelude::*` for the common items.

pub use crate::config::{DEFAULT_FREE_LIST_REUSE_THRESHOLD, RegistryConfig};
pub use crate::cursor::Cursor;
pub use crate::entity::{Component, Entity, World};
pub use crate::error::RegistryError;
pub use crate::handle::{Handle, HandleFlags};
pub use crate::math::{Mat4, Quat, Transform, Vec3};
pub use crate::registry::Registry;

#[cfg(feature = "diagnostics")]
pub use crate::diag::RegistryStats;
