//! # slotreg — Generational Object Registry
//!
//! A fixed-capacity store that hands out [`Handle`]s for the objects it
//! creates, resolves them in constant time, and rejects handles whose object
//! has been freed, even after the slot is reused.
//!
//! Start with `use slotreg::prelude::*`, or use [`Registry`] directly.
//!
//! ## Module Overview
//!
//! - [`handle`] — Packed 64-bit generational handles
//! - [`registry`] — Slot storage, creation, lookup and freeing
//! - [`cursor`] — Traversal that tolerates mutation between steps
//! - [`config`] — Capacity and free-list reuse settings
//! - [`entity`] — Entities with boxed components, stored in a registry
//! - [`math`] — glam re-exports and the `Transform` component
//! - `diag` — Slot-usage statistics (`diagnostics` feature)

pub mod config;
pub mod cursor;
pub mod entity;
pub mod error;
pub mod handle;
pub mod math;
pub mod prelude;
pub mod registry;

#[cfg(feature = "diagnostics")]
pub mod diag;

pub use handle::Handle;
pub use registry::Registry;
