//! Registry statistics for diagnostics overlays and logs.
//!
//! Enabled by the `diagnostics` feature. [`Registry::stats`] takes a snapshot;
//! [`RegistryStats::to_json`] turns it into the JSON a telemetry viewer reads.

use serde::Serialize;

use crate::entity::World;
use crate::handle::HandleFlags;
use crate::registry::Registry;

/// A point-in-time summary of a registry's slot usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryStats {
    pub capacity: usize,
    pub alive: usize,
    /// Entries on the free list, stale ones included.
    pub free_list_len: usize,
    pub free_list_reuse_threshold: usize,
    /// Highest slot index holding a live item, `None` when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_live_index: Option<usize>,
    /// Share of dead slots below the highest live one, 0–100.
    pub fragmentation_pct: f32,
}

impl RegistryStats {
    pub fn to_json(&self) -> String {
        // A struct of plain numbers always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<T> Registry<T> {
    /// Snapshot slot usage.
    pub fn stats(&self) -> RegistryStats {
        let highest_live_index = self
            .handles()
            .iter()
            .rposition(|h| h.has_flag(HandleFlags::ALIVE));

        let fragmentation_pct = match highest_live_index {
            Some(highest) => {
                let span = highest + 1;
                (span - self.len()) as f32 / span as f32 * 100.0
            }
            None => 0.0,
        };

        RegistryStats {
            capacity: self.capacity(),
            alive: self.len(),
            free_list_len: self.free_list_len(),
            free_list_reuse_threshold: self.free_list_reuse_threshold(),
            highest_live_index,
            fragmentation_pct,
        }
    }
}

impl World {
    /// Snapshot the entity registry's slot usage.
    pub fn stats(&self) -> RegistryStats {
        self.registry().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;

    #[test]
    fn empty_registry() {
        let reg: Registry<u8> = Registry::new(4);
        let stats = reg.stats();
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.alive, 0);
        assert_eq!(stats.highest_live_index, None);
        assert_eq!(stats.fragmentation_pct, 0.0);
        assert_eq!(stats.free_list_reuse_threshold, 30);
    }

    #[test]
    fn fragmentation_counts_holes_below_highest_live_slot() {
        let mut reg: Registry<u8> = Registry::with_config(
            RegistryConfig::default()
                .with_capacity(8)
                .with_free_list_reuse_threshold(4),
        );
        let handles: Vec<_> = (0..4).map(|_| reg.create().1).collect();
        reg.free(handles[1]);

        let stats = reg.stats();
        assert_eq!(stats.alive, 3);
        assert_eq!(stats.free_list_len, 1);
        assert_eq!(stats.highest_live_index, Some(3));
        assert_eq!(stats.fragmentation_pct, 25.0);
    }

    #[test]
    fn json_snapshot() {
        let mut world = World::new(2);
        world.spawn();
        let json = world.stats().to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["capacity"], 2);
        assert_eq!(value["alive"], 1);
        assert_eq!(value["highest_live_index"], 0);
    }

    #[test]
    fn json_omits_highest_index_when_empty() {
        let reg: Registry<u8> = Registry::new(2);
        assert!(!reg.stats().to_json().contains("highest_live_index"));
    }
}
