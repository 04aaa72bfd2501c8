//! Churn — how the free-list reuse threshold delays slot reuse.
//!
//! Creates and frees objects in a loop with a low and a high threshold and
//! reports how soon a freed slot index comes back. Also walks the registry
//! with a cursor while freeing behind it.
//!
//! Run with: `RUST_LOG=trace cargo run -p slotreg --example churn`

use std::collections::HashMap;

use slotreg::prelude::*;

#[derive(Default)]
struct Particle {
    ttl: u32,
}

fn main() {
    env_logger::init();

    for threshold in [0, 30] {
        let config = RegistryConfig::default()
            .with_capacity(128)
            .with_free_list_reuse_threshold(threshold);
        let mut particles: Registry<Particle> = Registry::with_config(config);

        // Frame at which each slot was last freed.
        let mut freed_at: HashMap<u64, usize> = HashMap::new();
        let mut reuse_gaps = Vec::new();

        for frame in 0..500 {
            for _ in 0..4 {
                if particles.is_full() {
                    break;
                }
                let (particle, handle) = particles.create();
                particle.ttl = 5 + (frame % 7) as u32;
                if let Some(freed) = freed_at.remove(&handle.index()) {
                    reuse_gaps.push(frame - freed);
                }
            }

            let mut cursor = particles.cursor();
            while let Some(handle) = cursor.next_handle(&particles) {
                let particle = &mut particles[handle];
                particle.ttl = particle.ttl.saturating_sub(1);
                if particle.ttl == 0 {
                    particles.free(handle);
                    freed_at.insert(handle.index(), frame);
                }
            }
        }

        let avg = reuse_gaps.iter().sum::<usize>() as f32 / reuse_gaps.len().max(1) as f32;
        log::info!(
            "threshold {threshold}: {} reuses, average {avg:.1} frames between free and reuse",
            reuse_gaps.len()
        );
        log::info!("{:?}", particles.stats());
    }
}
