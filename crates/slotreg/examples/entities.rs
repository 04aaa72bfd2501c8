//! Entities — a small solar system kept in a `World`.
//!
//! Spawns a sun with orbiting planets and moons as child entities, steps the
//! world a few frames, then despawns a planet with its moons and shows that
//! the old handles stop resolving.
//!
//! Run with: `RUST_LOG=debug cargo run -p slotreg --example entities`

use slotreg::prelude::*;

// ── Orbit component ─────────────────────────────────────────────────────

struct Orbit {
    speed: f32,
    angle: f32,
}

impl Component for Orbit {
    fn name(&self) -> &str {
        "Orbit"
    }

    fn update(&mut self, dt: f32) {
        self.angle = (self.angle + self.speed * dt) % std::f32::consts::TAU;
    }

    fn destroy(&mut self) {
        log::debug!("orbit stopped at {:.2} rad", self.angle);
    }
}

fn main() {
    env_logger::init();

    let mut world = World::new(64);

    let sun = world.spawn();
    world.get_mut(sun).unwrap().add_comp(Transform::default().with_scale(6.0));

    let mut planets = Vec::new();
    for (i, speed) in [1.0, 0.6, 0.4].into_iter().enumerate() {
        let planet = world.spawn_child(sun);
        let entity = world.get_mut(planet).unwrap();
        entity.add_comp(Transform::from_xyz(100.0 * (i as f32 + 1.0), 0.0, 0.0));
        entity.add_comp(Orbit { speed, angle: 0.0 });

        let moon = world.spawn_child(planet);
        world.get_mut(moon).unwrap().add_comp(Orbit { speed: 2.5, angle: 0.0 });
        planets.push((planet, moon));
    }

    for _ in 0..60 {
        world.update(1.0 / 60.0);
    }

    for (planet, _) in &planets {
        let orbit = world.get(*planet).unwrap().comp::<Orbit>().unwrap();
        log::info!("planet {planet} at {:.2} rad", orbit.angle);
    }

    let (doomed, doomed_moon) = planets[1];
    let removed = world.despawn_recursive(doomed);
    log::info!("despawned planet {doomed} and its moon: {removed} entities");
    assert!(world.get(doomed).is_none());
    assert!(world.get(doomed_moon).is_none());

    let comet = world.spawn();
    log::info!("comet spawned as {comet}; {doomed} still resolves: {}", world.is_alive(doomed));

    log::info!("{}", world.stats().to_json());
}
