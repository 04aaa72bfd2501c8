//! # Entities — Components Stored Behind Handles
//!
//! The [`World`] keeps every [`Entity`] in a [`Registry`], so the rest of the
//! program refers to entities by [`Handle`] only. Parent/child links are
//! handles too: a despawned parent leaves its children holding a stale handle
//! rather than a dangling reference.
//!
//! ```text
//! World
//!  └─ Registry<Entity>
//!       slot 0: Entity { id: 0v1, parent: none, children: [1v1], comps: [Transform] }
//!       slot 1: Entity { id: 1v1, parent: 0v1,  children: [],    comps: [Transform, Spin] }
//! ```
//!
//! ## Components
//!
//! A [`Component`] is a boxed trait object owned by its entity. An entity
//! carries at most one component of each concrete type. Lookup is by type,
//! through `Any` downcasting, and scans the entity's short component list.
//!
//! ## Usage
//!
//! ```
//! use slotreg::prelude::*;
//!
//! let mut world = World::new(16);
//! let ship = world.spawn();
//! world.get_mut(ship).unwrap().add_comp(Transform::from_xyz(1.0, 0.0, 0.0));
//! let turret = world.spawn_child(ship);
//!
//! assert_eq!(world.get(turret).unwrap().parent(), ship);
//! world.despawn_recursive(ship);
//! assert!(world.get(turret).is_none());
//! ```

use std::any::Any;
use std::fmt;

use crate::config::RegistryConfig;
use crate::handle::Handle;
use crate::registry::Registry;

/// Behavior attached to an [`Entity`].
///
/// Only [`name`](Component::name) is required. The lifecycle hooks default to
/// doing nothing.
pub trait Component: Any {
    /// Human-readable name, used in logs and debug output.
    fn name(&self) -> &str;

    /// Called once when the component is attached to the entity `owner`.
    fn init(&mut self, _owner: Handle) {}

    /// Called by [`World::update`] for every live entity.
    fn update(&mut self, _dt: f32) {}

    /// Called when the component is removed or its entity is despawned.
    fn destroy(&mut self) {}
}

/// An object in the [`World`]: an id, hierarchy links, and its components.
#[derive(Default)]
pub struct Entity {
    id: Handle,
    parent: Handle,
    children: Vec<Handle>,
    comps: Vec<Box<dyn Component>>,
}

impl Entity {
    /// This entity's own handle.
    pub fn id(&self) -> Handle {
        self.id
    }

    /// The parent's handle, or [`Handle::ZERO`] for a root entity. May be
    /// stale if the parent was despawned without its children.
    pub fn parent(&self) -> Handle {
        self.parent
    }

    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Attach a component and call its [`init`](Component::init) hook.
    ///
    /// # Panics
    ///
    /// Panics if the entity already has a component of type `C`.
    pub fn add_comp<C: Component>(&mut self, comp: C) -> &mut C {
        assert!(
            !self.has_comp::<C>(),
            "Entity {} already has component `{}`",
            self.id,
            comp.name()
        );

        let mut boxed: Box<dyn Component> = Box::new(comp);
        boxed.init(self.id);
        self.comps.push(boxed);

        self.comp_mut::<C>().unwrap_or_else(|| {
            unreachable!("component `{}` was just attached", std::any::type_name::<C>())
        })
    }

    pub fn has_comp<C: Component>(&self) -> bool {
        self.comps.iter().any(|c| (c.as_ref() as &dyn Any).is::<C>())
    }

    /// The component of type `C`, if attached.
    pub fn comp<C: Component>(&self) -> Option<&C> {
        self.comps
            .iter()
            .find_map(|c| (c.as_ref() as &dyn Any).downcast_ref::<C>())
    }

    pub fn comp_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.comps
            .iter_mut()
            .find_map(|c| (c.as_mut() as &mut dyn Any).downcast_mut::<C>())
    }

    /// All components of type `C`. [`add_comp`](Self::add_comp) allows one per
    /// type, so this only differs from [`comp`](Self::comp) for components
    /// pushed through [`add_boxed`](Self::add_boxed).
    pub fn comps_of<C: Component>(&self) -> Vec<&C> {
        self.comps
            .iter()
            .filter_map(|c| (c.as_ref() as &dyn Any).downcast_ref::<C>())
            .collect()
    }

    /// Attach an already-boxed component without the one-per-type check.
    /// Calls its [`init`](Component::init) hook.
    pub fn add_boxed(&mut self, mut comp: Box<dyn Component>) {
        comp.init(self.id);
        self.comps.push(comp);
    }

    /// Names of all attached components, in attach order.
    pub fn comp_names(&self) -> impl Iterator<Item = &str> {
        self.comps.iter().map(|c| c.name())
    }

    /// Call [`destroy`](Component::destroy) on the component of type `C` and
    /// remove it. Returns `false` if there was none.
    pub fn destroy_comp<C: Component>(&mut self) -> bool {
        let Some(pos) = self
            .comps
            .iter()
            .position(|c| (c.as_ref() as &dyn Any).is::<C>())
        else {
            return false;
        };
        let mut comp = self.comps.remove(pos);
        comp.destroy();
        true
    }

    fn update(&mut self, dt: f32) {
        for comp in &mut self.comps {
            comp.update(dt);
        }
    }

    fn destroy_all(&mut self) {
        for comp in &mut self.comps {
            comp.destroy();
        }
        self.comps.clear();
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("comps", &self.comp_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Owns all entities. Fixed capacity, like the [`Registry`] underneath.
pub struct World {
    entities: Registry<Entity>,
}

impl World {
    /// Create a world with room for `capacity` entities.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            entities: Registry::new(capacity),
        }
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entities: Registry::with_config(config),
        }
    }

    /// Spawn an empty root entity.
    ///
    /// # Panics
    ///
    /// Panics if the world is full.
    pub fn spawn(&mut self) -> Handle {
        let (entity, handle) = self.entities.create();
        entity.id = handle;
        handle
    }

    /// Spawn an empty entity as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not alive, or the world is full.
    pub fn spawn_child(&mut self, parent: Handle) -> Handle {
        assert!(
            self.entities.contains(parent),
            "Can not spawn a child of {parent:?}: parent is not alive"
        );
        let child = self.spawn();
        if let Some(entity) = self.entities.get_mut(child) {
            entity.parent = parent;
        }
        if let Some(entity) = self.entities.get_mut(parent) {
            entity.children.push(child);
        }
        child
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.entities.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.entities.get_mut(handle)
    }

    pub fn is_alive(&self, handle: Handle) -> bool {
        self.entities.contains(handle)
    }

    /// Despawn one entity. Its components are destroyed, it is unlinked from
    /// its parent, and its children become roots. Returns `false` if the
    /// handle was already stale.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        let Some(mut entity) = self.entities.remove(handle) else {
            return false;
        };
        entity.destroy_all();

        if let Some(parent) = self.entities.get_mut(entity.parent) {
            parent.children.retain(|c| *c != handle);
        }
        for child in entity.children {
            if let Some(child) = self.entities.get_mut(child) {
                child.parent = Handle::ZERO;
            }
        }
        log::trace!("despawned entity {handle}");
        true
    }

    /// Despawn an entity and all its descendants. Returns how many were removed.
    pub fn despawn_recursive(&mut self, handle: Handle) -> usize {
        let mut subtree = Vec::new();
        let mut stack = vec![handle];
        while let Some(next) = stack.pop() {
            if let Some(entity) = self.entities.get(next) {
                subtree.push(next);
                stack.extend_from_slice(&entity.children);
            }
        }

        // Leaves first, so each despawn only has live links to fix up above it.
        subtree
            .iter()
            .rev()
            .filter(|h| self.despawn(**h))
            .count()
    }

    /// Despawn every entity.
    pub fn despawn_all(&mut self) {
        let mut cursor = self.entities.cursor();
        while let Some(handle) = cursor.next_handle(&self.entities) {
            self.despawn(handle);
        }
    }

    /// Run [`Component::update`] on every component of every live entity.
    pub fn update(&mut self, dt: f32) {
        let mut cursor = self.entities.cursor();
        while let Some((_, entity)) = cursor.next_mut(&mut self.entities) {
            entity.update(dt);
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Handles of every live entity, in slot order.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entities.iter().map(|(h, _)| h)
    }

    /// The underlying entity registry.
    pub fn registry(&self) -> &Registry<Entity> {
        &self.entities
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct Counter {
        owner: Handle,
        ticks: u32,
        destroyed: Rc<Cell<u32>>,
    }

    impl Component for Counter {
        fn name(&self) -> &str {
            "Counter"
        }

        fn init(&mut self, owner: Handle) {
            self.owner = owner;
        }

        fn update(&mut self, _dt: f32) {
            self.ticks += 1;
        }

        fn destroy(&mut self) {
            self.destroyed.set(self.destroyed.get() + 1);
        }
    }

    struct Tag(&'static str);

    impl Component for Tag {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn spawn_records_own_handle() {
        let mut world = World::new(4);
        let e = world.spawn();
        assert_eq!(world.get(e).unwrap().id(), e);
        assert!(world.get(e).unwrap().parent().is_zero());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn add_comp_calls_init_with_owner() {
        let mut world = World::new(4);
        let e = world.spawn();
        world.get_mut(e).unwrap().add_comp(Counter::default());
        let counter = world.get(e).unwrap().comp::<Counter>().unwrap();
        assert_eq!(counter.owner, e);
    }

    #[test]
    #[should_panic(expected = "already has component `Counter`")]
    fn duplicate_component_type_panics() {
        let mut world = World::new(4);
        let e = world.spawn();
        let entity = world.get_mut(e).unwrap();
        entity.add_comp(Counter::default());
        entity.add_comp(Counter::default());
    }

    #[test]
    fn lookup_by_type() {
        let mut entity = Entity::default();
        entity.add_comp(Tag("player"));
        assert!(entity.has_comp::<Tag>());
        assert!(!entity.has_comp::<Counter>());
        assert_eq!(entity.comp::<Tag>().unwrap().0, "player");
        assert!(entity.comp::<Counter>().is_none());

        entity.comp_mut::<Tag>().unwrap().0 = "enemy";
        assert_eq!(entity.comp_names().collect::<Vec<_>>(), vec!["enemy"]);
    }

    #[test]
    fn comps_of_returns_every_match() {
        let mut entity = Entity::default();
        entity.add_comp(Tag("a"));
        entity.add_boxed(Box::new(Tag("b")));
        entity.add_comp(Counter::default());
        let names: Vec<_> = entity.comps_of::<Tag>().iter().map(|t| t.0).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn destroy_comp_runs_hook_and_removes() {
        let destroyed = Rc::new(Cell::new(0));
        let mut entity = Entity::default();
        entity.add_comp(Counter {
            destroyed: destroyed.clone(),
            ..Default::default()
        });

        assert!(entity.destroy_comp::<Counter>());
        assert_eq!(destroyed.get(), 1);
        assert!(!entity.has_comp::<Counter>());
        assert!(!entity.destroy_comp::<Counter>());
    }

    #[test]
    fn update_reaches_every_live_entity() {
        let mut world = World::new(8);
        let handles: Vec<Handle> = (0..4).map(|_| world.spawn()).collect();
        for h in &handles {
            world.get_mut(*h).unwrap().add_comp(Counter::default());
        }
        world.despawn(handles[1]);

        world.update(0.016);
        world.update(0.016);

        for h in [handles[0], handles[2], handles[3]] {
            assert_eq!(world.get(h).unwrap().comp::<Counter>().unwrap().ticks, 2);
        }
    }

    #[test]
    fn despawn_destroys_components_and_goes_stale() {
        let destroyed = Rc::new(Cell::new(0));
        let mut world = World::new(4);
        let e = world.spawn();
        world.get_mut(e).unwrap().add_comp(Counter {
            destroyed: destroyed.clone(),
            ..Default::default()
        });

        assert!(world.despawn(e));
        assert_eq!(destroyed.get(), 1);
        assert!(!world.is_alive(e));
        assert!(!world.despawn(e));
        assert_eq!(destroyed.get(), 1);
    }

    #[test]
    fn spawn_child_links_both_sides() {
        let mut world = World::new(4);
        let parent = world.spawn();
        let child = world.spawn_child(parent);
        assert_eq!(world.get(child).unwrap().parent(), parent);
        assert_eq!(world.get(parent).unwrap().children(), &[child]);
    }

    #[test]
    #[should_panic(expected = "parent is not alive")]
    fn spawn_child_of_stale_parent_panics() {
        let mut world = World::new(4);
        let parent = world.spawn();
        world.despawn(parent);
        world.spawn_child(parent);
    }

    #[test]
    fn despawn_unlinks_from_parent_and_orphans_children() {
        let mut world = World::new(8);
        let root = world.spawn();
        let mid = world.spawn_child(root);
        let leaf = world.spawn_child(mid);

        world.despawn(mid);
        assert!(world.get(root).unwrap().children().is_empty());
        assert!(world.get(leaf).unwrap().parent().is_zero());
    }

    #[test]
    fn despawn_recursive_removes_subtree_only() {
        let mut world = World::new(8);
        let root = world.spawn();
        let a = world.spawn_child(root);
        let a1 = world.spawn_child(a);
        let b = world.spawn_child(root);

        assert_eq!(world.despawn_recursive(a), 2);
        assert!(!world.is_alive(a));
        assert!(!world.is_alive(a1));
        assert!(world.is_alive(b));
        assert_eq!(world.get(root).unwrap().children(), &[b]);

        assert_eq!(world.despawn_recursive(root), 2);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn despawn_all_clears_world() {
        let mut world = World::new(8);
        let root = world.spawn();
        world.spawn_child(root);
        world.spawn();
        world.despawn_all();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.handles().count(), 0);
    }

    #[test]
    fn reused_slot_does_not_resurrect_old_handle() {
        let mut world = World::with_config(
            RegistryConfig::default()
                .with_capacity(2)
                .with_free_list_reuse_threshold(0),
        );
        let old = world.spawn();
        world.despawn(old);
        let new = world.spawn();
        assert_eq!(new.index(), old.index());
        assert!(world.get(old).is_none());
        assert_eq!(world.get(new).unwrap().id(), new);
    }
}
