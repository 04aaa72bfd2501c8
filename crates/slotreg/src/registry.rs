//! # Registry — Fixed-Capacity Generational Storage
//!
//! The [`Registry`] owns every object it hands out. Callers get a [`Handle`]
//! back from [`create`](Registry::create) and resolve it through
//! [`get`](Registry::get) each time they need the object. Nothing outside the
//! registry holds a reference across a [`free`](Registry::free).
//!
//! ## Memory Layout
//!
//! ```text
//! handles:   [0v1, 1v3 dead, 2v1, 3v0 dead, ...]   ← authoritative slot state
//! items:     [ T ,    T    ,  T ,    T    , ...]   ← parallel to handles
//! free_list: [1, 3]                                ← stack of freed slot indices
//! ```
//!
//! Both arrays are allocated once at construction and never grow. A slot's
//! stored handle carries its current generation and whether it is alive.
//!
//! ## Slot Selection
//!
//! `create` only pops the free list once it holds *more* than
//! `free_list_reuse_threshold` entries. Below that it scans from slot 0 for
//! the first dead slot. Holding freed slots back for a while means a handle
//! that was freed a moment ago is unlikely to alias the very next object.
//!
//! A slot can sit on the free list and still be picked up by the scan, so the
//! list may hold entries whose slot is alive again. Those entries are dropped
//! when popped.
//!
//! ## Failure Modes
//!
//! - Zero capacity, a full registry in [`create`](Registry::create), and a
//!   handle index past the end of the arrays are programmer errors and panic.
//!   Use [`try_with_config`](Registry::try_with_config) and
//!   [`try_create`](Registry::try_create) to get a [`RegistryError`] instead.
//! - A stale handle (freed object, reused slot) is normal: `get` returns
//!   `None` and `free` does nothing.
//!
//! ## Threading
//!
//! Mutation takes `&mut self`, so `create`/`free` are single-writer by
//! construction. Any number of readers may call `get` through a shared
//! reference at the same time.

use crate::config::RegistryConfig;
use crate::cursor::{Cursor, Iter, IterMut};
use crate::error::RegistryError;
use crate::handle::{Handle, HandleFlags};

/// Fixed-capacity storage addressed by generational [`Handle`]s.
pub struct Registry<T> {
    /// One value per slot. Dead slots hold `T::default()`.
    items: Box<[T]>,
    /// Current generation and flags of each slot.
    handles: Box<[Handle]>,
    /// Number of slots with the alive flag set.
    item_count: usize,
    /// Freed slot indices, most recent last. May contain entries whose slot
    /// was since reclaimed by the linear scan.
    free_list: Vec<u64>,
    free_list_reuse_threshold: usize,
}

impl<T: Default> Registry<T> {
    /// Create a registry with `capacity` slots and the default reuse threshold.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not addressable by a 48-bit index.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(RegistryConfig::default().with_capacity(capacity))
    }

    /// Create a registry from a [`RegistryConfig`].
    ///
    /// # Panics
    ///
    /// Panics if the config fails [`RegistryConfig::validate`].
    pub fn with_config(config: RegistryConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(registry) => registry,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a registry from a [`RegistryConfig`], reporting bad configs as errors.
    pub fn try_with_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;

        let items = (0..config.capacity).map(|_| T::default()).collect();
        let handles = vec![Handle::ZERO; config.capacity].into_boxed_slice();
        log::debug!(
            "Registry<{}> created: {} slots, free-list reuse threshold {}",
            std::any::type_name::<T>(),
            config.capacity,
            config.free_list_reuse_threshold
        );

        Ok(Self {
            items,
            handles,
            item_count: 0,
            free_list: Vec::with_capacity(config.capacity),
            free_list_reuse_threshold: config.free_list_reuse_threshold,
        })
    }

    /// Allocate a slot, reset it to `T::default()`, and return it with its handle.
    ///
    /// # Panics
    ///
    /// Panics if every slot is alive. Capacity never grows, so a full registry
    /// means it was sized too small.
    pub fn create(&mut self) -> (&mut T, Handle) {
        match self.try_create() {
            Ok(created) => created,
            Err(e) => {
                log::error!("Can not add more items to Registry<{}>: {e}", std::any::type_name::<T>());
                panic!("{e}");
            }
        }
    }

    /// Like [`create`](Self::create), but returns [`RegistryError::Full`]
    /// instead of panicking.
    pub fn try_create(&mut self) -> Result<(&mut T, Handle), RegistryError> {
        if self.item_count >= self.handles.len() {
            return Err(RegistryError::Full {
                capacity: self.handles.len(),
            });
        }

        let index = match self.take_free_slot() {
            Some(index) => index,
            None => self.scan_free_slot().unwrap_or_else(|| {
                unreachable!(
                    "{} of {} slots alive but no dead slot found",
                    self.item_count,
                    self.handles.len()
                )
            }),
        };

        let generation = self.handles[index].generation().wrapping_add(1);
        let handle = Handle::new(generation, HandleFlags::ALIVE, index as u64);
        debug_assert!(!handle.is_zero());

        self.item_count += 1;
        self.handles[index] = handle;
        self.items[index] = T::default();

        Ok((&mut self.items[index], handle))
    }

    /// Free the object behind `handle`. Returns `false` (and does nothing) if
    /// the handle no longer resolves.
    ///
    /// # Panics
    ///
    /// Panics if the handle's index is outside the registry.
    pub fn free(&mut self, handle: Handle) -> bool {
        self.remove(handle).is_some()
    }

    /// Free the object behind `handle` and hand back its value.
    ///
    /// # Panics
    ///
    /// Panics if the handle's index is outside the registry.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let index = self.resolve(handle, "free")?;

        // Generation moves on allocation only; freeing just clears the flags.
        self.item_count -= 1;
        self.handles[index] = Handle::new(handle.generation(), HandleFlags::empty(), index as u64);
        self.free_list.push(index as u64);

        Some(std::mem::take(&mut self.items[index]))
    }

    /// Free every live object. Generations are kept, so handles taken before
    /// the clear stay stale afterwards.
    pub fn clear(&mut self) {
        let live: Vec<Handle> = self
            .handles
            .iter()
            .copied()
            .filter(|h| h.has_flag(HandleFlags::ALIVE))
            .collect();
        for handle in &live {
            self.free(*handle);
        }
        log::debug!(
            "Registry<{}> cleared {} items",
            std::any::type_name::<T>(),
            live.len()
        );
    }

    /// Pop the free list while it is longer than the reuse threshold.
    fn take_free_slot(&mut self) -> Option<usize> {
        while self.free_list.len() > self.free_list_reuse_threshold {
            let index = self.free_list.pop()? as usize;
            if !self.handles[index].has_flag(HandleFlags::ALIVE) {
                log::trace!("reusing slot {index} from the free list");
                return Some(index);
            }
            // Reclaimed by the scan since it was freed.
        }
        None
    }

    fn scan_free_slot(&self) -> Option<usize> {
        let index = self
            .handles
            .iter()
            .position(|h| !h.has_flag(HandleFlags::ALIVE))?;
        log::trace!("scan picked slot {index}");
        Some(index)
    }
}

impl<T> Registry<T> {
    /// Resolve a handle to its object, or `None` if the object was freed.
    ///
    /// # Panics
    ///
    /// Panics if the handle's index is outside the registry, which can only
    /// happen with a corrupted handle or one from a different registry.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let index = self.resolve(handle, "get")?;
        Some(&self.items[index])
    }

    /// Mutable version of [`get`](Self::get).
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let index = self.resolve(handle, "get")?;
        Some(&mut self.items[index])
    }

    /// True if `handle` currently resolves.
    pub fn contains(&self, handle: Handle) -> bool {
        self.resolve(handle, "look up").is_some()
    }

    /// Start a cursor over every object alive right now.
    ///
    /// The cursor does not borrow the registry, so objects may be created and
    /// freed between steps. See [`Cursor`] for what it guarantees then.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.item_count)
    }

    /// Iterate `(handle, &item)` over every live object, in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Iterate `(handle, &mut item)` over every live object, in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&self.handles, &mut self.items, self.item_count)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    pub fn is_full(&self) -> bool {
        self.item_count == self.handles.len()
    }

    /// Number of slots, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.handles.len()
    }

    /// Entries on the free list, including ones whose slot was reclaimed by a scan.
    pub fn free_list_len(&self) -> usize {
        self.free_list.len()
    }

    pub fn free_list_reuse_threshold(&self) -> usize {
        self.free_list_reuse_threshold
    }

    pub fn set_free_list_reuse_threshold(&mut self, threshold: usize) {
        self.free_list_reuse_threshold = threshold;
    }

    /// The stored state of every slot, indexed by slot.
    pub(crate) fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub(crate) fn item_at(&self, index: usize) -> &T {
        &self.items[index]
    }

    pub(crate) fn item_at_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }

    /// Slot index of `handle` if it is alive with a matching generation.
    fn resolve(&self, handle: Handle, op: &str) -> Option<usize> {
        let index = handle.index();
        assert!(
            index < self.handles.len() as u64,
            "Failed to {op} item because of invalid handle {handle:?}: index {index} but registry only has {} slots",
            self.handles.len()
        );

        let index = handle.slot();
        let stored = self.handles[index];
        let alive = stored.has_flag(HandleFlags::ALIVE) && handle.has_flag(HandleFlags::ALIVE);
        (alive && stored.generation() == handle.generation()).then_some(index)
    }
}

impl<T> std::ops::Index<Handle> for Registry<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if the handle is stale.
    fn index(&self, handle: Handle) -> &T {
        self.get(handle)
            .unwrap_or_else(|| panic!("handle {handle:?} does not refer to a live item"))
    }
}

impl<T> std::ops::IndexMut<Handle> for Registry<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut T {
        self.get_mut(handle)
            .unwrap_or_else(|| panic!("handle {handle:?} does not refer to a live item"))
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.item_count)
            .field("capacity", &self.handles.len())
            .field("free_list_len", &self.free_list.len())
            .field("free_list_reuse_threshold", &self.free_list_reuse_threshold)
            .finish()
    }
}
