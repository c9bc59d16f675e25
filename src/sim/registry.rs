//! Generation-tagged entity registry
//!
//! Live actors and items are stored in slots addressed by [`Handle`]. A slot
//! can be recycled after removal, but its generation is bumped first, so a
//! handle held past its entity's death never resolves again.

use serde::{Deserialize, Serialize};

/// Stable identifier of a registry entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Sparse handle → entity map
#[derive(Debug, Clone)]
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    /// Vacant slot indices, reused lowest-first for stable iteration order
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store an entity and return its fresh handle
    pub fn insert(&mut self, value: T) -> Handle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle {
            index,
            generation: 0,
        }
    }

    /// Remove an entity. Removing a dead or unknown handle is a no-op.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        // Lowest index on top so reuse order is deterministic
        self.free.sort_unstable_by(|a, b| b.cmp(a));
        self.len -= 1;
        Some(value)
    }

    pub fn is_alive(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Snapshot of live handles in index order.
    ///
    /// Passes that may remove entities iterate this instead of the registry.
    pub fn handles(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Iterate live entities in index order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    Handle {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Mutable iteration in index order (no structural changes possible)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.value.as_mut().map(|value| {
                (
                    Handle {
                        index: i as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    /// Remove every entity, returning them for cleanup.
    ///
    /// Generations are bumped, so handles from before the reset stay dead.
    pub fn drain_all(&mut self) -> Vec<(Handle, T)> {
        let mut removed = Vec::with_capacity(self.len);
        for handle in self.handles() {
            if let Some(value) = self.remove(handle) {
                removed.push((handle, value));
            }
        }
        removed
    }
}
