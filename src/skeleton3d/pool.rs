use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Stable handle on an element of a [`HandlePool`]
///
/// The kind parameter only tags the handle so that handles of different pools
/// cannot be mixed up.
pub struct Handle<K> {
    slot: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Handle<K> {
    fn new(slot: u32, generation: u32) -> Handle<K> {
        Handle {
            slot,
            generation,
            _kind: PhantomData,
        }
    }

    /// Slot of the handle in its pool
    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation of the slot when the handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<K> Eq for Handle<K> {}

impl<K> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<K> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.slot, self.generation)
    }
}

#[derive(Clone, Copy)]
struct Slot {
    generation: u32,
    index: Option<usize>,
}

/// Pool of elements addressed by generational handles
///
/// Elements are stored densely: removing an element moves the last one into
/// its index, so indices are only stable until the next removal. Handles stay
/// stable until their own element is removed.
pub struct HandlePool<K, T> {
    data: Vec<T>,
    owners: Vec<u32>, // slot owning each dense index
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    _kind: PhantomData<fn() -> K>,
}

impl<K, T> HandlePool<K, T> {
    /// Empty pool constructor
    pub fn new() -> HandlePool<K, T> {
        HandlePool::with_capacity(0)
    }

    /// Pool constructor reserving room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> HandlePool<K, T> {
        HandlePool {
            data: Vec::with_capacity(capacity),
            owners: Vec::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free_slots: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Reserves room for `additional` more elements
    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
        self.owners.reserve(additional);
    }

    /// Stores a value and returns its handle
    ///
    /// The value is stored at index `len() - 1`.
    pub fn create(&mut self, value: T) -> Handle<K> {
        let index = self.data.len();
        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.slots[slot as usize].index = Some(index);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    index: Some(index),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.data.push(value);
        self.owners.push(slot);
        Handle::new(slot, self.slots[slot as usize].generation)
    }

    /// Current dense index of a handle, `None` if the handle is stale
    pub fn index_of(&self, handle: Handle<K>) -> Option<usize> {
        let slot = self.slots.get(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.index
    }

    /// Handle of the element stored at a dense index
    pub fn handle_at(&self, index: usize) -> Option<Handle<K>> {
        let slot = *self.owners.get(index)?;
        Some(Handle::new(slot, self.slots[slot as usize].generation))
    }

    /// Checks if a handle refers to a live element
    pub fn contains(&self, handle: Handle<K>) -> bool {
        self.index_of(handle).is_some()
    }

    /// Element getter
    pub fn get(&self, handle: Handle<K>) -> Option<&T> {
        let index = self.index_of(handle)?;
        self.data.get(index)
    }

    /// Mutable element getter
    pub fn get_mut(&mut self, handle: Handle<K>) -> Option<&mut T> {
        let index = self.index_of(handle)?;
        self.data.get_mut(index)
    }

    /// Element getter by dense index
    pub fn get_by_index(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Mutable element getter by dense index
    pub fn get_by_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Removes an element
    ///
    /// Returns the index the element occupied, where the last element now
    /// lives, along with the removed value.
    pub fn remove(&mut self, handle: Handle<K>) -> Option<(usize, T)> {
        let index = self.index_of(handle)?;
        let value = self.data.swap_remove(index);
        self.owners.swap_remove(index);
        if let Some(&moved) = self.owners.get(index) {
            self.slots[moved as usize].index = Some(index);
        }
        self.release_slot(handle.slot);
        Some((index, value))
    }

    /// Removes every element, invalidating all handles
    pub fn clear(&mut self) {
        let owners = std::mem::take(&mut self.owners);
        for slot in owners {
            self.release_slot(slot);
        }
        self.data.clear();
    }

    fn release_slot(&mut self, slot: u32) {
        let entry = &mut self.slots[slot as usize];
        entry.index = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_slots.push(slot);
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks if the pool has no element
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dense element storage
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable dense element storage
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Handles of all elements, in index order
    pub fn handles(&self) -> Vec<Handle<K>> {
        (0..self.data.len())
            .filter_map(|index| self.handle_at(index))
            .collect()
    }

    /// Iterates over elements with their handles, in index order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<K>, &T)> + '_ {
        self.owners.iter().zip(self.data.iter()).map(|(&slot, value)| {
            (
                Handle::new(slot, self.slots[slot as usize].generation),
                value,
            )
        })
    }
}

impl<K, T> Default for HandlePool<K, T> {
    fn default() -> Self {
        HandlePool::new()
    }
}

impl<K, T: Clone> Clone for HandlePool<K, T> {
    fn clone(&self) -> Self {
        HandlePool {
            data: self.data.clone(),
            owners: self.owners.clone(),
            slots: self.slots.clone(),
            free_slots: self.free_slots.clone(),
            _kind: PhantomData,
        }
    }
}
