// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generational handle tables.
//!
//! A [`RawHandle`] is an opaque 32-bit value combining a slot index with a
//! generation counter. When an object is removed its slot is recycled, but the
//! generation is bumped, so handles to the removed object stop resolving
//! instead of silently aliasing whatever reuses the slot.

const SLOT_BITS: u32 = 20;
const SLOT_MASK: u32 = (1 << SLOT_BITS) - 1;
const GENERATION_MASK: u32 = (1 << (32 - SLOT_BITS)) - 1;

/// The maximum number of simultaneously live objects in one table.
pub const MAX_SLOTS: usize = SLOT_MASK as usize + 1;

/// An opaque, versioned 32-bit handle. The zero value is never handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RawHandle(u32);

impl RawHandle {
    /// The null handle, which never resolves.
    pub const NULL: Self = Self(0);

    fn new(slot: u32, generation: u32) -> Self {
        Self((generation << SLOT_BITS) | (slot & SLOT_MASK))
    }

    /// Rebuilds a handle from its raw integer representation.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw integer representation.
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` for the null handle.
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The slot index encoded in the handle.
    pub const fn slot(&self) -> usize {
        (self.0 & SLOT_MASK) as usize
    }

    /// The generation encoded in the handle. Never 0 for a handle that was
    /// handed out by a table.
    pub const fn generation(&self) -> u32 {
        self.0 >> SLOT_BITS
    }
}

#[derive(Debug)]
struct Slot<T> {
    /// The handle most recently issued for this slot.
    handle: RawHandle,
    value: Option<T>,
}

/// An arena mapping [`RawHandle`]s to owned objects.
///
/// Lookups re-validate the handle against the one stored in the slot, so stale
/// handles simply fail to resolve.
#[derive(Debug)]
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> HandleTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores an object and returns its handle.
    ///
    /// Returns `None` once [`MAX_SLOTS`] objects are alive at the same time.
    pub fn insert(&mut self, value: T) -> Option<RawHandle> {
        let handle = if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            let mut generation = (entry.handle.generation() + 1) & GENERATION_MASK;
            if generation == 0 {
                generation = 1;
            }
            entry.handle = RawHandle::new(slot, generation);
            entry.value = Some(value);
            entry.handle
        } else {
            if self.slots.len() >= MAX_SLOTS {
                log::error!("Handle table exhausted ({MAX_SLOTS} live objects)");
                return None;
            }
            let handle = RawHandle::new(self.slots.len() as u32, 1);
            self.slots.push(Slot {
                handle,
                value: Some(value),
            });
            handle
        };
        self.len += 1;
        Some(handle)
    }

    /// Returns `true` if the handle resolves to a live object.
    pub fn contains(&self, handle: RawHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Resolves a handle.
    pub fn get(&self, handle: RawHandle) -> Option<&T> {
        if handle.is_null() {
            return None;
        }
        self.slots
            .get(handle.slot())
            .filter(|slot| slot.handle == handle)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Resolves a handle mutably.
    pub fn get_mut(&mut self, handle: RawHandle) -> Option<&mut T> {
        if handle.is_null() {
            return None;
        }
        self.slots
            .get_mut(handle.slot())
            .filter(|slot| slot.handle == handle)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Removes and returns the object, invalidating every copy of the handle.
    pub fn remove(&mut self, handle: RawHandle) -> Option<T> {
        if handle.is_null() {
            return None;
        }
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.handle != handle {
            return None;
        }
        let value = slot.value.take()?;
        self.free.push(handle.slot() as u32);
        self.len -= 1;
        Some(value)
    }

    /// The number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no object is alive.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live objects and their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (RawHandle, &T)> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.value.as_ref().map(|value| (slot.handle, value)))
    }

    /// Collects the handles of every live object, in slot order.
    pub fn handles(&self) -> Vec<RawHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
