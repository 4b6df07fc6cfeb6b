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

//! Frame-scoped object pools for render commands.

/// A command type that can be recycled by an [`RcCache`].
///
/// `reset` is called on a recycled object before it is handed out again. The
/// default implementation reassigns [`Default::default`]; commands carrying
/// heap buffers override it to clear them while keeping their capacity.
pub trait Poolable: Default {
    /// Restores the object to a freshly-constructed state.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A pool that recycles command objects of one concrete type across frames.
///
/// Allocation is amortized to the high-water mark: once a frame has needed `n`
/// objects, subsequent frames needing `n` or fewer never touch the allocator.
#[derive(Debug)]
pub struct RcCache<T> {
    items: Vec<T>,
    in_use: usize,
}

impl<T: Poolable> RcCache<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            in_use: 0,
        }
    }

    /// Hands out a recycled or freshly-constructed object and its slot index.
    pub fn acquire(&mut self) -> (u32, &mut T) {
        let slot = self.in_use;
        if slot < self.items.len() {
            self.items[slot].reset();
        } else {
            self.items.push(T::default());
        }
        self.in_use += 1;
        (slot as u32, &mut self.items[slot])
    }

    /// Returns every acquired object to the free pool without dropping it.
    pub fn reset(&mut self) {
        self.in_use = 0;
    }
}

impl<T> RcCache<T> {
    /// Returns a reference to an acquired object.
    ///
    /// Objects that were returned to the pool by [`reset`](Self::reset) are not
    /// reachable through this method.
    pub fn get(&self, slot: u32) -> Option<&T> {
        let slot = slot as usize;
        if slot < self.in_use {
            self.items.get(slot)
        } else {
            None
        }
    }

    /// Returns a mutable reference to an acquired object.
    pub fn get_mut(&mut self, slot: u32) -> Option<&mut T> {
        let slot = slot as usize;
        if slot < self.in_use {
            self.items.get_mut(slot)
        } else {
            None
        }
    }

    /// The number of objects acquired since the last reset.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// The number of objects the pool has ever constructed.
    pub fn capacity(&self) -> usize {
        self.items.len()
    }
}

impl<T: Poolable> Default for RcCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Upload {
        data: Vec<u8>,
        tag: u32,
    }

    impl Poolable for Upload {
        fn reset(&mut self) {
            self.data.clear();
            self.tag = 0;
        }
    }

    #[test]
    fn acquire_hands_out_sequential_slots() {
        let mut cache = RcCache::<Upload>::new();
        let (a, _) = cache.acquire();
        let (b, _) = cache.acquire();
        assert_eq!((a, b), (0, 1));
        assert_eq!(cache.in_use(), 2);
    }

    #[test]
    fn reset_recycles_without_growing() {
        let mut cache = RcCache::<Upload>::new();
        for _ in 0..4 {
            let (_, upload) = cache.acquire();
            upload.data.extend_from_slice(&[1, 2, 3]);
        }
        cache.reset();
        assert_eq!(cache.in_use(), 0);
        assert_eq!(cache.capacity(), 4);

        for _ in 0..3 {
            cache.acquire();
        }
        assert_eq!(cache.capacity(), 4, "high-water mark must not grow");
    }

    #[test]
    fn recycled_objects_are_reset_but_keep_capacity() {
        let mut cache = RcCache::<Upload>::new();
        {
            let (_, upload) = cache.acquire();
            upload.data = vec![0; 256];
            upload.tag = 7;
        }
        cache.reset();

        let (_, upload) = cache.acquire();
        assert!(upload.data.is_empty());
        assert_eq!(upload.tag, 0);
        assert!(upload.data.capacity() >= 256);
    }

    #[test]
    fn released_slots_are_not_reachable() {
        let mut cache = RcCache::<Upload>::new();
        let (slot, _) = cache.acquire();
        assert!(cache.get(slot).is_some());
        cache.reset();
        assert!(cache.get(slot).is_none());
        assert!(cache.get_mut(slot).is_none());
    }
}
