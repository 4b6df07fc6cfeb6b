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

use super::frame::CommandFrame;

/// Owns exactly two command frames and tracks which one is *back* (being
/// recorded by the producer) and which one is *front* (being executed by the
/// consumer).
///
/// The pair performs no locking. [`swap`](Self::swap) must only be called once
/// the consumer has finished executing the front frame and while the producer
/// is not in the middle of recording; the `&mut self` receiver enforces the
/// latter whenever the pair is owned by a single thread.
#[derive(Debug)]
pub struct RcBufferPair<C> {
    frames: [CommandFrame<C>; 2],
    back: usize,
}

impl<C: 'static> RcBufferPair<C> {
    /// Creates a pair of empty frames. Frame 0 starts as the back frame.
    pub fn new() -> Self {
        Self {
            frames: [CommandFrame::new(), CommandFrame::new()],
            back: 0,
        }
    }

    /// The frame currently being recorded.
    pub fn back(&self) -> &CommandFrame<C> {
        &self.frames[self.back]
    }

    /// Mutable access to the frame currently being recorded.
    pub fn back_mut(&mut self) -> &mut CommandFrame<C> {
        &mut self.frames[self.back]
    }

    /// The frame currently being executed.
    pub fn front(&self) -> &CommandFrame<C> {
        &self.frames[self.front_index()]
    }

    /// Mutable access to the frame currently being executed.
    pub fn front_mut(&mut self) -> &mut CommandFrame<C> {
        let front = self.front_index();
        &mut self.frames[front]
    }

    /// Borrows the back and front frames at the same time, so the producer can
    /// record into one while the consumer executes the other (for instance on
    /// scoped threads).
    pub fn split_mut(&mut self) -> (&mut CommandFrame<C>, &mut CommandFrame<C>) {
        let (first, second) = self.frames.split_at_mut(1);
        if self.back == 0 {
            (&mut first[0], &mut second[0])
        } else {
            (&mut second[0], &mut first[0])
        }
    }

    /// Index (0 or 1) of the owned frame currently playing the back role.
    pub fn back_index(&self) -> usize {
        self.back
    }

    /// Index (0 or 1) of the owned frame currently playing the front role.
    pub fn front_index(&self) -> usize {
        1 - self.back
    }

    /// Exchanges the back and front roles, then clears the new back frame.
    pub fn swap(&mut self) {
        self.back = 1 - self.back;
        let back = self.back;
        self.frames[back].clear();
    }

    /// Executes the front frame against the context.
    pub fn execute_front(&mut self, context: &mut C) {
        self.front_mut().execute(context);
    }
}

impl<C: 'static> Default for RcBufferPair<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Poolable, RenderCommand};

    #[derive(Default)]
    struct Tick(u32);
    impl Poolable for Tick {}
    impl RenderCommand<Vec<u32>> for Tick {
        fn execute(&mut self, log: &mut Vec<u32>) {
            log.push(self.0);
        }
    }

    fn record(pair: &mut RcBufferPair<Vec<u32>>, values: &[u32]) {
        for &value in values {
            let (_, tick) = pair.back_mut().push::<Tick>();
            tick.0 = value;
        }
    }

    #[test]
    fn swap_clears_the_new_back_frame() {
        let mut pair = RcBufferPair::new();
        record(&mut pair, &[1, 2, 3]);
        pair.swap();

        assert!(pair.back().is_empty());
        assert_eq!(pair.front().len(), 3);

        let mut log = Vec::new();
        pair.execute_front(&mut log);
        assert_eq!(log, vec![1, 2, 3]);
    }

    #[test]
    fn swap_discards_stale_front_contents() {
        let mut pair = RcBufferPair::new();
        record(&mut pair, &[1]);
        pair.swap();
        record(&mut pair, &[2, 3]);
        pair.swap();

        // Frame holding [1] became back again and must have been cleared.
        assert!(pair.back().is_empty());
        let mut log = Vec::new();
        pair.execute_front(&mut log);
        assert_eq!(log, vec![2, 3]);
    }

    #[test]
    fn back_and_front_never_alias() {
        let mut pair = RcBufferPair::<Vec<u32>>::new();
        for _ in 0..4 {
            assert!(!std::ptr::eq(pair.back(), pair.front()));
            assert_ne!(pair.back_index(), pair.front_index());
            pair.swap();
        }
    }
}
