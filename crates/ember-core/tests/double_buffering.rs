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

use ember_core::{CommandFrame, Poolable, RcBufferPair, RenderCommand};
use std::thread;

#[derive(Default)]
struct LogIndex {
    frame: u32,
    index: u32,
}

impl Poolable for LogIndex {}

impl RenderCommand<Vec<(u32, u32)>> for LogIndex {
    fn execute(&mut self, log: &mut Vec<(u32, u32)>) {
        log.push((self.frame, self.index));
    }
}

fn record_frame(frame: &mut CommandFrame<Vec<(u32, u32)>>, frame_number: u32, count: u32) {
    for index in 0..count {
        let (_, cmd) = frame.push::<LogIndex>();
        cmd.frame = frame_number;
        cmd.index = index;
    }
}

#[test]
fn producer_and_consumer_overlap_on_opposite_frames() {
    // --- 1. ARRANGE ---
    let mut pair = RcBufferPair::<Vec<(u32, u32)>>::new();
    let mut executed = Vec::new();
    record_frame(pair.back_mut(), 0, 8);
    pair.swap();

    // --- 2. ACT ---
    // Each iteration records frame N on one thread while frame N-1 executes on
    // another. The swap happens only after both have joined.
    for frame_number in 1..=5 {
        let (back, front) = pair.split_mut();
        thread::scope(|scope| {
            scope.spawn(|| record_frame(back, frame_number, 8));
            scope.spawn(|| front.execute(&mut executed));
        });
        pair.swap();
    }
    pair.execute_front(&mut executed);

    // --- 3. ASSERT ---
    let expected: Vec<_> = (0..=5)
        .flat_map(|frame| (0..8).map(move |index| (frame, index)))
        .collect();
    assert_eq!(executed, expected, "frames must execute whole and in order");
}

#[test]
fn pools_stop_growing_once_the_high_water_mark_is_reached() {
    let mut pair = RcBufferPair::<Vec<(u32, u32)>>::new();
    let mut sink = Vec::new();

    for frame_number in 0..10 {
        record_frame(pair.back_mut(), frame_number, 32);
        pair.swap();
        pair.execute_front(&mut sink);
    }

    for frame in [pair.back(), pair.front()] {
        let capacity = frame
            .arena()
            .cache::<LogIndex>()
            .map(|cache| cache.capacity())
            .unwrap_or(0);
        assert_eq!(capacity, 32);
    }
}
