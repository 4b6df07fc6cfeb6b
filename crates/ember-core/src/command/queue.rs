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

use super::RenderCommand;
use parking_lot::Mutex;
use std::fmt;

/// An ordered queue that owns boxed render commands.
///
/// Functionally equivalent to a [`RenderCommandBuffer`](super::RenderCommandBuffer)
/// but self-contained, which makes it suitable for ad-hoc work posted from
/// threads that do not record into a frame (asset loaders, tools).
pub struct RcQueue<C> {
    commands: Vec<Box<dyn RenderCommand<C>>>,
}

impl<C> RcQueue<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a command to the tail of the queue.
    pub fn append(&mut self, command: Box<dyn RenderCommand<C>>) {
        self.commands.push(command);
    }

    /// Executes every command in append order without removing them.
    pub fn execute(&mut self, context: &mut C) {
        for command in &mut self.commands {
            command.execute(context);
        }
    }

    /// Drops every queued command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns `true` if the queue holds no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl<C> Default for RcQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for RcQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcQueue")
            .field("len", &self.commands.len())
            .finish()
    }
}

/// A mutex-guarded [`RcQueue`] for producers and consumers whose access is not
/// otherwise serialized.
///
/// Typically shared through an `Arc`: any thread may [`append`](Self::append),
/// while the consumer calls [`execute_and_clear`](Self::execute_and_clear) once
/// per frame.
pub struct SynchronizedRcQueue<C> {
    inner: Mutex<RcQueue<C>>,
}

impl<C> SynchronizedRcQueue<C> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RcQueue::new()),
        }
    }

    /// Appends a command from any thread.
    pub fn append(&self, command: Box<dyn RenderCommand<C>>) {
        self.inner.lock().append(command);
    }

    /// Executes every queued command while holding the lock.
    pub fn execute(&self, context: &mut C) {
        self.inner.lock().execute(context);
    }

    /// Takes every queued command out under the lock, then executes and drops
    /// them with the lock released, so producers are never blocked on command
    /// execution.
    pub fn execute_and_clear(&self, context: &mut C) {
        let mut pending = std::mem::take(&mut *self.inner.lock());
        if !pending.is_empty() {
            log::trace!("Draining {} synchronized render commands", pending.len());
        }
        pending.execute(context);
    }

    /// Drops every queued command.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Returns `true` if the queue holds no command.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// The number of queued commands.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl<C> Default for SynchronizedRcQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SynchronizedRcQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynchronizedRcQueue")
            .field("len", &self.len())
            .finish()
    }
}
