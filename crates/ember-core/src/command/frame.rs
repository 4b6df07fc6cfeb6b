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

use super::arena::{CommandArena, CommandRef};
use super::buffer::RenderCommandBuffer;
use super::cache::Poolable;
use super::RenderCommand;

/// One frame worth of recorded work: a command buffer and the arena that owns
/// the commands it references.
///
/// A frame is `Send`, so a recorded frame can be handed to the render thread
/// and handed back for recycling once it has been executed.
#[derive(Debug)]
pub struct CommandFrame<C> {
    commands: RenderCommandBuffer,
    arena: CommandArena<C>,
}

impl<C: 'static> CommandFrame<C> {
    /// Creates an empty frame.
    pub fn new() -> Self {
        Self {
            commands: RenderCommandBuffer::new(),
            arena: CommandArena::new(),
        }
    }

    /// Acquires a pooled command of type `T` and appends it to the buffer.
    ///
    /// The returned reference is used to fill in the command's parameters.
    pub fn push<T>(&mut self) -> (CommandRef, &mut T)
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        let (command_ref, command) = self.arena.acquire::<T>();
        self.commands.append(command_ref);
        (command_ref, command)
    }

    /// Appends a one-off boxed command.
    pub fn push_boxed(&mut self, command: Box<dyn RenderCommand<C>>) -> CommandRef {
        let command_ref = self.arena.insert_boxed(command);
        self.commands.append(command_ref);
        command_ref
    }

    /// Executes the frame's commands in append order.
    pub fn execute(&mut self, context: &mut C) {
        self.commands.execute(&mut self.arena, context);
    }

    /// Clears the buffer and recycles the arena.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.arena.reset();
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// The buffer of command references.
    pub fn commands(&self) -> &RenderCommandBuffer {
        &self.commands
    }

    /// The arena owning the recorded commands.
    pub fn arena(&self) -> &CommandArena<C> {
        &self.arena
    }

    /// Mutable access to the arena, used to amend a command that was already
    /// recorded (for example to merge consecutive state changes).
    pub fn arena_mut(&mut self) -> &mut CommandArena<C> {
        &mut self.arena
    }
}

impl<C: 'static> Default for CommandFrame<C> {
    fn default() -> Self {
        Self::new()
    }
}
