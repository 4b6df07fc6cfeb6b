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

/// An ordered, non-owning sequence of render commands.
///
/// The buffer only stores [`CommandRef`]s; the commands themselves live in a
/// [`CommandArena`]. Commands always execute in append order.
#[derive(Debug, Default, Clone)]
pub struct RenderCommandBuffer {
    commands: Vec<CommandRef>,
}

impl RenderCommandBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer able to hold `capacity` references without reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Appends a command reference to the tail of the buffer.
    pub fn append(&mut self, command: CommandRef) {
        self.commands.push(command);
    }

    /// Executes every referenced command in append order.
    ///
    /// The buffer itself is left untouched, so the same batch can be replayed
    /// again; whether replaying is meaningful depends on the commands.
    pub fn execute<C: 'static>(&self, arena: &mut CommandArena<C>, context: &mut C) {
        for &command in &self.commands {
            if log::log_enabled!(log::Level::Trace) {
                log::trace!(
                    "Executing render command {}",
                    arena.label(command).unwrap_or("<stale>")
                );
            }
            arena.execute(command, context);
        }
    }

    /// Forgets every reference. The referenced commands are not dropped.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Returns `true` if the buffer holds no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The number of commands in the buffer.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// The most recently appended command.
    pub fn last(&self) -> Option<CommandRef> {
        self.commands.last().copied()
    }

    /// Iterates over the references in append order.
    pub fn iter(&self) -> impl Iterator<Item = CommandRef> + '_ {
        self.commands.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Poolable, RenderCommand};

    #[derive(Default)]
    struct Record(usize);
    impl Poolable for Record {}
    impl RenderCommand<Vec<usize>> for Record {
        fn execute(&mut self, log: &mut Vec<usize>) {
            log.push(self.0);
        }
    }

    #[test]
    fn executes_in_append_order() {
        let mut arena = CommandArena::new();
        let mut buffer = RenderCommandBuffer::new();
        for i in 0..16 {
            let (cmd, record) = arena.acquire::<Record>();
            record.0 = i;
            buffer.append(cmd);
        }

        let mut log = Vec::new();
        buffer.execute(&mut arena, &mut log);
        assert_eq!(log, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn execute_does_not_consume_the_buffer() {
        let mut arena = CommandArena::new();
        let mut buffer = RenderCommandBuffer::new();
        let (cmd, record) = arena.acquire::<Record>();
        record.0 = 3;
        buffer.append(cmd);

        let mut log = Vec::new();
        buffer.execute(&mut arena, &mut log);
        buffer.execute(&mut arena, &mut log);
        assert_eq!(log, vec![3, 3]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn clear_keeps_commands_alive_in_the_arena() {
        let mut arena = CommandArena::<Vec<usize>>::new();
        let mut buffer = RenderCommandBuffer::new();
        let (cmd, _) = arena.acquire::<Record>();
        buffer.append(cmd);

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(arena.get::<Record>(cmd).is_some());
    }
}
