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

//! Type-erased storage owning every command recorded into a frame.

use super::cache::{Poolable, RcCache};
use super::RenderCommand;
use ahash::AHashMap;
use std::any::{Any, TypeId};
use std::fmt;

/// A non-owning reference to a command stored in a [`CommandArena`].
///
/// It is only meaningful for the arena that produced it, and only until that
/// arena is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandRef {
    pool: u32,
    slot: u32,
}

impl CommandRef {
    /// Pool index reserved for boxed one-off commands.
    const BOXED_POOL: u32 = u32::MAX;

    /// Returns `true` if this reference points at a boxed one-off command.
    pub fn is_boxed(&self) -> bool {
        self.pool == Self::BOXED_POOL
    }
}

trait ErasedPool<C>: Send {
    fn execute(&mut self, slot: u32, context: &mut C);
    fn label(&self, slot: u32) -> Option<&'static str>;
    fn reset(&mut self);
    fn in_use(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C, T> ErasedPool<C> for RcCache<T>
where
    T: RenderCommand<C> + Poolable + 'static,
{
    fn execute(&mut self, slot: u32, context: &mut C) {
        if let Some(command) = self.get_mut(slot) {
            command.execute(context);
        }
    }

    fn label(&self, slot: u32) -> Option<&'static str> {
        self.get(slot).map(|command| command.label())
    }

    fn reset(&mut self) {
        RcCache::reset(self);
    }

    fn in_use(&self) -> usize {
        RcCache::in_use(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns the storage of every command recorded into one frame.
///
/// Each concrete command type gets its own [`RcCache`], created lazily the first
/// time the type is acquired. Commands that cannot be pooled are accepted as
/// boxed trait objects and dropped on [`reset`](Self::reset).
pub struct CommandArena<C> {
    pools: Vec<Box<dyn ErasedPool<C>>>,
    pool_index: AHashMap<TypeId, u32>,
    boxed: Vec<Box<dyn RenderCommand<C>>>,
}

impl<C: 'static> CommandArena<C> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            pools: Vec::new(),
            pool_index: AHashMap::new(),
            boxed: Vec::new(),
        }
    }

    /// Acquires a pooled command of type `T`.
    pub fn acquire<T>(&mut self) -> (CommandRef, &mut T)
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        let pool = self.pool_for::<T>();
        let Some(cache) = self.pools[pool as usize]
            .as_any_mut()
            .downcast_mut::<RcCache<T>>()
        else {
            unreachable!("command pool #{pool} is keyed by its TypeId");
        };
        let (slot, command) = cache.acquire();
        (CommandRef { pool, slot }, command)
    }

    /// Stores a one-off boxed command.
    pub fn insert_boxed(&mut self, command: Box<dyn RenderCommand<C>>) -> CommandRef {
        let slot = self.boxed.len() as u32;
        self.boxed.push(command);
        CommandRef {
            pool: CommandRef::BOXED_POOL,
            slot,
        }
    }

    /// Executes the referenced command. Stale references are ignored.
    pub fn execute(&mut self, command: CommandRef, context: &mut C) {
        if command.is_boxed() {
            if let Some(boxed) = self.boxed.get_mut(command.slot as usize) {
                boxed.execute(context);
            }
        } else if let Some(pool) = self.pools.get_mut(command.pool as usize) {
            pool.execute(command.slot, context);
        }
    }

    /// Returns the label of the referenced command, if it is still alive.
    pub fn label(&self, command: CommandRef) -> Option<&'static str> {
        if command.is_boxed() {
            self.boxed
                .get(command.slot as usize)
                .map(|boxed| boxed.label())
        } else {
            self.pools
                .get(command.pool as usize)
                .and_then(|pool| pool.label(command.slot))
        }
    }

    /// Returns the referenced command if it is a pooled `T`.
    pub fn get<T>(&self, command: CommandRef) -> Option<&T>
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        if command.is_boxed() {
            return None;
        }
        self.pools
            .get(command.pool as usize)?
            .as_any()
            .downcast_ref::<RcCache<T>>()?
            .get(command.slot)
    }

    /// Returns the referenced command mutably if it is a pooled `T`.
    pub fn get_mut<T>(&mut self, command: CommandRef) -> Option<&mut T>
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        if command.is_boxed() {
            return None;
        }
        self.pools
            .get_mut(command.pool as usize)?
            .as_any_mut()
            .downcast_mut::<RcCache<T>>()?
            .get_mut(command.slot)
    }

    /// Returns the pool for `T`, if any command of that type was ever acquired.
    pub fn cache<T>(&self) -> Option<&RcCache<T>>
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        let pool = *self.pool_index.get(&TypeId::of::<T>())?;
        self.pools[pool as usize]
            .as_any()
            .downcast_ref::<RcCache<T>>()
    }

    /// The number of live commands across every pool.
    pub fn len(&self) -> usize {
        self.pools.iter().map(|pool| pool.in_use()).sum::<usize>() + self.boxed.len()
    }

    /// Returns `true` if no command is currently live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recycles every pooled command and drops every boxed one.
    ///
    /// All [`CommandRef`]s handed out before the reset become stale.
    pub fn reset(&mut self) {
        for pool in &mut self.pools {
            pool.reset();
        }
        self.boxed.clear();
    }

    fn pool_for<T>(&mut self) -> u32
    where
        T: RenderCommand<C> + Poolable + 'static,
    {
        if let Some(&pool) = self.pool_index.get(&TypeId::of::<T>()) {
            return pool;
        }
        let pool = self.pools.len() as u32;
        log::trace!(
            "Command pool #{pool} created for {}",
            std::any::type_name::<T>()
        );
        self.pools.push(Box::new(RcCache::<T>::new()));
        self.pool_index.insert(TypeId::of::<T>(), pool);
        pool
    }
}

impl<C: 'static> Default for CommandArena<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for CommandArena<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandArena")
            .field("pools", &self.pools.len())
            .field("boxed", &self.boxed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Push(u32);
    impl Poolable for Push {}
    impl RenderCommand<Vec<u32>> for Push {
        fn execute(&mut self, log: &mut Vec<u32>) {
            log.push(self.0);
        }
    }

    #[derive(Default)]
    struct Double;
    impl Poolable for Double {}
    impl RenderCommand<Vec<u32>> for Double {
        fn execute(&mut self, log: &mut Vec<u32>) {
            if let Some(last) = log.last().copied() {
                log.push(last * 2);
            }
        }
    }

    #[test]
    fn one_pool_per_command_type() {
        let mut arena = CommandArena::<Vec<u32>>::new();
        let (a, _) = arena.acquire::<Push>();
        let (b, _) = arena.acquire::<Double>();
        let (c, _) = arena.acquire::<Push>();

        assert_eq!(a.pool, c.pool);
        assert_ne!(a.pool, b.pool);
        assert_eq!(arena.len(), 3);
        assert_eq!(arena.cache::<Push>().map(|c| c.in_use()), Some(2));
    }

    #[test]
    fn execute_dispatches_to_the_right_type() {
        let mut arena = CommandArena::<Vec<u32>>::new();
        let (push, cmd) = arena.acquire::<Push>();
        cmd.0 = 21;
        let (double, _) = arena.acquire::<Double>();

        let mut log = Vec::new();
        arena.execute(push, &mut log);
        arena.execute(double, &mut log);
        assert_eq!(log, vec![21, 42]);
    }

    #[test]
    fn typed_access_rejects_wrong_type() {
        let mut arena = CommandArena::<Vec<u32>>::new();
        let (push, _) = arena.acquire::<Push>();
        assert!(arena.get::<Push>(push).is_some());
        assert!(arena.get::<Double>(push).is_none());
    }

    #[test]
    fn boxed_commands_are_dropped_on_reset() {
        let mut arena = CommandArena::<Vec<u32>>::new();
        let boxed = arena.insert_boxed(Box::new(|log: &mut Vec<u32>| log.push(5)));
        assert!(boxed.is_boxed());

        let mut log = Vec::new();
        arena.execute(boxed, &mut log);
        assert_eq!(log, vec![5]);

        arena.reset();
        assert!(arena.is_empty());
        arena.execute(boxed, &mut log);
        assert_eq!(log, vec![5], "stale boxed reference must be ignored");
    }
}
