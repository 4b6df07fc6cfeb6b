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

//! Deferred render commands and the containers that carry them between threads.
//!
//! The producer (game logic) acquires command objects from pools and appends
//! non-owning references to them into the *back* buffer of a [`RcBufferPair`].
//! At the frame boundary the pair is swapped and the consumer (the thread that
//! owns the graphics context) replays the *front* buffer in append order.
//!
//! Ownership is split explicitly:
//! - [`RcCache`] and [`CommandArena`] own command storage and recycle it every frame.
//! - [`RenderCommandBuffer`] only holds [`CommandRef`] indices into an arena.
//! - [`CommandFrame`] pairs one buffer with the arena its references point into.

mod arena;
mod buffer;
mod cache;
mod frame;
mod pair;
mod queue;

pub use self::arena::{CommandArena, CommandRef};
pub use self::buffer::RenderCommandBuffer;
pub use self::cache::{Poolable, RcCache};
pub use self::frame::CommandFrame;
pub use self::pair::RcBufferPair;
pub use self::queue::{RcQueue, SynchronizedRcQueue};

/// An opaque unit of deferred work, replayed on the thread owning the context `C`.
///
/// A command captures everything it needs when it is recorded and performs its
/// side effects only in [`execute`](RenderCommand::execute). It does not own the
/// objects it operates on; those live in the context.
pub trait RenderCommand<C>: Send {
    /// Replays the command against the context.
    ///
    /// Takes `&mut self` so that a command can release transient payloads
    /// (upload buffers, source strings) once they have been consumed.
    fn execute(&mut self, context: &mut C);

    /// A short human-readable name, used in trace logs.
    fn label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<C, F> RenderCommand<C> for F
where
    F: FnMut(&mut C) + Send,
{
    fn execute(&mut self, context: &mut C) {
        self(context)
    }

    fn label(&self) -> &'static str {
        "closure"
    }
}
