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

//! # Ember Core
//!
//! Foundational crate containing the deferred render-command contracts that
//! decouple the threads producing rendering work from the thread that owns the
//! graphics context.
//!
//! Nothing in this crate knows about a particular graphics API: every command
//! is executed against a context type chosen by the backend crate (for the
//! OpenGL backend this is `ember_gl::GlServer`).

#![warn(missing_docs)]

pub mod command;
pub mod handle;

pub use command::{
    CommandArena, CommandFrame, CommandRef, Poolable, RcBufferPair, RcCache, RcQueue,
    RenderCommand, RenderCommandBuffer, SynchronizedRcQueue,
};
pub use handle::{HandleTable, RawHandle};
