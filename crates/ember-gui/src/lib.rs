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

//! # Ember GUI
//!
//! A retained-mode GUI context addressed entirely through opaque handles.
//!
//! [`GuiContext`] owns every element and surface. Applications refer to them
//! through [`GuiElementHandle`] and [`GuiSurfaceHandle`], which are
//! generational: a handle to a deleted object stops resolving, and every
//! accessor given such a handle does nothing and returns a default value.
//!
//! Event handlers receive the context mutably and may create, reparent or
//! delete elements, or attach and detach handlers, while an event is being
//! dispatched. See [`context`] for the guarantees dispatch keeps in that case.

pub mod context;
pub mod element;
pub mod event;
pub mod renderer;
pub mod surface;
pub mod types;

pub use context::GuiContext;
pub use event::{GuiEvent, GuiEventHandler};
pub use renderer::GuiRenderer;
pub use types::{
    GuiColor, GuiElementHandle, GuiRect, GuiSurfaceHandle, GuiTextureId, KeyModifiers,
    MouseButton,
};
