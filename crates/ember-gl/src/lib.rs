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

//! # Ember GL
//!
//! OpenGL 2.0, 2.1 and 3.3 backend of the Ember renderer.
//!
//! Producer threads talk to a [`Renderer`], which records [`commands`] into
//! the back frame of a double-buffered command pair. Frames execute against
//! a [`GlServer`], the single owner of the driver, its shadow state and the
//! resource tables, either inline or on a [`RenderThread`].

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
#[cfg(feature = "glow")]
pub mod glow_device;
pub mod headless;
pub mod render_thread;
pub mod renderer;
pub mod server;
pub mod shadow;
pub mod state;
pub mod types;

pub use config::{CompatQuirks, ExecutionMode, GlVersion, RendererConfig};
pub use device::GlDevice;
pub use error::{ConfigError, GlError};
#[cfg(feature = "glow")]
pub use glow_device::GlowDevice;
pub use headless::{DrawRecord, GlCall, HeadlessDevice, HeadlessTexture, TextureLevel};
pub use render_thread::RenderThread;
pub use renderer::{FrameExecutor, InlineExecutor, Renderer};
pub use server::{FrameStats, GlServer};
pub use shadow::ServerState;
pub use state::{GlState, Lifecycle, ResourceTable};
pub use types::*;
