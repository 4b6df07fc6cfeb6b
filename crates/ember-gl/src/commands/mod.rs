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

//! The OpenGL render commands.
//!
//! Every command is executed against a [`GlServer`](crate::GlServer). The
//! `RcSet*State` commands batch several requested changes to one object and
//! replay them in a fixed order; any command that binds an object in order
//! to change it puts the previous binding back afterwards.

mod draw;
mod framebuffer;
mod global;
mod shader;
mod texture;
mod vertex_array;

pub use draw::RcDraw;
pub use framebuffer::{
    RcCheckFramebuffer, RcCreateFramebuffer, RcDeleteFramebuffer, RcSetCurrentFramebuffer,
    RcSetFramebufferState,
};
pub use global::{RcClear, RcSetGlobalState};
pub use shader::{RcCreateShader, RcDeleteShader, RcSetCurrentShader, RcSetShaderState};
pub use texture::{RcCreateTexture2D, RcDeleteTexture, RcSetTexture2DState, TextureUpload};
pub use vertex_array::{RcCreateVertexArray, RcDeleteVertexArray, RcSetVertexArrayData};
