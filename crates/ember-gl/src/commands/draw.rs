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

//! Draw commands.

use ember_core::{Poolable, RenderCommand};

use super::vertex_array::specify_attributes;
use crate::server::GlServer;
use crate::types::{BufferTarget, PrimitiveType, VertexArrayId};

/// Draws a vertex array with the current shader into the current
/// framebuffer.
///
/// Indexed vertex arrays draw indices, others draw vertices. `count` defaults
/// to everything after `first` and is clamped to what the buffers hold.
#[derive(Debug, Clone, Default)]
pub struct RcDraw {
    pub vertex_array: Option<VertexArrayId>,
    pub primitive: PrimitiveType,
    pub first: u32,
    pub count: Option<u32>,
}

impl Poolable for RcDraw {}

impl RenderCommand<GlServer> for RcDraw {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.vertex_array else {
            return;
        };
        let has_program = server
            .state
            .current_shader
            .and_then(|shader| server.state.shaders.get(shader))
            .is_some_and(|shader| shader.native != 0);
        if !has_program {
            log::debug!("Skipping draw of {id:?}: no usable shader is current");
            return;
        }
        let Some(state) = server.state.vertex_arrays.get(id) else {
            log::debug!("Skipping draw of {id:?}: not live");
            return;
        };

        let indexed = state.index_count > 0;
        let available = if indexed {
            state.index_count
        } else {
            state.vertex_count
        };
        let remaining = available.saturating_sub(self.first);
        let count = match self.count {
            Some(requested) if requested > remaining => {
                log::debug!(
                    "Clamping draw of {id:?} from {requested} to {remaining} elements past {}",
                    self.first
                );
                remaining
            }
            Some(requested) => requested,
            None => remaining,
        };
        if count == 0 {
            return;
        }

        let device = &mut *server.device;
        let shadow = &mut server.shadow;
        if state.native != 0 {
            shadow.bind_vertex_array(device, state.native);
        } else {
            specify_attributes(shadow, device, state.vertex_buffer, &state.format);
            shadow.bind_buffer(device, BufferTarget::ElementArray, state.index_buffer);
        }

        if indexed {
            let offset = self.first as usize * state.index_format.size();
            device.draw_elements(
                self.primitive,
                count as i32,
                state.index_format,
                offset as i32,
            );
        } else {
            device.draw_arrays(self.primitive, self.first as i32, count as i32);
        }
        server.stats.draw_calls += 1;
    }
}
