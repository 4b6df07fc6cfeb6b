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

//! Vertex array commands.
//!
//! On GL 3.3 a vertex array owns a vertex array object that captures the
//! attribute layout and the index buffer. GL 2.x has no such object, so the
//! layout is kept in [`VertexArrayState`] and re-specified at every draw.

use ember_core::{Poolable, RenderCommand};

use crate::device::GlDevice;
use crate::server::GlServer;
use crate::shadow::ServerState;
use crate::state::VertexArrayState;
use crate::types::{BufferTarget, BufferUsage, IndexFormat, VertexArrayId, VertexFormat};

/// Points the attributes of `format` at `vertex_buffer`.
pub(crate) fn specify_attributes(
    shadow: &mut ServerState,
    device: &mut dyn GlDevice,
    vertex_buffer: u32,
    format: &VertexFormat,
) {
    shadow.bind_buffer(device, BufferTarget::Array, vertex_buffer);
    let locations: Vec<u32> = format
        .attributes
        .iter()
        .map(|attribute| attribute.location)
        .collect();
    shadow.set_enabled_attributes(device, &locations);
    for attribute in &format.attributes {
        device.vertex_attrib_pointer(attribute, format.stride);
    }
}

/// Creates the buffers (and, where available, the vertex array object) of a
/// vertex array with the given layout.
#[derive(Debug, Clone, Default)]
pub struct RcCreateVertexArray {
    pub vertex_array: Option<VertexArrayId>,
    pub format: VertexFormat,
}

impl Poolable for RcCreateVertexArray {
    fn reset(&mut self) {
        self.vertex_array = None;
        self.format.stride = 0;
        self.format.attributes.clear();
    }
}

impl RenderCommand<GlServer> for RcCreateVertexArray {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.vertex_array else {
            return;
        };
        let uses_objects = server.version().has_vertex_array_objects();
        let device = &mut *server.device;
        let vertex_buffer = device.create_buffer();
        let index_buffer = device.create_buffer();
        let native = if uses_objects {
            device.create_vertex_array()
        } else {
            0
        };

        if native != 0 {
            let format = &self.format;
            server
                .shadow
                .with_vertex_array_bound(device, native, |shadow, device| {
                    specify_attributes(shadow, device, vertex_buffer, format);
                    shadow.bind_buffer(device, BufferTarget::ElementArray, index_buffer);
                });
        }

        server.state.vertex_arrays.insert(
            id,
            VertexArrayState {
                native,
                vertex_buffer,
                index_buffer,
                format: std::mem::take(&mut self.format),
                ..VertexArrayState::default()
            },
        );
    }
}

/// Uploads vertex and/or index data to a vertex array. The upload buffers
/// are released once they reached the driver.
#[derive(Debug, Clone, Default)]
pub struct RcSetVertexArrayData {
    vertex_array: Option<VertexArrayId>,
    vertices: Option<(Vec<u8>, u32)>,
    indices: Option<(Vec<u8>, u32, IndexFormat)>,
    usage: BufferUsage,
}

impl RcSetVertexArrayData {
    /// Targets `vertex_array`, dropping whatever was requested before.
    pub fn reset_for(&mut self, vertex_array: VertexArrayId) -> &mut Self {
        self.reset();
        self.vertex_array = Some(vertex_array);
        self
    }

    /// The vertex array this command changes.
    pub fn vertex_array(&self) -> Option<VertexArrayId> {
        self.vertex_array
    }

    /// Uploads `count` vertices.
    pub fn set_vertices(&mut self, bytes: Vec<u8>, count: u32) -> &mut Self {
        self.vertices = Some((bytes, count));
        self
    }

    /// Uploads `count` indices of `format`.
    pub fn set_indices(&mut self, bytes: Vec<u8>, count: u32, format: IndexFormat) -> &mut Self {
        self.indices = Some((bytes, count, format));
        self
    }

    /// Sets the usage hint of the uploads.
    pub fn set_usage(&mut self, usage: BufferUsage) -> &mut Self {
        self.usage = usage;
        self
    }

    /// Whether an upload is still waiting for the driver.
    pub fn has_pending_upload(&self) -> bool {
        self.vertices.is_some() || self.indices.is_some()
    }
}

impl Poolable for RcSetVertexArrayData {}

impl RenderCommand<GlServer> for RcSetVertexArrayData {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.vertex_array else {
            return;
        };
        let vertices = self.vertices.take();
        let indices = self.indices.take();
        let usage = self.usage;
        let Some(state) = server.state.vertex_arrays.get_mut(id) else {
            log::debug!("Skipping upload to {id:?}: not live");
            return;
        };
        let device = &mut *server.device;
        let shadow = &mut server.shadow;

        if let Some((bytes, count)) = vertices {
            shadow.with_buffer_bound(device, BufferTarget::Array, state.vertex_buffer, |device| {
                device.buffer_data(BufferTarget::Array, &bytes, usage);
            });
            state.vertex_count = count;
        }
        if let Some((bytes, count, format)) = indices {
            let index_buffer = state.index_buffer;
            let upload = |shadow: &mut ServerState, device: &mut dyn GlDevice| {
                let target = BufferTarget::ElementArray;
                shadow.with_buffer_bound(device, target, index_buffer, |device| {
                    device.buffer_data(target, &bytes, usage);
                });
            };
            if state.native != 0 {
                // The element binding is vertex array state: go through the
                // object so the binding it captured is left untouched.
                shadow.with_vertex_array_bound(device, state.native, upload);
            } else {
                upload(shadow, device);
            }
            state.index_count = count;
            state.index_format = format;
        }
    }
}

/// Releases a vertex array; the entry is freed one buffer-swap cycle later.
#[derive(Debug, Clone, Default)]
pub struct RcDeleteVertexArray {
    pub vertex_array: Option<VertexArrayId>,
}

impl Poolable for RcDeleteVertexArray {}

impl RenderCommand<GlServer> for RcDeleteVertexArray {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.vertex_array else {
            return;
        };
        let Some(state) = server.state.vertex_arrays.get_mut(id) else {
            log::debug!("Ignoring deletion of {id:?}: not live");
            return;
        };
        let native = std::mem::take(&mut state.native);
        let buffers = [
            std::mem::take(&mut state.vertex_buffer),
            std::mem::take(&mut state.index_buffer),
        ];
        if native != 0 {
            server.shadow.forget_vertex_array(native);
            server.device.delete_vertex_array(native);
        }
        for buffer in buffers {
            server.shadow.forget_buffer(buffer);
            server.device.delete_buffer(buffer);
        }
        server.state.mark_vertex_array_as_deleted(id);
    }
}
