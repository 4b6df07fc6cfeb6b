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

//! Shadow copy of the driver's binding and global state.
//!
//! Every binding the commands make goes through [`ServerState`], which skips
//! calls that would not change anything and lets a command bind an object
//! temporarily and put the previous binding back afterwards.

use crate::device::GlDevice;
use crate::types::{BlendFunc, BufferTarget, Capabilities, Capability, CompareFunction, Rect};

/// Sentinel for a binding whose driver value is not known.
const UNKNOWN: u32 = u32::MAX;

/// What the consumer thread believes the driver state to be.
#[derive(Debug)]
pub struct ServerState {
    active_texture_unit: u32,
    texture_bindings: Vec<u32>,
    program: u32,
    framebuffer: u32,
    vertex_array: u32,
    array_buffer: u32,
    element_array_buffer: u32,
    /// Attribute arrays enabled on the default vertex array, sorted.
    enabled_attributes: Vec<u32>,
    enabled: Capabilities,
    viewport: Option<Rect>,
    scissor: Option<Rect>,
    clear_color: [f32; 4],
    clear_depth: f32,
    clear_stencil: i32,
    blend_func: Option<BlendFunc>,
    depth_func: Option<CompareFunction>,
    depth_write: Option<bool>,
    redundant_skipped: u64,
}

impl ServerState {
    /// Shadow state of a freshly created context with `texture_units` units.
    pub fn new(texture_units: u32) -> Self {
        Self {
            active_texture_unit: 0,
            texture_bindings: vec![0; texture_units as usize],
            program: 0,
            framebuffer: 0,
            vertex_array: 0,
            array_buffer: 0,
            element_array_buffer: 0,
            enabled_attributes: Vec::new(),
            enabled: Capabilities::MULTISAMPLE,
            viewport: None,
            scissor: None,
            clear_color: [0.0; 4],
            clear_depth: 1.0,
            clear_stencil: 0,
            blend_func: None,
            depth_func: None,
            depth_write: None,
            redundant_skipped: 0,
        }
    }

    fn skipped(&mut self) {
        self.redundant_skipped += 1;
    }

    /// Number of driver calls skipped because they would not change state.
    pub fn redundant_skipped(&self) -> u64 {
        self.redundant_skipped
    }

    // --- Texture units ---

    /// The active texture unit.
    pub fn active_texture_unit(&self) -> u32 {
        self.active_texture_unit
    }

    /// The texture bound to `unit`.
    pub fn texture_binding(&self, unit: u32) -> u32 {
        self.texture_bindings.get(unit as usize).copied().unwrap_or(0)
    }

    /// The texture bound to the active unit.
    pub fn bound_texture(&self) -> u32 {
        self.texture_binding(self.active_texture_unit)
    }

    pub(crate) fn active_texture(&mut self, device: &mut dyn GlDevice, unit: u32) {
        if self.active_texture_unit == unit {
            self.skipped();
            return;
        }
        device.active_texture(unit);
        self.active_texture_unit = unit;
    }

    pub(crate) fn bind_texture(&mut self, device: &mut dyn GlDevice, texture: u32) {
        let unit = self.active_texture_unit as usize;
        if self.texture_bindings.get(unit) == Some(&texture) {
            self.skipped();
            return;
        }
        device.bind_texture_2d(texture);
        if let Some(binding) = self.texture_bindings.get_mut(unit) {
            *binding = texture;
        }
    }

    /// Binds `texture` on the active unit for the duration of `f`, then
    /// restores the previous binding.
    pub(crate) fn with_texture_bound<R>(
        &mut self,
        device: &mut dyn GlDevice,
        texture: u32,
        f: impl FnOnce(&mut dyn GlDevice) -> R,
    ) -> R {
        let previous = self.bound_texture();
        self.bind_texture(device, texture);
        let result = f(device);
        self.bind_texture(device, previous);
        result
    }

    /// Mirrors the driver dropping bindings of a deleted texture.
    pub(crate) fn forget_texture(&mut self, texture: u32) {
        for binding in &mut self.texture_bindings {
            if *binding == texture {
                *binding = 0;
            }
        }
    }

    // --- Program ---

    /// The program in use.
    pub fn program(&self) -> u32 {
        self.program
    }

    pub(crate) fn use_program(&mut self, device: &mut dyn GlDevice, program: u32) {
        if self.program == program {
            self.skipped();
            return;
        }
        device.use_program(program);
        self.program = program;
    }

    pub(crate) fn forget_program(&mut self, program: u32) {
        if self.program == program {
            self.program = 0;
        }
    }

    // --- Framebuffer ---

    /// The bound framebuffer.
    pub fn framebuffer(&self) -> u32 {
        self.framebuffer
    }

    pub(crate) fn bind_framebuffer(&mut self, device: &mut dyn GlDevice, framebuffer: u32) {
        if self.framebuffer == framebuffer {
            self.skipped();
            return;
        }
        device.bind_framebuffer(framebuffer);
        self.framebuffer = framebuffer;
    }

    pub(crate) fn with_framebuffer_bound<R>(
        &mut self,
        device: &mut dyn GlDevice,
        framebuffer: u32,
        f: impl FnOnce(&mut dyn GlDevice) -> R,
    ) -> R {
        let previous = self.framebuffer;
        self.bind_framebuffer(device, framebuffer);
        let result = f(device);
        self.bind_framebuffer(device, previous);
        result
    }

    pub(crate) fn forget_framebuffer(&mut self, framebuffer: u32) {
        if self.framebuffer == framebuffer {
            self.framebuffer = 0;
        }
    }

    // --- Vertex arrays and buffers ---

    /// The bound vertex array object.
    pub fn vertex_array(&self) -> u32 {
        self.vertex_array
    }

    pub(crate) fn bind_vertex_array(&mut self, device: &mut dyn GlDevice, vertex_array: u32) {
        if self.vertex_array == vertex_array {
            self.skipped();
            return;
        }
        device.bind_vertex_array(vertex_array);
        self.vertex_array = vertex_array;
        // The element binding belongs to the vertex array object.
        self.element_array_buffer = UNKNOWN;
    }

    pub(crate) fn with_vertex_array_bound<R>(
        &mut self,
        device: &mut dyn GlDevice,
        vertex_array: u32,
        f: impl FnOnce(&mut Self, &mut dyn GlDevice) -> R,
    ) -> R {
        let previous = self.vertex_array;
        self.bind_vertex_array(device, vertex_array);
        let result = f(self, device);
        self.bind_vertex_array(device, previous);
        result
    }

    pub(crate) fn forget_vertex_array(&mut self, vertex_array: u32) {
        if self.vertex_array == vertex_array {
            self.vertex_array = 0;
            self.element_array_buffer = UNKNOWN;
        }
    }

    /// Attribute locations enabled on the default vertex array.
    pub fn enabled_attributes(&self) -> &[u32] {
        &self.enabled_attributes
    }

    /// Leaves exactly the attribute arrays in `locations` enabled.
    ///
    /// On the default vertex array the tracked set is diffed against
    /// `locations`: stale arrays are disabled and arrays already on are not
    /// enabled again. A bound vertex array object is assumed freshly created,
    /// with every array disabled.
    pub(crate) fn set_enabled_attributes(&mut self, device: &mut dyn GlDevice, locations: &[u32]) {
        if self.vertex_array != 0 {
            for &location in locations {
                device.enable_vertex_attrib_array(location);
            }
            return;
        }

        self.enabled_attributes.retain(|location| {
            let keep = locations.contains(location);
            if !keep {
                device.disable_vertex_attrib_array(*location);
            }
            keep
        });
        for &location in locations {
            match self.enabled_attributes.binary_search(&location) {
                Ok(_) => self.redundant_skipped += 1,
                Err(index) => {
                    device.enable_vertex_attrib_array(location);
                    self.enabled_attributes.insert(index, location);
                }
            }
        }
    }

    /// The buffer bound to `target`, `None` when unknown.
    pub fn buffer(&self, target: BufferTarget) -> Option<u32> {
        let bound = match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.element_array_buffer,
        };
        (bound != UNKNOWN).then_some(bound)
    }

    pub(crate) fn bind_buffer(
        &mut self,
        device: &mut dyn GlDevice,
        target: BufferTarget,
        buffer: u32,
    ) {
        let slot = match target {
            BufferTarget::Array => &mut self.array_buffer,
            BufferTarget::ElementArray => &mut self.element_array_buffer,
        };
        if *slot == buffer {
            self.redundant_skipped += 1;
            return;
        }
        device.bind_buffer(target, buffer);
        *slot = buffer;
    }

    pub(crate) fn with_buffer_bound<R>(
        &mut self,
        device: &mut dyn GlDevice,
        target: BufferTarget,
        buffer: u32,
        f: impl FnOnce(&mut dyn GlDevice) -> R,
    ) -> R {
        let previous = self.buffer(target);
        self.bind_buffer(device, target, buffer);
        let result = f(device);
        if let Some(previous) = previous {
            self.bind_buffer(device, target, previous);
        }
        result
    }

    pub(crate) fn forget_buffer(&mut self, buffer: u32) {
        if self.array_buffer == buffer {
            self.array_buffer = 0;
        }
        if self.element_array_buffer == buffer {
            self.element_array_buffer = 0;
        }
    }

    // --- Global state ---

    /// The enabled capabilities.
    pub fn enabled(&self) -> Capabilities {
        self.enabled
    }

    pub(crate) fn enable(&mut self, device: &mut dyn GlDevice, capability: Capability) {
        if self.enabled.contains(capability.flag()) {
            self.skipped();
            return;
        }
        device.enable(capability);
        self.enabled.insert(capability.flag());
    }

    pub(crate) fn disable(&mut self, device: &mut dyn GlDevice, capability: Capability) {
        if !self.enabled.contains(capability.flag()) {
            self.skipped();
            return;
        }
        device.disable(capability);
        self.enabled.remove(capability.flag());
    }

    pub(crate) fn set_viewport(&mut self, device: &mut dyn GlDevice, rect: Rect) {
        if self.viewport == Some(rect) {
            self.skipped();
            return;
        }
        device.viewport(rect);
        self.viewport = Some(rect);
    }

    pub(crate) fn set_scissor(&mut self, device: &mut dyn GlDevice, rect: Rect) {
        if self.scissor == Some(rect) {
            self.skipped();
            return;
        }
        device.scissor(rect);
        self.scissor = Some(rect);
    }

    /// The clear color, depth and stencil values.
    pub fn clear_values(&self) -> ([f32; 4], f32, i32) {
        (self.clear_color, self.clear_depth, self.clear_stencil)
    }

    pub(crate) fn set_clear_color(&mut self, device: &mut dyn GlDevice, color: [f32; 4]) {
        if self.clear_color == color {
            self.skipped();
            return;
        }
        device.clear_color(color);
        self.clear_color = color;
    }

    pub(crate) fn set_clear_depth(&mut self, device: &mut dyn GlDevice, depth: f32) {
        if self.clear_depth == depth {
            self.skipped();
            return;
        }
        device.clear_depth(depth);
        self.clear_depth = depth;
    }

    pub(crate) fn set_clear_stencil(&mut self, device: &mut dyn GlDevice, stencil: i32) {
        if self.clear_stencil == stencil {
            self.skipped();
            return;
        }
        device.clear_stencil(stencil);
        self.clear_stencil = stencil;
    }

    pub(crate) fn set_blend_func(&mut self, device: &mut dyn GlDevice, func: BlendFunc) {
        if self.blend_func == Some(func) {
            self.skipped();
            return;
        }
        device.blend_func(func);
        self.blend_func = Some(func);
    }

    pub(crate) fn set_depth_func(&mut self, device: &mut dyn GlDevice, func: CompareFunction) {
        if self.depth_func == Some(func) {
            self.skipped();
            return;
        }
        device.depth_func(func);
        self.depth_func = Some(func);
    }

    pub(crate) fn set_depth_write(&mut self, device: &mut dyn GlDevice, write: bool) {
        if self.depth_write == Some(write) {
            self.skipped();
            return;
        }
        device.depth_mask(write);
        self.depth_write = Some(write);
    }
}
