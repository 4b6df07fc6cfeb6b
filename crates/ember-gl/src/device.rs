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

//! The driver seam: every OpenGL entry point the render commands use.

use std::any::Any;

use crate::types::{
    Attachment, BlendFunc, BufferTarget, BufferUsage, Capability, ClearFlags, CompareFunction,
    FramebufferStatus, IndexFormat, PrimitiveType, Rect, ShaderStage, TextureFilter,
    TextureFormat, TextureWrapMode, UniformValue, VertexAttribute,
};

/// A raw OpenGL driver.
///
/// Objects are named by their native `u32` names, `0` meaning "none" exactly
/// like in OpenGL. Implementations do not cache anything: redundant-call
/// elimination and binding restoration are the job of
/// [`crate::ServerState`], which sits in front of the device.
///
/// A device is bound to the thread that created its context, which is why
/// the trait does not require `Send`.
pub trait GlDevice {
    /// Allows downcasting to the concrete device.
    fn as_any(&self) -> &dyn Any;

    /// Allows mutable downcasting to the concrete device.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Number of combined texture image units.
    fn max_texture_units(&self) -> u32;

    /// Maximum anisotropy level, `1.0` when anisotropic filtering is missing.
    fn max_anisotropy(&self) -> f32;

    // --- Textures ---

    fn create_texture(&mut self) -> u32;
    fn delete_texture(&mut self, texture: u32);
    /// Selects the texture unit subsequent texture bindings apply to.
    fn active_texture(&mut self, unit: u32);
    fn bind_texture_2d(&mut self, texture: u32);
    /// Specifies level `level` of the bound 2D texture.
    fn tex_image_2d(
        &mut self,
        level: i32,
        format: TextureFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    );
    fn tex_filters(&mut self, min: TextureFilter, mag: TextureFilter);
    fn tex_wrap(&mut self, s: TextureWrapMode, t: TextureWrapMode);
    fn tex_anisotropy(&mut self, level: f32);
    fn generate_mipmap_2d(&mut self);

    // --- Shaders and programs ---

    fn create_shader(&mut self, stage: ShaderStage) -> u32;
    fn shader_source(&mut self, shader: u32, source: &str);
    fn compile_shader(&mut self, shader: u32);
    fn shader_compile_status(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32) -> String;
    fn delete_shader(&mut self, shader: u32);
    fn create_program(&mut self) -> u32;
    fn attach_shader(&mut self, program: u32, shader: u32);
    fn detach_shader(&mut self, program: u32, shader: u32);
    fn link_program(&mut self, program: u32);
    fn program_link_status(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32) -> String;
    fn delete_program(&mut self, program: u32);
    fn use_program(&mut self, program: u32);
    /// Location of a uniform of `program`, `None` if it is not active.
    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32>;
    /// Sets a uniform of the program in use.
    fn set_uniform(&mut self, location: i32, value: UniformValue);

    // --- Framebuffers ---

    fn create_framebuffer(&mut self) -> u32;
    fn delete_framebuffer(&mut self, framebuffer: u32);
    fn bind_framebuffer(&mut self, framebuffer: u32);
    /// Attaches level 0 of `texture` (or detaches with `0`) to the bound framebuffer.
    fn framebuffer_texture_2d(&mut self, attachment: Attachment, texture: u32);
    /// Selects the color attachments written by fragment outputs.
    fn draw_buffers(&mut self, color_attachments: &[u32]);
    fn check_framebuffer_status(&self) -> FramebufferStatus;

    // --- Buffers and vertex arrays ---

    fn create_buffer(&mut self) -> u32;
    fn delete_buffer(&mut self, buffer: u32);
    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32);
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Returns `0` on drivers without vertex array objects.
    fn create_vertex_array(&mut self) -> u32;
    fn delete_vertex_array(&mut self, vertex_array: u32);
    fn bind_vertex_array(&mut self, vertex_array: u32);
    fn enable_vertex_attrib_array(&mut self, location: u32);
    fn disable_vertex_attrib_array(&mut self, location: u32);
    /// Describes a float attribute sourced from the bound array buffer.
    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, stride: i32);

    // --- Global state ---

    fn enable(&mut self, capability: Capability);
    fn disable(&mut self, capability: Capability);
    fn viewport(&mut self, rect: Rect);
    fn scissor(&mut self, rect: Rect);
    fn clear_color(&mut self, color: [f32; 4]);
    fn clear_depth(&mut self, depth: f32);
    fn clear_stencil(&mut self, stencil: i32);
    fn blend_func(&mut self, func: BlendFunc);
    fn depth_func(&mut self, func: CompareFunction);
    fn depth_mask(&mut self, write: bool);

    // --- Drawing ---

    fn clear(&mut self, flags: ClearFlags);
    fn draw_arrays(&mut self, primitive: PrimitiveType, first: i32, count: i32);
    /// Draws `count` indices starting `offset` bytes into the bound index buffer.
    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: i32,
        format: IndexFormat,
        offset: i32,
    );
}
