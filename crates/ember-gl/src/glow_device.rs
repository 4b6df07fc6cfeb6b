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

//! [`GlDevice`] over a real OpenGL context, through `glow`.

use std::any::Any;
use std::num::NonZeroU32;

use glow::HasContext;

use crate::config::GlVersion;
use crate::device::GlDevice;
use crate::types::{
    Attachment, BlendFactor, BlendFunc, BufferTarget, BufferUsage, Capability, ClearFlags,
    CompareFunction, FramebufferStatus, IndexFormat, PrimitiveType, Rect, ShaderStage,
    TextureFilter, TextureFormat, TextureWrapMode, UniformValue, VertexAttribute,
};

const ANISOTROPIC_EXTENSION: &str = "GL_EXT_texture_filter_anisotropic";

/// A driver backed by a `glow` context made current on this thread.
pub struct GlowDevice {
    gl: glow::Context,
    version: GlVersion,
    max_texture_units: u32,
    max_anisotropy: f32,
}

impl GlowDevice {
    /// Wraps a context. The context must stay current on the calling thread
    /// for as long as the device is used.
    pub fn new(gl: glow::Context, version: GlVersion) -> Self {
        // SAFETY: plain queries on a current context.
        let (max_texture_units, max_anisotropy) = unsafe {
            let units = gl.get_parameter_i32(glow::MAX_COMBINED_TEXTURE_IMAGE_UNITS);
            let anisotropy = if gl.supported_extensions().contains(ANISOTROPIC_EXTENSION) {
                gl.get_parameter_f32(glow::MAX_TEXTURE_MAX_ANISOTROPY_EXT)
            } else {
                1.0
            };
            (units.max(1) as u32, anisotropy.max(1.0))
        };
        log::info!(
            "OpenGL ready ({version:?}): {max_texture_units} units, anisotropy {max_anisotropy}"
        );
        Self {
            gl,
            version,
            max_texture_units,
            max_anisotropy,
        }
    }

    /// The wrapped context.
    pub fn context(&self) -> &glow::Context {
        &self.gl
    }
}

fn name(object: Result<NonZeroU32, String>, kind: &str) -> u32 {
    match object {
        Ok(object) => object.get(),
        Err(error) => {
            log::error!("Failed to create {kind}: {error}");
            0
        }
    }
}

fn texture(name: u32) -> Option<glow::NativeTexture> {
    NonZeroU32::new(name).map(glow::NativeTexture)
}

fn shader(name: u32) -> Option<glow::NativeShader> {
    NonZeroU32::new(name).map(glow::NativeShader)
}

fn program(name: u32) -> Option<glow::NativeProgram> {
    NonZeroU32::new(name).map(glow::NativeProgram)
}

fn framebuffer(name: u32) -> Option<glow::NativeFramebuffer> {
    NonZeroU32::new(name).map(glow::NativeFramebuffer)
}

fn buffer(name: u32) -> Option<glow::NativeBuffer> {
    NonZeroU32::new(name).map(glow::NativeBuffer)
}

fn vertex_array(name: u32) -> Option<glow::NativeVertexArray> {
    NonZeroU32::new(name).map(glow::NativeVertexArray)
}

fn texture_format(format: TextureFormat) -> (i32, u32, u32) {
    let (internal, layout, ty) = match format {
        TextureFormat::R8 => (glow::R8, glow::RED, glow::UNSIGNED_BYTE),
        TextureFormat::Rg8 => (glow::RG8, glow::RG, glow::UNSIGNED_BYTE),
        TextureFormat::Rgb8 => (glow::RGB8, glow::RGB, glow::UNSIGNED_BYTE),
        TextureFormat::Rgba8 => (glow::RGBA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::Srgb8Alpha8 => (glow::SRGB8_ALPHA8, glow::RGBA, glow::UNSIGNED_BYTE),
        TextureFormat::Rgba16Float => (glow::RGBA16F, glow::RGBA, glow::HALF_FLOAT),
        TextureFormat::Rgba32Float => (glow::RGBA32F, glow::RGBA, glow::FLOAT),
        TextureFormat::Depth24 => (
            glow::DEPTH_COMPONENT24,
            glow::DEPTH_COMPONENT,
            glow::UNSIGNED_INT,
        ),
        TextureFormat::Depth24Stencil8 => (
            glow::DEPTH24_STENCIL8,
            glow::DEPTH_STENCIL,
            glow::UNSIGNED_INT_24_8,
        ),
        TextureFormat::Depth32Float => (
            glow::DEPTH_COMPONENT32F,
            glow::DEPTH_COMPONENT,
            glow::FLOAT,
        ),
    };
    (internal as i32, layout, ty)
}

fn filter(filter: TextureFilter) -> i32 {
    (match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }) as i32
}

fn wrap(wrap: TextureWrapMode) -> i32 {
    (match wrap {
        TextureWrapMode::Repeat => glow::REPEAT,
        TextureWrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        TextureWrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
    }) as i32
}

fn attachment(attachment: Attachment) -> u32 {
    match attachment {
        Attachment::Color(index) => glow::COLOR_ATTACHMENT0 + index,
        Attachment::Depth => glow::DEPTH_ATTACHMENT,
        Attachment::DepthStencil => glow::DEPTH_STENCIL_ATTACHMENT,
    }
}

fn buffer_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::Blend => glow::BLEND,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::StencilTest => glow::STENCIL_TEST,
        Capability::ScissorTest => glow::SCISSOR_TEST,
        Capability::CullFace => glow::CULL_FACE,
        Capability::PolygonOffsetFill => glow::POLYGON_OFFSET_FILL,
        Capability::Multisample => glow::MULTISAMPLE,
        Capability::FramebufferSrgb => glow::FRAMEBUFFER_SRGB,
    }
}

fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
    }
}

fn compare(func: CompareFunction) -> u32 {
    match func {
        CompareFunction::Never => glow::NEVER,
        CompareFunction::Less => glow::LESS,
        CompareFunction::Equal => glow::EQUAL,
        CompareFunction::LessEqual => glow::LEQUAL,
        CompareFunction::Greater => glow::GREATER,
        CompareFunction::NotEqual => glow::NOTEQUAL,
        CompareFunction::GreaterEqual => glow::GEQUAL,
        CompareFunction::Always => glow::ALWAYS,
    }
}

fn primitive(primitive: PrimitiveType) -> u32 {
    match primitive {
        PrimitiveType::Points => glow::POINTS,
        PrimitiveType::Lines => glow::LINES,
        PrimitiveType::LineStrip => glow::LINE_STRIP,
        PrimitiveType::Triangles => glow::TRIANGLES,
        PrimitiveType::TriangleStrip => glow::TRIANGLE_STRIP,
        PrimitiveType::TriangleFan => glow::TRIANGLE_FAN,
    }
}

// SAFETY (every `unsafe` block below): the context is current on this
// thread and every object name passed in was created by this context.
impl GlDevice for GlowDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    fn create_texture(&mut self) -> u32 {
        name(unsafe { self.gl.create_texture() }.map(|t| t.0), "texture")
    }

    fn delete_texture(&mut self, name: u32) {
        if let Some(texture) = texture(name) {
            unsafe { self.gl.delete_texture(texture) }
        }
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn bind_texture_2d(&mut self, name: u32) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, texture(name)) }
    }

    fn tex_image_2d(
        &mut self,
        level: i32,
        format: TextureFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) {
        let (internal, layout, ty) = texture_format(format);
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                level,
                internal,
                width as i32,
                height as i32,
                0,
                layout,
                ty,
                pixels,
            )
        }
    }

    fn tex_filters(&mut self, min: TextureFilter, mag: TextureFilter) {
        unsafe {
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter(min));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter(mag));
        }
    }

    fn tex_wrap(&mut self, s: TextureWrapMode, t: TextureWrapMode) {
        unsafe {
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap(s));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap(t));
        }
    }

    fn tex_anisotropy(&mut self, level: f32) {
        if self.max_anisotropy > 1.0 {
            unsafe {
                self.gl.tex_parameter_f32(
                    glow::TEXTURE_2D,
                    glow::TEXTURE_MAX_ANISOTROPY_EXT,
                    level,
                )
            }
        }
    }

    fn generate_mipmap_2d(&mut self) {
        unsafe { self.gl.generate_mipmap(glow::TEXTURE_2D) }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        name(unsafe { self.gl.create_shader(kind) }.map(|s| s.0), "shader")
    }

    fn shader_source(&mut self, name: u32, source: &str) {
        if let Some(shader) = shader(name) {
            unsafe { self.gl.shader_source(shader, source) }
        }
    }

    fn compile_shader(&mut self, name: u32) {
        if let Some(shader) = shader(name) {
            unsafe { self.gl.compile_shader(shader) }
        }
    }

    fn shader_compile_status(&self, name: u32) -> bool {
        shader(name).is_some_and(|shader| unsafe { self.gl.get_shader_compile_status(shader) })
    }

    fn shader_info_log(&self, name: u32) -> String {
        shader(name)
            .map(|shader| unsafe { self.gl.get_shader_info_log(shader) })
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, name: u32) {
        if let Some(shader) = shader(name) {
            unsafe { self.gl.delete_shader(shader) }
        }
    }

    fn create_program(&mut self) -> u32 {
        name(unsafe { self.gl.create_program() }.map(|p| p.0), "program")
    }

    fn attach_shader(&mut self, program_name: u32, shader_name: u32) {
        if let (Some(program), Some(shader)) = (program(program_name), shader(shader_name)) {
            unsafe { self.gl.attach_shader(program, shader) }
        }
    }

    fn detach_shader(&mut self, program_name: u32, shader_name: u32) {
        if let (Some(program), Some(shader)) = (program(program_name), shader(shader_name)) {
            unsafe { self.gl.detach_shader(program, shader) }
        }
    }

    fn link_program(&mut self, name: u32) {
        if let Some(program) = program(name) {
            unsafe { self.gl.link_program(program) }
        }
    }

    fn program_link_status(&self, name: u32) -> bool {
        program(name).is_some_and(|program| unsafe { self.gl.get_program_link_status(program) })
    }

    fn program_info_log(&self, name: u32) -> String {
        program(name)
            .map(|program| unsafe { self.gl.get_program_info_log(program) })
            .unwrap_or_default()
    }

    fn delete_program(&mut self, name: u32) {
        if let Some(program) = program(name) {
            unsafe { self.gl.delete_program(program) }
        }
    }

    fn use_program(&mut self, name: u32) {
        unsafe { self.gl.use_program(program(name)) }
    }

    fn uniform_location(&mut self, name: u32, uniform: &str) -> Option<i32> {
        let program = program(name)?;
        unsafe { self.gl.get_uniform_location(program, uniform) }.map(|location| location.0 as i32)
    }

    fn set_uniform(&mut self, location: i32, value: UniformValue) {
        let location = glow::NativeUniformLocation(location as u32);
        let location = Some(&location);
        unsafe {
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(location, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(location, x, y, z, w),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    fn create_framebuffer(&mut self) -> u32 {
        name(unsafe { self.gl.create_framebuffer() }.map(|f| f.0), "framebuffer")
    }

    fn delete_framebuffer(&mut self, name: u32) {
        if let Some(framebuffer) = framebuffer(name) {
            unsafe { self.gl.delete_framebuffer(framebuffer) }
        }
    }

    fn bind_framebuffer(&mut self, name: u32) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, framebuffer(name)) }
    }

    fn framebuffer_texture_2d(&mut self, point: Attachment, name: u32) {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                attachment(point),
                glow::TEXTURE_2D,
                texture(name),
                0,
            )
        }
    }

    fn draw_buffers(&mut self, color_attachments: &[u32]) {
        let buffers: Vec<u32> = color_attachments
            .iter()
            .map(|index| glow::COLOR_ATTACHMENT0 + index)
            .collect();
        unsafe { self.gl.draw_buffers(&buffers) }
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        match unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) } {
            glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
            glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
            glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
                FramebufferStatus::MissingAttachment
            }
            glow::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => FramebufferStatus::IncompleteDrawBuffer,
            glow::FRAMEBUFFER_UNSUPPORTED => FramebufferStatus::Unsupported,
            other => FramebufferStatus::Unknown(other),
        }
    }

    fn create_buffer(&mut self) -> u32 {
        name(unsafe { self.gl.create_buffer() }.map(|b| b.0), "buffer")
    }

    fn delete_buffer(&mut self, name: u32) {
        if let Some(buffer) = buffer(name) {
            unsafe { self.gl.delete_buffer(buffer) }
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, name: u32) {
        unsafe { self.gl.bind_buffer(buffer_target(target), buffer(name)) }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let usage = match usage {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
            BufferUsage::Stream => glow::STREAM_DRAW,
        };
        unsafe {
            self.gl
                .buffer_data_u8_slice(buffer_target(target), data, usage)
        }
    }

    fn create_vertex_array(&mut self) -> u32 {
        if !self.version.has_vertex_array_objects() {
            return 0;
        }
        name(
            unsafe { self.gl.create_vertex_array() }.map(|v| v.0),
            "vertex array",
        )
    }

    fn delete_vertex_array(&mut self, name: u32) {
        if let Some(vertex_array) = vertex_array(name) {
            unsafe { self.gl.delete_vertex_array(vertex_array) }
        }
    }

    fn bind_vertex_array(&mut self, name: u32) {
        if self.version.has_vertex_array_objects() {
            unsafe { self.gl.bind_vertex_array(vertex_array(name)) }
        }
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(location) }
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(location) }
    }

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, stride: i32) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components,
                glow::FLOAT,
                attribute.normalized,
                stride,
                attribute.offset,
            )
        }
    }

    fn enable(&mut self, cap: Capability) {
        unsafe { self.gl.enable(capability(cap)) }
    }

    fn disable(&mut self, cap: Capability) {
        unsafe { self.gl.disable(capability(cap)) }
    }

    fn viewport(&mut self, rect: Rect) {
        unsafe { self.gl.viewport(rect.x, rect.y, rect.width, rect.height) }
    }

    fn scissor(&mut self, rect: Rect) {
        unsafe { self.gl.scissor(rect.x, rect.y, rect.width, rect.height) }
    }

    fn clear_color(&mut self, [r, g, b, a]: [f32; 4]) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_depth(&mut self, depth: f32) {
        unsafe { self.gl.clear_depth_f32(depth) }
    }

    fn clear_stencil(&mut self, stencil: i32) {
        unsafe { self.gl.clear_stencil(stencil) }
    }

    fn blend_func(&mut self, func: BlendFunc) {
        unsafe {
            self.gl
                .blend_func(blend_factor(func.src), blend_factor(func.dst))
        }
    }

    fn depth_func(&mut self, func: CompareFunction) {
        unsafe { self.gl.depth_func(compare(func)) }
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe { self.gl.depth_mask(write) }
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) }
    }

    fn draw_arrays(&mut self, mode: PrimitiveType, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(primitive(mode), first, count) }
    }

    fn draw_elements(&mut self, mode: PrimitiveType, count: i32, format: IndexFormat, offset: i32) {
        let element_type = match format {
            IndexFormat::U16 => glow::UNSIGNED_SHORT,
            IndexFormat::U32 => glow::UNSIGNED_INT,
        };
        unsafe {
            self.gl
                .draw_elements(primitive(mode), count, element_type, offset)
        }
    }
}
