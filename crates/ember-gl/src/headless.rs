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

//! A software stand-in for an OpenGL driver.
//!
//! [`HeadlessDevice`] keeps just enough object state to answer the queries
//! the commands make (compile status, framebuffer completeness, texture
//! dimensions) and records every call it receives, which is what the tests
//! and the sandbox inspect.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::config::GlVersion;
use crate::device::GlDevice;
use crate::types::{
    Attachment, BlendFunc, BufferTarget, BufferUsage, Capabilities, Capability, ClearFlags,
    CompareFunction, FramebufferStatus, IndexFormat, PrimitiveType, Rect, ShaderStage,
    TextureFilter, TextureFormat, TextureWrapMode, UniformValue, VertexAttribute,
};

/// A driver call received by a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateTexture(u32),
    DeleteTexture(u32),
    ActiveTexture(u32),
    BindTexture(u32),
    TexImage2D {
        level: i32,
        format: TextureFormat,
        width: u32,
        height: u32,
        has_pixels: bool,
    },
    TexFilters(TextureFilter, TextureFilter),
    TexWrap(TextureWrapMode, TextureWrapMode),
    TexAnisotropy(f32),
    GenerateMipmap,
    CreateShader(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(u32),
    Uniform(i32, UniformValue),
    CreateFramebuffer(u32),
    DeleteFramebuffer(u32),
    BindFramebuffer(u32),
    FramebufferTexture(Attachment, u32),
    DrawBuffers(Vec<u32>),
    CheckFramebufferStatus,
    CreateBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer(BufferTarget, u32),
    BufferData(BufferTarget, usize),
    CreateVertexArray(u32),
    DeleteVertexArray(u32),
    BindVertexArray(u32),
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    VertexAttribPointer(u32),
    Enable(Capability),
    Disable(Capability),
    Viewport(Rect),
    Scissor(Rect),
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    BlendFunc(BlendFunc),
    DepthFunc(CompareFunction),
    DepthMask(bool),
    Clear(ClearFlags),
    DrawArrays(PrimitiveType, i32),
    DrawElements(PrimitiveType, i32),
}

/// One specified level of a simulated texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLevel {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

/// A simulated texture object.
#[derive(Debug, Clone, Default)]
pub struct HeadlessTexture {
    pub levels: BTreeMap<i32, TextureLevel>,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap: (TextureWrapMode, TextureWrapMode),
    pub anisotropy: f32,
    pub mipmaps_generated: bool,
}

impl HeadlessTexture {
    /// The base level, if it was specified.
    pub fn base_level(&self) -> Option<TextureLevel> {
        self.levels.get(&0).copied()
    }
}

#[derive(Debug)]
struct HeadlessShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct HeadlessProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    locations: AHashMap<String, i32>,
    values: AHashMap<i32, UniformValue>,
}

#[derive(Debug, Default)]
struct HeadlessVertexArray {
    element_buffer: u32,
    attributes: BTreeMap<u32, u32>,
    enabled_attributes: BTreeSet<u32>,
}

/// A recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRecord {
    pub primitive: PrimitiveType,
    pub first: i32,
    pub count: i32,
    pub indexed: bool,
    pub program: u32,
    pub framebuffer: u32,
    pub vertex_array: u32,
}

/// Simulated OpenGL driver used by tests and the sandbox.
#[derive(Debug)]
pub struct HeadlessDevice {
    calls: Vec<GlCall>,
    next_name: u32,
    supports_vertex_arrays: bool,
    max_anisotropy: f32,

    textures: AHashMap<u32, HeadlessTexture>,
    unit_bindings: Vec<u32>,
    active_unit: u32,

    shaders: AHashMap<u32, HeadlessShader>,
    programs: AHashMap<u32, HeadlessProgram>,
    program: u32,

    framebuffers: AHashMap<u32, BTreeMap<Attachment, u32>>,
    framebuffer: u32,

    buffers: AHashMap<u32, Vec<u8>>,
    array_buffer: u32,
    // Element binding used while no vertex array object is bound.
    loose_element_buffer: u32,
    loose_enabled_attributes: BTreeSet<u32>,
    vertex_arrays: AHashMap<u32, HeadlessVertexArray>,
    vertex_array: u32,

    enabled: Capabilities,
    viewport: Rect,
    scissor: Rect,
    clear_color: [f32; 4],
    blend_func: BlendFunc,
    depth_func: CompareFunction,
    depth_mask: bool,

    draws: Vec<DrawRecord>,
}

impl HeadlessDevice {
    /// A device exposing `max_texture_units` units and vertex array objects.
    pub fn new(max_texture_units: u32) -> Self {
        Self {
            calls: Vec::new(),
            next_name: 0,
            supports_vertex_arrays: true,
            max_anisotropy: 16.0,
            textures: AHashMap::new(),
            unit_bindings: vec![0; max_texture_units as usize],
            active_unit: 0,
            shaders: AHashMap::new(),
            programs: AHashMap::new(),
            program: 0,
            framebuffers: AHashMap::new(),
            framebuffer: 0,
            buffers: AHashMap::new(),
            array_buffer: 0,
            loose_element_buffer: 0,
            loose_enabled_attributes: BTreeSet::new(),
            vertex_arrays: AHashMap::new(),
            vertex_array: 0,
            enabled: Capabilities::MULTISAMPLE,
            viewport: Rect::default(),
            scissor: Rect::default(),
            clear_color: [0.0; 4],
            blend_func: BlendFunc::default(),
            depth_func: CompareFunction::Less,
            depth_mask: true,
            draws: Vec::new(),
        }
    }

    /// A device shaped like a driver of the given version.
    pub fn for_version(version: GlVersion) -> Self {
        let mut device = Self::new(match version {
            GlVersion::Gl20 | GlVersion::Gl21 => 8,
            GlVersion::Gl33 => 16,
        });
        device.supports_vertex_arrays = version.has_vertex_array_objects();
        device
    }

    fn gen_name(&mut self) -> u32 {
        self.next_name += 1;
        self.next_name
    }

    fn record(&mut self, call: GlCall) {
        log::trace!("headless: {call:?}");
        self.calls.push(call);
    }

    /// Every call received since the last [`Self::take_calls`].
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of logged calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// The simulated texture named `texture`.
    pub fn texture(&self, texture: u32) -> Option<&HeadlessTexture> {
        self.textures.get(&texture)
    }

    /// Whether a program named `program` exists.
    pub fn program_exists(&self, program: u32) -> bool {
        self.programs.contains_key(&program)
    }

    /// Whether a framebuffer named `framebuffer` exists.
    pub fn framebuffer_exists(&self, framebuffer: u32) -> bool {
        self.framebuffers.contains_key(&framebuffer)
    }

    /// Whether a buffer named `buffer` exists.
    pub fn buffer_len(&self, buffer: u32) -> Option<usize> {
        self.buffers.get(&buffer).map(Vec::len)
    }

    /// Texture bound to `unit`.
    pub fn bound_texture(&self, unit: u32) -> u32 {
        self.unit_bindings.get(unit as usize).copied().unwrap_or(0)
    }

    /// The active texture unit.
    pub fn active_unit(&self) -> u32 {
        self.active_unit
    }

    /// The program in use.
    pub fn current_program(&self) -> u32 {
        self.program
    }

    /// The bound framebuffer.
    pub fn current_framebuffer(&self) -> u32 {
        self.framebuffer
    }

    /// The bound vertex array object.
    pub fn current_vertex_array(&self) -> u32 {
        self.vertex_array
    }

    /// The bound array buffer.
    pub fn current_array_buffer(&self) -> u32 {
        self.array_buffer
    }

    /// The attachment of `framebuffer` at `attachment`, `0` when empty.
    pub fn framebuffer_attachment(&self, framebuffer: u32, attachment: Attachment) -> u32 {
        self.framebuffers
            .get(&framebuffer)
            .and_then(|attachments| attachments.get(&attachment).copied())
            .unwrap_or(0)
    }

    /// Whether `capability` is enabled.
    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(capability.flag())
    }

    /// The current viewport.
    pub fn viewport_rect(&self) -> Rect {
        self.viewport
    }

    /// The current scissor box.
    pub fn scissor_rect(&self) -> Rect {
        self.scissor
    }

    /// The current clear color.
    pub fn clear_color_value(&self) -> [f32; 4] {
        self.clear_color
    }

    /// The current blend function and depth state.
    pub fn blend_and_depth(&self) -> (BlendFunc, CompareFunction, bool) {
        (self.blend_func, self.depth_func, self.depth_mask)
    }

    /// Last value written to uniform `name` of `program`.
    pub fn uniform_value(&self, program: u32, name: &str) -> Option<UniformValue> {
        let program = self.programs.get(&program)?;
        let location = program.locations.get(name)?;
        program.values.get(location).copied()
    }

    /// Attribute locations enabled on the bound vertex array, or on the
    /// default one when none is bound.
    pub fn enabled_attribute_arrays(&self) -> Vec<u32> {
        let enabled = match self.vertex_arrays.get(&self.vertex_array) {
            Some(vertex_array) => &vertex_array.enabled_attributes,
            None => &self.loose_enabled_attributes,
        };
        enabled.iter().copied().collect()
    }

    /// The draws issued so far.
    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    /// Number of live driver objects of every kind.
    pub fn live_object_count(&self) -> usize {
        self.textures.len()
            + self.shaders.len()
            + self.programs.len()
            + self.framebuffers.len()
            + self.buffers.len()
            + self.vertex_arrays.len()
    }

    fn bound_element_buffer(&self) -> u32 {
        match self.vertex_arrays.get(&self.vertex_array) {
            Some(vertex_array) => vertex_array.element_buffer,
            None => self.loose_element_buffer,
        }
    }

    fn bound_enabled_attributes_mut(&mut self) -> &mut BTreeSet<u32> {
        match self.vertex_arrays.get_mut(&self.vertex_array) {
            Some(vertex_array) => &mut vertex_array.enabled_attributes,
            None => &mut self.loose_enabled_attributes,
        }
    }

    fn bound_texture_mut(&mut self) -> Option<&mut HeadlessTexture> {
        let name = self.bound_texture(self.active_unit);
        self.textures.get_mut(&name)
    }

    fn attachment_level(&self, texture: u32) -> Option<TextureLevel> {
        self.textures.get(&texture).and_then(HeadlessTexture::base_level)
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::for_version(GlVersion::default())
    }
}

impl GlDevice for HeadlessDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn max_texture_units(&self) -> u32 {
        self.unit_bindings.len() as u32
    }

    fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    fn create_texture(&mut self) -> u32 {
        let name = self.gen_name();
        self.textures.insert(
            name,
            HeadlessTexture {
                anisotropy: 1.0,
                ..HeadlessTexture::default()
            },
        );
        self.record(GlCall::CreateTexture(name));
        name
    }

    fn delete_texture(&mut self, texture: u32) {
        self.record(GlCall::DeleteTexture(texture));
        if self.textures.remove(&texture).is_some() {
            for binding in &mut self.unit_bindings {
                if *binding == texture {
                    *binding = 0;
                }
            }
            for attachments in self.framebuffers.values_mut() {
                attachments.retain(|_, attached| *attached != texture);
            }
        }
    }

    fn active_texture(&mut self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
        if unit < self.max_texture_units() {
            self.active_unit = unit;
        } else {
            log::warn!("headless: texture unit {unit} out of range");
        }
    }

    fn bind_texture_2d(&mut self, texture: u32) {
        self.record(GlCall::BindTexture(texture));
        if let Some(binding) = self.unit_bindings.get_mut(self.active_unit as usize) {
            *binding = texture;
        }
    }

    fn tex_image_2d(
        &mut self,
        level: i32,
        format: TextureFormat,
        width: u32,
        height: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2D {
            level,
            format,
            width,
            height,
            has_pixels: pixels.is_some(),
        });
        if let Some(texture) = self.bound_texture_mut() {
            texture.levels.insert(
                level,
                TextureLevel {
                    width,
                    height,
                    format,
                },
            );
        }
    }

    fn tex_filters(&mut self, min: TextureFilter, mag: TextureFilter) {
        self.record(GlCall::TexFilters(min, mag));
        if let Some(texture) = self.bound_texture_mut() {
            texture.min_filter = min;
            texture.mag_filter = mag;
        }
    }

    fn tex_wrap(&mut self, s: TextureWrapMode, t: TextureWrapMode) {
        self.record(GlCall::TexWrap(s, t));
        if let Some(texture) = self.bound_texture_mut() {
            texture.wrap = (s, t);
        }
    }

    fn tex_anisotropy(&mut self, level: f32) {
        self.record(GlCall::TexAnisotropy(level));
        if let Some(texture) = self.bound_texture_mut() {
            texture.anisotropy = level;
        }
    }

    fn generate_mipmap_2d(&mut self) {
        self.record(GlCall::GenerateMipmap);
        if let Some(texture) = self.bound_texture_mut() {
            if let Some(base) = texture.base_level() {
                let (mut width, mut height, mut level) = (base.width, base.height, 0);
                while width > 1 || height > 1 {
                    width = (width / 2).max(1);
                    height = (height / 2).max(1);
                    level += 1;
                    texture.levels.insert(
                        level,
                        TextureLevel {
                            width,
                            height,
                            format: base.format,
                        },
                    );
                }
                texture.mipmaps_generated = true;
            }
        }
    }

    fn create_shader(&mut self, stage: ShaderStage) -> u32 {
        let name = self.gen_name();
        self.shaders.insert(
            name,
            HeadlessShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        self.record(GlCall::CreateShader(name));
        name
    }

    fn shader_source(&mut self, shader: u32, source: &str) {
        if let Some(shader) = self.shaders.get_mut(&shader) {
            shader.source = source.to_owned();
        }
    }

    fn compile_shader(&mut self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
        if let Some(shader) = self.shaders.get_mut(&shader) {
            shader.compiled = !shader.source.contains("#error");
            shader.log = if shader.compiled {
                String::new()
            } else {
                format!("ERROR: 0:1: '#error' : {:?} stage rejected", shader.stage)
            };
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.get(&shader).is_some_and(|shader| shader.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.shaders
            .get(&shader)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
        self.shaders.remove(&shader);
    }

    fn create_program(&mut self) -> u32 {
        let name = self.gen_name();
        self.programs.insert(name, HeadlessProgram::default());
        self.record(GlCall::CreateProgram(name));
        name
    }

    fn attach_shader(&mut self, program: u32, shader: u32) {
        if let Some(program) = self.programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    fn detach_shader(&mut self, program: u32, shader: u32) {
        if let Some(program) = self.programs.get_mut(&program) {
            program.attached.retain(|attached| *attached != shader);
        }
    }

    fn link_program(&mut self, program: u32) {
        self.record(GlCall::LinkProgram(program));
        let Some(state) = self.programs.get(&program) else {
            return;
        };
        let failed: Vec<u32> = state
            .attached
            .iter()
            .copied()
            .filter(|shader| !self.shader_compile_status(*shader))
            .collect();
        let empty = state.attached.is_empty();
        if let Some(state) = self.programs.get_mut(&program) {
            state.linked = !empty && failed.is_empty();
            state.log = if empty {
                "error: no shaders attached".to_owned()
            } else if !failed.is_empty() {
                format!("error: shaders {failed:?} are not compiled")
            } else {
                String::new()
            };
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.get(&program).is_some_and(|program| program.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.programs
            .get(&program)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&mut self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
        self.programs.remove(&program);
        if self.program == program {
            self.program = 0;
        }
    }

    fn use_program(&mut self, program: u32) {
        self.record(GlCall::UseProgram(program));
        self.program = program;
    }

    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32> {
        let program = self.programs.get_mut(&program)?;
        if !program.linked {
            return None;
        }
        let next = program.locations.len() as i32;
        Some(*program.locations.entry(name.to_owned()).or_insert(next))
    }

    fn set_uniform(&mut self, location: i32, value: UniformValue) {
        self.record(GlCall::Uniform(location, value));
        if let Some(program) = self.programs.get_mut(&self.program) {
            program.values.insert(location, value);
        }
    }

    fn create_framebuffer(&mut self) -> u32 {
        let name = self.gen_name();
        self.framebuffers.insert(name, BTreeMap::new());
        self.record(GlCall::CreateFramebuffer(name));
        name
    }

    fn delete_framebuffer(&mut self, framebuffer: u32) {
        self.record(GlCall::DeleteFramebuffer(framebuffer));
        self.framebuffers.remove(&framebuffer);
        if self.framebuffer == framebuffer {
            self.framebuffer = 0;
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: u32) {
        self.record(GlCall::BindFramebuffer(framebuffer));
        self.framebuffer = framebuffer;
    }

    fn framebuffer_texture_2d(&mut self, attachment: Attachment, texture: u32) {
        self.record(GlCall::FramebufferTexture(attachment, texture));
        if let Some(attachments) = self.framebuffers.get_mut(&self.framebuffer) {
            if texture == 0 {
                attachments.remove(&attachment);
            } else {
                attachments.insert(attachment, texture);
            }
        }
    }

    fn draw_buffers(&mut self, color_attachments: &[u32]) {
        self.record(GlCall::DrawBuffers(color_attachments.to_vec()));
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        if self.framebuffer == 0 {
            return FramebufferStatus::Complete;
        }
        let Some(attachments) = self.framebuffers.get(&self.framebuffer) else {
            return FramebufferStatus::Unknown(0);
        };
        if attachments.is_empty() {
            return FramebufferStatus::MissingAttachment;
        }
        let mut size = None;
        for (attachment, texture) in attachments {
            let Some(level) = self.attachment_level(*texture) else {
                return FramebufferStatus::IncompleteAttachment;
            };
            let wants_depth = !matches!(attachment, Attachment::Color(_));
            if wants_depth != level.format.is_depth() {
                return FramebufferStatus::IncompleteAttachment;
            }
            if *attachment == Attachment::DepthStencil && !level.format.has_stencil() {
                return FramebufferStatus::IncompleteAttachment;
            }
            match size {
                None => size = Some((level.width, level.height)),
                Some(size) if size != (level.width, level.height) => {
                    return FramebufferStatus::IncompleteDimensions;
                }
                Some(_) => {}
            }
        }
        FramebufferStatus::Complete
    }

    fn create_buffer(&mut self) -> u32 {
        let name = self.gen_name();
        self.buffers.insert(name, Vec::new());
        self.record(GlCall::CreateBuffer(name));
        name
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
        if self.buffers.remove(&buffer).is_some() {
            if self.array_buffer == buffer {
                self.array_buffer = 0;
            }
            if self.loose_element_buffer == buffer {
                self.loose_element_buffer = 0;
            }
            for vertex_array in self.vertex_arrays.values_mut() {
                if vertex_array.element_buffer == buffer {
                    vertex_array.element_buffer = 0;
                }
            }
        }
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: u32) {
        self.record(GlCall::BindBuffer(target, buffer));
        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => match self.vertex_arrays.get_mut(&self.vertex_array) {
                Some(vertex_array) => vertex_array.element_buffer = buffer,
                None => self.loose_element_buffer = buffer,
            },
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        self.record(GlCall::BufferData(target, data.len()));
        let bound = match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.bound_element_buffer(),
        };
        if let Some(buffer) = self.buffers.get_mut(&bound) {
            buffer.clear();
            buffer.extend_from_slice(data);
        }
    }

    fn create_vertex_array(&mut self) -> u32 {
        if !self.supports_vertex_arrays {
            return 0;
        }
        let name = self.gen_name();
        self.vertex_arrays
            .insert(name, HeadlessVertexArray::default());
        self.record(GlCall::CreateVertexArray(name));
        name
    }

    fn delete_vertex_array(&mut self, vertex_array: u32) {
        self.record(GlCall::DeleteVertexArray(vertex_array));
        self.vertex_arrays.remove(&vertex_array);
        if self.vertex_array == vertex_array {
            self.vertex_array = 0;
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: u32) {
        self.record(GlCall::BindVertexArray(vertex_array));
        self.vertex_array = vertex_array;
    }

    fn enable_vertex_attrib_array(&mut self, location: u32) {
        self.record(GlCall::EnableVertexAttribArray(location));
        self.bound_enabled_attributes_mut().insert(location);
    }

    fn disable_vertex_attrib_array(&mut self, location: u32) {
        self.record(GlCall::DisableVertexAttribArray(location));
        self.bound_enabled_attributes_mut().remove(&location);
    }

    fn vertex_attrib_pointer(&mut self, attribute: &VertexAttribute, _stride: i32) {
        self.record(GlCall::VertexAttribPointer(attribute.location));
        let buffer = self.array_buffer;
        if let Some(vertex_array) = self.vertex_arrays.get_mut(&self.vertex_array) {
            vertex_array.attributes.insert(attribute.location, buffer);
        }
    }

    fn enable(&mut self, capability: Capability) {
        self.record(GlCall::Enable(capability));
        self.enabled.insert(capability.flag());
    }

    fn disable(&mut self, capability: Capability) {
        self.record(GlCall::Disable(capability));
        self.enabled.remove(capability.flag());
    }

    fn viewport(&mut self, rect: Rect) {
        self.record(GlCall::Viewport(rect));
        self.viewport = rect;
    }

    fn scissor(&mut self, rect: Rect) {
        self.record(GlCall::Scissor(rect));
        self.scissor = rect;
    }

    fn clear_color(&mut self, color: [f32; 4]) {
        self.record(GlCall::ClearColor(color));
        self.clear_color = color;
    }

    fn clear_depth(&mut self, depth: f32) {
        self.record(GlCall::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.record(GlCall::ClearStencil(stencil));
    }

    fn blend_func(&mut self, func: BlendFunc) {
        self.record(GlCall::BlendFunc(func));
        self.blend_func = func;
    }

    fn depth_func(&mut self, func: CompareFunction) {
        self.record(GlCall::DepthFunc(func));
        self.depth_func = func;
    }

    fn depth_mask(&mut self, write: bool) {
        self.record(GlCall::DepthMask(write));
        self.depth_mask = write;
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(GlCall::Clear(flags));
    }

    fn draw_arrays(&mut self, primitive: PrimitiveType, first: i32, count: i32) {
        self.record(GlCall::DrawArrays(primitive, count));
        self.draws.push(DrawRecord {
            primitive,
            first,
            count,
            indexed: false,
            program: self.program,
            framebuffer: self.framebuffer,
            vertex_array: self.vertex_array,
        });
    }

    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: i32,
        format: IndexFormat,
        offset: i32,
    ) {
        self.record(GlCall::DrawElements(primitive, count));
        self.draws.push(DrawRecord {
            primitive,
            first: offset / format.size() as i32,
            count,
            indexed: true,
            program: self.program,
            framebuffer: self.framebuffer,
            vertex_array: self.vertex_array,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleting_a_bound_texture_unbinds_it() {
        let mut device = HeadlessDevice::new(4);
        let texture = device.create_texture();
        device.active_texture(2);
        device.bind_texture_2d(texture);
        device.delete_texture(texture);
        assert_eq!(device.bound_texture(2), 0);
        assert!(device.texture(texture).is_none());
    }

    #[test]
    fn test_error_directive_fails_compilation_and_link() {
        let mut device = HeadlessDevice::new(4);
        let vertex = device.create_shader(ShaderStage::Vertex);
        device.shader_source(vertex, "void main() {}");
        device.compile_shader(vertex);
        let fragment = device.create_shader(ShaderStage::Fragment);
        device.shader_source(fragment, "#error broken");
        device.compile_shader(fragment);
        assert!(device.shader_compile_status(vertex));
        assert!(!device.shader_compile_status(fragment));
        assert!(!device.shader_info_log(fragment).is_empty());

        let program = device.create_program();
        device.attach_shader(program, vertex);
        device.attach_shader(program, fragment);
        device.link_program(program);
        assert!(!device.program_link_status(program));
    }

    #[test]
    fn test_framebuffer_completeness_rules() {
        let mut device = HeadlessDevice::new(4);
        let color = device.create_texture();
        device.bind_texture_2d(color);
        device.tex_image_2d(0, TextureFormat::Rgba8, 32, 32, None);
        let depth = device.create_texture();
        device.bind_texture_2d(depth);
        device.tex_image_2d(0, TextureFormat::Depth24, 16, 16, None);

        let framebuffer = device.create_framebuffer();
        device.bind_framebuffer(framebuffer);
        assert_eq!(
            device.check_framebuffer_status(),
            FramebufferStatus::MissingAttachment
        );

        device.framebuffer_texture_2d(Attachment::Color(0), color);
        assert_eq!(device.check_framebuffer_status(), FramebufferStatus::Complete);

        device.framebuffer_texture_2d(Attachment::Depth, depth);
        assert_eq!(
            device.check_framebuffer_status(),
            FramebufferStatus::IncompleteDimensions
        );

        device.framebuffer_texture_2d(Attachment::Depth, color);
        assert_eq!(
            device.check_framebuffer_status(),
            FramebufferStatus::IncompleteAttachment
        );
    }

    #[test]
    fn test_element_binding_is_vertex_array_state() {
        let mut device = HeadlessDevice::new(4);
        let vertex_array = device.create_vertex_array();
        let indices = device.create_buffer();
        device.bind_vertex_array(vertex_array);
        device.bind_buffer(BufferTarget::ElementArray, indices);
        device.bind_vertex_array(0);
        assert_eq!(device.bound_element_buffer(), 0);
        device.bind_vertex_array(vertex_array);
        assert_eq!(device.bound_element_buffer(), indices);
    }

    #[test]
    fn test_gl2x_devices_have_no_vertex_array_objects() {
        let mut device = HeadlessDevice::for_version(GlVersion::Gl21);
        assert_eq!(device.create_vertex_array(), 0);
        assert_eq!(device.max_texture_units(), 8);
    }
}
