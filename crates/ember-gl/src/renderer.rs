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

//! The renderer façade used by producer threads.
//!
//! [`Renderer`] turns resource and draw requests into render commands
//! recorded into the back frame of an [`RcBufferPair`]. Where those commands
//! run is up to its [`FrameExecutor`]: inline on the calling thread (right
//! away or at [`Renderer::present`]) or on a dedicated render thread.

use std::sync::Arc;

use ember_core::{CommandFrame, Poolable, RcBufferPair, RenderCommand, SynchronizedRcQueue};

use crate::commands::{
    RcCheckFramebuffer, RcClear, RcCreateFramebuffer, RcCreateShader, RcCreateTexture2D,
    RcCreateVertexArray, RcDeleteFramebuffer, RcDeleteShader, RcDeleteTexture,
    RcDeleteVertexArray, RcDraw, RcSetCurrentFramebuffer, RcSetCurrentShader,
    RcSetFramebufferState, RcSetGlobalState, RcSetShaderState, RcSetTexture2DState,
    RcSetVertexArrayData, TextureUpload,
};
use crate::config::{CompatQuirks, ExecutionMode, RendererConfig};
use crate::device::GlDevice;
use crate::error::GlError;
use crate::server::{FrameStats, GlServer};
use crate::types::{
    BlendFactor, BlendFunc, BufferUsage, Capabilities, ClearFlags, CompareFunction,
    FramebufferId, IdAllocator, IndexFormat, PrimitiveType, Rect, ShaderId, TextureFilter,
    TextureFormat, TextureId, TextureWrapMode, UniformValue, VertexArrayId, VertexFormat,
};

/// Decides where and when recorded frames execute.
pub trait FrameExecutor {
    /// Whether commands run as soon as they are recorded.
    fn is_immediate(&self) -> bool {
        false
    }

    /// Runs what was just recorded into `back`. Only called when
    /// [`Self::is_immediate`] returns `true`.
    fn execute_recorded(&mut self, back: &mut CommandFrame<GlServer>) {
        let _ = back;
    }

    /// Hands the recorded back frame over for execution and swaps.
    fn present(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError>;

    /// Blocks until every presented frame has executed.
    fn wait_idle(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError> {
        let _ = frames;
        Ok(())
    }

    /// Statistics of the last executed frame.
    fn last_frame_stats(&self) -> FrameStats;

    /// A receiver for resource errors posted by the server.
    fn errors(&self) -> flume::Receiver<GlError>;

    /// The server's loader queue.
    fn loader_queue(&self) -> Arc<SynchronizedRcQueue<GlServer>>;

    /// The compatibility quirks the server executes with.
    fn quirks(&self) -> CompatQuirks;
}

/// Executes frames on the calling thread.
#[derive(Debug)]
pub struct InlineExecutor {
    server: GlServer,
    mode: ExecutionMode,
}

impl InlineExecutor {
    /// Wraps `server`.
    pub fn new(server: GlServer, mode: ExecutionMode) -> Self {
        Self { server, mode }
    }

    /// The server commands execute against.
    pub fn server(&self) -> &GlServer {
        &self.server
    }

    /// The server, mutably.
    pub fn server_mut(&mut self) -> &mut GlServer {
        &mut self.server
    }
}

impl FrameExecutor for InlineExecutor {
    fn is_immediate(&self) -> bool {
        self.mode == ExecutionMode::Immediate
    }

    fn execute_recorded(&mut self, back: &mut CommandFrame<GlServer>) {
        self.server.execute_commands(back);
        back.clear();
    }

    fn present(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError> {
        frames.swap();
        self.server.execute_frame(frames.front_mut());
        Ok(())
    }

    fn last_frame_stats(&self) -> FrameStats {
        self.server.last_frame_stats()
    }

    fn errors(&self) -> flume::Receiver<GlError> {
        self.server.errors()
    }

    fn loader_queue(&self) -> Arc<SynchronizedRcQueue<GlServer>> {
        self.server.loader_queue()
    }

    fn quirks(&self) -> CompatQuirks {
        self.server.quirks()
    }
}

/// What the producer last asked the global state to be.
#[derive(Debug, Default)]
struct GlobalStateMirror {
    viewport: Option<Rect>,
    scissor: Option<Rect>,
    clear_color: Option<[f32; 4]>,
    blend_func: Option<BlendFunc>,
    depth_func: Option<CompareFunction>,
    depth_write: Option<bool>,
    enabled: Capabilities,
    disabled: Capabilities,
}

/// Records rendering work for a [`FrameExecutor`].
///
/// Resource ids are handed out immediately; the resources themselves exist
/// once the commands creating them have executed. Consecutive changes to the
/// same texture, shader, framebuffer or vertex array are merged into one
/// `RcSet*State` command, and global state changes that repeat the last
/// requested value are dropped.
#[derive(Debug)]
pub struct Renderer<E: FrameExecutor> {
    frames: RcBufferPair<GlServer>,
    executor: E,
    ids: IdAllocator,
    global: GlobalStateMirror,
    quirks: CompatQuirks,
    frame: u64,
}

impl Renderer<InlineExecutor> {
    /// A renderer executing on the calling thread, in the execution mode
    /// configured for `config.gl_version`.
    pub fn inline(device: Box<dyn GlDevice>, config: &RendererConfig) -> Self {
        let server = GlServer::new(device, config);
        Self::new(InlineExecutor::new(server, config.execution_mode()))
    }

    /// The server, for inspection.
    pub fn server(&self) -> &GlServer {
        self.executor.server()
    }
}

impl<E: FrameExecutor> Renderer<E> {
    /// Creates a renderer recording for `executor`.
    pub fn new(executor: E) -> Self {
        Self {
            frames: RcBufferPair::new(),
            quirks: executor.quirks(),
            executor,
            ids: IdAllocator::new(),
            global: GlobalStateMirror::default(),
            frame: 0,
        }
    }

    /// The executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The executor, mutably.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// The frame currently being recorded.
    pub fn back_frame(&self) -> &CommandFrame<GlServer> {
        self.frames.back()
    }

    /// Number of presented frames.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// A receiver for resource errors posted while commands execute.
    pub fn errors(&self) -> flume::Receiver<GlError> {
        self.executor.errors()
    }

    /// A queue other threads can push commands to; it is drained at the
    /// start of the next executed frame.
    pub fn loader_queue(&self) -> Arc<SynchronizedRcQueue<GlServer>> {
        self.executor.loader_queue()
    }

    /// Hands the recorded frame to the executor.
    pub fn present(&mut self) -> Result<(), GlError> {
        self.executor.present(&mut self.frames)?;
        self.frame += 1;
        Ok(())
    }

    /// Blocks until every presented frame has executed.
    pub fn wait_idle(&mut self) -> Result<(), GlError> {
        self.executor.wait_idle(&mut self.frames)
    }

    /// Statistics of the last executed frame.
    pub fn last_frame_stats(&self) -> FrameStats {
        self.executor.last_frame_stats()
    }

    fn after_record(&mut self) {
        if self.executor.is_immediate() {
            self.executor.execute_recorded(self.frames.back_mut());
        }
    }

    /// Records a pooled command of type `T` filled in by `fill`.
    pub fn push_command<T>(&mut self, fill: impl FnOnce(&mut T))
    where
        T: RenderCommand<GlServer> + Poolable + 'static,
    {
        let (_, command) = self.frames.back_mut().push::<T>();
        fill(command);
        self.after_record();
    }

    /// Records a one-off boxed command.
    pub fn push_boxed(&mut self, command: Box<dyn RenderCommand<GlServer>>) {
        self.frames.back_mut().push_boxed(command);
        self.after_record();
    }

    /// Amends the last recorded command if it is a `T` accepted by
    /// `can_merge`, or records a new one prepared by `start`.
    fn batch<T>(
        &mut self,
        can_merge: impl Fn(&T) -> bool,
        start: impl FnOnce(&mut T),
        amend: impl FnOnce(&mut T),
    ) where
        T: RenderCommand<GlServer> + Poolable + 'static,
    {
        let back = self.frames.back_mut();
        let open = back
            .commands()
            .last()
            .filter(|last| back.arena().get::<T>(*last).is_some_and(&can_merge));
        let command_ref = match open {
            Some(last) => last,
            None => {
                let (command_ref, command) = back.push::<T>();
                start(command);
                command_ref
            }
        };
        if let Some(command) = back.arena_mut().get_mut::<T>(command_ref) {
            amend(command);
        }
        self.after_record();
    }

    fn batch_global(&mut self, amend: impl FnOnce(&mut RcSetGlobalState)) {
        self.batch::<RcSetGlobalState>(|_| true, |_| {}, amend);
    }

    // --- Global state ---

    /// Sets the viewport rectangle.
    pub fn set_viewport(&mut self, rect: Rect) {
        if self.global.viewport.replace(rect) != Some(rect) {
            self.batch_global(|command| {
                command.set_viewport(rect);
            });
        }
    }

    /// Sets the scissor box. It only clips while `SCISSOR_TEST` is enabled.
    pub fn set_scissor(&mut self, rect: Rect) {
        if self.global.scissor.replace(rect) != Some(rect) {
            self.batch_global(|command| {
                command.set_scissor(rect);
            });
        }
    }

    /// Sets the color plain clears use.
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        if self.global.clear_color.replace(color) != Some(color) {
            self.batch_global(|command| {
                command.set_clear_color(color);
            });
        }
    }

    /// Sets the source and destination blend factors.
    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        let func = BlendFunc { src, dst };
        if self.global.blend_func.replace(func) != Some(func) {
            self.batch_global(|command| {
                command.set_blend_func(func);
            });
        }
    }

    /// Sets the comparison the depth test uses.
    pub fn set_depth_func(&mut self, func: CompareFunction) {
        if self.global.depth_func.replace(func) != Some(func) {
            self.batch_global(|command| {
                command.set_depth_func(func);
            });
        }
    }

    /// Turns depth buffer writes on or off.
    pub fn set_depth_write(&mut self, write: bool) {
        if self.global.depth_write.replace(write) != Some(write) {
            self.batch_global(|command| {
                command.set_depth_write(write);
            });
        }
    }

    /// Enables `capabilities`.
    pub fn enable(&mut self, capabilities: Capabilities) {
        let changed = capabilities - self.global.enabled;
        if changed.is_empty() {
            return;
        }
        self.global.enabled |= changed;
        self.global.disabled -= changed;
        // A batch whose disables also switch the scissor off would undo this
        // enable, since disables are applied last.
        let quirks = self.quirks;
        let enables_scissor = changed.contains(Capabilities::SCISSOR_TEST);
        self.batch::<RcSetGlobalState>(
            |last| !(enables_scissor && quirks.disables_scissor(last.disabled())),
            |_| {},
            |command| {
                command.enable(changed);
            },
        );
    }

    /// Disables `capabilities`.
    pub fn disable(&mut self, capabilities: Capabilities) {
        let changed = capabilities - self.global.disabled;
        if changed.is_empty() {
            return;
        }
        let mut turned_off = changed;
        if self.quirks.disables_scissor(changed) {
            turned_off |= Capabilities::SCISSOR_TEST;
        }
        self.global.disabled |= turned_off;
        self.global.enabled -= turned_off;
        self.batch_global(|command| {
            command.disable(changed);
        });
    }

    /// Clears the current framebuffer with the current clear values.
    pub fn clear(&mut self, flags: ClearFlags) {
        self.push_command::<RcClear>(|command| command.flags = flags);
    }

    /// Clears the current framebuffer's color with `color`, leaving the
    /// current clear color untouched.
    pub fn clear_with_color(&mut self, flags: ClearFlags, color: [f32; 4]) {
        self.push_command::<RcClear>(|command| {
            command.flags = flags;
            command.color = Some(color);
        });
    }

    // --- Textures ---

    /// Creates an empty 2D texture.
    pub fn create_texture_2d(&mut self) -> TextureId {
        let texture = self.ids.texture();
        self.push_command::<RcCreateTexture2D>(|command| command.texture = Some(texture));
        texture
    }

    fn batch_texture(&mut self, texture: TextureId, amend: impl FnOnce(&mut RcSetTexture2DState)) {
        self.batch::<RcSetTexture2DState>(
            |open| open.texture() == Some(texture),
            |command| {
                command.reset_for(texture);
            },
            amend,
        );
    }

    fn upload_texture(&mut self, texture: TextureId, upload: TextureUpload) {
        // New data after a mipmap request goes in its own command so the
        // mip chain is built from the old data first.
        self.batch::<RcSetTexture2DState>(
            |open| open.texture() == Some(texture) && !open.mipmaps_requested(),
            |command| {
                command.reset_for(texture);
            },
            |command| {
                command.set_data(upload);
            },
        );
    }

    /// Uploads level 0 of `texture`. `pixels` must hold `width * height`
    /// texels of `format`.
    pub fn set_texture_2d_data(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Vec<u8>,
    ) {
        self.upload_texture(
            texture,
            TextureUpload {
                width,
                height,
                format,
                pixels: Some(pixels),
            },
        );
    }

    /// Allocates level 0 of `texture` without initialising it, for render
    /// targets.
    pub fn allocate_texture_2d(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) {
        self.upload_texture(
            texture,
            TextureUpload {
                width,
                height,
                format,
                pixels: None,
            },
        );
    }

    /// Sets the minification and magnification filters of `texture`.
    pub fn set_texture_filters(
        &mut self,
        texture: TextureId,
        min: TextureFilter,
        mag: TextureFilter,
    ) {
        self.batch_texture(texture, |command| {
            command.set_filters(min, mag);
        });
    }

    /// Sets how `texture` is sampled outside of `[0, 1]`.
    pub fn set_texture_wrap_mode(&mut self, texture: TextureId, wrap: TextureWrapMode) {
        self.batch_texture(texture, |command| {
            command.set_wrap_mode(wrap);
        });
    }

    /// Sets the anisotropy of `texture`, capped by the configured limit.
    pub fn set_texture_anisotropy(&mut self, texture: TextureId, level: f32) {
        self.batch_texture(texture, |command| {
            command.set_anisotropy(level);
        });
    }

    /// Regenerates the mipmap chain of `texture` from its base level.
    pub fn generate_texture_mipmaps(&mut self, texture: TextureId) {
        self.batch_texture(texture, |command| {
            command.generate_mipmaps();
        });
    }

    /// Releases `texture`.
    pub fn delete_texture(&mut self, texture: TextureId) {
        self.push_command::<RcDeleteTexture>(|command| command.texture = Some(texture));
    }

    // --- Shaders ---

    /// Compiles and links a shader program from GLSL sources.
    pub fn create_shader(&mut self, vertex_source: &str, fragment_source: &str) -> ShaderId {
        let shader = self.ids.shader();
        self.push_command::<RcCreateShader>(|command| {
            command.shader = Some(shader);
            command.vertex_source.push_str(vertex_source);
            command.fragment_source.push_str(fragment_source);
        });
        shader
    }

    fn batch_shader(&mut self, shader: ShaderId, amend: impl FnOnce(&mut RcSetShaderState)) {
        self.batch::<RcSetShaderState>(
            |open| open.shader() == Some(shader),
            |command| {
                command.reset_for(shader);
            },
            amend,
        );
    }

    /// Sets the uniform `name` of `shader`.
    pub fn set_shader_uniform(
        &mut self,
        shader: ShaderId,
        name: &str,
        value: impl Into<UniformValue>,
    ) {
        let value = value.into();
        self.batch_shader(shader, |command| {
            command.set_uniform(name, value);
        });
    }

    /// Samples `texture` through the sampler uniform `name` of `shader`.
    pub fn set_shader_texture(&mut self, shader: ShaderId, name: &str, texture: TextureId) {
        self.batch_shader(shader, |command| {
            command.set_texture(name, texture);
        });
    }

    /// Makes `shader` the program later draws use.
    pub fn set_current_shader(&mut self, shader: Option<ShaderId>) {
        self.push_command::<RcSetCurrentShader>(|command| command.shader = shader);
    }

    /// Releases `shader`.
    pub fn delete_shader(&mut self, shader: ShaderId) {
        self.push_command::<RcDeleteShader>(|command| command.shader = Some(shader));
    }

    // --- Framebuffers ---

    /// Creates a framebuffer without attachments.
    pub fn create_framebuffer(&mut self) -> FramebufferId {
        let framebuffer = self.ids.framebuffer();
        self.push_command::<RcCreateFramebuffer>(|command| command.framebuffer = Some(framebuffer));
        framebuffer
    }

    fn batch_framebuffer(
        &mut self,
        framebuffer: FramebufferId,
        amend: impl FnOnce(&mut RcSetFramebufferState),
    ) {
        self.batch::<RcSetFramebufferState>(
            |open| open.framebuffer() == Some(framebuffer),
            |command| {
                command.reset_for(framebuffer);
            },
            amend,
        );
    }

    /// Attaches `texture` as color attachment `index`, or detaches it.
    pub fn set_framebuffer_color_attachment(
        &mut self,
        framebuffer: FramebufferId,
        index: u32,
        texture: Option<TextureId>,
    ) {
        self.batch_framebuffer(framebuffer, |command| {
            command.set_color_attachment(index, texture);
        });
    }

    /// Attaches `texture` as the depth attachment, or detaches it.
    pub fn set_framebuffer_depth_attachment(
        &mut self,
        framebuffer: FramebufferId,
        texture: Option<TextureId>,
    ) {
        self.batch_framebuffer(framebuffer, |command| {
            command.set_depth_attachment(texture);
        });
    }

    /// Checks `framebuffer` for completeness; failures arrive on
    /// [`Self::errors`].
    pub fn check_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.push_command::<RcCheckFramebuffer>(|command| command.framebuffer = Some(framebuffer));
    }

    /// Renders into `framebuffer`, or into the default one.
    pub fn set_current_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.push_command::<RcSetCurrentFramebuffer>(|command| command.framebuffer = framebuffer);
    }

    /// Releases `framebuffer`.
    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferId) {
        self.push_command::<RcDeleteFramebuffer>(|command| command.framebuffer = Some(framebuffer));
    }

    // --- Vertex arrays ---

    /// Creates a vertex array laid out as `format`.
    pub fn create_vertex_array(&mut self, format: &VertexFormat) -> VertexArrayId {
        let vertex_array = self.ids.vertex_array();
        self.push_command::<RcCreateVertexArray>(|command| {
            command.vertex_array = Some(vertex_array);
            command.format.stride = format.stride;
            command.format.attributes.extend_from_slice(&format.attributes);
        });
        vertex_array
    }

    fn batch_vertex_array(
        &mut self,
        vertex_array: VertexArrayId,
        amend: impl FnOnce(&mut RcSetVertexArrayData),
    ) {
        self.batch::<RcSetVertexArrayData>(
            |open| open.vertex_array() == Some(vertex_array),
            |command| {
                command.reset_for(vertex_array);
            },
            amend,
        );
    }

    /// Uploads the vertices of `vertex_array`.
    pub fn set_vertex_array_vertices<V: bytemuck::Pod>(
        &mut self,
        vertex_array: VertexArrayId,
        vertices: &[V],
        usage: BufferUsage,
    ) {
        let bytes = bytemuck::cast_slice(vertices).to_vec();
        let count = vertices.len() as u32;
        self.batch_vertex_array(vertex_array, |command| {
            command.set_vertices(bytes, count).set_usage(usage);
        });
    }

    /// Uploads 32-bit indices of `vertex_array`.
    pub fn set_vertex_array_indices(
        &mut self,
        vertex_array: VertexArrayId,
        indices: &[u32],
        usage: BufferUsage,
    ) {
        let bytes = bytemuck::cast_slice(indices).to_vec();
        let count = indices.len() as u32;
        self.batch_vertex_array(vertex_array, |command| {
            command
                .set_indices(bytes, count, IndexFormat::U32)
                .set_usage(usage);
        });
    }

    /// Uploads 16-bit indices of `vertex_array`.
    pub fn set_vertex_array_indices_u16(
        &mut self,
        vertex_array: VertexArrayId,
        indices: &[u16],
        usage: BufferUsage,
    ) {
        let bytes = bytemuck::cast_slice(indices).to_vec();
        let count = indices.len() as u32;
        self.batch_vertex_array(vertex_array, |command| {
            command
                .set_indices(bytes, count, IndexFormat::U16)
                .set_usage(usage);
        });
    }

    /// Releases `vertex_array` and its buffers.
    pub fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.push_command::<RcDeleteVertexArray>(|command| {
            command.vertex_array = Some(vertex_array);
        });
    }

    // --- Drawing ---

    /// Draws all of `vertex_array`.
    pub fn draw(&mut self, vertex_array: VertexArrayId, primitive: PrimitiveType) {
        self.push_command::<RcDraw>(|command| {
            command.vertex_array = Some(vertex_array);
            command.primitive = primitive;
        });
    }

    /// Draws `count` vertices (or indices) of `vertex_array` from `first`.
    pub fn draw_range(
        &mut self,
        vertex_array: VertexArrayId,
        primitive: PrimitiveType,
        first: u32,
        count: u32,
    ) {
        self.push_command::<RcDraw>(|command| {
            command.vertex_array = Some(vertex_array);
            command.primitive = primitive;
            command.first = first;
            command.count = Some(count);
        });
    }
}
