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

//! The execution context every OpenGL render command runs against.

use std::sync::Arc;

use ember_core::{CommandFrame, SynchronizedRcQueue};

use crate::config::{CompatQuirks, GlVersion, RendererConfig};
use crate::device::GlDevice;
use crate::error::GlError;
use crate::shadow::ServerState;
use crate::state::{GlState, SamplerBinding};
use crate::types::{FramebufferId, ShaderId, TextureFormat, TextureId, UniformValue};

/// Counters collected while a frame executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the executed frame.
    pub frame: u64,
    /// Commands executed, including those drained from the loader queue.
    pub commands: usize,
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Driver calls skipped by the shadow state.
    pub redundant_skipped: u64,
    /// Resource entries freed at the end of the frame.
    pub objects_freed: usize,
}

/// Owns the driver and everything the consumer thread knows about it.
///
/// A `GlServer` lives on the thread that owns the GL context. Render
/// commands receive it as their execution context; nothing else mutates the
/// shadow state or the resource tables.
pub struct GlServer {
    pub(crate) device: Box<dyn GlDevice>,
    pub(crate) shadow: ServerState,
    pub(crate) state: GlState,
    pub(crate) stats: FrameStats,
    version: GlVersion,
    quirks: CompatQuirks,
    max_texture_units: u32,
    anisotropy_limit: f32,
    loader_queue: Arc<SynchronizedRcQueue<GlServer>>,
    error_tx: flume::Sender<GlError>,
    error_rx: flume::Receiver<GlError>,
    last_stats: FrameStats,
    skipped_at_frame_start: u64,
}

impl GlServer {
    /// Wraps `device` according to `config`.
    pub fn new(device: Box<dyn GlDevice>, config: &RendererConfig) -> Self {
        let device_units = device.max_texture_units();
        let max_texture_units = config
            .max_texture_units
            .map_or(device_units, |limit| limit.min(device_units));
        let anisotropy_limit = config.anisotropy_limit.min(device.max_anisotropy()).max(1.0);
        let (error_tx, error_rx) = flume::unbounded();

        log::info!(
            "Created {:?} GL server: {} texture units, anisotropy up to {}",
            config.gl_version,
            max_texture_units,
            anisotropy_limit
        );

        Self {
            device,
            shadow: ServerState::new(device_units),
            state: GlState::new(),
            stats: FrameStats::default(),
            version: config.gl_version,
            quirks: config.quirks(),
            max_texture_units,
            anisotropy_limit,
            loader_queue: Arc::new(SynchronizedRcQueue::new()),
            error_tx,
            error_rx,
            last_stats: FrameStats::default(),
            skipped_at_frame_start: 0,
        }
    }

    /// The OpenGL version this server drives.
    pub fn version(&self) -> GlVersion {
        self.version
    }

    /// Active compatibility quirks.
    pub fn quirks(&self) -> CompatQuirks {
        self.quirks
    }

    /// Number of texture units handed out to shaders.
    pub fn max_texture_units(&self) -> u32 {
        self.max_texture_units
    }

    /// Highest anisotropy level applied to textures.
    pub fn anisotropy_limit(&self) -> f32 {
        self.anisotropy_limit
    }

    /// The resource tables.
    pub fn state(&self) -> &GlState {
        &self.state
    }

    /// The shadow driver state.
    pub fn shadow(&self) -> &ServerState {
        &self.shadow
    }

    /// The driver.
    pub fn device(&self) -> &dyn GlDevice {
        self.device.as_ref()
    }

    /// The driver, downcast to its concrete type.
    pub fn device_as<D: GlDevice + 'static>(&self) -> Option<&D> {
        self.device.as_any().downcast_ref::<D>()
    }

    /// The driver, mutably downcast to its concrete type.
    pub fn device_as_mut<D: GlDevice + 'static>(&mut self) -> Option<&mut D> {
        self.device.as_any_mut().downcast_mut::<D>()
    }

    /// A receiver for resource errors posted while commands execute.
    pub fn errors(&self) -> flume::Receiver<GlError> {
        self.error_rx.clone()
    }

    /// Logs `error` and posts it to the error channel.
    pub fn post_error(&self, error: GlError) {
        log::error!("{error}");
        // The server holds a receiver, so the channel cannot be disconnected.
        let _ = self.error_tx.send(error);
    }

    /// A queue any thread may push commands to; it is drained at the start
    /// of every executed frame.
    pub fn loader_queue(&self) -> Arc<SynchronizedRcQueue<GlServer>> {
        Arc::clone(&self.loader_queue)
    }

    /// Statistics of the last completed frame.
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// The format actually allocated for a texture of `format`.
    pub fn supported_texture_format(&self, format: TextureFormat) -> TextureFormat {
        if format.is_srgb() && !self.version.has_srgb_textures() {
            log::warn!("{:?} has no sRGB textures, falling back to RGBA8", self.version);
            return TextureFormat::Rgba8;
        }
        format
    }

    /// Makes `shader` the program in use, binds every texture its samplers
    /// reference and flushes its pending uniform writes. `None` unbinds.
    pub fn set_current_shader(&mut self, shader: Option<ShaderId>) {
        let device = &mut *self.device;
        let Some(id) = shader else {
            self.shadow.use_program(device, 0);
            self.state.current_shader = None;
            return;
        };
        let Some(shader_state) = self.state.shaders.get_mut(id) else {
            log::debug!("Ignoring current shader {id:?}: not live");
            return;
        };
        if shader_state.native == 0 {
            log::debug!("Ignoring current shader {id:?}: it failed to build");
            return;
        }

        self.shadow.use_program(device, shader_state.native);
        for binding in shader_state.samplers.values() {
            let native = self
                .state
                .textures
                .get(binding.texture)
                .map_or(0, |texture| texture.native);
            self.shadow.active_texture(device, binding.unit);
            self.shadow.bind_texture(device, native);
        }
        for (location, value) in shader_state.pending_uniforms.drain(..) {
            device.set_uniform(location, value);
        }
        self.state.current_shader = Some(id);
    }

    /// Makes `framebuffer` the render target. `None` selects the default
    /// framebuffer.
    pub fn set_current_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        let native = match framebuffer {
            Some(id) => match self.state.framebuffers.get(id) {
                Some(state) => state.native,
                None => {
                    log::debug!("Ignoring current framebuffer {id:?}: not live");
                    return;
                }
            },
            None => 0,
        };
        self.shadow.bind_framebuffer(&mut *self.device, native);
        self.state.current_framebuffer = framebuffer;
    }

    fn is_current(&self, shader: ShaderId, native: u32) -> bool {
        native != 0
            && self.state.current_shader == Some(shader)
            && self.shadow.program() == native
    }

    /// Location of uniform `name` of `shader`, resolved once and cached.
    pub fn uniform_location(&mut self, shader: ShaderId, name: &str) -> Option<i32> {
        let state = self.state.shaders.get_mut(shader)?;
        if state.native == 0 {
            return None;
        }
        if let Some(location) = state.locations.get(name) {
            return *location;
        }
        let location = self.device.uniform_location(state.native, name);
        if location.is_none() {
            log::debug!("Uniform '{name}' is not active in {shader:?}");
        }
        state.locations.insert(name.to_owned(), location);
        location
    }

    /// Writes a uniform of `shader`, right away if it is the current program
    /// or when it next becomes current otherwise.
    pub fn set_uniform(&mut self, shader: ShaderId, location: i32, value: UniformValue) {
        let Some(native) = self.state.shaders.get(shader).map(|state| state.native) else {
            return;
        };
        if self.is_current(shader, native) {
            self.device.set_uniform(location, value);
        } else if let Some(state) = self.state.shaders.get_mut(shader) {
            state.queue_uniform(location, value);
        }
    }

    /// Binds `texture` to the sampler uniform at `location` of `shader`.
    ///
    /// A location keeps the texture unit it was first given: rebinding it to
    /// another texture reuses the unit, rebinding the same texture does
    /// nothing. A new location takes the first unit the shader does not use
    /// yet. The texture is bound into its unit immediately when `shader` is
    /// the current program, otherwise when the shader is made current.
    pub fn set_texture_uniform(&mut self, shader: ShaderId, location: i32, texture: TextureId) {
        let max_units = self.max_texture_units;
        let Some(texture_native) = self.state.textures.get(texture).map(|state| state.native)
        else {
            log::debug!("Ignoring sampler binding of {texture:?}: not live");
            return;
        };
        let Some(shader_state) = self.state.shaders.get_mut(shader) else {
            log::debug!("Ignoring sampler binding on {shader:?}: not live");
            return;
        };

        let mut replaced = None;
        let mut new_location = false;
        let unit = match shader_state.samplers.get_mut(&location) {
            Some(binding) if binding.texture == texture => return,
            Some(binding) => {
                replaced = Some(binding.texture);
                binding.texture = texture;
                binding.unit
            }
            None => {
                let Some(unit) = shader_state.find_available_texture_unit(max_units) else {
                    log::warn!("{shader:?} has no free texture unit left for location {location}");
                    return;
                };
                shader_state
                    .samplers
                    .insert(location, SamplerBinding { texture, unit });
                new_location = true;
                unit
            }
        };
        let program = shader_state.native;

        if let Some(old) = replaced {
            let still_sampled = shader_state
                .samplers
                .values()
                .any(|binding| binding.texture == old);
            if !still_sampled {
                if let Some(old_state) = self.state.textures.get_mut(old) {
                    old_state.shaders.remove(&shader);
                }
            }
        }
        if let Some(texture_state) = self.state.textures.get_mut(texture) {
            texture_state.shaders.insert(shader);
        }

        if self.is_current(shader, program) {
            let device = &mut *self.device;
            self.shadow.active_texture(device, unit);
            self.shadow.bind_texture(device, texture_native);
        }
        if new_location {
            self.set_uniform(shader, location, UniformValue::Int(unit as i32));
        }
    }

    /// Executes one recorded frame: drains the loader queue, replays the
    /// frame's commands and flushes deleted objects.
    pub fn execute_frame(&mut self, frame: &mut CommandFrame<GlServer>) -> FrameStats {
        self.drain_loader_queue();

        self.execute_commands(frame);
        self.end_frame()
    }

    /// Executes and drops everything pushed to the loader queue.
    pub fn drain_loader_queue(&mut self) {
        let queue = Arc::clone(&self.loader_queue);
        self.stats.commands += queue.len();
        queue.execute_and_clear(self);
    }

    /// Replays `frame` without closing the current frame.
    pub fn execute_commands(&mut self, frame: &mut CommandFrame<GlServer>) {
        self.stats.commands += frame.len();
        frame.execute(self);
    }

    /// Closes the current frame: flushes deleted objects and rolls the
    /// statistics over. [`Self::execute_frame`] calls this itself.
    pub fn end_frame(&mut self) -> FrameStats {
        self.stats.objects_freed = self.state.clear_deleted_objects();
        let skipped = self.shadow.redundant_skipped();
        self.stats.redundant_skipped = skipped - self.skipped_at_frame_start;
        self.skipped_at_frame_start = skipped;

        let stats = self.stats;
        log::trace!("Frame stats: {stats:?}");
        self.last_stats = stats;
        self.stats = FrameStats {
            frame: stats.frame + 1,
            ..FrameStats::default()
        };
        stats
    }
}

impl std::fmt::Debug for GlServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlServer")
            .field("version", &self.version)
            .field("quirks", &self.quirks)
            .field("max_texture_units", &self.max_texture_units)
            .field("state", &self.state)
            .field("shadow", &self.shadow)
            .finish_non_exhaustive()
    }
}
